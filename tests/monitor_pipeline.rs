use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::sync::watch;
use tokio::time::timeout;
use fan_monitor_service::alert::domain::AlertLogEntry;
use fan_monitor_service::channels::domain::Channels;
use fan_monitor_service::context::domain::AppContext;
use fan_monitor_service::feed::logic::start_feed;
use fan_monitor_service::monitor::domain::{DashboardSnapshot, Feed};
use fan_monitor_service::monitor::handle::MonitorHandle;
use fan_monitor_service::monitor::logic::start_monitor;
use fan_monitor_service::recorder::logic::start_recorder;
use fan_monitor_service::sensor::domain::{Reading, SensorType, Threshold, ThresholdSet};
use fan_monitor_service::status::domain::{FanStatus, Severity, SystemStatus};
use fan_monitor_service::store::domain::Store;
use fan_monitor_service::store::memory::MemoryStore;
use fan_monitor_service::store::subscription::Subscription;
use fan_monitor_service::system::domain::System;


const WAIT: Duration = Duration::from_secs(5);


fn calm_batch() -> Vec<Reading> {
    [1, 2].into_iter()
        .flat_map(|fan_id| SensorType::ALL.into_iter().map(move |sensor| (fan_id, sensor)))
        .map(|(fan_id, sensor_type)| Reading {
            fan_id,
            sensor_type,
            value: 1.0,
            unit: sensor_type.unit().to_string(),
            timestamp: Utc::now(),
        })
        .collect()
}


fn reading(fan_id: u8, sensor_type: SensorType, value: f64) -> Reading {
    Reading {
        fan_id,
        sensor_type,
        value,
        unit: sensor_type.unit().to_string(),
        timestamp: Utc::now(),
    }
}


struct Pipeline {
    store: Arc<MemoryStore>,
    handle: MonitorHandle,
    snapshots: watch::Receiver<DashboardSnapshot>,
}


async fn start_pipeline() -> Pipeline {
    let store = Arc::new(MemoryStore::new());
    let system = System::from_lookup(|key| match key {
        "STORE_RETRY_SECS" => Some("1".to_string()),
        "SIMULATOR_ENABLED" => Some("false".to_string()),
        _ => None,
    }).expect("config should load");
    let ctx = AppContext::with_store(store.clone(), system);
    let channels = Channels::new();

    let snapshots = channels.presenter_from_monitor.clone();
    let handle = MonitorHandle::new(ctx.store.clone(), channels.presenter_from_monitor);

    start_monitor(channels.monitor_from_feed, channels.monitor_to_presenter, channels.monitor_to_recorder);
    start_feed(Feed::Readings, channels.feed_to_monitor.clone(), ctx.clone());
    start_feed(Feed::Thresholds, channels.feed_to_monitor, ctx.clone());
    start_recorder(channels.recorder_from_monitor, ctx);

    Pipeline { store, handle, snapshots }
}


async fn wait_for_snapshot(rx: &mut watch::Receiver<DashboardSnapshot>,
                           pred: impl Fn(&DashboardSnapshot) -> bool) -> DashboardSnapshot {
    timeout(WAIT, rx.wait_for(|s| pred(s)))
        .await
        .expect("snapshot should arrive in time")
        .expect("monitor alive")
        .clone()
}


async fn wait_for_log(sub: &mut Subscription<Vec<AlertLogEntry>>,
                      pred: impl Fn(&[AlertLogEntry]) -> bool) -> Vec<AlertLogEntry> {
    timeout(WAIT, async {
        loop {
            let entries = sub.next().await.expect("alert log subscription open");
            if pred(&entries) {
                return entries;
            }
        }
    })
    .await
    .expect("alert log should change in time")
}


#[tokio::test]
async fn breach_is_logged_once_then_escalates() {
    let mut p = start_pipeline().await;
    let mut log = p.handle.subscribe_alert_log().await.expect("subscribe should succeed");

    assert_eq!(p.handle.thresholds().await.expect("thresholds"), ThresholdSet::defaults());
    p.store.publish_readings(calm_batch()).await.expect("publish should succeed");
    let calm = wait_for_snapshot(&mut p.snapshots, |s| s.status.system == SystemStatus::Online).await;
    assert!(!calm.is_loading);

    p.store.publish_readings(vec![reading(1, SensorType::Temperature, 38.0)]).await.expect("publish");
    let entries = wait_for_log(&mut log, |e| !e.is_empty()).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, Severity::Warning);
    assert_eq!(entries[0].describe(), "Fan 1 temperature: 38.00°C exceeds threshold of 35.00°C");

    let warned = wait_for_snapshot(&mut p.snapshots, |s| s.status.fan(1) == FanStatus::Warning).await;
    assert_eq!(warned.status.system, SystemStatus::Warning);

    // Misma condición: no se registra otra alerta.
    p.store.publish_readings(vec![reading(1, SensorType::Temperature, 38.2)]).await.expect("publish");
    p.store.publish_readings(vec![reading(1, SensorType::Temperature, 39.0)]).await.expect("publish");
    let escalated = wait_for_log(&mut log, |e| e.len() >= 2).await;
    assert_eq!(escalated.len(), 2);
    assert_eq!(escalated[0].status, Severity::Critical);
    assert_eq!(escalated[0].value, "39.00");

    let critical = wait_for_snapshot(&mut p.snapshots, |s| s.status.system == SystemStatus::Critical).await;
    assert_eq!(critical.status.fan(2), FanStatus::Operational);
}


#[tokio::test]
async fn threshold_change_reevaluates_with_latest_readings() {
    let mut p = start_pipeline().await;
    p.handle.thresholds().await.expect("thresholds");
    p.store.publish_readings(calm_batch()).await.expect("publish");
    p.store.publish_readings(vec![reading(2, SensorType::Humidity, 65.0)]).await.expect("publish");
    wait_for_snapshot(&mut p.snapshots, |s| !s.is_loading && s.status.system == SystemStatus::Online).await;

    let mut lowered = ThresholdSet::defaults();
    lowered.upsert(Threshold::new(2, SensorType::Humidity, 60.0));
    p.handle.save_thresholds(lowered).await.expect("save should succeed");

    let snapshot = wait_for_snapshot(&mut p.snapshots, |s| s.status.fan(2) == FanStatus::Warning).await;
    assert_eq!(snapshot.status.fan(1), FanStatus::Operational);

    let entries = timeout(WAIT, async {
        loop {
            let entries = p.handle.alert_log().await.expect("list should succeed");
            if !entries.is_empty() {
                return entries;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }).await.expect("alert should be recorded");
    assert_eq!(entries[0].fan_id, 2);
    assert_eq!(entries[0].sensor_type, SensorType::Humidity);
}


#[tokio::test]
async fn clearing_the_log_keeps_ids_increasing() {
    let mut p = start_pipeline().await;
    let mut log = p.handle.subscribe_alert_log().await.expect("subscribe should succeed");
    p.handle.thresholds().await.expect("thresholds");
    p.store.publish_readings(calm_batch()).await.expect("publish");
    p.store.publish_readings(vec![reading(1, SensorType::Gas, 200.0)]).await.expect("publish");
    let first = wait_for_log(&mut log, |e| !e.is_empty()).await;

    p.handle.clear_alert_log().await.expect("clear should succeed");
    wait_for_log(&mut log, |e| e.is_empty()).await;
    assert_eq!(MonitorHandle::recent_alert_count(&p.handle.alert_log().await.expect("list")), 0);

    // Bajar y volver a superar el umbral genera una alerta nueva.
    p.store.publish_readings(vec![reading(1, SensorType::Gas, 10.0)]).await.expect("publish");
    wait_for_snapshot(&mut p.snapshots, |s| s.status.fan(1) == FanStatus::Operational).await;
    p.store.publish_readings(vec![reading(1, SensorType::Gas, 200.0)]).await.expect("publish");
    let second = wait_for_log(&mut log, |e| !e.is_empty()).await;
    assert!(second[0].id > first[0].id);
    assert_eq!(MonitorHandle::recent_alert_count(&second), 1);
}


#[tokio::test]
async fn outage_degrades_to_offline_and_recovers() {
    let mut p = start_pipeline().await;
    p.handle.thresholds().await.expect("thresholds");
    p.store.publish_readings(calm_batch()).await.expect("publish");
    wait_for_snapshot(&mut p.snapshots, |s| s.status.system == SystemStatus::Online).await;

    p.store.set_online(false);
    let degraded = wait_for_snapshot(&mut p.snapshots, |s| s.degraded).await;
    assert_eq!(degraded.status.system, SystemStatus::Offline);
    assert_eq!(degraded.status.fan(1), FanStatus::Offline);
    assert!(p.handle.clear_alert_log().await.is_err());

    p.store.set_online(true);
    let restored = wait_for_snapshot(&mut p.snapshots, |s| !s.degraded).await;
    assert_eq!(restored.status.system, SystemStatus::Online);
}
