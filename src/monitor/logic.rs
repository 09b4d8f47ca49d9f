//! Tarea del monitor.
//!
//! Consumidor único de la bandeja de entrada: cada `Event` se aplica, se recalculan los
//! estados, se publica la foto y se despachan las alertas nuevas antes de tomar el
//! siguiente mensaje. Así ninguna evaluación se intercala con otra.
//!
//! La escritura de alertas la hace otra tarea (`recorder`), de modo que un almacén lento
//! no frena la publicación de estados. El envío al recorder no espera: con la cola llena
//! la alerta se descarta y queda en el log de errores.


use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, instrument, warn};
use crate::alert::domain::NewAlert;
use crate::alert::logic::AlertDetector;
use super::domain::{recompute, DashboardSnapshot, Event, MonitorState};


#[instrument(
    name = "run_monitor_task",
    skip(rx_from_feed, tx_snapshot, tx_to_recorder)
)]
pub async fn run_monitor(mut rx_from_feed: mpsc::Receiver<Event>,
                         tx_snapshot: watch::Sender<DashboardSnapshot>,
                         tx_to_recorder: mpsc::Sender<NewAlert>) {

    info!("Info: monitor task creada");

    let mut state = MonitorState::default();
    let mut detector = AlertDetector::new();

    while let Some(event) = rx_from_feed.recv().await {
        debug!("Debug: evento entrante {}", event.kind());

        let now = Utc::now();
        state.apply(event, now);

        let snapshot = recompute(&state);
        let previous = tx_snapshot.send_replace(snapshot.clone());
        if previous.status != snapshot.status {
            info!("Info: estado del sistema {} (fans {:?})", snapshot.status.system, snapshot.status.fans);
        }

        if state.is_degraded() {
            continue;
        }

        for alert in detector.detect(&state.readings, &state.thresholds, now) {
            warn!("Warning: {} {} en {} ({} >= {})",
                  alert.status, alert.sensor_type, alert.fan_name, alert.value, alert.threshold);
            match tx_to_recorder.try_send(alert) {
                Ok(()) => {}
                Err(TrySendError::Full(alert)) => {
                    error!("Error: cola del recorder llena, alerta descartada {} {}",
                           alert.fan_name, alert.sensor_type);
                }
                Err(TrySendError::Closed(_)) => {
                    error!("Error: no se pudo enviar la alerta al recorder");
                }
            }
        }
    }

    info!("Info: monitor task finalizada");
}


pub fn start_monitor(rx_from_feed: mpsc::Receiver<Event>,
                     tx_snapshot: watch::Sender<DashboardSnapshot>,
                     tx_to_recorder: mpsc::Sender<NewAlert>) {

    info!("Info: iniciando tarea monitor");
    tokio::spawn(async move {
        run_monitor(
            rx_from_feed,
            tx_snapshot,
            tx_to_recorder,
        ).await;
    });
}
