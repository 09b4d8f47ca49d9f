//! Presentación por consola.
//!
//! Consume la foto del monitor y el historial de alertas y los vuelca a los logs: una
//! línea por cambio de estado, la última alerta registrada y el contador de 24 horas.


use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use crate::alert::domain::{recent_count, AlertLogEntry};
use crate::config::evaluation::RECENT_ALERT_WINDOW_HOURS;
use crate::context::domain::AppContext;
use crate::monitor::domain::DashboardSnapshot;
use crate::monitor::handle::MonitorHandle;


pub fn status_line(snapshot: &DashboardSnapshot) -> String {
    if snapshot.is_loading {
        return "cargando datos...".to_string();
    }
    let fans = snapshot.status.fans
        .iter()
        .map(|(fan_id, status)| format!("Fan {fan_id}: {status}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("sistema {} | {fans}", snapshot.status.system)
}


/// Resumen del historial: última alerta y cantidad en la ventana reciente.
pub fn alert_summary(entries: &[AlertLogEntry], tz: Tz, now: DateTime<Utc>) -> Option<String> {
    let latest = entries.first()?;
    let recent = recent_count(entries, now, Duration::hours(RECENT_ALERT_WINDOW_HOURS));
    Some(format!("[{}] {} {} ({} en las últimas {}h)",
                 latest.display_timestamp(tz),
                 latest.status,
                 latest.describe(),
                 recent,
                 RECENT_ALERT_WINDOW_HOURS))
}


fn log_snapshot(snapshot: &DashboardSnapshot) {
    info!("Info: {}", status_line(snapshot));
    if let Ok(json) = serde_json::to_string(snapshot) {
        debug!("Debug: snapshot {json}");
    }
}


#[instrument(name = "run_presenter_task", skip(handle, app_context))]
pub async fn presenter_task(handle: MonitorHandle, app_context: AppContext) {

    info!("Info: presenter task creada");

    let tz = app_context.system.display_timezone;
    let mut snapshots = handle.watch_snapshot();

    let initial = snapshots.borrow_and_update().clone();
    log_snapshot(&initial);

    loop {
        let mut alerts = match handle.subscribe_alert_log().await {
            Ok(sub) => sub,
            Err(e) => {
                error!("Error: no se pudo suscribir al historial {e}");
                sleep(app_context.system.store_retry()).await;
                continue;
            }
        };

        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        info!("Info: monitor finalizado, terminando tarea");
                        return;
                    }
                    let snapshot = snapshots.borrow_and_update().clone();
                    log_snapshot(&snapshot);
                }
                entries = alerts.next() => {
                    match entries {
                        Some(entries) => match alert_summary(&entries, tz, Utc::now()) {
                            Some(summary) => info!("Info: {summary}"),
                            None => info!("Info: historial de alertas vacío"),
                        },
                        None => {
                            warn!("Warning: suscripción al historial cerrada");
                            break;
                        }
                    }
                }
            }
        }

        sleep(app_context.system.store_retry()).await;
    }
}


pub fn start_presenter(handle: MonitorHandle, app_context: AppContext) {

    info!("Info: iniciando tarea presenter");
    tokio::spawn(async move {
        presenter_task(handle, app_context).await;
    });
}
