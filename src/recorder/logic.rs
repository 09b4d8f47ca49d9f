//! Registro de alertas en el historial.
//!
//! Recibe las alertas que decide el monitor y las agrega al almacén una por una, en el
//! orden en que llegan.


use tokio::sync::mpsc;
use tracing::{error, info, instrument};
use crate::alert::domain::NewAlert;
use crate::context::domain::AppContext;


#[instrument(name = "run_recorder_task", skip(rx_from_monitor, app_context))]
pub async fn recorder_task(mut rx_from_monitor: mpsc::Receiver<NewAlert>,
                           app_context: AppContext) {

    info!("Info: recorder task creada");

    while let Some(alert) = rx_from_monitor.recv().await {
        let fan_name = alert.fan_name.clone();
        let sensor_type = alert.sensor_type;
        match app_context.store.append_alert(alert).await {
            Ok(id) => info!("Info: alerta {id} registrada ({fan_name} {sensor_type})"),
            // La alerta se pierde; el detector ya la dio por emitida y no la repite.
            Err(e) => error!("Error: no se pudo registrar la alerta de {fan_name} {sensor_type} {e}"),
        }
    }

    info!("Info: recorder task finalizada");
}


pub fn start_recorder(rx_from_monitor: mpsc::Receiver<NewAlert>,
                      app_context: AppContext) {

    info!("Info: iniciando tarea recorder");
    tokio::spawn(async move {
        recorder_task(rx_from_monitor, app_context).await;
    });
}
