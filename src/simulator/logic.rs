//! Generador reactivo de lecturas simuladas.
//!
//! Funciona en coordinación con la tarea de temporización:
//! 1. Esta tarea solicita un temporizador (`TimerEvent::InitTimer`).
//! 2. El temporizador espera y responde con `TimerEvent::Timeout`.
//! 3. Esta tarea publica un lote de lecturas en el almacén y reinicia el ciclo.


use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};
use crate::context::domain::AppContext;
use crate::timer::domain::TimerEvent;
use super::domain::generate_batch;


/// Ejecuta el bucle del generador.
///
/// Un lote que no se pudo publicar (almacén caído) se descarta; el siguiente
/// `Timeout` genera uno nuevo.
#[instrument(
    name = "run_simulator_task",
    skip(tx_to_timer, rx_from_timer, app_context)
)]
pub async fn run_simulator(tx_to_timer: mpsc::Sender<TimerEvent>,
                           mut rx_from_timer: mpsc::Receiver<TimerEvent>,
                           app_context: AppContext) {

    info!("Info: simulator task creada");

    let interval = app_context.system.simulation_interval();
    if tx_to_timer.send(TimerEvent::InitTimer(interval)).await.is_err() {
        error!("Error: no se pudo enviar el evento al temporizador");
    }

    while let Some(event) = rx_from_timer.recv().await {
        debug!("Debug: evento entrante del temporizador");
        if let TimerEvent::Timeout = event {
            let batch = generate_batch(&mut rand::thread_rng(), Utc::now());
            if let Err(e) = app_context.store.publish_readings(batch).await {
                error!("Error: no se pudieron publicar las lecturas simuladas {e}");
            }
            if tx_to_timer.send(TimerEvent::InitTimer(interval)).await.is_err() {
                error!("Error: no se pudo enviar el evento al temporizador");
            }
        }
    }
    info!("Info: simulator task finalizada");
}


pub fn start_simulator(to_timer: mpsc::Sender<TimerEvent>,
                       from_timer: mpsc::Receiver<TimerEvent>,
                       ctx: AppContext) {

    info!("Info: iniciando tarea simulator");
    tokio::spawn(async move {
        run_simulator(
            to_timer,
            from_timer,
            ctx,
        ).await;
    });
}
