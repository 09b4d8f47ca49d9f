//! Escucha de cambios en PostgreSQL.
//!
//! Las escrituras del repositorio emiten `pg_notify` dentro de su transacción. Esta tarea
//! escucha esos canales, vuelve a leer la tabla afectada y publica la copia nueva en el
//! `Hub`, de modo que también se ven los cambios hechos por otros procesos.


use std::sync::Arc;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use crate::config::postgres::{CHANNEL_ALERT_LOG, CHANNEL_SENSOR_DATA, CHANNEL_THRESHOLD_SETTINGS, WAIT_FOR};
use crate::database::repository::{load_alerts, load_readings, load_thresholds, Hub};
use crate::store::domain::StoreError;


async fn refresh(pool: &PgPool, hub: &Hub, channel: &str) -> Result<(), StoreError> {
    match channel {
        CHANNEL_SENSOR_DATA => {
            hub.readings.send_replace(load_readings(pool).await?);
        }
        CHANNEL_THRESHOLD_SETTINGS => {
            hub.thresholds.send_replace(load_thresholds(pool).await?);
        }
        CHANNEL_ALERT_LOG => {
            hub.alerts.send_replace(load_alerts(pool).await?);
        }
        other => warn!("Warning: notificación en canal desconocido {other}"),
    }
    Ok(())
}


async fn refresh_all(pool: &PgPool, hub: &Hub) -> Result<(), StoreError> {
    for channel in [CHANNEL_SENSOR_DATA, CHANNEL_THRESHOLD_SETTINGS, CHANNEL_ALERT_LOG] {
        refresh(pool, hub, channel).await?;
    }
    Ok(())
}


async fn connect_listener(pool: &PgPool) -> Result<PgListener, sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen_all([CHANNEL_SENSOR_DATA, CHANNEL_THRESHOLD_SETTINGS, CHANNEL_ALERT_LOG]).await?;
    Ok(listener)
}


#[instrument(name = "run_listener_task", skip(pool, hub))]
pub async fn listener_task(pool: PgPool, hub: Arc<Hub>) {

    info!("Info: listener task creada");

    loop {
        let mut listener = match connect_listener(&pool).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Error: no se pudo abrir LISTEN {e}");
                hub.online.send_replace(false);
                sleep(WAIT_FOR).await;
                continue;
            }
        };

        // Lo ocurrido mientras no se escuchaba se recupera con una lectura completa.
        if let Err(e) = refresh_all(&pool, &hub).await {
            error!("Error: no se pudo refrescar el estado {e}");
            hub.online.send_replace(false);
            sleep(WAIT_FOR).await;
            continue;
        }
        hub.online.send_replace(true);

        loop {
            match listener.recv().await {
                Ok(notification) => {
                    debug!("Debug: notificación en {}", notification.channel());
                    if let Err(e) = refresh(&pool, &hub, notification.channel()).await {
                        error!("Error: no se pudo refrescar {} {e}", notification.channel());
                    }
                }
                Err(e) => {
                    error!("Error: conexión LISTEN perdida {e}");
                    hub.online.send_replace(false);
                    break;
                }
            }
        }

        sleep(WAIT_FOR).await;
    }
}


pub fn start_listener(pool: PgPool, hub: Arc<Hub>) {

    tokio::spawn(async move {
        listener_task(pool,
                      hub
        ).await;
    });
}
