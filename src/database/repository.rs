use std::sync::Arc;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info};
use crate::alert::domain::{AlertId, AlertLogEntry, NewAlert};
use crate::config::postgres::{CHANNEL_ALERT_LOG, CHANNEL_SENSOR_DATA, CHANNEL_THRESHOLD_SETTINGS, WAIT_FOR};
use crate::database::logic::start_listener;
use crate::database::tables::alert_log::{create_table_alert_log, delete_alert_log, insert_alert_log, select_alert_log};
use crate::database::tables::sensor_data::{create_table_sensor_data, select_sensor_data, upsert_sensor_data};
use crate::database::tables::threshold_settings::{count_threshold_settings, create_table_threshold_settings,
                                                  lock_threshold_settings, replace_threshold_settings,
                                                  select_threshold_settings};
use crate::sensor::domain::{FanId, Reading, ReadingSet, Threshold, ThresholdSet};
use crate::store::domain::{Store, StoreError};
use crate::store::subscription::{forward, Subscription};


/// Últimas copias de cada tabla, publicadas a los suscriptores.
///
/// La tarea de escucha (`LISTEN`) las refresca cuando llega una notificación y baja
/// `online` mientras la conexión de escucha está caída.
#[derive(Debug)]
pub struct Hub {
    pub readings: watch::Sender<ReadingSet>,
    pub thresholds: watch::Sender<ThresholdSet>,
    pub alerts: watch::Sender<Vec<AlertLogEntry>>,
    pub online: watch::Sender<bool>,
}


#[derive(Clone, Debug)]
pub struct Repository {
    pool: PgPool,
    hub: Arc<Hub>,
}

impl Repository {
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self, StoreError> {
        let pool = create_pool(database_url, pool_size).await?;
        init_schema(&pool).await?;

        let hub = Arc::new(Hub {
            readings: watch::Sender::new(load_readings(&pool).await?),
            thresholds: watch::Sender::new(load_thresholds(&pool).await?),
            alerts: watch::Sender::new(load_alerts(&pool).await?),
            online: watch::Sender::new(true),
        });

        start_listener(pool.clone(), hub.clone());
        Ok(Self { pool, hub })
    }

    pub async fn create_repository(database_url: &str, pool_size: u32) -> Self {
        loop {
            match Self::new(database_url, pool_size).await {
                Ok(repo) => {
                    info!("Info: repositorio PostgreSQL listo");
                    return repo;
                }
                Err(e) => {
                    error!("Error inicializando repo: {:?}", e);
                    sleep(WAIT_FOR).await;
                }
            }
        }
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if *self.hub.online.borrow() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("conexión de escucha PostgreSQL caída".to_string()))
        }
    }
}


async fn create_pool(database_url: &str, pool_size: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(pool_size)
        .connect(database_url)
        .await?;

    Ok(pool)
}


async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    create_table_sensor_data(pool).await?;
    create_table_threshold_settings(pool).await?;
    create_table_alert_log(pool).await?;
    Ok(())
}


pub async fn load_readings(pool: &PgPool) -> Result<ReadingSet, StoreError> {
    select_sensor_data(pool)
        .await?
        .into_iter()
        .map(Reading::try_from)
        .collect()
}


pub async fn load_thresholds(pool: &PgPool) -> Result<ThresholdSet, StoreError> {
    select_threshold_settings(pool)
        .await?
        .into_iter()
        .map(Threshold::try_from)
        .collect()
}


pub async fn load_alerts(pool: &PgPool) -> Result<Vec<AlertLogEntry>, StoreError> {
    select_alert_log(pool)
        .await?
        .into_iter()
        .map(AlertLogEntry::try_from)
        .collect()
}


/// Encola una notificación que PostgreSQL entrega al confirmar la transacción.
async fn notify(conn: &mut PgConnection, channel: &str) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_notify($1, '')")
        .bind(channel)
        .execute(&mut *conn)
        .await?;
    Ok(())
}


#[async_trait]
impl Store for Repository {
    async fn subscribe_readings(&self, fan_id: Option<FanId>) -> Result<Subscription<ReadingSet>, StoreError> {
        self.ensure_online()?;
        Ok(forward(self.hub.readings.subscribe(), self.hub.online.subscribe(), move |set: &ReadingSet| {
            match fan_id {
                Some(fan_id) => set.only_fan(fan_id),
                None => set.clone(),
            }
        }))
    }

    async fn publish_readings(&self, readings: Vec<Reading>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        upsert_sensor_data(&mut tx, readings).await?;
        notify(&mut tx, CHANNEL_SENSOR_DATA).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn subscribe_thresholds(&self) -> Result<Subscription<ThresholdSet>, StoreError> {
        self.ensure_online()?;
        Ok(forward(self.hub.thresholds.subscribe(), self.hub.online.subscribe(), ThresholdSet::clone))
    }

    async fn load_thresholds(&self) -> Result<ThresholdSet, StoreError> {
        load_thresholds(&self.pool).await
    }

    async fn seed_thresholds(&self, defaults: ThresholdSet) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_threshold_settings(&mut tx).await?;

        if count_threshold_settings(&mut tx).await? > 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        replace_threshold_settings(&mut tx, defaults).await?;
        notify(&mut tx, CHANNEL_THRESHOLD_SETTINGS).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn save_thresholds(&self, thresholds: ThresholdSet) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_threshold_settings(&mut tx).await?;
        replace_threshold_settings(&mut tx, thresholds).await?;
        notify(&mut tx, CHANNEL_THRESHOLD_SETTINGS).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn subscribe_alert_log(&self) -> Result<Subscription<Vec<AlertLogEntry>>, StoreError> {
        self.ensure_online()?;
        Ok(forward(self.hub.alerts.subscribe(), self.hub.online.subscribe(), Vec::clone))
    }

    async fn list_alerts(&self) -> Result<Vec<AlertLogEntry>, StoreError> {
        load_alerts(&self.pool).await
    }

    async fn append_alert(&self, alert: NewAlert) -> Result<AlertId, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = insert_alert_log(&mut tx, alert).await?;
        notify(&mut tx, CHANNEL_ALERT_LOG).await?;
        tx.commit().await?;
        Ok(id)
    }

    async fn clear_alert_log(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        delete_alert_log(&mut tx).await?;
        notify(&mut tx, CHANNEL_ALERT_LOG).await?;
        tx.commit().await?;
        Ok(())
    }
}
