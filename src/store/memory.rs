//! Almacén en memoria.
//!
//! Mantiene lecturas, umbrales e historial en canales `watch`, de modo que cada
//! modificación notifica a los suscriptores. Sirve para desarrollo, demo y pruebas.
//! `set_online(false)` simula una caída: las operaciones fallan con
//! `StoreError::Unavailable` y las suscripciones abiertas terminan.


use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info};
use crate::alert::domain::{AlertId, AlertLogEntry, NewAlert};
use crate::alert::log::AlertLog;
use crate::sensor::domain::{FanId, Reading, ReadingSet, ThresholdSet};
use super::domain::{Store, StoreError};
use super::subscription::{forward, Subscription};


#[derive(Debug)]
pub struct MemoryStore {
    readings: watch::Sender<ReadingSet>,
    thresholds: watch::Sender<ThresholdSet>,
    alerts: watch::Sender<AlertLog>,
    online: watch::Sender<bool>,
}


impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}


impl MemoryStore {
    pub fn new() -> Self {
        Self {
            readings: watch::Sender::new(ReadingSet::new()),
            thresholds: watch::Sender::new(ThresholdSet::new()),
            alerts: watch::Sender::new(AlertLog::new()),
            online: watch::Sender::new(true),
        }
    }

    pub fn set_online(&self, online: bool) {
        info!("Info: almacén en memoria online={online}");
        self.online.send_replace(online);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if *self.online.borrow() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("almacén en memoria fuera de línea".to_string()))
        }
    }
}


#[async_trait]
impl Store for MemoryStore {
    async fn subscribe_readings(&self, fan_id: Option<FanId>) -> Result<Subscription<ReadingSet>, StoreError> {
        self.ensure_online()?;
        Ok(forward(self.readings.subscribe(), self.online.subscribe(), move |set: &ReadingSet| {
            match fan_id {
                Some(fan_id) => set.only_fan(fan_id),
                None => set.clone(),
            }
        }))
    }

    async fn publish_readings(&self, readings: Vec<Reading>) -> Result<(), StoreError> {
        self.ensure_online()?;
        debug!("Debug: publicando {} lecturas", readings.len());
        self.readings.send_modify(|set| {
            for reading in readings {
                set.upsert(reading);
            }
        });
        Ok(())
    }

    async fn subscribe_thresholds(&self) -> Result<Subscription<ThresholdSet>, StoreError> {
        self.ensure_online()?;
        Ok(forward(self.thresholds.subscribe(), self.online.subscribe(), ThresholdSet::clone))
    }

    async fn load_thresholds(&self) -> Result<ThresholdSet, StoreError> {
        self.ensure_online()?;
        Ok(self.thresholds.borrow().clone())
    }

    async fn seed_thresholds(&self, defaults: ThresholdSet) -> Result<bool, StoreError> {
        self.ensure_online()?;
        let seeded = self.thresholds.send_if_modified(|current| {
            if current.is_empty() {
                *current = defaults;
                true
            } else {
                false
            }
        });
        Ok(seeded)
    }

    async fn save_thresholds(&self, thresholds: ThresholdSet) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.thresholds.send_replace(thresholds);
        Ok(())
    }

    async fn subscribe_alert_log(&self) -> Result<Subscription<Vec<AlertLogEntry>>, StoreError> {
        self.ensure_online()?;
        Ok(forward(self.alerts.subscribe(), self.online.subscribe(), AlertLog::list))
    }

    async fn list_alerts(&self) -> Result<Vec<AlertLogEntry>, StoreError> {
        self.ensure_online()?;
        Ok(self.alerts.borrow().list())
    }

    async fn append_alert(&self, alert: NewAlert) -> Result<AlertId, StoreError> {
        self.ensure_online()?;
        let mut id = 0;
        self.alerts.send_modify(|log| id = log.append(alert));
        Ok(id)
    }

    async fn clear_alert_log(&self) -> Result<(), StoreError> {
        self.ensure_online()?;
        self.alerts.send_modify(AlertLog::clear);
        Ok(())
    }
}
