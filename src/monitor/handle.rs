use std::sync::Arc;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info};
use crate::alert::domain::{recent_count, AlertLogEntry};
use crate::config::evaluation::RECENT_ALERT_WINDOW_HOURS;
use crate::sensor::domain::ThresholdSet;
use crate::settings::logic::{self, SettingsError};
use crate::store::domain::{Store, StoreError};
use crate::store::subscription::Subscription;
use super::domain::DashboardSnapshot;


/// API de lectura y de acciones explícitas del usuario.
///
/// Las acciones (guardar umbrales, borrar historial) van directo al almacén y devuelven
/// el resultado al que las pidió; no se reintentan.
#[derive(Clone)]
pub struct MonitorHandle {
    store: Arc<dyn Store>,
    snapshot: watch::Receiver<DashboardSnapshot>,
}


impl MonitorHandle {
    pub fn new(store: Arc<dyn Store>, snapshot: watch::Receiver<DashboardSnapshot>) -> Self {
        Self { store, snapshot }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot.clone()
    }

    pub async fn thresholds(&self) -> Result<ThresholdSet, StoreError> {
        logic::load_or_initialize(self.store.as_ref()).await
    }

    pub async fn save_thresholds(&self, thresholds: ThresholdSet) -> Result<(), SettingsError> {
        logic::save(self.store.as_ref(), thresholds).await.inspect_err(|e| {
            error!("Error: no se pudieron guardar los umbrales {e}");
        })
    }

    pub async fn alert_log(&self) -> Result<Vec<AlertLogEntry>, StoreError> {
        self.store.list_alerts().await
    }

    pub async fn subscribe_alert_log(&self) -> Result<Subscription<Vec<AlertLogEntry>>, StoreError> {
        self.store.subscribe_alert_log().await
    }

    /// Borra todo el historial. La confirmación del usuario se pide antes de llamar.
    pub async fn clear_alert_log(&self) -> Result<(), StoreError> {
        match self.store.clear_alert_log().await {
            Ok(()) => {
                info!("Info: historial de alertas borrado");
                Ok(())
            }
            Err(e) => {
                error!("Error: no se pudo borrar el historial {e}");
                Err(e)
            }
        }
    }

    /// Alertas de las últimas 24 horas (contador de la cabecera).
    pub fn recent_alert_count(entries: &[AlertLogEntry]) -> usize {
        recent_count(entries, Utc::now(), chrono::Duration::hours(RECENT_ALERT_WINDOW_HOURS))
    }
}
