//! Frontera con el almacén externo.
//!
//! El almacén guarda las lecturas vigentes, los umbrales vigentes y el historial de
//! alertas, y notifica a los suscriptores cada vez que alguno cambia. El núcleo no
//! depende de cómo lo hace: hay una implementación en memoria (`MemoryStore`) y otra
//! sobre PostgreSQL (`database::repository::Repository`).


use async_trait::async_trait;
use crate::alert::domain::{AlertId, AlertLogEntry, NewAlert};
use crate::sensor::domain::{FanId, Reading, ReadingSet, ThresholdSet};
use super::subscription::Subscription;


#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("almacén no disponible: {0}")]
    Unavailable(String),

    #[error("error de base de datos: {0}")]
    Database(#[from] sqlx::Error),

    #[error("registro inválido: {0}")]
    CorruptRecord(String),
}


#[async_trait]
pub trait Store: Send + Sync {
    /// Lecturas vigentes, opcionalmente de un solo ventilador. Entrega el valor actual al
    /// suscribirse y luego uno nuevo por cada cambio.
    async fn subscribe_readings(&self, fan_id: Option<FanId>) -> Result<Subscription<ReadingSet>, StoreError>;

    /// Publica un lote de lecturas (último valor por `(ventilador, sensor)`).
    async fn publish_readings(&self, readings: Vec<Reading>) -> Result<(), StoreError>;

    async fn subscribe_thresholds(&self) -> Result<Subscription<ThresholdSet>, StoreError>;

    async fn load_thresholds(&self) -> Result<ThresholdSet, StoreError>;

    /// Escribe `defaults` solo si no hay umbrales guardados. Devuelve `true` si escribió.
    async fn seed_thresholds(&self, defaults: ThresholdSet) -> Result<bool, StoreError>;

    /// Reemplaza el conjunto completo de umbrales.
    async fn save_thresholds(&self, thresholds: ThresholdSet) -> Result<(), StoreError>;

    /// Historial ordenado (más reciente primero), reenviado completo en cada cambio.
    async fn subscribe_alert_log(&self) -> Result<Subscription<Vec<AlertLogEntry>>, StoreError>;

    async fn list_alerts(&self) -> Result<Vec<AlertLogEntry>, StoreError>;

    async fn append_alert(&self, alert: NewAlert) -> Result<AlertId, StoreError>;

    async fn clear_alert_log(&self) -> Result<(), StoreError>;
}
