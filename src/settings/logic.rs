//! Configuración de umbrales.
//!
//! Lectura con inicialización única de los valores por defecto y guardado del conjunto
//! completo. El guardado rechaza conjuntos incompletos o valores no utilizables; no
//! aplica los rangos de edición (`ThresholdLimits`), que son solo para la interfaz.


use tracing::{info, warn};
use crate::config::fans::IDS;
use crate::sensor::domain::{FanId, SensorType, ThresholdSet};
use crate::store::domain::{Store, StoreError};


#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("faltan {} umbrales en el conjunto", .missing.len())]
    Incomplete { missing: Vec<(FanId, SensorType)> },

    #[error("ventilador desconocido: {fan_id}")]
    UnknownFan { fan_id: FanId },

    #[error("unidad inválida para {sensor_type}: {unit}")]
    UnitMismatch { sensor_type: SensorType, unit: String },

    #[error("umbral inválido para fan {fan_id} {sensor_type}: {value}")]
    InvalidValue { fan_id: FanId, sensor_type: SensorType, value: f64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}


/// Devuelve los umbrales vigentes; si no hay ninguno, siembra los valores por defecto.
///
/// La siembra nunca pisa un conjunto existente, así que dos llamadas concurrentes son
/// seguras.
pub async fn load_or_initialize(store: &dyn Store) -> Result<ThresholdSet, StoreError> {
    let current = store.load_thresholds().await?;
    if !current.is_empty() {
        return Ok(current);
    }

    if store.seed_thresholds(ThresholdSet::defaults()).await? {
        info!("Info: umbrales por defecto inicializados");
    }
    store.load_thresholds().await
}


/// Exactamente un umbral por `(ventilador, sensor)` de los ventiladores conocidos, con la
/// unidad del sensor y un valor positivo.
pub fn validate(thresholds: &ThresholdSet) -> Result<(), SettingsError> {
    if let Some(extra) = thresholds.iter().find(|t| !IDS.contains(&t.fan_id)) {
        return Err(SettingsError::UnknownFan { fan_id: extra.fan_id });
    }

    let missing = thresholds.missing();
    if !missing.is_empty() {
        return Err(SettingsError::Incomplete { missing });
    }

    if let Some(bad) = thresholds.iter().find(|t| t.unit != t.sensor_type.unit()) {
        return Err(SettingsError::UnitMismatch {
            sensor_type: bad.sensor_type,
            unit: bad.unit.clone(),
        });
    }

    if let Some(bad) = thresholds.iter().find(|t| !t.value.is_finite() || t.value <= 0.0) {
        return Err(SettingsError::InvalidValue {
            fan_id: bad.fan_id,
            sensor_type: bad.sensor_type,
            value: bad.value,
        });
    }

    Ok(())
}


/// Valida y reemplaza el conjunto completo de umbrales.
pub async fn save(store: &dyn Store, thresholds: ThresholdSet) -> Result<(), SettingsError> {
    validate(&thresholds)?;

    for threshold in thresholds.iter() {
        if !threshold.sensor_type.limits().contains(threshold.value) {
            warn!("Warning: umbral fuera del rango de edición fan {} {} = {}",
                  threshold.fan_id, threshold.sensor_type, threshold.value);
        }
    }

    store.save_thresholds(thresholds).await?;
    info!("Info: umbrales guardados");
    Ok(())
}


#[cfg(test)]
mod tests {
    use crate::sensor::domain::Threshold;
    use crate::store::memory::MemoryStore;
    use super::*;

    #[tokio::test]
    async fn first_load_seeds_defaults() {
        let store = MemoryStore::new();
        let loaded = load_or_initialize(&store).await.expect("load should succeed");
        assert_eq!(loaded, ThresholdSet::defaults());
    }

    #[tokio::test]
    async fn load_keeps_saved_values() {
        let store = MemoryStore::new();
        let mut custom = ThresholdSet::defaults();
        custom.upsert(Threshold::new(2, SensorType::Humidity, 80.0));
        save(&store, custom.clone()).await.expect("save should succeed");

        assert_eq!(load_or_initialize(&store).await.expect("load should succeed"), custom);
    }

    #[tokio::test]
    async fn concurrent_initialization_is_idempotent() {
        let store = MemoryStore::new();
        let (a, b) = tokio::join!(load_or_initialize(&store), load_or_initialize(&store));
        assert_eq!(a.expect("first load"), ThresholdSet::defaults());
        assert_eq!(b.expect("second load"), ThresholdSet::defaults());
    }

    #[tokio::test]
    async fn incomplete_set_is_rejected() {
        let store = MemoryStore::new();
        let partial: ThresholdSet = vec![Threshold::default_for(1, SensorType::Gas)].into_iter().collect();
        let result = save(&store, partial).await;
        assert!(matches!(result, Err(SettingsError::Incomplete { ref missing }) if missing.len() == 7));
        assert!(store.load_thresholds().await.expect("load should succeed").is_empty());
    }

    #[tokio::test]
    async fn extra_fan_is_rejected() {
        let store = MemoryStore::new();
        let mut set = ThresholdSet::defaults();
        set.upsert(Threshold::new(3, SensorType::Gas, 10.0));
        set.upsert(Threshold::new(0, SensorType::Temperature, 10.0));

        let result = save(&store, set).await;
        assert!(matches!(result, Err(SettingsError::UnknownFan { .. })));

        let loaded = load_or_initialize(&store).await.expect("load should succeed");
        assert_eq!(loaded.len(), 8);
        assert!(loaded.get(3, SensorType::Gas).is_none());
    }

    #[test]
    fn foreign_unit_is_rejected() {
        let mut set = ThresholdSet::defaults();
        let mut fahrenheit = Threshold::new(2, SensorType::Temperature, 95.0);
        fahrenheit.unit = "°F".to_string();
        set.upsert(fahrenheit);
        assert!(matches!(
            validate(&set),
            Err(SettingsError::UnitMismatch { sensor_type: SensorType::Temperature, ref unit }) if unit == "°F"
        ));
    }

    #[test]
    fn non_positive_value_is_rejected() {
        let mut set = ThresholdSet::defaults();
        set.upsert(Threshold::new(1, SensorType::Vibration, 0.0));
        assert!(matches!(validate(&set), Err(SettingsError::InvalidValue { fan_id: 1, .. })));
    }

    #[test]
    fn out_of_editing_range_is_accepted() {
        let mut set = ThresholdSet::defaults();
        set.upsert(Threshold::new(1, SensorType::Temperature, 60.0));
        assert!(validate(&set).is_ok());
    }

    #[tokio::test]
    async fn store_failure_is_reported() {
        let store = MemoryStore::new();
        store.set_online(false);
        let result = save(&store, ThresholdSet::defaults()).await;
        assert!(matches!(result, Err(SettingsError::Store(StoreError::Unavailable(_)))));
    }
}
