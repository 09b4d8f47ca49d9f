//! Registros de alerta.
//!
//! Una alerta es una foto tomada en el momento de la detección: valor y umbral se
//! guardan ya formateados, de modo que editar umbrales después no altera el historial.


use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use crate::sensor::domain::{fan_name, FanId, Reading, SensorType, Threshold};
use crate::status::domain::Severity;


pub type AlertId = i64;


/// Alerta detectada que todavía no tiene identificador asignado por el almacén.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub fan_id: FanId,
    pub fan_name: String,
    pub sensor_type: SensorType,
    pub value: String,
    pub threshold: String,
    pub unit: String,
    pub status: Severity,
    pub timestamp: DateTime<Utc>,
}


/// Entrada persistida del historial de alertas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLogEntry {
    pub id: AlertId,
    pub fan_id: FanId,
    pub fan_name: String,
    pub sensor_type: SensorType,
    pub value: String,
    pub threshold: String,
    pub unit: String,
    pub status: Severity,
    pub timestamp: DateTime<Utc>,
}


pub fn format_measure(value: f64) -> String {
    format!("{value:.2}")
}


impl NewAlert {
    pub fn snapshot(reading: &Reading,
                    threshold: &Threshold,
                    status: Severity,
                    timestamp: DateTime<Utc>) -> Self {
        Self {
            fan_id: reading.fan_id,
            fan_name: fan_name(reading.fan_id),
            sensor_type: reading.sensor_type,
            value: format_measure(reading.value),
            threshold: format_measure(threshold.value),
            unit: reading.sensor_type.unit().to_string(),
            status,
            timestamp,
        }
    }

    pub fn into_entry(self, id: AlertId) -> AlertLogEntry {
        AlertLogEntry {
            id,
            fan_id: self.fan_id,
            fan_name: self.fan_name,
            sensor_type: self.sensor_type,
            value: self.value,
            threshold: self.threshold,
            unit: self.unit,
            status: self.status,
            timestamp: self.timestamp,
        }
    }
}


impl AlertLogEntry {
    /// Frase mostrada en el aviso emergente.
    pub fn describe(&self) -> String {
        format!("{} {}: {}{} exceeds threshold of {}{}",
                self.fan_name, self.sensor_type, self.value, self.unit, self.threshold, self.unit)
    }

    /// Fecha en formato `MM/DD/YYYY, HH:MM:SS` (24 h) en la zona indicada.
    pub fn display_timestamp(&self, tz: Tz) -> String {
        self.timestamp.with_timezone(&tz).format("%m/%d/%Y, %H:%M:%S").to_string()
    }
}


/// Cantidad de alertas cuya marca de tiempo cae dentro de `window` antes de `now`.
pub fn recent_count(entries: &[AlertLogEntry], now: DateTime<Utc>, window: Duration) -> usize {
    let since = now - window;
    entries.iter().filter(|entry| entry.timestamp > since).count()
}
