//! Filas de las tablas y su conversión a tipos de dominio.
//!
//! Las columnas se leen con tipos SQL (`INTEGER`, `TEXT`) y se validan al convertir:
//! un `sensor_type` o `status` desconocido se reporta como `StoreError::CorruptRecord`.


use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::alert::domain::AlertLogEntry;
use crate::sensor::domain::{FanId, Reading, SensorType, Threshold};
use crate::status::domain::Severity;
use crate::store::domain::StoreError;


#[derive(Debug, Clone, FromRow)]
pub struct SensorDataRow {
    pub fan_id: i32,
    pub sensor_type: String,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}


#[derive(Debug, Clone, FromRow)]
pub struct ThresholdRow {
    pub fan_id: i32,
    pub sensor_type: String,
    pub value: f64,
    pub unit: String,
}


#[derive(Debug, Clone, FromRow)]
pub struct AlertLogRow {
    pub id: i64,
    pub fan_id: i32,
    pub fan_name: String,
    pub sensor_type: String,
    pub value: String,
    pub threshold: String,
    pub unit: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}


fn parse_fan(fan_id: i32) -> Result<FanId, StoreError> {
    FanId::try_from(fan_id).map_err(|_| StoreError::CorruptRecord(format!("fan_id fuera de rango: {fan_id}")))
}


fn parse_sensor(sensor_type: &str) -> Result<SensorType, StoreError> {
    sensor_type.parse::<SensorType>().map_err(|e| StoreError::CorruptRecord(e.to_string()))
}


fn parse_severity(status: &str) -> Result<Severity, StoreError> {
    match status {
        "Warning" => Ok(Severity::Warning),
        "Critical" => Ok(Severity::Critical),
        other => Err(StoreError::CorruptRecord(format!("estado de alerta desconocido: {other}"))),
    }
}


impl TryFrom<SensorDataRow> for Reading {
    type Error = StoreError;

    fn try_from(row: SensorDataRow) -> Result<Self, Self::Error> {
        Ok(Reading {
            fan_id: parse_fan(row.fan_id)?,
            sensor_type: parse_sensor(&row.sensor_type)?,
            value: row.value,
            unit: row.unit,
            timestamp: row.timestamp,
        })
    }
}


impl TryFrom<ThresholdRow> for Threshold {
    type Error = StoreError;

    fn try_from(row: ThresholdRow) -> Result<Self, Self::Error> {
        Ok(Threshold {
            fan_id: parse_fan(row.fan_id)?,
            sensor_type: parse_sensor(&row.sensor_type)?,
            value: row.value,
            unit: row.unit,
        })
    }
}


impl TryFrom<AlertLogRow> for AlertLogEntry {
    type Error = StoreError;

    fn try_from(row: AlertLogRow) -> Result<Self, Self::Error> {
        Ok(AlertLogEntry {
            id: row.id,
            fan_id: parse_fan(row.fan_id)?,
            fan_name: row.fan_name,
            sensor_type: parse_sensor(&row.sensor_type)?,
            value: row.value,
            threshold: row.threshold,
            unit: row.unit,
            status: parse_severity(&row.status)?,
            timestamp: row.timestamp,
        })
    }
}
