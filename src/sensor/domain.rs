//! Dominio de Sensores y Umbrales.
//!
//! Define los tipos de sensores instalados en cada ventilador, su metadata estática
//! (unidad, nombre, modelo, icono, límites de edición) y las tablas `(ventilador, sensor)`
//! que contienen la última lectura y el umbral activo de cada combinación.


use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::config::fans::IDS;


/// Identificador numérico de un ventilador (1 o 2).
pub type FanId = u8;


/// Nombre visible del ventilador (ej. `Fan 1`).
pub fn fan_name(fan_id: FanId) -> String {
    format!("Fan {fan_id}")
}


/// Tipos de sensores instalados en cada ventilador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorType {
    Temperature,
    Humidity,
    Vibration,
    Gas,
}


/// Rango y paso de edición de un umbral, junto a su valor por defecto.
///
/// `min`, `max` y `step` son metadata para la interfaz de configuración; el evaluador
/// nunca los aplica.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdLimits {
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}


impl ThresholdLimits {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}


#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("tipo de sensor desconocido: {0}")]
pub struct UnknownSensorType(pub String);


impl SensorType {
    pub const ALL: [SensorType; 4] = [
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::Vibration,
        SensorType::Gas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::Vibration => "vibration",
            SensorType::Gas => "gas",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorType::Temperature => "°C",
            SensorType::Humidity => "%",
            SensorType::Vibration => "g",
            SensorType::Gas => "ppm",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SensorType::Temperature => "Temperature",
            SensorType::Humidity => "Humidity",
            SensorType::Vibration => "Vibration",
            SensorType::Gas => "Gas Level",
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            SensorType::Temperature | SensorType::Humidity => "DHT22 Sensor",
            SensorType::Vibration => "SW240 Sensor",
            SensorType::Gas => "MQ135 Sensor",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SensorType::Temperature => "device_thermostat",
            SensorType::Humidity => "water_drop",
            SensorType::Vibration => "vibration",
            SensorType::Gas => "air",
        }
    }

    pub fn limits(&self) -> ThresholdLimits {
        match self {
            SensorType::Temperature => ThresholdLimits { default: 35.0, min: 20.0, max: 50.0, step: 0.5 },
            SensorType::Humidity => ThresholdLimits { default: 70.0, min: 30.0, max: 90.0, step: 1.0 },
            SensorType::Vibration => ThresholdLimits { default: 4.0, min: 0.5, max: 10.0, step: 0.1 },
            SensorType::Gas => ThresholdLimits { default: 150.0, min: 50.0, max: 300.0, step: 5.0 },
        }
    }
}


impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


impl FromStr for SensorType {
    type Err = UnknownSensorType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorType::ALL
            .into_iter()
            .find(|sensor| sensor.as_str() == s)
            .ok_or_else(|| UnknownSensorType(s.to_string()))
    }
}


/// Última lectura conocida de un sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub fan_id: FanId,
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}


/// Umbral activo para un sensor de un ventilador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub fan_id: FanId,
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: String,
}


impl Threshold {
    pub fn new(fan_id: FanId, sensor_type: SensorType, value: f64) -> Self {
        Self { fan_id, sensor_type, value, unit: sensor_type.unit().to_string() }
    }

    pub fn default_for(fan_id: FanId, sensor_type: SensorType) -> Self {
        Self::new(fan_id, sensor_type, sensor_type.limits().default)
    }
}


/// Elementos indexables por `(ventilador, sensor)`.
pub trait SensorKeyed {
    fn fan_id(&self) -> FanId;
    fn sensor_type(&self) -> SensorType;
}


impl SensorKeyed for Reading {
    fn fan_id(&self) -> FanId { self.fan_id }
    fn sensor_type(&self) -> SensorType { self.sensor_type }
}


impl SensorKeyed for Threshold {
    fn fan_id(&self) -> FanId { self.fan_id }
    fn sensor_type(&self) -> SensorType { self.sensor_type }
}


/// Tabla `ventilador -> sensor -> T` con semántica de último valor.
///
/// Cada inserción reemplaza al elemento previo con la misma clave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorTable<T> {
    fans: BTreeMap<FanId, BTreeMap<SensorType, T>>,
}


pub type ReadingSet = SensorTable<Reading>;
pub type ThresholdSet = SensorTable<Threshold>;


impl<T> Default for SensorTable<T> {
    fn default() -> Self {
        Self { fans: BTreeMap::new() }
    }
}


impl<T> SensorTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fan_id: FanId, sensor_type: SensorType) -> Option<&T> {
        self.fans.get(&fan_id).and_then(|sensors| sensors.get(&sensor_type))
    }

    /// Sensores de un ventilador; `None` si el ventilador no tiene ningún elemento.
    pub fn fan(&self, fan_id: FanId) -> Option<&BTreeMap<SensorType, T>> {
        self.fans.get(&fan_id).filter(|sensors| !sensors.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fans.values().all(BTreeMap::is_empty)
    }

    pub fn len(&self) -> usize {
        self.fans.values().map(BTreeMap::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.fans.values().flat_map(BTreeMap::values)
    }

    /// Combinaciones `(ventilador, sensor)` monitoreadas que no tienen elemento.
    pub fn missing(&self) -> Vec<(FanId, SensorType)> {
        IDS.into_iter()
            .flat_map(|fan_id| SensorType::ALL.into_iter().map(move |sensor| (fan_id, sensor)))
            .filter(|(fan_id, sensor)| self.get(*fan_id, *sensor).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}


impl<T: SensorKeyed> SensorTable<T> {
    pub fn upsert(&mut self, item: T) -> Option<T> {
        self.fans
            .entry(item.fan_id())
            .or_default()
            .insert(item.sensor_type(), item)
    }
}


impl<T: SensorKeyed + Clone> SensorTable<T> {
    /// Copia restringida a un único ventilador.
    pub fn only_fan(&self, fan_id: FanId) -> Self {
        self.fan(fan_id)
            .map(|sensors| sensors.values().cloned().collect())
            .unwrap_or_default()
    }
}


impl<T: SensorKeyed> FromIterator<T> for SensorTable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = Self::new();
        for item in iter {
            table.upsert(item);
        }
        table
    }
}


impl ThresholdSet {
    /// Conjunto de umbrales por defecto para todos los ventiladores y sensores.
    pub fn defaults() -> Self {
        IDS.into_iter()
            .flat_map(|fan_id| {
                SensorType::ALL.into_iter().map(move |sensor| Threshold::default_for(fan_id, sensor))
            })
            .collect()
    }
}
