//! Perfiles del generador de lecturas simuladas.
//!
//! Cada `(ventilador, sensor)` produce `base + U(0, spread)`. Las bases de los dos
//! ventiladores difieren un poco para que la demo no muestre valores idénticos.


use chrono::{DateTime, Utc};
use rand::Rng;
use crate::sensor::domain::{FanId, Reading, SensorType};
use crate::config::fans::IDS;


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile {
    pub base: f64,
    pub spread: f64,
}


impl Profile {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.base + rng.gen_range(0.0..self.spread)
    }
}


pub fn profile(fan_id: FanId, sensor_type: SensorType) -> Profile {
    let second = fan_id != 1;
    match sensor_type {
        SensorType::Temperature => Profile { base: if second { 29.0 } else { 28.0 }, spread: 4.0 },
        SensorType::Humidity => Profile { base: if second { 50.0 } else { 45.0 }, spread: 15.0 },
        SensorType::Vibration => Profile { base: if second { 1.5 } else { 1.0 }, spread: 2.0 },
        SensorType::Gas if second => Profile { base: 100.0, spread: 70.0 },
        SensorType::Gas => Profile { base: 80.0, spread: 60.0 },
    }
}


/// Un lote completo: una lectura por cada sensor de cada ventilador, con el mismo instante.
pub fn generate_batch<R: Rng>(rng: &mut R, timestamp: DateTime<Utc>) -> Vec<Reading> {
    IDS.iter()
        .flat_map(|&fan_id| SensorType::ALL.into_iter().map(move |sensor_type| (fan_id, sensor_type)))
        .map(|(fan_id, sensor_type)| Reading {
            fan_id,
            sensor_type,
            value: profile(fan_id, sensor_type).sample(rng),
            unit: sensor_type.unit().to_string(),
            timestamp,
        })
        .collect()
}
