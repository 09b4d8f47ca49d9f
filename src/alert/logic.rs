//! Detector de alertas.
//!
//! Recuerda la última severidad observada por `(ventilador, sensor)` y solo emite una
//! alerta cuando la condición es nueva: el sensor cruza el umbral desde abajo o sube de
//! banda (`Warning -> Critical`). Volver a observar la misma condición en un refresco
//! periódico no genera entradas nuevas.


use std::collections::HashMap;
use chrono::{DateTime, Utc};
use crate::config::fans::IDS;
use crate::sensor::domain::{FanId, ReadingSet, SensorType, ThresholdSet};
use crate::status::domain::Severity;
use crate::status::logic::severity;
use super::domain::NewAlert;


#[derive(Debug, Default)]
pub struct AlertDetector {
    last: HashMap<(FanId, SensorType), Severity>,
}


impl AlertDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compara las lecturas con los umbrales y devuelve las alertas nuevas.
    ///
    /// Reglas por `(ventilador, sensor)`:
    /// * Sin lectura o sin umbral: se ignora y el estado recordado no cambia.
    /// * Por debajo del umbral: se olvida la severidad previa.
    /// * `Warning`/`Critical`: se emite si no había severidad previa o si la nueva es mayor.
    ///   Bajar de `Critical` a `Warning` no emite, pero se recuerda.
    pub fn detect(&mut self,
                  readings: &ReadingSet,
                  thresholds: &ThresholdSet,
                  now: DateTime<Utc>) -> Vec<NewAlert> {

        let mut alerts = Vec::new();

        for fan_id in IDS {
            for sensor_type in SensorType::ALL {
                let (Some(reading), Some(threshold)) = (readings.get(fan_id, sensor_type), thresholds.get(fan_id, sensor_type)) else {
                    continue;
                };

                let key = (fan_id, sensor_type);
                match severity(reading.value, threshold.value) {
                    None => {
                        self.last.remove(&key);
                    }
                    Some(current) => {
                        let previous = self.last.insert(key, current);
                        if previous.is_none_or(|prev| current > prev) {
                            alerts.push(NewAlert::snapshot(reading, threshold, current, now));
                        }
                    }
                }
            }
        }

        alerts
    }

    /// Severidad recordada para un sensor.
    pub fn last_severity(&self, fan_id: FanId, sensor_type: SensorType) -> Option<Severity> {
        self.last.get(&(fan_id, sensor_type)).copied()
    }
}


#[cfg(test)]
mod tests {
    use crate::sensor::domain::{Reading, Threshold};
    use super::*;

    fn readings(values: &[(FanId, SensorType, f64)]) -> ReadingSet {
        values.iter()
            .map(|(fan_id, sensor_type, value)| Reading {
                fan_id: *fan_id,
                sensor_type: *sensor_type,
                value: *value,
                unit: sensor_type.unit().to_string(),
                timestamp: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn crossing_the_threshold_emits_once() {
        let mut detector = AlertDetector::new();
        let thresholds = ThresholdSet::defaults();
        let hot = readings(&[(1, SensorType::Temperature, 38.0)]);

        let first = detector.detect(&hot, &thresholds, Utc::now());
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].status, Severity::Warning);
        assert_eq!(first[0].value, "38.00");

        assert!(detector.detect(&hot, &thresholds, Utc::now()).is_empty());
        assert!(detector.detect(&readings(&[(1, SensorType::Temperature, 37.0)]), &thresholds, Utc::now()).is_empty());
    }

    #[test]
    fn escalation_emits_critical() {
        let mut detector = AlertDetector::new();
        let thresholds = ThresholdSet::defaults();

        detector.detect(&readings(&[(1, SensorType::Temperature, 38.0)]), &thresholds, Utc::now());
        let escalated = detector.detect(&readings(&[(1, SensorType::Temperature, 39.5)]), &thresholds, Utc::now());
        assert_eq!(escalated.len(), 1);
        assert_eq!(escalated[0].status, Severity::Critical);
    }

    #[test]
    fn de_escalation_is_silent_but_remembered() {
        let mut detector = AlertDetector::new();
        let thresholds = ThresholdSet::defaults();

        detector.detect(&readings(&[(2, SensorType::Gas, 200.0)]), &thresholds, Utc::now());
        assert!(detector.detect(&readings(&[(2, SensorType::Gas, 155.0)]), &thresholds, Utc::now()).is_empty());
        assert_eq!(detector.last_severity(2, SensorType::Gas), Some(Severity::Warning));

        let again = detector.detect(&readings(&[(2, SensorType::Gas, 200.0)]), &thresholds, Utc::now());
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].status, Severity::Critical);
    }

    #[test]
    fn recovery_rearms_the_sensor() {
        let mut detector = AlertDetector::new();
        let thresholds = ThresholdSet::defaults();
        let hot = readings(&[(1, SensorType::Humidity, 75.0)]);

        assert_eq!(detector.detect(&hot, &thresholds, Utc::now()).len(), 1);
        assert!(detector.detect(&readings(&[(1, SensorType::Humidity, 60.0)]), &thresholds, Utc::now()).is_empty());
        assert_eq!(detector.last_severity(1, SensorType::Humidity), None);
        assert_eq!(detector.detect(&hot, &thresholds, Utc::now()).len(), 1);
    }

    #[test]
    fn threshold_edit_can_trigger_alert() {
        let mut detector = AlertDetector::new();
        let current = readings(&[(1, SensorType::Vibration, 3.5)]);

        assert!(detector.detect(&current, &ThresholdSet::defaults(), Utc::now()).is_empty());

        let mut lowered = ThresholdSet::defaults();
        lowered.upsert(Threshold::new(1, SensorType::Vibration, 3.0));
        let alerts = detector.detect(&current, &lowered, Utc::now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].threshold, "3.00");
        assert_eq!(alerts[0].status, Severity::Critical);
    }

    #[test]
    fn missing_threshold_keeps_state() {
        let mut detector = AlertDetector::new();
        let hot = readings(&[(1, SensorType::Temperature, 38.0)]);

        detector.detect(&hot, &ThresholdSet::defaults(), Utc::now());
        assert!(detector.detect(&hot, &ThresholdSet::new(), Utc::now()).is_empty());
        assert_eq!(detector.last_severity(1, SensorType::Temperature), Some(Severity::Warning));
        assert!(detector.detect(&hot, &ThresholdSet::defaults(), Utc::now()).is_empty());
    }

    #[test]
    fn sensors_are_tracked_independently() {
        let mut detector = AlertDetector::new();
        let thresholds = ThresholdSet::defaults();

        let alerts = detector.detect(&readings(&[
            (1, SensorType::Temperature, 38.0),
            (2, SensorType::Temperature, 38.0),
            (2, SensorType::Gas, 120.0),
        ]), &thresholds, Utc::now());
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().any(|a| a.fan_id == 1));
        assert!(alerts.iter().any(|a| a.fan_id == 2));
    }
}
