//! Evaluador de estados.
//!
//! Funciones puras `(lecturas, umbrales) -> estados`. No guardan historia: el mismo
//! par de conjuntos produce siempre el mismo `StatusReport`.


use std::collections::BTreeMap;
use crate::config::evaluation::CRITICAL_RATIO;
use crate::config::fans::IDS;
use crate::sensor::domain::{FanId, ReadingSet, SensorType, ThresholdSet};
use super::domain::{FanStatus, Severity, StatusReport, SystemStatus};


/// Clasifica una lectura contra su umbral.
///
/// * `None`: la lectura está por debajo del umbral.
/// * `Warning`: lectura `>=` umbral y `lectura / umbral <= 1.1`.
/// * `Critical`: `lectura / umbral > 1.1`.
pub fn severity(value: f64, threshold: f64) -> Option<Severity> {
    if value < threshold {
        return None;
    }
    if value / threshold > CRITICAL_RATIO {
        Some(Severity::Critical)
    } else {
        Some(Severity::Warning)
    }
}


/// Estado de un ventilador.
///
/// Sin lecturas el ventilador está `Offline`. Los sensores sin lectura o sin umbral se
/// ignoran. Un sensor `Critical` corta la evaluación; un `Warning` deja seguir por si
/// otro sensor escala.
pub fn evaluate_fan(fan_id: FanId, readings: &ReadingSet, thresholds: &ThresholdSet) -> FanStatus {
    let Some(sensors) = readings.fan(fan_id) else {
        return FanStatus::Offline;
    };

    let mut status = FanStatus::Operational;

    for sensor_type in SensorType::ALL {
        let (Some(reading), Some(threshold)) = (sensors.get(&sensor_type), thresholds.get(fan_id, sensor_type)) else {
            continue;
        };

        match severity(reading.value, threshold.value) {
            Some(Severity::Critical) => return FanStatus::Critical,
            Some(Severity::Warning) => status = FanStatus::Warning,
            None => {}
        }
    }

    status
}


/// Agrega los estados de los ventiladores.
///
/// Precedencia: `Critical` > `Warning` > todos `Operational` (`Online`) > `Offline`.
pub fn evaluate_system(fans: &BTreeMap<FanId, FanStatus>) -> SystemStatus {
    let status_of = |fan_id: FanId| fans.get(&fan_id).copied().unwrap_or(FanStatus::Offline);

    if IDS.iter().any(|id| status_of(*id) == FanStatus::Critical) {
        SystemStatus::Critical
    } else if IDS.iter().any(|id| status_of(*id) == FanStatus::Warning) {
        SystemStatus::Warning
    } else if IDS.iter().all(|id| status_of(*id) == FanStatus::Operational) {
        SystemStatus::Online
    } else {
        SystemStatus::Offline
    }
}


/// Evalúa todos los ventiladores y el sistema.
///
/// Mientras no haya lecturas o no se hayan cargado umbrales no se evalúa nada y todo
/// queda `Offline`.
pub fn evaluate(readings: &ReadingSet, thresholds: &ThresholdSet) -> StatusReport {
    if readings.is_empty() || thresholds.is_empty() {
        return StatusReport::offline();
    }

    let fans: BTreeMap<FanId, FanStatus> = IDS
        .into_iter()
        .map(|fan_id| (fan_id, evaluate_fan(fan_id, readings, thresholds)))
        .collect();
    let system = evaluate_system(&fans);

    StatusReport { fans, system }
}


#[cfg(test)]
mod tests {
    use chrono::Utc;
    use crate::sensor::domain::{Reading, Threshold};
    use super::*;

    fn reading(fan_id: FanId, sensor_type: SensorType, value: f64) -> Reading {
        Reading {
            fan_id,
            sensor_type,
            value,
            unit: sensor_type.unit().to_string(),
            timestamp: Utc::now(),
        }
    }

    fn nominal(fan_id: FanId) -> Vec<Reading> {
        vec![
            reading(fan_id, SensorType::Temperature, 30.0),
            reading(fan_id, SensorType::Humidity, 50.0),
            reading(fan_id, SensorType::Vibration, 2.0),
            reading(fan_id, SensorType::Gas, 100.0),
        ]
    }

    fn with(mut base: Vec<Reading>, extra: Reading) -> ReadingSet {
        base.retain(|r| !(r.fan_id == extra.fan_id && r.sensor_type == extra.sensor_type));
        base.push(extra);
        base.into_iter().collect()
    }

    #[test]
    fn fan_without_readings_is_offline() {
        let readings: ReadingSet = nominal(1).into_iter().collect();
        let report = evaluate(&readings, &ThresholdSet::defaults());
        assert_eq!(report.fan(1), FanStatus::Operational);
        assert_eq!(report.fan(2), FanStatus::Offline);
        assert_eq!(report.system, SystemStatus::Offline);
    }

    #[test]
    fn readings_below_threshold_are_operational() {
        let readings: ReadingSet = nominal(1).into_iter().chain(nominal(2)).collect();
        let report = evaluate(&readings, &ThresholdSet::defaults());
        assert_eq!(report.fan(1), FanStatus::Operational);
        assert_eq!(report.fan(2), FanStatus::Operational);
        assert_eq!(report.system, SystemStatus::Online);
    }

    #[test]
    fn temperature_38_is_warning_and_39_5_is_critical() {
        let thresholds = ThresholdSet::defaults();

        let warning = with(nominal(1), reading(1, SensorType::Temperature, 38.0));
        assert_eq!(evaluate_fan(1, &warning, &thresholds), FanStatus::Warning);

        let critical = with(nominal(1), reading(1, SensorType::Temperature, 39.5));
        assert_eq!(evaluate_fan(1, &critical, &thresholds), FanStatus::Critical);
    }

    #[test]
    fn reading_equal_to_threshold_is_warning() {
        let readings = with(nominal(1), reading(1, SensorType::Gas, 150.0));
        assert_eq!(evaluate_fan(1, &readings, &ThresholdSet::defaults()), FanStatus::Warning);
    }

    #[test]
    fn later_sensor_escalates_warning_to_critical() {
        let mut base = nominal(1);
        base.retain(|r| r.sensor_type != SensorType::Temperature && r.sensor_type != SensorType::Gas);
        base.push(reading(1, SensorType::Temperature, 36.0));
        let readings = with(base, reading(1, SensorType::Gas, 200.0));
        assert_eq!(evaluate_fan(1, &readings, &ThresholdSet::defaults()), FanStatus::Critical);
    }

    #[test]
    fn critical_wins_over_later_warning() {
        let mut base = nominal(1);
        base.retain(|r| r.sensor_type != SensorType::Temperature);
        base.push(reading(1, SensorType::Temperature, 45.0));
        let readings = with(base, reading(1, SensorType::Gas, 151.0));
        assert_eq!(evaluate_fan(1, &readings, &ThresholdSet::defaults()), FanStatus::Critical);
    }

    #[test]
    fn missing_sensor_is_skipped() {
        let mut fan_two = nominal(2);
        fan_two.retain(|r| r.sensor_type != SensorType::Vibration);
        let readings: ReadingSet = nominal(1).into_iter().chain(fan_two).collect();
        assert_eq!(evaluate_fan(2, &readings, &ThresholdSet::defaults()), FanStatus::Operational);
    }

    #[test]
    fn missing_threshold_is_skipped() {
        let readings = with(nominal(1), reading(1, SensorType::Gas, 290.0));
        let thresholds: ThresholdSet = ThresholdSet::defaults()
            .iter()
            .filter(|t| !(t.fan_id == 1 && t.sensor_type == SensorType::Gas))
            .cloned()
            .collect();
        assert_eq!(evaluate_fan(1, &readings, &thresholds), FanStatus::Operational);
    }

    #[test]
    fn empty_thresholds_leave_everything_offline() {
        let readings: ReadingSet = nominal(1).into_iter().chain(nominal(2)).collect();
        assert_eq!(evaluate(&readings, &ThresholdSet::new()), StatusReport::offline());
    }

    #[test]
    fn system_precedence() {
        let fans = |a, b| BTreeMap::from([(1, a), (2, b)]);
        assert_eq!(evaluate_system(&fans(FanStatus::Critical, FanStatus::Offline)), SystemStatus::Critical);
        assert_eq!(evaluate_system(&fans(FanStatus::Warning, FanStatus::Critical)), SystemStatus::Critical);
        assert_eq!(evaluate_system(&fans(FanStatus::Warning, FanStatus::Offline)), SystemStatus::Warning);
        assert_eq!(evaluate_system(&fans(FanStatus::Operational, FanStatus::Operational)), SystemStatus::Online);
        assert_eq!(evaluate_system(&fans(FanStatus::Operational, FanStatus::Offline)), SystemStatus::Offline);
    }

    #[test]
    fn custom_threshold_changes_classification() {
        let readings = with(nominal(1), reading(1, SensorType::Temperature, 38.0));
        let mut thresholds = ThresholdSet::defaults();
        thresholds.upsert(Threshold::new(1, SensorType::Temperature, 40.0));
        assert_eq!(evaluate_fan(1, &readings, &thresholds), FanStatus::Operational);
    }
}
