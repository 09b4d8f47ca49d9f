//! Estados derivados de ventiladores y del sistema.
//!
//! Ninguno de estos valores se persiste: se recalculan a partir de las lecturas y
//! umbrales vigentes cada vez que alguno de los dos cambia.


use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::config::fans::IDS;
use crate::sensor::domain::FanId;


/// Severidad de una violación de umbral. `Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Critical,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FanStatus {
    Operational,
    Warning,
    Critical,
    Offline,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemStatus {
    Online,
    Warning,
    Critical,
    Offline,
}


impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
        }
    }
}


impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


impl fmt::Display for FanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FanStatus::Operational => "Operational",
            FanStatus::Warning => "Warning",
            FanStatus::Critical => "Critical",
            FanStatus::Offline => "Offline",
        };
        f.write_str(text)
    }
}


impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SystemStatus::Online => "Online",
            SystemStatus::Warning => "Warning",
            SystemStatus::Critical => "Critical",
            SystemStatus::Offline => "Offline",
        };
        f.write_str(text)
    }
}


/// Resultado de una evaluación: estado por ventilador y estado agregado.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub fans: BTreeMap<FanId, FanStatus>,
    pub system: SystemStatus,
}


impl StatusReport {
    /// Todos los ventiladores y el sistema en `Offline`.
    pub fn offline() -> Self {
        Self {
            fans: IDS.into_iter().map(|fan_id| (fan_id, FanStatus::Offline)).collect(),
            system: SystemStatus::Offline,
        }
    }

    pub fn fan(&self, fan_id: FanId) -> FanStatus {
        self.fans.get(&fan_id).copied().unwrap_or(FanStatus::Offline)
    }
}


impl Default for StatusReport {
    fn default() -> Self {
        Self::offline()
    }
}
