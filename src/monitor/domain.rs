//! Estado del monitor y mensajes de su bandeja de entrada.
//!
//! El monitor es el único dueño de `MonitorState`. Cada notificación del almacén llega
//! como un `Event`; tras aplicarlo se llama a `recompute`, función pura que produce la
//! foto que consume la presentación.


use std::collections::BTreeSet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::sensor::domain::{ReadingSet, ThresholdSet};
use crate::status::domain::StatusReport;
use crate::status::logic::evaluate;


/// Canal de notificación del almacén.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Feed {
    Readings,
    Thresholds,
}


/// Mensajes que procesa el monitor, uno a la vez y en orden de llegada.
#[derive(Debug, Clone)]
pub enum Event {
    Readings(ReadingSet),
    Thresholds(ThresholdSet),
    /// La suscripción a un canal se cayó; se reintenta por fuera del monitor.
    FeedLost(Feed),
}


impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Readings(_) => "readings",
            Event::Thresholds(_) => "thresholds",
            Event::FeedLost(_) => "feed_lost",
        }
    }
}


#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub readings: ReadingSet,
    pub thresholds: ThresholdSet,
    pub lost: BTreeSet<Feed>,
    pub readings_received: bool,
    pub thresholds_received: bool,
    pub last_updated: Option<DateTime<Utc>>,
}


impl MonitorState {
    pub fn apply(&mut self, event: Event, now: DateTime<Utc>) {
        match event {
            Event::Readings(readings) => {
                self.readings = readings;
                self.readings_received = true;
                self.last_updated = Some(now);
                self.lost.remove(&Feed::Readings);
            }
            Event::Thresholds(thresholds) => {
                self.thresholds = thresholds;
                self.thresholds_received = true;
                self.lost.remove(&Feed::Thresholds);
            }
            Event::FeedLost(feed) => {
                self.lost.insert(feed);
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.lost.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        !(self.readings_received && self.thresholds_received)
    }
}


/// Foto publicada para la presentación.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub status: StatusReport,
    pub readings: ReadingSet,
    pub thresholds: ThresholdSet,
    pub last_updated: Option<DateTime<Utc>>,
    pub is_loading: bool,
    pub degraded: bool,
}


/// Foto inicial: todavía no llegó ningún dato.
impl Default for DashboardSnapshot {
    fn default() -> Self {
        recompute(&MonitorState::default())
    }
}


/// Calcula la foto a partir del estado. Con algún canal caído todo se informa `Offline`.
pub fn recompute(state: &MonitorState) -> DashboardSnapshot {
    let degraded = state.is_degraded();
    let status = if degraded {
        StatusReport::offline()
    } else {
        evaluate(&state.readings, &state.thresholds)
    };

    DashboardSnapshot {
        status,
        readings: state.readings.clone(),
        thresholds: state.thresholds.clone(),
        last_updated: state.last_updated,
        is_loading: state.is_loading(),
        degraded,
    }
}
