//! Política del historial de alertas.
//!
//! Solo se agregan entradas o se borra todo; nunca se edita ni se elimina una entrada
//! suelta. Los identificadores crecen con cada inserción y no se reutilizan tras un
//! borrado completo.


use std::cmp::Ordering;
use super::domain::{AlertId, AlertLogEntry, NewAlert};


#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    entries: Vec<AlertLogEntry>,
    last_id: AlertId,
}


/// Orden de presentación: marca de tiempo más reciente primero; a igual marca, la
/// inserción más reciente primero.
pub fn newest_first(a: &AlertLogEntry, b: &AlertLogEntry) -> Ordering {
    b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id))
}


impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, alert: NewAlert) -> AlertId {
        self.last_id += 1;
        self.entries.push(alert.into_entry(self.last_id));
        self.last_id
    }

    pub fn list(&self) -> Vec<AlertLogEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(newest_first);
        entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
