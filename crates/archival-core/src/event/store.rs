use std::collections::HashMap;

use archival_domain::Night;
use chrono::Utc;
use uuid::Uuid;

use super::{RunEvent, RunEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent;
    /// Lista eventos de una ejecución (orden ascendente por seq).
    fn list(&self, run_id: Uuid) -> Vec<RunEvent>;
    /// Ejecuciones conocidas, en orden de primera aparición.
    fn run_ids(&self) -> Vec<Uuid>;

    /// Última ejecución iniciada para `night`, si la hay.
    fn latest_run_for(&self, night: &Night) -> Option<Uuid> {
        self.run_ids()
            .into_iter()
            .rev()
            .find(|id| {
                self.list(*id)
                    .iter()
                    .any(|e| matches!(&e.kind, RunEventKind::RunInitialized { night: n, .. } if n == night))
            })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: HashMap<Uuid, Vec<RunEvent>>,
    order: Vec<Uuid>,
}

impl InMemoryEventStore {
    /// Inserta un evento ya formado (seq y ts incluidos). Lo usan stores
    /// durables al recargar su contenido.
    pub fn insert_existing(&mut self, event: RunEvent) {
        if !self.inner.contains_key(&event.run_id) {
            self.order.push(event.run_id);
        }
        self.inner.entry(event.run_id).or_default().push(event);
    }
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent {
        if !self.inner.contains_key(&run_id) {
            self.order.push(run_id);
        }
        let vec = self.inner.entry(run_id).or_default();
        let seq = vec.len() as u64;
        let ev = RunEvent { seq,
                            run_id,
                            kind,
                            ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.inner.get(&run_id).cloned().unwrap_or_default()
    }

    fn run_ids(&self) -> Vec<Uuid> {
        self.order.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(store: &mut InMemoryEventStore, night: &str) -> Uuid {
        let run_id = Uuid::new_v4();
        store.append_kind(run_id,
                          RunEventKind::RunInitialized { night: Night::parse(night).unwrap(),
                                                         plan_hash: "h".into(),
                                                         config_path: "fink.conf".into(),
                                                         jobs: Vec::new(),
                                                         rerun_of: None });
        run_id
    }

    #[test]
    fn latest_run_for_picks_last_run_of_that_night() {
        let mut store = InMemoryEventStore::default();
        let first = init(&mut store, "19881103");
        let other = init(&mut store, "19881104");
        let second = init(&mut store, "19881103");

        assert_eq!(store.run_ids(), vec![first, other, second]);
        assert_eq!(store.latest_run_for(&Night::parse("19881103").unwrap()), Some(second));
        assert_eq!(store.latest_run_for(&Night::parse("19881104").unwrap()), Some(other));
        assert_eq!(store.latest_run_for(&Night::parse("19881105").unwrap()), None);
    }
}
