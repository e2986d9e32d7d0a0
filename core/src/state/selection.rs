use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::prelude::{CoreError, CoreResult, ModelId};

/// Membership set of active models. Carries no ordering semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    active: BTreeSet<ModelId>,
}

impl SelectionState {
    pub fn contains(&self, id: &str) -> bool {
        self.active.contains(id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelId> {
        self.active.iter()
    }
}

/// Selection rules over a fixed set of known model ids.
///
/// Every operation is pure: it takes the current state and returns the next
/// one, so the owner of the state stays the single writer.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    known: Vec<ModelId>,
    default_count: usize,
}

impl SelectionStore {
    /// `known` is in input order; `reset` selects its first `default_count`.
    pub fn new(known: Vec<ModelId>, default_count: usize) -> Self {
        Self {
            known,
            default_count,
        }
    }

    pub fn known(&self) -> &[ModelId] {
        &self.known
    }

    pub fn initial(&self) -> SelectionState {
        self.reset()
    }

    pub fn toggle(&self, state: &SelectionState, id: &str) -> CoreResult<SelectionState> {
        let active = !state.contains(id);
        self.set_active(state, id, active)
    }

    pub fn set_active(
        &self,
        state: &SelectionState,
        id: &str,
        active: bool,
    ) -> CoreResult<SelectionState> {
        let id = self.ensure_known(id)?;
        let mut next = state.clone();
        if active {
            next.active.insert(id.clone());
        } else {
            next.active.remove(id);
        }
        Ok(next)
    }

    pub fn select_all(&self) -> SelectionState {
        SelectionState {
            active: self.known.iter().cloned().collect(),
        }
    }

    pub fn select_none(&self) -> SelectionState {
        SelectionState::default()
    }

    /// Clears a full selection, otherwise fills it.
    pub fn toggle_all(&self, state: &SelectionState) -> SelectionState {
        if self.is_all_selected(state) {
            self.select_none()
        } else {
            self.select_all()
        }
    }

    pub fn reset(&self) -> SelectionState {
        SelectionState {
            active: self.known.iter().take(self.default_count).cloned().collect(),
        }
    }

    pub fn is_all_selected(&self, state: &SelectionState) -> bool {
        state.len() == self.known.len()
    }

    fn ensure_known(&self, id: &str) -> CoreResult<&ModelId> {
        self.known
            .iter()
            .find(|known| known.as_str() == id)
            .ok_or_else(|| CoreError::InvalidModelId(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SelectionStore {
        SelectionStore::new(
            vec!["lr".into(), "rf".into(), "lstm".into(), "prophet".into(), "xgb".into()],
            3,
        )
    }

    #[test]
    fn reset_selects_first_models_in_input_order() {
        let state = store().reset();
        assert_eq!(state.len(), 3);
        assert!(state.contains("lr") && state.contains("rf") && state.contains("lstm"));
        assert!(!state.contains("xgb"));
    }

    #[test]
    fn reset_clamps_to_model_count() {
        let store = SelectionStore::new(vec!["only".into()], 3);
        assert_eq!(store.reset().len(), 1);
    }

    #[test]
    fn toggle_flips_membership() {
        let store = store();
        let state = store.reset();
        let off = store.toggle(&state, "lr").unwrap();
        assert!(!off.contains("lr"));
        let on = store.toggle(&off, "lr").unwrap();
        assert_eq!(on, state);
    }

    #[test]
    fn toggle_rejects_unknown_id() {
        let store = store();
        let err = store.toggle(&store.reset(), "arima").unwrap_err();
        assert_eq!(err, CoreError::InvalidModelId("arima".into()));
    }

    #[test]
    fn toggle_all_twice_restores_full_and_empty_selection() {
        let store = store();
        for start in [store.select_all(), store.select_none()] {
            let twice = store.toggle_all(&store.toggle_all(&start));
            assert_eq!(twice, start);
        }
    }

    #[test]
    fn toggle_all_fills_partial_selection() {
        let store = store();
        let filled = store.toggle_all(&store.reset());
        assert!(store.is_all_selected(&filled));
        assert!(store.toggle_all(&filled).is_empty());
    }

    #[test]
    fn set_active_is_idempotent() {
        let store = store();
        let state = store.select_none();
        let once = store.set_active(&state, "xgb", true).unwrap();
        let twice = store.set_active(&once, "xgb", true).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }
}
