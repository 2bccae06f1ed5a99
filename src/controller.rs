use crate::events::{Effect, EffectSender};
use crate::form::{Field, field_is_valid};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Owns the popup's open/closed state and the per-field validity flags.
/// All transitions are idempotent; closing a closed popup emits nothing.
#[derive(Clone)]
pub struct InteractionController {
    inner: Arc<Inner>,
}

struct Inner {
    effects: EffectSender,
    state: Mutex<UiState>,
}

#[derive(Default)]
struct UiState {
    open: bool,
    invalid: HashSet<Field>,
}

impl InteractionController {
    pub(crate) fn new(effects: EffectSender) -> Self {
        Self {
            inner: Arc::new(Inner {
                effects,
                state: Mutex::new(UiState::default()),
            }),
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.state.lock().unwrap().open
    }

    /// Launcher press: flip the popup; focus lands on the name field when it
    /// opens.
    pub fn toggle(&self) {
        let now_open = {
            let mut state = self.inner.state.lock().unwrap();
            state.open = !state.open;
            state.open
        };
        self.emit(Effect::OpenChanged(now_open));
        if now_open {
            self.emit(Effect::FocusField(Field::Name));
        }
    }

    pub fn open(&self) {
        let changed = {
            let mut state = self.inner.state.lock().unwrap();
            !std::mem::replace(&mut state.open, true)
        };
        if changed {
            self.emit(Effect::OpenChanged(true));
            self.emit(Effect::FocusField(Field::Name));
        }
    }

    /// Close control, Escape, and outside-click all land here.
    pub fn close(&self) {
        let changed = {
            let mut state = self.inner.state.lock().unwrap();
            std::mem::replace(&mut state.open, false)
        };
        if changed {
            self.emit(Effect::OpenChanged(false));
        }
    }

    /// Editing clears the field's error mark immediately. Re-validation only
    /// happens on the next blur or submit.
    pub(crate) fn field_edited(&self, field: Field) {
        let cleared = self.inner.state.lock().unwrap().invalid.remove(&field);
        if cleared {
            self.emit(Effect::FieldValidity { field, valid: true });
        }
    }

    pub(crate) fn field_blurred(&self, field: Field, value: &str) {
        let valid = field_is_valid(field, value);
        self.mark_validity(field, valid);
    }

    /// Record a field's validity, emitting only on change.
    pub(crate) fn mark_validity(&self, field: Field, valid: bool) {
        let changed = {
            let mut state = self.inner.state.lock().unwrap();
            if valid {
                state.invalid.remove(&field)
            } else {
                state.invalid.insert(field)
            }
        };
        if changed {
            debug!(?field, valid, "field validity changed");
            self.emit(Effect::FieldValidity { field, valid });
        }
    }

    /// Forget all error flags without emitting; used when the form resets
    /// (the reset effect already implies clean fields).
    pub(crate) fn reset_validity(&self) {
        self.inner.state.lock().unwrap().invalid.clear();
    }

    fn emit(&self, effect: Effect) {
        // a dropped receiver means the host tore the widget down
        let _ = self.inner.effects.send(effect);
    }
}
