use crate::form::{Field, FormFields};

/// Input the embedding frontend feeds into the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The floating launcher button was pressed; toggles the popup.
    LauncherPressed,
    /// The popup's own close control was pressed.
    CloseRequested,
    /// A pointer-down anywhere on the page; `inside` is whether the target
    /// sits within the widget's root element.
    PointerDown { inside: bool },
    EscapePressed,
    /// The visitor typed into a field; clears that field's error mark.
    FieldEdited(Field),
    /// Focus left a field; carries the value at blur time for re-validation.
    FieldBlurred(Field, String),
    /// The form was submitted with this input snapshot.
    SubmitPressed(FormFields),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Success,
    Failure,
}

/// Transient outcome region shown after a submission settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Success { name: String },
    Failure { message: String },
}

impl Panel {
    pub fn kind(&self) -> PanelKind {
        match self {
            Panel::Success { .. } => PanelKind::Success,
            Panel::Failure { .. } => PanelKind::Failure,
        }
    }
}

/// View mutations the widget asks its frontend to apply. The crate performs
/// no DOM work itself; a shell subscribes to these and patches its own tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenChanged(bool),
    FocusField(Field),
    FieldValidity { field: Field, valid: bool },
    /// Submit control disabled + spinner shown while a delivery is in flight.
    BusyChanged(bool),
    PanelShown(Panel),
    PanelHidden(PanelKind),
    FormReset,
}

pub(crate) type EffectSender = tokio::sync::mpsc::UnboundedSender<Effect>;
pub type EffectReceiver = tokio::sync::mpsc::UnboundedReceiver<Effect>;
