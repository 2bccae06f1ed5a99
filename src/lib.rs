//! Headless core for an embeddable chat/lead-capture widget.
//!
//! The crate models the widget's behavior (configuration resolution, field
//! validation, the submit state machine, and a pluggable delivery transport)
//! without touching a DOM. A frontend (WASM shell, demo page, native host)
//! feeds [`UiEvent`]s in and applies the [`Effect`] stream to its own view.
//!
//! ```no_run
//! use chat_widget::{ChatWidget, FormFields, PageContext, UiEvent, WidgetConfig, WidgetOverrides};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WidgetConfig::resolve(WidgetOverrides {
//!     title: Some("Talk to Jane".into()),
//!     endpoint_url: Some("https://hooks.example.com/lead".into()),
//!     ..Default::default()
//! })?;
//! let (widget, mut effects) = ChatWidget::new(config, PageContext::default());
//!
//! widget.handle_event(UiEvent::LauncherPressed).await;
//! widget
//!     .handle_event(UiEvent::SubmitPressed(FormFields {
//!         name: "Ada Lovelace".into(),
//!         phone: "(555) 123-4567".into(),
//!         message: "Hello!".into(),
//!     }))
//!     .await;
//! while let Some(effect) = effects.recv().await {
//!     // apply to the host view
//!     let _ = effect;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod engine;
pub mod events;
pub mod form;
pub mod payload;
pub mod render;
pub mod transport;
pub mod widget;

pub use config::{ConfigError, PanelPolicy, Position, WidgetConfig, WidgetOverrides};
pub use controller::InteractionController;
pub use engine::{SubmissionEngine, SubmitPhase};
pub use events::{Effect, EffectReceiver, Panel, PanelKind, UiEvent};
pub use form::{Field, FormFields, ValidatedLead};
pub use payload::{LeadPayload, PageContext};
pub use transport::{
    CallbackTransport, NullTransport, SubmitTransport, TransportError, WebhookTransport,
};
pub use widget::ChatWidget;
