use crate::config::WidgetConfig;
use crate::controller::InteractionController;
use crate::engine::{SubmissionEngine, SubmitPhase};
use crate::events::{EffectReceiver, UiEvent};
use crate::payload::PageContext;
use crate::transport::{self, CallbackTransport, SubmitTransport};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Facade tying the interaction controller and submission engine together.
///
/// Construction hands back the effect receiver; the host applies those
/// effects to its view and feeds [`UiEvent`]s in. Dropping the receiver is
/// teardown; the widget keeps working but its effects go nowhere.
///
/// Cloning is cheap and shares state, so hosts can keep a handle for the
/// programmatic `open`/`close` surface while another drives events.
#[derive(Clone)]
pub struct ChatWidget {
    config: Arc<WidgetConfig>,
    controller: InteractionController,
    engine: SubmissionEngine,
}

impl ChatWidget {
    /// Build a widget with the transport its configuration calls for:
    /// the webhook endpoint when one is set, otherwise the logging fallback.
    pub fn new(config: WidgetConfig, page: PageContext) -> (Self, EffectReceiver) {
        let transport = transport::for_config(&config, None);
        Self::with_transport(config, transport, page)
    }

    /// Build a widget whose submissions go to a caller-supplied callback.
    pub fn with_callback(
        config: WidgetConfig,
        callback: CallbackTransport,
        page: PageContext,
    ) -> (Self, EffectReceiver) {
        Self::with_transport(config, Arc::new(callback), page)
    }

    pub fn with_transport(
        config: WidgetConfig,
        transport: Arc<dyn SubmitTransport>,
        page: PageContext,
    ) -> (Self, EffectReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = InteractionController::new(tx.clone());
        let engine = SubmissionEngine::new(
            transport,
            config.panel.clone(),
            page,
            controller.clone(),
            tx,
        );
        (
            Self {
                config: Arc::new(config),
                controller,
                engine,
            },
            rx,
        )
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub async fn handle_event(&self, event: UiEvent) {
        match event {
            UiEvent::LauncherPressed => self.controller.toggle(),
            UiEvent::CloseRequested | UiEvent::EscapePressed => self.controller.close(),
            UiEvent::PointerDown { inside: false } => self.controller.close(),
            // clicks inside the widget never dismiss it
            UiEvent::PointerDown { inside: true } => {}
            UiEvent::FieldEdited(field) => self.controller.field_edited(field),
            UiEvent::FieldBlurred(field, value) => self.controller.field_blurred(field, &value),
            UiEvent::SubmitPressed(fields) => self.engine.submit(fields).await,
        }
    }

    // Minimal programmatic control surface for the embedding page.

    pub fn open(&self) {
        self.controller.open();
    }

    pub fn close(&self) {
        self.controller.close();
    }

    pub fn is_open(&self) -> bool {
        self.controller.is_open()
    }

    pub fn phase(&self) -> SubmitPhase {
        self.engine.phase()
    }
}
