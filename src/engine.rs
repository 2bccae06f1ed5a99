use crate::config::PanelPolicy;
use crate::controller::InteractionController;
use crate::events::{Effect, EffectSender, Panel, PanelKind};
use crate::form::{Field, FormFields};
use crate::payload::{LeadPayload, PageContext};
use crate::transport::SubmitTransport;
use std::sync::{Arc, Mutex};
use tokio::time::sleep;
use tracing::{Instrument, debug, error, info};
use uuid::Uuid;

/// Where a submission attempt currently stands. Validation is synchronous, so
/// an invalid submit never leaves `Idle`; `Success` and `Failure` hold until
/// their panel timer returns the engine to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
    Success,
    Failure,
}

/// Drives `Idle → (Invalid | Submitting) → (Success | Failure) → Idle` for
/// each form-submit event. At most one delivery is in flight; there is no
/// retry, cancellation, or widget-level timeout.
#[derive(Clone)]
pub struct SubmissionEngine {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn SubmitTransport>,
    policy: PanelPolicy,
    page: PageContext,
    controller: InteractionController,
    effects: EffectSender,
    state: Mutex<PhaseState>,
}

/// The epoch ties panel timers to the submission that spawned them: a timer
/// whose epoch no longer matches belongs to an earlier submission and must
/// not touch the phase or run its hide/reset choreography.
#[derive(Default)]
struct PhaseState {
    phase: SubmitPhase,
    epoch: u64,
}

impl SubmissionEngine {
    pub(crate) fn new(
        transport: Arc<dyn SubmitTransport>,
        policy: PanelPolicy,
        page: PageContext,
        controller: InteractionController,
        effects: EffectSender,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                policy,
                page,
                controller,
                effects,
                state: Mutex::new(PhaseState::default()),
            }),
        }
    }

    pub fn phase(&self) -> SubmitPhase {
        self.inner.state.lock().unwrap().phase
    }

    pub async fn submit(&self, fields: FormFields) {
        let (lead, epoch) = {
            let mut state = self.inner.state.lock().unwrap();
            if state.phase == SubmitPhase::Submitting {
                // the submit control is disabled while busy; this guard covers
                // hosts that dispatch the event anyway
                debug!("submit ignored; a delivery is already in flight");
                return;
            }
            match fields.validate() {
                Ok(lead) => {
                    state.phase = SubmitPhase::Submitting;
                    state.epoch += 1;
                    let epoch = state.epoch;
                    (lead, epoch)
                }
                Err(invalid) => {
                    drop(state);
                    for field in Field::ALL {
                        self.inner
                            .controller
                            .mark_validity(field, !invalid.contains(&field));
                    }
                    debug!(?invalid, "submission blocked by validation");
                    return;
                }
            }
        };

        // submit re-validated every field; clear any stale marks
        for field in Field::ALL {
            self.inner.controller.mark_validity(field, true);
        }

        self.emit(Effect::BusyChanged(true));
        let payload = LeadPayload::new(lead, &self.inner.page);
        let submission_id = Uuid::new_v4();
        let span = tracing::info_span!("lead_submit", %submission_id);
        let outcome = self
            .inner
            .transport
            .deliver(&payload)
            .instrument(span)
            .await;

        match outcome {
            Ok(()) => {
                info!(%submission_id, name = %payload.name, "lead submitted");
                self.inner.state.lock().unwrap().phase = SubmitPhase::Success;
                self.emit(Effect::BusyChanged(false));
                self.emit(Effect::PanelShown(Panel::Success {
                    name: payload.name.clone(),
                }));
                let engine = self.clone();
                tokio::spawn(async move { engine.settle_success(epoch).await });
            }
            Err(err) => {
                error!(%submission_id, %err, "lead submission failed");
                self.inner.state.lock().unwrap().phase = SubmitPhase::Failure;
                self.emit(Effect::BusyChanged(false));
                self.emit(Effect::PanelShown(Panel::Failure {
                    message: err.to_string(),
                }));
                let engine = self.clone();
                tokio::spawn(async move { engine.settle_failure(epoch).await });
            }
        }
    }

    /// After the configured delay: hide the panel, reset the form, and, under
    /// the auto-close policy, collapse the popup. Skipped entirely when a
    /// newer submission has taken over since the timer was armed.
    async fn settle_success(&self, epoch: u64) {
        sleep(self.inner.policy.success_delay).await;
        if !self.try_settle(epoch) {
            return;
        }
        self.emit(Effect::PanelHidden(PanelKind::Success));
        self.emit(Effect::FormReset);
        self.inner.controller.reset_validity();
        if self.inner.policy.close_after_success {
            self.inner.controller.close();
        }
    }

    /// The error panel auto-hides but the popup stays open and the form keeps
    /// its values so the visitor can try again.
    async fn settle_failure(&self, epoch: u64) {
        sleep(self.inner.policy.error_delay).await;
        if !self.try_settle(epoch) {
            return;
        }
        self.emit(Effect::PanelHidden(PanelKind::Failure));
    }

    /// Return the engine to `Idle`, but only if the submission this timer was
    /// armed for is still the current one.
    fn try_settle(&self, epoch: u64) -> bool {
        let mut state = self.inner.state.lock().unwrap();
        if state.epoch != epoch {
            debug!("stale panel timer ignored; a newer submission took over");
            return false;
        }
        state.phase = SubmitPhase::Idle;
        true
    }

    fn emit(&self, effect: Effect) {
        let _ = self.inner.effects.send(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EffectReceiver;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::task::yield_now;

    struct RecordingTransport {
        deliveries: Mutex<Vec<LeadPayload>>,
        fail_with: Option<String>,
    }

    impl RecordingTransport {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                deliveries: Mutex::new(Vec::new()),
                fail_with: None,
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                deliveries: Mutex::new(Vec::new()),
                fail_with: Some(message.to_string()),
            })
        }

        fn count(&self) -> usize {
            self.deliveries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SubmitTransport for RecordingTransport {
        async fn deliver(&self, payload: &LeadPayload) -> Result<(), TransportError> {
            self.deliveries.lock().unwrap().push(payload.clone());
            match &self.fail_with {
                Some(message) => Err(TransportError::Callback(message.clone())),
                None => Ok(()),
            }
        }
    }

    struct GatedTransport {
        gate: Arc<tokio::sync::Semaphore>,
        count: AtomicUsize,
    }

    #[async_trait]
    impl SubmitTransport for GatedTransport {
        async fn deliver(&self, _payload: &LeadPayload) -> Result<(), TransportError> {
            self.count.fetch_add(1, Ordering::SeqCst);
            // each delivery consumes a permit for good
            self.gate.acquire().await.unwrap().forget();
            Ok(())
        }
    }

    fn engine_with(
        policy: PanelPolicy,
        transport: Arc<dyn SubmitTransport>,
    ) -> (SubmissionEngine, InteractionController, EffectReceiver) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let controller = InteractionController::new(tx.clone());
        let engine = SubmissionEngine::new(
            transport,
            policy,
            PageContext::default(),
            controller.clone(),
            tx,
        );
        (engine, controller, rx)
    }

    fn valid_fields() -> FormFields {
        FormFields {
            name: "Ada Lovelace".into(),
            phone: "(555) 123-4567".into(),
            message: "Hello".into(),
        }
    }

    fn drain(rx: &mut EffectReceiver) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Ok(effect) = rx.try_recv() {
            effects.push(effect);
        }
        effects
    }

    #[tokio::test]
    async fn invalid_fields_block_delivery() {
        let transport = RecordingTransport::ok();
        let (engine, _controller, mut rx) =
            engine_with(PanelPolicy::stay_open(), transport.clone());

        engine
            .submit(FormFields {
                name: "  ".into(),
                phone: "12345".into(),
                message: "hi".into(),
            })
            .await;

        assert_eq!(transport.count(), 0);
        assert_eq!(engine.phase(), SubmitPhase::Idle);
        let effects = drain(&mut rx);
        assert!(effects.contains(&Effect::FieldValidity {
            field: Field::Name,
            valid: false
        }));
        assert!(effects.contains(&Effect::FieldValidity {
            field: Field::Phone,
            valid: false
        }));
        assert!(!effects.iter().any(|e| matches!(e, Effect::BusyChanged(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn success_shows_panel_then_resets_form() {
        let transport = RecordingTransport::ok();
        let (engine, controller, mut rx) =
            engine_with(PanelPolicy::stay_open(), transport.clone());
        controller.open();
        drain(&mut rx);

        engine.submit(valid_fields()).await;
        assert_eq!(engine.phase(), SubmitPhase::Success);
        assert_eq!(transport.count(), 1);
        let effects = drain(&mut rx);
        assert_eq!(
            effects,
            vec![
                Effect::BusyChanged(true),
                Effect::BusyChanged(false),
                Effect::PanelShown(Panel::Success {
                    name: "Ada Lovelace".into()
                }),
            ]
        );

        // let the settle task register its timer, then run past the delay
        yield_now().await;
        tokio::time::advance(Duration::from_secs(5) + Duration::from_millis(10)).await;
        yield_now().await;

        let effects = drain(&mut rx);
        assert_eq!(
            effects,
            vec![Effect::PanelHidden(PanelKind::Success), Effect::FormReset]
        );
        assert_eq!(engine.phase(), SubmitPhase::Idle);
        // stay_open policy keeps the popup up
        assert!(controller.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn auto_close_policy_collapses_popup_after_success() {
        let transport = RecordingTransport::ok();
        let (engine, controller, mut rx) = engine_with(PanelPolicy::auto_close(), transport);
        controller.open();
        drain(&mut rx);

        engine.submit(valid_fields()).await;
        drain(&mut rx);

        yield_now().await;
        tokio::time::advance(Duration::from_secs(3) + Duration::from_millis(10)).await;
        yield_now().await;

        let effects = drain(&mut rx);
        assert_eq!(
            effects,
            vec![
                Effect::PanelHidden(PanelKind::Success),
                Effect::FormReset,
                Effect::OpenChanged(false),
            ]
        );
        assert!(!controller.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_form_and_popup() {
        let transport = RecordingTransport::failing("webhook down");
        let (engine, controller, mut rx) =
            engine_with(PanelPolicy::stay_open(), transport.clone());
        controller.open();
        drain(&mut rx);

        engine.submit(valid_fields()).await;
        assert_eq!(engine.phase(), SubmitPhase::Failure);
        let effects = drain(&mut rx);
        assert_eq!(
            effects,
            vec![
                Effect::BusyChanged(true),
                Effect::BusyChanged(false),
                Effect::PanelShown(Panel::Failure {
                    message: "submit callback failed: webhook down".into()
                }),
            ]
        );

        yield_now().await;
        tokio::time::advance(Duration::from_secs(5) + Duration::from_millis(10)).await;
        yield_now().await;

        let effects = drain(&mut rx);
        // the panel hides, but no reset and no close
        assert_eq!(effects, vec![Effect::PanelHidden(PanelKind::Failure)]);
        assert_eq!(engine.phase(), SubmitPhase::Idle);
        assert!(controller.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn second_submit_while_pending_is_dropped() {
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let transport = Arc::new(GatedTransport {
            gate: gate.clone(),
            count: AtomicUsize::new(0),
        });
        let (engine, _controller, _rx) = engine_with(PanelPolicy::stay_open(), transport.clone());

        let first = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.submit(valid_fields()).await })
        };
        yield_now().await;
        assert_eq!(engine.phase(), SubmitPhase::Submitting);

        // control is disabled in the UI; a stray event must still be a no-op
        engine.submit(valid_fields()).await;
        assert_eq!(transport.count.load(Ordering::SeqCst), 1);

        gate.add_permits(1);
        first.await.unwrap();
        assert_eq!(engine.phase(), SubmitPhase::Success);
        assert_eq!(transport.count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_panel_timer_does_not_clear_the_in_flight_guard() {
        // one permit: the first delivery passes straight through
        let gate = Arc::new(tokio::sync::Semaphore::new(1));
        let transport = Arc::new(GatedTransport {
            gate: gate.clone(),
            count: AtomicUsize::new(0),
        });
        let (engine, _controller, mut rx) = engine_with(PanelPolicy::stay_open(), transport.clone());

        // first submission succeeds and arms the success-panel timer
        engine.submit(valid_fields()).await;
        assert_eq!(engine.phase(), SubmitPhase::Success);
        yield_now().await;
        drain(&mut rx);

        // a second submission starts while the panel is still showing
        let second = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.submit(valid_fields()).await })
        };
        yield_now().await;
        assert_eq!(engine.phase(), SubmitPhase::Submitting);

        // the first submission's timer fires mid-flight; it must neither
        // clear the phase nor run its hide/reset choreography
        tokio::time::advance(Duration::from_secs(5) + Duration::from_millis(10)).await;
        yield_now().await;
        assert_eq!(engine.phase(), SubmitPhase::Submitting);
        assert!(!drain(&mut rx).contains(&Effect::FormReset));

        // with the delivery still in flight, a stray submit stays rejected
        engine.submit(valid_fields()).await;
        assert_eq!(transport.count.load(Ordering::SeqCst), 2);

        gate.add_permits(1);
        second.await.unwrap();
        assert_eq!(engine.phase(), SubmitPhase::Success);
        assert_eq!(transport.count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn submit_revalidation_clears_stale_error_marks() {
        let transport = RecordingTransport::ok();
        let (engine, controller, mut rx) = engine_with(PanelPolicy::stay_open(), transport);
        controller.mark_validity(Field::Phone, false);
        drain(&mut rx);

        engine.submit(valid_fields()).await;
        let effects = drain(&mut rx);
        assert_eq!(
            effects[0],
            Effect::FieldValidity {
                field: Field::Phone,
                valid: true
            }
        );
    }
}
