//! Mediator: the single entry point of the dispatch pipeline.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::request::{RequestEnvelope, RequestKind};
use crate::domain::response::ResponseEnvelope;
use crate::ports::TelemetrySink;

use super::behaviors::{Next, PipelineBehavior};
use super::dispatcher::DispatchWrapper;
use super::error::DispatchError;
use super::handler::HandlerContext;
use super::registry::HandlerRegistry;

/// One shared mediator serves every concurrent invocation. It holds no
/// per-call mutable state; the wrapper cache is the only shared mutable
/// structure and tolerates duplicate construction under races
/// (first-writer-wins, instances are interchangeable).
pub struct Mediator {
    expected_application_id: Option<String>,
    registry: HandlerRegistry,
    behaviors: Vec<Arc<dyn PipelineBehavior>>,
    telemetry: Arc<dyn TelemetrySink>,
    wrappers: RwLock<HashMap<RequestKind, Arc<DispatchWrapper>>>,
}

impl Mediator {
    pub fn new(
        expected_application_id: Option<String>,
        registry: HandlerRegistry,
        behaviors: Vec<Arc<dyn PipelineBehavior>>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Mediator {
            expected_application_id,
            registry,
            behaviors,
            telemetry,
            wrappers: RwLock::new(HashMap::new()),
        }
    }

    /// Processes one decoded envelope through the full pipeline.
    ///
    /// The identity check runs before any handler resolution. Cancellation
    /// and unhandled faults propagate to the caller; nothing is retried.
    pub async fn send(
        &self,
        envelope: RequestEnvelope,
        cancel: CancellationToken,
    ) -> Result<ResponseEnvelope, DispatchError> {
        self.verify_identity(&envelope)?;

        let kind = envelope.request.kind();
        let wrapper = self.wrapper_for(&kind);
        let ctx = HandlerContext::new(envelope);
        debug!(kind = %kind, correlation_id = %ctx.correlation_id(), "dispatching request");

        Next::new(&self.behaviors, &wrapper).run(&ctx, &cancel).await
    }

    fn verify_identity(&self, envelope: &RequestEnvelope) -> Result<(), DispatchError> {
        let actual = envelope.application_id();
        match &self.expected_application_id {
            // Exact, case-sensitive match.
            Some(expected) if Some(expected.as_str()) == actual => Ok(()),
            expected => {
                warn!(
                    expected = expected.as_deref().unwrap_or("<unconfigured>"),
                    actual = actual.unwrap_or("<absent>"),
                    "application id verification failed"
                );
                Err(DispatchError::IdentityVerificationFailed {
                    expected: expected.clone(),
                    actual: actual.map(str::to_string),
                })
            }
        }
    }

    /// Cached get-or-insert of the dispatch wrapper for one request type.
    /// Lock poisoning cannot occur here: no code path panics while holding
    /// the guard, so `unwrap` on the lock is safe.
    ///
    /// Extension kinds are keyed by wire tag, so a codec fallback that
    /// admits arbitrary tags adds one cache entry per distinct tag for the
    /// process lifetime. Only envelopes that pass identity verification
    /// reach this cache, which bounds who can mint new tags.
    pub(crate) fn wrapper_for(&self, kind: &RequestKind) -> Arc<DispatchWrapper> {
        if let Some(wrapper) = self.wrappers.read().unwrap().get(kind) {
            return wrapper.clone();
        }
        let created = Arc::new(DispatchWrapper::new(
            kind.clone(),
            self.registry.registration(kind),
            self.telemetry.clone(),
        ));
        let mut wrappers = self.wrappers.write().unwrap();
        wrappers.entry(kind.clone()).or_insert(created).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::adapters::NoopTelemetry;
    use crate::application::handler::{HandlerConfig, RequestHandler};
    use crate::application::registry::HandlerRegistryBuilder;
    use crate::domain::request::{
        Application, Context, LaunchRequest, Request, RequestEnvelope, Session,
    };
    use crate::domain::response::{OutputSpeech, ResponseBody};

    struct CountingHandler {
        predicate_calls: AtomicUsize,
    }

    #[async_trait]
    impl RequestHandler for CountingHandler {
        fn name(&self) -> &str {
            "CountingHandler"
        }

        async fn can_handle(
            &self,
            _ctx: &HandlerContext,
            _cancel: &CancellationToken,
        ) -> Result<bool, DispatchError> {
            self.predicate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn handle(
            &self,
            _ctx: &HandlerContext,
            _cancel: &CancellationToken,
        ) -> Result<ResponseEnvelope, DispatchError> {
            Ok(ResponseEnvelope::new(ResponseBody::tell(
                OutputSpeech::plain("counted"),
            )))
        }
    }

    fn envelope_for(application_id: &str) -> RequestEnvelope {
        RequestEnvelope {
            version: "1.0".to_string(),
            session: Some(Session {
                is_new: true,
                session_id: "sess-1".to_string(),
                application: Application {
                    application_id: application_id.to_string(),
                },
                attributes: None,
                user: None,
            }),
            context: Context::default(),
            request: Request::Launch(LaunchRequest::default()),
        }
    }

    fn mediator_with(handler: Arc<CountingHandler>, expected: Option<&str>) -> Mediator {
        let registry = HandlerRegistryBuilder::new()
            .register(RequestKind::Launch, handler, HandlerConfig::default())
            .build();
        Mediator::new(
            expected.map(str::to_string),
            registry,
            Vec::new(),
            Arc::new(NoopTelemetry),
        )
    }

    #[tokio::test]
    async fn mismatched_application_id_fails_before_any_predicate() {
        let handler = Arc::new(CountingHandler {
            predicate_calls: AtomicUsize::new(0),
        });
        let mediator = mediator_with(handler.clone(), Some("A2"));

        let err = mediator
            .send(envelope_for("A1"), CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            DispatchError::IdentityVerificationFailed { expected, actual } => {
                assert_eq!(expected.as_deref(), Some("A2"));
                assert_eq!(actual.as_deref(), Some("A1"));
            }
            other => panic!("expected IdentityVerificationFailed, got {other:?}"),
        }
        assert_eq!(handler.predicate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_configuration_fails_immediately() {
        let handler = Arc::new(CountingHandler {
            predicate_calls: AtomicUsize::new(0),
        });
        let mediator = mediator_with(handler, None);

        let err = mediator
            .send(envelope_for("A1"), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::IdentityVerificationFailed { expected: None, .. }
        ));
    }

    #[tokio::test]
    async fn matching_identity_dispatches_to_the_handler() {
        let handler = Arc::new(CountingHandler {
            predicate_calls: AtomicUsize::new(0),
        });
        let mediator = mediator_with(handler, Some("A1"));

        let response = mediator
            .send(envelope_for("A1"), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            response.response.output_speech,
            Some(OutputSpeech::plain("counted"))
        );
    }

    #[tokio::test]
    async fn wrapper_cache_returns_the_same_instance_per_kind() {
        let handler = Arc::new(CountingHandler {
            predicate_calls: AtomicUsize::new(0),
        });
        let mediator = mediator_with(handler, Some("A1"));

        let first = mediator.wrapper_for(&RequestKind::Launch);
        let second = mediator.wrapper_for(&RequestKind::Launch);
        assert!(Arc::ptr_eq(&first, &second));

        let other = mediator.wrapper_for(&RequestKind::Intent);
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[tokio::test]
    async fn concurrent_sends_for_one_kind_both_succeed() {
        let handler = Arc::new(CountingHandler {
            predicate_calls: AtomicUsize::new(0),
        });
        let mediator = Arc::new(mediator_with(handler, Some("A1")));

        let a = {
            let mediator = mediator.clone();
            tokio::spawn(
                async move { mediator.send(envelope_for("A1"), CancellationToken::new()).await },
            )
        };
        let b = {
            let mediator = mediator.clone();
            tokio::spawn(
                async move { mediator.send(envelope_for("A1"), CancellationToken::new()).await },
            )
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // Subsequent calls observe a single cached wrapper.
        let first = mediator.wrapper_for(&RequestKind::Launch);
        let second = mediator.wrapper_for(&RequestKind::Launch);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
