//! Integration tests for the full request-processing pipeline.
//!
//! These tests verify the end-to-end flow:
//! 1. Raw envelope bytes decode through the discriminator codec
//! 2. The mediator verifies identity and dispatches through the standard
//!    behavior chain to the winning handler
//! 3. The typed response encodes back to the platform wire shape
//!
//! Everything runs in-process with probe handlers and a recording
//! telemetry sink.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use skillcast::adapters::{ApologyTranslator, NoopTelemetry};
use skillcast::application::{
    standard_behaviors, DispatchError, HandlerConfig, HandlerContext, HandlerRegistryBuilder,
    Mediator, RequestHandler,
};
use skillcast::codec::default_codec;
use skillcast::domain::request::{Request, RequestKind};
use skillcast::domain::response::{OutputSpeech, ResponseBody, ResponseEnvelope};
use skillcast::ports::{SerializationKind, TelemetrySink, UnitOutcome};

const APP_ID: &str = "amzn1.ask.skill.test";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("skillcast=debug")
        .with_test_writer()
        .try_init();
}

fn intent_envelope_bytes(application_id: &str, intent_name: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "version": "1.0",
        "session": {
            "new": false,
            "sessionId": "sess-it-1",
            "application": {"applicationId": application_id},
        },
        "context": {
            "system": {
                "application": {"applicationId": application_id},
            }
        },
        "request": {
            "type": "IntentRequest",
            "requestId": "req-it-1",
            "locale": "en-US",
            "intent": {"name": intent_name}
        }
    }))
    .unwrap()
}

/// Accepts only the pizza intent; counts its predicate calls.
struct PizzaHandler {
    predicate_calls: AtomicUsize,
}

#[async_trait]
impl RequestHandler for PizzaHandler {
    fn name(&self) -> &str {
        "PizzaHandler"
    }

    async fn can_handle(
        &self,
        ctx: &HandlerContext,
        _cancel: &CancellationToken,
    ) -> Result<bool, DispatchError> {
        self.predicate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(matches!(
            ctx.request(),
            Request::Intent(intent) if intent.intent.name == "OrderPizza"
        ))
    }

    async fn handle(
        &self,
        _ctx: &HandlerContext,
        _cancel: &CancellationToken,
    ) -> Result<ResponseEnvelope, DispatchError> {
        Ok(ResponseEnvelope::new(ResponseBody::ask(
            OutputSpeech::plain("What size would you like?"),
            OutputSpeech::plain("Are you still there? What size?"),
        )))
    }
}

/// Records which serialization phases were reported.
#[derive(Default)]
struct CodecTimingSink {
    decodes: AtomicUsize,
    encodes: AtomicUsize,
}

impl TelemetrySink for CodecTimingSink {
    fn predicate_evaluated(
        &self,
        _handler: &str,
        _is_default: bool,
        _accepted: Option<bool>,
        _elapsed: std::time::Duration,
    ) {
    }

    fn handler_executed(
        &self,
        _handler: &str,
        _is_default: bool,
        _outcome: UnitOutcome,
        _elapsed: std::time::Duration,
    ) {
    }

    fn serialization_timed(&self, kind: SerializationKind, _elapsed: std::time::Duration) {
        match kind {
            SerializationKind::DecodeRequest => self.decodes.fetch_add(1, Ordering::SeqCst),
            SerializationKind::EncodeResponse => self.encodes.fetch_add(1, Ordering::SeqCst),
            SerializationKind::DecodeResponse => 0,
        };
    }
}

struct FaultingHandler;

#[async_trait]
impl RequestHandler for FaultingHandler {
    fn name(&self) -> &str {
        "FaultingHandler"
    }

    async fn can_handle(
        &self,
        ctx: &HandlerContext,
        _cancel: &CancellationToken,
    ) -> Result<bool, DispatchError> {
        Ok(matches!(
            ctx.request(),
            Request::Intent(intent) if intent.intent.name == "BreakThings"
        ))
    }

    async fn handle(
        &self,
        _ctx: &HandlerContext,
        _cancel: &CancellationToken,
    ) -> Result<ResponseEnvelope, DispatchError> {
        Err(DispatchError::handler_fault("FaultingHandler", "kaboom"))
    }
}

fn build_mediator(handler: Arc<PizzaHandler>) -> Mediator {
    let registry = HandlerRegistryBuilder::new()
        .register(RequestKind::Intent, handler, HandlerConfig::default())
        .register(
            RequestKind::Intent,
            Arc::new(FaultingHandler),
            HandlerConfig::with_priority(1),
        )
        .build();
    let behaviors = standard_behaviors(
        Vec::new(),
        Vec::new(),
        Arc::new(ApologyTranslator::default()),
    );
    Mediator::new(
        Some(APP_ID.to_string()),
        registry,
        behaviors,
        Arc::new(NoopTelemetry),
    )
}

#[tokio::test]
async fn bytes_in_bytes_out_round_trip() {
    init_tracing();
    let handler = Arc::new(PizzaHandler {
        predicate_calls: AtomicUsize::new(0),
    });
    let mediator = build_mediator(handler);

    let codec = default_codec();
    let timings = CodecTimingSink::default();
    let envelope = codec
        .decode_request_envelope_timed(&intent_envelope_bytes(APP_ID, "OrderPizza"), &timings)
        .unwrap();
    let response = mediator
        .send(envelope, CancellationToken::new())
        .await
        .unwrap();
    let bytes = codec
        .encode_response_envelope_timed(&response, &timings)
        .unwrap();
    assert_eq!(timings.decodes.load(Ordering::SeqCst), 1);
    assert_eq!(timings.encodes.load(Ordering::SeqCst), 1);

    let wire: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(wire["version"], "1.0");
    assert_eq!(wire["response"]["outputSpeech"]["type"], "PlainText");
    assert_eq!(
        wire["response"]["outputSpeech"]["text"],
        "What size would you like?"
    );
    assert_eq!(
        wire["response"]["reprompt"]["outputSpeech"]["text"],
        "Are you still there? What size?"
    );
    assert_eq!(wire["response"]["shouldEndSession"], false);
    assert!(wire.get("sessionAttributes").is_none());
    assert!(wire["response"].get("directives").is_none());
}

#[tokio::test]
async fn identity_mismatch_rejects_without_touching_handlers() {
    init_tracing();
    let handler = Arc::new(PizzaHandler {
        predicate_calls: AtomicUsize::new(0),
    });
    let mediator = build_mediator(handler.clone());

    let codec = default_codec();
    let envelope = codec
        .decode_request_envelope(&intent_envelope_bytes("some-other-skill", "OrderPizza"))
        .unwrap();
    let err = mediator
        .send(envelope, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::IdentityVerificationFailed { .. }
    ));
    assert_eq!(handler.predicate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn handler_fault_becomes_spoken_error_response() {
    init_tracing();
    let handler = Arc::new(PizzaHandler {
        predicate_calls: AtomicUsize::new(0),
    });
    let mediator = build_mediator(handler);

    let codec = default_codec();
    let envelope = codec
        .decode_request_envelope(&intent_envelope_bytes(APP_ID, "BreakThings"))
        .unwrap();
    let response = mediator
        .send(envelope, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(response.response.effective_end_session(), Some(true));
    assert!(response.response.output_speech.is_some());
}

#[tokio::test]
async fn unhandled_request_surfaces_no_handler_found() {
    init_tracing();
    let handler = Arc::new(PizzaHandler {
        predicate_calls: AtomicUsize::new(0),
    });
    let mediator = build_mediator(handler);

    let codec = default_codec();
    let envelope = codec
        .decode_request_envelope(&intent_envelope_bytes(APP_ID, "UnknownIntent"))
        .unwrap();
    let err = mediator
        .send(envelope, CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        DispatchError::NoHandlerFound {
            request_kind,
            request_id,
        } => {
            assert_eq!(request_kind, "IntentRequest");
            assert_eq!(request_id.as_deref(), Some("req-it-1"));
        }
        other => panic!("expected NoHandlerFound, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_sends_share_one_pipeline() {
    init_tracing();
    let handler = Arc::new(PizzaHandler {
        predicate_calls: AtomicUsize::new(0),
    });
    let mediator = Arc::new(build_mediator(handler.clone()));
    let codec = default_codec();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let mediator = mediator.clone();
        let envelope = codec
            .decode_request_envelope(&intent_envelope_bytes(APP_ID, "OrderPizza"))
            .unwrap();
        tasks.push(tokio::spawn(async move {
            mediator.send(envelope, CancellationToken::new()).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(handler.predicate_calls.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn cancellation_surfaces_as_distinct_outcome() {
    init_tracing();
    let handler = Arc::new(PizzaHandler {
        predicate_calls: AtomicUsize::new(0),
    });
    let mediator = build_mediator(handler);

    let codec = default_codec();
    let envelope = codec
        .decode_request_envelope(&intent_envelope_bytes(APP_ID, "OrderPizza"))
        .unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = mediator.send(envelope, cancel).await.unwrap_err();
    assert!(err.is_canceled());
}
