//! Handler registry: per-request-type candidate lists, frozen at startup.
//!
//! Built once through [`HandlerRegistryBuilder`] and read-only afterwards.
//! There is no ambient global registration list; the builder is constructed
//! explicitly and handed to the mediator.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::request::RequestKind;

use super::handler::{DefaultRequestHandler, HandlerConfig, RequestHandler};

/// The ordered candidates and optional default handler for one concrete
/// request type.
pub struct Registration {
    pub(crate) candidates: Vec<Arc<dyn RequestHandler>>,
    pub(crate) default_handler: Option<Arc<dyn DefaultRequestHandler>>,
}

impl Registration {
    /// Candidate handlers in their fixed resolution order.
    pub fn candidates(&self) -> &[Arc<dyn RequestHandler>] {
        &self.candidates
    }

    pub fn default_handler(&self) -> Option<&Arc<dyn DefaultRequestHandler>> {
        self.default_handler.as_ref()
    }
}

struct PendingEntry {
    candidates: Vec<(Arc<dyn RequestHandler>, HandlerConfig)>,
    default_handler: Option<Arc<dyn DefaultRequestHandler>>,
}

/// Builder for the read-only [`HandlerRegistry`].
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    entries: HashMap<RequestKind, PendingEntry>,
}

impl Default for PendingEntry {
    fn default() -> Self {
        PendingEntry {
            candidates: Vec::new(),
            default_handler: None,
        }
    }
}

impl HandlerRegistryBuilder {
    pub fn new() -> Self {
        HandlerRegistryBuilder::default()
    }

    /// Registers a candidate handler for one request type with its plain
    /// registration metadata.
    pub fn register(
        mut self,
        kind: RequestKind,
        handler: Arc<dyn RequestHandler>,
        config: HandlerConfig,
    ) -> Self {
        self.entries
            .entry(kind)
            .or_default()
            .candidates
            .push((handler, config));
        self
    }

    /// Sets the default handler for one request type. At most one default
    /// exists per type; a later call replaces the earlier one.
    pub fn default_handler(
        mut self,
        kind: RequestKind,
        handler: Arc<dyn DefaultRequestHandler>,
    ) -> Self {
        self.entries.entry(kind).or_default().default_handler = Some(handler);
        self
    }

    /// Freezes the registry. Candidate order is fixed here, once: priority
    /// ascending, ties broken by handler name ascending (ordinal).
    /// Excluded handlers are dropped.
    pub fn build(self) -> HandlerRegistry {
        let by_kind = self
            .entries
            .into_iter()
            .map(|(kind, entry)| {
                let mut kept: Vec<(Arc<dyn RequestHandler>, HandlerConfig)> = entry
                    .candidates
                    .into_iter()
                    .filter(|(_, config)| !config.exclude)
                    .collect();
                kept.sort_by(|(a, ca), (b, cb)| {
                    ca.priority
                        .cmp(&cb.priority)
                        .then_with(|| a.name().cmp(b.name()))
                });
                let registration = Registration {
                    candidates: kept.into_iter().map(|(handler, _)| handler).collect(),
                    default_handler: entry.default_handler,
                };
                (kind, Arc::new(registration))
            })
            .collect();
        HandlerRegistry { by_kind }
    }
}

/// Read-only lookup from a request type token to its registration record.
pub struct HandlerRegistry {
    by_kind: HashMap<RequestKind, Arc<Registration>>,
}

impl HandlerRegistry {
    /// The registration for one request type, if any handler was registered
    /// for it.
    pub fn registration(&self, kind: &RequestKind) -> Option<Arc<Registration>> {
        self.by_kind.get(kind).cloned()
    }
}
