// =============================================================================
// SWCACHE - Storefront Worker Cache
// File: worker.rs
// Role: Worker facade and event dispatch table
// Philosophy: One immutable policy per deployment, first and last.
// -----------------------------------------------------------------------------
// Responsibilities:
// - Build the route handlers once from an immutable WorkerConfig.
// - Map each event kind (install, activate, fetch, message) to its handler.
// - Every handler returns a future the host awaits before the phase is done.
// =============================================================================

use crate::cache::CacheStorage;
use crate::config::{ConfigError, WorkerConfig};
use crate::lifecycle::{self, ActivationReport, WorkerHost};
use crate::messages::{self, ControlMessage, MessageOutcome, ReplyPort};
use crate::observability::metrics::{EngineCounters, Event};
use crate::plugins::FilterChain;
use crate::routing::classifier::{Classifier, Request, ResourceClass};
use crate::strategy::{Collaborators, Fetcher, Outcome, RouteHandler};
use crate::{meta, EngineError};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// `Installing` ends in `Installed` once `install` settles, or earlier
/// when a `SKIP_WAITING` message arrives mid-install.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    Message { data: Value, reply: Option<ReplyPort> },
}

#[derive(Debug)]
pub enum EventOutcome {
    Installed,
    Activated(ActivationReport),
    Response(Outcome),
    Message(MessageOutcome),
}

pub struct ServiceWorker {
    config: Arc<WorkerConfig>,
    classifier: Classifier,
    routes: Vec<RouteHandler>,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    host: Arc<dyn WorkerHost>,
    counters: EngineCounters,
    state: Mutex<WorkerState>,
}

impl ServiceWorker {
    pub fn new(
        config: WorkerConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        host: Arc<dyn WorkerHost>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut routes = Vec::with_capacity(ResourceClass::HANDLED.len());
        for class in ResourceClass::HANDLED {
            let (Some(bucket), Some(expiration)) = (config.bucket_name(class), config.expiration.get(class)) else {
                continue;
            };
            routes.push(RouteHandler {
                class,
                bucket,
                filters: FilterChain::for_class(class),
                expiration: expiration.clone(),
            });
        }
        Ok(Self {
            classifier: Classifier::new(&config.routes),
            config: Arc::new(config),
            routes,
            storage,
            fetcher,
            host,
            counters: EngineCounters::new(),
            state: Mutex::new(WorkerState::Parsed),
        })
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    pub fn counters(&self) -> &EngineCounters {
        &self.counters
    }

    pub fn classify(&self, req: &Request) -> ResourceClass {
        self.classifier.classify(req)
    }

    /// Dispatch table. Only a fetch can fail, and only on network errors.
    pub async fn dispatch(&self, ev: WorkerEvent) -> Result<EventOutcome, EngineError> {
        match ev {
            WorkerEvent::Install => Ok(self.on_install().await),
            WorkerEvent::Activate => Ok(self.on_activate().await),
            WorkerEvent::Fetch(req) => self.on_fetch(&req).await.map(EventOutcome::Response),
            WorkerEvent::Message { data, reply } => Ok(EventOutcome::Message(self.on_message(&data, reply).await)),
        }
    }

    async fn on_install(&self) -> EventOutcome {
        self.set_state(WorkerState::Installing);
        lifecycle::install(self.host.as_ref()).await;
        self.advance(WorkerState::Installing, WorkerState::Installed);
        EventOutcome::Installed
    }

    async fn on_activate(&self) -> EventOutcome {
        self.set_state(WorkerState::Activating);
        let whitelist = self.config.whitelist();
        let report = lifecycle::activate(self.storage.as_ref(), self.host.as_ref(), &whitelist).await;
        self.set_state(WorkerState::Activated);
        EventOutcome::Activated(report)
    }

    pub async fn on_fetch(&self, req: &Request) -> Result<Outcome, EngineError> {
        let class = self.classifier.classify(req);
        debug!(url = %req.url(), class = class.as_str(), "routed");
        match self.routes.iter().find(|r| r.class == class) {
            Some(route) => {
                let ctx = Collaborators {
                    storage: self.storage.as_ref(),
                    fetcher: self.fetcher.as_ref(),
                    counters: &self.counters,
                };
                route.handle(req, ctx).await
            }
            None => {
                self.counters.record(class, Event::Fetch);
                let response = self.fetcher.fetch(req).await?;
                Ok(Outcome { response, flags: class.meta_flag() | meta::CACHE_MISS })
            }
        }
    }

    async fn on_message(&self, data: &Value, reply: Option<ReplyPort>) -> MessageOutcome {
        let Some(msg) = ControlMessage::parse(data) else {
            return MessageOutcome::Ignored;
        };
        if msg == ControlMessage::SkipWaiting {
            self.advance(WorkerState::Installing, WorkerState::Installed);
        }
        messages::handle(msg, reply, self.storage.as_ref(), self.host.as_ref(), self.config.monitoring_enabled).await
    }

    /// Move to `next` only if the worker is still in `from`.
    fn advance(&self, from: WorkerState, next: WorkerState) {
        let mut st = self.state.lock();
        if *st == from {
            debug!(from = ?from, to = ?next, "worker state");
            *st = next;
        }
    }

    fn set_state(&self, next: WorkerState) {
        let mut st = self.state.lock();
        debug!(from = ?*st, to = ?next, "worker state");
        *st = next;
    }
}
