use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::Arc;
use std::time::Instant;

use edunet_authz::directory::{InMemoryDirectory, OrgDirectory};
use edunet_authz::store::{
    InMemoryLearningGroupStore, InMemorySubProgramStore, LearningGroupStore, SubProgramStore,
};
use edunet_authz::{AccessEngine, EngineConfig};

/// Authorization decision counters exposed at /metrics
#[derive(Clone)]
pub struct ApiMetrics {
    pub registry: Arc<Registry>,
    pub decisions: IntCounterVec,
}

impl ApiMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let decisions = IntCounterVec::new(
            Opts::new(
                "authz_decisions_total",
                "Authorization decisions by outcome",
            ),
            &["outcome"],
        )
        .expect("valid metric definition");
        registry
            .register(Box::new(decisions.clone()))
            .expect("metric registration");
        Self {
            registry: Arc::new(registry),
            decisions,
        }
    }

    pub fn record_allowed(&self) {
        self.decisions.with_label_values(&["allowed"]).inc();
    }

    pub fn record_denied(&self) {
        self.decisions.with_label_values(&["denied"]).inc();
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Org-scope access engine
    pub engine: Arc<AccessEngine>,

    /// Subprogram storage backend
    pub sub_programs: Arc<dyn SubProgramStore>,

    /// Learning-group storage backend
    pub learning_groups: Arc<dyn LearningGroupStore>,

    /// Decision metrics
    pub metrics: ApiMetrics,

    /// Server start time for uptime calculation
    pub start_time: Instant,

    /// Application version
    pub version: String,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn OrgDirectory>,
        sub_programs: Arc<dyn SubProgramStore>,
        learning_groups: Arc<dyn LearningGroupStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            engine: Arc::new(AccessEngine::new(directory, config)),
            sub_programs,
            learning_groups,
            metrics: ApiMetrics::new(),
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            Arc::new(InMemoryDirectory::new()),
            Arc::new(InMemorySubProgramStore::new()),
            Arc::new(InMemoryLearningGroupStore::new()),
            EngineConfig::default(),
        )
    }
}
