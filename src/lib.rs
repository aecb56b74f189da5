//! NSQ Lookup Resolver
//!
//! Queries one or more nsqlookupd instances for the producers of a topic, merges and
//! deduplicates them, and reports per-endpoint outcomes as structured events.

pub mod config;
pub mod discovery;
pub mod error;
pub mod telemetry;

// Re-exports
pub use config::{LookupConfig, QueryMode};
pub use discovery::{
    Endpoint, HttpBackend, LookupBackend, LookupEvent, LookupObserver, LookupOutcome, LookupReply,
    LookupResolver, LookupResponse, ProducerKey, ProducerRecord, ResolutionResult, ResponseShape,
    TracingObserver,
};
pub use error::{BackendError, LookupError, Result};
pub use telemetry::init_tracing;
