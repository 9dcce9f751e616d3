//! Catalog-driven audit event logging.
//!
//! This crate validates audit events against a catalog and emits them:
//! - Required and undeclared attributes are detected in one pass
//! - Attribute and request-context values are checked against constraints
//! - Request context is read from the calling thread or an explicit map
//! - Sink failures follow a configurable policy (fail, ignore, log)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tessera_audit::{AuditEngine, InMemorySink, RequestContext, ThreadContext};
//! use tessera_core::{fixtures::banking_catalog, CatalogIndex};
//!
//! let sink = Arc::new(InMemorySink::new());
//! let engine = AuditEngine::builder(Arc::new(CatalogIndex::build(banking_catalog())?))
//!     .sink(sink.clone())
//!     .build();
//!
//! let _ctx = ThreadContext::scope(
//!     [("accountNumber", "12345"), ("companyId", "12"), ("userId", "5"),
//!      ("ipAddress", "10.0.0.1"), ("loginId", "jdoe")]
//!         .into_iter()
//!         .collect::<RequestContext>(),
//! );
//!
//! engine
//!     .event("transfer")
//!     .attribute("toAccount", "123456")
//!     .attribute("fromAccount", "111111")
//!     .attribute("amount", "111.55")
//!     .log()?;
//!
//! assert_eq!(
//!     sink.rendered(),
//!     vec![r#"[transfer amount="111.55" fromAccount="111111" toAccount="123456"]"#]
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod context;
mod dispatch;
mod engine;
mod error;
mod event;
mod handler;
mod message;
mod sink;

pub use config::AuditConfig;
pub use context::{ContextGuard, ContextSource, RequestContext, ThreadContext};
pub use dispatch::Dispatcher;
pub use engine::{AuditEngine, AuditEngineBuilder};
pub use error::{AuditError, Result};
pub use event::EventBuilder;
pub use handler::{EmissionPolicy, ExceptionHandler, FailLoudHandler, LoggingHandler, NoopHandler};
pub use message::{AuditMessage, KeyLengthError};
pub use sink::{AuditSink, InMemorySink, JsonLinesSink, SinkError, TracingSink};
