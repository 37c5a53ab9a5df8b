//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!
//! Consumers:
//!     → stderr, leaving stdout to response bodies
//! ```

pub mod logging;

pub use logging::init_logging;
