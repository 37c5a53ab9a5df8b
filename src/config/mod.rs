//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → environment (AWS_SIGNING, AWS_ENDPOINT, AWS_SERVICE, AWS_REGION)
//!     → command-line arguments
//!     → config directory (*.toml, name order)
//!     → loader.rs (merge & resolve request url, headers, body)
//!     → validation.rs (semantic checks)
//!     → RequestConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Each layer only overrides what it explicitly sets
//! - Signing, once enabled by any layer, stays enabled
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_dir, resolve, ConfigError};
pub use schema::{AwsSettings, FileConfig, RequestBody, RequestConfig, SigningConfig};
