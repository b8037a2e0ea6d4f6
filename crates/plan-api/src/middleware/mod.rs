//! # Middleware
//!
//! Tower layers applied to the plan routes:
//!
//! ```text
//! TraceLayer → metrics_middleware → Handler
//! ```

pub mod metrics;
pub mod tracing_layer;
