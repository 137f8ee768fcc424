//! Observability for tabula
//!
//! Logging goes through `tracing`. Request spans come from the
//! `TraceLayer` on the HTTP router; catalog writes log their own events.

mod logging;

pub use logging::{env_filter, init_logging, LoggingError};
