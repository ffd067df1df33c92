//! Injected logging abstraction.
//!
//! Long-running components (the SQL gateway, the import pipeline) report
//! progress through an `Arc<dyn Logger>` handed to them at construction,
//! rather than through a process-wide logger. The binary wires in
//! [`TracingLogger`]; tests use [`NoOpLogger`] or inspect what was logged
//! through [`MemoryLogger`].
//!
//! ```
//! use airdist::log::{Logger, MemoryLogger, LogLevel};
//! use airdist::log_warn;
//! use std::sync::Arc;
//!
//! let memory = Arc::new(MemoryLogger::new());
//! let logger: Arc<dyn Logger> = memory.clone();
//! log_warn!(logger, "Found {} pairs for {} (expected {})", 1, "SOF", 2);
//! assert_eq!(memory.count(LogLevel::Warn), 1);
//! ```

mod memory;
mod noop;
mod tracing_adapter;
mod r#trait;

pub use memory::{LogRecord, MemoryLogger};
pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger, ParseLogLevelError};
pub use tracing_adapter::TracingLogger;
