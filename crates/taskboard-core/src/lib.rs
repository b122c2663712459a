pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod traits;

pub use config::{AppConfig, AuthMode};
pub use error::TaskboardError;
pub use logging::{ActivityLog, LogEntry, LogLevel, Loggable};
pub use result::TaskboardResult;
pub use traits::{next_order, resequence, Ordered};
