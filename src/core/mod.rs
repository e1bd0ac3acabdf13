pub mod error;
pub mod logging;
pub mod shutdown;

pub use error::{ConfigError, LibraryError, PlaybackError, PlaybackResult};
pub use logging::{ComponentLogger, LogContext};
pub use shutdown::{Shutdown, WaitOutcome, Waiter};
