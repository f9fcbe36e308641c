//! Logging support

use log::{debug, error, info, warn};

/// Enum that describes level associated with a log message
#[derive(Debug, Eq, PartialEq)]
pub enum PeLogLevels {
    /// Common error logging level
    PeError,
    /// Common info logging level
    PeInfo,
    /// Common warn logging level
    PeWarn,
    /// Common debug logging level
    PeDebug,
}

/// `log_message` routes a message to the `log` facade at the given level. The backend (log4rs in
/// the `ev-checker` binary) is selected by the application.
pub fn log_message(level: &PeLogLevels, message: &str) {
    match level {
        PeLogLevels::PeError => error!("{}", message),
        PeLogLevels::PeWarn => warn!("{}", message),
        PeLogLevels::PeInfo => info!("{}", message),
        PeLogLevels::PeDebug => debug!("{}", message),
    }
}
