//! Error taxonomy for the browser layer.
//!
//! Transient failures (stale references, elements still rendering, a lost
//! driver connection) are worth retrying; structural ones (the page simply
//! does not contain what we expect) are not, and callers need to tell the two
//! apart by kind.

use fantoccini::error::CmdError;
use fantoccini::error::ErrorStatus;

#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    /// A held element handle no longer corresponds to live page content.
    #[error("stale element reference during {0}")]
    StaleElement(String),

    /// The element was not found; the page may still be rendering.
    #[error("element not present yet during {0}")]
    NotYetPresent(String),

    /// The WebDriver endpoint is unreachable or the session died.
    #[error("webdriver unavailable: {0}")]
    DriverUnavailable(String),

    /// Structural absence: the page rendered but does not contain the
    /// expected element (e.g. a cell with fewer anchors than the layout
    /// guarantees). Retrying will not help.
    #[error("no element matched for {0}")]
    ElementMissing(String),

    /// A retried operation failed on every attempt.
    #[error("{operation} failed after {attempts} attempts")]
    RetryExhausted { operation: String, attempts: u32 },

    /// The whole launch-and-navigate sequence failed on every attempt.
    /// Fatal at process start.
    #[error("could not start a webdriver session after {attempts} attempts")]
    DriverStartFailed { attempts: u32 },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Any other WebDriver command failure.
    #[error(transparent)]
    Command(#[from] CmdError),
}

impl DriverError {
    /// Whether another attempt might succeed. This is the default classifier
    /// handed to [`crate::retry::retry`].
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StaleElement(_) | Self::NotYetPresent(_) | Self::DriverUnavailable(_)
        )
    }
}

/// Fold a raw fantoccini error into our taxonomy, tagged with the operation
/// that was underway.
pub fn classify(operation: &str, err: CmdError) -> DriverError {
    match err {
        CmdError::Standard(ref w) if matches!(w.error, ErrorStatus::StaleElementReference) => {
            DriverError::StaleElement(operation.to_string())
        }
        CmdError::Standard(ref w) if matches!(w.error, ErrorStatus::NoSuchElement) => {
            DriverError::NotYetPresent(operation.to_string())
        }
        CmdError::Lost(e) => DriverError::DriverUnavailable(e.to_string()),
        other => DriverError::Command(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_kinds() {
        assert!(DriverError::StaleElement("x".into()).is_transient());
        assert!(DriverError::NotYetPresent("x".into()).is_transient());
        assert!(DriverError::DriverUnavailable("gone".into()).is_transient());
    }

    #[test]
    fn structural_kinds_are_terminal() {
        assert!(!DriverError::ElementMissing("x".into()).is_transient());
        assert!(!DriverError::RetryExhausted {
            operation: "x".into(),
            attempts: 3
        }
        .is_transient());
        assert!(!DriverError::DriverStartFailed { attempts: 3 }.is_transient());
    }

    #[test]
    fn exhaustion_names_the_operation() {
        let err = DriverError::RetryExhausted {
            operation: "cell text".into(),
            attempts: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("cell text"));
        assert!(msg.contains('3'));
    }
}
