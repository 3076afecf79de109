//! Browser-control layer: a fantoccini WebDriver session plus the retrying
//! accessors that shield multi-step page interactions from engine
//! instability (stale references, pages still rendering, a crashed driver).
//!
//! The one reusable primitive here is [`retry::retry`]; every element read in
//! the workspace is that primitive parameterised with a different operation.

pub mod error;
pub mod page;
pub mod retry;
pub mod session;

pub use error::{classify, DriverError};
pub use page::PatrolPage;
pub use retry::{retry, RetryPolicy};
pub use session::{BrowserOptions, BrowserSession};
