//! Seams the polling scheduler drives the workflow through.
//!
//! Both traits exist so the scheduler's recovery contract is testable with
//! doubles: a pass that blows up must trigger exactly one refresh and leave
//! the loop running.

use anyhow::Result;
use async_trait::async_trait;
use patrol_drivers::BrowserSession;

use crate::phase::PassReport;

/// Recovery handle over the live browser session.
#[async_trait]
pub trait SessionControl: Send + Sync {
    /// Reload the current page in place.
    async fn refresh(&self) -> Result<()>;
}

#[async_trait]
impl SessionControl for BrowserSession {
    async fn refresh(&self) -> Result<()> {
        BrowserSession::refresh(self).await?;
        Ok(())
    }
}

/// Runs one workflow pass for a search term.
#[async_trait]
pub trait PassRunner: Send + Sync {
    /// An `Err` here is a pass-level failure: something escaped the phase
    /// boundaries (the production runner never does; doubles and future
    /// runners may).
    async fn run(&self, search_term: &str) -> Result<PassReport>;
}
