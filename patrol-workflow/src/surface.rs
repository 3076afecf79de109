//! The page surface a pass interacts with.
//!
//! [`SearchSurface`] is the seam between the state machine and fantoccini:
//! the machine orchestrates phases against the trait, the concrete
//! [`ListingSurface`] routes every element lookup through the drivers' retry
//! accessors, and tests drive the machine with hand-rolled fakes.

use async_trait::async_trait;
use fantoccini::key::Key;
use patrol_drivers::{classify, DriverError, PatrolPage};
use tracing::debug;

/// CSS selectors for the controls a pass touches.
#[derive(Debug, Clone)]
pub struct SurfaceSelectors {
    /// Close control of the overlay that blocks the page on first load.
    pub overlay_close: String,
    /// The search input field.
    pub search_input: String,
    /// One entry in the result list.
    pub result_item: String,
}

impl Default for SurfaceSelectors {
    fn default() -> Self {
        Self {
            overlay_close: "#popup-close".to_string(),
            search_input: "input[name='keyword']".to_string(),
            result_item: ".content__body__left__item__infor".to_string(),
        }
    }
}

/// What the workflow needs from a page. One implementation per site layout.
#[async_trait]
pub trait SearchSurface: Send + Sync {
    /// Close the overlay blocking the page, if one is up.
    async fn dismiss_overlay(&self) -> Result<(), DriverError>;

    /// Type the term into the search field and confirm it.
    async fn submit_search(&self, term: &str) -> Result<(), DriverError>;

    /// Click the first entry of the result list.
    async fn open_first_result(&self) -> Result<(), DriverError>;
}

/// Fantoccini-backed surface for the listing site.
pub struct ListingSurface {
    page: PatrolPage,
    selectors: SurfaceSelectors,
}

impl ListingSurface {
    pub fn new(page: PatrolPage, selectors: SurfaceSelectors) -> Self {
        Self { page, selectors }
    }
}

#[async_trait]
impl SearchSurface for ListingSurface {
    async fn dismiss_overlay(&self) -> Result<(), DriverError> {
        let overlay = self.page.find(&self.selectors.overlay_close).await?;
        overlay
            .click()
            .await
            .map(|_| ())
            .map_err(|e| classify("dismiss overlay", e))
    }

    async fn submit_search(&self, term: &str) -> Result<(), DriverError> {
        let input = self.page.find(&self.selectors.search_input).await?;
        input
            .send_keys(term)
            .await
            .map_err(|e| classify("type search term", e))?;
        // Explicit confirm keypress; the site has no dedicated submit button.
        let confirm = String::from(char::from(Key::Enter));
        input
            .send_keys(&confirm)
            .await
            .map_err(|e| classify("confirm search", e))?;
        debug!(term, "search submitted");
        Ok(())
    }

    async fn open_first_result(&self) -> Result<(), DriverError> {
        let items = self.page.find_all(&self.selectors.result_item).await?;
        let first = items
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::ElementMissing("first result item".into()))?;
        first
            .click()
            .await
            .map(|_| ())
            .map_err(|e| classify("open first result", e))
    }
}
