//! Element accessors, every one of them routed through the retry primitive.
//!
//! These mirror the reads a scrape of a result table needs: a cell's text,
//! the cells of a row, the link buried in a cell, an attribute value, and a
//! bulk lookup by selector. Stale handles and still-rendering pages are
//! retried; a page that simply lacks the element is reported as
//! [`DriverError::ElementMissing`] so callers can tell layout drift from
//! flakiness.

use fantoccini::elements::Element;
use fantoccini::{Client, Locator};

use crate::error::{classify, DriverError};
use crate::retry::{retry, RetryPolicy};

/// Page wrapper sharing the session's client handle.
#[derive(Clone)]
pub struct PatrolPage {
    pub client: Client,
}

impl PatrolPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Find a single element by CSS selector, waiting out render lag.
    pub async fn find(&self, selector: &str) -> Result<Element, DriverError> {
        let client = self.client.clone();
        let selector = selector.to_string();
        retry(
            "find element",
            RetryPolicy::element(),
            DriverError::is_transient,
            || {
                let client = client.clone();
                let selector = selector.clone();
                async move {
                    client
                        .find(Locator::Css(&selector))
                        .await
                        .map_err(|e| classify("find element", e))
                }
            },
        )
        .await
    }

    /// Find zero or more elements by CSS selector.
    pub async fn find_all(&self, selector: &str) -> Result<Vec<Element>, DriverError> {
        let client = self.client.clone();
        let selector = selector.to_string();
        retry(
            "find elements",
            RetryPolicy::element(),
            DriverError::is_transient,
            || {
                let client = client.clone();
                let selector = selector.clone();
                async move {
                    client
                        .find_all(Locator::Css(&selector))
                        .await
                        .map_err(|e| classify("find elements", e))
                }
            },
        )
        .await
    }

    /// A cell's visible text.
    pub async fn cell_text(&self, cell: &Element) -> Result<String, DriverError> {
        retry(
            "cell text",
            RetryPolicy::element(),
            DriverError::is_transient,
            || {
                let cell = cell.clone();
                async move { cell.text().await.map_err(|e| classify("cell text", e)) }
            },
        )
        .await
    }

    /// The `td` cells of a table row.
    pub async fn row_cells(&self, row: &Element) -> Result<Vec<Element>, DriverError> {
        retry(
            "row cells",
            RetryPolicy::element(),
            DriverError::is_transient,
            || {
                let row = row.clone();
                async move {
                    row.find_all(Locator::Css("td"))
                        .await
                        .map_err(|e| classify("row cells", e))
                }
            },
        )
        .await
    }

    /// The second anchor inside a cell: the data link in the layout we
    /// scrape, where the first anchor is decoration.
    ///
    /// A stale handle is retried; a cell that rendered with fewer anchors is
    /// [`DriverError::ElementMissing`] and propagates on the first attempt.
    pub async fn link_in_cell(&self, cell: &Element) -> Result<Element, DriverError> {
        retry(
            "link in cell",
            RetryPolicy::element(),
            DriverError::is_transient,
            || {
                let cell = cell.clone();
                async move {
                    let anchors = cell
                        .find_all(Locator::Css("a"))
                        .await
                        .map_err(|e| classify("link in cell", e))?;
                    anchors
                        .into_iter()
                        .nth(1)
                        .ok_or_else(|| DriverError::ElementMissing("second anchor in cell".into()))
                }
            },
        )
        .await
    }

    /// An attribute's value; `None` when the attribute is absent.
    pub async fn attribute(
        &self,
        element: &Element,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let name = name.to_string();
        retry(
            "attribute value",
            RetryPolicy::element(),
            DriverError::is_transient,
            || {
                let element = element.clone();
                let name = name.clone();
                async move {
                    element
                        .attr(&name)
                        .await
                        .map_err(|e| classify("attribute value", e))
                }
            },
        )
        .await
    }
}
