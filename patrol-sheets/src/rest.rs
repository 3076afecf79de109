//! REST-backed store: a values-style endpoint serving worksheets as JSON
//! arrays of string rows.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use crate::row::{index_rows, SheetRow};
use crate::store::{SheetError, SheetStore};

/// Client for a `{base}/values/{worksheet}` endpoint.
///
/// FIXME: mint the bearer token from the service-account key instead of
/// requiring the deployment to inject a pre-exchanged one.
pub struct RestSheets {
    http: reqwest::Client,
    base_url: Url,
    bearer: Option<String>,
}

#[derive(Deserialize)]
struct ValuesPayload {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl RestSheets {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            bearer: None,
        }
    }

    /// Attach a pre-exchanged bearer token to every request.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    fn values_url(&self, sheet_name: &str) -> Result<Url, SheetError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetError::Payload("spreadsheet url cannot be a base".into()))?
            .push("values")
            .push(sheet_name);
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

fn cell_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for RestSheets {
    #[instrument(skip(self))]
    async fn read_rows(&self, sheet_name: &str) -> Result<Vec<SheetRow>, SheetError> {
        let url = self.values_url(sheet_name)?;
        let response = self.authorize(self.http.get(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SheetError::WorksheetNotFound(sheet_name.to_string()));
        }
        let payload: ValuesPayload = response
            .error_for_status()?
            .json()
            .await
            .map_err(|e| SheetError::Payload(e.to_string()))?;

        let raw: Vec<Vec<String>> = payload
            .values
            .into_iter()
            .skip(1) // header
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        debug!(sheet_name, rows = raw.len(), "worksheet read");
        Ok(index_rows(raw))
    }

    #[instrument(skip(self, cells))]
    async fn write_row(
        &self,
        sheet_name: &str,
        row_index: u32,
        cells: &[String],
    ) -> Result<(), SheetError> {
        let mut url = self.values_url(sheet_name)?;
        url.path_segments_mut()
            .map_err(|_| SheetError::Payload("spreadsheet url cannot be a base".into()))?
            .push(&row_index.to_string());

        let response = self
            .authorize(self.http.put(url))
            .json(&json!({ "values": [cells] }))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SheetError::WorksheetNotFound(sheet_name.to_string())),
            _ => {
                response.error_for_status()?;
                debug!(sheet_name, row_index, "row overwritten");
                Ok(())
            }
        }
    }
}
