//! Assembles the production pieces behind the scheduler's seams.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use patrol_common::PatrolError;
use patrol_config::PatrolConfig;
use patrol_drivers::{BrowserOptions, BrowserSession, RetryPolicy};
use patrol_sheets::{load_service_account_key, RestSheets, SheetStore};
use patrol_workflow::{
    ListingSurface, PassReport, PassRunner, SurfaceSelectors, Workflow,
};
use tracing::{error, info, warn};
use url::Url;

use crate::scheduler::{CycleMode, PollingScheduler};

/// Production pass runner: the workflow over the fantoccini surface.
/// Never returns `Err`; every error is caught at a phase boundary inside
/// `run_pass` and lands in the report.
pub struct WorkflowRunner {
    workflow: Workflow,
    surface: ListingSurface,
}

#[async_trait]
impl PassRunner for WorkflowRunner {
    async fn run(&self, search_term: &str) -> anyhow::Result<PassReport> {
        Ok(self.workflow.run_pass(&self.surface, search_term).await)
    }
}

/// Build everything from config and hand control to the polling loop.
pub async fn run(cfg: PatrolConfig, headless_flag: bool, per_sheet: bool) -> anyhow::Result<()> {
    let policy = RetryPolicy::new(cfg.retries_time, Duration::from_millis(250));
    let options = BrowserOptions {
        webdriver_url: cfg.webdriver_url.clone(),
        headless: cfg.headless || headless_flag,
    };

    // Driver-start exhaustion is the one mid-stack failure the loop cannot
    // recover from, so it surfaces here and takes the process down.
    let session = BrowserSession::start(&cfg.default_url, &options, policy)
        .await
        .map_err(|e| PatrolError::Driver(e.into()))?;

    let store = build_sheet_store(&cfg)?;

    let selectors = SurfaceSelectors {
        overlay_close: cfg.selectors.overlay_close.clone(),
        search_input: cfg.selectors.search_input.clone(),
        result_item: cfg.selectors.result_item.clone(),
    };
    let surface = ListingSurface::new(session.page(), selectors);
    let runner = WorkflowRunner {
        workflow: Workflow::new(cfg.continue_on_phase_failure),
        surface,
    };

    let sheet_names = cfg.sheet_names();
    let mode = if per_sheet {
        if sheet_names.is_empty() {
            return Err(PatrolError::Config(
                "per-sheet mode requires SHEET_NAMES".to_string(),
            )
            .into());
        }
        CycleMode::PerSheet
    } else {
        CycleMode::SingleTerm
    };

    let scheduler = PollingScheduler::new(
        runner,
        session,
        store,
        cfg.refresh_interval(),
        cfg.search_term.clone(),
        sheet_names,
    );
    scheduler.run_forever(mode).await
}

fn build_sheet_store(cfg: &PatrolConfig) -> anyhow::Result<Option<Arc<dyn SheetStore>>> {
    let Some(url) = &cfg.spread_sheet_url else {
        info!("no spreadsheet configured; sheet gateway disabled");
        return Ok(None);
    };
    let url = Url::parse(url).context("SPREAD_SHEET_URL is not a valid url")?;

    if let Some(path) = &cfg.key_path {
        let path = Path::new(path);
        match load_service_account_key(path) {
            Ok(Some(key)) => {
                info!(account = %key.client_email, "service account key loaded");
            }
            Ok(None) => {
                warn!("credential file could not be decoded; continuing without it");
            }
            Err(e) => {
                error!(error = ?e, "credential file unusable");
                return Err(PatrolError::Credentials(path.to_path_buf()).into());
            }
        }
    }

    Ok(Some(Arc::new(RestSheets::new(url))))
}
