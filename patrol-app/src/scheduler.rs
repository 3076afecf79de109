//! The outer polling loop.
//!
//! One pass per interval, forever. A pass-level failure is logged and
//! answered with a single session refresh; nothing short of process
//! termination stops the loop.

use std::sync::Arc;
use std::time::Duration;

use patrol_common::host;
use patrol_sheets::SheetStore;
use patrol_workflow::{PassReport, PassRunner, SessionControl};
use tracing::{error, info, warn};

/// What one loop iteration does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMode {
    /// One pass with the configured fixed search term.
    SingleTerm,
    /// One pass per configured worksheet, the worksheet name as the term.
    PerSheet,
}

pub struct PollingScheduler<R, C> {
    runner: R,
    session: C,
    store: Option<Arc<dyn SheetStore>>,
    interval: Duration,
    search_term: String,
    sheet_names: Vec<String>,
}

impl<R: PassRunner, C: SessionControl> PollingScheduler<R, C> {
    pub fn new(
        runner: R,
        session: C,
        store: Option<Arc<dyn SheetStore>>,
        interval: Duration,
        search_term: String,
        sheet_names: Vec<String>,
    ) -> Self {
        Self {
            runner,
            session,
            store,
            interval,
            search_term,
            sheet_names,
        }
    }

    /// Run until the process dies.
    pub async fn run_forever(&self, mode: CycleMode) -> anyhow::Result<()> {
        info!(?mode, interval_secs = self.interval.as_secs(), "polling loop started");
        loop {
            host::clear_screen();
            match mode {
                CycleMode::SingleTerm => self.run_once().await,
                CycleMode::PerSheet => self.run_sheet_cycle().await,
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One single-term pass. A pass-level error never escapes: it is logged
    /// and answered with exactly one refresh before the next pass.
    pub async fn run_once(&self) {
        match self.runner.run(&self.search_term).await {
            Ok(report) => log_report(&report),
            Err(e) => {
                error!(error = ?e, "pass failed; refreshing session");
                self.refresh().await;
            }
        }
    }

    /// One pass per worksheet. A failing sheet is logged and answered with a
    /// refresh; the remaining sheets still run.
    pub async fn run_sheet_cycle(&self) {
        if self.sheet_names.is_empty() {
            warn!("no worksheets configured; nothing to do this cycle");
            return;
        }
        for sheet in &self.sheet_names {
            if let Err(e) = self.run_sheet(sheet).await {
                error!(sheet, error = ?e, "sheet pass failed; refreshing session");
                self.refresh().await;
            }
        }
    }

    async fn run_sheet(&self, sheet: &str) -> anyhow::Result<()> {
        if let Some(store) = &self.store {
            let rows = store.read_rows(sheet).await?;
            info!(sheet, rows = rows.len(), "worksheet read");
        }
        let report = self.runner.run(sheet).await?;
        log_report(&report);
        Ok(())
    }

    async fn refresh(&self) {
        if let Err(e) = self.session.refresh().await {
            // The next pass will surface whatever is wrong; keep looping.
            error!(error = ?e, "session refresh failed");
        }
    }
}

fn log_report(report: &PassReport) {
    if report.succeeded() {
        info!(pass_id = %report.pass_id, term = %report.search_term, "pass complete");
    } else {
        for phase in report.failed_phases() {
            warn!(
                pass_id = %report.pass_id,
                phase = %phase.phase,
                error = phase.error.as_deref().unwrap_or("unknown"),
                "phase failed during pass"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use patrol_sheets::MemorySheets;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRunner {
        terms: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl PassRunner for FakeRunner {
        async fn run(&self, search_term: &str) -> anyhow::Result<PassReport> {
            self.terms.lock().unwrap().push(search_term.to_string());
            if self.fail_on.as_deref() == Some(search_term) {
                anyhow::bail!("pass blew up");
            }
            Ok(PassReport::new(search_term))
        }
    }

    #[derive(Default)]
    struct FakeSession {
        refreshes: AtomicU32,
        url: Mutex<String>,
    }

    impl FakeSession {
        fn at(url: &str) -> Self {
            Self {
                refreshes: AtomicU32::new(0),
                url: Mutex::new(url.to_string()),
            }
        }

        fn refresh_count(&self) -> u32 {
            self.refreshes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionControl for FakeSession {
        async fn refresh(&self) -> anyhow::Result<()> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            // Reloading navigates to the same place.
            let url = self.url.lock().unwrap().clone();
            *self.url.lock().unwrap() = url;
            Ok(())
        }
    }

    fn scheduler(
        runner: FakeRunner,
        session: FakeSession,
        store: Option<Arc<dyn SheetStore>>,
        sheets: &[&str],
    ) -> PollingScheduler<FakeRunner, FakeSession> {
        PollingScheduler::new(
            runner,
            session,
            store,
            Duration::from_secs(60),
            "AB123".to_string(),
            sheets.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn clean_pass_does_not_refresh() {
        let s = scheduler(FakeRunner::default(), FakeSession::at("https://x"), None, &[]);
        s.run_once().await;
        assert_eq!(s.session.refresh_count(), 0);
        assert_eq!(*s.runner.terms.lock().unwrap(), vec!["AB123"]);
    }

    #[tokio::test]
    async fn pass_failure_triggers_exactly_one_refresh_and_no_crash() {
        let runner = FakeRunner {
            fail_on: Some("AB123".to_string()),
            ..Default::default()
        };
        let s = scheduler(runner, FakeSession::at("https://x"), None, &[]);
        s.run_once().await;
        assert_eq!(s.session.refresh_count(), 1);
        // A second cycle keeps going.
        s.run_once().await;
        assert_eq!(s.session.refresh_count(), 2);
    }

    #[tokio::test]
    async fn refresh_is_idempotent_on_the_session_state() {
        let session = FakeSession::at("https://x/search");
        session.refresh().await.unwrap();
        let after_one = session.url.lock().unwrap().clone();
        session.refresh().await.unwrap();
        let after_two = session.url.lock().unwrap().clone();
        assert_eq!(after_one, after_two);
        assert_eq!(session.refresh_count(), 2);
    }

    #[tokio::test]
    async fn failing_sheet_does_not_stop_the_others() {
        let store = Arc::new(MemorySheets::new());
        let header = vec![vec!["code".to_string()]];
        store.insert_sheet("one", header.clone());
        // "two" is missing: its read fails at pass level.
        store.insert_sheet("three", header);

        let s = scheduler(
            FakeRunner::default(),
            FakeSession::at("https://x"),
            Some(store),
            &["one", "two", "three"],
        );
        s.run_sheet_cycle().await;

        assert_eq!(*s.runner.terms.lock().unwrap(), vec!["one", "three"]);
        assert_eq!(s.session.refresh_count(), 1);
    }

    #[tokio::test]
    async fn runner_failure_mid_cycle_also_refreshes_once() {
        let runner = FakeRunner {
            fail_on: Some("two".to_string()),
            ..Default::default()
        };
        let s = scheduler(runner, FakeSession::at("https://x"), None, &["one", "two", "three"]);
        s.run_sheet_cycle().await;

        assert_eq!(
            *s.runner.terms.lock().unwrap(),
            vec!["one", "two", "three"]
        );
        assert_eq!(s.session.refresh_count(), 1);
    }

    #[tokio::test]
    async fn empty_sheet_list_is_a_quiet_no_op() {
        let s = scheduler(FakeRunner::default(), FakeSession::at("https://x"), None, &[]);
        s.run_sheet_cycle().await;
        assert!(s.runner.terms.lock().unwrap().is_empty());
        assert_eq!(s.session.refresh_count(), 0);
    }
}
