//! Loader for Patrol runtime configuration with environment + file overlays.
//!
//! Settings arrive as plain environment variables (`DEFAULT_URL`,
//! `RETRIES_TIME`, ...) the way the deployment scripts export them, optionally
//! overlaid on a settings file. `${VAR}` placeholders inside values are
//! expanded recursively before the typed struct is materialised.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level runtime configuration.
///
/// Every field maps to an environment variable of the same name in upper
/// case; nested selector overrides use `SELECTORS__<FIELD>`.
#[derive(Debug, Clone, Deserialize)]
pub struct PatrolConfig {
    /// Remote spreadsheet to open, by URL. Optional: without it the sheet
    /// gateway is simply not constructed.
    #[serde(default)]
    pub spread_sheet_url: Option<String>,
    /// Comma-separated worksheet names for the per-sheet cycle.
    #[serde(default)]
    pub sheet_names: Option<String>,
    /// Path to the JSON service-account key file.
    #[serde(default)]
    pub key_path: Option<String>,
    /// Page the browser session navigates to at startup. Required.
    pub default_url: String,
    /// Attempts for the driver start sequence.
    #[serde(default = "default_retries_time")]
    pub retries_time: u32,
    /// Seconds to wait between polling passes.
    #[serde(default = "default_refresh_time")]
    pub refresh_time: u64,
    /// Filter applied when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `text` or `json`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Term submitted on every single-term pass.
    #[serde(default = "default_search_term")]
    pub search_term: String,
    /// WebDriver endpoint to attach to. Provisioning the driver binary is the
    /// deployment's job; we only need the address it listens on.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Run the browser without a visible window. Off by default.
    #[serde(default)]
    pub headless: bool,
    /// When false, a failed phase gates the remainder of the pass instead of
    /// letting the next phase run against whatever the page shows.
    #[serde(default = "default_true")]
    pub continue_on_phase_failure: bool,
    #[serde(default)]
    pub selectors: Selectors,
}

/// CSS selectors for the page elements the workflow touches.
#[derive(Debug, Clone, Deserialize)]
pub struct Selectors {
    /// Close control of the overlay that blocks the page on first load.
    #[serde(default = "default_overlay_close")]
    pub overlay_close: String,
    /// The search input field.
    #[serde(default = "default_search_input")]
    pub search_input: String,
    /// One entry in the result list.
    #[serde(default = "default_result_item")]
    pub result_item: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            overlay_close: default_overlay_close(),
            search_input: default_search_input(),
            result_item: default_result_item(),
        }
    }
}

fn default_retries_time() -> u32 {
    3
}
fn default_refresh_time() -> u64 {
    60
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_search_term() -> String {
    "IB2400338031".into()
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}
fn default_true() -> bool {
    true
}
fn default_overlay_close() -> String {
    "#popup-close".into()
}
fn default_search_input() -> String {
    "input[name='keyword']".into()
}
fn default_result_item() -> String {
    ".content__body__left__item__infor".into()
}

impl PatrolConfig {
    /// Worksheet names, split and trimmed; empty when `SHEET_NAMES` is unset.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheet_names
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Pause between polling passes.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_time)
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (env + optional file).
pub struct PatrolConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PatrolConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PatrolConfigLoader {
    /// Start from the process environment. Variables are un-prefixed
    /// (`DEFAULT_URL`, not `PATROL__DEFAULT_URL`); `__` separates nesting.
    pub fn new() -> Self {
        let builder = Config::builder()
            .add_source(Environment::default().separator("__").try_parsing(true));
        Self { builder }
    }

    /// Attach a settings file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use patrol_config::PatrolConfigLoader;
    ///
    /// let cfg = PatrolConfigLoader::new()
    ///     .with_yaml_str("default_url: \"https://example.test\"")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.default_url, "https://example.test");
    /// assert_eq!(cfg.retries_time, 3);
    /// assert!(cfg.continue_on_phase_failure);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// Values pass through `${VAR}` expansion before the typed struct is
    /// built, so a settings file can reference secrets kept in the
    /// environment.
    pub fn load(self) -> Result<PatrolConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: PatrolConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("TARGET_HOST", Some("example.test"), || {
            let mut v = json!("https://${TARGET_HOST}/search");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("https://example.test/search"));
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("INNER", Some("deep")),
                ("OUTER", Some("mid-${INNER}")),
            ],
            || {
                let mut v = json!("X=${OUTER}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=mid-deep"));
            },
        );
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn stops_on_cycles_and_terminates() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    // Loader tests read the ambient environment, so keep them serial.
    #[test]
    #[serial]
    fn sheet_names_split_and_trim() {
        let cfg = PatrolConfigLoader::new()
            .with_yaml_str(
                r#"
default_url: "https://example.test"
sheet_names: "alpha, beta ,,gamma"
"#,
            )
            .load()
            .unwrap();
        assert_eq!(cfg.sheet_names(), vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    #[serial]
    fn missing_required_url_is_an_error() {
        let err = PatrolConfigLoader::new()
            .with_yaml_str("log_level: debug")
            .load();
        assert!(err.is_err());
    }
}
