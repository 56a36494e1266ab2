//! Loader for menumap configuration with YAML + environment overlays.
//!
//! Configuration merges three layers, later ones winning: built-in
//! defaults, an optional YAML file (`menumap.yaml` by convention), and
//! `MENUMAP_`-prefixed environment variables. String values may reference
//! environment variables as `${VAR}`; references are expanded recursively
//! with a depth cap so cycles terminate.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct MenumapConfig {
    pub capture: CaptureConfig,
    pub extract: ExtractConfig,
}

/// Settings for the browser capture pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Page to capture.
    pub url: String,
    pub screenshot_path: PathBuf,
    pub dom_path: PathBuf,
    pub coordinates_path: PathBuf,
    pub headless: bool,
    /// Endpoint of a running chromedriver.
    pub webdriver_url: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            url: "https://www.kcisa.kr/kr/contents/open_openData/view.do".into(),
            screenshot_path: "menumap_full_page.png".into(),
            dom_path: "menumap_full_dom.html".into(),
            coordinates_path: "menumap_link_coordinates.txt".into(),
            headless: true,
            webdriver_url: "http://localhost:9515".into(),
        }
    }
}

/// Settings for the LLM extraction pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Saved DOM to read; defaults to the capture pass's output.
    pub html_path: PathBuf,
    pub output_path: PathBuf,
    pub model: String,
    /// Usually `${GEMINI_API_KEY}` so the key never lands in the file.
    pub api_key: Option<String>,
    /// CSS selector for the navigation wrapper.
    pub selector: String,
    /// Tried when `selector` matches nothing.
    pub fallback_selector: String,
    /// Maximum menu nesting depth the response schema supports.
    pub max_depth: usize,
    pub retry: RetryConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            html_path: "menumap_full_dom.html".into(),
            output_path: "menumap_menu.json".into(),
            model: "gemini-2.5-flash".into(),
            api_key: None,
            selector: "nav.gnb__aligner".into(),
            fallback_selector: "header".into(),
            max_depth: 6,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_secs: 30,
        }
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

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct MenumapConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for MenumapConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MenumapConfigLoader {
    /// Start with the defaults: `MENUMAP_` env overrides on top of the
    /// built-in values.
    ///
    /// ```
    /// use menumap_config::MenumapConfigLoader;
    ///
    /// let config = MenumapConfigLoader::new().load().expect("defaults load");
    ///
    /// assert_eq!(config.extract.max_depth, 6);
    /// assert_eq!(config.extract.retry.max_attempts, 3);
    /// assert!(config.capture.headless);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("MENUMAP").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file. Missing files are tolerated so
    /// environment-only deployments work without one.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use menumap_config::MenumapConfigLoader;
    ///
    /// let config = MenumapConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// capture:
    ///   url: "https://example.org"
    ///   headless: false
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.capture.url, "https://example.org");
    /// assert!(!config.capture.headless);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into the
    /// typed config, expanding `${VAR}` placeholders first.
    ///
    /// ```
    /// use menumap_config::MenumapConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOCTEST_GEMINI_KEY", "from-env"); }
    ///
    /// let config = MenumapConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// extract:
    ///   api_key: "${DOCTEST_GEMINI_KEY}"
    ///   model: "gemini-2.5-flash"
    /// "#,
    ///     )
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.extract.api_key.as_deref(), Some("from-env"));
    ///
    /// unsafe { std::env::remove_var("DOCTEST_GEMINI_KEY"); }
    /// ```
    pub fn load(self) -> Result<MenumapConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first so expansion can walk every
        // string, then materialise the typed config.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: MenumapConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
