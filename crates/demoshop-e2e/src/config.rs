//! Suite configuration: base URL, timeouts, screenshot location and browser
//! launch options.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fixtures::{timeouts, Route, DEFAULT_BASE_URL};
use crate::result::{E2eError, E2eResult};

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "BASE_URL";
/// Environment variable pointing at a chromium binary
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";
/// Environment variable toggling headless mode (`0`/`false` shows the window)
pub const ENV_HEADLESS: &str = "HEADLESS";
/// Environment variable overriding the screenshot directory
pub const ENV_SCREENSHOT_DIR: &str = "SCREENSHOT_DIR";

/// Timeouts used by auto-waiting actions and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Actions and `expect` assertions
    pub default: Duration,
    /// Load-state barriers
    pub long: Duration,
    /// Dialog arrival
    pub short: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default: Duration::from_millis(timeouts::DEFAULT_MS),
            long: Duration::from_millis(timeouts::LONG_MS),
            short: Duration::from_millis(timeouts::SHORT_MS),
        }
    }
}

/// Configuration shared by every page handle
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Base URL of the demo shop
    pub base_url: String,
    /// Timeouts
    pub timeouts: Timeouts,
    /// Directory screenshots are written to
    pub screenshot_dir: PathBuf,
    /// Run the browser headless
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: Timeouts::default(),
            screenshot_dir: PathBuf::from("screenshots"),
            headless: true,
            chromium_path: None,
            sandbox: true,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

impl SuiteConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from the process environment
    pub fn from_env() -> E2eResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> E2eResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(url)?;
        }
        if let Some(path) = lookup(ENV_CHROMIUM_PATH).filter(|v| !v.trim().is_empty()) {
            config.chromium_path = Some(path);
        }
        if let Some(flag) = lookup(ENV_HEADLESS) {
            config.headless = parse_flag(ENV_HEADLESS, &flag)?;
        }
        if let Some(dir) = lookup(ENV_SCREENSHOT_DIR).filter(|v| !v.trim().is_empty()) {
            config.screenshot_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Set the base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> E2eResult<Self> {
        let url = url.into();
        let trimmed = url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(E2eError::ConfigError {
                message: format!("{ENV_BASE_URL} must be an http(s) URL, got '{url}'"),
            });
        }
        self.base_url = trimmed.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Set the timeouts
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.screenshot_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Absolute URL of a screen
    #[must_use]
    pub fn url_for(&self, route: Route) -> String {
        self.join(route.path())
    }

    /// Join a path onto the base URL without doubling slashes
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Path a named screenshot is written to
    #[must_use]
    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.screenshot_dir.join(format!("{name}.png"))
    }
}

fn parse_flag(key: &str, value: &str) -> E2eResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(E2eError::ConfigError {
            message: format!("{key} must be a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::new();
        assert_eq!(config.base_url, "http://localhost:3100");
        assert_eq!(config.timeouts.default, Duration::from_millis(5000));
        assert_eq!(config.timeouts.long, Duration::from_millis(10_000));
        assert_eq!(config.timeouts.short, Duration::from_millis(1000));
        assert!(config.headless);
    }

    #[test]
    fn test_url_for_joins_without_double_slash() {
        let config = SuiteConfig::new()
            .with_base_url("http://shop.test:8080/")
            .unwrap();
        assert_eq!(config.url_for(Route::Login), "http://shop.test:8080/login");
        assert_eq!(config.join("grid"), "http://shop.test:8080/grid");
        assert_eq!(config.join("https://other/x"), "https://other/x");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = SuiteConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://staging.example.com"),
            (ENV_HEADLESS, "false"),
            (ENV_CHROMIUM_PATH, "/usr/bin/chromium"),
            (ENV_SCREENSHOT_DIR, "/tmp/shots"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://staging.example.com");
        assert!(!config.headless);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(
            config.screenshot_path("login"),
            PathBuf::from("/tmp/shots/login.png")
        );
    }

    #[test]
    fn test_from_lookup_ignores_blank_values() {
        let config = SuiteConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "  ")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = SuiteConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "localhost:3100")]))
            .unwrap_err();
        assert!(matches!(err, E2eError::ConfigError { .. }));
    }

    #[test]
    fn test_rejects_bad_flag() {
        let err =
            SuiteConfig::from_lookup(lookup_from(&[(ENV_HEADLESS, "maybe")])).unwrap_err();
        assert!(err.to_string().contains("HEADLESS"));
    }

    #[test]
    fn test_default_screenshot_path() {
        let config = SuiteConfig::new();
        assert_eq!(
            config.screenshot_path("checkout"),
            PathBuf::from("screenshots/checkout.png")
        );
    }
}
