use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Corner of the viewport the launcher button is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
}

/// How the success/failure panels behave after a submission settles.
///
/// The two shipped behaviors differ on purpose: a widget that collapses after
/// a successful send, and one that stays open so the visitor can keep the
/// thread going. Both are kept as presets instead of being unified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelPolicy {
    pub success_delay: Duration,
    pub error_delay: Duration,
    pub close_after_success: bool,
}

impl PanelPolicy {
    /// Panels auto-hide after 5s; the popup stays open either way.
    pub fn stay_open() -> Self {
        Self {
            success_delay: Duration::from_secs(5),
            error_delay: Duration::from_secs(5),
            close_after_success: false,
        }
    }

    /// Success panel hides after 3s and the popup collapses with it.
    pub fn auto_close() -> Self {
        Self {
            success_delay: Duration::from_secs(3),
            error_delay: Duration::from_secs(5),
            close_after_success: true,
        }
    }
}

impl Default for PanelPolicy {
    fn default() -> Self {
        Self::stay_open()
    }
}

/// Fully-resolved widget configuration. Built once via [`WidgetConfig::resolve`]
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    pub title: String,
    pub subtitle: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub position: Position,
    /// Webhook the collected lead is POSTed to. `None` means no network
    /// delivery is configured; the payload is logged instead (or handed to a
    /// caller-supplied callback transport).
    pub endpoint_url: Option<Url>,
    pub panel: PanelPolicy,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            title: "Chat with us".to_string(),
            subtitle: "We'll get back to you shortly!".to_string(),
            primary_color: "#667eea".to_string(),
            secondary_color: "#764ba2".to_string(),
            position: Position::default(),
            endpoint_url: None,
            panel: PanelPolicy::default(),
        }
    }
}

/// Caller-supplied partial configuration. Every field is optional; unknown
/// keys in the source document are ignored. Color strings are passed through
/// untouched; a bad value shows up as a rendering anomaly, not an error here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WidgetOverrides {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub position: Option<Position>,
    pub endpoint_url: Option<String>,
    pub success_delay_secs: Option<u64>,
    pub error_delay_secs: Option<u64>,
    pub close_after_success: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid endpoint url {raw:?}: {source}")]
    Endpoint {
        raw: String,
        source: url::ParseError,
    },
}

impl WidgetConfig {
    /// Shallow-merge overrides onto the defaults. Absent options keep their
    /// default; the endpoint is the only value that must parse up front.
    pub fn resolve(overrides: WidgetOverrides) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(title) = overrides.title {
            cfg.title = title;
        }
        if let Some(subtitle) = overrides.subtitle {
            cfg.subtitle = subtitle;
        }
        if let Some(color) = overrides.primary_color {
            cfg.primary_color = color;
        }
        if let Some(color) = overrides.secondary_color {
            cfg.secondary_color = color;
        }
        if let Some(position) = overrides.position {
            cfg.position = position;
        }
        if let Some(raw) = overrides.endpoint_url {
            let url = raw
                .parse()
                .map_err(|source| ConfigError::Endpoint { raw, source })?;
            cfg.endpoint_url = Some(url);
        }
        if let Some(secs) = overrides.success_delay_secs {
            cfg.panel.success_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = overrides.error_delay_secs {
            cfg.panel.error_delay = Duration::from_secs(secs);
        }
        if let Some(close) = overrides.close_after_success {
            cfg.panel.close_after_success = close;
        }
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let overrides: WidgetOverrides = toml::from_str(&raw)?;
        Self::resolve(overrides)
    }

    /// CSS gradient derived from the two theme colors.
    pub fn gradient(&self) -> String {
        format!(
            "linear-gradient(135deg, {} 0%, {} 100%)",
            self.primary_color, self.secondary_color
        )
    }
}
