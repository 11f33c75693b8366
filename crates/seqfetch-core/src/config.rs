use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Backoff for rate-limited responses (optional section in config.toml).
///
/// When absent, HTTP 429/503 are ordinary per-extension failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleRetryConfig {
    /// Maximum number of attempts per address (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for ThrottleRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 10,
        }
    }
}

/// Encoding every saved image is converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    /// File extension (without dot) of persisted images.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// When a decoded payload is re-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReencodeMode {
    /// Always decode and re-encode at the configured quality.
    #[default]
    Always,
    /// Keep RGB JPEG payloads byte-for-byte; convert everything else.
    NonJpeg,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// JPEG quality, 1..=100. Ignored for PNG.
    pub jpeg_quality: u8,
    pub reencode: ReencodeMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            jpeg_quality: 95,
            reencode: ReencodeMode::Always,
        }
    }
}

/// Overrides for the browser-identifying header set. The origin rejects
/// requests without them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadersConfig {
    pub user_agent: String,
    pub referer: String,
}

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_REFERER: &str = "https://buondua.com/";

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: DEFAULT_REFERER.to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/seqfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeqfetchConfig {
    /// Consecutive fully-failed indices after which the sequence is considered ended.
    pub failure_threshold: u32,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Default zero-padded width of the index in file names.
    pub digit_width: usize,
    /// Candidate extensions, tried in this order for every index.
    pub extensions: Vec<String>,
    pub output: OutputConfig,
    pub headers: HeadersConfig,
    /// Optional backoff for 429/503; if missing, they are not retried.
    pub throttle_retry: Option<ThrottleRetryConfig>,
}

impl Default for SeqfetchConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            request_timeout_secs: 10,
            digit_width: 3,
            extensions: [".jpg", ".jpeg", ".webp", ".png"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            output: OutputConfig::default(),
            headers: HeadersConfig::default(),
            throttle_retry: None,
        }
    }
}

impl SeqfetchConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.failure_threshold == 0 {
            bail!("failure_threshold must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        if self.digit_width == 0 {
            bail!("digit_width must be at least 1");
        }
        if self.extensions.is_empty() {
            bail!("extensions must list at least one candidate");
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            bail!(
                "output.jpeg_quality must be within 1..=100, got {}",
                self.output.jpeg_quality
            );
        }
        if let Some(retry) = &self.throttle_retry {
            if retry.max_attempts == 0 {
                bail!("throttle_retry.max_attempts must be at least 1");
            }
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("seqfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SeqfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SeqfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SeqfetchConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}
