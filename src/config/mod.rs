//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::assistant::DEFAULT_HISTORY_TURNS;
use crate::application::content::WriteMode;
use crate::domain::types::ContentKind;

mod cli;

pub use cli::*;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const ENV_PREFIX: &str = "FOLIO";
const DEFAULT_GITHUB_API: &str = "https://api.github.com";
const DEFAULT_LOCAL_ROOT: &str = "content";
const DEFAULT_SESSION_FILE: &str = ".folio/session";
const DEFAULT_MIRROR_DIR: &str = ".folio/mirror";
const DEFAULT_CHAT_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_CHAT_MAX_TOKENS: u32 = 500;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub store: StoreSettings,
    pub content: ContentSettings,
    pub admin: AdminSettings,
    pub mirror: MirrorSettings,
    pub assistant: AssistantSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub write_mode: WriteMode,
    /// Unset means requests wait as long as the transport allows.
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub enum StoreBackend {
    GitHub(GitHubSettings),
    Local { root: PathBuf },
    Memory,
}

#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub api_base: Url,
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    /// Checked when the store is opened; read-only commands never need it.
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub projects_path: String,
    pub blogs_path: String,
}

impl ContentSettings {
    pub fn path_for(&self, kind: ContentKind) -> &str {
        match kind {
            ContentKind::Projects => &self.projects_path,
            ContentKind::Blogs => &self.blogs_path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminSettings {
    /// Empty means no secret is configured and every login fails.
    pub secret: String,
    pub session_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MirrorSettings {
    /// `None` keeps the mirror in memory for the life of the process.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub endpoint: Url,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: NonZeroU32,
    pub history_turns: usize,
    pub system_prompt: Option<String>,
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_global_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    store: RawStoreSettings,
    content: RawContentSettings,
    admin: RawAdminSettings,
    mirror: RawMirrorSettings,
    assistant: RawAssistantSettings,
}

impl RawSettings {
    fn apply_global_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(secret) = overrides.admin_secret.as_ref() {
            self.admin.secret = Some(secret.clone());
        }
        if let Some(path) = overrides.session_file.as_ref() {
            self.admin.session_file = Some(path.clone());
        }
        if let Some(backend) = overrides.store_backend.as_ref() {
            self.store.backend = Some(backend.clone());
        }
        if let Some(token) = overrides.store_token.as_ref() {
            self.store.token = Some(token.clone());
        }
        if let Some(root) = overrides.store_root.as_ref() {
            self.store.local_root = Some(root.clone());
        }
        if let Some(mode) = overrides.write_mode.as_ref() {
            self.store.write_mode = Some(mode.clone());
        }
        if let Some(dir) = overrides.mirror_dir.as_ref() {
            self.mirror.directory = Some(dir.clone());
            self.mirror.enabled = Some(true);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            store,
            content,
            admin,
            mirror,
            assistant,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let store = build_store_settings(store)?;
        let content = build_content_settings(content)?;
        let admin = build_admin_settings(admin);
        let mirror = build_mirror_settings(mirror);
        let assistant = build_assistant_settings(assistant)?;

        Ok(Self {
            logging,
            store,
            content,
            admin,
            mirror,
            assistant,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_store_settings(store: RawStoreSettings) -> Result<StoreSettings, LoadError> {
    let write_mode = match store.write_mode {
        Some(mode) => WriteMode::from_str(&mode)
            .map_err(|reason| LoadError::invalid("store.write_mode", reason))?,
        None => WriteMode::default(),
    };

    let request_timeout = optional_timeout(store.request_timeout_seconds);

    let backend_name = store
        .backend
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_else(|| "local".to_string());
    let backend = match backend_name.as_str() {
        "github" => {
            let api_base = parse_url(
                store.api_base.as_deref().unwrap_or(DEFAULT_GITHUB_API),
                "store.api_base",
            )?;
            let owner = required(store.owner, "store.owner")?;
            let repo = required(store.repo, "store.repo")?;
            StoreBackend::GitHub(GitHubSettings {
                api_base,
                owner,
                repo,
                branch: non_blank(store.branch),
                token: non_blank(store.token),
            })
        }
        "local" => StoreBackend::Local {
            root: store
                .local_root
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_ROOT)),
        },
        "memory" => StoreBackend::Memory,
        other => {
            return Err(LoadError::invalid(
                "store.backend",
                format!("unknown backend `{other}` (expected github, local or memory)"),
            ));
        }
    };

    Ok(StoreSettings {
        backend,
        write_mode,
        request_timeout,
    })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let projects_path = blob_path(
        content.projects_path,
        ContentKind::Projects,
        "content.projects_path",
    )?;
    let blogs_path = blob_path(content.blogs_path, ContentKind::Blogs, "content.blogs_path")?;

    if projects_path == blogs_path {
        return Err(LoadError::invalid(
            "content.blogs_path",
            "projects and blog posts must be stored at different paths",
        ));
    }

    Ok(ContentSettings {
        projects_path,
        blogs_path,
    })
}

fn build_admin_settings(admin: RawAdminSettings) -> AdminSettings {
    AdminSettings {
        secret: admin.secret.unwrap_or_default(),
        session_file: admin
            .session_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE)),
    }
}

fn build_mirror_settings(mirror: RawMirrorSettings) -> MirrorSettings {
    let directory = mirror.enabled.unwrap_or(true).then(|| {
        mirror
            .directory
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MIRROR_DIR))
    });
    MirrorSettings { directory }
}

fn build_assistant_settings(
    assistant: RawAssistantSettings,
) -> Result<AssistantSettings, LoadError> {
    let endpoint = parse_url(
        assistant
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_CHAT_ENDPOINT),
        "assistant.endpoint",
    )?;

    let max_tokens = assistant.max_tokens.unwrap_or(DEFAULT_CHAT_MAX_TOKENS);
    let max_tokens = NonZeroU32::new(max_tokens)
        .ok_or_else(|| LoadError::invalid("assistant.max_tokens", "must be greater than zero"))?;

    let history_turns = assistant.history_turns.unwrap_or(DEFAULT_HISTORY_TURNS);
    if history_turns == 0 {
        return Err(LoadError::invalid(
            "assistant.history_turns",
            "must be greater than zero",
        ));
    }

    Ok(AssistantSettings {
        endpoint,
        api_key: non_blank(assistant.api_key),
        model: non_blank(assistant.model).unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
        max_tokens,
        history_turns,
        system_prompt: non_blank(assistant.system_prompt),
        request_timeout: optional_timeout(assistant.request_timeout_seconds),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStoreSettings {
    backend: Option<String>,
    write_mode: Option<String>,
    request_timeout_seconds: Option<u64>,
    api_base: Option<String>,
    owner: Option<String>,
    repo: Option<String>,
    branch: Option<String>,
    token: Option<String>,
    local_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    projects_path: Option<String>,
    blogs_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAdminSettings {
    secret: Option<String>,
    session_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMirrorSettings {
    enabled: Option<bool>,
    directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAssistantSettings {
    endpoint: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    history_turns: Option<usize>,
    system_prompt: Option<String>,
    request_timeout_seconds: Option<u64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn required(value: Option<String>, key: &'static str) -> Result<String, LoadError> {
    non_blank(value).ok_or_else(|| LoadError::invalid(key, "required for the github backend"))
}

fn parse_url(value: &str, key: &'static str) -> Result<Url, LoadError> {
    Url::parse(value).map_err(|err| LoadError::invalid(key, format!("invalid URL `{value}`: {err}")))
}

/// Zero and unset both mean no timeout.
fn optional_timeout(seconds: Option<u64>) -> Option<Duration> {
    seconds.filter(|&secs| secs > 0).map(Duration::from_secs)
}

fn blob_path(
    value: Option<String>,
    kind: ContentKind,
    key: &'static str,
) -> Result<String, LoadError> {
    let path = non_blank(value).unwrap_or_else(|| kind.default_path().to_string());
    let escapes = path.starts_with('/')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "..");
    if escapes {
        return Err(LoadError::invalid(
            key,
            format!("`{path}` must be a relative path inside the repository"),
        ));
    }
    Ok(path)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
