use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::HeraldError;

/// Names of the secrets that must be present before the poller may start,
/// in the order they are reported when missing.
pub const REQUIRED_VARIABLES: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_RETRY_PERIOD_SECS: u64 = 600;
/// One day back, so a fresh process picks up reviews changed since yesterday.
const DEFAULT_LOOKBACK_SECS: u64 = 86_400;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_MAX_FILES: usize = 5;

/// The three secrets the herald cannot run without.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Token for the review status API (`Authorization: OAuth <token>`)
    pub practicum_token: String,
    /// Telegram bot token
    pub telegram_token: String,
    /// Telegram chat that receives status changes
    pub telegram_chat_id: String,
}

impl Credentials {
    /// Validate the required secrets using `lookup` as the variable source.
    ///
    /// Empty values count as missing. On failure the error names every
    /// missing variable and nothing else.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HeraldError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let [practicum_token, telegram_token, telegram_chat_id] =
            REQUIRED_VARIABLES.map(|name| lookup(name).filter(|value| !value.is_empty()));

        match (practicum_token, telegram_token, telegram_chat_id) {
            (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) => Ok(Self {
                practicum_token,
                telegram_token,
                telegram_chat_id,
            }),
            (practicum_token, telegram_token, telegram_chat_id) => {
                let present = [
                    practicum_token.is_some(),
                    telegram_token.is_some(),
                    telegram_chat_id.is_some(),
                ];
                let missing = REQUIRED_VARIABLES
                    .iter()
                    .zip(present)
                    .filter(|(_, present)| !present)
                    .map(|(name, _)| *name)
                    .collect();
                Err(HeraldError::MissingCredentials { missing })
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

/// How often the log file is rolled over to a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Minutely,
    Hourly,
    Daily,
    Never,
}

impl FromStr for LogRotation {
    type Err = HeraldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minutely" => Ok(LogRotation::Minutely),
            "hourly" => Ok(LogRotation::Hourly),
            "daily" => Ok(LogRotation::Daily),
            "never" => Ok(LogRotation::Never),
            other => Err(HeraldError::Config(format!(
                "HERALD_LOG_ROTATION must be one of minutely, hourly, daily, never; got {other:?}"
            ))),
        }
    }
}

/// Application configuration, built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,

    /// Review status API endpoint
    pub endpoint: String,

    /// Telegram Bot API base URL
    pub telegram_api_url: String,

    /// Pause between two poll iterations (default: 600s)
    pub retry_period: Duration,

    /// How far back the first poll looks (default: one day)
    pub lookback: Duration,

    /// Upper bound for every outgoing HTTP request (default: 30s)
    pub request_timeout: Duration,

    /// Optional file that receives a copy of all log records
    pub log_file: Option<String>,

    /// Roll-over period for `log_file` (default: daily)
    pub log_rotation: LogRotation,

    /// Rolled log files kept next to `log_file`, oldest deleted first (default: 5)
    pub log_max_files: usize,
}

impl AppConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, HeraldError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HeraldError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(&lookup)?;

        Ok(Self {
            credentials,
            endpoint: lookup("HERALD_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            telegram_api_url: lookup("HERALD_TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            retry_period: secs_setting(
                &lookup,
                "HERALD_RETRY_PERIOD_SECS",
                DEFAULT_RETRY_PERIOD_SECS,
            )?,
            lookback: secs_setting(&lookup, "HERALD_LOOKBACK_SECS", DEFAULT_LOOKBACK_SECS)?,
            request_timeout: secs_setting(
                &lookup,
                "HERALD_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            log_file: lookup("HERALD_LOG_FILE").filter(|path| !path.is_empty()),
            log_rotation: match lookup("HERALD_LOG_ROTATION") {
                Some(raw) => raw.parse()?,
                None => LogRotation::Daily,
            },
            log_max_files: match lookup("HERALD_LOG_MAX_FILES") {
                Some(raw) => match raw.trim().parse::<usize>() {
                    Ok(count) if count > 0 => count,
                    _ => {
                        return Err(HeraldError::Config(format!(
                            "HERALD_LOG_MAX_FILES must be a positive integer, got {raw:?}"
                        )));
                    }
                },
                None => DEFAULT_LOG_MAX_FILES,
            },
        })
    }
}

fn secs_setting<F>(lookup: &F, name: &str, default: u64) -> Result<Duration, HeraldError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| HeraldError::Config(format!("{name} must be a valid u64, got {raw:?}"))),
    }
}
