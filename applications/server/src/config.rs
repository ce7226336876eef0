/// Service configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub queue: QueueSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub recommend: RecommendSettings,

    #[serde(default)]
    pub worker: WorkerSettings,

    #[serde(default)]
    pub intake: IntakeSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// `["*"]` allows any origin
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_region")]
    pub region: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueSettings {
    /// SQLite URL of the job queue. Unset means intake rejects every request.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_visibility_timeout_secs")]
    pub visibility_timeout_secs: u64,

    /// Deliveries before a message is dead-lettered
    #[serde(default = "default_max_receive_count")]
    pub max_receive_count: u32,

    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Delay before a failed message becomes visible again
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageSettings {
    /// SQLite URL of the playlist table. Unset disables reads and the worker.
    #[serde(default)]
    pub table_url: Option<String>,

    /// Directory that receives a JSON snapshot of every new playlist
    #[serde(default)]
    pub bucket_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendSettings {
    /// Skip recommendation lookups entirely
    #[serde(default)]
    pub offline: bool,

    /// JSON secret with `spotify_client_id` and `spotify_client_secret`
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_accounts_base_url")]
    pub accounts_base_url: String,

    #[serde(default = "default_recommend_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerSettings {
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Upper bound on processing one message
    #[serde(default = "default_invocation_timeout_secs")]
    pub invocation_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntakeSettings {
    #[serde(default = "default_max_count")]
    pub max_count: u32,
}

impl ServiceConfig {
    /// Load configuration from file and environment.
    ///
    /// Reads `path` if given (it must exist), otherwise `config.toml` in the
    /// working directory when present. Variables prefixed `DJ_` override
    /// file values, with `__` separating sections (`DJ_QUEUE__URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load), reading variables from `env` instead of the
    /// process environment when given
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings =
                    settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("DJ")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins")
                .try_parsing(true)
                .source(env),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.queue.max_receive_count == 0 {
            return Err(ServerError::Config(
                "queue.max_receive_count must be at least 1".to_string(),
            ));
        }

        if self.queue.batch_size == 0 {
            return Err(ServerError::Config(
                "queue.batch_size must be at least 1".to_string(),
            ));
        }

        if self.worker.workers == 0 {
            return Err(ServerError::Config(
                "worker.workers must be at least 1".to_string(),
            ));
        }

        if self.worker.invocation_timeout_secs == 0 {
            return Err(ServerError::Config(
                "worker.invocation_timeout_secs must be at least 1".to_string(),
            ));
        }

        // Batches run concurrently, so each lease must outlive one invocation
        if self.worker.invocation_timeout_secs >= self.queue.visibility_timeout_secs {
            return Err(ServerError::Config(format!(
                "queue.visibility_timeout_secs ({}) must exceed worker.invocation_timeout_secs ({})",
                self.queue.visibility_timeout_secs, self.worker.invocation_timeout_secs
            )));
        }

        if self.intake.max_count == 0 {
            return Err(ServerError::Config(
                "intake.max_count must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.queue.visibility_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.queue.poll_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.queue.retry_delay_secs)
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_secs(self.worker.invocation_timeout_secs)
    }
}

// Default values
impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            region: default_region(),
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            url: None,
            visibility_timeout_secs: default_visibility_timeout_secs(),
            max_receive_count: default_max_receive_count(),
            batch_size: default_batch_size(),
            poll_interval_ms: default_poll_interval_ms(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            offline: false,
            credentials_file: None,
            api_base_url: default_api_base_url(),
            accounts_base_url: default_accounts_base_url(),
            timeout_secs: default_recommend_timeout_secs(),
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            invocation_timeout_secs: default_invocation_timeout_secs(),
        }
    }
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_visibility_timeout_secs() -> u64 {
    60
}

fn default_max_receive_count() -> u32 {
    3
}

fn default_batch_size() -> u32 {
    5
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_retry_delay_secs() -> u64 {
    60
}

fn default_api_base_url() -> String {
    "https://api.spotify.com".to_string()
}

fn default_accounts_base_url() -> String {
    "https://accounts.spotify.com".to_string()
}

fn default_recommend_timeout_secs() -> u64 {
    15
}

fn default_workers() -> usize {
    1
}

fn default_invocation_timeout_secs() -> u64 {
    30
}

fn default_max_count() -> u32 {
    100
}
