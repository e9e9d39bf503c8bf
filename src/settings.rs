use config::{Config, ConfigError, Environment, File};
use dotenv::dotenv;
use serde::Deserialize;
use std::{env, fmt, str::FromStr};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    /// Shared secret checked against the `x-api-key` header on every route
    /// except the health check.
    #[serde(default)]
    pub api_key: String,

    /// Shared secret checked against the `x-admin-password` header on the
    /// admin routes.
    #[serde(default)]
    pub admin_password: String,

    #[serde(default)]
    pub supabase_url: Option<String>,

    #[serde(default)]
    pub supabase_service_key: Option<String>,

    #[serde(default = "default_photos_bucket")]
    pub photos_bucket: String,

    #[serde(default = "default_photo_max_bytes")]
    pub photo_max_bytes: usize,

    #[serde(default = "default_upload_rate_limit")]
    pub upload_rate_limit: u64,

    #[serde(default = "default_upload_rate_window_secs")]
    pub upload_rate_window_secs: u64,

    #[serde(default)]
    pub smtp_host: Option<String>,

    #[serde(default)]
    pub smtp_username: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,

    /// Address booking inquiries are delivered to.
    #[serde(default)]
    pub booking_recipient: Option<String>,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "bandsite-backend".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_frontend_url() -> String {
    "https://troniousmusic.com".to_string()
}
fn default_photos_bucket() -> String {
    "event-photos".to_string()
}
fn default_photo_max_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_upload_rate_limit() -> u64 {
    10
}
fn default_upload_rate_window_secs() -> u64 {
    3600
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!("config/{}", env_name.to_string().to_lowercase()))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("APP")
                    .separator("_")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Inject critical env values if missing
        config.api_key = fill_or_env(config.api_key, "APP_API_KEY")?;
        config.admin_password = fill_or_env(config.admin_password, "APP_ADMIN_PASSWORD")?;

        if config.supabase_url.is_none() {
            config.supabase_url = env::var("APP_SUPABASE_URL").ok();
        }
        if config.supabase_service_key.is_none() {
            config.supabase_service_key = env::var("APP_SUPABASE_SERVICE_KEY").ok();
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.api_key.trim().is_empty() {
            errors.push("API_KEY cannot be empty");
        }
        if self.admin_password.trim().is_empty() {
            errors.push("ADMIN_PASSWORD cannot be empty");
        }
        if self.photo_max_bytes == 0 {
            errors.push("PHOTO_MAX_BYTES must be greater than zero");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    /// Whether the hosted store can be reached at all. When this is false
    /// every store-backed route answers 500 without attempting a call.
    pub fn supabase_configured(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_service_key.is_some()
    }

    pub fn smtp_configured(&self) -> bool {
        self.smtp_host.is_some()
            && self.smtp_username.is_some()
            && self.smtp_password.is_some()
            && self.booking_recipient.is_some()
    }

    /// CORS origin policy: development admits localhost on any port;
    /// beyond that an origin must be the frontend URL or one of the
    /// configured allowed origins (`*` admits everything, and is rejected
    /// by `validate` in production).
    pub fn origin_allowed(&self, origin: &str) -> bool {
        if !self.is_production()
            && (origin == "http://localhost" || origin.starts_with("http://localhost:"))
        {
            return true;
        }
        origin == self.frontend_url || self.cors_origins().iter().any(|o| o == "*" || o == origin)
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() { "[MISSING]" } else { "[REDACTED]" }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("frontend_url", &self.frontend_url)
            .field("api_key", &self.api_key.redact())
            .field("admin_password", &self.admin_password.redact())
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_service_key",
                &self.supabase_service_key.as_deref().unwrap_or("").redact(),
            )
            .field("photos_bucket", &self.photos_bucket)
            .field("photo_max_bytes", &self.photo_max_bytes)
            .field("upload_rate_limit", &self.upload_rate_limit)
            .field("upload_rate_window_secs", &self.upload_rate_window_secs)
            .field("smtp_host", &self.smtp_host)
            .field(
                "smtp_password",
                &self.smtp_password.as_deref().unwrap_or("").redact(),
            )
            .field("booking_recipient", &self.booking_recipient)
            .finish()
    }
}
