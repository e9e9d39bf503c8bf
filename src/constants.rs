use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Whether the process runs in production mode. Read once; error responses
/// consult this to decide if diagnostic details may be included.
static IS_PRODUCTION: Lazy<bool> = Lazy::new(|| {
    std::env::var("APP_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false)
});

pub fn is_production() -> bool {
    *IS_PRODUCTION
}
