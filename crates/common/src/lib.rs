mod client;
mod crypto;
mod env;

pub use client::ModuleClient;
pub use crypto::{hash_password, verify_password, SessionToken, TokenError};
pub use env::{env_or, EnvVars};

/// Seconds since the unix epoch.
pub fn get_current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
