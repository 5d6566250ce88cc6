use std::str::FromStr;

use anyhow::{anyhow, Result};

pub trait EnvVars: Sized {
    fn load() -> Result<Self>;
    fn get_env_var(&self, key: &str) -> String;
}

/// Reads `key` from the environment, falling back to `default` when unset.
/// A value that is set but fails to parse is an error.
pub fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("invalid value for {key}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_when_unset() {
        let port: u16 = env_or("NEXUS_COMMON_TEST_SURELY_UNSET", 3033).unwrap();
        assert_eq!(port, 3033);
    }
}
