//! Environment variable parsing helpers

use std::str::FromStr;

/// Parse an environment variable, falling back to `default` when it is
/// missing or does not parse.
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn falls_back_on_missing_or_garbage() {
        std::env::remove_var("DB_POOL_TEST_VALUE");
        assert_eq!(parse_env_with_default("DB_POOL_TEST_VALUE", 3u32), 3);

        std::env::set_var("DB_POOL_TEST_VALUE", "abc");
        assert_eq!(parse_env_with_default("DB_POOL_TEST_VALUE", 3u32), 3);

        std::env::set_var("DB_POOL_TEST_VALUE", "9");
        assert_eq!(parse_env_with_default("DB_POOL_TEST_VALUE", 3u32), 9);

        std::env::remove_var("DB_POOL_TEST_VALUE");
    }
}
