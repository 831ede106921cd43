const EMULATOR_URL: &str = "EMULATOR_URL";

const DEFAULT_EMULATOR_URL: &str = "http://localhost:3080";

/// Emulator base URL, resolved from the environment with a localhost
/// fallback. A URL from the config file takes precedence over both.
pub fn get_emulator_url() -> String {
    let url_from_env = std::env::var(EMULATOR_URL);
    url_from_env.map_or(DEFAULT_EMULATOR_URL.to_string(), |url| {
        if url.is_empty() {
            DEFAULT_EMULATOR_URL.to_string()
        } else {
            url
        }
    })
}
