use std::sync::LazyLock;
use std::time::Duration;

/// User-Agent sent with every outgoing HTTP request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Global HTTP client instance
///
/// Initialized lazily on first access and reused for every HTTP provider.
/// Per-request deadlines come from `delivery.timeout_seconds` and are applied
/// on the request builder, so the client-wide timeout is only an upper bound.
///
/// # Example
/// ```ignore
/// use crate::external::client::HTTP_CLIENT;
///
/// let response = HTTP_CLIENT
///     .post("https://api.pushover.net/1/messages.json")
///     .timeout(Duration::from_secs(5))
///     .form(&[("token", "A"), ("user", "K"), ("message", "hi")])
///     .send()
///     .await?;
/// ```
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        // One-shot process, keep the pool small
        .pool_max_idle_per_host(1)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_initialization() {
        // Access the client to ensure it initializes without panicking
        let _ = &*HTTP_CLIENT;
    }

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("sendnotify-rs/"));
    }
}
