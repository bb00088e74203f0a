use std::time::Duration;

const MAX_RETRY_DELAY_MS: u64 = 30_000;

pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let raw = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?;
    let seconds = raw.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(seconds))
}

/// Backoff before the attempt after `attempt` (1-based): base, 2x base, 4x base...
///
/// A server supplied `Retry-After` wins when it is longer than the backoff;
/// both are capped at 30 seconds.
pub fn retry_delay(base_delay_ms: u64, attempt: usize, retry_after: Option<Duration>) -> Duration {
    let exponent = attempt.saturating_sub(1).min(10) as u32;
    let scaled = base_delay_ms.saturating_mul(2_u64.saturating_pow(exponent));
    let backoff = Duration::from_millis(scaled.min(MAX_RETRY_DELAY_MS));
    let cap = Duration::from_millis(MAX_RETRY_DELAY_MS);
    match retry_after {
        Some(delay) => delay.min(cap).max(backoff),
        None => backoff,
    }
}

pub fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

/// GraphQL endpoint paired with a REST API base.
///
/// `https://api.github.com` maps to `https://api.github.com/graphql`; GitHub
/// Enterprise `https://host/api/v3` maps to `https://host/api/graphql`.
pub fn graphql_url_for_api_base(api_base: &str) -> String {
    let trimmed = api_base.trim().trim_end_matches('/');
    match trimmed.strip_suffix("/v3") {
        Some(enterprise_base) => format!("{enterprise_base}/graphql"),
        None => format!("{trimmed}/graphql"),
    }
}

#[cfg(test)]
mod tests {
    use super::{graphql_url_for_api_base, parse_retry_after, retry_delay, truncate_for_error};
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
    use std::time::Duration;

    #[test]
    fn unit_parse_retry_after_parses_seconds_and_rejects_invalid_values() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("4"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(4)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("bad-value"));
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn unit_retry_delay_doubles_from_base() {
        assert_eq!(retry_delay(1_000, 1, None), Duration::from_millis(1_000));
        assert_eq!(retry_delay(1_000, 2, None), Duration::from_millis(2_000));
        assert_eq!(retry_delay(1_000, 3, None), Duration::from_millis(4_000));
    }

    #[test]
    fn functional_retry_delay_honors_longer_retry_after() {
        assert_eq!(
            retry_delay(1_000, 1, Some(Duration::from_secs(5))),
            Duration::from_secs(5)
        );
        assert_eq!(
            retry_delay(1_000, 2, Some(Duration::from_millis(100))),
            Duration::from_millis(2_000)
        );
    }

    #[test]
    fn unit_retry_delay_caps_backoff_growth() {
        assert_eq!(retry_delay(2_000, 11, None), Duration::from_millis(30_000));
        assert_eq!(retry_delay(20_000, 2, None), Duration::from_millis(30_000));
    }

    #[test]
    fn regression_retry_delay_caps_server_retry_after() {
        assert_eq!(
            retry_delay(1_000, 1, Some(Duration::from_secs(3_600))),
            Duration::from_millis(30_000)
        );
    }

    #[test]
    fn regression_truncate_for_error_preserves_unicode_boundaries() {
        assert_eq!(truncate_for_error("ta🌊u", 3), "ta🌊...");
        assert_eq!(truncate_for_error("ok", 10), "ok");
    }

    #[test]
    fn unit_graphql_url_for_api_base_handles_dotcom_and_enterprise() {
        assert_eq!(
            graphql_url_for_api_base("https://api.github.com/"),
            "https://api.github.com/graphql"
        );
        assert_eq!(
            graphql_url_for_api_base("https://ghe.example.com/api/v3"),
            "https://ghe.example.com/api/graphql"
        );
    }
}
