use std::time::Duration;

use basket_shared::LatLng;

pub const API_URL_ENV: &str = "BASKET_API_URL";

pub const DEFAULT_REGION_REFRESH_MS: u64 = 3000;
pub const DEFAULT_API_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_API_CONNECT_TIMEOUT_SECS: u64 = 3;
pub const MAX_ORDER_BATCH_COUNT: u32 = 10_000;
pub const NOTIFICATION_BUFFER: usize = 32;

// Map surface
pub const MAP_CENTER: LatLng = LatLng::new(41.0082, 28.9784); // Istanbul
pub const MAP_ZOOM: u8 = 10;
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// Backend base URL, prefixed to every request path. Empty when unset, which
/// makes every request fail as a transport error.
pub fn api_base_url() -> String {
    std::env::var(API_URL_ENV)
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .unwrap_or_default()
}

pub fn region_refresh_interval() -> Duration {
    std::env::var("REGION_REFRESH_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(DEFAULT_REGION_REFRESH_MS))
}

pub fn api_http_timeout() -> Duration {
    std::env::var("API_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_API_HTTP_TIMEOUT_SECS))
}

pub fn api_connect_timeout() -> Duration {
    std::env::var("API_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_API_CONNECT_TIMEOUT_SECS))
}

/// Orders requested per batch. `None` lets the backend use its default.
pub fn order_batch_count() -> Option<u32> {
    std::env::var("ORDER_BATCH_COUNT")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| (1..=MAX_ORDER_BATCH_COUNT).contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_trimmed() {
        temp_env::with_var(API_URL_ENV, Some(" http://localhost:8000/ "), || {
            assert_eq!(api_base_url(), "http://localhost:8000");
        });
        temp_env::with_var(API_URL_ENV, None::<&str>, || {
            assert_eq!(api_base_url(), "");
        });
    }

    #[test]
    fn refresh_interval_rejects_zero_and_garbage() {
        temp_env::with_var("REGION_REFRESH_MS", Some("0"), || {
            assert_eq!(region_refresh_interval(), Duration::from_millis(3000));
        });
        temp_env::with_var("REGION_REFRESH_MS", Some("soon"), || {
            assert_eq!(region_refresh_interval(), Duration::from_millis(3000));
        });
        temp_env::with_var("REGION_REFRESH_MS", Some("750"), || {
            assert_eq!(region_refresh_interval(), Duration::from_millis(750));
        });
    }

    #[test]
    fn timeouts_fall_back_to_defaults() {
        temp_env::with_vars(
            [
                ("API_HTTP_TIMEOUT_SECS", Some("-1")),
                ("API_CONNECT_TIMEOUT_SECS", Some("7")),
            ],
            || {
                assert_eq!(api_http_timeout(), Duration::from_secs(10));
                assert_eq!(api_connect_timeout(), Duration::from_secs(7));
            },
        );
    }

    #[test]
    fn order_batch_count_stays_within_backend_limits() {
        temp_env::with_var("ORDER_BATCH_COUNT", Some("250"), || {
            assert_eq!(order_batch_count(), Some(250));
        });
        temp_env::with_var("ORDER_BATCH_COUNT", Some("20000"), || {
            assert_eq!(order_batch_count(), None);
        });
        temp_env::with_var("ORDER_BATCH_COUNT", None::<&str>, || {
            assert_eq!(order_batch_count(), None);
        });
    }
}
