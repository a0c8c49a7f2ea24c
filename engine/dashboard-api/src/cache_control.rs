//! Cache-Control headers and league key helpers
//!
//! Finished seasons never change, so their responses are cached for a year.
//! Current-season responses get a short shared max-age plus a
//! stale-while-revalidate window of twice that.

use warp::http::header::CACHE_CONTROL;
use warp::reply::{with_header, WithHeader};
use warp::Reply;

pub const ONE_YEAR: u32 = 31_536_000;

pub fn cache_control_value(max_age: u32) -> String {
    format!(
        "public, s-maxage={}, stale-while-revalidate={}",
        max_age,
        max_age.saturating_mul(2)
    )
}

/// ONE_YEAR for historical data, `current` otherwise
pub fn max_age(historical: bool, current: u32) -> u32 {
    if historical {
        ONE_YEAR
    } else {
        current
    }
}

pub fn with_cache<T: Reply>(reply: T, max_age: u32) -> WithHeader<T> {
    with_header(reply, CACHE_CONTROL, cache_control_value(max_age))
}

/// `{game}.l.{id}` for a bare league id; full keys pass through
pub fn league_key(league_id: &str, current_game_key: &str) -> String {
    if league_id.contains(".l.") {
        league_id.to_string()
    } else {
        format!("{}.l.{}", current_game_key, league_id)
    }
}

/// A league belongs to an earlier season when its game prefix differs
pub fn is_historical(league_key: &str, current_game_key: &str) -> bool {
    league_key.split('.').next() != Some(current_game_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value() {
        assert_eq!(cache_control_value(60), "public, s-maxage=60, stale-while-revalidate=120");
        assert_eq!(
            cache_control_value(ONE_YEAR),
            "public, s-maxage=31536000, stale-while-revalidate=63072000"
        );
    }

    #[test]
    fn test_max_age() {
        assert_eq!(max_age(true, 120), ONE_YEAR);
        assert_eq!(max_age(false, 120), 120);
    }

    #[test]
    fn test_league_key_normalization() {
        assert_eq!(league_key("12345", "461"), "461.l.12345");
        assert_eq!(league_key("449.l.12345", "461"), "449.l.12345");
    }

    #[test]
    fn test_historical_detection() {
        assert!(is_historical("449.l.12345", "461"));
        assert!(!is_historical("461.l.12345", "461"));
        assert!(is_historical("4611.l.1", "461"));
    }

    #[test]
    fn test_with_cache_sets_header() {
        let response = with_cache(warp::reply::json(&serde_json::json!({})), 300).into_response();
        assert_eq!(
            response.headers().get(CACHE_CONTROL).unwrap(),
            "public, s-maxage=300, stale-while-revalidate=600"
        );
    }
}
