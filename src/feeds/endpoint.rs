use crate::error::{AppError, Result};
use crate::models::{Projection, Visibility};
use url::Url;

pub const URL_PATH_SEPARATOR: char = '/';

/// Build a feed endpoint as `scope/[key/]visibility/projection`.
pub fn build_feed_url(
    scope: &str,
    key: Option<&str>,
    visibility: Visibility,
    projection: Projection,
) -> Result<Url> {
    let mut url = String::from(scope);
    url.push(URL_PATH_SEPARATOR);

    if let Some(key) = key {
        url.push_str(key);
        url.push(URL_PATH_SEPARATOR);
    }

    url.push_str(visibility.value());
    url.push(URL_PATH_SEPARATOR);
    url.push_str(projection.value());

    Url::parse(&url).map_err(|source| AppError::InvalidUrl { url, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_feed_url_with_key() {
        let url = build_feed_url(
            "https://x/feeds/worksheets",
            Some("K1"),
            Visibility::Private,
            Projection::Full,
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://x/feeds/worksheets/K1/private/full");
    }

    #[test]
    fn test_build_feed_url_without_key() {
        let url = build_feed_url(
            "https://x/feeds/worksheets",
            None,
            Visibility::Private,
            Projection::Full,
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://x/feeds/worksheets/private/full");
    }

    #[test]
    fn test_build_feed_url_public_basic() {
        let url = build_feed_url(
            "https://spreadsheets.google.com/feeds/spreadsheets",
            None,
            Visibility::Public,
            Projection::Basic,
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://spreadsheets.google.com/feeds/spreadsheets/public/basic"
        );
    }

    #[test]
    fn test_build_feed_url_rejects_malformed_scope() {
        let err = build_feed_url(
            "feeds/worksheets",
            Some("K1"),
            Visibility::Private,
            Projection::Full,
        )
        .unwrap_err();
        match err {
            AppError::InvalidUrl { url, .. } => assert_eq!(url, "feeds/worksheets/K1/private/full"),
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }
}
