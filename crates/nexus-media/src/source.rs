//! Web image source.
//!
//! Images come from a Lorem Picsum compatible endpoint. Each species gets
//! deterministic seeds so reruns fetch the same pictures.

use std::time::Duration;

use nexus_config::MediaConfig;

use crate::error::MediaError;
use crate::hash::stable_hash;

/// Bodies at or below this size are treated as error pages.
pub const MIN_IMAGE_BYTES: usize = 1000;

/// Pause between the search terms of one species.
const TERM_PAUSE: Duration = Duration::from_millis(500);

/// Distinct seeds per endpoint.
const SEED_SPACE: u64 = 1000;

/// An image downloaded for a species.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub url: String,
    /// Search term that produced the image.
    pub term: String,
}

/// URLs tried for `term`, in order.
#[must_use]
pub fn candidate_urls(base_url: &str, term: &str) -> [String; 2] {
    let base = base_url.trim_end_matches('/');
    let primary = stable_hash(term) % SEED_SPACE;
    let backup = stable_hash(&format!("{term}bio")) % SEED_SPACE;
    [
        format!("{base}/400/300?random={primary}"),
        format!("{base}/450/350?random={backup}"),
    ]
}

/// Search terms for a species: scientific name, then the common name when
/// there is one.
#[must_use]
pub fn search_terms(scientific: &str, popular: Option<&str>) -> Vec<String> {
    let mut terms = vec![scientific.to_string()];
    match popular.map(str::trim) {
        Some(popular) if !popular.is_empty() && popular != scientific => {
            terms.push(popular.to_string());
        }
        _ => {}
    }
    terms
}

/// True for a response worth storing.
#[must_use]
pub const fn is_acceptable(status: u16, body_len: usize) -> bool {
    status == 200 && body_len > MIN_IMAGE_BYTES
}

/// HTTP client for the configured image endpoint.
#[derive(Debug, Clone)]
pub struct ImageSource {
    http: reqwest::Client,
    base_url: String,
}

impl ImageSource {
    /// Build a source from the `[media]` section.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nexus-bio/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.image_base_url.clone(),
        })
    }

    /// Try both candidate URLs for `term`.
    ///
    /// Failed requests and unusable bodies are logged and skipped; `None`
    /// means neither URL produced an image.
    pub async fn fetch(&self, term: &str) -> Option<FetchedImage> {
        for (attempt, url) in candidate_urls(&self.base_url, term).into_iter().enumerate() {
            tracing::debug!(attempt = attempt + 1, %url, "fetching image");
            match self.try_url(&url).await {
                Ok(Some(bytes)) => {
                    tracing::debug!(%url, bytes = bytes.len(), "image fetched");
                    return Some(FetchedImage {
                        bytes,
                        url,
                        term: term.to_string(),
                    });
                }
                Ok(None) => {}
                Err(error) => tracing::warn!(%url, %error, "image request failed"),
            }
        }
        None
    }

    async fn try_url(&self, url: &str) -> Result<Option<Vec<u8>>, MediaError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;
        if is_acceptable(status, bytes.len()) {
            Ok(Some(bytes.to_vec()))
        } else {
            tracing::debug!(%url, status, bytes = bytes.len(), "unusable image response");
            Ok(None)
        }
    }

    /// Try every search term of a species until one yields an image.
    pub async fn fetch_species(&self, scientific: &str, popular: Option<&str>) -> Option<FetchedImage> {
        let terms = search_terms(scientific, popular);
        let last = terms.len().saturating_sub(1);
        for (index, term) in terms.iter().enumerate() {
            if let Some(image) = self.fetch(term).await {
                return Some(image);
            }
            if index < last {
                tokio::time::sleep(TERM_PAUSE).await;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn candidate_urls_are_deterministic() {
        let first = candidate_urls("https://picsum.photos/", "Panthera onca");
        let again = candidate_urls("https://picsum.photos", "Panthera onca");
        assert_eq!(first, again);
        assert!(first[0].starts_with("https://picsum.photos/400/300?random="));
        assert!(first[1].starts_with("https://picsum.photos/450/350?random="));

        let seed: u64 = first[0].rsplit('=').next().unwrap().parse().unwrap();
        assert!(seed < SEED_SPACE);
        assert_eq!(seed, stable_hash("Panthera onca") % SEED_SPACE);
    }

    #[test]
    fn terms_skip_missing_or_duplicate_common_names() {
        assert_eq!(
            search_terms("Panthera onca", Some("Onça-pintada")),
            vec!["Panthera onca", "Onça-pintada"]
        );
        assert_eq!(search_terms("Panthera onca", Some("  ")), vec!["Panthera onca"]);
        assert_eq!(search_terms("Panthera onca", None), vec!["Panthera onca"]);
        assert_eq!(
            search_terms("Panthera onca", Some("Panthera onca")),
            vec!["Panthera onca"]
        );
    }

    #[rstest]
    #[case(200, 50_000, true)]
    #[case(200, 1000, false)]
    #[case(404, 50_000, false)]
    #[case(302, 50_000, false)]
    fn acceptance_needs_ok_and_a_real_body(
        #[case] status: u16,
        #[case] len: usize,
        #[case] expected: bool,
    ) {
        assert_eq!(is_acceptable(status, len), expected);
    }

    #[test]
    fn source_builds_from_config() {
        let source = ImageSource::new(&MediaConfig::default()).unwrap();
        assert_eq!(source.base_url, "https://picsum.photos");
    }
}
