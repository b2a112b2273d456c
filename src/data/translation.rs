//! Fun-translation lookup with content-hash cache keys
//!
//! Every upstream failure (network, 4xx, 5xx after retries, malformed body)
//! collapses into `Translation::Unavailable`. Translations never fail.

use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::transport::{check_base_url, BaseUrlError, HttpTransport};
use super::{Translation, TranslationStyle};
use crate::cache::{CacheFacade, NO_EXPIRY};
use crate::retry::RetryPolicy;

/// Base URL for the fun translations API
pub const DEFAULT_TRANSLATION_BASE_URL: &str = "https://api.funtranslations.com/translate";

#[derive(Debug, Deserialize)]
struct ApiTranslation {
    contents: ApiContents,
}

#[derive(Debug, Deserialize)]
struct ApiContents {
    translated: String,
}

/// Cache key `translation:{style}:{sha256(text) as hex}`
pub fn translation_cache_key(text: &str, style: TranslationStyle) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("translation:{}:{}", style, hex::encode(digest))
}

/// Extracts `contents.translated` from a translation response body
pub fn parse_translation(body: &str) -> Result<String, serde_json::Error> {
    let api: ApiTranslation = serde_json::from_str(body)?;
    Ok(api.contents.translated)
}

/// Translates text, preferring the cache and tolerating any upstream failure
#[derive(Clone)]
pub struct TranslationLookupService {
    transport: Arc<dyn HttpTransport>,
    cache: CacheFacade,
    retry: RetryPolicy,
    base_url: Url,
}

impl TranslationLookupService {
    /// Creates a service with the default retry policy
    ///
    /// Fails if `base_url` cannot take the style as an extra path segment.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        cache: CacheFacade,
        base_url: Url,
    ) -> Result<Self, BaseUrlError> {
        Ok(Self {
            transport,
            cache,
            retry: RetryPolicy::default(),
            base_url: check_base_url(base_url)?,
        })
    }

    /// Replaces the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn translation_url(&self, style: TranslationStyle) -> String {
        let mut url = self.base_url.clone();
        // Base URLs are checked in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(style.as_str());
        }
        url.into()
    }

    /// Translates `text` into `style`
    ///
    /// Returns `Translation::Unavailable` instead of an error; callers are
    /// expected to keep the original text in that case.
    pub async fn translate(&self, text: &str, style: TranslationStyle) -> Translation {
        let cache_key = translation_cache_key(text, style);

        if let Some(translated) = self.cache.get::<String>(&cache_key).await {
            return Translation::Translated(translated);
        }

        let url = self.translation_url(style);
        let body = json!({ "text": text });
        debug!(%url, %style, "requesting translation");

        let response = match self
            .retry
            .execute(|| self.transport.post_json(&url, &body))
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!(%style, %error, "translation unavailable, upstream failed");
                return Translation::Unavailable;
            }
        };

        match parse_translation(&response) {
            Ok(translated) => {
                self.cache.set(&cache_key, &translated, NO_EXPIRY).await;
                Translation::Translated(translated)
            }
            Err(error) => {
                warn!(%style, %error, "translation unavailable, malformed response");
                Translation::Unavailable
            }
        }
    }
}
