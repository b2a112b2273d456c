//! Species lookup against the PokéAPI species endpoint
//!
//! Cache-aside: the cache is consulted first, a miss goes to the API through
//! the retry policy, and only successful fetches are written back, with no
//! expiry. NotFound answers are not cached.

use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::transport::{check_base_url, BaseUrlError, HttpTransport, UpstreamError};
use super::SpeciesRecord;
use crate::cache::{CacheFacade, NO_EXPIRY};
use crate::retry::RetryPolicy;

/// Base URL for the PokéAPI species endpoint
pub const DEFAULT_SPECIES_BASE_URL: &str = "https://pokeapi.co/api/v2/pokemon-species";

/// Description used when no English flavor text exists
pub const NO_DESCRIPTION: &str = "No description available.";

/// Language code of the flavor text we keep
const ENGLISH: &str = "en";

/// Errors that can occur when looking up a species
#[derive(Debug, Error)]
pub enum SpeciesError {
    /// The species API has no entry for this name
    #[error("Pokémon '{0}' not found")]
    NotFound(String),

    /// The species API failed for any other reason
    #[error("species API request failed: {0}")]
    Upstream(UpstreamError),

    /// The species API answered with an unexpected body
    #[error("failed to parse species response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl SpeciesError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SpeciesError::NotFound(_))
    }
}

/// Response from the species endpoint, reduced to the fields we use
#[derive(Debug, Deserialize)]
struct ApiSpecies {
    name: String,
    #[serde(default)]
    is_legendary: bool,
    habitat: Option<NamedResource>,
    #[serde(default)]
    flavor_text_entries: Vec<FlavorTextEntry>,
}

#[derive(Debug, Deserialize)]
struct FlavorTextEntry {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

/// Lowercases a species name for cache keys and request URLs
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Cache key for a species, identical for any casing of `name`
pub fn species_cache_key(name: &str) -> String {
    format!("species:{}", normalize_name(name))
}

/// Replaces each newline, carriage return and form feed with a space
pub fn clean_flavor_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' | '\u{c}' => ' ',
            other => other,
        })
        .collect()
}

/// Decodes a species response body into a `SpeciesRecord`
pub fn parse_species(body: &str) -> Result<SpeciesRecord, serde_json::Error> {
    let api: ApiSpecies = serde_json::from_str(body)?;

    let description = api
        .flavor_text_entries
        .iter()
        .find(|entry| entry.language.name == ENGLISH)
        .map(|entry| clean_flavor_text(&entry.flavor_text))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    Ok(SpeciesRecord {
        name: api.name,
        description,
        habitat: api.habitat.map(|h| h.name),
        is_legendary: api.is_legendary,
    })
}

/// Fetches species records, preferring the cache
#[derive(Clone)]
pub struct SpeciesLookupService {
    transport: Arc<dyn HttpTransport>,
    cache: CacheFacade,
    retry: RetryPolicy,
    base_url: Url,
}

impl SpeciesLookupService {
    /// Creates a service with the default retry policy
    ///
    /// Fails if `base_url` cannot take a name as an extra path segment.
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

    /// Builds `{base_url}/{name}`, escaping the name as one path segment
    fn species_url(&self, name: &str) -> String {
        let mut url = self.base_url.clone();
        // Base URLs are checked in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url.into()
    }

    /// Looks up a species by name, case-insensitively
    ///
    /// # Returns
    /// * `Ok(SpeciesRecord)` - From the cache, or freshly fetched and cached
    /// * `Err(SpeciesError::NotFound)` - The API answered 404
    /// * `Err(SpeciesError)` - Any other failure once retries are spent
    pub async fn fetch(&self, name: &str) -> Result<SpeciesRecord, SpeciesError> {
        let name = normalize_name(name);
        let cache_key = species_cache_key(&name);

        if let Some(record) = self.cache.get::<SpeciesRecord>(&cache_key).await {
            return Ok(record);
        }

        let url = self.species_url(&name);
        debug!(%url, "fetching species");
        let body = self
            .retry
            .execute(|| self.transport.get(&url))
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    SpeciesError::NotFound(name.clone())
                } else {
                    SpeciesError::Upstream(e)
                }
            })?;

        let record = parse_species(&body)?;
        self.cache.set(&cache_key, &record, NO_EXPIRY).await;
        info!(species = %record.name, "fetched species from upstream");
        Ok(record)
    }
}
