//! Core data models and upstream lookups
//!
//! This module contains the domain types shared by the species and
//! translation lookups, plus the HTTP transport port both of them use.

pub mod species;
pub mod translation;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use species::{SpeciesError, SpeciesLookupService};
pub use translation::TranslationLookupService;
pub use transport::{
    BaseUrlError, HttpTransport, ReqwestTransport, UpstreamError, UpstreamErrorKind,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Species data as returned to callers and stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    /// Species name as reported upstream
    pub name: String,
    /// English flavor text with line breaks flattened to spaces
    pub description: String,
    /// Habitat name, absent for species without one
    pub habitat: Option<String>,
    /// Whether the species is legendary
    pub is_legendary: bool,
}

/// Translation flavours offered by the translation API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStyle {
    Shakespeare,
    Yoda,
}

impl TranslationStyle {
    /// Lowercase name, used as the API path segment and in cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationStyle::Shakespeare => "shakespeare",
            TranslationStyle::Yoda => "yoda",
        }
    }
}

impl fmt::Display for TranslationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shakespeare" => Ok(TranslationStyle::Shakespeare),
            "yoda" => Ok(TranslationStyle::Yoda),
            other => Err(format!(
                "unknown translation style '{}', expected shakespeare or yoda",
                other
            )),
        }
    }
}

/// Outcome of a translation lookup
///
/// `Unavailable` is an expected result: the translation API is heavily rate
/// limited, and callers fall back to the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Translated(String),
    Unavailable,
}

impl Translation {
    pub fn is_available(&self) -> bool {
        matches!(self, Translation::Translated(_))
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            Translation::Translated(text) => Some(text),
            Translation::Unavailable => None,
        }
    }

    /// Returns the translated text, or `original` if none is available
    pub fn or_original(self, original: String) -> String {
        self.into_option().unwrap_or(original)
    }
}

/// Normalized response assembled from a species record and an optional
/// translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonDescription {
    pub name: String,
    pub description: String,
    pub habitat: Option<String>,
    pub is_legendary: bool,
}

impl From<SpeciesRecord> for PokemonDescription {
    fn from(record: SpeciesRecord) -> Self {
        Self {
            name: record.name,
            description: record.description,
            habitat: record.habitat,
            is_legendary: record.is_legendary,
        }
    }
}
