//! Composes species lookup and translation into one response
//!
//! The style rule: cave dwellers and legendary species get Yoda, every other
//! species gets Shakespeare. If no translation is available the original
//! description is kept.

use tracing::debug;

use crate::data::{
    PokemonDescription, SpeciesError, SpeciesLookupService, TranslationLookupService,
    TranslationStyle,
};

/// Habitat whose residents are described in Yoda style
const YODA_HABITAT: &str = "cave";

/// Picks the translation style for a species
pub fn select_style(habitat: Option<&str>, is_legendary: bool) -> TranslationStyle {
    if habitat == Some(YODA_HABITAT) || is_legendary {
        TranslationStyle::Yoda
    } else {
        TranslationStyle::Shakespeare
    }
}

/// Front door for callers: species lookup plus optional fun translation
#[derive(Clone)]
pub struct Pokedex {
    species: SpeciesLookupService,
    translation: TranslationLookupService,
}

impl Pokedex {
    pub fn new(species: SpeciesLookupService, translation: TranslationLookupService) -> Self {
        Self {
            species,
            translation,
        }
    }

    /// Describes a species, optionally with a translated description
    ///
    /// Only the species lookup can fail; a missing translation falls back to
    /// the plain description.
    pub async fn describe(
        &self,
        name: &str,
        translate: bool,
    ) -> Result<PokemonDescription, SpeciesError> {
        let record = self.species.fetch(name).await?;
        if !translate {
            return Ok(record.into());
        }

        let style = select_style(record.habitat.as_deref(), record.is_legendary);
        let translation = self.translation.translate(&record.description, style).await;
        if !translation.is_available() {
            debug!(species = %record.name, %style, "keeping original description");
        }

        let mut description = PokemonDescription::from(record);
        description.description = translation.or_original(description.description);
        Ok(description)
    }
}
