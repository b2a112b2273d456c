//! End-to-end lookups over fake upstreams
//!
//! Wires the real services, cache facade and retry policy together the way
//! the binary does, with the HTTP transport replaced by a routing table.

mod common;

use std::sync::Arc;

use pokefacade::cache::{CacheFacade, CacheStore, FileStore, MemoryStore, NO_EXPIRY};
use pokefacade::data::species::species_cache_key;
use pokefacade::data::translation::translation_cache_key;
use pokefacade::data::{
    SpeciesLookupService, Translation, TranslationLookupService, TranslationStyle,
};
use pokefacade::retry::RetryPolicy;
use pokefacade::Pokedex;
use reqwest::Url;
use tempfile::TempDir;

use common::RoutedTransport;

const SPECIES_BASE: &str = "https://pokeapi.test/api/v2/pokemon-species";
const TRANSLATE_BASE: &str = "https://translate.test/translate";

const MEWTWO: &str = r#"{
    "name": "mewtwo",
    "is_legendary": true,
    "habitat": {"name": "rare"},
    "flavor_text_entries": [
        {"flavor_text": "It was created by\na scientist...gene splicing and\nDNA engineering\nexperiments.", "language": {"name": "en"}}
    ]
}"#;

const DIGLETT: &str = r#"{
    "name": "diglett",
    "is_legendary": false,
    "habitat": {"name": "cave"},
    "flavor_text_entries": [
        {"flavor_text": "Lives about one yard\u000cunderground.", "language": {"name": "en"}}
    ]
}"#;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn pokedex(transport: Arc<RoutedTransport>, store: Arc<dyn CacheStore>) -> Pokedex {
    let cache = CacheFacade::new(store);
    let retry = RetryPolicy::default().silent();
    let species = SpeciesLookupService::new(transport.clone(), cache.clone(), url(SPECIES_BASE))
        .unwrap()
        .with_retry(retry.clone());
    let translation = TranslationLookupService::new(transport, cache, url(TRANSLATE_BASE))
        .unwrap()
        .with_retry(retry);
    Pokedex::new(species, translation)
}

#[tokio::test]
async fn test_legendary_species_is_translated_with_yoda() {
    let transport = Arc::new(
        RoutedTransport::new()
            .route(&format!("{}/mewtwo", SPECIES_BASE), 200, MEWTWO)
            .route(
                &format!("{}/yoda", TRANSLATE_BASE),
                200,
                r#"{"contents": {"translated": "Created by a scientist, it was."}}"#,
            ),
    );
    let pokedex = pokedex(transport.clone(), Arc::new(MemoryStore::new()));

    let description = pokedex.describe("Mewtwo", true).await.unwrap();

    assert_eq!(description.name, "mewtwo");
    assert_eq!(description.description, "Created by a scientist, it was.");
    assert_eq!(description.habitat.as_deref(), Some("rare"));
    assert!(description.is_legendary);
}

#[tokio::test]
async fn test_repeat_lookups_are_served_from_cache() {
    let transport = Arc::new(
        RoutedTransport::new()
            .route(&format!("{}/diglett", SPECIES_BASE), 200, DIGLETT)
            .route(
                &format!("{}/yoda", TRANSLATE_BASE),
                200,
                r#"{"contents": {"translated": "Underground, it lives."}}"#,
            ),
    );
    let store = Arc::new(MemoryStore::new());
    let pokedex = pokedex(transport.clone(), store.clone());

    let first = pokedex.describe("DIGLETT", true).await.unwrap();
    let second = pokedex.describe("diglett", true).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.total_hits(), 2);
    assert!(store.get(&species_cache_key("diglett")).await.unwrap().is_some());
    let key = translation_cache_key("Lives about one yard underground.", TranslationStyle::Yoda);
    assert!(store.get(&key).await.unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_translation_outage_keeps_original_description() {
    let transport = Arc::new(
        RoutedTransport::new()
            .route(&format!("{}/mewtwo", SPECIES_BASE), 200, MEWTWO)
            .route(&format!("{}/yoda", TRANSLATE_BASE), 503, "Service Unavailable"),
    );
    let pokedex = pokedex(transport.clone(), Arc::new(MemoryStore::new()));

    let description = pokedex.describe("mewtwo", true).await.unwrap();

    assert_eq!(
        description.description,
        "It was created by a scientist...gene splicing and DNA engineering experiments."
    );
    assert_eq!(transport.hits(&format!("{}/yoda", TRANSLATE_BASE)), 3);
}

#[tokio::test]
async fn test_unknown_species_is_not_found() {
    let transport = Arc::new(RoutedTransport::new());
    let pokedex = pokedex(transport.clone(), Arc::new(MemoryStore::new()));

    let err = pokedex.describe("missingno", false).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(transport.hits(&format!("{}/missingno", SPECIES_BASE)), 1);
}

#[tokio::test]
async fn test_file_cache_survives_a_new_service_instance() {
    let temp_dir = TempDir::new().unwrap();
    let transport = Arc::new(
        RoutedTransport::new().route(&format!("{}/mewtwo", SPECIES_BASE), 200, MEWTWO),
    );

    let first = pokedex(
        transport.clone(),
        Arc::new(FileStore::with_dir(temp_dir.path().to_path_buf())),
    );
    first.describe("mewtwo", false).await.unwrap();

    let second = pokedex(
        transport.clone(),
        Arc::new(FileStore::with_dir(temp_dir.path().to_path_buf())),
    );
    let description = second.describe("MEWTWO", false).await.unwrap();

    assert_eq!(description.name, "mewtwo");
    assert_eq!(transport.total_hits(), 1);
}

#[tokio::test]
async fn test_translation_cache_hit_skips_network() {
    let store = Arc::new(MemoryStore::new());
    let key = translation_cache_key("Hello there.", TranslationStyle::Shakespeare);
    store
        .set(&key, "\"Well met.\"".to_string(), NO_EXPIRY)
        .await
        .unwrap();
    let transport = Arc::new(RoutedTransport::new());
    let service = TranslationLookupService::new(
        transport.clone(),
        CacheFacade::new(store),
        url(TRANSLATE_BASE),
    )
    .unwrap();

    let result = service
        .translate("Hello there.", TranslationStyle::Shakespeare)
        .await;

    assert_eq!(result, Translation::Translated("Well met.".to_string()));
    assert_eq!(transport.total_hits(), 0);
}
