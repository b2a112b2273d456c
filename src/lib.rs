//! Pokémon species lookup with fun translations
//!
//! Cache-aside lookups against the species and translation APIs, with retry
//! and exponential backoff for transient upstream failures.

pub mod cache;
pub mod cli;
pub mod data;
pub mod describe;
pub mod retry;

pub use describe::Pokedex;
