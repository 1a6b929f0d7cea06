use serde::Deserialize;
use std::path::PathBuf;

/// Where the phone book lives and how lookups behave
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhoneBookConfig {
    pub path: PathBuf,
    /// Fall back to the closest unambiguous number when an exact lookup misses
    pub fuzzy_lookup: bool,
}

impl Default for PhoneBookConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("phone_book.json"),
            fuzzy_lookup: false,
        }
    }
}
