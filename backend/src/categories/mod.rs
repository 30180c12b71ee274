use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub label: String,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategorySummary {
    pub key: String,
    pub label: String,
    pub word_count: usize,
}

/// Read-only mapping from category key to its ordered word list
#[derive(Debug, Clone)]
pub struct Categories {
    categories: BTreeMap<String, Category>,
}

impl Categories {
    /// Load categories from a JSON file of the form `{ "key": { "label": ..., "words": [...] } }`
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read categories file {}", path.display()))?;
        let raw: BTreeMap<String, Category> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid categories file {}", path.display()))?;

        let categories = Self::from_raw(raw);
        tracing::info!("Loaded {} categories", categories.len());

        Ok(categories)
    }

    /// Load categories from `path`, using the built-in set when the file is missing,
    /// unreadable or holds no categories
    pub async fn load_or_builtin<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path).await {
            Ok(categories) if !categories.is_empty() => categories,
            Ok(_) => {
                tracing::warn!(
                    "{} has no categories. Using built-in categories.",
                    path.display()
                );
                Self::builtin()
            }
            Err(e) => {
                tracing::warn!("Failed to load categories: {:#}. Using built-in categories.", e);
                Self::builtin()
            }
        }
    }

    /// Categories shipped with the binary
    pub fn builtin() -> Self {
        let raw = BUILTIN
            .iter()
            .map(|(key, label, words)| {
                (
                    key.to_string(),
                    Category {
                        label: label.to_string(),
                        words: words.iter().map(|w| w.to_string()).collect(),
                    },
                )
            })
            .collect();
        Self::from_raw(raw)
    }

    fn from_raw(raw: BTreeMap<String, Category>) -> Self {
        let categories = raw
            .into_iter()
            .map(|(key, category)| {
                let mut words = Vec::with_capacity(category.words.len());
                for word in &category.words {
                    let normalized = normalize_word(word);
                    if normalized.is_empty() {
                        tracing::warn!("Dropping empty word {:?} from category {}", word, key);
                    } else {
                        words.push(normalized);
                    }
                }
                (
                    key,
                    Category {
                        label: category.label,
                        words,
                    },
                )
            })
            .collect();

        Self { categories }
    }

    pub fn get(&self, key: &str) -> Option<&Category> {
        self.categories.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn summaries(&self) -> Vec<CategorySummary> {
        self.categories
            .iter()
            .map(|(key, category)| CategorySummary {
                key: key.clone(),
                label: category.label.clone(),
                word_count: category.words.len(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Uppercase a word and drop the separators that can't appear in a grid line
pub fn normalize_word(word: &str) -> String {
    word.trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '\'' | '.'))
        .flat_map(char::to_uppercase)
        .collect()
}

const BUILTIN: &[(&str, &str, &[&str])] = &[
    (
        "premierLeague",
        "Premier League Teams",
        &[
            "Arsenal", "Chelsea", "Liverpool", "Everton", "Fulham", "Brentford", "Burnley",
            "Wolves", "Spurs", "Brighton",
        ],
    ),
    (
        "elements",
        "Periodic Elements",
        &[
            "Hydrogen", "Helium", "Carbon", "Oxygen", "Nitrogen", "Sodium", "Iron", "Gold",
            "Silver", "Neon",
        ],
    ),
    (
        "countries",
        "Countries",
        &[
            "France", "Brazil", "Japan", "Kenya", "Canada", "Mexico", "Norway", "Egypt", "India",
            "Peru",
        ],
    ),
    (
        "athletes",
        "Famous Athletes",
        &[
            "Bolt", "Federer", "Serena", "Messi", "Jordan", "Phelps", "Biles", "Ronaldo",
            "Nadal", "Kohli",
        ],
    ),
];
