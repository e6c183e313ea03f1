//! The fixed vocabulary anomaly events draw from.

use serde::{Deserialize, Serialize};

/// Built-in anomaly vocabulary.
pub const DEFAULT_WORDS: [&str; 20] = [
    "AYUDA", "MIRA", "DETRAS", "FRIO", "AQUI", "SANGRE", "666", "LUZ", "SOMBRA", "ELLOS", "NO",
    "SI", "CORRE", "ABAJO", "DOLOR", "SOLO", "MADRE", "FUEGO", "ETERNO", "VACIO",
];

/// Immutable ordered list of candidate anomaly tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBank {
    words: Vec<String>,
}

impl WordBank {
    /// Build a bank from an explicit list. Returns `None` when the list is empty.
    pub fn new<I, S>(words: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return None;
        }
        Some(Self { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// Map a unit draw in `[0, 1)` onto a word, uniformly.
    ///
    /// Draws at or above 1.0 land on the last word.
    pub fn choose(&self, draw: f64) -> &str {
        let last = self.words.len() - 1;
        let index = ((draw.max(0.0) * self.words.len() as f64) as usize).min(last);
        &self.words[index]
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}
