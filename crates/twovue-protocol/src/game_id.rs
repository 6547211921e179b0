//! Human-shareable game identifiers.
//!
//! A game id is three hyphen-joined lowercase words,
//! `adjective-noun-suffix`, e.g. `quantum-vector-alpha`. Players read
//! them aloud or type them from a screenshot, so parsing is forgiving:
//! `"Quantum Vector Alpha"` and `"quantum-vector-alpha"` name the same
//! game.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Request-path prefix of a game's notification channel.
pub const NOTIFICATION_PATH_PREFIX: &str = "/ws/";

const ADJECTIVES: &[&str] = &[
    "quantum", "atomic", "neural", "stellar", "cosmic", "optical", "kinetic",
    "thermal", "magnetic", "electric", "photonic", "sonic", "crystalline",
    "molecular", "orbital", "plasma", "gamma", "alpha", "beta", "delta",
    "micro", "nano", "meta", "ultra", "hyper", "neo", "proto", "pseudo",
    "cyber", "digital", "analog", "synthetic", "organic", "bionic", "ionic",
    "spectral", "temporal", "spatial", "dimensional", "fractal",
    "holographic",
];

const NOUNS: &[&str] = &[
    "vector", "matrix", "prism", "catalyst", "reactor", "generator",
    "scanner", "analyzer", "synthesizer", "amplifier", "detector", "sensor",
    "probe", "beacon", "transmitter", "receiver", "oscillator", "resonator",
    "capacitor", "conductor", "isolator", "converter", "processor",
    "calculator", "computer", "algorithm", "protocol", "sequence", "pattern",
    "frequency", "wavelength", "spectrum", "field", "chamber", "module",
    "unit", "device", "apparatus", "instrument", "mechanism", "engine",
    "turbine", "dynamo", "circuit", "array", "grid", "network", "system",
    "core", "nexus", "hub", "node",
];

const SUFFIXES: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "omega", "prime", "max", "ultra",
    "plus", "neo", "pro", "x", "z", "one", "two", "three", "seven", "nine",
];

/// A normalized game identifier.
///
/// Always lowercase ASCII letters, digits and single hyphens, with no
/// leading or trailing hyphen. Construct one with [`GameId::generate`]
/// or [`GameId::parse`]; both uphold the normal form.
///
/// Serialized as a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Draws a fresh `adjective-noun-suffix` id from the fixed
    /// vocabularies.
    ///
    /// Collisions are possible (the space is a few tens of thousands of
    /// ids); the store retries on collision.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
        let noun = NOUNS[rng.random_range(0..NOUNS.len())];
        let suffix = SUFFIXES[rng.random_range(0..SUFFIXES.len())];
        Self(format!("{adjective}-{noun}-{suffix}"))
    }

    /// Normalizes user input into a game id.
    ///
    /// Trims, lowercases, and collapses every run of whitespace and/or
    /// hyphens into a single hyphen. Vocabulary membership is not
    /// checked, so ids minted elsewhere stay joinable.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidGameId`] if nothing is left after
    /// normalization or a character outside `[a-z0-9]` remains.
    pub fn parse(input: &str) -> Result<Self, ProtocolError> {
        let lowered = input.trim().to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(ProtocolError::InvalidGameId(input.to_string()));
        }
        let valid = words.iter().all(|w| {
            w.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        });
        if !valid {
            return Err(ProtocolError::InvalidGameId(input.to_string()));
        }

        Ok(Self(words.join("-")))
    }

    /// The id with a numeric word appended: `neo-grid-max` →
    /// `neo-grid-max-2`. Stores use this when random draws keep
    /// colliding.
    pub fn numbered(&self, n: u32) -> Self {
        Self(format!("{}-{n}", self.0))
    }

    /// The request path of this game's notification channel,
    /// `/ws/{game_id}`.
    pub fn notification_path(&self) -> String {
        format!("{NOTIFICATION_PATH_PREFIX}{}", self.0)
    }

    /// Recovers the game id from a notification-channel request path.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] if the path is not under
    /// `/ws/`, [`ProtocolError::InvalidGameId`] if the rest isn't an id.
    pub fn from_notification_path(path: &str) -> Result<Self, ProtocolError> {
        let raw = path.strip_prefix(NOTIFICATION_PATH_PREFIX).ok_or_else(|| {
            ProtocolError::InvalidMessage(format!(
                "not a notification path: {path}"
            ))
        })?;
        Self::parse(raw.trim_end_matches('/'))
    }

    /// Returns the normalized id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase, space-separated form for on-screen display:
    /// `quantum-vector-alpha` → `QUANTUM VECTOR ALPHA`.
    pub fn display_form(&self) -> String {
        self.0.to_uppercase().replace('-', " ")
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for GameId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for GameId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_parse_spaced_mixed_case_matches_hyphenated() {
        let spaced = GameId::parse("Quantum Vector Alpha").unwrap();
        let hyphenated = GameId::parse("quantum-vector-alpha").unwrap();
        assert_eq!(spaced, hyphenated);
        assert_eq!(spaced.as_str(), "quantum-vector-alpha");
    }

    #[test]
    fn test_parse_collapses_mixed_separators() {
        let id = GameId::parse("  NEURAL -  prism--x  ").unwrap();
        assert_eq!(id.as_str(), "neural-prism-x");
    }

    #[test]
    fn test_parse_empty_returns_error() {
        assert!(matches!(
            GameId::parse("   "),
            Err(ProtocolError::InvalidGameId(_))
        ));
        assert!(GameId::parse("---").is_err());
    }

    #[test]
    fn test_parse_rejects_punctuation() {
        assert!(GameId::parse("quantum/vector").is_err());
        assert!(GameId::parse("quantum_vector").is_err());
    }

    #[test]
    fn test_parse_accepts_words_outside_vocabulary() {
        let id = GameId::parse("my-own-game7").unwrap();
        assert_eq!(id.as_str(), "my-own-game7");
    }

    #[test]
    fn test_generate_produces_three_vocabulary_words() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let id = GameId::generate(&mut rng);
            let parts: Vec<&str> = id.as_str().split('-').collect();
            assert_eq!(parts.len(), 3, "id {id} should have three parts");
            assert!(ADJECTIVES.contains(&parts[0]));
            assert!(NOUNS.contains(&parts[1]));
            assert!(SUFFIXES.contains(&parts[2]));
        }
    }

    #[test]
    fn test_generate_output_parses_to_itself() {
        let mut rng = StdRng::seed_from_u64(42);
        let id = GameId::generate(&mut rng);
        assert_eq!(GameId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn test_display_form_is_uppercase_spaced() {
        let id = GameId::parse("quantum-vector-alpha").unwrap();
        assert_eq!(id.display_form(), "QUANTUM VECTOR ALPHA");
        // The display form is itself valid input.
        assert_eq!(GameId::parse(&id.display_form()).unwrap(), id);
    }

    #[test]
    fn test_numbered_appends_counter() {
        let id = GameId::parse("neo-grid-max").unwrap();
        let numbered = id.numbered(2);
        assert_eq!(numbered.as_str(), "neo-grid-max-2");
        assert_eq!(GameId::parse(numbered.as_str()).unwrap(), numbered);
    }

    #[test]
    fn test_notification_path_round_trips() {
        let id = GameId::parse("optical-beacon-pro").unwrap();
        assert_eq!(id.notification_path(), "/ws/optical-beacon-pro");
        assert_eq!(
            GameId::from_notification_path(&id.notification_path()).unwrap(),
            id
        );
    }

    #[test]
    fn test_from_notification_path_rejects_other_routes() {
        assert!(matches!(
            GameId::from_notification_path("/api/games/x"),
            Err(ProtocolError::InvalidMessage(_))
        ));
        assert!(matches!(
            GameId::from_notification_path("/ws/"),
            Err(ProtocolError::InvalidGameId(_))
        ));
    }

    #[test]
    fn test_from_str_uses_parse() {
        let id: GameId = "Stellar Probe Nine".parse().unwrap();
        assert_eq!(id.to_string(), "stellar-probe-nine");
    }

    #[test]
    fn test_vocabularies_have_no_duplicates() {
        for list in [ADJECTIVES, NOUNS, SUFFIXES] {
            let mut sorted = list.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), list.len());
        }
    }
}
