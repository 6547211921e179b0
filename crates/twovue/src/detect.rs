//! Object detection: turning a photo into candidate tags.
//!
//! The real detector is a remote service. Everything here is written
//! against the [`Detector`] trait so the client doesn't care which one
//! it gets. [`normalize_labels`] is applied to whatever comes back.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use twovue_rules::MAX_DETECTED_TAGS;

/// Labels the mock detector draws from, in order.
pub const HOUSEHOLD_OBJECTS: &[&str] = &[
    "person", "chair", "table", "laptop", "phone", "cup", "book", "pen",
    "window", "door", "floor", "wall", "light", "picture frame", "plant",
    "bag", "bottle", "keyboard",
];

/// Why detection produced no usable tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectionError {
    /// The service answered but found nothing. The player should retake
    /// the photo.
    #[error("no objects detected, retake the photo")]
    EmptyDetectionResult,

    /// The service couldn't be reached or failed.
    #[error("detection service unavailable: {0}")]
    DetectionServiceUnavailable(String),
}

impl DetectionError {
    /// Returns `true` if retrying the same photo may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::DetectionServiceUnavailable(_))
    }
}

/// Something that can look at a photo and name the objects in it.
///
/// Implementations return raw labels; callers run them through
/// [`normalize_labels`].
pub trait Detector: Send + Sync + 'static {
    fn detect(
        &self,
        photo_ref: &str,
    ) -> impl Future<Output = Result<Vec<String>, DetectionError>> + Send;
}

/// Cleans up raw detector output.
///
/// Trims and lowercases every label, drops blanks and repeats (first
/// occurrence wins) and keeps at most [`MAX_DETECTED_TAGS`].
///
/// # Errors
/// [`DetectionError::EmptyDetectionResult`] if nothing survives.
pub fn normalize_labels<I, L>(raw: I) -> Result<Vec<String>, DetectionError>
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    let mut seen = HashSet::new();
    let labels: Vec<String> = raw
        .into_iter()
        .map(|l| l.as_ref().trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .filter(|l| seen.insert(l.clone()))
        .take(MAX_DETECTED_TAGS)
        .collect();

    if labels.is_empty() {
        return Err(DetectionError::EmptyDetectionResult);
    }
    Ok(labels)
}

// ---------------------------------------------------------------------------
// MockDetector
// ---------------------------------------------------------------------------

/// Offline stand-in for the detection service.
///
/// Returns the first 10 to 17 entries of [`HOUSEHOLD_OBJECTS`], so two
/// consecutive photos always share at least `person`, `chair` and
/// `table`.
pub struct MockDetector {
    rng: Mutex<StdRng>,
}

impl MockDetector {
    /// A mock seeded from the OS.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// A mock with a fixed seed (reproducible demos and tests).
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn draw_count(&self) -> usize {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rng.random_range(10..=17)
    }
}

impl Default for MockDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for MockDetector {
    async fn detect(&self, photo_ref: &str) -> Result<Vec<String>, DetectionError> {
        let count = self.draw_count();
        tracing::debug!(photo_ref, count, "mock detection");
        Ok(HOUSEHOLD_OBJECTS[..count]
            .iter()
            .map(|s| s.to_string())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// FixedDetector
// ---------------------------------------------------------------------------

/// Always answers with the same outcome. Useful for scripting a game.
#[derive(Debug, Clone)]
pub struct FixedDetector {
    outcome: Result<Vec<String>, DetectionError>,
}

impl FixedDetector {
    pub fn new<L: AsRef<str>>(labels: &[L]) -> Self {
        Self {
            outcome: Ok(labels.iter().map(|l| l.as_ref().to_string()).collect()),
        }
    }

    /// A detector that always fails with `error`.
    pub fn failing(error: DetectionError) -> Self {
        Self { outcome: Err(error) }
    }
}

impl Detector for FixedDetector {
    async fn detect(&self, _photo_ref: &str) -> Result<Vec<String>, DetectionError> {
        self.outcome.clone()
    }
}
