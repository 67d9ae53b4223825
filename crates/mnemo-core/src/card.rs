//! Card model and recall grades.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;

/// Minimum ease factor. The SM-2 floor below which intervals would
/// stagnate.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned to newly created cards.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Recall quality reported by the user for one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// Failed recall. Resets the learning sequence.
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    /// Whether this grade counts as a successful recall.
    pub fn is_pass(self) -> bool {
        !matches!(self, Grade::Again)
    }
}

/// A single memorizable fact under spaced repetition.
///
/// Cards are owned by the caller and passed into the engine by value; the
/// engine returns updated copies and never mutates caller-held state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Stable caller-assigned id.
    pub id: String,
    /// Optional grouping key, used only for scope filtering.
    #[serde(default)]
    pub deck: Option<String>,
    /// Governs interval growth rate. Never below [`MIN_EASE_FACTOR`].
    pub ease_factor: f64,
    /// Days until the next review. 0 means review today.
    pub interval_days: u32,
    /// Consecutive successful grades since the last failure (or creation).
    pub repetitions: u32,
    /// Date on which the card becomes due.
    pub next_review: NaiveDate,
    /// Date of the most recent grading event.
    #[serde(default)]
    pub last_review: Option<NaiveDate>,
    /// Sticky graduation flag. Set by the scheduler, never cleared by it,
    /// and independent of current due-ness.
    #[serde(default)]
    pub mastered: bool,
}

impl Card {
    /// A fresh card, due immediately.
    pub fn new(id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            id: id.into(),
            deck: None,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: 0,
            repetitions: 0,
            next_review: today,
            last_review: None,
            mastered: false,
        }
    }

    /// Same as [`Card::new`] with a grouping key.
    pub fn in_deck(id: impl Into<String>, deck: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            deck: Some(deck.into()),
            ..Self::new(id, today)
        }
    }

    /// Due on or before `today`.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        calendar::is_on_or_before(self.next_review, today)
    }

    /// Never successfully graded, or just failed.
    pub fn is_new(&self) -> bool {
        self.repetitions == 0
    }
}
