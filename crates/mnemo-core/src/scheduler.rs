//! SM-2-variant grading.
//!
//! [`grade_card`] is a pure function from (card state, grade) to new card
//! state. It cannot fail: grades are a closed enum and every well-formed
//! card produces a well-formed successor. Malformed configuration is a
//! caller precondition handled at load time; the learning steps are still
//! floored at one day here so a bad value cannot produce a zero-day loop.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::card::{Card, Grade, MIN_EASE_FACTOR};

/// Tolerance when snapping the ease factor to its floor. Repeated
/// +/- 0.15 and 0.2 adjustments accumulate float drift around 1.3.
const EASE_EPSILON: f64 = 1e-9;

/// Interval (days) at or above which a card counts as mature.
pub const MATURE_INTERVAL_DAYS: u32 = 60;

/// Scheduling configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Interval after the first successful review following a failure.
    pub step1_days: u32,
    /// Interval after the second successful review.
    pub step2_days: u32,
    /// Promote cards to mastered once their interval reaches
    /// [`MATURE_INTERVAL_DAYS`].
    pub auto_mature: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            step1_days: 1,
            step2_days: 6,
            auto_mature: true,
        }
    }
}

impl SchedulerConfig {
    /// Learning steps floored at one day.
    fn steps(&self) -> (u32, u32) {
        (self.step1_days.max(1), self.step2_days.max(1))
    }
}

/// Apply one graded review to `card` as of `today`, returning the updated
/// copy.
///
/// A failing grade resets repetitions and interval and docks the ease
/// factor; a passing grade walks the learning steps for the first two
/// successes and then grows the interval by the ease factor, rounding
/// half away from zero.
pub fn grade_card(card: &Card, grade: Grade, config: &SchedulerConfig, today: NaiveDate) -> Card {
    let mut next = card.clone();
    let (step1, step2) = config.steps();

    if grade.is_pass() {
        next.interval_days = match next.repetitions {
            0 => step1,
            1 => step2,
            _ => (next.interval_days as f64 * next.ease_factor).round() as u32,
        };
        next.repetitions += 1;
        next.ease_factor = match grade {
            Grade::Hard => clamp_ease(next.ease_factor - 0.15),
            Grade::Easy => next.ease_factor + 0.15,
            Grade::Good | Grade::Again => next.ease_factor,
        };
    } else {
        next.repetitions = 0;
        next.interval_days = 0;
        next.ease_factor = clamp_ease(next.ease_factor - 0.2);
    }

    next.next_review = calendar::add_days(today, next.interval_days as i64);
    next.last_review = Some(today);

    // Mastery is sticky: a failed card keeps the flag even though its
    // interval drops to 0, so a mastered card can be due today.
    if config.auto_mature && next.interval_days >= MATURE_INTERVAL_DAYS {
        next.mastered = true;
    }

    next
}

fn clamp_ease(ease: f64) -> f64 {
    if ease < MIN_EASE_FACTOR + EASE_EPSILON {
        MIN_EASE_FACTOR
    } else {
        ease
    }
}
