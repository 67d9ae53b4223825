//! Session tallies and workload forecasting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::card::{Card, Grade};

/// Per-grade counts for one session. Counts grading events, including
/// repeats of re-queued failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeTally {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

impl GradeTally {
    pub fn record(&mut self, grade: Grade) {
        match grade {
            Grade::Again => self.again += 1,
            Grade::Hard => self.hard += 1,
            Grade::Good => self.good += 1,
            Grade::Easy => self.easy += 1,
        }
    }

    /// Total grading events.
    pub fn total(&self) -> u32 {
        self.again + self.hard + self.good + self.easy
    }
}

/// Upcoming workload, computed by scanning the full card snapshot's
/// `next_review` dates -- not a session batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    /// Due on or before today.
    pub due_today: usize,
    /// Due exactly tomorrow.
    pub due_tomorrow: usize,
    /// Due after today but within the next 7 days.
    pub due_within_week: usize,
}

impl Forecast {
    pub fn scan<'a, I>(cards: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
    {
        let tomorrow = calendar::add_days(today, 1);
        let week_end = calendar::add_days(today, 7);
        let mut forecast = Forecast::default();
        for card in cards {
            if calendar::is_on_or_before(card.next_review, today) {
                forecast.due_today += 1;
            } else {
                if card.next_review == tomorrow {
                    forecast.due_tomorrow += 1;
                }
                if calendar::is_on_or_before(card.next_review, week_end) {
                    forecast.due_within_week += 1;
                }
            }
        }
        forecast
    }
}
