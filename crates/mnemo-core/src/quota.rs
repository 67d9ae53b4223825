//! Daily review and new-card quotas.
//!
//! Counters are keyed by calendar date and created lazily the first time
//! a date is read or incremented. Stale entries are never pruned here;
//! the caller may clean them up if it cares. The tracker takes an
//! explicit store object so tests can run against fresh stores.

use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::calendar;
use crate::error::StoreError;
use crate::storage::Store;

/// Counters for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCounts {
    /// Unique cards that reached a non-failing completion.
    pub reviews: u32,
    /// Unique never-before-seen cards actually shown.
    pub new_cards: u32,
}

/// A daily ceiling: a bounded count or unlimited.
///
/// Serialized as a JSON number or the string `"unlimited"` -- an explicit
/// sentinel rather than a float infinity, which does not survive JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Limited(u32),
    Unlimited,
}

impl Limit {
    pub fn is_unlimited(self) -> bool {
        matches!(self, Limit::Unlimited)
    }

    /// Slots left after `used` have been consumed. Saturating at zero;
    /// `Unlimited` reports `u32::MAX`.
    pub fn remaining(self, used: u32) -> u32 {
        match self {
            Limit::Limited(total) => total.saturating_sub(used),
            Limit::Unlimited => u32::MAX,
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::Limited(n) => serializer.serialize_u32(*n),
            Limit::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for Limit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LimitVisitor;

        impl<'de> Visitor<'de> for LimitVisitor {
            type Value = Limit;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a non-negative integer or the string \"unlimited\"")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Limit, E> {
                u32::try_from(value)
                    .map(Limit::Limited)
                    .map_err(|_| E::custom("limit out of range"))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Limit, E> {
                u32::try_from(value)
                    .map(Limit::Limited)
                    .map_err(|_| E::custom("limit out of range"))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Limit, E> {
                if value == "unlimited" {
                    Ok(Limit::Unlimited)
                } else {
                    Err(E::custom(format!("unknown limit '{value}'")))
                }
            }
        }

        deserializer.deserialize_any(LimitVisitor)
    }
}

/// Tracks per-day counters in a key-value store.
pub struct QuotaTracker<S: Store> {
    store: S,
}

fn counts_key(date: NaiveDate) -> String {
    format!("counts.{}", calendar::iso_date(date))
}

impl<S: Store> QuotaTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Counters for `date`. Unseen dates read as zero.
    pub fn counts(&self, date: NaiveDate) -> Result<DayCounts, StoreError> {
        Ok(self
            .store
            .get_json::<DayCounts>(&counts_key(date))?
            .unwrap_or_default())
    }

    /// Add to the counters for `date`. Strictly additive, never
    /// decrements; creates the entry on first use.
    pub fn increment(
        &mut self,
        date: NaiveDate,
        reviews: u32,
        new_cards: u32,
    ) -> Result<DayCounts, StoreError> {
        let mut counts = self.counts(date)?;
        counts.reviews = counts.reviews.saturating_add(reviews);
        counts.new_cards = counts.new_cards.saturating_add(new_cards);
        self.store.set_json(&counts_key(date), &counts)?;
        tracing::debug!(
            date = %calendar::iso_date(date),
            reviews = counts.reviews,
            new_cards = counts.new_cards,
            "daily counters updated"
        );
        Ok(counts)
    }
}
