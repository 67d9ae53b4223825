//! Session queue management.
//!
//! A study session is a three-state machine:
//!
//! ```text
//! Setup --start(ok)--> Active --cursor exhausted--> Complete
//! Setup --start(fail)--> Setup (QuotaExhausted | EmptyQueue)
//! Active --abandon()--> (discarded, no quota effect)
//! Complete --review_again()--> Active (practice semantics)
//! ```
//!
//! Setup is the [`SessionQueue::start`] constructor: a failed start
//! returns an error and leaves nothing behind. The queue itself is
//! ephemeral and never persisted. Failed cards are re-appended to the
//! batch tail, FIFO among repeats, so a card can appear any number of
//! times within one session -- that is the active-recall drill working
//! as intended, not a bug.
//!
//! The batch is an explicit id vector plus a cursor index; the cursor
//! only moves forward one grade at a time, so `cursor <= batch.len()`
//! holds by construction even while failures grow the tail.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar;
use crate::card::{Card, Grade};
use crate::error::{CoreError, StartError};
use crate::quota::{DayCounts, Limit, QuotaTracker};
use crate::scheduler::{grade_card, SchedulerConfig};
use crate::stats::{Forecast, GradeTally};
use crate::storage::{Store, StudyConfig};

/// Session mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Due cards only, quota-limited; graded results are meant to be
    /// persisted by the caller.
    Normal,
    /// Any matching card, no quota reads or writes; graded results are
    /// transient.
    Practice,
}

/// Narrows the candidate card set for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Deck(String),
}

impl Scope {
    fn matches(&self, card: &Card) -> bool {
        match self {
            Scope::All => true,
            Scope::Deck(key) => card.deck.as_deref() == Some(key.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Active,
    Complete,
}

/// End-of-session statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub mode: Mode,
    /// Unique cards that reached a non-failing completion.
    pub completed: usize,
    /// Unique never-before-seen cards actually shown.
    pub new_cards_shown: usize,
    /// Grading events by grade, repeats included.
    pub tally: GradeTally,
    /// Wall-clock duration since the session started.
    pub elapsed_secs: u64,
    /// Workload forecast over the full card snapshot.
    pub forecast: Forecast,
}

/// One in-flight study session.
///
/// Exclusively owned by the engine side of the boundary: the caller's
/// card collection is copied in at start and updated copies are handed
/// back from [`SessionQueue::grade`].
#[derive(Debug)]
pub struct SessionQueue {
    id: Uuid,
    mode: Mode,
    today: NaiveDate,
    scheduler: SchedulerConfig,
    /// Working snapshot of the candidate cards, keyed by id.
    cards: HashMap<String, Card>,
    /// Ordered batch of card ids, including re-queued repeats.
    batch: Vec<String>,
    /// Initial candidate order, kept for `review_again`.
    initial_order: Vec<String>,
    cursor: usize,
    phase: Phase,
    completed: HashSet<String>,
    /// Candidate ids that were new at session start. A review card
    /// failed mid-session resets to `repetitions == 0` in the working
    /// snapshot, so newness must be judged against start state.
    new_ids: HashSet<String>,
    new_shown: HashSet<String>,
    tally: GradeTally,
    started_at: DateTime<Utc>,
    /// Guards the single end-of-session quota increment.
    committed: bool,
}

impl SessionQueue {
    /// Build a session from a snapshot of the caller's cards.
    ///
    /// `counts` are today's already-consumed quota; they are ignored in
    /// practice mode. A `QuotaExhausted` or `EmptyQueue` error leaves the
    /// caller free to retry with a different scope or mode.
    pub fn start(
        snapshot: &HashMap<String, Card>,
        scope: &Scope,
        mode: Mode,
        config: &StudyConfig,
        counts: DayCounts,
        today: NaiveDate,
    ) -> Result<Self, StartError> {
        let mut batch = match mode {
            Mode::Normal => normal_candidates(snapshot, scope, config, counts, today)?,
            Mode::Practice => practice_candidates(snapshot, scope),
        };
        if let Limit::Limited(cap) = config.session_cap {
            batch.truncate(cap as usize);
        }
        if batch.is_empty() {
            return Err(StartError::EmptyQueue);
        }

        let cards: HashMap<String, Card> = batch
            .iter()
            .filter_map(|id| snapshot.get(id).map(|card| (id.clone(), card.clone())))
            .collect();
        let new_ids = cards
            .values()
            .filter(|card| card.is_new())
            .map(|card| card.id.clone())
            .collect();
        let id = Uuid::new_v4();
        tracing::info!(session = %id, ?mode, batch = batch.len(), "session started");

        Ok(Self {
            id,
            mode,
            today,
            scheduler: config.scheduler(),
            cards,
            initial_order: batch.clone(),
            batch,
            cursor: 0,
            phase: Phase::Active,
            completed: HashSet::new(),
            new_ids,
            new_shown: HashSet::new(),
            tally: GradeTally::default(),
            started_at: Utc::now(),
            committed: false,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Batch length including re-queued repeats.
    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cards left to show, repeats included.
    pub fn remaining(&self) -> usize {
        self.batch.len().saturating_sub(self.cursor)
    }

    /// The card under the cursor, or `None` once the batch is exhausted
    /// (the session then transitions to Complete).
    pub fn current(&mut self) -> Option<&Card> {
        if self.cursor >= self.batch.len() {
            self.phase = Phase::Complete;
            return None;
        }
        self.cards.get(&self.batch[self.cursor])
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Grade the card under the cursor.
    ///
    /// Returns the updated copy for the caller to persist immediately
    /// (normal mode) or display and discard (practice mode -- the copy
    /// must not be persisted). An `Again` grade re-appends the card to
    /// the batch tail and withholds it from the completed set; any other
    /// grade completes it. The cursor always advances. Returns `None`
    /// when the session is not Active.
    pub fn grade(&mut self, grade: Grade) -> Option<Card> {
        if self.phase != Phase::Active {
            return None;
        }
        let id = match self.batch.get(self.cursor) {
            Some(id) => id.clone(),
            None => {
                self.phase = Phase::Complete;
                return None;
            }
        };
        let card = self.cards.get(&id)?.clone();

        // Newness is judged against session-start state: a review card
        // that failed earlier in this session is not a new card.
        if self.new_ids.contains(&id) {
            self.new_shown.insert(id.clone());
        }

        let updated = grade_card(&card, grade, &self.scheduler, self.today);
        if self.mode == Mode::Normal {
            // Re-queued repeats grade from the updated state.
            self.cards.insert(id.clone(), updated.clone());
        }

        self.tally.record(grade);
        if grade.is_pass() {
            self.completed.insert(id);
        } else {
            // Revisit later in this session, FIFO among repeats.
            self.batch.push(id);
        }

        self.cursor += 1;
        if self.cursor >= self.batch.len() {
            self.phase = Phase::Complete;
        }
        Some(updated)
    }

    /// Discard the session. Daily counters are never touched, so
    /// abandoning is always safe.
    pub fn abandon(self) {
        tracing::info!(session = %self.id, graded = self.tally.total(), "session abandoned");
    }

    /// Re-enter Active over the same cards: the unique final batch ids
    /// in their original candidate order, always with practice semantics
    /// and no quota effects. Only available from Complete.
    pub fn review_again(&self) -> Option<SessionQueue> {
        if self.phase != Phase::Complete {
            return None;
        }
        let id = Uuid::new_v4();
        tracing::info!(session = %id, previous = %self.id, "review-again session started");
        Some(SessionQueue {
            id,
            mode: Mode::Practice,
            today: self.today,
            scheduler: self.scheduler,
            cards: self.cards.clone(),
            batch: self.initial_order.clone(),
            initial_order: self.initial_order.clone(),
            cursor: 0,
            phase: Phase::Active,
            completed: HashSet::new(),
            new_ids: self.new_ids.clone(),
            new_shown: HashSet::new(),
            tally: GradeTally::default(),
            started_at: Utc::now(),
            committed: false,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn summary_with(&self, snapshot: &HashMap<String, Card>) -> SessionSummary {
        let elapsed = Utc::now().signed_duration_since(self.started_at);
        SessionSummary {
            session_id: self.id,
            mode: self.mode,
            completed: self.completed.len(),
            new_cards_shown: self.new_shown.len(),
            tally: self.tally,
            elapsed_secs: elapsed.num_seconds().max(0) as u64,
            forecast: Forecast::scan(snapshot.values(), self.today),
        }
    }
}

/// Due candidates under quota, reviews first.
fn normal_candidates(
    snapshot: &HashMap<String, Card>,
    scope: &Scope,
    config: &StudyConfig,
    counts: DayCounts,
    today: NaiveDate,
) -> Result<Vec<String>, StartError> {
    let review_slots = config.max_reviews_limit.remaining(counts.reviews) as usize;
    if review_slots == 0 {
        return Err(StartError::QuotaExhausted);
    }

    let due = snapshot
        .values()
        .filter(|card| scope.matches(card) && card.is_due(today));
    let (mut reviews, mut new_cards): (Vec<&Card>, Vec<&Card>) =
        due.partition(|card| !card.is_new());

    // Most overdue first; ties broken by id for a stable order.
    reviews.sort_by(|a, b| a.next_review.cmp(&b.next_review).then_with(|| a.id.cmp(&b.id)));
    new_cards.sort_by(|a, b| a.id.cmp(&b.id));

    reviews.truncate(review_slots);
    let slots_left = review_slots - reviews.len();
    let new_slots = (config.new_cards_limit.remaining(counts.new_cards) as usize).min(slots_left);
    new_cards.truncate(new_slots);

    let mut batch: Vec<String> = reviews.into_iter().map(|card| card.id.clone()).collect();
    batch.extend(new_cards.into_iter().map(|card| card.id.clone()));
    Ok(batch)
}

/// Scope-filtered candidates regardless of due-ness or quota.
fn practice_candidates(snapshot: &HashMap<String, Card>, scope: &Scope) -> Vec<String> {
    let mut cards: Vec<&Card> = snapshot.values().filter(|card| scope.matches(card)).collect();
    cards.sort_by(|a, b| a.next_review.cmp(&b.next_review).then_with(|| a.id.cmp(&b.id)));
    cards.into_iter().map(|card| card.id.clone()).collect()
}

/// Orchestrates sessions against a persistent store.
///
/// Reads today's counters before a normal session and commits the single
/// end-of-session increment. Single-threaded, call-and-return; wrap the
/// whole engine in one mutex if the host is multi-threaded.
pub struct StudyEngine<S: Store> {
    quota: QuotaTracker<S>,
    config: StudyConfig,
}

impl<S: Store> StudyEngine<S> {
    /// Load settings from `store` and wrap it.
    pub fn new(store: S) -> Result<Self, CoreError> {
        let config = StudyConfig::load(&store)?;
        Ok(Self {
            quota: QuotaTracker::new(store),
            config,
        })
    }

    /// Use explicit settings, skipping the store read.
    pub fn with_config(store: S, config: StudyConfig) -> Self {
        Self {
            quota: QuotaTracker::new(store),
            config,
        }
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn quota(&self) -> &QuotaTracker<S> {
        &self.quota
    }

    pub fn quota_mut(&mut self) -> &mut QuotaTracker<S> {
        &mut self.quota
    }

    /// Start a session over a snapshot of the caller's cards, as of
    /// today's local calendar date.
    pub fn start_session(
        &self,
        snapshot: &HashMap<String, Card>,
        scope: &Scope,
        mode: Mode,
    ) -> Result<SessionQueue, StartError> {
        let today = calendar::today();
        let counts = match mode {
            Mode::Normal => self.quota.counts(today)?,
            Mode::Practice => DayCounts::default(),
        };
        SessionQueue::start(snapshot, scope, mode, &self.config, counts, today)
    }

    /// Emit final statistics for a session and, for a completed normal
    /// session, apply the single quota increment. Idempotent: calling
    /// again returns fresh statistics without incrementing twice.
    /// Practice sessions never touch the counters.
    pub fn finish_session(
        &mut self,
        session: &mut SessionQueue,
        snapshot: &HashMap<String, Card>,
    ) -> Result<SessionSummary, CoreError> {
        let summary = session.summary_with(snapshot);
        if session.is_complete() && session.mode == Mode::Normal && !session.committed {
            self.quota.increment(
                session.today,
                summary.completed as u32,
                summary.new_cards_shown as u32,
            )?;
            session.committed = true;
        }
        tracing::info!(
            session = %session.id,
            completed = summary.completed,
            new_cards = summary.new_cards_shown,
            "session finished"
        );
        Ok(summary)
    }
}
