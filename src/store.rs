//! Durable collections and their JSON file persistence.
//!
//! Everything the app persists lives in one [`DataFile`] blob (review book,
//! saved sets, folders, per-question notes, daily stats, recent sessions),
//! written whole on every mutation and reloaded whole at startup.
//! A missing or unparseable file is treated as empty collections.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Folder, Question, ReviewItem, SavedSet};
use crate::scheduler::{self, Transition};

pub const RECENT_SESSIONS_MAX: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("failed to write data file: {0}")]
  Io(#[from] std::io::Error),
  #[error("failed to serialize data file: {0}")]
  Serialize(#[from] serde_json::Error),
}

/// One finished practice run, kept for the "recent sessions" list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRecord {
  pub total: usize,
  pub score: usize,
  pub at: DateTime<Utc>,
}

/// Daily practice counter with a consecutive-day streak.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DailyStats {
  #[serde(default)]
  pub date: Option<NaiveDate>,
  #[serde(rename = "todayCount", default)]
  pub today_count: u32,
  #[serde(rename = "lastDate", default)]
  pub last_date: Option<NaiveDate>,
  #[serde(default)]
  pub streak: u32,
}

impl DailyStats {
  /// Record `n` practiced questions for `today`. A new day resets the
  /// counter; the streak grows only when the previous practice day was
  /// yesterday, otherwise it restarts at 1.
  pub fn add_practice(&mut self, n: usize, today: NaiveDate) {
    if self.date == Some(today) {
      self.today_count += n as u32;
    } else {
      let yesterday = today.checked_sub_days(Days::new(1));
      let prev = self.last_date.or(self.date);
      self.today_count = n as u32;
      if prev == yesterday {
        self.streak += 1;
      } else if prev != Some(today) {
        self.streak = 1;
      }
    }
    self.date = Some(today);
    self.last_date = Some(today);
  }

  /// The stats as seen on `today`: a stale blob reads as zero for today
  /// while keeping the streak history.
  pub fn for_today(&self, today: NaiveDate) -> DailyStats {
    if self.date == Some(today) {
      self.clone()
    } else {
      DailyStats {
        date: Some(today),
        today_count: 0,
        last_date: self.last_date.or(self.date),
        streak: self.streak,
      }
    }
  }
}

/// The whole persisted state. Field names follow the legacy export blob so
/// existing exports import cleanly.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DataFile {
  #[serde(rename = "savedSets", default)]
  pub saved_sets: Vec<SavedSet>,
  #[serde(default)]
  pub folders: Vec<Folder>,
  #[serde(rename = "wrongBook", default)]
  pub wrong_book: Vec<ReviewItem>,
  #[serde(rename = "questionNotes", default)]
  pub question_notes: HashMap<String, String>,
  #[serde(rename = "dailyStats", default)]
  pub daily_stats: DailyStats,
  #[serde(rename = "recentSessions", default)]
  pub recent_sessions: Vec<SessionRecord>,
}

impl DataFile {
  /// Load from `path`. Absent or corrupt data means starting empty.
  pub fn load(path: &Path) -> DataFile {
    let raw = match std::fs::read_to_string(path) {
      Ok(s) => s,
      Err(e) => {
        warn!(target: "chouette_backend", path = %path.display(), error = %e, "No data file; starting with empty collections");
        return DataFile::default();
      }
    };
    match serde_json::from_str(&raw) {
      Ok(data) => data,
      Err(e) => {
        warn!(target: "chouette_backend", path = %path.display(), error = %e, "Unparseable data file; starting with empty collections");
        DataFile::default()
      }
    }
  }

  /// Write the whole blob to `path`.
  pub fn save(&self, path: &Path) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
      if !dir.as_os_str().is_empty() {
        std::fs::create_dir_all(dir)?;
      }
    }
    let json = serde_json::to_string_pretty(self)?;
    std::fs::write(path, json)?;
    Ok(())
  }

  pub fn push_session(&mut self, total: usize, score: usize, at: DateTime<Utc>) {
    self.recent_sessions.push(SessionRecord { total, score, at });
    let len = self.recent_sessions.len();
    if len > RECENT_SESSIONS_MAX {
      self.recent_sessions.drain(..len - RECENT_SESSIONS_MAX);
    }
  }

  // ---- wrong-answer book ----

  fn review_index(&self, fingerprint: &str) -> Option<usize> {
    self.wrong_book.iter().position(|i| i.fingerprint() == fingerprint)
  }

  /// The unified miss operation: create the review item on a first miss,
  /// otherwise bump the miss counter and reset scheduling. Exactly one call
  /// per incorrect answer, whatever flow the answer came from.
  pub fn record_miss(&mut self, question: &Question, today: NaiveDate) {
    match self.review_index(&question.fingerprint()) {
      Some(idx) => {
        let item = self.wrong_book[idx].clone();
        if let Transition::Scheduled(next) = scheduler::apply_outcome(item, false, today) {
          self.wrong_book[idx] = next;
        }
      }
      None => {
        self.wrong_book.push(scheduler::new_item(question.clone(), today));
      }
    }
  }

  /// Advance an item after a correct recall while practicing the review
  /// collection. Returns true when the recall retired the item. A question
  /// not in the book is a no-op (it was never missed, or already retired).
  pub fn record_correct(&mut self, fingerprint: &str, today: NaiveDate) -> bool {
    let Some(idx) = self.review_index(fingerprint) else {
      return false;
    };
    let item = self.wrong_book[idx].clone();
    match scheduler::apply_outcome(item, true, today) {
      Transition::Scheduled(next) => {
        self.wrong_book[idx] = next;
        false
      }
      Transition::Retired => {
        self.wrong_book.remove(idx);
        true
      }
    }
  }

  /// Items due on `today`, sorted ascending by next review date with
  /// dateless items first.
  pub fn due_reviews(&self, today: NaiveDate) -> Vec<ReviewItem> {
    let mut due: Vec<ReviewItem> = self
      .wrong_book
      .iter()
      .filter(|i| i.is_due(today))
      .cloned()
      .collect();
    // Option<NaiveDate> orders None before Some, matching the legacy
    // empty-string-sorts-first ordering.
    due.sort_by_key(|i| i.next_review);
    due
  }

  /// Remove by identity, returning the removed item so the caller can offer
  /// an undo window.
  pub fn remove_review(&mut self, fingerprint: &str) -> Option<ReviewItem> {
    let idx = self.review_index(fingerprint)?;
    Some(self.wrong_book.remove(idx))
  }

  /// Re-add a previously removed item with its exact prior state. Skipped
  /// when a same-fingerprint item reappeared in the meantime.
  pub fn restore_review(&mut self, item: ReviewItem) -> bool {
    if self.review_index(&item.fingerprint()).is_some() {
      return false;
    }
    self.wrong_book.push(item);
    true
  }

  pub fn wrong_count(&self, fingerprint: &str) -> u32 {
    self
      .review_index(fingerprint)
      .map(|idx| self.wrong_book[idx].wrong_count)
      .unwrap_or(0)
  }

  // ---- saved sets and folders ----

  pub fn set_by_id(&self, id: &str) -> Option<&SavedSet> {
    self.saved_sets.iter().find(|s| s.id == id)
  }

  pub fn record_set_practice(&mut self, id: &str, at: DateTime<Utc>) {
    if let Some(set) = self.saved_sets.iter_mut().find(|s| s.id == id) {
      set.practice_count += 1;
      set.last_practiced_at = Some(at);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{AnswerKey, QuestionKind};

  fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
  }

  fn fill(stem: &str, accepted: &[&str]) -> Question {
    Question {
      kind: QuestionKind::FillBlank,
      stem: stem.into(),
      options: vec![],
      key: AnswerKey::Text(accepted.iter().map(|s| s.to_string()).collect()),
      explanation: None,
      category: None,
    }
  }

  #[test]
  fn record_miss_creates_then_bumps() {
    let mut data = DataFile::default();
    let q = fill("q1 _____", &["vu"]);
    let today = day("2026-08-29");

    data.record_miss(&q, today);
    assert_eq!(data.wrong_book.len(), 1);
    assert_eq!(data.wrong_book[0].wrong_count, 1);
    assert_eq!(data.wrong_book[0].next_review, Some(day("2026-08-30")));

    data.record_miss(&q, today);
    assert_eq!(data.wrong_book.len(), 1);
    assert_eq!(data.wrong_book[0].wrong_count, 2);
    assert_eq!(data.wrong_book[0].repetitions, 0);
    assert_eq!(data.wrong_book[0].interval_days, 1);
  }

  #[test]
  fn record_correct_retires_after_threshold() {
    let mut data = DataFile::default();
    let q = fill("q1 _____", &["vu"]);
    let fp = q.fingerprint();
    let today = day("2026-08-29");
    data.record_miss(&q, today);

    for _ in 0..4 {
      assert!(!data.record_correct(&fp, today));
    }
    assert!(data.record_correct(&fp, today));
    assert!(data.wrong_book.is_empty());
  }

  #[test]
  fn due_query_filters_and_sorts_dateless_first() {
    let mut data = DataFile::default();
    let today = day("2026-08-29");
    for (stem, next) in [
      ("a _____", Some(day("2026-09-05"))), // future: not due
      ("b _____", Some(day("2026-08-29"))), // today: due
      ("c _____", None),                    // dateless: due, sorts first
      ("d _____", Some(day("2026-08-20"))), // past: due
    ] {
      let mut item = scheduler::new_item(fill(stem, &["x"]), today);
      item.next_review = next;
      data.wrong_book.push(item);
    }

    let due = data.due_reviews(today);
    let stems: Vec<&str> = due.iter().map(|i| i.question.stem.as_str()).collect();
    assert_eq!(stems, vec!["c _____", "d _____", "b _____"]);
  }

  #[test]
  fn remove_then_restore_preserves_state() {
    let mut data = DataFile::default();
    let q = fill("q1 _____", &["vu"]);
    let fp = q.fingerprint();
    let today = day("2026-08-29");
    data.record_miss(&q, today);
    data.record_miss(&q, today);

    let removed = data.remove_review(&fp).unwrap();
    assert!(data.wrong_book.is_empty());
    assert_eq!(removed.wrong_count, 2);

    assert!(data.restore_review(removed.clone()));
    assert_eq!(data.wrong_book[0], removed);

    // A second restore of the same identity is refused.
    assert!(!data.restore_review(removed));
    assert_eq!(data.wrong_book.len(), 1);
  }

  #[test]
  fn daily_stats_streak_rules() {
    let mut stats = DailyStats::default();
    stats.add_practice(5, day("2026-08-27"));
    assert_eq!((stats.today_count, stats.streak), (5, 1));

    // Same day accumulates.
    stats.add_practice(3, day("2026-08-27"));
    assert_eq!((stats.today_count, stats.streak), (8, 1));

    // Next day: fresh count, streak grows.
    stats.add_practice(2, day("2026-08-28"));
    assert_eq!((stats.today_count, stats.streak), (2, 2));

    // A skipped day restarts the streak.
    stats.add_practice(1, day("2026-08-30"));
    assert_eq!((stats.today_count, stats.streak), (1, 1));
  }

  #[test]
  fn stale_stats_read_as_zero_today() {
    let mut stats = DailyStats::default();
    stats.add_practice(5, day("2026-08-27"));
    let view = stats.for_today(day("2026-08-29"));
    assert_eq!(view.today_count, 0);
    assert_eq!(view.streak, 1);
  }

  #[test]
  fn recent_sessions_keep_the_last_ten() {
    let mut data = DataFile::default();
    let at = Utc::now();
    for i in 0..13 {
      data.push_session(10, i, at);
    }
    assert_eq!(data.recent_sessions.len(), RECENT_SESSIONS_MAX);
    assert_eq!(data.recent_sessions.first().unwrap().score, 3);
    assert_eq!(data.recent_sessions.last().unwrap().score, 12);
  }

  #[test]
  fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chouette_data.json");
    let today = day("2026-08-29");

    let mut data = DataFile::default();
    data.record_miss(&fill("q1 _____", &["vu"]), today);
    data.daily_stats.add_practice(4, today);
    data.question_notes.insert("q1 _____||vu".into(), "revoir l'accord".into());
    data.save(&path).unwrap();

    let back = DataFile::load(&path);
    assert_eq!(back.wrong_book, data.wrong_book);
    assert_eq!(back.daily_stats.today_count, 4);
    assert_eq!(back.question_notes.get("q1 _____||vu").unwrap(), "revoir l'accord");
  }

  #[test]
  fn corrupt_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let data = DataFile::load(&path);
    assert!(data.wrong_book.is_empty());
    assert!(data.saved_sets.is_empty());
  }
}
