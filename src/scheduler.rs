//! Spaced-repetition scheduling for the wrong-answer book.
//!
//! A fixed Ebbinghaus-style interval table, rather than an adaptive ease
//! factor: each consecutive correct recall steps the interval through
//! 1, 3, 7, 14, 30 days, and the fifth correct recall retires the item.
//! Any incorrect answer resets the progression to one day.

use chrono::{Days, NaiveDate};

use crate::domain::{Question, ReviewItem};

/// Review intervals in days, indexed by consecutive correct recalls.
pub const EBBINGHAUS_INTERVALS: [u32; 5] = [1, 3, 7, 14, 30];

/// Consecutive correct recalls after which an item leaves the book for good.
pub const RETIREMENT_THRESHOLD: u32 = 5;

/// Whole-state result of applying one answer outcome to a review item.
#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
  /// The item stays in the book with updated scheduling state.
  Scheduled(ReviewItem),
  /// Sustained correct recall: the item is permanently removed.
  Retired,
}

/// Create the review item for a question's first recorded miss.
pub fn new_item(question: Question, today: NaiveDate) -> ReviewItem {
  ReviewItem {
    question,
    wrong_count: 1,
    repetitions: 0,
    interval_days: 1,
    next_review: Some(add_days(today, 1)),
  }
}

/// Apply one answer outcome while practicing the review collection.
///
/// This is the single place review scheduling changes. An incorrect answer
/// both bumps the miss counter and resets scheduling; a correct answer
/// advances the interval table or retires the item.
pub fn apply_outcome(item: ReviewItem, correct: bool, today: NaiveDate) -> Transition {
  if correct {
    // Interval is indexed by the recall count before this one, so the
    // progression from a fresh item reads 1, 3, 7, 14 and the fifth
    // consecutive correct recall retires instead of scheduling.
    let idx = (item.repetitions as usize).min(EBBINGHAUS_INTERVALS.len() - 1);
    let repetitions = item.repetitions + 1;
    if repetitions >= RETIREMENT_THRESHOLD {
      return Transition::Retired;
    }
    let interval_days = EBBINGHAUS_INTERVALS[idx];
    Transition::Scheduled(ReviewItem {
      repetitions,
      interval_days,
      next_review: Some(add_days(today, interval_days)),
      ..item
    })
  } else {
    Transition::Scheduled(ReviewItem {
      wrong_count: item.wrong_count + 1,
      repetitions: 0,
      interval_days: 1,
      next_review: Some(add_days(today, 1)),
      ..item
    })
  }
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
  // NaiveDate covers years up to ±262000; a 30-day hop cannot overflow any
  // date this application produces.
  date.checked_add_days(Days::new(days as u64)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{AnswerKey, QuestionKind};

  fn sample_question() -> Question {
    Question {
      kind: QuestionKind::FillBlank,
      stem: "Nous ______ (voir) que tu es fatigué.".into(),
      options: vec![],
      key: AnswerKey::Text(vec!["voyons".into()]),
      explanation: None,
      category: None,
    }
  }

  fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
  }

  #[test]
  fn first_miss_schedules_for_tomorrow() {
    let item = new_item(sample_question(), day("2026-08-29"));
    assert_eq!(item.wrong_count, 1);
    assert_eq!(item.repetitions, 0);
    assert_eq!(item.interval_days, 1);
    assert_eq!(item.next_review, Some(day("2026-08-30")));
  }

  #[test]
  fn four_correct_recalls_walk_the_interval_table() {
    let today = day("2026-08-29");
    let mut item = new_item(sample_question(), today);
    let mut seen = Vec::new();
    for _ in 0..4 {
      item = match apply_outcome(item, true, today) {
        Transition::Scheduled(next) => next,
        Transition::Retired => panic!("retired too early"),
      };
      seen.push(item.interval_days);
    }
    assert_eq!(seen, vec![1, 3, 7, 14]);
    assert_eq!(item.repetitions, 4);
    assert_eq!(item.next_review, Some(day("2026-09-12")));
  }

  #[test]
  fn fifth_correct_recall_retires() {
    let today = day("2026-08-29");
    let item = ReviewItem {
      repetitions: 4,
      interval_days: 14,
      ..new_item(sample_question(), today)
    };
    assert_eq!(apply_outcome(item, true, today), Transition::Retired);
  }

  #[test]
  fn incorrect_resets_progression_and_counts_the_miss() {
    let today = day("2026-08-29");
    let item = ReviewItem {
      repetitions: 3,
      interval_days: 14,
      wrong_count: 2,
      ..new_item(sample_question(), today)
    };
    match apply_outcome(item, false, today) {
      Transition::Scheduled(next) => {
        assert_eq!(next.repetitions, 0);
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.wrong_count, 3);
        assert_eq!(next.next_review, Some(day("2026-08-30")));
      }
      Transition::Retired => panic!("a miss never retires"),
    }
  }

  #[test]
  fn next_review_follows_the_interval() {
    let today = day("2026-08-29");
    let item = new_item(sample_question(), today);
    match apply_outcome(item, true, today) {
      Transition::Scheduled(next) => {
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.next_review, Some(day("2026-08-30")));
      }
      Transition::Retired => unreachable!(),
    }
  }
}
