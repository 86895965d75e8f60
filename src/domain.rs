//! Domain models: question kinds, answer keys, questions, review items,
//! saved sets and folders.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Marker for a blank inside a stem, e.g. "Hier, j'ai _____ un accident."
pub const BLANK_MARKER: &str = "_____";

/// What kind of question is presented to the user?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  /// One correct option index.
  SingleChoice,
  /// A set of correct option indices; exact-set match, no partial credit.
  MultipleChoice,
  /// One blank, free text, any accepted synonym matches.
  FillBlank,
  /// Several blanks, one ordered free-text value per blank.
  ParagraphFillBlank,
}

/// Accepted-answer value, shaped per question kind.
///
/// The legacy data format stored this as a single loosely-typed `correct`
/// field (an index, a list of indices, a list of strings, or a list of
/// synonym lists); the untagged serde representation below keeps that wire
/// format while each kind's shape stays statically known in code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerKey {
  /// single_choice: the correct option index.
  Single(usize),
  /// multiple_choice: the correct option indices.
  Multiple(Vec<usize>),
  /// fill_blank: accepted strings (synonyms) for the one blank.
  Text(Vec<String>),
  /// paragraph_fill_blank: accepted strings per blank, in blank order.
  Blanks(Vec<Vec<String>>),
}

/// Core question structure. Immutable after creation; copies of it are
/// embedded in review items and saved sets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
  #[serde(rename = "type")]
  pub kind: QuestionKind,
  pub stem: String,
  #[serde(default)]
  pub options: Vec<String>,
  #[serde(rename = "correct")]
  pub key: AnswerKey,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
}

/// Reasons a question definition is rejected at a boundary (bank load,
/// import, evaluation).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuestionError {
  #[error("question kind {kind:?} requires a non-empty option list")]
  MissingOptions { kind: QuestionKind },
  #[error("correct index {index} is out of range for {count} options")]
  IndexOutOfRange { index: usize, count: usize },
  #[error("answer key shape does not fit question kind {kind:?}")]
  KeyShapeMismatch { kind: QuestionKind },
  #[error("question kind {kind:?} requires at least one accepted answer")]
  EmptyAcceptedAnswers { kind: QuestionKind },
}

impl Question {
  /// Number of blank markers in the stem.
  pub fn blank_count(&self) -> usize {
    self.stem.matches(BLANK_MARKER).count()
  }

  /// Check that the answer key shape fits the kind and references valid
  /// options. Called on every boundary that accepts question definitions.
  pub fn validate(&self) -> Result<(), QuestionError> {
    match (self.kind, &self.key) {
      (QuestionKind::SingleChoice, AnswerKey::Single(i)) => {
        if self.options.is_empty() {
          return Err(QuestionError::MissingOptions { kind: self.kind });
        }
        if *i >= self.options.len() {
          return Err(QuestionError::IndexOutOfRange { index: *i, count: self.options.len() });
        }
        Ok(())
      }
      (QuestionKind::MultipleChoice, AnswerKey::Multiple(indices)) => {
        if self.options.is_empty() {
          return Err(QuestionError::MissingOptions { kind: self.kind });
        }
        if indices.is_empty() {
          return Err(QuestionError::EmptyAcceptedAnswers { kind: self.kind });
        }
        for &i in indices {
          if i >= self.options.len() {
            return Err(QuestionError::IndexOutOfRange { index: i, count: self.options.len() });
          }
        }
        Ok(())
      }
      (QuestionKind::FillBlank, AnswerKey::Text(accepted)) => {
        if accepted.is_empty() {
          return Err(QuestionError::EmptyAcceptedAnswers { kind: self.kind });
        }
        Ok(())
      }
      // A multi-blank fill_blank may carry per-blank synonym lists.
      (QuestionKind::FillBlank, AnswerKey::Blanks(blanks))
      | (QuestionKind::ParagraphFillBlank, AnswerKey::Blanks(blanks)) => {
        if blanks.is_empty() || blanks.iter().any(|b| b.is_empty()) {
          return Err(QuestionError::EmptyAcceptedAnswers { kind: self.kind });
        }
        Ok(())
      }
      (QuestionKind::ParagraphFillBlank, AnswerKey::Text(accepted)) => {
        // One plain string per blank, the most common authored form.
        if accepted.is_empty() {
          return Err(QuestionError::EmptyAcceptedAnswers { kind: self.kind });
        }
        Ok(())
      }
      _ => Err(QuestionError::KeyShapeMismatch { kind: self.kind }),
    }
  }

  /// Composite identity used for deduplication and wrong-book lookup:
  /// `stem|opt1|opt2|...|key`. The key segment flattens list shapes with
  /// commas, matching how the legacy format stringified its `correct`
  /// value, so identities survive import/export round-trips.
  pub fn fingerprint(&self) -> String {
    let key = match &self.key {
      AnswerKey::Single(i) => i.to_string(),
      AnswerKey::Multiple(v) => {
        v.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",")
      }
      AnswerKey::Text(v) => v.join(","),
      AnswerKey::Blanks(v) => {
        v.iter().map(|b| b.join(",")).collect::<Vec<_>>().join(",")
      }
    };
    format!("{}|{}|{}", self.stem, self.options.join("|"), key)
  }

  /// Accepted strings for blank `i`, for the fill-in kinds.
  pub fn accepted_for_blank(&self, i: usize) -> Vec<String> {
    match &self.key {
      AnswerKey::Text(accepted) if i == 0 => accepted.clone(),
      AnswerKey::Blanks(blanks) => blanks.get(i).cloned().unwrap_or_default(),
      // paragraph keys authored as a flat list: one accepted string per blank
      AnswerKey::Text(accepted) => {
        accepted.get(i).map(|s| vec![s.clone()]).unwrap_or_default()
      }
      _ => Vec::new(),
    }
  }

  /// Number of blanks the answer key expects (fill-in kinds only).
  pub fn key_blank_count(&self) -> usize {
    match &self.key {
      AnswerKey::Blanks(blanks) => blanks.len(),
      AnswerKey::Text(accepted) => match self.kind {
        QuestionKind::ParagraphFillBlank => accepted.len(),
        _ => 1,
      },
      _ => 0,
    }
  }
}

/// A question in the wrong-answer book, plus its spaced-repetition state.
///
/// Invariant: an incorrect answer resets `repetitions` to 0 and
/// `interval_days` to 1. The item is removed once `repetitions` reaches the
/// retirement threshold after a correct recall.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
  #[serde(flatten)]
  pub question: Question,
  #[serde(rename = "wrongCount")]
  pub wrong_count: u32,
  pub repetitions: u32,
  #[serde(rename = "interval")]
  pub interval_days: u32,
  /// Calendar day the item becomes due again. `None` means due immediately.
  #[serde(rename = "nextReview", default, skip_serializing_if = "Option::is_none")]
  pub next_review: Option<NaiveDate>,
}

impl ReviewItem {
  pub fn fingerprint(&self) -> String {
    self.question.fingerprint()
  }

  /// Due iff the scheduled day has arrived or passed, or no day is set.
  pub fn is_due(&self, today: NaiveDate) -> bool {
    match self.next_review {
      Some(d) => d <= today,
      None => true,
    }
  }
}

/// A user-saved set of questions, optionally filed under a folder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedSet {
  pub id: String,
  pub name: String,
  #[serde(rename = "folderId", default, skip_serializing_if = "Option::is_none")]
  pub folder_id: Option<String>,
  pub questions: Vec<Question>,
  #[serde(rename = "practiceCount", default)]
  pub practice_count: u32,
  #[serde(rename = "lastPracticedAt", default, skip_serializing_if = "Option::is_none")]
  pub last_practiced_at: Option<chrono::DateTime<chrono::Utc>>,
  #[serde(rename = "createdAt")]
  pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A folder grouping saved sets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Folder {
  pub id: String,
  pub name: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn single(stem: &str, options: &[&str], correct: usize) -> Question {
    Question {
      kind: QuestionKind::SingleChoice,
      stem: stem.into(),
      options: options.iter().map(|s| s.to_string()).collect(),
      key: AnswerKey::Single(correct),
      explanation: None,
      category: None,
    }
  }

  #[test]
  fn fingerprint_matches_legacy_format() {
    let q = single("Tu ______ tes amis ?", &["a vu", "as vu"], 1);
    assert_eq!(q.fingerprint(), "Tu ______ tes amis ?|a vu|as vu|1");

    let multi = Question {
      kind: QuestionKind::MultipleChoice,
      stem: "s".into(),
      options: vec!["a".into(), "b".into(), "c".into()],
      key: AnswerKey::Multiple(vec![0, 2]),
      explanation: None,
      category: None,
    };
    assert_eq!(multi.fingerprint(), "s|a|b|c|0,2");

    let para = Question {
      kind: QuestionKind::ParagraphFillBlank,
      stem: "_____ et _____".into(),
      options: vec![],
      key: AnswerKey::Blanks(vec![vec!["vu".into(), "vue".into()], vec!["vois".into()]]),
      explanation: None,
      category: None,
    };
    // Nested lists flatten with commas, like the legacy stringification.
    assert_eq!(para.fingerprint(), "_____ et _____||vu,vue,vois");
  }

  #[test]
  fn fingerprint_survives_json_round_trip() {
    let q = single("En ce moment, nous ______ un film.", &["voions", "voyons"], 1);
    let json = serde_json::to_string(&q).unwrap();
    let back: Question = serde_json::from_str(&json).unwrap();
    assert_eq!(back.fingerprint(), q.fingerprint());
  }

  #[test]
  fn untagged_key_parses_each_shape() {
    let q: Question = serde_json::from_str(
      r#"{"type":"single_choice","stem":"s","options":["a","b"],"correct":1}"#,
    )
    .unwrap();
    assert_eq!(q.key, AnswerKey::Single(1));

    let q: Question = serde_json::from_str(
      r#"{"type":"multiple_choice","stem":"s","options":["a","b"],"correct":[0,1]}"#,
    )
    .unwrap();
    assert_eq!(q.key, AnswerKey::Multiple(vec![0, 1]));

    let q: Question =
      serde_json::from_str(r#"{"type":"fill_blank","stem":"_____","correct":["vue"]}"#).unwrap();
    assert_eq!(q.key, AnswerKey::Text(vec!["vue".into()]));

    let q: Question = serde_json::from_str(
      r#"{"type":"paragraph_fill_blank","stem":"_____ _____","correct":[["vas"],["vu","vue"]]}"#,
    )
    .unwrap();
    assert_eq!(
      q.key,
      AnswerKey::Blanks(vec![vec!["vas".into()], vec!["vu".into(), "vue".into()]])
    );
  }

  #[test]
  fn validate_rejects_shape_mismatch() {
    let mut q = single("s", &["a", "b"], 0);
    q.key = AnswerKey::Text(vec!["a".into()]);
    assert_eq!(
      q.validate(),
      Err(QuestionError::KeyShapeMismatch { kind: QuestionKind::SingleChoice })
    );
  }

  #[test]
  fn validate_rejects_out_of_range_index() {
    let q = single("s", &["a", "b"], 5);
    assert_eq!(
      q.validate(),
      Err(QuestionError::IndexOutOfRange { index: 5, count: 2 })
    );
  }

  #[test]
  fn blank_count_counts_markers() {
    let q = Question {
      kind: QuestionKind::ParagraphFillBlank,
      stem: "Hier, j'ai _____ un accident. Aujourd'hui, je _____ la police.".into(),
      options: vec![],
      key: AnswerKey::Text(vec!["vu".into(), "vois".into()]),
      explanation: None,
      category: None,
    };
    assert_eq!(q.blank_count(), 2);
    assert_eq!(q.key_blank_count(), 2);
    assert_eq!(q.accepted_for_blank(1), vec!["vois".to_string()]);
  }
}
