//! Loading an optional question bank from TOML.
//!
//! Each `[[questions]]` entry fills the field matching its kind:
//! `correct_index` for single_choice, `correct_indices` for multiple_choice,
//! `accepted` for fill_blank (synonyms), `blanks` for paragraph_fill_blank
//! (one synonym list per blank). Entries that fail validation are logged and
//! skipped rather than aborting startup.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{AnswerKey, Question, QuestionKind};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct BankConfig {
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// Question entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub kind: QuestionKind,
  pub stem: String,
  #[serde(default)] pub options: Vec<String>,
  #[serde(default)] pub correct_index: Option<usize>,
  #[serde(default)] pub correct_indices: Option<Vec<usize>>,
  #[serde(default)] pub accepted: Option<Vec<String>>,
  #[serde(default)] pub blanks: Option<Vec<Vec<String>>>,
  #[serde(default)] pub explanation: Option<String>,
  #[serde(default)] pub category: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BankEntryError {
  #[error("{kind:?} entry is missing its answer field")]
  MissingAnswer { kind: QuestionKind },
  #[error(transparent)]
  Invalid(#[from] crate::domain::QuestionError),
}

impl QuestionCfg {
  pub fn into_question(self) -> Result<Question, BankEntryError> {
    let key = match self.kind {
      QuestionKind::SingleChoice => AnswerKey::Single(
        self.correct_index.ok_or(BankEntryError::MissingAnswer { kind: self.kind })?,
      ),
      QuestionKind::MultipleChoice => AnswerKey::Multiple(
        self.correct_indices.ok_or(BankEntryError::MissingAnswer { kind: self.kind })?,
      ),
      QuestionKind::FillBlank => AnswerKey::Text(
        self.accepted.ok_or(BankEntryError::MissingAnswer { kind: self.kind })?,
      ),
      QuestionKind::ParagraphFillBlank => AnswerKey::Blanks(
        self.blanks.ok_or(BankEntryError::MissingAnswer { kind: self.kind })?,
      ),
    };
    let question = Question {
      kind: self.kind,
      stem: self.stem,
      options: self.options,
      key,
      explanation: self.explanation,
      category: self.category,
    };
    question.validate()?;
    Ok(question)
  }
}

/// Parse a TOML bank, skipping invalid entries with a log line each.
pub fn parse_bank(raw: &str) -> Result<Vec<Question>, toml::de::Error> {
  let cfg: BankConfig = toml::from_str(raw)?;
  let mut questions = Vec::with_capacity(cfg.questions.len());
  for entry in cfg.questions {
    let stem = entry.stem.clone();
    match entry.into_question() {
      Ok(q) => questions.push(q),
      Err(e) => {
        error!(target: "quiz", %stem, error = %e, "Skipping bank entry");
      }
    }
  }
  Ok(questions)
}

/// Attempt to load extra questions from `BANK_CONFIG_PATH`. On any IO or
/// parse error, returns an empty list.
pub fn load_bank_from_env() -> Vec<Question> {
  let Ok(path) = std::env::var("BANK_CONFIG_PATH") else {
    return Vec::new();
  };
  match std::fs::read_to_string(&path) {
    Ok(raw) => match parse_bank(&raw) {
      Ok(questions) => {
        info!(target: "chouette_backend", %path, count = questions.len(), "Loaded question bank (TOML)");
        questions
      }
      Err(e) => {
        error!(target: "chouette_backend", %path, error = %e, "Failed to parse TOML bank");
        Vec::new()
      }
    },
    Err(e) => {
      error!(target: "chouette_backend", %path, error = %e, "Failed to read TOML bank file");
      Vec::new()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_each_kind() {
    let raw = r#"
[[questions]]
kind = "single_choice"
stem = "Demain, je ______ le médecin."
options = ["vais voir", "vais vois"]
correct_index = 0
category = "最近将来时"

[[questions]]
kind = "multiple_choice"
stem = "Lesquelles sont correctes ?"
options = ["a", "b", "c"]
correct_indices = [0, 2]

[[questions]]
kind = "fill_blank"
stem = "Nous ______ (voir) la mer."
accepted = ["voyons"]

[[questions]]
kind = "paragraph_fill_blank"
stem = "Tu _____ voir ce film ? Je l'ai _____."
blanks = [["vas"], ["vu", "vue"]]
"#;
    let questions = parse_bank(raw).unwrap();
    assert_eq!(questions.len(), 4);
    assert_eq!(questions[0].key, AnswerKey::Single(0));
    assert_eq!(questions[1].key, AnswerKey::Multiple(vec![0, 2]));
    assert_eq!(questions[2].key, AnswerKey::Text(vec!["voyons".into()]));
    assert_eq!(
      questions[3].key,
      AnswerKey::Blanks(vec![vec!["vas".into()], vec!["vu".into(), "vue".into()]])
    );
  }

  #[test]
  fn kind_mismatched_entries_are_skipped() {
    // single_choice without correct_index, and an out-of-range index.
    let raw = r#"
[[questions]]
kind = "single_choice"
stem = "sans réponse"
options = ["a", "b"]

[[questions]]
kind = "single_choice"
stem = "hors limites"
options = ["a", "b"]
correct_index = 9

[[questions]]
kind = "fill_blank"
stem = "ok ______"
accepted = ["vu"]
"#;
    let questions = parse_bank(raw).unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].stem, "ok ______");
  }
}
