//! Answer evaluation: a pure mapping from (question, submitted answer) to a
//! verdict. No storage access, no side effects; the wrong-book update that
//! follows an incorrect verdict lives in the state layer.

use serde::Serialize;

use crate::domain::{AnswerKey, Question, QuestionError, QuestionKind};
use crate::textmatch;

/// The caller-collected answer for one question.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmittedAnswer {
  /// single_choice: the selected option index.
  Choice(usize),
  /// multiple_choice: the selected option indices. Also used with an empty
  /// list for a forced empty submission (e.g. a timer expiry upstream).
  Choices(Vec<usize>),
  /// fill_blank: the typed text.
  Text(String),
  /// paragraph_fill_blank (or multi-blank fill_blank): one value per blank.
  Texts(Vec<String>),
}

impl SubmittedAnswer {
  fn shape(&self) -> &'static str {
    match self {
      SubmittedAnswer::Choice(_) => "single index",
      SubmittedAnswer::Choices(_) => "index list",
      SubmittedAnswer::Text(_) => "text",
      SubmittedAnswer::Texts(_) => "text list",
    }
  }
}

/// Outcome for one blank of a fill-in question.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlankResult {
  pub submitted: String,
  pub accepted: Vec<String>,
  pub correct: bool,
}

/// Ephemeral evaluation result. `blanks` is empty for the choice kinds and
/// single-blank fill_blank; otherwise it carries the per-blank breakdown.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Verdict {
  pub correct: bool,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub blanks: Vec<BlankResult>,
}

/// Evaluation rejects malformed questions and kind/answer shape mismatches
/// with a typed error instead of silently reporting "incorrect".
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EvalError {
  #[error(transparent)]
  Question(#[from] QuestionError),
  #[error("a {kind:?} question does not accept a {submitted} answer")]
  AnswerShape { kind: QuestionKind, submitted: &'static str },
}

/// Decide correctness of `answer` against `question`.
pub fn evaluate(question: &Question, answer: &SubmittedAnswer) -> Result<Verdict, EvalError> {
  question.validate()?;
  let mismatch = || EvalError::AnswerShape {
    kind: question.kind,
    submitted: answer.shape(),
  };

  match question.kind {
    QuestionKind::SingleChoice => {
      let selected = match answer {
        SubmittedAnswer::Choice(i) => Some(*i),
        // Nothing selected when the submission was forced through.
        SubmittedAnswer::Choices(v) if v.is_empty() => None,
        _ => return Err(mismatch()),
      };
      let correct = match (&question.key, selected) {
        (AnswerKey::Single(k), Some(i)) => i == *k,
        _ => false,
      };
      Ok(Verdict { correct, blanks: Vec::new() })
    }

    QuestionKind::MultipleChoice => {
      let selected = match answer {
        SubmittedAnswer::Choices(v) => v,
        _ => return Err(mismatch()),
      };
      let key = match &question.key {
        AnswerKey::Multiple(k) => k,
        _ => unreachable!("validate() enforced the key shape"),
      };
      // Exact set equality: same size, same members. No partial credit.
      let mut sel = selected.clone();
      sel.sort_unstable();
      sel.dedup();
      let mut want = key.clone();
      want.sort_unstable();
      want.dedup();
      Ok(Verdict { correct: sel == want, blanks: Vec::new() })
    }

    QuestionKind::FillBlank => match answer {
      SubmittedAnswer::Text(text) => {
        let correct = textmatch::matches(text, &question.accepted_for_blank(0));
        Ok(Verdict { correct, blanks: Vec::new() })
      }
      // A fill_blank stem with several blanks answered with several values
      // degrades to the paragraph algorithm for this call.
      SubmittedAnswer::Texts(values) if question.blank_count() >= 2 && values.len() >= 2 => {
        Ok(evaluate_blanks(question, values))
      }
      SubmittedAnswer::Texts(values) => {
        let submitted = values.first().map(String::as_str).unwrap_or("");
        let correct = textmatch::matches(submitted, &question.accepted_for_blank(0));
        Ok(Verdict { correct, blanks: Vec::new() })
      }
      _ => Err(mismatch()),
    },

    QuestionKind::ParagraphFillBlank => match answer {
      SubmittedAnswer::Texts(values) => Ok(evaluate_blanks(question, values)),
      _ => Err(mismatch()),
    },
  }
}

/// Per-blank comparison. Each submitted value is matched against that
/// blank's accepted synonyms; missing trailing values are incorrect with
/// empty submitted text. Correct overall only if every blank is correct.
fn evaluate_blanks(question: &Question, values: &[String]) -> Verdict {
  let blank_total = question.key_blank_count();
  let mut blanks = Vec::with_capacity(blank_total);
  let mut all_correct = true;

  for i in 0..blank_total {
    let accepted = question.accepted_for_blank(i);
    let correct = values
      .get(i)
      .map(|v| textmatch::matches(v, &accepted))
      .unwrap_or(false);
    if !correct {
      all_correct = false;
    }
    blanks.push(BlankResult {
      submitted: values.get(i).cloned().unwrap_or_default(),
      accepted,
      correct,
    });
  }

  Verdict { correct: all_correct, blanks }
}
