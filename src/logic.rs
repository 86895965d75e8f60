//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Selecting and shuffling practice questions (bank, saved set or due reviews)
//!   - Submitting an answer: evaluate, update the wrong-answer book, build the reply
//!   - Fallback explanations when a question carries none

use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::domain::{AnswerKey, Question, QuestionKind};
use crate::evaluator::{self, EvalError, SubmittedAnswer, Verdict};
use crate::state::AppState;
use crate::util::option_letter;

/// Where a practice run draws its questions from.
#[derive(Clone, Debug, PartialEq)]
pub enum QuestionSource {
  /// The built-in bank (seeds plus the optional TOML bank).
  Bank,
  /// A saved set by id.
  Set(String),
  /// Review items due today.
  ReviewDue,
}

#[derive(Clone, Debug)]
pub struct SelectionParams {
  pub source: QuestionSource,
  pub category: Option<String>,
  pub kind: Option<QuestionKind>,
  pub count: Option<usize>,
  /// Re-order choice options per question, remapping the key indices.
  pub shuffle_options: bool,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SelectError {
  #[error("unknown saved set: {0}")]
  UnknownSet(String),
}

/// The full reply to one submitted answer.
#[derive(Clone, Debug)]
pub struct AnswerOutcome {
  pub verdict: Verdict,
  pub explanation: String,
  /// Times this question has been missed overall (0 if never).
  pub wrong_count: u32,
  /// True when a correct recall in review mode retired the item.
  pub retired: bool,
}

/// Pick questions for a practice run. Filters apply before shuffling; the
/// count truncates after, so each run sees a fresh sample.
#[instrument(level = "info", skip(state, params), fields(source = ?params.source, count = params.count))]
pub async fn select_questions(
  state: &AppState,
  params: &SelectionParams,
) -> Result<Vec<Question>, SelectError> {
  let mut pool: Vec<Question> = match &params.source {
    QuestionSource::Bank => state.bank().to_vec(),
    QuestionSource::Set(id) => {
      let set = state
        .set_by_id(id)
        .await
        .ok_or_else(|| SelectError::UnknownSet(id.clone()))?;
      state.record_set_practice(id).await;
      set.questions
    }
    QuestionSource::ReviewDue => {
      let today = state.today();
      state
        .due_reviews(today)
        .await
        .into_iter()
        .map(|item| item.question)
        .collect()
    }
  };

  if let Some(category) = &params.category {
    pool.retain(|q| q.category.as_deref() == Some(category.as_str()));
  }
  if let Some(kind) = params.kind {
    pool.retain(|q| q.kind == kind);
  }

  let mut rng = rand::thread_rng();
  pool.shuffle(&mut rng);
  if let Some(count) = params.count {
    pool.truncate(count);
  }
  if params.shuffle_options {
    for q in pool.iter_mut() {
      shuffle_question_options(q, &mut rng);
    }
  }

  debug!(target: "quiz", selected = pool.len(), "Questions selected");
  Ok(pool)
}

/// Shuffle the option list of a choice question in place, remapping the
/// answer key so the correct option stays correct. Fill-in kinds are left
/// untouched.
pub fn shuffle_question_options<R: rand::Rng>(q: &mut Question, rng: &mut R) {
  if q.options.len() < 2 {
    return;
  }
  let mut order: Vec<usize> = (0..q.options.len()).collect();
  order.shuffle(rng);

  let remap = |old: usize| order.iter().position(|&o| o == old).unwrap_or(old);
  match &mut q.key {
    AnswerKey::Single(i) => *i = remap(*i),
    AnswerKey::Multiple(indices) => {
      for i in indices.iter_mut() {
        *i = remap(*i);
      }
      indices.sort_unstable();
    }
    _ => return,
  }
  q.options = order.iter().map(|&o| q.options[o].clone()).collect();
}

/// Evaluate one answer and apply its consequences: a miss enters or bumps
/// the wrong-answer book exactly once, and a correct recall while practicing
/// reviews advances (or retires) the item.
#[instrument(level = "info", skip(state, question, answer), fields(kind = ?question.kind, from_review))]
pub async fn submit_answer(
  state: &AppState,
  question: &Question,
  answer: &SubmittedAnswer,
  from_review: bool,
) -> Result<AnswerOutcome, EvalError> {
  let verdict = evaluator::evaluate(question, answer)?;
  let fingerprint = question.fingerprint();
  let today = state.today();

  if !verdict.correct {
    state.record_miss(question, today).await;
  }
  let retired = if from_review && verdict.correct {
    state.record_correct(&fingerprint, today).await
  } else {
    false
  };
  let wrong_count = state.wrong_count(&fingerprint).await;

  debug!(
    target: "quiz",
    correct = verdict.correct,
    wrong_count,
    retired,
    "Answer recorded"
  );

  Ok(AnswerOutcome {
    explanation: question
      .explanation
      .clone()
      .unwrap_or_else(|| fallback_explanation(question)),
    verdict,
    wrong_count,
    retired,
  })
}

/// A minimal explanation naming the correct answer, used when the question
/// author provided none.
pub fn fallback_explanation(q: &Question) -> String {
  match (&q.kind, &q.key) {
    (QuestionKind::SingleChoice, AnswerKey::Single(i)) => {
      format!("正确答案：{}", option_letter(*i))
    }
    (QuestionKind::MultipleChoice, AnswerKey::Multiple(indices)) => {
      let letters: Vec<String> = indices.iter().map(|&i| option_letter(i).to_string()).collect();
      format!("正确答案：{}", letters.join("、"))
    }
    _ => {
      let per_blank: Vec<String> = (0..q.key_blank_count().max(1))
        .map(|i| q.accepted_for_blank(i).join(" / "))
        .collect();
      format!("正确答案：{}", per_blank.join("；"))
    }
  }
}
