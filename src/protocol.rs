//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{Folder, Question, QuestionKind, ReviewItem, SavedSet};
use crate::evaluator::{BlankResult, SubmittedAnswer};
use crate::logic::{QuestionSource, SelectionParams};
use crate::store::SessionRecord;

/// One submitted answer, shaped by question kind. Exactly one field should
/// be present; `single` wins over `multiple` wins over the text fields.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AnswerPayload {
  pub single: Option<usize>,
  pub multiple: Option<Vec<usize>>,
  pub fill: Option<String>,
  pub paragraph: Option<Vec<String>>,
}

impl AnswerPayload {
  pub fn into_submitted(self) -> Option<SubmittedAnswer> {
    if let Some(i) = self.single {
      Some(SubmittedAnswer::Choice(i))
    } else if let Some(v) = self.multiple {
      Some(SubmittedAnswer::Choices(v))
    } else if let Some(t) = self.fill {
      Some(SubmittedAnswer::Text(t))
    } else {
      self.paragraph.map(SubmittedAnswer::Texts)
    }
  }
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  NewQuestions {
    #[serde(rename = "setId")]
    set_id: Option<String>,
    source: Option<String>,
    category: Option<String>,
    kind: Option<QuestionKind>,
    count: Option<usize>,
    #[serde(rename = "shuffleOptions", default)]
    shuffle_options: bool,
  },
  SubmitAnswer {
    question: Question,
    answer: AnswerPayload,
    #[serde(rename = "fromReview", default)]
    from_review: bool,
  },
  ReviewDue,
  ReviewAll,
  RemoveReview {
    fingerprint: String,
  },
  RestoreReview {
    item: ReviewItem,
  },
  Stats,
  RecordPracticed {
    count: usize,
  },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  Questions {
    questions: Vec<Question>,
  },
  AnswerResult {
    correct: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    blanks: Vec<BlankResult>,
    explanation: String,
    #[serde(rename = "wrongCount")]
    wrong_count: u32,
    retired: bool,
  },
  Reviews {
    items: Vec<ReviewItem>,
  },
  ReviewRemoved {
    removed: Option<ReviewItem>,
  },
  ReviewRestored {
    restored: bool,
  },
  Stats {
    stats: StatsOut,
  },
  Error {
    message: String,
  },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct QuestionsQuery {
  #[serde(rename = "setId")]
  pub set_id: Option<String>,
  /// "bank" (default) or "review" for today's due items.
  pub source: Option<String>,
  pub category: Option<String>,
  pub kind: Option<QuestionKind>,
  pub count: Option<usize>,
  #[serde(rename = "shuffleOptions", default)]
  pub shuffle_options: bool,
}

impl QuestionsQuery {
  pub fn into_params(self) -> SelectionParams {
    let source = match (self.set_id, self.source.as_deref()) {
      (Some(id), _) => QuestionSource::Set(id),
      (None, Some("review")) => QuestionSource::ReviewDue,
      _ => QuestionSource::Bank,
    };
    SelectionParams {
      source,
      category: self.category,
      kind: self.kind,
      count: self.count,
      shuffle_options: self.shuffle_options,
    }
  }
}

#[derive(Serialize)]
pub struct QuestionsOut {
  pub questions: Vec<Question>,
}

#[derive(Deserialize)]
pub struct AnswerIn {
  pub question: Question,
  pub answer: AnswerPayload,
  #[serde(rename = "fromReview", default)]
  pub from_review: bool,
}

#[derive(Serialize)]
pub struct AnswerOut {
  pub correct: bool,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub blanks: Vec<BlankResult>,
  pub explanation: String,
  #[serde(rename = "wrongCount")]
  pub wrong_count: u32,
  pub retired: bool,
}

#[derive(Serialize)]
pub struct ReviewListOut {
  pub items: Vec<ReviewItem>,
  pub total: usize,
}

#[derive(Deserialize)]
pub struct RemoveReviewIn {
  pub fingerprint: String,
}

/// The removed item comes back so the client can offer an undo window.
#[derive(Serialize)]
pub struct RemoveReviewOut {
  pub removed: Option<ReviewItem>,
}

#[derive(Deserialize)]
pub struct RestoreReviewIn {
  pub item: ReviewItem,
}

#[derive(Serialize)]
pub struct RestoreReviewOut {
  pub restored: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsOut {
  #[serde(rename = "todayCount")]
  pub today_count: u32,
  pub streak: u32,
  #[serde(rename = "recentSessions")]
  pub recent_sessions: Vec<SessionRecord>,
}

#[derive(Deserialize)]
pub struct PracticedIn {
  pub count: usize,
  /// Present when the practice run just finished, to record the session.
  pub total: Option<usize>,
  pub score: Option<usize>,
}

#[derive(Deserialize)]
pub struct CreateSetIn {
  pub name: String,
  #[serde(rename = "folderId")]
  pub folder_id: Option<String>,
  pub questions: Vec<Question>,
}

/// Missing `folderId` leaves the folder alone; an explicit null moves the
/// set out of its folder.
#[derive(Deserialize)]
pub struct UpdateSetIn {
  pub name: Option<String>,
  #[serde(
    rename = "folderId",
    default,
    deserialize_with = "double_option"
  )]
  pub folder_id: Option<Option<String>>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Deserialize::deserialize(de).map(Some)
}

#[derive(Serialize)]
pub struct SetsOut {
  pub sets: Vec<SavedSet>,
  pub folders: Vec<Folder>,
}

#[derive(Deserialize)]
pub struct CreateFolderIn {
  pub name: String,
}

#[derive(Serialize)]
pub struct DeletedOut {
  pub deleted: bool,
}

#[derive(Serialize)]
pub struct ImportOut {
  pub sets: usize,
  pub reviews: usize,
}

#[derive(Debug, Deserialize)]
pub struct NoteQuery {
  pub fingerprint: String,
}

#[derive(Deserialize)]
pub struct NoteIn {
  pub fingerprint: String,
  pub text: String,
}

#[derive(Serialize)]
pub struct NoteOut {
  pub note: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn answer_payload_maps_each_shape() {
    let p: AnswerPayload = serde_json::from_str(r#"{"single":2}"#).unwrap();
    assert_eq!(p.into_submitted(), Some(SubmittedAnswer::Choice(2)));

    let p: AnswerPayload = serde_json::from_str(r#"{"multiple":[0,3]}"#).unwrap();
    assert_eq!(p.into_submitted(), Some(SubmittedAnswer::Choices(vec![0, 3])));

    let p: AnswerPayload = serde_json::from_str(r#"{"fill":"vue"}"#).unwrap();
    assert_eq!(p.into_submitted(), Some(SubmittedAnswer::Text("vue".into())));

    let p: AnswerPayload = serde_json::from_str(r#"{"paragraph":["vas","vu"]}"#).unwrap();
    assert_eq!(
      p.into_submitted(),
      Some(SubmittedAnswer::Texts(vec!["vas".into(), "vu".into()]))
    );

    let p: AnswerPayload = serde_json::from_str(r#"{}"#).unwrap();
    assert_eq!(p.into_submitted(), None);
  }

  #[test]
  fn questions_query_source_precedence() {
    let q: QuestionsQuery =
      serde_json::from_str(r#"{"setId":"abc","source":"review"}"#).unwrap();
    assert_eq!(q.into_params().source, QuestionSource::Set("abc".into()));

    let q: QuestionsQuery = serde_json::from_str(r#"{"source":"review"}"#).unwrap();
    assert_eq!(q.into_params().source, QuestionSource::ReviewDue);

    let q: QuestionsQuery = serde_json::from_str(r#"{}"#).unwrap();
    assert_eq!(q.into_params().source, QuestionSource::Bank);
  }

  #[test]
  fn update_set_distinguishes_null_from_missing() {
    let up: UpdateSetIn = serde_json::from_str(r#"{"name":"n"}"#).unwrap();
    assert!(up.folder_id.is_none());

    let up: UpdateSetIn = serde_json::from_str(r#"{"folderId":null}"#).unwrap();
    assert_eq!(up.folder_id, Some(None));

    let up: UpdateSetIn = serde_json::from_str(r#"{"folderId":"f1"}"#).unwrap();
    assert_eq!(up.folder_id, Some(Some("f1".into())));
  }

  #[test]
  fn ws_client_messages_parse() {
    let m: ClientWsMessage = serde_json::from_str(
      r#"{"type":"new_questions","count":5,"shuffleOptions":true}"#,
    )
    .unwrap();
    assert!(matches!(
      m,
      ClientWsMessage::NewQuestions { count: Some(5), shuffle_options: true, .. }
    ));

    let m: ClientWsMessage = serde_json::from_str(r#"{"type":"review_due"}"#).unwrap();
    assert!(matches!(m, ClientWsMessage::ReviewDue));
  }
}
