//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs include parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::logic::{self, SelectError};
use crate::protocol::*;
use crate::state::AppState;
use crate::store::DataFile;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn err(status: StatusCode, message: impl Into<String>) -> ApiError {
  (status, Json(serde_json::json!({ "error": message.into() })))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, q), fields(count = q.count, kind = ?q.kind))]
pub async fn http_get_questions(
  State(state): State<Arc<AppState>>,
  Query(q): Query<QuestionsQuery>,
) -> Result<Json<QuestionsOut>, ApiError> {
  let params = q.into_params();
  let questions = logic::select_questions(&state, &params)
    .await
    .map_err(|e| match e {
      SelectError::UnknownSet(_) => err(StatusCode::NOT_FOUND, e.to_string()),
    })?;
  info!(target: "quiz", served = questions.len(), "HTTP questions served");
  Ok(Json(QuestionsOut { questions }))
}

#[instrument(level = "info", skip(state, body), fields(kind = ?body.question.kind, from_review = body.from_review))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, ApiError> {
  let answer = body
    .answer
    .into_submitted()
    .ok_or_else(|| err(StatusCode::BAD_REQUEST, "answer payload is empty"))?;
  let out = logic::submit_answer(&state, &body.question, &answer, body.from_review)
    .await
    .map_err(|e| err(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
  info!(target: "quiz", correct = out.verdict.correct, retired = out.retired, "HTTP answer evaluated");
  Ok(Json(AnswerOut {
    correct: out.verdict.correct,
    blanks: out.verdict.blanks,
    explanation: out.explanation,
    wrong_count: out.wrong_count,
    retired: out.retired,
  }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_review_due(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let items = state.due_reviews(state.today()).await;
  let total = items.len();
  Json(ReviewListOut { items, total })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_review_all(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let items = state.all_reviews().await;
  let total = items.len();
  Json(ReviewListOut { items, total })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_review_remove(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RemoveReviewIn>,
) -> impl IntoResponse {
  let removed = state.remove_review(&body.fingerprint).await;
  info!(target: "quiz", found = removed.is_some(), "HTTP review item removed");
  Json(RemoveReviewOut { removed })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_review_restore(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RestoreReviewIn>,
) -> impl IntoResponse {
  let restored = state.restore_review(body.item).await;
  Json(RestoreReviewOut { restored })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (daily, recent_sessions) = state.stats(state.today()).await;
  Json(StatsOut {
    today_count: daily.today_count,
    streak: daily.streak,
    recent_sessions,
  })
}

#[instrument(level = "info", skip(state, body), fields(count = body.count))]
pub async fn http_post_practiced(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PracticedIn>,
) -> impl IntoResponse {
  let daily = state.add_practice(body.count, state.today()).await;
  if let (Some(total), Some(score)) = (body.total, body.score) {
    state.push_session(total, score).await;
  }
  let (_, recent_sessions) = state.stats(state.today()).await;
  Json(StatsOut {
    today_count: daily.today_count,
    streak: daily.streak,
    recent_sessions,
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_sets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (sets, folders) = state.saved_sets().await;
  Json(SetsOut { sets, folders })
}

#[instrument(level = "info", skip(state, body), fields(name = %body.name, questions = body.questions.len()))]
pub async fn http_post_set(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CreateSetIn>,
) -> Result<impl IntoResponse, ApiError> {
  for q in &body.questions {
    q.validate()
      .map_err(|e| err(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
  }
  let set = state.create_set(body.name, body.folder_id, body.questions).await;
  info!(target: "quiz", id = %set.id, "HTTP saved set created");
  Ok(Json(set))
}

#[instrument(level = "info", skip(state, body), fields(%id))]
pub async fn http_patch_set(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<UpdateSetIn>,
) -> Result<impl IntoResponse, ApiError> {
  if !state.update_set(&id, body.name, body.folder_id).await {
    return Err(err(StatusCode::NOT_FOUND, format!("unknown saved set: {}", id)));
  }
  match state.set_by_id(&id).await {
    Some(set) => Ok(Json(set)),
    None => Err(err(StatusCode::NOT_FOUND, format!("unknown saved set: {}", id))),
  }
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_set(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  let deleted = state.delete_set(&id).await;
  Json(DeletedOut { deleted })
}

#[instrument(level = "info", skip(state, body), fields(name = %body.name))]
pub async fn http_post_folder(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CreateFolderIn>,
) -> impl IntoResponse {
  let folder = state.create_folder(body.name).await;
  Json(folder)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_folder(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  let deleted = state.delete_folder(&id).await;
  Json(DeletedOut { deleted })
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_get_note(
  State(state): State<Arc<AppState>>,
  Query(q): Query<NoteQuery>,
) -> impl IntoResponse {
  let note = state.note_for(&q.fingerprint).await;
  Json(NoteOut { note })
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len()))]
pub async fn http_post_note(
  State(state): State<Arc<AppState>>,
  Json(body): Json<NoteIn>,
) -> impl IntoResponse {
  state.set_note(body.fingerprint.clone(), body.text).await;
  let note = state.note_for(&body.fingerprint).await;
  Json(NoteOut { note })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_export(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.export_data().await)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_import(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DataFile>,
) -> impl IntoResponse {
  let (sets, reviews) = state.import_data(body).await;
  info!(target: "quiz", sets, reviews, "HTTP import applied");
  Json(ImportOut { sets, reviews })
}
