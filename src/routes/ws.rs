//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::{self, QuestionSource, SelectionParams};
use crate::protocol::{ClientWsMessage, ServerWsMessage, StatsOut};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "chouette_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "chouette_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "chouette_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => {
            error!(target: "chouette_backend", raw = %trunc_for_log(&txt, 200), error = %e, "WS message parse failed");
            ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }
          }
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "chouette_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "chouette_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::NewQuestions { set_id, source, category, kind, count, shuffle_options } => {
      let source = match (set_id, source.as_deref()) {
        (Some(id), _) => QuestionSource::Set(id),
        (None, Some("review")) => QuestionSource::ReviewDue,
        _ => QuestionSource::Bank,
      };
      let params = SelectionParams { source, category, kind, count, shuffle_options };
      match logic::select_questions(state, &params).await {
        Ok(questions) => {
          tracing::info!(target: "quiz", served = questions.len(), "WS new_questions served");
          ServerWsMessage::Questions { questions }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::SubmitAnswer { question, answer, from_review } => {
      let Some(answer) = answer.into_submitted() else {
        return ServerWsMessage::Error { message: "answer payload is empty".into() };
      };
      match logic::submit_answer(state, &question, &answer, from_review).await {
        Ok(out) => {
          tracing::info!(target: "quiz", correct = out.verdict.correct, "WS submit_answer evaluated");
          ServerWsMessage::AnswerResult {
            correct: out.verdict.correct,
            blanks: out.verdict.blanks,
            explanation: out.explanation,
            wrong_count: out.wrong_count,
            retired: out.retired,
          }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::ReviewDue => {
      let items = state.due_reviews(state.today()).await;
      ServerWsMessage::Reviews { items }
    }

    ClientWsMessage::ReviewAll => {
      let items = state.all_reviews().await;
      ServerWsMessage::Reviews { items }
    }

    ClientWsMessage::RemoveReview { fingerprint } => {
      let removed = state.remove_review(&fingerprint).await;
      ServerWsMessage::ReviewRemoved { removed }
    }

    ClientWsMessage::RestoreReview { item } => {
      let restored = state.restore_review(item).await;
      ServerWsMessage::ReviewRestored { restored }
    }

    ClientWsMessage::Stats => {
      let (daily, recent_sessions) = state.stats(state.today()).await;
      ServerWsMessage::Stats {
        stats: StatsOut {
          today_count: daily.today_count,
          streak: daily.streak,
          recent_sessions,
        },
      }
    }

    ClientWsMessage::RecordPracticed { count } => {
      let daily = state.add_practice(count, state.today()).await;
      let (_, recent_sessions) = state.stats(state.today()).await;
      ServerWsMessage::Stats {
        stats: StatsOut {
          today_count: daily.today_count,
          streak: daily.streak,
          recent_sessions,
        },
      }
    }
  }
}
