//! Application state: the immutable question bank plus the persisted data
//! file behind a single RwLock.
//!
//! Every mutation holds the write lock across the read-modify-write and the
//! save, so the whole-file persistence stays consistent even though handlers
//! run concurrently.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::load_bank_from_env;
use crate::domain::{Folder, Question, ReviewItem, SavedSet};
use crate::seeds::default_questions;
use crate::store::{DailyStats, DataFile, SessionRecord};

const DEFAULT_DATA_PATH: &str = "./chouette_data.json";

pub struct AppState {
  /// Built-in seeds plus the optional TOML bank. Fixed after startup.
  bank: Vec<Question>,
  data: RwLock<DataFile>,
  data_path: PathBuf,
}

impl AppState {
  /// Build state from env: seed the bank, load the optional TOML bank, and
  /// read the data file (missing or corrupt file means empty collections).
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let mut bank = default_questions();
    let extra = load_bank_from_env();
    if !extra.is_empty() {
      // Bank entries win over seeds with the same identity.
      let extra_fps: Vec<String> = extra.iter().map(|q| q.fingerprint()).collect();
      bank.retain(|q| !extra_fps.contains(&q.fingerprint()));
      bank.extend(extra);
    }

    let data_path = PathBuf::from(
      std::env::var("DATA_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string()),
    );
    let data = DataFile::load(&data_path);
    info!(
      target: "chouette_backend",
      bank = bank.len(),
      wrong_book = data.wrong_book.len(),
      saved_sets = data.saved_sets.len(),
      data_path = %data_path.display(),
      "State initialized"
    );

    Self { bank, data: RwLock::new(data), data_path }
  }

  #[cfg(test)]
  pub fn for_tests(bank: Vec<Question>, data_path: PathBuf) -> Self {
    Self { bank, data: RwLock::new(DataFile::load(&data_path)), data_path }
  }

  pub fn bank(&self) -> &[Question] {
    &self.bank
  }

  /// Today's calendar date; review scheduling is whole-day based.
  pub fn today(&self) -> NaiveDate {
    chrono::Local::now().date_naive()
  }

  async fn read<T>(&self, f: impl FnOnce(&DataFile) -> T) -> T {
    let data = self.data.read().await;
    f(&data)
  }

  /// Apply a mutation and persist the whole blob before releasing the lock.
  async fn mutate<T>(&self, f: impl FnOnce(&mut DataFile) -> T) -> T {
    let mut data = self.data.write().await;
    let out = f(&mut data);
    if let Err(e) = data.save(&self.data_path) {
      error!(target: "chouette_backend", path = %self.data_path.display(), error = %e, "Failed to persist data file");
    }
    out
  }

  // ---- wrong-answer book ----

  pub async fn record_miss(&self, question: &Question, today: NaiveDate) {
    self.mutate(|d| d.record_miss(question, today)).await;
  }

  /// Returns true when the correct recall retired the item.
  pub async fn record_correct(&self, fingerprint: &str, today: NaiveDate) -> bool {
    self.mutate(|d| d.record_correct(fingerprint, today)).await
  }

  pub async fn due_reviews(&self, today: NaiveDate) -> Vec<ReviewItem> {
    self.read(|d| d.due_reviews(today)).await
  }

  pub async fn all_reviews(&self) -> Vec<ReviewItem> {
    self.read(|d| d.wrong_book.clone()).await
  }

  pub async fn remove_review(&self, fingerprint: &str) -> Option<ReviewItem> {
    self.mutate(|d| d.remove_review(fingerprint)).await
  }

  pub async fn restore_review(&self, item: ReviewItem) -> bool {
    self.mutate(|d| d.restore_review(item)).await
  }

  pub async fn wrong_count(&self, fingerprint: &str) -> u32 {
    self.read(|d| d.wrong_count(fingerprint)).await
  }

  // ---- stats ----

  pub async fn add_practice(&self, n: usize, today: NaiveDate) -> DailyStats {
    self
      .mutate(|d| {
        d.daily_stats.add_practice(n, today);
        d.daily_stats.clone()
      })
      .await
  }

  pub async fn push_session(&self, total: usize, score: usize) {
    self.mutate(|d| d.push_session(total, score, Utc::now())).await;
  }

  pub async fn stats(&self, today: NaiveDate) -> (DailyStats, Vec<SessionRecord>) {
    self
      .read(|d| (d.daily_stats.for_today(today), d.recent_sessions.clone()))
      .await
  }

  // ---- question notes ----

  pub async fn note_for(&self, fingerprint: &str) -> Option<String> {
    self.read(|d| d.question_notes.get(fingerprint).cloned()).await
  }

  /// Empty text clears the note.
  pub async fn set_note(&self, fingerprint: String, text: String) {
    self
      .mutate(|d| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
          d.question_notes.remove(&fingerprint);
        } else {
          d.question_notes.insert(fingerprint, trimmed.to_string());
        }
      })
      .await;
  }

  // ---- saved sets and folders ----

  pub async fn saved_sets(&self) -> (Vec<SavedSet>, Vec<Folder>) {
    self.read(|d| (d.saved_sets.clone(), d.folders.clone())).await
  }

  pub async fn set_by_id(&self, id: &str) -> Option<SavedSet> {
    self.read(|d| d.set_by_id(id).cloned()).await
  }

  /// Create a set from validated questions, deduplicated by fingerprint.
  pub async fn create_set(
    &self,
    name: String,
    folder_id: Option<String>,
    questions: Vec<Question>,
  ) -> SavedSet {
    let mut seen = Vec::new();
    let mut deduped = Vec::new();
    for q in questions {
      let fp = q.fingerprint();
      if !seen.contains(&fp) {
        seen.push(fp);
        deduped.push(q);
      }
    }
    let set = SavedSet {
      id: Uuid::new_v4().to_string(),
      name,
      folder_id,
      questions: deduped,
      practice_count: 0,
      last_practiced_at: None,
      created_at: Utc::now(),
    };
    self
      .mutate(|d| {
        d.saved_sets.push(set.clone());
      })
      .await;
    set
  }

  pub async fn delete_set(&self, id: &str) -> bool {
    self
      .mutate(|d| {
        let before = d.saved_sets.len();
        d.saved_sets.retain(|s| s.id != id);
        d.saved_sets.len() < before
      })
      .await
  }

  /// Rename a set and/or move it to another folder.
  pub async fn update_set(
    &self,
    id: &str,
    name: Option<String>,
    folder_id: Option<Option<String>>,
  ) -> bool {
    self
      .mutate(|d| {
        let Some(set) = d.saved_sets.iter_mut().find(|s| s.id == id) else {
          return false;
        };
        if let Some(name) = name {
          set.name = name;
        }
        if let Some(folder_id) = folder_id {
          set.folder_id = folder_id;
        }
        true
      })
      .await
  }

  pub async fn record_set_practice(&self, id: &str) {
    self.mutate(|d| d.record_set_practice(id, Utc::now())).await;
  }

  pub async fn create_folder(&self, name: String) -> Folder {
    let folder = Folder { id: Uuid::new_v4().to_string(), name };
    self
      .mutate(|d| {
        d.folders.push(folder.clone());
      })
      .await;
    folder
  }

  /// Deleting a folder leaves its sets uncategorized.
  pub async fn delete_folder(&self, id: &str) -> bool {
    self
      .mutate(|d| {
        let before = d.folders.len();
        d.folders.retain(|f| f.id != id);
        if d.folders.len() < before {
          for set in d.saved_sets.iter_mut() {
            if set.folder_id.as_deref() == Some(id) {
              set.folder_id = None;
            }
          }
          true
        } else {
          false
        }
      })
      .await
  }

  // ---- import / export ----

  pub async fn export_data(&self) -> DataFile {
    self.read(|d| d.clone()).await
  }

  /// Replace the persisted collections wholesale with an imported blob,
  /// dropping review items whose embedded question no longer validates.
  pub async fn import_data(&self, mut incoming: DataFile) -> (usize, usize) {
    incoming.wrong_book.retain(|item| item.question.validate().is_ok());
    for set in incoming.saved_sets.iter_mut() {
      set.questions.retain(|q| q.validate().is_ok());
    }
    let counts = (incoming.saved_sets.len(), incoming.wrong_book.len());
    self
      .mutate(|d| {
        *d = incoming;
      })
      .await;
    counts
  }
}
