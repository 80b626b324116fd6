// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Fallible;
use crate::store::SessionEntry;
use crate::store::SessionStore;
use crate::store::memory::MemoryStore;
use crate::types::flashcard::Flashcard;
use crate::types::flashcard::FlashcardMetadata;
use crate::types::flashcard::FlashcardStats;
use crate::types::session::Session;

/// Stores sessions in a local JSON file.
///
/// The full state is kept in memory and the file is rewritten after every
/// mutation, so queries never touch the disk. A missing file is treated as
/// an empty store.
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    pub async fn open(path: impl AsRef<Path>) -> Fallible<Self> {
        let path = path.as_ref().to_path_buf();
        let entries: HashMap<String, SessionEntry> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(JsonStore {
            path,
            inner: MemoryStore::from_entries(entries),
        })
    }

    async fn persist(&self) -> Fallible<()> {
        let entries = self.inner.dump().await;
        let bytes = serde_json::to_vec_pretty(&entries)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for JsonStore {
    async fn set_session(&self, session: &Session) -> Fallible<()> {
        self.inner.set_session(session).await?;
        self.persist().await
    }

    async fn get_session(&self, session_id: &str) -> Fallible<Session> {
        self.inner.get_session(session_id).await
    }

    async fn get_sessions(&self) -> Fallible<Vec<Session>> {
        self.inner.get_sessions().await
    }

    async fn set_flashcards(
        &self,
        session_id: &str,
        metadata: &[FlashcardMetadata],
    ) -> Fallible<()> {
        self.inner.set_flashcards(session_id, metadata).await?;
        self.persist().await
    }

    async fn delete_flashcards(&self, session_id: &str, ids: &[i64]) -> Fallible<()> {
        self.inner.delete_flashcards(session_id, ids).await?;
        self.persist().await
    }

    async fn get_flashcards(&self, session_id: &str) -> Fallible<Vec<Flashcard>> {
        self.inner.get_flashcards(session_id).await
    }

    async fn get_flashcard(&self, session_id: &str, flashcard_id: i64) -> Fallible<Flashcard> {
        self.inner.get_flashcard(session_id, flashcard_id).await
    }

    async fn set_flashcard_stats(
        &self,
        session_id: &str,
        flashcard_id: i64,
        stats: &FlashcardStats,
    ) -> Fallible<()> {
        self.inner
            .set_flashcard_stats(session_id, flashcard_id, stats)
            .await?;
        self.persist().await
    }

    async fn next_unreviewed(&self, session_id: &str) -> Fallible<Flashcard> {
        self.inner.next_unreviewed(session_id).await
    }

    async fn next_reviewed(&self, session_id: &str, round: u64) -> Fallible<Flashcard> {
        self.inner.next_reviewed(session_id, round).await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn metadata(id: i64) -> FlashcardMetadata {
        FlashcardMetadata {
            id,
            prompt: format!("What is {id}?"),
            context: None,
            answer: format!("{id}"),
        }
    }

    #[tokio::test]
    async fn test_open_missing_file_is_empty() -> Fallible<()> {
        let dir = tempdir()?;
        let store = JsonStore::open(dir.path().join("sessions.json")).await?;
        assert!(store.get_sessions().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_state_survives_reopening() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("sessions.json");

        let store = JsonStore::open(&path).await?;
        let mut session = Session::new("s1", 5);
        session.unreviewed_count = 2;
        store.set_session(&session).await?;
        store
            .set_flashcards("s1", &[metadata(1), metadata(2)])
            .await?;
        let stats = FlashcardStats {
            view_count: 1,
            repetitions: 1,
            next_review: 1,
        };
        store.set_flashcard_stats("s1", 1, &stats).await?;

        let reopened = JsonStore::open(&path).await?;
        assert_eq!(reopened.get_session("s1").await?, session);
        let flashcards = reopened.get_flashcards("s1").await?;
        assert_eq!(flashcards.len(), 2);
        assert_eq!(reopened.get_flashcard("s1", 1).await?.stats, stats);
        Ok(())
    }

    #[tokio::test]
    async fn test_deletions_are_persisted() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("sessions.json");

        let store = JsonStore::open(&path).await?;
        store.set_session(&Session::new("s1", 5)).await?;
        store
            .set_flashcards("s1", &[metadata(1), metadata(2)])
            .await?;
        store.delete_flashcards("s1", &[1]).await?;

        let reopened = JsonStore::open(&path).await?;
        let flashcards = reopened.get_flashcards("s1").await?;
        let ids: Vec<i64> = flashcards.iter().map(|f| f.metadata.id).collect();
        assert_eq!(ids, vec![2]);
        Ok(())
    }
}
