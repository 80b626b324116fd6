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

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Fallible;
use crate::error::ReviewError;
use crate::store::SessionEntry;
use crate::store::SessionStore;
use crate::types::flashcard::Flashcard;
use crate::types::flashcard::FlashcardMetadata;
use crate::types::flashcard::FlashcardStats;
use crate::types::session::Session;

/// Stores sessions in memory. The default backend, and the reference
/// implementation the cross-backend contract tests run against.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, SessionEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: HashMap<String, SessionEntry>) -> Self {
        MemoryStore {
            entries: RwLock::new(entries),
        }
    }

    pub(crate) async fn dump(&self) -> HashMap<String, SessionEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn set_session(&self, session: &Session) -> Fallible<()> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&session.id) {
            Some(entry) => entry.session = session.clone(),
            None => {
                entries.insert(session.id.clone(), SessionEntry::new(session.clone()));
            }
        }
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> Fallible<Session> {
        let entries = self.entries.read().await;
        let entry = entries.get(session_id).ok_or(ReviewError::NotFound)?;
        Ok(entry.session.clone())
    }

    async fn get_sessions(&self) -> Fallible<Vec<Session>> {
        let entries = self.entries.read().await;
        let mut sessions: Vec<Session> = entries.values().map(|e| e.session.clone()).collect();
        sessions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(sessions)
    }

    async fn set_flashcards(
        &self,
        session_id: &str,
        metadata: &[FlashcardMetadata],
    ) -> Fallible<()> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(session_id).ok_or(ReviewError::NotFound)?;
        entry.upsert(metadata);
        Ok(())
    }

    async fn delete_flashcards(&self, session_id: &str, ids: &[i64]) -> Fallible<()> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(session_id).ok_or(ReviewError::NotFound)?;
        for id in ids {
            entry.cards.remove(id);
        }
        Ok(())
    }

    async fn get_flashcards(&self, session_id: &str) -> Fallible<Vec<Flashcard>> {
        let entries = self.entries.read().await;
        let entry = entries.get(session_id).ok_or(ReviewError::NotFound)?;
        Ok(entry.cards.values().cloned().collect())
    }

    async fn get_flashcard(&self, session_id: &str, flashcard_id: i64) -> Fallible<Flashcard> {
        let entries = self.entries.read().await;
        let entry = entries.get(session_id).ok_or(ReviewError::NotFound)?;
        entry
            .cards
            .get(&flashcard_id)
            .cloned()
            .ok_or(ReviewError::NotFound)
    }

    async fn set_flashcard_stats(
        &self,
        session_id: &str,
        flashcard_id: i64,
        stats: &FlashcardStats,
    ) -> Fallible<()> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(session_id).ok_or(ReviewError::NotFound)?;
        let card = entry
            .cards
            .get_mut(&flashcard_id)
            .ok_or(ReviewError::NotFound)?;
        card.stats = *stats;
        Ok(())
    }

    async fn next_unreviewed(&self, session_id: &str) -> Fallible<Flashcard> {
        let entries = self.entries.read().await;
        let entry = entries.get(session_id).ok_or(ReviewError::NotFound)?;
        entry
            .next_unreviewed()
            .cloned()
            .ok_or(ReviewError::NotFound)
    }

    async fn next_reviewed(&self, session_id: &str, round: u64) -> Fallible<Flashcard> {
        let entries = self.entries.read().await;
        let entry = entries.get(session_id).ok_or(ReviewError::NotFound)?;
        entry
            .next_reviewed(round)
            .cloned()
            .ok_or(ReviewError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(id: i64) -> FlashcardMetadata {
        FlashcardMetadata {
            id,
            prompt: format!("What is {id}?"),
            context: None,
            answer: format!("{id}"),
        }
    }

    async fn store_with_cards(ids: &[i64]) -> MemoryStore {
        let store = MemoryStore::new();
        let session = Session::new("s1", 5);
        store.set_session(&session).await.unwrap();
        let metadata: Vec<FlashcardMetadata> = ids.iter().map(|id| metadata(*id)).collect();
        store.set_flashcards("s1", &metadata).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_get_session_not_found() {
        let store = MemoryStore::new();
        let err = store.get_session("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_sessions_sorted_by_id() {
        let store = MemoryStore::new();
        store.set_session(&Session::new("b", 5)).await.unwrap();
        store.set_session(&Session::new("a", 5)).await.unwrap();
        let sessions = store.get_sessions().await.unwrap();
        let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_set_session_preserves_cards() {
        let store = store_with_cards(&[1, 2]).await;
        let mut session = store.get_session("s1").await.unwrap();
        session.round = 3;
        store.set_session(&session).await.unwrap();
        assert_eq!(store.get_flashcards("s1").await.unwrap().len(), 2);
        assert_eq!(store.get_session("s1").await.unwrap().round, 3);
    }

    #[tokio::test]
    async fn test_get_flashcards_ordered_by_id() {
        let store = store_with_cards(&[3, 1, 2]).await;
        let flashcards = store.get_flashcards("s1").await.unwrap();
        let ids: Vec<i64> = flashcards.iter().map(|f| f.metadata.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_next_unreviewed_picks_smallest_id() {
        let store = store_with_cards(&[2, 1, 3]).await;
        let f = store.next_unreviewed("s1").await.unwrap();
        assert_eq!(f.metadata.id, 1);
    }

    #[tokio::test]
    async fn test_next_unreviewed_not_found_when_all_reviewed() {
        let store = store_with_cards(&[1]).await;
        let stats = FlashcardStats {
            view_count: 1,
            repetitions: 1,
            next_review: 1,
        };
        store.set_flashcard_stats("s1", 1, &stats).await.unwrap();
        let err = store.next_unreviewed("s1").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_next_reviewed_catches_up_overdue_cards() {
        let store = store_with_cards(&[1, 2]).await;
        for (id, next_review) in [(1, 3), (2, 5)] {
            let stats = FlashcardStats {
                view_count: 1,
                repetitions: 1,
                next_review,
            };
            store.set_flashcard_stats("s1", id, &stats).await.unwrap();
        }
        // Round 4: only the card due in round 3 qualifies, even though its
        // round has already passed.
        let f = store.next_reviewed("s1", 4).await.unwrap();
        assert_eq!(f.metadata.id, 1);
        // Round 2: nothing is due yet.
        let err = store.next_reviewed("s1", 2).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_next_reviewed_prefers_longest_overdue() {
        let store = store_with_cards(&[1, 2]).await;
        let earlier = FlashcardStats {
            view_count: 1,
            repetitions: 1,
            next_review: 2,
        };
        let later = FlashcardStats {
            view_count: 5,
            repetitions: 1,
            next_review: 4,
        };
        store.set_flashcard_stats("s1", 1, &later).await.unwrap();
        store.set_flashcard_stats("s1", 2, &earlier).await.unwrap();
        let f = store.next_reviewed("s1", 10).await.unwrap();
        assert_eq!(f.metadata.id, 2);
    }

    #[tokio::test]
    async fn test_next_reviewed_breaks_ties_by_view_count_then_id() {
        let store = store_with_cards(&[1, 2, 3]).await;
        let fragile = FlashcardStats {
            view_count: 7,
            repetitions: 1,
            next_review: 4,
        };
        let stable = FlashcardStats {
            view_count: 2,
            repetitions: 1,
            next_review: 4,
        };
        store.set_flashcard_stats("s1", 1, &stable).await.unwrap();
        store.set_flashcard_stats("s1", 2, &fragile).await.unwrap();
        store.set_flashcard_stats("s1", 3, &fragile).await.unwrap();
        // Same due round: the card seen most often wins.
        let f = store.next_reviewed("s1", 4).await.unwrap();
        assert_eq!(f.metadata.id, 2);
        // Identical due round and view count: ascending id.
        store.delete_flashcards("s1", &[2]).await.unwrap();
        store.set_flashcard_stats("s1", 1, &fragile).await.unwrap();
        let f = store.next_reviewed("s1", 4).await.unwrap();
        assert_eq!(f.metadata.id, 1);
    }

    #[tokio::test]
    async fn test_set_flashcards_resets_stats_on_metadata_change() {
        let store = store_with_cards(&[1]).await;
        let stats = FlashcardStats {
            view_count: 2,
            repetitions: 2,
            next_review: 3,
        };
        store.set_flashcard_stats("s1", 1, &stats).await.unwrap();

        // Unchanged metadata: stats survive.
        store.set_flashcards("s1", &[metadata(1)]).await.unwrap();
        let f = store.get_flashcard("s1", 1).await.unwrap();
        assert_eq!(f.stats, stats);

        // Changed metadata: stats are cleared.
        let mut changed = metadata(1);
        changed.answer = "one".into();
        store.set_flashcards("s1", &[changed]).await.unwrap();
        let f = store.get_flashcard("s1", 1).await.unwrap();
        assert_eq!(f.stats, FlashcardStats::default());
    }

    #[tokio::test]
    async fn test_delete_flashcards_ignores_unknown_ids() {
        let store = store_with_cards(&[1, 2]).await;
        store.delete_flashcards("s1", &[2, 99]).await.unwrap();
        let flashcards = store.get_flashcards("s1").await.unwrap();
        let ids: Vec<i64> = flashcards.iter().map(|f| f.metadata.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn test_set_flashcard_stats_requires_existing_card() {
        let store = store_with_cards(&[1]).await;
        let err = store
            .set_flashcard_stats("s1", 99, &FlashcardStats::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
