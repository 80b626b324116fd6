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

//! Session persistence.
//!
//! `SessionStore` is the contract between the reviewer and a storage
//! backend. Backends must reproduce the ordered-query semantics exactly:
//! the reviewer's card selection is deterministic only if every backend
//! sorts the same way.

pub mod json;
pub mod memory;

use std::cmp::Reverse;
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::types::flashcard::Flashcard;
use crate::types::flashcard::FlashcardMetadata;
use crate::types::flashcard::FlashcardStats;
use crate::types::session::Session;

/// Stores the state of review sessions.
///
/// Lookup misses are reported as `ReviewError::NotFound`, which callers
/// distinguish from backend failures.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Upserts a session record.
    async fn set_session(&self, session: &Session) -> Fallible<()>;
    /// Returns the specified session.
    async fn get_session(&self, session_id: &str) -> Fallible<Session>;
    /// Returns all sessions.
    async fn get_sessions(&self) -> Fallible<Vec<Session>>;
    /// Upserts the listed flashcards. A card whose stored metadata differs
    /// from the incoming metadata has its stats reset to zero; a card with
    /// identical metadata is left untouched. Cards not listed are untouched.
    async fn set_flashcards(
        &self,
        session_id: &str,
        metadata: &[FlashcardMetadata],
    ) -> Fallible<()>;
    /// Deletes the listed flashcards. Unknown ids are ignored.
    async fn delete_flashcards(&self, session_id: &str, ids: &[i64]) -> Fallible<()>;
    /// Returns all flashcards, ordered by ascending id.
    async fn get_flashcards(&self, session_id: &str) -> Fallible<Vec<Flashcard>>;
    /// Returns the specified flashcard.
    async fn get_flashcard(&self, session_id: &str, flashcard_id: i64) -> Fallible<Flashcard>;
    /// Overwrites a flashcard's stats, leaving its metadata untouched.
    async fn set_flashcard_stats(
        &self,
        session_id: &str,
        flashcard_id: i64,
        stats: &FlashcardStats,
    ) -> Fallible<()>;
    /// Returns the unreviewed flashcard with the smallest id, or `NotFound`
    /// if every card has been reviewed.
    async fn next_unreviewed(&self, session_id: &str) -> Fallible<Flashcard>;
    /// Returns the reviewed flashcard that is due in the given round or
    /// earlier, or `NotFound` if none is due. Candidates are ordered by
    /// `next_review` ascending, then `view_count` descending, then id
    /// ascending, so the longest-overdue and most-fragile cards come first.
    async fn next_reviewed(&self, session_id: &str, round: u64) -> Fallible<Flashcard>;
}

/// One session's record: the session state plus its flashcards keyed by id.
/// Shared by the backends in this crate; the `BTreeMap` gives the id-ordered
/// iteration the store contract requires.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct SessionEntry {
    pub session: Session,
    pub cards: BTreeMap<i64, Flashcard>,
}

impl SessionEntry {
    pub fn new(session: Session) -> Self {
        SessionEntry {
            session,
            cards: BTreeMap::new(),
        }
    }

    pub fn upsert(&mut self, metadata: &[FlashcardMetadata]) {
        for m in metadata {
            match self.cards.get_mut(&m.id) {
                Some(card) if card.metadata == *m => {}
                Some(card) => *card = Flashcard::unreviewed(m.clone()),
                None => {
                    self.cards.insert(m.id, Flashcard::unreviewed(m.clone()));
                }
            }
        }
    }

    pub fn next_unreviewed(&self) -> Option<&Flashcard> {
        self.cards.values().find(|f| f.stats.view_count == 0)
    }

    pub fn next_reviewed(&self, round: u64) -> Option<&Flashcard> {
        self.cards
            .values()
            .filter(|f| f.stats.view_count > 0 && f.stats.next_review <= round)
            .min_by_key(|f| {
                (
                    f.stats.next_review,
                    Reverse(f.stats.view_count),
                    f.metadata.id,
                )
            })
    }
}
