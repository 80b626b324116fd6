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

//! The review session orchestrator.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::Fallible;
use crate::error::ReviewError;
use crate::schedule;
use crate::schedule::proficiency_index;
use crate::source::FlashcardMetadataSource;
use crate::store::SessionStore;
use crate::types::flashcard::Flashcard;
use crate::types::flashcard::FlashcardMetadata;
use crate::types::flashcard::QualifiedPrompt;
use crate::types::flashcard::Submission;
use crate::types::session::Session;

/// Manages flashcard review sessions. Holds no mutable state of its own;
/// everything lives in the store, so a session can be resumed by any
/// reviewer pointed at the same backend.
pub struct Reviewer {
    store: Arc<dyn SessionStore>,
}

impl Reviewer {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Reviewer { store }
    }

    /// Creates a new session with all of the source's flashcards marked as
    /// unreviewed. `levels` is the size of the proficiency ladder.
    pub async fn create_session(
        &self,
        source: &dyn FlashcardMetadataSource,
        levels: usize,
    ) -> Fallible<Session> {
        let metadata = fetch_checked_metadata(source).await?;

        let mut session = Session::new(Uuid::new_v4().to_string(), levels);
        session.unreviewed_count = metadata.len() as u64;

        // The session header is written first so a failed card write leaves
        // a resolvable session rather than orphaned cards.
        self.store.set_session(&session).await?;
        self.store.set_flashcards(&session.id, &metadata).await?;

        Ok(session)
    }

    /// Returns an existing session.
    pub async fn get_session(&self, session_id: &str) -> Fallible<Session> {
        self.store.get_session(session_id).await
    }

    /// Returns all sessions.
    pub async fn get_sessions(&self) -> Fallible<Vec<Session>> {
        self.store.get_sessions().await
    }

    /// Returns a session's flashcards, ordered by ascending id.
    pub async fn get_flashcards(&self, session_id: &str) -> Fallible<Vec<Flashcard>> {
        self.store.get_flashcards(session_id).await
    }

    /// Returns the next flashcard to be reviewed, advancing the round when
    /// nothing is due in the current one. For a session with no flashcards
    /// there is no next card, and the result is `NotFound`.
    ///
    /// Selection is deterministic: a fixed store state always yields the
    /// same card, and the round ends up at the smallest value for which a
    /// reviewable card exists.
    pub async fn next_flashcard(&self, session_id: &str) -> Fallible<Flashcard> {
        loop {
            let mut session = self.store.get_session(session_id).await?;

            if session.is_new_round {
                match self.store.next_unreviewed(session_id).await {
                    Err(e) if e.is_not_found() => {}
                    result => return result,
                }
            }

            match self.store.next_reviewed(session_id, session.round).await {
                Err(e) if e.is_not_found() => {}
                result => return result,
            }

            // Nothing is due. Jump ahead to the earliest round that has a
            // card scheduled, rather than crawling one round at a time.
            let flashcards = self.store.get_flashcards(session_id).await?;
            if flashcards.is_empty() {
                return Err(ReviewError::NotFound);
            }
            let next_due = flashcards
                .iter()
                .filter(|f| f.stats.view_count > 0)
                .map(|f| f.stats.next_review)
                .min();
            session.round = match next_due {
                Some(due) if due > session.round => due,
                _ => session.round + 1,
            };
            session.is_new_round = true;
            self.store.set_session(&session).await?;
        }
    }

    /// Updates the session state following the review of a flashcard.
    /// Returns the session and whether the answer was correct; an incorrect
    /// answer changes nothing.
    pub async fn submit(
        &self,
        session_id: &str,
        flashcard_id: i64,
        submission: &Submission,
    ) -> Fallible<(Session, bool)> {
        let mut session = self.store.get_session(session_id).await?;
        let mut flashcard = self.store.get_flashcard(session_id, flashcard_id).await?;

        let previous_view_count = flashcard.stats.view_count;
        let previous_repetitions = flashcard.stats.repetitions;

        let correct = schedule::submit(&mut flashcard, submission, session.round);
        if !correct {
            return Ok((session, false));
        }

        self.store
            .set_flashcard_stats(session_id, flashcard_id, &flashcard.stats)
            .await?;

        let levels = session.levels();
        session.proficiency_counts[proficiency_index(flashcard.stats.repetitions, levels)] += 1;

        // Counters may be stale after an interrupted sync; never underflow.
        if previous_view_count != 0 {
            let i = proficiency_index(previous_repetitions, levels);
            session.proficiency_counts[i] = session.proficiency_counts[i].saturating_sub(1);
        } else {
            session.unreviewed_count = session.unreviewed_count.saturating_sub(1);
        }

        session.is_new_round = false;

        self.store.set_session(&session).await?;

        Ok((session, true))
    }

    /// Reconciles the session with the metadata source, preserving learner
    /// progress on unchanged flashcards. Deletions are committed before
    /// upserts, and the session header is written last so it never claims
    /// counts that aren't in the store yet.
    pub async fn sync_flashcards(
        &self,
        session_id: &str,
        source: &dyn FlashcardMetadataSource,
    ) -> Fallible<Session> {
        let session = self.store.get_session(session_id).await?;
        let metadata = fetch_checked_metadata(source).await?;
        let existing = self.store.get_flashcards(session_id).await?;

        let (updated, to_delete, to_upsert) = diff(&session, &existing, metadata);

        self.store.delete_flashcards(session_id, &to_delete).await?;
        self.store.set_flashcards(session_id, &to_upsert).await?;
        self.store.set_session(&updated).await?;

        Ok(updated)
    }
}

/// Fails with `AmbiguousAnswers` if two entries share a qualified prompt
/// but disagree on the answer.
pub fn verify_unambiguous(metadata: &[FlashcardMetadata]) -> Fallible<()> {
    let mut answers_by_prompt: HashMap<QualifiedPrompt, &str> = HashMap::new();

    for m in metadata {
        if let Some(previous) = answers_by_prompt.insert(m.qualified_prompt(), &m.answer) {
            if previous != m.answer {
                return Err(ReviewError::AmbiguousAnswers {
                    prompt: m.prompt.clone(),
                    context: m.context.clone(),
                    answers: [previous.to_string(), m.answer.clone()],
                });
            }
        }
    }

    Ok(())
}

async fn fetch_checked_metadata(
    source: &dyn FlashcardMetadataSource,
) -> Fallible<Vec<FlashcardMetadata>> {
    let metadata = source.get_all().await?;
    verify_unambiguous(&metadata)?;
    Ok(metadata)
}

/// Computes the mutations that bring the session in line with the catalog.
/// The updated session keeps its identity and round position but has its
/// counters rebuilt from scratch, so a reconciliation also repairs counts
/// left inconsistent by an earlier partial write.
fn diff(
    session: &Session,
    flashcards: &[Flashcard],
    metadata: Vec<FlashcardMetadata>,
) -> (Session, Vec<i64>, Vec<FlashcardMetadata>) {
    let mut metadata_by_id: HashMap<i64, FlashcardMetadata> =
        metadata.into_iter().map(|m| (m.id, m)).collect();

    let mut updated = Session::new(session.id.clone(), session.levels());
    updated.round = session.round;
    updated.is_new_round = session.is_new_round;

    let mut to_delete = Vec::new();
    let mut to_upsert = Vec::new();

    for f in flashcards {
        let Some(m) = metadata_by_id.remove(&f.metadata.id) else {
            log::info!(
                "removing flashcard {} ({})",
                f.metadata.id,
                f.metadata.answer
            );
            to_delete.push(f.metadata.id);
            continue;
        };

        if f.metadata != m {
            // A changed card is a different learning item; it restarts as
            // unreviewed (the store clears its stats on upsert).
            log::info!("updating metadata for flashcard {}", m.id);
            updated.unreviewed_count += 1;
            to_upsert.push(m);
        } else if f.stats.view_count == 0 {
            updated.unreviewed_count += 1;
        } else {
            let i = proficiency_index(f.stats.repetitions, updated.levels());
            updated.proficiency_counts[i] += 1;
        }
    }

    // Whatever is left in the catalog map has no card yet.
    let mut added: Vec<FlashcardMetadata> = metadata_by_id.into_values().collect();
    added.sort_by_key(|m| m.id);
    for m in added {
        log::info!("adding flashcard {} ({})", m.id, m.answer);
        updated.unreviewed_count += 1;
        to_upsert.push(m);
    }

    (updated, to_delete, to_upsert)
}
