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

use serde::Deserialize;
use serde::Serialize;

/// Immutable flashcard data, owned by the catalog source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardMetadata {
    /// Uniquely identifies the flashcard within a source.
    pub id: i64,
    /// The text shown to the learner.
    pub prompt: String,
    /// Disambiguates cards that share a prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// The accepted answer. Equality against it is the sole correctness test.
    pub answer: String,
}

impl FlashcardMetadata {
    pub fn qualified_prompt(&self) -> QualifiedPrompt {
        QualifiedPrompt {
            prompt: self.prompt.clone(),
            context: self.context.clone(),
        }
    }
}

/// The `(prompt, context)` pair. The catalog must map each qualified prompt
/// to a single answer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QualifiedPrompt {
    pub prompt: String,
    pub context: Option<String>,
}

/// Mutable per-session flashcard state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardStats {
    /// How many times the card was submitted as a first guess.
    pub view_count: u64,
    /// Consecutive successful first guesses since the last failure.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub repetitions: u64,
    /// The round in which the card is due to be reviewed next.
    /// Meaningful only once `view_count > 0`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub next_review: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// A flashcard as owned by a session: catalog metadata plus review stats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub metadata: FlashcardMetadata,
    #[serde(default)]
    pub stats: FlashcardStats,
}

impl Flashcard {
    /// A card with zeroed stats, as written on first ingestion.
    pub fn unreviewed(metadata: FlashcardMetadata) -> Self {
        Flashcard {
            metadata,
            stats: FlashcardStats::default(),
        }
    }
}

/// A learner's answer to a flashcard prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// The submitted answer.
    pub answer: String,
    /// False if the learner was already shown the expected answer and this
    /// is a corrective retry.
    pub is_first_guess: bool,
}
