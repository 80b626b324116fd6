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

/// Review session state.
///
/// The invariant that holds after every completed operation:
/// `unreviewed_count` plus the sum of `proficiency_counts` equals the number
/// of flashcards in the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Uniquely identifies the session.
    pub id: String,
    /// An incrementing counter that identifies the current round.
    pub round: u64,
    /// True between entering a round and the first successful first-guess
    /// submission inside it.
    pub is_new_round: bool,
    /// The number of reviewed flashcards at each proficiency level. The
    /// length is the session's configured level count.
    pub proficiency_counts: Vec<u64>,
    /// The number of flashcards that haven't been reviewed yet.
    pub unreviewed_count: u64,
}

impl Session {
    /// A fresh session with no flashcards. `levels` must be at least one.
    pub fn new(id: impl Into<String>, levels: usize) -> Self {
        debug_assert!(levels > 0);
        Session {
            id: id.into(),
            round: 0,
            is_new_round: true,
            proficiency_counts: vec![0; levels],
            unreviewed_count: 0,
        }
    }

    /// The number of proficiency levels configured for this session.
    pub fn levels(&self) -> usize {
        self.proficiency_counts.len()
    }

    pub fn reviewed_count(&self) -> u64 {
        self.proficiency_counts.iter().sum()
    }
}
