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

use crate::types::flashcard::Flashcard;
use crate::types::flashcard::Submission;

/// Base of the geometric backoff schedule.
pub const SPACED_REPETITION_FACTOR: f64 = 2.0;

/// The number of rounds to wait before re-reviewing a card that has been
/// answered correctly `repetitions` times in a row.
pub fn interval(repetitions: u64) -> u64 {
    SPACED_REPETITION_FACTOR.powi(repetitions as i32).round() as u64
}

/// The proficiency bucket for a card with the given repetition count,
/// saturating at the top level.
pub fn proficiency_index(repetitions: u64, levels: usize) -> usize {
    (repetitions as usize).min(levels - 1)
}

/// Updates a flashcard's stats after a submission at the given round.
/// Returns true if and only if the answer is correct; an incorrect answer
/// leaves the stats untouched.
pub fn submit(flashcard: &mut Flashcard, submission: &Submission, round: u64) -> bool {
    if submission.answer != flashcard.metadata.answer {
        return false;
    }

    flashcard.stats.view_count += 1;

    if submission.is_first_guess {
        flashcard.stats.next_review = round + interval(flashcard.stats.repetitions);
        flashcard.stats.repetitions += 1;
    } else {
        // A corrective retry resets the card to the densest schedule.
        flashcard.stats.next_review = round + 1;
        flashcard.stats.repetitions = 0;
    }

    true
}
