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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

/// Errors produced by the review engine and its stores and sources.
#[derive(Debug)]
pub enum ReviewError {
    /// Two catalog entries share a qualified prompt but disagree on the answer.
    AmbiguousAnswers {
        prompt: String,
        context: Option<String>,
        answers: [String; 2],
    },
    /// The requested session or flashcard doesn't exist. Also used as the
    /// sentinel result of the `next_unreviewed`/`next_reviewed` queries.
    NotFound,
    /// A catalog entry is malformed (bad id, missing column, empty field).
    Catalog(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
}

impl ReviewError {
    /// True if this is the `NotFound` sentinel. Callers branch on this:
    /// the reviewer treats it as control flow, everything else is surfaced.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReviewError::NotFound)
    }
}

impl Display for ReviewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewError::AmbiguousAnswers {
                prompt,
                context,
                answers,
            } => match context {
                Some(context) => write!(
                    f,
                    "ambiguous answers {:?} and {:?} for prompt {:?} (context {:?})",
                    answers[0], answers[1], prompt, context
                ),
                None => write!(
                    f,
                    "ambiguous answers {:?} and {:?} for prompt {:?}",
                    answers[0], answers[1], prompt
                ),
            },
            ReviewError::NotFound => write!(f, "not found"),
            ReviewError::Catalog(message) => write!(f, "invalid catalog entry: {message}"),
            ReviewError::Io(e) => write!(f, "I/O error: {e}"),
            ReviewError::Json(e) => write!(f, "JSON error: {e}"),
            ReviewError::Csv(e) => write!(f, "CSV error: {e}"),
        }
    }
}

impl Error for ReviewError {}

impl From<std::io::Error> for ReviewError {
    fn from(value: std::io::Error) -> Self {
        ReviewError::Io(value)
    }
}

impl From<serde_json::Error> for ReviewError {
    fn from(value: serde_json::Error) -> Self {
        ReviewError::Json(value)
    }
}

impl From<csv::Error> for ReviewError {
    fn from(value: csv::Error) -> Self {
        ReviewError::Csv(value)
    }
}

pub type Fallible<T> = Result<T, ReviewError>;
