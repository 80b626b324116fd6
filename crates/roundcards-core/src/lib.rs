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

//! roundcards-core: Core library for the roundcards spaced repetition system.
//!
//! This library provides:
//! - The round-based geometric backoff scheduler
//! - Resumable review sessions orchestrated by the `Reviewer`
//! - The `SessionStore` persistence contract with in-memory and JSON backends
//! - Flashcard catalog sources (in-memory, CSV)

pub mod error;
pub mod reviewer;
pub mod schedule;
pub mod source;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use error::{Fallible, ReviewError};
pub use reviewer::{Reviewer, verify_unambiguous};
pub use source::FlashcardMetadataSource;
pub use source::csv::CsvSource;
pub use source::memory::MemorySource;
pub use store::SessionStore;
pub use store::json::JsonStore;
pub use store::memory::MemoryStore;
pub use types::flashcard::{Flashcard, FlashcardMetadata, FlashcardStats, Submission};
pub use types::session::Session;
