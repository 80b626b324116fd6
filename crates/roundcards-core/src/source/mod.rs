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

pub mod csv;
pub mod memory;

use async_trait::async_trait;

use crate::error::Fallible;
use crate::types::flashcard::FlashcardMetadata;

/// The source of truth for flashcard metadata. Read-only from the engine's
/// perspective.
#[async_trait]
pub trait FlashcardMetadataSource: Send + Sync {
    /// Returns the metadata for all flashcards. The result is finite, may be
    /// unordered, and contains each id at most once.
    async fn get_all(&self) -> Fallible<Vec<FlashcardMetadata>>;
}
