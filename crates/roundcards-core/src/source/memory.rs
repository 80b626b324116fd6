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

use async_trait::async_trait;

use crate::error::Fallible;
use crate::source::FlashcardMetadataSource;
use crate::types::flashcard::FlashcardMetadata;

/// Serves flashcard metadata from memory. Mainly intended for tests.
pub struct MemorySource {
    metadata: Vec<FlashcardMetadata>,
}

impl MemorySource {
    pub fn new(metadata: Vec<FlashcardMetadata>) -> Self {
        MemorySource { metadata }
    }
}

#[async_trait]
impl FlashcardMetadataSource for MemorySource {
    async fn get_all(&self) -> Fallible<Vec<FlashcardMetadata>> {
        Ok(self.metadata.clone())
    }
}
