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

use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use csv::ReaderBuilder;
use csv::StringRecord;

use crate::error::Fallible;
use crate::error::ReviewError;
use crate::source::FlashcardMetadataSource;
use crate::types::flashcard::FlashcardMetadata;

/// Reads flashcard metadata from a CSV file.
///
/// The file must carry a header row. The id, prompt and answer columns are
/// required; the context column is optional, and an empty context cell means
/// the card has no context.
pub struct CsvSource {
    /// Path to the file.
    pub path: PathBuf,
    /// The character that separates values in the file.
    pub delimiter: u8,
    /// The name of the column containing unique ids.
    pub id_header: String,
    /// The name of the column containing the prompts.
    pub prompt_header: String,
    /// The name of the column containing the context (if any).
    pub context_header: String,
    /// The name of the column containing the answers.
    pub answer_header: String,
}

impl CsvSource {
    /// A source with the default delimiter and column names.
    pub fn new(path: impl AsRef<Path>) -> Self {
        CsvSource {
            path: path.as_ref().to_path_buf(),
            delimiter: b',',
            id_header: "id".into(),
            prompt_header: "prompt".into(),
            context_header: "context".into(),
            answer_header: "answer".into(),
        }
    }

    fn parse(&self, text: &str) -> Fallible<Vec<FlashcardMetadata>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let id_index = self.require_column(&headers, &self.id_header)?;
        let prompt_index = self.require_column(&headers, &self.prompt_header)?;
        let answer_index = self.require_column(&headers, &self.answer_header)?;
        let context_index = headers.iter().position(|h| h == self.context_header);

        let mut metadata = Vec::new();
        for record in reader.records() {
            let record = record?;
            metadata.push(self.parse_record(
                &record,
                id_index,
                prompt_index,
                answer_index,
                context_index,
            )?);
        }
        Ok(metadata)
    }

    fn parse_record(
        &self,
        record: &StringRecord,
        id_index: usize,
        prompt_index: usize,
        answer_index: usize,
        context_index: Option<usize>,
    ) -> Fallible<FlashcardMetadata> {
        let raw_id = record.get(id_index).unwrap_or_default();
        let id: i64 = raw_id
            .trim()
            .parse()
            .map_err(|_| ReviewError::Catalog(format!("invalid id {raw_id:?}")))?;

        let prompt = record.get(prompt_index).unwrap_or_default();
        if prompt.is_empty() {
            return Err(ReviewError::Catalog(format!("empty prompt for id {id}")));
        }

        let answer = record.get(answer_index).unwrap_or_default();
        if answer.is_empty() {
            return Err(ReviewError::Catalog(format!("empty answer for id {id}")));
        }

        let context = context_index
            .and_then(|i| record.get(i))
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(FlashcardMetadata {
            id,
            prompt: prompt.to_string(),
            context,
            answer: answer.to_string(),
        })
    }

    fn require_column(&self, headers: &StringRecord, name: &str) -> Fallible<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReviewError::Catalog(format!("missing column {name:?}")))
    }
}

#[async_trait]
impl FlashcardMetadataSource for CsvSource {
    async fn get_all(&self) -> Fallible<Vec<FlashcardMetadata>> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        self.parse(&text)
    }
}
