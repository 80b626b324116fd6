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

use roundcards_core::CsvSource;
use roundcards_core::FlashcardMetadataSource;
use roundcards_core::error::Fallible;
use roundcards_core::verify_unambiguous;

/// Reads the catalog and fails on malformed entries or ambiguous answers.
pub async fn check_catalog(catalog: &str) -> Fallible<()> {
    let source = CsvSource::new(catalog);
    let metadata = source.get_all().await?;
    verify_unambiguous(&metadata)?;
    println!("{} flashcards, no ambiguous answers.", metadata.len());
    Ok(())
}
