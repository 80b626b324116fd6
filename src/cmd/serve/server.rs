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

use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use clap::ValueEnum;
use roundcards_core::CsvSource;
use roundcards_core::JsonStore;
use roundcards_core::MemoryStore;
use roundcards_core::Reviewer;
use roundcards_core::Session;
use roundcards_core::Submission;
use roundcards_core::error::Fallible;
use roundcards_core::error::ReviewError;
use roundcards_core::source::FlashcardMetadataSource;
use roundcards_core::store::SessionStore;
use roundcards_core::verify_unambiguous;
use serde::Deserialize;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::signal;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum StoreBackend {
    /// Keep sessions in memory; they are lost when the server stops.
    Memory,
    /// Persist sessions to a local JSON snapshot file.
    Json,
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Json => write!(f, "json"),
        }
    }
}

pub struct ServerConfig {
    pub catalog: String,
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub store_path: String,
    pub levels: usize,
}

#[derive(Clone)]
struct ServerState {
    reviewer: Arc<Reviewer>,
    source: Arc<dyn FlashcardMetadataSource>,
    levels: usize,
}

/// The response for a submit request.
#[derive(Serialize, Deserialize)]
pub struct SubmissionResponse {
    /// The current session state.
    pub session: Session,
    /// True if and only if the submission had a correct answer.
    pub is_correct: bool,
}

pub async fn start_server(config: ServerConfig) -> Fallible<()> {
    let source = Arc::new(CsvSource::new(&config.catalog));

    // Read the catalog once up front so a missing or ambiguous file fails
    // at startup instead of on the first request.
    let metadata = source.get_all().await?;
    verify_unambiguous(&metadata)?;
    log::debug!("Catalog holds {} flashcards", metadata.len());

    let store: Arc<dyn SessionStore> = match config.store {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Json => Arc::new(JsonStore::open(&config.store_path).await?),
    };

    let state = ServerState {
        reviewer: Arc::new(Reviewer::new(store)),
        source,
        levels: config.levels,
    };

    let app = Router::new();
    let app = app.route("/sessions", post(create_session_handler));
    let app = app.route("/sessions", get(get_sessions_handler));
    let app = app.route("/sessions/{sid}", get(get_session_handler));
    let app = app.route("/sessions/{sid}/flashcards", get(get_flashcards_handler));
    let app = app.route("/sessions/{sid}/flashcards/next", post(next_flashcard_handler));
    let app = app.route("/sessions/{sid}/flashcards/sync", post(sync_flashcards_handler));
    let app = app.route(
        "/sessions/{sid}/flashcards/{fid}/submit",
        post(submit_flashcard_handler),
    );
    let app = app.with_state(state);
    let bind = format!("{}:{}", config.host, config.port);

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn create_session_handler(State(state): State<ServerState>) -> Response {
    match state
        .reviewer
        .create_session(state.source.as_ref(), state.levels)
        .await
    {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_sessions_handler(State(state): State<ServerState>) -> Response {
    match state.reviewer.get_sessions().await {
        Ok(sessions) => Json(sessions).into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_session_handler(State(state): State<ServerState>, Path(sid): Path<String>) -> Response {
    match state.reviewer.get_session(&sid).await {
        Ok(session) => Json(session).into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_flashcards_handler(
    State(state): State<ServerState>,
    Path(sid): Path<String>,
) -> Response {
    match state.reviewer.get_flashcards(&sid).await {
        Ok(flashcards) => Json(flashcards).into_response(),
        Err(e) => error_response(e),
    }
}

async fn next_flashcard_handler(
    State(state): State<ServerState>,
    Path(sid): Path<String>,
) -> Response {
    match state.reviewer.next_flashcard(&sid).await {
        Ok(flashcard) => Json(flashcard).into_response(),
        Err(e) => error_response(e),
    }
}

async fn sync_flashcards_handler(
    State(state): State<ServerState>,
    Path(sid): Path<String>,
) -> Response {
    match state
        .reviewer
        .sync_flashcards(&sid, state.source.as_ref())
        .await
    {
        Ok(session) => Json(session).into_response(),
        Err(e) => error_response(e),
    }
}

async fn submit_flashcard_handler(
    State(state): State<ServerState>,
    Path((sid, fid)): Path<(String, i64)>,
    Json(submission): Json<Submission>,
) -> Response {
    match state.reviewer.submit(&sid, fid, &submission).await {
        Ok((session, true)) => Json(SubmissionResponse {
            session,
            is_correct: true,
        })
        .into_response(),
        // An incorrect answer changes nothing.
        Ok((_, false)) => StatusCode::NOT_MODIFIED.into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: ReviewError) -> Response {
    let status = match err {
        ReviewError::NotFound => StatusCode::NOT_FOUND,
        ReviewError::AmbiguousAnswers { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    log::error!("{err}");
    (status, err.to_string()).into_response()
}

async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    log::debug!("Received Ctrl+C, shutting down gracefully");
}
