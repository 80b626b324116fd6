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

use std::process::exit;

use clap::Parser;
use roundcards_core::error::Fallible;
use tokio::spawn;

use crate::cmd::check::check_catalog;
use crate::cmd::serve::server::ServerConfig;
use crate::cmd::serve::server::StoreBackend;
use crate::cmd::serve::server::start_server;
use crate::utils::wait_for_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Review flashcards through an HTTP API.
    Serve {
        /// Path to the CSV catalog of flashcards.
        catalog: String,
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// The port to use for the server. Default is 8000.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Which backend to keep session state in.
        #[arg(long, default_value_t = StoreBackend::Memory)]
        store: StoreBackend,
        /// Path to the session file. Only used with the json backend.
        #[arg(long, default_value = "sessions.json")]
        store_path: String,
        /// The number of proficiency levels tracked per session.
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..=64))]
        levels: u64,
        /// Whether to open the browser automatically. Default is false.
        #[arg(long)]
        open_browser: bool,
    },
    /// Check the integrity of a flashcard catalog.
    Check {
        /// Path to the CSV catalog of flashcards.
        catalog: String,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve {
            catalog,
            host,
            port,
            store,
            store_path,
            levels,
            open_browser,
        } => {
            if open_browser {
                // Start a separate task to open the browser once the server is up.
                let browser_host = host.clone();
                spawn(async move {
                    match wait_for_server(&browser_host, port).await {
                        Ok(_) => {
                            let _ = open::that(format!("http://{browser_host}:{port}/sessions"));
                        }
                        Err(e) => {
                            eprintln!("Failed to connect to server: {e}");
                            exit(-1)
                        }
                    }
                });
            }
            let config = ServerConfig {
                catalog,
                host,
                port,
                store,
                store_path,
                levels: levels as usize,
            };
            start_server(config).await
        }
        Command::Check { catalog } => check_catalog(&catalog).await,
    }
}
