mod ui;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use tokio::runtime::Handle;
use url::Url;

use rust_chat_client::config::{self, AppConfig};
use rust_chat_client::network::{ApiClient, ConnectionManager, SocketIoConnector};
use rust_chat_client::storage::{self, SessionStore};
use ui::{AppContext, ChatApp};

#[derive(Parser)]
#[command(
    name = "rust_chat_client",
    version,
    about = "Desktop client for the chat service"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Overrides the endpoint root from the config file and environment
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    app_config.apply_env();
    if let Some(api_url) = cli.api_url {
        app_config.api_url = api_url;
    }

    let (api_root, socket_url) = endpoints(&app_config);
    log::info!("Using endpoint {api_root}");

    let store = open_session_store(&app_config);
    let session = store.as_ref().and_then(|store| match store.load() {
        Ok(session) => session,
        Err(err) => {
            log::warn!("Failed to read stored session: {err}");
            None
        }
    });

    let connector = SocketIoConnector::new(
        socket_url,
        Handle::current(),
        Duration::from_millis(app_config.reconnect_delay_ms),
    );
    let ctx = AppContext {
        api: ApiClient::new(api_root),
        connections: Arc::new(ConnectionManager::new(Arc::new(connector))),
        runtime: Handle::current(),
        store,
        session,
        search_debounce: Duration::from_millis(app_config.search_debounce_ms),
    };

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Rust Chat Client",
        options,
        Box::new(move |cc| Ok(Box::new(ChatApp::new(cc, ctx)))),
    )
}

/// HTTP root and Socket.IO endpoint; a malformed URL falls back to the default.
fn endpoints(app_config: &AppConfig) -> (Url, Url) {
    let resolved = app_config
        .api_root()
        .and_then(|root| Ok((root, app_config.socket_url()?)));
    match resolved {
        Ok(endpoints) => endpoints,
        Err(err) => {
            log::error!("Invalid endpoint `{}`: {err}", app_config.api_url);
            let fallback = AppConfig::default();
            match (fallback.api_root(), fallback.socket_url()) {
                (Ok(root), Ok(socket)) => (root, socket),
                _ => unreachable!("default endpoint is a valid URL"),
            }
        }
    }
}

fn open_session_store(app_config: &AppConfig) -> Option<SessionStore> {
    if let Err(err) = storage::ensure_data_dir(&app_config.data_dir) {
        log::warn!(
            "Failed to create data directory {}: {err}",
            app_config.data_dir.display()
        );
        return None;
    }
    match SessionStore::with_path(app_config.session_db_path()) {
        Ok(store) => Some(store),
        Err(err) => {
            log::warn!("Session persistence disabled: {err}");
            None
        }
    }
}
