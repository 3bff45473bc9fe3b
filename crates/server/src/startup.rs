use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use service::{file::codeblocks::CodeBlockStore, runtime};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors(permissive: bool) -> CorsLayer {
    if permissive {
        CorsLayer::very_permissive()
    } else {
        CorsLayer::new()
    }
}

struct Settings {
    addr: SocketAddr,
    data_file: String,
    cors_permissive: bool,
}

/// Load bind address, data file, and CORS mode from configs or env vars,
/// with sensible fallbacks
fn load_settings() -> anyhow::Result<Settings> {
    let (host, port, data_file, cors_permissive) = match configs::load_default() {
        Ok(mut cfg) => {
            cfg.normalize_and_validate()?;
            (cfg.server.host, cfg.server.port, cfg.storage.data_file, cfg.server.cors_permissive)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8000);
            let data_file =
                env::var("DATA_FILE").unwrap_or_else(|_| "codeblocks.json".to_string());
            (host, port, data_file, true)
        }
    };
    Ok(Settings {
        addr: format!("{}:{}", host, port).parse()?,
        data_file,
        cors_permissive,
    })
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let settings = load_settings()?;

    runtime::ensure_env(&settings.data_file).await?;

    let store = CodeBlockStore::new(&settings.data_file).await?;

    let cors = build_cors(settings.cors_permissive);
    let app: Router = routes::build_router(Arc::clone(&store), cors);

    info!(addr = %settings.addr, data_file = %settings.data_file, "starting codeblocks server");
    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
