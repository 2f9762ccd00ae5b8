use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use smartpath_backend::config::{AnalyticsConfig, Config, LLMConfig};
use smartpath_backend::routes::build_router;
use smartpath_backend::state::AppState;
use smartpath_backend::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

fn base_config(sled_path: String, llm: LLMConfig) -> Config {
    // Built directly so parallel tests never race on environment variables.
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        cors_origin: "http://localhost:5173".to_string(),
        analytics: AnalyticsConfig::default(),
        llm,
    }
}

fn spawn_with_llm(llm: LLMConfig) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("smartpath-test.sled");
    let config = base_config(sled_path.to_string_lossy().to_string(), llm);

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let state = AppState::new(store, &config);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

/// Content generator disabled: recommendations fall back to rules and
/// generation returns 503.
pub async fn spawn_test_server() -> TestApp {
    spawn_with_llm(LLMConfig::default())
}

/// Content generator in deterministic mock mode.
pub async fn spawn_test_server_with_mock_generator() -> TestApp {
    spawn_with_llm(LLMConfig {
        enabled: true,
        mock: true,
        ..LLMConfig::default()
    })
}
