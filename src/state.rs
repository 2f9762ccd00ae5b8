use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::services::content_generator::ContentGenerator;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    generator: Arc<ContentGenerator>,
    config: Arc<Config>,
    started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<Store>, config: &Config) -> Self {
        Self {
            store,
            generator: Arc::new(ContentGenerator::new(&config.llm)),
            config: Arc::new(config.clone()),
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn generator(&self) -> &ContentGenerator {
        &self.generator
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_follows_config() {
        let mut cfg = Config::from_env();
        cfg.llm.enabled = true;
        cfg.llm.mock = true;
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(Store::open(tmp.path().join("state.sled").to_str().unwrap()).unwrap());
        let state = AppState::new(store, &cfg);

        assert!(state.generator().is_enabled());
        assert!(state.generator().is_mock());
        assert_eq!(state.config().port, cfg.port);
    }
}
