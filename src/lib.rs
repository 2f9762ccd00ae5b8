pub mod analytics;
pub mod config;
pub mod constants;
pub mod extractors;
pub mod flashcards;
pub mod logging;
pub mod middleware;
pub mod planning;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
