pub mod analysis;
pub mod app_state;
pub mod config;
pub mod credibility;
pub mod extractor;
pub mod fetcher;
pub mod genai;
pub mod health;
pub mod history;
pub mod middleware;
pub mod retry;
pub mod routes;
pub mod telemetry;
