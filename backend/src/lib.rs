pub mod config;
pub mod evaluation;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::Config;
pub use routes::build_app;
pub use state::AppState;
