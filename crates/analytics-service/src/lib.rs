pub mod api;
pub mod config;
pub mod error;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use state::AnalyticsServiceState;
