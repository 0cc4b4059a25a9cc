//! External API integrations

pub mod analytics;

pub use analytics::ProviderClient;
