//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_dashboard_config_source;
mod in_memory_dashboard_config_source;

pub use http_dashboard_config_source::HttpDashboardConfigSource;
pub use in_memory_dashboard_config_source::InMemoryDashboardConfigSource;
