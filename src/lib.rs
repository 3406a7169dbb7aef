pub mod api;
pub mod core;
pub mod dashboards;
pub mod forms;
pub mod loader;
pub mod models;
pub mod notify;
pub mod session;
pub mod uploads;
