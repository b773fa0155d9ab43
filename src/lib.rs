//! Search and upload client for a photo indexing API.
//!
//! [`handlers::App`] binds a [`page::Page`] (the state of the search and upload forms, the results
//! container and the banners) to an [`client::ApiClient`]. [`templates::Templates`] turns the page
//! into HTML.

pub mod client;
pub mod config;
pub mod handlers;
pub mod notifier;
pub mod page;
pub mod render;
pub mod telemetry;
pub mod templates;

pub use client::ApiClient;
pub use config::{ApiConfig, ConfigUpdate};
pub use handlers::App;
pub use photo_search_api_structs as api;
