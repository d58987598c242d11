//! Service catalog administration
//!
//! Categories contain services, services contain sub-services to any depth.
//! Reads come from the nested catalog endpoint; writes go through the
//! mutation coordinator which refetches the whole tree after each success.

pub mod clients;
pub mod dashboard;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod views;

pub use clients::HttpCatalogRepository;
pub use dashboard::CatalogDashboard;
pub use routes::routes;
pub use services::{CatalogQuery, MutationCoordinator};
pub use views::CatalogRenderer;
