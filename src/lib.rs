//! archive-explorer: state for a single archive.org search page.
//!
//! The page consists of a search box, facet filters, a result list and
//! "did you mean" suggestions. This crate holds its state and event
//! handling; searching itself is delegated to the `archive-search` member.
//!
//! # Architecture
//!
//! route parameters → [`SearchStateAdapter`] → [`archive_search::SearchOrchestration`]
//! → backend → result mapper → session store observables → renderer
//!
//! - **Route**: [`route::QueryParams`] and the [`route::Navigator`] trait;
//!   conversions between URL parameters and selected facets
//! - **Adapter**: reconciles route and session state, triggers searches,
//!   writes filter changes back into the URL
//! - **View**: the plain records a renderer reads
//! - **Config**: [`AppConfig`], loaded from TOML at startup

pub mod adapter;
pub mod config;
pub mod error;
pub mod route;
pub mod view;

pub use adapter::SearchStateAdapter;
pub use config::{AppConfig, UiConfig};
pub use error::{AppError, Result};
pub use route::{MemoryNavigator, Navigator, QueryParams};
pub use view::{ResultViewType, Viewport};
