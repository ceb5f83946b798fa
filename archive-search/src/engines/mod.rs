//! Search backend implementations.
//!
//! Each module provides a struct implementing [`crate::engine::SearchBackend`].

pub mod archive_org;

pub use archive_org::ArchiveOrgBackend;
