//! tbooke - command-line client for the Tbooke learning platform
//!
//! Authenticates against the remote API, caches the session token on disk,
//! and presents a searchable, filterable view of the learning-content feed.
//!
//! # Architecture
//!
//! Two cooperating state owners behind one HTTP seam:
//! - `SessionStore` owns the auth token and the profile derived from it
//! - `ContentCatalog` turns the raw content feed into a faceted view
//!
//! # Modules
//!
//! - `api`: Remote API seam and its reqwest implementation
//! - `session`: Token persistence and profile state
//! - `catalog`: Feed cache, facet derivation, search and filters
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Log in and persist a session
//! tbooke login --email you@example.com --password secret
//!
//! # Browse the feed
//! tbooke learning --search algebra --category Math
//!
//! # End the session
//! tbooke logout
//! ```

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod session;

// Re-export main types at crate root for convenience
pub use api::{ApiError, HttpApi, TbookeApi};
pub use catalog::{CatalogStatus, ContentCatalog, ContentItem, Facet, FilterState};
pub use session::{Profile, Session, SessionStore, TokenStore};
