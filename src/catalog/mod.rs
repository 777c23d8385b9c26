//! Content discovery: the learning feed, derived facets, and filtering.

pub mod content;
pub mod facets;
pub mod filter;
pub mod store;

// Re-export commonly used types
pub use content::{ContentAuthor, ContentItem};
pub use facets::{derive_facets, Facet, Facets};
pub use filter::{FilterState, SearchDebouncer, SEARCH_DEBOUNCE};
pub use store::{CatalogStatus, ContentCatalog};
