//! Session ownership: token acquisition, persistence, and the profile
//! state derived from it.

pub mod profile;
pub mod store;
pub mod tokens;

// Re-export commonly used types
pub use profile::{InstitutionDetails, Profile, ProfileUser, PROFILE_TYPE_INSTITUTION};
pub use store::{Session, SessionStore};
pub use tokens::{StoredToken, TokenStore, TOKEN_TTL_DAYS};
