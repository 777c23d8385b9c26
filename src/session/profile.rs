//! Profile payload returned by the `/api/profile` endpoint.
//!
//! Field names mirror the wire format; everything the server may omit is
//! optional so a sparse payload never fails to decode.

use serde::{Deserialize, Serialize};

/// Profile type tag used for institutional accounts
pub const PROFILE_TYPE_INSTITUTION: &str = "institution";

/// Server-held description of the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// The user record
    pub user: ProfileUser,

    /// Unread notification count
    #[serde(rename = "notificationCount", default)]
    pub notification_count: u32,
}

impl Profile {
    /// Whether this profile belongs to an institutional account
    pub fn is_institution(&self) -> bool {
        self.user.profile_type.as_deref() == Some(PROFILE_TYPE_INSTITUTION)
    }

    /// Whether the user holds an active subscription
    pub fn is_subscribed(&self) -> bool {
        self.user.is_subscribed.unwrap_or(false)
    }

    /// Human-readable name: institution name for institutions, otherwise
    /// "first surname"
    pub fn display_name(&self) -> String {
        self.user.display_name()
    }
}

/// User record inside a profile payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUser {
    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub surname: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// "institution" for institutional accounts, "teacher"/"student"/… otherwise
    #[serde(default)]
    pub profile_type: Option<String>,

    #[serde(default)]
    pub is_subscribed: Option<bool>,

    /// Storage reference for the avatar image
    #[serde(default)]
    pub profile_picture: Option<String>,

    #[serde(rename = "institutionDetails", default)]
    pub institution_details: Option<InstitutionDetails>,
}

impl ProfileUser {
    /// Human-readable name with fallbacks for sparse records
    pub fn display_name(&self) -> String {
        if self.profile_type.as_deref() == Some(PROFILE_TYPE_INSTITUTION) {
            return self
                .institution_details
                .as_ref()
                .and_then(|d| d.institution_name.clone())
                .unwrap_or_else(|| "Institution".to_string());
        }

        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.surname.as_deref().unwrap_or("")
        );
        let name = name.trim();

        if name.is_empty() {
            "Unknown User".to_string()
        } else {
            name.to_string()
        }
    }
}

/// Institution details nested under institutional accounts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstitutionDetails {
    #[serde(default)]
    pub institution_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_payload_decodes() {
        let profile: Profile = serde_json::from_str(r#"{ "user": {} }"#).unwrap();

        assert!(!profile.is_institution());
        assert!(!profile.is_subscribed());
        assert_eq!(profile.notification_count, 0);
        assert_eq!(profile.display_name(), "Unknown User");
    }

    #[test]
    fn test_institution_display_name() {
        let profile: Profile = serde_json::from_str(
            r#"{
                "user": {
                    "profile_type": "institution",
                    "institutionDetails": { "institution_name": "Hilltop Academy" }
                },
                "notificationCount": 3
            }"#,
        )
        .unwrap();

        assert!(profile.is_institution());
        assert_eq!(profile.display_name(), "Hilltop Academy");
        assert_eq!(profile.notification_count, 3);
    }

    #[test]
    fn test_individual_display_name_trims() {
        let user = ProfileUser {
            first_name: Some("Amina".to_string()),
            surname: None,
            ..Default::default()
        };

        assert_eq!(user.display_name(), "Amina");
    }
}
