//! Customer entity with optional personalization fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Addressable recipient of campaign messages.
///
/// The contact address is required and treated as opaque. Every
/// personalization field may be absent; readers treat absence and the empty
/// string identically, so no sentinel values are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: i32,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_product: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Display name assembled from whichever name parts are present,
    /// falling back to a generic label when both are absent.
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");

        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{first} {last}"),
            (false, true) => first.to_owned(),
            (true, false) => last.to_owned(),
            (true, true) => "Customer".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn customer(first: Option<&str>, last: Option<&str>) -> Customer {
        Customer {
            id: 1,
            phone: "+15550001".into(),
            first_name: first.map(str::to_owned),
            last_name: last.map(str::to_owned),
            location: None,
            preferred_product: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(Some("Ada"), Some("Lovelace"), "Ada Lovelace")]
    #[case(Some("Ada"), None, "Ada")]
    #[case(None, Some("Lovelace"), "Lovelace")]
    #[case(None, None, "Customer")]
    #[case(Some(""), Some(""), "Customer")]
    fn full_name_falls_back_gracefully(
        #[case] first: Option<&str>,
        #[case] last: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(customer(first, last).full_name(), expected);
    }
}
