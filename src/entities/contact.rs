use serde::Deserialize;

use crate::client::Client;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::utils::serde_helpers::opt_nonempty_string;

/// A contact as returned by `GET /contacts/{id}/`. Only the display fields
/// are read; newer API versions use `name`, older ones `display_name`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactRecord {
    #[serde(deserialize_with = "opt_nonempty_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "opt_nonempty_string")]
    pub display_name: Option<String>,
}

impl ContactRecord {
    /// The best available display name.
    #[must_use]
    pub fn display(&self) -> Option<&str> {
        self.name.as_deref().or(self.display_name.as_deref())
    }
}

/// Retrieve a single contact by its `contact_id`.
#[instrument(skip(client))]
pub async fn get(client: &mut Client, contact_id: &str) -> Result<ContactRecord> {
    client
        .get_endpoint(
            Endpoint::Contact(contact_id.to_string()),
            &Vec::<(String, String)>::new(),
        )
        .await
}
