use std::collections::HashMap;

use crate::client::Client;
use crate::entities::contact;

/// Placeholder shown when an invoice carries no customer reference.
pub const NO_CONTACT: &str = "—";

/// Resolves customer identifiers to display names, memoizing every result
/// (fallbacks included) for the lifetime of a run.
///
/// The cache is never evicted within a run; contact cardinality is bounded by
/// the invoice set being processed.
#[derive(Debug, Default)]
pub struct ContactResolver {
    cache: HashMap<String, String>,
}

impl ContactResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct ids resolved so far.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Resolves `contact_id` to a display name.
    ///
    /// Absent or empty ids resolve to the placeholder without a network call.
    /// A failed fetch resolves to `id:{contact_id}` rather than failing the
    /// run.
    pub async fn resolve(&mut self, client: &mut Client, contact_id: Option<&str>) -> String {
        let Some(id) = contact_id.filter(|id| !id.is_empty()) else {
            return NO_CONTACT.to_string();
        };
        if let Some(name) = self.cache.get(id) {
            return name.clone();
        }

        let name = match contact::get(client, id).await {
            Ok(record) => record
                .display()
                .map_or_else(|| format!("id:{id}"), ToString::to_string),
            Err(err) => {
                debug!(contact_id = id, error = ?err, "contact lookup failed");
                format!("id:{id}")
            }
        };
        self.cache.insert(id.to_string(), name.clone());
        name
    }
}
