use serde::{Deserialize, Serialize};

use crate::domain::env::KeyValue;

/// Local view of one market-priced capacity request.
///
/// Carries the request id handed back by the pricing market and the locally
/// visible copy of the tags applied to it. The local copy is what later
/// logic reads — updating it alongside the remote request avoids an extra
/// round trip after tagging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotRequest {
    request_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<KeyValue>,
}

impl SpotRequest {
    /// Create an untagged request with the given id.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            tags: Vec::new(),
        }
    }

    /// Id assigned by the pricing market.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Tags as visible locally.
    pub fn tags(&self) -> &[KeyValue] {
        &self.tags
    }

    /// Replace the local tag copy after the remote request was tagged.
    pub fn set_tags(&mut self, tags: Vec<KeyValue>) {
        self.tags = tags;
    }
}
