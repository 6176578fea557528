use async_trait::async_trait;

use axon_model::{KeyValue, SpotRequest};

use crate::error::SpotError;
use crate::request::MarketRequest;

/// Remote pricing-market client.
///
/// Implementations wrap the low-level compute API together with its own
/// retry policy; callers here treat every method as a single attempt that
/// either succeeded or failed for good.
#[async_trait]
pub trait SpotMarketClient: Send + Sync {
    /// Submit one market request covering all requested instances and
    /// return the request objects the market opened for it.
    async fn request_spot_instances(
        &self,
        order: &MarketRequest,
    ) -> Result<Vec<SpotRequest>, SpotError>;

    /// Apply tags to a request on the remote side. Idempotent.
    async fn update_request_tags(
        &self,
        request_id: &str,
        tags: &[KeyValue],
    ) -> Result<(), SpotError>;
}
