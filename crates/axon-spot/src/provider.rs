use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{instrument, warn};

use axon_core::serial::SerialExecutor;
use axon_core::{BuildLog, CoreError, Node, NodeProvisioner, NodeRegistry};
use axon_model::{NodeTemplate, SpotRequest};

use crate::client::SpotMarketClient;
use crate::error::SpotError;
use crate::request::MarketRequest;

/// Creates one node object per fulfilled-to-be spot request.
///
/// Implementations live with the scheduler integration; a created node is
/// bound to its request id but not yet registered or connected.
pub trait SpotNodeFactory: Send + Sync {
    fn create(&self, request: &SpotRequest, name: &str) -> Result<Arc<dyn Node>, SpotError>;
}

/// Watches spot requests until the market fulfills them.
///
/// Consumed collaborator: implementations must eventually trigger normal
/// connection handling per node. `start` never blocks.
pub trait FulfillmentSupervisor: Send + Sync {
    fn start(&self, requests: Vec<SpotRequest>, nodes: Vec<Arc<dyn Node>>);
}

/// Market-priced provisioning for one node template.
///
/// Requests capacity for all instances in one batch, tags the resulting
/// requests remotely and locally, then creates and registers node objects
/// one at a time on a serialized executor before delegating fulfillment.
pub struct SpotInstanceProvider {
    template: NodeTemplate,
    client: Arc<dyn SpotMarketClient>,
    registry: Arc<dyn NodeRegistry>,
    factory: Arc<dyn SpotNodeFactory>,
    fulfillment: Arc<dyn FulfillmentSupervisor>,
}

impl SpotInstanceProvider {
    pub fn new(
        template: NodeTemplate,
        client: Arc<dyn SpotMarketClient>,
        registry: Arc<dyn NodeRegistry>,
        factory: Arc<dyn SpotNodeFactory>,
        fulfillment: Arc<dyn FulfillmentSupervisor>,
    ) -> Self {
        Self {
            template,
            client,
            registry,
            factory,
            fulfillment,
        }
    }

    /// Provision `count` spot-priced nodes.
    ///
    /// Returns the created node objects immediately after registration;
    /// neither market fulfillment nor connection is awaited here.
    #[instrument(level = "debug", skip(self, log), fields(template = %self.template.description, count))]
    pub async fn provision_multiple(
        &self,
        log: &BuildLog,
        count: usize,
    ) -> Result<Vec<Arc<dyn Node>>, SpotError> {
        log.line(format!(
            "Launching {} for template {}",
            self.template.image_id, self.template.description
        ));

        let order = MarketRequest::for_template(&self.template, count)?;
        let mut requests = self.client.request_spot_instances(&order).await?;
        if requests.is_empty() {
            return Err(SpotError::NoRequestsReturned);
        }

        self.tag_requests(log, &mut requests).await;

        let executor = SerialExecutor::spawn();
        let created: Arc<Mutex<Vec<Arc<dyn Node>>>> = Arc::new(Mutex::new(Vec::new()));
        let name_base = self.template.name_base();
        for request in &requests {
            log.line(format!(
                "Spot request id in provision: {}",
                request.request_id()
            ));
            let name = format!("{name_base}@{}", request.request_id());
            let factory = Arc::clone(&self.factory);
            let registry = Arc::clone(&self.registry);
            let request = request.clone();
            let created = Arc::clone(&created);
            executor.submit(move || {
                let node = factory
                    .create(&request, &name)
                    .map_err(|e| CoreError::Provision(e.to_string()))?;
                registry.add_node(Arc::clone(&node))?;
                created.lock().unwrap().push(node);
                Ok(())
            });
        }
        executor
            .join()
            .await
            .map_err(|e| SpotError::NodeCreation(e.to_string()))?;

        let nodes = created.lock().unwrap().clone();
        self.fulfillment.start(requests, nodes.clone());
        Ok(nodes)
    }

    /// Apply template tags to every request, remotely (best-effort,
    /// idempotent) and to the local copies subsequent logic reads.
    async fn tag_requests(&self, log: &BuildLog, requests: &mut [SpotRequest]) {
        let tags = &self.template.tags;
        if tags.is_empty() {
            return;
        }
        for request in requests.iter_mut() {
            if let Err(e) = self
                .client
                .update_request_tags(request.request_id(), tags)
                .await
            {
                warn!(request = request.request_id(), "remote tagging failed: {e}");
                log.line(format!(
                    "Failed to tag spot request {}: {e}",
                    request.request_id()
                ));
            }
            request.set_tags(tags.clone());
        }
    }
}

#[async_trait]
impl NodeProvisioner for SpotInstanceProvider {
    async fn provision_multiple(
        &self,
        log: &BuildLog,
        count: usize,
    ) -> Result<Vec<Arc<dyn Node>>, CoreError> {
        SpotInstanceProvider::provision_multiple(self, log, count)
            .await
            .map_err(|e| CoreError::Provision(e.to_string()))
    }
}
