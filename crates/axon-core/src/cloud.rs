//! Top-level orchestrator: the allocation entry point exposed to builds.
//!
//! - Owns the allocation lock and the label allocator.
//! - Wires provisioner output into the connection supervisor.
//! - Returns labels as soon as new nodes are registered; connection is
//!   supervised in the background.
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, instrument};

use axon_model::{MATRIX_ENV_VAR, NodeTemplate, RetryStrategy, SlotLabel, Tag, template_prefix};

use crate::allocator::{AllocationPlan, LabelAllocator};
use crate::connect::{ConnectFuture, ConnectSupervisor};
use crate::error::CoreError;
use crate::metrics::{
    MetricsHandle, Outcome, PROVISION_PATH_ONDEMAND, PROVISION_PATH_SPOT, noop_metrics,
};
use crate::node::{Node, NodeRegistry};
use crate::provision::NodeProvisioner;
use crate::session::BuildSession;

struct TemplateEntry {
    template: NodeTemplate,
    provisioner: Arc<dyn NodeProvisioner>,
}

/// Templates known to one cloud, keyed by base tag.
#[derive(Default)]
pub struct TemplateSet {
    entries: BTreeMap<String, TemplateEntry>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template together with its provisioning backend.
    pub fn register(&mut self, template: NodeTemplate, provisioner: Arc<dyn NodeProvisioner>) {
        self.entries.insert(
            template.tag.to_string(),
            TemplateEntry {
                template,
                provisioner,
            },
        );
    }

    /// Resolve the template serving a display name.
    ///
    /// The name's template prefix (everything before the first `__`) is
    /// tried verbatim first, then as a slot label whose base names the
    /// template — so `linux`, `linux__large` and `linux-003` all resolve
    /// to the `linux` template.
    pub fn resolve(&self, name: &str) -> Option<(&NodeTemplate, &Arc<dyn NodeProvisioner>)> {
        let prefix = template_prefix(name);
        if let Some(e) = self.entries.get(prefix) {
            return Some((&e.template, &e.provisioner));
        }
        let slot = SlotLabel::parse(prefix)?;
        self.entries
            .get(slot.base())
            .map(|e| (&e.template, &e.provisioner))
    }
}

/// One elastic tag namespace and its allocation entry point.
pub struct Cloud {
    registry: Arc<dyn NodeRegistry>,
    allocator: LabelAllocator,
    templates: TemplateSet,
    /// Guards scan + mint + launch + register. Never held across
    /// connection waiting.
    alloc_lock: Mutex<()>,
    retry: RetryStrategy,
    metrics: MetricsHandle,
}

impl Cloud {
    pub fn new(registry: Arc<dyn NodeRegistry>, templates: TemplateSet) -> Self {
        Self {
            allocator: LabelAllocator::new(Arc::clone(&registry)),
            registry,
            templates,
            alloc_lock: Mutex::new(()),
            retry: RetryStrategy::default(),
            metrics: noop_metrics(),
        }
    }

    /// Override the connection retry strategy.
    pub fn with_retry(mut self, retry: RetryStrategy) -> Self {
        self.retry = retry;
        self
    }

    /// Inject a metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Whether this cloud serves the given label or tag name.
    pub fn accepts(&self, name: &str) -> bool {
        self.templates.resolve(name).is_some()
    }

    /// Allocate `desired` slot labels under `tag` for one build.
    ///
    /// Reuses idle nodes first, then launches the shortfall through the
    /// tag's provisioner, registering each new node and stamping its matrix
    /// index before starting its connection. Returns the full ordered label
    /// list as soon as registration is done; connection supervision runs in
    /// the background and never fails this call.
    #[instrument(level = "debug", skip(self, session, boot_timeout), fields(tag = %tag, desired))]
    pub async fn allocate_slots(
        &self,
        session: &BuildSession,
        tag: &Tag,
        desired: usize,
        boot_timeout: Duration,
    ) -> Result<Vec<String>, CoreError> {
        let guard = tokio::select! {
            biased;
            _ = session.cancel_token().cancelled() => {
                return Err(CoreError::Interrupted("the label allocation lock"));
            }
            guard = self.alloc_lock.lock() => guard,
        };

        let plan = self.allocator.allocate(session.log(), tag, desired);
        let labels = plan.labels();
        if plan.minted.is_empty() {
            return Ok(labels);
        }

        let pairs = match self.launch_new_nodes(session, tag, &plan, boot_timeout).await {
            Ok(pairs) => pairs,
            Err(e) => {
                session.log().line(format!("Provisioning failed: {e}"));
                return Err(e);
            }
        };
        drop(guard);

        ConnectSupervisor::new(self.retry, Arc::clone(&self.metrics))
            .spawn(session.clone(), pairs);
        Ok(labels)
    }

    /// Launch, register and start connecting the plan's new nodes.
    /// Runs under the allocation lock.
    async fn launch_new_nodes(
        &self,
        session: &BuildSession,
        tag: &Tag,
        plan: &AllocationPlan,
        boot_timeout: Duration,
    ) -> Result<Vec<(Arc<dyn Node>, ConnectFuture)>, CoreError> {
        let (template, provisioner) = self
            .templates
            .resolve(tag.as_str())
            .ok_or_else(|| CoreError::NoTemplate(tag.to_string()))?;
        let path = if template.spot.is_some() {
            PROVISION_PATH_SPOT
        } else {
            PROVISION_PATH_ONDEMAND
        };

        self.metrics.record_provision_started(path);
        let started = Instant::now();

        let result = self
            .launch_inner(session, template, provisioner, plan, boot_timeout)
            .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let outcome = match &result {
            Ok(_) => Outcome::Success,
            Err(CoreError::Interrupted(_)) => Outcome::Canceled,
            Err(_) => Outcome::Failure,
        };
        self.metrics
            .record_provision_completed(path, outcome, elapsed_ms);
        if let Ok(pairs) = &result {
            session.log().line(format!(
                "Started {} instance(s); provisioning took {elapsed_ms}ms",
                pairs.len()
            ));
        }
        result
    }

    async fn launch_inner(
        &self,
        session: &BuildSession,
        template: &NodeTemplate,
        provisioner: &Arc<dyn NodeProvisioner>,
        plan: &AllocationPlan,
        boot_timeout: Duration,
    ) -> Result<Vec<(Arc<dyn Node>, ConnectFuture)>, CoreError> {
        let log = session.log();
        log.line(format!(
            "Will provision instances for requested labels: {}",
            plan.minted.join(",")
        ));
        log.line(format!(
            "Launching {} for template {}",
            template.image_id, template.description
        ));

        let nodes = tokio::time::timeout(
            boot_timeout,
            provisioner.provision_multiple(log, plan.minted.len()),
        )
        .await
        .map_err(|_| {
            CoreError::Provision(format!(
                "timed out after {}ms waiting for instances to launch",
                boot_timeout.as_millis()
            ))
        })??;

        if nodes.len() != plan.minted.len() {
            return Err(CoreError::Provision(format!(
                "provisioner returned {} node(s), expected {}",
                nodes.len(),
                plan.minted.len()
            )));
        }

        let mut pairs = Vec::with_capacity(nodes.len());
        for (offset, (node, label)) in nodes.into_iter().zip(plan.minted.iter()).enumerate() {
            log.line(format!(
                "Setting up label and environment variables for {}",
                node.name()
            ));
            self.registry.add_node(Arc::clone(&node))?;
            node.set_label(label);
            node.set_env(MATRIX_ENV_VAR, &(plan.reused.len() + offset + 1).to_string());
            let future = node.computer().connect(false);
            debug!(node = %node.name(), %label, "connection started");
            pairs.push((node, future));
        }
        Ok(pairs)
    }
}

/// Pick the cloud serving a label among several, preferring the last match.
pub fn cloud_for(clouds: &[Arc<Cloud>], name: &str) -> Option<Arc<Cloud>> {
    let mut selected = None;
    for cloud in clouds {
        if cloud.accepts(name) {
            selected = Some(Arc::clone(cloud));
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::BuildLog;
    use crate::testutil::{FakeConnect, FakeNode, FakeProvisioner, FakeRegistry};
    use tokio_util::sync::CancellationToken;

    fn tag(s: &str) -> Tag {
        Tag::new(s).unwrap()
    }

    fn template_for(t: &str) -> NodeTemplate {
        NodeTemplate {
            tag: tag(t),
            description: format!("{t} build node"),
            image_id: "img-0abc".to_string(),
            instance_type: "m5.large".to_string(),
            key_name: "build-key".to_string(),
            zone: None,
            subnet_id: None,
            security_groups: Vec::new(),
            vpc_security_group_ids: Vec::new(),
            tags: Vec::new(),
            spot: None,
        }
    }

    fn timeout() -> Duration {
        Duration::from_secs(5)
    }

    #[tokio::test]
    async fn reuse_only_allocation_registers_nothing() {
        let registry = FakeRegistry::empty();
        registry.seed(FakeNode::idle("node-a", "linux-000"));
        registry.seed(FakeNode::idle("node-b", "linux-001"));

        let provisioner = FakeProvisioner::ok("new", vec![FakeConnect::Ok]);
        let mut templates = TemplateSet::new();
        templates.register(template_for("linux"), provisioner.clone());
        let cloud = Cloud::new(Arc::clone(&registry) as Arc<dyn NodeRegistry>, templates);

        let session = BuildSession::new(BuildLog::sink());
        let labels = cloud
            .allocate_slots(&session, &tag("linux"), 2, timeout())
            .await
            .unwrap();

        assert_eq!(labels, vec!["linux-000", "linux-001"]);
        assert_eq!(registry.added_count(), 0);
        assert!(provisioner.created().is_empty());
    }

    #[tokio::test]
    async fn shortfall_is_provisioned_registered_and_connected() {
        let registry = FakeRegistry::empty();
        registry.seed(FakeNode::idle("node-a", "linux-004"));

        let provisioner = FakeProvisioner::ok("new", vec![FakeConnect::Ok]);
        let mut templates = TemplateSet::new();
        templates.register(template_for("linux"), provisioner.clone());
        let cloud = Cloud::new(Arc::clone(&registry) as Arc<dyn NodeRegistry>, templates);

        let session = BuildSession::new(BuildLog::sink());
        let labels = cloud
            .allocate_slots(&session, &tag("linux"), 3, timeout())
            .await
            .unwrap();

        assert_eq!(labels, vec!["linux-004", "linux-000", "linux-001"]);
        assert_eq!(registry.added_count(), 2);

        let created = provisioner.created();
        assert_eq!(created.len(), 2);
        // Labels assigned in mint order, matrix indices continue after reuse.
        assert_eq!(created[0].label(), "linux-000");
        assert_eq!(created[1].label(), "linux-001");
        assert_eq!(created[0].env_value(MATRIX_ENV_VAR).as_deref(), Some("2"));
        assert_eq!(created[1].env_value(MATRIX_ENV_VAR).as_deref(), Some("3"));
        // Initial connection is started once per node, unforced.
        assert_eq!(created[0].fake_computer().connect_calls(), 1);
        assert_eq!(created[0].fake_computer().forced_calls(), 0);
    }

    #[tokio::test]
    async fn allocation_returns_while_connections_are_still_pending() {
        let registry = FakeRegistry::empty();
        let provisioner = FakeProvisioner::ok("new", vec![FakeConnect::Hang]);
        let mut templates = TemplateSet::new();
        templates.register(template_for("linux"), provisioner.clone());
        let cloud = Cloud::new(Arc::clone(&registry) as Arc<dyn NodeRegistry>, templates);

        let session = BuildSession::new(BuildLog::sink());
        let labels = tokio::time::timeout(
            Duration::from_secs(1),
            cloud.allocate_slots(&session, &tag("linux"), 2, timeout()),
        )
        .await
        .expect("allocation must not wait for connections")
        .unwrap();

        assert_eq!(labels, vec!["linux-000", "linux-001"]);
        assert_eq!(registry.added_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_allocations_on_different_tags_do_not_block_each_other() {
        let registry = FakeRegistry::empty();
        let linux = FakeProvisioner::ok("lin", vec![FakeConnect::Hang]);
        let win = FakeProvisioner::ok("win", vec![FakeConnect::Hang]);
        let mut templates = TemplateSet::new();
        templates.register(template_for("linux"), linux);
        templates.register(template_for("win"), win);
        let cloud = Arc::new(Cloud::new(
            Arc::clone(&registry) as Arc<dyn NodeRegistry>,
            templates,
        ));

        let a = {
            let cloud = Arc::clone(&cloud);
            let session = BuildSession::new(BuildLog::sink());
            tokio::spawn(async move {
                cloud
                    .allocate_slots(&session, &tag("linux"), 1, timeout())
                    .await
            })
        };
        let b = {
            let cloud = Arc::clone(&cloud);
            let session = BuildSession::new(BuildLog::sink());
            tokio::spawn(async move {
                cloud
                    .allocate_slots(&session, &tag("win"), 1, timeout())
                    .await
            })
        };

        let (a, b) = tokio::join!(a, b);
        assert_eq!(a.unwrap().unwrap(), vec!["linux-000"]);
        assert_eq!(b.unwrap().unwrap(), vec!["win-000"]);
    }

    #[tokio::test]
    async fn cancelled_session_fails_with_interrupted() {
        let registry = FakeRegistry::empty();
        let mut templates = TemplateSet::new();
        templates.register(
            template_for("linux"),
            FakeProvisioner::ok("new", Vec::new()),
        );
        let cloud = Cloud::new(Arc::clone(&registry) as Arc<dyn NodeRegistry>, templates);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let session = BuildSession::with_cancel(BuildLog::sink(), cancel);

        let err = cloud
            .allocate_slots(&session, &tag("linux"), 1, timeout())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Interrupted(_)));
    }

    #[tokio::test]
    async fn unknown_tag_fails_and_releases_the_lock() {
        let registry = FakeRegistry::empty();
        registry.seed(FakeNode::idle("node-a", "win-000"));
        let mut templates = TemplateSet::new();
        templates.register(template_for("win"), FakeProvisioner::ok("new", Vec::new()));
        let cloud = Cloud::new(Arc::clone(&registry) as Arc<dyn NodeRegistry>, templates);

        let session = BuildSession::new(BuildLog::sink());
        let err = cloud
            .allocate_slots(&session, &tag("linux"), 1, timeout())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NoTemplate(_)));

        // The lock must have been released by the failing transaction.
        let labels = cloud
            .allocate_slots(&session, &tag("win"), 1, timeout())
            .await
            .unwrap();
        assert_eq!(labels, vec!["win-000"]);
    }

    #[tokio::test]
    async fn provisioner_failure_propagates() {
        let registry = FakeRegistry::empty();
        let mut templates = TemplateSet::new();
        templates.register(template_for("linux"), FakeProvisioner::failing("api down"));
        let cloud = Cloud::new(Arc::clone(&registry) as Arc<dyn NodeRegistry>, templates);

        let session = BuildSession::new(BuildLog::sink());
        let err = cloud
            .allocate_slots(&session, &tag("linux"), 1, timeout())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Provision(_)));
        assert_eq!(registry.added_count(), 0);
    }

    #[tokio::test]
    async fn short_provisioner_is_an_error() {
        let registry = FakeRegistry::empty();
        let mut templates = TemplateSet::new();
        templates.register(template_for("linux"), FakeProvisioner::short("new", 1));
        let cloud = Cloud::new(Arc::clone(&registry) as Arc<dyn NodeRegistry>, templates);

        let session = BuildSession::new(BuildLog::sink());
        let err = cloud
            .allocate_slots(&session, &tag("linux"), 2, timeout())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Provision(_)));
    }

    #[test]
    fn template_set_resolves_prefix_and_slot_forms() {
        let mut templates = TemplateSet::new();
        templates.register(
            template_for("linux"),
            FakeProvisioner::ok("new", Vec::new()),
        );

        assert!(templates.resolve("linux").is_some());
        assert!(templates.resolve("linux__large").is_some());
        assert!(templates.resolve("linux-003").is_some());
        assert!(templates.resolve("win-000").is_none());
        assert!(templates.resolve("linuxish").is_none());
    }

    #[tokio::test]
    async fn cloud_for_prefers_the_last_accepting_cloud() {
        let mk = |t: &str| {
            let registry = FakeRegistry::empty();
            let mut templates = TemplateSet::new();
            templates.register(template_for(t), FakeProvisioner::ok("new", Vec::new()));
            Arc::new(Cloud::new(registry as Arc<dyn NodeRegistry>, templates))
        };
        let clouds = vec![mk("linux"), mk("win"), mk("linux")];

        let picked = cloud_for(&clouds, "linux-000").expect("a cloud accepts linux");
        assert!(Arc::ptr_eq(&picked, &clouds[2]));
        assert!(cloud_for(&clouds, "mac-000").is_none());
    }
}
