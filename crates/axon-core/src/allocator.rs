//! Label allocation: reuse idle slots first, mint the shortfall.
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use axon_model::{MATRIX_ENV_VAR, SlotLabel, Tag};

use crate::log::BuildLog;
use crate::node::{Computer, Node, NodeRegistry};

/// Result of one allocation decision: labels to reuse (in selection order)
/// and labels to create, both belonging to the same base tag.
#[derive(Debug, Clone, Default)]
pub struct AllocationPlan {
    pub reused: Vec<String>,
    pub minted: Vec<String>,
}

impl AllocationPlan {
    /// All labels of the plan, reused first, then minted.
    pub fn labels(&self) -> Vec<String> {
        let mut out = self.reused.clone();
        out.extend(self.minted.iter().cloned());
        out
    }

    /// Total number of slots covered by the plan.
    pub fn total(&self) -> usize {
        self.reused.len() + self.minted.len()
    }
}

/// Decides which existing slot labels satisfy a request and how many new
/// ones must be minted. Owned by the cloud; must only run while the cloud
/// holds the allocation lock.
pub struct LabelAllocator {
    registry: Arc<dyn NodeRegistry>,
}

impl LabelAllocator {
    pub fn new(registry: Arc<dyn NodeRegistry>) -> Self {
        Self { registry }
    }

    /// Produce the plan for `desired` slots under `tag`.
    ///
    /// Reused nodes are stamped with their 1-based matrix index as they are
    /// accepted; minting numbers new labels densely from 0, independent of
    /// any suffixes already in use by reused labels.
    #[instrument(level = "debug", skip(self, log), fields(tag = %tag, desired))]
    pub fn allocate(&self, log: &BuildLog, tag: &Tag, desired: usize) -> AllocationPlan {
        let reused = self.reuse_idle(log, tag, desired);
        let minted = mint_labels(log, tag, desired - reused.len(), &reused);
        AllocationPlan { reused, minted }
    }

    /// Scan existing labels in lexicographic order and claim up to
    /// `desired` that have an available node.
    fn reuse_idle(&self, log: &BuildLog, tag: &Tag, desired: usize) -> Vec<String> {
        log.line(format!(
            "Starting selection of labels with idle executors under '{tag}'"
        ));
        let mut names = self.registry.label_names();
        names.sort();
        log.line(format!("Will check {} label(s)", names.len()));

        let mut reused: Vec<String> = Vec::new();
        for name in names {
            if reused.len() >= desired {
                break;
            }
            log.line(format!("Checking label {name}"));
            if !name.starts_with(tag.as_str()) {
                log.line(format!(
                    "Ignoring {name} because it doesn't start with {tag}"
                ));
                continue;
            }
            if SlotLabel::parse(&name).is_none() {
                log.line(format!("Ignoring {name} because it is not a slot label"));
                continue;
            }
            match self.available_node(&name) {
                Some(node) => {
                    log.line(format!("{name} has an online node with an idle executor"));
                    node.set_env(MATRIX_ENV_VAR, &(reused.len() + 1).to_string());
                    reused.push(name);
                }
                None => log.line(format!("{name} has no available node")),
            }
        }
        log.line(format!("Reusable labels found: {}", reused.len()));
        reused
    }

    /// First node under `label` that can take work right now.
    fn available_node(&self, label: &str) -> Option<Arc<dyn Node>> {
        self.registry
            .nodes_for_label(label)
            .into_iter()
            .find(|node| {
                let computer = node.computer();
                let ok = node_available(computer.as_ref());
                if !ok {
                    debug!(node = %node.name(), label, "node not available");
                }
                ok
            })
    }
}

/// A node can take work when it is online or still connecting, accepting
/// tasks, and has at least one idle executor. Offline nodes never qualify.
fn node_available(computer: &dyn Computer) -> bool {
    if computer.is_offline() {
        return false;
    }
    (computer.is_online() || computer.is_connecting())
        && computer.is_accepting_tasks()
        && computer.executors().iter().any(|e| e.idle)
}

/// Mint `count` new labels under `tag`, numbering from 0.
///
/// Numbering is intentionally independent of the suffixes already present
/// among reused labels; a collision is reported, not renumbered, because
/// build-visible label semantics depend on the dense sequence.
fn mint_labels(log: &BuildLog, tag: &Tag, count: usize, reused: &[String]) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }
    log.line("Starting creation of new labels to assign");
    let mut minted = Vec::with_capacity(count);
    for i in 0..count {
        let label = SlotLabel::mint(tag, i as u32);
        if reused.iter().any(|r| r == &label) {
            warn!(%label, "minted label collides with a reused label");
            log.line(format!(
                "Warning: new label {label} collides with a label just reused"
            ));
        }
        log.line(format!("New label {label} will be created."));
        minted.push(label);
    }
    minted
}
