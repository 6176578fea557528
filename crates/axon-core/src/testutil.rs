//! In-memory fakes for the scheduler-side collaborators.
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::connect::{ConnectError, ConnectFuture};
use crate::error::CoreError;
use crate::log::BuildLog;
use crate::node::{Computer, ExecutorState, Node, NodeRegistry};
use crate::provision::NodeProvisioner;

/// Scripted behavior of one `connect` call.
#[derive(Debug, Clone)]
pub(crate) enum FakeConnect {
    /// Resolve immediately with success.
    Ok,
    /// Resolve with success after a delay.
    OkAfterMs(u64),
    /// Resolve immediately with the given failure reason.
    Fail(&'static str),
    /// Never resolve.
    Hang,
}

/// Static availability state of a fake computer.
#[derive(Debug, Clone)]
pub(crate) struct NodeState {
    pub online: bool,
    pub offline: bool,
    pub connecting: bool,
    pub accepting: bool,
    pub executors: Vec<bool>,
}

impl NodeState {
    pub fn idle() -> Self {
        Self {
            online: true,
            offline: false,
            connecting: false,
            accepting: true,
            executors: vec![true],
        }
    }

    pub fn offline() -> Self {
        Self {
            online: false,
            offline: true,
            connecting: false,
            accepting: false,
            executors: vec![true],
        }
    }

    pub fn online_no_idle_executor() -> Self {
        Self {
            online: true,
            offline: false,
            connecting: false,
            accepting: true,
            executors: vec![false, false],
        }
    }

    pub fn connecting_not_accepting() -> Self {
        Self {
            online: false,
            offline: false,
            connecting: true,
            accepting: false,
            executors: vec![true],
        }
    }
}

pub(crate) struct FakeComputer {
    state: NodeState,
    script: Mutex<VecDeque<FakeConnect>>,
    connect_calls: AtomicUsize,
    forced_calls: AtomicUsize,
}

impl FakeComputer {
    fn new(state: NodeState, script: Vec<FakeConnect>) -> Arc<Self> {
        Arc::new(Self {
            state,
            script: Mutex::new(script.into()),
            connect_calls: AtomicUsize::new(0),
            forced_calls: AtomicUsize::new(0),
        })
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn forced_calls(&self) -> usize {
        self.forced_calls.load(Ordering::SeqCst)
    }
}

impl Computer for FakeComputer {
    fn is_online(&self) -> bool {
        self.state.online
    }

    fn is_offline(&self) -> bool {
        self.state.offline
    }

    fn is_connecting(&self) -> bool {
        self.state.connecting
    }

    fn is_accepting_tasks(&self) -> bool {
        self.state.accepting
    }

    fn executors(&self) -> Vec<ExecutorState> {
        self.state
            .executors
            .iter()
            .map(|&idle| ExecutorState { idle })
            .collect()
    }

    fn connect(&self, force_reconnect: bool) -> ConnectFuture {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if force_reconnect {
            self.forced_calls.fetch_add(1, Ordering::SeqCst);
        }
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(FakeConnect::Ok);
        Box::pin(async move {
            match step {
                FakeConnect::Ok => Ok(()),
                FakeConnect::OkAfterMs(ms) => {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    Ok(())
                }
                FakeConnect::Fail(reason) => Err(ConnectError::new(reason)),
                FakeConnect::Hang => std::future::pending().await,
            }
        })
    }
}

pub(crate) struct FakeNode {
    name: String,
    label: Mutex<String>,
    env: Mutex<Vec<(String, String)>>,
    computer: Arc<FakeComputer>,
}

impl FakeNode {
    pub fn idle(name: &str, label: &str) -> Arc<Self> {
        Self::build(name, label, NodeState::idle(), Vec::new())
    }

    pub fn with_state(name: &str, label: &str, state: NodeState) -> Arc<Self> {
        Self::build(name, label, state, Vec::new())
    }

    pub fn with_script(name: &str, label: &str, script: Vec<FakeConnect>) -> Arc<Self> {
        Self::build(name, label, NodeState::idle(), script)
    }

    fn build(name: &str, label: &str, state: NodeState, script: Vec<FakeConnect>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            label: Mutex::new(label.to_string()),
            env: Mutex::new(Vec::new()),
            computer: FakeComputer::new(state, script),
        })
    }

    pub fn env_value(&self, key: &str) -> Option<String> {
        self.env
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn fake_computer(&self) -> Arc<FakeComputer> {
        Arc::clone(&self.computer)
    }
}

impl Node for FakeNode {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn label(&self) -> String {
        self.label.lock().unwrap().clone()
    }

    fn set_label(&self, label: &str) {
        *self.label.lock().unwrap() = label.to_string();
    }

    fn set_env(&self, key: &str, value: &str) {
        self.env
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
    }

    fn computer(&self) -> Arc<dyn Computer> {
        Arc::clone(&self.computer) as Arc<dyn Computer>
    }
}

#[derive(Default)]
pub(crate) struct FakeRegistry {
    nodes: Mutex<Vec<Arc<dyn Node>>>,
    added: AtomicUsize,
}

impl FakeRegistry {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a pre-existing node without counting it as an addition.
    pub fn seed(&self, node: Arc<FakeNode>) {
        self.nodes.lock().unwrap().push(node);
    }

    pub fn added_count(&self) -> usize {
        self.added.load(Ordering::SeqCst)
    }

    pub fn node_named(&self, name: &str) -> Option<Arc<dyn Node>> {
        self.nodes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.name() == name)
            .map(Arc::clone)
    }
}

impl NodeRegistry for FakeRegistry {
    fn add_node(&self, node: Arc<dyn Node>) -> Result<(), CoreError> {
        self.added.fetch_add(1, Ordering::SeqCst);
        self.nodes.lock().unwrap().push(node);
        Ok(())
    }

    fn label_names(&self) -> Vec<String> {
        let labels: BTreeSet<String> = self
            .nodes
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.label())
            .filter(|l| !l.is_empty())
            .collect();
        labels.into_iter().collect()
    }

    fn nodes_for_label(&self, label: &str) -> Vec<Arc<dyn Node>> {
        self.nodes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.label() == label)
            .map(Arc::clone)
            .collect()
    }
}

/// Provisioner double producing fake nodes with a shared connect script.
pub(crate) struct FakeProvisioner {
    name_prefix: &'static str,
    script: Vec<FakeConnect>,
    fail_with: Option<&'static str>,
    short_by: usize,
    created: Mutex<Vec<Arc<FakeNode>>>,
}

impl FakeProvisioner {
    pub fn ok(name_prefix: &'static str, script: Vec<FakeConnect>) -> Arc<Self> {
        Arc::new(Self {
            name_prefix,
            script,
            fail_with: None,
            short_by: 0,
            created: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(reason: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name_prefix: "unused",
            script: Vec::new(),
            fail_with: Some(reason),
            short_by: 0,
            created: Mutex::new(Vec::new()),
        })
    }

    /// Provisioner that returns fewer nodes than asked for.
    pub fn short(name_prefix: &'static str, short_by: usize) -> Arc<Self> {
        Arc::new(Self {
            name_prefix,
            script: Vec::new(),
            fail_with: None,
            short_by,
            created: Mutex::new(Vec::new()),
        })
    }

    pub fn created(&self) -> Vec<Arc<FakeNode>> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeProvisioner for FakeProvisioner {
    async fn provision_multiple(
        &self,
        log: &BuildLog,
        count: usize,
    ) -> Result<Vec<Arc<dyn Node>>, CoreError> {
        if let Some(reason) = self.fail_with {
            return Err(CoreError::Provision(reason.to_string()));
        }
        let effective = count.saturating_sub(self.short_by);
        let mut out: Vec<Arc<dyn Node>> = Vec::with_capacity(effective);
        for i in 0..effective {
            let name = format!("{}-{i}", self.name_prefix);
            log.line(format!("Launching instance {name}"));
            let node = FakeNode::with_script(&name, "", self.script.clone());
            self.created.lock().unwrap().push(Arc::clone(&node));
            out.push(node);
        }
        Ok(out)
    }
}
