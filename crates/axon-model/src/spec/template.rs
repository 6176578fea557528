use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::KeyValue;
use crate::domain::Tag;
use crate::error::{ModelError, ModelResult};

/// Declarative specification of the nodes provisioned for one base tag.
///
/// `NodeTemplate` describes *what* kind of node to launch; the provisioning
/// backends decide *how*. Fields cover:
/// - identity (`tag`, `description`)
/// - machine shape (`image_id`, `instance_type`, `key_name`)
/// - network placement (`zone`, `subnet_id`, security groups)
/// - market pricing (`spot`)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTemplate {
    /// Base tag whose slot labels this template serves.
    pub tag: Tag,
    /// Human-readable template description, used in node names.
    pub description: String,
    /// Machine image to boot.
    pub image_id: String,
    /// Instance type requested from the compute provider.
    pub instance_type: String,
    /// Name of the key pair installed on launched nodes.
    pub key_name: String,
    /// Availability-zone placement. Only applied when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Subnet to launch into. Presence switches security-group handling to
    /// VPC group ids exclusively.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    /// Security groups referenced by name. Ignored when a subnet is set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<String>,
    /// Security groups referenced by VPC group id. Used only with a subnet.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vpc_security_group_ids: Vec<String>,
    /// Resource tags applied to market requests, remotely and locally.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<KeyValue>,
    /// Market-pricing configuration. `None` means on-demand only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot: Option<SpotConfig>,
}

impl NodeTemplate {
    /// Node name base: the description with spaces removed.
    pub fn name_base(&self) -> String {
        self.description.replace(' ', "")
    }
}

/// Market-pricing section of a [`NodeTemplate`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotConfig {
    /// Maximum bid price as a decimal string.
    ///
    /// Mandatory for provisioning: an unset price is a configuration error
    /// surfaced before any remote call is made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bid_price: Option<String>,
    /// Whether the bid stays open after interruption.
    #[serde(default)]
    pub bid_kind: BidKind,
}

/// How long a market bid remains open.
///
/// - `OneTime`: the request is fulfilled once and closed.
/// - `Persistent`: the request re-opens after the capacity is reclaimed.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BidKind {
    #[default]
    OneTime,
    Persistent,
}

impl BidKind {
    /// Wire value sent to the pricing market.
    pub fn as_str(&self) -> &'static str {
        match self {
            BidKind::OneTime => "one-time",
            BidKind::Persistent => "persistent",
        }
    }
}

impl FromStr for BidKind {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one-time" | "onetime" | "" => Ok(BidKind::OneTime),
            "persistent" => Ok(BidKind::Persistent),
            other => Err(ModelError::UnknownBidKind(other.to_string())),
        }
    }
}
