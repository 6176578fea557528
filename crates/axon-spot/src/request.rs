use axon_model::{BidKind, NodeTemplate};

use crate::error::SpotError;

/// One market request covering every instance of a provisioning call.
///
/// Built once per call — the market is asked for `instance_count` instances
/// in a single request, not one request per instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketRequest {
    pub max_bid_price: String,
    pub bid_kind: BidKind,
    pub instance_count: usize,
    pub launch: LaunchSpec,
}

/// Launch parameters shared by every instance of a [`MarketRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub image_id: String,
    pub instance_type: String,
    pub key_name: String,
    /// Availability-zone placement; set only when configured.
    pub placement_zone: Option<String>,
    /// Subnet to launch into; its presence decides security-group handling.
    pub subnet_id: Option<String>,
    /// Security groups by name. Populated only without a subnet.
    pub security_group_names: Vec<String>,
    /// Security groups by VPC group id. Populated only with a subnet.
    pub vpc_security_group_ids: Vec<String>,
}

impl MarketRequest {
    /// Build the market request for `count` instances of `template`.
    ///
    /// Fails before any remote call when the template has no spot section
    /// or no max bid price. With a subnet id, security groups go out as VPC
    /// group ids exclusively; otherwise only named groups are sent — the
    /// two forms are mutually exclusive.
    pub fn for_template(template: &NodeTemplate, count: usize) -> Result<Self, SpotError> {
        let spot = template
            .spot
            .as_ref()
            .ok_or_else(|| SpotError::MissingBidPrice(template.description.clone()))?;
        let max_bid_price = spot
            .max_bid_price
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| SpotError::MissingBidPrice(template.description.clone()))?;

        let subnet_id = non_blank(template.subnet_id.as_deref());
        let (vpc_security_group_ids, security_group_names) = if subnet_id.is_some() {
            (template.vpc_security_group_ids.clone(), Vec::new())
        } else {
            (Vec::new(), template.security_groups.clone())
        };

        Ok(Self {
            max_bid_price,
            bid_kind: spot.bid_kind,
            instance_count: count,
            launch: LaunchSpec {
                image_id: template.image_id.clone(),
                instance_type: template.instance_type.clone(),
                key_name: template.key_name.clone(),
                placement_zone: non_blank(template.zone.as_deref()),
                subnet_id,
                security_group_names,
                vpc_security_group_ids,
            },
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
