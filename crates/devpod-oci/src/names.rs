//! Reserved names and tags.
//!
//! The `devpod-*` network names below are the only thing that makes network
//! convergence idempotent: a resource is "ours" exactly when it carries one of
//! these display names in the compartment (or VCN). Instances are matched by
//! the `machine-id` freeform tag instead.

use std::collections::HashMap;

pub const LABEL_MACHINE_ID: &str = "machine-id";
pub const LABEL_TYPE: &str = "type";
pub const LABEL_TYPE_DEVPOD: &str = "devpod";

const DISPLAY_NAME_PREFIX: &str = "devpod-";
const KEY_NAME_MACHINE_CHARS: usize = 24;
const KEY_NAME_SUFFIX_CHARS: usize = 8;

/// Names and address plan of the shared per-compartment network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkLayout {
    pub vcn: &'static str,
    pub vcn_cidr: &'static str,
    pub vcn_dns_label: &'static str,
    pub internet_gateway: &'static str,
    pub route_table: &'static str,
    pub default_route: &'static str,
    pub subnet: &'static str,
    pub subnet_cidr: &'static str,
    pub subnet_dns_label: &'static str,
}

pub const NETWORK: NetworkLayout = NetworkLayout {
    vcn: "devpod-vcn",
    vcn_cidr: "10.0.0.0/16",
    vcn_dns_label: "devpodvcn",
    internet_gateway: "devpod-ig",
    route_table: "devpod-rt",
    default_route: "0.0.0.0/0",
    subnet: "devpod-subnet",
    subnet_cidr: "10.0.0.0/24",
    subnet_dns_label: "devpodsubnet",
};

/// Display name of a machine's instance: `devpod-<machine id>`.
pub fn instance_display_name(machine_id: &str) -> String {
    format!("{DISPLAY_NAME_PREFIX}{machine_id}")
}

/// Unique internal name for a machine's key: the first 24 characters of the
/// machine id followed by 8 random hex characters.
pub fn key_name(machine_id: &str) -> String {
    let prefix: String = machine_id.chars().take(KEY_NAME_MACHINE_CHARS).collect();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &suffix[..KEY_NAME_SUFFIX_CHARS])
}

/// Tags carried by every network resource this provider creates.
pub fn devpod_tags() -> HashMap<String, String> {
    HashMap::from([(LABEL_TYPE.to_string(), LABEL_TYPE_DEVPOD.to_string())])
}

/// Tags carried by a machine's instance.
pub fn machine_tags(machine_id: &str) -> HashMap<String, String> {
    let mut tags = devpod_tags();
    tags.insert(LABEL_MACHINE_ID.to_string(), machine_id.to_string());
    tags
}
