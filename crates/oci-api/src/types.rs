use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type FreeformTags = HashMap<String, String>;

// ── Virtual network ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vcn {
    pub id: String,
    pub compartment_id: String,
    pub display_name: Option<String>,
    pub cidr_block: Option<String>,
    pub dns_label: Option<String>,
    pub lifecycle_state: String,
    pub freeform_tags: Option<FreeformTags>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVcnDetails {
    pub compartment_id: String,
    pub display_name: String,
    pub cidr_block: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_label: Option<String>,
    pub freeform_tags: FreeformTags,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternetGateway {
    pub id: String,
    pub compartment_id: String,
    pub vcn_id: String,
    pub display_name: Option<String>,
    pub is_enabled: Option<bool>,
    pub lifecycle_state: String,
    pub freeform_tags: Option<FreeformTags>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInternetGatewayDetails {
    pub compartment_id: String,
    pub vcn_id: String,
    pub display_name: String,
    pub is_enabled: bool,
    pub freeform_tags: FreeformTags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteDestinationType {
    CidrBlock,
    ServiceCidrBlock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    pub network_entity_id: String,
    pub destination: String,
    pub destination_type: RouteDestinationType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTable {
    pub id: String,
    pub compartment_id: String,
    pub vcn_id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub route_rules: Vec<RouteRule>,
    pub lifecycle_state: String,
    pub freeform_tags: Option<FreeformTags>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteTableDetails {
    pub compartment_id: String,
    pub vcn_id: String,
    pub display_name: String,
    pub route_rules: Vec<RouteRule>,
    pub freeform_tags: FreeformTags,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub id: String,
    pub compartment_id: String,
    pub vcn_id: String,
    pub display_name: Option<String>,
    pub cidr_block: Option<String>,
    pub availability_domain: Option<String>,
    pub route_table_id: Option<String>,
    pub lifecycle_state: String,
    pub freeform_tags: Option<FreeformTags>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubnetDetails {
    pub compartment_id: String,
    pub vcn_id: String,
    pub display_name: String,
    pub cidr_block: String,
    pub route_table_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_label: Option<String>,
    pub availability_domain: String,
    pub freeform_tags: FreeformTags,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VnicAttachment {
    pub id: String,
    pub instance_id: String,
    /// Unset while the attachment is still `ATTACHING`.
    pub vnic_id: Option<String>,
    pub lifecycle_state: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vnic {
    pub id: String,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
    pub lifecycle_state: String,
}

// ── Compute ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub compartment_id: Option<String>,
    pub display_name: Option<String>,
    pub operating_system: Option<String>,
    pub lifecycle_state: String,
}

/// Instance lifecycle state as reported by the compute service.
///
/// States this client does not know about are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstanceLifecycleState {
    Moving,
    Provisioning,
    Running,
    Starting,
    Stopping,
    Stopped,
    CreatingImage,
    Terminating,
    Terminated,
    Other(String),
}

impl InstanceLifecycleState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Moving => "MOVING",
            Self::Provisioning => "PROVISIONING",
            Self::Running => "RUNNING",
            Self::Starting => "STARTING",
            Self::Stopping => "STOPPING",
            Self::Stopped => "STOPPED",
            Self::CreatingImage => "CREATING_IMAGE",
            Self::Terminating => "TERMINATING",
            Self::Terminated => "TERMINATED",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for InstanceLifecycleState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "MOVING" => Self::Moving,
            "PROVISIONING" => Self::Provisioning,
            "RUNNING" => Self::Running,
            "STARTING" => Self::Starting,
            "STOPPING" => Self::Stopping,
            "STOPPED" => Self::Stopped,
            "CREATING_IMAGE" => Self::CreatingImage,
            "TERMINATING" => Self::Terminating,
            "TERMINATED" => Self::Terminated,
            _ => Self::Other(raw),
        }
    }
}

impl From<InstanceLifecycleState> for String {
    fn from(state: InstanceLifecycleState) -> Self {
        match state {
            InstanceLifecycleState::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InstanceLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub compartment_id: String,
    pub availability_domain: String,
    pub display_name: Option<String>,
    pub shape: String,
    pub region: Option<String>,
    pub lifecycle_state: InstanceLifecycleState,
    pub freeform_tags: Option<FreeformTags>,
    pub time_created: Option<DateTime<Utc>>,
}

impl Instance {
    /// Value of a freeform tag, if the instance carries it.
    pub fn freeform_tag(&self, key: &str) -> Option<&str> {
        self.freeform_tags
            .as_ref()
            .and_then(|tags| tags.get(key))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "sourceType")]
pub enum InstanceSourceDetails {
    #[serde(rename = "image")]
    Image {
        #[serde(rename = "imageId")]
        image_id: String,
        #[serde(
            rename = "bootVolumeSizeInGBs",
            skip_serializing_if = "Option::is_none"
        )]
        boot_volume_size_in_gbs: Option<i64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVnicDetails {
    pub subnet_id: String,
    pub assign_public_ip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchInstanceDetails {
    pub availability_domain: String,
    pub compartment_id: String,
    pub shape: String,
    pub display_name: String,
    pub source_details: InstanceSourceDetails,
    pub create_vnic_details: CreateVnicDetails,
    pub metadata: HashMap<String, String>,
    pub freeform_tags: FreeformTags,
}

/// Power actions accepted by `POST /instances/{id}?action=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceAction {
    Start,
    Stop,
}

impl InstanceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Stop => "STOP",
        }
    }
}

impl fmt::Display for InstanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
