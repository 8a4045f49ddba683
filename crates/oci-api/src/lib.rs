//! Typed Rust client for the OCI Core services (compute and virtual network).
//!
//! Covers the subset needed for provisioning a single development machine:
//! VCNs, internet gateways, route tables, subnets, images, instances
//! (launch, list, power actions, terminate), VNIC attachments and VNICs.

pub mod auth;
mod types;

pub use auth::{Credentials, DEFAULT_PROFILE};
pub use oci_rust_sdk::core::region::Region;
pub use types::*;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use oci_rust_sdk::core::{EmptyResponse, OciError, RetryConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;

const API_VERSION: &str = "/20160918";
const SERVICE: &str = "iaas";
const TIMEOUT: Duration = Duration::from_secs(60);

/// Message fragments of an SDK error for HTTP 404. `NotFound` also covers
/// the `NotAuthorizedOrNotFound` service code.
const NOT_FOUND_MARKERS: [&str; 4] = ["NotFound", "404 Not Found", "status 404", "(404)"];

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("oci api {endpoint} failed")]
    Api {
        endpoint: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("oci api {endpoint}: resource not found: {message}")]
    NotFound {
        endpoint: &'static str,
        message: String,
    },

    #[error("oci config error: {0}")]
    Config(String),

    #[error("oci private key error: {0}")]
    Key(String),
}

impl Error {
    /// `true` when the service reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Sort an SDK failure into not-found or a plain service error.
    ///
    /// OCI answers 404 with `NotAuthorizedOrNotFound` (or `NotFound`); the
    /// SDK keeps the status and code in its message.
    fn service(endpoint: &'static str, err: OciError) -> Self {
        let message = err.to_string();
        let not_found = NOT_FOUND_MARKERS
            .iter()
            .any(|marker| message.contains(marker));
        if not_found {
            Self::NotFound { endpoint, message }
        } else {
            Self::Api {
                endpoint,
                source: Box::new(err),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parse an OCI region identifier such as `us-ashburn-1`.
pub fn parse_region(region: &str) -> Result<Region> {
    Region::from_str(region).map_err(|_| Error::Config(format!("unknown region {region:?}")))
}

/// `?k=v&...` with both sides percent-encoded; empty for no parameters.
fn query_string(params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let pairs = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("?{pairs}")
}

/// Client for the OCI Core REST API.
///
/// Signing, transport and credentials come from the SDK's core client; this
/// type adds typed calls for the Core resources the provider touches.
#[derive(Clone)]
pub struct OciClient {
    inner: Arc<oci_rust_sdk::core::OciClient>,
}

impl OciClient {
    pub fn new(credentials: &Credentials, region: &str) -> Result<Self> {
        let region = parse_region(region)?;
        Self::with_endpoint(credentials, region, region.endpoint(SERVICE))
    }

    /// Client against an explicit endpoint, still signing for `region`.
    pub fn with_endpoint(credentials: &Credentials, region: Region, endpoint: String) -> Result<Self> {
        let inner = oci_rust_sdk::core::OciClient::new(
            Arc::new(credentials.auth_provider(region)),
            endpoint,
            TIMEOUT,
            RetryConfig::no_retry(),
        )
        .map_err(|e| Error::Config(format!("create oci client: {e}")))?;

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    async fn get<T>(&self, path: &str, endpoint: &'static str) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let path = format!("{API_VERSION}{path}");
        let resp = self
            .inner
            .get::<T>(&path)
            .await
            .map_err(|e| Error::service(endpoint, e))?;
        Ok(resp.body)
    }

    async fn post<B, T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
        endpoint: &'static str,
    ) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send + 'static,
    {
        let path = format!("{API_VERSION}{path}{}", query_string(query));
        let resp = self
            .inner
            .post::<B, T>(&path, body)
            .await
            .map_err(|e| Error::service(endpoint, e))?;
        Ok(resp.body)
    }

    /// GET a list endpoint, following `opc-next-page` until exhausted.
    async fn list<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        endpoint: &'static str,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let mut items = Vec::new();
        let mut page: Option<String> = None;

        loop {
            let mut q = query.to_vec();
            if let Some(p) = page.as_deref() {
                q.push(("page", p));
            }
            let target = format!("{API_VERSION}{path}{}", query_string(&q));

            let resp = self
                .inner
                .get::<Vec<T>>(&target)
                .await
                .map_err(|e| Error::service(endpoint, e))?;
            let next = resp.get_header("opc-next-page").filter(|p| !p.is_empty());
            items.extend(resp.body);

            match next {
                Some(p) => page = Some(p),
                None => break,
            }
        }

        Ok(items)
    }

    // ── Virtual network ──────────────────────────────────────────────

    pub async fn list_vcns(&self, compartment_id: &str) -> Result<Vec<Vcn>> {
        self.list("/vcns", &[("compartmentId", compartment_id)], "list vcns")
            .await
    }

    pub async fn create_vcn(&self, details: &CreateVcnDetails) -> Result<Vcn> {
        self.post("/vcns", &[], Some(details), "create vcn").await
    }

    pub async fn list_internet_gateways(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> Result<Vec<InternetGateway>> {
        self.list(
            "/internetGateways",
            &[("compartmentId", compartment_id), ("vcnId", vcn_id)],
            "list internet gateways",
        )
        .await
    }

    pub async fn create_internet_gateway(
        &self,
        details: &CreateInternetGatewayDetails,
    ) -> Result<InternetGateway> {
        self.post("/internetGateways", &[], Some(details), "create internet gateway")
            .await
    }

    pub async fn list_route_tables(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> Result<Vec<RouteTable>> {
        self.list(
            "/routeTables",
            &[("compartmentId", compartment_id), ("vcnId", vcn_id)],
            "list route tables",
        )
        .await
    }

    pub async fn create_route_table(&self, details: &CreateRouteTableDetails) -> Result<RouteTable> {
        self.post("/routeTables", &[], Some(details), "create route table")
            .await
    }

    pub async fn list_subnets(&self, compartment_id: &str, vcn_id: &str) -> Result<Vec<Subnet>> {
        self.list(
            "/subnets",
            &[("compartmentId", compartment_id), ("vcnId", vcn_id)],
            "list subnets",
        )
        .await
    }

    pub async fn create_subnet(&self, details: &CreateSubnetDetails) -> Result<Subnet> {
        self.post("/subnets", &[], Some(details), "create subnet").await
    }

    pub async fn list_vnic_attachments(
        &self,
        compartment_id: &str,
        instance_id: &str,
    ) -> Result<Vec<VnicAttachment>> {
        self.list(
            "/vnicAttachments",
            &[("compartmentId", compartment_id), ("instanceId", instance_id)],
            "list vnic attachments",
        )
        .await
    }

    pub async fn get_vnic(&self, vnic_id: &str) -> Result<Vnic> {
        self.get(&format!("/vnics/{vnic_id}"), "get vnic").await
    }

    // ── Compute ──────────────────────────────────────────────────────

    pub async fn list_images(&self, compartment_id: &str, display_name: &str) -> Result<Vec<Image>> {
        self.list(
            "/images",
            &[("compartmentId", compartment_id), ("displayName", display_name)],
            "list images",
        )
        .await
    }

    pub async fn list_instances(
        &self,
        compartment_id: &str,
        display_name: &str,
    ) -> Result<Vec<Instance>> {
        self.list(
            "/instances",
            &[("compartmentId", compartment_id), ("displayName", display_name)],
            "list instances",
        )
        .await
    }

    pub async fn launch_instance(&self, details: &LaunchInstanceDetails) -> Result<Instance> {
        self.post("/instances", &[], Some(details), "launch instance")
            .await
    }

    pub async fn instance_action(
        &self,
        instance_id: &str,
        action: InstanceAction,
    ) -> Result<Instance> {
        self.post::<(), _>(
            &format!("/instances/{instance_id}"),
            &[("action", action.as_str())],
            None,
            "instance action",
        )
        .await
    }

    pub async fn terminate_instance(
        &self,
        instance_id: &str,
        preserve_boot_volume: bool,
    ) -> Result<()> {
        let path = format!(
            "{API_VERSION}/instances/{instance_id}{}",
            query_string(&[("preserveBootVolume", &preserve_boot_volume.to_string())])
        );
        self.inner
            .delete::<EmptyResponse>(&path)
            .await
            .map_err(|e| Error::service("terminate instance", e))?;
        Ok(())
    }
}
