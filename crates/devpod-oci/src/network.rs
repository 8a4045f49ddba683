//! Find-or-create of the shared `devpod-*` network.
//!
//! Four strictly ordered steps (VCN, internet gateway, route table, subnet),
//! each independently idempotent. Found resources are reused as they are,
//! even if their properties differ from what this module would create. A
//! failure aborts the sequence without cleanup; whatever was already created
//! is picked up by the next run's lookups.

use oci_api::{
    CreateInternetGatewayDetails, CreateRouteTableDetails, CreateSubnetDetails, CreateVcnDetails,
    InternetGateway, RouteDestinationType, RouteRule, RouteTable, Subnet, Vcn,
};
use tracing::info;

use crate::backend::OciBackend;
use crate::locator::Locator;
use crate::names::{NETWORK, devpod_tags};
use crate::{Result, ResultExt};

/// The converged network an instance is placed in.
#[derive(Debug, Clone)]
pub struct Network {
    pub vcn: Vcn,
    pub internet_gateway: InternetGateway,
    pub route_table: RouteTable,
    pub subnet: Subnet,
}

/// Ensure the shared network exists in `compartment_id` and return it.
///
/// With all four resources present this costs four list calls and no
/// creates.
pub async fn ensure_network<B: OciBackend + ?Sized>(
    backend: &B,
    compartment_id: &str,
    availability_domain: &str,
    machine_id: &str,
) -> Result<Network> {
    let locator = Locator::new(backend);

    let vcn = match locator.vcn(compartment_id, NETWORK.vcn).await.op("list vcns")? {
        Some(vcn) => vcn,
        None => {
            let vcn = backend
                .create_vcn(&CreateVcnDetails {
                    compartment_id: compartment_id.to_string(),
                    display_name: NETWORK.vcn.to_string(),
                    cidr_block: NETWORK.vcn_cidr.to_string(),
                    dns_label: Some(NETWORK.vcn_dns_label.to_string()),
                    freeform_tags: devpod_tags(),
                })
                .await
                .op("create vcn")?;
            info!(vcn_id = %vcn.id, machine_id, "created vcn");
            vcn
        }
    };

    let internet_gateway = match locator
        .internet_gateway(compartment_id, &vcn.id, NETWORK.internet_gateway)
        .await
        .op("list internet gateways")?
    {
        Some(ig) => ig,
        None => {
            let ig = backend
                .create_internet_gateway(&CreateInternetGatewayDetails {
                    compartment_id: compartment_id.to_string(),
                    vcn_id: vcn.id.clone(),
                    display_name: NETWORK.internet_gateway.to_string(),
                    is_enabled: true,
                    freeform_tags: devpod_tags(),
                })
                .await
                .op("create internet gateway")?;
            info!(internet_gateway_id = %ig.id, vcn_id = %vcn.id, "created internet gateway");
            ig
        }
    };

    let route_table = match locator
        .route_table(compartment_id, &vcn.id, NETWORK.route_table)
        .await
        .op("list route tables")?
    {
        Some(rt) => rt,
        None => {
            let rt = backend
                .create_route_table(&CreateRouteTableDetails {
                    compartment_id: compartment_id.to_string(),
                    vcn_id: vcn.id.clone(),
                    display_name: NETWORK.route_table.to_string(),
                    route_rules: vec![RouteRule {
                        network_entity_id: internet_gateway.id.clone(),
                        destination: NETWORK.default_route.to_string(),
                        destination_type: RouteDestinationType::CidrBlock,
                    }],
                    freeform_tags: devpod_tags(),
                })
                .await
                .op("create route table")?;
            info!(route_table_id = %rt.id, vcn_id = %vcn.id, "created route table");
            rt
        }
    };

    let subnet = match locator
        .subnet(compartment_id, &vcn.id, NETWORK.subnet)
        .await
        .op("list subnets")?
    {
        Some(subnet) => subnet,
        None => {
            let subnet = backend
                .create_subnet(&CreateSubnetDetails {
                    compartment_id: compartment_id.to_string(),
                    vcn_id: vcn.id.clone(),
                    display_name: NETWORK.subnet.to_string(),
                    cidr_block: NETWORK.subnet_cidr.to_string(),
                    route_table_id: route_table.id.clone(),
                    dns_label: Some(NETWORK.subnet_dns_label.to_string()),
                    availability_domain: availability_domain.to_string(),
                    freeform_tags: devpod_tags(),
                })
                .await
                .op("create subnet")?;
            info!(subnet_id = %subnet.id, vcn_id = %vcn.id, availability_domain, "created subnet");
            subnet
        }
    };

    Ok(Network {
        vcn,
        internet_gateway,
        route_table,
        subnet,
    })
}
