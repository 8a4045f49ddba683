use std::collections::HashMap;

use oci_api::{CreateVnicDetails, Image, InstanceSourceDetails, LaunchInstanceDetails};
use tracing::info;

use crate::backend::OciBackend;
use crate::locator::Locator;
use crate::names::{instance_display_name, key_name, machine_tags};
use crate::network::{Network, ensure_network};
use crate::options::Options;
use crate::{Error, Result, ResultExt, cloud_init, fingerprint};

const USER_DATA_KEY: &str = "user_data";

/// Desired machine, as handed over by the orchestrator.
#[derive(Debug, Clone)]
pub struct MachineSpec {
    pub machine_id: String,
    pub disk_image: String,
    /// Boot volume size in GB, unparsed.
    pub disk_size_gb: String,
    pub shape: String,
    pub region: String,
    pub availability_domain: String,
    pub compartment_id: String,
    pub public_key: String,
}

impl MachineSpec {
    pub fn from_options(options: &Options, public_key: impl Into<String>) -> Self {
        Self {
            machine_id: options.machine_id.clone(),
            disk_image: options.disk_image.clone(),
            disk_size_gb: options.disk_size.clone(),
            shape: options.machine_type.clone(),
            region: options.region.clone(),
            availability_domain: options.availability_domain.clone(),
            compartment_id: options.compartment_id.clone(),
            public_key: public_key.into(),
        }
    }
}

/// A ready-to-submit launch request plus what was resolved to build it.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Unique internal name of the machine's key, not used for matching.
    pub key_name: String,
    pub fingerprint: String,
    pub region: String,
    pub network: Network,
    pub details: LaunchInstanceDetails,
}

/// Assemble the launch request for `spec`.
///
/// Resolves the image and converges the shared network on the way, but
/// launches nothing itself.
pub async fn build<B: OciBackend + ?Sized>(backend: &B, spec: &MachineSpec) -> Result<LaunchSpec> {
    if spec.machine_id.is_empty() {
        return Err(Error::MissingMachineId);
    }

    let fingerprint =
        fingerprint(&spec.public_key).op("generate fingerprint for public ssh key")?;
    let key_name = key_name(&spec.machine_id);
    info!(
        machine_id = %spec.machine_id,
        key_name = %key_name,
        fingerprint = %fingerprint,
        "building instance with SSH key"
    );

    let user_data = cloud_init::user_data(&spec.public_key);

    let image = find_image(backend, &spec.compartment_id, &spec.disk_image)
        .await
        .op("find image")?;

    let network = ensure_network(
        backend,
        &spec.compartment_id,
        &spec.availability_domain,
        &spec.machine_id,
    )
    .await
    .op("create or get network")?;

    let disk_size = parse_disk_size(&spec.disk_size_gb).op("parse disk size")?;

    let details = LaunchInstanceDetails {
        availability_domain: spec.availability_domain.clone(),
        compartment_id: spec.compartment_id.clone(),
        shape: spec.shape.clone(),
        display_name: instance_display_name(&spec.machine_id),
        source_details: InstanceSourceDetails::Image {
            image_id: image.id,
            boot_volume_size_in_gbs: Some(disk_size.into()),
        },
        create_vnic_details: CreateVnicDetails {
            subnet_id: network.subnet.id.clone(),
            assign_public_ip: true,
        },
        metadata: HashMap::from([(USER_DATA_KEY.to_string(), user_data)]),
        freeform_tags: machine_tags(&spec.machine_id),
    };

    Ok(LaunchSpec {
        key_name,
        fingerprint,
        region: spec.region.clone(),
        network,
        details,
    })
}

async fn find_image<B: OciBackend + ?Sized>(
    backend: &B,
    compartment_id: &str,
    name: &str,
) -> Result<Image> {
    Locator::new(backend)
        .image(compartment_id, name)
        .await?
        .ok_or_else(|| Error::ImageNotFound(name.to_string()))
}

fn parse_disk_size(raw: &str) -> Result<u32> {
    match raw.parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(Error::InvalidDiskSize(raw.to_string())),
    }
}
