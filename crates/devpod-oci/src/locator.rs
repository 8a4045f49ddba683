//! Find-by-name lookups over list endpoints.
//!
//! Every lookup is one logical list call followed by an exact match. A miss is
//! `Ok(None)`, which callers use to decide whether to create.

use oci_api::{Image, Instance, InstanceLifecycleState, InternetGateway, RouteTable, Subnet, Vcn};
use tracing::debug;

use crate::backend::OciBackend;
use crate::names::{LABEL_MACHINE_ID, instance_display_name};

/// Resources that can be matched by display name.
pub trait Named {
    fn display_name(&self) -> Option<&str>;
}

macro_rules! impl_named {
    ($($ty:ty),+ $(,)?) => {
        $(impl Named for $ty {
            fn display_name(&self) -> Option<&str> {
                self.display_name.as_deref()
            }
        })+
    };
}

impl_named!(Vcn, InternetGateway, RouteTable, Subnet, Image, Instance);

/// First item whose display name is exactly `name`.
pub fn first_named<T: Named>(items: Vec<T>, name: &str) -> Option<T> {
    items.into_iter().find(|item| item.display_name() == Some(name))
}

/// The instance carrying `machine-id=<machine_id>`.
///
/// Terminated instances stay listed for a while after deletion, so a live
/// instance wins over a terminated one; a terminated match is returned only
/// when nothing else carries the tag.
pub fn first_tagged(instances: Vec<Instance>, machine_id: &str) -> Option<Instance> {
    let (terminated, live): (Vec<_>, Vec<_>) = instances
        .into_iter()
        .filter(|i| i.freeform_tag(LABEL_MACHINE_ID) == Some(machine_id))
        .partition(|i| i.lifecycle_state == InstanceLifecycleState::Terminated);

    live.into_iter().next().or_else(|| terminated.into_iter().next())
}

pub struct Locator<'a, B: ?Sized> {
    backend: &'a B,
}

impl<'a, B: OciBackend + ?Sized> Locator<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub async fn vcn(&self, compartment_id: &str, name: &str) -> oci_api::Result<Option<Vcn>> {
        let found = first_named(self.backend.list_vcns(compartment_id).await?, name);
        debug!(name, found = found.is_some(), "locate vcn");
        Ok(found)
    }

    pub async fn internet_gateway(
        &self,
        compartment_id: &str,
        vcn_id: &str,
        name: &str,
    ) -> oci_api::Result<Option<InternetGateway>> {
        let items = self
            .backend
            .list_internet_gateways(compartment_id, vcn_id)
            .await?;
        let found = first_named(items, name);
        debug!(name, vcn_id, found = found.is_some(), "locate internet gateway");
        Ok(found)
    }

    pub async fn route_table(
        &self,
        compartment_id: &str,
        vcn_id: &str,
        name: &str,
    ) -> oci_api::Result<Option<RouteTable>> {
        let items = self.backend.list_route_tables(compartment_id, vcn_id).await?;
        let found = first_named(items, name);
        debug!(name, vcn_id, found = found.is_some(), "locate route table");
        Ok(found)
    }

    pub async fn subnet(
        &self,
        compartment_id: &str,
        vcn_id: &str,
        name: &str,
    ) -> oci_api::Result<Option<Subnet>> {
        let items = self.backend.list_subnets(compartment_id, vcn_id).await?;
        let found = first_named(items, name);
        debug!(name, vcn_id, found = found.is_some(), "locate subnet");
        Ok(found)
    }

    pub async fn image(&self, compartment_id: &str, name: &str) -> oci_api::Result<Option<Image>> {
        let items = self.backend.list_images(compartment_id, name).await?;
        let found = first_named(items, name);
        debug!(name, found = found.is_some(), "locate image");
        Ok(found)
    }

    /// Instance named `devpod-<machine_id>` and tagged with the machine id.
    pub async fn instance(
        &self,
        compartment_id: &str,
        machine_id: &str,
    ) -> oci_api::Result<Option<Instance>> {
        let items = self
            .backend
            .list_instances(compartment_id, &instance_display_name(machine_id))
            .await?;
        let found = first_tagged(items, machine_id);
        debug!(machine_id, found = found.is_some(), "locate instance");
        Ok(found)
    }
}
