//! In-memory compartment implementing `OciBackend`, with call counting.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use devpod_oci::OciBackend;
use oci_api::{
    CreateInternetGatewayDetails, CreateRouteTableDetails, CreateSubnetDetails, CreateVcnDetails,
    Image, Instance, InstanceAction, InstanceLifecycleState, InternetGateway,
    LaunchInstanceDetails, RouteTable, Subnet, Vcn, Vnic, VnicAttachment,
};

pub const COMPARTMENT: &str = "ocid1.compartment.oc1..devpod";
pub const AD: &str = "AD-1";
pub const IMAGE: &str = "Ubuntu-22.04";
pub const PUBLIC_IP: &str = "203.0.113.10";
pub const PRIVATE_IP: &str = "10.0.0.2";

pub const RSA_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQDVEnA5bsxU1ltrt9mPho/JrVeMS17sI9GjIeNCLcb2bIFTzZ6I8d+hFddgmHFItgLJLJWUYDIHjhE0yB6zLKVkDmeQ/T4Qy2UaV2x8O+KQa+7Chl8DaTfnr/0b8flaFG9VSLJKA/QJ/Sl07oCbRQt3l9bHXvVMux0VTGavEjpKwtFFtWkDx/vDxJoFsA+oMkGaF2AP2+jIc3WCATaprllUxI42pav52m065fpPEvMfK8LJ3L6t5IOa49LieoNPz23s5GOsN66E6kmNuuWQ/HH7I0vPovoeHqizX9CkHTdTYuI87Je39yEjVliMQurEUouHlZU075P06SBYGnObp9yp devpod";

#[derive(Default)]
struct State {
    next_id: usize,
    calls: HashMap<&'static str, usize>,
    fail: Option<(&'static str, Fault)>,
    assign_public_ip: bool,

    vcns: Vec<Vcn>,
    internet_gateways: Vec<InternetGateway>,
    route_tables: Vec<RouteTable>,
    subnets: Vec<Subnet>,
    images: Vec<Image>,
    instances: Vec<Instance>,
    attachments: Vec<VnicAttachment>,
    vnics: Vec<Vnic>,
    launched: Vec<LaunchInstanceDetails>,
}

impl State {
    fn id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("ocid1.{kind}.oc1..{}", self.next_id)
    }
}

pub struct FakeCompartment {
    state: Mutex<State>,
}

impl Default for FakeCompartment {
    fn default() -> Self {
        Self::new()
    }
}

/// Service failures the fake can inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    NotFound,
    Unauthorized,
    Internal,
}

fn api_error(endpoint: &'static str, fault: Fault) -> oci_api::Error {
    match fault {
        Fault::NotFound => oci_api::Error::NotFound {
            endpoint,
            message: "NotAuthorizedOrNotFound".into(),
        },
        Fault::Unauthorized => oci_api::Error::Api {
            endpoint,
            source: "NotAuthenticated: injected".into(),
        },
        Fault::Internal => oci_api::Error::Api {
            endpoint,
            source: "InternalError: injected".into(),
        },
    }
}

impl FakeCompartment {
    /// Empty compartment containing only the `Ubuntu-22.04` image.
    pub fn new() -> Self {
        let fake = Self {
            state: Mutex::new(State {
                assign_public_ip: true,
                ..Default::default()
            }),
        };
        fake.add_image(IMAGE);
        fake
    }

    pub fn add_image(&self, name: &str) {
        let mut s = self.state.lock().unwrap();
        let id = s.id("image");
        s.images.push(Image {
            id,
            compartment_id: Some(COMPARTMENT.into()),
            display_name: Some(name.into()),
            operating_system: Some("Canonical Ubuntu".into()),
            lifecycle_state: "AVAILABLE".into(),
        });
    }

    pub fn add_vcn(&self, name: &str, cidr: &str) -> Vcn {
        let mut s = self.state.lock().unwrap();
        let vcn = Vcn {
            id: s.id("vcn"),
            compartment_id: COMPARTMENT.into(),
            display_name: Some(name.into()),
            cidr_block: Some(cidr.into()),
            lifecycle_state: "AVAILABLE".into(),
            ..Default::default()
        };
        s.vcns.push(vcn.clone());
        vcn
    }

    /// Add an instance directly, as if launched by an earlier process.
    pub fn add_instance(&self, machine_id: &str, state: InstanceLifecycleState) -> Instance {
        let mut s = self.state.lock().unwrap();
        let instance = Instance {
            id: s.id("instance"),
            compartment_id: COMPARTMENT.into(),
            availability_domain: AD.into(),
            display_name: Some(format!("devpod-{machine_id}")),
            shape: "VM.Standard.E4.Flex".into(),
            region: Some("us-ashburn-1".into()),
            lifecycle_state: state,
            freeform_tags: Some(HashMap::from([
                ("machine-id".to_string(), machine_id.to_string()),
                ("type".to_string(), "devpod".to_string()),
            ])),
            time_created: None,
        };
        s.instances.push(instance.clone());
        instance
    }

    /// Make the next call of `endpoint` fail with `fault`.
    pub fn fail_next(&self, endpoint: &'static str, fault: Fault) {
        self.state.lock().unwrap().fail = Some((endpoint, fault));
    }

    /// Whether launched instances get a public address.
    pub fn assign_public_ip(&self, assign: bool) {
        self.state.lock().unwrap().assign_public_ip = assign;
    }

    /// Let the backend settle an instance into `state`.
    pub fn settle(&self, instance_id: &str, state: InstanceLifecycleState) {
        let mut s = self.state.lock().unwrap();
        let instance = s
            .instances
            .iter_mut()
            .find(|i| i.id == instance_id)
            .expect("unknown instance");
        instance.lifecycle_state = state;
    }

    pub fn detach_vnics(&self, instance_id: &str) {
        self.state
            .lock()
            .unwrap()
            .attachments
            .retain(|a| a.instance_id != instance_id);
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    /// Total number of create/launch/action/terminate calls.
    pub fn mutations(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(name, _)| !name.starts_with("list") && !name.starts_with("get"))
            .map(|(_, count)| count)
            .sum()
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().sum()
    }

    pub fn vcns(&self) -> Vec<Vcn> {
        self.state.lock().unwrap().vcns.clone()
    }

    pub fn internet_gateways(&self) -> Vec<InternetGateway> {
        self.state.lock().unwrap().internet_gateways.clone()
    }

    pub fn route_tables(&self) -> Vec<RouteTable> {
        self.state.lock().unwrap().route_tables.clone()
    }

    pub fn subnets(&self) -> Vec<Subnet> {
        self.state.lock().unwrap().subnets.clone()
    }

    pub fn instances(&self) -> Vec<Instance> {
        self.state.lock().unwrap().instances.clone()
    }

    pub fn launched(&self) -> Vec<LaunchInstanceDetails> {
        self.state.lock().unwrap().launched.clone()
    }

    /// Count the call and return the injected failure, if it targets it.
    fn enter(&self, endpoint: &'static str) -> oci_api::Result<std::sync::MutexGuard<'_, State>> {
        let mut s = self.state.lock().unwrap();
        *s.calls.entry(endpoint).or_default() += 1;
        if let Some((_, fault)) = s.fail.filter(|(target, _)| *target == endpoint) {
            s.fail = None;
            return Err(api_error(endpoint, fault));
        }
        Ok(s)
    }
}

#[async_trait]
impl OciBackend for FakeCompartment {
    async fn list_vcns(&self, compartment_id: &str) -> oci_api::Result<Vec<Vcn>> {
        let s = self.enter("list vcns")?;
        Ok(s.vcns
            .iter()
            .filter(|v| v.compartment_id == compartment_id)
            .cloned()
            .collect())
    }

    async fn create_vcn(&self, details: &CreateVcnDetails) -> oci_api::Result<Vcn> {
        let mut s = self.enter("create vcn")?;
        let vcn = Vcn {
            id: s.id("vcn"),
            compartment_id: details.compartment_id.clone(),
            display_name: Some(details.display_name.clone()),
            cidr_block: Some(details.cidr_block.clone()),
            dns_label: details.dns_label.clone(),
            lifecycle_state: "AVAILABLE".into(),
            freeform_tags: Some(details.freeform_tags.clone()),
        };
        s.vcns.push(vcn.clone());
        Ok(vcn)
    }

    async fn list_internet_gateways(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> oci_api::Result<Vec<InternetGateway>> {
        let s = self.enter("list internet gateways")?;
        Ok(s.internet_gateways
            .iter()
            .filter(|ig| ig.compartment_id == compartment_id && ig.vcn_id == vcn_id)
            .cloned()
            .collect())
    }

    async fn create_internet_gateway(
        &self,
        details: &CreateInternetGatewayDetails,
    ) -> oci_api::Result<InternetGateway> {
        let mut s = self.enter("create internet gateway")?;
        let ig = InternetGateway {
            id: s.id("internetgateway"),
            compartment_id: details.compartment_id.clone(),
            vcn_id: details.vcn_id.clone(),
            display_name: Some(details.display_name.clone()),
            is_enabled: Some(details.is_enabled),
            lifecycle_state: "AVAILABLE".into(),
            freeform_tags: Some(details.freeform_tags.clone()),
        };
        s.internet_gateways.push(ig.clone());
        Ok(ig)
    }

    async fn list_route_tables(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> oci_api::Result<Vec<RouteTable>> {
        let s = self.enter("list route tables")?;
        Ok(s.route_tables
            .iter()
            .filter(|rt| rt.compartment_id == compartment_id && rt.vcn_id == vcn_id)
            .cloned()
            .collect())
    }

    async fn create_route_table(
        &self,
        details: &CreateRouteTableDetails,
    ) -> oci_api::Result<RouteTable> {
        let mut s = self.enter("create route table")?;
        let rt = RouteTable {
            id: s.id("routetable"),
            compartment_id: details.compartment_id.clone(),
            vcn_id: details.vcn_id.clone(),
            display_name: Some(details.display_name.clone()),
            route_rules: details.route_rules.clone(),
            lifecycle_state: "AVAILABLE".into(),
            freeform_tags: Some(details.freeform_tags.clone()),
        };
        s.route_tables.push(rt.clone());
        Ok(rt)
    }

    async fn list_subnets(
        &self,
        compartment_id: &str,
        vcn_id: &str,
    ) -> oci_api::Result<Vec<Subnet>> {
        let s = self.enter("list subnets")?;
        Ok(s.subnets
            .iter()
            .filter(|sn| sn.compartment_id == compartment_id && sn.vcn_id == vcn_id)
            .cloned()
            .collect())
    }

    async fn create_subnet(&self, details: &CreateSubnetDetails) -> oci_api::Result<Subnet> {
        let mut s = self.enter("create subnet")?;
        let subnet = Subnet {
            id: s.id("subnet"),
            compartment_id: details.compartment_id.clone(),
            vcn_id: details.vcn_id.clone(),
            display_name: Some(details.display_name.clone()),
            cidr_block: Some(details.cidr_block.clone()),
            availability_domain: Some(details.availability_domain.clone()),
            route_table_id: Some(details.route_table_id.clone()),
            lifecycle_state: "AVAILABLE".into(),
            freeform_tags: Some(details.freeform_tags.clone()),
        };
        s.subnets.push(subnet.clone());
        Ok(subnet)
    }

    async fn list_images(
        &self,
        _compartment_id: &str,
        display_name: &str,
    ) -> oci_api::Result<Vec<Image>> {
        let s = self.enter("list images")?;
        Ok(s.images
            .iter()
            .filter(|i| i.display_name.as_deref() == Some(display_name))
            .cloned()
            .collect())
    }

    async fn list_instances(
        &self,
        compartment_id: &str,
        display_name: &str,
    ) -> oci_api::Result<Vec<Instance>> {
        let s = self.enter("list instances")?;
        Ok(s.instances
            .iter()
            .filter(|i| {
                i.compartment_id == compartment_id
                    && i.display_name.as_deref() == Some(display_name)
            })
            .cloned()
            .collect())
    }

    async fn launch_instance(&self, details: &LaunchInstanceDetails) -> oci_api::Result<Instance> {
        let mut s = self.enter("launch instance")?;
        let instance = Instance {
            id: s.id("instance"),
            compartment_id: details.compartment_id.clone(),
            availability_domain: details.availability_domain.clone(),
            display_name: Some(details.display_name.clone()),
            shape: details.shape.clone(),
            region: Some("us-ashburn-1".into()),
            lifecycle_state: InstanceLifecycleState::Provisioning,
            freeform_tags: Some(details.freeform_tags.clone()),
            time_created: None,
        };

        let vnic = Vnic {
            id: s.id("vnic"),
            public_ip: s.assign_public_ip.then(|| PUBLIC_IP.to_string()),
            private_ip: Some(PRIVATE_IP.into()),
            lifecycle_state: "AVAILABLE".into(),
        };
        let attachment = VnicAttachment {
            id: s.id("vnicattachment"),
            instance_id: instance.id.clone(),
            vnic_id: Some(vnic.id.clone()),
            lifecycle_state: "ATTACHED".into(),
        };

        s.vnics.push(vnic);
        s.attachments.push(attachment);
        s.instances.push(instance.clone());
        s.launched.push(details.clone());
        Ok(instance)
    }

    async fn instance_action(
        &self,
        instance_id: &str,
        action: InstanceAction,
    ) -> oci_api::Result<Instance> {
        let mut s = self.enter("instance action")?;
        let instance = s
            .instances
            .iter_mut()
            .find(|i| i.id == instance_id)
            .ok_or_else(|| api_error("instance action", Fault::NotFound))?;
        instance.lifecycle_state = match action {
            InstanceAction::Start => InstanceLifecycleState::Starting,
            InstanceAction::Stop => InstanceLifecycleState::Stopping,
        };
        Ok(instance.clone())
    }

    async fn terminate_instance(
        &self,
        instance_id: &str,
        _preserve_boot_volume: bool,
    ) -> oci_api::Result<()> {
        let mut s = self.enter("terminate instance")?;
        let before = s.instances.len();
        s.instances.retain(|i| i.id != instance_id);
        if s.instances.len() == before {
            return Err(api_error("terminate instance", Fault::NotFound));
        }
        s.attachments.retain(|a| a.instance_id != instance_id);
        Ok(())
    }

    async fn list_vnic_attachments(
        &self,
        _compartment_id: &str,
        instance_id: &str,
    ) -> oci_api::Result<Vec<VnicAttachment>> {
        let s = self.enter("list vnic attachments")?;
        Ok(s.attachments
            .iter()
            .filter(|a| a.instance_id == instance_id)
            .cloned()
            .collect())
    }

    async fn get_vnic(&self, vnic_id: &str) -> oci_api::Result<Vnic> {
        let s = self.enter("get vnic")?;
        s.vnics
            .iter()
            .find(|v| v.id == vnic_id)
            .cloned()
            .ok_or_else(|| api_error("get vnic", Fault::NotFound))
    }
}
