use oci_api::{Credentials, Instance, InstanceLifecycleState, OciClient};
use tracing::info;

use crate::backend::OciBackend;
use crate::launch::{self, LaunchSpec, MachineSpec};
use crate::lifecycle::{InstanceManager, InstanceStatus};
use crate::options::Options;
use crate::{Result, ResultExt};

/// OCI machine provider.
///
/// Owns the backend and the compartment every lookup is scoped to. Each
/// operation is a self-contained, re-runnable sequence of API calls.
pub struct OciProvider<B = OciClient> {
    backend: B,
    compartment_id: String,
}

impl OciProvider<OciClient> {
    /// Connect using the options' OCI config file and profile, against the
    /// `REGION` endpoint.
    pub fn from_options(options: &Options) -> Result<Self> {
        let credentials =
            Credentials::from_config_file(&options.oci_config_file, &options.oci_profile)
                .op("load oci configuration")?;
        let client = OciClient::new(&credentials, &options.region).op("create oci client")?;

        info!(region = %options.region, profile = %options.oci_profile, "oci client ready");
        Ok(Self::new(client, options.compartment_id.clone()))
    }
}

impl<B: OciBackend> OciProvider<B> {
    pub fn new(backend: B, compartment_id: impl Into<String>) -> Self {
        Self {
            backend,
            compartment_id: compartment_id.into(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn compartment_id(&self) -> &str {
        &self.compartment_id
    }

    pub fn instances(&self) -> InstanceManager<'_, B> {
        InstanceManager::new(&self.backend, &self.compartment_id)
    }

    /// Resolve image and network for `spec` and assemble the launch request.
    pub async fn build_launch_spec(&self, spec: &MachineSpec) -> Result<LaunchSpec> {
        launch::build(&self.backend, spec)
            .await
            .op("build instance options")
    }

    /// Launch the machine unless an instance with its tag is already alive.
    ///
    /// A stopped instance is started instead of duplicated.
    pub async fn create(&self, spec: &MachineSpec) -> Result<Instance> {
        match self.instances().get(&spec.machine_id).await {
            Ok(existing) if !is_gone(&existing.lifecycle_state) => {
                info!(
                    machine_id = %spec.machine_id,
                    instance_id = %existing.id,
                    state = %existing.lifecycle_state,
                    "instance already exists"
                );
                if existing.lifecycle_state == InstanceLifecycleState::Stopped {
                    self.start(&spec.machine_id).await?;
                }
                return Ok(existing);
            }
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e).op("get instance"),
        }

        let launch = self.build_launch_spec(spec).await?;
        let instance = self
            .backend
            .launch_instance(&launch.details)
            .await
            .op("launch instance")?;

        info!(
            machine_id = %spec.machine_id,
            instance_id = %instance.id,
            subnet_id = %launch.network.subnet.id,
            "instance launched"
        );
        Ok(instance)
    }

    pub async fn delete(&self, machine_id: &str) -> Result<()> {
        self.instances()
            .delete(machine_id)
            .await
            .op("delete instance")
    }

    pub async fn start(&self, machine_id: &str) -> Result<()> {
        self.instances().start(machine_id).await.op("start instance")
    }

    pub async fn stop(&self, machine_id: &str) -> Result<()> {
        self.instances().stop(machine_id).await.op("stop instance")
    }

    pub async fn status(&self, machine_id: &str) -> Result<InstanceStatus> {
        self.instances()
            .status(machine_id)
            .await
            .op("get instance status")
    }

    pub async fn ip(&self, machine_id: &str) -> Result<String> {
        self.instances().ip(machine_id).await.op("get instance IP")
    }
}

fn is_gone(state: &InstanceLifecycleState) -> bool {
    matches!(
        state,
        InstanceLifecycleState::Terminating | InstanceLifecycleState::Terminated
    )
}
