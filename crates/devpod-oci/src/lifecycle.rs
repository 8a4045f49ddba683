//! Lifecycle of a machine's instance, addressed by machine id only.
//!
//! Start and stop return as soon as the action is accepted; callers that need
//! a settled state poll [`InstanceManager::status`].

use std::fmt;

use oci_api::{Instance, InstanceAction, InstanceLifecycleState};
use tracing::{debug, info, warn};

use crate::backend::OciBackend;
use crate::locator::Locator;
use crate::{Error, Result, ResultExt};

/// Status tokens reported to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Running,
    Stopped,
    Terminated,
    Starting,
    Stopping,
    NotFound,
    /// Any other backend state, verbatim.
    Other(String),
}

impl InstanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Terminated => "terminated",
            Self::Starting => "starting",
            Self::Stopping => "stopping",
            Self::NotFound => "not_found",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&InstanceLifecycleState> for InstanceStatus {
    fn from(state: &InstanceLifecycleState) -> Self {
        match state {
            InstanceLifecycleState::Running => Self::Running,
            InstanceLifecycleState::Stopped => Self::Stopped,
            InstanceLifecycleState::Terminated => Self::Terminated,
            InstanceLifecycleState::Provisioning | InstanceLifecycleState::Starting => {
                Self::Starting
            }
            InstanceLifecycleState::Stopping => Self::Stopping,
            other => Self::Other(other.as_str().to_string()),
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct InstanceManager<'a, B: ?Sized> {
    backend: &'a B,
    compartment_id: &'a str,
}

impl<'a, B: OciBackend + ?Sized> InstanceManager<'a, B> {
    pub fn new(backend: &'a B, compartment_id: &'a str) -> Self {
        Self {
            backend,
            compartment_id,
        }
    }

    /// The instance tagged with `machine_id`.
    pub async fn get(&self, machine_id: &str) -> Result<Instance> {
        if machine_id.is_empty() {
            return Err(Error::MissingMachineId);
        }

        Locator::new(self.backend)
            .instance(self.compartment_id, machine_id)
            .await
            .op("list instances")?
            .ok_or_else(|| Error::InstanceNotFound(machine_id.to_string()))
    }

    /// Terminate the machine's instance and its boot volume. An absent (or
    /// already terminated) instance counts as deleted.
    pub async fn delete(&self, machine_id: &str) -> Result<()> {
        let instance = match self.get(machine_id).await {
            Ok(instance) => instance,
            Err(e) if e.is_not_found() => {
                debug!(machine_id, "instance already gone");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if instance.lifecycle_state == InstanceLifecycleState::Terminated {
            debug!(machine_id, instance_id = %instance.id, "instance already terminated");
            return Ok(());
        }

        match self.backend.terminate_instance(&instance.id, false).await {
            Ok(()) => info!(machine_id, instance_id = %instance.id, "instance terminating"),
            Err(e) if e.is_not_found() => {
                warn!(machine_id, instance_id = %instance.id, "instance vanished before terminate");
            }
            Err(e) => return Err(e).op("terminate instance"),
        }
        Ok(())
    }

    pub async fn start(&self, machine_id: &str) -> Result<()> {
        self.power(machine_id, InstanceAction::Start, InstanceLifecycleState::Running)
            .await
    }

    pub async fn stop(&self, machine_id: &str) -> Result<()> {
        self.power(machine_id, InstanceAction::Stop, InstanceLifecycleState::Stopped)
            .await
    }

    async fn power(
        &self,
        machine_id: &str,
        action: InstanceAction,
        target: InstanceLifecycleState,
    ) -> Result<()> {
        let instance = self.get(machine_id).await?;

        if instance.lifecycle_state == target {
            debug!(machine_id, state = %target, "instance already in target state");
            return Ok(());
        }

        self.backend
            .instance_action(&instance.id, action)
            .await
            .op("instance action")?;

        info!(
            machine_id,
            instance_id = %instance.id,
            action = %action,
            from = %instance.lifecycle_state,
            "instance action accepted"
        );
        Ok(())
    }

    /// Current status token; absence is `NotFound`, not an error.
    pub async fn status(&self, machine_id: &str) -> Result<InstanceStatus> {
        match self.get(machine_id).await {
            Ok(instance) => Ok(InstanceStatus::from(&instance.lifecycle_state)),
            Err(e) if e.is_not_found() => Ok(InstanceStatus::NotFound),
            Err(e) => Err(e),
        }
    }

    /// Public address of the primary VNIC, or its private address when no
    /// public one is assigned.
    pub async fn ip(&self, machine_id: &str) -> Result<String> {
        let instance = self.get(machine_id).await?;

        let vnic_id = self
            .backend
            .list_vnic_attachments(self.compartment_id, &instance.id)
            .await
            .op("list vnic attachments")?
            .into_iter()
            .find_map(|attachment| attachment.vnic_id)
            .ok_or_else(|| Error::NoNetworkInterface(instance.id.clone()))?;

        let vnic = self.backend.get_vnic(&vnic_id).await.op("get vnic")?;

        vnic.public_ip
            .filter(|ip| !ip.is_empty())
            .or(vnic.private_ip.filter(|ip| !ip.is_empty()))
            .ok_or(Error::NoAddress(instance.id))
    }
}
