//! DevPod machine provider for Oracle Cloud Infrastructure.
//!
//! Converges a compartment towards "one tagged instance plus the shared
//! `devpod-*` network" and drives that instance's lifecycle. Nothing is
//! stored locally: every operation rediscovers its resources by reserved
//! display name or by the `machine-id` freeform tag.

pub mod backend;
pub mod cloud_init;
pub mod fingerprint;
pub mod launch;
pub mod lifecycle;
pub mod locator;
pub mod names;
pub mod network;
pub mod options;
pub mod provider;

pub use backend::OciBackend;
pub use fingerprint::fingerprint;
pub use launch::{LaunchSpec, MachineSpec};
pub use lifecycle::{InstanceManager, InstanceStatus};
pub use network::Network;
pub use options::Options;
pub use provider::OciProvider;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Backend(#[from] oci_api::Error),

    #[error("invalid public key: {0}")]
    InvalidKeyFormat(String),

    #[error("invalid disk size {0:?}: expected a whole number of GB")]
    InvalidDiskSize(String),

    #[error("missing machine id")]
    MissingMachineId,

    #[error("couldn't find option {0} in environment, please make sure {0} is defined")]
    MissingOption(String),

    #[error("image {0} not found")]
    ImageNotFound(String),

    #[error("instance for machine {0} not found")]
    InstanceNotFound(String),

    #[error("no VNIC attachments found for instance {0}")]
    NoNetworkInterface(String),

    #[error("instance {0} has no IP address assigned")]
    NoAddress(String),

    /// A failure wrapped with the operation that produced it.
    #[error("{op}")]
    Context {
        op: &'static str,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error only says "the resource is absent".
    ///
    /// Idempotent flows (delete-if-exists, status) branch on this instead of
    /// failing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Backend(e) => e.is_not_found(),
            Self::ImageNotFound(_) | Self::InstanceNotFound(_) => true,
            Self::Context { source, .. } => source.is_not_found(),
            Self::InvalidKeyFormat(_)
            | Self::InvalidDiskSize(_)
            | Self::MissingMachineId
            | Self::MissingOption(_)
            | Self::NoNetworkInterface(_)
            | Self::NoAddress(_) => false,
        }
    }

    /// The innermost error below any operation context.
    pub fn root(&self) -> &Error {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Not-found classification for arbitrary errors.
///
/// This crate's and the OCI client's errors answer by variant. Foreign
/// errors count when their message says `not found`, `NotFound` or
/// `does not exist`.
pub fn is_not_found(err: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(e) = err.downcast_ref::<Error>() {
        return e.is_not_found();
    }
    if let Some(e) = err.downcast_ref::<oci_api::Error>() {
        return e.is_not_found();
    }
    mentions_not_found(&err.to_string())
}

fn mentions_not_found(msg: &str) -> bool {
    msg.contains("not found") || msg.contains("NotFound") || msg.contains("does not exist")
}

pub(crate) trait ResultExt<T> {
    /// Wrap the error with the name of the operation that failed.
    fn op(self, op: &'static str) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn op(self, op: &'static str) -> Result<T> {
        self.map_err(|e| Error::Context {
            op,
            source: Box::new(e.into()),
        })
    }
}
