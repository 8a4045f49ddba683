use std::path::PathBuf;

use crate::{Error, Result};

const DEFAULT_PROFILE: &str = oci_api::DEFAULT_PROFILE;

/// Provider options as passed by DevPod through the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub machine_id: String,
    pub machine_folder: PathBuf,

    pub region: String,
    pub compartment_id: String,
    pub availability_domain: String,
    pub disk_image: String,
    pub disk_size: String,
    pub machine_type: String,
    pub oci_config_file: PathBuf,
    pub oci_profile: String,
}

impl Options {
    /// Load from env vars (after `.env`):
    ///
    /// - `MACHINE_ID`, `MACHINE_FOLDER` (required unless `skip_machine`)
    /// - `OCI_CONFIG_FILE` (default: `~/.oci/config`)
    /// - `OCI_PROFILE` (default: `"DEFAULT"`)
    /// - `COMPARTMENT_ID`, `DISK_SIZE`, `DISK_IMAGE`, `MACHINE_TYPE`,
    ///   `REGION`, `AVAILABILITY_DOMAIN` (required)
    pub fn from_env(skip_machine: bool) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(skip_machine, |name| std::env::var(name).ok())
    }

    /// Same as [`Options::from_env`] with variables resolved by `lookup`.
    pub fn from_lookup<F>(skip_machine: bool, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let require = |name: &str| get(name).ok_or_else(|| Error::MissingOption(name.to_string()));

        let mut options = Self::default();

        if !skip_machine {
            options.machine_id = require("MACHINE_ID")?;
            options.machine_folder = require("MACHINE_FOLDER")?.into();
        }

        options.oci_config_file = match get("OCI_CONFIG_FILE") {
            Some(path) => path.into(),
            None => dirs::home_dir()
                .map(|home| home.join(".oci").join("config"))
                .unwrap_or_default(),
        };
        options.oci_profile = get("OCI_PROFILE").unwrap_or_else(|| DEFAULT_PROFILE.into());

        options.compartment_id = require("COMPARTMENT_ID")?;
        options.disk_size = require("DISK_SIZE")?;
        options.disk_image = require("DISK_IMAGE")?;
        options.machine_type = require("MACHINE_TYPE")?;
        options.region = require("REGION")?;
        options.availability_domain = require("AVAILABILITY_DOMAIN")?;

        Ok(options)
    }
}
