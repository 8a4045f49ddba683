//! API-key credentials from an OCI CLI style config file.
//!
//! Requests are signed by the SDK's [`SimpleAuthProvider`]; this module only
//! resolves the profile and checks the key up front so a bad key fails before
//! any request is built.

use std::fmt;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use oci_rust_sdk::core::auth::{SimpleAuthProvider, SimpleAuthProviderRequiredFields};
use oci_rust_sdk::core::region::Region;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;

use crate::{Error, Result};

pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// API-key credentials for one tenancy user.
#[derive(Clone)]
pub struct Credentials {
    pub tenancy: String,
    pub user: String,
    pub fingerprint: String,
    private_key_pem: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenancy", &self.tenancy)
            .field("user", &self.user)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn new(
        tenancy: impl Into<String>,
        user: impl Into<String>,
        fingerprint: impl Into<String>,
        private_key_pem: &str,
    ) -> Result<Self> {
        check_private_key(private_key_pem)?;
        Ok(Self {
            tenancy: tenancy.into(),
            user: user.into(),
            fingerprint: fingerprint.into(),
            private_key_pem: private_key_pem.to_string(),
        })
    }

    /// Load a profile from an OCI CLI style config file (`~/.oci/config`).
    ///
    /// Keys missing from a named profile are taken from `[DEFAULT]`. An empty
    /// profile name selects `DEFAULT`.
    pub fn from_config_file(path: impl AsRef<Path>, profile: &str) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::Config("OCI config file path is required".into()));
        }
        let profile = if profile.is_empty() {
            DEFAULT_PROFILE
        } else {
            profile
        };

        let mut ini = Ini::new_cs();
        ini.load(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;

        if !ini.sections().iter().any(|s| s == profile) {
            return Err(Error::Config(format!(
                "profile {profile} not found in {}",
                path.display()
            )));
        }

        let get = |key: &str| {
            ini.get(profile, key)
                .or_else(|| ini.get(DEFAULT_PROFILE, key))
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                Error::Config(format!(
                    "missing `{key}` in profile {profile} of {}",
                    path.display()
                ))
            })
        };

        let key_file = expand_home(&require("key_file")?);
        let pem = std::fs::read_to_string(&key_file)
            .map_err(|e| Error::Config(format!("read key file {}: {e}", key_file.display())))?;

        let credentials =
            Self::new(require("tenancy")?, require("user")?, require("fingerprint")?, &pem)?;

        tracing::debug!(profile, config = %path.display(), "loaded OCI credentials");
        Ok(credentials)
    }

    /// `keyId` of the signature header: `<tenancy>/<user>/<fingerprint>`.
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }

    /// Request signer for `region`.
    pub fn auth_provider(&self, region: Region) -> SimpleAuthProvider {
        SimpleAuthProvider::builder(SimpleAuthProviderRequiredFields {
            tenancy: self.tenancy.clone(),
            user: self.user.clone(),
            fingerprint: self.fingerprint.clone(),
            private_key: self.private_key_pem.clone(),
        })
        .region(region)
        .build()
    }
}

fn check_private_key(pem: &str) -> Result<()> {
    if pem.contains("ENCRYPTED") {
        return Err(Error::Key(
            "passphrase protected private keys are not supported".into(),
        ));
    }
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map(drop)
        .map_err(|e| Error::Key(e.to_string()))
}

fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}
