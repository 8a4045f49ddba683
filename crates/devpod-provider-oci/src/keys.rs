//! Per-machine SSH key pair under `<MACHINE_FOLDER>/.ssh`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rsa::RsaPrivateKey;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use ssh_key::PublicKey;
use ssh_key::public::{KeyData, RsaPublicKey};
use tracing::info;

pub const KEY_BITS: usize = 4096;

const PRIVATE_KEY_FILE: &str = "id_rsa";
const PUBLIC_KEY_FILE: &str = "id_rsa.pub";

pub fn key_dir(machine_folder: &Path) -> PathBuf {
    machine_folder.join(".ssh")
}

pub fn private_key_path(machine_folder: &Path) -> PathBuf {
    key_dir(machine_folder).join(PRIVATE_KEY_FILE)
}

/// Return the machine's public key, generating the pair on first use.
pub fn ensure_key_pair(machine_folder: &Path, bits: usize) -> Result<String> {
    let dir = key_dir(machine_folder);
    let private_path = dir.join(PRIVATE_KEY_FILE);
    let public_path = dir.join(PUBLIC_KEY_FILE);

    if private_path.exists() {
        return fs::read_to_string(&public_path).context("read public key");
    }

    fs::create_dir_all(&dir).context("create key dir")?;
    info!(dir = %dir.display(), bits, "generating new SSH key pair");

    let key = RsaPrivateKey::new(&mut rand::thread_rng(), bits).context("create ssh key pair")?;
    let private_pem = key
        .to_pkcs1_pem(LineEnding::LF)
        .context("encode private key")?;
    let public_key = authorized_key(&key).context("encode public key")?;

    write_with_mode(&private_path, private_pem.as_bytes(), 0o600).context("write private key")?;
    write_with_mode(&public_path, public_key.as_bytes(), 0o644).context("write public key")?;

    Ok(public_key)
}

/// `ssh-rsa <base64 blob>` for the key's public half.
fn authorized_key(key: &RsaPrivateKey) -> ssh_key::Result<String> {
    let public = RsaPublicKey::try_from(key.to_public_key())?;
    PublicKey::new(KeyData::Rsa(public), "").to_openssh()
}

#[cfg(unix)]
fn write_with_mode(path: &Path, contents: &[u8], mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, contents)?;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn write_with_mode(path: &Path, contents: &[u8], _mode: u32) -> std::io::Result<()> {
    fs::write(path, contents)
}
