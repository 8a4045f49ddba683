//! OpenSSH `SHA256:` fingerprints of authorized-keys formatted public keys.

use ssh_key::authorized_keys::AuthorizedKeys;
use ssh_key::public::{EcdsaPublicKey, KeyData, RsaPublicKey};
use ssh_key::{Algorithm, EcdsaCurve, HashAlg, PublicKey};

use crate::{Error, Result};

/// Largest RSA public exponent OpenSSH accepts, in bytes (24 bits).
const MAX_RSA_EXPONENT_LEN: usize = 3;

/// Fingerprint of the first key in `public_key`, formatted like
/// `ssh-keygen -l`: `SHA256:` followed by the unpadded base64 SHA-256 of the
/// key blob.
pub fn fingerprint(public_key: &str) -> Result<String> {
    let key = parse_authorized_key(public_key)?;
    Ok(key.fingerprint(HashAlg::Sha256).to_string())
}

/// First usable key of an authorized_keys text.
///
/// Lines may carry a leading options field; blank lines and `#` comments are
/// skipped, as are lines that fail to parse when a later line holds a key.
fn parse_authorized_key(text: &str) -> Result<PublicKey> {
    let mut last_error = "ssh: no key found".to_string();
    for entry in AuthorizedKeys::new(text) {
        let parsed = entry.map_err(|e| e.to_string()).and_then(|entry| {
            let key = entry.public_key();
            check_key_data(key.key_data()).map(|()| key.clone())
        });
        match parsed {
            Ok(key) => return Ok(key),
            Err(e) => last_error = e,
        }
    }
    Err(Error::InvalidKeyFormat(last_error))
}

/// Semantic checks the wire decoder leaves to the caller.
fn check_key_data(key: &KeyData) -> std::result::Result<(), String> {
    match key {
        KeyData::Rsa(rsa) => check_rsa(rsa),
        KeyData::Ecdsa(ecdsa) => check_ecdsa(ecdsa),
        KeyData::SkEcdsaSha2NistP256(sk) => p256::PublicKey::from_sec1_bytes(sk.ec_point().as_bytes())
            .map(drop)
            .map_err(|_| "ssh: ecdsa point is not on curve nistp256".to_string()),
        _ if matches!(key.algorithm(), Algorithm::Other(_)) => {
            Err(format!("ssh: unsupported key type {}", key.algorithm()))
        }
        _ => Ok(()),
    }
}

fn check_rsa(key: &RsaPublicKey) -> std::result::Result<(), String> {
    let e = key.e.as_positive_bytes().unwrap_or_default();
    let n = key.n.as_positive_bytes().unwrap_or_default();
    if n.is_empty() {
        return Err("ssh: rsa modulus is empty".into());
    }
    if e.is_empty() || e.len() > MAX_RSA_EXPONENT_LEN {
        return Err("ssh: unsupported rsa exponent size".into());
    }
    let exponent = e.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
    if exponent < 3 || exponent % 2 == 0 {
        return Err("ssh: incorrect rsa exponent".into());
    }
    Ok(())
}

fn check_ecdsa(key: &EcdsaPublicKey) -> std::result::Result<(), String> {
    let point = key.as_sec1_bytes();
    let on_curve = match key.curve() {
        EcdsaCurve::NistP256 => p256::PublicKey::from_sec1_bytes(point).is_ok(),
        EcdsaCurve::NistP384 => p384::PublicKey::from_sec1_bytes(point).is_ok(),
        EcdsaCurve::NistP521 => p521::PublicKey::from_sec1_bytes(point).is_ok(),
    };
    if on_curve {
        Ok(())
    } else {
        Err(format!("ssh: ecdsa point is not on curve {}", key.curve()))
    }
}
