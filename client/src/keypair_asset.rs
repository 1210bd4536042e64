//! Loads the data account keypair shipped with the build, and Solana CLI keypair files.

use std::{
    collections::BTreeMap,
    fs,
    path::Path,
};

use anyhow::{
    bail,
    Context,
};
use serde::Deserialize;
use solana_sdk::{
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
};

/// The data account keypair every build of this deployment agrees on.
const EMBEDDED: &str = include_str!("../assets/base_account.json");

#[derive(Deserialize)]
#[serde(untagged)]
enum KeypairAsset {
    Plain {
        #[serde(rename = "secretKey")]
        secret_key: Vec<u8>,
        #[serde(rename = "publicKey", default)]
        public_key: Option<String>,
    },
    /// A serialized web3.js `Keypair`, whose secret key is an index-keyed object.
    Bundled {
        #[serde(rename = "_keypair")]
        keypair: BundledKeypair,
    },
}

#[derive(Deserialize)]
struct BundledKeypair {
    #[serde(rename = "secretKey")]
    secret_key: BTreeMap<String, u8>,
}

impl KeypairAsset {
    fn into_parts(self) -> anyhow::Result<(Vec<u8>, Option<String>)> {
        match self {
            Self::Plain {
                secret_key,
                public_key,
            } => Ok((secret_key, public_key)),
            Self::Bundled { keypair } => {
                let mut indexed = keypair
                    .secret_key
                    .into_iter()
                    .map(|(i, b)| {
                        i.parse::<usize>()
                            .map(|i| (i, b))
                            .with_context(|| format!("Invalid secret key index `{i}`"))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                indexed.sort_unstable_by_key(|(i, _)| *i);
                if indexed.iter().enumerate().any(|(pos, (i, _))| pos != *i) {
                    bail!("Secret key indices aren't contiguous");
                }
                Ok((indexed.into_iter().map(|(_, b)| b).collect(), None))
            }
        }
    }
}

/// The data account keypair compiled into this crate.
pub fn embedded() -> anyhow::Result<Keypair> {
    from_json_str(EMBEDDED).context("Embedded data account keypair is invalid")
}

/// Parses a `{ "secretKey": [..64 bytes] }` asset (or the bundled web3.js shape).
pub fn from_json_str(json: &str) -> anyhow::Result<Keypair> {
    let asset: KeypairAsset = serde_json::from_str(json).context("Couldn't parse keypair asset")?;
    let (secret_key, public_key) = asset.into_parts()?;
    let keypair = keypair_from_bytes(&secret_key)?;

    if let Some(declared) = public_key {
        let declared: Pubkey = declared
            .parse()
            .with_context(|| format!("Invalid declared public key `{declared}`"))?;
        if declared != keypair.pubkey() {
            bail!(
                "Declared public key {declared} doesn't match the secret key's {}",
                keypair.pubkey()
            );
        }
    }
    Ok(keypair)
}

pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Keypair> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Couldn't read keypair asset {}", path.display()))?;
    from_json_str(&json)
}

/// Reads a Solana CLI keypair file: a JSON array of the 64 secret key bytes.
pub fn read_keypair_file(path: impl AsRef<Path>) -> anyhow::Result<Keypair> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Couldn't read keypair file {}", path.display()))?;
    let bytes: Vec<u8> = serde_json::from_str(&json)
        .with_context(|| format!("{} isn't a Solana CLI keypair file", path.display()))?;
    keypair_from_bytes(&bytes)
}

fn keypair_from_bytes(bytes: &[u8]) -> anyhow::Result<Keypair> {
    if bytes.len() != 64 {
        bail!("Expected 64 secret key bytes, got {}", bytes.len());
    }
    Keypair::try_from(bytes).context("Secret key bytes don't form a valid keypair")
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMBEDDED_PUBKEY: &str = "BfTcbeLaEc4zkTnBfHepSRAu46B8cpbsEeVHeU25pdPu";

    #[test]
    fn embedded_keypair_is_stable() {
        assert_eq!(embedded().unwrap().pubkey().to_string(), EMBEDDED_PUBKEY);
    }

    #[test]
    fn bundled_shape_matches_plain_shape() {
        let plain: serde_json::Value = serde_json::from_str(EMBEDDED).unwrap();
        let bytes: Vec<u8> = serde_json::from_value(plain["secretKey"].clone()).unwrap();
        let indexed: serde_json::Map<String, serde_json::Value> = bytes
            .iter()
            .enumerate()
            .map(|(i, b)| (i.to_string(), serde_json::Value::from(*b)))
            .collect();
        let bundled = serde_json::json!({ "_keypair": { "secretKey": indexed } }).to_string();

        assert_eq!(from_json_str(&bundled).unwrap().pubkey().to_string(), EMBEDDED_PUBKEY);
    }

    #[test]
    fn declared_public_key_must_match() {
        let keypair = Keypair::new();
        let json = serde_json::json!({
            "secretKey": keypair.to_bytes().to_vec(),
            "publicKey": Pubkey::new_unique().to_string(),
        })
        .to_string();
        assert!(from_json_str(&json).is_err());
    }

    #[test]
    fn short_secret_key_is_rejected() {
        assert!(from_json_str(r#"{ "secretKey": [1, 2, 3] }"#).is_err());
    }
}
