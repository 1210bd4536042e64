//! Network selection: which cluster endpoint to talk to and at which commitment level.

use std::{
    fmt,
    str::FromStr,
};

use solana_commitment_config::{
    CommitmentConfig,
    CommitmentLevel,
};
use solana_sdk::signature::Signature;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
    Custom(String),
}

impl Cluster {
    /// The public JSON-RPC endpoint for the cluster.
    pub fn url(&self) -> &str {
        match self {
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Self::Localnet => "http://127.0.0.1:8899",
            Self::Custom(url) => url,
        }
    }

    /// Query parameter understood by the Solana explorer, if the cluster is a public one.
    fn explorer_param(&self) -> Option<String> {
        match self {
            Self::Devnet => Some("?cluster=devnet".into()),
            Self::Testnet => Some("?cluster=testnet".into()),
            Self::MainnetBeta => Some(String::new()),
            Self::Localnet => Some(format!("?cluster=custom&customUrl={}", Self::Localnet.url())),
            Self::Custom(_) => None,
        }
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Self::Devnet
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Devnet => f.write_str("devnet"),
            Self::Testnet => f.write_str("testnet"),
            Self::MainnetBeta => f.write_str("mainnet-beta"),
            Self::Localnet => f.write_str("localnet"),
            Self::Custom(url) => f.write_str(url),
        }
    }
}

impl FromStr for Cluster {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "devnet" | "d" => Ok(Self::Devnet),
            "testnet" | "t" => Ok(Self::Testnet),
            "mainnet-beta" | "mainnet" | "m" => Ok(Self::MainnetBeta),
            "localnet" | "localhost" | "l" => Ok(Self::Localnet),
            url if url.starts_with("http://") || url.starts_with("https://") => {
                Ok(Self::Custom(url.trim_end_matches('/').to_string()))
            }
            other => anyhow::bail!("Unknown cluster `{other}`; expected a cluster name or an http(s) URL"),
        }
    }
}

/// The endpoint and commitment level every chain request is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub cluster: Cluster,
    pub commitment: CommitmentLevel,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::Devnet,
            commitment: CommitmentLevel::Processed,
        }
    }
}

impl NetworkConfig {
    pub fn new(cluster: Cluster, commitment: CommitmentLevel) -> Self {
        Self {
            cluster,
            commitment,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.cluster.url()
    }

    pub fn commitment_config(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: self.commitment,
        }
    }

    pub fn explorer_url(&self, signature: &Signature) -> Option<String> {
        self.cluster
            .explorer_param()
            .map(|param| format!("https://explorer.solana.com/tx/{signature}{param}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_devnet_processed() {
        let config = NetworkConfig::default();
        assert_eq!(config.endpoint(), "https://api.devnet.solana.com");
        assert_eq!(config.commitment_config(), CommitmentConfig::processed());
    }

    #[test]
    fn cluster_names_and_urls_parse() {
        assert_eq!("devnet".parse::<Cluster>().unwrap(), Cluster::Devnet);
        assert_eq!("mainnet".parse::<Cluster>().unwrap(), Cluster::MainnetBeta);
        assert_eq!(
            "http://10.0.0.2:8899/".parse::<Cluster>().unwrap(),
            Cluster::Custom("http://10.0.0.2:8899".into())
        );
        assert!("moonnet".parse::<Cluster>().is_err());
    }

    #[test]
    fn explorer_links_carry_the_cluster() {
        let sig = Signature::default();
        let devnet = NetworkConfig::default();
        assert_eq!(
            devnet.explorer_url(&sig).unwrap(),
            format!("https://explorer.solana.com/tx/{sig}?cluster=devnet")
        );
        let custom = NetworkConfig::new(Cluster::Custom("http://x".into()), CommitmentLevel::Confirmed);
        assert!(custom.explorer_url(&sig).is_none());
    }
}
