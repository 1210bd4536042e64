use std::{
    fs,
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use gif_portal_client::{
    keypair_asset,
    network::{
        Cluster,
        NetworkConfig,
    },
};
use gif_portal_interface::{
    idl::Idl,
    ProgramIdentity,
};
use solana_commitment_config::CommitmentLevel;
use solana_sdk::signature::Keypair;

#[derive(Parser, Debug, Clone)]
#[command(name = "gif-portal", version, about = "Terminal client for the GIF portal program")]
pub struct Cli {
    /// Cluster name (devnet, testnet, mainnet-beta, localnet) or an RPC URL.
    #[arg(long, env = "GIF_PORTAL_CLUSTER", default_value = "devnet")]
    pub cluster: Cluster,

    /// RPC endpoint overriding the cluster's public one.
    #[arg(long, env = "GIF_PORTAL_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Commitment level for reads and preflight: processed, confirmed or finalized.
    #[arg(long, env = "GIF_PORTAL_COMMITMENT", default_value = "processed", value_parser = parse_commitment)]
    pub commitment: CommitmentLevel,

    /// IDL file to use instead of the bundled one. Its metadata address selects the program.
    #[arg(long, env = "GIF_PORTAL_IDL")]
    pub idl: Option<PathBuf>,

    /// Data account keypair asset (`{ "secretKey": [...] }`) instead of the embedded one.
    #[arg(long, env = "GIF_PORTAL_BASE_ACCOUNT")]
    pub base_account_keypair: Option<PathBuf>,

    /// Solana CLI keypair file the local wallet signs with (default: ~/.config/solana/id.json).
    #[arg(long, env = "GIF_PORTAL_WALLET")]
    pub wallet: Option<PathBuf>,

    /// Origin the wallet sees this client as.
    #[arg(long, default_value = "http://localhost:3000")]
    pub origin: String,

    /// Treat the origin as already approved by the wallet, so page load reconnects silently.
    #[arg(long)]
    pub trusted: bool,

    /// Approve every wallet prompt without asking.
    #[arg(short, long)]
    pub yes: bool,

    /// Only print errors besides the rendered view.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Everything the portal is wired with, resolved once at startup.
pub struct PortalConfig {
    pub network: NetworkConfig,
    pub rpc_url: Option<String>,
    pub program: ProgramIdentity,
    pub data_account: Keypair,
    pub wallet_path: PathBuf,
    pub origin: String,
    pub trusted: bool,
    pub auto_approve: bool,
    pub quiet: bool,
}

fn parse_commitment(s: &str) -> Result<CommitmentLevel, String> {
    match s {
        "processed" => Ok(CommitmentLevel::Processed),
        "confirmed" => Ok(CommitmentLevel::Confirmed),
        "finalized" => Ok(CommitmentLevel::Finalized),
        other => Err(format!(
            "`{other}` isn't one of processed, confirmed, finalized"
        )),
    }
}

fn default_wallet_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME isn't set; pass --wallet")?;
    Ok(PathBuf::from(home).join(".config/solana/id.json"))
}

impl Cli {
    pub fn resolve(self) -> anyhow::Result<PortalConfig> {
        let program = match &self.idl {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("Couldn't read IDL {}", path.display()))?;
                ProgramIdentity::from_idl(Idl::from_json(&json)?)?
            }
            None => ProgramIdentity::bundled()?,
        };
        let data_account = match &self.base_account_keypair {
            Some(path) => keypair_asset::from_file(path)?,
            None => keypair_asset::embedded()?,
        };
        let wallet_path = match self.wallet {
            Some(path) => path,
            None => default_wallet_path()?,
        };

        Ok(PortalConfig {
            network: NetworkConfig::new(self.cluster, self.commitment),
            rpc_url: self.rpc_url,
            program,
            data_account,
            wallet_path,
            origin: self.origin,
            trusted: self.trusted,
            auto_approve: self.yes,
            quiet: self.quiet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_devnet_processed() {
        let cli = Cli::parse_from(["gif-portal", "--wallet", "/tmp/id.json"]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.network, NetworkConfig::default());
        assert_eq!(config.program.id, gif_portal_interface::program::ID);
        assert_eq!(config.wallet_path, PathBuf::from("/tmp/id.json"));
        assert!(!config.trusted && !config.auto_approve);
    }

    #[test]
    fn rejects_unknown_commitment() {
        assert!(Cli::try_parse_from(["gif-portal", "--commitment", "eventually"]).is_err());
    }

    #[test]
    fn custom_cluster_url() {
        let cli = Cli::parse_from(["gif-portal", "--cluster", "http://127.0.0.1:9000", "--commitment", "confirmed"]);
        assert_eq!(cli.cluster, Cluster::Custom("http://127.0.0.1:9000".into()));
        assert_eq!(cli.commitment, CommitmentLevel::Confirmed);
    }
}
