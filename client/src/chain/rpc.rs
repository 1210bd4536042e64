use async_trait::async_trait;
use solana_account::Account;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::RpcSendTransactionConfig,
};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};

use super::{
    ChainError,
    ChainRpc,
};
use crate::network::NetworkConfig;

/// [`ChainRpc`] over a JSON-RPC endpoint.
pub struct SolanaRpc {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaRpc {
    pub fn new(network: &NetworkConfig) -> Self {
        Self::with_url(network.endpoint().to_string(), network)
    }

    /// Talks to `url` instead of the cluster's public endpoint, keeping the commitment level.
    pub fn with_url(url: String, network: &NetworkConfig) -> Self {
        let commitment = network.commitment_config();
        Self {
            client: RpcClient::new_with_commitment(url, commitment),
            commitment,
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ChainError> {
        Ok(self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await?
            .value)
    }

    async fn latest_blockhash(&self) -> Result<Hash, ChainError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, ChainError> {
        let config = RpcSendTransactionConfig {
            preflight_commitment: Some(self.commitment.commitment),
            ..Default::default()
        };
        Ok(self
            .client
            .send_and_confirm_transaction_with_spinner_and_config(
                transaction,
                self.commitment,
                config,
            )
            .await?)
    }
}
