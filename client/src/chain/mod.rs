//! The chain client: one connection bound to a network and commitment level, exposing account
//! queries decoded through the program's IDL and signed transaction submission.

pub mod error;
pub mod rpc;

use std::sync::Arc;

use async_trait::async_trait;
use gif_portal_interface::{
    error::InterfaceError,
    idl::{
        decode_account,
        IdlValue,
    },
    ProgramIdentity,
    SYSTEM_PROGRAM_ID,
};
use solana_account::Account;
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    signature::{
        Keypair,
        Signature,
    },
    transaction::Transaction,
};
use thiserror::Error;

pub use self::{
    error::{
        ChainError,
        DecodeFailure,
        RejectCause,
    },
    rpc::SolanaRpc,
};
use crate::{
    fmt_kv,
    logs::{
        log_error,
        log_info,
        log_success,
    },
    network::NetworkConfig,
    wallet::{
        TransactionSigner,
        WalletError,
    },
    LogColor,
};

/// The transport the chain client sends requests through.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Fetches an account, returning `None` if it doesn't exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ChainError>;

    async fn latest_blockhash(&self) -> Result<Hash, ChainError>;

    /// Sends a fully signed transaction and waits until it reaches the configured commitment.
    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, ChainError>;
}

/// A program-owned account together with its IDL-decoded contents.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountSnapshot {
    pub address: Pubkey,
    pub owner: Pubkey,
    pub lamports: u64,
    pub raw: Vec<u8>,
    pub decoded: IdlValue,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("Failed to sign transaction: {0}")]
    Signing(String),
}

pub struct SendTransactionConfig {
    pub debug_logs: Option<bool>,
}

impl Default for SendTransactionConfig {
    fn default() -> Self {
        SendTransactionConfig {
            debug_logs: Some(true),
        }
    }
}

#[derive(Clone)]
pub struct ChainClient {
    rpc: Arc<dyn ChainRpc>,
    network: NetworkConfig,
    program: ProgramIdentity,
    debug_logs: bool,
}

impl ChainClient {
    pub fn new(rpc: Arc<dyn ChainRpc>, network: NetworkConfig, program: ProgramIdentity) -> Self {
        Self::with_config(rpc, network, program, SendTransactionConfig::default())
    }

    pub fn with_config(
        rpc: Arc<dyn ChainRpc>,
        network: NetworkConfig,
        program: ProgramIdentity,
        config: SendTransactionConfig,
    ) -> Self {
        Self {
            rpc,
            network,
            program,
            debug_logs: matches!(config.debug_logs, Some(true)),
        }
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn program(&self) -> &ProgramIdentity {
        &self.program
    }

    /// Reads `address` and decodes it as the IDL account `type_name`.
    ///
    /// Returns `Ok(None)` if the account doesn't exist. An account that exists but was never
    /// written by the program fails with [`DecodeFailure::Uninitialized`].
    pub async fn query_account(
        &self,
        address: &Pubkey,
        type_name: &str,
    ) -> Result<Option<AccountSnapshot>, ChainError> {
        let Some(account) = self.rpc.get_account(address).await? else {
            return Ok(None);
        };

        let unwritten = account.data.iter().all(|b| *b == 0);
        // A zeroed account only reads as missing while nobody but the program could claim it.
        if unwritten && (account.owner == self.program.id || account.owner == SYSTEM_PROGRAM_ID) {
            return Err(ChainError::DecodeFailed(DecodeFailure::Uninitialized));
        }
        if account.owner != self.program.id {
            return Err(ChainError::DecodeFailed(DecodeFailure::ForeignOwner(
                account.owner,
            )));
        }

        let decoded = decode_account(&self.program.idl, type_name, &account.data).map_err(
            |e| match e {
                InterfaceError::Uninitialized => DecodeFailure::Uninitialized,
                other => DecodeFailure::Layout(other.to_string()),
            },
        );
        let decoded = decoded.map_err(ChainError::DecodeFailed)?;

        Ok(Some(AccountSnapshot {
            address: *address,
            owner: account.owner,
            lamports: account.lamports,
            raw: account.data,
            decoded,
        }))
    }

    /// Builds a transaction paid for by `fee_payer`, signs it with the local `signers` and then
    /// the fee payer, and sends it.
    pub async fn submit(
        &self,
        instructions: &[Instruction],
        signers: &[&Keypair],
        fee_payer: &dyn TransactionSigner,
    ) -> Result<Signature, SubmitError> {
        let payer = fee_payer.pubkey();
        let bh = self.rpc.latest_blockhash().await?;

        let msg = Message::new(instructions, Some(&payer));
        let mut tx = Transaction::new_unsigned(msg);
        tx.try_partial_sign(signers, bh)
            .map_err(|e| SubmitError::Signing(e.to_string()))?;

        let tx = fee_payer.sign_transaction(tx).await?;
        if !tx.is_signed() {
            return Err(SubmitError::Signing(
                "transaction is missing required signatures".into(),
            ));
        }

        match self.rpc.send_and_confirm(&tx).await {
            Ok(sig) => {
                if self.debug_logs {
                    let sender_info = fmt_kv!("sender", payer, LogColor::Gray);
                    log_success("Signature", format!("{sig}\n{sender_info}"));
                    if let Some(url) = self.network.explorer_url(&sig) {
                        log_info("Explorer", url);
                    }
                }
                Ok(sig)
            }
            Err(error) => {
                log_error("Failed transaction submission", &error);
                log_info("Payer", payer);
                Err(error.into())
            }
        }
    }
}
