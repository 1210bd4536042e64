//! The program proxy: the GIF portal program's three RPCs plus the data account fetch, with
//! chain and wallet failures mapped onto the program's failure modes.

use std::sync::Arc;

use gif_portal_interface::{
    error::{
        InterfaceError,
        ENTRY_NOT_FOUND,
    },
    instructions::PortalInstructions,
    state::{
        BaseAccountView,
        EntryList,
        BASE_ACCOUNT,
    },
};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{
        Keypair,
        Signature,
    },
    signer::Signer,
};
use thiserror::Error;

use crate::{
    chain::{
        ChainClient,
        ChainError,
        RejectCause,
        SubmitError,
    },
    logs::{
        log_info,
        log_success,
    },
    wallet::{
        TransactionSigner,
        WalletError,
    },
};

/// Custom error the system program raises when the account to create already exists.
const ACCOUNT_ALREADY_IN_USE: u32 = 0;
/// Custom error the system program raises when the funder can't cover the transfer.
const RESULT_WITH_NEGATIVE_LAMPORTS: u32 = 1;

#[derive(Debug, Error, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ProxyError {
    #[error("No gif link given")]
    EmptyInput,
    #[error("The data account is already initialized")]
    AlreadyInitialized,
    #[error("Insufficient funds to pay for the transaction")]
    InsufficientFunds,
    #[error("No entry has the link {0}")]
    NotFound(String),
    #[error("The data account doesn't exist yet")]
    AccountMissing,
    #[error("Couldn't decode the data account: {0}")]
    DecodeFailed(String),
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),
    #[error("RPC rejected the request ({code}): {message}")]
    RpcRejected { code: i64, message: String },
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("Couldn't build the instruction: {0}")]
    Instruction(#[from] InterfaceError),
}

impl ProxyError {
    /// The error kind's name, e.g. `already_initialized`.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<ChainError> for ProxyError {
    fn from(error: ChainError) -> Self {
        match error {
            e if e.is_uninitialized() => Self::AccountMissing,
            ChainError::NetworkUnavailable(msg) => Self::NetworkUnavailable(msg),
            ChainError::RpcRejected { code, message, .. } => Self::RpcRejected { code, message },
            ChainError::DecodeFailed(failure) => Self::DecodeFailed(failure.to_string()),
        }
    }
}

impl From<SubmitError> for ProxyError {
    fn from(error: SubmitError) -> Self {
        match error {
            SubmitError::Chain(e) => e.into(),
            SubmitError::Wallet(e) => Self::Wallet(e),
            SubmitError::Signing(msg) => Self::Wallet(WalletError::Signing(msg)),
        }
    }
}

/// Binds the chain client to the portal program and its singleton data account.
pub struct ProgramProxy {
    chain: ChainClient,
    instructions: PortalInstructions,
    data_account: Arc<Keypair>,
}

impl ProgramProxy {
    pub fn new(chain: ChainClient, data_account: Keypair) -> Self {
        let instructions = PortalInstructions::new(chain.program().clone(), data_account.pubkey());
        Self {
            chain,
            instructions,
            data_account: Arc::new(data_account),
        }
    }

    pub fn chain(&self) -> &ChainClient {
        &self.chain
    }

    pub fn data_account(&self) -> Pubkey {
        self.data_account.pubkey()
    }

    /// Fetches the current entry list.
    pub async fn read_state(&self) -> Result<EntryList, ProxyError> {
        let snapshot = self
            .chain
            .query_account(&self.data_account(), BASE_ACCOUNT)
            .await?
            .ok_or(ProxyError::AccountMissing)?;
        let view = BaseAccountView::try_from(&snapshot.decoded)
            .map_err(|e| ProxyError::DecodeFailed(e.to_string()))?;
        Ok(view.entries)
    }

    /// Creates the data account, signed by the embedded keypair and paid for by `wallet`.
    pub async fn initialize(&self, wallet: &dyn TransactionSigner) -> Result<Signature, ProxyError> {
        let ix = self.instructions.initialize(wallet.pubkey())?;
        let res = self
            .chain
            .submit(&[ix], &[self.data_account.as_ref()], wallet)
            .await;

        match res {
            Ok(sig) => {
                log_success("Created a new BaseAccount w/ address", self.data_account());
                Ok(sig)
            }
            Err(SubmitError::Chain(ChainError::RpcRejected { cause, code, message })) => {
                Err(match cause {
                    RejectCause::ProgramError {
                        code: ACCOUNT_ALREADY_IN_USE,
                        ..
                    } => ProxyError::AlreadyInitialized,
                    RejectCause::ProgramError {
                        code: RESULT_WITH_NEGATIVE_LAMPORTS,
                        ..
                    }
                    | RejectCause::InsufficientFunds => ProxyError::InsufficientFunds,
                    _ => ProxyError::RpcRejected { code, message },
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Appends an entry for `link` submitted by `wallet`. Blank links are rejected locally.
    pub async fn add_entry(
        &self,
        wallet: &dyn TransactionSigner,
        link: &str,
    ) -> Result<Signature, ProxyError> {
        if link.trim().is_empty() {
            return Err(ProxyError::EmptyInput);
        }
        log_info("Gif link", link);
        let ix = self.instructions.add_entry(wallet.pubkey(), link)?;
        self.send(ix, wallet, link).await
    }

    /// Increments the likes of the first entry whose link equals `link`.
    pub async fn upvote_entry(
        &self,
        wallet: &dyn TransactionSigner,
        link: &str,
    ) -> Result<Signature, ProxyError> {
        log_info("Upvote", link);
        let ix = self.instructions.upvote_entry(wallet.pubkey(), link)?;
        self.send(ix, wallet, link).await
    }

    async fn send(
        &self,
        ix: Instruction,
        wallet: &dyn TransactionSigner,
        link: &str,
    ) -> Result<Signature, ProxyError> {
        match self.chain.submit(&[ix], &[], wallet).await {
            Ok(sig) => Ok(sig),
            Err(SubmitError::Chain(ChainError::RpcRejected { cause, code, message })) => {
                Err(self.program_error(cause, link).unwrap_or(match cause {
                    RejectCause::InsufficientFunds => ProxyError::InsufficientFunds,
                    _ => ProxyError::RpcRejected { code, message },
                }))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolves a custom error code raised by the portal program through its IDL error table.
    fn program_error(&self, cause: RejectCause, link: &str) -> Option<ProxyError> {
        let RejectCause::ProgramError { code, .. } = cause else {
            return None;
        };
        let error = self.chain.program().idl.error_by_code(code)?;
        (error.name == ENTRY_NOT_FOUND).then(|| ProxyError::NotFound(link.to_string()))
    }
}
