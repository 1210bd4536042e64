//! Wallet gateway: discovers the wallet provider injected into the host, negotiates a session
//! and exposes the session as the fee-paying transaction signer.

pub mod host;
pub mod keypair_wallet;

use std::{
    fmt,
    sync::Arc,
};

use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    transaction::Transaction,
};
use thiserror::Error;

pub use self::{
    host::{
        HostPage,
        StaticHost,
    },
    keypair_wallet::{
        ApprovalPrompt,
        ApprovalRequest,
        FixedApproval,
        KeypairWallet,
    },
};
use crate::logs::{
    log_info,
    log_warning,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("No wallet found")]
    NoWallet,
    #[error("The user rejected the request")]
    UserRejected,
    #[error("The wallet hasn't trusted this origin")]
    NotTrusted,
    #[error("The wallet isn't connected")]
    NotConnected,
    #[error("Wallet now reports {actual:?}, but the session was opened for {expected}")]
    SessionMismatch {
        expected: Pubkey,
        actual: Option<Pubkey>,
    },
    #[error("Wallet failed to sign: {0}")]
    Signing(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Only connect if the wallet already trusts the origin; never prompt the user.
    pub only_if_trusted: bool,
}

/// The surface a wallet provider exposes on the host page.
#[async_trait]
pub trait InjectedWallet: Send + Sync {
    /// Whether the provider advertises the capability marker `flag`.
    fn has_flag(&self, flag: &str) -> bool;

    /// The authenticated public key, if the provider is connected.
    fn public_key(&self) -> Option<Pubkey>;

    async fn connect(&self, origin: &str, options: ConnectOptions) -> Result<Pubkey, WalletError>;

    async fn disconnect(&self);

    /// Adds the provider's signature to a transaction whose message names it as a signer.
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, WalletError>;
}

/// Anything that can authorize a transaction as its fee payer.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, WalletError>;
}

/// Where to look for the provider and which marker it must advertise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletConfig {
    pub global_name: String,
    pub capability_flag: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            global_name: "solana".into(),
            capability_flag: "isPhantom".into(),
        }
    }
}

/// A connected wallet. Holds no key material, only the provider handle and the key it
/// authenticated.
#[derive(Clone)]
pub struct WalletSession {
    public_key: Pubkey,
    provider: Arc<dyn InjectedWallet>,
}

impl WalletSession {
    pub fn public_key(&self) -> Pubkey {
        self.public_key
    }

    /// Whether the provider still reports the key this session was opened with.
    pub fn is_current(&self) -> bool {
        self.provider.public_key() == Some(self.public_key)
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TransactionSigner for WalletSession {
    fn pubkey(&self) -> Pubkey {
        self.public_key
    }

    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, WalletError> {
        if !self.is_current() {
            return Err(WalletError::SessionMismatch {
                expected: self.public_key,
                actual: self.provider.public_key(),
            });
        }
        self.provider.sign_transaction(transaction).await
    }
}

pub struct WalletGateway {
    host: Arc<dyn HostPage>,
    config: WalletConfig,
}

impl WalletGateway {
    pub fn new(host: Arc<dyn HostPage>, config: WalletConfig) -> Self {
        Self { host, config }
    }

    /// Finds the injected provider. A provider without the capability marker counts as absent.
    pub fn discover(&self) -> Result<Arc<dyn InjectedWallet>, WalletError> {
        let Some(provider) = self.host.injected(&self.config.global_name) else {
            log_warning("Wallet", "Solana object not found! Get a Phantom Wallet");
            return Err(WalletError::NoWallet);
        };
        if !provider.has_flag(&self.config.capability_flag) {
            log_warning(
                "Wallet",
                format!("Provider doesn't advertise `{}`", self.config.capability_flag),
            );
            return Err(WalletError::NoWallet);
        }
        Ok(provider)
    }

    /// Reconnects without prompting, if the provider already trusts this origin.
    pub async fn try_silent_reconnect(&self) -> Result<Option<WalletSession>, WalletError> {
        let provider = self.discover()?;
        let options = ConnectOptions {
            only_if_trusted: true,
        };
        match provider.connect(self.host.origin(), options).await {
            Ok(public_key) => Self::open(provider, public_key).map(Some),
            Err(WalletError::NotTrusted | WalletError::UserRejected) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Asks the user to approve a connection.
    pub async fn connect_interactive(&self) -> Result<WalletSession, WalletError> {
        let provider = self.discover()?;
        let public_key = provider
            .connect(self.host.origin(), ConnectOptions::default())
            .await?;
        Self::open(provider, public_key)
    }

    /// Opens a session for the key `connect` returned, if the provider reports it as well.
    fn open(
        provider: Arc<dyn InjectedWallet>,
        public_key: Pubkey,
    ) -> Result<WalletSession, WalletError> {
        let session = WalletSession {
            public_key,
            provider,
        };
        if !session.is_current() {
            return Err(WalletError::SessionMismatch {
                expected: public_key,
                actual: session.provider.public_key(),
            });
        }
        log_info("Connected with Public Key", public_key);
        Ok(session)
    }

    pub async fn disconnect(&self, session: WalletSession) {
        session.provider.disconnect().await;
        log_info("Disconnected", session.public_key);
    }
}
