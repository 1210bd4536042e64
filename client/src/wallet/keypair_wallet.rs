//! A software wallet provider backed by a local keypair, with an approval prompt standing in for
//! the browser extension's popup.

use std::{
    collections::HashSet,
    path::Path,
    sync::{
        atomic::{
            AtomicBool,
            AtomicUsize,
            Ordering,
        },
        Arc,
        Mutex,
    },
};

use async_trait::async_trait;
use solana_sdk::{
    message::Message,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};

use super::{
    ConnectOptions,
    InjectedWallet,
    WalletError,
};
use crate::keypair_asset::read_keypair_file;

/// What the wallet asks the user to approve.
#[derive(Debug)]
pub enum ApprovalRequest<'a> {
    Connect { origin: &'a str },
    SignTransaction { message: &'a Message },
}

#[async_trait]
pub trait ApprovalPrompt: Send + Sync {
    async fn approve(&self, request: &ApprovalRequest<'_>) -> bool;
}

/// Answers every prompt the same way and counts how often it was asked.
#[derive(Debug, Default)]
pub struct FixedApproval {
    approve: bool,
    prompts: AtomicUsize,
}

impl FixedApproval {
    pub fn approve_all() -> Self {
        Self {
            approve: true,
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn reject_all() -> Self {
        Self {
            approve: false,
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ApprovalPrompt for FixedApproval {
    async fn approve(&self, _request: &ApprovalRequest<'_>) -> bool {
        self.prompts.fetch_add(1, Ordering::Relaxed);
        self.approve
    }
}

pub struct KeypairWallet {
    keypair: Keypair,
    flags: HashSet<String>,
    trusted: Mutex<HashSet<String>>,
    connected: AtomicBool,
    prompt: Arc<dyn ApprovalPrompt>,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair, prompt: Arc<dyn ApprovalPrompt>) -> Self {
        Self {
            keypair,
            flags: HashSet::new(),
            trusted: Mutex::new(HashSet::new()),
            connected: AtomicBool::new(false),
            prompt,
        }
    }

    /// Loads the keypair from a Solana CLI keypair file.
    pub fn from_file(path: impl AsRef<Path>, prompt: Arc<dyn ApprovalPrompt>) -> anyhow::Result<Self> {
        Ok(Self::new(read_keypair_file(path)?, prompt))
    }

    /// Advertises a capability marker, e.g. `isPhantom`.
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Marks `origin` as previously approved, so silent connects from it succeed.
    pub fn with_trusted_origin(self, origin: impl Into<String>) -> Self {
        self.trust(origin.into());
        self
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn trust(&self, origin: String) {
        if let Ok(mut trusted) = self.trusted.lock() {
            trusted.insert(origin);
        }
    }

    fn trusts(&self, origin: &str) -> bool {
        self.trusted
            .lock()
            .map(|trusted| trusted.contains(origin))
            .unwrap_or(false)
    }
}

#[async_trait]
impl InjectedWallet for KeypairWallet {
    fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.is_connected().then(|| self.keypair.pubkey())
    }

    async fn connect(&self, origin: &str, options: ConnectOptions) -> Result<Pubkey, WalletError> {
        if options.only_if_trusted {
            if !self.trusts(origin) {
                return Err(WalletError::NotTrusted);
            }
        } else {
            if !self.prompt.approve(&ApprovalRequest::Connect { origin }).await {
                return Err(WalletError::UserRejected);
            }
            self.trust(origin.to_string());
        }
        self.connected.store(true, Ordering::Relaxed);
        Ok(self.keypair.pubkey())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::Relaxed);
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction, WalletError> {
        if !self.is_connected() {
            return Err(WalletError::NotConnected);
        }
        let request = ApprovalRequest::SignTransaction {
            message: &transaction.message,
        };
        if !self.prompt.approve(&request).await {
            return Err(WalletError::UserRejected);
        }
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://portal.test";

    #[tokio::test]
    async fn silent_connect_needs_prior_trust() {
        let prompt = Arc::new(FixedApproval::approve_all());
        let wallet = KeypairWallet::new(Keypair::new(), prompt.clone());
        let silent = ConnectOptions {
            only_if_trusted: true,
        };

        assert_eq!(
            wallet.connect(ORIGIN, silent).await,
            Err(WalletError::NotTrusted)
        );
        assert_eq!(wallet.public_key(), None);

        wallet.connect(ORIGIN, ConnectOptions::default()).await.unwrap();
        wallet.disconnect().await;
        assert_eq!(wallet.connect(ORIGIN, silent).await, Ok(wallet.pubkey()));
        // Only the interactive connect prompted.
        assert_eq!(prompt.prompts(), 1);
    }

    #[tokio::test]
    async fn rejected_prompt_leaves_wallet_disconnected() {
        let wallet = KeypairWallet::new(Keypair::new(), Arc::new(FixedApproval::reject_all()));
        assert_eq!(
            wallet.connect(ORIGIN, ConnectOptions::default()).await,
            Err(WalletError::UserRejected)
        );
        assert!(!wallet.is_connected());
    }
}
