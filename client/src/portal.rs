//! The portal controller: wires the wallet gateway, program proxy and state store together and
//! applies each error kind's handling policy to the intents the view dispatches.

use std::cell::RefCell;

use thiserror::Error;

use crate::{
    logs::{
        log_error,
        log_info,
        log_warning,
    },
    proxy::{
        ProgramProxy,
        ProxyError,
    },
    store::{
        EntriesState,
        Notice,
        PendingOperation,
        PortalState,
        StateStore,
        WalletStatus,
    },
    view::{
        Intent,
        Screen,
    },
    wallet::{
        WalletError,
        WalletGateway,
        WalletSession,
    },
};

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("The portal is still reconnecting the wallet")]
    NotReady,
    #[error("Another operation is still in flight")]
    Busy,
    #[error("{0:?} isn't available right now")]
    Unavailable(Intent),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Operation(#[from] ProxyError),
}

pub struct Portal {
    gateway: WalletGateway,
    proxy: ProgramProxy,
    store: StateStore,
    session: RefCell<Option<WalletSession>>,
}

impl Portal {
    pub fn new(gateway: WalletGateway, proxy: ProgramProxy) -> Self {
        Self {
            gateway,
            proxy,
            store: StateStore::new(),
            session: RefCell::new(None),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn proxy(&self) -> &ProgramProxy {
        &self.proxy
    }

    pub fn state(&self) -> PortalState {
        self.store.snapshot()
    }

    pub fn screen(&self) -> Screen {
        Screen::from_state(&self.store.snapshot())
    }

    /// Page load: discover the wallet, reconnect silently if it trusts us, then fetch the entries.
    /// No intent is accepted before this completes.
    pub async fn load(&self) {
        match self.gateway.try_silent_reconnect().await {
            Ok(Some(session)) => {
                self.open_session(session);
                self.refresh().await;
            }
            Ok(None) => self.store.set_wallet(WalletStatus::Disconnected),
            Err(error) => {
                // A provider that's present but failed still leaves the connect button usable.
                if error != WalletError::NoWallet {
                    self.store.set_wallet(WalletStatus::Disconnected);
                }
                self.apply_wallet_error(&error);
            }
        }
        self.store.mark_ready();
    }

    /// Runs one user intent. Mutating intents hold the operation slot until the follow-up refresh
    /// has landed in the store.
    pub async fn dispatch(&self, intent: Intent) -> Result<(), PortalError> {
        let state = self.store.snapshot();
        if !state.ready {
            return Err(PortalError::NotReady);
        }
        if state.pending.is_some() {
            return Err(PortalError::Busy);
        }
        if !Screen::from_state(&state).allows(&intent) {
            return Err(PortalError::Unavailable(intent));
        }

        if let Intent::SetDraft(draft) = intent {
            self.store.set_draft(draft);
            return Ok(());
        }

        let operation = match &intent {
            Intent::Connect => PendingOperation::Connecting,
            Intent::Disconnect => PendingOperation::Disconnecting,
            Intent::Initialize => PendingOperation::Initializing,
            Intent::Submit => PendingOperation::Submitting,
            Intent::Upvote { link } => PendingOperation::Upvoting(link.clone()),
            Intent::Refresh | Intent::SetDraft(_) => PendingOperation::Refreshing,
        };
        if !self.store.try_begin(operation) {
            return Err(PortalError::Busy);
        }
        self.store.set_notice(None);

        let res = self.run(intent, state).await;
        self.store.finish();
        res
    }

    async fn run(&self, intent: Intent, state: PortalState) -> Result<(), PortalError> {
        match intent {
            Intent::Connect => self.connect().await,
            Intent::Disconnect => {
                self.disconnect().await;
                Ok(())
            }
            Intent::Refresh => {
                self.refresh().await;
                Ok(())
            }
            Intent::Initialize => self.initialize().await,
            Intent::Submit => self.submit(&state.draft).await,
            Intent::Upvote { link } => self.upvote(&link).await,
            Intent::SetDraft(_) => Ok(()),
        }
    }

    fn open_session(&self, session: WalletSession) {
        self.store
            .set_wallet(WalletStatus::Connected(session.public_key()));
        self.session.replace(Some(session));
    }

    fn close_session(&self) -> Option<WalletSession> {
        self.store.set_wallet(WalletStatus::Disconnected);
        self.session.take()
    }

    fn current_session(&self) -> Result<WalletSession, PortalError> {
        self.session
            .borrow()
            .clone()
            .ok_or(PortalError::Wallet(WalletError::NotConnected))
    }

    async fn connect(&self) -> Result<(), PortalError> {
        match self.gateway.connect_interactive().await {
            Ok(session) => {
                self.open_session(session);
                self.refresh().await;
                Ok(())
            }
            // The user said no; go back to the connect button without complaint.
            Err(WalletError::UserRejected) => {
                self.store.set_wallet(WalletStatus::Disconnected);
                Ok(())
            }
            Err(error) => {
                self.apply_wallet_error(&error);
                Err(error.into())
            }
        }
    }

    async fn disconnect(&self) {
        if let Some(session) = self.close_session() {
            self.gateway.disconnect(session).await;
        }
        self.store.set_draft("");
    }

    /// Re-reads the data account into the store.
    async fn refresh(&self) {
        match self.proxy.read_state().await {
            Ok(entries) => {
                log_info("Got the account", format!("{} entries", entries.len()));
                self.store.set_entries(EntriesState::Ready(entries));
            }
            Err(ProxyError::AccountMissing) => {
                log_info("Account", "The program account hasn't been initialized yet");
                self.store.set_entries(EntriesState::Missing);
            }
            Err(error @ ProxyError::DecodeFailed(_)) => {
                // Unreadable data isn't a missing account; the list view can't show it.
                self.apply_proxy_error(&error);
                self.store.set_entries(EntriesState::NotFetched);
            }
            Err(error) => self.apply_proxy_error(&error),
        }
    }

    async fn initialize(&self) -> Result<(), PortalError> {
        let session = self.current_session()?;
        match self.proxy.initialize(&session).await {
            Ok(_) => {
                self.refresh().await;
                Ok(())
            }
            Err(ProxyError::AlreadyInitialized) => {
                log_warning("Initialize", "The program account already exists");
                self.refresh().await;
                Ok(())
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    async fn submit(&self, draft: &str) -> Result<(), PortalError> {
        let session = self.current_session()?;
        match self.proxy.add_entry(&session, draft).await {
            Ok(_) => {
                self.store.set_draft("");
                self.refresh().await;
                Ok(())
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    async fn upvote(&self, link: &str) -> Result<(), PortalError> {
        let session = self.current_session()?;
        match self.proxy.upvote_entry(&session, link).await {
            Ok(_) => {
                self.refresh().await;
                Ok(())
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    fn fail(&self, error: ProxyError) -> PortalError {
        self.apply_proxy_error(&error);
        error.into()
    }

    fn apply_wallet_error(&self, error: &WalletError) {
        match error {
            WalletError::NoWallet => {
                self.store.set_wallet(WalletStatus::NoWallet);
                self.store.set_notice(Some(Notice::InstallWallet));
            }
            WalletError::UserRejected => {}
            WalletError::SessionMismatch { .. } | WalletError::NotConnected => {
                log_warning("Wallet", error);
                self.close_session();
                self.store
                    .set_notice(Some(Notice::Error("The wallet session ended; connect again.".into())));
            }
            WalletError::NotTrusted | WalletError::Signing(_) => {
                log_error("Wallet", error);
                self.store.set_notice(Some(Notice::Error(error.to_string())));
            }
        }
    }

    fn apply_proxy_error(&self, error: &ProxyError) {
        match error {
            ProxyError::EmptyInput => {
                log_warning("Submit", "No gif link given!");
                self.store
                    .set_notice(Some(Notice::Error("No gif link given!".into())));
            }
            ProxyError::AccountMissing => self.store.set_entries(EntriesState::Missing),
            ProxyError::NetworkUnavailable(msg) => {
                log_warning("Network unavailable", msg);
                self.store
                    .set_notice(Some(Notice::Error(format!("Network unavailable: {msg}"))));
            }
            ProxyError::RpcRejected { code, message } => {
                log_error("RPC rejected", format!("({code}) {message}"));
                self.store.set_notice(Some(Notice::Error(format!(
                    "Transaction failed ({code}): {message}"
                ))));
            }
            ProxyError::Wallet(WalletError::UserRejected) => {
                log_info("Wallet", "Transaction rejected by the user");
                self.store
                    .set_notice(Some(Notice::Info("Transaction rejected.".into())));
            }
            ProxyError::Wallet(wallet) => self.apply_wallet_error(wallet),
            error => {
                log_error(error.kind(), error);
                self.store.set_notice(Some(Notice::Error(error.to_string())));
            }
        }
    }
}
