//! The state store: the connected wallet and the last known entry list, published to subscribers
//! through a watch channel.

use std::fmt;

use gif_portal_interface::state::EntryList;
use solana_sdk::pubkey::Pubkey;
use tokio::sync::watch;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum WalletStatus {
    /// Page-load reconnect hasn't finished.
    #[default]
    Detecting,
    NoWallet,
    Disconnected,
    Connected(Pubkey),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EntriesState {
    #[default]
    NotFetched,
    /// The data account hasn't been initialized.
    Missing,
    Ready(EntryList),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingOperation {
    Connecting,
    Initializing,
    Submitting,
    Upvoting(String),
    Refreshing,
    Disconnecting,
}

impl fmt::Display for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => f.write_str("Connecting"),
            Self::Initializing => f.write_str("Initializing"),
            Self::Submitting => f.write_str("Submitting"),
            Self::Upvoting(link) => write!(f, "Upvoting {link}"),
            Self::Refreshing => f.write_str("Refreshing"),
            Self::Disconnecting => f.write_str("Disconnecting"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
    /// No wallet was found; stays up until the page reloads.
    InstallWallet,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortalState {
    pub wallet: WalletStatus,
    pub entries: EntriesState,
    pub draft: String,
    pub pending: Option<PendingOperation>,
    pub notice: Option<Notice>,
    /// Set once page-load reconnect has completed or failed.
    pub ready: bool,
}

impl PortalState {
    pub fn connected_key(&self) -> Option<Pubkey> {
        match self.wallet {
            WalletStatus::Connected(key) => Some(key),
            _ => None,
        }
    }
}

pub struct StateStore {
    tx: watch::Sender<PortalState>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(PortalState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PortalState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> PortalState {
        self.tx.borrow().clone()
    }

    /// Applies `f` and notifies subscribers only if the state actually changed.
    pub fn update(&self, f: impl FnOnce(&mut PortalState)) -> bool {
        self.tx.send_if_modified(|state| {
            let before = state.clone();
            f(state);
            *state != before
        })
    }

    pub fn set_wallet(&self, wallet: WalletStatus) {
        self.update(|s| {
            if !matches!(wallet, WalletStatus::Connected(_)) {
                s.entries = EntriesState::NotFetched;
            }
            s.wallet = wallet;
        });
    }

    pub fn set_entries(&self, entries: EntriesState) {
        self.update(|s| s.entries = entries);
    }

    pub fn set_draft(&self, draft: impl Into<String>) {
        let draft = draft.into();
        self.update(|s| s.draft = draft);
    }

    pub fn set_notice(&self, notice: Option<Notice>) {
        self.update(|s| {
            // The install message outlives every other notice.
            if s.notice != Some(Notice::InstallWallet) {
                s.notice = notice;
            }
        });
    }

    pub fn mark_ready(&self) {
        self.update(|s| s.ready = true);
    }

    /// Claims the single operation slot. Returns `false` if another operation holds it.
    pub fn try_begin(&self, operation: PendingOperation) -> bool {
        let mut claimed = false;
        self.update(|s| {
            if s.pending.is_none() {
                s.pending = Some(operation);
                claimed = true;
            }
        });
        claimed
    }

    pub fn finish(&self) {
        self.update(|s| s.pending = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_updates_dont_notify() {
        let store = StateStore::new();
        let mut rx = store.subscribe();

        store.set_draft("");
        assert!(!rx.has_changed().unwrap());

        store.set_draft("https://example.com/a.gif");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().draft, "https://example.com/a.gif");
    }

    #[test]
    fn only_one_operation_at_a_time() {
        let store = StateStore::new();
        assert!(store.try_begin(PendingOperation::Submitting));
        assert!(!store.try_begin(PendingOperation::Refreshing));
        store.finish();
        assert!(store.try_begin(PendingOperation::Refreshing));
    }

    #[test]
    fn leaving_connected_forgets_entries() {
        let store = StateStore::new();
        store.set_wallet(WalletStatus::Connected(Pubkey::new_unique()));
        store.set_entries(EntriesState::Ready(vec![]));
        store.set_wallet(WalletStatus::Disconnected);
        assert_eq!(store.snapshot().entries, EntriesState::NotFetched);
    }

    #[test]
    fn install_message_persists() {
        let store = StateStore::new();
        store.set_notice(Some(Notice::InstallWallet));
        store.set_notice(None);
        assert_eq!(store.snapshot().notice, Some(Notice::InstallWallet));
    }
}
