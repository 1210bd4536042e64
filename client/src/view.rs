//! The view model. [`Screen`] is derived from a [`PortalState`] snapshot and lists exactly the
//! actions the current mode offers, each bound to the [`Intent`] it dispatches.

use std::fmt;

use colored::Colorize;
use gif_portal_interface::state::Entry;
use solana_sdk::pubkey::Pubkey;

use crate::{
    fmt_kv,
    store::{
        EntriesState,
        Notice,
        PortalState,
        WalletStatus,
    },
    LogColor,
};

pub const INSTALL_WALLET_URL: &str = "https://phantom.app/";

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ViewMode {
    Disconnected,
    ConnectedNoAccount,
    ConnectedWithList,
}

impl ViewMode {
    pub fn derive(state: &PortalState) -> Self {
        match (&state.wallet, &state.entries) {
            (WalletStatus::Connected(_), EntriesState::Missing) => Self::ConnectedNoAccount,
            (WalletStatus::Connected(_), _) => Self::ConnectedWithList,
            _ => Self::Disconnected,
        }
    }
}

/// A user action, dispatched by the view to the portal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Connect,
    Disconnect,
    Initialize,
    SetDraft(String),
    Submit,
    Upvote { link: String },
    Refresh,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub intent: Intent,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    Text(String),
    Input {
        placeholder: &'static str,
        value: String,
        enabled: bool,
    },
    Action(Action),
    Entry { entry: Entry, upvote: Action },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    pub mode: ViewMode,
    pub wallet: Option<Pubkey>,
    pub status: Option<String>,
    pub notice: Option<Notice>,
    pub elements: Vec<Element>,
}

impl Screen {
    pub fn from_state(state: &PortalState) -> Self {
        let mode = ViewMode::derive(state);
        // Nothing is actionable until page-load reconnect finished or while an operation runs.
        let idle = state.ready && state.pending.is_none();
        let action = |label: &str, intent: Intent, enabled: bool| Action {
            label: label.to_string(),
            intent,
            enabled: idle && enabled,
        };

        let mut elements = vec![];
        match mode {
            ViewMode::Disconnected => match state.wallet {
                WalletStatus::NoWallet => elements.push(Element::Text(format!(
                    "Solana object not found! Get a Phantom Wallet at {INSTALL_WALLET_URL}"
                ))),
                _ => elements.push(Element::Action(action(
                    "Connect to Wallet",
                    Intent::Connect,
                    matches!(state.wallet, WalletStatus::Disconnected),
                ))),
            },
            ViewMode::ConnectedNoAccount => {
                elements.push(Element::Action(action(
                    "Do One-Time Initialization For GIF Program Account",
                    Intent::Initialize,
                    true,
                )));
                elements.push(Element::Action(action("Refresh", Intent::Refresh, true)));
                elements.push(Element::Action(action("Disconnect", Intent::Disconnect, true)));
            }
            ViewMode::ConnectedWithList => {
                let fetched = matches!(state.entries, EntriesState::Ready(_));
                elements.push(Element::Input {
                    placeholder: "Enter gif link!",
                    value: state.draft.clone(),
                    enabled: idle,
                });
                elements.push(Element::Action(action("Submit", Intent::Submit, fetched)));
                if let EntriesState::Ready(entries) = &state.entries {
                    elements.extend(entries.iter().map(|entry| Element::Entry {
                        entry: entry.clone(),
                        upvote: action(
                            "Upvote",
                            Intent::Upvote {
                                link: entry.gif_link.clone(),
                            },
                            true,
                        ),
                    }));
                } else {
                    elements.push(Element::Text("Entries haven't been loaded.".into()));
                }
                elements.push(Element::Action(action("Refresh", Intent::Refresh, true)));
                elements.push(Element::Action(action("Disconnect", Intent::Disconnect, true)));
            }
        }

        Self {
            mode,
            wallet: state.connected_key(),
            status: state.pending.as_ref().map(ToString::to_string),
            notice: state.notice.clone(),
            elements,
        }
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.elements.iter().filter_map(|element| match element {
            Element::Action(action) => Some(action),
            Element::Entry { upvote, .. } => Some(upvote),
            _ => None,
        })
    }

    /// Whether the screen currently offers `intent` through an enabled control.
    pub fn allows(&self, intent: &Intent) -> bool {
        match intent {
            Intent::SetDraft(_) => self
                .elements
                .iter()
                .any(|e| matches!(e, Element::Input { enabled: true, .. })),
            intent => self.actions().any(|a| a.enabled && &a.intent == intent),
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "GIF Portal".color(LogColor::Header).bold())?;
        writeln!(f, "{}", fmt_kv!("mode", self.mode))?;
        if let Some(wallet) = &self.wallet {
            writeln!(f, "{}", fmt_kv!("wallet", wallet))?;
        }
        if let Some(status) = &self.status {
            writeln!(f, "{}", fmt_kv!("status", format!("{status}..."), LogColor::Warning))?;
        }
        match &self.notice {
            Some(Notice::Info(msg)) => writeln!(f, "{}", msg.color(LogColor::Info))?,
            Some(Notice::Error(msg)) => writeln!(f, "{}", msg.color(LogColor::Error))?,
            Some(Notice::InstallWallet) | None => {}
        }

        for element in &self.elements {
            match element {
                Element::Text(text) => writeln!(f, "  {}", text.color(LogColor::Warning))?,
                Element::Input {
                    placeholder,
                    value,
                    enabled,
                } => {
                    let shown = if value.is_empty() {
                        placeholder.color(LogColor::Gray).italic()
                    } else {
                        value.normal()
                    };
                    writeln!(f, "  [{shown}]{}", disabled_suffix(*enabled))?;
                }
                Element::Action(action) => writeln!(f, "  {}", fmt_action(action))?,
                Element::Entry { entry, upvote } => {
                    writeln!(f, "  {}", entry.gif_link.color(LogColor::Highlight))?;
                    writeln!(
                        f,
                        "    {}  {}  {}",
                        fmt_kv!("submitted by", entry.user_address, LogColor::Gray),
                        fmt_kv!("likes", entry.likes, LogColor::Gray),
                        fmt_action(upvote)
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn fmt_action(action: &Action) -> String {
    let label = format!("<{}>", action.label);
    if action.enabled {
        label.color(LogColor::Label).bold().to_string()
    } else {
        format!("{}{}", label.color(LogColor::Gray), disabled_suffix(false))
    }
}

fn disabled_suffix(enabled: bool) -> &'static str {
    if enabled {
        ""
    } else {
        " (disabled)"
    }
}
