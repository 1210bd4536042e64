//! A fully wired portal running against a [`LocalChain`], for integration tests.

use std::sync::Arc;

use anyhow::Context;
use gif_portal_interface::{
    idl::{
        encode_account,
        IdlValue,
    },
    state::{
        BaseAccountView,
        Entry,
        EntryList,
        BASE_ACCOUNT,
        BASE_ACCOUNT_SPACE,
    },
    ProgramIdentity,
};
use solana_account::Account;
use solana_sdk::{
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
};

use super::{
    rent_exempt_minimum,
    LocalChain,
};
use crate::{
    chain::{
        ChainClient,
        SendTransactionConfig,
    },
    keypair_asset,
    network::NetworkConfig,
    portal::Portal,
    proxy::ProgramProxy,
    test_accounts::wallet_alice,
    wallet::{
        FixedApproval,
        InjectedWallet,
        KeypairWallet,
        StaticHost,
        WalletConfig,
        WalletGateway,
        WalletSession,
    },
};

pub const TEST_ORIGIN: &str = "https://gif-portal.test";
pub const DEFAULT_FUND_AMOUNT: u64 = 10_000_000_000;

pub struct PortalFixtureBuilder {
    keypair: Option<Keypair>,
    provider: Option<Arc<dyn InjectedWallet>>,
    trusted: bool,
    advertise_flag: bool,
    approve: bool,
    fund: u64,
}

impl Default for PortalFixtureBuilder {
    fn default() -> Self {
        Self {
            keypair: Some(wallet_alice().insecure_clone()),
            provider: None,
            trusted: false,
            advertise_flag: true,
            approve: true,
            fund: DEFAULT_FUND_AMOUNT,
        }
    }
}

impl PortalFixtureBuilder {
    pub fn wallet(mut self, keypair: &Keypair) -> Self {
        self.keypair = Some(keypair.insecure_clone());
        self
    }

    /// Nothing is injected into the host page.
    pub fn no_wallet(mut self) -> Self {
        self.keypair = None;
        self
    }

    /// Injects `provider` in place of the keypair wallet.
    pub fn provider(mut self, provider: Arc<dyn InjectedWallet>) -> Self {
        self.keypair = None;
        self.provider = Some(provider);
        self
    }

    /// The wallet has approved the test origin in an earlier session.
    pub fn trusted(mut self) -> Self {
        self.trusted = true;
        self
    }

    /// A provider is injected but doesn't advertise the capability marker.
    pub fn without_capability_flag(mut self) -> Self {
        self.advertise_flag = false;
        self
    }

    /// The user rejects every wallet prompt.
    pub fn rejecting(mut self) -> Self {
        self.approve = false;
        self
    }

    pub fn fund(mut self, lamports: u64) -> Self {
        self.fund = lamports;
        self
    }

    pub fn build(self) -> anyhow::Result<PortalFixture> {
        let program = ProgramIdentity::bundled()?;
        let chain = Arc::new(LocalChain::new(program.clone()));
        let prompt = Arc::new(if self.approve {
            FixedApproval::approve_all()
        } else {
            FixedApproval::reject_all()
        });
        let config = WalletConfig::default();

        let mut host = StaticHost::new(TEST_ORIGIN);
        let wallet = self.keypair.map(|keypair| {
            chain.airdrop(&keypair.pubkey(), self.fund);
            let mut wallet = KeypairWallet::new(keypair, prompt.clone());
            if self.advertise_flag {
                wallet = wallet.with_flag(config.capability_flag.clone());
            }
            if self.trusted {
                wallet = wallet.with_trusted_origin(TEST_ORIGIN);
            }
            Arc::new(wallet)
        });
        if let Some(wallet) = &wallet {
            host = host.with_global(config.global_name.clone(), wallet.clone());
        }
        if let Some(provider) = self.provider {
            host = host.with_global(config.global_name.clone(), provider);
        }
        let host = Arc::new(host);

        let client = ChainClient::with_config(
            chain.clone(),
            NetworkConfig::default(),
            program,
            SendTransactionConfig {
                debug_logs: Some(false),
            },
        );
        let proxy = ProgramProxy::new(client, keypair_asset::embedded()?);
        let portal = Portal::new(WalletGateway::new(host.clone(), config.clone()), proxy);

        Ok(PortalFixture {
            chain,
            prompt,
            wallet,
            host,
            config,
            portal,
        })
    }
}

pub struct PortalFixture {
    pub chain: Arc<LocalChain>,
    pub prompt: Arc<FixedApproval>,
    pub wallet: Option<Arc<KeypairWallet>>,
    host: Arc<StaticHost>,
    config: WalletConfig,
    pub portal: Portal,
}

impl PortalFixture {
    pub fn builder() -> PortalFixtureBuilder {
        PortalFixtureBuilder::default()
    }

    pub fn proxy(&self) -> &ProgramProxy {
        self.portal.proxy()
    }

    pub fn data_account(&self) -> Pubkey {
        self.proxy().data_account()
    }

    pub fn wallet_pubkey(&self) -> anyhow::Result<Pubkey> {
        self.wallet
            .as_ref()
            .map(|w| w.pubkey())
            .context("The fixture has no wallet")
    }

    /// A second gateway onto the same host, for driving the proxy without the portal.
    pub fn gateway(&self) -> WalletGateway {
        WalletGateway::new(self.host.clone(), self.config.clone())
    }

    /// Connects interactively through a fresh gateway.
    pub async fn connect_session(&self) -> anyhow::Result<WalletSession> {
        Ok(self.gateway().connect_interactive().await?)
    }

    /// Writes an initialized data account holding `entries` straight into the chain.
    pub fn seed_entries(&self, entries: EntryList) -> anyhow::Result<()> {
        let program = self.proxy().chain().program();
        let view = BaseAccountView {
            total_entries: entries.len() as u64,
            entries,
        };
        let mut data = encode_account(&program.idl, BASE_ACCOUNT, &IdlValue::from(&view))?;
        data.resize(BASE_ACCOUNT_SPACE, 0);
        self.chain.set_account(
            self.data_account(),
            Account {
                lamports: rent_exempt_minimum(BASE_ACCOUNT_SPACE),
                data,
                owner: program.id,
                executable: false,
                rent_epoch: 0,
            },
        );
        Ok(())
    }

    /// The entries as the program sees them, bypassing the client.
    pub fn chain_entries(&self) -> Option<Vec<Entry>> {
        self.chain
            .base_account(&self.data_account())
            .map(|view| view.entries)
    }
}
