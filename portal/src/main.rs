//! Terminal host for the GIF portal: wires the wallet, chain client and program proxy together,
//! renders the view after every change and reads intents from stdin.

use std::sync::Arc;

use clap::Parser;
use gif_portal_client::{
    chain::{
        ChainClient,
        SolanaRpc,
    },
    logs::{
        log_error,
        set_quiet,
    },
    portal::{
        Portal,
        PortalError,
    },
    print_kv,
    proxy::ProgramProxy,
    store::{
        EntriesState,
        PortalState,
    },
    view::Intent,
    wallet::{
        ApprovalPrompt,
        FixedApproval,
        KeypairWallet,
        StaticHost,
        WalletConfig,
        WalletGateway,
    },
    LogColor,
};
use tokio::sync::watch;

use crate::{
    cli::Cli,
    commands::{
        parse_command,
        Command,
        HELP,
    },
    prompt::{
        spawn_stdin_reader,
        TerminalPrompt,
    },
};

mod cli;
mod commands;
mod prompt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().resolve()?;
    set_quiet(config.quiet);

    let lines = spawn_stdin_reader();
    let prompt: Arc<dyn ApprovalPrompt> = if config.auto_approve {
        Arc::new(FixedApproval::approve_all())
    } else {
        Arc::new(TerminalPrompt::new(lines.clone()))
    };

    let wallet_config = WalletConfig::default();
    let mut wallet = KeypairWallet::from_file(&config.wallet_path, prompt)?
        .with_flag(wallet_config.capability_flag.clone());
    if config.trusted {
        wallet = wallet.with_trusted_origin(config.origin.clone());
    }
    let host = StaticHost::new(config.origin.clone())
        .with_global(wallet_config.global_name.clone(), Arc::new(wallet));

    let rpc = match &config.rpc_url {
        Some(url) => SolanaRpc::with_url(url.clone(), &config.network),
        None => SolanaRpc::new(&config.network),
    };
    print_kv!("RPC", rpc.url());
    print_kv!("Program", config.program.id);

    let chain = ChainClient::new(Arc::new(rpc), config.network.clone(), config.program.clone());
    let portal = Portal::new(
        WalletGateway::new(Arc::new(host), wallet_config),
        ProgramProxy::new(chain, config.data_account),
    );

    let mut rx = portal.store().subscribe();
    portal.load().await;
    rx.borrow_and_update();
    println!("{}\n{HELP}", portal.screen());

    loop {
        let line = lines.lock().await.recv().await;
        let Some(line) = line else { break };

        let intents = match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => {
                println!("{HELP}");
                continue;
            }
            Ok(Command::Show) => vec![],
            Ok(Command::Intents(intents)) => intents,
            Ok(Command::UpvoteNth(n)) => match nth_link(&portal, n) {
                Some(link) => vec![Intent::Upvote { link }],
                None => {
                    log_error("Upvote", format!("There's no entry #{n}"));
                    continue;
                }
            },
            Err(e) => {
                log_error("Command", e);
                continue;
            }
        };

        for intent in intents {
            if let Err(e) = dispatch_with_status(&portal, &mut rx, intent).await {
                log_error("Intent", e);
                break;
            }
        }
        rx.borrow_and_update();
        println!("{}", portal.screen());
    }

    Ok(())
}

fn nth_link(portal: &Portal, n: usize) -> Option<String> {
    match portal.state().entries {
        EntriesState::Ready(entries) => entries.get(n - 1).map(|e| e.gif_link.clone()),
        _ => None,
    }
}

/// Dispatches `intent`, printing the pending operation whenever the store changes meanwhile.
async fn dispatch_with_status(
    portal: &Portal,
    rx: &mut watch::Receiver<PortalState>,
    intent: Intent,
) -> Result<(), PortalError> {
    let dispatch = portal.dispatch(intent);
    tokio::pin!(dispatch);

    loop {
        tokio::select! {
            res = &mut dispatch => return res,
            Ok(()) = rx.changed() => {
                let pending = rx.borrow_and_update().pending.clone();
                if let Some(operation) = pending {
                    let timestamp =
                        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, false);
                    print_kv!(format!("[{timestamp}]"), format!("{operation}..."), LogColor::Gray);
                }
            }
        }
    }
}
