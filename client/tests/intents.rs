use gif_portal_client::{
    chain::error::PREFLIGHT_FAILURE_CODE,
    local_chain::fixture::PortalFixture,
    portal::PortalError,
    proxy::ProxyError,
    store::{
        EntriesState,
        Notice,
    },
    view::{
        Intent,
        ViewMode,
    },
};
use gif_portal_interface::state::Entry;
use solana_account::Account;
use solana_sdk::pubkey::Pubkey;

const LINK: &str = "https://example.com/a.gif";

fn seeded_entry() -> Entry {
    Entry {
        gif_link: "https://example.com/seeded.gif".into(),
        user_address: Pubkey::new_unique(),
        likes: 0,
    }
}

#[tokio::test]
async fn intents_wait_for_page_load() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().build()?;

    assert!(matches!(
        fixture.portal.dispatch(Intent::Connect).await,
        Err(PortalError::NotReady)
    ));
    assert!(!fixture.portal.screen().allows(&Intent::Connect));

    fixture.portal.load().await;
    assert!(fixture.portal.screen().allows(&Intent::Connect));

    Ok(())
}

#[tokio::test]
async fn one_mutation_in_flight() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().trusted().build()?;
    fixture.seed_entries(vec![seeded_entry()])?;
    let portal = &fixture.portal;
    portal.load().await;
    portal.dispatch(Intent::SetDraft(LINK.into())).await?;

    let (first, second) = tokio::join!(
        portal.dispatch(Intent::Submit),
        portal.dispatch(Intent::Upvote {
            link: "https://example.com/seeded.gif".into()
        }),
    );

    first?;
    assert!(matches!(second, Err(PortalError::Busy)));
    assert_eq!(fixture.chain.transaction_count(), 1);

    let state = portal.state();
    assert_eq!(state.pending, None);
    let EntriesState::Ready(entries) = state.entries else {
        panic!("Expected a fetched list");
    };
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].likes, 0);

    Ok(())
}

#[tokio::test]
async fn successful_submit_clears_the_draft_and_refreshes() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().trusted().build()?;
    fixture.seed_entries(vec![])?;
    let portal = &fixture.portal;
    portal.load().await;

    portal.dispatch(Intent::SetDraft(LINK.into())).await?;
    portal.dispatch(Intent::Submit).await?;

    let state = portal.state();
    assert_eq!(state.draft, "");
    let EntriesState::Ready(entries) = state.entries else {
        panic!("Expected a fetched list");
    };
    assert_eq!(entries[0].gif_link, LINK);

    portal
        .dispatch(Intent::Upvote {
            link: LINK.into(),
        })
        .await?;
    let EntriesState::Ready(entries) = portal.state().entries else {
        panic!("Expected a fetched list");
    };
    assert_eq!(entries[0].likes, 1);

    Ok(())
}

#[tokio::test]
async fn empty_draft_is_rejected_locally() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().trusted().build()?;
    fixture.seed_entries(vec![])?;
    let portal = &fixture.portal;
    portal.load().await;
    let requests = fixture.chain.request_count();

    let err = portal.dispatch(Intent::Submit).await.unwrap_err();

    assert!(matches!(err, PortalError::Operation(ProxyError::EmptyInput)));
    assert_eq!(fixture.chain.request_count(), requests);
    assert_eq!(
        portal.state().notice,
        Some(Notice::Error("No gif link given!".into()))
    );

    Ok(())
}

#[tokio::test]
async fn network_outage_keeps_the_view_and_retries_on_next_action() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().trusted().build()?;
    let entry = seeded_entry();
    fixture.seed_entries(vec![entry.clone()])?;
    let portal = &fixture.portal;
    portal.load().await;

    fixture.chain.set_offline(true);
    portal.dispatch(Intent::SetDraft(LINK.into())).await?;
    let err = portal.dispatch(Intent::Submit).await.unwrap_err();
    assert!(matches!(
        err,
        PortalError::Operation(ProxyError::NetworkUnavailable(_))
    ));

    let state = portal.state();
    assert_eq!(portal.screen().mode, ViewMode::ConnectedWithList);
    assert_eq!(state.entries, EntriesState::Ready(vec![entry]));
    assert_eq!(state.draft, LINK);
    assert!(matches!(state.notice, Some(Notice::Error(_))));

    fixture.chain.set_offline(false);
    portal.dispatch(Intent::Submit).await?;
    assert_eq!(portal.state().draft, "");
    assert_eq!(fixture.chain_entries().map(|e| e.len()), Some(2));

    Ok(())
}

#[tokio::test]
async fn offline_page_load_offers_refresh() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().trusted().build()?;
    fixture.seed_entries(vec![seeded_entry()])?;
    fixture.chain.set_offline(true);
    let portal = &fixture.portal;
    portal.load().await;

    let screen = portal.screen();
    assert_eq!(screen.mode, ViewMode::ConnectedWithList);
    assert_eq!(portal.state().entries, EntriesState::NotFetched);
    assert!(!screen.allows(&Intent::Submit));
    assert!(screen.allows(&Intent::Refresh));

    fixture.chain.set_offline(false);
    portal.dispatch(Intent::Refresh).await?;
    assert!(portal.screen().allows(&Intent::Submit));

    Ok(())
}

#[tokio::test]
async fn rpc_rejection_is_reported_without_retry() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().trusted().build()?;
    let entry = seeded_entry();
    fixture.seed_entries(vec![entry.clone()])?;
    let portal = &fixture.portal;
    portal.load().await;

    // The account disappears behind the client's back, so the program refuses the upvote.
    fixture
        .chain
        .set_account(fixture.data_account(), Account::default());
    let requests = fixture.chain.request_count();

    let err = portal
        .dispatch(Intent::Upvote {
            link: entry.gif_link.clone(),
        })
        .await
        .unwrap_err();

    let PortalError::Operation(ProxyError::RpcRejected { code, .. }) = err else {
        panic!("Expected an RPC rejection, got {err:?}");
    };
    assert_eq!(code, PREFLIGHT_FAILURE_CODE);
    // One blockhash request and one send; nothing retried.
    assert_eq!(fixture.chain.request_count(), requests + 2);
    assert!(matches!(portal.state().notice, Some(Notice::Error(msg)) if msg.contains("-32002")));
    assert_eq!(portal.state().entries, EntriesState::Ready(vec![entry]));

    Ok(())
}

#[tokio::test]
async fn upvote_of_unknown_link_is_unavailable() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().trusted().build()?;
    fixture.seed_entries(vec![seeded_entry()])?;
    let portal = &fixture.portal;
    portal.load().await;

    let err = portal
        .dispatch(Intent::Upvote {
            link: "https://example.com/nope.gif".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Unavailable(_)));
    assert_eq!(fixture.chain.transaction_count(), 0);

    Ok(())
}
