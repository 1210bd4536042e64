use gif_portal_client::{
    local_chain::{
        fixture::PortalFixture,
        LAMPORTS_PER_SIGNATURE,
    },
    portal::PortalError,
    proxy::ProxyError,
    store::EntriesState,
    view::{
        Intent,
        ViewMode,
    },
};
use gif_portal_interface::state::Entry;
use solana_sdk::pubkey::Pubkey;

#[tokio::test]
async fn first_run_bootstrap() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().build()?;
    let portal = &fixture.portal;

    portal.load().await;
    let mut modes = vec![portal.screen().mode];

    portal.dispatch(Intent::Connect).await?;
    modes.push(portal.screen().mode);

    portal.dispatch(Intent::Initialize).await?;
    modes.push(portal.screen().mode);

    assert_eq!(
        modes,
        [
            ViewMode::Disconnected,
            ViewMode::ConnectedNoAccount,
            ViewMode::ConnectedWithList
        ]
    );
    assert_eq!(portal.state().entries, EntriesState::Ready(vec![]));
    assert_eq!(fixture.chain_entries(), Some(vec![]));

    Ok(())
}

#[tokio::test]
async fn read_state_reports_missing_account_until_initialized() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().build()?;
    let session = fixture.connect_session().await?;
    let proxy = fixture.proxy();

    assert!(matches!(
        proxy.read_state().await,
        Err(ProxyError::AccountMissing)
    ));
    proxy.initialize(&session).await?;
    assert_eq!(proxy.read_state().await?, vec![]);

    Ok(())
}

#[tokio::test]
async fn second_initialize_is_already_initialized() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().build()?;
    let session = fixture.connect_session().await?;
    let proxy = fixture.proxy();

    proxy.initialize(&session).await?;
    proxy
        .add_entry(&session, "https://example.com/a.gif")
        .await?;
    let before = proxy.read_state().await?;

    let err = proxy.initialize(&session).await.unwrap_err();
    assert_eq!(err.kind(), "already_initialized");
    assert_eq!(proxy.read_state().await?, before);

    Ok(())
}

#[tokio::test]
async fn initialize_by_another_client_lands_in_list_mode() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().trusted().build()?;
    let portal = &fixture.portal;

    portal.load().await;
    assert_eq!(portal.screen().mode, ViewMode::ConnectedNoAccount);

    // Someone else initializes and posts before this client acts on its stale view.
    let entry = Entry {
        gif_link: "https://example.com/early.gif".into(),
        user_address: Pubkey::new_unique(),
        likes: 4,
    };
    fixture.seed_entries(vec![entry.clone()])?;

    portal.dispatch(Intent::Initialize).await?;
    assert_eq!(portal.screen().mode, ViewMode::ConnectedWithList);
    assert_eq!(portal.state().entries, EntriesState::Ready(vec![entry]));

    Ok(())
}

#[tokio::test]
async fn initialize_without_rent_is_insufficient_funds() -> anyhow::Result<()> {
    // Enough for the two signatures, nowhere near the rent for the data account.
    let fixture = PortalFixture::builder()
        .fund(4 * LAMPORTS_PER_SIGNATURE)
        .trusted()
        .build()?;
    let portal = &fixture.portal;
    portal.load().await;

    let err = portal.dispatch(Intent::Initialize).await.unwrap_err();
    assert!(matches!(
        err,
        PortalError::Operation(ProxyError::InsufficientFunds)
    ));
    assert_eq!(portal.screen().mode, ViewMode::ConnectedNoAccount);
    assert!(fixture.chain.account(&fixture.data_account()).is_none());

    Ok(())
}

#[tokio::test]
async fn unfunded_wallet_cannot_pay_fees() -> anyhow::Result<()> {
    let fixture = PortalFixture::builder().fund(0).build()?;
    let session = fixture.connect_session().await?;

    let err = fixture.proxy().initialize(&session).await.unwrap_err();
    assert!(matches!(err, ProxyError::InsufficientFunds));

    Ok(())
}
