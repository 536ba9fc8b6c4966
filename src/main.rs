//! Confession Box Demo
//!
//! Runs the full protocol against an in-process ledger: registration,
//! anonymous submission, double-submission rejection, votes, bets, reveal
//! with settlement, and a rejected reveal by the wrong player.

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use confession_box::{
    client::{ClientError, RetryingLedger},
    core::SystemClock,
    ledger::{ConfessionFilter, ConfessionStatus},
    Address, ConfessionClient, ConfessionRegistry, InMemoryContentStore, InMemoryLedger,
    LedgerClient, ProtocolConfig, VoteType, VERSION,
};

#[cfg(feature = "debug-tracing")]
const DEFAULT_FILTER: &str = "debug";
#[cfg(not(feature = "debug-tracing"))]
const DEFAULT_FILTER: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let config = ProtocolConfig::from_env();
    info!("Confession Box v{}", VERSION);
    info!(
        "Period: {}s, page cap: {}, comment cap: {}",
        config.period_secs, config.max_page_size, config.max_comment_len
    );

    demo(config).await
}

/// Walk through one round of the protocol.
async fn demo(config: ProtocolConfig) -> anyhow::Result<()> {
    info!("=== Starting Demo Round ===");

    let retry = config.retry.clone();
    let registry = ConfessionRegistry::initialize(Address::new("GADMIN"), config, Arc::new(SystemClock));
    let ledger = RetryingLedger::new(InMemoryLedger::new(registry), retry);

    let mut alice = ConfessionClient::new(ledger.clone(), InMemoryContentStore::new(), Address::new("GALICE"));
    let mut mallory = ConfessionClient::new(ledger.clone(), InMemoryContentStore::new(), Address::new("GMALLORY"));
    let bob = ConfessionClient::new(ledger.clone(), InMemoryContentStore::new(), Address::new("GBOB"));
    let carol = ConfessionClient::new(ledger.clone(), InMemoryContentStore::new(), Address::new("GCAROL"));

    mallory.register_if_needed().await?;

    let id = alice
        .submit_confession("I have never actually read the terms and conditions.")
        .await?;
    info!("Alice submitted confession #{}", id);

    match alice.submit_confession("Also, I skip the ads.").await {
        Err(ClientError::Ledger(e)) if e.protocol().is_some() => {
            info!("Second submission this period rejected: {}", e);
        }
        Err(e) => return Err(e.into()),
        Ok(other) => bail!("double submission accepted as #{}", other),
    }

    bob.vote(id, VoteType::Relatable).await?;
    carol.vote(id, VoteType::Fake).await?;
    bob.place_bet(id, true, 100).await?;
    carol.place_bet(id, false, 40).await?;
    bob.add_comment(id, "same").await?;

    match mallory.reveal_authorship(id).await {
        Err(e) => info!("Mallory's reveal rejected: {}", e),
        Ok(_) => bail!("reveal by the wrong player accepted"),
    }

    let report = alice.reveal_authorship(id).await?;
    for (bettor, outcome) in &report.settled {
        info!("Bet by {} settled: {:?}", bettor, outcome);
    }

    // Print final results
    info!("=== Round Results ===");
    let confession = ledger
        .get_confession(id)
        .await?
        .context("revealed confession missing")?;
    info!("{}", serde_json::to_string_pretty(&confession)?);

    let revealed = ledger
        .query(ConfessionFilter {
            status: Some(ConfessionStatus::Revealed),
            ..Default::default()
        })
        .await?;
    info!("Revealed confessions: {}", revealed.len());

    match ledger.get_player(Address::new("GALICE")).await? {
        Some(profile) => info!(
            "Alice: {} confessions, reputation {}",
            profile.total_confessions, profile.reputation_score
        ),
        None => warn!("Alice has no profile"),
    }

    for item in alice.feed(ConfessionFilter::default()).await? {
        info!(
            "#{} [{:?}] {}",
            item.confession.id,
            item.confession.status(),
            item.text.unwrap_or_else(|| "<text unavailable>".into())
        );
    }

    Ok(())
}
