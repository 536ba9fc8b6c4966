//! Settlement Engine
//!
//! Resolves open bets once a confession's ground truth is known. A
//! successful reveal establishes the confession as real. Settlement only
//! records outcomes; moving funds is the ledger platform's concern.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::types::{Address, Bet, BetOutcome, ConfessionId};

/// Ground truth established by a successful reveal.
pub const REVEAL_MEANS_REAL: bool = true;

/// Outcome of one bet against the ground truth.
pub fn outcome_for(bet_real: bool, confession_real: bool) -> BetOutcome {
    if bet_real == confession_real {
        BetOutcome::Won
    } else {
        BetOutcome::Lost
    }
}

/// What a settlement pass changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Bets settled by this pass, in input order.
    pub settled: Vec<(Address, BetOutcome)>,
    /// Bets on the confession that were already settled and left alone.
    pub skipped: usize,
}

impl SettlementReport {
    /// Winners in this pass.
    pub fn winners(&self) -> impl Iterator<Item = &Address> {
        self.settled
            .iter()
            .filter(|(_, o)| *o == BetOutcome::Won)
            .map(|(a, _)| a)
    }
}

/// Settle every open bet on `confession_id`.
///
/// Idempotent: settled bets are skipped, so a second pass changes nothing
/// and reports nothing new.
pub fn settle_bets<'a, I>(bets: I, confession_id: ConfessionId, confession_real: bool) -> SettlementReport
where
    I: IntoIterator<Item = &'a mut Bet>,
{
    let mut report = SettlementReport::default();

    for bet in bets.into_iter().filter(|b| b.confession_id == confession_id) {
        if bet.settled {
            report.skipped += 1;
            continue;
        }

        let outcome = outcome_for(bet.bet_real, confession_real);
        bet.settled = true;
        bet.outcome = Some(outcome);
        report.settled.push((bet.bettor.clone(), outcome));
    }

    debug!(
        confession_id,
        settled = report.settled.len(),
        skipped = report.skipped,
        "settlement pass"
    );
    report
}
