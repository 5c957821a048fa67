#![deny(warnings)]

//! Aggregate reporting over member financial snapshots.
//!
//! Everything here is a pure function of its inputs: group-wide totals
//! with a per-tier breakdown, the thin group-savings projection, the
//! derived game investment, and a forward earnings projection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{MemberSnapshot, MemberStatus, TierId};
use sim_interest::{default_game_return_rate, game_return, InterestError};
use std::collections::BTreeMap;

/// Per-tier accumulation row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TierTotals {
    pub count: usize,
    pub principal: Decimal,
    pub interest: Decimal,
    pub total: Decimal,
}

/// Group-wide savings report for the active members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavingsSummary {
    pub total_saved: Decimal,
    pub total_interest: Decimal,
    pub total_amount: Decimal,
    /// All three tiers are always present, zero rows included.
    pub tier_breakdown: BTreeMap<TierId, TierTotals>,
    /// `total_interest / total_saved * 100`, or zero for an empty group.
    pub return_on_investment: Decimal,
}

/// Thin re-projection of the summary for the group dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSavings {
    pub total_principal: Decimal,
    pub total_interest: Decimal,
    pub total_amount: Decimal,
    /// Number of active members.
    pub member_count: usize,
    pub current_week: u32,
    pub gameplay_return_rate: Decimal,
}

/// Notional secondary investment of the group total at a fixed rate.
/// Always recomputed from live snapshots, never stored as authoritative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameInvestment {
    pub invested_amount: Decimal,
    pub return_rate_percent: Decimal,
    pub expected_return: Decimal,
}

impl GameInvestment {
    /// State before any money enters the pool.
    pub fn initial() -> Self {
        Self {
            invested_amount: Decimal::ZERO,
            return_rate_percent: default_game_return_rate(),
            expected_return: Decimal::ZERO,
        }
    }
}

/// Forward projection of group earnings over future weeks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectedEarnings {
    pub principal: Decimal,
    pub interest: Decimal,
    pub total: Decimal,
    pub game_return: Decimal,
    pub grand_total: Decimal,
}

/// Group-wide totals over the active snapshots, with per-tier breakdown
/// and return on investment.
pub fn summarize(snapshots: &[MemberSnapshot]) -> SavingsSummary {
    let mut tier_breakdown: BTreeMap<TierId, TierTotals> = TierId::ALL
        .iter()
        .map(|&tier| (tier, TierTotals::default()))
        .collect();

    let mut total_saved = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut total_amount = Decimal::ZERO;

    for snap in snapshots
        .iter()
        .filter(|s| s.status == MemberStatus::Active)
    {
        total_saved += snap.principal;
        total_interest += snap.interest_earned;
        total_amount += snap.total_amount;

        let row = tier_breakdown.entry(snap.tier).or_default();
        row.count += 1;
        row.principal += snap.principal;
        row.interest += snap.interest_earned;
        row.total += snap.total_amount;
    }

    let return_on_investment = if total_saved > Decimal::ZERO {
        total_interest / total_saved * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    SavingsSummary {
        total_saved,
        total_interest,
        total_amount,
        tier_breakdown,
        return_on_investment,
    }
}

/// Group savings at `current_week`, re-projected from [`summarize`].
pub fn group_savings(snapshots: &[MemberSnapshot], current_week: u32) -> GroupSavings {
    let summary = summarize(snapshots);
    let member_count = snapshots
        .iter()
        .filter(|s| s.status == MemberStatus::Active)
        .count();
    GroupSavings {
        total_principal: summary.total_saved,
        total_interest: summary.total_interest,
        total_amount: summary.total_amount,
        member_count,
        current_week,
        gameplay_return_rate: default_game_return_rate(),
    }
}

/// Game investment derived from the current group total.
pub fn game_investment(snapshots: &[MemberSnapshot]) -> Result<GameInvestment, InterestError> {
    let rate = default_game_return_rate();
    let invested = summarize(snapshots).total_amount;
    Ok(GameInvestment {
        invested_amount: invested,
        return_rate_percent: rate,
        expected_return: game_return(invested, rate)?,
    })
}

/// Projected earnings on `principal` over `weeks` future weeks, plus the
/// game return on the projected total. Uses a flat 10% weekly rate as a
/// stand-in for the blended tier rate.
pub fn projected_earnings(
    principal: Decimal,
    weeks: u32,
    game_rate_percent: Decimal,
) -> Result<ProjectedEarnings, InterestError> {
    if principal < Decimal::ZERO {
        return Err(InterestError::NegativeAmount);
    }
    let blended_rate = Decimal::new(10, 0);
    let interest = principal * blended_rate / Decimal::ONE_HUNDRED * Decimal::from(weeks);
    let total = principal + interest;
    let game = game_return(total, game_rate_percent)?;
    Ok(ProjectedEarnings {
        principal,
        interest,
        total,
        game_return: game,
        grand_total: total + game,
    })
}
