#![deny(warnings)]

//! Interest math for the savings simulation.
//!
//! This module provides validated, pure helpers for:
//! - One week's interest at a tier's flat weekly rate
//! - Accumulated simple or compound interest over whole weeks
//! - The secondary game-investment return
//!
//! All amounts are `Decimal`; no rounding is applied here — formatting
//! and rounding belong to the presentation layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{EngineError, TierId};
use thiserror::Error;

/// Errors produced by interest helpers.
#[derive(Debug, Error, PartialEq)]
pub enum InterestError {
    /// Monetary inputs must be non-negative.
    #[error("negative amount is invalid")]
    NegativeAmount,
}

impl From<InterestError> for EngineError {
    fn from(e: InterestError) -> Self {
        match e {
            InterestError::NegativeAmount => EngineError::NegativeAmount,
        }
    }
}

/// Result of an interest computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterestBreakdown {
    pub principal: Decimal,
    pub interest_amount: Decimal,
    pub total_amount: Decimal,
    /// Weekly rate in percent that produced the interest.
    pub rate_percent: Decimal,
}

/// Default return rate (percent) of the game investment.
pub fn default_game_return_rate() -> Decimal {
    Decimal::new(20, 0)
}

/// One week's interest on `principal` at the tier's flat weekly rate.
///
/// Example:
/// let b = single_period_interest(TierId::One, Decimal::new(10_000, 0)).unwrap();
/// assert_eq!(b.interest_amount, Decimal::new(500, 0));
pub fn single_period_interest(
    tier: TierId,
    principal: Decimal,
) -> Result<InterestBreakdown, InterestError> {
    if principal < Decimal::ZERO {
        return Err(InterestError::NegativeAmount);
    }
    let rate = tier.weekly_rate_percent();
    let interest = principal * rate / Decimal::ONE_HUNDRED;
    Ok(InterestBreakdown {
        principal,
        interest_amount: interest,
        total_amount: principal + interest,
        rate_percent: rate,
    })
}

/// Accumulated interest on `principal` over `weeks` whole weeks.
///
/// Simple mode: `interest = principal * rate/100 * weeks`.
/// Compound mode: `total = principal * (1 + rate/100)^weeks`, computed by
/// iterated `Decimal` multiplication so results stay exact.
/// Zero weeks yields zero interest and `total == principal`.
pub fn accumulated_interest(
    tier: TierId,
    principal: Decimal,
    weeks: u32,
    compound: bool,
) -> Result<InterestBreakdown, InterestError> {
    if principal < Decimal::ZERO {
        return Err(InterestError::NegativeAmount);
    }
    let rate = tier.weekly_rate_percent();

    let (interest, total) = if compound {
        let factor = Decimal::ONE + rate / Decimal::ONE_HUNDRED;
        let mut total = principal;
        for _ in 0..weeks {
            total *= factor;
        }
        (total - principal, total)
    } else {
        let interest = principal * rate / Decimal::ONE_HUNDRED * Decimal::from(weeks);
        (interest, principal + interest)
    };

    Ok(InterestBreakdown {
        principal,
        interest_amount: interest,
        total_amount: total,
        rate_percent: rate,
    })
}

/// Expected return on the group's game investment.
///
/// Example:
/// let r = game_return(Decimal::new(100_000, 0), Decimal::new(20, 0)).unwrap();
/// assert_eq!(r, Decimal::new(20_000, 0));
pub fn game_return(invested: Decimal, rate_percent: Decimal) -> Result<Decimal, InterestError> {
    if invested < Decimal::ZERO || rate_percent < Decimal::ZERO {
        return Err(InterestError::NegativeAmount);
    }
    Ok(invested * rate_percent / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_week_tier_one() {
        let b = single_period_interest(TierId::One, Decimal::new(10_000, 0)).unwrap();
        assert_eq!(b.interest_amount, Decimal::new(500, 0));
        assert_eq!(b.total_amount, Decimal::new(10_500, 0));
        assert_eq!(b.rate_percent, Decimal::new(5, 0));
    }

    #[test]
    fn zero_weeks_is_identity() {
        for tier in TierId::ALL {
            let amount = tier.contribution_amount();
            let b = accumulated_interest(tier, amount, 0, false).unwrap();
            assert_eq!(b.interest_amount, Decimal::ZERO);
            assert_eq!(b.total_amount, amount);
            let b = accumulated_interest(tier, amount, 0, true).unwrap();
            assert_eq!(b.total_amount, amount);
        }
    }

    #[test]
    fn simple_interest_week_one_settlement() {
        // ₦10,000 + 10,000 * 0.05 * 1 = ₦10,500
        let b = accumulated_interest(TierId::One, Decimal::new(10_000, 0), 1, false).unwrap();
        assert_eq!(b.total_amount, Decimal::new(10_500, 0));
    }

    #[test]
    fn compound_interest_two_weeks() {
        // 10,000 * 1.05^2 = 11,025
        let b = accumulated_interest(TierId::One, Decimal::new(10_000, 0), 2, true).unwrap();
        assert_eq!(b.total_amount, Decimal::new(11_025, 0));
        assert_eq!(b.interest_amount, Decimal::new(1_025, 0));
    }

    #[test]
    fn game_return_basic() {
        let r = game_return(Decimal::new(100_000, 0), default_game_return_rate()).unwrap();
        assert_eq!(r, Decimal::new(20_000, 0));
    }

    #[test]
    fn negative_amounts_rejected() {
        let neg = Decimal::new(-1, 0);
        assert_eq!(
            single_period_interest(TierId::One, neg),
            Err(InterestError::NegativeAmount)
        );
        assert_eq!(
            accumulated_interest(TierId::Two, neg, 3, false),
            Err(InterestError::NegativeAmount)
        );
        assert_eq!(game_return(neg, Decimal::new(20, 0)), Err(InterestError::NegativeAmount));
    }

    proptest! {
        #[test]
        fn simple_interest_law(naira in 0i64..1_000_000, weeks in 0u32..200, code in 1u8..=3) {
            let tier = TierId::try_from(code).unwrap();
            let amount = Decimal::new(naira, 0);
            let b = accumulated_interest(tier, amount, weeks, false).unwrap();
            let expected = amount
                + amount * tier.weekly_rate_percent() / Decimal::ONE_HUNDRED
                    * Decimal::from(weeks);
            prop_assert_eq!(b.total_amount, expected);
        }

        #[test]
        fn interest_monotonic_in_weeks(naira in 1i64..1_000_000, weeks in 0u32..100, code in 1u8..=3) {
            let tier = TierId::try_from(code).unwrap();
            let amount = Decimal::new(naira, 0);
            let a = accumulated_interest(tier, amount, weeks, false).unwrap();
            let b = accumulated_interest(tier, amount, weeks + 1, false).unwrap();
            prop_assert!(b.total_amount > a.total_amount);
        }

        #[test]
        fn compound_dominates_simple(naira in 1i64..1_000_000, weeks in 2u32..60, code in 1u8..=3) {
            let tier = TierId::try_from(code).unwrap();
            let amount = Decimal::new(naira, 0);
            let simple = accumulated_interest(tier, amount, weeks, false).unwrap();
            let compound = accumulated_interest(tier, amount, weeks, true).unwrap();
            prop_assert!(compound.total_amount >= simple.total_amount);
        }
    }
}
