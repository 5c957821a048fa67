#![deny(warnings)]

//! Core domain model for the ajo savings simulation.
//!
//! This crate defines the fixed tier catalog, member state, derived
//! snapshot and ledger types, registration validation, and the engine
//! error taxonomy shared by the rest of the workspace.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Maximum number of simultaneously active members in a savings group.
pub const GROUP_CAPACITY: usize = 12;

/// One of the three fixed contribution tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TierId {
    /// ₦10,000 at 5% per week.
    One = 1,
    /// ₦20,000 at 10% per week.
    Two = 2,
    /// ₦30,000 at 20% per week.
    Three = 3,
}

impl TierId {
    /// All tiers in ascending order.
    pub const ALL: [TierId; 3] = [TierId::One, TierId::Two, TierId::Three];

    /// Stable numeric code (1..=3).
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Required contribution amount in naira.
    pub fn contribution_amount(self) -> Decimal {
        match self {
            TierId::One => Decimal::new(10_000, 0),
            TierId::Two => Decimal::new(20_000, 0),
            TierId::Three => Decimal::new(30_000, 0),
        }
    }

    /// Weekly simple-interest rate, in percent.
    pub fn weekly_rate_percent(self) -> Decimal {
        match self {
            TierId::One => Decimal::new(5, 0),
            TierId::Two => Decimal::new(10, 0),
            TierId::Three => Decimal::new(20, 0),
        }
    }

    /// Human-readable tier name.
    pub fn name(self) -> &'static str {
        match self {
            TierId::One => "Tier 1",
            TierId::Two => "Tier 2",
            TierId::Three => "Tier 3",
        }
    }

    /// One-line description of the tier.
    pub fn description(self) -> &'static str {
        match self {
            TierId::One => "Basic savings tier with 5% weekly interest",
            TierId::Two => "Medium savings tier with 10% weekly interest",
            TierId::Three => "Premium savings tier with 20% weekly interest",
        }
    }
}

impl TryFrom<u8> for TierId {
    type Error = EngineError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(TierId::One),
            2 => Ok(TierId::Two),
            3 => Ok(TierId::Three),
            other => Err(EngineError::InvalidTier(other)),
        }
    }
}

impl From<TierId> for u8 {
    fn from(tier: TierId) -> Self {
        tier.code()
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Catalog row describing one tier. Output-only reference data.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TierInfo {
    pub id: TierId,
    pub name: &'static str,
    /// Required contribution amount in naira.
    pub amount: Decimal,
    /// Weekly interest rate in percent.
    pub weekly_rate_percent: Decimal,
    pub description: &'static str,
}

/// The full tier catalog, in ascending tier order.
pub fn tier_catalog() -> Vec<TierInfo> {
    TierId::ALL
        .iter()
        .map(|&id| TierInfo {
            id,
            name: id.name(),
            amount: id.contribution_amount(),
            weekly_rate_percent: id.weekly_rate_percent(),
            description: id.description(),
        })
        .collect()
}

/// Unique identifier for a member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub Uuid);

impl MemberId {
    /// Mint a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a member. The only transition is
/// Active -> Withdrawn, exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Withdrawn,
}

/// A registered member of the savings group. Members are never deleted;
/// withdrawn members stay on the roster for reporting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    /// Display name, trimmed, at least two characters.
    pub name: String,
    pub tier: TierId,
    /// Simulation week at which the member joined.
    pub joined_week: u32,
    pub joined_at: DateTime<Utc>,
    pub status: MemberStatus,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// Financial view of a member at a given simulation week. Derived on
/// demand, never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub id: MemberId,
    pub name: String,
    pub tier: TierId,
    pub status: MemberStatus,
    /// Tier-required contribution amount, constant over time.
    pub principal: Decimal,
    pub interest_earned: Decimal,
    pub total_amount: Decimal,
    /// Always the simulation's current week, whatever the join week;
    /// the reporting formulas depend on this exact value.
    pub weeks_active: u32,
}

/// Immutable record of one simulated week's interest accrual.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeeklyLedgerEntry {
    /// Week number this entry settles, starting at 1.
    pub week: u32,
    pub recorded_at: DateTime<Utc>,
    pub total_interest_generated: Decimal,
    pub per_member_interest: BTreeMap<MemberId, Decimal>,
}

/// Settlement returned from a withdrawal. Fixed at the moment of
/// withdrawal and never revisited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub member_id: MemberId,
    pub withdrawn_at: DateTime<Utc>,
    pub amount_withdrawn: Decimal,
}

/// Registration input for a prospective member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationData {
    pub name: String,
    pub tier: TierId,
    /// Must exactly equal the tier's required amount.
    pub amount: Decimal,
}

/// Presentation-side tier selection with its entered amount.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierSelection {
    pub tier: TierId,
    pub amount: Decimal,
}

impl TierSelection {
    /// Whether the entered amount matches the selected tier exactly.
    pub fn is_valid(&self) -> bool {
        self.amount == self.tier.contribution_amount()
    }
}

/// Field-keyed messages for a rejected registration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(pub BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Errors produced by engine operations.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// Tier code outside the fixed set 1..=3.
    #[error("invalid tier code: {0}")]
    InvalidTier(u8),
    /// Registration input failed one or more field rules.
    #[error("registration rejected: {0}")]
    ValidationFailed(ValidationErrors),
    /// Registration attempted while the group is at capacity.
    #[error("the savings group is full ({capacity} active members)")]
    GroupFull { capacity: usize },
    /// Operation targeted an unknown member id.
    #[error("member not found: {0}")]
    NotFound(MemberId),
    /// Withdrawal attempted on a non-active member.
    #[error("member has already withdrawn: {0}")]
    AlreadyWithdrawn(MemberId),
    /// Monetary input outside the caller contract (negative amount).
    #[error("negative amount is invalid")]
    NegativeAmount,
}

/// Validate registration input, collecting one message per failing field.
pub fn validate_registration(data: &RegistrationData) -> Result<(), EngineError> {
    let mut errors = ValidationErrors::default();

    let name = data.name.trim();
    if name.is_empty() {
        errors.insert("name", "Name is required");
    } else if name.chars().count() < 2 {
        errors.insert("name", "Name must be at least 2 characters long");
    }

    let expected = data.tier.contribution_amount();
    if data.amount != expected {
        errors.insert(
            "amount",
            format!("Amount must be exactly ₦{expected} for the selected tier"),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(EngineError::ValidationFailed(errors))
    }
}
