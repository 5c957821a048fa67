#![deny(warnings)]

//! Stateful simulation runtime: the member registry, the weekly clock
//! with its append-only ledger, and the [`SavingsEngine`] facade that
//! drives both.
//!
//! All engine operations run to completion synchronously and are atomic
//! with respect to each other. The async auto-advance loop lives in
//! [`driver`].

pub mod driver;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sim_core::{
    validate_registration, EngineError, Member, MemberId, MemberSnapshot, MemberStatus,
    RegistrationData, TierInfo, WeeklyLedgerEntry, Withdrawal, GROUP_CAPACITY,
};
use sim_interest::{accumulated_interest, single_period_interest};
use sim_report::{GameInvestment, GroupSavings, SavingsSummary};
use std::collections::BTreeMap;
use tracing::info;

/// Owns the member roster and enforces registration and withdrawal rules.
///
/// Per-member state machine: Active --withdraw--> Withdrawn (terminal).
/// Members are never removed; withdrawn members stay for reporting.
#[derive(Clone, Debug)]
pub struct MemberRegistry {
    members: Vec<Member>,
    capacity: usize,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::with_capacity(GROUP_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::new(),
            capacity,
        }
    }

    /// Every member ever registered, active and withdrawn.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn active_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_active())
    }

    pub fn withdrawn_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| !m.is_active())
    }

    pub fn get(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.active_members().count()
    }

    pub fn is_full(&self) -> bool {
        self.active_count() >= self.capacity
    }

    pub fn available_spots(&self) -> usize {
        self.capacity.saturating_sub(self.active_count())
    }

    /// Register a new member. Capacity is checked before field validation;
    /// each successful call mints a fresh id (no idempotency).
    pub fn register(
        &mut self,
        data: &RegistrationData,
        current_week: u32,
    ) -> Result<Member, EngineError> {
        if self.is_full() {
            return Err(EngineError::GroupFull {
                capacity: self.capacity,
            });
        }
        validate_registration(data)?;

        let member = Member {
            id: MemberId::new(),
            name: data.name.trim().to_string(),
            tier: data.tier,
            joined_week: current_week,
            joined_at: Utc::now(),
            status: MemberStatus::Active,
        };
        info!(member = %member.id, tier = member.tier.code(), week = current_week, "registered member");
        self.members.push(member.clone());
        Ok(member)
    }

    /// Settle and withdraw a member. One-shot: the amount is fixed at the
    /// moment of withdrawal and never revisited, even if the simulation
    /// advances afterwards.
    pub fn withdraw(
        &mut self,
        id: MemberId,
        current_week: u32,
    ) -> Result<Withdrawal, EngineError> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(EngineError::NotFound(id))?;
        if member.status != MemberStatus::Active {
            return Err(EngineError::AlreadyWithdrawn(id));
        }

        let breakdown = accumulated_interest(
            member.tier,
            member.tier.contribution_amount(),
            current_week,
            false,
        )?;
        member.status = MemberStatus::Withdrawn;
        info!(member = %id, amount = %breakdown.total_amount, week = current_week, "member withdrew");
        Ok(Withdrawal {
            member_id: id,
            withdrawn_at: Utc::now(),
            amount_withdrawn: breakdown.total_amount,
        })
    }

    /// Financial snapshots for every member, active and withdrawn.
    ///
    /// `weeks_active` is the simulation's current week for all members,
    /// whatever their actual join week; the reporting scenarios depend on
    /// this exact formula.
    pub fn snapshot(&self, current_week: u32) -> Result<Vec<MemberSnapshot>, EngineError> {
        self.members
            .iter()
            .map(|m| {
                let b = accumulated_interest(
                    m.tier,
                    m.tier.contribution_amount(),
                    current_week,
                    false,
                )?;
                Ok(MemberSnapshot {
                    id: m.id,
                    name: m.name.clone(),
                    tier: m.tier,
                    status: m.status,
                    principal: b.principal,
                    interest_earned: b.interest_amount,
                    total_amount: b.total_amount,
                    weeks_active: current_week,
                })
            })
            .collect()
    }
}

impl Default for MemberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Discrete week counter with the append-only weekly ledger.
///
/// Invariant: `history.len() == current_week`, entries in strictly
/// increasing week order, never mutated after append.
#[derive(Clone, Debug)]
pub struct SimulationClock {
    current_week: u32,
    started_at: DateTime<Utc>,
    last_advanced_at: Option<DateTime<Utc>>,
    history: Vec<WeeklyLedgerEntry>,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self {
            current_week: 0,
            started_at: Utc::now(),
            last_advanced_at: None,
            history: Vec::new(),
        }
    }

    pub fn current_week(&self) -> u32 {
        self.current_week
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn last_advanced_at(&self) -> Option<DateTime<Utc>> {
        self.last_advanced_at
    }

    pub fn history(&self) -> &[WeeklyLedgerEntry] {
        &self.history
    }

    fn record(&mut self, entry: WeeklyLedgerEntry) {
        debug_assert_eq!(entry.week, self.current_week + 1);
        self.history.push(entry);
        self.current_week += 1;
        self.last_advanced_at = Some(Utc::now());
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Facade owning one registry and one clock. All commands and queries of
/// the savings engine go through here.
#[derive(Clone, Debug, Default)]
pub struct SavingsEngine {
    registry: MemberRegistry,
    clock: SimulationClock,
}

impl SavingsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- commands ----

    /// Register a new member at the current simulation week.
    pub fn register(&mut self, data: &RegistrationData) -> Result<Member, EngineError> {
        self.registry.register(data, self.clock.current_week())
    }

    /// Withdraw a member, settling principal plus accumulated simple
    /// interest at the current week.
    pub fn withdraw(&mut self, id: MemberId) -> Result<Withdrawal, EngineError> {
        self.registry.withdraw(id, self.clock.current_week())
    }

    /// Advance the simulation by one week: accrue one week's flat per-tier
    /// interest on each active member's principal, append the ledger entry,
    /// and bump the week counter. In-memory and all-or-nothing.
    pub fn advance_week(&mut self) -> Result<WeeklyLedgerEntry, EngineError> {
        let week = self.clock.current_week();
        let snapshots = self.registry.snapshot(week)?;

        let mut per_member_interest = BTreeMap::new();
        let mut total = Decimal::ZERO;
        for snap in snapshots
            .iter()
            .filter(|s| s.status == MemberStatus::Active)
        {
            let weekly = single_period_interest(snap.tier, snap.principal)?.interest_amount;
            per_member_interest.insert(snap.id, weekly);
            total += weekly;
        }

        let entry = WeeklyLedgerEntry {
            week: week + 1,
            recorded_at: Utc::now(),
            total_interest_generated: total,
            per_member_interest,
        };
        self.clock.record(entry.clone());
        info!(week = entry.week, interest = %total, "advanced one week");
        Ok(entry)
    }

    /// Rewind to week 0: clears the clock and ledger. Membership is
    /// deliberately left intact so the same roster can be re-simulated.
    pub fn reset(&mut self) {
        self.clock.reset();
        info!("simulation reset to week 0");
    }

    // ---- queries ----

    pub fn registry(&self) -> &MemberRegistry {
        &self.registry
    }

    pub fn members(&self) -> &[Member] {
        self.registry.members()
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.registry.get(id)
    }

    pub fn active_count(&self) -> usize {
        self.registry.active_count()
    }

    pub fn available_spots(&self) -> usize {
        self.registry.available_spots()
    }

    pub fn current_week(&self) -> u32 {
        self.clock.current_week()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.clock.started_at()
    }

    pub fn last_advanced_at(&self) -> Option<DateTime<Utc>> {
        self.clock.last_advanced_at()
    }

    pub fn history(&self) -> &[WeeklyLedgerEntry] {
        self.clock.history()
    }

    /// Snapshots of every member at the current week.
    pub fn snapshots(&self) -> Result<Vec<MemberSnapshot>, EngineError> {
        self.registry.snapshot(self.clock.current_week())
    }

    /// Snapshots of every member as of an arbitrary week.
    pub fn snapshots_at(&self, week: u32) -> Result<Vec<MemberSnapshot>, EngineError> {
        self.registry.snapshot(week)
    }

    pub fn savings_summary(&self) -> Result<SavingsSummary, EngineError> {
        Ok(sim_report::summarize(&self.snapshots()?))
    }

    pub fn group_savings(&self) -> Result<GroupSavings, EngineError> {
        Ok(sim_report::group_savings(
            &self.snapshots()?,
            self.clock.current_week(),
        ))
    }

    /// Game investment recomputed from the live group total.
    pub fn game_investment(&self) -> Result<GameInvestment, EngineError> {
        Ok(sim_report::game_investment(&self.snapshots()?)?)
    }

    pub fn tier_catalog(&self) -> Vec<TierInfo> {
        sim_core::tier_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sim_core::TierId;

    fn registration(name: &str, tier: TierId) -> RegistrationData {
        RegistrationData {
            name: name.to_string(),
            tier,
            amount: tier.contribution_amount(),
        }
    }

    fn engine_with_roster(n: usize) -> SavingsEngine {
        let mut engine = SavingsEngine::new();
        for i in 0..n {
            let tier = TierId::ALL[i % 3];
            engine
                .register(&registration(&format!("Member {}", i + 1), tier))
                .unwrap();
        }
        engine
    }

    #[test]
    fn thirteenth_registration_hits_capacity() {
        let mut engine = engine_with_roster(12);
        assert_eq!(engine.active_count(), 12);
        assert_eq!(engine.available_spots(), 0);

        let err = engine
            .register(&registration("Latecomer", TierId::One))
            .unwrap_err();
        assert_eq!(err, EngineError::GroupFull { capacity: 12 });
    }

    #[test]
    fn withdrawal_frees_a_spot() {
        let mut engine = engine_with_roster(12);
        let first = engine.members()[0].id;
        engine.withdraw(first).unwrap();
        assert_eq!(engine.available_spots(), 1);
        engine
            .register(&registration("Replacement", TierId::Two))
            .unwrap();
        assert_eq!(engine.active_count(), 12);
        // The withdrawn member stays on the roster.
        assert_eq!(engine.members().len(), 13);
    }

    #[test]
    fn withdraw_unknown_and_twice() {
        let mut engine = engine_with_roster(1);
        let ghost = MemberId::new();
        assert_eq!(engine.withdraw(ghost), Err(EngineError::NotFound(ghost)));

        let id = engine.members()[0].id;
        engine.withdraw(id).unwrap();
        assert_eq!(engine.withdraw(id), Err(EngineError::AlreadyWithdrawn(id)));
    }

    #[test]
    fn week_one_tier_one_scenario() {
        let mut engine = SavingsEngine::new();
        let member = engine.register(&registration("Amina", TierId::One)).unwrap();

        let entry = engine.advance_week().unwrap();
        assert_eq!(entry.week, 1);
        assert_eq!(entry.total_interest_generated, Decimal::new(500, 0));
        assert_eq!(
            entry.per_member_interest[&member.id],
            Decimal::new(500, 0)
        );

        let withdrawal = engine.withdraw(member.id).unwrap();
        assert_eq!(withdrawal.amount_withdrawn, Decimal::new(10_500, 0));
    }

    #[test]
    fn withdrawn_members_stop_accruing_ledger_interest() {
        let mut engine = engine_with_roster(2);
        let first = engine.members()[0].id;
        engine.advance_week().unwrap();
        engine.withdraw(first).unwrap();

        let entry = engine.advance_week().unwrap();
        assert!(!entry.per_member_interest.contains_key(&first));
        assert_eq!(entry.per_member_interest.len(), 1);
    }

    #[test]
    fn advance_on_empty_roster_records_zero() {
        let mut engine = SavingsEngine::new();
        let entry = engine.advance_week().unwrap();
        assert_eq!(entry.total_interest_generated, Decimal::ZERO);
        assert!(entry.per_member_interest.is_empty());
        assert_eq!(engine.current_week(), 1);
    }

    #[test]
    fn reset_rewinds_clock_but_keeps_roster() {
        let mut engine = engine_with_roster(3);
        for _ in 0..5 {
            engine.advance_week().unwrap();
        }
        assert_eq!(engine.current_week(), 5);
        assert!(engine.last_advanced_at().is_some());

        engine.reset();
        assert_eq!(engine.current_week(), 0);
        assert!(engine.history().is_empty());
        assert!(engine.last_advanced_at().is_none());
        assert_eq!(engine.members().len(), 3);
        assert_eq!(engine.game_investment().unwrap().expected_return, Decimal::new(12_000, 0));
    }

    #[test]
    fn late_joiner_is_credited_from_week_zero() {
        // Snapshots use the simulation week for everyone regardless of
        // join week; a member joining at week 5 is credited for 5 weeks.
        let mut engine = SavingsEngine::new();
        for _ in 0..5 {
            engine.advance_week().unwrap();
        }
        let member = engine.register(&registration("Late", TierId::One)).unwrap();
        assert_eq!(member.joined_week, 5);

        let snaps = engine.snapshots().unwrap();
        assert_eq!(snaps[0].weeks_active, 5);
        assert_eq!(snaps[0].interest_earned, Decimal::new(2_500, 0));
    }

    #[test]
    fn summary_matches_week_two_scenario() {
        let mut engine = engine_with_roster(3);
        engine.advance_week().unwrap();
        engine.advance_week().unwrap();

        let summary = engine.savings_summary().unwrap();
        assert_eq!(summary.total_saved, Decimal::new(60_000, 0));
        assert_eq!(summary.total_interest, Decimal::new(17_000, 0));
        assert_eq!(summary.total_amount, Decimal::new(77_000, 0));

        let group = engine.group_savings().unwrap();
        assert_eq!(group.member_count, 3);
        assert_eq!(group.current_week, 2);

        let game = engine.game_investment().unwrap();
        assert_eq!(game.invested_amount, Decimal::new(77_000, 0));
        assert_eq!(game.expected_return, Decimal::new(15_400, 0));
    }

    #[test]
    fn registration_validation_is_enforced() {
        let mut engine = SavingsEngine::new();
        let data = RegistrationData {
            name: "Amina".to_string(),
            tier: TierId::Two,
            amount: Decimal::new(10_000, 0),
        };
        assert!(matches!(
            engine.register(&data),
            Err(EngineError::ValidationFailed(_))
        ));
        assert!(engine.members().is_empty());
    }

    proptest! {
        #[test]
        fn history_length_tracks_week(k in 0usize..30) {
            let mut engine = engine_with_roster(2);
            for _ in 0..k {
                engine.advance_week().unwrap();
            }
            prop_assert_eq!(engine.history().len(), k);
            prop_assert_eq!(engine.current_week() as usize, k);
            // Entries are in strictly increasing week order.
            for (i, entry) in engine.history().iter().enumerate() {
                prop_assert_eq!(entry.week as usize, i + 1);
            }
        }
    }
}
