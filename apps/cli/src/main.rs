#![deny(warnings)]

//! Headless CLI: registers a demo roster and runs the weekly savings
//! simulation, printing the group report at the end.

use anyhow::Result;
use sim_core::{tier_catalog, RegistrationData, TierId};
use sim_interest::accumulated_interest;
use sim_runtime::SavingsEngine;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn parse_args() -> (usize, u32, bool) {
    let mut members = 3usize;
    let mut weeks = 4u32;
    let mut compound = false;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--members" => members = it.next().and_then(|s| s.parse().ok()).unwrap_or(members),
            "--weeks" => weeks = it.next().and_then(|s| s.parse().ok()).unwrap_or(weeks),
            "--compound" => compound = true,
            _ => {}
        }
    }
    (members, weeks, compound)
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let (members, weeks, compound) = parse_args();
    info!(members, weeks, compound, "starting savings simulation");

    for tier in tier_catalog() {
        println!(
            "{} | amount: ₦{} | rate: {}%/week | {}",
            tier.name, tier.amount, tier.weekly_rate_percent, tier.description
        );
    }

    let mut engine = SavingsEngine::new();
    for i in 0..members {
        let tier = TierId::ALL[i % TierId::ALL.len()];
        let member = engine.register(&RegistrationData {
            name: format!("Member {}", i + 1),
            tier,
            amount: tier.contribution_amount(),
        })?;
        info!(id = %member.id, tier = %tier, "registered");
    }

    for _ in 0..weeks {
        let entry = engine.advance_week()?;
        println!(
            "Week {} | interest generated: ₦{}",
            entry.week, entry.total_interest_generated
        );
    }

    let summary = engine.savings_summary()?;
    let group = engine.group_savings()?;
    let game = engine.game_investment()?;

    println!(
        "Group OK | members: {} | week: {} | spots left: {}",
        group.member_count,
        engine.current_week(),
        engine.available_spots()
    );
    println!(
        "Totals | saved: ₦{} | interest: ₦{} | total: ₦{} | ROI: {}%",
        summary.total_saved,
        summary.total_interest,
        summary.total_amount,
        summary.return_on_investment.round_dp(2)
    );
    for (tier, row) in &summary.tier_breakdown {
        println!(
            "{} | members: {} | principal: ₦{} | interest: ₦{} | total: ₦{}",
            tier.name(),
            row.count,
            row.principal,
            row.interest,
            row.total
        );
    }
    println!(
        "Game | invested: ₦{} | rate: {}% | expected return: ₦{}",
        game.invested_amount, game.return_rate_percent, game.expected_return
    );

    if compound {
        for tier in TierId::ALL {
            let b = accumulated_interest(
                tier,
                tier.contribution_amount(),
                engine.current_week(),
                true,
            )?;
            println!(
                "Compound {} | total after {} weeks: ₦{}",
                tier.name(),
                engine.current_week(),
                b.total_amount.round_dp(2)
            );
        }
    }

    Ok(())
}
