//! One-shot subcommands: connect, resolve, then report or submit.

use anyhow::{bail, Result};
use microlend::contract::UserProfile;
use microlend::dispatch::{
    ActionRequest, CreditScoreForm, Dispatch, LoanForm, PoolForm, TracingNotifier,
};
use microlend::wallet::ConnectOutcome;
use microlend::{AppConfig, AppState, Role, View};
use serde::Serialize;
use std::sync::Arc;

use crate::Commands;

#[derive(Debug, Serialize)]
struct StatusReport {
    address: String,
    role: Role,
    view: View,
    profile: Option<UserProfile>,
    /// Read failure that forced the Guest fallback
    degraded: Option<String>,
}

pub async fn run(command: Commands, config: AppConfig) -> Result<()> {
    let json = matches!(command, Commands::Status { json: true });
    // Validate input before anything touches the wallet.
    let request: Option<ActionRequest> = match command {
        Commands::Tui => bail!("the TUI is not a headless command"),
        Commands::Status { .. } => None,
        Commands::RequestLoan {
            pool_id,
            amount,
            duration,
        } => Some(
            LoanForm {
                pool_id,
                loan_amount: amount,
                loan_duration: duration,
            }
            .validate()?
            .into(),
        ),
        Commands::CreatePool {
            max_amount,
            interest_rate,
            min_credit_score,
        } => Some(
            PoolForm {
                max_loan_amount: max_amount,
                interest_rate,
                min_credit_score,
            }
            .validate()?
            .into(),
        ),
        Commands::UpdateScore { address, score } => Some(
            CreditScoreForm {
                user_address: address,
                new_credit_score: score,
            }
            .validate()?
            .into(),
        ),
    };
    let state = AppState::from_config(&config, Arc::new(TracingNotifier))?;
    let address = connect(&state).await?;

    match request {
        Some(request) => submit(&state, request).await,
        None => status(&state, address, json).await,
    }
}

async fn connect(state: &AppState) -> Result<String> {
    match state.connect().await? {
        ConnectOutcome::Connected(address) => Ok(address),
        ConnectOutcome::AlreadyPending => bail!("a wallet connection is already pending"),
    }
}

async fn status(state: &AppState, address: String, json: bool) -> Result<()> {
    let resolution = state.resolution().await;
    let report = StatusReport {
        address,
        role: resolution.as_ref().map(|r| r.role).unwrap_or(Role::Guest),
        view: state.view().await,
        profile: resolution.as_ref().and_then(|r| r.profile.clone()),
        degraded: resolution.and_then(|r| r.degraded),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Address: {}", report.address);
    println!("Role:    {}", report.role);
    println!("View:    {}", report.view.title());
    if let Some(profile) = &report.profile {
        if profile.is_registered() {
            println!("Name:    {}", profile.name);
            println!("Score:   {}", profile.credit_score);
            println!("SHG:     {}", if profile.is_shg_member { "yes" } else { "no" });
        }
    }
    if let Some(reason) = &report.degraded {
        eprintln!("warning: role lookup failed ({}); showing Guest", reason);
    }
    Ok(())
}

async fn submit(state: &AppState, request: ActionRequest) -> Result<()> {
    let kind = request.kind();
    match state.submit(request).await? {
        Dispatch::Submitted(tx) => {
            println!("{}", kind.success_message());
            println!("tx: {}", tx.hash);
        }
        Dispatch::Skipped => bail!("{} is already in flight", kind),
    }
    Ok(())
}
