//! Telephony call sessions.
//!
//! A session dials a lead through the telephony provider, polls the provider until
//! the call ends and then writes the call row. Connected calls wait for the agent
//! to fill in the outcome form; unanswered and failed calls are recorded as-is.

use crate::call_outcome::CallOutcome;
use crate::calls::Model;
use crate::error::Error;
use crate::Id;
use call_providers::traits::telephony::Provider;
use call_providers::{CallStatus, CallStatusReport, ConnectRequest, ConnectResponse};
use entity_api::{call, company_setting};
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Where a telephony session currently stands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Initiating,
    InProgress { sid: String },
    /// The call connected and its row is written; the agent still owes the outcome form.
    AwaitingNotes { call_id: Id },
    Busy { call_id: Id },
    NoAnswer { call_id: Id },
    /// The provider failed the call. There is no call row when the failure
    /// happened before a call session existed.
    Failed { call_id: Option<Id> },
    Cancelled,
}

impl SessionState {
    pub fn is_finished(&self) -> bool {
        !matches!(
            self,
            SessionState::Idle | SessionState::Initiating | SessionState::InProgress { .. }
        )
    }
}

/// The lead being dialed, the agent dialing it and the numbers involved.
#[derive(Clone, Debug)]
pub struct CallTarget {
    pub lead_id: Id,
    pub employee_id: Id,
    pub from: String,
    pub to: String,
}

/// Asks the provider to place a call from one of the company's numbers.
///
/// Nothing is written on failure.
pub async fn initiate(
    db: &DatabaseConnection,
    provider: &dyn Provider,
    from: &str,
    to: &str,
) -> Result<ConnectResponse, Error> {
    let from = from.trim();
    let to = to.trim();
    if from.is_empty() || to.is_empty() {
        return Err(Error::validation("Both a from and a to number are required"));
    }

    let settings = company_setting::find(db)
        .await?
        .ok_or_else(|| Error::validation("Calling settings are not configured"))?;
    let caller_id = settings
        .caller_id
        .filter(|caller_id| !caller_id.trim().is_empty())
        .ok_or_else(|| Error::validation("No caller id is configured"))?;
    if !settings.from_numbers.iter().any(|number| number == from) {
        return Err(Error::validation(format!(
            "{from} is not one of the company's calling numbers"
        )));
    }

    let response = provider
        .connect(ConnectRequest {
            from: from.to_owned(),
            to: to.to_owned(),
            caller_id,
        })
        .await?;
    info!("Placed call {} ({})", response.sid, response.status);
    Ok(response)
}

/// Polls the call status every `interval` until it is terminal.
///
/// Returns `None` when cancelled, including while a status fetch is in flight.
/// Provider errors are logged and polling continues.
pub async fn poll_until_terminal(
    provider: &dyn Provider,
    sid: &str,
    interval: Duration,
    cancel: &CancellationToken,
) -> Option<CallStatusReport> {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let fetched = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    fetched = provider.get_call_status(sid) => fetched,
                };
                match fetched {
                    Ok(report) if report.status.is_terminal() => return Some(report),
                    Ok(report) => trace!("Call {sid} is {}", report.status),
                    Err(err) => warn!("Failed to fetch status of call {sid}: {err}"),
                }
            }
        }
    }

    info!("Stopped polling call {sid}");
    None
}

fn outcome_for(status: CallStatus) -> CallOutcome {
    match status {
        CallStatus::Completed => CallOutcome::Completed,
        CallStatus::Busy | CallStatus::NoAnswer => CallOutcome::NotAnswered,
        _ => CallOutcome::Failed,
    }
}

/// Writes the call row for a finished call. A connected call also moves the lead
/// to the status its `completed` outcome implies until the agent classifies it;
/// unanswered and failed calls leave the lead alone.
pub async fn record_outcome(
    db: &DatabaseConnection,
    target: &CallTarget,
    sid: &str,
    report: &CallStatusReport,
) -> Result<(SessionState, Model), Error> {
    let now = chrono::Utc::now();
    let outcome = outcome_for(report.status);
    let call = call::create(
        db,
        Model {
            id: Id::nil(),
            lead_id: target.lead_id,
            employee_id: target.employee_id,
            outcome,
            notes: String::new(),
            call_date: now.into(),
            next_follow_up: None,
            auto_call_followup: false,
            call_sid: Some(sid.to_owned()),
            from_number: Some(target.from.clone()),
            to_number: Some(target.to.clone()),
            duration_seconds: report.duration,
            recording_url: report.recording_url.clone(),
            provider_status: Some(report.status.to_string()),
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    if report.status == CallStatus::Completed {
        crate::call::apply_outcome(db, target.lead_id, call.outcome).await?;
    }

    let state = match report.status {
        CallStatus::Completed => SessionState::AwaitingNotes { call_id: call.id },
        CallStatus::Busy => SessionState::Busy { call_id: call.id },
        CallStatus::NoAnswer => SessionState::NoAnswer { call_id: call.id },
        _ => SessionState::Failed {
            call_id: Some(call.id),
        },
    };
    info!(
        "Call {sid} to lead {} ended as {}",
        target.lead_id, report.status
    );
    Ok((state, call))
}

/// Drives one placed call to its end, publishing every state change on `state`.
pub async fn run_session(
    db: Arc<DatabaseConnection>,
    provider: Arc<dyn Provider>,
    target: CallTarget,
    sid: String,
    interval: Duration,
    cancel: CancellationToken,
    state: watch::Sender<SessionState>,
) {
    state.send_replace(SessionState::InProgress { sid: sid.clone() });

    let report = match poll_until_terminal(provider.as_ref(), &sid, interval, &cancel).await {
        Some(report) if !cancel.is_cancelled() => report,
        _ => {
            info!("Call {sid} abandoned, nothing recorded");
            state.send_replace(SessionState::Cancelled);
            return;
        }
    };

    match record_outcome(&db, &target, &sid, &report).await {
        Ok((finished, _)) => {
            state.send_replace(finished);
        }
        Err(err) => {
            error!("Failed to record call {sid}: {err}");
            state.send_replace(SessionState::Failed { call_id: None });
        }
    }
}
