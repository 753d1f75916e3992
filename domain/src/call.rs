//! Call outcome recorder.

use crate::call_outcome::CallOutcome;
use crate::calls::Model;
use crate::error::Error;
use crate::lead_status::LeadStatus;
use crate::Id;
use chrono::{DateTime, Utc};
use entity_api::{analysis, call, lead};
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;

pub use entity_api::call::{find_by_id, find_by_lead_id};

/// The lead status a call outcome leads to. `None` leaves the lead untouched.
pub fn derive_lead_status(outcome: CallOutcome) -> Option<LeadStatus> {
    match outcome {
        CallOutcome::FollowUp => Some(LeadStatus::FollowUp),
        CallOutcome::Completed | CallOutcome::Converted => Some(LeadStatus::Converted),
        CallOutcome::NotInterested | CallOutcome::Lost => Some(LeadStatus::NotInterested),
        CallOutcome::Interested => Some(LeadStatus::Contacted),
        CallOutcome::NotAnswered | CallOutcome::Failed => None,
    }
}

/// An agent's description of a finished call.
#[derive(Clone, Debug)]
pub struct Classification {
    pub outcome: CallOutcome,
    pub notes: String,
    pub next_follow_up: Option<DateTime<Utc>>,
    pub auto_call_followup: bool,
}

impl Classification {
    fn validate(&self, now: DateTime<Utc>) -> Result<(), Error> {
        // Unanswered calls come straight from telephony and carry no outcome form
        if self.outcome.is_unanswered() {
            return Ok(());
        }
        if self.notes.trim().is_empty() {
            return Err(Error::validation("Notes are required"));
        }
        if self.outcome == CallOutcome::FollowUp {
            match self.next_follow_up {
                Some(at) if at > now => {}
                Some(_) => return Err(Error::validation("Follow-up must be scheduled in the future")),
                None => return Err(Error::validation("A follow-up date and time is required")),
            }
        }
        Ok(())
    }

    /// Follow-up details only make sense on follow-up calls.
    fn follow_up(&self) -> (Option<DateTime<Utc>>, bool) {
        match self.outcome {
            CallOutcome::FollowUp => (self.next_follow_up, self.auto_call_followup),
            _ => (None, false),
        }
    }
}

/// Records a call attempt and moves the lead to the status its outcome implies.
/// The call row is written before the lead is updated.
pub async fn record_call(
    db: &DatabaseConnection,
    lead_id: Id,
    employee_id: Id,
    classification: Classification,
) -> Result<Model, Error> {
    let now = Utc::now();
    classification.validate(now)?;
    crate::lead::ensure_not_removed(&lead::find_by_id(db, lead_id).await?)?;

    let (next_follow_up, auto_call_followup) = classification.follow_up();
    let call = call::create(
        db,
        Model {
            id: Id::nil(),
            lead_id,
            employee_id,
            outcome: classification.outcome,
            notes: classification.notes.trim().to_owned(),
            call_date: now.into(),
            next_follow_up: next_follow_up.map(Into::into),
            auto_call_followup,
            call_sid: None,
            from_number: None,
            to_number: None,
            duration_seconds: None,
            recording_url: None,
            provider_status: None,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    apply_outcome(db, lead_id, call.outcome).await?;
    Ok(call)
}

/// A connected telephony call whose outcome form has not been filled in yet.
fn awaits_notes(call: &Model) -> bool {
    call.call_sid.is_some()
        && call.outcome == CallOutcome::Completed
        && call.notes.trim().is_empty()
}

/// Fills in the outcome form of a call row written by a telephony session.
///
/// The lead only follows the classification when this is still its latest call.
pub async fn classify_call(
    db: &DatabaseConnection,
    call_id: Id,
    classification: Classification,
) -> Result<Model, Error> {
    classification.validate(Utc::now())?;

    let existing = call::find_by_id(db, call_id).await?;
    if !awaits_notes(&existing) {
        return Err(Error::validation(format!(
            "Call {call_id} is not awaiting an outcome form"
        )));
    }

    let (next_follow_up, auto_call_followup) = classification.follow_up();
    let call = call::classify(
        db,
        call_id,
        classification.outcome,
        classification.notes.trim().to_owned(),
        next_follow_up.map(Into::into),
        auto_call_followup,
    )
    .await?;

    match call::find_latest_by_lead_id(db, call.lead_id).await? {
        Some(latest) if latest.id == call.id => apply_outcome(db, call.lead_id, call.outcome).await?,
        _ => info!(
            "Call {call_id} is no longer the latest call of lead {}, status kept",
            call.lead_id
        ),
    }
    Ok(call)
}

pub(crate) async fn apply_outcome(db: &DatabaseConnection, lead_id: Id, outcome: CallOutcome) -> Result<(), Error> {
    match derive_lead_status(outcome) {
        Some(status) => {
            lead::update_status(db, lead_id, status).await?;
            info!("Call outcome {outcome} moved lead {lead_id} to {status}");
        }
        None => debug!("Call outcome {outcome} leaves lead {lead_id} unchanged"),
    }
    Ok(())
}

/// Deletes a call together with its analyses.
pub async fn delete(db: &DatabaseConnection, call_id: Id) -> Result<(), Error> {
    let txn = db.begin().await.map_err(Error::transaction)?;

    let analyses = analysis::delete_by_call_id(&txn, call_id).await?;
    call::delete_by_id(&txn, call_id).await?;

    txn.commit().await.map_err(Error::transaction)?;

    info!("Deleted call {call_id} and {analyses} analysis job(s)");
    Ok(())
}

/// Display label summarizing a lead's latest call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StatusIndicator {
    #[serde(rename = "Follow-up Added")]
    FollowUpAdded,
    #[serde(rename = "Called")]
    Called,
    #[serde(rename = "Not Interested")]
    NotInterested,
    #[serde(rename = "Not Called")]
    NotCalled,
}

impl StatusIndicator {
    /// `latest` must be the lead's most recent call, as returned by
    /// `find_latest_by_lead_id`.
    pub fn for_latest_call(latest: Option<&Model>) -> Self {
        let Some(call) = latest else {
            return StatusIndicator::NotCalled;
        };
        match call.outcome {
            CallOutcome::FollowUp if call.next_follow_up.is_some() => StatusIndicator::FollowUpAdded,
            CallOutcome::NotInterested | CallOutcome::Lost => StatusIndicator::NotInterested,
            _ => StatusIndicator::Called,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusIndicator::FollowUpAdded => "Follow-up Added",
            StatusIndicator::Called => "Called",
            StatusIndicator::NotInterested => "Not Interested",
            StatusIndicator::NotCalled => "Not Called",
        }
    }
}

pub async fn status_indicator(db: &DatabaseConnection, lead_id: Id) -> Result<StatusIndicator, Error> {
    let latest = call::find_latest_by_lead_id(db, lead_id).await?;
    Ok(StatusIndicator::for_latest_call(latest.as_ref()))
}

pub async fn find_due_auto_calls(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<Vec<Model>, Error> {
    Ok(call::find_due_auto_calls(db, now.into()).await?)
}


#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::leads;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn lead_with(status: LeadStatus) -> leads::Model {
        let now = Utc::now();
        leads::Model {
            id: Id::new_v4(),
            name: "Ada".to_owned(),
            email: None,
            phone: "+15550001".to_owned(),
            department: None,
            status,
            group_id: None,
            user_id: None,
            assigned_to: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn completed_call_converts_the_lead() -> Result<(), Error> {
        let lead = lead_with(LeadStatus::Contacted);
        let call = Model {
            lead_id: lead.id,
            ..tests::call_with(CallOutcome::Completed, None)
        };
        let converted = leads::Model {
            status: LeadStatus::Converted,
            ..lead.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![lead.clone()]])
            .append_query_results(vec![vec![call.clone()]])
            .append_query_results(vec![vec![lead.clone()], vec![converted]])
            .into_connection();

        let recorded = record_call(
            &db,
            lead.id,
            call.employee_id,
            Classification {
                outcome: CallOutcome::Completed,
                notes: "Signed the contract".to_owned(),
                next_follow_up: None,
                auto_call_followup: false,
            },
        )
        .await?;

        assert_eq!(recorded.outcome, CallOutcome::Completed);
        // lead lookup, call insert, lead lookup, lead update
        assert_eq!(db.into_transaction_log().len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn not_answered_call_leaves_the_lead_alone() -> Result<(), Error> {
        let lead = lead_with(LeadStatus::Assigned);
        let call = Model {
            lead_id: lead.id,
            ..tests::call_with(CallOutcome::NotAnswered, None)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![lead.clone()]])
            .append_query_results(vec![vec![call.clone()]])
            .into_connection();

        record_call(
            &db,
            lead.id,
            call.employee_id,
            Classification {
                outcome: CallOutcome::NotAnswered,
                notes: String::new(),
                next_follow_up: None,
                auto_call_followup: false,
            },
        )
        .await?;

        assert_eq!(db.into_transaction_log().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_analyses_then_the_call() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        delete(&db, Id::new_v4()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn status_indicator_is_not_called_without_history() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        assert_eq!(
            status_indicator(&db, Id::new_v4()).await?,
            StatusIndicator::NotCalled
        );
        Ok(())
    }

    fn awaiting_notes(lead_id: Id) -> Model {
        Model {
            lead_id,
            call_sid: Some("CA1".to_owned()),
            provider_status: Some("completed".to_owned()),
            ..tests::call_with(CallOutcome::Completed, None)
        }
    }

    fn interested() -> Classification {
        Classification {
            outcome: CallOutcome::Interested,
            notes: "Wants a demo next week".to_owned(),
            next_follow_up: None,
            auto_call_followup: false,
        }
    }

    #[tokio::test]
    async fn record_call_rejects_removed_leads() {
        let lead = lead_with(LeadStatus::Removed);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![lead.clone()]])
            .into_connection();

        let result = record_call(&db, lead.id, Id::new_v4(), interested()).await;

        assert!(result.is_err());
        // The lead lookup only; no call row
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn classify_call_rejects_manual_calls() {
        let manual = tests::call_with(CallOutcome::Interested, None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![manual.clone()]])
            .into_connection();

        let result = classify_call(&db, manual.id, interested()).await;

        assert!(result.is_err());
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn classify_call_rejects_calls_already_classified() {
        let lead = lead_with(LeadStatus::Contacted);
        let classified = Model {
            outcome: CallOutcome::Interested,
            notes: "Wants a demo".to_owned(),
            ..awaiting_notes(lead.id)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![classified.clone()]])
            .into_connection();

        let result = classify_call(&db, classified.id, interested()).await;

        assert!(result.is_err());
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn classifying_the_latest_call_moves_the_lead() -> Result<(), Error> {
        let lead = lead_with(LeadStatus::Converted);
        let pending = awaiting_notes(lead.id);
        let classified = Model {
            outcome: CallOutcome::Interested,
            notes: "Wants a demo next week".to_owned(),
            ..pending.clone()
        };
        let contacted = leads::Model {
            status: LeadStatus::Contacted,
            ..lead.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![
                vec![pending.clone()],
                vec![pending.clone()],
                vec![classified.clone()],
                vec![classified.clone()],
            ])
            .append_query_results(vec![vec![lead.clone()], vec![contacted]])
            .into_connection();

        let result = classify_call(&db, pending.id, interested()).await?;

        assert_eq!(result.outcome, CallOutcome::Interested);
        // call lookup, classify (lookup, update), latest call, lead lookup, lead update
        assert_eq!(db.into_transaction_log().len(), 6);
        Ok(())
    }

    #[tokio::test]
    async fn classifying_an_older_call_keeps_the_lead_status() -> Result<(), Error> {
        let lead = lead_with(LeadStatus::FollowUp);
        let pending = awaiting_notes(lead.id);
        let classified = Model {
            outcome: CallOutcome::NotInterested,
            notes: "Not a fit".to_owned(),
            ..pending.clone()
        };
        let newer = Model {
            lead_id: lead.id,
            ..tests::call_with(CallOutcome::FollowUp, Some(Utc::now() + chrono::Duration::days(1)))
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![
                vec![pending.clone()],
                vec![pending.clone()],
                vec![classified.clone()],
                vec![newer],
            ])
            .into_connection();

        classify_call(
            &db,
            pending.id,
            Classification {
                outcome: CallOutcome::NotInterested,
                notes: "Not a fit".to_owned(),
                next_follow_up: None,
                auto_call_followup: false,
            },
        )
        .await?;

        // No lead lookup or update after the latest-call check
        assert_eq!(db.into_transaction_log().len(), 4);
        Ok(())
    }
}
