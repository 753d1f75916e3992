//! Follow-up scheduling: deleting a scheduled follow-up and the live countdown
//! towards it.

use crate::error::Error;
use crate::lead_status::LeadStatus;
use crate::leads;
use crate::Id;
use chrono::{DateTime, Utc};
use entity_api::{call, lead};
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Deletes the lead's latest call carrying a follow-up and puts the lead back to
/// `active`. Without such a call only the status is reset.
pub async fn delete_follow_up(db: &DatabaseConnection, lead_id: Id) -> Result<leads::Model, Error> {
    lead::find_by_id(db, lead_id).await?;

    match call::find_latest_follow_up_by_lead_id(db, lead_id).await? {
        Some(follow_up) => crate::call::delete(db, follow_up.id).await?,
        None => debug!("Lead {lead_id} has no follow-up call to delete"),
    }

    Ok(lead::update_status(db, lead_id, LeadStatus::Active).await?)
}

/// Time left until a follow-up. Components are always non-negative; `is_overdue`
/// carries the sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub is_overdue: bool,
    /// Signed number of seconds until the follow-up
    pub total_seconds: i64,
}

impl Countdown {
    pub fn between(next_follow_up: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total_seconds = (next_follow_up - now).num_seconds();
        let remaining = total_seconds.abs();

        Countdown {
            days: remaining / 86_400,
            hours: remaining % 86_400 / 3_600,
            minutes: remaining % 3_600 / 60,
            seconds: remaining % 60,
            is_overdue: total_seconds < 0,
            total_seconds,
        }
    }
}

/// Publishes a fresh `Countdown` once per second until `cancel` fires or every
/// receiver is dropped.
pub fn watch_countdown(
    next_follow_up: DateTime<Utc>,
    cancel: CancellationToken,
) -> watch::Receiver<Countdown> {
    let (tx, rx) = watch::channel(Countdown::between(next_follow_up, Utc::now()));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(COUNTDOWN_TICK);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tx.closed() => break,
                _ = ticker.tick() => {
                    tx.send_replace(Countdown::between(next_follow_up, Utc::now()));
                }
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn countdown_breaks_remaining_time_into_components() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let next = Utc.with_ymd_and_hms(2024, 5, 3, 11, 30, 15).unwrap();

        let countdown = Countdown::between(next, now);

        assert_eq!(
            countdown,
            Countdown {
                days: 2,
                hours: 2,
                minutes: 30,
                seconds: 15,
                is_overdue: false,
                total_seconds: 2 * 86_400 + 2 * 3_600 + 30 * 60 + 15,
            }
        );
    }

    #[test]
    fn countdown_is_overdue_once_the_time_has_passed() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let next = Utc.with_ymd_and_hms(2024, 5, 1, 8, 58, 30).unwrap();

        let countdown = Countdown::between(next, now);

        assert!(countdown.is_overdue);
        assert_eq!(countdown.total_seconds, -90);
        assert_eq!((countdown.minutes, countdown.seconds), (1, 30));
    }

    #[tokio::test(start_paused = true)]
    async fn watch_countdown_publishes_until_cancelled() {
        let cancel = CancellationToken::new();
        let mut rx = watch_countdown(Utc::now() + chrono::Duration::hours(1), cancel.clone());

        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_overdue);

        tokio::time::advance(COUNTDOWN_TICK).await;
        rx.changed().await.unwrap();

        cancel.cancel();
        // The sender is dropped once the task observes the cancellation
        while rx.changed().await.is_ok() {}
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn delete_follow_up_without_follow_up_call_still_activates_the_lead() -> Result<(), Error> {
        let now = Utc::now();
        let lead = leads::Model {
            id: Id::new_v4(),
            name: "Ada".to_owned(),
            email: None,
            phone: "+15550001".to_owned(),
            department: None,
            status: LeadStatus::Contacted,
            group_id: None,
            user_id: None,
            assigned_to: None,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let active = leads::Model {
            status: LeadStatus::Active,
            ..lead.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![lead.clone()]])
            .append_query_results(vec![Vec::<crate::calls::Model>::new()])
            .append_query_results(vec![vec![lead.clone()], vec![active]])
            .into_connection();

        let updated = delete_follow_up(&db, lead.id).await?;

        assert_eq!(updated.status, LeadStatus::Active);
        Ok(())
    }
}
