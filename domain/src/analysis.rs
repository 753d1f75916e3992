//! Analysis job coordination.
//!
//! A call has at most one analysis row. Submitting a call creates that row in
//! `processing`, or puts an existing finished row back into `processing`. A row
//! already `processing` is left alone. The external service reports results later
//! and a reconciliation loop notices which jobs have finished.

use crate::analyses::Model;
use crate::analysis_status::AnalysisStatus;
use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::Id;
use call_providers::traits::analysis::Dispatcher;
use call_providers::{AnalysisRequest, Delivery};
use entity_api::{analysis, call, recording};
use log::*;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use service::config::Config;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use entity_api::analysis::{find_all, find_by_call_id, find_by_id};

/// Result of asking for a call to be analyzed.
#[derive(Debug)]
pub enum Submission {
    /// A job was created or restarted and the request dispatched.
    Started(Model),
    /// A job for this call is already processing; nothing was written or sent.
    AlreadyAnalyzing(Model),
}

impl Submission {
    pub fn analysis(&self) -> &Model {
        match self {
            Submission::Started(model) | Submission::AlreadyAnalyzing(model) => model,
        }
    }
}

/// Process-local set of calls whose analysis is in flight.
///
/// The set is not persisted. After a restart the reconciler repopulates it from
/// the in-flight rows it reads.
#[derive(Clone, Debug)]
pub struct AnalysisTracker {
    in_flight: Arc<Mutex<HashSet<Id>>>,
    active_interval: Duration,
    idle_interval: Duration,
}

impl AnalysisTracker {
    pub fn new(active_interval: Duration, idle_interval: Duration) -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            active_interval,
            idle_interval,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.analysis_active_poll_interval(),
            config.analysis_idle_poll_interval(),
        )
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, HashSet<Id>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn track(&self, call_id: Id) {
        self.calls().insert(call_id);
    }

    pub fn is_tracked(&self, call_id: Id) -> bool {
        self.calls().contains(&call_id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.calls().len()
    }

    /// Refresh interval: short while anything is in flight.
    pub fn poll_interval(&self) -> Duration {
        if self.calls().is_empty() {
            self.idle_interval
        } else {
            self.active_interval
        }
    }

    /// Drops every tracked call whose analysis in `analyses` has finished and starts
    /// tracking in-flight rows it did not know about. Returns the finished call ids.
    pub fn reconcile(&self, analyses: &[Model]) -> Vec<Id> {
        let mut calls = self.calls();
        let mut finished = Vec::new();

        for row in analyses {
            let Some(call_id) = row.call_id else { continue };
            if row.status.is_terminal() {
                if calls.remove(&call_id) {
                    finished.push(call_id);
                }
            } else {
                calls.insert(call_id);
            }
        }

        finished
    }

    /// Re-reads all analyses on the tracker's poll interval until `cancel` fires.
    /// Read failures are logged and retried on the next tick.
    pub fn spawn_reconciler(
        &self,
        db: Arc<DatabaseConnection>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            info!("Analysis reconciler started");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(tracker.poll_interval()) => {
                        match analysis::find_all(&db).await {
                            Ok(rows) => {
                                for call_id in tracker.reconcile(&rows) {
                                    info!("Analysis for call {call_id} finished");
                                }
                            }
                            Err(err) => warn!("Failed to refresh analyses: {err}"),
                        }
                    }
                }
            }
            info!("Analysis reconciler stopped");
        })
    }
}

/// Submits calls for analysis and dispatches them to the external service.
#[derive(Clone)]
pub struct Coordinator {
    tracker: AnalysisTracker,
    dispatcher: Arc<dyn Dispatcher>,
    source: String,
}

impl Coordinator {
    pub fn new(tracker: AnalysisTracker, dispatcher: Arc<dyn Dispatcher>, source: &str) -> Self {
        Self {
            tracker,
            dispatcher,
            source: source.to_owned(),
        }
    }

    pub fn tracker(&self) -> &AnalysisTracker {
        &self.tracker
    }

    /// Puts the call's analysis into `processing` and dispatches it. The recording
    /// is owned by the employee who placed the call.
    ///
    /// Returns once the job row is written. Dispatch runs in the background and its
    /// failure is only logged; the job stays `processing` until reconciled.
    pub async fn submit(&self, db: &DatabaseConnection, call_id: Id) -> Result<Submission, Error> {
        let call = call::find_by_id(db, call_id).await?;
        let owner_id = call.employee_id;
        let url = call
            .recording_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::NoRecording),
            })?;

        let existing = analysis::find_by_call_id(db, call_id).await?;
        if let Some(current) = existing.as_ref() {
            if current.status == AnalysisStatus::Processing {
                return Ok(self.already_analyzing(current.clone()));
            }
        }

        let filename = recording_filename(&url, call_id);
        let recording = recording::find_or_create(db, owner_id, &url, &filename).await?;

        let job = match existing {
            Some(previous) => analysis::reset_to_processing(db, previous, recording.id).await?,
            None => match analysis::create_for_call(
                db,
                recording.id,
                call_id,
                AnalysisStatus::Processing,
            )
            .await?
            {
                Some(job) => job,
                // A concurrent submit created the job first
                None => {
                    let current = analysis::find_by_call_id(db, call_id)
                        .await?
                        .ok_or_else(Error::not_found)?;
                    return Ok(self.already_analyzing(current));
                }
            },
        };
        self.tracker.track(call_id);

        let request = AnalysisRequest {
            url,
            name: recording.filename.clone(),
            recording_id: recording.id.to_string(),
            analysis_id: job.id.to_string(),
            user_id: owner_id.to_string(),
            call_id: call_id.to_string(),
            timestamp: chrono::Utc::now(),
            source: self.source.clone(),
        };
        self.dispatch_in_background(request);

        Ok(Submission::Started(job))
    }

    fn already_analyzing(&self, current: Model) -> Submission {
        info!("Call {:?} is already being analyzed", current.call_id);
        if let Some(call_id) = current.call_id {
            self.tracker.track(call_id);
        }
        Submission::AlreadyAnalyzing(current)
    }

    fn dispatch_in_background(&self, request: AnalysisRequest) {
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            let analysis_id = request.analysis_id.clone();
            match dispatcher.dispatch(request).await {
                Ok(Delivery::Primary) => info!("Dispatched analysis {analysis_id}"),
                Ok(Delivery::Fallback) => {
                    warn!("Dispatched analysis {analysis_id} through the fallback transport")
                }
                Err(err) => error!("Failed to dispatch analysis {analysis_id}: {err}"),
            }
        });
    }
}

/// Last path segment of the recording URL, without any query string.
fn recording_filename(url: &str, call_id: Id) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("call-{call_id}.mp3"))
}

/// Outcome reported by the analysis service for one job.
#[derive(Clone, Debug, Deserialize)]
pub struct AnalysisResult {
    pub status: AnalysisStatus,
    pub sentiment_score: Option<f64>,
    pub engagement_score: Option<f64>,
    pub confidence_score_executive: Option<f64>,
    pub confidence_score_person: Option<f64>,
    pub summary: Option<String>,
    pub error_message: Option<String>,
}

impl AnalysisResult {
    fn validate(&self) -> Result<(), Error> {
        match self.status {
            AnalysisStatus::Completed => {
                let scores = [
                    ("sentiment_score", self.sentiment_score),
                    ("engagement_score", self.engagement_score),
                    ("confidence_score_executive", self.confidence_score_executive),
                    ("confidence_score_person", self.confidence_score_person),
                ];
                for (name, score) in scores {
                    match score {
                        Some(value) if (0.0..=100.0).contains(&value) => {}
                        Some(value) => {
                            return Err(Error::validation(format!(
                                "{name} must be between 0 and 100, got {value}"
                            )))
                        }
                        None => return Err(Error::validation(format!("{name} is required"))),
                    }
                }
                Ok(())
            }
            AnalysisStatus::Failed => Ok(()),
            AnalysisStatus::Pending | AnalysisStatus::Processing => Err(Error::validation(
                "A result must be either completed or failed",
            )),
        }
    }
}

/// Stores the result of an in-flight analysis job.
pub async fn record_result(
    db: &DatabaseConnection,
    analysis_id: Id,
    result: AnalysisResult,
) -> Result<Model, Error> {
    result.validate()?;

    let existing = analysis::find_by_id(db, analysis_id).await?;
    if !existing.status.is_in_flight() {
        return Err(Error::validation(format!(
            "Analysis {analysis_id} is not in progress"
        )));
    }

    let completed = result.status == AnalysisStatus::Completed;
    let updated = analysis::update(
        db,
        analysis_id,
        Model {
            status: result.status,
            sentiment_score: result.sentiment_score.filter(|_| completed),
            engagement_score: result.engagement_score.filter(|_| completed),
            confidence_score_executive: result.confidence_score_executive.filter(|_| completed),
            confidence_score_person: result.confidence_score_person.filter(|_| completed),
            summary: result.summary,
            error_message: result.error_message.filter(|_| !completed),
            ..existing
        },
    )
    .await?;

    info!("Analysis {analysis_id} finished as {}", updated.status);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn analysis_for(call_id: Id, status: AnalysisStatus) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            recording_id: Id::new_v4(),
            call_id: Some(call_id),
            status,
            sentiment_score: None,
            engagement_score: None,
            confidence_score_executive: None,
            confidence_score_person: None,
            summary: None,
            error_message: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn completed_result() -> AnalysisResult {
        AnalysisResult {
            status: AnalysisStatus::Completed,
            sentiment_score: Some(72.5),
            engagement_score: Some(64.0),
            confidence_score_executive: Some(88.0),
            confidence_score_person: Some(51.0),
            summary: Some("Positive call".to_owned()),
            error_message: None,
        }
    }

    #[test]
    fn poll_interval_is_short_while_jobs_are_in_flight() {
        let tracker = AnalysisTracker::new(Duration::from_secs(5), Duration::from_secs(30));
        assert_eq!(tracker.poll_interval(), Duration::from_secs(30));

        tracker.track(Id::new_v4());
        assert_eq!(tracker.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn reconcile_releases_finished_calls_only() {
        let tracker = AnalysisTracker::new(Duration::from_secs(5), Duration::from_secs(30));
        let done = Id::new_v4();
        let failed = Id::new_v4();
        let running = Id::new_v4();
        for call_id in [done, failed, running] {
            tracker.track(call_id);
        }

        let finished = tracker.reconcile(&[
            analysis_for(done, AnalysisStatus::Completed),
            analysis_for(failed, AnalysisStatus::Failed),
            analysis_for(running, AnalysisStatus::Processing),
        ]);

        assert_eq!(finished.len(), 2);
        assert!(finished.contains(&done) && finished.contains(&failed));
        assert!(tracker.is_tracked(running));
        assert_eq!(tracker.in_flight_count(), 1);
    }

    #[test]
    fn reconcile_adopts_in_flight_rows_after_restart() {
        let tracker = AnalysisTracker::new(Duration::from_secs(5), Duration::from_secs(30));
        let pending = Id::new_v4();

        let finished = tracker.reconcile(&[analysis_for(pending, AnalysisStatus::Pending)]);

        assert!(finished.is_empty());
        assert!(tracker.is_tracked(pending));
    }

    #[test]
    fn recording_filename_uses_the_last_path_segment() {
        let call_id = Id::new_v4();
        assert_eq!(
            recording_filename("https://rec.example.com/a/RE123.mp3?sig=abc", call_id),
            "RE123.mp3"
        );
        assert_eq!(
            recording_filename("https://rec.example.com/", call_id),
            format!("call-{call_id}.mp3")
        );
    }

    #[test]
    fn completed_results_need_all_scores_in_range() {
        assert!(completed_result().validate().is_ok());

        let mut out_of_range = completed_result();
        out_of_range.engagement_score = Some(101.0);
        assert!(out_of_range.validate().is_err());

        let mut missing = completed_result();
        missing.confidence_score_person = None;
        assert!(missing.validate().is_err());
    }

    #[test]
    fn results_cannot_move_a_job_back_in_flight() {
        let mut result = completed_result();
        result.status = AnalysisStatus::Processing;
        assert!(result.validate().is_err());
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::calls;
    use crate::recordings;
    use async_trait::async_trait;
    use call_providers::Error as ProviderError;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use tokio::sync::mpsc;

    /// Forwards every dispatched request to a channel.
    struct ChannelDispatcher(mpsc::UnboundedSender<AnalysisRequest>);

    #[async_trait]
    impl Dispatcher for ChannelDispatcher {
        async fn dispatch(&self, request: AnalysisRequest) -> Result<Delivery, ProviderError> {
            self.0
                .send(request)
                .map_err(|err| ProviderError::Other(Box::new(err)))?;
            Ok(Delivery::Primary)
        }

        fn provider_id(&self) -> &str {
            "channel"
        }
    }

    fn coordinator() -> (Coordinator, mpsc::UnboundedReceiver<AnalysisRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let tracker = AnalysisTracker::new(Duration::from_secs(5), Duration::from_secs(30));
        (
            Coordinator::new(tracker, Arc::new(ChannelDispatcher(tx)), "crm"),
            rx,
        )
    }

    fn inserted(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn recording_for(call: &calls::Model, id: Id) -> recordings::Model {
        let now = chrono::Utc::now();
        let url = call.recording_url.clone().unwrap_or_default();
        recordings::Model {
            id,
            owner_id: call.employee_id,
            filename: recording_filename(&url, call.id),
            url,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn call_with_recording(recording_url: Option<&str>) -> calls::Model {
        let now = chrono::Utc::now();
        calls::Model {
            id: Id::new_v4(),
            lead_id: Id::new_v4(),
            employee_id: Id::new_v4(),
            outcome: Default::default(),
            notes: String::new(),
            call_date: now.into(),
            next_follow_up: None,
            auto_call_followup: false,
            call_sid: Some("CA123".to_owned()),
            from_number: None,
            to_number: None,
            duration_seconds: Some(42),
            recording_url: recording_url.map(str::to_owned),
            provider_status: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn submit_without_recording_fails_before_writing() {
        let (coordinator, _rx) = coordinator();
        let call = call_with_recording(None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![call.clone()]])
            .into_connection();

        let result = coordinator.submit(&db, call.id).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Internal(InternalErrorKind::NoRecording)
        );
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn submit_creates_a_processing_job_and_dispatches_it() -> Result<(), Error> {
        let (coordinator, mut rx) = coordinator();
        let call = call_with_recording(Some("https://rec.example.com/RE1.mp3"));
        let recording = recording_for(&call, Id::new_v4());
        let job = Model {
            recording_id: recording.id,
            ..tests::analysis_for(call.id, AnalysisStatus::Processing)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![call.clone()]])
            .append_query_results(vec![Vec::<Model>::new()])
            .append_query_results(vec![vec![recording.clone()]])
            .append_query_results(vec![vec![job.clone()]])
            .append_exec_results(vec![inserted(1), inserted(1)])
            .into_connection();

        let submission = coordinator.submit(&db, call.id).await?;

        assert!(matches!(submission, Submission::Started(_)));
        assert_eq!(submission.analysis().status, AnalysisStatus::Processing);
        assert!(coordinator.tracker().is_tracked(call.id));

        let request = rx.recv().await.unwrap();
        assert_eq!(request.analysis_id, job.id.to_string());
        assert_eq!(request.recording_id, recording.id.to_string());
        assert_eq!(request.call_id, call.id.to_string());
        assert_eq!(request.source, "crm");
        assert_eq!(request.user_id, call.employee_id.to_string());
        Ok(())
    }

    #[tokio::test]
    async fn recording_is_owned_by_the_calling_employee() -> Result<(), Error> {
        let (coordinator, _rx) = coordinator();
        let call = call_with_recording(Some("https://rec.example.com/RE3.mp3"));
        let recording = recording_for(&call, Id::new_v4());
        let job = Model {
            recording_id: recording.id,
            ..tests::analysis_for(call.id, AnalysisStatus::Processing)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![call.clone()]])
            .append_query_results(vec![Vec::<Model>::new()])
            .append_query_results(vec![vec![recording]])
            .append_query_results(vec![vec![job]])
            .append_exec_results(vec![inserted(1), inserted(1)])
            .into_connection();

        coordinator.submit(&db, call.id).await?;

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(&call.employee_id.to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn losing_a_concurrent_submit_reports_already_analyzing() -> Result<(), Error> {
        let (coordinator, mut rx) = coordinator();
        let call = call_with_recording(Some("https://rec.example.com/RE1.mp3"));
        let recording = recording_for(&call, Id::new_v4());
        let winner = Model {
            recording_id: recording.id,
            ..tests::analysis_for(call.id, AnalysisStatus::Processing)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![call.clone()]])
            .append_query_results(vec![Vec::<Model>::new()])
            .append_query_results(vec![vec![recording]])
            .append_query_results(vec![vec![winner.clone()]])
            // The recording already existed, the job insert hit the unique index
            .append_exec_results(vec![inserted(0), inserted(0)])
            .into_connection();

        let submission = coordinator.submit(&db, call.id).await?;

        match submission {
            Submission::AlreadyAnalyzing(existing) => assert_eq!(existing.id, winner.id),
            other => panic!("expected AlreadyAnalyzing, got {other:?}"),
        }
        assert!(coordinator.tracker().is_tracked(call.id));
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn second_submit_while_processing_writes_nothing() -> Result<(), Error> {
        let (coordinator, mut rx) = coordinator();
        let call = call_with_recording(Some("https://rec.example.com/RE1.mp3"));
        let processing = tests::analysis_for(call.id, AnalysisStatus::Processing);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![call.clone()]])
            .append_query_results(vec![vec![processing.clone()]])
            .into_connection();

        let submission = coordinator.submit(&db, call.id).await?;

        match submission {
            Submission::AlreadyAnalyzing(existing) => assert_eq!(existing.id, processing.id),
            other => panic!("expected AlreadyAnalyzing, got {other:?}"),
        }
        // Two reads, no writes
        assert_eq!(db.into_transaction_log().len(), 2);
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn dispatch_failure_leaves_the_job_processing() -> Result<(), Error> {
        let mut dispatcher = crate::mocks::MockAnalysisDispatcher::new();
        dispatcher
            .expect_dispatch()
            .returning(|_| Err(ProviderError::Network("connection refused".to_owned())));
        let tracker = AnalysisTracker::new(Duration::from_secs(5), Duration::from_secs(30));
        let coordinator = Coordinator::new(tracker, Arc::new(dispatcher), "crm");

        let call = call_with_recording(Some("https://rec.example.com/RE2.mp3"));
        let failed = tests::analysis_for(call.id, AnalysisStatus::Failed);
        let recording = recording_for(&call, failed.recording_id);
        let restarted = Model {
            status: AnalysisStatus::Processing,
            ..failed.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![call.clone()]])
            .append_query_results(vec![vec![failed.clone()]])
            .append_query_results(vec![vec![recording]])
            .append_query_results(vec![vec![restarted.clone()]])
            .append_exec_results(vec![inserted(0)])
            .into_connection();

        let submission = coordinator.submit(&db, call.id).await?;

        // A failed job is restarted in place
        assert_eq!(submission.analysis().id, failed.id);
        assert_eq!(submission.analysis().status, AnalysisStatus::Processing);
        Ok(())
    }

    #[tokio::test]
    async fn record_result_rejects_finished_jobs() {
        let finished = tests::analysis_for(Id::new_v4(), AnalysisStatus::Completed);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![finished.clone()]])
            .into_connection();

        let result = record_result(
            &db,
            finished.id,
            AnalysisResult {
                status: AnalysisStatus::Failed,
                sentiment_score: None,
                engagement_score: None,
                confidence_score_executive: None,
                confidence_score_person: None,
                summary: None,
                error_message: Some("audio unavailable".to_owned()),
            },
        )
        .await;

        assert!(matches!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn reconciler_survives_a_failed_read_and_releases_finished_calls() {
        let call_id = Id::new_v4();
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors(vec![DbErr::Custom("connection reset".to_owned())])
                .append_query_results(vec![vec![tests::analysis_for(
                    call_id,
                    AnalysisStatus::Completed,
                )]])
                .into_connection(),
        );
        let tracker = AnalysisTracker::new(Duration::from_secs(5), Duration::from_secs(30));
        tracker.track(call_id);
        let cancel = CancellationToken::new();

        let handle = tracker.spawn_reconciler(db, cancel.clone());

        // First tick at 5s fails, the second at 10s reads the finished job
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(tracker.is_tracked(call_id));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!tracker.is_tracked(call_id));
        assert_eq!(tracker.poll_interval(), Duration::from_secs(30));

        cancel.cancel();
        handle.await.unwrap();
    }
}
