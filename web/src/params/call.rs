use chrono::{DateTime, Utc};
use domain::call::Classification;
use domain::call_outcome::CallOutcome;
use domain::Id;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateParams {
    #[schema(value_type = Uuid)]
    pub(crate) lead_id: Id,
    #[serde(flatten)]
    pub(crate) classification: ClassificationParams,
}

/// The agent's outcome form for a call.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ClassificationParams {
    pub(crate) outcome: CallOutcome,
    #[serde(default)]
    pub(crate) notes: String,
    /// Required and in the future for follow_up outcomes
    pub(crate) next_follow_up: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) auto_call_followup: bool,
}

impl From<ClassificationParams> for Classification {
    fn from(params: ClassificationParams) -> Self {
        Classification {
            outcome: params.outcome,
            notes: params.notes,
            next_follow_up: params.next_follow_up,
            auto_call_followup: params.auto_call_followup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_params_accept_a_flat_body() {
        let lead_id = Id::new_v4();
        let params: CreateParams = serde_json::from_value(serde_json::json!({
            "lead_id": lead_id,
            "outcome": "follow_up",
            "notes": "Call back next week",
            "next_follow_up": "2030-01-01T09:00:00Z",
            "auto_call_followup": true
        }))
        .unwrap();

        assert_eq!(params.lead_id, lead_id);
        let classification = Classification::from(params.classification);
        assert_eq!(classification.outcome, CallOutcome::FollowUp);
        assert!(classification.auto_call_followup);
    }
}
