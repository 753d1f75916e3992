//! Types for outbound calls placed through the telephony proxy.

use serde::{Deserialize, Deserializer, Serialize};

/// Call status as reported by the provider.
///
/// Calls move from Queued/Ringing through InProgress to one of the terminal
/// states. Anything the provider reports that is not listed here decodes as
/// `Unknown` and is treated as still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallStatus {
    Queued,
    Initiated,
    Ringing,
    InProgress,
    Completed,
    Busy,
    NoAnswer,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl CallStatus {
    /// Whether polling can stop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallStatus::Completed
                | CallStatus::Busy
                | CallStatus::NoAnswer
                | CallStatus::Failed
                | CallStatus::Canceled
        )
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallStatus::Queued => write!(fmt, "queued"),
            CallStatus::Initiated => write!(fmt, "initiated"),
            CallStatus::Ringing => write!(fmt, "ringing"),
            CallStatus::InProgress => write!(fmt, "in-progress"),
            CallStatus::Completed => write!(fmt, "completed"),
            CallStatus::Busy => write!(fmt, "busy"),
            CallStatus::NoAnswer => write!(fmt, "no-answer"),
            CallStatus::Failed => write!(fmt, "failed"),
            CallStatus::Canceled => write!(fmt, "canceled"),
            CallStatus::Unknown => write!(fmt, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub from: String,
    pub to: String,
    pub caller_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub sid: String,
    pub status: CallStatus,
}

/// Status and metadata of a call session. Metadata fields fill in as the call
/// progresses; most are only present once the call is completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStatusReport {
    pub status: CallStatus,
    /// Call length in seconds. Providers send this either as a number or a string.
    #[serde(default, deserialize_with = "seconds_from_number_or_string")]
    pub duration: Option<i32>,
    #[serde(default)]
    pub recording_url: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub answered_by: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
}

impl CallStatusReport {
    pub fn new(status: CallStatus) -> Self {
        Self {
            status,
            duration: None,
            recording_url: None,
            start_time: None,
            end_time: None,
            answered_by: None,
            direction: None,
        }
    }
}

fn seconds_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(i32),
        Text(String),
    }

    match Option::<Seconds>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Seconds::Number(seconds)) => Ok(Some(seconds)),
        Some(Seconds::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Seconds::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_status_strings_decode_to_call_status() {
        let decode = |s: &str| serde_json::from_value::<CallStatus>(json!(s)).unwrap();

        assert_eq!(decode("no-answer"), CallStatus::NoAnswer);
        assert_eq!(decode("in-progress"), CallStatus::InProgress);
        assert_eq!(decode("busy"), CallStatus::Busy);
        assert_eq!(decode("something-new"), CallStatus::Unknown);
    }

    #[test]
    fn only_final_statuses_are_terminal() {
        assert!(CallStatus::Completed.is_terminal());
        assert!(CallStatus::NoAnswer.is_terminal());
        assert!(CallStatus::Canceled.is_terminal());
        assert!(!CallStatus::Ringing.is_terminal());
        assert!(!CallStatus::Unknown.is_terminal());
    }

    #[test]
    fn status_report_accepts_duration_as_string() {
        let report: CallStatusReport = serde_json::from_value(json!({
            "status": "completed",
            "duration": "42",
            "recordingUrl": "https://recordings.example.com/RE1.mp3",
            "answeredBy": "human",
            "direction": "outbound-api"
        }))
        .unwrap();

        assert_eq!(report.status, CallStatus::Completed);
        assert_eq!(report.duration, Some(42));
        assert_eq!(
            report.recording_url.as_deref(),
            Some("https://recordings.example.com/RE1.mp3")
        );
        assert!(report.start_time.is_none());
    }

    #[test]
    fn status_report_tolerates_missing_metadata() {
        let report: CallStatusReport =
            serde_json::from_value(json!({ "status": "ringing", "duration": null })).unwrap();

        assert_eq!(report, CallStatusReport::new(CallStatus::Ringing));
    }

    #[test]
    fn connect_request_uses_caller_id_key() {
        let request = ConnectRequest {
            from: "+15550101".to_owned(),
            to: "+15550202".to_owned(),
            caller_id: "+15550100".to_owned(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["callerId"], "+15550100");
    }
}
