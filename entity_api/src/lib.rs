pub use entity::{
    analyses, analysis_status, call_outcome, calls, company_settings, employees, lead_groups,
    lead_status, leads, managers, recordings, removed_leads, Id,
};

pub mod analysis;
pub mod call;
pub mod company_setting;
pub mod employee;
pub mod error;
pub mod lead;
pub mod lead_group;
pub mod manager;
pub mod mutate;
pub mod query;
pub mod recording;
pub mod removed_lead;

pub(crate) fn uuid_parse_str(uuid_str: &str) -> Result<Id, error::Error> {
    Id::parse_str(uuid_str).map_err(|_| error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::InvalidQueryTerm,
    })
}

/// Parses a comma separated list of ids, as sent by bulk endpoints in query strings.
pub fn parse_id_list(ids: &str) -> Result<Vec<Id>, error::Error> {
    ids.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(uuid_parse_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_parse_str_parses_valid_uuid() {
        let uuid_str = "a98c3295-0933-44cb-89db-7db0f7250fb1";
        let uuid = uuid_parse_str(uuid_str).unwrap();
        assert_eq!(uuid.to_string(), uuid_str);
    }

    #[test]
    fn uuid_parse_str_returns_error_for_invalid_uuid() {
        let result = uuid_parse_str("invalid");
        assert!(result.is_err());
    }

    #[test]
    fn parse_id_list_skips_blank_entries() {
        let ids = parse_id_list(
            "a98c3295-0933-44cb-89db-7db0f7250fb1, ,0b9e1a52-3a54-4a37-9d2a-6c1f3f0b1d11,",
        )
        .unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn parse_id_list_rejects_malformed_ids() {
        let result = parse_id_list("a98c3295-0933-44cb-89db-7db0f7250fb1,nope");
        assert_eq!(
            result.unwrap_err().error_kind,
            error::EntityApiErrorKind::InvalidQueryTerm
        );
    }
}
