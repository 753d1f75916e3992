use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct UpdateParams {
    /// Number shown to the called party
    pub(crate) caller_id: Option<String>,
    /// Numbers agents may place calls from
    #[serde(default)]
    pub(crate) from_numbers: Vec<String>,
}
