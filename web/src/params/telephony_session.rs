use domain::Id;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateParams {
    #[schema(value_type = Uuid)]
    pub(crate) lead_id: Id,
    /// One of the company's calling numbers
    pub(crate) from: String,
    pub(crate) to: String,
}
