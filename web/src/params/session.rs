use domain::session::Role;
use domain::Id;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct LoginParams {
    /// admin, manager or employee
    #[schema(value_type = String)]
    pub(crate) role: Role,
    /// Manager or employee id matching `role`
    #[schema(value_type = Uuid)]
    pub(crate) user_id: Id,
}
