//! SeaORM Entity for the analyses table.
//! Tracks an analysis job for a call recording. Scores are filled in by the
//! external analysis service once the job completes.

use crate::analysis_status::AnalysisStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::analyses::Model)]
#[sea_orm(schema_name = "crm", table_name = "analyses")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub recording_id: Id,

    /// Call this analysis belongs to, once linked
    #[schema(value_type = Option<Uuid>)]
    pub call_id: Option<Id>,

    pub status: AnalysisStatus,

    /// Sentiment score (0 - 100)
    pub sentiment_score: Option<f64>,

    /// Engagement score (0 - 100)
    pub engagement_score: Option<f64>,

    /// Confidence of the calling employee (0 - 100)
    pub confidence_score_executive: Option<f64>,

    /// Confidence of the lead (0 - 100)
    pub confidence_score_person: Option<f64>,

    #[sea_orm(column_type = "Text")]
    pub summary: Option<String>,

    /// Error message if the analysis failed
    pub error_message: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recordings::Entity",
        from = "Column::RecordingId",
        to = "super::recordings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Recordings,

    #[sea_orm(
        belongs_to = "super::calls::Entity",
        from = "Column::CallId",
        to = "super::calls::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Calls,
}

impl Related<super::recordings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recordings.def()
    }
}

impl Related<super::calls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Calls.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
