use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One generation attempt. Written once, never updated.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "generation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub prompt: String,

    /// Uploaded (normalized) source image. NULL for create-mode attempts.
    #[sea_orm(column_type = "Text", nullable)]
    pub original_url: Option<String>,

    /// Real artifact URL or an inline placeholder `data:` URL.
    #[sea_orm(column_type = "Text")]
    pub generated_url: String,

    /// Username of the requesting user.
    #[sea_orm(indexed)]
    pub user: String,

    #[sea_orm(indexed)]
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
