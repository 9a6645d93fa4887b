use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Row existence is the "liked" state: one row per (user, fountain) pair,
/// deleted when the user toggles the like off.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "like")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(primary_key)]
    pub fountain_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
    #[sea_orm(belongs_to, from = "fountain_id", to = "id")]
    pub fountain: HasOne<super::fountain::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
