use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Filter condition values stored in `filter_status`:
/// 0 = needs replacement, 1 = ok, 2 = good.
pub const FILTER_NEEDS_REPLACEMENT: i32 = 0;
pub const FILTER_OK: i32 = 1;
pub const FILTER_GOOD: i32 = 2;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub comment: String,
    /// 1-5 rating dimensions.
    pub taste: i32,
    pub temperature: i32,
    pub flow: i32,
    pub filter_status: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub fountain_id: i32,
    #[sea_orm(belongs_to, from = "fountain_id", to = "id")]
    pub fountain: HasOne<super::fountain::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
