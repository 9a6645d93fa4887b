use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fountain")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub longitude: f64,
    pub latitude: f64,
    pub has_bottle_filler: bool,
    /// Floor the fountain sits on, 1-based.
    pub floor: i32,
    pub description: String,

    pub building_id: i32,
    #[sea_orm(belongs_to, from = "building_id", to = "id")]
    pub building: HasOne<super::building::Entity>,

    #[sea_orm(has_many)]
    pub reviews: HasMany<super::review::Entity>,

    #[sea_orm(has_many)]
    pub likes: HasMany<super::like::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
