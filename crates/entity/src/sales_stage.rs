use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Master stage catalog: code -> human label. Seeded by migration and
/// treated as immutable reference data at runtime.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "sales_stage")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: i16,
    pub label: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
