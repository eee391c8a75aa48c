use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only offer decision log. Purely observational: inserting a row
/// never moves the lead's progression pointer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "offer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub lead_id: Uuid,
    pub recorded_by: Uuid,
    pub amount: i64,
    pub decision: Decision,
    pub recorded_at: DateTimeWithTimeZone,
}

/// Offer decision codes 1..=3. Unrelated to `lead::StageCode` despite
/// the numeric overlap; the two domains never share a type.
#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
pub enum Decision {
    #[sea_orm(num_value = 1)]
    Accepted,
    #[sea_orm(num_value = 2)]
    Rejected,
    #[sea_orm(num_value = 3)]
    Withdrawn,
}

impl Decision {
    pub fn as_i16(self) -> i16 {
        self.to_value()
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        Self::try_from_value(&value).ok()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lead::Entity",
        from = "Column::LeadId",
        to = "super::lead::Column::Id",
        on_delete = "Cascade"
    )]
    Lead,
}

impl Related<super::lead::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lead.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
