use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A prospective sale tracked through the progression pipeline. The two
/// pointer columns (`stage`, `current_entry_id`) always name the lead's
/// most recent ledger row; history lives in `stage_entry`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "lead")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub lead_type: Option<String>,
    pub location: Option<String>,
    pub status: Status,
    pub stage: Option<StageCode>,
    pub current_entry_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    StageEntry,
    Offer,
    Followup,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::StageEntry => Entity::has_many(super::stage_entry::Entity).into(),
            Relation::Offer => Entity::has_many(super::offer::Entity).into(),
            Relation::Followup => Entity::has_many(super::followup::Entity).into(),
        }
    }
}

/// Soft-delete flag. Archived leads keep their ledger but are invisible
/// to every read and reject further transitions.
#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
pub enum Status {
    #[sea_orm(num_value = 0)]
    Archived,
    #[sea_orm(num_value = 1)]
    Active,
}

/// Pipeline stage codes 1..=10. Distinct from `offer::Decision` even
/// though the low values overlap numerically.
#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
pub enum StageCode {
    #[sea_orm(num_value = 1)]
    OfferAccepted,
    #[sea_orm(num_value = 2)]
    OfferRejected,
    #[sea_orm(num_value = 3)]
    Withdrawn,
    #[sea_orm(num_value = 4)]
    SolicitorEngaged,
    #[sea_orm(num_value = 5)]
    Mortgage,
    #[sea_orm(num_value = 6)]
    SurveySearch,
    #[sea_orm(num_value = 7)]
    Conveyancing,
    #[sea_orm(num_value = 8)]
    SalesInvoiceCredited,
    #[sea_orm(num_value = 9)]
    ExchangeOfContract,
    #[sea_orm(num_value = 10)]
    Completion,
}

impl StageCode {
    pub fn as_i16(self) -> i16 {
        self.to_value()
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        Self::try_from_value(&value).ok()
    }
}

impl ActiveModelBehavior for ActiveModel {}
