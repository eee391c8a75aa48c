//! Lead intake and listing. Deleting is a soft archive: the row and its
//! ledgers survive, but every read and transition treats the lead as
//! gone.

use chrono::Utc;
use entity::lead::{self, Status};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::progression::{find_live_lead, stage_label};

#[derive(Debug, Clone, Deserialize)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub lead_type: Option<String>,
    pub location: Option<String>,
}

/// A lead with its current catalog label resolved, for list/detail
/// responses.
#[derive(Debug, Clone, Serialize)]
pub struct LeadView {
    #[serde(flatten)]
    pub lead: lead::Model,
    pub stage_label: Option<String>,
}

impl From<lead::Model> for LeadView {
    fn from(lead: lead::Model) -> Self {
        let stage_label = lead.stage.map(|stage| stage_label(stage).to_string());
        LeadView { lead, stage_label }
    }
}

pub async fn create_lead(
    db: &DatabaseConnection,
    input: NewLead,
    created_by: Uuid,
) -> ApiResult<lead::Model> {
    let first_name = input.first_name.trim().to_string();
    let last_name = input.last_name.trim().to_string();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(ApiError::validation("First name and last name are required"));
    }
    let email = input.email.trim().to_string();
    if !is_plausible_email(&email) {
        return Err(ApiError::validation("Please provide valid email"));
    }
    let phone_number = input.phone_number.trim().to_string();
    if phone_number.is_empty() || !phone_number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation("Please provide valid phone"));
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = lead::Model {
        id: Uuid::new_v4(),
        first_name,
        last_name,
        email,
        phone_number,
        lead_type: input.lead_type.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string),
        location: input.location.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string),
        status: Status::Active,
        stage: None,
        current_entry_id: None,
        created_by: Some(created_by),
        created_at: now,
        updated_at: now,
    };
    let active = lead::ActiveModel {
        id: Set(model.id),
        first_name: Set(model.first_name.clone()),
        last_name: Set(model.last_name.clone()),
        email: Set(model.email.clone()),
        phone_number: Set(model.phone_number.clone()),
        lead_type: Set(model.lead_type.clone()),
        location: Set(model.location.clone()),
        status: Set(model.status),
        stage: Set(None),
        current_entry_id: Set(None),
        created_by: Set(model.created_by),
        created_at: Set(model.created_at),
        updated_at: Set(model.updated_at),
    };
    lead::Entity::insert(active)
        .exec_without_returning(db)
        .await?;
    info!(lead = %model.id, "lead created");
    Ok(model)
}

/// Active leads, furthest-progressed first, then newest intake first.
pub async fn list_leads(db: &DatabaseConnection) -> ApiResult<Vec<LeadView>> {
    let rows = lead::Entity::find()
        .filter(lead::Column::Status.eq(Status::Active))
        .order_by_with_nulls(lead::Column::Stage, Order::Desc, NullOrdering::Last)
        .order_by_desc(lead::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(LeadView::from).collect())
}

pub async fn get_lead(db: &DatabaseConnection, lead_id: Uuid) -> ApiResult<LeadView> {
    Ok(find_live_lead(db, lead_id).await?.into())
}

/// Soft delete. Idempotent archive would mask typos in the id, so an
/// already-archived lead is reported as not found.
pub async fn archive_lead(db: &DatabaseConnection, lead_id: Uuid) -> ApiResult<()> {
    let lead = find_live_lead(db, lead_id).await?;
    let mut active: lead::ActiveModel = lead.into();
    active.status = Set(Status::Archived);
    active.updated_at = Set(Utc::now().into());
    active.update(db).await?;
    info!(lead = %lead_id, "lead archived");
    Ok(())
}

pub async fn list_archived(db: &DatabaseConnection) -> ApiResult<Vec<LeadView>> {
    let rows = lead::Entity::find()
        .filter(lead::Column::Status.eq(Status::Archived))
        .order_by_desc(lead::Column::UpdatedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(LeadView::from).collect())
}

/// Light syntactic check: one `@` with a dotted domain. Deliverability
/// is the mail provider's problem.
fn is_plausible_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check_accepts_normal_addresses() {
        assert!(is_plausible_email("jo.bloggs@example.co.uk"));
        assert!(is_plausible_email("x@y.z"));
    }

    #[test]
    fn email_check_rejects_malformed_addresses() {
        assert!(!is_plausible_email("not-an-email"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("jo@"));
        assert!(!is_plausible_email("jo@nodots"));
        assert!(!is_plausible_email("jo bloggs@example.com"));
    }
}
