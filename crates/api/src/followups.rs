//! Follow-up reminders attached to leads. Unlike the stage ledger these
//! rows are mutable: reschedules and completions update in place.

use chrono::{Duration, NaiveDate, Utc};
use entity::followup::{self, State};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::progression::{find_live_lead, parse_display_date};

#[derive(Debug, Clone, Deserialize)]
pub struct NewFollowup {
    pub lead_id: Uuid,
    /// DD-MM-YYYY; one week out when omitted.
    pub followup_date: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FollowupUpdate {
    pub followup_date: Option<String>,
    pub summary: Option<String>,
    pub state: Option<State>,
}

pub async fn create_followup(
    db: &DatabaseConnection,
    input: NewFollowup,
    created_by: Uuid,
) -> ApiResult<followup::Model> {
    let lead = find_live_lead(db, input.lead_id).await?;
    let summary = input.summary.trim().to_string();
    if summary.is_empty() {
        return Err(ApiError::validation("Summary is required"));
    }
    let followup_date = match &input.followup_date {
        Some(raw) => parse_display_date("followup_date", raw)?,
        None => Utc::now().date_naive() + Duration::days(7),
    };

    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = followup::Model {
        id: Uuid::new_v4(),
        lead_id: lead.id,
        followup_date,
        summary,
        state: State::Open,
        created_by: Some(created_by),
        created_at: now,
        updated_at: now,
    };
    let active = followup::ActiveModel {
        id: Set(model.id),
        lead_id: Set(model.lead_id),
        followup_date: Set(model.followup_date),
        summary: Set(model.summary.clone()),
        state: Set(model.state),
        created_by: Set(model.created_by),
        created_at: Set(model.created_at),
        updated_at: Set(model.updated_at),
    };
    followup::Entity::insert(active)
        .exec_without_returning(db)
        .await?;
    Ok(model)
}

/// Follow-ups, soonest first, optionally narrowed to one lead.
pub async fn list_followups(
    db: &DatabaseConnection,
    lead_id: Option<Uuid>,
) -> ApiResult<Vec<followup::Model>> {
    let mut query = followup::Entity::find();
    if let Some(lead_id) = lead_id {
        query = query.filter(followup::Column::LeadId.eq(lead_id));
    }
    Ok(query
        .order_by_asc(followup::Column::FollowupDate)
        .order_by_asc(followup::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn update_followup(
    db: &DatabaseConnection,
    followup_id: Uuid,
    update: FollowupUpdate,
) -> ApiResult<followup::Model> {
    let existing = followup::Entity::find_by_id(followup_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Follow-up not found"))?;
    let mut active: followup::ActiveModel = existing.into();
    if let Some(raw) = &update.followup_date {
        active.followup_date = Set(parse_display_date("followup_date", raw)?);
    }
    if let Some(summary) = &update.summary {
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(ApiError::validation("Summary is required"));
        }
        active.summary = Set(summary.to_string());
    }
    if let Some(state) = update.state {
        active.state = Set(state);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

/// Open follow-ups due from `today` onward, soonest first. The cutoff is
/// a parameter so tests do not depend on the wall clock.
pub async fn dashboard(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> ApiResult<Vec<followup::Model>> {
    Ok(followup::Entity::find()
        .filter(followup::Column::State.eq(State::Open))
        .filter(followup::Column::FollowupDate.gte(today))
        .order_by_asc(followup::Column::FollowupDate)
        .order_by_asc(followup::Column::CreatedAt)
        .all(db)
        .await?)
}
