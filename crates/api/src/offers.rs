//! The offer sub-ledger. Offers are append-only like stage entries but
//! live in their own table and never move the lead's stage pointer.

use chrono::Utc;
use entity::offer::{self, Decision};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::progression::find_live_lead;

/// Confirmation message for a recorded decision, worded the way the
/// clients expect.
pub fn decision_message(decision: Decision) -> &'static str {
    match decision {
        Decision::Accepted => "Offer accepted successfully",
        Decision::Rejected => "Offer rejected",
        Decision::Withdrawn => "Withdrawn successfully",
    }
}

/// Append one offer row for a live lead. The lead's `stage` and
/// `current_entry_id` columns are left untouched.
pub async fn record_offer(
    db: &DatabaseConnection,
    lead_id: Uuid,
    recorded_by: Uuid,
    amount: i64,
    decision: Decision,
) -> ApiResult<offer::Model> {
    let lead = find_live_lead(db, lead_id).await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let row = offer::Model {
        id: Uuid::new_v4(),
        lead_id: lead.id,
        recorded_by,
        amount,
        decision,
        recorded_at: now,
    };
    let active = offer::ActiveModel {
        id: Set(row.id),
        lead_id: Set(row.lead_id),
        recorded_by: Set(row.recorded_by),
        amount: Set(row.amount),
        decision: Set(row.decision),
        recorded_at: Set(row.recorded_at),
    };
    offer::Entity::insert(active)
        .exec_without_returning(db)
        .await?;
    info!(lead = %lead_id, decision = decision.as_i16(), "offer recorded");
    Ok(row)
}

/// Offer rows, newest first, optionally narrowed to one lead.
pub async fn list_offers(
    db: &DatabaseConnection,
    lead_id: Option<Uuid>,
) -> ApiResult<Vec<offer::Model>> {
    let mut query = offer::Entity::find();
    if let Some(lead_id) = lead_id {
        query = query.filter(offer::Column::LeadId.eq(lead_id));
    }
    Ok(query
        .order_by_desc(offer::Column::RecordedAt)
        .order_by_desc(offer::Column::Id)
        .all(db)
        .await?)
}
