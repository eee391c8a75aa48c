//! Demo data for local development and smoke tests: two users, a few
//! leads, a short progression and offer history, and open follow-ups.

use chrono::Utc;
use entity::lead::{self, Status};
use entity::offer::Decision;
use entity::{followup, user, user_secret};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::error::ApiResult;
use crate::offers::record_offer;
use crate::progression::{record_transition, StagePayload};

#[derive(Debug, Clone)]
pub struct SeededRecords {
    pub users: Vec<user::Model>,
    pub leads: Vec<lead::Model>,
}

impl SeededRecords {
    pub fn user_email(&self, email: &str) -> Option<&user::Model> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn lead_email(&self, email: &str) -> Option<&lead::Model> {
        self.leads.iter().find(|l| l.email == email)
    }
}

pub async fn seed_demo(db: &DatabaseConnection) -> ApiResult<SeededRecords> {
    let seeded_at: DateTimeWithTimeZone = Utc::now().into();
    let agent = insert_seed_user(db, "agent@propline.test", "Agent Amara", "agentpass", seeded_at).await?;
    let manager =
        insert_seed_user(db, "manager@propline.test", "Manager Moss", "managerpass", seeded_at).await?;

    let maple = insert_seed_lead(
        db,
        &agent,
        "Priya",
        "Shah",
        "priya.shah@buyers.test",
        "07700900101",
        Some("Buyer"),
        Some("14 Maple Row, Leeds"),
        seeded_at,
    )
    .await?;
    let harbour = insert_seed_lead(
        db,
        &agent,
        "Tomasz",
        "Kowalski",
        "tomasz.k@buyers.test",
        "07700900102",
        Some("Buyer"),
        Some("3 Harbour View, Bristol"),
        seeded_at,
    )
    .await?;
    let fresh = insert_seed_lead(
        db,
        &manager,
        "Elena",
        "Petrova",
        "elena.petrova@buyers.test",
        "07700900103",
        None,
        None,
        seeded_at,
    )
    .await?;

    // Maple Row has progressed to Mortgage; Harbour View only has an
    // accepted offer so far.
    record_offer(db, maple.id, agent.id, 240_000_00, Decision::Rejected).await?;
    record_offer(db, maple.id, agent.id, 252_500_00, Decision::Accepted).await?;
    record_transition(
        db,
        maple.id,
        agent.id,
        StagePayload::OfferAccepted { amount: 252_500_00 },
    )
    .await?;
    record_transition(
        db,
        maple.id,
        agent.id,
        StagePayload::SolicitorEngaged {
            company_name: "Harker & Co".into(),
            address: "9 Chancery Lane, London".into(),
            solicitor_name: "June Harker".into(),
            contact_number: "02079460000".into(),
            email: "june@harker.test".into(),
        },
    )
    .await?;
    record_transition(
        db,
        maple.id,
        agent.id,
        StagePayload::Mortgage {
            mortgage_status: "yes".into(),
            mortgage_amount: Some(200_000_00),
        },
    )
    .await?;

    record_offer(db, harbour.id, agent.id, 315_000_00, Decision::Accepted).await?;
    record_transition(
        db,
        harbour.id,
        agent.id,
        StagePayload::OfferAccepted { amount: 315_000_00 },
    )
    .await?;

    let followup_at = Utc::now().date_naive() + chrono::Duration::days(3);
    followup::ActiveModel {
        id: Set(Uuid::new_v4()),
        lead_id: Set(fresh.id),
        followup_date: Set(followup_at),
        summary: Set("Call back about viewing availability".into()),
        state: Set(followup::State::Open),
        created_by: Set(Some(manager.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
    }
    .insert(db)
    .await?;

    Ok(SeededRecords {
        users: vec![agent, manager],
        leads: vec![maple, harbour, fresh],
    })
}

async fn insert_seed_user(
    db: &DatabaseConnection,
    email: &str,
    display_name: &str,
    password: &str,
    seeded_at: DateTimeWithTimeZone,
) -> ApiResult<user::Model> {
    let record = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.into()),
        display_name: Set(display_name.into()),
        is_active: Set(true),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
    }
    .insert(db)
    .await?;
    user_secret::ActiveModel {
        user_id: Set(record.id),
        password_hash: Set(hash_password(password)?),
        updated_at: Set(seeded_at),
    }
    .insert(db)
    .await?;
    Ok(record)
}

#[allow(clippy::too_many_arguments)]
async fn insert_seed_lead(
    db: &DatabaseConnection,
    created_by: &user::Model,
    first_name: &str,
    last_name: &str,
    email: &str,
    phone_number: &str,
    lead_type: Option<&str>,
    location: Option<&str>,
    seeded_at: DateTimeWithTimeZone,
) -> ApiResult<lead::Model> {
    Ok(lead::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(first_name.into()),
        last_name: Set(last_name.into()),
        email: Set(email.into()),
        phone_number: Set(phone_number.into()),
        lead_type: Set(lead_type.map(str::to_string)),
        location: Set(location.map(str::to_string)),
        status: Set(Status::Active),
        stage: Set(None),
        current_entry_id: Set(None),
        created_by: Set(Some(created_by.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
    }
    .insert(db)
    .await?)
}
