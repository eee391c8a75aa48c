mod common;

use api::error::ApiError;
use api::leads::{archive_lead, create_lead, get_lead, list_archived, list_leads, NewLead};
use api::progression::{record_transition, StagePayload};
use entity::lead::{self, StageCode, Status};
use sea_orm::EntityTrait;

fn new_lead(email: &str) -> NewLead {
    NewLead {
        first_name: "Priya".into(),
        last_name: "Shah".into(),
        email: email.into(),
        phone_number: "07700900123".into(),
        lead_type: Some("Buyer".into()),
        location: Some("Leeds".into()),
    }
}

#[tokio::test]
async fn create_persists_and_starts_unstaged() {
    let db = common::setup_db().await;
    let actor = common::insert_user(&db, "agent@propline.test").await;

    let created = create_lead(&db, new_lead("priya@buyers.test"), actor.id)
        .await
        .unwrap();
    assert_eq!(created.status, Status::Active);
    assert_eq!(created.stage, None);
    assert_eq!(created.current_entry_id, None);
    assert_eq!(created.created_by, Some(actor.id));

    let stored = lead::Entity::find_by_id(created.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, created);
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let db = common::setup_db().await;
    let actor = common::insert_user(&db, "agent@propline.test").await;

    let mut missing_name = new_lead("priya@buyers.test");
    missing_name.first_name = "  ".into();
    let err = create_lead(&db, missing_name, actor.id).await.unwrap_err();
    assert_eq!(err.to_string(), "First name and last name are required");

    let mut bad_email = new_lead("not-an-email");
    bad_email.email = "not-an-email".into();
    let err = create_lead(&db, bad_email, actor.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Please provide valid email");

    let mut bad_phone = new_lead("priya@buyers.test");
    bad_phone.phone_number = "0770 090 0123".into();
    let err = create_lead(&db, bad_phone, actor.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Please provide valid phone");
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn list_orders_by_furthest_stage_and_labels_it() {
    let db = common::setup_db().await;
    let actor = common::insert_user(&db, "agent@propline.test").await;
    let fresh = create_lead(&db, new_lead("fresh@buyers.test"), actor.id)
        .await
        .unwrap();
    let advanced = create_lead(&db, new_lead("advanced@buyers.test"), actor.id)
        .await
        .unwrap();
    record_transition(
        &db,
        advanced.id,
        actor.id,
        StagePayload::Mortgage {
            mortgage_status: "no".into(),
            mortgage_amount: None,
        },
    )
    .await
    .unwrap();

    let listed = list_leads(&db).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].lead.id, advanced.id);
    assert_eq!(listed[0].lead.stage, Some(StageCode::Mortgage));
    assert_eq!(listed[0].stage_label.as_deref(), Some("Mortgage"));
    assert_eq!(listed[1].lead.id, fresh.id);
    assert_eq!(listed[1].stage_label, None);
}

#[tokio::test]
async fn archive_is_a_soft_delete() {
    let db = common::setup_db().await;
    let actor = common::insert_user(&db, "agent@propline.test").await;
    let lead = create_lead(&db, new_lead("priya@buyers.test"), actor.id)
        .await
        .unwrap();
    record_transition(
        &db,
        lead.id,
        actor.id,
        StagePayload::OfferAccepted { amount: 210_000_00 },
    )
    .await
    .unwrap();

    archive_lead(&db, lead.id).await.unwrap();

    // Gone from live reads, kept in the archive with its ledger intact.
    assert!(list_leads(&db).await.unwrap().is_empty());
    let err = get_lead(&db, lead.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let archived = list_archived(&db).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].lead.id, lead.id);
    assert_eq!(archived[0].lead.stage, Some(StageCode::OfferAccepted));

    // Archiving again reports not found rather than silently succeeding.
    let err = archive_lead(&db, lead.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
