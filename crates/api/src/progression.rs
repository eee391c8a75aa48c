//! The sales-progression ledger: stage payload validation, the
//! transactional transition dispatcher, and the history/invoice reads.
//!
//! Each transition appends one immutable `stage_entry` row carrying a
//! tagged payload; the lead's `stage` and `current_entry_id` columns are
//! moved to the new row inside the same transaction, so the pointer can
//! never name a row that was not inserted.

use chrono::{NaiveDate, Utc};
use entity::lead::{self, StageCode};
use entity::{sales_stage, stage_entry};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Catalog label for a stage code. Mirrors the rows seeded into
/// `sales_stage`; used for validation messages so they read the way the
/// catalog does.
pub fn stage_label(code: StageCode) -> &'static str {
    match code {
        StageCode::OfferAccepted => "Offer Accepted",
        StageCode::OfferRejected => "Offer Rejected",
        StageCode::Withdrawn => "Withdrawn",
        StageCode::SolicitorEngaged => "Solicitor Engaged",
        StageCode::Mortgage => "Mortgage",
        StageCode::SurveySearch => "Survey & Search",
        StageCode::Conveyancing => "Conveyancing",
        StageCode::SalesInvoiceCredited => "Sales Invoice Credited",
        StageCode::ExchangeOfContract => "Exchange of Contract",
        StageCode::Completion => "Completion",
    }
}

/// Flat wire shape of `PUT /progression/updatestatus`. Every
/// stage-specific field is optional here; `StagePayload::from_request`
/// enforces the per-stage required set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageUpdateRequest {
    pub lead_id: Uuid,
    pub lead_status: i16,
    pub amount: Option<i64>,
    pub document_url: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub solicitor_name: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub mortgage_status: Option<String>,
    pub mortgage_amount: Option<i64>,
    pub survey_search: Option<String>,
    pub conveyancing: Option<String>,
    pub sales_invoice_credited: Option<String>,
    pub exchange_amount: Option<i64>,
    pub exchange_date: Option<String>,
    pub completion_date: Option<String>,
}

/// One variant per stage code; the stored JSON carries the tag plus only
/// that variant's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StagePayload {
    OfferAccepted {
        amount: i64,
    },
    OfferRejected {},
    Withdrawn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        document_url: Option<String>,
    },
    SolicitorEngaged {
        company_name: String,
        address: String,
        solicitor_name: String,
        contact_number: String,
        email: String,
    },
    Mortgage {
        mortgage_status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mortgage_amount: Option<i64>,
    },
    SurveySearch {
        survey_search: String,
    },
    Conveyancing {
        conveyancing: String,
    },
    SalesInvoiceCredited {
        sales_invoice_credited: String,
    },
    ExchangeOfContract {
        exchange_amount: i64,
        exchange_date: NaiveDate,
    },
    Completion {
        completion_date: NaiveDate,
    },
}

impl StagePayload {
    pub fn stage_code(&self) -> StageCode {
        match self {
            StagePayload::OfferAccepted { .. } => StageCode::OfferAccepted,
            StagePayload::OfferRejected {} => StageCode::OfferRejected,
            StagePayload::Withdrawn { .. } => StageCode::Withdrawn,
            StagePayload::SolicitorEngaged { .. } => StageCode::SolicitorEngaged,
            StagePayload::Mortgage { .. } => StageCode::Mortgage,
            StagePayload::SurveySearch { .. } => StageCode::SurveySearch,
            StagePayload::Conveyancing { .. } => StageCode::Conveyancing,
            StagePayload::SalesInvoiceCredited { .. } => StageCode::SalesInvoiceCredited,
            StagePayload::ExchangeOfContract { .. } => StageCode::ExchangeOfContract,
            StagePayload::Completion { .. } => StageCode::Completion,
        }
    }

    /// Build the payload for `code`, checking the stage's required field
    /// set against the flat request. Every missing field is reported by
    /// name in a single validation error.
    pub fn from_request(code: StageCode, request: &StageUpdateRequest) -> ApiResult<StagePayload> {
        let mut missing: Vec<&str> = Vec::new();
        let payload = match code {
            StageCode::OfferAccepted => {
                let amount = request.amount;
                if amount.is_none() {
                    missing.push("amount");
                }
                amount.map(|amount| StagePayload::OfferAccepted { amount })
            }
            StageCode::OfferRejected => Some(StagePayload::OfferRejected {}),
            StageCode::Withdrawn => Some(StagePayload::Withdrawn {
                document_url: text(&request.document_url),
            }),
            StageCode::SolicitorEngaged => {
                let company_name = required(&request.company_name, "company_name", &mut missing);
                let address = required(&request.address, "address", &mut missing);
                let solicitor_name =
                    required(&request.solicitor_name, "solicitor_name", &mut missing);
                let contact_number =
                    required(&request.contact_number, "contact_number", &mut missing);
                let email = required(&request.email, "email", &mut missing);
                match (company_name, address, solicitor_name, contact_number, email) {
                    (
                        Some(company_name),
                        Some(address),
                        Some(solicitor_name),
                        Some(contact_number),
                        Some(email),
                    ) => Some(StagePayload::SolicitorEngaged {
                        company_name,
                        address,
                        solicitor_name,
                        contact_number,
                        email,
                    }),
                    _ => None,
                }
            }
            StageCode::Mortgage => {
                let status = required(&request.mortgage_status, "mortgage_status", &mut missing);
                let needs_amount = status.as_deref().is_some_and(mortgage_in_progress);
                let amount = request.mortgage_amount;
                if needs_amount && amount.is_none() {
                    missing.push("mortgage_amount");
                }
                status.map(|mortgage_status| StagePayload::Mortgage {
                    mortgage_status,
                    mortgage_amount: if needs_amount { amount } else { None },
                })
            }
            StageCode::SurveySearch => required(&request.survey_search, "survey_search", &mut missing)
                .map(|survey_search| StagePayload::SurveySearch { survey_search }),
            StageCode::Conveyancing => required(&request.conveyancing, "conveyancing", &mut missing)
                .map(|conveyancing| StagePayload::Conveyancing { conveyancing }),
            StageCode::SalesInvoiceCredited => required(
                &request.sales_invoice_credited,
                "sales_invoice_credited",
                &mut missing,
            )
            .map(|sales_invoice_credited| StagePayload::SalesInvoiceCredited {
                sales_invoice_credited,
            }),
            StageCode::ExchangeOfContract => {
                let amount = request.exchange_amount;
                if amount.is_none() {
                    missing.push("exchange_amount");
                }
                let raw_date = required(&request.exchange_date, "exchange_date", &mut missing);
                let date = raw_date
                    .map(|raw| parse_display_date("exchange_date", &raw))
                    .transpose()?;
                match (amount, date) {
                    (Some(exchange_amount), Some(exchange_date)) => {
                        Some(StagePayload::ExchangeOfContract {
                            exchange_amount,
                            exchange_date,
                        })
                    }
                    _ => None,
                }
            }
            StageCode::Completion => {
                let raw_date = required(&request.completion_date, "completion_date", &mut missing);
                let date = raw_date
                    .map(|raw| parse_display_date("completion_date", &raw))
                    .transpose()?;
                date.map(|completion_date| StagePayload::Completion { completion_date })
            }
        };
        match payload {
            Some(payload) if missing.is_empty() => Ok(payload),
            _ => Err(ApiError::validation(format!(
                "{} requires {}",
                stage_label(code),
                missing.join(", ")
            ))),
        }
    }
}

fn text(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn required(field: &Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> Option<String> {
    let value = text(field);
    if value.is_none() {
        missing.push(name);
    }
    value
}

fn mortgage_in_progress(status: &str) -> bool {
    matches!(status.trim().to_lowercase().as_str(), "yes" | "1")
}

/// Parse the `DD-MM-YYYY` display format the clients send. Two-digit
/// years mean 2000 + YY, so `05-03-24` is 2024-03-05.
pub fn parse_display_date(field: &str, raw: &str) -> ApiResult<NaiveDate> {
    let invalid = || ApiError::validation(format!("{field} must be a DD-MM-YYYY date"));
    let mut parts = raw.trim().split('-');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let day: u32 = day.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let year = if year < 100 { 2000 + year } else { year };
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Append a ledger row and move the lead's pointer to it, atomically.
pub async fn record_transition(
    db: &DatabaseConnection,
    lead_id: Uuid,
    recorded_by: Uuid,
    payload: StagePayload,
) -> ApiResult<stage_entry::Model> {
    let stage = payload.stage_code();
    let value = serde_json::to_value(&payload)
        .map_err(|err| ApiError::Db(sea_orm::DbErr::Custom(format!("payload encode: {err}"))))?;

    let txn = db.begin().await?;
    let lead = lead::Entity::find_by_id(lead_id)
        .one(&txn)
        .await?
        .filter(|lead| lead.status == lead::Status::Active)
        .ok_or_else(|| ApiError::not_found("Lead not found"))?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let entry_id = Uuid::new_v4();
    let entry = stage_entry::ActiveModel {
        id: Set(entry_id),
        lead_id: Set(lead.id),
        recorded_by: Set(recorded_by),
        stage: Set(stage),
        payload: Set(value.clone()),
        recorded_at: Set(now),
    };
    stage_entry::Entity::insert(entry)
        .exec_without_returning(&txn)
        .await?;

    let mut active: lead::ActiveModel = lead.into();
    active.stage = Set(Some(stage));
    active.current_entry_id = Set(Some(entry_id));
    active.updated_at = Set(now);
    active.update(&txn).await?;
    txn.commit().await?;

    info!(lead = %lead_id, stage = stage.as_i16(), "stage transition recorded");
    Ok(stage_entry::Model {
        id: entry_id,
        lead_id,
        recorded_by,
        stage,
        payload: value,
        recorded_at: now,
    })
}

/// The seeded stage catalog, ordered by code.
pub async fn stage_catalog(db: &DatabaseConnection) -> ApiResult<Vec<sales_stage::Model>> {
    Ok(sales_stage::Entity::find()
        .order_by_asc(sales_stage::Column::Code)
        .all(db)
        .await?)
}

#[derive(Debug, Clone, Serialize)]
pub struct StageHistoryRow {
    #[serde(flatten)]
    pub entry: stage_entry::Model,
    pub stage_label: String,
}

/// Every ledger row for a live lead, oldest first, annotated with the
/// catalog label.
pub async fn stage_history(
    db: &DatabaseConnection,
    lead_id: Uuid,
) -> ApiResult<Vec<StageHistoryRow>> {
    let _lead = find_live_lead(db, lead_id).await?;
    let labels: HashMap<i16, String> = sales_stage::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.code, row.label))
        .collect();
    let entries = stage_entry::Entity::find()
        .filter(stage_entry::Column::LeadId.eq(lead_id))
        .order_by_asc(stage_entry::Column::RecordedAt)
        .order_by_asc(stage_entry::Column::Id)
        .all(db)
        .await?;
    Ok(entries
        .into_iter()
        .map(|entry| {
            let stage_label = labels
                .get(&entry.stage.as_i16())
                .cloned()
                .unwrap_or_else(|| stage_label(entry.stage).to_string());
            StageHistoryRow { entry, stage_label }
        })
        .collect())
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceView {
    pub lead: lead::Model,
    pub current_entry: Option<StageHistoryRow>,
}

/// The lead plus only its newest ledger row, resolved through the
/// pointer rather than by scanning history.
pub async fn invoice(db: &DatabaseConnection, lead_id: Uuid) -> ApiResult<InvoiceView> {
    let lead = find_live_lead(db, lead_id).await?;
    let current_entry = match lead.current_entry_id {
        Some(entry_id) => stage_entry::Entity::find_by_id(entry_id)
            .one(db)
            .await?
            .map(|entry| {
                let stage_label = stage_label(entry.stage).to_string();
                StageHistoryRow { entry, stage_label }
            }),
        None => None,
    };
    Ok(InvoiceView {
        lead,
        current_entry,
    })
}

pub(crate) async fn find_live_lead(
    db: &DatabaseConnection,
    lead_id: Uuid,
) -> ApiResult<lead::Model> {
    lead::Entity::find_by_id(lead_id)
        .one(db)
        .await?
        .filter(|lead| lead.status == lead::Status::Active)
        .ok_or_else(|| ApiError::not_found("Lead not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StageUpdateRequest {
        StageUpdateRequest {
            lead_id: Uuid::new_v4(),
            lead_status: 1,
            ..StageUpdateRequest::default()
        }
    }

    #[test]
    fn display_date_accepts_two_digit_years() {
        let date = parse_display_date("exchange_date", "05-03-24").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn display_date_accepts_four_digit_years() {
        let date = parse_display_date("completion_date", "17-11-2025").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 11, 17).unwrap());
    }

    #[test]
    fn display_date_rejects_garbage() {
        assert!(parse_display_date("completion_date", "2025-11-17-1").is_err());
        assert!(parse_display_date("completion_date", "31-02-2025").is_err());
        assert!(parse_display_date("completion_date", "soon").is_err());
    }

    #[test]
    fn offer_accepted_requires_amount() {
        let err = StagePayload::from_request(StageCode::OfferAccepted, &request()).unwrap_err();
        assert_eq!(err.to_string(), "Offer Accepted requires amount");
    }

    #[test]
    fn solicitor_reports_every_missing_field() {
        let mut req = request();
        req.company_name = Some("Harker & Co".into());
        let err = StagePayload::from_request(StageCode::SolicitorEngaged, &req).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Solicitor Engaged requires address, solicitor_name, contact_number, email"
        );
    }

    #[test]
    fn mortgage_amount_only_required_when_in_progress() {
        let mut req = request();
        req.mortgage_status = Some("no".into());
        let payload = StagePayload::from_request(StageCode::Mortgage, &req).unwrap();
        assert_eq!(
            payload,
            StagePayload::Mortgage {
                mortgage_status: "no".into(),
                mortgage_amount: None,
            }
        );

        req.mortgage_status = Some("Yes".into());
        let err = StagePayload::from_request(StageCode::Mortgage, &req).unwrap_err();
        assert_eq!(err.to_string(), "Mortgage requires mortgage_amount");

        req.mortgage_amount = Some(185_000_00);
        let payload = StagePayload::from_request(StageCode::Mortgage, &req).unwrap();
        assert_eq!(
            payload,
            StagePayload::Mortgage {
                mortgage_status: "Yes".into(),
                mortgage_amount: Some(185_000_00),
            }
        );
    }

    #[test]
    fn withdrawn_document_is_optional() {
        let payload = StagePayload::from_request(StageCode::Withdrawn, &request()).unwrap();
        assert_eq!(
            payload,
            StagePayload::Withdrawn { document_url: None }
        );
    }

    #[test]
    fn payload_json_is_exclusive_to_the_stage() {
        let value = serde_json::to_value(StagePayload::OfferAccepted { amount: 250_000_00 }).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(value["stage"], "offer_accepted");
        assert_eq!(value["amount"], 250_000_00);

        let value = serde_json::to_value(StagePayload::Withdrawn { document_url: None }).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(value["stage"], "withdrawn");
    }

    #[test]
    fn exchange_payload_keeps_iso_dates() {
        let mut req = request();
        req.exchange_amount = Some(320_000_00);
        req.exchange_date = Some("09-06-25".into());
        let payload = StagePayload::from_request(StageCode::ExchangeOfContract, &req).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["exchange_date"], "2025-06-09");
    }
}
