use sea_orm_migration::prelude::*;
use sea_query::{OnConflict, Query};

#[derive(DeriveIden)]
enum SalesStage {
    Table,
    Code,
    Label,
}

#[derive(DeriveIden)]
enum StageEntry {
    Table,
    Id,
    LeadId,
    RecordedBy,
    Stage,
    Payload,
    RecordedAt,
}

#[derive(DeriveIden)]
enum Offer {
    Table,
    Id,
    LeadId,
    RecordedBy,
    Amount,
    Decision,
    RecordedAt,
}

#[derive(DeriveIden)]
enum Lead {
    Table,
    Id,
}

const STAGE_CATALOG: [(i16, &str); 10] = [
    (1, "Offer Accepted"),
    (2, "Offer Rejected"),
    (3, "Withdrawn"),
    (4, "Solicitor Engaged"),
    (5, "Mortgage"),
    (6, "Survey & Search"),
    (7, "Conveyancing"),
    (8, "Sales Invoice Credited"),
    (9, "Exchange of Contract"),
    (10, "Completion"),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SalesStage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalesStage::Code)
                            .small_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SalesStage::Label).string_len(64).not_null())
                    .to_owned(),
            )
            .await?;

        for (code, label) in STAGE_CATALOG {
            let stmt = Query::insert()
                .into_table(SalesStage::Table)
                .columns([SalesStage::Code, SalesStage::Label])
                .values_panic([code.into(), label.into()])
                .on_conflict(
                    OnConflict::column(SalesStage::Code)
                        .do_nothing()
                        .to_owned(),
                )
                .to_owned();
            manager.exec_stmt(stmt).await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(StageEntry::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StageEntry::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(StageEntry::LeadId).uuid().not_null())
                    .col(ColumnDef::new(StageEntry::RecordedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(StageEntry::Stage)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StageEntry::Payload).json_binary().not_null())
                    .col(
                        ColumnDef::new(StageEntry::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stage_entry_lead")
                            .from(StageEntry::Table, StageEntry::LeadId)
                            .to(Lead::Table, Lead::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stage_entry_lead")
                    .table(StageEntry::Table)
                    .col(StageEntry::LeadId)
                    .col(StageEntry::RecordedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Offer::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Offer::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Offer::LeadId).uuid().not_null())
                    .col(ColumnDef::new(Offer::RecordedBy).uuid().not_null())
                    .col(ColumnDef::new(Offer::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Offer::Decision).small_integer().not_null())
                    .col(
                        ColumnDef::new(Offer::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_offer_lead")
                            .from(Offer::Table, Offer::LeadId)
                            .to(Lead::Table, Lead::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_offer_lead")
                    .table(Offer::Table)
                    .col(Offer::LeadId)
                    .col(Offer::RecordedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Offer::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StageEntry::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SalesStage::Table).to_owned())
            .await?;
        Ok(())
    }
}
