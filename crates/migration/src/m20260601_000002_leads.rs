use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Lead {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    LeadType,
    Location,
    Status,
    Stage,
    CurrentEntryId,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Followup {
    Table,
    Id,
    LeadId,
    FollowupDate,
    Summary,
    State,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lead::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Lead::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Lead::FirstName).string_len(128).not_null())
                    .col(ColumnDef::new(Lead::LastName).string_len(128).not_null())
                    .col(ColumnDef::new(Lead::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Lead::PhoneNumber).string_len(32).not_null())
                    .col(ColumnDef::new(Lead::LeadType).string_len(64))
                    .col(ColumnDef::new(Lead::Location).string_len(256))
                    .col(
                        ColumnDef::new(Lead::Status)
                            .small_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Lead::Stage).small_integer())
                    .col(ColumnDef::new(Lead::CurrentEntryId).uuid())
                    .col(ColumnDef::new(Lead::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(Lead::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Lead::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lead_status")
                    .table(Lead::Table)
                    .col(Lead::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_lead_stage")
                    .table(Lead::Table)
                    .col(Lead::Stage)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Followup::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Followup::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Followup::LeadId).uuid().not_null())
                    .col(ColumnDef::new(Followup::FollowupDate).date().not_null())
                    .col(ColumnDef::new(Followup::Summary).text().not_null())
                    .col(
                        ColumnDef::new(Followup::State)
                            .string_len(32)
                            .not_null()
                            .default(Expr::cust("'OPEN'")),
                    )
                    .col(ColumnDef::new(Followup::CreatedBy).uuid())
                    .col(
                        ColumnDef::new(Followup::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Followup::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_followup_lead")
                            .from(Followup::Table, Followup::LeadId)
                            .to(Lead::Table, Lead::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_followup_lead")
                    .table(Followup::Table)
                    .col(Followup::LeadId)
                    .col(Followup::FollowupDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Followup::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lead::Table).to_owned())
            .await?;
        Ok(())
    }
}
