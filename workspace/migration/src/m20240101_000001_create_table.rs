use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(boolean(Users::IsSuperuser).default(false))
                    .to_owned(),
            )
            .await?;

        // Create profiles table (one row per account)
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(integer(Profiles::AccountId).primary_key())
                    .col(string_len(Profiles::Role, 20))
                    .col(string_len_null(Profiles::ContactNumber, 10))
                    .col(string_len_null(Profiles::Location, 100))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_account")
                            .from(Profiles::Table, Profiles::AccountId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create incidents table
        manager
            .create_table(
                Table::create()
                    .table(Incidents::Table)
                    .if_not_exists()
                    .col(pk_auto(Incidents::Id))
                    .col(integer(Incidents::ReporterId))
                    .col(string_len(Incidents::Title, 200))
                    .col(text(Incidents::Description))
                    .col(string_len(Incidents::Category, 50))
                    .col(string_len_null(Incidents::Location, 200))
                    .col(timestamp_with_time_zone(Incidents::TimeReported))
                    .col(string_len(Incidents::Status, 20).default("pending"))
                    .col(big_integer_null(Incidents::ResponseTimeSecs))
                    .col(integer_null(Incidents::ConfirmedById))
                    .col(text_null(Incidents::ResponseNotes))
                    .col(string_null(Incidents::ImageRef))
                    .col(string_null(Incidents::VideoRef))
                    .col(string_null(Incidents::AudioRef))
                    .col(string_null(Incidents::DocumentRef))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_incident_reporter")
                            .from(Incidents::Table, Incidents::ReporterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_incident_confirmed_by")
                            .from(Incidents::Table, Incidents::ConfirmedById)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Incidents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    IsSuperuser,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    AccountId,
    Role,
    ContactNumber,
    Location,
}

#[derive(DeriveIden)]
enum Incidents {
    Table,
    Id,
    ReporterId,
    Title,
    Description,
    Category,
    Location,
    TimeReported,
    Status,
    ResponseTimeSecs,
    ConfirmedById,
    ResponseNotes,
    ImageRef,
    VideoRef,
    AudioRef,
    DocumentRef,
}
