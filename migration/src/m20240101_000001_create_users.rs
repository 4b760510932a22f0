use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len_uniq(Users::Username, 150))
                    .col(string(Users::PasswordHash))
                    .col(string_len(Users::FirstName, 150).default(""))
                    .col(string_len(Users::LastName, 150).default(""))
                    .col(string_len(Users::Email, 254).default(""))
                    .col(big_integer(Users::DateJoined))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LocationUser::Table)
                    .if_not_exists()
                    .col(pk_auto(LocationUser::Id))
                    .col(string_len(LocationUser::Address1, 128).default(""))
                    .col(string_len(LocationUser::Address2, 128).default(""))
                    .col(string_len(LocationUser::City, 64).default("Sofia"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserProfile::Table)
                    .if_not_exists()
                    .col(pk_auto(UserProfile::Id))
                    .col(integer_uniq(UserProfile::UserId))
                    .col(string_len(UserProfile::PhoneNumber, 10).default(""))
                    .col(string(UserProfile::PhotoProfile).default(""))
                    .col(integer_null(UserProfile::LocationId).unique_key())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_profile_user")
                            .from(UserProfile::Table, UserProfile::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_profile_location")
                            .from(UserProfile::Table, UserProfile::LocationId)
                            .to(LocationUser::Table, LocationUser::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserProfile::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(LocationUser::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    FirstName,
    LastName,
    Email,
    DateJoined,
}

#[derive(DeriveIden)]
enum LocationUser {
    Table,
    Id,
    #[sea_orm(iden = "address_1")]
    Address1,
    #[sea_orm(iden = "address_2")]
    Address2,
    City,
}

#[derive(DeriveIden)]
enum UserProfile {
    Table,
    Id,
    UserId,
    PhoneNumber,
    PhotoProfile,
    LocationId,
}
