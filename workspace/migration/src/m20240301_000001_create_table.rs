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
                    .col(string(Users::Name))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::Password))
                    .col(string_len(Users::Role, 16).default("customer"))
                    .col(
                        date_time(Users::CreatedOn)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create cafes table
        manager
            .create_table(
                Table::create()
                    .table(Cafes::Table)
                    .if_not_exists()
                    .col(pk_auto(Cafes::Id))
                    .col(string(Cafes::Name))
                    .col(string(Cafes::Address))
                    .col(text_null(Cafes::Description))
                    .col(string_null(Cafes::Image))
                    .col(string_null(Cafes::OpeningHours))
                    .col(
                        date_time(Cafes::CreatedOn)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create dishes table
        manager
            .create_table(
                Table::create()
                    .table(Dishes::Table)
                    .if_not_exists()
                    .col(pk_auto(Dishes::Id))
                    .col(integer(Dishes::CafeId))
                    .col(string(Dishes::Name))
                    .col(decimal(Dishes::Price).decimal_len(12, 2))
                    .col(string_null(Dishes::Description))
                    .col(string_null(Dishes::Image))
                    .col(
                        date_time(Dishes::UpdatedOn)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dishes_cafe")
                            .from(Dishes::Table, Dishes::CafeId)
                            .to(Cafes::Table, Cafes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create reviews table
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(pk_auto(Reviews::Id))
                    .col(integer(Reviews::CafeId))
                    .col(integer(Reviews::UserId))
                    .col(integer(Reviews::Star).check(
                        Expr::col(Reviews::Star).between(1, 5),
                    ))
                    .col(text(Reviews::Content))
                    .col(string_len(Reviews::Status, 16).default("pending"))
                    .col(
                        date_time(Reviews::CreatedOn)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_cafe")
                            .from(Reviews::Table, Reviews::CafeId)
                            .to(Cafes::Table, Cafes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_user")
                            .from(Reviews::Table, Reviews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to respect foreign key constraints
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Dishes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cafes::Table).to_owned())
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
    Name,
    Email,
    Password,
    Role,
    CreatedOn,
}

#[derive(DeriveIden)]
enum Cafes {
    Table,
    Id,
    Name,
    Address,
    Description,
    Image,
    OpeningHours,
    CreatedOn,
}

#[derive(DeriveIden)]
enum Dishes {
    Table,
    Id,
    CafeId,
    Name,
    Price,
    Description,
    Image,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    CafeId,
    UserId,
    Star,
    Content,
    Status,
    CreatedOn,
}
