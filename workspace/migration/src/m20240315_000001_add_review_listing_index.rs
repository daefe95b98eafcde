use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Backs the public listing: cafe + approved status + optional star
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_cafe_status_star")
                    .table(Alias::new("reviews"))
                    .col(Alias::new("cafe_id"))
                    .col(Alias::new("status"))
                    .col(Alias::new("star"))
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_reviews_cafe_status_star")
                    .table(Alias::new("reviews"))
                    .to_owned(),
            )
            .await
    }
}
