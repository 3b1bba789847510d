use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Product listing is usually sorted by name
        manager
            .create_index(
                Index::create()
                    .name("idx_product_name")
                    .table(Product::Table)
                    .col(Product::Name)
                    .to_owned(),
            )
            .await?;

        // Reverse lookups from the referenced side of the join tables
        manager
            .create_index(
                Index::create()
                    .name("idx_product_category_category")
                    .table(ProductCategory::Table)
                    .col(ProductCategory::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_role_role")
                    .table(UserRole::Table)
                    .col(UserRole::RoleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_index(Index::drop().name("idx_user_role_role").table(UserRole::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_product_category_category").table(ProductCategory::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_product_name").table(Product::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Product { Table, Name }

#[derive(DeriveIden)]
enum ProductCategory { Table, CategoryId }

#[derive(DeriveIden)]
enum UserRole { Table, RoleId }
