//! Initial migration to create the repolink database schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_users(manager).await?;
        self.create_linked_accounts(manager).await?;
        self.create_github_repositories(manager).await?;
        self.create_user_repositories(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserRepositories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GithubRepositories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LinkedAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_users(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_linked_accounts(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LinkedAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkedAccounts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LinkedAccounts::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(LinkedAccounts::ProviderLogin)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LinkedAccounts::AccessToken).text().null())
                    .col(ColumnDef::new(LinkedAccounts::AvatarUrl).text().null())
                    .col(
                        ColumnDef::new(LinkedAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_linked_accounts_user")
                            .from(LinkedAccounts::Table, LinkedAccounts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_github_repositories(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GithubRepositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GithubRepositories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GithubRepositories::GithubId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    // Naming
                    .col(ColumnDef::new(GithubRepositories::Name).string().not_null())
                    .col(
                        ColumnDef::new(GithubRepositories::FullName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GithubRepositories::HtmlUrl)
                            .text()
                            .not_null(),
                    )
                    // Content
                    .col(
                        ColumnDef::new(GithubRepositories::Description)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(GithubRepositories::Language).string().null())
                    .col(
                        ColumnDef::new(GithubRepositories::Private)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    // Statistics
                    .col(
                        ColumnDef::new(GithubRepositories::StargazersCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GithubRepositories::ForksCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    // Tracking
                    .col(
                        ColumnDef::new(GithubRepositories::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Browse and search order by stars
        manager
            .create_index(
                Index::create()
                    .name("idx_github_repos_stars")
                    .table(GithubRepositories::Table)
                    .col((GithubRepositories::StargazersCount, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_github_repos_full_name")
                    .table(GithubRepositories::Table)
                    .col(GithubRepositories::FullName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_user_repositories(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserRepositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserRepositories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserRepositories::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserRepositories::RepositoryId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserRepositories::Disabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserRepositories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UserRepositories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_repositories_user")
                            .from(UserRepositories::Table, UserRepositories::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_repositories_repository")
                            .from(UserRepositories::Table, UserRepositories::RepositoryId)
                            .to(GithubRepositories::Table, GithubRepositories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One link per (user, repository)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_repos_user_repository")
                    .table(UserRepositories::Table)
                    .col(UserRepositories::UserId)
                    .col(UserRepositories::RepositoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_repos_repository")
                    .table(UserRepositories::Table)
                    .col(UserRepositories::RepositoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    CreatedAt,
    LastSyncedAt,
}

#[derive(DeriveIden)]
enum LinkedAccounts {
    Table,
    Id,
    UserId,
    ProviderLogin,
    AccessToken,
    AvatarUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GithubRepositories {
    Table,
    Id,
    GithubId,
    Name,
    FullName,
    HtmlUrl,
    Description,
    Language,
    Private,
    StargazersCount,
    ForksCount,
    SyncedAt,
}

#[derive(DeriveIden)]
enum UserRepositories {
    Table,
    Id,
    UserId,
    RepositoryId,
    Disabled,
    CreatedAt,
    UpdatedAt,
}
