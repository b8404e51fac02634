//! Case-insensitive unique indexes and FK lookup indexes.
//!
//! Expression indexes on `lower(..)` are not expressible through the index
//! builder, so those go through raw statements.
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

const UNIQUE_EXPRESSION_INDEXES: &[(&str, &str)] = &[
    ("uniq_department_name_ci", r#"CREATE UNIQUE INDEX IF NOT EXISTS uniq_department_name_ci ON "department" (lower("name"))"#),
    ("uniq_role_name_ci", r#"CREATE UNIQUE INDEX IF NOT EXISTS uniq_role_name_ci ON "role" (lower("name"))"#),
    ("uniq_city_department_name_ci", r#"CREATE UNIQUE INDEX IF NOT EXISTS uniq_city_department_name_ci ON "city" ("department_id", lower("name"))"#),
    ("uniq_user_email_ci", r#"CREATE UNIQUE INDEX IF NOT EXISTS uniq_user_email_ci ON "user" (lower("email"))"#),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        for (_, sql) in UNIQUE_EXPRESSION_INDEXES {
            conn.execute_unprepared(sql).await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_city_department")
                    .table(City::Table)
                    .col(City::DepartmentId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_user_city")
                    .table(User::Table)
                    .col(User::CityId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_user_department")
                    .table(User::Table)
                    .col(User::DepartmentId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_user_role")
                    .table(User::Table)
                    .col(User::RoleId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        for (name, _) in UNIQUE_EXPRESSION_INDEXES {
            conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {name}")).await?;
        }
        manager
            .drop_index(Index::drop().name("idx_city_department").table(City::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_city").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_department").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_user_role").table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum City { Table, DepartmentId }

#[derive(DeriveIden)]
enum User { Table, CityId, DepartmentId, RoleId }
