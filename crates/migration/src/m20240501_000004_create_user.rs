//! Create `user` table with FKs to `city`, `department` and `role`.
//!
//! All three references restrict deletion of the referenced row.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(pk_auto(User::Id))
                    .col(string_len(User::Name, 100))
                    .col(string_len(User::Email, 120))
                    .col(string_len_null(User::Phone, 20))
                    .col(date(User::RegisteredOn))
                    .col(string_len_null(User::AddressDetail, 255))
                    .col(integer(User::CityId))
                    .col(integer(User::DepartmentId))
                    .col(integer(User::RoleId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_city")
                            .from(User::Table, User::CityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_department")
                            .from(User::Table, User::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_role")
                            .from(User::Table, User::RoleId)
                            .to(Role::Table, Role::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User { Table, Id, Name, Email, Phone, RegisteredOn, AddressDetail, CityId, DepartmentId, RoleId }

#[derive(DeriveIden)]
enum City { Table, Id }

#[derive(DeriveIden)]
enum Department { Table, Id }

#[derive(DeriveIden)]
enum Role { Table, Id }
