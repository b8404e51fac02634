use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, Order, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set, SqlErr,
};

use common::pagination::{Page, Pagination};
use models::{city, department, role, user};

use crate::domain::{City, Department, NewCity, NewDepartment, NewRole, NewUser, Role, User, UserParent};
use crate::errors::StoreError;
use crate::repository::{CityRepository, DepartmentRepository, RoleRepository, UserRepository};

/// PostgreSQL-backed store implementing every entity capability.
#[derive(Clone)]
pub struct SeaOrmStore {
    pub db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn map_db_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => StoreError::ForeignKey(detail),
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::Unique(detail),
        _ => StoreError::Db(err.to_string()),
    }
}

/// `lower(col)`, so ordering does not depend on letter case.
fn lower_col<C: ColumnTrait>(col: C) -> SimpleExpr {
    Func::lower(Expr::col(col)).into()
}

/// `lower(col) = lower(value)`
fn lower_eq<C: ColumnTrait>(col: C, value: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).eq(value.to_lowercase())
}

/// `lower(col) LIKE '%value%'` with LIKE metacharacters in `value` escaped.
fn lower_contains<C: ColumnTrait>(col: C, value: &str) -> SimpleExpr {
    let escaped = value
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::expr(Func::lower(Expr::col(col))).like(format!("%{escaped}%"))
}

async fn fetch_page<E, T>(
    db: &DatabaseConnection,
    select: Select<E>,
    page: Pagination,
    map: fn(E::Model) -> T,
) -> Result<Page<T>, StoreError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let (page_idx, per_page) = page.normalize();
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await.map_err(map_db_err)?;
    let rows = paginator.fetch_page(page_idx).await.map_err(map_db_err)?;
    Ok(Page::new(rows.into_iter().map(map).collect(), page, total))
}

fn to_department(m: department::Model) -> Department { Department { id: m.id, name: m.name } }

fn to_role(m: role::Model) -> Role { Role { id: m.id, name: m.name } }

fn to_city(m: city::Model) -> City { City { id: m.id, name: m.name, department_id: m.department_id } }

fn to_user(m: user::Model) -> User {
    User {
        id: m.id,
        name: m.name,
        email: m.email,
        phone: m.phone,
        registered_on: m.registered_on,
        address_detail: m.address_detail,
        city_id: m.city_id,
        department_id: m.department_id,
        role_id: m.role_id,
    }
}

fn parent_filter(parent: UserParent) -> SimpleExpr {
    match parent {
        UserParent::City(id) => user::Column::CityId.eq(id),
        UserParent::Department(id) => user::Column::DepartmentId.eq(id),
        UserParent::Role(id) => user::Column::RoleId.eq(id),
    }
}

#[async_trait]
impl DepartmentRepository for SeaOrmStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Department>, StoreError> {
        let found = department::Entity::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;
        Ok(found.map(to_department))
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError> {
        let n = department::Entity::find_by_id(id).count(&self.db).await.map_err(map_db_err)?;
        Ok(n > 0)
    }

    async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool, StoreError> {
        let n = department::Entity::find()
            .filter(lower_eq(department::Column::Name, name))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(n > 0)
    }

    async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<Department>, StoreError> {
        let select = department::Entity::find()
            .filter(lower_contains(department::Column::Name, query))
            .order_by(lower_col(department::Column::Name), Order::Asc)
            .order_by_asc(department::Column::Id);
        fetch_page(&self.db, select, page, to_department).await
    }

    async fn insert(&self, new: NewDepartment) -> Result<Department, StoreError> {
        let am = department::ActiveModel { id: NotSet, name: Set(new.name) };
        am.insert(&self.db).await.map(to_department).map_err(map_db_err)
    }

    async fn update(&self, d: &Department) -> Result<Department, StoreError> {
        let am = department::ActiveModel { id: Set(d.id), name: Set(d.name.clone()) };
        am.update(&self.db).await.map(to_department).map_err(map_db_err)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
        department::Entity::delete_by_id(id).exec(&self.db).await.map_err(map_db_err)?;
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for SeaOrmStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Role>, StoreError> {
        let found = role::Entity::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;
        Ok(found.map(to_role))
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError> {
        let n = role::Entity::find_by_id(id).count(&self.db).await.map_err(map_db_err)?;
        Ok(n > 0)
    }

    async fn exists_by_name_ignore_case(&self, name: &str) -> Result<bool, StoreError> {
        let n = role::Entity::find()
            .filter(lower_eq(role::Column::Name, name))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(n > 0)
    }

    async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<Role>, StoreError> {
        let select = role::Entity::find()
            .filter(lower_contains(role::Column::Name, query))
            .order_by(lower_col(role::Column::Name), Order::Asc)
            .order_by_asc(role::Column::Id);
        fetch_page(&self.db, select, page, to_role).await
    }

    async fn insert(&self, new: NewRole) -> Result<Role, StoreError> {
        let am = role::ActiveModel { id: NotSet, name: Set(new.name) };
        am.insert(&self.db).await.map(to_role).map_err(map_db_err)
    }

    async fn update(&self, r: &Role) -> Result<Role, StoreError> {
        let am = role::ActiveModel { id: Set(r.id), name: Set(r.name.clone()) };
        am.update(&self.db).await.map(to_role).map_err(map_db_err)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
        role::Entity::delete_by_id(id).exec(&self.db).await.map_err(map_db_err)?;
        Ok(())
    }
}

#[async_trait]
impl CityRepository for SeaOrmStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<City>, StoreError> {
        let found = city::Entity::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;
        Ok(found.map(to_city))
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError> {
        let n = city::Entity::find_by_id(id).count(&self.db).await.map_err(map_db_err)?;
        Ok(n > 0)
    }

    async fn exists_by_name_in_department_ignore_case(&self, name: &str, department_id: i32) -> Result<bool, StoreError> {
        let n = city::Entity::find()
            .filter(city::Column::DepartmentId.eq(department_id))
            .filter(lower_eq(city::Column::Name, name))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(n > 0)
    }

    async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<City>, StoreError> {
        let select = city::Entity::find()
            .filter(lower_contains(city::Column::Name, query))
            .order_by(lower_col(city::Column::Name), Order::Asc)
            .order_by_asc(city::Column::Id);
        fetch_page(&self.db, select, page, to_city).await
    }

    async fn find_page_by_department(&self, department_id: i32, page: Pagination) -> Result<Page<City>, StoreError> {
        let select = city::Entity::find()
            .filter(city::Column::DepartmentId.eq(department_id))
            .order_by(lower_col(city::Column::Name), Order::Asc)
            .order_by_asc(city::Column::Id);
        fetch_page(&self.db, select, page, to_city).await
    }

    async fn insert(&self, new: NewCity) -> Result<City, StoreError> {
        let am = city::ActiveModel { id: NotSet, name: Set(new.name), department_id: Set(new.department_id) };
        am.insert(&self.db).await.map(to_city).map_err(map_db_err)
    }

    async fn update(&self, c: &City) -> Result<City, StoreError> {
        let am = city::ActiveModel { id: Set(c.id), name: Set(c.name.clone()), department_id: Set(c.department_id) };
        am.update(&self.db).await.map(to_city).map_err(map_db_err)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
        city::Entity::delete_by_id(id).exec(&self.db).await.map_err(map_db_err)?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for SeaOrmStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let found = user::Entity::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;
        Ok(found.map(to_user))
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError> {
        let n = user::Entity::find_by_id(id).count(&self.db).await.map_err(map_db_err)?;
        Ok(n > 0)
    }

    async fn exists_by_email_ignore_case(&self, email: &str) -> Result<bool, StoreError> {
        let n = user::Entity::find()
            .filter(lower_eq(user::Column::Email, email))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(n > 0)
    }

    async fn exists_by_parent(&self, parent: UserParent) -> Result<bool, StoreError> {
        let n = user::Entity::find().filter(parent_filter(parent)).count(&self.db).await.map_err(map_db_err)?;
        Ok(n > 0)
    }

    async fn find_page_by_name(&self, query: &str, page: Pagination) -> Result<Page<User>, StoreError> {
        let select = user::Entity::find()
            .filter(lower_contains(user::Column::Name, query))
            .order_by(lower_col(user::Column::Name), Order::Asc)
            .order_by_asc(user::Column::Id);
        fetch_page(&self.db, select, page, to_user).await
    }

    async fn find_page_by_parent(&self, parent: UserParent, page: Pagination) -> Result<Page<User>, StoreError> {
        let select = user::Entity::find()
            .filter(parent_filter(parent))
            .order_by(lower_col(user::Column::Name), Order::Asc)
            .order_by_asc(user::Column::Id);
        fetch_page(&self.db, select, page, to_user).await
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let am = user::ActiveModel {
            id: NotSet,
            name: Set(new.name),
            email: Set(new.email),
            phone: Set(new.phone),
            registered_on: Set(new.registered_on),
            address_detail: Set(new.address_detail),
            city_id: Set(new.city_id),
            department_id: Set(new.department_id),
            role_id: Set(new.role_id),
        };
        am.insert(&self.db).await.map(to_user).map_err(map_db_err)
    }

    async fn update(&self, u: &User) -> Result<User, StoreError> {
        let am = user::ActiveModel {
            id: Set(u.id),
            name: Set(u.name.clone()),
            email: Set(u.email.clone()),
            phone: Set(u.phone.clone()),
            registered_on: Set(u.registered_on),
            address_detail: Set(u.address_detail.clone()),
            city_id: Set(u.city_id),
            department_id: Set(u.department_id),
            role_id: Set(u.role_id),
        };
        am.update(&self.db).await.map(to_user).map_err(map_db_err)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
        user::Entity::delete_by_id(id).exec(&self.db).await.map_err(map_db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn db_tests_disabled() -> bool {
        std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err()
    }

    #[tokio::test]
    async fn seaorm_store_roundtrip_and_integrity() -> Result<(), anyhow::Error> {
        if db_tests_disabled() { return Ok(()); }
        let store = SeaOrmStore::new(get_db().await?);
        let tag = Uuid::new_v4().simple().to_string();

        let dept = DepartmentRepository::insert(&store, NewDepartment { name: format!("Dept {tag}") }).await?;
        assert!(DepartmentRepository::exists_by_name_ignore_case(&store, &format!("DEPT {}", tag.to_uppercase())).await?);

        let city = CityRepository::insert(&store, NewCity { name: format!("City {tag}"), department_id: dept.id }).await?;
        assert!(CityRepository::exists_by_name_in_department_ignore_case(&store, &format!("city {tag}"), dept.id).await?);

        let role = RoleRepository::insert(&store, NewRole { name: format!("Role {tag}") }).await?;
        let email = format!("u_{tag}@example.com");
        let user = UserRepository::insert(
            &store,
            NewUser {
                name: format!("User {tag}"),
                email: email.clone(),
                phone: None,
                registered_on: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                address_detail: None,
                city_id: city.id,
                department_id: dept.id,
                role_id: role.id,
            },
        )
        .await?;
        assert!(UserRepository::exists_by_email_ignore_case(&store, &email.to_uppercase()).await?);

        let page = UserRepository::find_page_by_name(&store, &tag, Pagination::new(0, 10)).await?;
        assert_eq!(page.total_elements, 1);
        assert_eq!(page.content[0].id, user.id);

        // referenced rows refuse deletion
        let err = CityRepository::delete_by_id(&store, city.id).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey(_)));

        // duplicate email in other case trips the unique index
        let dup = UserRepository::insert(
            &store,
            NewUser {
                name: "Other".into(),
                email: email.to_uppercase(),
                phone: None,
                registered_on: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                address_detail: None,
                city_id: city.id,
                department_id: dept.id,
                role_id: role.id,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(dup, StoreError::Unique(_)));

        UserRepository::delete_by_id(&store, user.id).await?;
        CityRepository::delete_by_id(&store, city.id).await?;
        RoleRepository::delete_by_id(&store, role.id).await?;
        DepartmentRepository::delete_by_id(&store, dept.id).await?;
        assert!(!DepartmentRepository::exists_by_id(&store, dept.id).await?);
        Ok(())
    }
}
