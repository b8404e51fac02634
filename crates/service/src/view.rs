//! Output projections with relation display fields resolved.
//!
//! Projection never fails: a relation that could not be resolved shows up
//! as an absent id/name pair.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{City, Department, Role, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentView {
    pub id: i32,
    pub name: String,
}

impl From<&Department> for DepartmentView {
    fn from(d: &Department) -> Self { Self { id: d.id, name: d.name.clone() } }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleView {
    pub id: i32,
    pub name: String,
}

impl From<&Role> for RoleView {
    fn from(r: &Role) -> Self { Self { id: r.id, name: r.name.clone() } }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityView {
    pub id: i32,
    pub name: String,
    pub department_id: Option<i32>,
    pub department_name: Option<String>,
}

impl CityView {
    pub fn project(city: &City, department: Option<&Department>) -> Self {
        Self {
            id: city.id,
            name: city.name.clone(),
            department_id: department.map(|d| d.id),
            department_name: department.map(|d| d.name.clone()),
        }
    }
}

/// Relations resolved for one user; any may be missing.
#[derive(Debug, Clone, Default)]
pub struct UserRelations {
    pub city: Option<City>,
    pub department: Option<Department>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub registered_on: NaiveDate,
    pub address_detail: Option<String>,
    pub city_id: Option<i32>,
    pub city_name: Option<String>,
    pub department_id: Option<i32>,
    pub department_name: Option<String>,
    pub role_id: Option<i32>,
    pub role_name: Option<String>,
}

impl UserView {
    pub fn project(user: &User, relations: &UserRelations) -> Self {
        let city = relations.city.as_ref();
        let department = relations.department.as_ref();
        let role = relations.role.as_ref();
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            registered_on: user.registered_on,
            address_detail: user.address_detail.clone(),
            city_id: city.map(|c| c.id),
            city_name: city.map(|c| c.name.clone()),
            department_id: department.map(|d| d.id),
            department_name: department.map(|d| d.name.clone()),
            role_id: role.map(|r| r.id),
            role_name: role.map(|r| r.name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 7,
            name: "Maria Lopez".into(),
            email: "maria@example.com".into(),
            phone: None,
            registered_on: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            address_detail: None,
            city_id: 1,
            department_id: 1,
            role_id: 1,
        }
    }

    #[test]
    fn resolved_relations_are_flattened() {
        let relations = UserRelations {
            city: Some(City { id: 1, name: "Miraflores".into(), department_id: 1 }),
            department: Some(Department { id: 1, name: "Lima".into() }),
            role: Some(Role { id: 1, name: "Admin".into() }),
        };
        let view = UserView::project(&user(), &relations);
        assert_eq!(view.city_id, Some(1));
        assert_eq!(view.city_name.as_deref(), Some("Miraflores"));
        assert_eq!(view.department_name.as_deref(), Some("Lima"));
        assert_eq!(view.role_name.as_deref(), Some("Admin"));
    }

    #[test]
    fn missing_relations_project_as_absent() {
        let view = UserView::project(&user(), &UserRelations::default());
        assert_eq!(view.id, 7);
        assert_eq!((view.city_id, view.city_name), (None, None));
        assert_eq!((view.department_id, view.department_name), (None, None));
        assert_eq!((view.role_id, view.role_name), (None, None));
    }

    #[test]
    fn city_without_department_projects_absent_pair() {
        let city = City { id: 3, name: "Surco".into(), department_id: 1 };
        let view = CityView::project(&city, None);
        assert_eq!(view.department_id, None);
        assert_eq!(view.department_name, None);
    }

    #[test]
    fn user_view_serializes_camel_case() {
        let json = serde_json::to_value(UserView::project(&user(), &UserRelations::default())).unwrap();
        assert_eq!(json["registeredOn"], "2024-05-02");
        assert!(json["cityName"].is_null());
    }
}
