//! Domain entities, creation inputs and partial-update payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::patch::Patch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub department_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub registered_on: NaiveDate,
    pub address_detail: Option<String>,
    pub city_id: i32,
    pub department_id: i32,
    pub role_id: i32,
}

/// Row to insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDepartment {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCity {
    pub name: String,
    pub department_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub registered_on: NaiveDate,
    pub address_detail: Option<String>,
    pub city_id: i32,
    pub department_id: i32,
    pub role_id: i32,
}

impl NewUser {
    pub fn into_user(self, id: i32) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            registered_on: self.registered_on,
            address_detail: self.address_detail,
            city_id: self.city_id,
            department_id: self.department_id,
            role_id: self.role_id,
        }
    }
}

/// Foreign-key column a user listing filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserParent {
    City(i32),
    Department(i32),
    Role(i32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartmentInput {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DepartmentPatch {
    pub name: Patch<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoleInput {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RolePatch {
    pub name: Patch<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCityInput {
    pub name: String,
    pub department_id: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CityPatch {
    pub name: Patch<String>,
    pub department_id: Patch<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub registered_on: Option<NaiveDate>,
    #[serde(default)]
    pub address_detail: Option<String>,
    pub city_id: i32,
    pub department_id: i32,
    pub role_id: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Patch<String>,
    pub email: Patch<String>,
    pub phone: Patch<Option<String>>,
    pub registered_on: Patch<NaiveDate>,
    pub address_detail: Patch<Option<String>>,
    pub city_id: Patch<i32>,
    pub department_id: Patch<i32>,
    pub role_id: Patch<i32>,
}

impl UserPatch {
    pub fn touches_placement(&self) -> bool {
        self.city_id.is_set() || self.department_id.is_set()
    }
}
