use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{city, department, errors::ModelError, role};

pub const EMAIL_MAX_LEN: usize = 120;
pub const ADDRESS_MAX_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub registered_on: Date,
    pub address_detail: Option<String>,
    pub city_id: i32,
    pub department_id: i32,
    pub role_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    City,
    Department,
    Role,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::City => Entity::belongs_to(city::Entity).from(Column::CityId).to(city::Column::Id).into(),
            Relation::Department => Entity::belongs_to(department::Entity)
                .from(Column::DepartmentId)
                .to(department::Column::Id)
                .into(),
            Relation::Role => Entity::belongs_to(role::Entity).from(Column::RoleId).to(role::Column::Id).into(),
        }
    }
}

impl Related<city::Entity> for Entity {
    fn to() -> RelationDef { Relation::City.def() }
}

impl Related<department::Entity> for Entity {
    fn to() -> RelationDef { Relation::Department.def() }
}

impl Related<role::Entity> for Entity {
    fn to() -> RelationDef { Relation::Role.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    crate::validate_text("name", name, crate::NAME_MAX_LEN)
}

/// `local@domain.tld`, no whitespace, bounded length.
pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let invalid = || ModelError::Validation("invalid email".into());
    if email.len() > EMAIL_MAX_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Optional leading `+`, then 7 to 15 digits.
pub fn validate_phone(phone: &str) -> Result<(), ModelError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let ok = (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if ok { Ok(()) } else { Err(ModelError::Validation("invalid phone".into())) }
}

pub fn validate_address(address: &str) -> Result<(), ModelError> {
    if address.chars().count() > ADDRESS_MAX_LEN {
        return Err(ModelError::Validation(format!("address detail longer than {ADDRESS_MAX_LEN} characters")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_email() {
        assert!(validate_email("juan@example.com").is_ok());
        assert!(validate_email("maria.lopez+ops@mail.example.pe").is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["correo_invalido", "@example.com", "juan@", "juan@example", "juan@@example.com", "ju an@example.com", "juan@example..com"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn phone_needs_seven_to_fifteen_digits() {
        assert!(validate_phone("1234567890").is_ok());
        assert!(validate_phone("+51987654321").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("12345abc90").is_err());
        assert!(validate_phone("1234567890123456").is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Juan Perez").is_ok());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn long_address_is_rejected() {
        assert!(validate_address("Calle Falsa 123").is_ok());
        assert!(validate_address(&"x".repeat(256)).is_err());
    }
}
