//! Cross-field and field-format checks shared by create and update paths.

use crate::domain::{City, CreateUserInput, Department, UserPatch};
use crate::errors::ServiceError;
use crate::patch::Patch;

/// Fails unless `city` sits inside the department identified by `department_id`.
pub fn assert_city_belongs_to_department(city: &City, department_id: i32) -> Result<(), ServiceError> {
    if city.department_id != department_id {
        return Err(ServiceError::Validation(format!(
            "city {} does not belong to department {}",
            city.id, department_id
        )));
    }
    Ok(())
}

/// A city and department pair that has passed
/// [`assert_city_belongs_to_department`]. The only way to assign a user's
/// location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    city: City,
    department: Department,
}

impl Placement {
    pub fn new(city: City, department: Department) -> Result<Self, ServiceError> {
        assert_city_belongs_to_department(&city, department.id)?;
        Ok(Self { city, department })
    }

    pub fn city(&self) -> &City { &self.city }

    pub fn department(&self) -> &Department { &self.department }

    pub fn into_parts(self) -> (City, Department) { (self.city, self.department) }
}

pub fn validate_create_user(input: &CreateUserInput) -> Result<(), ServiceError> {
    models::user::validate_name(&input.name)?;
    models::user::validate_email(&input.email)?;
    if let Some(phone) = &input.phone {
        models::user::validate_phone(phone)?;
    }
    if let Some(address) = &input.address_detail {
        models::user::validate_address(address)?;
    }
    Ok(())
}

/// Only fields present in the patch are checked.
pub fn validate_user_patch(patch: &UserPatch) -> Result<(), ServiceError> {
    if let Patch::Set(name) = &patch.name {
        models::user::validate_name(name)?;
    }
    if let Patch::Set(email) = &patch.email {
        models::user::validate_email(email)?;
    }
    if let Patch::Set(Some(phone)) = &patch.phone {
        models::user::validate_phone(phone)?;
    }
    if let Patch::Set(Some(address)) = &patch.address_detail {
        models::user::validate_address(address)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lima() -> Department { Department { id: 1, name: "Lima".into() } }

    fn miraflores() -> City { City { id: 10, name: "Miraflores".into(), department_id: 1 } }

    #[test]
    fn matching_department_passes() {
        assert!(assert_city_belongs_to_department(&miraflores(), 1).is_ok());
    }

    #[test]
    fn foreign_department_is_a_validation_error() {
        let err = assert_city_belongs_to_department(&miraflores(), 999).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn placement_requires_matching_pair() {
        let placement = Placement::new(miraflores(), lima()).unwrap();
        assert_eq!(placement.city().id, 10);
        assert_eq!(placement.department().id, 1);

        let cusco = Department { id: 2, name: "Cusco".into() };
        assert!(Placement::new(miraflores(), cusco).is_err());
    }

    #[test]
    fn patch_validation_skips_unset_fields() {
        assert!(validate_user_patch(&UserPatch::default()).is_ok());
        let patch = UserPatch { phone: Patch::Set(Some("123".into())), ..UserPatch::default() };
        assert!(validate_user_patch(&patch).is_err());
        let cleared = UserPatch { phone: Patch::Set(None), ..UserPatch::default() };
        assert!(validate_user_patch(&cleared).is_ok());
    }
}
