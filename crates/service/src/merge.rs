//! Applies partial-update payloads onto persisted entities.
//!
//! Referenced entities are fetched and validated before any merge runs, so a
//! merge itself cannot fail and never leaves an entity half-updated.

use crate::domain::{City, CityPatch, Department, DepartmentPatch, Role, RolePatch, User, UserPatch};
use crate::validation::Placement;

/// Relation targets resolved ahead of a user merge. `None` means the patch
/// left that relation alone.
#[derive(Debug, Default)]
pub struct ResolvedRelations {
    pub placement: Option<Placement>,
    pub role: Option<Role>,
}

pub fn merge_department(department: &mut Department, patch: DepartmentPatch) {
    patch.name.apply(&mut department.name);
}

pub fn merge_role(role: &mut Role, patch: RolePatch) {
    patch.name.apply(&mut role.name);
}

pub fn merge_city(city: &mut City, patch: CityPatch) {
    let CityPatch { name, department_id } = patch;
    name.apply(&mut city.name);
    department_id.apply(&mut city.department_id);
}

/// Scalar fields come from `patch`; relation ids come only from `relations`,
/// and city/department are always written as a validated pair.
pub fn merge_user(user: &mut User, patch: UserPatch, relations: &ResolvedRelations) {
    let UserPatch { name, email, phone, registered_on, address_detail, .. } = patch;
    name.apply(&mut user.name);
    email.apply(&mut user.email);
    phone.apply(&mut user.phone);
    registered_on.apply(&mut user.registered_on);
    address_detail.apply(&mut user.address_detail);

    if let Some(placement) = &relations.placement {
        user.city_id = placement.city().id;
        user.department_id = placement.department().id;
    }
    if let Some(role) = &relations.role {
        user.role_id = role.id;
    }
}
