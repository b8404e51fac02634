//! Field-level patch values for partial updates.
//!
//! A field missing from an update payload deserializes to [`Patch::Unset`];
//! any present value, `null` included for optional fields, becomes
//! [`Patch::Set`].

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    Unset,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self { Patch::Unset }
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool { matches!(self, Patch::Set(_)) }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Patch::Set(v) => Some(v),
            Patch::Unset => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Set(v) => Some(v),
            Patch::Unset => None,
        }
    }

    /// The patched value, or `current` when unset.
    pub fn resolve(self, current: T) -> T {
        self.into_option().unwrap_or(current)
    }

    /// Overwrite `target` when set; leave it alone otherwise.
    pub fn apply(self, target: &mut T) {
        if let Patch::Set(v) = self {
            *target = v;
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Unset, Patch::Set)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Patch::Set)
    }
}
