//! Presence-aware optional field for partial updates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field of a partial update: either left out by the caller or supplied.
///
/// Unlike `Option<T>`, an absent field and an explicit `null` are not the same
/// signal. Use it with `#[serde(default)]` so a missing key becomes `Absent`;
/// a present key is deserialized as `T` (so `null` is rejected unless `T`
/// itself accepts it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Present(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn present(&self) -> Option<&T> {
        match self {
            Patch::Absent => None,
            Patch::Present(v) => Some(v),
        }
    }

    /// The supplied value, or `fallback` when absent.
    pub fn unwrap_or_else(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Patch::Absent => fallback(),
            Patch::Present(v) => v,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Absent => serializer.serialize_none(),
            Patch::Present(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Patch::Present)
    }
}
