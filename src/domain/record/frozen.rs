//! Immutable ordered sequences used by record fields

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An immutable, cheaply clonable ordered sequence
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FrozenList<T>(Arc<[T]>);

impl<T> FrozenList<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self(items.into_iter().collect())
    }

    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T: Clone> FrozenList<T> {
    /// Returns a new list with `item` appended
    pub fn with(&self, item: T) -> Self {
        self.iter().cloned().chain(std::iter::once(item)).collect()
    }
}

impl<T> Default for FrozenList<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Deref for FrozenList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> FromIterator<T> for FrozenList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<T> From<Vec<T>> for FrozenList<T> {
    fn from(items: Vec<T>) -> Self {
        Self(Arc::from(items))
    }
}

impl<'a, T> IntoIterator for &'a FrozenList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: PartialEq> PartialEq<Vec<T>> for FrozenList<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for FrozenList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Serialize> Serialize for FrozenList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FrozenList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// Normalizes an optional collection into an optional frozen list
pub fn frozen_list_or_none<T, I>(items: Option<I>) -> Option<FrozenList<T>>
where
    I: IntoIterator,
    I::Item: Into<T>,
{
    items.map(|items| items.into_iter().map(Into::into).collect())
}
