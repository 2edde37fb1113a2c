//! Allow-lists of transient error kinds

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Classifies an error so it can be matched against an [`AllowList`]
pub trait ErrorKind {
    type Kind: Copy + Eq + Hash + Debug;

    fn kind(&self) -> Self::Kind;
}

impl ErrorKind for std::io::Error {
    type Kind = std::io::ErrorKind;

    fn kind(&self) -> Self::Kind {
        std::io::Error::kind(self)
    }
}

/// Error kinds tolerated as transient while polling
///
/// The default allows nothing: any probe error ends the poll.
#[derive(Debug, Clone)]
pub enum AllowList<K> {
    /// Every error kind is transient
    Any,
    /// Only the listed kinds are transient
    Kinds(HashSet<K>),
}

impl<K: Copy + Eq + Hash> AllowList<K> {
    pub fn any() -> Self {
        Self::Any
    }

    pub fn none() -> Self {
        Self::Kinds(HashSet::new())
    }

    pub fn only(kinds: impl IntoIterator<Item = K>) -> Self {
        Self::Kinds(kinds.into_iter().collect())
    }

    /// Adds a kind; no-op for [`AllowList::Any`]
    pub fn with(mut self, kind: K) -> Self {
        if let Self::Kinds(kinds) = &mut self {
            kinds.insert(kind);
        }
        self
    }

    pub fn allows(&self, kind: K) -> bool {
        match self {
            Self::Any => true,
            Self::Kinds(kinds) => kinds.contains(&kind),
        }
    }

    /// Checks whether `err` is transient under this list
    pub fn permits<E>(&self, err: &E) -> bool
    where
        E: ErrorKind<Kind = K>,
    {
        self.allows(err.kind())
    }
}

impl<K> Default for AllowList<K> {
    fn default() -> Self {
        Self::Kinds(HashSet::new())
    }
}

impl<K: Eq + Hash> PartialEq for AllowList<K> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, Self::Any) => true,
            (Self::Kinds(a), Self::Kinds(b)) => a == b,
            _ => false,
        }
    }
}

impl<K: Eq + Hash> Eq for AllowList<K> {}

impl<K: Copy + Eq + Hash> FromIterator<K> for AllowList<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::only(iter)
    }
}
