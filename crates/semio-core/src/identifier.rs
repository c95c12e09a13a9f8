//! Interned identifiers for schema entities.
//!
//! Every level, type, member and property is addressed by an [`Id`]. Fully
//! qualified names are built with [`Id::nested`] and use `::` as separator,
//! e.g. `Masterplan::BuildingVolume::Height`.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Process-wide string interner.
///
/// # Thread Safety
///
/// Access is serialized through a `Mutex`, so independent compilations can
/// intern names concurrently. A poisoned lock is recovered, the interner is
/// append-only and never observed in a half-written state.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Interned identifier.
///
/// Cheap to copy, compare and hash.
///
/// # Examples
///
/// ```
/// use semio_core::identifier::Id;
///
/// let level = Id::new("Masterplan");
/// let object = Id::new("BuildingVolume");
///
/// let fqn = level.nested(object);
/// assert_eq!(fqn, "Masterplan::BuildingVolume");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns the qualified identifier `self::child`.
    ///
    /// # Examples
    ///
    /// ```
    /// use semio_core::identifier::Id;
    ///
    /// let property = Id::new("Masterplan")
    ///     .nested(Id::new("BuildingVolume"))
    ///     .nested(Id::new("Height"));
    /// assert_eq!(property, "Masterplan::BuildingVolume::Height");
    /// ```
    pub fn nested(&self, child: Id) -> Self {
        let mut interner = interner();
        let parent = interner.resolve(self.0).unwrap_or_default();
        let child = interner.resolve(child.0).unwrap_or_default();
        let qualified = format!("{parent}::{child}");
        Self(interner.get_or_intern(qualified))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Copy out first: the formatter may call back into the interner.
        let value = interner().resolve(self.0).unwrap_or_default().to_owned();
        f.write_str(&value)
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        interner().resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, thread};

    use super::*;

    #[test]
    fn test_new_interns_equal_names() {
        let a = Id::new("Masterplan");
        let b = Id::new("Masterplan");
        let c = Id::new("Apartmentplan");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, "Masterplan");
    }

    #[test]
    fn test_nested() {
        let level = Id::new("Masterplan");
        let use_type = level.nested(Id::new("Use"));
        let volume = level.nested(Id::new("BuildingVolume"));

        assert_ne!(use_type, volume);
        assert_eq!(use_type, "Masterplan::Use");
        assert_eq!(volume.nested(Id::new("Height")), "Masterplan::BuildingVolume::Height");
    }

    #[test]
    fn test_display() {
        assert_eq!(Id::new("Roomplan").to_string(), "Roomplan");
        assert_eq!(format!("`{}`", Id::new("Parcel")), "`Parcel`");
    }

    #[test]
    fn test_hash_map_key() {
        let mut map = HashMap::new();
        map.insert(Id::new("Use"), 1);
        map.insert(Id::new("Panels"), 2);

        assert_eq!(map.get(&Id::new("Use")), Some(&1));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_concurrent_interning() {
        let handles: Vec<_> = (0..4)
            .map(|i| thread::spawn(move || Id::new(&format!("Level{}", i % 2))))
            .collect();
        let ids: Vec<Id> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(ids[0], ids[2]);
        assert_eq!(ids[1], ids[3]);
        assert_ne!(ids[0], ids[1]);
    }
}
