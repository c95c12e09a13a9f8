//! The external primitive namespace.
//!
//! Primitives are geometry and value types provided by a library outside the
//! generated model. Schemas reference them by name only.

use indexmap::IndexSet;

use crate::identifier::Id;

/// Names every schema can reference without declaring them.
pub const BUILTIN_PRIMITIVES: [&str; 8] = [
    "Point",
    "Curve",
    "ClosedCurve",
    "Surface",
    "Solid",
    "Number",
    "Integer",
    "Text",
];

/// Set of primitive type names visible to every abstraction level.
#[derive(Debug, Clone)]
pub struct PrimitiveSet {
    names: IndexSet<Id>,
}

impl PrimitiveSet {
    /// The built-in primitives only.
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN_PRIMITIVES.iter().map(|name| Id::new(name)).collect(),
        }
    }

    /// Adds primitives provided by the host library in addition to the built-ins.
    pub fn with_extra<'a>(mut self, extra: impl IntoIterator<Item = &'a str>) -> Self {
        self.names.extend(extra.into_iter().map(Id::new));
        self
    }

    pub fn contains(&self, name: Id) -> bool {
        self.names.contains(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.names.iter().copied()
    }
}

impl Default for PrimitiveSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_geometry() {
        let primitives = PrimitiveSet::builtin();
        assert!(primitives.contains(Id::new("ClosedCurve")));
        assert!(primitives.contains(Id::new("Integer")));
        assert!(!primitives.contains(Id::new("Polygon")));
    }

    #[test]
    fn test_with_extra() {
        let primitives = PrimitiveSet::builtin().with_extra(["Polygon", "Point"]);
        assert!(primitives.contains(Id::new("Polygon")));
        assert_eq!(primitives.iter().count(), BUILTIN_PRIMITIVES.len() + 1);
    }
}
