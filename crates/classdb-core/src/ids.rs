//! Generational handles into the class arena.

use std::fmt;

/// Handle to a class slot in the registry arena.
///
/// A slot is reused after its class is unregistered; the generation makes
/// handles held by stale parent links compare unequal to the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId {
    pub index: u32,
    pub generation: u32,
}

impl ClassId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}
