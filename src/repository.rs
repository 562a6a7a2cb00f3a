//! The capability set the buildability engine reads through.
//!
//! Lookups never fail for "not found": they answer `Ok(None)` or an empty
//! vector. An `Err` always means the store itself is unhealthy (a poisoned
//! lock, a SQLite fault) or that a create referenced something unknown.

use crate::construct::{Colour, ColourId, Part, Set, SetId, Shape, ShapeId, User, UserId};
use crate::error::Result;

/// Which set a caller means, for operations reachable both by id and by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetSelector {
    Id(SetId),
    Name(String),
}

impl From<SetId> for SetSelector {
    fn from(id: SetId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for SetSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

pub trait BricksRepository: Send + Sync {
    fn all_sets(&self) -> Result<Vec<Set>>;
    fn set_by_id(&self, id: SetId) -> Result<Option<Set>>;
    /// First set with this name, in catalogue order.
    fn set_by_name(&self, name: &str) -> Result<Option<Set>>;

    fn all_users(&self) -> Result<Vec<User>>;
    fn user_by_id(&self, id: UserId) -> Result<Option<User>>;
    fn user_by_name(&self, name: &str) -> Result<Option<User>>;

    fn all_parts(&self) -> Result<Vec<Part>>;
    fn part_by_identity(&self, name: &str, colour: ColourId, shape: ShapeId) -> Result<Option<Part>>;

    fn all_colours(&self) -> Result<Vec<Colour>>;
    fn all_shapes(&self) -> Result<Vec<Shape>>;

    fn create_colour(&self, colour: Colour) -> Result<Colour>;
    fn create_shape(&self, shape: Shape) -> Result<Shape>;
    /// Fails with `UnknownColour`/`UnknownShape` when the references dangle.
    fn create_part(&self, part: Part) -> Result<Part>;
    /// Assigns the set identity. Every required part must already exist,
    /// otherwise nothing is stored and `UnknownPart` is returned.
    fn create_set(&self, set: Set) -> Result<Set>;
    /// Assigns both the user and the inventory identity.
    fn create_user(&self, user: User) -> Result<User>;

    fn set(&self, selector: &SetSelector) -> Result<Option<Set>> {
        match selector {
            SetSelector::Id(id) => self.set_by_id(*id),
            SetSelector::Name(name) => self.set_by_name(name),
        }
    }
    fn user_count(&self) -> Result<usize> {
        Ok(self.all_users()?.len())
    }
}
