//! Keeper-backed repository living entirely in memory.
//!
//! Every kind of construct is owned by its own keeper behind a mutex. A keeper
//! remembers insertion order (the catalogue order the engine reports in) and
//! indexes its constructs by identity. Seeding through the `with_*` builders
//! keeps records verbatim, identities included, and skips the referential
//! checks the `create_*` operations perform.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::construct::{
    Colour, ColourId, Identity, IdentityGenerator, IdHasher, Inventory, Part, PartId, Set, SetId,
    Shape, ShapeId, User, UserId,
};
use crate::error::{BrickError, Result};
use crate::repository::BricksRepository;

pub trait Kept: Clone {
    fn identity(&self) -> Identity;
}

impl Kept for Colour {
    fn identity(&self) -> Identity {
        self.id()
    }
}
impl Kept for Shape {
    fn identity(&self) -> Identity {
        self.id()
    }
}
impl Kept for Part {
    fn identity(&self) -> Identity {
        self.id()
    }
}
impl Kept for Set {
    fn identity(&self) -> Identity {
        self.id()
    }
}
impl Kept for User {
    fn identity(&self) -> Identity {
        self.id()
    }
}

#[derive(Debug)]
pub struct Keeper<T: Kept> {
    kept: Vec<T>,
    lookup: HashMap<Identity, usize, IdHasher>,
    generator: IdentityGenerator,
}

impl<T: Kept> Keeper<T> {
    pub fn new() -> Self {
        Self {
            kept: Vec::new(),
            lookup: HashMap::default(),
            generator: IdentityGenerator::new(),
        }
    }
    /// Keeps a construct under the identity it already carries, replacing
    /// any previous construct with the same identity.
    pub fn keep(&mut self, keepsake: T) -> T {
        let identity = keepsake.identity();
        self.generator.retain(identity);
        let existing = self.lookup.get(&identity).copied();
        match existing {
            Some(position) => self.kept[position] = keepsake.clone(),
            None => {
                self.lookup.insert(identity, self.kept.len());
                self.kept.push(keepsake.clone());
            }
        }
        keepsake
    }
    /// Keeps a construct under a freshly generated identity.
    pub fn keep_new<F: FnOnce(Identity) -> T>(&mut self, build: F) -> T {
        let identity = self.generator.generate();
        self.keep(build(identity))
    }
    pub fn get(&self, identity: Identity) -> Option<&T> {
        self.lookup.get(&identity).map(|position| &self.kept[*position])
    }
    pub fn contains(&self, identity: Identity) -> bool {
        self.lookup.contains_key(&identity)
    }
    pub fn find<P: Fn(&T) -> bool>(&self, predicate: P) -> Option<&T> {
        self.kept.iter().find(|kept| predicate(kept))
    }
    pub fn all(&self) -> Vec<T> {
        self.kept.clone()
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

impl<T: Kept> Default for Keeper<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn seed<T: Kept, I: IntoIterator<Item = T>>(keeper: &mut Mutex<Keeper<T>>, keepsakes: I) {
    let keeper = keeper.get_mut().unwrap_or_else(PoisonError::into_inner);
    for keepsake in keepsakes {
        keeper.keep(keepsake);
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    colour_keeper: Mutex<Keeper<Colour>>,
    shape_keeper: Mutex<Keeper<Shape>>,
    part_keeper: Mutex<Keeper<Part>>,
    set_keeper: Mutex<Keeper<Set>>,
    user_keeper: Mutex<Keeper<User>>,
    inventory_generator: Mutex<IdentityGenerator>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_colours<I: IntoIterator<Item = Colour>>(mut self, colours: I) -> Self {
        seed(&mut self.colour_keeper, colours);
        self
    }
    pub fn with_shapes<I: IntoIterator<Item = Shape>>(mut self, shapes: I) -> Self {
        seed(&mut self.shape_keeper, shapes);
        self
    }
    pub fn with_parts<I: IntoIterator<Item = Part>>(mut self, parts: I) -> Self {
        seed(&mut self.part_keeper, parts);
        self
    }
    pub fn with_sets<I: IntoIterator<Item = Set>>(mut self, sets: I) -> Self {
        seed(&mut self.set_keeper, sets);
        self
    }
    pub fn with_users<I: IntoIterator<Item = User>>(mut self, users: I) -> Self {
        let users: Vec<User> = users.into_iter().collect();
        {
            let generator = self
                .inventory_generator
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner);
            for user in &users {
                generator.retain(user.inventory().id());
            }
        }
        seed(&mut self.user_keeper, users);
        self
    }

    fn check_parts<I: IntoIterator<Item = PartId>>(&self, parts: I) -> Result<()> {
        let part_keeper = self.part_keeper.lock()?;
        for part in parts {
            if !part_keeper.contains(part) {
                return Err(BrickError::UnknownPart(part));
            }
        }
        Ok(())
    }
}

impl BricksRepository for InMemoryRepository {
    fn all_sets(&self) -> Result<Vec<Set>> {
        Ok(self.set_keeper.lock()?.all())
    }
    fn set_by_id(&self, id: SetId) -> Result<Option<Set>> {
        Ok(self.set_keeper.lock()?.get(id).cloned())
    }
    fn set_by_name(&self, name: &str) -> Result<Option<Set>> {
        Ok(self.set_keeper.lock()?.find(|set| set.name() == name).cloned())
    }

    fn all_users(&self) -> Result<Vec<User>> {
        Ok(self.user_keeper.lock()?.all())
    }
    fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.user_keeper.lock()?.get(id).cloned())
    }
    fn user_by_name(&self, name: &str) -> Result<Option<User>> {
        Ok(self.user_keeper.lock()?.find(|user| user.name() == name).cloned())
    }
    fn user_count(&self) -> Result<usize> {
        Ok(self.user_keeper.lock()?.len())
    }

    fn all_parts(&self) -> Result<Vec<Part>> {
        Ok(self.part_keeper.lock()?.all())
    }
    fn part_by_identity(&self, name: &str, colour: ColourId, shape: ShapeId) -> Result<Option<Part>> {
        Ok(self
            .part_keeper
            .lock()?
            .find(|part| part.has_identity(name, colour, shape))
            .cloned())
    }

    fn all_colours(&self) -> Result<Vec<Colour>> {
        Ok(self.colour_keeper.lock()?.all())
    }
    fn all_shapes(&self) -> Result<Vec<Shape>> {
        Ok(self.shape_keeper.lock()?.all())
    }

    fn create_colour(&self, colour: Colour) -> Result<Colour> {
        Ok(self.colour_keeper.lock()?.keep_new(|id| colour.with_id(id)))
    }
    fn create_shape(&self, shape: Shape) -> Result<Shape> {
        Ok(self.shape_keeper.lock()?.keep_new(|id| shape.with_id(id)))
    }
    fn create_part(&self, part: Part) -> Result<Part> {
        if !self.colour_keeper.lock()?.contains(part.colour()) {
            return Err(BrickError::UnknownColour(part.colour()));
        }
        if !self.shape_keeper.lock()?.contains(part.shape()) {
            return Err(BrickError::UnknownShape(part.shape()));
        }
        Ok(self.part_keeper.lock()?.keep_new(|id| part.with_id(id)))
    }
    fn create_set(&self, set: Set) -> Result<Set> {
        self.check_parts(set.required_parts().map(|(part, _)| part))?;
        Ok(self.set_keeper.lock()?.keep_new(|id| set.with_id(id)))
    }
    fn create_user(&self, user: User) -> Result<User> {
        self.check_parts(user.inventory().parts().map(|(part, _)| part))?;
        let inventory_id = self.inventory_generator.lock()?.generate();
        let inventory = Inventory::from_parts(user.inventory().parts()).with_id(inventory_id);
        Ok(self
            .user_keeper
            .lock()?
            .keep_new(|id| user.with_id(id).with_inventory(inventory)))
    }
}
