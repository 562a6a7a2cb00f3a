use core::hash::BuildHasherDefault;
use std::collections::HashMap;

// used for fast set intersections over part ids
use roaring::RoaringTreemap;

use seahash::SeaHasher;
use serde::{Deserialize, Serialize};

// ------------- Identity -------------
pub type Identity = u64;

pub type ColourId = Identity;
pub type ShapeId = Identity;
pub type PartId = Identity;
pub type SetId = Identity;
pub type UserId = Identity;
pub type InventoryId = Identity;

pub type Quantity = u32;

pub type IdHasher = BuildHasherDefault<SeaHasher>;
pub type PartQuantities = HashMap<PartId, Quantity, IdHasher>;

/// Identity carried by constructs that have not been handed to a store yet.
pub const GENESIS: Identity = 0;

#[derive(Debug)]
pub struct IdentityGenerator {
    lower_bound: Identity,
}

impl IdentityGenerator {
    pub fn new() -> Self {
        Self { lower_bound: GENESIS }
    }
    // Identities are normally generated, but records restored or seeded
    // with an identity of their own must push the lower bound past it.
    pub fn retain(&mut self, id: Identity) {
        if id > self.lower_bound {
            self.lower_bound = id;
        }
    }
    pub fn generate(&mut self) -> Identity {
        self.lower_bound += 1;
        self.lower_bound
    }
    pub fn lower_bound(&self) -> Identity {
        self.lower_bound
    }
}

impl Default for IdentityGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// Repeated parts add up, capped at the largest representable quantity.
fn accumulate(parts: &mut PartQuantities, part: PartId, quantity: Quantity) {
    if quantity > 0 {
        let held = parts.entry(part).or_insert(0);
        *held = held.saturating_add(quantity);
    }
}

// ------------- Colour -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour {
    id: ColourId,
    name: String,
}

impl Colour {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: GENESIS, name: name.into() }
    }
    pub fn with_id(mut self, id: ColourId) -> Self {
        self.id = id;
        self
    }
    pub fn id(&self) -> ColourId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

// ------------- Shape -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    id: ShapeId,
    name: String,
}

impl Shape {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: GENESIS, name: name.into() }
    }
    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = id;
        self
    }
    pub fn id(&self) -> ShapeId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

// ------------- Part -------------
/// A distinct brick type. Callers treat `(name, colour, shape)` as its
/// natural identity, but everything that matches parts does so on `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Part {
    id: PartId,
    name: String,
    colour: ColourId,
    shape: ShapeId,
}

impl Part {
    pub fn new(name: impl Into<String>, colour: ColourId, shape: ShapeId) -> Self {
        Self {
            id: GENESIS,
            name: name.into(),
            colour,
            shape,
        }
    }
    pub fn with_id(mut self, id: PartId) -> Self {
        self.id = id;
        self
    }
    pub fn id(&self) -> PartId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn colour(&self) -> ColourId {
        self.colour
    }
    pub fn shape(&self) -> ShapeId {
        self.shape
    }
    pub fn has_identity(&self, name: &str, colour: ColourId, shape: ShapeId) -> bool {
        self.name == name && self.colour == colour && self.shape == shape
    }
}

// ------------- Inventory -------------
/// The multiset of parts a user owns. A zero quantity is never stored, so
/// absence and "owns none" are the same thing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    id: InventoryId,
    parts: PartQuantities,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn from_parts<I: IntoIterator<Item = (PartId, Quantity)>>(parts: I) -> Self {
        parts
            .into_iter()
            .fold(Self::new(), |inventory, (part, quantity)| inventory.with_part(part, quantity))
    }
    pub fn with_part(mut self, part: PartId, quantity: Quantity) -> Self {
        accumulate(&mut self.parts, part, quantity);
        self
    }
    pub fn with_id(mut self, id: InventoryId) -> Self {
        self.id = id;
        self
    }
    pub fn id(&self) -> InventoryId {
        self.id
    }
    pub fn quantity_of(&self, part: PartId) -> Quantity {
        self.parts.get(&part).copied().unwrap_or(0)
    }
    pub fn parts(&self) -> impl Iterator<Item = (PartId, Quantity)> + '_ {
        self.parts
            .iter()
            .filter(|(_, quantity)| **quantity > 0)
            .map(|(part, quantity)| (*part, *quantity))
    }
    /// Parts owned in positive quantity.
    pub fn part_ids(&self) -> RoaringTreemap {
        self.parts().map(|(part, _)| part).collect()
    }
    pub fn len(&self) -> usize {
        self.parts().count()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn brick_count(&self) -> u64 {
        self.parts().map(|(_, quantity)| u64::from(quantity)).sum()
    }
}

// ------------- Set -------------
/// A catalogue item and its bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Set {
    id: SetId,
    name: String,
    required_parts: PartQuantities,
}

impl Set {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GENESIS,
            name: name.into(),
            required_parts: PartQuantities::default(),
        }
    }
    pub fn with_part(mut self, part: PartId, quantity: Quantity) -> Self {
        accumulate(&mut self.required_parts, part, quantity);
        self
    }
    pub fn with_id(mut self, id: SetId) -> Self {
        self.id = id;
        self
    }
    pub fn id(&self) -> SetId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn required_quantity(&self, part: PartId) -> Quantity {
        self.required_parts.get(&part).copied().unwrap_or(0)
    }
    pub fn required_parts(&self) -> impl Iterator<Item = (PartId, Quantity)> + '_ {
        self.required_parts
            .iter()
            .filter(|(_, quantity)| **quantity > 0)
            .map(|(part, quantity)| (*part, *quantity))
    }
    pub fn part_ids(&self) -> RoaringTreemap {
        self.required_parts().map(|(part, _)| part).collect()
    }
    pub fn total_pieces(&self) -> u64 {
        self.required_parts().map(|(_, quantity)| u64::from(quantity)).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.required_parts().next().is_none()
    }
}

// ------------- User -------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    inventory: Inventory,
}

impl User {
    pub fn new(name: impl Into<String>, inventory: Inventory) -> Self {
        Self {
            id: GENESIS,
            name: name.into(),
            inventory,
        }
    }
    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }
    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }
    pub fn id(&self) -> UserId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }
    pub fn brick_count(&self) -> u64 {
        self.inventory.brick_count()
    }
}
