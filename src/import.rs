//! Loading a catalogue document into a repository.
//!
//! Items in the document refer to parts by name, colour name and shape name.
//! The importer resolves those against what the repository already holds and
//! creates whatever is absent, so a part is only ever created once per
//! identity triple. Sets and users that already exist by name are left alone.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::construct::{Colour, ColourId, Inventory, Part, PartId, Quantity, Set, Shape, ShapeId, User};
use crate::error::Result;
use crate::repository::BricksRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartEntry {
    pub name: String,
    pub colour: String,
    pub shape: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub part: String,
    pub colour: String,
    pub shape: String,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetEntry {
    pub name: String,
    #[serde(default)]
    pub parts: Vec<ItemEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub name: String,
    #[serde(default)]
    pub inventory: Vec<ItemEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalogue {
    #[serde(default)]
    pub colours: Vec<String>,
    #[serde(default)]
    pub shapes: Vec<String>,
    #[serde(default)]
    pub parts: Vec<PartEntry>,
    #[serde(default)]
    pub sets: Vec<SetEntry>,
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

impl Catalogue {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImportSummary {
    pub colours: usize,
    pub shapes: usize,
    pub parts: usize,
    pub sets: usize,
    pub users: usize,
    pub skipped: usize,
}

pub struct Importer<'r, R: BricksRepository + ?Sized> {
    repository: &'r R,
    colours: HashMap<String, ColourId>,
    shapes: HashMap<String, ShapeId>,
    parts: HashMap<(String, ColourId, ShapeId), PartId>,
    summary: ImportSummary,
}

impl<'r, R: BricksRepository + ?Sized> Importer<'r, R> {
    pub fn new(repository: &'r R) -> Self {
        Self {
            repository,
            colours: HashMap::new(),
            shapes: HashMap::new(),
            parts: HashMap::new(),
            summary: ImportSummary::default(),
        }
    }

    pub fn import(&mut self, catalogue: &Catalogue) -> Result<ImportSummary> {
        self.summary = ImportSummary::default();
        self.load_known()?;

        for colour in &catalogue.colours {
            self.colour(colour)?;
        }
        for shape in &catalogue.shapes {
            self.shape(shape)?;
        }
        for part in &catalogue.parts {
            self.part(&part.name, &part.colour, &part.shape)?;
        }
        info!(
            colours = self.summary.colours,
            shapes = self.summary.shapes,
            parts = self.summary.parts,
            "catalogue parts imported"
        );

        for entry in &catalogue.sets {
            if self.repository.set_by_name(&entry.name)?.is_some() {
                debug!(set = %entry.name, "set already present");
                self.summary.skipped += 1;
                continue;
            }
            let mut set = Set::new(entry.name.as_str());
            for item in entry.parts.iter().filter(|item| item.quantity > 0) {
                let part = self.part(&item.part, &item.colour, &item.shape)?;
                set = set.with_part(part, item.quantity);
            }
            self.repository.create_set(set)?;
            self.summary.sets += 1;
        }
        info!(sets = self.summary.sets, "catalogue sets imported");

        for entry in &catalogue.users {
            if self.repository.user_by_name(&entry.name)?.is_some() {
                debug!(user = %entry.name, "user already present");
                self.summary.skipped += 1;
                continue;
            }
            let mut inventory = Inventory::new();
            for item in entry.inventory.iter().filter(|item| item.quantity > 0) {
                let part = self.part(&item.part, &item.colour, &item.shape)?;
                inventory = inventory.with_part(part, item.quantity);
            }
            self.repository.create_user(User::new(entry.name.as_str(), inventory))?;
            self.summary.users += 1;
        }
        info!(
            users = self.summary.users,
            skipped = self.summary.skipped,
            "catalogue users imported"
        );
        Ok(self.summary)
    }

    fn load_known(&mut self) -> Result<()> {
        // first occurrence of a name wins, as in catalogue order
        for colour in self.repository.all_colours()? {
            self.colours.entry(colour.name().to_owned()).or_insert(colour.id());
        }
        for shape in self.repository.all_shapes()? {
            self.shapes.entry(shape.name().to_owned()).or_insert(shape.id());
        }
        for part in self.repository.all_parts()? {
            self.parts
                .entry((part.name().to_owned(), part.colour(), part.shape()))
                .or_insert(part.id());
        }
        Ok(())
    }

    fn colour(&mut self, name: &str) -> Result<ColourId> {
        if let Some(id) = self.colours.get(name) {
            return Ok(*id);
        }
        let colour = self.repository.create_colour(Colour::new(name))?;
        self.colours.insert(name.to_owned(), colour.id());
        self.summary.colours += 1;
        Ok(colour.id())
    }

    fn shape(&mut self, name: &str) -> Result<ShapeId> {
        if let Some(id) = self.shapes.get(name) {
            return Ok(*id);
        }
        let shape = self.repository.create_shape(Shape::new(name))?;
        self.shapes.insert(name.to_owned(), shape.id());
        self.summary.shapes += 1;
        Ok(shape.id())
    }

    fn part(&mut self, name: &str, colour: &str, shape: &str) -> Result<PartId> {
        let colour = self.colour(colour)?;
        let shape = self.shape(shape)?;
        let key = (name.to_owned(), colour, shape);
        if let Some(id) = self.parts.get(&key) {
            return Ok(*id);
        }
        let part = self.repository.create_part(Part::new(name, colour, shape))?;
        self.parts.insert(key, part.id());
        self.summary.parts += 1;
        Ok(part.id())
    }
}
