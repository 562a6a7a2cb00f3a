//! Brickstore – answers "which sets can I build?" for a community of brick
//! collectors.
//!
//! The data model is small:
//! * A [`construct::Part`] is a distinct brick type (name, colour, shape) with a
//!   surrogate identity that everything matches on.
//! * An [`construct::Inventory`] is the multiset of parts a
//!   [`construct::User`] owns.
//! * A [`construct::Set`] is a catalogue item with a fixed bill of materials.
//!
//! ## Modules
//! * [`construct`] – Identities and the records above.
//! * [`repository`] – The [`repository::BricksRepository`] trait every store
//!   implements.
//! * [`memory`] – Keeper-backed in-memory store, mostly for tests and fixtures.
//! * [`persist`] – SQLite store.
//! * [`engine`] – Buildability analysis: possible sets, missing parts, part
//!   sharing suggestions and part usage.
//! * [`import`] – Loads a JSON catalogue document into any store.
//! * [`server`] – The JSON API (axum).
//! * [`config`] – Layered runtime settings.
//!
//! ## Quick Start
//! ```
//! use brickstore::construct::{Colour, Inventory, Part, Set, Shape, User};
//! use brickstore::engine::Engine;
//! use brickstore::persist::{PersistenceMode, SqliteRepository};
//! use brickstore::repository::BricksRepository;
//!
//! let store = SqliteRepository::open(&PersistenceMode::InMemory).unwrap();
//! let red = store.create_colour(Colour::new("Red")).unwrap();
//! let small = store.create_shape(Shape::new("Small Brick")).unwrap();
//! let brick = store.create_part(Part::new("Brick", red.id(), small.id())).unwrap();
//! store.create_set(Set::new("Tower").with_part(brick.id(), 4)).unwrap();
//! let fan = store
//!     .create_user(User::new("brickfan35", Inventory::new().with_part(brick.id(), 6)))
//!     .unwrap();
//!
//! let engine = Engine::new(&store);
//! let possible = engine.possible_sets_for_user(fan.id()).unwrap();
//! assert_eq!(possible[0].name(), "Tower");
//! ```

pub mod config;
pub mod construct;
pub mod engine;
pub mod error;
pub mod import;
pub mod memory;
pub mod persist;
pub mod repository;
pub mod server;
