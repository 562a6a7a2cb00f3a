#![allow(dead_code)]

use brickstore::construct::{Colour, Inventory, Part, Set, Shape, User};
use brickstore::memory::InMemoryRepository;
use brickstore::persist::{PersistenceMode, SqliteRepository};
use brickstore::repository::BricksRepository;

pub const RED_SMALL: u64 = 1;
pub const BLUE_SMALL: u64 = 2;
pub const YELLOW_SMALL: u64 = 3;
pub const RED_BIG: u64 = 4;
pub const BLUE_BIG: u64 = 5;
pub const YELLOW_BIG: u64 = 6;

pub const SMALL_SET: u64 = 1;
pub const BIG_SET: u64 = 2;

pub fn colours() -> Vec<Colour> {
    vec![
        Colour::new("Red").with_id(1),
        Colour::new("Blue").with_id(2),
        Colour::new("Yellow").with_id(3),
    ]
}

pub fn shapes() -> Vec<Shape> {
    vec![Shape::new("Small Brick").with_id(1), Shape::new("Big Brick").with_id(2)]
}

pub fn parts() -> Vec<Part> {
    vec![
        Part::new("Red Brick Small", 1, 1).with_id(RED_SMALL),
        Part::new("Blue Brick Small", 2, 1).with_id(BLUE_SMALL),
        Part::new("Yellow Brick Small", 3, 1).with_id(YELLOW_SMALL),
        Part::new("Red Brick Big", 1, 2).with_id(RED_BIG),
        Part::new("Blue Brick Big", 2, 2).with_id(BLUE_BIG),
        Part::new("Yellow Brick Big", 3, 2).with_id(YELLOW_BIG),
    ]
}

pub fn small_inventory() -> Inventory {
    Inventory::from_parts([(RED_SMALL, 4), (BLUE_SMALL, 2), (YELLOW_SMALL, 1)])
}

pub fn sets() -> Vec<Set> {
    vec![
        Set::new("Small Set")
            .with_part(RED_SMALL, 4)
            .with_part(BLUE_SMALL, 2)
            .with_part(YELLOW_SMALL, 1)
            .with_id(SMALL_SET),
        Set::new("Big Set")
            .with_part(RED_SMALL, 5)
            .with_part(BLUE_SMALL, 3)
            .with_part(YELLOW_SMALL, 2)
            .with_part(RED_BIG, 6)
            .with_part(BLUE_BIG, 4)
            .with_id(BIG_SET),
    ]
}

pub fn users() -> Vec<User> {
    vec![
        User::new("User 1", small_inventory().with_id(1)).with_id(1),
        User::new("User 2", small_inventory().with_id(2)).with_id(2),
        User::new(
            "User 3",
            Inventory::from_parts([(RED_BIG, 6), (BLUE_BIG, 4)]).with_id(3),
        )
        .with_id(3),
        User::new("User 4", Inventory::from_parts([(YELLOW_BIG, 10)]).with_id(4)).with_id(4),
    ]
}

/// The fixture catalogue seeded verbatim.
pub fn seeded_memory() -> InMemoryRepository {
    InMemoryRepository::new()
        .with_colours(colours())
        .with_shapes(shapes())
        .with_parts(parts())
        .with_sets(sets())
        .with_users(users())
}

/// Loads the fixture catalogue through the create operations. On an empty
/// store the assigned identities match the fixture constants.
pub fn populate(repository: &dyn BricksRepository) {
    for colour in colours() {
        repository.create_colour(Colour::new(colour.name())).expect("colour");
    }
    for shape in shapes() {
        repository.create_shape(Shape::new(shape.name())).expect("shape");
    }
    for part in parts() {
        let created = repository
            .create_part(Part::new(part.name(), part.colour(), part.shape()))
            .expect("part");
        assert_eq!(created.id(), part.id());
    }
    for set in sets() {
        let fresh = set
            .required_parts()
            .fold(Set::new(set.name()), |fresh, (part, quantity)| fresh.with_part(part, quantity));
        assert_eq!(repository.create_set(fresh).expect("set").id(), set.id());
    }
    for user in users() {
        let created = repository
            .create_user(User::new(user.name(), Inventory::from_parts(user.inventory().parts())))
            .expect("user");
        assert_eq!(created.id(), user.id());
    }
}

pub fn populated_sqlite() -> SqliteRepository {
    let repository = SqliteRepository::open(&PersistenceMode::InMemory).expect("db");
    populate(&repository);
    repository
}

pub fn populated_memory() -> InMemoryRepository {
    let repository = InMemoryRepository::new();
    populate(&repository);
    repository
}

/// Every backend, each holding the fixture catalogue.
pub fn backends() -> Vec<(&'static str, Box<dyn BricksRepository>)> {
    vec![
        ("seeded memory", Box::new(seeded_memory())),
        ("memory", Box::new(populated_memory())),
        ("sqlite", Box::new(populated_sqlite())),
    ]
}
