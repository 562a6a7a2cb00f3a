use brickstore::construct::{Colour, Inventory, Part, Set, Shape, User, GENESIS};
use brickstore::error::BrickError;
use brickstore::memory::InMemoryRepository;
use brickstore::repository::BricksRepository;

fn repository_with_bricks() -> (InMemoryRepository, Part, Part) {
    let repository = InMemoryRepository::new();
    let red = repository.create_colour(Colour::new("Red")).unwrap();
    let small = repository.create_shape(Shape::new("Small Brick")).unwrap();
    let big = repository.create_shape(Shape::new("Big Brick")).unwrap();
    let red_small = repository
        .create_part(Part::new("Red Brick Small", red.id(), small.id()))
        .unwrap();
    let red_big = repository
        .create_part(Part::new("Red Brick Big", red.id(), big.id()))
        .unwrap();
    (repository, red_small, red_big)
}

#[test]
fn creates_assign_fresh_identities() {
    let (repository, red_small, red_big) = repository_with_bricks();
    assert_ne!(red_small.id(), GENESIS);
    assert_ne!(red_small.id(), red_big.id());
    let set = repository
        .create_set(Set::new("Tower").with_part(red_small.id(), 2))
        .unwrap();
    assert_eq!(repository.set_by_id(set.id()).unwrap(), Some(set.clone()));
    assert_eq!(repository.set_by_name("Tower").unwrap(), Some(set));
}

#[test]
fn create_set_rejects_unknown_parts() {
    let (repository, red_small, _) = repository_with_bricks();
    let result = repository.create_set(Set::new("Ghost").with_part(red_small.id(), 1).with_part(999, 1));
    assert!(matches!(result, Err(BrickError::UnknownPart(999))));
    assert!(repository.all_sets().unwrap().is_empty());
}

#[test]
fn create_part_rejects_dangling_references() {
    let repository = InMemoryRepository::new();
    let result = repository.create_part(Part::new("Orphan", 4, 5));
    assert!(matches!(result, Err(BrickError::UnknownColour(4))));
}

#[test]
fn create_user_assigns_inventory_identity() {
    let (repository, red_small, red_big) = repository_with_bricks();
    let first = repository
        .create_user(User::new("brickfan35", Inventory::new().with_part(red_small.id(), 3)))
        .unwrap();
    let second = repository
        .create_user(User::new("landscape-artist", Inventory::new().with_part(red_big.id(), 1)))
        .unwrap();
    assert_ne!(first.inventory().id(), GENESIS);
    assert_ne!(first.inventory().id(), second.inventory().id());
    assert_eq!(repository.user_by_name("brickfan35").unwrap(), Some(first));
    assert_eq!(repository.user_count().unwrap(), 2);
}

#[test]
fn lookups_of_missing_records_are_empty() {
    let repository = InMemoryRepository::new();
    assert_eq!(repository.user_by_id(42).unwrap(), None);
    assert_eq!(repository.user_by_name("nobody").unwrap(), None);
    assert_eq!(repository.set_by_id(42).unwrap(), None);
    assert!(repository.all_sets().unwrap().is_empty());
}

#[test]
fn seeded_identities_are_not_reused() {
    let repository = InMemoryRepository::new().with_colours([Colour::new("Red").with_id(7)]);
    let blue = repository.create_colour(Colour::new("Blue")).unwrap();
    assert_eq!(blue.id(), 8);
    let names: Vec<String> = repository
        .all_colours()
        .unwrap()
        .iter()
        .map(|colour| colour.name().to_owned())
        .collect();
    assert_eq!(names, vec!["Red", "Blue"]);
}
