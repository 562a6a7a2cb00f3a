use brickstore::construct::{IdentityGenerator, Inventory, Part, Set, User, GENESIS};

#[test]
fn generator_skips_retained_identities() {
    let mut generator = IdentityGenerator::new();
    assert_eq!(generator.generate(), 1);
    generator.retain(10);
    assert_eq!(generator.generate(), 11);
    generator.retain(3);
    assert_eq!(generator.lower_bound(), 11);
}

#[test]
fn zero_quantities_are_absent() {
    let inventory = Inventory::new().with_part(1, 0).with_part(2, 3);
    assert_eq!(inventory.quantity_of(1), 0);
    assert_eq!(inventory.len(), 1);
    assert!(!inventory.part_ids().contains(1));

    let set = Set::new("Empty").with_part(7, 0);
    assert!(set.is_empty());
    assert!(set.part_ids().is_empty());

    let set = Set::new("Pair").with_part(7, 2).with_part(8, 0);
    assert!(set.part_ids().contains(7));
    assert!(!set.part_ids().contains(8));
    assert_eq!(set.total_pieces(), 0);
}

#[test]
fn repeated_parts_accumulate() {
    let inventory = Inventory::from_parts([(4, 2), (4, 5), (9, 1)]);
    assert_eq!(inventory.quantity_of(4), 7);
    assert_eq!(inventory.brick_count(), 8);

    let user = User::new("brickfan35", inventory);
    assert_eq!(user.brick_count(), 8);
    assert_eq!(user.id(), GENESIS);
}

#[test]
fn part_identity_is_the_triple() {
    let part = Part::new("Brick 2x4", 1, 2).with_id(5);
    assert!(part.has_identity("Brick 2x4", 1, 2));
    assert!(!part.has_identity("Brick 2x4", 1, 3));
    assert!(!part.has_identity("Brick 2x2", 1, 2));
}

#[test]
fn constructs_survive_json() {
    let set = Set::new("Small Set").with_part(1, 4).with_part(2, 2).with_id(3);
    let text = serde_json::to_string(&set).unwrap();
    let back: Set = serde_json::from_str(&text).unwrap();
    assert_eq!(back, set);
    assert_eq!(back.total_pieces(), 6);
}

#[test]
fn repeated_parts_saturate_instead_of_wrapping() {
    let set = Set::new("Huge").with_part(1, 4_000_000_000).with_part(1, 4_000_000_000);
    assert_eq!(set.required_quantity(1), u32::MAX);
    let inventory = Inventory::from_parts([(1, u32::MAX), (1, 1)]);
    assert_eq!(inventory.quantity_of(1), u32::MAX);
}
