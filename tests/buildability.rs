mod common;

use brickstore::construct::{PartId, Quantity};
use brickstore::engine::Engine;
use brickstore::repository::{BricksRepository, SetSelector};
use common::*;

#[test]
fn exact_inventory_builds_only_the_small_set() {
    for (backend, repository) in backends() {
        let engine = Engine::new(repository.as_ref());
        let possible = engine
            .possible_sets_from_inventory(&small_inventory())
            .expect("possible sets");
        let names: Vec<&str> = possible.iter().map(|set| set.name()).collect();
        assert_eq!(names, vec!["Small Set"], "{backend}");
    }
}

#[test]
fn big_set_gap_lists_every_shortfall() {
    for (backend, repository) in backends() {
        let engine = Engine::new(repository.as_ref());
        let big = repository.set_by_id(BIG_SET).expect("lookup").expect("big set");
        let missing = engine.missing_parts_for_set(&small_inventory(), &big);
        let expected: Vec<(PartId, Quantity)> = vec![
            (RED_SMALL, 1),
            (BLUE_SMALL, 1),
            (YELLOW_SMALL, 1),
            (RED_BIG, 6),
            (BLUE_BIG, 4),
        ];
        assert_eq!(missing.iter().collect::<Vec<_>>(), expected, "{backend}");
    }
}

#[test]
fn sharing_suggestions_rank_by_overlap() {
    for (backend, repository) in backends() {
        let engine = Engine::new(repository.as_ref());
        for selector in [SetSelector::Id(BIG_SET), SetSelector::from("Big Set")] {
            let ranked = engine
                .suggest_users_for_part_sharing(1, &selector)
                .expect("suggestions");
            let ranking: Vec<(&str, u64)> = ranked
                .iter()
                .map(|candidate| (candidate.user.name(), candidate.shared_parts))
                .collect();
            assert_eq!(ranking, vec![("User 2", 3), ("User 3", 2)], "{backend}");
        }
    }
}

#[test]
fn nothing_missing_means_no_suggestions() {
    for (backend, repository) in backends() {
        let engine = Engine::new(repository.as_ref());
        let ranked = engine
            .suggest_users_for_part_sharing(1, &SetSelector::Id(SMALL_SET))
            .expect("suggestions");
        assert!(ranked.is_empty(), "{backend}");
    }
}

#[test]
fn ranking_a_prepared_candidate_list() {
    let repository = seeded_memory();
    let engine = Engine::new(&repository);
    let users = users();
    let big = repository.set_by_id(BIG_SET).expect("lookup").expect("big set");
    let missing = engine.missing_parts_for_set(users[0].inventory(), &big);
    let ranked = engine.rank_users_by_shared_parts(&users, &users[0], &missing);
    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|candidate| candidate.user.id() != 1));
    assert!(ranked.iter().all(|candidate| candidate.user.name() != "User 4"));
}

#[test]
fn half_the_population_meets_an_inclusive_threshold() {
    for (backend, repository) in backends() {
        let engine = Engine::new(repository.as_ref());
        let usage = engine.parts_with_usage_at_least(0.5).expect("usage");
        let found: Vec<(PartId, Quantity)> = usage
            .iter()
            .map(|usage| (usage.part.id(), usage.minimum_quantity))
            .collect();
        assert_eq!(
            found,
            vec![(RED_SMALL, 4), (BLUE_SMALL, 2), (YELLOW_SMALL, 1)],
            "{backend}"
        );
        assert!(usage.iter().all(|usage| usage.adopters == 2));

        let stricter = engine.parts_with_usage_at_least(0.51).expect("usage");
        assert!(stricter.is_empty(), "{backend}");
    }
}

#[test]
fn unknown_users_have_no_possible_sets() {
    for (backend, repository) in backends() {
        let engine = Engine::new(repository.as_ref());
        assert!(engine.possible_sets_for_user(404).expect("possible sets").is_empty(), "{backend}");
        assert!(
            engine
                .suggest_users_for_part_sharing(404, &SetSelector::Id(BIG_SET))
                .expect("suggestions")
                .is_empty(),
            "{backend}"
        );
        assert!(
            engine
                .suggest_users_for_part_sharing(1, &SetSelector::from("Death Star"))
                .expect("suggestions")
                .is_empty(),
            "{backend}"
        );
    }
}

#[test]
fn known_users_build_from_their_own_inventory() {
    for (backend, repository) in backends() {
        let engine = Engine::new(repository.as_ref());
        let names = |user| -> Vec<String> {
            engine
                .possible_sets_for_user(user)
                .expect("possible sets")
                .iter()
                .map(|set| set.name().to_owned())
                .collect()
        };
        assert_eq!(names(1), vec!["Small Set"], "{backend}");
        assert_eq!(names(2), vec!["Small Set"], "{backend}");
        assert!(names(3).is_empty(), "{backend}");
        assert!(names(4).is_empty(), "{backend}");
    }
}
