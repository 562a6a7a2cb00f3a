//! Buildability analysis.
//!
//! The [`Engine`] borrows a repository and answers three kinds of question:
//! which sets an inventory can build, which other users hold the parts a user
//! is missing for a set, and which parts are owned broadly across all users.
//! It never writes. Every operation is a single pass over what the repository
//! returns, and a lookup that finds nothing yields an empty answer rather
//! than an error.

use std::collections::{BTreeMap, HashMap};

use roaring::RoaringTreemap;
use serde::Serialize;
use tracing::debug;

use crate::construct::{IdHasher, Inventory, Part, PartId, Quantity, Set, User, UserId};
use crate::error::Result;
use crate::repository::{BricksRepository, SetSelector};

/// Per-part shortfall between what a set requires and what an inventory holds.
/// Only strictly positive deficits are ever present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MissingParts {
    parts: BTreeMap<PartId, Quantity>,
}

impl MissingParts {
    pub fn get(&self, part: PartId) -> Option<Quantity> {
        self.parts.get(&part).copied()
    }
    pub fn iter(&self) -> impl Iterator<Item = (PartId, Quantity)> + '_ {
        self.parts.iter().map(|(part, deficit)| (*part, *deficit))
    }
    pub fn part_ids(&self) -> RoaringTreemap {
        self.parts.keys().copied().collect()
    }
    pub fn len(&self) -> usize {
        self.parts.len()
    }
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
    pub fn total_missing(&self) -> u64 {
        self.parts.values().map(|deficit| u64::from(*deficit)).sum()
    }
}

impl FromIterator<(PartId, Quantity)> for MissingParts {
    fn from_iter<I: IntoIterator<Item = (PartId, Quantity)>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().filter(|(_, deficit)| *deficit > 0).collect(),
        }
    }
}

/// Another user together with how many of the missing parts they own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharingCandidate {
    pub user: User,
    pub shared_parts: u64,
}

/// A part owned by enough users, and the smallest quantity any of them owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartUsage {
    pub part: Part,
    pub minimum_quantity: Quantity,
    pub adopters: usize,
}

pub fn is_buildable(inventory: &Inventory, set: &Set) -> bool {
    set.required_parts()
        .all(|(part, required)| inventory.quantity_of(part) >= required)
}

pub fn missing_parts(inventory: &Inventory, set: &Set) -> MissingParts {
    set.required_parts()
        .map(|(part, required)| (part, required.saturating_sub(inventory.quantity_of(part))))
        .collect()
}

/// Ranks candidates by how many distinct missing parts they own, most first.
/// The current user is left out by identity, candidates sharing nothing are
/// dropped, and equal counts keep their relative order.
pub fn rank_by_shared_parts(
    candidates: &[User],
    current: UserId,
    missing: &MissingParts,
) -> Vec<SharingCandidate> {
    let wanted = missing.part_ids();
    let mut ranked: Vec<SharingCandidate> = candidates
        .iter()
        .filter(|candidate| candidate.id() != current)
        .filter_map(|candidate| {
            let shared_parts = (&candidate.inventory().part_ids() & &wanted).len();
            (shared_parts > 0).then(|| SharingCandidate {
                user: candidate.clone(),
                shared_parts,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.shared_parts.cmp(&a.shared_parts));
    ranked
}

pub struct Engine<'r, R: BricksRepository + ?Sized> {
    repository: &'r R,
}

impl<'r, R: BricksRepository + ?Sized> Engine<'r, R> {
    pub fn new(repository: &'r R) -> Self {
        Self { repository }
    }
    pub fn repository(&self) -> &'r R {
        self.repository
    }

    /// Sets in catalogue order whose every requirement the inventory meets.
    pub fn possible_sets_from_inventory(&self, inventory: &Inventory) -> Result<Vec<Set>> {
        let possible: Vec<Set> = self
            .repository
            .all_sets()?
            .into_iter()
            .filter(|set| is_buildable(inventory, set))
            .collect();
        debug!(sets = possible.len(), "possible sets computed");
        Ok(possible)
    }

    /// An unknown user can build nothing.
    pub fn possible_sets_for_user(&self, user: UserId) -> Result<Vec<Set>> {
        match self.repository.user_by_id(user)? {
            Some(user) => self.possible_sets_from_inventory(user.inventory()),
            None => {
                debug!(user, "no such user, no possible sets");
                Ok(Vec::new())
            }
        }
    }

    pub fn missing_parts_for_set(&self, inventory: &Inventory, set: &Set) -> MissingParts {
        missing_parts(inventory, set)
    }

    pub fn rank_users_by_shared_parts(
        &self,
        candidates: &[User],
        current: &User,
        missing: &MissingParts,
    ) -> Vec<SharingCandidate> {
        rank_by_shared_parts(candidates, current.id(), missing)
    }

    /// Other users who own parts `user` lacks for the selected set. An unknown
    /// user or set gives no suggestions.
    pub fn suggest_users_for_part_sharing(
        &self,
        user: UserId,
        set: &SetSelector,
    ) -> Result<Vec<SharingCandidate>> {
        let Some(user) = self.repository.user_by_id(user)? else {
            debug!(user, "no such user, no suggestions");
            return Ok(Vec::new());
        };
        let Some(target) = self.repository.set(set)? else {
            debug!(?set, "no such set, no suggestions");
            return Ok(Vec::new());
        };
        let missing = missing_parts(user.inventory(), &target);
        if missing.is_empty() {
            return Ok(Vec::new());
        }
        let candidates = self.repository.all_users()?;
        let ranked = rank_by_shared_parts(&candidates, user.id(), &missing);
        debug!(
            user = user.id(),
            set = target.id(),
            missing = missing.len(),
            candidates = ranked.len(),
            "sharing suggestions computed"
        );
        Ok(ranked)
    }

    /// Parts owned by at least `threshold` of all users, each with the lowest
    /// quantity owned among those users. A part nobody owns never qualifies,
    /// not even at a threshold of zero.
    pub fn parts_with_usage_at_least(&self, threshold: f64) -> Result<Vec<PartUsage>> {
        let users = self.repository.all_users()?;
        if users.is_empty() {
            return Ok(Vec::new());
        }
        let population = users.len() as f64;
        let mut usage: HashMap<PartId, (usize, Quantity), IdHasher> = HashMap::default();
        for user in &users {
            for (part, quantity) in user.inventory().parts() {
                let entry = usage.entry(part).or_insert((0, quantity));
                entry.0 += 1;
                entry.1 = entry.1.min(quantity);
            }
        }
        let qualifying: Vec<PartUsage> = self
            .repository
            .all_parts()?
            .into_iter()
            .filter_map(|part| {
                let &(adopters, minimum_quantity) = usage.get(&part.id())?;
                (adopters as f64 / population >= threshold).then_some(PartUsage {
                    part,
                    minimum_quantity,
                    adopters,
                })
            })
            .collect();
        debug!(threshold, parts = qualifying.len(), "part usage computed");
        Ok(qualifying)
    }
}
