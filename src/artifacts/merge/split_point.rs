//! Split point search for merges
//!
//! The split point of two branch heads is the common ancestor they diverged
//! from. Both strategies score every common ancestor by the sum of its
//! distances from the two heads and pick the lowest score, ties broken by the
//! ascending commit ID.
//!
//! ## Strategies
//!
//! - [`SplitPointStrategy::Heuristic`]: distances come from a depth-first walk
//!   where the first visit of a commit wins (see [`CommitHistory`]). Cheap, and
//!   correct for histories without merge commits, but a long first-parent chain
//!   can hide a shorter path through a second parent.
//! - [`SplitPointStrategy::Exact`]: one breadth-first walk seeded with both
//!   heads computes the true minimum distance from each side.
//!
//! ## Debug Logging
//!
//! Build with `--features debug_merge` to trace the candidates considered.

use crate::areas::config::SplitPointStrategy;
use crate::artifacts::log::history::CommitHistory;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Macro for debug logging that is enabled with the debug_merge feature flag
macro_rules! merge_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_merge")]
        {
            eprintln!($($arg)*);
        }
    };
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    struct Reach: u8 {
        const CURRENT = 0b01;
        const GIVEN = 0b10;
        const BOTH = Self::CURRENT.bits() | Self::GIVEN.bits();
    }
}

impl fmt::Debug for Reach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(Reach::CURRENT) {
            flags.push("CURRENT");
        }
        if self.contains(Reach::GIVEN) {
            flags.push("GIVEN");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Visit {
    reach: Reach,
    current: usize,
    given: usize,
}

pub struct SplitPointFinder<ParentsFn>
where
    ParentsFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    strategy: SplitPointStrategy,
    parents_of: ParentsFn,
}

impl<ParentsFn> SplitPointFinder<ParentsFn>
where
    ParentsFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    /// `parents_of` returns the parents of a commit, first parent first
    pub fn new(strategy: SplitPointStrategy, parents_of: ParentsFn) -> Self {
        Self {
            strategy,
            parents_of,
        }
    }

    /// The split point of `current` and `given`, or `None` when the two
    /// histories share no commit
    pub fn find(&self, current: &ObjectId, given: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        let scores = match self.strategy {
            SplitPointStrategy::Heuristic => self.heuristic_scores(current, given)?,
            SplitPointStrategy::Exact => self.exact_scores(current, given)?,
        };

        merge_log!(
            "Split point candidates ({:?}): {}",
            self.strategy,
            scores
                .iter()
                .map(|(oid, score)| format!("{}={}", oid.to_short_oid(), score))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let split_point = scores
            .into_iter()
            .min_by(|(a_oid, a_score), (b_oid, b_score)| {
                a_score.cmp(b_score).then_with(|| a_oid.cmp(b_oid))
            })
            .map(|(oid, _)| oid);

        merge_log!("Split point: {:?}", split_point.as_ref().map(|oid| oid.to_short_oid()));

        Ok(split_point)
    }

    fn heuristic_scores(
        &self,
        current: &ObjectId,
        given: &ObjectId,
    ) -> anyhow::Result<HashMap<ObjectId, usize>> {
        let current_history = CommitHistory::collect(current, &self.parents_of)?;
        let given_history = CommitHistory::collect(given, &self.parents_of)?;

        Ok(given_history
            .distances()
            .iter()
            .filter_map(|(oid, given_distance)| {
                current_history
                    .distance(oid)
                    .map(|current_distance| (oid.clone(), current_distance + given_distance))
            })
            .collect())
    }

    fn exact_scores(
        &self,
        current: &ObjectId,
        given: &ObjectId,
    ) -> anyhow::Result<HashMap<ObjectId, usize>> {
        let mut visits = HashMap::<ObjectId, Visit>::new();
        let mut queue = VecDeque::new();

        Self::reach(&mut visits, &mut queue, current, Reach::CURRENT, 1);
        Self::reach(&mut visits, &mut queue, given, Reach::GIVEN, 1);

        while let Some((commit_id, side, distance)) = queue.pop_front() {
            merge_log!("Visiting {} from {:?} at {}", commit_id.to_short_oid(), side, distance);

            for parent in (self.parents_of)(&commit_id)? {
                Self::reach(&mut visits, &mut queue, &parent, side, distance + 1);
            }
        }

        Ok(visits
            .into_iter()
            .filter(|(_, visit)| visit.reach == Reach::BOTH)
            .map(|(oid, visit)| (oid, visit.current + visit.given))
            .collect())
    }

    /// Record the first (and therefore shortest) arrival at `commit_id` from `side`
    fn reach(
        visits: &mut HashMap<ObjectId, Visit>,
        queue: &mut VecDeque<(ObjectId, Reach, usize)>,
        commit_id: &ObjectId,
        side: Reach,
        distance: usize,
    ) {
        let visit = visits.entry(commit_id.clone()).or_default();
        if visit.reach.contains(side) {
            return;
        }

        visit.reach |= side;
        if side == Reach::CURRENT {
            visit.current = distance;
        } else {
            visit.given = distance;
        }
        queue.push_back((commit_id.clone(), side, distance));
    }
}
