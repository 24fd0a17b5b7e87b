//! Reachable commit history
//!
//! Walks the commit graph depth-first from a head, following the first parent
//! before the second. Every reachable commit is visited once; its distance is
//! the depth at which it was first reached, the head itself being at 1.
//!
//! Distances are therefore path lengths along the traversal order rather than
//! shortest paths. They are only ever compared against each other.

use crate::artifacts::objects::object_id::ObjectId;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct CommitHistory {
    /// Commits in the order they were first reached
    order: Vec<ObjectId>,
    distances: HashMap<ObjectId, usize>,
}

impl CommitHistory {
    /// Traverse everything reachable from `head`
    ///
    /// `parents_of` returns the parents of a commit, first parent first.
    pub fn collect<ParentsFn>(head: &ObjectId, parents_of: ParentsFn) -> anyhow::Result<Self>
    where
        ParentsFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
    {
        let mut history = CommitHistory::default();
        let mut stack = vec![(head.clone(), 1usize)];

        while let Some((commit_id, distance)) = stack.pop() {
            if history.distances.contains_key(&commit_id) {
                continue;
            }

            history.distances.insert(commit_id.clone(), distance);
            history.order.push(commit_id.clone());

            // reversed so the first parent is popped first
            for parent in parents_of(&commit_id)?.into_iter().rev() {
                if !history.distances.contains_key(&parent) {
                    stack.push((parent, distance + 1));
                }
            }
        }

        Ok(history)
    }

    pub fn commits(&self) -> &[ObjectId] {
        &self.order
    }

    pub fn distances(&self) -> &HashMap<ObjectId, usize> {
        &self.distances
    }

    pub fn distance(&self, commit_id: &ObjectId) -> Option<usize> {
        self.distances.get(commit_id).copied()
    }

    pub fn contains(&self, commit_id: &ObjectId) -> bool {
        self.distances.contains_key(commit_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
