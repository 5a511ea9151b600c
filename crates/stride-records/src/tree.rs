//! Goal hierarchy: arena, progress fold, current focus
//!
//! Decoded goals are indexed by id into an arena with explicit
//! parent→children maps; derived progress is recomputed as a pure
//! bottom-up fold over that arena rather than mutated into an object
//! graph. A completed goal is 100; a parent is the rounded mean of its
//! children; a leaf reports its stored manual percentage.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use uuid::Uuid;

use crate::codec::Decoded;
use crate::model::{Goal, GoalStatus};

/// Quarter (1–4) a date falls in.
pub fn quarter_of(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

/// An arena of decoded goals with parent/child index maps.
pub struct GoalArena {
    nodes: Vec<Decoded<Goal>>,
    by_id: HashMap<Uuid, usize>,
    children: HashMap<Uuid, Vec<usize>>,
    roots: Vec<usize>,
}

impl GoalArena {
    /// Build the arena from a flat decoded batch.
    ///
    /// Children are ordered by creation time. A goal whose parent id
    /// points at a record not in the batch is an orphan: neither a root
    /// nor anyone's child.
    pub fn build(mut goals: Vec<Decoded<Goal>>) -> Self {
        goals.sort_by_key(|g| g.created_at);

        let by_id: HashMap<Uuid, usize> =
            goals.iter().enumerate().map(|(i, g)| (g.id, i)).collect();

        let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();

        for (idx, goal) in goals.iter().enumerate() {
            match goal.meta.parent_id {
                Some(parent_id) if by_id.contains_key(&parent_id) => {
                    children.entry(parent_id).or_default().push(idx);
                }
                Some(_) => {} // orphan
                None => roots.push(idx),
            }
        }

        Self {
            nodes: goals,
            by_id,
            children,
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Decoded<Goal>> {
        self.by_id.get(&id).map(|&idx| &self.nodes[idx])
    }

    /// Root goals (no parent), oldest first.
    pub fn roots(&self) -> impl Iterator<Item = &Decoded<Goal>> {
        self.roots.iter().map(|&idx| &self.nodes[idx])
    }

    /// Children of a goal, oldest first.
    pub fn children_of(&self, id: Uuid) -> impl Iterator<Item = &Decoded<Goal>> {
        self.children
            .get(&id)
            .map(|v| v.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&idx| &self.nodes[idx])
    }

    /// Derived progress (0–100) for one goal.
    pub fn progress_of(&self, id: Uuid) -> u8 {
        match self.by_id.get(&id) {
            Some(&idx) => self.fold_progress(idx),
            None => 0,
        }
    }

    /// Derived progress for every goal in the arena.
    pub fn progress(&self) -> HashMap<Uuid, u8> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, goal)| (goal.id, self.fold_progress(idx)))
            .collect()
    }

    fn fold_progress(&self, idx: usize) -> u8 {
        let goal = &self.nodes[idx];
        if goal.meta.status == GoalStatus::Completed {
            return 100;
        }

        let child_indexes = self
            .children
            .get(&goal.id)
            .map(|v| v.as_slice())
            .unwrap_or_default();

        if child_indexes.is_empty() {
            return goal.payload.progress.unwrap_or(0).min(100);
        }

        let sum: u32 = child_indexes
            .iter()
            .map(|&child| u32::from(self.fold_progress(child)))
            .sum();
        let mean = f64::from(sum) / child_indexes.len() as f64;
        mean.round() as u8
    }

    /// The child to focus on under a yearly root: the active child at the
    /// current quarter's position, else the first active child.
    pub fn current_focus(&self, root_id: Uuid, today: NaiveDate) -> Option<&Decoded<Goal>> {
        let active: Vec<&Decoded<Goal>> = self
            .children_of(root_id)
            .filter(|g| g.meta.status == GoalStatus::Active)
            .collect();

        let quarter = quarter_of(today) as usize;
        active
            .get(quarter - 1)
            .or_else(|| active.first())
            .copied()
    }
}
