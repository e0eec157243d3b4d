//! Parent/child links derived from outline levels.
//!
//! Tasks live in a flat arena ([`Project::tasks`]); links are stored as uids,
//! never as references. Closures (descendants of a collapsed summary) are
//! recomputed per query.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::{Project, Task, TaskUid};

/// Parent and children links for one document, by arena position.
///
/// Positions rather than uids, so a duplicated uid still gets its own links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hierarchy {
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl Hierarchy {
    /// Walk the tasks in document order with a stack of open summaries.
    ///
    /// Entries at the same or a deeper level than the current task are popped;
    /// the remaining top is the parent. Only summaries are pushed, so a leaf
    /// followed by a deeper task does not adopt it. Inconsistent nesting is
    /// accepted as-is.
    pub fn from_outline(tasks: &[Task]) -> Self {
        let mut hierarchy = Self {
            parents: vec![None; tasks.len()],
            children: vec![Vec::new(); tasks.len()],
        };
        let mut stack: Vec<(usize, u32)> = Vec::new();

        for (pos, task) in tasks.iter().enumerate() {
            while stack
                .last()
                .is_some_and(|&(_, level)| level >= task.outline_level)
            {
                stack.pop();
            }
            if let Some(&(parent, _)) = stack.last() {
                hierarchy.parents[pos] = Some(parent);
                hierarchy.children[parent].push(pos);
            }
            if task.is_summary {
                stack.push((pos, task.outline_level));
            }
        }
        hierarchy
    }

    pub fn parent_of(&self, pos: usize) -> Option<usize> {
        self.parents.get(pos).copied().flatten()
    }

    pub fn children_of(&self, pos: usize) -> &[usize] {
        self.children.get(pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Copy the links onto the tasks themselves, as uids.
    pub fn apply(&self, tasks: &mut [Task]) {
        let uids: Vec<TaskUid> = tasks.iter().map(|t| t.uid.clone()).collect();
        for (pos, task) in tasks.iter_mut().enumerate() {
            task.parent = self.parent_of(pos).map(|p| uids[p].clone());
            task.children = self.children_of(pos).iter().map(|&c| uids[c].clone()).collect();
        }
    }
}

/// All transitive descendants of `uid`, depth first.
pub fn descendants(project: &Project, uid: &TaskUid) -> Vec<TaskUid> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    collect_descendants(project, uid, &mut out, &mut seen);
    out
}

fn collect_descendants(
    project: &Project,
    uid: &TaskUid,
    out: &mut Vec<TaskUid>,
    seen: &mut HashSet<TaskUid>,
) {
    let Some(task) = project.task(uid) else {
        return;
    };
    for child in &task.children {
        if seen.insert(child.clone()) {
            out.push(child.clone());
            collect_descendants(project, child, out, seen);
        }
    }
}

/// Arena positions hidden because some collapsed summary above them is
/// closed. Walks positions, so every row of a duplicated uid is covered.
pub fn hidden_by_collapse(project: &Project, collapsed: &BTreeSet<TaskUid>) -> HashSet<usize> {
    let mut hidden = HashSet::new();
    let mut stack: Vec<usize> = project
        .tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_summary && collapsed.contains(&t.uid))
        .flat_map(|(pos, _)| project.child_positions(pos).iter().copied())
        .collect();
    while let Some(pos) = stack.pop() {
        if hidden.insert(pos) {
            stack.extend(project.child_positions(pos));
        }
    }
    hidden
}

/// Colour group of every task: the ordinal of its top-level ancestor.
pub fn group_indices(project: &Project) -> HashMap<TaskUid, usize> {
    let mut groups = HashMap::new();
    for (ordinal, root) in project.roots().enumerate() {
        groups.entry(root.uid.clone()).or_insert(ordinal);
        for uid in descendants(project, &root.uid) {
            groups.entry(uid).or_insert(ordinal);
        }
    }
    groups
}
