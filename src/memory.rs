use std::collections::HashMap;

use parking_lot::RwLock;

use crate::component::ProcessGroup;
use crate::traits::FlowSource;

/// An in-memory flow that can be edited while searches run against it.
///
/// Groups are stored flat by id. [`insert`](MemoryFlow::insert) also lists
/// a new group under its parent, so a tree can be built top-down without
/// touching `child_group_ids` by hand.
pub struct MemoryFlow {
    root_id: String,
    groups:  RwLock<HashMap<String, ProcessGroup>>,
}

impl MemoryFlow {
    pub fn new(root: ProcessGroup) -> Self {
        let root_id = root.id.clone();
        let mut groups = HashMap::new();
        groups.insert(root_id.clone(), root);
        Self {
            root_id,
            groups: RwLock::new(groups),
        }
    }

    /// Builder form of [`insert`](MemoryFlow::insert).
    pub fn with_group(self, group: ProcessGroup) -> Self {
        self.insert(group);
        self
    }

    /// Add or replace a group, returning the previous snapshot with that id.
    pub fn insert(&self, group: ProcessGroup) -> Option<ProcessGroup> {
        let mut groups = self.groups.write();
        if let Some(parent_id) = &group.parent_id {
            if let Some(parent) = groups.get_mut(parent_id) {
                if !parent.child_group_ids.contains(&group.id) {
                    parent.child_group_ids.push(group.id.clone());
                }
            }
        }
        groups.insert(group.id.clone(), group)
    }

    /// Remove a group. Its parent keeps listing the id; searches skip it.
    pub fn remove(&self, id: &str) -> Option<ProcessGroup> {
        self.groups.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

impl FlowSource for MemoryFlow {
    fn root_group_id(&self) -> String {
        self.root_id.clone()
    }

    fn group(&self, id: &str) -> Option<ProcessGroup> {
        self.groups.read().get(id).cloned()
    }
}
