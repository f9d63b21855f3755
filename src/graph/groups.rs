//! Grouping.
//!
//! A node or group has at most one parent. Every operation detaches children
//! from their previous parent before attaching them, then prunes groups left
//! with no leaves and at most one subgroup (a lone subgroup is lifted into the
//! pruned group's parent).

use super::GraphModel;
use crate::layout::LayoutEngine;
use crate::model::{Group, GroupChildren, GroupSpec};
use crate::render::Renderer;
use crate::storage::TripletStore;
use crate::{Error, Result};

impl<S: TripletStore, E: LayoutEngine, R: Renderer> GraphModel<S, E, R> {
    /// Move nodes and groups into `group`, creating it if needed.
    ///
    /// Returns false, after logging, when an id is unknown, when the move
    /// would nest a group inside itself, or when a new group would have
    /// fewer than one node or two subgroups.
    pub fn add_to_group(&mut self, group: impl Into<GroupSpec>, children: GroupChildren, prevent_layout: bool) -> Result<bool> {
        let spec = group.into();
        if let Err(e) = self.check_add(&spec, &children) {
            tracing::warn!(group = %spec.id, error = %e, "add_to_group ignored");
            return Ok(false);
        }
        if children.is_empty() {
            tracing::debug!(group = %spec.id, "add_to_group without children");
            return Ok(false);
        }

        self.halt();
        let id = if self.group_index.contains_key(&spec.id) {
            spec.id
        } else {
            let id = if spec.id.is_empty() { self.fresh_group_id() } else { spec.id };
            self.group_index.insert(id.clone(), self.groups.len());
            self.groups.push(Group::new(id.clone(), spec.data));
            tracing::debug!(group = %id, "group created");
            id
        };

        for hash in &children.nodes {
            self.detach_node(hash);
            if let Some(&i) = self.node_index.get(hash) {
                self.nodes[i].parent = Some(id.clone());
            }
            if let Some(target) = self.group_mut(&id) {
                target.leaves.push(hash.clone());
            }
        }
        for child in &children.groups {
            self.detach_group(child);
            if let Some(c) = self.group_mut(child) {
                c.parent = Some(id.clone());
            }
            if let Some(target) = self.group_mut(&id) {
                target.groups.push(child.clone());
            }
        }

        self.prune_groups();
        self.restart().layout(None, prevent_layout)?;
        Ok(true)
    }

    /// Take children out of their groups.
    ///
    /// Named nodes leave their parent group. A named subgroup is lifted to
    /// the top level; a named top-level group is dissolved and its members
    /// released. Returns false, after logging, when nothing was grouped or an
    /// id is unknown.
    pub fn un_group(&mut self, children: GroupChildren, prevent_layout: bool) -> Result<bool> {
        if let Err(e) = self.resolve_children(&children) {
            tracing::warn!(error = %e, "un_group ignored");
            return Ok(false);
        }
        let grouped_nodes = children.nodes.iter().any(|h| self.get_node(h).is_some_and(|n| n.parent.is_some()));
        if !grouped_nodes && children.groups.is_empty() {
            tracing::warn!(nodes = ?children.nodes, "nothing to ungroup");
            return Ok(false);
        }

        self.halt();
        for hash in &children.nodes {
            self.detach_node(hash);
        }
        for id in &children.groups {
            match self.get_group(id).map(|g| g.parent.is_some()) {
                Some(true) => self.detach_group(id),
                Some(false) => self.dissolve_group(id),
                None => tracing::debug!(group = %id, "group already pruned"),
            }
        }

        self.prune_groups();
        self.restart().layout(None, prevent_layout)?;
        Ok(true)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn resolve_children(&self, children: &GroupChildren) -> Result<()> {
        if let Some(n) = children.nodes.iter().find(|h| !self.node_index.contains_key(*h)) {
            return Err(Error::Reference(format!("unknown node '{n}'")));
        }
        if let Some(g) = children.groups.iter().find(|id| !self.group_index.contains_key(*id)) {
            return Err(Error::Reference(format!("unknown group '{g}'")));
        }
        Ok(())
    }

    fn check_add(&self, spec: &GroupSpec, children: &GroupChildren) -> Result<()> {
        self.resolve_children(children)?;
        if !self.group_index.contains_key(&spec.id) {
            if children.nodes.is_empty() && children.groups.len() < 2 {
                return Err(Error::Validation("a new group needs at least one node or two subgroups".into()));
            }
            return Ok(());
        }
        for child in &children.groups {
            if child == &spec.id || self.is_ancestor(child, &spec.id) {
                return Err(Error::Reference(format!("group '{child}' cannot be nested inside '{}'", spec.id)));
            }
        }
        Ok(())
    }

    /// Whether `ancestor` is on the parent chain of group `id`.
    pub(crate) fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let mut current = self.get_group(id).and_then(|g| g.parent.as_deref());
        let mut depth = 0;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            depth += 1;
            if depth > self.groups.len() {
                break;
            }
            current = self.get_group(p).and_then(|g| g.parent.as_deref());
        }
        false
    }

    fn fresh_group_id(&mut self) -> String {
        loop {
            let id = format!("group-{}", self.next_group_seq);
            self.next_group_seq += 1;
            if !self.group_index.contains_key(&id) {
                return id;
            }
        }
    }

    pub(crate) fn group_mut(&mut self, id: &str) -> Option<&mut Group> {
        let &i = self.group_index.get(id)?;
        self.groups.get_mut(i)
    }

    /// Remove a node from its parent group's leaves.
    pub(crate) fn detach_node(&mut self, hash: &str) {
        let Some(&i) = self.node_index.get(hash) else {
            return;
        };
        let Some(parent) = self.nodes[i].parent.take() else {
            return;
        };
        if let Some(g) = self.group_mut(&parent) {
            g.leaves.retain(|l| l != hash);
        }
    }

    /// Remove a group from its parent's subgroups.
    pub(crate) fn detach_group(&mut self, id: &str) {
        let Some(parent) = self.group_mut(id).and_then(|g| g.parent.take()) else {
            return;
        };
        if let Some(g) = self.group_mut(&parent) {
            g.groups.retain(|c| c != id);
        }
    }

    /// Delete a top-level group and release its members.
    fn dissolve_group(&mut self, id: &str) {
        let Some(&pos) = self.group_index.get(id) else {
            return;
        };
        let group = self.groups.remove(pos);
        self.reindex_groups();
        for hash in &group.leaves {
            if let Some(&i) = self.node_index.get(hash) {
                self.nodes[i].parent = None;
            }
        }
        for child in &group.groups {
            if let Some(c) = self.group_mut(child) {
                c.parent = None;
            }
        }
        tracing::debug!(group = %id, "group dissolved");
    }

    /// Drop every group with no leaves and at most one subgroup.
    pub(crate) fn prune_groups(&mut self) -> usize {
        let mut pruned = 0;
        while let Some(pos) = self.groups.iter().position(Group::is_prunable) {
            let group = self.groups.remove(pos);
            self.reindex_groups();

            if let Some(parent) = &group.parent {
                if let Some(p) = self.group_mut(parent) {
                    p.groups.retain(|c| c != &group.id);
                    p.groups.extend(group.groups.iter().cloned());
                }
            }
            for child in &group.groups {
                if let Some(c) = self.group_mut(child) {
                    c.parent = group.parent.clone();
                }
            }
            tracing::debug!(group = %group.id, lifted = group.groups.len(), "group pruned");
            pruned += 1;
        }
        pruned
    }
}
