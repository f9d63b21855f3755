//! Groups of nodes and nested groups.

use serde::{Deserialize, Serialize};

use super::{Bounds, PropertyMap};

/// Display data attached to a group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(flatten)]
    pub properties: PropertyMap,
}

/// A group. Leaves and subgroups are stored by stable id and only turned
/// into array indices when pushed to the layout engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub id: String,
    pub leaves: Vec<String>,
    pub groups: Vec<String>,
    pub data: GroupData,
    pub parent: Option<String>,
    pub bounds: Bounds,
    pub padding: f64,
}

impl Group {
    pub fn new(id: impl Into<String>, data: GroupData) -> Self {
        Self { id: id.into(), data, ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty() && self.groups.is_empty()
    }

    /// A group with no leaves and at most one subgroup carries no structure.
    pub fn is_prunable(&self) -> bool {
        self.leaves.is_empty() && self.groups.len() <= 1
    }
}

/// Children named in a group operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupChildren {
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl GroupChildren {
    pub fn nodes<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { nodes: ids.into_iter().map(Into::into).collect(), groups: Vec::new() }
    }

    pub fn groups<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { nodes: Vec::new(), groups: ids.into_iter().map(Into::into).collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.groups.is_empty()
    }
}

/// Target of `add_to_group`: an existing group id, or the id and data of a
/// group to create.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupSpec {
    pub id: String,
    pub data: GroupData,
}

impl GroupSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), data: GroupData::default() }
    }

    pub fn with_data(mut self, data: GroupData) -> Self {
        self.data = data;
        self
    }
}

impl From<&str> for GroupSpec {
    fn from(id: &str) -> Self {
        GroupSpec::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prunable() {
        let mut g = Group::new("g", GroupData::default());
        assert!(g.is_prunable());
        g.groups.push("sub".into());
        assert!(g.is_prunable());
        g.groups.push("sub2".into());
        assert!(!g.is_prunable());
        g.groups.clear();
        g.leaves.push("n".into());
        assert!(!g.is_prunable());
    }
}
