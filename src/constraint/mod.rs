//! Alignment and separation constraints.
//!
//! Constraints are stored against stable node hashes. The index form the
//! simulation consumes is produced by [`ConstraintManager::resolve`] on every
//! restart, so removing or inserting nodes can never leave a constraint bound
//! to the wrong array slot.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::Axis;
use crate::{Error, Result};

/// One member of an alignment constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignOffset {
    pub node: String,
    #[serde(default)]
    pub offset: f64,
}

/// Symbolic constraint, keyed by node hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Constraint {
    /// Keep every listed node at the same coordinate on `axis` (plus offset).
    Alignment { axis: Axis, offsets: Vec<AlignOffset> },
    /// Keep `right` at least (or exactly, with `equality`) `gap` after `left`.
    Separation {
        axis: Axis,
        gap: f64,
        left: String,
        right: String,
        #[serde(default)]
        equality: bool,
    },
}

impl Constraint {
    pub fn alignment<I, S>(axis: Axis, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::Alignment {
            axis,
            offsets: nodes.into_iter().map(|n| AlignOffset { node: n.into(), offset: 0.0 }).collect(),
        }
    }

    pub fn separation(axis: Axis, gap: f64, left: impl Into<String>, right: impl Into<String>) -> Self {
        Constraint::Separation { axis, gap, left: left.into(), right: right.into(), equality: false }
    }

    /// Hashes this constraint refers to.
    pub fn nodes(&self) -> Vec<&str> {
        match self {
            Constraint::Alignment { offsets, .. } => offsets.iter().map(|o| o.node.as_str()).collect(),
            Constraint::Separation { left, right, .. } => vec![left.as_str(), right.as_str()],
        }
    }

    pub fn references(&self, hash: &str) -> bool {
        self.nodes().contains(&hash)
    }

    /// Translate to index form against the current node order.
    pub fn resolve(&self, index: &HashMap<String, usize>) -> Result<ResolvedConstraint> {
        let lookup = |hash: &str| {
            index
                .get(hash)
                .copied()
                .ok_or_else(|| Error::Reference(format!("constraint node '{hash}'")))
        };
        Ok(match self {
            Constraint::Alignment { axis, offsets } => ResolvedConstraint::Alignment {
                axis: *axis,
                offsets: offsets
                    .iter()
                    .map(|o| Ok((lookup(&o.node)?, o.offset)))
                    .collect::<Result<_>>()?,
            },
            Constraint::Separation { axis, gap, left, right, equality } => ResolvedConstraint::Separation {
                axis: *axis,
                gap: *gap,
                left: lookup(left)?,
                right: lookup(right)?,
                equality: *equality,
            },
        })
    }
}

/// Index form handed to the layout engine. Valid for one restart cycle only.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedConstraint {
    Alignment { axis: Axis, offsets: Vec<(usize, f64)> },
    Separation { axis: Axis, gap: f64, left: usize, right: usize, equality: bool },
}

// ============================================================================
// ConstraintManager
// ============================================================================

/// Owns the durable, symbolic constraint list.
#[derive(Debug, Clone, Default)]
pub struct ConstraintManager {
    constraints: Vec<Constraint>,
}

impl ConstraintManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Add a constraint after checking every node it names exists now.
    /// Identical constraints are stored once.
    pub fn create(&mut self, constraint: Constraint, index: &HashMap<String, usize>) -> Result<bool> {
        if let Constraint::Alignment { offsets, .. } = &constraint {
            if offsets.len() < 2 {
                return Err(Error::Validation("alignment constraint needs at least two nodes".into()));
            }
        }
        constraint.resolve(index)?;
        if self.constraints.contains(&constraint) {
            return Ok(false);
        }
        tracing::debug!(?constraint, "constraint created");
        self.constraints.push(constraint);
        Ok(true)
    }

    /// Remove a constraint by value. Unresolved ids are a reference error,
    /// a resolvable but unknown constraint is simply absent.
    pub fn remove(&mut self, constraint: &Constraint, index: &HashMap<String, usize>) -> Result<bool> {
        constraint.resolve(index)?;
        let before = self.constraints.len();
        self.constraints.retain(|c| c != constraint);
        Ok(self.constraints.len() != before)
    }

    /// Drop every constraint naming `hash`. Returns how many were dropped.
    pub fn forget_node(&mut self, hash: &str) -> usize {
        let before = self.constraints.len();
        self.constraints.retain(|c| !c.references(hash));
        before - self.constraints.len()
    }

    pub fn clear(&mut self) {
        self.constraints.clear();
    }

    /// Index form of every constraint whose nodes all resolve. Anything else
    /// is skipped with a warning rather than bound to a stale slot.
    pub fn resolve(&self, index: &HashMap<String, usize>) -> Vec<ResolvedConstraint> {
        self.constraints
            .iter()
            .filter_map(|c| match c.resolve(index) {
                Ok(r) => Some(r),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unresolvable constraint");
                    None
                }
            })
            .collect()
    }
}
