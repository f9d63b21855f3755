//! # Diagram Model
//!
//! Plain data for nodes, predicates, triplets, links and groups. These types
//! cross every boundary: store ↔ graph model ↔ layout adapter ↔ renderer.
//!
//! Design rule: no engine or renderer handles here. This module is pure
//! data with validation; no I/O, no async.

pub mod geometry;
pub mod node;
pub mod predicate;
pub mod triplet;
pub mod link;
pub mod group;

pub use geometry::{Axis, Bounds, Point, Segment, Size, Span};
pub use node::{Node, NodeShape};
pub use predicate::Predicate;
pub use triplet::{Triplet, TripletKey, TripletPattern};
pub use link::Link;
pub use group::{Group, GroupChildren, GroupData, GroupSpec};

/// Free-form application properties on nodes, predicates and groups.
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;
