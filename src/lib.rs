//! # weave-graph: Triplet-Backed Diagram Graph
//!
//! An interactive node/edge/group diagram model whose topology lives in a
//! subject–predicate–object triplet store and whose geometry comes from an
//! external constraint-based force simulation.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `TripletStore`, `LayoutEngine` and `Renderer` are the
//!    contracts with the outside world; the crate ships in-process reference
//!    implementations of each.
//! 2. **Store is the source of truth**: links are a cache rebuilt from the
//!    store after every awaited write.
//! 3. **Stop before mutate**: engine arrays are only swapped through the
//!    restart protocol while the simulation is stopped.
//! 4. **Stable ids everywhere**: groups and constraints hold node hashes and
//!    are resolved to array indices only when pushed to the engine.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use weave_graph::{GraphModel, GraphOptions, Node, Triplet};
//!
//! # async fn example() -> weave_graph::Result<()> {
//! let mut graph = GraphModel::open_memory(GraphOptions::default());
//!
//! graph.add_node(Node::new("n1"), false)?;
//! graph.add_node(Node::new("n2"), false)?;
//! graph.add_triplet(Triplet::link("n1", "rel", "n2"), false).await?;
//!
//! // host animation loop
//! while graph.tick()?.is_running() {}
//!
//! let json = graph.save_graph().await?;
//! println!("{json}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Collaborators
//!
//! | Trait | Reference impl | Role |
//! |-------|----------------|------|
//! | `TripletStore` | `MemoryStore` | async triplet persistence |
//! | `LayoutEngine` | `HeadlessEngine` | force simulation + edge routing |
//! | `Renderer` | `NullRenderer` | data binding, text metrics, guides |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod constraint;
pub mod layout;
pub mod render;
pub mod restart;
pub mod alignment;
pub mod config;
pub mod graph;
pub mod interaction;
pub mod export;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Axis, Bounds, Group, GroupChildren, GroupData, GroupSpec, Link, Node, NodeShape,
    Point, Predicate, PropertyMap, Segment, Size, Span, Triplet, TripletKey, TripletPattern,
};

// ============================================================================
// Re-exports: Collaborators
// ============================================================================

pub use storage::{MemoryStore, TripletStore};
pub use layout::{HeadlessEngine, LayoutEngine, LinkLengthStrategy};
pub use render::{NullRenderer, Renderer};

// ============================================================================
// Re-exports: Core
// ============================================================================

pub use alignment::{AlignmentEngine, DragFrame, Guides};
pub use config::{Callbacks, GraphOptions, Setting};
pub use constraint::{Constraint, ConstraintManager};
pub use export::{GraphPayload, GroupRecord, NodePosition};
pub use graph::{Boundary, EditAction, GraphModel, NodeBatch, OneOrMany, Selection};
pub use interaction::{DelayedClick, DragState, PointerEvent};
pub use restart::{LayoutCallback, Restart, RestartState, TickOutcome};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate edge: {subject} -[{predicate}]-> {object}")]
    DuplicateEdge { subject: String, predicate: String, object: String },

    #[error("Unresolved reference: {0}")]
    Reference(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Restart protocol error: {0}")]
    Protocol(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn duplicate(key: &TripletKey) -> Self {
        Error::DuplicateEdge {
            subject: key.subject.clone(),
            predicate: key.predicate.clone(),
            object: key.object.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
