//! Per-instance configuration.
//!
//! Everything is supplied once, at construction, as a [`GraphOptions`]
//! record. Scalar options can be loaded from JSON; callbacks and computed
//! settings are attached in code.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::layout::LinkLengthStrategy;
use crate::model::{Group, Link, Node};
use crate::Result;

// ============================================================================
// Setting: scalar or computed
// ============================================================================

/// An option that is either a constant or computed per item.
///
/// `C` is the context the value is computed from, e.g. `Setting<f64, Link>`
/// for a per-link ideal length.
pub enum Setting<T, C: ?Sized> {
    Constant(T),
    Computed(Arc<dyn Fn(&C) -> T + Send + Sync>),
}

impl<T: Clone, C: ?Sized> Setting<T, C> {
    pub fn computed(f: impl Fn(&C) -> T + Send + Sync + 'static) -> Self {
        Setting::Computed(Arc::new(f))
    }

    /// Resolve at the call site.
    pub fn resolve(&self, ctx: &C) -> T {
        match self {
            Setting::Constant(v) => v.clone(),
            Setting::Computed(f) => f(ctx),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Setting::Constant(_))
    }
}

impl<T: Clone, C: ?Sized> Clone for Setting<T, C> {
    fn clone(&self) -> Self {
        match self {
            Setting::Constant(v) => Setting::Constant(v.clone()),
            Setting::Computed(f) => Setting::Computed(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug, C: ?Sized> fmt::Debug for Setting<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Setting::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<T, C: ?Sized> From<T> for Setting<T, C> {
    fn from(v: T) -> Self {
        Setting::Constant(v)
    }
}

/// Only the constant form has a wire representation.
impl<'de, T: Deserialize<'de>, C: ?Sized> Deserialize<'de> for Setting<T, C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        T::deserialize(deserializer).map(Setting::Constant)
    }
}

// ============================================================================
// Callbacks
// ============================================================================

pub type NodeCallback = Arc<dyn Fn(&Node) + Send + Sync>;
pub type GroupCallback = Arc<dyn Fn(&Group) + Send + Sync>;
pub type EdgeCallback = Arc<dyn Fn(&Link) + Send + Sync>;

/// The closed set of interaction hooks.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub node_mouse_over: Option<NodeCallback>,
    pub node_mouse_out: Option<NodeCallback>,
    pub node_click: Option<NodeCallback>,
    pub node_drag_start: Option<NodeCallback>,
    pub node_drag: Option<NodeCallback>,
    pub node_drag_end: Option<NodeCallback>,
    pub group_mouse_over: Option<GroupCallback>,
    pub group_mouse_out: Option<GroupCallback>,
    pub group_click: Option<GroupCallback>,
    pub edge_mouse_over: Option<EdgeCallback>,
    pub edge_mouse_out: Option<EdgeCallback>,
    pub edge_click: Option<EdgeCallback>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |c: bool| if c { "set" } else { "-" };
        f.debug_struct("Callbacks")
            .field("node_click", &set(self.node_click.is_some()))
            .field("node_drag", &set(self.node_drag.is_some()))
            .field("group_click", &set(self.group_click.is_some()))
            .field("edge_click", &set(self.edge_click.is_some()))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// GraphOptions
// ============================================================================

/// Construction-time options for a [`GraphModel`](crate::GraphModel).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphOptions {
    /// How ideal link lengths are chosen.
    #[serde(rename = "layoutType")]
    pub layout: LinkLengthStrategy,
    /// Ideal link length, constant or per link.
    pub link_distance: Setting<f64, Link>,
    pub width: f64,
    pub height: f64,
    /// Clearance kept between routed edges and node boxes.
    pub margin: f64,
    /// Padding between a node's label and its border.
    pub pad: f64,
    /// Padding between a group's border and its contents.
    pub group_pad: f64,
    pub avoid_overlaps: bool,
    pub handle_disconnected: bool,
    pub enable_edge_routing: bool,
    pub snap_to_alignment: bool,
    pub snap_threshold: f64,
    #[serde(rename = "clickDelayMs", deserialize_with = "millis")]
    pub click_delay: Duration,
    #[serde(skip)]
    pub callbacks: Callbacks,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            layout: LinkLengthStrategy::default(),
            link_distance: Setting::Constant(150.0),
            width: 900.0,
            height: 600.0,
            margin: 10.0,
            pad: 15.0,
            group_pad: 20.0,
            avoid_overlaps: true,
            handle_disconnected: true,
            enable_edge_routing: true,
            snap_to_alignment: true,
            snap_threshold: 10.0,
            click_delay: Duration::from_millis(200),
            callbacks: Callbacks::default(),
        }
    }
}

impl GraphOptions {
    /// Scalar options from JSON; unknown keys are ignored, missing keys keep
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_link_distance(mut self, distance: impl Into<Setting<f64, Link>>) -> Self {
        self.link_distance = distance.into();
        self
    }
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}
