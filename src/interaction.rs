//! # Pointer Interaction
//!
//! Drag gestures, clicks and hover events on nodes, groups and edges.
//!
//! A drag pins the node for its duration, runs the alignment engine on every
//! move and hands the snapped position to the simulation. Guides live only
//! while the gesture does. A click that directly follows a drag which moved
//! the node is swallowed; every other click is delivered after
//! `click_delay` so that the host can tell the two apart.

use std::time::Duration;

use crate::alignment::{AlignmentEngine, DragFrame};
use crate::graph::GraphModel;
use crate::layout::LayoutEngine;
use crate::model::{Bounds, Point, TripletKey};
use crate::render::Renderer;
use crate::storage::TripletStore;
use crate::Result;

/// One active drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub hash: String,
    pub pointer_start: Point,
    pub node_start: Point,
    pub was_fixed: bool,
    pub moved: bool,
}

/// Hover notifications forwarded by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    NodeOver(String),
    NodeOut(String),
    GroupOver(String),
    GroupOut(String),
    EdgeOver(TripletKey),
    EdgeOut(TripletKey),
}

/// A click callback waiting out the click delay.
pub struct DelayedClick {
    delay: Duration,
    action: Box<dyn FnOnce() + Send>,
}

impl std::fmt::Debug for DelayedClick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedClick").field("delay", &self.delay).finish_non_exhaustive()
    }
}

impl DelayedClick {
    fn new(delay: Duration, action: impl FnOnce() + Send + 'static) -> Self {
        Self { delay, action: Box::new(action) }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep for the click delay, then run the callback.
    pub async fn dispatch(self) {
        tokio::time::sleep(self.delay).await;
        (self.action)();
    }
}

impl<S: TripletStore, E: LayoutEngine, R: Renderer> GraphModel<S, E, R> {
    // ========================================================================
    // Drag
    // ========================================================================

    /// Begin dragging a node from pointer position `pointer`.
    pub fn drag_start(&mut self, hash: &str, pointer: Point) -> bool {
        let Some(&i) = self.node_index.get(hash) else {
            tracing::warn!(hash, "drag of unknown node ignored");
            return false;
        };
        let node = &mut self.nodes[i];
        self.drag = Some(DragState {
            hash: hash.to_string(),
            pointer_start: pointer,
            node_start: node.center(),
            was_fixed: node.fixed,
            moved: false,
        });
        node.fixed = true;
        self.layout.set_fixed(i, true);
        self.suppress_click = false;
        self.alignment = AlignmentEngine::new(self.options.snap_to_alignment, self.options.snap_threshold);

        if let Some(cb) = &self.options.callbacks.node_drag_start {
            cb(&self.nodes[i]);
        }
        true
    }

    /// Move the dragged node with the pointer, snapping it to nearby nodes.
    pub fn drag_move(&mut self, pointer: Point) -> Option<DragFrame> {
        let drag = self.drag.as_ref()?;
        let Some(&i) = self.node_index.get(&drag.hash) else {
            self.drag = None;
            self.renderer.clear_guides();
            return None;
        };
        let proposed = Point::new(
            drag.node_start.x + pointer.x - drag.pointer_start.x,
            drag.node_start.y + pointer.y - drag.pointer_start.y,
        );
        let others: Vec<Bounds> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, n)| n.bounds)
            .collect();
        let frame = self.alignment.align(proposed, self.nodes[i].size(), &others);

        if let Some(drag) = self.drag.as_mut() {
            drag.moved |= frame.position != drag.node_start;
        }
        self.nodes[i].move_to(frame.position.x, frame.position.y);
        self.layout.move_node(i, frame.position);
        if !self.layout.is_running() {
            self.update_renderer();
        }
        if frame.guides.is_empty() {
            self.renderer.clear_guides();
        } else {
            self.renderer.show_guides(&frame.guides);
        }

        if let Some(cb) = &self.options.callbacks.node_drag {
            cb(&self.nodes[i]);
        }
        Some(frame)
    }

    /// Finish the gesture. Returns whether the node moved.
    pub fn drag_end(&mut self) -> Result<bool> {
        let Some(drag) = self.drag.take() else {
            return Ok(false);
        };
        self.renderer.clear_guides();
        let Some(&i) = self.node_index.get(&drag.hash) else {
            return Ok(false);
        };
        self.nodes[i].fixed = drag.was_fixed;
        self.layout.set_fixed(i, drag.was_fixed);

        if drag.moved {
            self.suppress_click = true;
            self.restart().redraw_edges()?;
        }
        tracing::debug!(hash = %drag.hash, moved = drag.moved, "drag finished");
        if let Some(cb) = &self.options.callbacks.node_drag_end {
            cb(&self.nodes[i]);
        }
        Ok(drag.moved)
    }

    pub fn dragging(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    // ========================================================================
    // Click
    // ========================================================================

    fn take_click(&mut self) -> bool {
        if std::mem::take(&mut self.suppress_click) {
            tracing::debug!("click after drag suppressed");
            return false;
        }
        true
    }

    /// Click on a node. `None` when suppressed, unknown or unhandled.
    pub fn click_node(&mut self, hash: &str) -> Option<DelayedClick> {
        if !self.take_click() {
            return None;
        }
        let cb = self.options.callbacks.node_click.clone()?;
        let node = self.get_node(hash)?.clone();
        Some(DelayedClick::new(self.options.click_delay, move || cb(&node)))
    }

    pub fn click_group(&mut self, id: &str) -> Option<DelayedClick> {
        if !self.take_click() {
            return None;
        }
        let cb = self.options.callbacks.group_click.clone()?;
        let group = self.get_group(id)?.clone();
        Some(DelayedClick::new(self.options.click_delay, move || cb(&group)))
    }

    pub fn click_edge(&mut self, key: &TripletKey) -> Option<DelayedClick> {
        if !self.take_click() {
            return None;
        }
        let cb = self.options.callbacks.edge_click.clone()?;
        let link = self.links.iter().find(|l| &l.key() == key)?.clone();
        Some(DelayedClick::new(self.options.click_delay, move || cb(&link)))
    }

    // ========================================================================
    // Hover
    // ========================================================================

    /// Deliver a hover event to its callback. Unknown targets are ignored.
    pub fn handle_event(&self, event: &PointerEvent) {
        let cbs = &self.options.callbacks;
        match event {
            PointerEvent::NodeOver(h) | PointerEvent::NodeOut(h) => {
                let cb = match event {
                    PointerEvent::NodeOver(_) => &cbs.node_mouse_over,
                    _ => &cbs.node_mouse_out,
                };
                if let (Some(cb), Some(node)) = (cb, self.get_node(h)) {
                    cb(node);
                }
            }
            PointerEvent::GroupOver(id) | PointerEvent::GroupOut(id) => {
                let cb = match event {
                    PointerEvent::GroupOver(_) => &cbs.group_mouse_over,
                    _ => &cbs.group_mouse_out,
                };
                if let (Some(cb), Some(group)) = (cb, self.get_group(id)) {
                    cb(group);
                }
            }
            PointerEvent::EdgeOver(key) | PointerEvent::EdgeOut(key) => {
                let cb = match event {
                    PointerEvent::EdgeOver(_) => &cbs.edge_mouse_over,
                    _ => &cbs.edge_mouse_out,
                };
                if let (Some(cb), Some(link)) = (cb, self.links.iter().find(|l| &l.key() == key)) {
                    cb(link);
                }
            }
        }
    }
}
