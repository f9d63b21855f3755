//! # Renderer Trait
//!
//! The declarative rendering layer is an external collaborator: the model
//! hands it the current data and asks it to diff, measure and draw.
//!
//! ## Implementations
//!
//! | Renderer | Description |
//! |----------|-------------|
//! | `NullRenderer` | Draws nothing, estimates text metrics from character count |

use crate::alignment::Guides;
use crate::layout::EdgeRoute;
use crate::model::{Group, Link, Node, Size};

/// Borrowed view of everything the renderer binds to.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub nodes: &'a [Node],
    pub links: &'a [Link],
    pub groups: &'a [Group],
}

/// Average glyph advance used by the default text estimate.
pub const GLYPH_WIDTH: f64 = 7.0;
/// Line height used by the default text estimate.
pub const LINE_HEIGHT: f64 = 14.0;

/// Contract with the tree-diffing rendering layer.
pub trait Renderer {
    /// Diff the bound data against what is drawn: enter, update, exit.
    fn bind(&mut self, scene: SceneView<'_>);

    /// Bounding box of the node's rendered label.
    ///
    /// Default: a fixed-pitch estimate.
    fn measure_text(&self, node: &Node) -> Size {
        let chars = node.label().chars().count() as f64;
        Size::new(chars * GLYPH_WIDTH, LINE_HEIGHT)
    }

    /// Move node, group and straight-edge visuals to the current geometry.
    fn update_positions(&mut self, scene: SceneView<'_>);

    /// Replace edge paths with routed polylines.
    fn draw_routes(&mut self, routes: &[EdgeRoute]);

    fn show_guides(&mut self, guides: &Guides);

    fn clear_guides(&mut self);
}

/// Renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn bind(&mut self, _scene: SceneView<'_>) {}

    fn update_positions(&mut self, _scene: SceneView<'_>) {}

    fn draw_routes(&mut self, _routes: &[EdgeRoute]) {}

    fn show_guides(&mut self, _guides: &Guides) {}

    fn clear_guides(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_measure_uses_label() {
        let r = NullRenderer;
        assert_eq!(r.measure_text(&Node::new("abcd")), Size::new(28.0, 14.0));
        assert_eq!(r.measure_text(&Node::new("abcd").with_shortname("ab")), Size::new(14.0, 14.0));
    }
}
