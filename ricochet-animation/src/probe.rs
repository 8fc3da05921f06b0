// Ricochet: geometry probe
//
// Answers "has the element reached edge E of its container?" from freshly
// measured bounds. Layout can change between frames, so nothing is cached.

use std::rc::Rc;

use ricochet_utils::{Edge, Rect};

use crate::host::Element;

/// Element placement relative to the container's top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    pub container_width: f64,
    pub container_height: f64,
}

impl Placement {
    pub fn between(container: Rect, item: Rect) -> Self {
        Self {
            top: item.y - container.y,
            left: item.x - container.x,
            width: item.width,
            height: item.height,
            container_width: container.width,
            container_height: container.height,
        }
    }

    /// Inclusive: touching an edge counts as hitting it
    pub fn hits(&self, edge: Edge) -> bool {
        match edge {
            Edge::Top => self.top <= 0.0,
            Edge::Bottom => self.top + self.height >= self.container_height,
            Edge::Left => self.left <= 0.0,
            Edge::Right => self.left + self.width >= self.container_width,
        }
    }
}

/// Stateless view over a container and the element bouncing inside it
#[derive(Clone)]
pub struct GeometryProbe {
    container: Rc<dyn Element>,
    item: Rc<dyn Element>,
}

impl GeometryProbe {
    pub fn new(container: Rc<dyn Element>, item: Rc<dyn Element>) -> Self {
        Self { container, item }
    }

    pub fn item(&self) -> &Rc<dyn Element> {
        &self.item
    }

    pub fn measure(&self) -> Placement {
        Placement::between(self.container.bounding_rect(), self.item.bounding_rect())
    }

    pub fn hits(&self, edge: Edge) -> bool {
        self.measure().hits(edge)
    }
}
