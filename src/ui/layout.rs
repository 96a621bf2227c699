use super::element::{Element, Rect};
use crate::style::SizeValue;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    /// Zero (or negative) extents become 1 so later divisions stay finite.
    pub fn new(width: f32, height: f32) -> Self {
        let sanitize = |v: f32| if v.is_finite() && v >= 1.0 { v } else { 1.0 };
        Self {
            width: sanitize(width),
            height: sanitize(height),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Lays the whole tree out from scratch. The root always covers the viewport;
/// every other element is placed inside its parent's content box.
pub fn layout(root: &mut Element, viewport: ViewportSize) {
    let viewport = ViewportSize::new(viewport.width, viewport.height);
    let root_rect = Rect::new(0.0, 0.0, viewport.width, viewport.height);
    let trace = trace_layout_enabled();

    let mut stack: Vec<(&mut Element, Option<Rect>)> = vec![(root, None)];
    while let Some((node, parent_content)) = stack.pop() {
        let rect = match parent_content {
            Some(content) => place_in(node, &content),
            None => root_rect,
        };
        node.size_in_display = Some(rect);
        if trace {
            log::info!(
                "[layout] {} {} x={:.1} y={:.1} w={:.1} h={:.1}",
                node.id,
                node.muid,
                rect.x,
                rect.y,
                rect.width,
                rect.height
            );
        }

        let content = rect.inset(&node.border);
        stack.extend(
            node.children
                .iter_mut()
                .rev()
                .map(|child| (child, Some(content))),
        );
    }
}

fn place_in(element: &Element, content: &Rect) -> Rect {
    let x = (content.x + element.left.resolve(content.width)).clamp(content.x, content.right());
    let y = (content.y + element.top.resolve(content.height)).clamp(content.y, content.bottom());
    let available_width = content.right() - x;
    let available_height = content.bottom() - y;

    let width = match element.size.width {
        SizeValue::Auto => available_width,
        SizeValue::Length(length) => length.resolve(content.width),
    };
    let height = match element.size.height {
        SizeValue::Auto => available_height,
        SizeValue::Length(length) => length.resolve(content.height),
    };

    Rect {
        x,
        y,
        width: width.max(0.0).min(available_width),
        height: height.max(0.0).min(available_height),
    }
}

fn trace_layout_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("YTML_TRACE_LAYOUT").is_ok())
}
