use crate::style::{BoxStyle, Color, EdgeInsets, Length, SizeValue};
use bitflags::bitflags;
use smol_str::SmolStr;

/// Unique element id. Strictly increasing in creation order, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Muid(pub u64);

impl std::fmt::Display for Muid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source of [`Muid`]s. Thread the same counter through every `build` call
/// so ids stay unique across documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuidCounter {
    next: u64,
}

impl MuidCounter {
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    pub const fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn next(&mut self) -> Muid {
        let muid = Muid(self.next);
        self.next += 1;
        muid
    }

    pub const fn peek(&self) -> Muid {
        Muid(self.next)
    }
}

impl Default for MuidCounter {
    fn default() -> Self {
        Self::new()
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u32 {
        const ENABLE = 1 << 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shrinks the rectangle by `edges`; width and height never go negative.
    pub fn inset(&self, edges: &EdgeInsets<f32>) -> Rect {
        let width = (self.width - edges.left - edges.right).max(0.0);
        let height = (self.height - edges.top - edges.bottom).max(0.0);
        Rect {
            x: self.x + edges.left.min(self.width),
            y: self.y + edges.top.min(self.height),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Root,
    Panel,
    Button,
    Label,
}

impl ElementKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "root" | "ytml" => Self::Root,
            "panel" | "div" => Self::Panel,
            "button" => Self::Button,
            "label" => Self::Label,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: SizeValue,
    pub height: SizeValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: SmolStr,
    pub tag: SmolStr,
    pub classes: Vec<SmolStr>,
    pub kind: ElementKind,
    pub muid: Muid,
    pub flags: ElementFlags,
    pub border: EdgeInsets<f32>,
    pub border_color: Color,
    pub background_color: Color,
    pub size: Size,
    pub left: Length,
    pub top: Length,
    pub(crate) size_in_display: Option<Rect>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(id: impl Into<SmolStr>, kind: ElementKind, muid: Muid) -> Self {
        let id = id.into();
        Self::from_style(id.clone(), id, kind, muid, &BoxStyle::default())
    }

    pub fn from_style(
        id: SmolStr,
        tag: SmolStr,
        kind: ElementKind,
        muid: Muid,
        style: &BoxStyle,
    ) -> Self {
        let mut flags = ElementFlags::empty();
        flags.set(ElementFlags::ENABLE, style.enabled);
        Self {
            id,
            tag,
            classes: Vec::new(),
            kind,
            muid,
            flags,
            border: style.border,
            border_color: style.border_color,
            background_color: style.background_color,
            size: Size {
                width: style.width,
                height: style.height,
            },
            left: style.left,
            top: style.top,
            size_in_display: None,
            children: Vec::new(),
        }
    }

    pub fn with_size(mut self, width: SizeValue, height: SizeValue) -> Self {
        self.size = Size { width, height };
        self
    }

    pub fn with_offset(mut self, left: Length, top: Length) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn with_border(mut self, border: EdgeInsets<f32>, color: Color) -> Self {
        self.border = border;
        self.border_color = color;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ElementFlags::ENABLE)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.flags.set(ElementFlags::ENABLE, enabled);
    }

    pub fn has_border(&self) -> bool {
        !self.border.is_zero()
    }

    /// Laid-out rectangle in window pixels; `None` until the first layout pass.
    pub fn size_in_display(&self) -> Option<Rect> {
        self.size_in_display
    }

    pub fn content_rect(&self) -> Option<Rect> {
        self.size_in_display.map(|rect| rect.inset(&self.border))
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementKind, MuidCounter, Rect};
    use crate::style::EdgeInsets;

    #[test]
    fn counter_is_strictly_increasing() {
        let mut counter = MuidCounter::starting_at(41);
        let a = counter.next();
        let b = counter.next();
        assert!(a < b);
        assert_eq!(counter.peek().0, 43);
    }

    #[test]
    fn inset_clamps_to_zero_size() {
        let rect = Rect::new(10.0, 10.0, 6.0, 20.0);
        let inner = rect.inset(&EdgeInsets {
            left: 4.0,
            top: 2.0,
            right: 4.0,
            bottom: 2.0,
        });
        assert_eq!(inner.width, 0.0);
        assert_eq!(inner.height, 16.0);
        assert_eq!(inner.y, 12.0);
        assert!(rect.contains_rect(&inner));
    }

    #[test]
    fn tag_registry() {
        assert_eq!(ElementKind::from_tag("button"), Some(ElementKind::Button));
        assert_eq!(ElementKind::from_tag("marquee"), None);
    }
}
