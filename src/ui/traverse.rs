use super::element::{Element, Muid};

/// Callback run over the tree in pre-order. Clearing `keep_going` stops the
/// walk after the current element.
pub trait ElementVisitor<'a> {
    fn visit(&mut self, element: &'a Element, keep_going: &mut bool);
}

impl<'a, F> ElementVisitor<'a> for F
where
    F: FnMut(&'a Element, &mut bool),
{
    fn visit(&mut self, element: &'a Element, keep_going: &mut bool) {
        self(element, keep_going)
    }
}

/// Returns `false` if the visitor stopped early.
pub fn walk<'a>(root: &'a Element, visitor: &mut dyn ElementVisitor<'a>) -> bool {
    for element in root.iter() {
        let mut keep_going = true;
        visitor.visit(element, &mut keep_going);
        if !keep_going {
            return false;
        }
    }
    true
}

/// Lazy pre-order iterator, parent before children, children in document
/// order.
pub struct PreOrder<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl Element {
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.iter().find(|element| element.id == id)
    }

    pub fn find_by_muid<'a>(&'a self, muid: Muid) -> Option<&'a Element> {
        let mut found = None;
        walk(self, &mut |element: &'a Element, keep_going: &mut bool| {
            if element.muid == muid {
                found = Some(element);
                *keep_going = false;
            }
        });
        found
    }
}

/// Topmost enabled element under the point (later siblings win, matching
/// draw order). Disabled elements hide their whole subtree.
pub fn hit_test(root: &Element, x: f32, y: f32) -> Option<&Element> {
    fn find(node: &Element, x: f32, y: f32) -> Option<&Element> {
        if !node.is_enabled() {
            return None;
        }
        let rect = node.size_in_display()?;
        if !rect.contains_point(x, y) {
            return None;
        }
        for child in node.children.iter().rev() {
            if let Some(hit) = find(child, x, y) {
                return Some(hit);
            }
        }
        Some(node)
    }

    find(root, x, y)
}
