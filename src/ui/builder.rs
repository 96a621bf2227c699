use super::element::{Element, ElementKind, MuidCounter};
use super::markup::{Attribute, ParseError, Token, Tokenizer};
use crate::style::{PropertyMap, StyleTable, compute_style, parse_declarations};
use smol_str::SmolStr;

/// Result of [`build`]: always a usable tree, plus whatever went wrong.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub root: Element,
    pub errors: Vec<ParseError>,
}

impl BuildOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

struct OpenElement {
    element: Element,
    offset: usize,
}

/// Parses `markup` into an element tree styled from `styles`.
///
/// Every element gets `muids.next()` in document order. Errors never abort
/// the build: open elements are closed and attached to their parents, so the
/// returned tree always has a complete owner chain. Empty input yields an
/// implicit `root` element.
pub fn build(markup: &str, styles: &StyleTable, muids: &mut MuidCounter) -> BuildOutcome {
    let mut tokenizer = Tokenizer::new(markup);
    let mut errors = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let token = match tokenizer.next_token() {
            Ok(Some(token)) => token,
            Ok(None) => break,
            Err(err) => {
                errors.push(err);
                break;
            }
        };

        match token {
            Token::Open {
                tag,
                attributes,
                self_closing,
                offset,
            } => {
                if stack.is_empty() && root.is_some() {
                    errors.push(ParseError::MultipleRoots { offset });
                    break;
                }
                let element = create_element(tag, &attributes, styles, muids, stack.is_empty());
                if self_closing {
                    attach(&mut stack, &mut root, element);
                } else {
                    stack.push(OpenElement { element, offset });
                }
            }
            Token::Close { tag, offset } => {
                let Some(depth) = stack.iter().rposition(|open| open.element.tag == tag) else {
                    errors.push(ParseError::StrayClose { tag, offset });
                    continue;
                };
                if depth + 1 != stack.len() {
                    let expected = stack
                        .last()
                        .map(|open| open.element.tag.clone())
                        .unwrap_or_default();
                    errors.push(ParseError::MismatchedClose {
                        expected,
                        found: tag,
                        offset,
                    });
                }
                while stack.len() > depth {
                    close_top(&mut stack, &mut root);
                }
            }
        }
    }

    for open in stack.iter().rev() {
        errors.push(ParseError::UnclosedTag {
            tag: open.element.tag.clone(),
            offset: open.offset,
        });
    }
    while !stack.is_empty() {
        close_top(&mut stack, &mut root);
    }

    let root = root.unwrap_or_else(|| {
        log::debug!("markup: no elements, using an implicit root");
        Element::new("root", ElementKind::Root, muids.next())
    });
    for error in &errors {
        log::warn!("markup: {error}");
    }
    BuildOutcome { root, errors }
}

fn close_top(stack: &mut Vec<OpenElement>, root: &mut Option<Element>) {
    if let Some(open) = stack.pop() {
        attach(stack, root, open.element);
    }
}

fn attach(stack: &mut [OpenElement], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.element.push_child(element),
        None => *root = Some(element),
    }
}

fn create_element(
    tag: SmolStr,
    attributes: &[Attribute],
    styles: &StyleTable,
    muids: &mut MuidCounter,
    top_level: bool,
) -> Element {
    let attribute = |name: &str| {
        attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.clone())
    };
    let id = attribute("id").filter(|id| !id.is_empty());
    let classes: Vec<SmolStr> = attribute("class")
        .map(|raw| raw.split_whitespace().map(SmolStr::new).collect())
        .unwrap_or_default();

    // Cascade order: tag, classes, id, attributes, `style`.
    let mut properties = PropertyMap::new();
    properties.cascade(styles.lookup(&tag));
    for class in &classes {
        properties.cascade(styles.lookup(&format!(".{class}")));
    }
    if let Some(id) = &id {
        properties.cascade(styles.lookup(&format!("#{id}")));
    }
    for attr in attributes {
        if !matches!(attr.name.as_str(), "id" | "class" | "style") {
            properties.insert(attr.name.clone(), attr.value.clone());
        }
    }
    if let Some(inline) = attribute("style") {
        properties.cascade(&parse_declarations(&inline));
    }

    let kind = match ElementKind::from_tag(&tag) {
        Some(kind) => kind,
        None if top_level => ElementKind::Root,
        None => {
            log::debug!("markup: unknown tag `<{tag}>`, treating as panel");
            ElementKind::Panel
        }
    };
    let style = compute_style(&properties);
    let muid = muids.next();
    let mut element = Element::from_style(id.unwrap_or_else(|| tag.clone()), tag, kind, muid, &style);
    element.classes = classes;
    element
}

#[cfg(test)]
mod tests {
    use super::build;
    use crate::style::{Color, EdgeInsets, Length, SizeValue, StyleTable};
    use crate::ui::{Element, ElementKind, MuidCounter, ParseError};

    const STYLES: &str = r#"
        panel { background-color: #101010; border-width: 1 }
        .framed { border-width: 4; border-color: #ffffff }
        #title { height: 24 }
    "#;

    fn preorder_muids(root: &Element) -> Vec<u64> {
        root.iter().map(|e| e.muid.0).collect()
    }

    #[test]
    fn resolves_selectors_then_inline_values() {
        let styles = StyleTable::load(STYLES);
        let mut muids = MuidCounter::new();
        let outcome = build(
            r#"<root>
                 <panel id="title" class="framed" width="50%" style="border-left-width: 0">
                   <label/>
                 </panel>
               </root>"#,
            &styles,
            &mut muids,
        );
        assert!(outcome.is_clean(), "{:?}", outcome.errors);

        let root = &outcome.root;
        assert_eq!(root.kind, ElementKind::Root);
        let title = &root.children[0];
        assert_eq!(title.id, "title");
        assert_eq!(title.kind, ElementKind::Panel);
        assert_eq!(title.background_color, Color::rgb(16, 16, 16));
        assert_eq!(title.border_color, Color::WHITE);
        assert_eq!(
            title.border,
            EdgeInsets {
                left: 0.0,
                top: 4.0,
                right: 4.0,
                bottom: 4.0
            }
        );
        assert_eq!(title.size.width, SizeValue::Length(Length::Percent(50.0)));
        assert_eq!(title.size.height, SizeValue::Length(Length::Px(24.0)));

        let label = &title.children[0];
        assert_eq!(label.id, "label");
        assert_eq!(label.kind, ElementKind::Label);
    }

    #[test]
    fn inline_values_override_differently_spelled_stylesheet_values() {
        let styles = StyleTable::load(
            r#"
            panel { background: red; border-left-width: 5 }
            .hidden { display: none }
            "#,
        );
        let mut muids = MuidCounter::new();
        let outcome = build(
            r#"<root>
                 <panel background-color=blue border-width=1/>
                 <panel class=hidden enable=true/>
                 <panel class=hidden/>
               </root>"#,
            &styles,
            &mut muids,
        );
        assert!(outcome.is_clean(), "{:?}", outcome.errors);

        let [styled, shown, hidden] = outcome.root.children.as_slice() else {
            panic!("expected three panels");
        };
        assert_eq!(styled.background_color, Color::rgb(0, 0, 255));
        assert_eq!(styled.border, EdgeInsets::uniform(1.0));
        assert!(shown.is_enabled());
        assert!(!hidden.is_enabled());
    }

    #[test]
    fn later_stylesheet_sources_override_earlier_edges() {
        let styles = StyleTable::load(
            r#"
            panel { border-width: 2 }
            .thin { border-top-width: 0 }
            #boxed { border-width: 3 }
            "#,
        );
        let mut muids = MuidCounter::new();
        let outcome = build(
            r#"<root><panel class=thin/><panel id=boxed class=thin/></root>"#,
            &styles,
            &mut muids,
        );
        let borders: Vec<EdgeInsets<f32>> =
            outcome.root.children.iter().map(|panel| panel.border).collect();
        assert_eq!(
            borders,
            [
                EdgeInsets {
                    left: 2.0,
                    top: 0.0,
                    right: 2.0,
                    bottom: 2.0
                },
                EdgeInsets::uniform(3.0),
            ]
        );
    }

    #[test]
    fn muids_are_unique_and_increase_across_builds() {
        let styles = StyleTable::new();
        let mut muids = MuidCounter::new();
        let first = build("<root><a><b/></a><c/></root>", &styles, &mut muids);
        let second = build("<root><d/><e><f/></e></root>", &styles, &mut muids);

        let mut all = preorder_muids(&first.root);
        all.extend(preorder_muids(&second.root));
        assert_eq!(all.len(), 9);
        assert!(all.windows(2).all(|w| w[0] < w[1]), "{all:?}");
    }

    #[test]
    fn malformed_nesting_keeps_partial_tree() {
        let styles = StyleTable::new();
        let mut muids = MuidCounter::new();
        let outcome = build("<root><panel><button></panel><label></root", &styles, &mut muids);

        assert!(matches!(
            outcome.errors.first(),
            Some(ParseError::MismatchedClose { .. })
        ));
        assert!(
            outcome
                .errors
                .iter()
                .any(|e| matches!(e, ParseError::UnterminatedTag { .. }))
        );

        let root = &outcome.root;
        assert_eq!(root.tag, "root");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].tag, "panel");
        assert_eq!(root.children[0].children[0].tag, "button");
        assert_eq!(root.children[1].tag, "label");
        assert_eq!(root.iter().count(), 4);
    }

    #[test]
    fn stray_close_and_second_root_are_reported() {
        let styles = StyleTable::new();
        let mut muids = MuidCounter::new();
        let outcome = build("<root></nope><panel/></root><root/>", &styles, &mut muids);
        assert!(matches!(
            outcome.errors.as_slice(),
            [ParseError::StrayClose { .. }, ParseError::MultipleRoots { offset: 28 }]
        ));
        assert_eq!(outcome.root.children.len(), 1);
    }

    #[test]
    fn empty_input_gives_implicit_root() {
        let mut muids = MuidCounter::starting_at(7);
        let outcome = build("  just text ", &StyleTable::new(), &mut muids);
        assert!(outcome.is_clean());
        assert_eq!(outcome.root.kind, ElementKind::Root);
        assert_eq!(outcome.root.muid.0, 7);
        assert!(outcome.root.is_enabled());
    }

    #[test]
    fn display_none_clears_enable() {
        let mut muids = MuidCounter::new();
        let outcome = build(
            r#"<root><panel style="display: none"/><panel enable="false"/><panel/></root>"#,
            &StyleTable::new(),
            &mut muids,
        );
        let flags: Vec<bool> = outcome.root.children.iter().map(Element::is_enabled).collect();
        assert_eq!(flags, [false, false, true]);
    }
}
