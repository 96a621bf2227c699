use crate::style::color::Color;
use crate::style::length::{Length, SizeValue};
use crate::style::style_table::PropertyMap;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets<T> {
    pub left: T,
    pub top: T,
    pub right: T,
    pub bottom: T,
}

impl<T: Copy> EdgeInsets<T> {
    pub const fn uniform(value: T) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }
}

impl EdgeInsets<f32> {
    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0
    }
}

/// Box properties of one element after merging stylesheet and inline values.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStyle {
    pub width: SizeValue,
    pub height: SizeValue,
    pub left: Length,
    pub top: Length,
    pub border: EdgeInsets<f32>,
    pub border_color: Color,
    pub background_color: Color,
    pub enabled: bool,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            width: SizeValue::Auto,
            height: SizeValue::Auto,
            left: Length::Zero,
            top: Length::Zero,
            border: EdgeInsets::uniform(0.0),
            border_color: Color::BLACK,
            background_color: Color::TRANSPARENT,
            enabled: true,
        }
    }
}

/// Applies `properties` front to back, so a later declaration overrides an
/// earlier one even when the two are spelled differently: `border-width`
/// and the per-edge widths share one cascade, as do `background` /
/// `background-color` and `enable` / `visible` / `display`. Unrecognised or
/// unparsable values keep what came before and are only logged.
pub fn compute_style(properties: &PropertyMap) -> BoxStyle {
    let mut computed = BoxStyle::default();

    for (name, value) in properties {
        let value = value.as_str();
        let applied = match name.as_str() {
            "width" => SizeValue::parse(value).map(|v| computed.width = v).is_some(),
            "height" => SizeValue::parse(value).map(|v| computed.height = v).is_some(),
            "left" => Length::parse(value).map(|v| computed.left = v).is_some(),
            "top" => Length::parse(value).map(|v| computed.top = v).is_some(),
            "border-width" => parse_border_shorthand(value)
                .map(|border| computed.border = border)
                .is_some(),
            "border-left-width" => parse_edge(value).map(|v| computed.border.left = v).is_some(),
            "border-top-width" => parse_edge(value).map(|v| computed.border.top = v).is_some(),
            "border-right-width" => parse_edge(value).map(|v| computed.border.right = v).is_some(),
            "border-bottom-width" => {
                parse_edge(value).map(|v| computed.border.bottom = v).is_some()
            }
            "border-color" => Color::parse(value).map(|c| computed.border_color = c).is_some(),
            "background-color" | "background" => Color::parse(value)
                .map(|c| computed.background_color = c)
                .is_some(),
            "enable" | "visible" => parse_bool(value).map(|b| computed.enabled = b).is_some(),
            "display" => {
                computed.enabled = !value.trim().eq_ignore_ascii_case("none");
                true
            }
            _ => true,
        };
        if !applied {
            log::debug!("style: ignoring `{name}: {value}`");
        }
    }

    computed
}

fn parse_edge(raw: &str) -> Option<f32> {
    match Length::parse(raw)? {
        Length::Px(v) => Some(v.max(0.0)),
        Length::Zero => Some(0.0),
        Length::Percent(_) => None,
    }
}

/// CSS order: `all`, `vertical horizontal`, `top horizontal bottom`,
/// `top right bottom left`.
fn parse_border_shorthand(raw: &str) -> Option<EdgeInsets<f32>> {
    let values = raw
        .split_whitespace()
        .map(parse_edge)
        .collect::<Option<Vec<f32>>>()?;
    let (top, right, bottom, left) = match values.as_slice() {
        [all] => (*all, *all, *all, *all),
        [v, h] => (*v, *h, *v, *h),
        [t, h, b] => (*t, *h, *b, *h),
        [t, r, b, l] => (*t, *r, *b, *l),
        _ => return None,
    };
    Some(EdgeInsets {
        left,
        top,
        right,
        bottom,
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{EdgeInsets, compute_style};
    use crate::style::{Color, Length, PropertyMap, SizeValue};
    use smol_str::SmolStr;

    fn props(pairs: &[(&str, &str)]) -> PropertyMap {
        pairs
            .iter()
            .map(|(k, v)| (SmolStr::new(k), SmolStr::new(v)))
            .collect()
    }

    #[test]
    fn border_shorthand_then_edge_override() {
        let style = compute_style(&props(&[
            ("border-width", "1 2 3 4"),
            ("border-left-width", "9px"),
        ]));
        assert_eq!(
            style.border,
            EdgeInsets {
                left: 9.0,
                top: 1.0,
                right: 2.0,
                bottom: 3.0
            }
        );
    }

    #[test]
    fn resolves_sizes_colors_and_enable() {
        let style = compute_style(&props(&[
            ("width", "50%"),
            ("height", "40"),
            ("left", "10px"),
            ("background-color", "#00ff00"),
            ("border-color", "red"),
            ("display", "none"),
            ("shadow", "ignored"),
        ]));
        assert_eq!(style.width, SizeValue::Length(Length::Percent(50.0)));
        assert_eq!(style.height, SizeValue::Length(Length::Px(40.0)));
        assert_eq!(style.left, Length::Px(10.0));
        assert_eq!(style.background_color, Color::rgb(0, 255, 0));
        assert_eq!(style.border_color, Color::rgb(255, 0, 0));
        assert!(!style.enabled);
    }

    #[test]
    fn later_declarations_win_across_spellings() {
        let style = compute_style(&props(&[
            ("border-left-width", "5"),
            ("background", "red"),
            ("display", "none"),
            ("border-width", "1"),
            ("background-color", "blue"),
            ("enable", "true"),
        ]));
        assert_eq!(style.border, EdgeInsets::uniform(1.0));
        assert_eq!(style.background_color, Color::rgb(0, 0, 255));
        assert!(style.enabled);

        let style = compute_style(&props(&[("visible", "false"), ("display", "block")]));
        assert!(style.enabled);
    }

    #[test]
    fn unparsable_values_keep_defaults() {
        let style = compute_style(&props(&[("width", "huge"), ("border-width", "1 2 3 4 5")]));
        assert_eq!(style.width, SizeValue::Auto);
        assert!(style.border.is_zero());
        assert!(style.enabled);
    }
}
