use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

/// Property declarations in cascade order, values exactly as written.
///
/// Re-declaring a name drops the earlier entry and appends the new one, so
/// applying the entries front to back always lets the latest source win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(SmolStr, SmolStr)>,
}

impl PropertyMap {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: SmolStr, value: SmolStr) {
        if let Some(index) = self.entries.iter().position(|(n, _)| *n == name) {
            self.entries.remove(index);
        }
        self.entries.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&SmolStr> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, value)| value)
    }

    /// Appends every declaration of `later` on top of this map.
    pub fn cascade(&mut self, later: &PropertyMap) {
        for (name, value) in later {
            self.insert(name.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &SmolStr)> {
        self.entries.iter().map(|(name, value)| (name, value))
    }
}

impl FromIterator<(SmolStr, SmolStr)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (SmolStr, SmolStr)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<'a> IntoIterator for &'a PropertyMap {
    type Item = (&'a SmolStr, &'a SmolStr);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (SmolStr, SmolStr)>,
        fn(&'a (SmolStr, SmolStr)) -> (&'a SmolStr, &'a SmolStr),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let refs: fn(&'a (SmolStr, SmolStr)) -> (&'a SmolStr, &'a SmolStr) = entry_refs;
        self.entries.iter().map(refs)
    }
}

fn entry_refs((name, value): &(SmolStr, SmolStr)) -> (&SmolStr, &SmolStr) {
    (name, value)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("rule at byte {offset} has no selector")]
    MissingSelector { offset: usize },
    #[error("rule for `{selector}` at byte {offset} is missing its closing brace")]
    UnclosedRule { selector: String, offset: usize },
    #[error("unterminated comment at byte {offset}")]
    UnterminatedComment { offset: usize },
    #[error("unexpected `{found}` at byte {offset}")]
    Unexpected { found: char, offset: usize },
}

/// Selector key -> property map. Built once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleTable {
    rules: FxHashMap<SmolStr, PropertyMap>,
}

static EMPTY: PropertyMap = PropertyMap::new();

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never fails: a malformed stylesheet yields the rules parsed before the
    /// first error (possibly none).
    pub fn load(source: &str) -> Self {
        let (table, errors) = Self::parse(source);
        for error in &errors {
            log::warn!("stylesheet: {error}");
        }
        table
    }

    pub fn parse(source: &str) -> (Self, Vec<StyleError>) {
        let mut table = Self::new();
        let mut errors = Vec::new();
        let stripped = match strip_comments(source) {
            Ok(stripped) => stripped,
            Err(err) => {
                errors.push(err);
                return (table, errors);
            }
        };

        let mut cursor = 0usize;
        let bytes = stripped.as_bytes();
        while cursor < bytes.len() {
            let rest = &stripped[cursor..];
            let trimmed = rest.trim_start();
            if trimmed.is_empty() {
                break;
            }
            let rule_start = cursor + (rest.len() - trimmed.len());
            if trimmed.starts_with('}') {
                errors.push(StyleError::Unexpected {
                    found: '}',
                    offset: rule_start,
                });
                break;
            }
            let Some(open) = trimmed.find('{') else {
                errors.push(StyleError::UnclosedRule {
                    selector: trimmed.trim().to_string(),
                    offset: rule_start,
                });
                break;
            };
            let selector_text = trimmed[..open].trim();
            let body_start = open + 1;
            let Some(close) = trimmed[body_start..].find('}') else {
                errors.push(StyleError::UnclosedRule {
                    selector: selector_text.to_string(),
                    offset: rule_start,
                });
                break;
            };
            let body = &trimmed[body_start..body_start + close];
            if let Some(nested) = body.find('{') {
                errors.push(StyleError::Unexpected {
                    found: '{',
                    offset: rule_start + body_start + nested,
                });
                break;
            }
            let selectors: Vec<&str> = selector_text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if selectors.is_empty() {
                errors.push(StyleError::MissingSelector { offset: rule_start });
                break;
            }

            let properties = parse_declarations(body);
            for selector in selectors {
                table.merge_rule(selector, &properties);
            }
            cursor = rule_start + body_start + close + 1;
        }

        (table, errors)
    }

    fn merge_rule(&mut self, selector: &str, properties: &PropertyMap) {
        self.rules
            .entry(SmolStr::new(selector))
            .or_default()
            .cascade(properties);
    }

    /// Properties for `selector`, or an empty map when there is no rule.
    pub fn lookup(&self, selector: &str) -> &PropertyMap {
        self.rules.get(selector).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.rules.contains_key(selector)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parses `name: value; name: value` pairs. Shared with inline `style`
/// attributes. Entries without a colon are dropped.
pub fn parse_declarations(body: &str) -> PropertyMap {
    let mut properties = PropertyMap::new();
    for declaration in body.split(';') {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        let Some((name, value)) = declaration.split_once(':') else {
            log::debug!("stylesheet: ignoring declaration without `:`: {declaration}");
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        properties.insert(
            SmolStr::new(name.to_ascii_lowercase()),
            SmolStr::new(value.trim()),
        );
    }
    properties
}

fn strip_comments(source: &str) -> Result<String, StyleError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    let mut consumed = 0usize;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start + 2..].find("*/") else {
            return Err(StyleError::UnterminatedComment {
                offset: consumed + start,
            });
        };
        // Keep byte offsets stable for diagnostics.
        let comment_len = end + 4;
        out.extend(std::iter::repeat_n(' ', comment_len));
        consumed += start + comment_len;
        rest = &rest[start + comment_len..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{StyleError, StyleTable};

    #[test]
    fn parses_rules_and_merges_duplicates() {
        let table = StyleTable::load(
            r#"
            /* panels */
            panel { Background-Color: #202020; border-width: 2 }
            .box, #title { width: 50%; custom-thing: keep me }
            panel { border-color: #fff; }
            "#,
        );
        assert_eq!(table.len(), 3);
        let panel = table.lookup("panel");
        assert_eq!(panel.get("background-color").map(|v| v.as_str()), Some("#202020"));
        assert_eq!(panel.get("border-width").map(|v| v.as_str()), Some("2"));
        assert_eq!(panel.get("border-color").map(|v| v.as_str()), Some("#fff"));
        assert_eq!(
            table.lookup("#title").get("custom-thing").map(|v| v.as_str()),
            Some("keep me")
        );
        assert!(table.lookup("missing").is_empty());
    }

    #[test]
    fn malformed_source_keeps_rules_before_the_error() {
        let (table, errors) = StyleTable::parse("a { width: 10 } b { height: 5 ");
        assert!(table.contains("a"));
        assert!(!table.contains("b"));
        assert!(matches!(errors.as_slice(), [StyleError::UnclosedRule { .. }]));
    }

    #[test]
    fn garbage_yields_empty_table_without_panicking() {
        for source in ["}}}", "{ width: 1 }", "/* never closed", "x { a { b } }"] {
            let table = StyleTable::load(source);
            assert!(table.is_empty(), "{source:?} should produce no rules");
        }
    }
}
