use smol_str::SmolStr;
use thiserror::Error;

/// Non-fatal markup diagnostic. The builder keeps whatever was parsed
/// before (and around) the problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected `</{expected}>` but found `</{found}>` at byte {offset}")]
    MismatchedClose {
        expected: SmolStr,
        found: SmolStr,
        offset: usize,
    },
    #[error("`<{tag}>` opened at byte {offset} is never closed")]
    UnclosedTag { tag: SmolStr, offset: usize },
    #[error("`</{tag}>` at byte {offset} has no matching open tag")]
    StrayClose { tag: SmolStr, offset: usize },
    #[error("tag starting at byte {offset} is not terminated")]
    UnterminatedTag { offset: usize },
    #[error("attribute value starting at byte {offset} is not terminated")]
    UnterminatedAttribute { offset: usize },
    #[error("comment starting at byte {offset} is not terminated")]
    UnterminatedComment { offset: usize },
    #[error("unexpected `{found}` at byte {offset}")]
    Unexpected { found: char, offset: usize },
    #[error("second top-level element at byte {offset}; only one root is allowed")]
    MultipleRoots { offset: usize },
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            Self::MismatchedClose { offset, .. }
            | Self::UnclosedTag { offset, .. }
            | Self::StrayClose { offset, .. }
            | Self::UnterminatedTag { offset }
            | Self::UnterminatedAttribute { offset }
            | Self::UnterminatedComment { offset }
            | Self::Unexpected { offset, .. }
            | Self::MultipleRoots { offset } => *offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: SmolStr,
    pub value: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open {
        tag: SmolStr,
        attributes: Vec<Attribute>,
        self_closing: bool,
        offset: usize,
    },
    Close {
        tag: SmolStr,
        offset: usize,
    },
}

/// Splits markup into open/close tags. Text, comments, `<!…>` and `<?…?>`
/// declarations are skipped. The first error ends tokenizing.
pub struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            done: false,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn read_name(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        {
            self.bump();
        }
        &self.source[start..self.pos]
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        if self.done {
            return Ok(None);
        }
        let result = self.scan();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    fn scan(&mut self) -> Result<Option<Token>, ParseError> {
        loop {
            let Some(lt) = self.rest().find('<') else {
                self.pos = self.source.len();
                return Ok(None);
            };
            self.pos += lt;
            let start = self.pos;
            let rest = self.rest();

            if rest.starts_with("<!--") {
                let Some(end) = rest[4..].find("-->") else {
                    return Err(ParseError::UnterminatedComment { offset: start });
                };
                self.pos += 4 + end + 3;
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                let Some(end) = rest.find('>') else {
                    return Err(ParseError::UnterminatedTag { offset: start });
                };
                self.pos += end + 1;
                continue;
            }

            self.bump();
            if self.peek() == Some('/') {
                self.bump();
                return self.close_tag(start).map(Some);
            }
            return self.open_tag(start).map(Some);
        }
    }

    fn close_tag(&mut self, start: usize) -> Result<Token, ParseError> {
        let name = self.read_name();
        if name.is_empty() {
            return Err(self.unexpected(start));
        }
        self.skip_whitespace();
        match self.bump() {
            Some('>') => Ok(Token::Close {
                tag: SmolStr::new(name.to_ascii_lowercase()),
                offset: start,
            }),
            None => Err(ParseError::UnterminatedTag { offset: start }),
            Some(found) => Err(ParseError::Unexpected {
                found,
                offset: self.pos - found.len_utf8(),
            }),
        }
    }

    fn open_tag(&mut self, start: usize) -> Result<Token, ParseError> {
        let name = self.read_name();
        if name.is_empty() {
            return Err(self.unexpected(start));
        }
        let tag = SmolStr::new(name.to_ascii_lowercase());
        let mut attributes = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(ParseError::UnterminatedTag { offset: start }),
                Some('>') => {
                    self.bump();
                    return Ok(Token::Open {
                        tag,
                        attributes,
                        self_closing: false,
                        offset: start,
                    });
                }
                Some('/') => {
                    self.bump();
                    return match self.bump() {
                        Some('>') => Ok(Token::Open {
                            tag,
                            attributes,
                            self_closing: true,
                            offset: start,
                        }),
                        None => Err(ParseError::UnterminatedTag { offset: start }),
                        Some(found) => Err(ParseError::Unexpected {
                            found,
                            offset: self.pos - found.len_utf8(),
                        }),
                    };
                }
                Some(_) => attributes.push(self.attribute()?),
            }
        }
    }

    fn attribute(&mut self) -> Result<Attribute, ParseError> {
        let name_start = self.pos;
        let name = self.read_name();
        if name.is_empty() {
            return Err(self.unexpected(name_start));
        }
        let name = SmolStr::new(name.to_ascii_lowercase());
        self.skip_whitespace();
        if self.peek() != Some('=') {
            // Bare flag attribute.
            return Ok(Attribute {
                name,
                value: SmolStr::default(),
            });
        }
        self.bump();
        self.skip_whitespace();

        let value_start = self.pos;
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let Some(end) = self.rest().find(quote) else {
                    return Err(ParseError::UnterminatedAttribute {
                        offset: value_start,
                    });
                };
                let value = &self.rest()[..end];
                self.pos += end + 1;
                value
            }
            Some(_) => {
                while self
                    .peek()
                    .is_some_and(|c| !c.is_whitespace() && c != '>' && c != '/')
                {
                    self.bump();
                }
                &self.source[value_start..self.pos]
            }
            None => return Err(ParseError::UnterminatedTag { offset: value_start }),
        };
        Ok(Attribute {
            name,
            value: SmolStr::new(value),
        })
    }

    fn unexpected(&self, fallback: usize) -> ParseError {
        match self.peek() {
            Some(found) => ParseError::Unexpected {
                found,
                offset: self.pos,
            },
            None => ParseError::UnterminatedTag { offset: fallback },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ParseError, Token, Tokenizer};

    fn collect(source: &str) -> (Vec<Token>, Option<ParseError>) {
        let mut tokenizer = Tokenizer::new(source);
        let mut tokens = Vec::new();
        loop {
            match tokenizer.next_token() {
                Ok(Some(token)) => tokens.push(token),
                Ok(None) => return (tokens, None),
                Err(err) => return (tokens, Some(err)),
            }
        }
    }

    #[test]
    fn tokenizes_attributes_and_self_closing() {
        let (tokens, error) = collect(
            r#"<?xml version="1.0"?><!-- hi --><Panel id=main class='a b' hidden style="width: 5"/>text</root>"#,
        );
        assert!(error.is_none());
        assert_eq!(tokens.len(), 2);
        let Token::Open {
            tag,
            attributes,
            self_closing,
            ..
        } = &tokens[0]
        else {
            panic!("expected open tag, got {:?}", tokens[0]);
        };
        assert_eq!(tag, "panel");
        assert!(*self_closing);
        let pairs: Vec<(&str, &str)> = attributes
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [("id", "main"), ("class", "a b"), ("hidden", ""), ("style", "width: 5")]
        );
        assert!(matches!(&tokens[1], Token::Close { tag, .. } if tag == "root"));
    }

    #[test]
    fn reports_unterminated_constructs_with_offsets() {
        let (tokens, error) = collect("<a><b x=\"oops></b></a>");
        assert_eq!(tokens.len(), 1);
        assert_eq!(error, Some(ParseError::UnterminatedAttribute { offset: 8 }));

        let (_, error) = collect("<a><!-- never");
        assert_eq!(error, Some(ParseError::UnterminatedComment { offset: 3 }));

        let (_, error) = collect("<a");
        assert_eq!(error, Some(ParseError::UnterminatedTag { offset: 0 }));

        let (_, error) = collect("< a>");
        assert_eq!(
            error,
            Some(ParseError::Unexpected {
                found: ' ',
                offset: 1
            })
        );
    }
}
