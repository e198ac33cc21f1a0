use a2l::block::Block;
use a2l::parser::lexer::{join_unquoted, parse_int, parse_number, unquote};
use serde::Serialize;

/// Positional reader over a block's tokenized content lines.
///
/// Every `next_*` call consumes exactly one non-blank line, whether or not the
/// field it asks for decodes. Running past the end yields `None`.
pub struct LineCursor {
    lines: Vec<Vec<String>>,
    position: usize,
}

impl LineCursor {
    pub fn new(block: &Block) -> Self {
        LineCursor {
            lines: block.token_lines(),
            position: 0,
        }
    }

    /// The entity name: the first header argument, or the first token of the
    /// first content line when the header carries no arguments.
    pub fn take_name(&mut self, block: &Block) -> String {
        match block.first_argument() {
            Some(name) => unquote(name).to_string(),
            None => self.next_token().unwrap_or_default(),
        }
    }

    pub fn peek(&self) -> Option<&[String]> {
        self.lines.get(self.position).map(Vec::as_slice)
    }

    pub fn advance(&mut self) {
        if self.position < self.lines.len() {
            self.position += 1;
        }
    }

    pub fn next_line(&mut self) -> Option<&[String]> {
        let line = self.lines.get(self.position)?;
        self.position += 1;
        Some(line)
    }

    /// First token of the next line, unquoted.
    pub fn next_token(&mut self) -> Option<String> {
        self.next_line()
            .and_then(|line| line.first())
            .map(|token| unquote(token).to_string())
    }

    /// All tokens of the next line joined and unquoted, for description fields.
    pub fn next_text(&mut self) -> Option<String> {
        self.next_line().map(join_unquoted)
    }

    pub fn next_int(&mut self) -> Option<i64> {
        self.next_line()
            .and_then(|line| line.first())
            .and_then(|token| parse_int(token))
    }

    pub fn next_number(&mut self) -> Option<f64> {
        self.next_line()
            .and_then(|line| line.first())
            .and_then(|token| parse_number(token))
    }

    /// Lines not yet consumed.
    pub fn rest(&self) -> &[Vec<String>] {
        self.lines.get(self.position..).unwrap_or_default()
    }
}

/// A `SYMBOL_LINK "symbol" offset` reference into the linker map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolLink {
    pub symbol: String,
    pub offset: i64,
}

impl SymbolLink {
    /// Decode the tokens after the keyword. The offset falls back to zero.
    pub fn from_tokens(tokens: &[String]) -> Option<Self> {
        let symbol = tokens.first()?;
        Some(SymbolLink {
            symbol: unquote(symbol).to_string(),
            offset: tokens.get(1).and_then(|t| parse_int(t)).unwrap_or(0),
        })
    }
}

/// Keyword fields that may trail the positional prefix of axes,
/// measurements and characteristics. Later occurrences overwrite earlier ones.
#[derive(Debug, Default)]
pub struct Annotations {
    pub byte_order: Option<String>,
    pub format: Option<String>,
    pub symbol_link: Option<SymbolLink>,
}

impl Annotations {
    /// Absorb one trailing line. Returns `false` when its leading token is not
    /// one of the shared keywords.
    pub fn absorb(&mut self, line: &[String]) -> bool {
        let Some((keyword, values)) = line.split_first() else {
            return false;
        };
        match keyword.to_ascii_uppercase().as_str() {
            "BYTE_ORDER" => {
                if let Some(value) = values.first() {
                    self.byte_order = Some(unquote(value).to_string());
                }
            }
            "FORMAT" => {
                if let Some(value) = values.first() {
                    self.format = Some(unquote(value).to_string());
                }
            }
            "SYMBOL_LINK" => {
                if let Some(link) = SymbolLink::from_tokens(values) {
                    self.symbol_link = Some(link);
                }
            }
            _ => return false,
        }
        true
    }
}
