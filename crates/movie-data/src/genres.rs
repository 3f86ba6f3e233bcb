//! Decoding of the `genres` column.
//!
//! The column holds a list of objects written as a Python-style literal,
//! e.g. `[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}]`,
//! or as plain JSON. The text is untrusted, so it is read with a small
//! recursive-descent parser that only understands literal data: lists,
//! tuples, dicts, strings, numbers, booleans and none/null. Anything else
//! (names, calls, operators) is a parse error.
//!
//! [`decode_genres`] never fails: text that does not decode to a list
//! yields an empty genre list and a debug log line.

use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::debug;

/// Maximum nesting of lists/dicts accepted by [`parse_literal`]
const MAX_DEPTH: usize = 64;

/// Why a literal could not be parsed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenreParseError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("unknown name '{name}' at offset {offset}")]
    UnknownName { name: String, offset: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),

    #[error("dict key at offset {0} must be a string or number")]
    InvalidKey(usize),

    #[error("nesting deeper than {} levels", MAX_DEPTH)]
    TooDeep,

    #[error("trailing input at offset {0}")]
    TrailingInput(usize),
}

type ParseResult<T> = std::result::Result<T, GenreParseError>;

/// Decode a `genres` cell into genre names, in source order.
///
/// Elements that are not dicts, or dicts without a string `name`, are
/// skipped. Undecodable text and non-list values produce an empty list.
pub fn decode_genres(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    match parse_literal(trimmed) {
        Ok(Value::Array(items)) => genre_names(items),
        Ok(other) => {
            debug!(kind = value_kind(&other), "genre field is not a list");
            Vec::new()
        }
        Err(e) => {
            debug!(error = %e, "failed to decode genre field");
            Vec::new()
        }
    }
}

/// Encode genre names back into the list-of-objects form the column uses.
///
/// The output is JSON, which [`decode_genres`] reads back unchanged.
pub fn encode_genres(names: &[String]) -> String {
    let items = names
        .iter()
        .map(|name| {
            let mut object = Map::new();
            object.insert("name".to_string(), Value::String(name.clone()));
            Value::Object(object)
        })
        .collect();
    Value::Array(items).to_string()
}

/// Parse a literal data expression into a JSON value.
///
/// Tuples become arrays; dict keys that are numbers are stringified.
pub fn parse_literal(text: &str) -> ParseResult<Value> {
    let mut parser = LiteralParser { src: text, pos: 0 };
    let value = parser.parse_value(0)?;
    parser.skip_whitespace();
    if parser.peek().is_some() {
        return Err(GenreParseError::TrailingInput(parser.pos));
    }
    Ok(value)
}

fn genre_names(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(mut object) => match object.remove("name") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

// =============================================================================
// LiteralParser
// =============================================================================

struct LiteralParser<'a> {
    src: &'a str,
    /// Byte offset of the next unread character
    pos: usize,
}

impl LiteralParser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn unexpected(&self) -> GenreParseError {
        match self.peek() {
            Some(found) => GenreParseError::Unexpected {
                found,
                offset: self.pos,
            },
            None => GenreParseError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, want: char) -> ParseResult<()> {
        if self.peek() == Some(want) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_value(&mut self, depth: usize) -> ParseResult<Value> {
        if depth > MAX_DEPTH {
            return Err(GenreParseError::TooDeep);
        }
        self.skip_whitespace();

        match self.peek() {
            Some('[') => {
                self.bump();
                self.parse_sequence(']', depth).map(Value::Array)
            }
            Some('(') => {
                self.bump();
                self.parse_sequence(')', depth).map(Value::Array)
            }
            Some('{') => {
                self.bump();
                self.parse_dict(depth)
            }
            Some(quote @ ('\'' | '"')) => {
                self.bump();
                self.parse_string(quote).map(Value::String)
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.parse_number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_name(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_sequence(&mut self, close: char, depth: usize) -> ParseResult<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(items);
            }

            items.push(self.parse_value(depth + 1)?);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(c) if c == close => {
                    self.bump();
                    return Ok(items);
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_dict(&mut self, depth: usize) -> ParseResult<Value> {
        let mut object = Map::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(object));
            }

            let key_offset = self.pos;
            let key = match self.parse_value(depth + 1)? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => return Err(GenreParseError::InvalidKey(key_offset)),
            };

            self.skip_whitespace();
            self.expect(':')?;
            let value = self.parse_value(depth + 1)?;
            object.insert(key, value);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {
                    self.bump();
                    return Ok(Value::Object(object));
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    /// Parse the body of a quoted string; the opening quote is consumed.
    fn parse_string(&mut self, quote: char) -> ParseResult<String> {
        let mut out = String::new();
        loop {
            let c = self.bump().ok_or(GenreParseError::UnexpectedEnd)?;
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }

            let escape_offset = self.pos - 1;
            let escaped = self.bump().ok_or(GenreParseError::UnexpectedEnd)?;
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0' => out.push('\0'),
                '/' | '\\' | '\'' | '"' => out.push(escaped),
                // Backslash-newline is a line continuation
                '\n' => {}
                'x' => out.push(self.parse_hex_escape(2, escape_offset)?),
                'u' => out.push(self.parse_hex_escape(4, escape_offset)?),
                'U' => out.push(self.parse_hex_escape(8, escape_offset)?),
                // Unknown escapes are kept verbatim
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }

    fn parse_hex_escape(&mut self, digits: usize, offset: usize) -> ParseResult<char> {
        let start = self.pos;
        for _ in 0..digits {
            match self.bump() {
                Some(c) if c.is_ascii_hexdigit() => {}
                _ => return Err(GenreParseError::InvalidEscape(offset)),
            }
        }
        u32::from_str_radix(&self.src[start..self.pos], 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(GenreParseError::InvalidEscape(offset))
    }

    fn parse_number(&mut self) -> ParseResult<Value> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.' | '_'))
        {
            self.bump();
        }

        let raw = &self.src[start..self.pos];
        let cleaned: String = raw.chars().filter(|&c| c != '_').collect();
        if let Ok(int) = cleaned.parse::<i64>() {
            return Ok(Value::from(int));
        }
        cleaned
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| GenreParseError::InvalidNumber(raw.to_string()))
    }

    fn parse_name(&mut self) -> ParseResult<Value> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.bump();
        }

        match &self.src[start..self.pos] {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            name => Err(GenreParseError::UnknownName {
                name: name.to_string(),
                offset: start,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_python_literal() {
        let text = "[{'id': 16, 'name': 'Animation'}, {'id': 35, 'name': 'Comedy'}, {'id': 10751, 'name': 'Family'}]";
        assert_eq!(decode_genres(text), vec!["Animation", "Comedy", "Family"]);
    }

    #[test]
    fn test_decode_json() {
        let text = r#"[{"name": "Comedy"}, {"name": "Drama"}]"#;
        assert_eq!(decode_genres(text), vec!["Comedy", "Drama"]);
    }

    #[test]
    fn test_decode_empty_and_blank() {
        assert!(decode_genres("").is_empty());
        assert!(decode_genres("   ").is_empty());
        assert!(decode_genres("[]").is_empty());
    }

    #[test]
    fn test_decode_garbage_is_empty() {
        assert!(decode_genres("not a list").is_empty());
        assert!(decode_genres("[{'name': 'Comedy'}").is_empty());
        assert!(decode_genres("{'name': 'Comedy'}").is_empty());
        assert!(decode_genres("42").is_empty());
    }

    #[test]
    fn test_decode_skips_non_dict_elements() {
        let text = "['Comedy', {'name': 'Drama'}, 3, None, {'id': 1}, {'name': 7}]";
        assert_eq!(decode_genres(text), vec!["Drama"]);
    }

    #[test]
    fn test_code_is_rejected() {
        let err = parse_literal("__import__('os').system('echo hi')").unwrap_err();
        assert!(matches!(err, GenreParseError::UnknownName { ref name, offset: 0 } if name == "__import__"));
        assert!(decode_genres("[{'name': open('/etc/passwd').read()}]").is_empty());
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_literal("True").unwrap(), json!(true));
        assert_eq!(parse_literal("null").unwrap(), json!(null));
        assert_eq!(parse_literal("-12").unwrap(), json!(-12));
        assert_eq!(parse_literal("2.5e1").unwrap(), json!(25.0));
        assert_eq!(parse_literal("1_000").unwrap(), json!(1000));
        assert!(matches!(
            parse_literal("1.2.3"),
            Err(GenreParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_parse_string_escapes() {
        assert_eq!(parse_literal(r"'It\'s'").unwrap(), json!("It's"));
        assert_eq!(parse_literal(r#""say \"hi\"""#).unwrap(), json!("say \"hi\""));
        assert_eq!(parse_literal(r"'caf\xe9'").unwrap(), json!("café"));
        assert_eq!(parse_literal(r"'été'").unwrap(), json!("été"));
        assert_eq!(parse_literal(r"'a\qb'").unwrap(), json!("a\\qb"));
        assert_eq!(
            parse_literal(r"'\u12'"),
            Err(GenreParseError::InvalidEscape(1))
        );
    }

    #[test]
    fn test_parse_nested_and_trailing_commas() {
        let value = parse_literal("{'a': [1, (2, 3,),], 5: {'b': None},}").unwrap();
        assert_eq!(value, json!({"a": [1, [2, 3]], "5": {"b": null}}));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_literal("[1, 2"), Err(GenreParseError::UnexpectedEnd));
        assert_eq!(parse_literal("'open"), Err(GenreParseError::UnexpectedEnd));
        assert_eq!(parse_literal("[1] x"), Err(GenreParseError::TrailingInput(4)));
        assert_eq!(
            parse_literal("[1,,2]"),
            Err(GenreParseError::Unexpected {
                found: ',',
                offset: 3
            })
        );
        assert_eq!(
            parse_literal("{[1]: 2}"),
            Err(GenreParseError::InvalidKey(1))
        );
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 2), "]".repeat(MAX_DEPTH + 2));
        assert_eq!(parse_literal(&deep), Err(GenreParseError::TooDeep));

        let ok = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_literal(&ok).is_ok());
    }

    #[test]
    fn test_encode_decodes_back() {
        let names = vec!["Science Fiction".to_string(), "It's \"Noir\"".to_string()];
        let encoded = encode_genres(&names);
        assert_eq!(decode_genres(&encoded), names);
        assert_eq!(encode_genres(&[]), "[]");
    }
}
