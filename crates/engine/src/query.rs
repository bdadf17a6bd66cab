use std::str::FromStr;

use serde_json::{Map, Number, Value};

use crate::{Document, EngineError};

/// Parsed form of `SELECT <projection> FROM <collection> [WHERE ..] [LIMIT n] [OFFSET n]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
	pub projection: Projection,
	pub collection: String,
	pub filter: Option<Filter>,
	pub limit: Option<usize>,
	pub offset: usize,
}

/// Which part of each document a query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
	/// `$` or `*`.
	Document,
	/// Named fields, keyed by the last path segment in the output.
	Fields(Vec<FieldPath>),
}

/// Dotted path into a document, e.g. `$.address.city`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
	segments: Vec<String>,
}

/// Equality predicate from a `WHERE` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
	pub path: FieldPath,
	pub value: Value,
}

impl FieldPath {
	fn parse(raw: &str, offset: usize) -> Result<Self, EngineError> {
		let trimmed = raw.strip_prefix("$.").unwrap_or(raw);
		let segments: Vec<String> = trimmed.split('.').map(str::to_string).collect();
		if segments
			.iter()
			.any(|segment| segment.is_empty() || segment.contains('$'))
		{
			return Err(EngineError::invalid_query(
				offset,
				format!("malformed field path '{raw}'"),
			));
		}
		Ok(Self { segments })
	}

	/// Output key used when the field is projected.
	pub fn name(&self) -> &str {
		self.segments.last().map(String::as_str).unwrap_or_default()
	}

	pub fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
		self.segments
			.iter()
			.try_fold(document, |value, segment| value.get(segment))
	}
}

impl Projection {
	pub fn apply(&self, document: &Document) -> Document {
		match self {
			Self::Document => document.clone(),
			Self::Fields(fields) => {
				let mut projected = Map::with_capacity(fields.len());
				for field in fields {
					let value = field.lookup(document).cloned().unwrap_or(Value::Null);
					projected.insert(field.name().to_string(), value);
				}
				Value::Object(projected)
			}
		}
	}
}

impl Filter {
	pub fn matches(&self, document: &Document) -> bool {
		self.path.lookup(document) == Some(&self.value)
	}
}

impl Query {
	pub fn parse(text: &str) -> Result<Self, EngineError> {
		let tokens = tokenize(text)?;
		Parser {
			tokens,
			position: 0,
			end: text.len(),
		}
		.query()
	}
}

impl FromStr for Query {
	type Err = EngineError;

	fn from_str(text: &str) -> Result<Self, Self::Err> {
		Self::parse(text)
	}
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
	Word(String),
	Text(String),
	Number(Number),
	Comma,
	Equals,
	Star,
}

#[derive(Debug, Clone)]
struct Token {
	kind: TokenKind,
	offset: usize,
}

fn is_word_char(ch: char) -> bool {
	ch.is_alphanumeric() || matches!(ch, '_' | '$' | '.')
}

fn tokenize(text: &str) -> Result<Vec<Token>, EngineError> {
	let mut tokens = Vec::new();
	let mut chars = text.char_indices().peekable();

	while let Some(&(offset, ch)) = chars.peek() {
		let kind = match ch {
			c if c.is_whitespace() => {
				chars.next();
				continue;
			}
			',' => {
				chars.next();
				TokenKind::Comma
			}
			'=' => {
				chars.next();
				TokenKind::Equals
			}
			'*' => {
				chars.next();
				TokenKind::Star
			}
			'\'' | '"' => {
				chars.next();
				let mut value = String::new();
				let mut closed = false;
				while let Some((_, next)) = chars.next() {
					match next {
						'\\' => {
							if let Some((_, escaped)) = chars.next() {
								value.push(escaped);
							}
						}
						quote if quote == ch => {
							closed = true;
							break;
						}
						other => value.push(other),
					}
				}
				if !closed {
					return Err(EngineError::invalid_query(offset, "unterminated string"));
				}
				TokenKind::Text(value)
			}
			c if c.is_ascii_digit() || c == '-' => {
				let mut raw = String::new();
				while let Some(&(_, next)) = chars.peek() {
					if next.is_ascii_digit() || matches!(next, '-' | '+' | '.' | 'e' | 'E') {
						raw.push(next);
						chars.next();
					} else {
						break;
					}
				}
				let number = raw
					.parse::<i64>()
					.ok()
					.map(Number::from)
					.or_else(|| raw.parse::<f64>().ok().and_then(Number::from_f64))
					.ok_or_else(|| {
						EngineError::invalid_query(offset, format!("malformed number '{raw}'"))
					})?;
				TokenKind::Number(number)
			}
			c if is_word_char(c) => {
				let mut word = String::new();
				while let Some(&(_, next)) = chars.peek() {
					if !is_word_char(next) {
						break;
					}
					word.push(next);
					chars.next();
				}
				TokenKind::Word(word)
			}
			other => {
				return Err(EngineError::invalid_query(
					offset,
					format!("unexpected character '{other}'"),
				));
			}
		};
		tokens.push(Token { kind, offset });
	}

	Ok(tokens)
}

struct Parser {
	tokens: Vec<Token>,
	position: usize,
	end: usize,
}

impl Parser {
	fn query(mut self) -> Result<Query, EngineError> {
		self.keyword("SELECT")?;
		let projection = self.projection()?;
		self.keyword("FROM")?;
		let collection = self.collection()?;

		let mut filter = None;
		let mut limit = None;
		let mut offset = 0;

		if self.eat_keyword("WHERE") {
			filter = Some(self.filter()?);
		}
		if self.eat_keyword("LIMIT") {
			limit = Some(self.count()?);
		}
		if self.eat_keyword("OFFSET") {
			offset = self.count()?;
		}

		if let Some(token) = self.tokens.get(self.position) {
			return Err(EngineError::invalid_query(
				token.offset,
				"unexpected trailing input",
			));
		}

		Ok(Query {
			projection,
			collection,
			filter,
			limit,
			offset,
		})
	}

	fn next(&mut self) -> Option<Token> {
		let token = self.tokens.get(self.position).cloned();
		if token.is_some() {
			self.position += 1;
		}
		token
	}

	fn offset(&self) -> usize {
		self.tokens
			.get(self.position)
			.map_or(self.end, |token| token.offset)
	}

	fn eat_keyword(&mut self, keyword: &str) -> bool {
		match self.tokens.get(self.position) {
			Some(Token {
				kind: TokenKind::Word(word),
				..
			}) if word.eq_ignore_ascii_case(keyword) => {
				self.position += 1;
				true
			}
			_ => false,
		}
	}

	fn keyword(&mut self, keyword: &str) -> Result<(), EngineError> {
		if self.eat_keyword(keyword) {
			Ok(())
		} else {
			Err(EngineError::invalid_query(
				self.offset(),
				format!("expected {keyword}"),
			))
		}
	}

	fn projection(&mut self) -> Result<Projection, EngineError> {
		let offset = self.offset();
		match self.next().map(|token| token.kind) {
			Some(TokenKind::Star) => return Ok(Projection::Document),
			Some(TokenKind::Word(word)) if word == "$" => return Ok(Projection::Document),
			Some(TokenKind::Word(word)) if !word.eq_ignore_ascii_case("FROM") => {
				let mut fields = vec![FieldPath::parse(&word, offset)?];
				while self
					.tokens
					.get(self.position)
					.is_some_and(|token| token.kind == TokenKind::Comma)
				{
					self.position += 1;
					let offset = self.offset();
					match self.next().map(|token| token.kind) {
						Some(TokenKind::Word(word)) => fields.push(FieldPath::parse(&word, offset)?),
						_ => {
							return Err(EngineError::invalid_query(
								offset,
								"expected field after ','",
							));
						}
					}
				}
				Ok(Projection::Fields(fields))
			}
			_ => Err(EngineError::invalid_query(offset, "expected projection")),
		}
	}

	fn collection(&mut self) -> Result<String, EngineError> {
		let offset = self.offset();
		match self.next().map(|token| token.kind) {
			Some(TokenKind::Word(name)) if !name.contains('.') => Ok(name),
			_ => Err(EngineError::invalid_query(offset, "expected collection name")),
		}
	}

	fn filter(&mut self) -> Result<Filter, EngineError> {
		let offset = self.offset();
		let path = match self.next().map(|token| token.kind) {
			Some(TokenKind::Word(word)) => FieldPath::parse(&word, offset)?,
			_ => return Err(EngineError::invalid_query(offset, "expected field")),
		};

		let offset = self.offset();
		if self.next().map(|token| token.kind) != Some(TokenKind::Equals) {
			return Err(EngineError::invalid_query(offset, "expected '='"));
		}

		let offset = self.offset();
		let value = match self.next().map(|token| token.kind) {
			Some(TokenKind::Text(text)) => Value::String(text),
			Some(TokenKind::Number(number)) => Value::Number(number),
			Some(TokenKind::Word(word)) if word.eq_ignore_ascii_case("true") => Value::Bool(true),
			Some(TokenKind::Word(word)) if word.eq_ignore_ascii_case("false") => Value::Bool(false),
			Some(TokenKind::Word(word)) if word.eq_ignore_ascii_case("null") => Value::Null,
			_ => return Err(EngineError::invalid_query(offset, "expected literal")),
		};

		Ok(Filter { path, value })
	}

	fn count(&mut self) -> Result<usize, EngineError> {
		let offset = self.offset();
		match self.next().map(|token| token.kind) {
			Some(TokenKind::Number(number)) => number
				.as_u64()
				.and_then(|value| usize::try_from(value).ok())
				.ok_or_else(|| EngineError::invalid_query(offset, "expected non-negative integer")),
			_ => Err(EngineError::invalid_query(offset, "expected non-negative integer")),
		}
	}
}
