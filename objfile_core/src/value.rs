use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use float_cmp::approx_eq;
use serde::Deserialize;
use snailquote::unescape;

use crate::ObjfileError;
use crate::ObjfileResult;

/// Named literal values that bare identifiers resolve to while parsing.
pub type PredefinedValues = BTreeMap<String, ValueCell>;

/// The type of a [`ValueCell`]. The discriminants are the type tags written
/// to the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ValueKind {
	Int = 3,
	Float = 4,
	Bool = 5,
	WideString = 6,
	NarrowString = 7,
}

impl ValueKind {
	pub fn tag(self) -> u16 {
		self as u16
	}

	pub fn from_tag(tag: u16) -> Option<Self> {
		match tag {
			3 => Some(Self::Int),
			4 => Some(Self::Float),
			5 => Some(Self::Bool),
			6 => Some(Self::WideString),
			7 => Some(Self::NarrowString),
			_ => None,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::Int => "int",
			Self::Float => "float",
			Self::Bool => "bool",
			Self::WideString => "wide string",
			Self::NarrowString => "string",
		}
	}

	pub fn is_string(self) -> bool {
		matches!(self, Self::WideString | Self::NarrowString)
	}
}

/// A single dynamically typed value.
///
/// Wide strings keep their UTF-16 code units so they survive a packet round
/// trip untouched, which means reading one back as a Rust [`String`] can
/// fail.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "LiteralValue")]
pub enum ValueCell {
	Int(i64),
	Float(f64),
	Bool(bool),
	NarrowString(String),
	WideString(Vec<u16>),
}

impl PartialEq for ValueCell {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Int(value), Self::Int(other_value)) => value == other_value,
			(Self::Float(value), Self::Float(other_value)) => {
				approx_eq!(f64, *value, *other_value, ulps = 2)
			}
			(Self::Bool(value), Self::Bool(other_value)) => value == other_value,
			(Self::NarrowString(value), Self::NarrowString(other_value)) => value == other_value,
			(Self::WideString(value), Self::WideString(other_value)) => value == other_value,
			_ => false,
		}
	}
}

impl ValueCell {
	/// Build a wide string cell from UTF-8 text.
	pub fn wide(value: &str) -> Self {
		Self::WideString(value.encode_utf16().collect())
	}

	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Int(_) => ValueKind::Int,
			Self::Float(_) => ValueKind::Float,
			Self::Bool(_) => ValueKind::Bool,
			Self::NarrowString(_) => ValueKind::NarrowString,
			Self::WideString(_) => ValueKind::WideString,
		}
	}

	pub fn is_string(&self) -> bool {
		self.kind().is_string()
	}

	/// Borrow the text of a narrow string cell.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::NarrowString(value) => Some(value),
			_ => None,
		}
	}

	/// Convert the held value into `T`, failing with
	/// [`ObjfileError::Conversion`] when no lossless (or documented truncating)
	/// conversion exists.
	pub fn convert_to<T: FromValueCell>(&self) -> ObjfileResult<T> {
		T::from_value_cell(self)
	}

	pub fn can_convert_to<T: FromValueCell>(&self) -> bool {
		self.convert_to::<T>().is_ok()
	}

	/// Canonical text form. Floats always use `.` and carry a fractional part
	/// or exponent, so they never read back as integers.
	pub fn to_display_string(&self) -> String {
		match self {
			Self::Int(value) => value.to_string(),
			Self::Float(value) => format_float(*value),
			Self::Bool(value) => value.to_string(),
			Self::NarrowString(value) => value.clone(),
			Self::WideString(units) => String::from_utf16_lossy(units),
		}
	}

	/// Parse one literal token from source text.
	///
	/// Quoted tokens become narrow strings and `L"..."` tokens wide strings.
	/// `true`/`false` in any case become
	/// bools, then `predefined` is consulted, then numbers are recognized
	/// (a `.` or exponent makes a float). Anything else is kept as a narrow
	/// string of the raw text.
	pub fn parse_literal(token: &str, predefined: &PredefinedValues) -> ObjfileResult<Self> {
		let token = token.trim();

		if token.is_empty() {
			return Err(ObjfileError::InvalidLiteral(token.to_string()));
		}

		if token.starts_with('"') {
			return unescape(token)
				.map(Self::NarrowString)
				.map_err(|_| ObjfileError::InvalidLiteral(token.to_string()));
		}

		if let Some(quoted) = token.strip_prefix('L').filter(|rest| rest.starts_with('"')) {
			return unescape(quoted)
				.map(|text| Self::wide(&text))
				.map_err(|_| ObjfileError::InvalidLiteral(token.to_string()));
		}

		if token.eq_ignore_ascii_case("true") {
			return Ok(Self::Bool(true));
		}

		if token.eq_ignore_ascii_case("false") {
			return Ok(Self::Bool(false));
		}

		if let Some(value) = predefined.get(token) {
			return Ok(value.clone());
		}

		if looks_numeric(token) {
			if let Ok(value) = token.parse::<i64>() {
				return Ok(Self::Int(value));
			}

			if let Ok(value) = token.parse::<f64>() {
				return Ok(Self::Float(value));
			}
		}

		Ok(Self::NarrowString(token.to_string()))
	}

	/// The text held by a string cell. Wide strings are decoded and fail on
	/// unpaired surrogates.
	fn text(&self, to: &'static str) -> ObjfileResult<Cow<'_, str>> {
		match self {
			Self::NarrowString(value) => Ok(Cow::Borrowed(value)),
			Self::WideString(units) => {
				String::from_utf16(units)
					.map(Cow::Owned)
					.map_err(|_| self.conversion_error(to))
			}
			_ => Err(self.conversion_error(to)),
		}
	}

	fn conversion_error(&self, to: &'static str) -> ObjfileError {
		ObjfileError::Conversion {
			from: self.kind().name(),
			to,
			value: self.to_display_string(),
		}
	}
}

impl fmt::Display for ValueCell {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_display_string())
	}
}

impl From<i64> for ValueCell {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for ValueCell {
	fn from(value: i32) -> Self {
		Self::Int(value.into())
	}
}

impl From<u32> for ValueCell {
	fn from(value: u32) -> Self {
		Self::Int(value.into())
	}
}

impl From<f64> for ValueCell {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<f32> for ValueCell {
	fn from(value: f32) -> Self {
		Self::Float(value.into())
	}
}

impl From<bool> for ValueCell {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<&str> for ValueCell {
	fn from(value: &str) -> Self {
		Self::NarrowString(value.to_string())
	}
}

impl From<String> for ValueCell {
	fn from(value: String) -> Self {
		Self::NarrowString(value)
	}
}

/// Scalar shapes accepted for predefined values in `objfile.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LiteralValue {
	Bool(bool),
	Int(i64),
	Float(f64),
	Text(String),
}

impl From<LiteralValue> for ValueCell {
	fn from(value: LiteralValue) -> Self {
		match value {
			LiteralValue::Bool(value) => Self::Bool(value),
			LiteralValue::Int(value) => Self::Int(value),
			LiteralValue::Float(value) => Self::Float(value),
			LiteralValue::Text(value) => Self::NarrowString(value),
		}
	}
}

/// Types a [`ValueCell`] can be read back as.
pub trait FromValueCell: Sized {
	const TYPE_NAME: &'static str;

	fn from_value_cell(cell: &ValueCell) -> ObjfileResult<Self>;
}

macro_rules! impl_from_value_cell_for_integer {
	($($ty:ty),* $(,)?) => {
		$(
			impl FromValueCell for $ty {
				const TYPE_NAME: &'static str = stringify!($ty);

				fn from_value_cell(cell: &ValueCell) -> ObjfileResult<Self> {
					match cell {
						ValueCell::Int(value) => {
							<$ty>::try_from(*value).map_err(|_| cell.conversion_error(Self::TYPE_NAME))
						}
						ValueCell::Float(value) => {
							truncate_float(*value)
								.and_then(|value| <$ty>::try_from(value).ok())
								.ok_or_else(|| cell.conversion_error(Self::TYPE_NAME))
						}
						ValueCell::Bool(value) => Ok(<$ty>::from(*value)),
						ValueCell::NarrowString(_) | ValueCell::WideString(_) => {
							cell.text(Self::TYPE_NAME)?
								.parse::<$ty>()
								.map_err(|_| cell.conversion_error(Self::TYPE_NAME))
						}
					}
				}
			}
		)*
	};
}

impl_from_value_cell_for_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromValueCell for f64 {
	const TYPE_NAME: &'static str = "f64";

	fn from_value_cell(cell: &ValueCell) -> ObjfileResult<Self> {
		match cell {
			ValueCell::Int(value) => Ok(*value as f64),
			ValueCell::Float(value) => Ok(*value),
			ValueCell::Bool(value) => Ok(if *value { 1.0 } else { 0.0 }),
			ValueCell::NarrowString(_) | ValueCell::WideString(_) => {
				cell.text(Self::TYPE_NAME)?
					.parse::<f64>()
					.map_err(|_| cell.conversion_error(Self::TYPE_NAME))
			}
		}
	}
}

impl FromValueCell for f32 {
	const TYPE_NAME: &'static str = "f32";

	fn from_value_cell(cell: &ValueCell) -> ObjfileResult<Self> {
		match cell {
			ValueCell::NarrowString(_) | ValueCell::WideString(_) => {
				cell.text(Self::TYPE_NAME)?
					.parse::<f32>()
					.map_err(|_| cell.conversion_error(Self::TYPE_NAME))
			}
			_ => f64::from_value_cell(cell).map(|value| value as f32),
		}
	}
}

impl FromValueCell for bool {
	const TYPE_NAME: &'static str = "bool";

	fn from_value_cell(cell: &ValueCell) -> ObjfileResult<Self> {
		match cell {
			ValueCell::Int(0) => Ok(false),
			ValueCell::Int(1) => Ok(true),
			ValueCell::Float(value) if approx_eq!(f64, *value, 0.0, ulps = 2) => Ok(false),
			ValueCell::Float(value) if approx_eq!(f64, *value, 1.0, ulps = 2) => Ok(true),
			ValueCell::Bool(value) => Ok(*value),
			ValueCell::NarrowString(_) | ValueCell::WideString(_) => {
				let text = cell.text(Self::TYPE_NAME)?;

				if text.eq_ignore_ascii_case("true") || text == "1" {
					Ok(true)
				} else if text.eq_ignore_ascii_case("false") || text == "0" {
					Ok(false)
				} else {
					Err(cell.conversion_error(Self::TYPE_NAME))
				}
			}
			_ => Err(cell.conversion_error(Self::TYPE_NAME)),
		}
	}
}

impl FromValueCell for String {
	const TYPE_NAME: &'static str = "string";

	fn from_value_cell(cell: &ValueCell) -> ObjfileResult<Self> {
		match cell {
			ValueCell::NarrowString(_) | ValueCell::WideString(_) => {
				cell.text(Self::TYPE_NAME).map(Cow::into_owned)
			}
			_ => Ok(cell.to_display_string()),
		}
	}
}

impl FromValueCell for ValueCell {
	const TYPE_NAME: &'static str = "value";

	fn from_value_cell(cell: &ValueCell) -> ObjfileResult<Self> {
		Ok(cell.clone())
	}
}

/// Truncate toward zero, rejecting values with no `i64` representation.
fn truncate_float(value: f64) -> Option<i64> {
	if !value.is_finite() {
		return None;
	}

	let truncated = value.trunc();

	// `i64::MAX as f64` rounds up to 2^63, which is itself out of range.
	if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
		return None;
	}

	Some(truncated as i64)
}

fn format_float(value: f64) -> String {
	format!("{value:?}")
}

fn looks_numeric(token: &str) -> bool {
	let digits = token.strip_prefix(['-', '+']).unwrap_or(token);

	digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
		&& digits
			.chars()
			.all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
}
