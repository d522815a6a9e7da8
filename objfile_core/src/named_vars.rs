use derive_more::Deref;
use serde::Deserialize;

use crate::FromValueCell;
use crate::ObjfileError;
use crate::ObjfileResult;
use crate::PredefinedValues;
use crate::ValueCell;
use crate::ValueKind;

/// Separator written between a variable name and its values.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub enum TextSeparator {
	/// `name = value;`
	#[default]
	#[serde(rename = "=")]
	Equals,
	/// `name: value;`
	#[serde(rename = ":")]
	Colon,
}

/// A name bound to one or more values.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValueList {
	name: String,
	values: Vec<ValueCell>,
}

impl NamedValueList {
	pub fn new(name: impl Into<String>, value: impl Into<ValueCell>) -> Self {
		Self {
			name: name.into(),
			values: vec![value.into()],
		}
	}

	pub fn with_values(name: impl Into<String>, values: Vec<ValueCell>) -> ObjfileResult<Self> {
		let name = name.into();

		if values.is_empty() {
			return Err(ObjfileError::EmptyValueList(name));
		}

		Ok(Self { name, values })
	}

	/// Parse a single variable line unit.
	///
	/// Accepted shapes:
	///
	/// ```text
	/// Width = 1280;
	/// Width: 1280
	/// Color = [0.1, 4, true, "lol"];
	/// Color = [[0.1], [4], [true], ["lol"]];
	/// ```
	pub fn from_line(line: &str, predefined: &PredefinedValues) -> ObjfileResult<Self> {
		let invalid = |reason: &str| {
			ObjfileError::InvalidLine {
				line: line.to_string(),
				reason: reason.to_string(),
			}
		};

		let trimmed = line.trim();
		let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
		let split_at = find_top_level(trimmed, |c| c == '=' || c == ':')
			.ok_or_else(|| invalid("missing `=` or `:` after the name"))?;
		let name = trimmed[..split_at].trim();
		let raw_value = trimmed[split_at + 1..].trim();

		if name.is_empty() {
			return Err(invalid("missing variable name"));
		}

		if raw_value.is_empty() {
			return Err(invalid("missing value"));
		}

		let tokens = match raw_value
			.strip_prefix('[')
			.and_then(|inner| inner.strip_suffix(']'))
		{
			Some(inner) => {
				split_top_level(inner, |c| c == ',')
					.into_iter()
					.map(str::trim)
					.map(|token| {
						token
							.strip_prefix('[')
							.and_then(|inner| inner.strip_suffix(']'))
							.map_or(token, str::trim)
					})
					.collect()
			}
			None => vec![raw_value],
		};

		let values = tokens
			.into_iter()
			.map(|token| ValueCell::parse_literal(token, predefined))
			.collect::<ObjfileResult<Vec<_>>>()
			.map_err(|error| invalid(&error.to_string()))?;

		Self::with_values(name, values).map_err(|error| invalid(&error.to_string()))
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn rename(&mut self, name: impl Into<String>) {
		self.name = name.into();
	}

	pub fn values(&self) -> &[ValueCell] {
		&self.values
	}

	pub fn values_mut(&mut self) -> &mut [ValueCell] {
		&mut self.values
	}

	pub fn set_values(&mut self, values: Vec<ValueCell>) -> ObjfileResult<()> {
		if values.is_empty() {
			return Err(ObjfileError::EmptyValueList(self.name.clone()));
		}

		self.values = values;
		Ok(())
	}

	pub fn push(&mut self, value: impl Into<ValueCell>) {
		self.values.push(value.into());
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn first(&self) -> &ValueCell {
		&self.values[0]
	}

	pub fn value(&self, index: usize) -> ObjfileResult<&ValueCell> {
		self.values.get(index).ok_or(ObjfileError::OutOfRange {
			kind: "value",
			index,
			len: self.values.len(),
		})
	}

	pub fn convert<T: FromValueCell>(&self, index: usize) -> ObjfileResult<T> {
		self.value(index)?.convert_to()
	}

	/// The kind shared by every value, if they all agree.
	pub fn common_kind(&self) -> Option<ValueKind> {
		let kind = self.first().kind();
		self.values
			.iter()
			.all(|value| value.kind() == kind)
			.then_some(kind)
	}

	pub fn can_all_convert<T: FromValueCell>(&self) -> bool {
		self.values.iter().all(ValueCell::can_convert_to::<T>)
	}

	/// Render as a source line. Lists with more than one value are always
	/// bracketed.
	pub fn to_text(&self, separator: TextSeparator, bracketed: bool) -> String {
		let separator = match separator {
			TextSeparator::Equals => " = ",
			TextSeparator::Colon => ": ",
		};

		let body = if bracketed || self.values.len() > 1 {
			let items = self
				.values
				.iter()
				.map(|value| format!("[{}]", value_to_source(value)))
				.collect::<Vec<_>>()
				.join(", ");
			format!("[{items}]")
		} else {
			value_to_source(self.first())
		};

		format!("{}{separator}{body};", self.name)
	}
}

/// Insertion ordered variables with unique names.
#[derive(Debug, Clone, Default, PartialEq, Deref)]
pub struct NamedVars {
	#[deref]
	entries: Vec<NamedValueList>,
}

impl NamedVars {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse `;` or newline separated variable lines. Lines starting with
	/// `//` are comments. Lines that fail to parse or repeat an earlier name
	/// are skipped with a warning.
	pub fn from_data_dump(text: &str, predefined: &PredefinedValues) -> Self {
		let mut vars = Self::new();

		// `//` comments cover a whole physical line.
		let units = text
			.lines()
			.map(str::trim)
			.filter(|line| !line.starts_with("//"))
			.flat_map(|line| split_top_level(line, |c| c == ';'));

		for unit in units {
			let unit = unit.trim();

			if unit.is_empty() {
				continue;
			}

			match NamedValueList::from_line(unit, predefined) {
				Ok(list) => {
					if let Err(list) = vars.add_list(list) {
						tracing::warn!(name = list.name(), "skipping duplicate variable in data dump");
					}
				}
				Err(error) => {
					tracing::warn!(%error, "skipping invalid line in data dump");
				}
			}
		}

		vars
	}

	/// Add a single valued variable. Returns `false` and leaves the
	/// collection untouched when the name is taken.
	pub fn add(&mut self, name: impl Into<String>, value: impl Into<ValueCell>) -> bool {
		self.add_list(NamedValueList::new(name, value)).is_ok()
	}

	/// Add a multi valued variable. Returns `false` when the name is taken or
	/// `values` is empty.
	pub fn add_values(&mut self, name: impl Into<String>, values: Vec<ValueCell>) -> bool {
		NamedValueList::with_values(name, values).is_ok_and(|list| self.add_list(list).is_ok())
	}

	/// Add a prebuilt list, handing it back when the name is taken.
	pub fn add_list(&mut self, list: NamedValueList) -> Result<(), NamedValueList> {
		if self.find(list.name()).is_some() {
			return Err(list);
		}

		self.entries.push(list);
		Ok(())
	}

	/// Replace the variable with the same name in place, or append it.
	pub fn set(&mut self, list: NamedValueList) {
		match self.find(list.name()) {
			Some(index) => self.entries[index] = list,
			None => self.entries.push(list),
		}
	}

	pub fn find(&self, name: &str) -> Option<usize> {
		self.entries.iter().position(|list| list.name() == name)
	}

	/// Remove by position. Later entries keep their relative order.
	pub fn remove(&mut self, index: usize) -> ObjfileResult<NamedValueList> {
		if index >= self.entries.len() {
			return Err(ObjfileError::OutOfRange {
				kind: "variable",
				index,
				len: self.entries.len(),
			});
		}

		Ok(self.entries.remove(index))
	}

	pub fn remove_by_name(&mut self, name: &str) -> Option<NamedValueList> {
		let index = self.find(name)?;
		Some(self.entries.remove(index))
	}

	pub fn get_list(&self, name: &str) -> Option<&NamedValueList> {
		self.entries.iter().find(|list| list.name() == name)
	}

	pub fn get_list_mut(&mut self, name: &str) -> Option<&mut NamedValueList> {
		self.entries.iter_mut().find(|list| list.name() == name)
	}

	pub fn at(&self, index: usize) -> ObjfileResult<&NamedValueList> {
		self.entries.get(index).ok_or(ObjfileError::OutOfRange {
			kind: "variable",
			index,
			len: self.entries.len(),
		})
	}

	pub fn first_value(&self, name: &str) -> ObjfileResult<&ValueCell> {
		self.get_list(name)
			.map(NamedValueList::first)
			.ok_or_else(|| not_found(name))
	}

	/// Convert the first value of `name` into `T`.
	pub fn get_and_convert<T: FromValueCell>(&self, name: &str) -> ObjfileResult<T> {
		self.first_value(name)?.convert_to()
	}

	/// Like [`Self::get_and_convert`] but falls back to `default` when the
	/// variable is missing or does not convert.
	pub fn get_or<T: FromValueCell>(&self, name: &str, default: T) -> T {
		match self.get_and_convert(name) {
			Ok(value) => value,
			Err(error) => {
				tracing::debug!(name, %error, "using default value");
				default
			}
		}
	}

	pub fn value_count(&self, name: &str) -> Option<usize> {
		self.get_list(name).map(NamedValueList::len)
	}

	pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
		self.get_list(name).map(|list| list.first().kind())
	}

	pub fn common_kind_of(&self, name: &str) -> Option<ValueKind> {
		self.get_list(name).and_then(NamedValueList::common_kind)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(NamedValueList::name)
	}

	pub(crate) fn entries_mut(&mut self) -> &mut [NamedValueList] {
		&mut self.entries
	}

	pub fn to_text(&self, separator: TextSeparator, bracketed: bool) -> String {
		self.entries
			.iter()
			.map(|list| list.to_text(separator, bracketed))
			.collect::<Vec<_>>()
			.join("\n")
	}
}

/// Collects lists in order. A list whose name is already taken is dropped
/// with a warning.
impl FromIterator<NamedValueList> for NamedVars {
	fn from_iter<I: IntoIterator<Item = NamedValueList>>(iter: I) -> Self {
		let mut vars = Self::new();

		for list in iter {
			if let Err(list) = vars.add_list(list) {
				tracing::warn!(name = list.name(), "dropping duplicate variable");
			}
		}

		vars
	}
}

impl<'a> IntoIterator for &'a NamedVars {
	type IntoIter = std::slice::Iter<'a, NamedValueList>;
	type Item = &'a NamedValueList;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}

fn not_found(name: &str) -> ObjfileError {
	ObjfileError::NotFound {
		kind: "variable",
		name: name.to_string(),
	}
}

/// Quote a string for source text.
pub(crate) fn quote(text: &str) -> String {
	let mut quoted = String::with_capacity(text.len() + 2);
	quoted.push('"');

	for c in text.chars() {
		if matches!(c, '"' | '\\') {
			quoted.push('\\');
		}

		quoted.push(c);
	}

	quoted.push('"');
	quoted
}

/// Source form of a value. Wide strings are written as `L"..."`.
fn value_to_source(value: &ValueCell) -> String {
	match value {
		ValueCell::NarrowString(text) => quote(text),
		ValueCell::WideString(_) => format!("L{}", quote(&value.to_display_string())),
		_ => value.to_display_string(),
	}
}

/// Position of the first char matching `is_target` outside quotes and
/// brackets.
fn find_top_level(text: &str, is_target: impl Fn(char) -> bool) -> Option<usize> {
	let mut depth = 0usize;
	let mut in_quotes = false;
	let mut escaped = false;

	for (index, c) in text.char_indices() {
		if in_quotes {
			match c {
				_ if escaped => escaped = false,
				'\\' => escaped = true,
				'"' => in_quotes = false,
				_ => {}
			}
			continue;
		}

		match c {
			'"' => in_quotes = true,
			'[' => depth += 1,
			']' => depth = depth.saturating_sub(1),
			_ if depth == 0 && is_target(c) => return Some(index),
			_ => {}
		}
	}

	None
}

/// Split on every char matching `is_separator` outside quotes and brackets.
fn split_top_level(text: &str, is_separator: impl Fn(char) -> bool) -> Vec<&str> {
	let mut pieces = Vec::new();
	let mut rest = text;

	while let Some(index) = find_top_level(rest, &is_separator) {
		pieces.push(&rest[..index]);
		rest = &rest[index + 1..];
	}

	pieces.push(rest);
	pieces
}
