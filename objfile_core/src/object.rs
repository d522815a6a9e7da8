use std::collections::HashSet;

use crate::NamedVars;
use crate::ObjfileError;
use crate::ObjfileResult;
use crate::ValueCell;

/// Named block of raw text lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBlock {
	name: String,
	lines: Vec<String>,
}

impl TextBlock {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			lines: Vec::new(),
		}
	}

	pub fn with_lines<I, S>(name: impl Into<String>, lines: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			name: name.into(),
			lines: lines.into_iter().map(Into::into).collect(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn add_line(&mut self, line: impl Into<String>) {
		self.lines.push(line.into());
	}

	pub fn line(&self, index: usize) -> ObjfileResult<&str> {
		self.lines
			.get(index)
			.map(String::as_str)
			.ok_or(ObjfileError::OutOfRange {
				kind: "line",
				index,
				len: self.lines.len(),
			})
	}

	pub fn line_count(&self) -> usize {
		self.lines.len()
	}

	pub fn lines(&self) -> &[String] {
		&self.lines
	}

	pub(crate) fn map_text(&self, substitute: impl Fn(&str) -> String) -> Self {
		Self {
			name: substitute(&self.name),
			lines: self.lines.iter().map(|line| substitute(line)).collect(),
		}
	}
}

/// A named group of variables inside an object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectList {
	name: String,
	vars: NamedVars,
}

impl ObjectList {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			vars: NamedVars::new(),
		}
	}

	pub fn with_vars(name: impl Into<String>, vars: NamedVars) -> Self {
		Self {
			name: name.into(),
			vars,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn vars(&self) -> &NamedVars {
		&self.vars
	}

	pub fn vars_mut(&mut self) -> &mut NamedVars {
		&mut self.vars
	}

	pub(crate) fn rename(&mut self, name: String) {
		self.name = name;
	}
}

/// Handle to a script unit attached to an object. The script is never run
/// here, only carried along.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptRef {
	pub module: String,
	pub source_file: String,
	/// Line in `source_file` where the script body starts.
	pub start_line: usize,
	pub source: String,
}

impl ScriptRef {
	pub fn new(
		module: impl Into<String>,
		source_file: impl Into<String>,
		start_line: usize,
		source: impl Into<String>,
	) -> Self {
		Self {
			module: module.into(),
			source_file: source_file.into(),
			start_line,
			source: source.into(),
		}
	}
}

/// A named, typed node of an object file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectDefinition {
	name: String,
	type_name: String,
	prefixes: Vec<String>,
	lists: Vec<ObjectList>,
	text_blocks: Vec<TextBlock>,
	script: Option<ScriptRef>,
	template_generated: bool,
}

impl ObjectDefinition {
	pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			type_name: type_name.into(),
			..Self::default()
		}
	}

	pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.prefixes = prefixes.into_iter().map(Into::into).collect();
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	pub fn prefixes(&self) -> &[String] {
		&self.prefixes
	}

	pub fn prefix(&self, index: usize) -> ObjfileResult<&str> {
		self.prefixes
			.get(index)
			.map(String::as_str)
			.ok_or(ObjfileError::OutOfRange {
				kind: "prefix",
				index,
				len: self.prefixes.len(),
			})
	}

	pub fn add_prefix(&mut self, prefix: impl Into<String>) {
		self.prefixes.push(prefix.into());
	}

	/// Attach a list. On a name collision the list is handed back unchanged.
	pub fn add_list(&mut self, list: ObjectList) -> Result<(), ObjectList> {
		if self.get_list_by_name(list.name()).is_some() {
			return Err(list);
		}

		self.lists.push(list);
		Ok(())
	}

	pub fn get_list_by_name(&self, name: &str) -> Option<&ObjectList> {
		self.lists.iter().find(|list| list.name() == name)
	}

	pub fn get_list_by_name_mut(&mut self, name: &str) -> Option<&mut ObjectList> {
		self.lists.iter_mut().find(|list| list.name() == name)
	}

	pub fn get_list(&self, index: usize) -> ObjfileResult<&ObjectList> {
		self.lists.get(index).ok_or(ObjfileError::OutOfRange {
			kind: "list",
			index,
			len: self.lists.len(),
		})
	}

	pub fn list_count(&self) -> usize {
		self.lists.len()
	}

	pub fn lists(&self) -> &[ObjectList] {
		&self.lists
	}

	/// Attach a text block. On a name collision the block is handed back
	/// unchanged.
	pub fn add_text_block(&mut self, block: TextBlock) -> Result<(), TextBlock> {
		if self.get_text_block_by_name(block.name()).is_some() {
			return Err(block);
		}

		self.text_blocks.push(block);
		Ok(())
	}

	pub fn get_text_block_by_name(&self, name: &str) -> Option<&TextBlock> {
		self.text_blocks.iter().find(|block| block.name() == name)
	}

	pub fn get_text_block(&self, index: usize) -> ObjfileResult<&TextBlock> {
		self.text_blocks.get(index).ok_or(ObjfileError::OutOfRange {
			kind: "text block",
			index,
			len: self.text_blocks.len(),
		})
	}

	pub fn text_block_count(&self) -> usize {
		self.text_blocks.len()
	}

	pub fn text_blocks(&self) -> &[TextBlock] {
		&self.text_blocks
	}

	/// Set the script, replacing any earlier one.
	pub fn set_script(&mut self, script: ScriptRef) {
		if let Some(previous) = &self.script {
			tracing::warn!(
				object = %self.name,
				previous = %previous.module,
				"replacing script already attached to object"
			);
		}

		self.script = Some(script);
	}

	pub fn script(&self) -> Option<&ScriptRef> {
		self.script.as_ref()
	}

	pub fn is_template_generated(&self) -> bool {
		self.template_generated
	}

	/// Deep copy with every text field passed through `substitute`. String
	/// values are rewritten in place and keep their variant; other values are
	/// copied untouched. Fails when the rewrite makes two lists, two text
	/// blocks or two variables of one list share a name.
	pub(crate) fn instantiate_with(
		&self,
		substitute: impl Fn(&str) -> String,
	) -> ObjfileResult<Self> {
		let mut lists = Vec::with_capacity(self.lists.len());

		for list in &self.lists {
			let mut list = list.clone();
			let name = substitute(list.name());
			list.rename(name);

			for entry in list.vars_mut().entries_mut() {
				let name = substitute(entry.name());
				entry.rename(name);

				for value in entry.values_mut() {
					substitute_value(value, &substitute);
				}
			}

			if let Some(name) = first_duplicate(list.vars().names()) {
				return Err(collision("variable", name));
			}

			lists.push(list);
		}

		if let Some(name) = first_duplicate(lists.iter().map(ObjectList::name)) {
			return Err(collision("list", name));
		}

		let text_blocks: Vec<_> = self
			.text_blocks
			.iter()
			.map(|block| block.map_text(&substitute))
			.collect();

		if let Some(name) = first_duplicate(text_blocks.iter().map(TextBlock::name)) {
			return Err(collision("text block", name));
		}

		let script = self.script.as_ref().map(|script| {
			ScriptRef {
				source: substitute(&script.source),
				..script.clone()
			}
		});

		Ok(Self {
			name: substitute(&self.name),
			type_name: substitute(&self.type_name),
			prefixes: self.prefixes.iter().map(|prefix| substitute(prefix)).collect(),
			lists,
			text_blocks,
			script,
			template_generated: true,
		})
	}
}

fn substitute_value(value: &mut ValueCell, substitute: impl Fn(&str) -> String) {
	match value {
		ValueCell::NarrowString(text) => *text = substitute(text),
		ValueCell::WideString(units) => {
			// Unpaired surrogates are left alone rather than replaced lossily.
			if let Ok(text) = String::from_utf16(units) {
				*units = substitute(&text).encode_utf16().collect();
			}
		}
		ValueCell::Int(_) | ValueCell::Float(_) | ValueCell::Bool(_) => {}
	}
}

fn first_duplicate<'a>(mut names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
	let mut seen = HashSet::new();
	names.find(|name| !seen.insert(*name))
}

fn collision(kind: &'static str, name: &str) -> ObjfileError {
	ObjfileError::NameCollision {
		kind,
		name: name.to_string(),
	}
}
