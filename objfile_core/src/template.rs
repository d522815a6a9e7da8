use std::collections::HashSet;

use crate::ObjectDefinition;
use crate::ObjfileError;
use crate::ObjfileResult;

/// A parameterized object prototype.
///
/// Every occurrence of a parameter name in the prototype's text is replaced
/// by the matching argument when an instance is expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDefinition {
	name: String,
	parameters: Vec<String>,
	prototype: ObjectDefinition,
}

impl TemplateDefinition {
	/// Parameter names must be non-empty and unique.
	pub fn new<I, S>(
		name: impl Into<String>,
		parameters: I,
		prototype: ObjectDefinition,
	) -> ObjfileResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let name = name.into();
		let parameters: Vec<String> = parameters.into_iter().map(Into::into).collect();
		let mut seen = HashSet::new();

		for parameter in &parameters {
			if parameter.is_empty() || !seen.insert(parameter.as_str()) {
				return Err(ObjfileError::InvalidTemplateParameter {
					template: name,
					parameter: parameter.clone(),
				});
			}
		}

		Ok(Self {
			name,
			parameters,
			prototype,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn parameters(&self) -> &[String] {
		&self.parameters
	}

	pub fn arity(&self) -> usize {
		self.parameters.len()
	}

	pub fn prototype(&self) -> &ObjectDefinition {
		&self.prototype
	}

	/// Build a concrete object from `arguments`, bound to parameters by
	/// position.
	pub fn instantiate(&self, arguments: &[String]) -> ObjfileResult<ObjectDefinition> {
		if arguments.len() != self.parameters.len() {
			return Err(ObjfileError::ArityMismatch {
				template: self.name.clone(),
				expected: self.parameters.len(),
				got: arguments.len(),
			});
		}

		self.prototype
			.instantiate_with(|text| substitute_parameters(text, &self.parameters, arguments))
	}
}

/// A request to build one object from a named template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInstance {
	template_name: String,
	arguments: Vec<String>,
}

impl TemplateInstance {
	pub fn new<I, S>(template_name: impl Into<String>, arguments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			template_name: template_name.into(),
			arguments: arguments.into_iter().map(Into::into).collect(),
		}
	}

	pub fn template_name(&self) -> &str {
		&self.template_name
	}

	pub fn arguments(&self) -> &[String] {
		&self.arguments
	}
}

/// Replace parameter names in `text` with the argument at the same position.
///
/// The text is scanned once from left to right. Where several parameters
/// match at the same position the longest one wins. Inserted arguments are
/// never scanned again.
pub fn substitute_parameters(text: &str, parameters: &[String], arguments: &[String]) -> String {
	let mut output = String::with_capacity(text.len());
	let mut rest = text;

	while let Some(c) = rest.chars().next() {
		let matched = parameters
			.iter()
			.zip(arguments)
			.filter(|(parameter, _)| !parameter.is_empty() && rest.starts_with(parameter.as_str()))
			.max_by_key(|(parameter, _)| parameter.len());

		match matched {
			Some((parameter, argument)) => {
				output.push_str(argument);
				rest = &rest[parameter.len()..];
			}
			None => {
				output.push(c);
				rest = &rest[c.len_utf8()..];
			}
		}
	}

	output
}
