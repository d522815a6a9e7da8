use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ObjfileError {
	#[error(transparent)]
	#[diagnostic(code(objfile::io_error))]
	Io(#[from] std::io::Error),

	#[error("no {kind} named `{name}`")]
	#[diagnostic(code(objfile::not_found))]
	NotFound { kind: &'static str, name: String },

	#[error("{kind} index {index} is out of range (length {len})")]
	#[diagnostic(code(objfile::out_of_range))]
	OutOfRange {
		kind: &'static str,
		index: usize,
		len: usize,
	},

	#[error("{kind} name `{name}` is already in use")]
	#[diagnostic(
		code(objfile::name_collision),
		help("names must be unique within their container")
	)]
	NameCollision { kind: &'static str, name: String },

	#[error("template `{template}` expects {expected} argument(s) but got {got}")]
	#[diagnostic(
		code(objfile::arity_mismatch),
		help("pass exactly one argument for each template parameter")
	)]
	ArityMismatch {
		template: String,
		expected: usize,
		got: usize,
	},

	#[error("no template definition named `{0}`")]
	#[diagnostic(
		code(objfile::unresolved_template),
		help("define `template {0}(...)` somewhere in the same document")
	)]
	UnresolvedTemplate(String),

	#[error("cannot convert {from} value `{value}` to {to}")]
	#[diagnostic(code(objfile::conversion))]
	Conversion {
		from: &'static str,
		to: &'static str,
		value: String,
	},

	#[error("value list `{0}` must hold at least one value")]
	#[diagnostic(code(objfile::empty_value_list))]
	EmptyValueList(String),

	#[error("invalid variable line `{line}`: {reason}")]
	#[diagnostic(
		code(objfile::invalid_line),
		help("variable lines look like `name = value;` or `name = [[a], [b]];`")
	)]
	InvalidLine { line: String, reason: String },

	#[error("invalid value literal `{0}`")]
	#[diagnostic(code(objfile::invalid_literal))]
	InvalidLiteral(String),

	#[error("invalid parameter `{parameter}` for template `{template}`")]
	#[diagnostic(
		code(objfile::invalid_template_parameter),
		help("template parameters must be non-empty and unique")
	)]
	InvalidTemplateParameter { template: String, parameter: String },

	#[error("malformed packet at byte {offset}: {reason}")]
	#[diagnostic(code(objfile::invalid_packet))]
	InvalidPacket { offset: usize, reason: String },

	#[error("value list `{name}` holds {count} values, the packet limit is {max}")]
	#[diagnostic(
		code(objfile::packet_too_large),
		help("raise `wire.max_values_per_list` in objfile.toml")
	)]
	PacketTooLarge {
		name: String,
		count: usize,
		max: usize,
	},

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(objfile::config_parse),
		help("check that objfile.toml is valid TOML with [values], [wire] and/or [writer] sections")
	)]
	ConfigParse(String),
}

pub type ObjfileResult<T> = Result<T, ObjfileError>;

/// Failure of a whole template expansion pass.
///
/// Identifies the first template instance that could not be expanded. The
/// document is left exactly as it was before the pass started.
#[derive(Debug, Diagnostic, Error)]
#[error("failed to expand template instance #{index} of `{template}`")]
#[diagnostic(code(objfile::expansion))]
pub struct ExpansionError {
	/// Position of the instance in the document's instance list.
	pub index: usize,
	pub template: String,
	#[source]
	pub cause: Box<ObjfileError>,
}

impl ExpansionError {
	pub fn new(index: usize, template: impl Into<String>, cause: ObjfileError) -> Self {
		Self {
			index,
			template: template.into(),
			cause: Box::new(cause),
		}
	}

	pub fn cause(&self) -> &ObjfileError {
		&self.cause
	}
}
