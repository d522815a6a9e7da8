use std::fmt::Write;

use crate::NamedVars;
use crate::ObjectDefinition;
use crate::ObjectFileDocument;
use crate::TemplateDefinition;
use crate::TemplateInstance;
use crate::WriterConfig;
use crate::named_vars::quote;

/// Render a document back into object file source.
///
/// Objects produced by template expansion are left out; the template
/// definitions and instances that produce them are written instead, so
/// loading the output and expanding again gives the same document.
pub fn write_document(document: &ObjectFileDocument, config: &WriterConfig) -> String {
	let mut output = String::new();

	write_vars(&mut output, document.header(), config, 0);

	for object in document.objects() {
		if object.is_template_generated() {
			continue;
		}

		separate(&mut output);
		write_object(&mut output, object, config, 0);
	}

	for template in document.templates() {
		separate(&mut output);
		write_template(&mut output, template, config);
	}

	if !document.instances().is_empty() {
		separate(&mut output);

		for instance in document.instances() {
			write_instance(&mut output, instance);
		}
	}

	output
}

fn separate(output: &mut String) {
	if !output.is_empty() {
		output.push('\n');
	}
}

fn indent(output: &mut String, config: &WriterConfig, depth: usize) {
	for _ in 0..depth {
		output.push_str(&config.indent);
	}
}

fn write_vars(output: &mut String, vars: &NamedVars, config: &WriterConfig, depth: usize) {
	for list in vars {
		indent(output, config, depth);
		output.push_str(&list.to_text(config.separator, config.bracketed_values));
		output.push('\n');
	}
}

fn write_object(
	output: &mut String,
	object: &ObjectDefinition,
	config: &WriterConfig,
	depth: usize,
) {
	indent(output, config, depth);
	let _ = write!(output, "o {} {}", object.type_name(), quote(object.name()));

	if !object.prefixes().is_empty() {
		let _ = write!(output, ": {}", object.prefixes().join(" "));
	}

	output.push_str(" {\n");

	for list in object.lists() {
		indent(output, config, depth + 1);
		let _ = writeln!(output, "l {} {{", quote(list.name()));
		write_vars(output, list.vars(), config, depth + 2);
		indent(output, config, depth + 1);
		output.push_str("}\n");
	}

	for block in object.text_blocks() {
		indent(output, config, depth + 1);
		let _ = writeln!(output, "t {} {{", quote(block.name()));

		for line in block.lines() {
			indent(output, config, depth + 2);
			output.push_str(line);
			output.push('\n');
		}

		indent(output, config, depth + 1);
		output.push_str("}\n");
	}

	if let Some(script) = object.script() {
		indent(output, config, depth + 1);
		let _ = writeln!(
			output,
			"s {} {} {} {{",
			quote(&script.module),
			quote(&script.source_file),
			script.start_line
		);

		for line in script.source.lines() {
			indent(output, config, depth + 2);
			output.push_str(line);
			output.push('\n');
		}

		indent(output, config, depth + 1);
		output.push_str("}\n");
	}

	indent(output, config, depth);
	output.push_str("}\n");
}

fn write_template(output: &mut String, template: &TemplateDefinition, config: &WriterConfig) {
	let _ = writeln!(
		output,
		"template {}({}) {{",
		template.name(),
		template.parameters().join(", ")
	);
	write_object(output, template.prototype(), config, 1);
	output.push_str("}\n");
}

fn write_instance(output: &mut String, instance: &TemplateInstance) {
	let arguments = instance
		.arguments()
		.iter()
		.map(|argument| {
			let needs_quotes = argument.is_empty()
				|| argument
					.chars()
					.any(|c| c.is_whitespace() || matches!(c, ',' | '(' | ')' | '"' | ';'));

			if needs_quotes {
				quote(argument)
			} else {
				argument.clone()
			}
		})
		.collect::<Vec<_>>()
		.join(", ");

	let _ = writeln!(output, "{}({arguments});", instance.template_name());
}
