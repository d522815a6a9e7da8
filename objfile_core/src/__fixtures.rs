use crate::NamedValueList;
use crate::NamedVars;
use crate::ObjectDefinition;
use crate::ObjectFileDocument;
use crate::ObjectList;
use crate::ScriptRef;
use crate::TemplateDefinition;
use crate::TemplateInstance;
use crate::TextBlock;
use crate::ValueCell;

/// `var1 = 1` through `var5 = 5`.
pub(crate) fn numbered_vars() -> NamedVars {
	let mut vars = NamedVars::new();

	for index in 1..=5 {
		assert!(vars.add(format!("var{index}"), index));
	}

	vars
}

pub(crate) fn mixed_vars() -> NamedVars {
	let mut vars = NamedVars::new();
	vars.add("Width", 1280);
	vars.add("Negative", -42_i64);
	vars.add("Ratio", 1.5);
	vars.add("Fullscreen", true);
	vars.add("Title", "Leviathan \"demo\"");
	vars.add("Greeting", ValueCell::wide("hëllo wörld"));
	vars.add_values(
		"Color",
		vec![
			ValueCell::Float(0.1),
			ValueCell::Int(4),
			ValueCell::Bool(false),
			ValueCell::from("lol"),
		],
	);

	vars
}

/// `template Box(w, h)` whose prototype mentions both parameters in every
/// text field.
pub(crate) fn box_template() -> TemplateDefinition {
	let mut dims = NamedVars::new();
	dims.add("size", "w,h");
	dims.add("count", 2);
	dims.add("label", ValueCell::wide("w"));
	dims.add("edge", "h");

	let mut prototype = ObjectDefinition::new("box_w_h", "Box").with_prefixes(["tag_w"]);
	prototype
		.add_list(ObjectList::with_vars("dims", dims))
		.unwrap_or_else(|_| panic!("duplicate list"));
	prototype
		.add_text_block(TextBlock::with_lines("notes", ["w by h"]))
		.unwrap_or_else(|_| panic!("duplicate text block"));
	prototype.set_script(ScriptRef::new("box_script", "box.as", 12, "int area = w * h;"));

	TemplateDefinition::new("Box", ["w", "h"], prototype).unwrap_or_else(|e| panic!("{e}"))
}

pub(crate) fn declared_object(name: &str, type_name: &str) -> ObjectDefinition {
	let mut vars = NamedVars::new();
	vars.add("speed", 2.0);

	let mut object = ObjectDefinition::new(name, type_name);
	object
		.add_list(ObjectList::with_vars("vars", vars))
		.unwrap_or_else(|_| panic!("duplicate list"));
	object
}

/// A document with one declared object, the `Box` template and `Box(3, 5)`.
pub(crate) fn box_document() -> ObjectFileDocument {
	let header = [NamedValueList::new("Version", 3)].into_iter().collect();
	let mut document = ObjectFileDocument::with_header(header);
	document
		.add_object(declared_object("First object", "TestType"))
		.unwrap_or_else(|_| panic!("duplicate object"));
	document
		.add_template(box_template())
		.unwrap_or_else(|_| panic!("duplicate template"));
	document.add_template_instance(TemplateInstance::new("Box", ["3", "5"]));
	document
}
