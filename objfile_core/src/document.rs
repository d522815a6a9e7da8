use derive_more::Deref;

use crate::ExpansionError;
use crate::NamedValueList;
use crate::NamedVars;
use crate::ObjectDefinition;
use crate::ObjfileError;
use crate::ObjfileResult;
use crate::TemplateDefinition;
use crate::TemplateInstance;

/// Everything declared in one object file.
///
/// Objects keep declaration order. Objects produced by template expansion
/// are appended after every declared object, in instance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectFileDocument {
	header: NamedVars,
	objects: Vec<ObjectDefinition>,
	templates: Vec<TemplateDefinition>,
	instances: Vec<TemplateInstance>,
	/// Number of leading `instances` already expanded into `objects`.
	expanded: usize,
}

impl ObjectFileDocument {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_header(header: NamedVars) -> Self {
		Self {
			header,
			..Self::default()
		}
	}

	pub fn header(&self) -> &NamedVars {
		&self.header
	}

	pub fn header_mut(&mut self) -> &mut NamedVars {
		&mut self.header
	}

	pub fn add_header_var(&mut self, list: NamedValueList) -> Result<(), NamedValueList> {
		self.header.add_list(list)
	}

	/// Add a declared object. On a name collision the object is handed back.
	pub fn add_object(&mut self, object: ObjectDefinition) -> Result<(), ObjectDefinition> {
		if self.is_object_name_in_use(object.name()) {
			return Err(object);
		}

		self.objects.push(object);
		Ok(())
	}

	pub fn is_object_name_in_use(&self, name: &str) -> bool {
		self.objects.iter().any(|object| object.name() == name)
	}

	pub fn object_with_name(&self, name: &str) -> Option<&ObjectDefinition> {
		self.objects.iter().find(|object| object.name() == name)
	}

	/// First object of `type_name` in document order.
	pub fn object_with_type(&self, type_name: &str) -> Option<&ObjectDefinition> {
		self.objects
			.iter()
			.find(|object| object.type_name() == type_name)
	}

	pub fn objects_with_type<'a>(
		&'a self,
		type_name: &'a str,
	) -> impl Iterator<Item = &'a ObjectDefinition> + 'a {
		self.objects
			.iter()
			.filter(move |object| object.type_name() == type_name)
	}

	pub fn object_at_index(&self, index: usize) -> ObjfileResult<&ObjectDefinition> {
		self.objects.get(index).ok_or(ObjfileError::OutOfRange {
			kind: "object",
			index,
			len: self.objects.len(),
		})
	}

	pub fn object_count(&self) -> usize {
		self.objects.len()
	}

	pub fn objects(&self) -> &[ObjectDefinition] {
		&self.objects
	}

	/// Add a template definition. On a name collision it is handed back.
	pub fn add_template(
		&mut self,
		template: TemplateDefinition,
	) -> Result<(), TemplateDefinition> {
		if self.find_template(template.name()).is_some() {
			return Err(template);
		}

		self.templates.push(template);
		Ok(())
	}

	pub fn find_template(&self, name: &str) -> Option<&TemplateDefinition> {
		self.templates
			.iter()
			.find(|template| template.name() == name)
	}

	pub fn templates(&self) -> &[TemplateDefinition] {
		&self.templates
	}

	/// Queue an instance. The template may be defined later.
	pub fn add_template_instance(&mut self, instance: TemplateInstance) {
		self.instances.push(instance);
	}

	pub fn instances(&self) -> &[TemplateInstance] {
		&self.instances
	}

	/// Whether every queued instance has been expanded.
	pub fn is_expanded(&self) -> bool {
		self.expanded == self.instances.len()
	}

	/// Expand every instance queued since the last successful pass.
	///
	/// The pass stops at the first instance that fails. Nothing is added to
	/// the document in that case, so it can be fixed and expanded again.
	pub fn expand_templates(&mut self) -> Result<(), ExpansionError> {
		let mut staged: Vec<ObjectDefinition> = Vec::new();

		for (index, instance) in self.instances.iter().enumerate().skip(self.expanded) {
			let object = self
				.expand_instance(instance, &staged)
				.map_err(|cause| ExpansionError::new(index, instance.template_name(), cause))?;

			tracing::debug!(
				index,
				template = instance.template_name(),
				object = object.name(),
				"expanded template instance"
			);
			staged.push(object);
		}

		let count = staged.len();
		self.objects.extend(staged);
		self.expanded = self.instances.len();
		tracing::info!(count, total = self.objects.len(), "template expansion finished");

		Ok(())
	}

	/// Expand all templates and freeze the document.
	pub fn into_resolved(mut self) -> Result<ResolvedDocument, ExpansionError> {
		self.expand_templates()?;
		Ok(ResolvedDocument(self))
	}

	fn expand_instance(
		&self,
		instance: &TemplateInstance,
		staged: &[ObjectDefinition],
	) -> ObjfileResult<ObjectDefinition> {
		let template = self
			.find_template(instance.template_name())
			.ok_or_else(|| ObjfileError::UnresolvedTemplate(instance.template_name().to_string()))?;
		let object = template.instantiate(instance.arguments())?;

		if self.is_object_name_in_use(object.name())
			|| staged.iter().any(|other| other.name() == object.name())
		{
			return Err(ObjfileError::NameCollision {
				kind: "object",
				name: object.name().to_string(),
			});
		}

		Ok(object)
	}
}

/// A fully expanded document that can no longer change.
///
/// Only shared access is exposed, so it can be handed to any number of
/// readers across threads.
#[derive(Debug, Clone, PartialEq, Deref)]
pub struct ResolvedDocument(ObjectFileDocument);

impl ResolvedDocument {
	pub fn into_inner(self) -> ObjectFileDocument {
		self.0
	}
}
