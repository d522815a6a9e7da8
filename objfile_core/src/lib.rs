//! `objfile_core` holds the data model of engine object files: typed value
//! containers, object documents, and the template expander that turns
//! parameterized prototypes into concrete objects at load time.
//!
//! Tokenizing whole files is left to the caller. This crate receives
//! already split names, values and line units and assembles them.
//!
//! ## Pipeline
//!
//! ```text
//! tokenizer (external)
//!   → NamedValueList / NamedVars    typed variables
//!   → ObjectDefinition              lists, text blocks, script handle
//!   → ObjectFileDocument            header, objects, templates, instances
//!   → expand_templates              instances become objects
//!   → ResolvedDocument              frozen, shared read access
//! ```
//!
//! ## Key Types
//!
//! - [`ValueCell`]: a single value, one of int, float, bool, string or wide
//!   string, with checked conversion through [`ValueCell::convert_to`].
//! - [`NamedVars`]: insertion ordered variables with unique names. Encodes to
//!   a binary packet with [`NamedVars::to_packet`].
//! - [`ObjectDefinition`]: a named, typed object.
//! - [`TemplateDefinition`] and [`TemplateInstance`]: a prototype and a
//!   request to build one object from it.
//! - [`ObjectFileDocument`]: everything one file declares.
//! - [`ObjfileConfig`]: settings loaded from `objfile.toml`.
//!
//! ## Quick Start
//!
//! ```rust
//! use objfile_core::NamedVars;
//! use objfile_core::ObjectDefinition;
//! use objfile_core::ObjectFileDocument;
//! use objfile_core::ObjectList;
//! use objfile_core::TemplateDefinition;
//! use objfile_core::TemplateInstance;
//!
//! let mut vars = NamedVars::new();
//! vars.add("size", "w,h");
//!
//! let mut prototype = ObjectDefinition::new("box_w_h", "Box");
//! prototype.add_list(ObjectList::with_vars("dims", vars)).unwrap();
//!
//! let mut document = ObjectFileDocument::new();
//! document.add_template_instance(TemplateInstance::new("Box", ["3", "5"]));
//! document
//! 	.add_template(TemplateDefinition::new("Box", ["w", "h"], prototype).unwrap())
//! 	.unwrap();
//!
//! let document = document.into_resolved().unwrap();
//! let object = document.object_with_name("box_3_5").unwrap();
//! let size: String = object
//! 	.get_list_by_name("dims")
//! 	.unwrap()
//! 	.vars()
//! 	.get_and_convert("size")
//! 	.unwrap();
//! assert_eq!(size, "3,5");
//! ```

pub use config::*;
pub use document::*;
pub use error::*;
pub use named_vars::*;
pub use object::*;
pub use template::*;
pub use value::*;
pub use writer::*;

pub mod config;
mod document;
#[allow(unused_assignments)]
mod error;
mod named_vars;
mod object;
mod template;
mod value;
mod wire;
mod writer;

#[cfg(test)]
mod __fixtures;
