//! First pass registry of everything a node can link to.

use std::collections::BTreeMap;

use crate::names::NameApi;
use crate::nodes::DefinedTypeLinkNode;
use crate::nodes::DefinedTypeNode;
use crate::nodes::PdaNode;
use crate::nodes::ProgramNode;
use crate::nodes::RootNode;
use crate::nodes::TypeNode;

/// Linkable nodes of a single program, keyed by their IDL names.
#[derive(Debug, Clone, Default)]
pub struct ProgramLinkables {
	pub name: String,
	pub public_key: String,
	pub defined_types: BTreeMap<String, DefinedTypeNode>,
	pub pdas: BTreeMap<String, PdaNode>,
	pub accounts: Vec<String>,
}

impl ProgramLinkables {
	fn record(program: &ProgramNode) -> Self {
		Self {
			name: program.name.clone(),
			public_key: program.public_key.clone(),
			defined_types: program
				.defined_types
				.iter()
				.map(|node| (node.name.clone(), node.clone()))
				.collect(),
			pdas: program
				.pdas
				.iter()
				.map(|node| (node.name.clone(), node.clone()))
				.collect(),
			accounts: program.accounts.iter().map(|node| node.name.clone()).collect(),
		}
	}
}

/// Append-only map of program name to its linkable nodes.
///
/// It is fully built before any reference is resolved, so lookups never
/// depend on the order units are rendered in.
#[derive(Debug, Clone, Default)]
pub struct LinkableDictionary {
	programs: BTreeMap<String, ProgramLinkables>,
}

impl LinkableDictionary {
	pub fn record(root: &RootNode) -> Self {
		let mut dictionary = Self::default();
		for program in root.programs() {
			dictionary.record_program(program);
		}
		dictionary
	}

	pub fn record_program(&mut self, program: &ProgramNode) -> &mut Self {
		self.programs
			.entry(program.name.clone())
			.or_insert_with(|| ProgramLinkables::record(program));
		self
	}

	pub fn program(&self, name: &str) -> Option<&ProgramLinkables> {
		self.programs.get(name)
	}

	/// Looks a defined type up, in the linked program when the link names
	/// one, otherwise in `program`.
	pub fn defined_type(&self, program: &str, link: &DefinedTypeLinkNode) -> Option<&DefinedTypeNode> {
		let program = link.program.as_ref().map_or(program, |link| link.name.as_str());
		self.programs.get(program)?.defined_types.get(&link.name)
	}

	pub fn pda(&self, program: &str, name: &str) -> Option<&PdaNode> {
		self.programs.get(program)?.pdas.get(name)
	}
}

/// What a defined type link points at, as far as annotations care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinedShape {
	Struct,
	Enum { variants: Vec<String> },
	Alias,
}

impl DefinedShape {
	pub fn of(node: &DefinedTypeNode, names: &dyn NameApi) -> Self {
		match &node.r#type {
			TypeNode::Enum(node) => {
				Self::Enum {
					variants: node
						.variants
						.iter()
						.map(|variant| names.enum_variant(variant.name()))
						.collect(),
				}
			}
			TypeNode::Struct(_) => Self::Struct,
			_ => Self::Alias,
		}
	}
}
