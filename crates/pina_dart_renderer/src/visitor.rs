//! Render-tree visitor.
//!
//! Rendering runs in two passes. The first records every linkable node in a
//! [`LinkableDictionary`]. The second walks the tree depth first, collecting
//! one [`RenderUnit`] per output unit together with its ancestor
//! [`NodePath`]. Units never depend on each other, so they can be rendered in
//! any order, including in parallel, and a failing unit never stops its
//! siblings.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use rayon::prelude::*;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::error::Result;
use crate::linkables::LinkableDictionary;
use crate::manifest::Diagnostic;
use crate::manifest::TypeManifestResolver;
use crate::nodes::AccountNode;
use crate::nodes::DefinedTypeNode;
use crate::nodes::InputValueNode;
use crate::nodes::InstructionNode;
use crate::nodes::PdaNode;
use crate::nodes::PdaReference;
use crate::nodes::ProgramNode;
use crate::nodes::RootNode;
use crate::pages;
use crate::pages::AccountDefault;
use crate::pages::InstructionAccount;
use crate::pages::Rendered;
use crate::pda::SeedExpr;
use crate::pda::parse_address;
use crate::pda::resolve_seeds;

/// One ancestor on the way from the root to a unit.
#[derive(Debug, Clone, Copy)]
pub enum PathNode<'a> {
	Root(&'a RootNode),
	Program(&'a ProgramNode),
	Account(&'a AccountNode),
	Instruction(&'a InstructionNode),
	DefinedType(&'a DefinedTypeNode),
	Pda(&'a PdaNode),
}

/// Ancestor stack of a node, root first.
#[derive(Debug, Clone, Default)]
pub struct NodePath<'a> {
	nodes: Vec<PathNode<'a>>,
}

impl<'a> NodePath<'a> {
	#[must_use]
	pub fn with(&self, node: PathNode<'a>) -> Self {
		let mut nodes = self.nodes.clone();
		nodes.push(node);
		Self { nodes }
	}

	/// The closest enclosing program.
	pub fn program(&self) -> Option<&'a ProgramNode> {
		self.nodes.iter().rev().find_map(|node| {
			match node {
				PathNode::Program(program) => Some(*program),
				_ => None,
			}
		})
	}

	pub fn last(&self) -> Option<PathNode<'a>> {
		self.nodes.last().copied()
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

#[derive(Debug, Clone, Copy)]
pub enum UnitKind<'a> {
	Account(&'a AccountNode),
	Instruction(&'a InstructionNode),
	DefinedType(&'a DefinedTypeNode),
	Pda(&'a PdaNode),
	Program,
	Errors,
}

/// An independently renderable piece of output.
#[derive(Debug, Clone)]
pub struct RenderUnit<'a> {
	pub path: NodePath<'a>,
	pub kind: UnitKind<'a>,
}

impl fmt::Display for RenderUnit<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let program = self.path.program().map_or("<none>", |program| program.name.as_str());
		match self.kind {
			UnitKind::Account(account) => write!(f, "{program}::accounts::{}", account.name),
			UnitKind::Instruction(instruction) => write!(f, "{program}::instructions::{}", instruction.name),
			UnitKind::DefinedType(node) => write!(f, "{program}::types::{}", node.name),
			UnitKind::Pda(pda) => write!(f, "{program}::pdas::{}", pda.name),
			UnitKind::Program => write!(f, "{program}::program"),
			UnitKind::Errors => write!(f, "{program}::errors"),
		}
	}
}

/// A unit that could not be rendered.
#[derive(Debug)]
pub struct UnitFailure {
	pub unit: String,
	pub error: RenderError,
}

/// Every generated file, keyed by its path relative to the output directory.
#[derive(Debug, Default)]
pub struct RenderMap {
	pub files: BTreeMap<String, String>,
	pub failures: Vec<UnitFailure>,
	pub diagnostics: Vec<Diagnostic>,
}

impl RenderMap {
	pub fn get(&self, path: &str) -> Option<&str> {
		self.files.get(path).map(String::as_str)
	}

	pub fn is_success(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Collects the units of every program in `root`, in tree order.
///
/// Inline PDA defaults found on instruction accounts become PDA units too,
/// unless the program already declares a PDA with the same name.
pub fn collect_units(root: &RootNode) -> Vec<RenderUnit<'_>> {
	let root_path = NodePath::default().with(PathNode::Root(root));
	let mut units = Vec::new();

	for program in root.programs() {
		let path = root_path.with(PathNode::Program(program));
		units.push(RenderUnit {
			path: path.clone(),
			kind: UnitKind::Program,
		});
		if !program.errors.is_empty() {
			units.push(RenderUnit {
				path: path.clone(),
				kind: UnitKind::Errors,
			});
		}
		for account in &program.accounts {
			units.push(RenderUnit {
				path: path.with(PathNode::Account(account)),
				kind: UnitKind::Account(account),
			});
		}
		for node in &program.defined_types {
			units.push(RenderUnit {
				path: path.with(PathNode::DefinedType(node)),
				kind: UnitKind::DefinedType(node),
			});
		}

		let mut pda_names = BTreeSet::new();
		for pda in &program.pdas {
			pda_names.insert(pda.name.as_str());
			units.push(RenderUnit {
				path: path.with(PathNode::Pda(pda)),
				kind: UnitKind::Pda(pda),
			});
		}
		for instruction in &program.instructions {
			let instruction_path = path.with(PathNode::Instruction(instruction));
			units.push(RenderUnit {
				path: instruction_path.clone(),
				kind: UnitKind::Instruction(instruction),
			});
			for account in &instruction.accounts {
				let Some(InputValueNode::Pda(value)) = &account.default_value else {
					continue;
				};
				let PdaReference::Inline(pda) = &value.pda else {
					continue;
				};
				if pda_names.insert(pda.name.as_str()) {
					units.push(RenderUnit {
						path: instruction_path.with(PathNode::Pda(pda)),
						kind: UnitKind::Pda(pda),
					});
				}
			}
		}
	}
	units
}

/// Renders one unit.
pub fn render_unit(unit: &RenderUnit<'_>, dictionary: &LinkableDictionary, config: &RenderConfig) -> Result<Rendered> {
	let Some(program) = unit.path.program() else {
		return Err(RenderError::MissingProgram {
			context: unit.to_string(),
		});
	};
	let names = config.name_api.as_ref();
	let resolver = TypeManifestResolver::new(dictionary, &program.name, names);

	match unit.kind {
		UnitKind::Account(account) => pages::account_page(account, &resolver),
		UnitKind::Instruction(instruction) => {
			let accounts = classify_accounts(instruction, program, dictionary, &resolver, config)?;
			pages::instruction_page(instruction, &accounts, program, &resolver)
		}
		UnitKind::DefinedType(node) => pages::defined_type_pages(node, &resolver),
		UnitKind::Pda(pda) => pages::pda_page(program, pda, &resolver),
		UnitKind::Program => Ok(Rendered::single(pages::program_page(program, names)?, Vec::new())),
		UnitKind::Errors => {
			Ok(pages::errors_page(program, names)
				.map(|page| Rendered::single(page, Vec::new()))
				.unwrap_or_default())
		}
	}
}

/// Decides how the builder of `instruction` fills each account.
///
/// PDA defaults are derived only when every seed comes from accounts of the
/// same instruction, literals or the program id. A seed may reference a PDA
/// defaulted account only when that account is resolved first. Anything
/// else is left to the caller.
pub fn classify_accounts<'a>(
	instruction: &'a InstructionNode,
	program: &ProgramNode,
	dictionary: &LinkableDictionary,
	resolver: &TypeManifestResolver<'_>,
	config: &RenderConfig,
) -> Result<Vec<InstructionAccount<'a>>> {
	let position = |name: &str| instruction.accounts.iter().position(|account| account.name == name);
	let mut accounts = Vec::with_capacity(instruction.accounts.len());

	for (index, node) in instruction.accounts.iter().enumerate() {
		let default = match &node.default_value {
			Some(InputValueNode::Pda(value)) => {
				let pda = match &value.pda {
					PdaReference::Inline(pda) => pda,
					PdaReference::Link { name } => {
						dictionary.pda(&program.name, name).ok_or_else(|| {
							RenderError::MissingPda {
								account: node.name.clone(),
								pda: name.clone(),
							}
						})?
					}
				};
				let resolved = resolve_seeds(pda, &value.seeds, resolver)?;
				resolved.check_limits()?;
				if let Some(program_id) = &pda.program_id {
					parse_address(program_id, &pda.name)?;
				}
				let reachable = resolved.seeds.iter().all(|seed| {
					let SeedExpr::Account { name } = seed else {
						return true;
					};
					match position(name) {
						Some(other) if other < index => true,
						Some(other) if other > index => {
							!matches!(
								instruction.accounts[other].default_value,
								Some(InputValueNode::Pda(_))
							)
						}
						_ => false,
					}
				});
				if resolved.auto_derivable && reachable {
					Some(AccountDefault::Pda {
						resolved,
						program_id: pda.program_id.clone(),
					})
				} else {
					tracing::debug!(
						instruction = %instruction.name,
						account = %node.name,
						"PDA default needs caller input, account stays required"
					);
					Some(AccountDefault::None)
				}
			}
			Some(InputValueNode::PublicKey { public_key }) => {
				parse_address(public_key, &node.name)?;
				Some(AccountDefault::Address(public_key.clone()))
			}
			Some(InputValueNode::ProgramId) => Some(AccountDefault::ProgramId),
			_ => None,
		};

		let default = default.unwrap_or_else(|| {
			if let Some(address) = config.builtin_program(&node.name) {
				AccountDefault::Address(address.to_owned())
			} else if node.is_optional {
				AccountDefault::Optional
			} else {
				AccountDefault::None
			}
		});
		accounts.push(InstructionAccount { node, default });
	}
	Ok(accounts)
}

/// Renders every unit of `root` into a [`RenderMap`].
///
/// Generated sources land under `config.library_name`, next to a
/// `shared.dart` helper and a library index. `pubspec.yaml` sits at the
/// root. The map is identical whether units are rendered in parallel or not.
pub fn render_map(root: &RootNode, config: &RenderConfig) -> RenderMap {
	let dictionary = LinkableDictionary::record(root);
	let units = collect_units(root);
	tracing::debug!(units = units.len(), parallel = config.parallel, "collected render units");

	let render = |unit: &RenderUnit<'_>| (unit.to_string(), render_unit(unit, &dictionary, config));
	let results = if config.parallel {
		units.par_iter().map(render).collect::<Vec<_>>()
	} else {
		units.iter().map(render).collect::<Vec<_>>()
	};

	let library = &config.library_name;
	let mut map = RenderMap::default();
	let mut pages = vec![pages::shared_page()];
	for (unit, result) in results {
		match result {
			Ok(rendered) => {
				tracing::debug!(%unit, pages = rendered.pages.len(), "rendered unit");
				for diagnostic in &rendered.diagnostics {
					tracing::warn!(%unit, %diagnostic, "degraded output");
				}
				map.diagnostics.extend(rendered.diagnostics);
				pages.extend(rendered.pages);
			}
			Err(error) => {
				tracing::warn!(%unit, %error, "failed to render unit");
				map.failures.push(UnitFailure { unit, error });
			}
		}
	}

	let index = pages::library_index(pages.iter().map(|page| page.path.as_str()), library);
	pages.push(index);
	for page in pages {
		let path = format!("{library}/{}", page.path);
		let contents = page.render(&config.dependency_map);
		if map.files.insert(path.clone(), contents).is_some() {
			tracing::warn!(%path, "two units rendered the same file, keeping the last one");
		}
	}
	map.files.insert("pubspec.yaml".to_owned(), pages::pubspec(config, &root.program.name));
	map
}
