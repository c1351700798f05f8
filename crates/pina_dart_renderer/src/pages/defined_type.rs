use std::fmt::Write as _;

use super::Page;
use super::Rendered;
use super::class::BorshClass;
use super::class::borsh_imports;
use super::class::declarations;
use super::class::declared_symbols;
use super::class::enum_class;
use super::class::needs_part;
use super::class::variant_class;
use super::doc_block;
use crate::error::Result;
use crate::imports::ImportMap;
use crate::manifest::FieldNaming;
use crate::manifest::ResolveContext;
use crate::manifest::Shape;
use crate::manifest::TypeManifestResolver;
use crate::manifest::generated_module;
use crate::nodes::DefinedTypeNode;

/// Pages for one defined type.
///
/// Structs and aliases get a single `types/<name>.dart`. Enums get the same
/// main page, which re-exports one page per variant under `types/<name>/`.
pub fn defined_type_pages(node: &DefinedTypeNode, resolver: &TypeManifestResolver<'_>) -> Result<Rendered> {
	let names = resolver.names();
	let name = names.defined_type(&node.name);
	let file = names.file_name(&node.name);
	let module = generated_module("types", &file);
	let manifest = resolver.resolve(&node.r#type, &ResolveContext::root(name.clone(), FieldNaming::Type))?;
	let nested = &manifest.nested_declarations;

	let mut imports = borsh_imports();
	imports.merge_with(&manifest.imports);

	let pages = match &manifest.shape {
		Shape::Struct(fields) => {
			let mut body = format!("part '{file}.g.dart';\n\n");
			body.push_str(
				&BorshClass {
					docs: &node.docs,
					..BorshClass::new(&name, fields)
				}
				.render(),
			);
			body.push_str(&declarations(nested));
			vec![
				Page::new(module, imports, body)
					.defining([name.clone(), format!("B{name}")])
					.defining(declared_symbols(nested)),
			]
		}
		Shape::Enum { size, variants } => {
			let mut pages = Vec::with_capacity(variants.len() + 1);
			let mut body = String::new();
			let mut main_imports = imports.clone();

			for variant in variants {
				let variant_file = names.file_name(&variant.name);
				let variant_module = format!("types/{file}/{variant_file}.dart");
				let _ = writeln!(body, "export '{file}/{variant_file}.dart';");
				main_imports.add(
					variant_module.as_str(),
					[variant.name.clone(), format!("B{}", variant.name)],
				);

				let mut variant_body = String::new();
				if !variant.payload.fields().is_empty() {
					let _ = writeln!(variant_body, "part '{variant_file}.g.dart';");
					variant_body.push('\n');
				}
				variant_body.push_str(&variant_class(variant));
				let mut variant_imports = imports.clone();
				if !nested.is_empty() {
					variant_imports.add_module(module.as_str());
				}
				pages.push(
					Page::new(variant_module, variant_imports, variant_body)
						.defining([variant.name.clone(), format!("B{}", variant.name)]),
				);
			}

			body.push('\n');
			if needs_part(&[], nested) {
				let _ = writeln!(body, "part '{file}.g.dart';");
				body.push('\n');
			}
			body.push_str(&enum_class(&name, &node.docs, *size, variants));
			body.push_str(&declarations(nested));
			pages.insert(
				0,
				Page::new(module, main_imports, body)
					.defining([name.clone()])
					.defining(declared_symbols(nested)),
			);
			pages
		}
		Shape::Plain => {
			let mut body = String::new();
			if needs_part(&[], nested) {
				let _ = writeln!(body, "part '{file}.g.dart';");
				body.push('\n');
			}
			body.push_str(&doc_block(&node.docs, ""));
			let _ = writeln!(body, "typedef {name} = {};", manifest.target_type);
			body.push_str(&declarations(nested));
			if nested.is_empty() {
				imports = ImportMap::merged([&manifest.imports]);
			}
			vec![
				Page::new(module, imports, body)
					.defining([name.clone()])
					.defining(declared_symbols(nested)),
			]
		}
	};

	tracing::debug!(defined_type = %node.name, pages = pages.len(), "rendered defined type");
	Ok(Rendered {
		pages,
		diagnostics: manifest.diagnostics,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::linkables::LinkableDictionary;
	use crate::names::DartNames;
	use crate::nodes::ProgramNode;

	fn render(json: &str) -> Rendered {
		let node: DefinedTypeNode =
			serde_json::from_str(json).unwrap_or_else(|e| panic!("failed to parse defined type: {e}"));
		let mut dictionary = LinkableDictionary::default();
		dictionary.record_program(&ProgramNode {
			name: "game".to_owned(),
			defined_types: vec![node.clone()],
			..ProgramNode::default()
		});
		let resolver = TypeManifestResolver::new(&dictionary, "game", &DartNames);
		defined_type_pages(&node, &resolver).unwrap_or_else(|e| panic!("failed to render defined type: {e}"))
	}

	#[test]
	fn enums_split_variants_into_their_own_pages() {
		let rendered = render(
			r#"{
				"kind": "definedTypeNode",
				"name": "move",
				"type": {
					"kind": "enumTypeNode",
					"variants": [
						{ "kind": "enumEmptyVariantTypeNode", "name": "pass" },
						{
							"kind": "enumStructVariantTypeNode",
							"name": "jump",
							"struct": {
								"kind": "structTypeNode",
								"fields": [{ "kind": "structFieldTypeNode", "name": "height", "type": { "kind": "numberTypeNode", "format": "u16" } }]
							}
						}
					]
				}
			}"#,
		);
		let paths = rendered.pages.iter().map(|page| page.path.as_str()).collect::<Vec<_>>();
		assert_eq!(paths, vec!["types/move.dart", "types/move/pass.dart", "types/move/jump.dart"]);

		let main = &rendered.pages[0];
		assert!(main.body.starts_with("export 'move/pass.dart';\nexport 'move/jump.dart';\n"));
		assert!(!main.body.contains("part 'move.g.dart';"));
		assert!(main.body.contains("factory Move.jump({required int height}) {"));
		assert!(main.imports.contains("types/move/jump.dart", "BJump"));

		let pass = &rendered.pages[1];
		assert!(!pass.body.contains("part "));
		assert!(pass.body.contains("class BPass implements BType<Pass> {"));

		let jump = &rendered.pages[2];
		assert!(jump.body.starts_with("part 'jump.g.dart';"));
		assert!(jump.body.contains("@BU16() required int height,"));
	}

	#[test]
	fn structs_render_one_class_with_nested_declarations() {
		let rendered = render(
			r#"{
				"kind": "definedTypeNode",
				"name": "player",
				"docs": ["A player."],
				"type": {
					"kind": "structTypeNode",
					"fields": [
						{ "kind": "structFieldTypeNode", "name": "name", "type": { "kind": "stringTypeNode", "encoding": "utf8" } },
						{
							"kind": "structFieldTypeNode",
							"name": "position",
							"type": {
								"kind": "structTypeNode",
								"fields": [{ "kind": "structFieldTypeNode", "name": "x", "type": { "kind": "numberTypeNode", "format": "i32" } }]
							}
						}
					]
				}
			}"#,
		);
		assert_eq!(rendered.pages.len(), 1);
		let page = &rendered.pages[0];
		assert_eq!(page.path, "types/player.dart");
		assert!(page.body.contains("/// A player.\n@BorshSerializable()\nclass Player with _$Player {"));
		assert!(page.body.contains("@BCustom(BPlayerPosition()) required PlayerPosition position,"));
		assert!(page.body.contains("class PlayerPosition with _$PlayerPosition {"));
		assert!(page.defines.contains(&"BPlayerPosition".to_owned()));
	}

	#[test]
	fn aliases_become_typedefs() {
		let rendered = render(
			r#"{
				"kind": "definedTypeNode",
				"name": "scores",
				"type": {
					"kind": "arrayTypeNode",
					"item": { "kind": "numberTypeNode", "format": "u64" },
					"count": { "kind": "prefixedCountNode", "prefix": { "kind": "numberTypeNode", "format": "u32" } }
				}
			}"#,
		);
		let page = &rendered.pages[0];
		assert_eq!(page.body.trim_end(), "typedef Scores = List<BigInt>;");
		assert!(!page.imports.contains_module("borsh"));
	}
}
