use std::fmt::Write as _;

use super::Page;
use super::Rendered;
use super::doc_block;
use crate::error::Result;
use crate::imports::ImportMap;
use crate::manifest::FieldNaming;
use crate::manifest::ResolveContext;
use crate::manifest::SOLANA;
use crate::manifest::TypeManifestResolver;
use crate::manifest::generated_module;
use crate::names::NameApi;
use crate::nodes::PdaNode;
use crate::nodes::PdaSeedNode;
use crate::nodes::ProgramNode;
use crate::pda::SeedVariable;
use crate::pda::parse_address;
use crate::pda::resolve_seeds;

/// Local holding the deriving program inside every helper.
const PROGRAM_ID: &str = "programId";

/// Dart parameter for a variable seed, kept clear of [`PROGRAM_ID`].
fn parameter_name(names: &dyn NameApi, seed: &str) -> String {
	let name = names.type_field(seed);
	if name == PROGRAM_ID {
		format!("{name}Seed")
	} else {
		name
	}
}

/// `pdas/<name>.dart`: an async helper deriving the PDA from its variable
/// seeds.
pub fn pda_page(program: &ProgramNode, pda: &PdaNode, resolver: &TypeManifestResolver<'_>) -> Result<Rendered> {
	let names = resolver.names();
	let function = names.pda_function(&pda.name);
	let resolved = resolve_seeds(pda, &[], resolver)?;
	resolved.check_limits()?;

	let mut imports = resolved.imports();
	imports.add(SOLANA, ["Ed25519HDPublicKey"]);
	let mut diagnostics = Vec::new();
	for seed in &pda.seeds {
		let PdaSeedNode::Variable { name, r#type, .. } = seed else {
			continue;
		};
		let manifest = resolver.resolve(r#type, &ResolveContext::root(names.defined_type(name), FieldNaming::Type))?;
		imports.merge_with(&manifest.imports);
		diagnostics.extend(manifest.diagnostics);
	}

	let program_id = match &pda.program_id {
		Some(program_id) => {
			parse_address(program_id, &pda.name)?;
			format!("Ed25519HDPublicKey.fromBase58('{program_id}')")
		}
		None => {
			let program_type = names.program_type(&program.name);
			imports.add(
				generated_module("programs", &names.file_name(&program.name)),
				[program_type.clone()],
			);
			format!("Ed25519HDPublicKey.fromBase58({program_type}.programId)")
		}
	};

	let mut body = doc_block(&pda.docs, "");
	if resolved.parameters.is_empty() {
		let _ = writeln!(body, "Future<Ed25519HDPublicKey> {function}() async {{");
	} else {
		let _ = writeln!(body, "Future<Ed25519HDPublicKey> {function}({{");
		for parameter in &resolved.parameters {
			let _ = writeln!(
				body,
				"  required {} {},",
				parameter.target_type,
				parameter_name(names, &parameter.name)
			);
		}
		let _ = writeln!(body, "}}) async {{");
	}
	let _ = writeln!(body, "  final {PROGRAM_ID} = {program_id};");
	let _ = writeln!(body, "  return Ed25519HDPublicKey.findProgramAddress(");
	let _ = writeln!(body, "    seeds: [");
	let seeds = resolved.dart_seeds(PROGRAM_ID, |variable| {
		match variable {
			SeedVariable::Account(name) | SeedVariable::Argument(name) | SeedVariable::Parameter(name) => {
				parameter_name(names, name)
			}
		}
	});
	for seed in seeds {
		let _ = writeln!(body, "      {seed},");
	}
	let _ = writeln!(body, "    ],");
	let _ = writeln!(body, "    programId: {PROGRAM_ID},");
	let _ = writeln!(body, "  );");
	let _ = writeln!(body, "}}");

	let page = Page::new(generated_module("pdas", &names.file_name(&pda.name)), imports, body).defining([function]);
	tracing::debug!(pda = %pda.name, seeds = resolved.seeds.len(), "rendered pda page");
	Ok(Rendered::single(page, diagnostics))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::RenderError;
	use crate::linkables::LinkableDictionary;
	use crate::names::DartNames;

	fn program() -> ProgramNode {
		ProgramNode {
			name: "vault".to_owned(),
			public_key: "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS".to_owned(),
			..ProgramNode::default()
		}
	}

	fn render(json: &str) -> Result<Rendered> {
		let pda: PdaNode = serde_json::from_str(json).unwrap_or_else(|e| panic!("failed to parse pda: {e}"));
		let program = program();
		let mut dictionary = LinkableDictionary::default();
		dictionary.record_program(&program);
		let resolver = TypeManifestResolver::new(&dictionary, "vault", &DartNames);
		pda_page(&program, &pda, &resolver)
	}

	#[test]
	fn variable_seeds_become_parameters_in_order() {
		let rendered = render(
			r#"{
				"kind": "pdaNode",
				"name": "userVault",
				"docs": ["Vault owned by a user."],
				"seeds": [
					{ "kind": "constantPdaSeedNode", "type": { "kind": "stringTypeNode", "encoding": "utf8" }, "value": { "kind": "stringValueNode", "string": "vault" } },
					{ "kind": "variablePdaSeedNode", "name": "owner", "type": { "kind": "publicKeyTypeNode" } },
					{ "kind": "variablePdaSeedNode", "name": "vault_id", "type": { "kind": "numberTypeNode", "format": "u64" } }
				]
			}"#,
		)
		.unwrap_or_else(|e| panic!("failed to render pda: {e}"));
		let page = &rendered.pages[0];
		assert_eq!(page.path, "pdas/user_vault.dart");
		assert!(page.imports.contains("programs/vault.dart", "VaultProgram"));
		assert!(page.imports.contains("shared.dart", "encodeU64"));
		assert!(page.imports.contains("dartConvert", "utf8"));
		insta::assert_snapshot!(page.body, @r"
		/// Vault owned by a user.
		Future<Ed25519HDPublicKey> deriveUserVaultPda({
		  required Ed25519HDPublicKey owner,
		  required BigInt vaultId,
		}) async {
		  final programId = Ed25519HDPublicKey.fromBase58(VaultProgram.programId);
		  return Ed25519HDPublicKey.findProgramAddress(
		    seeds: [
		      utf8.encode('vault'),
		      owner.bytes,
		      encodeU64(vaultId),
		    ],
		    programId: programId,
		  );
		}
		");
	}

	#[test]
	fn program_overrides_are_inlined() {
		let rendered = render(
			r#"{
				"kind": "pdaNode",
				"name": "config",
				"programId": "11111111111111111111111111111111",
				"seeds": [{ "kind": "constantPdaSeedNode", "type": { "kind": "bytesTypeNode" }, "value": { "kind": "bytesValueNode", "data": "0102", "encoding": "base16" } }]
			}"#,
		)
		.unwrap_or_else(|e| panic!("failed to render pda: {e}"));
		let page = &rendered.pages[0];
		assert!(page.body.contains("Future<Ed25519HDPublicKey> deriveConfigPda() async {"));
		assert!(
			page.body
				.contains("final programId = Ed25519HDPublicKey.fromBase58('11111111111111111111111111111111');")
		);
		assert!(page.body.contains("Uint8List.fromList([1, 2]),"));
		assert!(!page.imports.contains_module("programs/vault.dart"));
	}

	#[test]
	fn oversized_literal_seeds_fail_generation() {
		let result = render(
			r#"{
				"kind": "pdaNode",
				"name": "config",
				"seeds": [{
					"kind": "constantPdaSeedNode",
					"type": { "kind": "stringTypeNode", "encoding": "utf8" },
					"value": { "kind": "stringValueNode", "string": "this seed is far longer than thirty two bytes" }
				}]
			}"#,
		);
		assert!(matches!(result, Err(RenderError::SeedTooLong { .. })));
	}

	#[test]
	fn seeds_named_like_the_program_local_are_renamed() {
		let rendered = render(
			r#"{
				"kind": "pdaNode",
				"name": "registry",
				"seeds": [{ "kind": "variablePdaSeedNode", "name": "program_id", "type": { "kind": "publicKeyTypeNode" } }]
			}"#,
		)
		.unwrap_or_else(|e| panic!("failed to render pda: {e}"));
		let body = &rendered.pages[0].body;
		assert!(body.contains("  required Ed25519HDPublicKey programIdSeed,"));
		assert!(body.contains("      programIdSeed.bytes,"));
		assert_eq!(body.matches("final programId =").count(), 1);
	}
}
