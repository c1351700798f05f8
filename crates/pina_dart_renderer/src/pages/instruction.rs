//! `instructions/<name>.dart`: the instruction data class and the builder
//! function assembling accounts, data and program id.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use heck::ToUpperCamelCase;

use super::Page;
use super::Rendered;
use super::byte_list;
use super::class::BorshClass;
use super::class::borsh_imports;
use super::class::declarations;
use super::class::declared_symbols;
use super::doc_block;
use crate::codec::Codec;
use crate::codec::Length;
use crate::discriminator::DISCRIMINATOR_FIELD;
use crate::discriminator::Discriminator;
use crate::discriminator::instruction_discriminator;
use crate::error::Result;
use crate::imports::ImportMap;
use crate::manifest::FieldManifest;
use crate::manifest::FieldNaming;
use crate::manifest::FixedLength;
use crate::manifest::ResolveContext;
use crate::manifest::SOLANA;
use crate::manifest::TYPED_DATA;
use crate::manifest::TypeManifestResolver;
use crate::manifest::generated_module;
use crate::names::NameApi;
use crate::nodes::InstructionAccountNode;
use crate::nodes::InstructionNode;
use crate::nodes::ProgramNode;
use crate::pda::ResolvedPda;
use crate::pda::SeedVariable;

/// Import alias for `package:solana/encoder.dart`.
pub const SOLANA_ENCODER: &str = "solanaEncoder";

/// How the builder fills an account the caller did not pass.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountDefault {
	/// The caller must pass the account.
	None,
	/// An omitted optional account is replaced by the program id.
	Optional,
	/// A fixed address, e.g. a builtin program.
	Address(String),
	ProgramId,
	/// A PDA derivable from other accounts and literals.
	Pda {
		resolved: ResolvedPda,
		/// Program deriving the PDA when it is not the invoking one.
		program_id: Option<String>,
	},
}

/// An instruction account with its resolved default.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionAccount<'a> {
	pub node: &'a InstructionAccountNode,
	pub default: AccountDefault,
}

impl InstructionAccount<'_> {
	fn is_defaulted(&self) -> bool {
		!matches!(self.default, AccountDefault::None)
	}
}

pub fn instruction_page(
	instruction: &InstructionNode,
	accounts: &[InstructionAccount<'_>],
	program: &ProgramNode,
	resolver: &TypeManifestResolver<'_>,
) -> Result<Rendered> {
	let names = resolver.names();
	let file = names.file_name(&instruction.name);
	let data_name = names.instruction_data_type(&instruction.name);
	let program_type = names.program_type(&program.name);
	let discriminator = instruction_discriminator(instruction)?;

	let mut imports = ImportMap::new();
	imports
		.add(SOLANA, ["Ed25519HDPublicKey"])
		.add(SOLANA_ENCODER, ["AccountMeta", "ByteArray", "Instruction"])
		.add(
			generated_module("programs", &names.file_name(&program.name)),
			[program_type.clone()],
		);
	let mut defines = Vec::new();
	let mut diagnostics = Vec::new();
	let mut body = String::new();

	let has_data = !instruction.arguments.is_empty();
	if has_data {
		let ctx = ResolveContext::root(data_name.clone(), FieldNaming::Instruction);
		let manifest = resolver.resolve_arguments(&instruction.arguments, &ctx)?;
		let fields = data_fields(manifest.fields().unwrap_or_default(), &discriminator);

		let class = BorshClass {
			constants: vec![format!("static final DISCRIMINATOR = {};", byte_list(&discriminator.bytes))],
			checks: fields.iter().filter_map(length_check).collect(),
			..BorshClass::new(&data_name, &fields)
		};
		let _ = writeln!(body, "part '{file}.g.dart';");
		body.push('\n');
		body.push_str(&class.render());
		body.push_str(&declarations(&manifest.nested_declarations));
		body.push('\n');

		imports.merge_with(&borsh_imports()).merge_with(&manifest.imports);
		defines.extend([data_name.clone(), format!("B{data_name}")]);
		defines.extend(declared_symbols(&manifest.nested_declarations));
		diagnostics.extend(manifest.diagnostics);
	} else {
		imports.add(TYPED_DATA, ["Uint8List"]);
	}

	for account in accounts {
		if let AccountDefault::Pda { resolved, .. } = &account.default {
			imports.merge_with(&resolved.imports());
		}
	}

	let function = builder_function(instruction, accounts, &discriminator, &program_type, names);
	body.push_str(&function);
	defines.push(names.instruction_function(&instruction.name));

	let page = Page::new(generated_module("instructions", &file), imports, body).defining(defines);
	tracing::debug!(instruction = %instruction.name, accounts = accounts.len(), "rendered instruction page");
	Ok(Rendered::single(page, diagnostics))
}

/// Argument fields, with a leading discriminator field added when no
/// argument carries it.
fn data_fields(arguments: &[FieldManifest], discriminator: &Discriminator) -> Vec<FieldManifest> {
	let carried = arguments.iter().any(|field| {
		field.source_name == DISCRIMINATOR_FIELD || discriminator.field.as_deref() == Some(field.source_name.as_str())
	});
	if carried {
		return arguments.to_vec();
	}
	let mut fields = Vec::with_capacity(arguments.len() + 1);
	fields.push(FieldManifest {
		name: DISCRIMINATOR_FIELD.to_owned(),
		source_name: DISCRIMINATOR_FIELD.to_owned(),
		target_type: "Uint8List".to_owned(),
		codec: Codec::Bytes(Length::Fixed(discriminator.bytes.len())),
		docs: Vec::new(),
		default_value: None,
	});
	fields.extend_from_slice(arguments);
	fields
}

fn length_check(field: &FieldManifest) -> Option<String> {
	let name = &field.name;
	let check = match field.fixed_length()? {
		FixedLength::Bytes(size) => {
			format!(
				"if ({name}.length != {size}) throw ArgumentError('{name} must be exactly {size} bytes, got ${{{name}.length}}');"
			)
		}
		FixedLength::Elements(size) => {
			format!(
				"if ({name}.length != {size}) throw ArgumentError('{name} must have exactly {size} elements, got ${{{name}.length}}');"
			)
		}
	};
	Some(check)
}

fn resolved_name(name: &str) -> String {
	format!("resolved{}", name.to_upper_camel_case())
}

fn builder_function(
	instruction: &InstructionNode,
	accounts: &[InstructionAccount<'_>],
	discriminator: &Discriminator,
	program_type: &str,
	names: &dyn NameApi,
) -> String {
	let function = names.instruction_function(&instruction.name);
	let is_async = accounts
		.iter()
		.any(|account| matches!(account.default, AccountDefault::Pda { .. }));
	// Dart expression holding each account once resolved.
	let variables = accounts
		.iter()
		.map(|account| {
			let name = names.instruction_field(&account.node.name);
			let variable = if account.is_defaulted() {
				resolved_name(&name)
			} else {
				name
			};
			(account.node.name.as_str(), variable)
		})
		.collect::<BTreeMap<_, _>>();

	let mut output = if instruction.docs.is_empty() {
		format!("/// Creates a {} instruction\n", instruction.name)
	} else {
		doc_block(&instruction.docs, "")
	};
	let return_type = if is_async {
		"Future<Instruction>"
	} else {
		"Instruction"
	};
	let _ = writeln!(output, "{return_type} {function}({{");
	for account in accounts {
		let name = names.instruction_field(&account.node.name);
		output.push_str(&doc_block(&account.node.docs, "  "));
		if account.is_defaulted() {
			let _ = writeln!(output, "  Ed25519HDPublicKey? {name},");
		} else {
			let _ = writeln!(output, "  required Ed25519HDPublicKey {name},");
		}
	}
	if !instruction.arguments.is_empty() {
		let _ = writeln!(
			output,
			"  required {} data,",
			names.instruction_data_type(&instruction.name)
		);
	}
	let _ = writeln!(output, "  Ed25519HDPublicKey? programId,");
	let asynchrony = if is_async { " async" } else { "" };
	let _ = writeln!(output, "}}){asynchrony} {{");
	let _ = writeln!(
		output,
		"  final resolvedProgramId = programId ?? Ed25519HDPublicKey.fromBase58({program_type}.programId);"
	);

	for account in accounts {
		let name = names.instruction_field(&account.node.name);
		let resolved = resolved_name(&name);
		match &account.default {
			AccountDefault::None | AccountDefault::Pda { .. } => {}
			AccountDefault::Optional | AccountDefault::ProgramId => {
				let _ = writeln!(output, "  final {resolved} = {name} ?? resolvedProgramId;");
			}
			AccountDefault::Address(address) => {
				let _ = writeln!(
					output,
					"  final {resolved} = {name} ?? Ed25519HDPublicKey.fromBase58('{address}');"
				);
			}
		}
	}
	for account in accounts {
		let AccountDefault::Pda { resolved, program_id } = &account.default else {
			continue;
		};
		let name = names.instruction_field(&account.node.name);
		let deriving_program = match program_id {
			Some(program_id) => format!("Ed25519HDPublicKey.fromBase58('{program_id}')"),
			None => "resolvedProgramId".to_owned(),
		};
		let seeds = resolved.dart_seeds("resolvedProgramId", |variable| {
			match variable {
				SeedVariable::Account(referenced) => {
					variables
						.get(referenced)
						.cloned()
						.unwrap_or_else(|| names.instruction_field(referenced))
				}
				SeedVariable::Argument(argument) => format!("data.{}", names.instruction_field(argument)),
				SeedVariable::Parameter(parameter) => names.instruction_field(parameter),
			}
		});
		let _ = writeln!(
			output,
			"  final {} = {name} ?? await Ed25519HDPublicKey.findProgramAddress(",
			resolved_name(&name)
		);
		let _ = writeln!(output, "    seeds: [");
		for seed in seeds {
			let _ = writeln!(output, "      {seed},");
		}
		let _ = writeln!(output, "    ],");
		let _ = writeln!(output, "    programId: {deriving_program},");
		let _ = writeln!(output, "  );");
	}
	output.push('\n');

	if accounts.is_empty() {
		let _ = writeln!(output, "  final accounts = <AccountMeta>[];");
	} else {
		let _ = writeln!(output, "  final accounts = [");
		for account in accounts {
			let variable = variables
				.get(account.node.name.as_str())
				.cloned()
				.unwrap_or_default();
			let _ = writeln!(output, "    AccountMeta(");
			let _ = writeln!(output, "      pubKey: {variable},");
			let _ = writeln!(output, "      isSigner: {},", account.node.is_signer.is_required());
			let _ = writeln!(output, "      isWriteable: {},", account.node.is_writable);
			let _ = writeln!(output, "    ),");
		}
		let _ = writeln!(output, "  ];");
	}
	if instruction.arguments.is_empty() {
		let _ = writeln!(
			output,
			"  final instructionData = ByteArray({});",
			byte_list(&discriminator.bytes)
		);
	} else {
		let _ = writeln!(output, "  final instructionData = ByteArray(data.toBorsh());");
	}
	output.push('\n');
	let _ = writeln!(output, "  return Instruction(");
	let _ = writeln!(output, "    programId: resolvedProgramId,");
	let _ = writeln!(output, "    accounts: accounts,");
	let _ = writeln!(output, "    data: instructionData,");
	let _ = writeln!(output, "  );");
	let _ = writeln!(output, "}}");
	output
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::linkables::LinkableDictionary;
	use crate::names::DartNames;
	use crate::nodes::PdaNode;
	use crate::pda::resolve_seeds;

	fn program() -> ProgramNode {
		ProgramNode {
			name: "vault".to_owned(),
			public_key: "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS".to_owned(),
			..ProgramNode::default()
		}
	}

	fn instruction(json: &str) -> InstructionNode {
		serde_json::from_str(json).unwrap_or_else(|e| panic!("failed to parse instruction: {e}"))
	}

	fn render(instruction: &InstructionNode, defaults: Vec<AccountDefault>) -> Rendered {
		let program = program();
		let mut dictionary = LinkableDictionary::default();
		dictionary.record_program(&program);
		let resolver = TypeManifestResolver::new(&dictionary, "vault", &DartNames);
		let accounts = instruction
			.accounts
			.iter()
			.zip(defaults)
			.map(|(node, default)| InstructionAccount { node, default })
			.collect::<Vec<_>>();
		instruction_page(instruction, &accounts, &program, &resolver)
			.unwrap_or_else(|e| panic!("failed to render instruction: {e}"))
	}

	fn vault_pda(resolver_program: &ProgramNode) -> ResolvedPda {
		let pda: PdaNode = serde_json::from_str(
			r#"{
				"kind": "pdaNode",
				"name": "vault",
				"seeds": [
					{ "kind": "constantPdaSeedNode", "type": { "kind": "stringTypeNode", "encoding": "utf8" }, "value": { "kind": "stringValueNode", "string": "vault" } },
					{ "kind": "variablePdaSeedNode", "name": "owner", "type": { "kind": "publicKeyTypeNode" } }
				]
			}"#,
		)
		.unwrap_or_else(|e| panic!("failed to parse pda: {e}"));
		let provided = serde_json::from_str::<Vec<crate::nodes::PdaSeedValueNode>>(
			r#"[{ "kind": "pdaSeedValueNode", "name": "owner", "value": { "kind": "accountValueNode", "name": "authority" } }]"#,
		)
		.unwrap_or_else(|e| panic!("failed to parse seeds: {e}"));
		let mut dictionary = LinkableDictionary::default();
		dictionary.record_program(resolver_program);
		let resolver = TypeManifestResolver::new(&dictionary, &resolver_program.name, &DartNames);
		resolve_seeds(&pda, &provided, &resolver).unwrap_or_else(|e| panic!("failed to resolve seeds: {e}"))
	}

	#[test]
	fn derivable_pdas_make_the_builder_async() {
		let instruction = instruction(
			r#"{
				"kind": "instructionNode",
				"name": "deposit",
				"accounts": [
					{ "kind": "instructionAccountNode", "name": "authority", "isWritable": true, "isSigner": true },
					{ "kind": "instructionAccountNode", "name": "vault", "isWritable": true, "isSigner": false },
					{ "kind": "instructionAccountNode", "name": "systemProgram", "isWritable": false, "isSigner": false }
				],
				"arguments": [
					{ "kind": "instructionArgumentNode", "name": "amount", "type": { "kind": "numberTypeNode", "format": "u64" } }
				]
			}"#,
		);
		let rendered = render(
			&instruction,
			vec![
				AccountDefault::None,
				AccountDefault::Pda {
					resolved: vault_pda(&program()),
					program_id: None,
				},
				AccountDefault::Address("11111111111111111111111111111111".to_owned()),
			],
		);
		let page = &rendered.pages[0];
		assert_eq!(page.path, "instructions/deposit.dart");
		assert!(page.imports.contains("dartConvert", "utf8"));
		assert!(page.imports.contains(SOLANA_ENCODER, "AccountMeta"));

		let body = &page.body;
		assert!(body.starts_with("part 'deposit.g.dart';"));
		assert!(body.contains("static final DISCRIMINATOR = Uint8List.fromList([242, 35, 198, 137, 82, 225, 242, 182]);"));
		assert!(body.contains("    @BFixedBytes(8) required Uint8List discriminator,\n    @BU64() required BigInt amount,\n"));
		assert!(body.contains(
			"if (discriminator.length != 8) throw ArgumentError('discriminator must be exactly 8 bytes, got ${discriminator.length}');"
		));
		assert!(body.contains("  DepositInstructionData._();"));
		assert!(body.contains("Future<Instruction> depositInstruction({"));
		assert!(body.contains("  required Ed25519HDPublicKey authority,\n  Ed25519HDPublicKey? vault,\n"));
		assert!(body.contains(
			"  final resolvedSystemProgram = systemProgram ?? Ed25519HDPublicKey.fromBase58('11111111111111111111111111111111');"
		));
		assert!(body.contains(
			"  final resolvedVault = vault ?? await Ed25519HDPublicKey.findProgramAddress(\n    seeds: [\n      utf8.encode('vault'),\n      authority.bytes,\n    ],\n    programId: resolvedProgramId,\n  );"
		));
		assert!(body.contains("      pubKey: resolvedVault,\n      isSigner: false,\n      isWriteable: true,"));
		assert!(body.contains("  final instructionData = ByteArray(data.toBorsh());"));
	}

	#[test]
	fn argument_free_instructions_send_the_discriminator_alone() {
		let instruction = instruction(
			r#"{
				"kind": "instructionNode",
				"name": "initialize",
				"accounts": [
					{ "kind": "instructionAccountNode", "name": "payer", "isWritable": true, "isSigner": "either" },
					{ "kind": "instructionAccountNode", "name": "rent", "isWritable": false, "isSigner": false, "isOptional": true }
				]
			}"#,
		);
		let rendered = render(&instruction, vec![AccountDefault::None, AccountDefault::Optional]);
		let body = &rendered.pages[0].body;
		assert!(!body.contains("InstructionData"));
		assert!(body.starts_with("/// Creates a initialize instruction\nInstruction initializeInstruction({"));
		assert!(body.contains("  final resolvedRent = rent ?? resolvedProgramId;"));
		assert!(body.contains("      pubKey: payer,\n      isSigner: false,"));
		assert!(body.contains(
			"  final instructionData = ByteArray(Uint8List.fromList([175, 175, 109, 31, 13, 152, 155, 237]));"
		));
	}

	#[test]
	fn discriminator_arguments_are_not_duplicated() {
		let instruction = instruction(
			r#"{
				"kind": "instructionNode",
				"name": "increment",
				"arguments": [
					{
						"kind": "instructionArgumentNode",
						"name": "discriminator",
						"type": { "kind": "numberTypeNode", "format": "u8" },
						"defaultValue": { "kind": "numberValueNode", "number": 1 }
					},
					{
						"kind": "instructionArgumentNode",
						"name": "seed",
						"type": { "kind": "fixedSizeTypeNode", "size": 4, "type": { "kind": "bytesTypeNode" } }
					}
				]
			}"#,
		);
		let rendered = render(&instruction, Vec::new());
		let body = &rendered.pages[0].body;
		assert_eq!(body.matches("required int discriminator").count(), 1);
		assert!(body.contains("static final DISCRIMINATOR = Uint8List.fromList([1]);"));
		assert!(body.contains("if (seed.length != 4) throw ArgumentError('seed must be exactly 4 bytes, got ${seed.length}');"));
		assert!(body.contains("  final accounts = <AccountMeta>[];"));
	}
}
