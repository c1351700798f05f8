//! PDA seed resolution.
//!
//! Seeds are resolved in declaration order, which is the on-chain order. Each
//! seed becomes a [`SeedExpr`] that can be rendered as Dart or evaluated here
//! against concrete inputs.

use std::collections::BTreeMap;
use std::str::FromStr;

use heck::ToUpperCamelCase;
use solana_address::Address;

use crate::codec::Codec;
use crate::codec::DefinedKind;
use crate::codec::wire::WireValue;
use crate::error::RenderError;
use crate::error::Result;
use crate::imports::ImportMap;
use crate::manifest::FieldNaming;
use crate::manifest::ResolveContext;
use crate::manifest::TYPED_DATA;
use crate::manifest::TypeManifestResolver;
use crate::nodes::InputValueNode;
use crate::nodes::NumberFormat;
use crate::nodes::PdaNode;
use crate::nodes::PdaSeedNode;
use crate::nodes::PdaSeedValueNode;
use crate::nodes::TypeNode;
use crate::nodes::ValueNode;

pub const MAX_SEED_LEN: usize = 32;
/// Including the bump seed appended during derivation.
pub const MAX_SEEDS: usize = 16;

/// Import alias for `dart:convert`.
pub const DART_CONVERT: &str = "dartConvert";
/// Root relative module holding the integer seed encoders.
pub const SHARED_MODULE: &str = "shared.dart";

/// How a variable seed value turns into bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedEncoding {
	/// Raw UTF-8, without a length prefix.
	Utf8,
	/// Little endian at the declared width.
	Number(NumberFormat),
	Bool(NumberFormat),
	/// The 32 address bytes.
	PublicKey,
	/// Raw bytes, without a length prefix.
	Bytes,
	/// The Borsh encoding of a defined struct.
	Borsh(Codec),
}

impl SeedEncoding {
	fn of(node: &TypeNode, resolver: &TypeManifestResolver<'_>, seed: &str) -> Result<(Self, String)> {
		let manifest = resolver.resolve(node, &ResolveContext::root(seed, FieldNaming::Instruction))?;
		let encoding = match &manifest.codec {
			Codec::String(_) => Self::Utf8,
			Codec::Number(format) => Self::Number(*format),
			Codec::Bool(format) => Self::Bool(*format),
			Codec::PublicKey => Self::PublicKey,
			Codec::Bytes(_) => Self::Bytes,
			Codec::TypedArray { item, .. } if **item == Codec::Number(NumberFormat::U8) => Self::Bytes,
			Codec::Defined(defined) if defined.kind == DefinedKind::Struct => {
				Self::Borsh(manifest.codec.clone())
			}
			_ => {
				return Err(RenderError::UnsupportedType {
					context: seed.to_owned(),
					kind: node.kind(),
					reason: "this type cannot be used as a PDA seed".to_owned(),
				});
			}
		};
		Ok((encoding, manifest.target_type))
	}

	/// Bytes of `value` under this encoding.
	pub fn encode(&self, value: &WireValue, seed: &str) -> Result<Vec<u8>> {
		let mismatch = || {
			RenderError::codec(
				seed,
				format!("value {value:?} does not match the seed encoding {self:?}"),
			)
		};
		match (self, value) {
			(Self::Utf8, WireValue::String(string)) => Ok(string.as_bytes().to_vec()),
			(Self::Bytes, WireValue::Bytes(bytes)) => Ok(bytes.clone()),
			(Self::PublicKey, WireValue::PublicKey(address)) => Ok(address.to_vec()),
			(Self::Number(format), _) => Codec::Number(*format).encode_to_vec(value),
			(Self::Bool(format), _) => Codec::Bool(*format).encode_to_vec(value),
			(Self::Borsh(codec), _) => codec.encode_to_vec(value),
			_ => Err(mismatch()),
		}
	}

	fn dart_expression(&self, variable: &str) -> String {
		match self {
			Self::Utf8 => format!("utf8.encode({variable})"),
			Self::Number(format) => format!("{}({variable})", encoder_name(*format)),
			Self::Bool(format) => format!("{}({variable} ? 1 : 0)", encoder_name(*format)),
			Self::PublicKey => format!("{variable}.bytes"),
			Self::Bytes => variable.to_owned(),
			Self::Borsh(_) => format!("{variable}.toBorsh()"),
		}
	}

	fn add_imports(&self, imports: &mut ImportMap) {
		match self {
			Self::Utf8 => {
				imports.add(DART_CONVERT, ["utf8"]);
			}
			Self::Number(format) | Self::Bool(format) => {
				imports.add(SHARED_MODULE, [encoder_name(*format)]);
			}
			Self::PublicKey | Self::Bytes | Self::Borsh(_) => {}
		}
	}
}

/// Name of the `shared.dart` helper encoding `format`, e.g. `encodeU64`.
pub fn encoder_name(format: NumberFormat) -> String {
	format!("encode{}", format.as_str().to_upper_camel_case())
}

/// One byte producing seed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedExpr {
	Utf8(String),
	Bytes(Vec<u8>),
	ProgramId,
	/// Address of an instruction account.
	Account {
		name: String,
	},
	/// Serialized value of an instruction argument.
	Argument {
		name: String,
		encoding: SeedEncoding,
	},
	/// A value no default provides. The caller must pass it.
	Parameter {
		name: String,
		encoding: SeedEncoding,
	},
}

/// What a Dart seed expression refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedVariable<'a> {
	Account(&'a str),
	Argument(&'a str),
	Parameter(&'a str),
}

impl SeedExpr {
	/// Renders the Dart expression producing this seed.
	///
	/// `variable` maps an account, argument or parameter to the Dart
	/// expression holding it.
	pub fn dart_expression(&self, program_id: &str, variable: impl Fn(SeedVariable<'_>) -> String) -> String {
		match self {
			Self::Utf8(string) => format!("utf8.encode('{}')", escape_dart(string)),
			Self::Bytes(bytes) => {
				let bytes = bytes.iter().map(u8::to_string).collect::<Vec<_>>();
				format!("Uint8List.fromList([{}])", bytes.join(", "))
			}
			Self::ProgramId => format!("{program_id}.bytes"),
			Self::Account { name } => format!("{}.bytes", variable(SeedVariable::Account(name))),
			Self::Argument { name, encoding } => {
				encoding.dart_expression(&variable(SeedVariable::Argument(name)))
			}
			Self::Parameter { name, encoding } => {
				encoding.dart_expression(&variable(SeedVariable::Parameter(name)))
			}
		}
	}

	/// Evaluates the seed against concrete inputs.
	pub fn to_bytes(&self, inputs: &SeedInputs) -> Result<Vec<u8>> {
		match self {
			Self::Utf8(string) => Ok(string.as_bytes().to_vec()),
			Self::Bytes(bytes) => Ok(bytes.clone()),
			Self::ProgramId => Ok(inputs.program_id.to_bytes().to_vec()),
			Self::Account { name } => {
				inputs
					.accounts
					.get(name)
					.map(|address| address.to_bytes().to_vec())
					.ok_or_else(|| RenderError::MissingSeedInput { seed: name.clone() })
			}
			Self::Argument { name, encoding } | Self::Parameter { name, encoding } => {
				let value = inputs
					.values
					.get(name)
					.ok_or_else(|| RenderError::MissingSeedInput { seed: name.clone() })?;
				encoding.encode(value, name)
			}
		}
	}

	fn add_imports(&self, imports: &mut ImportMap) {
		match self {
			Self::Utf8(_) => {
				imports.add(DART_CONVERT, ["utf8"]);
			}
			Self::Bytes(_) => {
				imports.add(TYPED_DATA, ["Uint8List"]);
			}
			Self::Argument { encoding, .. } | Self::Parameter { encoding, .. } => {
				encoding.add_imports(imports);
			}
			Self::ProgramId | Self::Account { .. } => {}
		}
	}
}

/// A seed value the generated function must take as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedParameter {
	pub name: String,
	pub target_type: String,
	pub encoding: SeedEncoding,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPda {
	pub name: String,
	pub seeds: Vec<SeedExpr>,
	pub parameters: Vec<SeedParameter>,
	/// True when the address can be derived from known accounts, literals
	/// and the program id alone.
	pub auto_derivable: bool,
}

/// Concrete values used to evaluate seeds outside of Dart.
#[derive(Debug, Clone)]
pub struct SeedInputs {
	pub program_id: Address,
	pub accounts: BTreeMap<String, Address>,
	/// Argument and parameter values by name.
	pub values: BTreeMap<String, WireValue>,
}

impl SeedInputs {
	pub fn new(program_id: Address) -> Self {
		Self {
			program_id,
			accounts: BTreeMap::new(),
			values: BTreeMap::new(),
		}
	}

	#[must_use]
	pub fn with_account(mut self, name: impl Into<String>, address: Address) -> Self {
		self.accounts.insert(name.into(), address);
		self
	}

	#[must_use]
	pub fn with_value(mut self, name: impl Into<String>, value: WireValue) -> Self {
		self.values.insert(name.into(), value);
		self
	}
}

impl ResolvedPda {
	/// Checks the limits that hold whatever the inputs are: the seed count
	/// and the length of literal seeds.
	pub fn check_limits(&self) -> Result<()> {
		if self.seeds.len() >= MAX_SEEDS {
			return Err(RenderError::TooManySeeds {
				count: self.seeds.len(),
			});
		}
		for (position, seed) in self.seeds.iter().enumerate() {
			let len = match seed {
				SeedExpr::Utf8(string) => string.len(),
				SeedExpr::Bytes(bytes) => bytes.len(),
				_ => continue,
			};
			if len > MAX_SEED_LEN {
				return Err(RenderError::SeedTooLong {
					seed: format!("{}[{position}]", self.name),
					len,
				});
			}
		}
		Ok(())
	}

	/// Evaluates every seed, enforcing the runtime seed limits.
	pub fn seed_bytes(&self, inputs: &SeedInputs) -> Result<Vec<Vec<u8>>> {
		if self.seeds.len() >= MAX_SEEDS {
			return Err(RenderError::TooManySeeds {
				count: self.seeds.len(),
			});
		}
		self.seeds
			.iter()
			.enumerate()
			.map(|(position, seed)| {
				let bytes = seed.to_bytes(inputs)?;
				if bytes.len() > MAX_SEED_LEN {
					return Err(RenderError::SeedTooLong {
						seed: format!("{}[{position}]", self.name),
						len: bytes.len(),
					});
				}
				Ok(bytes)
			})
			.collect()
	}

	/// Derives the address and bump the on-chain program would compute.
	pub fn find_program_address(&self, inputs: &SeedInputs) -> Result<(Address, u8)> {
		let seeds = self.seed_bytes(inputs)?;
		let seeds = seeds.iter().map(Vec::as_slice).collect::<Vec<_>>();
		Address::try_find_program_address(&seeds, &inputs.program_id).ok_or_else(|| {
			RenderError::NoViableBump {
				pda: self.name.clone(),
			}
		})
	}

	/// Imports the Dart seed expressions need.
	pub fn imports(&self) -> ImportMap {
		let mut imports = ImportMap::new();
		for seed in &self.seeds {
			seed.add_imports(&mut imports);
		}
		imports
	}

	/// Renders every seed, in order.
	pub fn dart_seeds(&self, program_id: &str, variable: impl Fn(SeedVariable<'_>) -> String) -> Vec<String> {
		self.seeds
			.iter()
			.map(|seed| seed.dart_expression(program_id, &variable))
			.collect()
	}
}

/// Resolves the seeds of `pda`, binding variable seeds through `provided`.
///
/// Variable seeds without a provided value become [`SeedExpr::Parameter`]s.
pub fn resolve_seeds(
	pda: &PdaNode,
	provided: &[PdaSeedValueNode],
	resolver: &TypeManifestResolver<'_>,
) -> Result<ResolvedPda> {
	let mut seeds = Vec::with_capacity(pda.seeds.len());
	let mut parameters = Vec::new();
	let mut auto_derivable = true;

	for seed in &pda.seeds {
		match seed {
			PdaSeedNode::Constant { r#type, value } => {
				seeds.push(constant_seed(value, r#type, &pda.name)?);
			}
			PdaSeedNode::Variable { name, r#type, .. } => {
				let binding = provided.iter().find(|value| value.name == *name);
				let Some(binding) = binding else {
					let (encoding, target_type) = SeedEncoding::of(r#type, resolver, name)?;
					parameters.push(SeedParameter {
						name: name.clone(),
						target_type,
						encoding: encoding.clone(),
					});
					seeds.push(SeedExpr::Parameter {
						name: name.clone(),
						encoding,
					});
					auto_derivable = false;
					continue;
				};

				auto_derivable &= binding.value.references_only_accounts();
				seeds.push(bound_seed(&binding.value, name, r#type, resolver)?);
			}
		}
	}

	Ok(ResolvedPda {
		name: pda.name.clone(),
		seeds,
		parameters,
		auto_derivable,
	})
}

fn bound_seed(
	value: &InputValueNode,
	seed: &str,
	r#type: &TypeNode,
	resolver: &TypeManifestResolver<'_>,
) -> Result<SeedExpr> {
	match value {
		InputValueNode::Account { name } => Ok(SeedExpr::Account { name: name.clone() }),
		InputValueNode::Argument { name } => {
			let (encoding, _) = SeedEncoding::of(r#type, resolver, seed)?;
			Ok(SeedExpr::Argument {
				name: name.clone(),
				encoding,
			})
		}
		InputValueNode::ProgramId => Ok(SeedExpr::ProgramId),
		other => {
			let Some(literal) = other.as_literal() else {
				return Err(RenderError::UnsupportedValue {
					context: seed.to_owned(),
					kind: "inputValueNode",
					reason: format!("{other:?} cannot provide a PDA seed"),
				});
			};
			constant_seed(&literal, r#type, seed)
		}
	}
}

fn constant_seed(value: &ValueNode, r#type: &TypeNode, context: &str) -> Result<SeedExpr> {
	match value {
		ValueNode::String { string } => Ok(SeedExpr::Utf8(string.clone())),
		ValueNode::ProgramId => Ok(SeedExpr::ProgramId),
		ValueNode::Bytes(bytes) => bytes.decode(context).map(SeedExpr::Bytes),
		ValueNode::Array { .. } => {
			value
				.as_byte_array(context)?
				.map(SeedExpr::Bytes)
				.ok_or_else(|| RenderError::codec(context, "expected a byte array"))
		}
		ValueNode::PublicKey { public_key, .. } => {
			parse_address(public_key, context).map(|address| SeedExpr::Bytes(address.to_bytes().to_vec()))
		}
		ValueNode::Boolean { boolean } => Ok(SeedExpr::Bytes(vec![u8::from(*boolean)])),
		ValueNode::Number { number } => {
			let Some(format) = r#type.as_plain_number() else {
				return Err(RenderError::UnsupportedValue {
					context: context.to_owned(),
					kind: value.kind(),
					reason: format!("number seeds need a little endian number type, got `{}`", r#type.kind()),
				});
			};
			let value = match (number.as_u64(), number.as_i64()) {
				(Some(unsigned), _) => WireValue::Unsigned(unsigned.into()),
				(None, Some(signed)) => WireValue::Signed(signed.into()),
				(None, None) => {
					return Err(RenderError::UnsupportedValue {
						context: context.to_owned(),
						kind: value.kind(),
						reason: format!("`{number}` is not an integer"),
					});
				}
			};
			Codec::Number(format).encode_to_vec(&value).map(SeedExpr::Bytes)
		}
		ValueNode::Constant { r#type, value } => constant_seed(value, r#type, context),
		_ => {
			Err(RenderError::UnsupportedValue {
				context: context.to_owned(),
				kind: value.kind(),
				reason: "this value cannot be used as a PDA seed".to_owned(),
			})
		}
	}
}

pub fn parse_address(value: &str, context: &str) -> Result<Address> {
	Address::from_str(value).map_err(|_| {
		RenderError::InvalidAddress {
			context: context.to_owned(),
			value: value.to_owned(),
		}
	})
}

/// Escapes a string for a single quoted Dart literal.
pub fn escape_dart(value: &str) -> String {
	value
		.replace('\\', "\\\\")
		.replace('\'', "\\'")
		.replace('$', "\\$")
		.replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::linkables::LinkableDictionary;
	use crate::names::DartNames;
	use crate::nodes::ProgramNode;

	const PROGRAM_ID: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";
	const OWNER: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";

	fn pda(json: &str) -> PdaNode {
		serde_json::from_str(json).unwrap_or_else(|e| panic!("failed to parse pda: {e}"))
	}

	fn provided(json: &str) -> Vec<PdaSeedValueNode> {
		serde_json::from_str(json).unwrap_or_else(|e| panic!("failed to parse seed values: {e}"))
	}

	fn resolve(pda: &PdaNode, provided: &[PdaSeedValueNode]) -> ResolvedPda {
		let mut dictionary = LinkableDictionary::default();
		dictionary.record_program(&ProgramNode {
			name: "vault".to_owned(),
			public_key: PROGRAM_ID.to_owned(),
			..ProgramNode::default()
		});
		let resolver = TypeManifestResolver::new(&dictionary, "vault", &DartNames);
		resolve_seeds(pda, provided, &resolver).unwrap_or_else(|e| panic!("failed to resolve seeds: {e}"))
	}

	fn address(value: &str) -> Address {
		parse_address(value, "test").unwrap_or_else(|e| panic!("{e}"))
	}

	fn vault_pda() -> PdaNode {
		pda(
			r#"{
				"kind": "pdaNode",
				"name": "vault",
				"seeds": [
					{ "kind": "constantPdaSeedNode", "type": { "kind": "stringTypeNode", "encoding": "utf8" }, "value": { "kind": "stringValueNode", "string": "vault" } },
					{ "kind": "variablePdaSeedNode", "name": "owner", "type": { "kind": "publicKeyTypeNode" } }
				]
			}"#,
		)
	}

	#[test]
	fn vault_seeds_resolve_in_declared_order() {
		let resolved = resolve(
			&vault_pda(),
			&provided(r#"[{ "kind": "pdaSeedValueNode", "name": "owner", "value": { "kind": "accountValueNode", "name": "owner" } }]"#),
		);
		assert_eq!(
			resolved.seeds,
			vec![
				SeedExpr::Utf8("vault".to_owned()),
				SeedExpr::Account {
					name: "owner".to_owned(),
				},
			]
		);
		assert!(resolved.auto_derivable);
		assert!(resolved.parameters.is_empty());

		let owner = address(OWNER);
		let inputs = SeedInputs::new(address(PROGRAM_ID)).with_account("owner", owner.clone());
		let seeds = resolved
			.seed_bytes(&inputs)
			.unwrap_or_else(|e| panic!("failed to evaluate seeds: {e}"));
		assert_eq!(seeds, vec![b"vault".to_vec(), owner.to_bytes().to_vec()]);

		let (derived, bump) = resolved
			.find_program_address(&inputs)
			.unwrap_or_else(|e| panic!("failed to derive: {e}"));
		let expected = Address::try_find_program_address(&[b"vault".as_slice(), owner.as_ref()], &address(PROGRAM_ID))
			.unwrap_or_else(|| panic!("no bump"));
		assert_eq!((derived.clone(), bump), expected);
		let recreated = Address::create_program_address(&[b"vault".as_slice(), owner.as_ref(), &[bump]], &address(PROGRAM_ID))
			.unwrap_or_else(|e| panic!("failed to recreate: {e:?}"));
		assert_eq!(derived, recreated);

		let dart = resolved.dart_seeds("programId", |variable| {
			match variable {
				SeedVariable::Account(name) | SeedVariable::Argument(name) | SeedVariable::Parameter(name) => name.to_owned(),
			}
		});
		assert_eq!(dart, vec!["utf8.encode('vault')", "owner.bytes"]);
	}

	#[test]
	fn empty_seed_lists_are_valid() {
		let resolved = resolve(&pda(r#"{ "kind": "pdaNode", "name": "global" }"#), &[]);
		assert!(resolved.seeds.is_empty());
		assert!(resolved.auto_derivable);
		let seeds = resolved
			.seed_bytes(&SeedInputs::new(address(PROGRAM_ID)))
			.unwrap_or_else(|e| panic!("failed to evaluate seeds: {e}"));
		assert!(seeds.is_empty());
	}

	#[test]
	fn argument_bound_seeds_are_not_auto_derivable() {
		let node = pda(
			r#"{
				"kind": "pdaNode",
				"name": "ticket",
				"seeds": [
					{ "kind": "variablePdaSeedNode", "name": "label", "type": { "kind": "sizePrefixTypeNode", "type": { "kind": "stringTypeNode", "encoding": "utf8" }, "prefix": { "kind": "numberTypeNode", "format": "u32" } } },
					{ "kind": "variablePdaSeedNode", "name": "id", "type": { "kind": "numberTypeNode", "format": "u64" } }
				]
			}"#,
		);
		let resolved = resolve(
			&node,
			&provided(
				r#"[
					{ "kind": "pdaSeedValueNode", "name": "label", "value": { "kind": "argumentValueNode", "name": "label" } },
					{ "kind": "pdaSeedValueNode", "name": "id", "value": { "kind": "argumentValueNode", "name": "id" } }
				]"#,
			),
		);
		assert!(!resolved.auto_derivable);

		let inputs = SeedInputs::new(address(PROGRAM_ID))
			.with_value("label", WireValue::String("ab".to_owned()))
			.with_value("id", WireValue::Unsigned(7));
		let seeds = resolved
			.seed_bytes(&inputs)
			.unwrap_or_else(|e| panic!("failed to evaluate seeds: {e}"));
		// Strings seed without their length prefix, numbers at their width.
		assert_eq!(seeds, vec![b"ab".to_vec(), vec![7, 0, 0, 0, 0, 0, 0, 0]]);

		let dart = resolved.dart_seeds("programId", |variable| {
			match variable {
				SeedVariable::Account(name) | SeedVariable::Argument(name) | SeedVariable::Parameter(name) => name.to_owned(),
			}
		});
		assert_eq!(dart, vec!["utf8.encode(label)", "encodeU64(id)"]);
		assert!(resolved.imports().contains(SHARED_MODULE, "encodeU64"));
	}

	#[test]
	fn unbound_variable_seeds_become_parameters() {
		let resolved = resolve(&vault_pda(), &[]);
		assert!(!resolved.auto_derivable);
		assert_eq!(resolved.parameters.len(), 1);
		assert_eq!(resolved.parameters[0].target_type, "Ed25519HDPublicKey");
		assert_eq!(
			resolved.seeds[1],
			SeedExpr::Parameter {
				name: "owner".to_owned(),
				encoding: SeedEncoding::PublicKey,
			}
		);
	}

	#[test]
	fn seed_limits_are_enforced() {
		let long = ResolvedPda {
			name: "long".to_owned(),
			seeds: vec![SeedExpr::Bytes(vec![0; 33])],
			parameters: Vec::new(),
			auto_derivable: true,
		};
		let inputs = SeedInputs::new(address(PROGRAM_ID));
		assert!(matches!(
			long.seed_bytes(&inputs),
			Err(RenderError::SeedTooLong { len: 33, .. })
		));

		let many = ResolvedPda {
			name: "many".to_owned(),
			seeds: vec![SeedExpr::Bytes(vec![1]); MAX_SEEDS],
			parameters: Vec::new(),
			auto_derivable: true,
		};
		assert!(matches!(
			many.seed_bytes(&inputs),
			Err(RenderError::TooManySeeds { count: 16 })
		));
		assert!(matches!(
			many.check_limits(),
			Err(RenderError::TooManySeeds { count: 16 })
		));
		assert!(matches!(long.check_limits(), Err(RenderError::SeedTooLong { len: 33, .. })));
	}

	#[test]
	fn missing_inputs_are_reported() {
		let resolved = resolve(
			&vault_pda(),
			&provided(r#"[{ "kind": "pdaSeedValueNode", "name": "owner", "value": { "kind": "accountValueNode", "name": "owner" } }]"#),
		);
		let result = resolved.seed_bytes(&SeedInputs::new(address(PROGRAM_ID)));
		assert!(matches!(result, Err(RenderError::MissingSeedInput { seed }) if seed == "owner"));
	}

	#[test]
	fn number_seeds_need_a_number_type() {
		let numeric = pda(
			r#"{
				"kind": "pdaNode",
				"name": "slot",
				"seeds": [{ "kind": "constantPdaSeedNode", "type": { "kind": "numberTypeNode", "format": "u16", "endian": "le" }, "value": { "kind": "numberValueNode", "number": 258 } }]
			}"#,
		);
		assert_eq!(resolve(&numeric, &[]).seeds, vec![SeedExpr::Bytes(vec![2, 1])]);

		let mistyped = pda(
			r#"{
				"kind": "pdaNode",
				"name": "slot",
				"seeds": [{ "kind": "constantPdaSeedNode", "type": { "kind": "stringTypeNode", "encoding": "utf8" }, "value": { "kind": "numberValueNode", "number": 7 } }]
			}"#,
		);
		let dictionary = LinkableDictionary::default();
		let resolver = TypeManifestResolver::new(&dictionary, "vault", &DartNames);
		let result = resolve_seeds(&mistyped, &[], &resolver);
		assert!(matches!(result, Err(RenderError::UnsupportedValue { .. })));
	}
}
