//! Account and instruction discriminators.
//!
//! A declared constant wins over a field default, which wins over the
//! `sha256("<namespace>:<name>")[..8]` fallback.

use sha2::Digest;
use sha2::Sha256;

use crate::codec::Codec;
use crate::codec::wire::WireValue;
use crate::error::RenderError;
use crate::error::Result;
use crate::nodes::AccountNode;
use crate::nodes::DiscriminatorNode;
use crate::nodes::InstructionNode;
use crate::nodes::NumberFormat;
use crate::nodes::TypeNode;
use crate::nodes::ValueNode;

pub const DISCRIMINATOR_FIELD: &str = "discriminator";
pub const ACCOUNT_NAMESPACE: &str = "account";
pub const INSTRUCTION_NAMESPACE: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscriminatorSource {
	Constant,
	Field,
	Hash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
	pub bytes: Vec<u8>,
	pub source: DiscriminatorSource,
	/// IDL name of the field holding the discriminator, when there is one.
	pub field: Option<String>,
}

impl Discriminator {
	/// `[1, 2, 3]`, as used in Dart list literals.
	pub fn to_dart_list(&self) -> String {
		let bytes = self.bytes.iter().map(u8::to_string).collect::<Vec<_>>();
		format!("[{}]", bytes.join(", "))
	}
}

/// A field that may carry a discriminator default.
struct FieldCandidate<'a> {
	name: &'a str,
	r#type: &'a TypeNode,
	default_value: Option<&'a ValueNode>,
}

pub fn account_discriminator(account: &AccountNode) -> Result<Discriminator> {
	let fields = account
		.data
		.as_struct()
		.map(|data| {
			data.fields
				.iter()
				.map(|field| {
					FieldCandidate {
						name: &field.name,
						r#type: &field.r#type,
						default_value: field.default_value.as_ref(),
					}
				})
				.collect::<Vec<_>>()
		})
		.unwrap_or_default();
	resolve(ACCOUNT_NAMESPACE, &account.name, &account.discriminators, &fields)
}

pub fn instruction_discriminator(instruction: &InstructionNode) -> Result<Discriminator> {
	let fields = instruction
		.arguments
		.iter()
		.map(|argument| {
			FieldCandidate {
				name: &argument.name,
				r#type: &argument.r#type,
				default_value: argument.default_value.as_ref(),
			}
		})
		.collect::<Vec<_>>();
	resolve(
		INSTRUCTION_NAMESPACE,
		&instruction.name,
		&instruction.discriminators,
		&fields,
	)
}

/// First eight bytes of `sha256("<namespace>:<name>")`.
pub fn hash_discriminator(namespace: &str, name: &str) -> [u8; 8] {
	let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
	let mut bytes = [0_u8; 8];
	bytes.copy_from_slice(&digest[..8]);
	bytes
}

fn resolve(
	namespace: &str,
	name: &str,
	discriminators: &[DiscriminatorNode],
	fields: &[FieldCandidate<'_>],
) -> Result<Discriminator> {
	let context = format!("{namespace}:{name}");

	for node in discriminators {
		if let DiscriminatorNode::Constant { constant, .. } = node {
			return Ok(Discriminator {
				bytes: value_bytes(constant, None, &context)?,
				source: DiscriminatorSource::Constant,
				field: None,
			});
		}
	}

	let named = discriminators.iter().filter_map(|node| {
		match node {
			DiscriminatorNode::Field { name, .. } => Some(name.as_str()),
			_ => None,
		}
	});
	for field_name in named.chain([DISCRIMINATOR_FIELD]) {
		let Some(field) = fields.iter().find(|field| field.name == field_name) else {
			continue;
		};
		let Some(default_value) = field.default_value else {
			continue;
		};
		return Ok(Discriminator {
			bytes: value_bytes(default_value, Some(field.r#type), &context)?,
			source: DiscriminatorSource::Field,
			field: Some(field.name.to_owned()),
		});
	}

	Ok(Discriminator {
		bytes: hash_discriminator(namespace, name).to_vec(),
		source: DiscriminatorSource::Hash,
		field: None,
	})
}

/// Raw bytes of a discriminator value. Numbers are written at the width of
/// `r#type`, which defaults to `u8`.
fn value_bytes(value: &ValueNode, r#type: Option<&TypeNode>, context: &str) -> Result<Vec<u8>> {
	match value {
		ValueNode::Constant { r#type, value } => value_bytes(value, Some(r#type.as_ref()), context),
		ValueNode::Bytes(bytes) => bytes.decode(context),
		ValueNode::String { string } => Ok(string.as_bytes().to_vec()),
		ValueNode::Array { .. } => {
			value
				.as_byte_array(context)?
				.ok_or_else(|| RenderError::codec(context, "expected a byte array"))
		}
		ValueNode::Number { number } => {
			let format = match r#type {
				Some(TypeNode::Number(node)) => node.format,
				Some(TypeNode::FixedSize(fixed)) => {
					return value_bytes(value, Some(fixed.r#type.as_ref()), context);
				}
				_ => NumberFormat::U8,
			};
			let wire = match (number.as_u64(), number.as_i64()) {
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
			Codec::Number(format).encode_to_vec(&wire)
		}
		_ => {
			Err(RenderError::UnsupportedValue {
				context: context.to_owned(),
				kind: value.kind(),
				reason: "discriminators must be bytes, byte arrays, strings or numbers".to_owned(),
			})
		}
	}
}
