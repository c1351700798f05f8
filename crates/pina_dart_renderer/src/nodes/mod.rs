//! Serde model of the Codama IDL tree.
//!
//! Only the parts of the Codama node graph the Dart renderer consumes are
//! modelled. Unknown fields are ignored and unknown `kind` tags fall back to
//! explicit catch-all variants instead of failing the whole document.
//! The `codama-nodes` enums are closed and reject such kinds, which is why
//! this crate keeps its own model.

mod types;
mod values;

use serde::Deserialize;
use serde::Serialize;

pub use self::types::*;
pub use self::values::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootNode {
	#[serde(default)]
	pub standard: String,
	#[serde(default)]
	pub version: String,
	pub program: ProgramNode,
	#[serde(default)]
	pub additional_programs: Vec<ProgramNode>,
}

impl RootNode {
	/// The main program followed by any additional programs.
	pub fn programs(&self) -> impl Iterator<Item = &ProgramNode> {
		std::iter::once(&self.program).chain(self.additional_programs.iter())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramNode {
	pub name: String,
	pub public_key: String,
	#[serde(default)]
	pub version: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub origin: Option<String>,
	#[serde(default)]
	pub docs: Vec<String>,
	#[serde(default)]
	pub accounts: Vec<AccountNode>,
	#[serde(default)]
	pub instructions: Vec<InstructionNode>,
	#[serde(default)]
	pub defined_types: Vec<DefinedTypeNode>,
	#[serde(default)]
	pub pdas: Vec<PdaNode>,
	#[serde(default)]
	pub errors: Vec<ErrorNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNode {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<usize>,
	#[serde(default)]
	pub docs: Vec<String>,
	pub data: TypeNode,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pda: Option<PdaLinkNode>,
	#[serde(default)]
	pub discriminators: Vec<DiscriminatorNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionNode {
	pub name: String,
	#[serde(default)]
	pub docs: Vec<String>,
	#[serde(default)]
	pub accounts: Vec<InstructionAccountNode>,
	#[serde(default)]
	pub arguments: Vec<InstructionArgumentNode>,
	#[serde(default)]
	pub discriminators: Vec<DiscriminatorNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionAccountNode {
	pub name: String,
	#[serde(default)]
	pub is_writable: bool,
	#[serde(default)]
	pub is_signer: IsSigner,
	#[serde(default)]
	pub is_optional: bool,
	#[serde(default)]
	pub docs: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_value: Option<InputValueNode>,
}

/// `isSigner` is either a flag or the literal `"either"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IsSigner {
	Flag(bool),
	Either(EitherSigner),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EitherSigner {
	Either,
}

impl Default for IsSigner {
	fn default() -> Self {
		Self::Flag(false)
	}
}

impl IsSigner {
	/// Only a hard `true` marks the account meta as a signer.
	pub fn is_required(self) -> bool {
		matches!(self, Self::Flag(true))
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionArgumentNode {
	pub name: String,
	pub r#type: TypeNode,
	#[serde(default)]
	pub docs: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_value: Option<ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinedTypeNode {
	pub name: String,
	pub r#type: TypeNode,
	#[serde(default)]
	pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdaNode {
	pub name: String,
	#[serde(default)]
	pub docs: Vec<String>,
	#[serde(default)]
	pub seeds: Vec<PdaSeedNode>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub program_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PdaSeedNode {
	#[serde(rename = "constantPdaSeedNode")]
	Constant { r#type: TypeNode, value: ValueNode },
	#[serde(rename = "variablePdaSeedNode")]
	Variable {
		name: String,
		r#type: TypeNode,
		#[serde(default)]
		docs: Vec<String>,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdaLinkNode {
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNode {
	pub name: String,
	pub code: u32,
	#[serde(default)]
	pub message: String,
	#[serde(default)]
	pub docs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DiscriminatorNode {
	#[serde(rename = "constantDiscriminatorNode")]
	Constant {
		constant: ValueNode,
		#[serde(default)]
		offset: usize,
	},
	#[serde(rename = "fieldDiscriminatorNode")]
	Field {
		name: String,
		#[serde(default)]
		offset: usize,
	},
	#[serde(rename = "sizeDiscriminatorNode")]
	Size { size: usize },
}

/// Default values an instruction account can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum InputValueNode {
	#[serde(rename = "accountValueNode")]
	Account { name: String },
	#[serde(rename = "argumentValueNode")]
	Argument { name: String },
	#[serde(rename = "pdaValueNode")]
	Pda(PdaValueNode),
	#[serde(rename = "publicKeyValueNode")]
	PublicKey {
		#[serde(rename = "publicKey")]
		public_key: String,
	},
	#[serde(rename = "programIdValueNode")]
	ProgramId,
	#[serde(rename = "identityValueNode")]
	Identity,
	#[serde(rename = "payerValueNode")]
	Payer,
	#[serde(rename = "conditionalValueNode")]
	Conditional(ConditionalValueNode),
	#[serde(rename = "numberValueNode")]
	Number { number: serde_json::Number },
	#[serde(rename = "stringValueNode")]
	String { string: String },
	#[serde(rename = "booleanValueNode")]
	Boolean { boolean: bool },
	#[serde(rename = "bytesValueNode")]
	Bytes(BytesValueNode),
	#[serde(other)]
	Unsupported,
}

impl InputValueNode {
	/// Whether this value, and every value nested inside it, can be resolved
	/// from accounts and literals alone.
	///
	/// Argument references need caller input and are the only thing that
	/// makes this false.
	pub fn references_only_accounts(&self) -> bool {
		match self {
			Self::Argument { .. } => false,
			Self::Pda(pda) => pda.seeds.iter().all(|seed| seed.value.references_only_accounts()),
			Self::Conditional(conditional) => {
				conditional.condition.references_only_accounts()
					&& conditional
						.if_true
						.as_deref()
						.is_none_or(Self::references_only_accounts)
					&& conditional
						.if_false
						.as_deref()
						.is_none_or(Self::references_only_accounts)
			}
			Self::Account { .. }
			| Self::PublicKey { .. }
			| Self::ProgramId
			| Self::Identity
			| Self::Payer
			| Self::Number { .. }
			| Self::String { .. }
			| Self::Boolean { .. }
			| Self::Bytes(_)
			| Self::Unsupported => true,
		}
	}

	/// The literal value carried by this input, if it is one.
	pub fn as_literal(&self) -> Option<ValueNode> {
		match self {
			Self::Number { number } => {
				Some(ValueNode::Number {
					number: number.clone(),
				})
			}
			Self::String { string } => Some(ValueNode::string(string.clone())),
			Self::Boolean { boolean } => Some(ValueNode::Boolean { boolean: *boolean }),
			Self::Bytes(bytes) => Some(ValueNode::Bytes(bytes.clone())),
			Self::PublicKey { public_key } => {
				Some(ValueNode::PublicKey {
					public_key: public_key.clone(),
					identifier: None,
				})
			}
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdaValueNode {
	pub pda: PdaReference,
	#[serde(default)]
	pub seeds: Vec<PdaSeedValueNode>,
}

/// A PDA default either links to a program-level PDA or inlines one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PdaReference {
	#[serde(rename = "pdaLinkNode")]
	Link { name: String },
	#[serde(rename = "pdaNode")]
	Inline(PdaNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdaSeedValueNode {
	pub name: String,
	pub value: InputValueNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalValueNode {
	pub condition: Box<InputValueNode>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub if_true: Option<Box<InputValueNode>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub if_false: Option<Box<InputValueNode>>,
}
