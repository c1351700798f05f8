use serde::Deserialize;
use serde::Serialize;

use super::values::ValueNode;

/// Numeric formats understood by Codama `numberTypeNode`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberFormat {
	U8,
	U16,
	U32,
	U64,
	U128,
	I8,
	I16,
	I32,
	I64,
	I128,
	F32,
	F64,
	ShortU16,
}

impl NumberFormat {
	pub const ALL_FIXED: [Self; 12] = [
		Self::U8,
		Self::U16,
		Self::U32,
		Self::U64,
		Self::U128,
		Self::I8,
		Self::I16,
		Self::I32,
		Self::I64,
		Self::I128,
		Self::F32,
		Self::F64,
	];

	/// Encoded width in bytes. `shortU16` is variable (1 to 3 bytes).
	pub fn byte_width(self) -> Option<usize> {
		match self {
			Self::U8 | Self::I8 => Some(1),
			Self::U16 | Self::I16 => Some(2),
			Self::U32 | Self::I32 | Self::F32 => Some(4),
			Self::U64 | Self::I64 | Self::F64 => Some(8),
			Self::U128 | Self::I128 => Some(16),
			Self::ShortU16 => None,
		}
	}

	/// Worst-case encoded width in bytes.
	pub fn max_width(self) -> usize {
		self.byte_width().unwrap_or(3)
	}

	pub fn is_float(self) -> bool {
		matches!(self, Self::F32 | Self::F64)
	}

	pub fn is_signed(self) -> bool {
		matches!(
			self,
			Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::I128 | Self::F32 | Self::F64
		)
	}

	/// Integers of 64 bits or more, which need an arbitrary precision
	/// representation on the Dart side.
	pub fn is_wide_integer(self) -> bool {
		matches!(self, Self::U64 | Self::U128 | Self::I64 | Self::I128)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::U8 => "u8",
			Self::U16 => "u16",
			Self::U32 => "u32",
			Self::U64 => "u64",
			Self::U128 => "u128",
			Self::I8 => "i8",
			Self::I16 => "i16",
			Self::I32 => "i32",
			Self::I64 => "i64",
			Self::I128 => "i128",
			Self::F32 => "f32",
			Self::F64 => "f64",
			Self::ShortU16 => "shortU16",
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endian {
	#[default]
	Le,
	Be,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberTypeNode {
	pub format: NumberFormat,
	#[serde(default)]
	pub endian: Endian,
}

impl NumberTypeNode {
	pub const fn le(format: NumberFormat) -> Self {
		Self {
			format,
			endian: Endian::Le,
		}
	}

	pub(crate) fn u8() -> Self {
		Self::le(NumberFormat::U8)
	}

	pub(crate) fn u32() -> Self {
		Self::le(NumberFormat::U32)
	}
}

/// Encodings used by `stringTypeNode` and `bytesValueNode`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BytesEncoding {
	Base16,
	Base58,
	Base64,
	#[default]
	Utf8,
}

/// Every Codama type node kind, discriminated by the JSON `kind` tag.
///
/// Kinds that alter the binary layout in ways the Dart Borsh annotations
/// cannot express are modelled explicitly so the resolver can reject them.
/// Anything else lands in [`TypeNode::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeNode {
	#[serde(rename = "numberTypeNode")]
	Number(NumberTypeNode),
	#[serde(rename = "booleanTypeNode")]
	Boolean(BooleanTypeNode),
	#[serde(rename = "stringTypeNode")]
	String(StringTypeNode),
	#[serde(rename = "bytesTypeNode")]
	Bytes,
	#[serde(rename = "publicKeyTypeNode")]
	PublicKey,
	#[serde(rename = "arrayTypeNode")]
	Array(ArrayTypeNode),
	#[serde(rename = "optionTypeNode")]
	Option(OptionTypeNode),
	#[serde(rename = "setTypeNode")]
	Set(SetTypeNode),
	#[serde(rename = "mapTypeNode")]
	Map(MapTypeNode),
	#[serde(rename = "tupleTypeNode")]
	Tuple(TupleTypeNode),
	#[serde(rename = "fixedSizeTypeNode")]
	FixedSize(FixedSizeTypeNode),
	#[serde(rename = "sizePrefixTypeNode")]
	SizePrefix(SizePrefixTypeNode),
	#[serde(rename = "definedTypeLinkNode")]
	DefinedTypeLink(DefinedTypeLinkNode),
	#[serde(rename = "structTypeNode")]
	Struct(StructTypeNode),
	#[serde(rename = "enumTypeNode")]
	Enum(EnumTypeNode),
	#[serde(rename = "amountTypeNode")]
	Amount(WrappedNumberTypeNode),
	#[serde(rename = "solAmountTypeNode")]
	SolAmount(WrappedNumberTypeNode),
	#[serde(rename = "dateTimeTypeNode")]
	DateTime(WrappedNumberTypeNode),
	#[serde(rename = "hiddenPrefixTypeNode")]
	HiddenPrefix,
	#[serde(rename = "hiddenSuffixTypeNode")]
	HiddenSuffix,
	#[serde(rename = "preOffsetTypeNode")]
	PreOffset,
	#[serde(rename = "postOffsetTypeNode")]
	PostOffset,
	#[serde(rename = "sentinelTypeNode")]
	Sentinel,
	#[serde(rename = "zeroableOptionTypeNode")]
	ZeroableOption,
	#[serde(rename = "remainderOptionTypeNode")]
	RemainderOption,
	#[serde(other)]
	Unknown,
}

impl TypeNode {
	/// The Codama `kind` tag of this node.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Number(_) => "numberTypeNode",
			Self::Boolean(_) => "booleanTypeNode",
			Self::String(_) => "stringTypeNode",
			Self::Bytes => "bytesTypeNode",
			Self::PublicKey => "publicKeyTypeNode",
			Self::Array(_) => "arrayTypeNode",
			Self::Option(_) => "optionTypeNode",
			Self::Set(_) => "setTypeNode",
			Self::Map(_) => "mapTypeNode",
			Self::Tuple(_) => "tupleTypeNode",
			Self::FixedSize(_) => "fixedSizeTypeNode",
			Self::SizePrefix(_) => "sizePrefixTypeNode",
			Self::DefinedTypeLink(_) => "definedTypeLinkNode",
			Self::Struct(_) => "structTypeNode",
			Self::Enum(_) => "enumTypeNode",
			Self::Amount(_) => "amountTypeNode",
			Self::SolAmount(_) => "solAmountTypeNode",
			Self::DateTime(_) => "dateTimeTypeNode",
			Self::HiddenPrefix => "hiddenPrefixTypeNode",
			Self::HiddenSuffix => "hiddenSuffixTypeNode",
			Self::PreOffset => "preOffsetTypeNode",
			Self::PostOffset => "postOffsetTypeNode",
			Self::Sentinel => "sentinelTypeNode",
			Self::ZeroableOption => "zeroableOptionTypeNode",
			Self::RemainderOption => "remainderOptionTypeNode",
			Self::Unknown => "unknown",
		}
	}

	pub fn number(format: NumberFormat) -> Self {
		Self::Number(NumberTypeNode::le(format))
	}

	pub fn string() -> Self {
		Self::String(StringTypeNode::default())
	}

	pub fn boolean() -> Self {
		Self::Boolean(BooleanTypeNode::default())
	}

	pub fn array(item: Self, count: CountNode) -> Self {
		Self::Array(ArrayTypeNode {
			item: Box::new(item),
			count,
		})
	}

	pub fn option(item: Self) -> Self {
		Self::Option(OptionTypeNode {
			item: Box::new(item),
			prefix: NumberTypeNode::u8(),
			fixed: false,
		})
	}

	pub fn fixed_size(inner: Self, size: usize) -> Self {
		Self::FixedSize(FixedSizeTypeNode {
			r#type: Box::new(inner),
			size,
		})
	}

	pub fn size_prefix(inner: Self, prefix: NumberFormat) -> Self {
		Self::SizePrefix(SizePrefixTypeNode {
			r#type: Box::new(inner),
			prefix: NumberTypeNode::le(prefix),
		})
	}

	pub fn defined(name: impl Into<String>) -> Self {
		Self::DefinedTypeLink(DefinedTypeLinkNode {
			name: name.into(),
			program: None,
		})
	}

	/// Strips layout wrappers until a struct is found.
	pub fn as_struct(&self) -> Option<&StructTypeNode> {
		match self {
			Self::Struct(node) => Some(node),
			Self::FixedSize(node) => node.r#type.as_struct(),
			Self::SizePrefix(node) => node.r#type.as_struct(),
			_ => None,
		}
	}

	/// Whether this node is a plain number a typed list can pack.
	pub fn as_plain_number(&self) -> Option<NumberFormat> {
		match self {
			Self::Number(node) if node.endian == Endian::Le => Some(node.format),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanTypeNode {
	#[serde(default = "NumberTypeNode::u8")]
	pub size: NumberTypeNode,
}

impl Default for BooleanTypeNode {
	fn default() -> Self {
		Self {
			size: NumberTypeNode::u8(),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringTypeNode {
	#[serde(default)]
	pub encoding: BytesEncoding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayTypeNode {
	pub item: Box<TypeNode>,
	pub count: CountNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTypeNode {
	pub item: Box<TypeNode>,
	#[serde(default = "NumberTypeNode::u8")]
	pub prefix: NumberTypeNode,
	#[serde(default)]
	pub fixed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTypeNode {
	pub item: Box<TypeNode>,
	pub count: CountNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapTypeNode {
	pub key: Box<TypeNode>,
	pub value: Box<TypeNode>,
	pub count: CountNode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TupleTypeNode {
	#[serde(default)]
	pub items: Vec<TypeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedSizeTypeNode {
	pub r#type: Box<TypeNode>,
	pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizePrefixTypeNode {
	pub r#type: Box<TypeNode>,
	pub prefix: NumberTypeNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinedTypeLinkNode {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub program: Option<ProgramLinkNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramLinkNode {
	pub name: String,
}

/// `amountTypeNode`, `solAmountTypeNode` and `dateTimeTypeNode` only decorate
/// an inner number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedNumberTypeNode {
	pub number: NumberTypeNode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructTypeNode {
	#[serde(default)]
	pub fields: Vec<StructFieldTypeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructFieldTypeNode {
	pub name: String,
	pub r#type: TypeNode,
	#[serde(default)]
	pub docs: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default_value: Option<ValueNode>,
}

impl StructFieldTypeNode {
	pub fn new(name: impl Into<String>, r#type: TypeNode) -> Self {
		Self {
			name: name.into(),
			r#type,
			docs: Vec::new(),
			default_value: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumTypeNode {
	#[serde(default)]
	pub variants: Vec<EnumVariantTypeNode>,
	#[serde(default = "NumberTypeNode::u8")]
	pub size: NumberTypeNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EnumVariantTypeNode {
	#[serde(rename = "enumEmptyVariantTypeNode")]
	Empty { name: String },
	#[serde(rename = "enumTupleVariantTypeNode")]
	Tuple { name: String, tuple: TupleTypeNode },
	#[serde(rename = "enumStructVariantTypeNode")]
	Struct {
		name: String,
		r#struct: StructTypeNode,
	},
}

impl EnumVariantTypeNode {
	pub fn name(&self) -> &str {
		match self {
			Self::Empty { name } | Self::Tuple { name, .. } | Self::Struct { name, .. } => name,
		}
	}
}

/// How many items a list-like type holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CountNode {
	#[serde(rename = "fixedCountNode")]
	Fixed { value: usize },
	#[serde(rename = "prefixedCountNode")]
	Prefixed { prefix: NumberTypeNode },
	#[serde(rename = "remainderCountNode")]
	Remainder,
}

impl CountNode {
	pub fn borsh() -> Self {
		Self::Prefixed {
			prefix: NumberTypeNode::u32(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn number_widths_follow_canonical_table() {
		let widths = NumberFormat::ALL_FIXED
			.iter()
			.map(|format| format.byte_width())
			.collect::<Vec<_>>();
		let expected = [1, 2, 4, 8, 16, 1, 2, 4, 8, 16, 4, 8]
			.into_iter()
			.map(Some)
			.collect::<Vec<_>>();
		assert_eq!(widths, expected);
		assert_eq!(NumberFormat::ShortU16.byte_width(), None);
	}

	#[test]
	fn parses_nested_type_nodes() {
		let json = r#"{
			"kind": "arrayTypeNode",
			"item": { "kind": "numberTypeNode", "format": "u16", "endian": "le" },
			"count": { "kind": "fixedCountNode", "value": 4 }
		}"#;
		let node: TypeNode =
			serde_json::from_str(json).unwrap_or_else(|e| panic!("failed to parse: {e}"));
		assert_eq!(
			node,
			TypeNode::array(
				TypeNode::number(NumberFormat::U16),
				CountNode::Fixed { value: 4 }
			)
		);
	}

	#[test]
	fn unknown_kinds_deserialize_to_unknown() {
		let json = r#"{ "kind": "someFutureTypeNode", "payload": [1, 2, 3] }"#;
		let node: TypeNode =
			serde_json::from_str(json).unwrap_or_else(|e| panic!("failed to parse: {e}"));
		assert_eq!(node, TypeNode::Unknown);
	}

	#[test]
	fn parses_enum_variants_with_defaults() {
		let json = r#"{
			"kind": "enumTypeNode",
			"variants": [
				{ "kind": "enumEmptyVariantTypeNode", "name": "up" },
				{
					"kind": "enumTupleVariantTypeNode",
					"name": "move",
					"tuple": { "kind": "tupleTypeNode", "items": [{ "kind": "publicKeyTypeNode" }] }
				}
			]
		}"#;
		let node: TypeNode =
			serde_json::from_str(json).unwrap_or_else(|e| panic!("failed to parse: {e}"));
		let TypeNode::Enum(node) = node else {
			panic!("expected an enum type node");
		};
		assert_eq!(node.size, NumberTypeNode::u8());
		assert_eq!(node.variants[1].name(), "move");
	}
}
