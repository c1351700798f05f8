//! Binary codec descriptors.
//!
//! A [`Codec`] is the exact Borsh layout of one resolved type. The Dart
//! annotation text is derived from it, and [`wire`] can encode and decode
//! values against it so layouts can be checked byte for byte.

pub mod wire;

use crate::nodes::NumberFormat;

/// How the length of a variable sized value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
	/// A count or byte length written as a number before the payload.
	Prefixed(NumberFormat),
	/// A statically known length, nothing is written.
	Fixed(usize),
	/// Everything left in the buffer.
	Remainder,
}

impl Length {
	pub const BORSH: Self = Self::Prefixed(NumberFormat::U32);
}

/// Coarse classification of a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
	FixedWidthInt,
	FixedWidthFloat,
	Bool,
	Utf8String,
	RawBytes,
	FixedBytes(usize),
	LengthPrefixed,
	Composite,
	/// Fallback for type nodes the resolver could not understand. Never has a
	/// size and never renders an annotation.
	Opaque,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Codec {
	Number(NumberFormat),
	Bool(NumberFormat),
	String(Length),
	Bytes(Length),
	PublicKey,
	Option {
		item: Box<Codec>,
		prefix: NumberFormat,
		fixed: bool,
	},
	List {
		item: Box<Codec>,
		count: Length,
	},
	/// Numbers packed into a Dart typed list of exactly `count` elements.
	TypedArray {
		item: Box<Codec>,
		count: usize,
	},
	Set {
		item: Box<Codec>,
		count: Length,
	},
	Map {
		key: Box<Codec>,
		value: Box<Codec>,
		count: Length,
	},
	Tuple(Vec<Codec>),
	Struct(StructCodec),
	Enum(EnumCodec),
	Defined(DefinedRef),
	SizePrefixed {
		inner: Box<Codec>,
		prefix: NumberFormat,
	},
	FixedSize {
		inner: Box<Codec>,
		size: usize,
	},
	Opaque {
		kind: String,
	},
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructCodec {
	/// Dart class of the struct.
	pub name: String,
	/// Fields in declaration order, which is the wire order.
	pub fields: Vec<FieldCodec>,
}

/// One struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCodec {
	pub name: String,
	pub codec: Codec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumCodec {
	/// Dart class of the enum.
	pub name: String,
	pub size: NumberFormat,
	pub variants: Vec<VariantCodec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantCodec {
	/// Dart class of the variant.
	pub name: String,
	/// Positional index written before the variant payload.
	pub index: usize,
	pub fields: VariantFields,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariantFields {
	Empty,
	Tuple(Vec<Codec>),
	Struct(Vec<FieldCodec>),
}

impl VariantFields {
	fn codecs(&self) -> Vec<&Codec> {
		match self {
			Self::Empty => Vec::new(),
			Self::Tuple(items) => items.iter().collect(),
			Self::Struct(fields) => fields.iter().map(|field| &field.codec).collect(),
		}
	}
}

/// A reference to a program level defined type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedRef {
	/// Dart class of the referenced type.
	pub name: String,
	pub kind: DefinedKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinedKind {
	Struct,
	/// Enums are annotated with their variant list, so the referencing site
	/// needs the variant class names.
	Enum { variants: Vec<String> },
}

impl Codec {
	pub fn typed_array(format: NumberFormat, count: usize) -> Self {
		Self::TypedArray {
			item: Box::new(Self::Number(format)),
			count,
		}
	}

	pub fn kind(&self) -> CodecKind {
		match self {
			Self::Number(format) if format.is_float() => CodecKind::FixedWidthFloat,
			Self::Number(_) => CodecKind::FixedWidthInt,
			Self::Bool(_) => CodecKind::Bool,
			Self::String(_) => CodecKind::Utf8String,
			Self::Bytes(Length::Remainder) => CodecKind::RawBytes,
			Self::Bytes(Length::Fixed(size)) => CodecKind::FixedBytes(*size),
			Self::PublicKey => CodecKind::FixedBytes(32),
			Self::Bytes(Length::Prefixed(_))
			| Self::SizePrefixed { .. }
			| Self::List {
				count: Length::Prefixed(_),
				..
			}
			| Self::Set {
				count: Length::Prefixed(_),
				..
			}
			| Self::Map {
				count: Length::Prefixed(_),
				..
			} => CodecKind::LengthPrefixed,
			Self::Opaque { .. } => CodecKind::Opaque,
			Self::Option { .. }
			| Self::List { .. }
			| Self::TypedArray { .. }
			| Self::Set { .. }
			| Self::Map { .. }
			| Self::Tuple(_)
			| Self::Struct(_)
			| Self::Enum(_)
			| Self::Defined(_)
			| Self::FixedSize { .. } => CodecKind::Composite,
		}
	}

	/// The nested codec for single-element containers.
	pub fn element(&self) -> Option<&Self> {
		match self {
			Self::Option { item, .. }
			| Self::List { item, .. }
			| Self::TypedArray { item, .. }
			| Self::Set { item, .. } => Some(item),
			Self::SizePrefixed { inner, .. } | Self::FixedSize { inner, .. } => Some(inner),
			_ => None,
		}
	}

	/// Exact encoded size when every value of this type encodes to the same
	/// number of bytes.
	pub fn fixed_size(&self) -> Option<usize> {
		match self {
			Self::Number(format) | Self::Bool(format) => format.byte_width(),
			Self::String(Length::Fixed(size)) | Self::Bytes(Length::Fixed(size)) => Some(*size),
			Self::PublicKey => Some(32),
			Self::Option {
				item,
				prefix,
				fixed: true,
			} => prefix.byte_width()?.checked_add(item.fixed_size()?),
			Self::List {
				item,
				count: Length::Fixed(count),
			}
			| Self::Set {
				item,
				count: Length::Fixed(count),
			}
			| Self::TypedArray { item, count } => item.fixed_size()?.checked_mul(*count),
			Self::Map {
				key,
				value,
				count: Length::Fixed(count),
			} => key.fixed_size()?.checked_add(value.fixed_size()?)?.checked_mul(*count),
			Self::Tuple(items) => checked_sum(items.iter().map(Self::fixed_size)),
			Self::Struct(codec) => checked_sum(codec.fields.iter().map(|field| field.codec.fixed_size())),
			Self::Enum(codec) => {
				let mut payloads = codec.variants.iter().map(|variant| {
					checked_sum(variant.fields.codecs().into_iter().map(Self::fixed_size))
				});
				let first = payloads.next().unwrap_or(Some(0))?;
				payloads
					.all(|payload| payload == Some(first))
					.then(|| codec.size.byte_width()?.checked_add(first))
					.flatten()
			}
			Self::FixedSize { size, .. } => Some(*size),
			_ => None,
		}
	}

	/// Upper bound on the encoded size, when one exists.
	pub fn max_size(&self) -> Option<usize> {
		match self {
			Self::Number(format) | Self::Bool(format) => Some(format.max_width()),
			Self::Option { item, prefix, .. } => prefix.max_width().checked_add(item.max_size()?),
			Self::Tuple(items) => checked_sum(items.iter().map(Self::max_size)),
			Self::Struct(codec) => checked_sum(codec.fields.iter().map(|field| field.codec.max_size())),
			Self::Enum(codec) => {
				let payload = codec
					.variants
					.iter()
					.map(|variant| checked_sum(variant.fields.codecs().into_iter().map(Self::max_size)))
					.collect::<Option<Vec<_>>>()?;
				codec
					.size
					.max_width()
					.checked_add(payload.into_iter().max().unwrap_or(0))
			}
			Self::List {
				item,
				count: Length::Fixed(count),
			}
			| Self::Set {
				item,
				count: Length::Fixed(count),
			} => item.max_size()?.checked_mul(*count),
			Self::Map {
				key,
				value,
				count: Length::Fixed(count),
			} => key.max_size()?.checked_add(value.max_size()?)?.checked_mul(*count),
			_ => self.fixed_size(),
		}
	}

	/// Whether an opaque fallback appears anywhere in this codec.
	pub fn contains_opaque(&self) -> bool {
		match self {
			Self::Opaque { .. } => true,
			Self::Option { item, .. }
			| Self::List { item, .. }
			| Self::TypedArray { item, .. }
			| Self::Set { item, .. }
			| Self::SizePrefixed { inner: item, .. }
			| Self::FixedSize { inner: item, .. } => item.contains_opaque(),
			Self::Map { key, value, .. } => key.contains_opaque() || value.contains_opaque(),
			Self::Tuple(items) => items.iter().any(Self::contains_opaque),
			Self::Struct(codec) => codec.fields.iter().any(|field| field.codec.contains_opaque()),
			Self::Enum(codec) => {
				codec.variants.iter().any(|variant| {
					variant
						.fields
						.codecs()
						.into_iter()
						.any(Self::contains_opaque)
				})
			}
			Self::Number(_)
			| Self::Bool(_)
			| Self::String(_)
			| Self::Bytes(_)
			| Self::PublicKey
			| Self::Defined(_) => false,
		}
	}

	/// The `@B...()` annotation placed before a field of this type.
	///
	/// Returns `None` for codecs containing an opaque fallback: those must be
	/// reported, not annotated with a guess.
	pub fn borsh_annotation(&self) -> Option<String> {
		self.borsh_type().map(|borsh_type| format!("@{borsh_type}"))
	}

	/// The Borsh type expression, as used inside other annotations.
	pub fn borsh_type(&self) -> Option<String> {
		let borsh_type = match self {
			Self::Number(format) => number_borsh_type(*format).to_owned(),
			Self::Bool(NumberFormat::U8) => "BBool()".to_owned(),
			Self::Bool(format) => format!("BPrefixedBool({})", number_borsh_type(*format)),
			Self::String(length) => length_borsh_type("String", *length, None),
			Self::Bytes(length) => length_borsh_type("Bytes", *length, None),
			Self::PublicKey => "BPublicKey()".to_owned(),
			Self::Option {
				item,
				prefix: NumberFormat::U8,
				fixed: false,
			} => format!("BOption({})", item.borsh_type()?),
			Self::Option {
				item,
				prefix,
				fixed,
			} => {
				let wrapper = if *fixed {
					"BFixedOption"
				} else {
					"BPrefixedOption"
				};
				format!("{wrapper}({}, {})", number_borsh_type(*prefix), item.borsh_type()?)
			}
			Self::List { item, count } => length_borsh_type("Array", *count, Some(&item.borsh_type()?)),
			Self::TypedArray { item, count } => format!("BFixedArray({count}, {})", item.borsh_type()?),
			Self::Set { item, count } => length_borsh_type("Set", *count, Some(&item.borsh_type()?)),
			Self::Map { key, value, count } => {
				let inner = format!("{}, {}", key.borsh_type()?, value.borsh_type()?);
				length_borsh_type("Map", *count, Some(&inner))
			}
			Self::Tuple(items) => {
				let items = items
					.iter()
					.map(Self::borsh_type)
					.collect::<Option<Vec<_>>>()?;
				format!("BTuple([{}])", items.join(", "))
			}
			Self::Struct(codec) => {
				if self.contains_opaque() {
					return None;
				}
				format!("BCustom(B{}())", codec.name)
			}
			Self::Enum(codec) => {
				let variants = codec
					.variants
					.iter()
					.map(|variant| variant.name.clone())
					.collect::<Vec<_>>();
				enum_borsh_type(&codec.name, &variants)
			}
			Self::Defined(defined) => {
				match &defined.kind {
					DefinedKind::Enum { variants } => enum_borsh_type(&defined.name, variants),
					DefinedKind::Struct => format!("BCustom(B{}())", defined.name),
				}
			}
			Self::SizePrefixed { inner, prefix } => {
				format!("BSizePrefixed({}, {})", number_borsh_type(*prefix), inner.borsh_type()?)
			}
			Self::FixedSize { inner, size } => format!("BFixedSize({size}, {})", inner.borsh_type()?),
			Self::Opaque { .. } => return None,
		};
		Some(borsh_type)
	}
}

fn number_borsh_type(format: NumberFormat) -> &'static str {
	match format {
		NumberFormat::U8 => "BU8()",
		NumberFormat::U16 => "BU16()",
		NumberFormat::U32 => "BU32()",
		NumberFormat::U64 => "BU64()",
		NumberFormat::U128 => "BU128()",
		NumberFormat::I8 => "BI8()",
		NumberFormat::I16 => "BI16()",
		NumberFormat::I32 => "BI32()",
		NumberFormat::I64 => "BI64()",
		NumberFormat::I128 => "BI128()",
		NumberFormat::F32 => "BF32()",
		NumberFormat::F64 => "BF64()",
		NumberFormat::ShortU16 => "BShortU16()",
	}
}

/// `BString()`, `BFixedString(4)`, `BPrefixedArray(BU8(), BU16())`...
fn length_borsh_type(base: &str, length: Length, inner: Option<&str>) -> String {
	let inner_arg = inner.map(|inner| format!(", {inner}")).unwrap_or_default();
	let inner_only = inner.unwrap_or_default();
	match length {
		Length::Prefixed(NumberFormat::U32) => format!("B{base}({inner_only})"),
		Length::Prefixed(prefix) => format!("BPrefixed{base}({}{inner_arg})", number_borsh_type(prefix)),
		Length::Fixed(size) => format!("BFixed{base}({size}{inner_arg})"),
		Length::Remainder => format!("BRemainder{base}({inner_only})"),
	}
}

fn enum_borsh_type(name: &str, variants: &[String]) -> String {
	let variants = variants
		.iter()
		.map(|variant| format!("{variant}: B{variant}()"))
		.collect::<Vec<_>>();
	format!("BEnum<{name}>({{{}}})", variants.join(", "))
}

/// Sum of `sizes`, or `None` when one is unknown or the total overflows.
fn checked_sum(sizes: impl IntoIterator<Item = Option<usize>>) -> Option<usize> {
	sizes
		.into_iter()
		.try_fold(0_usize, |total, size| total.checked_add(size?))
}
