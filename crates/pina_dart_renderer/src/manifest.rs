//! Codec resolver.
//!
//! [`TypeManifestResolver::resolve`] walks a [`TypeNode`] and produces, for
//! every subtree, the Dart type to declare, the exact Borsh [`Codec`], the
//! imports the type needs and any auxiliary class the caller must emit next
//! to it. Naming state flows down through an immutable [`ResolveContext`], so
//! the resolver can be shared across threads.

use std::fmt;

use crate::codec::Codec;
use crate::codec::DefinedKind;
use crate::codec::DefinedRef;
use crate::codec::EnumCodec;
use crate::codec::FieldCodec;
use crate::codec::Length;
use crate::codec::StructCodec;
use crate::codec::VariantCodec;
use crate::codec::VariantFields;
use crate::error::RenderError;
use crate::error::Result;
use crate::imports::ImportMap;
use crate::linkables::DefinedShape;
use crate::linkables::LinkableDictionary;
use crate::names::NameApi;
use crate::nodes::BytesEncoding;
use crate::nodes::CountNode;
use crate::nodes::DefinedTypeLinkNode;
use crate::nodes::Endian;
use crate::nodes::EnumTypeNode;
use crate::nodes::EnumVariantTypeNode;
use crate::nodes::InstructionArgumentNode;
use crate::nodes::NumberFormat;
use crate::nodes::NumberTypeNode;
use crate::nodes::StringTypeNode;
use crate::nodes::StructFieldTypeNode;
use crate::nodes::StructTypeNode;
use crate::nodes::TypeNode;
use crate::nodes::ValueNode;

/// Import alias for `dart:typed_data`.
pub const TYPED_DATA: &str = "dartTypedData";
/// Import alias for `package:solana/solana.dart`.
pub const SOLANA: &str = "solana";
/// Import alias for the Borsh annotation package.
pub const BORSH: &str = "borsh";

const MAX_DEPTH: usize = 64;

/// Root relative module path of a generated file, e.g. `types/config.dart`.
pub fn generated_module(folder: &str, file: &str) -> String {
	format!("{folder}/{file}.dart")
}

/// Which [`NameApi`] method spells field names in the current unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldNaming {
	Account,
	Instruction,
	Type,
}

/// Naming state threaded through the recursion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
	/// Dart class name an inline struct or enum at this position would get.
	pub parent_name: Option<String>,
	pub depth: usize,
	/// Inline structs and enums below a field become separate declarations.
	pub nested_struct: bool,
	/// The caller wants the struct shape itself, e.g. for a struct variant.
	pub inline: bool,
	pub naming: FieldNaming,
}

impl ResolveContext {
	pub fn root(parent_name: impl Into<String>, naming: FieldNaming) -> Self {
		Self {
			parent_name: Some(parent_name.into()),
			depth: 0,
			nested_struct: false,
			inline: false,
			naming,
		}
	}

	/// Context for the item of a list, option, map or wrapper.
	#[must_use]
	pub fn item(&self) -> Self {
		Self {
			depth: self.depth + 1,
			..self.clone()
		}
	}

	/// Context for the type of the field whose PascalCase name is `field`.
	#[must_use]
	pub fn field(&self, field: &str) -> Self {
		Self {
			parent_name: Some(format!("{}{field}", self.parent_name.as_deref().unwrap_or_default())),
			depth: self.depth + 1,
			nested_struct: true,
			inline: false,
			naming: self.naming,
		}
	}

	/// Context for the payload of the enum variant class `variant`.
	#[must_use]
	pub fn variant(&self, variant: &str) -> Self {
		Self {
			parent_name: Some(variant.to_owned()),
			depth: self.depth + 1,
			nested_struct: true,
			inline: true,
			naming: self.naming,
		}
	}

	fn type_name(&self, fallback: &str) -> String {
		self.parent_name
			.clone()
			.unwrap_or_else(|| fallback.to_owned())
	}

	fn location(&self) -> String {
		self.parent_name
			.clone()
			.unwrap_or_else(|| "<anonymous>".to_owned())
	}
}

/// A non fatal problem found while resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	pub context: String,
	pub message: String,
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.context, self.message)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldManifest {
	/// Dart identifier.
	pub name: String,
	/// Name in the IDL.
	pub source_name: String,
	pub target_type: String,
	pub codec: Codec,
	pub docs: Vec<String>,
	pub default_value: Option<ValueNode>,
}

/// A statically known length the generated code must check at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedLength {
	Bytes(usize),
	Elements(usize),
}

impl FieldManifest {
	pub fn annotation(&self) -> Option<String> {
		self.codec.borsh_annotation()
	}

	pub fn fixed_length(&self) -> Option<FixedLength> {
		match &self.codec {
			Codec::Bytes(Length::Fixed(size)) => Some(FixedLength::Bytes(*size)),
			Codec::TypedArray { count, .. }
			| Codec::List {
				count: Length::Fixed(count),
				..
			} => Some(FixedLength::Elements(*count)),
			_ => None,
		}
	}

	fn codec_entry(&self) -> FieldCodec {
		FieldCodec {
			name: self.source_name.clone(),
			codec: self.codec.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantManifest {
	/// Dart class of the variant.
	pub name: String,
	/// Factory constructor on the enum class.
	pub factory: String,
	pub index: usize,
	pub payload: VariantPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariantPayload {
	Empty,
	/// Positional items, exposed as `field0`, `field1`...
	Tuple(Vec<FieldManifest>),
	Struct(Vec<FieldManifest>),
}

impl VariantPayload {
	pub fn fields(&self) -> &[FieldManifest] {
		match self {
			Self::Empty => &[],
			Self::Tuple(fields) | Self::Struct(fields) => fields,
		}
	}
}

/// Class level structure of a resolved type.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Shape {
	#[default]
	Plain,
	Struct(Vec<FieldManifest>),
	Enum {
		size: NumberFormat,
		variants: Vec<VariantManifest>,
	},
}

/// An auxiliary class produced by an inline struct or enum.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
	pub name: String,
	pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeManifest {
	pub target_type: String,
	pub imports: ImportMap,
	/// Inline classes, innermost first, unique by name.
	pub nested_declarations: Vec<Declaration>,
	pub codec: Codec,
	pub shape: Shape,
	pub diagnostics: Vec<Diagnostic>,
}

impl TypeManifest {
	fn leaf(target_type: impl Into<String>, codec: Codec) -> Self {
		Self {
			target_type: target_type.into(),
			imports: ImportMap::new(),
			nested_declarations: Vec::new(),
			codec,
			shape: Shape::Plain,
			diagnostics: Vec::new(),
		}
	}

	fn with_import<I, S>(mut self, module: impl Into<String>, symbols: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.imports.add(module, symbols);
		self
	}

	/// Keeps imports, declarations and diagnostics, replaces the rest.
	fn wrap(mut self, target_type: impl Into<String>, codec: Codec) -> Self {
		self.target_type = target_type.into();
		self.codec = codec;
		self.shape = Shape::Plain;
		self
	}

	/// Merges what `child` needs into `self`.
	pub fn absorb(&mut self, child: Self) {
		self.imports.merge_with(&child.imports);
		for declaration in child.nested_declarations {
			self.add_declaration(declaration);
		}
		self.diagnostics.extend(child.diagnostics);
	}

	fn add_declaration(&mut self, declaration: Declaration) {
		if !self
			.nested_declarations
			.iter()
			.any(|existing| existing.name == declaration.name)
		{
			self.nested_declarations.push(declaration);
		}
	}

	/// Fields of a struct shaped manifest.
	pub fn fields(&self) -> Option<&[FieldManifest]> {
		match &self.shape {
			Shape::Struct(fields) => Some(fields),
			_ => None,
		}
	}
}

/// Resolves type nodes within one program.
#[derive(Debug, Clone, Copy)]
pub struct TypeManifestResolver<'a> {
	linkables: &'a LinkableDictionary,
	program: &'a str,
	names: &'a dyn NameApi,
}

impl<'a> TypeManifestResolver<'a> {
	pub fn new(linkables: &'a LinkableDictionary, program: &'a str, names: &'a dyn NameApi) -> Self {
		Self {
			linkables,
			program,
			names,
		}
	}

	pub fn names(&self) -> &'a dyn NameApi {
		self.names
	}

	pub fn resolve(&self, node: &TypeNode, ctx: &ResolveContext) -> Result<TypeManifest> {
		if ctx.depth > MAX_DEPTH {
			return Err(unsupported(node, ctx, "type nesting is too deep"));
		}

		match node {
			TypeNode::Number(number) => self.number(number, node, ctx),
			TypeNode::Amount(wrapped) | TypeNode::SolAmount(wrapped) | TypeNode::DateTime(wrapped) => {
				self.number(&wrapped.number, node, ctx)
			}
			TypeNode::Boolean(boolean) => {
				let size = little_endian(&boolean.size, node, ctx)?;
				Ok(TypeManifest::leaf("bool", Codec::Bool(size)))
			}
			TypeNode::String(string) => string_manifest(string, Length::BORSH, node, ctx),
			TypeNode::Bytes => Ok(bytes_manifest(Length::Remainder)),
			TypeNode::PublicKey => {
				Ok(TypeManifest::leaf("Ed25519HDPublicKey", Codec::PublicKey)
					.with_import(SOLANA, ["Ed25519HDPublicKey"]))
			}
			TypeNode::Array(array) => {
				let count = count_length(&array.count, node, ctx)?;
				if let (Length::Fixed(count), Some(format)) = (count, array.item.as_plain_number()) {
					if let Some(list) = typed_list(format) {
						return Ok(TypeManifest::leaf(
							format!("{list} /* length: {count} */"),
							Codec::typed_array(format, count),
						)
						.with_import(TYPED_DATA, [list]));
					}
				}
				let item = self.resolve(&array.item, &ctx.item())?;
				let codec = Codec::List {
					item: Box::new(item.codec.clone()),
					count,
				};
				let target_type = format!("List<{}>", item.target_type);
				Ok(item.wrap(target_type, codec))
			}
			TypeNode::Option(option) => {
				let prefix = little_endian(&option.prefix, node, ctx)?;
				let item = self.resolve(&option.item, &ctx.item())?;
				let codec = Codec::Option {
					item: Box::new(item.codec.clone()),
					prefix,
					fixed: option.fixed,
				};
				let target_type = nullable(&item.target_type);
				Ok(item.wrap(target_type, codec))
			}
			TypeNode::Set(set) => {
				let count = count_length(&set.count, node, ctx)?;
				let item = self.resolve(&set.item, &ctx.item())?;
				let codec = Codec::Set {
					item: Box::new(item.codec.clone()),
					count,
				};
				let target_type = format!("Set<{}>", item.target_type);
				Ok(item.wrap(target_type, codec))
			}
			TypeNode::Map(map) => {
				let count = count_length(&map.count, node, ctx)?;
				let mut key = self.resolve(&map.key, &ctx.item())?;
				let value = self.resolve(&map.value, &ctx.item())?;
				let target_type = format!("Map<{}, {}>", key.target_type, value.target_type);
				let codec = Codec::Map {
					key: Box::new(key.codec.clone()),
					value: Box::new(value.codec.clone()),
					count,
				};
				key.absorb(value);
				Ok(key.wrap(target_type, codec))
			}
			TypeNode::Tuple(tuple) => {
				let mut manifest = TypeManifest::leaf("", Codec::Tuple(Vec::new()));
				let mut types = Vec::with_capacity(tuple.items.len());
				let mut codecs = Vec::with_capacity(tuple.items.len());
				for item in &tuple.items {
					let item = self.resolve(item, &ctx.item())?;
					types.push(item.target_type.clone());
					codecs.push(item.codec.clone());
					manifest.absorb(item);
				}
				let target_type = if types.len() == 1 {
					format!("({},)", types[0])
				} else {
					format!("({})", types.join(", "))
				};
				Ok(manifest.wrap(target_type, Codec::Tuple(codecs)))
			}
			TypeNode::FixedSize(fixed) => {
				match fixed.r#type.as_ref() {
					TypeNode::String(string) => {
						string_manifest(string, Length::Fixed(fixed.size), node, ctx)
					}
					TypeNode::Bytes => Ok(bytes_manifest(Length::Fixed(fixed.size))),
					inner => {
						let inner = self.resolve(inner, &ctx.item())?;
						let codec = Codec::FixedSize {
							inner: Box::new(inner.codec.clone()),
							size: fixed.size,
						};
						let target_type = inner.target_type.clone();
						Ok(TypeManifest { shape: inner.shape.clone(), ..inner.wrap(target_type, codec) })
					}
				}
			}
			TypeNode::SizePrefix(prefixed) => {
				let prefix = little_endian(&prefixed.prefix, node, ctx)?;
				match prefixed.r#type.as_ref() {
					TypeNode::String(string) => {
						string_manifest(string, Length::Prefixed(prefix), node, ctx)
					}
					TypeNode::Bytes => Ok(bytes_manifest(Length::Prefixed(prefix))),
					inner => {
						let inner = self.resolve(inner, &ctx.item())?;
						let codec = Codec::SizePrefixed {
							inner: Box::new(inner.codec.clone()),
							prefix,
						};
						let target_type = inner.target_type.clone();
						Ok(TypeManifest { shape: inner.shape.clone(), ..inner.wrap(target_type, codec) })
					}
				}
			}
			TypeNode::DefinedTypeLink(link) => self.defined(link, ctx),
			TypeNode::Struct(node) => self.r#struct(node, ctx),
			TypeNode::Enum(node) => self.r#enum(node, ctx),
			TypeNode::HiddenPrefix
			| TypeNode::HiddenSuffix
			| TypeNode::PreOffset
			| TypeNode::PostOffset
			| TypeNode::Sentinel
			| TypeNode::ZeroableOption
			| TypeNode::RemainderOption => {
				Err(unsupported(
					node,
					ctx,
					"the layout it describes cannot be expressed with Borsh annotations",
				))
			}
			TypeNode::Unknown => Ok(opaque(node, ctx)),
		}
	}

	/// Resolves instruction arguments as the fields of a struct.
	pub fn resolve_arguments(
		&self,
		arguments: &[InstructionArgumentNode],
		ctx: &ResolveContext,
	) -> Result<TypeManifest> {
		let node = StructTypeNode {
			fields: arguments
				.iter()
				.map(|argument| {
					StructFieldTypeNode {
						name: argument.name.clone(),
						r#type: argument.r#type.clone(),
						docs: argument.docs.clone(),
						default_value: argument.default_value.clone(),
					}
				})
				.collect(),
		};
		self.r#struct(&node, ctx)
	}

	fn number(&self, number: &NumberTypeNode, node: &TypeNode, ctx: &ResolveContext) -> Result<TypeManifest> {
		let format = little_endian(number, node, ctx)?;
		let target_type = if format.is_float() {
			"double"
		} else if format.is_wide_integer() {
			"BigInt"
		} else {
			"int"
		};
		Ok(TypeManifest::leaf(target_type, Codec::Number(format)))
	}

	fn defined(&self, link: &DefinedTypeLinkNode, ctx: &ResolveContext) -> Result<TypeManifest> {
		let Some(defined) = self.linkables.defined_type(self.program, link) else {
			return Err(RenderError::UnresolvedDefinedType {
				context: ctx.location(),
				name: link.name.clone(),
			});
		};
		let name = self.names.defined_type(&link.name);
		let module = generated_module("types", &self.names.file_name(&link.name));

		match DefinedShape::of(defined, self.names) {
			DefinedShape::Struct => {
				let codec = Codec::Defined(DefinedRef {
					name: name.clone(),
					kind: DefinedKind::Struct,
				});
				let symbols = [name.clone(), format!("B{name}")];
				Ok(TypeManifest::leaf(name, codec).with_import(module, symbols))
			}
			DefinedShape::Enum { variants } => {
				let symbols = std::iter::once(name.clone())
					.chain(variants.iter().map(|variant| format!("B{variant}")))
					.collect::<Vec<_>>();
				let codec = Codec::Defined(DefinedRef {
					name: name.clone(),
					kind: DefinedKind::Enum { variants },
				});
				Ok(TypeManifest::leaf(name, codec).with_import(module, symbols))
			}
			DefinedShape::Alias => {
				let alias_ctx = ResolveContext {
					depth: ctx.depth + 1,
					..ResolveContext::root(name.clone(), FieldNaming::Type)
				};
				let mut inner = self.resolve(&defined.r#type, &alias_ctx)?;
				// Auxiliary classes live in the alias file, import them instead.
				let mut symbols = vec![name.clone()];
				for declaration in inner.nested_declarations.drain(..) {
					symbols.push(format!("B{}", declaration.name));
					symbols.push(declaration.name);
				}
				let codec = inner.codec.clone();
				Ok(inner.wrap(name, codec).with_import(module, symbols))
			}
		}
	}

	fn r#struct(&self, node: &StructTypeNode, ctx: &ResolveContext) -> Result<TypeManifest> {
		let name = ctx.type_name("AnonymousStruct");
		let mut manifest = TypeManifest::leaf(name.clone(), Codec::Tuple(Vec::new()));
		let fields = node
			.fields
			.iter()
			.map(|field| self.field(field, ctx, &mut manifest))
			.collect::<Result<Vec<_>>>()?;
		manifest.codec = Codec::Struct(StructCodec {
			name: name.clone(),
			fields: fields.iter().map(FieldManifest::codec_entry).collect(),
		});

		if ctx.nested_struct && !ctx.inline {
			manifest.add_declaration(Declaration {
				name,
				shape: Shape::Struct(fields),
			});
		} else {
			manifest.shape = Shape::Struct(fields);
		}
		Ok(manifest)
	}

	fn field(
		&self,
		field: &StructFieldTypeNode,
		ctx: &ResolveContext,
		manifest: &mut TypeManifest,
	) -> Result<FieldManifest> {
		let child = self.resolve(&field.r#type, &ctx.field(&self.names.defined_type(&field.name)))?;
		let name = match ctx.naming {
			FieldNaming::Account => self.names.account_field(&field.name),
			FieldNaming::Instruction => self.names.instruction_field(&field.name),
			FieldNaming::Type => self.names.type_field(&field.name),
		};
		let resolved = FieldManifest {
			name,
			source_name: field.name.clone(),
			target_type: child.target_type.clone(),
			codec: child.codec.clone(),
			docs: field.docs.clone(),
			default_value: field.default_value.clone(),
		};
		manifest.absorb(child);
		Ok(resolved)
	}

	fn r#enum(&self, node: &EnumTypeNode, ctx: &ResolveContext) -> Result<TypeManifest> {
		let name = ctx.type_name("AnonymousEnum");
		let enum_node = TypeNode::Enum(node.clone());
		let size = little_endian(&node.size, &enum_node, ctx)?;
		let mut manifest = TypeManifest::leaf(name.clone(), Codec::Tuple(Vec::new()));
		let mut variants = Vec::with_capacity(node.variants.len());
		let mut codecs = Vec::with_capacity(node.variants.len());

		for (index, variant) in node.variants.iter().enumerate() {
			let class = self.names.enum_variant(variant.name());
			let variant_ctx = ctx.variant(&class);
			let (payload, fields) = match variant {
				EnumVariantTypeNode::Empty { .. } => (VariantPayload::Empty, VariantFields::Empty),
				EnumVariantTypeNode::Tuple { tuple, .. } => {
					let mut items = Vec::with_capacity(tuple.items.len());
					for (position, item) in tuple.items.iter().enumerate() {
						let field_name = format!("field{position}");
						let child = self.resolve(item, &variant_ctx.field(&format!("Field{position}")))?;
						items.push(FieldManifest {
							source_name: field_name.clone(),
							name: field_name,
							target_type: child.target_type.clone(),
							codec: child.codec.clone(),
							docs: Vec::new(),
							default_value: None,
						});
						manifest.absorb(child);
					}
					let codecs = items.iter().map(|item| item.codec.clone()).collect();
					(VariantPayload::Tuple(items), VariantFields::Tuple(codecs))
				}
				EnumVariantTypeNode::Struct { r#struct, .. } => {
					let mut child = self.r#struct(r#struct, &variant_ctx)?;
					let fields = match std::mem::take(&mut child.shape) {
						Shape::Struct(fields) => fields,
						Shape::Plain | Shape::Enum { .. } => Vec::new(),
					};
					manifest.absorb(child);
					let codecs = fields.iter().map(FieldManifest::codec_entry).collect();
					(VariantPayload::Struct(fields), VariantFields::Struct(codecs))
				}
			};
			codecs.push(VariantCodec {
				name: class.clone(),
				index,
				fields,
			});
			variants.push(VariantManifest {
				factory: self.names.enum_factory(variant.name()),
				name: class,
				index,
				payload,
			});
		}

		manifest.codec = Codec::Enum(EnumCodec {
			name: name.clone(),
			size,
			variants: codecs,
		});
		let shape = Shape::Enum { size, variants };
		if ctx.nested_struct && !ctx.inline {
			manifest.add_declaration(Declaration { name, shape });
		} else {
			manifest.shape = shape;
		}
		Ok(manifest)
	}
}

fn unsupported(node: &TypeNode, ctx: &ResolveContext, reason: &str) -> RenderError {
	RenderError::UnsupportedType {
		context: ctx.location(),
		kind: node.kind(),
		reason: reason.to_owned(),
	}
}

fn little_endian(number: &NumberTypeNode, node: &TypeNode, ctx: &ResolveContext) -> Result<NumberFormat> {
	match number.endian {
		Endian::Le => Ok(number.format),
		Endian::Be => Err(unsupported(node, ctx, "big endian numbers are not Borsh encodable")),
	}
}

fn count_length(count: &CountNode, node: &TypeNode, ctx: &ResolveContext) -> Result<Length> {
	match count {
		CountNode::Fixed { value } => Ok(Length::Fixed(*value)),
		CountNode::Prefixed { prefix } => little_endian(prefix, node, ctx).map(Length::Prefixed),
		CountNode::Remainder => Ok(Length::Remainder),
	}
}

fn string_manifest(
	string: &StringTypeNode,
	length: Length,
	node: &TypeNode,
	ctx: &ResolveContext,
) -> Result<TypeManifest> {
	if string.encoding != BytesEncoding::Utf8 {
		return Err(unsupported(node, ctx, "only utf8 strings are supported"));
	}
	Ok(TypeManifest::leaf("String", Codec::String(length)))
}

fn bytes_manifest(length: Length) -> TypeManifest {
	TypeManifest::leaf("Uint8List", Codec::Bytes(length)).with_import(TYPED_DATA, ["Uint8List"])
}

fn opaque(node: &TypeNode, ctx: &ResolveContext) -> TypeManifest {
	let diagnostic = Diagnostic {
		context: ctx.location(),
		message: format!(
			"unsupported type node `{}` rendered as `Object` without a codec",
			node.kind()
		),
	};
	tracing::warn!(context = %diagnostic.context, kind = node.kind(), "falling back to an opaque type");
	let mut manifest = TypeManifest::leaf(
		"Object",
		Codec::Opaque {
			kind: node.kind().to_owned(),
		},
	);
	manifest.diagnostics.push(diagnostic);
	manifest
}

/// Dart typed list able to hold `format` values.
pub fn typed_list(format: NumberFormat) -> Option<&'static str> {
	match format {
		NumberFormat::U8 => Some("Uint8List"),
		NumberFormat::I8 => Some("Int8List"),
		NumberFormat::U16 => Some("Uint16List"),
		NumberFormat::I16 => Some("Int16List"),
		NumberFormat::U32 => Some("Uint32List"),
		NumberFormat::I32 => Some("Int32List"),
		NumberFormat::U64 => Some("Uint64List"),
		NumberFormat::I64 => Some("Int64List"),
		NumberFormat::F32 => Some("Float32List"),
		NumberFormat::F64 => Some("Float64List"),
		NumberFormat::U128 | NumberFormat::I128 | NumberFormat::ShortU16 => None,
	}
}

/// `T?`, keeping a trailing `/* length: N */` marker after the `?`.
fn nullable(target_type: &str) -> String {
	match target_type.split_once(" /*") {
		Some((head, marker)) => format!("{head}? /*{marker}"),
		None => format!("{target_type}?"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::names::DartNames;
	use crate::nodes::DefinedTypeNode;
	use crate::nodes::ProgramNode;

	fn dictionary(types: &[(&str, TypeNode)]) -> LinkableDictionary {
		let program = ProgramNode {
			name: "vault".to_owned(),
			public_key: "11111111111111111111111111111111".to_owned(),
			defined_types: types
				.iter()
				.map(|(name, r#type)| {
					DefinedTypeNode {
						name: (*name).to_owned(),
						r#type: r#type.clone(),
						docs: Vec::new(),
					}
				})
				.collect(),
			..ProgramNode::default()
		};
		let mut dictionary = LinkableDictionary::default();
		dictionary.record_program(&program);
		dictionary
	}

	fn resolve(dictionary: &LinkableDictionary, node: &TypeNode) -> Result<TypeManifest> {
		TypeManifestResolver::new(dictionary, "vault", &DartNames)
			.resolve(node, &ResolveContext::root("Vault", FieldNaming::Account))
	}

	fn resolved(dictionary: &LinkableDictionary, node: &TypeNode) -> TypeManifest {
		resolve(dictionary, node).unwrap_or_else(|e| panic!("failed to resolve {node:?}: {e}"))
	}

	fn parse(json: &str) -> TypeNode {
		serde_json::from_str(json).unwrap_or_else(|e| panic!("failed to parse type node: {e}"))
	}

	#[test]
	fn numbers_match_the_width_table() {
		let dictionary = dictionary(&[]);
		let widths = [1, 2, 4, 8, 16, 1, 2, 4, 8, 16, 4, 8];
		for (format, width) in NumberFormat::ALL_FIXED.into_iter().zip(widths) {
			let manifest = resolved(&dictionary, &TypeNode::number(format));
			assert_eq!(manifest.codec.fixed_size(), Some(width), "{format:?}");
			let expected = if format.is_float() {
				"double"
			} else if width >= 8 {
				"BigInt"
			} else {
				"int"
			};
			assert_eq!(manifest.target_type, expected, "{format:?}");
		}
	}

	#[test]
	fn fixed_numeric_arrays_become_typed_lists() {
		let dictionary = dictionary(&[]);
		let node = TypeNode::array(TypeNode::number(NumberFormat::U16), CountNode::Fixed { value: 4 });
		let manifest = resolved(&dictionary, &node);
		assert_eq!(manifest.target_type, "Uint16List /* length: 4 */");
		assert_eq!(manifest.codec, Codec::typed_array(NumberFormat::U16, 4));
		assert!(manifest.imports.contains(TYPED_DATA, "Uint16List"));
		assert_eq!(
			manifest.codec.borsh_annotation().as_deref(),
			Some("@BFixedArray(4, BU16())")
		);

		let node = TypeNode::array(TypeNode::PublicKey, CountNode::Fixed { value: 4 });
		let manifest = resolved(&dictionary, &node);
		assert_eq!(manifest.target_type, "List<Ed25519HDPublicKey>");
		assert!(matches!(
			manifest.codec,
			Codec::List {
				count: Length::Fixed(4),
				..
			}
		));

		let node = TypeNode::array(TypeNode::number(NumberFormat::U128), CountNode::Fixed { value: 2 });
		assert_eq!(resolved(&dictionary, &node).target_type, "List<BigInt>");
	}

	#[test]
	fn optional_typed_lists_keep_the_length_marker() {
		let dictionary = dictionary(&[]);
		let node = TypeNode::option(TypeNode::array(
			TypeNode::number(NumberFormat::U8),
			CountNode::Fixed { value: 32 },
		));
		assert_eq!(
			resolved(&dictionary, &node).target_type,
			"Uint8List? /* length: 32 */"
		);
	}

	#[test]
	fn string_and_bytes_wrappers_fold_into_the_codec() {
		let dictionary = dictionary(&[]);
		let prefixed = TypeNode::size_prefix(TypeNode::string(), NumberFormat::U32);
		assert_eq!(resolved(&dictionary, &prefixed).codec, Codec::String(Length::BORSH));

		let fixed = TypeNode::fixed_size(TypeNode::Bytes, 32);
		let manifest = resolved(&dictionary, &fixed);
		assert_eq!(manifest.target_type, "Uint8List");
		assert_eq!(manifest.codec, Codec::Bytes(Length::Fixed(32)));

		assert_eq!(resolved(&dictionary, &TypeNode::Bytes).codec, Codec::Bytes(Length::Remainder));
	}

	#[test]
	fn token_account_fields_keep_declared_order() {
		let dictionary = dictionary(&[]);
		let node = TypeNode::Struct(StructTypeNode {
			fields: vec![
				StructFieldTypeNode::new("owner", TypeNode::PublicKey),
				StructFieldTypeNode::new("amount", TypeNode::number(NumberFormat::U64)),
			],
		});
		let manifest = TypeManifestResolver::new(&dictionary, "vault", &DartNames)
			.resolve(&node, &ResolveContext::root("TokenAccount", FieldNaming::Account))
			.unwrap_or_else(|e| panic!("failed to resolve: {e}"));

		let fields = manifest.fields().unwrap_or_else(|| panic!("expected a struct shape"));
		let codecs = fields.iter().map(|field| field.codec.clone()).collect::<Vec<_>>();
		assert_eq!(codecs, vec![Codec::PublicKey, Codec::Number(NumberFormat::U64)]);
		assert_eq!(manifest.codec.fixed_size(), Some(40));
		assert!(manifest.nested_declarations.is_empty());
		assert!(manifest.imports.contains(SOLANA, "Ed25519HDPublicKey"));
	}

	#[test]
	fn inline_structs_below_fields_become_declarations() {
		let dictionary = dictionary(&[]);
		let node = parse(
			r#"{
				"kind": "structTypeNode",
				"fields": [{
					"kind": "structFieldTypeNode",
					"name": "limits",
					"type": {
						"kind": "arrayTypeNode",
						"item": {
							"kind": "structTypeNode",
							"fields": [{ "kind": "structFieldTypeNode", "name": "max", "type": { "kind": "numberTypeNode", "format": "u32" } }]
						},
						"count": { "kind": "prefixedCountNode", "prefix": { "kind": "numberTypeNode", "format": "u32" } }
					}
				}]
			}"#,
		);
		let manifest = resolved(&dictionary, &node);
		let fields = manifest.fields().unwrap_or_else(|| panic!("expected a struct shape"));
		assert_eq!(fields[0].target_type, "List<VaultLimits>");
		assert_eq!(
			fields[0].annotation().as_deref(),
			Some("@BArray(BCustom(BVaultLimits()))")
		);
		assert_eq!(manifest.nested_declarations.len(), 1);
		assert_eq!(manifest.nested_declarations[0].name, "VaultLimits");
	}

	#[test]
	fn declarations_are_unique_by_name() {
		let mut manifest = TypeManifest::leaf("Vault", Codec::PublicKey);
		for _ in 0..2 {
			let mut child = TypeManifest::leaf("VaultLimits", Codec::PublicKey);
			child.add_declaration(Declaration {
				name: "VaultLimits".to_owned(),
				shape: Shape::Struct(Vec::new()),
			});
			manifest.absorb(child);
		}
		assert_eq!(manifest.nested_declarations.len(), 1);
	}

	#[test]
	fn enum_variants_are_indexed_by_position() {
		let dictionary = dictionary(&[]);
		let node = parse(
			r#"{
				"kind": "enumTypeNode",
				"variants": [
					{ "kind": "enumEmptyVariantTypeNode", "name": "idle" },
					{ "kind": "enumTupleVariantTypeNode", "name": "move", "tuple": { "kind": "tupleTypeNode", "items": [{ "kind": "numberTypeNode", "format": "i16" }] } },
					{ "kind": "enumStructVariantTypeNode", "name": "jump", "struct": { "kind": "structTypeNode", "fields": [{ "kind": "structFieldTypeNode", "name": "height", "type": { "kind": "numberTypeNode", "format": "u8" } }] } }
				]
			}"#,
		);
		let manifest = resolved(&dictionary, &node);
		let Shape::Enum { size, variants } = &manifest.shape else {
			panic!("expected an enum shape");
		};
		assert_eq!(*size, NumberFormat::U8);
		let indexed = variants
			.iter()
			.map(|variant| (variant.name.as_str(), variant.index))
			.collect::<Vec<_>>();
		assert_eq!(indexed, vec![("Idle", 0), ("Move", 1), ("Jump", 2)]);
		assert_eq!(variants[1].payload.fields()[0].name, "field0");
		assert_eq!(variants[2].payload.fields()[0].name, "height");
		assert_eq!(manifest.codec.max_size(), Some(3));
	}

	#[test]
	fn defined_enum_links_carry_variant_annotations() {
		let direction = parse(
			r#"{
				"kind": "enumTypeNode",
				"variants": [
					{ "kind": "enumEmptyVariantTypeNode", "name": "up" },
					{ "kind": "enumEmptyVariantTypeNode", "name": "down" }
				]
			}"#,
		);
		let dictionary = dictionary(&[("direction", direction)]);
		let manifest = resolved(&dictionary, &TypeNode::defined("direction"));
		assert_eq!(manifest.target_type, "Direction");
		assert_eq!(
			manifest.codec.borsh_annotation().as_deref(),
			Some("@BEnum<Direction>({Up: BUp(), Down: BDown()})")
		);
		assert!(manifest.imports.contains("types/direction.dart", "BUp"));
	}

	#[test]
	fn aliases_inline_the_aliased_codec() {
		let amounts = TypeNode::array(TypeNode::number(NumberFormat::U64), CountNode::borsh());
		let dictionary = dictionary(&[("amounts", amounts)]);
		let manifest = resolved(&dictionary, &TypeNode::defined("amounts"));
		assert_eq!(manifest.target_type, "Amounts");
		assert_eq!(
			manifest.codec.borsh_annotation().as_deref(),
			Some("@BArray(BU64())")
		);
		assert!(manifest.imports.contains("types/amounts.dart", "Amounts"));
	}

	#[test]
	fn unresolved_links_are_structural_errors() {
		let dictionary = dictionary(&[]);
		let error = resolve(&dictionary, &TypeNode::defined("missing"))
			.err()
			.unwrap_or_else(|| panic!("expected an error"));
		assert!(matches!(error, RenderError::UnresolvedDefinedType { name, .. } if name == "missing"));
	}

	#[test]
	fn unknown_kinds_degrade_to_opaque() {
		let dictionary = dictionary(&[]);
		let node = parse(r#"{ "kind": "fancyTypeNode" }"#);
		let manifest = resolved(&dictionary, &node);
		assert_eq!(manifest.target_type, "Object");
		assert_eq!(manifest.diagnostics.len(), 1);
		assert_eq!(manifest.codec.fixed_size(), None);
		assert_eq!(manifest.codec.max_size(), None);
		assert_eq!(manifest.codec.borsh_annotation(), None);
	}

	#[test]
	fn layout_altering_and_big_endian_nodes_fail() {
		let dictionary = dictionary(&[]);
		for json in [
			r#"{ "kind": "numberTypeNode", "format": "u32", "endian": "be" }"#,
			r#"{ "kind": "hiddenPrefixTypeNode" }"#,
			r#"{ "kind": "zeroableOptionTypeNode" }"#,
		] {
			let result = resolve(&dictionary, &parse(json));
			assert!(
				matches!(result, Err(RenderError::UnsupportedType { .. })),
				"{json}"
			);
		}
	}
}
