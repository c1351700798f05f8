//! Borsh class bodies shared by every page that declares types.

use std::fmt::Write as _;

use heck::ToUpperCamelCase;

use super::doc_block;
use crate::imports::ImportMap;
use crate::manifest::BORSH;
use crate::manifest::Declaration;
use crate::manifest::FieldManifest;
use crate::manifest::Shape;
use crate::manifest::TYPED_DATA;
use crate::manifest::VariantManifest;
use crate::manifest::VariantPayload;
use crate::nodes::NumberFormat;

/// Imports every Borsh class body needs.
pub(crate) fn borsh_imports() -> ImportMap {
	let mut imports = ImportMap::new();
	imports.add_module(BORSH).add(TYPED_DATA, ["Uint8List"]);
	imports
}

/// A `@BorshSerializable()` class.
#[derive(Debug, Clone, Default)]
pub(crate) struct BorshClass<'a> {
	pub name: &'a str,
	pub docs: &'a [String],
	pub fields: &'a [FieldManifest],
	/// Static members placed before the factory.
	pub constants: Vec<String>,
	/// Statements run by the factory before it builds the value. The factory
	/// simply redirects when there are none.
	pub checks: Vec<String>,
	/// Body of `fromBorsh`. Defaults to the generated decoder.
	pub from_borsh: Option<String>,
	/// Members appended after `fromBorsh`.
	pub members: Vec<String>,
}

impl<'a> BorshClass<'a> {
	pub fn new(name: &'a str, fields: &'a [FieldManifest]) -> Self {
		Self {
			name,
			fields,
			..Self::default()
		}
	}

	pub fn render(&self) -> String {
		let name = self.name;
		let mut output = doc_block(self.docs, "");
		let _ = writeln!(output, "@BorshSerializable()");
		let _ = writeln!(output, "class {name} with _${name} {{");
		for constant in &self.constants {
			let _ = writeln!(output, "  {constant}");
		}
		if !self.constants.is_empty() {
			output.push('\n');
		}

		let _ = writeln!(output, "  factory {name}({{");
		for field in self.fields {
			output.push_str(&doc_block(&field.docs, "    "));
			let _ = writeln!(output, "    {},", field_parameter(field));
		}
		if self.checks.is_empty() {
			let _ = writeln!(output, "  }}) = _{name};");
			output.push('\n');
			let _ = writeln!(output, "  const {name}._();");
		} else {
			let _ = writeln!(output, "  }}) {{");
			for check in &self.checks {
				let _ = writeln!(output, "    {check}");
			}
			let _ = writeln!(output, "    return _{name}(");
			for field in self.fields {
				let _ = writeln!(output, "      {0}: {0},", field.name);
			}
			let _ = writeln!(output, "    );");
			let _ = writeln!(output, "  }}");
			output.push('\n');
			let _ = writeln!(output, "  {name}._();");
		}
		output.push('\n');

		let _ = writeln!(output, "  static {name} fromBorsh(Uint8List data) {{");
		match &self.from_borsh {
			Some(body) => {
				for line in body.lines() {
					let _ = writeln!(output, "    {line}");
				}
			}
			None => {
				let _ = writeln!(output, "    return _${name}FromBorsh(data);");
			}
		}
		let _ = writeln!(output, "  }}");

		for member in &self.members {
			output.push('\n');
			for line in member.lines() {
				if line.is_empty() {
					output.push('\n');
				} else {
					let _ = writeln!(output, "  {line}");
				}
			}
		}

		output.push('\n');
		output.push_str(&to_string_method(name, self.fields.iter().map(|field| field.name.as_str())));
		output.push_str("}\n");
		output
	}
}

/// `@BU64() required BigInt amount`.
pub(crate) fn field_parameter(field: &FieldManifest) -> String {
	match field.annotation() {
		Some(annotation) => format!("{annotation} required {} {}", field.target_type, field.name),
		None => format!("required {} {}", field.target_type, field.name),
	}
}

fn to_string_method<'a>(name: &str, fields: impl Iterator<Item = &'a str>) -> String {
	let mut output = String::new();
	let _ = writeln!(output, "  @override");
	let _ = writeln!(output, "  String toString([int indent = 0]) {{");
	let _ = writeln!(output, "    final buffer = StringBuffer();");
	let _ = writeln!(output, "    buffer.writeln('{name}(');");
	for field in fields {
		let _ = writeln!(output, "    buffer.writeln('  {field}: ${field}');");
	}
	let _ = writeln!(output, "    buffer.write(')');");
	let _ = writeln!(output, "    return buffer.toString();");
	let _ = writeln!(output, "  }}");
	output
}

/// Classes for auxiliary declarations produced by inline structs and enums.
pub(crate) fn declarations(declarations: &[Declaration]) -> String {
	let mut output = String::new();
	for declaration in declarations {
		output.push('\n');
		match &declaration.shape {
			Shape::Struct(fields) => output.push_str(&BorshClass::new(&declaration.name, fields).render()),
			Shape::Enum { size, variants } => {
				output.push_str(&enum_class(&declaration.name, &[], *size, variants));
				for variant in variants {
					output.push('\n');
					output.push_str(&variant_class(variant));
				}
			}
			Shape::Plain => {}
		}
	}
	output
}

/// The enum class holding one variant value and its positional index.
pub(crate) fn enum_class(name: &str, docs: &[String], size: NumberFormat, variants: &[VariantManifest]) -> String {
	let mut output = doc_block(docs, "");
	let _ = writeln!(output, "class {name} {{");
	let _ = writeln!(output, "  final dynamic variant;");
	let _ = writeln!(output, "  final int discriminant;");
	output.push('\n');
	let _ = writeln!(output, "  const {name}._(this.variant, this.discriminant);");

	for variant in variants {
		output.push('\n');
		let (parameters, arguments) = match &variant.payload {
			VariantPayload::Empty => (String::new(), String::new()),
			VariantPayload::Tuple(fields) if !fields.is_empty() => {
				let parameters = fields
					.iter()
					.map(|field| format!("{} {}", field.target_type, field.name))
					.collect::<Vec<_>>();
				(parameters.join(", "), named_arguments(fields))
			}
			VariantPayload::Struct(fields) if !fields.is_empty() => {
				let parameters = fields
					.iter()
					.map(|field| format!("required {} {}", field.target_type, field.name))
					.collect::<Vec<_>>();
				(format!("{{{}}}", parameters.join(", ")), named_arguments(fields))
			}
			VariantPayload::Tuple(_) | VariantPayload::Struct(_) => (String::new(), String::new()),
		};
		let _ = writeln!(output, "  factory {name}.{}({parameters}) {{", variant.factory);
		let _ = writeln!(
			output,
			"    return {name}._({}({arguments}), {});",
			variant.name, variant.index
		);
		let _ = writeln!(output, "  }}");
	}

	output.push('\n');
	let _ = writeln!(output, "  @override");
	let _ = writeln!(output, "  String toString() {{");
	let _ = writeln!(output, "    return variant.toString();");
	let _ = writeln!(output, "  }}");
	output.push('\n');
	let _ = writeln!(output, "  Uint8List toBorsh() {{");
	let _ = writeln!(output, "    final writer = BinaryWriter();");
	let _ = writeln!(
		output,
		"    writer.write{}(discriminant);",
		size.as_str().to_upper_camel_case()
	);
	let _ = writeln!(output, "    final Uint8List variantBytes = variant.toBorsh();");
	let _ = writeln!(output, "    for (final byte in variantBytes) {{");
	let _ = writeln!(output, "      writer.writeU8(byte);");
	let _ = writeln!(output, "    }}");
	let _ = writeln!(output, "    return writer.toArray();");
	let _ = writeln!(output, "  }}");
	let _ = writeln!(output, "}}");

	let annotations = variants
		.iter()
		.map(|variant| format!("{0}: B{0}()", variant.name))
		.collect::<Vec<_>>();
	output.push('\n');
	let _ = writeln!(
		output,
		"// Usage: @BEnum<{name}>({{{}}}) required {name} value,",
		annotations.join(", ")
	);
	output
}

fn named_arguments(fields: &[FieldManifest]) -> String {
	fields
		.iter()
		.map(|field| format!("{0}: {0}", field.name))
		.collect::<Vec<_>>()
		.join(", ")
}

/// The payload class of one variant, plus a hand written `BType` for
/// payload-less variants.
pub(crate) fn variant_class(variant: &VariantManifest) -> String {
	let fields = variant.payload.fields();
	if !fields.is_empty() {
		return BorshClass::new(&variant.name, fields).render();
	}

	let name = &variant.name;
	let mut output = String::new();
	let _ = writeln!(output, "class {name} {{");
	let _ = writeln!(output, "  const {name}();");
	output.push('\n');
	let _ = writeln!(output, "  static {name} fromBorsh(Uint8List _data) {{");
	let _ = writeln!(output, "    return {name}();");
	let _ = writeln!(output, "  }}");
	output.push('\n');
	let _ = writeln!(output, "  Uint8List toBorsh() {{");
	let _ = writeln!(output, "    return Uint8List(0);");
	let _ = writeln!(output, "  }}");
	output.push('\n');
	let _ = writeln!(output, "  @override");
	let _ = writeln!(output, "  String toString([int indent = 0]) {{");
	let _ = writeln!(output, "    return '{name}()';");
	let _ = writeln!(output, "  }}");
	let _ = writeln!(output, "}}");
	output.push('\n');
	let _ = writeln!(output, "class B{name} implements BType<{name}> {{");
	let _ = writeln!(output, "  const B{name}();");
	output.push('\n');
	let _ = writeln!(output, "  @override");
	let _ = writeln!(output, "  void write(BinaryWriter writer, {name} value) {{}}");
	output.push('\n');
	let _ = writeln!(output, "  @override");
	let _ = writeln!(output, "  {name} read(BinaryReader reader) {{");
	let _ = writeln!(output, "    return {name}();");
	let _ = writeln!(output, "  }}");
	let _ = writeln!(output, "}}");
	output
}

/// Whether any class in `declarations` or `fields` needs a generated part.
pub(crate) fn needs_part(fields: &[FieldManifest], declarations: &[Declaration]) -> bool {
	!fields.is_empty()
		|| declarations.iter().any(|declaration| {
			match &declaration.shape {
				Shape::Struct(_) => true,
				Shape::Enum { variants, .. } => {
					variants
						.iter()
						.any(|variant| !variant.payload.fields().is_empty())
				}
				Shape::Plain => false,
			}
		})
}

/// Names declared by the auxiliary classes, including their `B` types.
pub(crate) fn declared_symbols(declarations: &[Declaration]) -> Vec<String> {
	let mut symbols = Vec::new();
	for declaration in declarations {
		symbols.push(declaration.name.clone());
		symbols.push(format!("B{}", declaration.name));
		if let Shape::Enum { variants, .. } = &declaration.shape {
			for variant in variants {
				symbols.push(variant.name.clone());
				symbols.push(format!("B{}", variant.name));
			}
		}
	}
	symbols
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::codec::Codec;

	fn field(name: &str, target_type: &str, codec: Codec) -> FieldManifest {
		FieldManifest {
			name: name.to_owned(),
			source_name: name.to_owned(),
			target_type: target_type.to_owned(),
			codec,
			docs: Vec::new(),
			default_value: None,
		}
	}

	#[test]
	fn struct_classes_redirect_to_the_generated_constructor() {
		let fields = [
			field("authority", "Ed25519HDPublicKey", Codec::PublicKey),
			field("bump", "int", Codec::Number(NumberFormat::U8)),
		];
		insta::assert_snapshot!(BorshClass::new("Vault", &fields).render(), @r"
		@BorshSerializable()
		class Vault with _$Vault {
		  factory Vault({
		    @BPublicKey() required Ed25519HDPublicKey authority,
		    @BU8() required int bump,
		  }) = _Vault;

		  const Vault._();

		  static Vault fromBorsh(Uint8List data) {
		    return _$VaultFromBorsh(data);
		  }

		  @override
		  String toString([int indent = 0]) {
		    final buffer = StringBuffer();
		    buffer.writeln('Vault(');
		    buffer.writeln('  authority: $authority');
		    buffer.writeln('  bump: $bump');
		    buffer.write(')');
		    return buffer.toString();
		  }
		}
		");
	}

	#[test]
	fn opaque_fields_render_without_annotation() {
		let opaque = field(
			"extra",
			"Object",
			Codec::Opaque {
				kind: "unknownTypeNode".to_owned(),
			},
		);
		assert_eq!(field_parameter(&opaque), "required Object extra");
	}

	#[test]
	fn empty_variants_get_a_hand_written_borsh_type() {
		let variant = VariantManifest {
			name: "Up".to_owned(),
			factory: "up".to_owned(),
			index: 0,
			payload: VariantPayload::Empty,
		};
		let rendered = variant_class(&variant);
		assert!(rendered.contains("class BUp implements BType<Up> {"));
		assert!(!rendered.contains("@BorshSerializable"));
	}

	#[test]
	fn enum_classes_write_the_discriminant_at_its_width() {
		let variants = [VariantManifest {
			name: "Circle".to_owned(),
			factory: "circle".to_owned(),
			index: 0,
			payload: VariantPayload::Tuple(vec![field("field0", "double", Codec::Number(NumberFormat::F64))]),
		}];
		let rendered = enum_class("Shape", &[], NumberFormat::U16, &variants);
		assert!(rendered.contains("factory Shape.circle(double field0) {"));
		assert!(rendered.contains("return Shape._(Circle(field0: field0), 0);"));
		assert!(rendered.contains("writer.writeU16(discriminant);"));
		assert!(rendered.contains("// Usage: @BEnum<Shape>({Circle: BCircle()}) required Shape value,"));
	}
}
