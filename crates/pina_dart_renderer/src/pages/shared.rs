//! `shared.dart`: little endian encoders used by PDA seed expressions.

use std::fmt::Write as _;

use super::Page;
use crate::imports::ImportMap;
use crate::manifest::TYPED_DATA;
use crate::nodes::NumberFormat;
use crate::pda::SHARED_MODULE;
use crate::pda::encoder_name;

pub fn shared_page() -> Page {
	let mut body = String::new();
	let _ = writeln!(body, "Uint8List _fixed(int width, void Function(ByteData data) write) {{");
	let _ = writeln!(body, "  final data = ByteData(width);");
	let _ = writeln!(body, "  write(data);");
	let _ = writeln!(body, "  return data.buffer.asUint8List();");
	let _ = writeln!(body, "}}");
	body.push('\n');
	let _ = writeln!(body, "Uint8List _wide(BigInt value, int width) {{");
	let _ = writeln!(body, "  var remaining = value.toUnsigned(width * 8);");
	let _ = writeln!(body, "  final bytes = Uint8List(width);");
	let _ = writeln!(body, "  for (var i = 0; i < width; i++) {{");
	let _ = writeln!(body, "    bytes[i] = (remaining & BigInt.from(0xff)).toInt();");
	let _ = writeln!(body, "    remaining = remaining >> 8;");
	let _ = writeln!(body, "  }}");
	let _ = writeln!(body, "  return bytes;");
	let _ = writeln!(body, "}}");

	let mut encoders = Vec::with_capacity(NumberFormat::ALL_FIXED.len() + 1);
	for format in NumberFormat::ALL_FIXED {
		let name = encoder_name(format);
		body.push('\n');
		let _ = writeln!(body, "{}", fixed_encoder(&name, format));
		encoders.push(name);
	}

	let short_u16 = encoder_name(NumberFormat::ShortU16);
	body.push('\n');
	let _ = writeln!(body, "Uint8List {short_u16}(int value) {{");
	let _ = writeln!(body, "  final bytes = <int>[];");
	let _ = writeln!(body, "  var remaining = value;");
	let _ = writeln!(body, "  while (true) {{");
	let _ = writeln!(body, "    final byte = remaining & 0x7f;");
	let _ = writeln!(body, "    remaining >>= 7;");
	let _ = writeln!(body, "    if (remaining == 0) {{");
	let _ = writeln!(body, "      bytes.add(byte);");
	let _ = writeln!(body, "      return Uint8List.fromList(bytes);");
	let _ = writeln!(body, "    }}");
	let _ = writeln!(body, "    bytes.add(byte | 0x80);");
	let _ = writeln!(body, "  }}");
	let _ = writeln!(body, "}}");
	encoders.push(short_u16);

	let mut imports = ImportMap::new();
	imports.add(TYPED_DATA, ["ByteData", "Endian", "Uint8List"]);
	Page::new(SHARED_MODULE, imports, body).defining(encoders)
}

fn fixed_encoder(name: &str, format: NumberFormat) -> String {
	let width = format.byte_width().unwrap_or_default();
	if format.is_wide_integer() {
		return format!("Uint8List {name}(BigInt value) => _wide(value, {width});");
	}
	let (value_type, setter) = match format {
		NumberFormat::U8 => ("int", "setUint8"),
		NumberFormat::U16 => ("int", "setUint16"),
		NumberFormat::U32 => ("int", "setUint32"),
		NumberFormat::I8 => ("int", "setInt8"),
		NumberFormat::I16 => ("int", "setInt16"),
		NumberFormat::I32 => ("int", "setInt32"),
		NumberFormat::F32 => ("double", "setFloat32"),
		_ => ("double", "setFloat64"),
	};
	if width == 1 {
		format!("Uint8List {name}({value_type} value) => _fixed(1, (data) => data.{setter}(0, value));")
	} else {
		format!(
			"Uint8List {name}({value_type} value) => _fixed({width}, (data) => data.{setter}(0, value, Endian.little));"
		)
	}
}
