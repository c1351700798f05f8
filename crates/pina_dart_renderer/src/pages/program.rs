use std::fmt::Write as _;

use super::Page;
use super::dart_string;
use crate::error::Result;
use crate::imports::ImportMap;
use crate::manifest::SOLANA;
use crate::manifest::generated_module;
use crate::names::NameApi;
use crate::nodes::ProgramNode;
use crate::pda::parse_address;

const DEFAULT_PROGRAM_VERSION: &str = "1.0.0";

/// `programs/<program>.dart`: the program id and metadata.
///
/// Fails when the program public key is not a valid address, since every
/// instruction builder and PDA helper derives from it.
pub fn program_page(program: &ProgramNode, names: &dyn NameApi) -> Result<Page> {
	parse_address(&program.public_key, &program.name)?;
	let class_name = names.program_type(&program.name);
	let version = if program.version.is_empty() {
		DEFAULT_PROGRAM_VERSION
	} else {
		program.version.as_str()
	};

	let mut body = String::new();
	let _ = writeln!(body, "/// Program constants and utilities for {}", program.name);
	let _ = writeln!(body, "class {class_name} {{");
	let _ = writeln!(body, "  /// The program ID");
	let _ = writeln!(body, "  static const String programId = '{}';", program.public_key);
	body.push('\n');
	let _ = writeln!(body, "  /// Get the program's Ed25519HDPublicKey");
	let _ = writeln!(body, "  static Ed25519HDPublicKey get publicKey {{");
	let _ = writeln!(body, "    return Ed25519HDPublicKey.fromBase58(programId);");
	let _ = writeln!(body, "  }}");
	body.push('\n');
	let _ = writeln!(body, "  /// Program name");
	let _ = writeln!(body, "  static const String name = '{}';", dart_string(&program.name));
	body.push('\n');
	let _ = writeln!(body, "  /// Program version");
	let _ = writeln!(body, "  static const String version = '{}';", dart_string(version));
	let _ = writeln!(body, "}}");

	let mut imports = ImportMap::new();
	imports.add(SOLANA, ["Ed25519HDPublicKey"]);
	let path = generated_module("programs", &names.file_name(&program.name));
	Ok(Page::new(path, imports, body).defining([class_name]))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::RenderError;
	use crate::names::DartNames;

	#[test]
	fn program_ids_are_validated() {
		let program = ProgramNode {
			name: "counter".to_owned(),
			public_key: "not-a-key".to_owned(),
			..ProgramNode::default()
		};
		let result = program_page(&program, &DartNames);
		assert!(matches!(result, Err(RenderError::InvalidAddress { .. })));
	}

	#[test]
	fn missing_versions_default() {
		let program = ProgramNode {
			name: "counter".to_owned(),
			public_key: "11111111111111111111111111111111".to_owned(),
			..ProgramNode::default()
		};
		let page = program_page(&program, &DartNames).unwrap_or_else(|e| panic!("failed to render program: {e}"));
		assert_eq!(page.path, "programs/counter.dart");
		assert!(page.body.contains("class CounterProgram {"));
		assert!(page.body.contains("static const String programId = '11111111111111111111111111111111';"));
		assert!(page.body.contains("static const String version = '1.0.0';"));
		assert!(page.imports.contains(SOLANA, "Ed25519HDPublicKey"));
	}
}
