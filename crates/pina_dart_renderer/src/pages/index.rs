use std::collections::BTreeSet;
use std::fmt::Write as _;

use heck::ToSnakeCase;

use super::Page;
use crate::config::RenderConfig;
use crate::imports::ImportMap;

const BORSH_ANNOTATION_URL: &str = "https://github.com/vlady-kotsev/borsh_annotation_extended.git";
const BORSH_ANNOTATION_REF: &str = "b6b2c80d3b198fc2af9fc74d78fcdc86c23ed7cd";

/// `<library>.dart`, exporting every generated page once, in sorted order.
pub fn library_index<'a>(exports: impl IntoIterator<Item = &'a str>, library_name: &str) -> Page {
	let path = format!("{library_name}.dart");
	let exports = exports
		.into_iter()
		.filter(|export| *export != path)
		.collect::<BTreeSet<_>>();

	let mut body = String::from("/// Generated Dart library for Solana program interaction;\n\n");
	if exports.is_empty() {
		body.push_str("// No exports found - check your program structure\n");
	}
	for export in exports {
		let _ = writeln!(body, "export '{export}';");
	}
	Page::new(path, ImportMap::new(), body)
}

/// The `pubspec.yaml` of the generated package.
pub fn pubspec(config: &RenderConfig, program_name: &str) -> String {
	let name = if config.package_name.is_empty() {
		program_name.to_snake_case()
	} else {
		config.package_name.clone()
	};

	let mut output = String::new();
	let _ = writeln!(output, "name: {name}");
	let _ = writeln!(output, "description: {}", config.package_description);
	let _ = writeln!(output, "version: {}", config.package_version);
	let _ = writeln!(output, "publish_to: none");
	output.push('\n');
	let _ = writeln!(output, "environment:");
	let _ = writeln!(output, "  sdk: \">=3.0.0 <4.0.0\"");
	output.push('\n');
	let _ = writeln!(output, "dependencies:");
	let _ = writeln!(output, "  borsh: 0.3.2");
	let _ = writeln!(output, "  borsh_annotation_extended:");
	let _ = writeln!(output, "    git:");
	let _ = writeln!(output, "      url: {BORSH_ANNOTATION_URL}");
	let _ = writeln!(output, "      ref: {BORSH_ANNOTATION_REF}");
	let _ = writeln!(output, "  solana: 0.31.2");
	output.push('\n');
	let _ = writeln!(output, "dev_dependencies:");
	let _ = writeln!(output, "  build_runner: ^2.4.7");
	let _ = writeln!(output, "  lints: ^3.0.0");
	let _ = writeln!(output, "  test: ^1.24.0");
	output
}
