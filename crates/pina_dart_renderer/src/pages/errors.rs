use std::fmt::Write as _;

use super::Page;
use super::dart_string;
use crate::imports::ImportMap;
use crate::manifest::generated_module;
use crate::names::NameApi;
use crate::nodes::ProgramNode;

/// `errors/<program>.dart`, or nothing when the program declares no errors.
pub fn errors_page(program: &ProgramNode, names: &dyn NameApi) -> Option<Page> {
	if program.errors.is_empty() {
		return None;
	}

	let class_name = names.program_error_class(&program.name);
	let mut errors = program.errors.iter().collect::<Vec<_>>();
	errors.sort_by_key(|error| error.code);

	let mut body = String::new();
	let _ = writeln!(body, "/// Program errors for {}", program.name);
	let _ = writeln!(body, "class {class_name} {{");
	for error in &errors {
		if !error.docs.is_empty() {
			let _ = writeln!(body, "  /// {}", error.docs.join(" "));
		}
		let _ = writeln!(
			body,
			"  static const int {} = {};",
			names.error_constant(&error.name),
			error.code
		);
	}
	body.push('\n');
	let _ = writeln!(body, "  static const Map<int, String> _errorMessages = {{");
	for error in &errors {
		let _ = writeln!(
			body,
			"    {}: '{}',",
			names.error_constant(&error.name),
			dart_string(&error.message)
		);
	}
	let _ = writeln!(body, "  }};");
	body.push('\n');
	let _ = writeln!(body, "  /// Get error message for a given error code");
	let _ = writeln!(body, "  static String getMessage(int code) {{");
	let _ = writeln!(body, "    return _errorMessages[code] ?? 'Unknown error code: $code';");
	let _ = writeln!(body, "  }}");
	body.push('\n');
	let _ = writeln!(body, "  /// Check if the given code is a valid error code for this program");
	let _ = writeln!(body, "  static bool isValidErrorCode(int code) {{");
	let _ = writeln!(body, "    return _errorMessages.containsKey(code);");
	let _ = writeln!(body, "  }}");
	body.push('\n');
	let _ = writeln!(body, "  /// Get all error codes");
	let _ = writeln!(body, "  static List<int> getAllErrorCodes() {{");
	let _ = writeln!(body, "    return _errorMessages.keys.toList();");
	let _ = writeln!(body, "  }}");
	let _ = writeln!(body, "}}");

	let path = generated_module("errors", &names.file_name(&program.name));
	Some(Page::new(path, ImportMap::new(), body).defining([class_name]))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::names::DartNames;
	use crate::nodes::ErrorNode;

	fn error(name: &str, code: u32, message: &str) -> ErrorNode {
		ErrorNode {
			name: name.to_owned(),
			code,
			message: message.to_owned(),
			docs: Vec::new(),
		}
	}

	#[test]
	fn programs_without_errors_have_no_page() {
		assert!(errors_page(&ProgramNode::default(), &DartNames).is_none());
	}

	#[test]
	fn errors_are_sorted_by_code() {
		let program = ProgramNode {
			name: "counter".to_owned(),
			errors: vec![
				error("overflow", 6001, "Counter can't grow"),
				ErrorNode {
					docs: vec!["Raised when".to_owned(), "the signer is wrong.".to_owned()],
					..error("invalidAuthority", 6000, "Invalid authority")
				},
			],
			..ProgramNode::default()
		};
		let page = errors_page(&program, &DartNames).unwrap_or_else(|| panic!("expected an errors page"));
		assert_eq!(page.path, "errors/counter.dart");
		insta::assert_snapshot!(page.body, @r"
		/// Program errors for counter
		class CounterErrors {
		  /// Raised when the signer is wrong.
		  static const int INVALID_AUTHORITY = 6000;
		  static const int OVERFLOW = 6001;

		  static const Map<int, String> _errorMessages = {
		    INVALID_AUTHORITY: 'Invalid authority',
		    OVERFLOW: 'Counter can\'t grow',
		  };

		  /// Get error message for a given error code
		  static String getMessage(int code) {
		    return _errorMessages[code] ?? 'Unknown error code: $code';
		  }

		  /// Check if the given code is a valid error code for this program
		  static bool isValidErrorCode(int code) {
		    return _errorMessages.containsKey(code);
		  }

		  /// Get all error codes
		  static List<int> getAllErrorCodes() {
		    return _errorMessages.keys.toList();
		  }
		}
		");
	}
}
