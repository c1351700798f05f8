use heck::ToLowerCamelCase;
use heck::ToShoutySnakeCase;
use heck::ToSnakeCase;
use heck::ToUpperCamelCase;

/// Spelling rules for every identifier the renderer emits.
///
/// The renderer never cases a name itself, it always asks this policy.
pub trait NameApi: std::fmt::Debug + Send + Sync {
	fn account_type(&self, name: &str) -> String;
	fn account_field(&self, name: &str) -> String;
	fn defined_type(&self, name: &str) -> String;
	fn enum_variant(&self, name: &str) -> String;
	fn enum_factory(&self, name: &str) -> String;
	fn type_field(&self, name: &str) -> String;
	fn instruction_data_type(&self, name: &str) -> String;
	fn instruction_field(&self, name: &str) -> String;
	fn instruction_function(&self, name: &str) -> String;
	fn pda_function(&self, name: &str) -> String;
	fn error_constant(&self, name: &str) -> String;
	fn program_error_class(&self, name: &str) -> String;
	fn program_type(&self, name: &str) -> String;
	/// File stem (without extension) for a generated unit.
	fn file_name(&self, name: &str) -> String;
}

/// Default Dart naming conventions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DartNames;

const DART_RESERVED: &[&str] = &[
	"abstract", "as", "assert", "async", "await", "break", "case", "catch", "class", "const",
	"continue", "default", "do", "dynamic", "else", "enum", "export", "extends", "external",
	"factory", "false", "final", "finally", "for", "get", "if", "implements", "import", "in",
	"is", "library", "new", "null", "operator", "part", "rethrow", "return", "set", "static",
	"super", "switch", "this", "throw", "true", "try", "typedef", "var", "void", "while", "with",
	"yield",
];

fn identifier(name: String) -> String {
	if DART_RESERVED.contains(&name.as_str()) {
		format!("{name}_")
	} else {
		name
	}
}

impl NameApi for DartNames {
	fn account_type(&self, name: &str) -> String {
		name.to_upper_camel_case()
	}

	fn account_field(&self, name: &str) -> String {
		identifier(name.to_lower_camel_case())
	}

	fn defined_type(&self, name: &str) -> String {
		name.to_upper_camel_case()
	}

	fn enum_variant(&self, name: &str) -> String {
		name.to_upper_camel_case()
	}

	fn enum_factory(&self, name: &str) -> String {
		identifier(name.to_lower_camel_case())
	}

	fn type_field(&self, name: &str) -> String {
		identifier(name.to_lower_camel_case())
	}

	fn instruction_data_type(&self, name: &str) -> String {
		format!("{}InstructionData", name.to_upper_camel_case())
	}

	fn instruction_field(&self, name: &str) -> String {
		identifier(name.to_lower_camel_case())
	}

	fn instruction_function(&self, name: &str) -> String {
		format!("{}Instruction", name.to_lower_camel_case())
	}

	fn pda_function(&self, name: &str) -> String {
		format!("derive{}Pda", name.to_upper_camel_case())
	}

	fn error_constant(&self, name: &str) -> String {
		name.to_shouty_snake_case()
	}

	fn program_error_class(&self, name: &str) -> String {
		format!("{}Errors", name.to_upper_camel_case())
	}

	fn program_type(&self, name: &str) -> String {
		format!("{}Program", name.to_upper_camel_case())
	}

	fn file_name(&self, name: &str) -> String {
		name.to_snake_case()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dart_names_follow_conventions() {
		let names = DartNames;
		assert_eq!(names.account_type("tokenAccount"), "TokenAccount");
		assert_eq!(names.account_field("mint_authority"), "mintAuthority");
		assert_eq!(names.error_constant("invalidOwner"), "INVALID_OWNER");
		assert_eq!(names.instruction_data_type("initialize"), "InitializeInstructionData");
		assert_eq!(names.instruction_function("createVault"), "createVaultInstruction");
		assert_eq!(names.pda_function("vault"), "deriveVaultPda");
		assert_eq!(names.program_error_class("counter"), "CounterErrors");
		assert_eq!(names.program_type("counterProgram"), "CounterProgramProgram");
		assert_eq!(names.file_name("tokenAccount"), "token_account");
	}

	#[test]
	fn reserved_words_are_suffixed() {
		let names = DartNames;
		assert_eq!(names.account_field("class"), "class_");
		assert_eq!(names.instruction_field("default"), "default_");
		assert_eq!(names.type_field("amount"), "amount");
	}
}
