use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::RenderError;
use crate::error::Result;
use crate::names::DartNames;
use crate::names::NameApi;

/// Import aliases resolved by [`crate::imports::ImportMap::resolve`].
pub const DEFAULT_DEPENDENCY_MAP: &[(&str, &str)] = &[
	(
		"borsh",
		"package:borsh_annotation_extended/borsh_annotation_extended.dart",
	),
	("dartConvert", "dart:convert"),
	("dartTypedData", "dart:typed_data"),
	("solana", "package:solana/solana.dart"),
	("solanaEncoder", "package:solana/encoder.dart"),
];

/// Well known accounts that instruction builders may default.
pub const DEFAULT_BUILTIN_PROGRAMS: &[(&str, &str)] = &[
	(
		"associatedTokenProgram",
		"ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL",
	),
	("clockSysvar", "SysvarC1ock11111111111111111111111111111111"),
	(
		"computeBudgetProgram",
		"ComputeBudget111111111111111111111111111111",
	),
	(
		"instructionsSysvar",
		"Sysvar1nstructions1111111111111111111111111",
	),
	("memoProgram", "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr"),
	("rentSysvar", "SysvarRent111111111111111111111111111111111"),
	("systemProgram", "11111111111111111111111111111111"),
	(
		"token2022Program",
		"TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb",
	),
	("tokenProgram", "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"),
];

#[derive(Debug, Clone)]
pub struct RenderConfig {
	/// Directory, relative to the output root, that holds the Dart sources.
	pub library_name: String,
	/// `name` in the generated `pubspec.yaml`. Defaults to the snake cased
	/// program name when empty.
	pub package_name: String,
	pub package_version: String,
	pub package_description: String,
	pub dependency_map: BTreeMap<String, String>,
	pub builtin_programs: BTreeMap<String, String>,
	pub delete_folder_before_rendering: bool,
	pub format_code: bool,
	pub parallel: bool,
	pub name_api: Arc<dyn NameApi>,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			library_name: "lib".to_owned(),
			package_name: String::new(),
			package_version: "1.0.0".to_owned(),
			package_description: "Generated Dart package for Solana program interaction".to_owned(),
			dependency_map: to_map(DEFAULT_DEPENDENCY_MAP),
			builtin_programs: to_map(DEFAULT_BUILTIN_PROGRAMS),
			delete_folder_before_rendering: true,
			format_code: true,
			parallel: true,
			name_api: Arc::new(DartNames),
		}
	}
}

fn to_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
	entries
		.iter()
		.map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
		.collect()
}

/// Renderer options as written in a JSON options file.
///
/// Map entries extend (and override) the defaults rather than replacing them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RenderOptions {
	pub library_name: Option<String>,
	pub package_name: Option<String>,
	pub package_version: Option<String>,
	pub package_description: Option<String>,
	#[serde(default)]
	pub dependency_map: BTreeMap<String, String>,
	#[serde(default)]
	pub builtin_programs: BTreeMap<String, String>,
	pub delete_folder_before_rendering: Option<bool>,
	pub format_code: Option<bool>,
	pub parallel: Option<bool>,
}

impl RenderOptions {
	pub fn from_file(path: &Path) -> Result<Self> {
		let contents = std::fs::read_to_string(path).map_err(|source| {
			RenderError::ReadFile {
				path: path.to_path_buf(),
				source,
			}
		})?;
		serde_json::from_str(&contents).map_err(|source| {
			RenderError::ParseConfig {
				path: path.to_path_buf(),
				source,
			}
		})
	}
}

impl RenderConfig {
	#[must_use]
	pub fn with_options(mut self, options: RenderOptions) -> Self {
		if let Some(library_name) = options.library_name {
			self.library_name = library_name;
		}
		if let Some(package_name) = options.package_name {
			self.package_name = package_name;
		}
		if let Some(package_version) = options.package_version {
			self.package_version = package_version;
		}
		if let Some(package_description) = options.package_description {
			self.package_description = package_description;
		}
		self.dependency_map.extend(options.dependency_map);
		self.builtin_programs.extend(options.builtin_programs);
		if let Some(delete) = options.delete_folder_before_rendering {
			self.delete_folder_before_rendering = delete;
		}
		if let Some(format_code) = options.format_code {
			self.format_code = format_code;
		}
		if let Some(parallel) = options.parallel {
			self.parallel = parallel;
		}
		self
	}

	#[must_use]
	pub fn with_name_api(mut self, name_api: Arc<dyn NameApi>) -> Self {
		self.name_api = name_api;
		self
	}

	pub fn builtin_program(&self, account_name: &str) -> Option<&str> {
		self.builtin_programs.get(account_name).map(String::as_str)
	}
}
