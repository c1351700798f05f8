//! Per-file import aggregation.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// What a single import statement brings into scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
	/// `import 'module';`
	Everything,
	/// `import 'module' show a, b;`
	Symbols(BTreeSet<String>),
}

/// Mapping from module path (or alias) to the symbols imported from it.
///
/// Merging is a set union and never loses a symbol. Removal is explicit and
/// works per `(module, symbol)` pair; a module whose symbol set becomes empty
/// is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
	imports: BTreeMap<String, Imported>,
}

impl ImportMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Imports specific symbols from `module`.
	pub fn add<I, S>(&mut self, module: impl Into<String>, symbols: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let module = module.into();
		let symbols = symbols.into_iter().map(Into::into);
		match self.imports.get_mut(&module) {
			Some(Imported::Everything) => {}
			Some(Imported::Symbols(existing)) => existing.extend(symbols),
			None => {
				let symbols = symbols.collect::<BTreeSet<_>>();
				if !symbols.is_empty() {
					self.imports.insert(module, Imported::Symbols(symbols));
				}
			}
		}
		self
	}

	/// Imports the whole of `module`.
	pub fn add_module(&mut self, module: impl Into<String>) -> &mut Self {
		self.imports.insert(module.into(), Imported::Everything);
		self
	}

	#[must_use]
	pub fn with_module(mut self, module: impl Into<String>) -> Self {
		self.add_module(module);
		self
	}

	pub fn remove<I, S>(&mut self, module: &str, symbols: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let Some(Imported::Symbols(existing)) = self.imports.get_mut(module) else {
			return self;
		};
		for symbol in symbols {
			existing.remove(symbol.as_ref());
		}
		if existing.is_empty() {
			self.imports.remove(module);
		}
		self
	}

	/// Drops `module` entirely, whatever it imports.
	pub fn remove_module(&mut self, module: &str) -> &mut Self {
		self.imports.remove(module);
		self
	}

	pub fn merge_with(&mut self, other: &Self) -> &mut Self {
		for (module, imported) in &other.imports {
			match imported {
				Imported::Everything => {
					self.add_module(module.clone());
				}
				Imported::Symbols(symbols) => {
					self.add(module.clone(), symbols.iter().cloned());
				}
			}
		}
		self
	}

	pub fn merged<'a>(maps: impl IntoIterator<Item = &'a Self>) -> Self {
		let mut result = Self::new();
		for map in maps {
			result.merge_with(map);
		}
		result
	}

	pub fn contains(&self, module: &str, symbol: &str) -> bool {
		match self.imports.get(module) {
			Some(Imported::Everything) => true,
			Some(Imported::Symbols(symbols)) => symbols.contains(symbol),
			None => false,
		}
	}

	pub fn contains_module(&self, module: &str) -> bool {
		self.imports.contains_key(module)
	}

	pub fn get(&self, module: &str) -> Option<&Imported> {
		self.imports.get(module)
	}

	pub fn is_empty(&self) -> bool {
		self.imports.is_empty()
	}

	pub fn len(&self) -> usize {
		self.imports.len()
	}

	pub fn modules(&self) -> impl Iterator<Item = &str> {
		self.imports.keys().map(String::as_str)
	}

	/// Rewrites every module key with `rename`, merging keys that collide.
	#[must_use]
	pub fn map_modules(&self, rename: impl Fn(&str) -> String) -> Self {
		let mut mapped = Self::new();
		for (module, imported) in &self.imports {
			let module = rename(module);
			match imported {
				Imported::Everything => {
					mapped.add_module(module);
				}
				Imported::Symbols(symbols) => {
					mapped.add(module, symbols.iter().cloned());
				}
			}
		}
		mapped
	}

	/// Removes `symbols` from every module.
	pub fn remove_symbols<S: AsRef<str>>(&mut self, symbols: &[S]) -> &mut Self {
		let modules = self.imports.keys().cloned().collect::<Vec<_>>();
		for module in modules {
			self.remove(&module, symbols.iter().map(|symbol| symbol.as_ref()));
		}
		self
	}

	/// Replaces alias keys by the module paths they stand for.
	#[must_use]
	pub fn resolve(&self, aliases: &BTreeMap<String, String>) -> Self {
		self.map_modules(|module| aliases.get(module).map_or_else(|| module.to_owned(), Clone::clone))
	}

	/// Formats the import block: `dart:` first, then `package:`, then
	/// relative paths, alphabetical within each group.
	pub fn render(&self, aliases: &BTreeMap<String, String>) -> String {
		let resolved = self.resolve(aliases);
		let mut groups: [Vec<(&String, &Imported)>; 3] = [Vec::new(), Vec::new(), Vec::new()];
		for entry in &resolved.imports {
			let group = if entry.0.starts_with("dart:") {
				0
			} else if entry.0.starts_with("package:") {
				1
			} else {
				2
			};
			groups[group].push(entry);
		}

		let mut output = String::new();
		for group in groups.iter().filter(|group| !group.is_empty()) {
			if !output.is_empty() {
				output.push('\n');
			}
			for (module, imported) in group {
				match imported {
					Imported::Everything => {
						let _ = writeln!(output, "import '{module}';");
					}
					Imported::Symbols(symbols) => {
						let symbols = symbols.iter().map(String::as_str).collect::<Vec<_>>();
						let _ = writeln!(output, "import '{module}' show {};", symbols.join(", "));
					}
				}
			}
		}
		output
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn single(module: &str, symbol: &str) -> ImportMap {
		let mut map = ImportMap::new();
		map.add(module, [symbol]);
		map
	}

	#[test]
	fn merging_is_order_independent() {
		let a = single("A", "x");
		let b = single("A", "y");
		let ab = ImportMap::merged([&a, &b]);
		let ba = ImportMap::merged([&b, &a]);
		assert_eq!(ab, ba);
		assert!(ab.contains("A", "x"));
		assert!(ab.contains("A", "y"));
	}

	#[test]
	fn merging_is_idempotent() {
		let mut map = single("A", "x");
		let snapshot = map.clone();
		map.merge_with(&snapshot).merge_with(&snapshot);
		assert_eq!(map, snapshot);
	}

	#[test]
	fn removal_is_per_symbol_and_drops_empty_modules() {
		let mut map = ImportMap::merged([&single("A", "x"), &single("A", "y")]);
		map.remove("A", ["x"]);
		assert!(!map.contains("A", "x"));
		assert!(map.contains("A", "y"));
		map.remove("A", ["y"]);
		assert!(map.is_empty());
	}

	#[test]
	fn whole_module_imports_absorb_symbols() {
		let mut map = single("dart:typed_data", "Uint8List");
		map.add_module("dart:typed_data");
		map.add("dart:typed_data", ["Int8List"]);
		assert_eq!(map.get("dart:typed_data"), Some(&Imported::Everything));
	}

	#[test]
	fn removing_symbols_spans_every_module() {
		let mut map = ImportMap::new();
		map.add("types/vault.dart", ["Vault", "BVault"])
			.add("types/limits.dart", ["Vault"])
			.add_module("package:solana/solana.dart");
		map.remove_symbols(&["Vault"]);
		assert!(map.contains("types/vault.dart", "BVault"));
		assert!(!map.contains_module("types/limits.dart"));
		assert_eq!(map.get("package:solana/solana.dart"), Some(&Imported::Everything));
	}

	#[test]
	fn mapping_modules_merges_collisions() {
		let mut map = ImportMap::new();
		map.add("a", ["x"]).add("b", ["y"]);
		let mapped = map.map_modules(|_| "c".to_owned());
		assert_eq!(mapped.len(), 1);
		assert!(mapped.contains("c", "x"));
		assert!(mapped.contains("c", "y"));
	}

	#[test]
	fn renders_grouped_blocks() {
		let mut aliases = BTreeMap::new();
		aliases.insert("dartTypedData".to_owned(), "dart:typed_data".to_owned());
		let mut map = ImportMap::new();
		map.add("../types/vault_state.dart", ["VaultState"])
			.add_module("package:solana/solana.dart")
			.add("dartTypedData", ["Uint8List", "Int16List"])
			.add_module("dart:convert")
			.add_module("package:borsh_annotation_extended/borsh_annotation_extended.dart");

		insta::assert_snapshot!(map.render(&aliases), @r"
		import 'dart:convert';
		import 'dart:typed_data' show Int16List, Uint8List;

		import 'package:borsh_annotation_extended/borsh_annotation_extended.dart';
		import 'package:solana/solana.dart';

		import '../types/vault_state.dart' show VaultState;
		");
	}
}
