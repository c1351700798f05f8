use std::fmt::Write as _;

use super::Page;
use super::Rendered;
use super::byte_list;
use super::class::BorshClass;
use super::class::borsh_imports;
use super::class::declarations;
use super::class::declared_symbols;
use crate::discriminator::DiscriminatorSource;
use crate::discriminator::account_discriminator;
use crate::error::Result;
use crate::manifest::FieldManifest;
use crate::manifest::FieldNaming;
use crate::manifest::ResolveContext;
use crate::manifest::Shape;
use crate::manifest::TypeManifestResolver;
use crate::manifest::generated_module;
use crate::nodes::AccountNode;

/// `accounts/<name>.dart`: the account class, prefixed by its discriminator
/// on the wire.
pub fn account_page(account: &AccountNode, resolver: &TypeManifestResolver<'_>) -> Result<Rendered> {
	let names = resolver.names();
	let class_name = names.account_type(&account.name);
	let file = names.file_name(&account.name);
	let root = ResolveContext::root(class_name.clone(), FieldNaming::Account);
	// Non-struct data is wrapped in a single `data` field.
	let ctx = match account.data.as_struct() {
		Some(_) => root,
		None => root.field("Data"),
	};
	let manifest = resolver.resolve(&account.data, &ctx)?;
	let discriminator = account_discriminator(account)?;
	// The discriminator is only part of the class when a field carries it.
	let embedded = discriminator.source == DiscriminatorSource::Field;

	let fields = match &manifest.shape {
		Shape::Struct(fields) => fields.clone(),
		Shape::Plain | Shape::Enum { .. } => {
			vec![FieldManifest {
				name: "data".to_owned(),
				source_name: "data".to_owned(),
				target_type: manifest.target_type.clone(),
				codec: manifest.codec.clone(),
				docs: Vec::new(),
				default_value: None,
			}]
		}
	};

	let mut constants = vec![format!(
		"static final DISCRIMINATOR = {};",
		byte_list(&discriminator.bytes)
	)];
	let size = account.size.or_else(|| {
		let data = manifest.codec.fixed_size()?;
		if embedded {
			Some(data)
		} else {
			discriminator.bytes.len().checked_add(data)
		}
	});
	if let Some(size) = size {
		constants.push(format!("static const int SIZE = {size};"));
	}

	let mut from_borsh = String::new();
	let _ = writeln!(from_borsh, "if (data.length < DISCRIMINATOR.length) {{");
	let _ = writeln!(
		from_borsh,
		"  throw ArgumentError('{class_name} data is shorter than its discriminator');"
	);
	let _ = writeln!(from_borsh, "}}");
	let _ = writeln!(from_borsh, "for (var i = 0; i < DISCRIMINATOR.length; i++) {{");
	let _ = writeln!(from_borsh, "  if (data[i] != DISCRIMINATOR[i]) {{");
	let _ = writeln!(
		from_borsh,
		"    throw ArgumentError('invalid {class_name} discriminator');"
	);
	let _ = writeln!(from_borsh, "  }}");
	let _ = writeln!(from_borsh, "}}");
	if embedded {
		let _ = write!(from_borsh, "return _${class_name}FromBorsh(data);");
	} else {
		let _ = write!(
			from_borsh,
			"return _${class_name}FromBorsh(data.sublist(DISCRIMINATOR.length));"
		);
	}

	let to_account_data = if embedded {
		"/// The account data, discriminator included.\nUint8List toAccountData() {\n  return toBorsh();\n}"
			.to_owned()
	} else {
		"/// The account data, discriminator included.\nUint8List toAccountData() {\n  return Uint8List.fromList([...DISCRIMINATOR, ...toBorsh()]);\n}"
			.to_owned()
	};

	let class = BorshClass {
		docs: &account.docs,
		constants,
		from_borsh: Some(from_borsh),
		members: vec![to_account_data],
		..BorshClass::new(&class_name, &fields)
	};

	let mut body = format!("part '{file}.g.dart';\n\n");
	body.push_str(&class.render());
	body.push_str(&declarations(&manifest.nested_declarations));

	let mut imports = borsh_imports();
	imports.merge_with(&manifest.imports);
	let page = Page::new(generated_module("accounts", &file), imports, body)
		.defining([class_name.clone(), format!("B{class_name}")])
		.defining(declared_symbols(&manifest.nested_declarations));
	tracing::debug!(account = %account.name, path = %page.path, "rendered account page");
	Ok(Rendered::single(page, manifest.diagnostics))
}
