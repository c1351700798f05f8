//! Renders Codama IDLs into Dart clients built on `borsh_annotation` and
//! the `solana` package.
//!
//! The pipeline reads a [`RootNode`], resolves every account, instruction,
//! defined type and PDA into Dart pages and writes them as a Dart package:
//!
//! ```text
//! <output>/
//!   pubspec.yaml
//!   lib/
//!     lib.dart
//!     shared.dart
//!     accounts/ instructions/ types/ pdas/ programs/ errors/
//! ```

pub mod codec;
pub mod config;
pub mod discriminator;
pub mod error;
pub mod imports;
pub mod linkables;
pub mod manifest;
pub mod names;
pub mod nodes;
pub mod pages;
pub mod pda;
pub mod visitor;
pub mod writer;

use std::path::Path;

pub use crate::config::RenderConfig;
pub use crate::config::RenderOptions;
pub use crate::error::RenderError;
pub use crate::error::Result;
pub use crate::names::DartNames;
pub use crate::names::NameApi;
pub use crate::nodes::RootNode;
pub use crate::visitor::RenderMap;
pub use crate::visitor::UnitFailure;
pub use crate::visitor::render_map;

/// Reads and parses a Codama JSON IDL.
pub fn read_root_node(path: &Path) -> Result<RootNode> {
	let contents = std::fs::read_to_string(path).map_err(|source| {
		RenderError::ReadFile {
			path: path.to_path_buf(),
			source,
		}
	})?;
	serde_json::from_str(&contents).map_err(|source| {
		RenderError::ParseIdl {
			path: path.to_path_buf(),
			source,
		}
	})
}

/// Renders `root` and writes the Dart package to `output_dir`.
///
/// Unit failures do not abort the write. They are returned in the
/// [`RenderMap`] so callers can decide how to report them.
pub fn render_root_node(root: &RootNode, output_dir: &Path, config: &RenderConfig) -> Result<RenderMap> {
	let map = render_map(root, config);
	writer::write_render_map(&map, output_dir, config)?;
	if config.format_code {
		writer::format_output(output_dir, config)?;
	}
	if !map.is_success() {
		tracing::warn!(
			program = %root.program.name,
			failures = map.failures.len(),
			"some units failed to render"
		);
	}
	Ok(map)
}

pub fn render_idl_file(path: &Path, output_dir: &Path, config: &RenderConfig) -> Result<RenderMap> {
	let root = read_root_node(path)?;
	tracing::debug!(path = %path.display(), program = %root.program.name, "parsed IDL");
	render_root_node(&root, output_dir, config)
}
