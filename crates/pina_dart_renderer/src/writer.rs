//! Writes a [`RenderMap`] to disk and optionally runs `dart format` on it.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::error::Result;
use crate::visitor::RenderMap;

const DART: &str = "dart";

/// Writes every file in `map` below `output_dir`.
///
/// The library directory is cleared first when
/// `delete_folder_before_rendering` is set, so files of removed nodes do not
/// linger. Files outside of it, like `pubspec.yaml`, are overwritten in place.
pub fn write_render_map(map: &RenderMap, output_dir: &Path, config: &RenderConfig) -> Result<()> {
	let library_dir = output_dir.join(&config.library_name);
	if config.delete_folder_before_rendering && library_dir.exists() {
		tracing::debug!(path = %library_dir.display(), "removing previous output");
		std::fs::remove_dir_all(&library_dir).map_err(|source| {
			RenderError::WriteFile {
				path: library_dir.clone(),
				source,
			}
		})?;
	}

	for (relative, contents) in &map.files {
		let path = output_dir.join(relative);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent).map_err(|source| {
				RenderError::WriteFile {
					path: parent.to_path_buf(),
					source,
				}
			})?;
		}
		std::fs::write(&path, contents).map_err(|source| RenderError::WriteFile { path, source })?;
	}

	tracing::info!(
		files = map.files.len(),
		output = %output_dir.display(),
		"wrote dart client"
	);
	Ok(())
}

/// Runs `dart format` over the generated library.
///
/// A missing `dart` executable only logs a warning, since the unformatted
/// output is still valid Dart.
pub fn format_output(output_dir: &Path, config: &RenderConfig) -> Result<()> {
	let library_dir = output_dir.join(&config.library_name);
	let command = format!("{DART} format {}", library_dir.display());
	let output = match Command::new(DART).arg("format").arg(&library_dir).output() {
		Ok(output) => output,
		Err(source) if source.kind() == ErrorKind::NotFound => {
			tracing::warn!("`{DART}` was not found on PATH, skipping formatting");
			return Ok(());
		}
		Err(source) => return Err(RenderError::CommandExec { command, source }),
	};

	if !output.status.success() {
		let stderr = String::from_utf8_lossy(&output.stderr);
		tracing::warn!(%command, stderr = %stderr.trim(), "formatter failed");
		return Err(RenderError::CommandFailed {
			command,
			status: output.status.code().unwrap_or(-1),
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn map(files: &[(&str, &str)]) -> RenderMap {
		RenderMap {
			files: files
				.iter()
				.map(|(path, contents)| ((*path).to_owned(), (*contents).to_owned()))
				.collect(),
			..RenderMap::default()
		}
	}

	#[test]
	fn stale_library_files_are_removed() {
		let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("failed to create temp dir: {e}"));
		let stale = dir.path().join("lib/accounts/old.dart");
		std::fs::create_dir_all(stale.parent().unwrap_or(dir.path()))
			.unwrap_or_else(|e| panic!("failed to create dir: {e}"));
		std::fs::write(&stale, "old").unwrap_or_else(|e| panic!("failed to write file: {e}"));

		let config = RenderConfig::default();
		write_render_map(
			&map(&[("lib/accounts/new.dart", "new"), ("pubspec.yaml", "name: x\n")]),
			dir.path(),
			&config,
		)
		.unwrap_or_else(|e| panic!("failed to write map: {e}"));

		assert!(!stale.exists());
		let written = std::fs::read_to_string(dir.path().join("lib/accounts/new.dart"))
			.unwrap_or_else(|e| panic!("failed to read file: {e}"));
		assert_eq!(written, "new");
		assert!(dir.path().join("pubspec.yaml").exists());
	}

	#[test]
	fn existing_files_survive_when_clearing_is_disabled() {
		let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("failed to create temp dir: {e}"));
		let kept = dir.path().join("lib/custom.dart");
		std::fs::create_dir_all(dir.path().join("lib")).unwrap_or_else(|e| panic!("failed to create dir: {e}"));
		std::fs::write(&kept, "keep").unwrap_or_else(|e| panic!("failed to write file: {e}"));

		let config = RenderConfig {
			delete_folder_before_rendering: false,
			..RenderConfig::default()
		};
		write_render_map(&map(&[("lib/lib.dart", "")]), dir.path(), &config)
			.unwrap_or_else(|e| panic!("failed to write map: {e}"));
		assert!(kept.exists());
	}
}
