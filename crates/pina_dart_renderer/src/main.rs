use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use pina_dart_renderer::RenderConfig;
use pina_dart_renderer::RenderError;
use pina_dart_renderer::RenderOptions;
use pina_dart_renderer::render_idl_file;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
	name = "pina_dart_renderer",
	about = "Generate Borsh-annotated Dart clients from Codama IDLs"
)]
struct Args {
	/// A single IDL file path. Can be provided multiple times.
	#[arg(long = "idl")]
	idls: Vec<PathBuf>,

	/// A directory containing `*.json` IDLs.
	#[arg(long = "idl-dir")]
	idl_dir: Option<PathBuf>,

	/// Root output directory where one Dart package per IDL will be written.
	#[arg(long)]
	output: PathBuf,

	/// JSON renderer options file.
	#[arg(long)]
	config: Option<PathBuf>,

	/// Directory inside each package that holds the Dart sources.
	#[arg(long = "library-name")]
	library_name: Option<String>,

	/// Skip `dart format` on the generated sources.
	#[arg(long = "no-format")]
	no_format: bool,

	/// Render units one after another instead of in parallel.
	#[arg(long)]
	sequential: bool,
}

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(std::io::stderr)
		.init();

	match run() {
		Ok(0) => {}
		Ok(failed) => {
			eprintln!("{failed} unit(s) failed to render");
			std::process::exit(2);
		}
		Err(error) => {
			eprintln!("{error}");
			std::process::exit(1);
		}
	}
}

/// Renders every IDL and returns the number of units that failed.
fn run() -> Result<usize, RenderError> {
	let args = Args::parse();
	let idl_paths = collect_idl_paths(&args)?;
	let config = build_config(&args)?;

	let mut failed = 0;
	for idl_path in &idl_paths {
		let output_dir = args.output.join(file_stem(idl_path)?);
		let map = render_idl_file(idl_path, &output_dir, &config)?;
		for failure in &map.failures {
			eprintln!("{}: {}: {}", idl_path.display(), failure.unit, failure.error);
		}
		failed += map.failures.len();
	}

	Ok(failed)
}

fn build_config(args: &Args) -> Result<RenderConfig, RenderError> {
	let mut config = RenderConfig::default();
	if let Some(path) = &args.config {
		config = config.with_options(RenderOptions::from_file(path)?);
	}
	if let Some(library_name) = &args.library_name {
		config.library_name.clone_from(library_name);
	}
	if args.no_format {
		config.format_code = false;
	}
	if args.sequential {
		config.parallel = false;
	}
	Ok(config)
}

fn collect_idl_paths(args: &Args) -> Result<Vec<PathBuf>, RenderError> {
	let mut idl_paths = args.idls.clone();

	if let Some(idl_dir) = &args.idl_dir {
		let entries = std::fs::read_dir(idl_dir).map_err(|source| {
			RenderError::ReadFile {
				path: idl_dir.clone(),
				source,
			}
		})?;

		for entry in entries {
			let entry = entry.map_err(|source| {
				RenderError::ReadFile {
					path: idl_dir.clone(),
					source,
				}
			})?;
			let path = entry.path();
			let is_json = path
				.extension()
				.and_then(|ext| ext.to_str())
				.is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
			if is_json {
				idl_paths.push(path);
			}
		}
	}

	idl_paths.sort();
	idl_paths.dedup();

	if idl_paths.is_empty() {
		return Err(RenderError::UnsupportedValue {
			context: "cli arguments".to_string(),
			kind: "args",
			reason: "provide at least one --idl or --idl-dir".to_string(),
		});
	}

	Ok(idl_paths)
}

fn file_stem(path: &Path) -> Result<String, RenderError> {
	let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
		return Err(RenderError::UnsupportedValue {
			context: format!("path `{}`", path.display()),
			kind: "path",
			reason: "expected a UTF-8 file stem".to_string(),
		});
	};
	Ok(stem.to_string())
}
