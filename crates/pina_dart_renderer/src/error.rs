use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
	#[error("failed to read `{path}`: {source}")]
	ReadFile {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to write `{path}`: {source}")]
	WriteFile {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to parse IDL `{path}` as Codama root node: {source}")]
	ParseIdl {
		path: PathBuf,
		source: serde_json::Error,
	},
	#[error("failed to parse renderer options `{path}`: {source}")]
	ParseConfig {
		path: PathBuf,
		source: serde_json::Error,
	},
	#[error("unsupported type `{kind}` at `{context}`: {reason}")]
	UnsupportedType {
		context: String,
		kind: &'static str,
		reason: String,
	},
	#[error("unsupported value `{kind}` at `{context}`: {reason}")]
	UnsupportedValue {
		context: String,
		kind: &'static str,
		reason: String,
	},
	#[error("defined type `{name}` referenced at `{context}` is not declared by the program")]
	UnresolvedDefinedType { context: String, name: String },
	#[error("`{context}` was visited outside of any program")]
	MissingProgram { context: String },
	#[error("missing PDA `{pda}` for account `{account}`")]
	MissingPda { account: String, pda: String },
	#[error("invalid {encoding} bytes at `{context}`: {reason}")]
	InvalidBytes {
		context: String,
		encoding: &'static str,
		reason: String,
	},
	#[error("invalid address `{value}` at `{context}`")]
	InvalidAddress { context: String, value: String },
	#[error("missing value for seed `{seed}`")]
	MissingSeedInput { seed: String },
	#[error("seed `{seed}` is {len} bytes, the maximum is 32")]
	SeedTooLong { seed: String, len: usize },
	#[error("{count} seeds were provided, at most 15 fit next to the bump seed")]
	TooManySeeds { count: usize },
	#[error("no viable bump seed for PDA `{pda}`")]
	NoViableBump { pda: String },
	#[error("codec error at `{context}`: {reason}")]
	Codec { context: String, reason: String },
	#[error("failed to run command `{command}`: {source}")]
	CommandExec {
		command: String,
		source: std::io::Error,
	},
	#[error("command `{command}` failed with status {status}")]
	CommandFailed { command: String, status: i32 },
}

impl RenderError {
	pub(crate) fn codec(context: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Codec {
			context: context.into(),
			reason: reason.into(),
		}
	}
}
