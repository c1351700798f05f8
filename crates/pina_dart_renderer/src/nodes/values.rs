use base64::Engine;
use serde::Deserialize;
use serde::Serialize;

use super::types::BytesEncoding;
use super::types::TypeNode;
use crate::error::RenderError;
use crate::error::Result;

/// Literal values attached to fields, seeds and discriminators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ValueNode {
	#[serde(rename = "numberValueNode")]
	Number { number: serde_json::Number },
	#[serde(rename = "stringValueNode")]
	String { string: String },
	#[serde(rename = "booleanValueNode")]
	Boolean { boolean: bool },
	#[serde(rename = "bytesValueNode")]
	Bytes(BytesValueNode),
	#[serde(rename = "publicKeyValueNode")]
	PublicKey {
		#[serde(rename = "publicKey")]
		public_key: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		identifier: Option<String>,
	},
	#[serde(rename = "arrayValueNode")]
	Array { items: Vec<ValueNode> },
	#[serde(rename = "tupleValueNode")]
	Tuple { items: Vec<ValueNode> },
	#[serde(rename = "noneValueNode")]
	None,
	#[serde(rename = "someValueNode")]
	Some { value: Box<ValueNode> },
	#[serde(rename = "constantValueNode")]
	Constant {
		r#type: Box<TypeNode>,
		value: Box<ValueNode>,
	},
	#[serde(rename = "programIdValueNode")]
	ProgramId,
	#[serde(other)]
	Unsupported,
}

impl ValueNode {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Number { .. } => "numberValueNode",
			Self::String { .. } => "stringValueNode",
			Self::Boolean { .. } => "booleanValueNode",
			Self::Bytes(_) => "bytesValueNode",
			Self::PublicKey { .. } => "publicKeyValueNode",
			Self::Array { .. } => "arrayValueNode",
			Self::Tuple { .. } => "tupleValueNode",
			Self::None => "noneValueNode",
			Self::Some { .. } => "someValueNode",
			Self::Constant { .. } => "constantValueNode",
			Self::ProgramId => "programIdValueNode",
			Self::Unsupported => "unsupported",
		}
	}

	pub fn number(value: u64) -> Self {
		Self::Number {
			number: value.into(),
		}
	}

	pub fn string(value: impl Into<String>) -> Self {
		Self::String {
			string: value.into(),
		}
	}

	pub fn bytes_base16(data: impl Into<String>) -> Self {
		Self::Bytes(BytesValueNode {
			data: data.into(),
			encoding: BytesEncoding::Base16,
		})
	}

	/// Interprets an `arrayValueNode` of small numbers as raw bytes.
	pub fn as_byte_array(&self, context: &str) -> Result<Option<Vec<u8>>> {
		let Self::Array { items } = self else {
			return Ok(None);
		};

		items
			.iter()
			.map(|item| {
				let Self::Number { number } = item else {
					return Err(RenderError::UnsupportedValue {
						context: context.to_owned(),
						kind: item.kind(),
						reason: "byte arrays may only contain numbers".to_owned(),
					});
				};
				number
					.as_u64()
					.and_then(|value| u8::try_from(value).ok())
					.ok_or_else(|| {
						RenderError::UnsupportedValue {
							context: context.to_owned(),
							kind: "numberValueNode",
							reason: format!("`{number}` is not a byte"),
						}
					})
			})
			.collect::<Result<Vec<_>>>()
			.map(Some)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BytesValueNode {
	pub data: String,
	pub encoding: BytesEncoding,
}

impl BytesValueNode {
	/// Decodes `data` according to its declared encoding.
	pub fn decode(&self, context: &str) -> Result<Vec<u8>> {
		let invalid = |encoding: &'static str, reason: String| {
			RenderError::InvalidBytes {
				context: context.to_owned(),
				encoding,
				reason,
			}
		};

		match self.encoding {
			BytesEncoding::Base16 => {
				hex::decode(&self.data).map_err(|e| invalid("base16", e.to_string()))
			}
			BytesEncoding::Base58 => {
				bs58::decode(&self.data)
					.into_vec()
					.map_err(|e| invalid("base58", e.to_string()))
			}
			BytesEncoding::Base64 => {
				base64::engine::general_purpose::STANDARD
					.decode(&self.data)
					.map_err(|e| invalid("base64", e.to_string()))
			}
			BytesEncoding::Utf8 => Ok(self.data.as_bytes().to_vec()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_every_bytes_encoding() {
		let cases = [
			(BytesEncoding::Base16, "0a0b"),
			(BytesEncoding::Base58, "mL"),
			(BytesEncoding::Base64, "Cgs="),
		];
		for (encoding, data) in cases {
			let node = BytesValueNode {
				data: data.to_owned(),
				encoding,
			};
			let bytes = node
				.decode("test")
				.unwrap_or_else(|e| panic!("failed to decode {encoding:?}: {e}"));
			assert_eq!(bytes, vec![10, 11], "encoding {encoding:?}");
		}
	}

	#[test]
	fn rejects_malformed_hex() {
		let node = BytesValueNode {
			data: "zz".to_owned(),
			encoding: BytesEncoding::Base16,
		};
		assert!(matches!(
			node.decode("seed"),
			Err(RenderError::InvalidBytes {
				encoding: "base16",
				..
			})
		));
	}

	#[test]
	fn byte_arrays_reject_out_of_range_numbers() {
		let value = ValueNode::Array {
			items: vec![ValueNode::number(1), ValueNode::number(300)],
		};
		assert!(value.as_byte_array("discriminator").is_err());
		assert_eq!(
			ValueNode::string("x")
				.as_byte_array("discriminator")
				.unwrap_or_else(|e| panic!("unexpected error: {e}")),
			None
		);
	}
}
