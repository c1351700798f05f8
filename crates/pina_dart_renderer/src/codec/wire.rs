//! Reference Borsh encoder and decoder driven by [`Codec`] descriptors.
//!
//! This mirrors what the generated Dart code does at runtime and is used to
//! serialize PDA argument seeds and to pin down layouts in tests.

use borsh::BorshDeserialize;
use borsh::BorshSerialize;

use super::Codec;
use super::FieldCodec;
use super::Length;
use super::VariantFields;
use crate::error::RenderError;
use crate::error::Result;
use crate::nodes::NumberFormat;

/// A dynamically typed value that can be written with any [`Codec`].
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
	Unsigned(u128),
	Signed(i128),
	Float(f64),
	Bool(bool),
	String(String),
	Bytes(Vec<u8>),
	PublicKey([u8; 32]),
	Option(Option<Box<WireValue>>),
	List(Vec<WireValue>),
	Map(Vec<(WireValue, WireValue)>),
	Tuple(Vec<WireValue>),
	Struct(Vec<(String, WireValue)>),
	Enum { index: usize, fields: Vec<WireValue> },
}

impl WireValue {
	fn unsigned(&self) -> Option<u128> {
		match self {
			Self::Unsigned(value) => Some(*value),
			Self::Signed(value) => u128::try_from(*value).ok(),
			_ => None,
		}
	}

	fn signed(&self) -> Option<i128> {
		match self {
			Self::Unsigned(value) => i128::try_from(*value).ok(),
			Self::Signed(value) => Some(*value),
			_ => None,
		}
	}

	fn describe(&self) -> &'static str {
		match self {
			Self::Unsigned(_) | Self::Signed(_) => "integer",
			Self::Float(_) => "float",
			Self::Bool(_) => "bool",
			Self::String(_) => "string",
			Self::Bytes(_) => "bytes",
			Self::PublicKey(_) => "public key",
			Self::Option(_) => "option",
			Self::List(_) => "list",
			Self::Map(_) => "map",
			Self::Tuple(_) => "tuple",
			Self::Struct(_) => "struct",
			Self::Enum { .. } => "enum",
		}
	}
}

fn mismatch(codec: &Codec, value: &WireValue) -> RenderError {
	RenderError::codec(
		format!("{:?}", codec.kind()),
		format!("cannot encode a {} with this codec", value.describe()),
	)
}

fn io_error(context: &str, error: &std::io::Error) -> RenderError {
	RenderError::codec(context, error.to_string())
}

macro_rules! write_integer {
	($ty:ty, $value:expr, $out:expr) => {{
		let raw = $value;
		let value = <$ty>::try_from(raw).map_err(|_| {
			RenderError::codec(
				stringify!($ty),
				format!("`{raw}` is out of range"),
			)
		})?;
		BorshSerialize::serialize(&value, $out).map_err(|e| io_error(stringify!($ty), &e))
	}};
}

macro_rules! read_integer {
	($ty:ty, $variant:ident, $input:expr) => {{
		<$ty>::deserialize($input)
			.map(|value| WireValue::$variant(value.into()))
			.map_err(|e| io_error(stringify!($ty), &e))
	}};
}

fn write_number(format: NumberFormat, value: &WireValue, out: &mut Vec<u8>) -> Result<()> {
	let unsigned = || {
		value.unsigned().ok_or_else(|| {
			RenderError::codec(format.as_str(), format!("expected an unsigned integer, got {value:?}"))
		})
	};
	let signed = || {
		value.signed().ok_or_else(|| {
			RenderError::codec(format.as_str(), format!("expected an integer, got {value:?}"))
		})
	};

	match format {
		NumberFormat::U8 => write_integer!(u8, unsigned()?, out),
		NumberFormat::U16 => write_integer!(u16, unsigned()?, out),
		NumberFormat::U32 => write_integer!(u32, unsigned()?, out),
		NumberFormat::U64 => write_integer!(u64, unsigned()?, out),
		NumberFormat::U128 => write_integer!(u128, unsigned()?, out),
		NumberFormat::I8 => write_integer!(i8, signed()?, out),
		NumberFormat::I16 => write_integer!(i16, signed()?, out),
		NumberFormat::I32 => write_integer!(i32, signed()?, out),
		NumberFormat::I64 => write_integer!(i64, signed()?, out),
		NumberFormat::I128 => write_integer!(i128, signed()?, out),
		NumberFormat::F32 | NumberFormat::F64 => {
			let WireValue::Float(float) = value else {
				return Err(RenderError::codec(format.as_str(), "expected a float"));
			};
			let result = if format == NumberFormat::F32 {
				BorshSerialize::serialize(&(*float as f32), out)
			} else {
				BorshSerialize::serialize(float, out)
			};
			result.map_err(|e| io_error(format.as_str(), &e))
		}
		NumberFormat::ShortU16 => {
			let mut remaining = u16::try_from(unsigned()?)
				.map_err(|_| RenderError::codec("shortU16", "value does not fit in 16 bits"))?;
			loop {
				let byte = (remaining & 0x7f) as u8;
				remaining >>= 7;
				if remaining == 0 {
					out.push(byte);
					return Ok(());
				}
				out.push(byte | 0x80);
			}
		}
	}
}

fn read_number(format: NumberFormat, input: &mut &[u8]) -> Result<WireValue> {
	match format {
		NumberFormat::U8 => read_integer!(u8, Unsigned, input),
		NumberFormat::U16 => read_integer!(u16, Unsigned, input),
		NumberFormat::U32 => read_integer!(u32, Unsigned, input),
		NumberFormat::U64 => read_integer!(u64, Unsigned, input),
		NumberFormat::U128 => read_integer!(u128, Unsigned, input),
		NumberFormat::I8 => read_integer!(i8, Signed, input),
		NumberFormat::I16 => read_integer!(i16, Signed, input),
		NumberFormat::I32 => read_integer!(i32, Signed, input),
		NumberFormat::I64 => read_integer!(i64, Signed, input),
		NumberFormat::I128 => read_integer!(i128, Signed, input),
		NumberFormat::F32 => {
			f32::deserialize(input)
				.map(|value| WireValue::Float(f64::from(value)))
				.map_err(|e| io_error("f32", &e))
		}
		NumberFormat::F64 => {
			f64::deserialize(input)
				.map(WireValue::Float)
				.map_err(|e| io_error("f64", &e))
		}
		NumberFormat::ShortU16 => {
			let mut value = 0_u32;
			for position in 0..3 {
				let byte = take(input, 1, "shortU16")?[0];
				value |= u32::from(byte & 0x7f) << (7 * position);
				if byte & 0x80 == 0 {
					return Ok(WireValue::Unsigned(value.into()));
				}
			}
			Err(RenderError::codec("shortU16", "more than 3 bytes"))
		}
	}
}

fn take<'a>(input: &mut &'a [u8], len: usize, context: &str) -> Result<&'a [u8]> {
	if input.len() < len {
		return Err(RenderError::codec(
			context,
			format!("expected {len} bytes, {} left", input.len()),
		));
	}
	let (head, tail) = input.split_at(len);
	*input = tail;
	Ok(head)
}

fn write_length(length: Length, actual: usize, out: &mut Vec<u8>, context: &str) -> Result<()> {
	match length {
		Length::Prefixed(prefix) => write_number(prefix, &WireValue::Unsigned(actual as u128), out),
		Length::Fixed(expected) if expected == actual => Ok(()),
		Length::Fixed(expected) => {
			Err(RenderError::codec(
				context,
				format!("expected exactly {expected} items, got {actual}"),
			))
		}
		Length::Remainder => Ok(()),
	}
}

/// Reads a count. `None` means "until the input is exhausted".
fn read_length(length: Length, input: &mut &[u8]) -> Result<Option<usize>> {
	match length {
		Length::Prefixed(prefix) => {
			let count = read_number(prefix, input)?
				.unsigned()
				.and_then(|count| usize::try_from(count).ok())
				.ok_or_else(|| RenderError::codec("length prefix", "length does not fit in usize"))?;
			Ok(Some(count))
		}
		Length::Fixed(count) => Ok(Some(count)),
		Length::Remainder => Ok(None),
	}
}

fn read_items(
	length: Length,
	input: &mut &[u8],
	mut read: impl FnMut(&mut &[u8]) -> Result<WireValue>,
) -> Result<Vec<WireValue>> {
	match read_length(length, input)? {
		Some(count) => (0..count).map(|_| read(input)).collect(),
		None => {
			let mut items = Vec::new();
			while !input.is_empty() {
				items.push(read(input)?);
			}
			Ok(items)
		}
	}
}

fn write_fields(fields: &[FieldCodec], values: &[(String, WireValue)], out: &mut Vec<u8>) -> Result<()> {
	for field in fields {
		let Some((_, value)) = values.iter().find(|(name, _)| *name == field.name) else {
			return Err(RenderError::codec(
				field.name.as_str(),
				"missing struct field value",
			));
		};
		field.codec.encode(value, out)?;
	}
	Ok(())
}

fn read_fields(fields: &[FieldCodec], input: &mut &[u8]) -> Result<Vec<(String, WireValue)>> {
	fields
		.iter()
		.map(|field| Ok((field.name.clone(), field.codec.decode(input)?)))
		.collect()
}

impl Codec {
	/// Appends the Borsh encoding of `value` to `out`.
	pub fn encode(&self, value: &WireValue, out: &mut Vec<u8>) -> Result<()> {
		match (self, value) {
			(Self::Number(format), _) => write_number(*format, value, out),
			(Self::Bool(format), WireValue::Bool(flag)) => {
				write_number(*format, &WireValue::Unsigned(u128::from(*flag)), out)
			}
			(Self::String(length), WireValue::String(string)) => {
				write_bytes(*length, string.as_bytes(), out, "string")
			}
			(Self::Bytes(length), WireValue::Bytes(bytes)) => write_bytes(*length, bytes, out, "bytes"),
			(Self::PublicKey, WireValue::PublicKey(address)) => {
				out.extend_from_slice(address);
				Ok(())
			}
			(
				Self::Option {
					item,
					prefix,
					fixed,
				},
				WireValue::Option(inner),
			) => {
				match inner {
					Some(inner) => {
						write_number(*prefix, &WireValue::Unsigned(1), out)?;
						item.encode(inner, out)
					}
					None => {
						write_number(*prefix, &WireValue::Unsigned(0), out)?;
						if *fixed {
							let padding = item.fixed_size().ok_or_else(|| {
								RenderError::codec("fixed option", "item has no fixed size")
							})?;
							out.resize(out.len() + padding, 0);
						}
						Ok(())
					}
				}
			}
			(Self::List { item, count } | Self::Set { item, count }, WireValue::List(items)) => {
				write_length(*count, items.len(), out, "list")?;
				items.iter().try_for_each(|value| item.encode(value, out))
			}
			(Self::TypedArray { item, count }, WireValue::List(items)) => {
				write_length(Length::Fixed(*count), items.len(), out, "typed array")?;
				items.iter().try_for_each(|value| item.encode(value, out))
			}
			(Self::Map { key, value, count }, WireValue::Map(entries)) => {
				write_length(*count, entries.len(), out, "map")?;
				entries.iter().try_for_each(|(k, v)| {
					key.encode(k, out)?;
					value.encode(v, out)
				})
			}
			(Self::Tuple(items), WireValue::Tuple(values)) if items.len() == values.len() => {
				items
					.iter()
					.zip(values)
					.try_for_each(|(item, value)| item.encode(value, out))
			}
			(Self::Struct(codec), WireValue::Struct(values)) => write_fields(&codec.fields, values, out),
			(Self::Enum(codec), WireValue::Enum { index, fields }) => {
				let Some(variant) = codec.variants.get(*index) else {
					return Err(RenderError::codec(
						codec.name.as_str(),
						format!("no variant at index {index}"),
					));
				};
				let arity = match &variant.fields {
					VariantFields::Empty => 0,
					VariantFields::Tuple(items) => items.len(),
					VariantFields::Struct(codecs) => codecs.len(),
				};
				if fields.len() != arity {
					return Err(RenderError::codec(
						codec.name.as_str(),
						format!(
							"variant {index} takes {arity} values, got {}",
							fields.len()
						),
					));
				}
				write_number(codec.size, &WireValue::Unsigned(*index as u128), out)?;
				match &variant.fields {
					VariantFields::Empty => Ok(()),
					VariantFields::Tuple(items) => {
						items
							.iter()
							.zip(fields)
							.try_for_each(|(item, value)| item.encode(value, out))
					}
					VariantFields::Struct(codecs) => {
						let named = codecs
							.iter()
							.zip(fields)
							.map(|(codec, value)| (codec.name.clone(), value.clone()))
							.collect::<Vec<_>>();
						write_fields(codecs, &named, out)
					}
				}
			}
			(Self::SizePrefixed { inner, prefix }, _) => {
				let mut buffer = Vec::new();
				inner.encode(value, &mut buffer)?;
				write_number(*prefix, &WireValue::Unsigned(buffer.len() as u128), out)?;
				out.extend_from_slice(&buffer);
				Ok(())
			}
			(Self::FixedSize { inner, size }, _) => {
				let mut buffer = Vec::new();
				inner.encode(value, &mut buffer)?;
				if buffer.len() != *size {
					return Err(RenderError::codec(
						"fixed size",
						format!("expected exactly {size} bytes, got {}", buffer.len()),
					));
				}
				out.extend_from_slice(&buffer);
				Ok(())
			}
			(Self::Defined(defined), _) => {
				Err(RenderError::codec(
					defined.name.as_str(),
					"defined type references must be resolved before encoding",
				))
			}
			(Self::Opaque { kind }, _) => {
				Err(RenderError::codec(
					kind.as_str(),
					"opaque fallbacks have no binary layout",
				))
			}
			_ => Err(mismatch(self, value)),
		}
	}

	/// Convenience wrapper around [`Codec::encode`].
	pub fn encode_to_vec(&self, value: &WireValue) -> Result<Vec<u8>> {
		let mut out = Vec::new();
		self.encode(value, &mut out)?;
		Ok(out)
	}

	/// Reads one value from the front of `input`, advancing it.
	pub fn decode(&self, input: &mut &[u8]) -> Result<WireValue> {
		match self {
			Self::Number(format) => read_number(*format, input),
			Self::Bool(format) => {
				match read_number(*format, input)?.unsigned() {
					Some(0) => Ok(WireValue::Bool(false)),
					Some(1) => Ok(WireValue::Bool(true)),
					other => Err(RenderError::codec("bool", format!("invalid flag {other:?}"))),
				}
			}
			Self::String(length) => {
				let bytes = read_bytes(*length, input, "string")?;
				String::from_utf8(bytes)
					.map(WireValue::String)
					.map_err(|e| RenderError::codec("string", e.to_string()))
			}
			Self::Bytes(length) => read_bytes(*length, input, "bytes").map(WireValue::Bytes),
			Self::PublicKey => {
				let mut address = [0_u8; 32];
				address.copy_from_slice(take(input, 32, "public key")?);
				Ok(WireValue::PublicKey(address))
			}
			Self::Option {
				item,
				prefix,
				fixed,
			} => {
				let present = read_number(*prefix, input)?.unsigned();
				match present {
					Some(0) => {
						if *fixed {
							let padding = item.fixed_size().ok_or_else(|| {
								RenderError::codec("fixed option", "item has no fixed size")
							})?;
							take(input, padding, "fixed option")?;
						}
						Ok(WireValue::Option(None))
					}
					Some(1) => Ok(WireValue::Option(Some(Box::new(item.decode(input)?)))),
					other => {
						Err(RenderError::codec(
							"option",
							format!("invalid presence flag {other:?}"),
						))
					}
				}
			}
			Self::List { item, count } | Self::Set { item, count } => {
				read_items(*count, input, |input| item.decode(input)).map(WireValue::List)
			}
			Self::TypedArray { item, count } => {
				read_items(Length::Fixed(*count), input, |input| item.decode(input)).map(WireValue::List)
			}
			Self::Map { key, value, count } => {
				let mut entries = Vec::new();
				let count = read_length(*count, input)?;
				while count.map_or(!input.is_empty(), |count| entries.len() < count) {
					let k = key.decode(input)?;
					let v = value.decode(input)?;
					entries.push((k, v));
				}
				Ok(WireValue::Map(entries))
			}
			Self::Tuple(items) => {
				items
					.iter()
					.map(|item| item.decode(input))
					.collect::<Result<Vec<_>>>()
					.map(WireValue::Tuple)
			}
			Self::Struct(codec) => read_fields(&codec.fields, input).map(WireValue::Struct),
			Self::Enum(codec) => {
				let index = read_number(codec.size, input)?
					.unsigned()
					.and_then(|index| usize::try_from(index).ok())
					.ok_or_else(|| RenderError::codec(codec.name.as_str(), "invalid variant index"))?;
				let Some(variant) = codec.variants.get(index) else {
					return Err(RenderError::codec(
						codec.name.as_str(),
						format!("no variant at index {index}"),
					));
				};
				let fields = match &variant.fields {
					VariantFields::Empty => Vec::new(),
					VariantFields::Tuple(items) => {
						items
							.iter()
							.map(|item| item.decode(input))
							.collect::<Result<Vec<_>>>()?
					}
					VariantFields::Struct(fields) => {
						read_fields(fields, input)?
							.into_iter()
							.map(|(_, value)| value)
							.collect()
					}
				};
				Ok(WireValue::Enum { index, fields })
			}
			Self::SizePrefixed { inner, prefix } => {
				let len = read_number(*prefix, input)?
					.unsigned()
					.and_then(|len| usize::try_from(len).ok())
					.ok_or_else(|| RenderError::codec("size prefix", "invalid size"))?;
				let mut slice = take(input, len, "size prefixed")?;
				inner.decode(&mut slice)
			}
			Self::FixedSize { inner, size } => {
				let mut slice = take(input, *size, "fixed size")?;
				inner.decode(&mut slice)
			}
			Self::Defined(defined) => {
				Err(RenderError::codec(
					defined.name.as_str(),
					"defined type references must be resolved before decoding",
				))
			}
			Self::Opaque { kind } => {
				Err(RenderError::codec(
					kind.as_str(),
					"opaque fallbacks have no binary layout",
				))
			}
		}
	}
}

fn write_bytes(length: Length, bytes: &[u8], out: &mut Vec<u8>, context: &str) -> Result<()> {
	match length {
		Length::Fixed(size) => {
			if bytes.len() != size {
				return Err(RenderError::codec(
					context,
					format!("expected exactly {size} bytes, got {}", bytes.len()),
				));
			}
			out.extend_from_slice(bytes);
			Ok(())
		}
		_ => {
			write_length(length, bytes.len(), out, context)?;
			out.extend_from_slice(bytes);
			Ok(())
		}
	}
}

fn read_bytes(length: Length, input: &mut &[u8], context: &str) -> Result<Vec<u8>> {
	let len = read_length(length, input)?.unwrap_or(input.len());
	Ok(take(input, len, context)?.to_vec())
}
