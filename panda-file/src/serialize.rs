//! A small reflection-free binary (de)serializer, used to persist compiler
//! and linker side-tables that don't belong in the binary file format
//! itself (symbol caches, incremental build manifests). Grounded on the
//! buffer (de)serializer, with struct reflection replaced by the
//! `encode_struct!` / `decode_struct!` declarative macros below - Rust has
//! no portable equivalent of aggregate-to-tuple reflection, so the macros
//! spell out field order explicitly instead.

use std::collections::HashMap;
use std::hash::Hash;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializeError {
	#[error("buffer is too small to deserialize a value of the expected size")]
	UnexpectedEof,
	#[error("trailing {0} byte(s) left over after deserializing")]
	TrailingData(usize),
	#[error("{0}")]
	Custom(String),
}

pub trait Encode {
	fn encode(&self, buffer: &mut Vec<u8>);
}

pub trait Decode: Sized {
	/// Returns the decoded value and the number of bytes consumed from `data`.
	fn decode(data: &[u8]) -> Result<(Self, usize), SerializeError>;
}

macro_rules! impl_pod_codec {
	($($ty:ty),*) => {$(
		impl Encode for $ty {
			fn encode(&self, buffer: &mut Vec<u8>) {
				buffer.extend_from_slice(&self.to_le_bytes());
			}
		}

		impl Decode for $ty {
			fn decode(data: &[u8]) -> Result<(Self, usize), SerializeError> {
				const SIZE: usize = std::mem::size_of::<$ty>();
				if data.len() < SIZE {
					return Err(SerializeError::UnexpectedEof);
				}
				let mut bytes = [0u8; SIZE];
				bytes.copy_from_slice(&data[..SIZE]);
				Ok((<$ty>::from_le_bytes(bytes), SIZE))
			}
		}
	)*};
}

impl_pod_codec!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Encode for bool {
	fn encode(&self, buffer: &mut Vec<u8>) {
		buffer.push(*self as u8);
	}
}

impl Decode for bool {
	fn decode(data: &[u8]) -> Result<(Self, usize), SerializeError> {
		let (byte, n) = u8::decode(data)?;
		Ok((byte != 0, n))
	}
}

impl Encode for String {
	fn encode(&self, buffer: &mut Vec<u8>) {
		(self.len() as u32).encode(buffer);
		buffer.extend_from_slice(self.as_bytes());
	}
}

impl Decode for String {
	fn decode(data: &[u8]) -> Result<(Self, usize), SerializeError> {
		let (len, mut pos) = u32::decode(data)?;
		let len = len as usize;
		if data.len() < pos + len {
			return Err(SerializeError::UnexpectedEof);
		}
		let str = std::str::from_utf8(&data[pos..pos + len]).map_err(|e| SerializeError::Custom(e.to_string()))?.to_owned();
		pos += len;
		Ok((str, pos))
	}
}

impl<T: Encode> Encode for Vec<T> {
	fn encode(&self, buffer: &mut Vec<u8>) {
		(self.len() as u32).encode(buffer);
		for item in self {
			item.encode(buffer);
		}
	}
}

impl<T: Decode> Decode for Vec<T> {
	fn decode(data: &[u8]) -> Result<(Self, usize), SerializeError> {
		let (count, mut pos) = u32::decode(data)?;
		let mut result = Vec::with_capacity(count as usize);
		for _ in 0..count {
			let (item, n) = T::decode(&data[pos..])?;
			pos += n;
			result.push(item);
		}
		Ok((result, pos))
	}
}

impl<K: Encode, V: Encode> Encode for HashMap<K, V> {
	fn encode(&self, buffer: &mut Vec<u8>) {
		(self.len() as u32).encode(buffer);
		for (key, value) in self {
			key.encode(buffer);
			value.encode(buffer);
		}
	}
}

impl<K: Decode + Eq + Hash, V: Decode> Decode for HashMap<K, V> {
	fn decode(data: &[u8]) -> Result<(Self, usize), SerializeError> {
		let (count, mut pos) = u32::decode(data)?;
		let mut result = HashMap::with_capacity(count as usize);
		for _ in 0..count {
			let (key, n) = K::decode(&data[pos..])?;
			pos += n;
			let (value, n) = V::decode(&data[pos..])?;
			pos += n;
			result.insert(key, value);
		}
		Ok((result, pos))
	}
}

/// Encodes a top-level value into an owned buffer.
pub fn encode_value<T: Encode>(value: &T) -> Vec<u8> {
	let mut buffer = Vec::new();
	value.encode(&mut buffer);
	buffer
}

/// Decodes a top-level value, requiring the whole buffer to be consumed.
pub fn decode_value<T: Decode>(data: &[u8]) -> Result<T, SerializeError> {
	let (value, consumed) = T::decode(data)?;
	if consumed != data.len() {
		return Err(SerializeError::TrailingData(data.len() - consumed));
	}
	Ok(value)
}

/// Implements [`Encode`] for a struct by encoding its fields in declaration
/// order. Pair with [`decode_struct`] for the matching [`Decode`] impl.
macro_rules! encode_struct {
	($ty:ty { $($field:ident),* $(,)? }) => {
		impl $crate::serialize::Encode for $ty {
			fn encode(&self, buffer: &mut Vec<u8>) {
				$($crate::serialize::Encode::encode(&self.$field, buffer);)*
			}
		}
	};
}

/// Implements [`Decode`] for a struct by decoding its fields in declaration
/// order and reassembling them via the struct literal. Field order must
/// match the corresponding [`encode_struct`] invocation exactly.
macro_rules! decode_struct {
	($ty:ty { $($field:ident: $field_ty:ty),* $(,)? }) => {
		impl $crate::serialize::Decode for $ty {
			fn decode(data: &[u8]) -> Result<(Self, usize), $crate::serialize::SerializeError> {
				let mut pos = 0usize;
				$(
					let ($field, consumed) = <$field_ty as $crate::serialize::Decode>::decode(&data[pos..])?;
					pos += consumed;
				)*
				Ok((Self { $($field),* }, pos))
			}
		}
	};
}

pub(crate) use decode_struct;
pub(crate) use encode_struct;

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, PartialEq)]
	struct Point {
		x: i32,
		y: i32,
	}

	encode_struct!(Point { x, y });
	decode_struct!(Point { x: i32, y: i32 });

	#[test]
	fn pod_round_trips() {
		let buf = encode_value(&42u32);
		assert_eq!(decode_value::<u32>(&buf).unwrap(), 42);
	}

	#[test]
	fn string_round_trips() {
		let buf = encode_value(&"hello".to_string());
		assert_eq!(decode_value::<String>(&buf).unwrap(), "hello");
	}

	#[test]
	fn vec_round_trips() {
		let buf = encode_value(&vec![1u32, 2, 3]);
		assert_eq!(decode_value::<Vec<u32>>(&buf).unwrap(), vec![1, 2, 3]);
	}

	#[test]
	fn hash_map_round_trips() {
		let mut map = HashMap::new();
		map.insert("a".to_string(), 1u32);
		map.insert("b".to_string(), 2u32);
		let buf = encode_value(&map);
		assert_eq!(decode_value::<HashMap<String, u32>>(&buf).unwrap(), map);
	}

	#[test]
	fn struct_macros_round_trip_in_field_order() {
		let point = Point { x: 10, y: -5 };
		let buf = encode_value(&point);
		assert_eq!(decode_value::<Point>(&buf).unwrap(), point);
	}

	#[test]
	fn trailing_data_is_an_error() {
		let mut buf = encode_value(&1u32);
		buf.push(0xff);
		assert!(decode_value::<u32>(&buf).is_err());
	}
}
