use std::io::Cursor;

use thiserror::Error;

use crate::utilities::FromByteStream;

pub const MAGIC: [u8; 4] = *b"PAND";

#[derive(Debug, Error)]
pub enum OpenError {
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[cfg(feature = "memmap2")]
	#[error(transparent)]
	MemMap(#[from] memmap2::Error),
	#[error("bad magic: expected {MAGIC:?}")]
	BadMagic,
	#[error("unsupported version {0:?}, expected within [{1:?}, {2:?}]")]
	UnsupportedVersion([u8; 4], [u8; 4], [u8; 4]),
	#[error("file is truncated: header declares {declared} byte(s), buffer has {actual}")]
	Truncated { declared: usize, actual: usize },
	#[error("class index entry at position {0} is out of bounds")]
	BadClassIndexEntry(usize),
	#[error("tag {0:?} is not valid inside a tagged optional section")]
	UnexpectedTag(crate::binary::entity::EntityTag),
}

/// The minimum and maximum semantic versions this reader accepts, compared
/// lexicographically byte by byte.
pub const MIN_VERSION: [u8; 4] = [0, 0, 0, 1];
pub const MAX_VERSION: [u8; 4] = [0, 0, 255, 255];

/// The fixed-layout file header. Reserved fields are kept around (instead of
/// skipped with a seek) so a header can be round-tripped by a future writer.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Header {
	pub magic: [u8; 4],
	pub version: [u8; 4],
	pub checksum: u32,
	pub file_size: u32,
	pub foreign_off: u32,
	pub foreign_size: u32,
	pub num_classes: u32,
	pub class_idx_off: u32,
	pub reserved: [u32; 2],
}

impl Header {
	pub(crate) fn read(cursor: &mut Cursor<&[u8]>, buffer_len: usize) -> Result<Self, OpenError> {
		let header = Self {
			magic: <[u8; 4]>::read(cursor, &())?,
			version: <[u8; 4]>::read(cursor, &())?,
			checksum: u32::read(cursor, &())?,
			file_size: u32::read(cursor, &())?,
			foreign_off: u32::read(cursor, &())?,
			foreign_size: u32::read(cursor, &())?,
			num_classes: u32::read(cursor, &())?,
			class_idx_off: u32::read(cursor, &())?,
			reserved: [u32::read(cursor, &())?, u32::read(cursor, &())?],
		};

		if header.magic != MAGIC {
			return Err(OpenError::BadMagic);
		}
		if header.version < MIN_VERSION || header.version > MAX_VERSION {
			return Err(OpenError::UnsupportedVersion(header.version, MIN_VERSION, MAX_VERSION));
		}
		if header.file_size as usize > buffer_len {
			return Err(OpenError::Truncated { declared: header.file_size as usize, actual: buffer_len });
		}

		Ok(header)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn encode(header_fields: &[u32], version: [u8; 4]) -> Vec<u8> {
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&MAGIC);
		bytes.extend_from_slice(&version);
		for field in header_fields {
			bytes.extend_from_slice(&field.to_le_bytes());
		}
		bytes
	}

	#[test]
	fn reads_a_well_formed_header() {
		let bytes = encode(&[0, 32, 0, 0, 0, 32, 0, 0], [0, 0, 0, 1]);
		let mut cursor = Cursor::new(bytes.as_slice());
		let header = Header::read(&mut cursor, bytes.len()).unwrap();
		assert_eq!(header.file_size, 32);
		assert_eq!(header.num_classes, 0);
	}

	#[test]
	fn rejects_bad_magic() {
		let mut bytes = encode(&[0, 32, 0, 0, 0, 32, 0, 0], [0, 0, 0, 1]);
		bytes[0] = b'X';
		let mut cursor = Cursor::new(bytes.as_slice());
		assert!(matches!(Header::read(&mut cursor, bytes.len()), Err(OpenError::BadMagic)));
	}

	#[test]
	fn rejects_version_outside_range() {
		let bytes = encode(&[0, 32, 0, 0, 0, 32, 0, 0], [255, 255, 255, 255]);
		let mut cursor = Cursor::new(bytes.as_slice());
		assert!(matches!(Header::read(&mut cursor, bytes.len()), Err(OpenError::UnsupportedVersion(..))));
	}

	#[test]
	fn rejects_truncated_buffer() {
		let bytes = encode(&[0, 9999, 0, 0, 0, 32, 0, 0], [0, 0, 0, 1]);
		let mut cursor = Cursor::new(bytes.as_slice());
		assert!(matches!(Header::read(&mut cursor, bytes.len()), Err(OpenError::Truncated { .. })));
	}
}
