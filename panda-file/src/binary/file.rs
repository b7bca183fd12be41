use std::io::Cursor;
use std::path::Path;

use crate::binary::entity::EntityId;
use crate::binary::header::{Header, OpenError};

/// An immutable, mapped-or-read-once binary file: header, sorted class
/// index, and the raw bytes everything else is a lazy view over.
#[derive(Debug)]
pub struct PandaFile<B> {
	bytes: B,
	header: Header,
}

enum Bytes {
	Owned(Vec<u8>),
	#[cfg(feature = "memmap2")]
	Mapped(memmap2::Mmap),
}

impl AsRef<[u8]> for Bytes {
	fn as_ref(&self) -> &[u8] {
		match self {
			Bytes::Owned(v) => v.as_slice(),
			#[cfg(feature = "memmap2")]
			Bytes::Mapped(m) => m.as_ref(),
		}
	}
}

impl PandaFile<Bytes> {
	#[cfg(feature = "memmap2")]
	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
	pub fn open_path(path: impl AsRef<Path>) -> Result<Self, OpenError> {
		let file = std::fs::File::open(path)?;
		let mapped = unsafe { memmap2::Mmap::map(&file)? };
		Self::open_with(Bytes::Mapped(mapped))
	}

	#[cfg(not(feature = "memmap2"))]
	pub fn open_path(path: impl AsRef<Path>) -> Result<Self, OpenError> {
		let bytes = std::fs::read(path)?;
		Self::open_with(Bytes::Owned(bytes))
	}

	#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
	pub fn open_bytes(bytes: Vec<u8>) -> Result<Self, OpenError> {
		Self::open_with(Bytes::Owned(bytes))
	}

	fn open_with(bytes: Bytes) -> Result<Self, OpenError> {
		let data = bytes.as_ref();
		let mut cursor = Cursor::new(data);
		let header = Header::read(&mut cursor, data.len())?;
		Ok(Self { bytes, header })
	}
}

impl<B: AsRef<[u8]>> PandaFile<B> {
	pub fn header(&self) -> &Header {
		&self.header
	}

	pub fn data(&self) -> &[u8] {
		self.bytes.as_ref()
	}

	/// The "foreign" region: declarations referencing entities defined
	/// outside this file (e.g. in a bootstrap panda file).
	pub fn foreign_region(&self) -> &[u8] {
		let off = self.header.foreign_off as usize;
		let size = self.header.foreign_size as usize;
		&self.data()[off..off + size]
	}

	/// The sorted class index: one [`EntityId`] per class, ordered
	/// ascending by descriptor bytes.
	pub fn class_index(&self) -> Result<Vec<EntityId>, OpenError> {
		let off = self.header.class_idx_off as usize;
		let count = self.header.num_classes as usize;
		let byte_len = count * std::mem::size_of::<u32>();
		let data = self.data();
		if off + byte_len > data.len() {
			return Err(OpenError::BadClassIndexEntry(count));
		}
		Ok(data[off..off + byte_len].chunks_exact(4).map(|c| EntityId(u32::from_le_bytes(c.try_into().unwrap()))).collect())
	}

	/// Binary search of the class index by descriptor bytes; `None` if
	/// absent. Descriptors must already be sorted ascending on disk.
	pub fn class_id_for(&self, descriptor: &[u8]) -> Result<Option<EntityId>, OpenError> {
		let index = self.class_index()?;
		let data = self.data();
		let found = index.binary_search_by(|id| {
			let bytes = read_cstr(data, id.offset());
			bytes.cmp(descriptor)
		});
		Ok(found.ok().map(|i| index[i]))
	}

	pub fn entity_data(&self, id: EntityId) -> &[u8] {
		&self.data()[id.offset()..]
	}
}

fn read_cstr(data: &[u8], offset: usize) -> &[u8] {
	let end = data[offset..].iter().position(|&b| b == 0).map(|p| offset + p).unwrap_or(data.len());
	&data[offset..end]
}

#[cfg(test)]
mod tests {
	use super::*;

	fn build_file(class_descriptors: &[&[u8]]) -> Vec<u8> {
		let mut class_blobs = Vec::new();
		let mut class_offsets = Vec::new();
		let header_size = 4 + 4 + 4 * 6;
		let mut running = header_size + class_descriptors.len() * 4;
		for desc in class_descriptors {
			class_offsets.push(running as u32);
			class_blobs.extend_from_slice(desc);
			class_blobs.push(0);
			running += desc.len() + 1;
		}

		let mut bytes = Vec::new();
		bytes.extend_from_slice(&crate::binary::header::MAGIC);
		bytes.extend_from_slice(&[0, 0, 0, 1]);
		bytes.extend_from_slice(&0u32.to_le_bytes()); // checksum
		bytes.extend_from_slice(&(running as u32).to_le_bytes()); // file_size
		bytes.extend_from_slice(&0u32.to_le_bytes()); // foreign_off
		bytes.extend_from_slice(&0u32.to_le_bytes()); // foreign_size
		bytes.extend_from_slice(&(class_descriptors.len() as u32).to_le_bytes());
		bytes.extend_from_slice(&(header_size as u32).to_le_bytes()); // class_idx_off
		bytes.extend_from_slice(&0u32.to_le_bytes());
		bytes.extend_from_slice(&0u32.to_le_bytes());
		for off in class_offsets {
			bytes.extend_from_slice(&off.to_le_bytes());
		}
		bytes.extend_from_slice(&class_blobs);
		bytes
	}

	#[test]
	fn opens_a_well_formed_file() {
		let bytes = build_file(&[b"LA;", b"LB;"]);
		let file = PandaFile::open_bytes(bytes).unwrap();
		assert_eq!(file.header().num_classes, 2);
		assert_eq!(file.class_index().unwrap().len(), 2);
	}

	#[test]
	fn class_id_for_finds_existing_descriptor() {
		let bytes = build_file(&[b"LA;", b"LB;", b"LC;"]);
		let file = PandaFile::open_bytes(bytes).unwrap();
		let id = file.class_id_for(b"LB;").unwrap();
		assert!(id.is_some());
	}

	#[test]
	fn class_id_for_reports_none_for_absent_descriptor() {
		let bytes = build_file(&[b"LA;", b"LC;"]);
		let file = PandaFile::open_bytes(bytes).unwrap();
		assert!(file.class_id_for(b"LB;").unwrap().is_none());
	}
}
