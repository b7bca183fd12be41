//! Field layout: partitions a class's field records into size-class buckets
//! and assigns byte offsets, packing smaller fields into any padding left
//! before the 64-bit/tagged block's alignment.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
	Reference,
	Bits64,
	Tagged,
	Bits32,
	Bits16,
	Bits8,
}

impl SizeClass {
	fn byte_size(self) -> u32 {
		match self {
			SizeClass::Reference => REFERENCE_SIZE,
			SizeClass::Bits64 | SizeClass::Tagged => 8,
			SizeClass::Bits32 => 4,
			SizeClass::Bits16 => 2,
			SizeClass::Bits8 => 1,
		}
	}
}

/// Chosen to match a 64-bit target's pointer width; the component design
/// doesn't pin this down beyond "reference fields come first".
const REFERENCE_SIZE: u32 = 8;

#[derive(Debug, Clone)]
pub struct FieldRecord {
	pub name: String,
	pub size_class: SizeClass,
	pub is_volatile: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldOffset {
	pub offset: u32,
	pub size_class: SizeClass,
}

/// `base_offset` is the static area's start for static fields, or the base
/// class's object size for instance fields.
pub fn layout_fields(fields: &[FieldRecord], base_offset: u32) -> (Vec<(String, FieldOffset)>, u32) {
	let mut refs: Vec<&FieldRecord> = fields.iter().filter(|f| f.size_class == SizeClass::Reference).collect();
	refs.sort_by_key(|f| !f.is_volatile); // volatile first, stable within each group
	let mut wide: Vec<&FieldRecord> = fields.iter().filter(|f| matches!(f.size_class, SizeClass::Bits64 | SizeClass::Tagged)).collect();
	let mut pool32: std::collections::VecDeque<&FieldRecord> = fields.iter().filter(|f| f.size_class == SizeClass::Bits32).collect();
	let mut pool16: std::collections::VecDeque<&FieldRecord> = fields.iter().filter(|f| f.size_class == SizeClass::Bits16).collect();
	let mut pool8: std::collections::VecDeque<&FieldRecord> = fields.iter().filter(|f| f.size_class == SizeClass::Bits8).collect();

	let mut offsets = Vec::with_capacity(fields.len());
	let mut offset = base_offset;

	for field in refs.drain(..) {
		offsets.push((field.name.clone(), FieldOffset { offset, size_class: SizeClass::Reference }));
		offset += REFERENCE_SIZE;
	}

	// Fill the padding before the 8-byte-aligned wide block with whatever
	// smaller fields are available, largest first.
	let mut gap = (8 - offset % 8) % 8;
	while gap >= 4 {
		let Some(field) = pool32.pop_front() else { break };
		offsets.push((field.name.clone(), FieldOffset { offset, size_class: SizeClass::Bits32 }));
		offset += 4;
		gap -= 4;
	}
	while gap >= 2 {
		let Some(field) = pool16.pop_front() else { break };
		offsets.push((field.name.clone(), FieldOffset { offset, size_class: SizeClass::Bits16 }));
		offset += 2;
		gap -= 2;
	}
	while gap >= 1 {
		let Some(field) = pool8.pop_front() else { break };
		offsets.push((field.name.clone(), FieldOffset { offset, size_class: SizeClass::Bits8 }));
		offset += 1;
		gap -= 1;
	}
	offset += gap; // any leftover padding with nothing left to fill it

	for field in wide.drain(..) {
		offsets.push((field.name.clone(), FieldOffset { offset, size_class: field.size_class }));
		offset += 8;
	}

	for field in pool32.drain(..) {
		offsets.push((field.name.clone(), FieldOffset { offset, size_class: SizeClass::Bits32 }));
		offset += 4;
	}
	for field in pool16.drain(..) {
		offsets.push((field.name.clone(), FieldOffset { offset, size_class: SizeClass::Bits16 }));
		offset += 2;
	}
	for field in pool8.drain(..) {
		offsets.push((field.name.clone(), FieldOffset { offset, size_class: SizeClass::Bits8 }));
		offset += 1;
	}

	(offsets, offset)
}
