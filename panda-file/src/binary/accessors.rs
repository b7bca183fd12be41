//! Lazy per-entity readers. Each accessor owns a cursor into the file's
//! bytes and walks its tagged optional sections only as far as a caller has
//! actually asked for, caching what it has already decoded so repeat calls
//! don't re-walk the cursor.

use std::io::Cursor;

use crate::binary::entity::{EntityId, EntityTag};
use crate::binary::header::OpenError;
use crate::utilities::{read_sleb128, read_uleb128, FromByteStream};

fn read_entity_id(cursor: &mut Cursor<&[u8]>) -> std::io::Result<EntityId> {
	Ok(EntityId(u32::read(cursor, &())?))
}

fn read_tag(cursor: &mut Cursor<&[u8]>) -> std::io::Result<EntityTag> {
	let byte = u8::read(cursor, &())?;
	EntityTag::from_repr(byte).ok_or_else(|| std::io::ErrorKind::InvalidData.into())
}

fn read_tagged_id_list(cursor: &mut Cursor<&[u8]>) -> std::io::Result<Vec<EntityId>> {
	let count = read_uleb128(cursor)?;
	(0..count).map(|_| read_entity_id(cursor)).collect()
}

/// `ClassDataAccessor`, `FieldDataAccessor`, and `MethodDataAccessor` all
/// walk the same shape of tagged optional section; this tracks how far a
/// given instance has consumed, and what it found along the way.
#[derive(Default)]
struct TaggedSections {
	source_lang: Option<u8>,
	runtime_annotations: Option<Vec<EntityId>>,
	annotations: Option<Vec<EntityId>>,
	source_file: Option<EntityId>,
	runtime_param_annotations: Option<Vec<Vec<EntityId>>>,
	param_annotations: Option<Vec<Vec<EntityId>>>,
	field_value: Option<u64>,
	debug_info: Option<EntityId>,
	code: Option<EntityId>,
	done: bool,
}

impl TaggedSections {
	/// Consumes one more `tag + payload` pair, recording it, until either
	/// `Nothing` is reached or `cursor` runs out of the tags this caller
	/// asked for. Returns the tag just consumed, or `None` once exhausted.
	fn advance(&mut self, cursor: &mut Cursor<&[u8]>) -> Result<Option<EntityTag>, OpenError> {
		if self.done {
			return Ok(None);
		}
		let tag = read_tag(cursor).map_err(OpenError::Io)?;
		match tag {
			EntityTag::Nothing => {
				self.done = true;
				Ok(None)
			},
			EntityTag::SourceLang => {
				self.source_lang = Some(u8::read(cursor, &()).map_err(OpenError::Io)?);
				Ok(Some(tag))
			},
			EntityTag::RuntimeAnnotation | EntityTag::RuntimeTypeAnnotation => {
				self.runtime_annotations = Some(read_tagged_id_list(cursor).map_err(OpenError::Io)?);
				Ok(Some(tag))
			},
			EntityTag::Annotation | EntityTag::TypeAnnotation => {
				self.annotations = Some(read_tagged_id_list(cursor).map_err(OpenError::Io)?);
				Ok(Some(tag))
			},
			EntityTag::SourceFile => {
				self.source_file = Some(read_entity_id(cursor).map_err(OpenError::Io)?);
				Ok(Some(tag))
			},
			EntityTag::RuntimeParamAnnotation => {
				let count = read_uleb128(cursor).map_err(OpenError::Io)?;
				let lists = (0..count).map(|_| read_tagged_id_list(cursor)).collect::<std::io::Result<_>>().map_err(OpenError::Io)?;
				self.runtime_param_annotations = Some(lists);
				Ok(Some(tag))
			},
			EntityTag::ParamAnnotation => {
				let count = read_uleb128(cursor).map_err(OpenError::Io)?;
				let lists = (0..count).map(|_| read_tagged_id_list(cursor)).collect::<std::io::Result<_>>().map_err(OpenError::Io)?;
				self.param_annotations = Some(lists);
				Ok(Some(tag))
			},
			EntityTag::FieldValue => {
				self.field_value = Some(u64::read(cursor, &()).map_err(OpenError::Io)?);
				Ok(Some(tag))
			},
			EntityTag::DebugInfo => {
				self.debug_info = Some(read_entity_id(cursor).map_err(OpenError::Io)?);
				Ok(Some(tag))
			},
			EntityTag::Code => {
				self.code = Some(read_entity_id(cursor).map_err(OpenError::Io)?);
				Ok(Some(tag))
			},
			EntityTag::ClassIdx | EntityTag::FieldIdx | EntityTag::MethodIdx | EntityTag::ProtoIdx => {
				// Consumed eagerly by the owning accessor's fixed header,
				// never seen inside the tagged tail.
				Err(OpenError::UnexpectedTag(tag))
			},
		}
	}

	fn ensure_past(&mut self, cursor: &mut Cursor<&[u8]>, is_present: impl Fn(&Self) -> bool) -> Result<(), OpenError> {
		while !is_present(self) && !self.done {
			self.advance(cursor)?;
		}
		Ok(())
	}
}

pub struct ClassDataAccessor<'f> {
	access_flags: u32,
	super_class: EntityId,
	interface_indices: Vec<u16>,
	field_ids: Vec<EntityId>,
	method_ids: Vec<EntityId>,
	tail: TaggedSections,
	cursor: Cursor<&'f [u8]>,
}

impl<'f> ClassDataAccessor<'f> {
	pub fn new(data: &'f [u8]) -> Result<Self, OpenError> {
		let mut cursor = Cursor::new(data);
		let access_flags = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let super_class = read_entity_id(&mut cursor).map_err(OpenError::Io)?;
		let num_interfaces = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let interface_indices = (0..num_interfaces).map(|_| u16::read(&mut cursor, &())).collect::<std::io::Result<_>>().map_err(OpenError::Io)?;
		let num_fields = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let field_ids = (0..num_fields).map(|_| read_entity_id(&mut cursor)).collect::<std::io::Result<_>>().map_err(OpenError::Io)?;
		let num_methods = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let method_ids = (0..num_methods).map(|_| read_entity_id(&mut cursor)).collect::<std::io::Result<_>>().map_err(OpenError::Io)?;
		Ok(Self { access_flags, super_class, interface_indices, field_ids, method_ids, tail: TaggedSections::default(), cursor })
	}

	pub fn access_flags(&self) -> u32 {
		self.access_flags
	}

	pub fn super_class_id(&self) -> EntityId {
		self.super_class
	}

	pub fn num_interfaces(&self) -> usize {
		self.interface_indices.len()
	}

	/// Dereferences interface `index` through `class_index` (the file's
	/// sorted class index table).
	pub fn interface_id(&self, index: usize, class_index: &[EntityId]) -> Option<EntityId> {
		let slot = *self.interface_indices.get(index)? as usize;
		class_index.get(slot).copied()
	}

	pub fn fields(&self) -> &[EntityId] {
		&self.field_ids
	}

	pub fn methods(&self) -> &[EntityId] {
		&self.method_ids
	}

	pub fn source_lang(&mut self) -> Result<Option<u8>, OpenError> {
		self.tail.ensure_past(&mut self.cursor, |t| t.source_lang.is_some())?;
		Ok(self.tail.source_lang)
	}

	pub fn runtime_annotations(&mut self) -> Result<&[EntityId], OpenError> {
		self.tail.ensure_past(&mut self.cursor, |t| t.runtime_annotations.is_some())?;
		Ok(self.tail.runtime_annotations.as_deref().unwrap_or(&[]))
	}

	pub fn annotations(&mut self) -> Result<&[EntityId], OpenError> {
		self.tail.ensure_past(&mut self.cursor, |t| t.annotations.is_some())?;
		Ok(self.tail.annotations.as_deref().unwrap_or(&[]))
	}

	pub fn source_file(&mut self) -> Result<Option<EntityId>, OpenError> {
		self.tail.ensure_past(&mut self.cursor, |t| t.source_file.is_some())?;
		Ok(self.tail.source_file)
	}
}

pub struct FieldDataAccessor<'f> {
	access_flags: u32,
	type_id: u32,
	name_id: EntityId,
	tail: TaggedSections,
	cursor: Cursor<&'f [u8]>,
}

impl<'f> FieldDataAccessor<'f> {
	pub fn new(data: &'f [u8]) -> Result<Self, OpenError> {
		let mut cursor = Cursor::new(data);
		let access_flags = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let type_id = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let name_id = read_entity_id(&mut cursor).map_err(OpenError::Io)?;
		Ok(Self { access_flags, type_id, name_id, tail: TaggedSections::default(), cursor })
	}

	pub fn access_flags(&self) -> u32 {
		self.access_flags
	}

	pub fn type_id(&self) -> u32 {
		self.type_id
	}

	pub fn name_id(&self) -> EntityId {
		self.name_id
	}

	pub fn value(&mut self) -> Result<Option<u64>, OpenError> {
		self.tail.ensure_past(&mut self.cursor, |t| t.field_value.is_some() || t.done)?;
		Ok(self.tail.field_value)
	}

	pub fn runtime_annotations(&mut self) -> Result<&[EntityId], OpenError> {
		self.tail.ensure_past(&mut self.cursor, |t| t.runtime_annotations.is_some())?;
		Ok(self.tail.runtime_annotations.as_deref().unwrap_or(&[]))
	}

	pub fn annotations(&mut self) -> Result<&[EntityId], OpenError> {
		self.tail.ensure_past(&mut self.cursor, |t| t.annotations.is_some())?;
		Ok(self.tail.annotations.as_deref().unwrap_or(&[]))
	}
}

pub struct MethodDataAccessor<'f> {
	access_flags: u32,
	proto_id: EntityId,
	name_id: EntityId,
	tail: TaggedSections,
	cursor: Cursor<&'f [u8]>,
}

impl<'f> MethodDataAccessor<'f> {
	pub fn new(data: &'f [u8]) -> Result<Self, OpenError> {
		let mut cursor = Cursor::new(data);
		let access_flags = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let proto_id = read_entity_id(&mut cursor).map_err(OpenError::Io)?;
		let name_id = read_entity_id(&mut cursor).map_err(OpenError::Io)?;
		Ok(Self { access_flags, proto_id, name_id, tail: TaggedSections::default(), cursor })
	}

	pub fn access_flags(&self) -> u32 {
		self.access_flags
	}

	pub fn proto_id(&self) -> EntityId {
		self.proto_id
	}

	pub fn name_id(&self) -> EntityId {
		self.name_id
	}

	pub fn code_id(&mut self) -> Result<Option<EntityId>, OpenError> {
		self.tail.ensure_past(&mut self.cursor, |t| t.code.is_some() || t.done)?;
		Ok(self.tail.code)
	}

	pub fn debug_info_id(&mut self) -> Result<Option<EntityId>, OpenError> {
		self.tail.ensure_past(&mut self.cursor, |t| t.debug_info.is_some() || t.done)?;
		Ok(self.tail.debug_info)
	}

	pub fn runtime_annotations(&mut self) -> Result<&[EntityId], OpenError> {
		self.tail.ensure_past(&mut self.cursor, |t| t.runtime_annotations.is_some())?;
		Ok(self.tail.runtime_annotations.as_deref().unwrap_or(&[]))
	}

	pub fn annotations(&mut self) -> Result<&[EntityId], OpenError> {
		self.tail.ensure_past(&mut self.cursor, |t| t.annotations.is_some())?;
		Ok(self.tail.annotations.as_deref().unwrap_or(&[]))
	}
}

/// Packed parameter/return type list: 4-bit type codes, 16 bits at a time,
/// terminated by a zero nibble, followed by one class index per reference
/// slot in order of appearance.
pub struct ProtoDataAccessor<'f> {
	shorty: Vec<u8>,
	reference_type_ids: Vec<EntityId>,
	_data: &'f [u8],
}

/// Shorty nibble reserved for reference-typed slots (return or argument).
const SHORTY_REFERENCE: u8 = 0xf;

impl<'f> ProtoDataAccessor<'f> {
	pub fn new(data: &'f [u8]) -> Result<Self, OpenError> {
		let mut cursor = Cursor::new(data);
		let mut shorty = Vec::new();
		let mut reference_count = 0usize;
		'units: loop {
			let unit = u16::read(&mut cursor, &()).map_err(OpenError::Io)?;
			for shift in (0..16).step_by(4) {
				let nibble = ((unit >> shift) & 0xf) as u8;
				if nibble == 0 {
					break 'units;
				}
				if nibble == SHORTY_REFERENCE {
					reference_count += 1;
				}
				shorty.push(nibble);
			}
		}
		let reference_type_ids = (0..reference_count).map(|_| read_entity_id(&mut cursor)).collect::<std::io::Result<_>>().map_err(OpenError::Io)?;
		Ok(Self { shorty, reference_type_ids, _data: data })
	}

	/// The return type's shorty nibble.
	pub fn return_type(&self) -> u8 {
		self.shorty[0]
	}

	pub fn num_args(&self) -> usize {
		self.shorty.len().saturating_sub(1)
	}

	pub fn arg_type(&self, index: usize) -> Option<u8> {
		self.shorty.get(index + 1).copied()
	}

	pub fn reference_type_ids(&self) -> &[EntityId] {
		&self.reference_type_ids
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchBlock {
	pub type_idx: u32,
	pub handler_pc: u32,
	pub code_size: u32,
}

impl CatchBlock {
	pub fn is_catch_all(&self) -> bool {
		self.type_idx == 0
	}

	fn read(cursor: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
		Ok(Self { type_idx: read_uleb128(cursor)?, handler_pc: read_uleb128(cursor)?, code_size: read_uleb128(cursor)? })
	}
}

#[derive(Debug, Clone)]
pub struct TryBlock {
	pub start_pc: u32,
	pub length: u32,
	pub catch_blocks: Vec<CatchBlock>,
}

impl TryBlock {
	fn read(cursor: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
		let start_pc = read_uleb128(cursor)?;
		let length = read_uleb128(cursor)?;
		let num_catches = read_uleb128(cursor)?;
		let catch_blocks = (0..num_catches).map(|_| CatchBlock::read(cursor)).collect::<std::io::Result<_>>()?;
		Ok(Self { start_pc, length, catch_blocks })
	}
}

pub struct CodeDataAccessor<'f> {
	num_vregs: u32,
	num_args: u32,
	instructions: &'f [u8],
	try_blocks: Vec<TryBlock>,
}

impl<'f> CodeDataAccessor<'f> {
	pub fn new(data: &'f [u8]) -> Result<Self, OpenError> {
		let mut cursor = Cursor::new(data);
		let num_vregs = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let num_args = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let code_size = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let tries_size = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let instructions_start = cursor.position() as usize;
		let instructions = &data[instructions_start..instructions_start + code_size as usize];
		cursor.set_position((instructions_start + code_size as usize) as u64);
		let try_blocks = (0..tries_size).map(|_| TryBlock::read(&mut cursor)).collect::<std::io::Result<_>>().map_err(OpenError::Io)?;
		Ok(Self { num_vregs, num_args, instructions, try_blocks })
	}

	pub fn num_vregs(&self) -> u32 {
		self.num_vregs
	}

	pub fn num_args(&self) -> u32 {
		self.num_args
	}

	pub fn instructions(&self) -> &[u8] {
		self.instructions
	}

	pub fn try_blocks(&self) -> &[TryBlock] {
		&self.try_blocks
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineProgramOp {
	EndSequence,
	AdvancePc { delta: u32 },
	AdvanceLine { delta: i32 },
	StartLocal { register: u32, name: EntityId, type_id: EntityId },
	StartLocalExtended { register: u32, name: EntityId, type_id: EntityId, type_signature: EntityId },
	EndLocal { register: u32 },
	RestartLocal { register: u32 },
	SetPrologueEnd,
	SetEpilogueBegin,
	SetFile { source_file: u32 },
	SetSourceCode { source_code: u32 },
	Special { pc_delta: u32, line_delta: i32 },
}

const OP_END_SEQUENCE: u8 = 0x00;
const OP_ADVANCE_PC: u8 = 0x01;
const OP_ADVANCE_LINE: u8 = 0x02;
const OP_START_LOCAL: u8 = 0x03;
const OP_START_LOCAL_EXTENDED: u8 = 0x04;
const OP_END_LOCAL: u8 = 0x05;
const OP_RESTART_LOCAL: u8 = 0x06;
const OP_SET_PROLOGUE_END: u8 = 0x07;
const OP_SET_EPILOGUE_BEGIN: u8 = 0x08;
const OP_SET_FILE: u8 = 0x09;
const OP_SET_SOURCE_CODE: u8 = 0x0a;
const OPCODE_BASE: u8 = 0x0b;
const LINE_RANGE: i32 = 15;
const LINE_BASE: i32 = -4;

pub struct DebugInfoAccessor<'f> {
	start_line: u32,
	param_names: Vec<EntityId>,
	program: &'f [u8],
}

impl<'f> DebugInfoAccessor<'f> {
	pub fn new(data: &'f [u8]) -> Result<Self, OpenError> {
		let mut cursor = Cursor::new(data);
		let start_line = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let num_params = read_uleb128(&mut cursor).map_err(OpenError::Io)?;
		let param_names = (0..num_params).map(|_| read_entity_id(&mut cursor)).collect::<std::io::Result<_>>().map_err(OpenError::Io)?;
		let program_start = cursor.position() as usize;
		Ok(Self { start_line, param_names, program: &data[program_start..] })
	}

	pub fn start_line(&self) -> u32 {
		self.start_line
	}

	pub fn param_names(&self) -> &[EntityId] {
		&self.param_names
	}

	/// Decodes the full line-number program into a flat op list.
	pub fn line_program(&self) -> Result<Vec<LineProgramOp>, OpenError> {
		let mut cursor = Cursor::new(self.program);
		let mut ops = Vec::new();
		loop {
			let opcode = match u8::read(&mut cursor, &()) {
				Ok(byte) => byte,
				Err(_) => break,
			};
			let op = match opcode {
				OP_END_SEQUENCE => {
					ops.push(LineProgramOp::EndSequence);
					break;
				},
				OP_ADVANCE_PC => LineProgramOp::AdvancePc { delta: read_uleb128(&mut cursor).map_err(OpenError::Io)? },
				OP_ADVANCE_LINE => LineProgramOp::AdvanceLine { delta: read_sleb128(&mut cursor).map_err(OpenError::Io)? },
				OP_START_LOCAL => LineProgramOp::StartLocal {
					register: read_uleb128(&mut cursor).map_err(OpenError::Io)?,
					name: read_entity_id(&mut cursor).map_err(OpenError::Io)?,
					type_id: read_entity_id(&mut cursor).map_err(OpenError::Io)?,
				},
				OP_START_LOCAL_EXTENDED => LineProgramOp::StartLocalExtended {
					register: read_uleb128(&mut cursor).map_err(OpenError::Io)?,
					name: read_entity_id(&mut cursor).map_err(OpenError::Io)?,
					type_id: read_entity_id(&mut cursor).map_err(OpenError::Io)?,
					type_signature: read_entity_id(&mut cursor).map_err(OpenError::Io)?,
				},
				OP_END_LOCAL => LineProgramOp::EndLocal { register: read_uleb128(&mut cursor).map_err(OpenError::Io)? },
				OP_RESTART_LOCAL => LineProgramOp::RestartLocal { register: read_uleb128(&mut cursor).map_err(OpenError::Io)? },
				OP_SET_PROLOGUE_END => LineProgramOp::SetPrologueEnd,
				OP_SET_EPILOGUE_BEGIN => LineProgramOp::SetEpilogueBegin,
				OP_SET_FILE => LineProgramOp::SetFile { source_file: read_uleb128(&mut cursor).map_err(OpenError::Io)? },
				OP_SET_SOURCE_CODE => LineProgramOp::SetSourceCode { source_code: read_uleb128(&mut cursor).map_err(OpenError::Io)? },
				special => {
					let adjusted = (special - OPCODE_BASE) as i32;
					let pc_delta = (adjusted / LINE_RANGE) as u32;
					let line_delta = LINE_BASE + (adjusted % LINE_RANGE);
					LineProgramOp::Special { pc_delta, line_delta }
				},
			};
			ops.push(op);
		}
		Ok(ops)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodHandleDataAccessor {
	pub kind: u8,
	pub target: EntityId,
}

impl MethodHandleDataAccessor {
	pub fn new(data: &[u8]) -> Result<Self, OpenError> {
		let mut cursor = Cursor::new(data);
		let kind = u8::read(&mut cursor, &()).map_err(OpenError::Io)?;
		let target = read_entity_id(&mut cursor).map_err(OpenError::Io)?;
		Ok(Self { kind, target })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn class_bytes() -> Vec<u8> {
		let mut bytes = Vec::new();
		bytes.push(0x01); // access_flags
		bytes.extend_from_slice(&7u32.to_le_bytes()); // super_class
		bytes.push(0x00); // num_interfaces
		bytes.push(0x01); // num_fields
		bytes.extend_from_slice(&42u32.to_le_bytes());
		bytes.push(0x00); // num_methods
		bytes.push(EntityTag::SourceLang as u8);
		bytes.push(7); // lang value
		bytes.push(EntityTag::SourceFile as u8);
		bytes.extend_from_slice(&99u32.to_le_bytes());
		bytes.push(EntityTag::Nothing as u8);
		bytes
	}

	#[test]
	fn class_accessor_reads_fixed_header() {
		let bytes = class_bytes();
		let accessor = ClassDataAccessor::new(&bytes).unwrap();
		assert_eq!(accessor.access_flags(), 1);
		assert_eq!(accessor.super_class_id(), EntityId(7));
		assert_eq!(accessor.fields(), &[EntityId(42)]);
		assert!(accessor.methods().is_empty());
	}

	#[test]
	fn class_accessor_lazily_advances_through_tagged_tail() {
		let bytes = class_bytes();
		let mut accessor = ClassDataAccessor::new(&bytes).unwrap();
		assert_eq!(accessor.source_file().unwrap(), Some(EntityId(99)));
		assert_eq!(accessor.source_lang().unwrap(), Some(7));
	}

	#[test]
	fn proto_accessor_decodes_packed_shorty() {
		let mut bytes = Vec::new();
		// return=I(as 0x1), arg0=F(0x2), arg1=ref(0xf), then terminator nibble 0
		let unit: u16 = 0x1 | (0x2 << 4) | (0xf << 8);
		bytes.extend_from_slice(&unit.to_le_bytes());
		bytes.extend_from_slice(&0u16.to_le_bytes());
		bytes.extend_from_slice(&5u32.to_le_bytes()); // one reference class id
		let accessor = ProtoDataAccessor::new(&bytes).unwrap();
		assert_eq!(accessor.return_type(), 0x1);
		assert_eq!(accessor.num_args(), 2);
		assert_eq!(accessor.arg_type(1), Some(0xf));
		assert_eq!(accessor.reference_type_ids(), &[EntityId(5)]);
	}

	#[test]
	fn code_accessor_decodes_instructions_and_try_blocks() {
		let mut bytes = Vec::new();
		bytes.push(2); // num_vregs
		bytes.push(1); // num_args
		bytes.push(3); // code_size
		bytes.push(1); // tries_size
		bytes.extend_from_slice(&[0xaa, 0xbb, 0xcc]);
		bytes.push(0); // try start_pc
		bytes.push(3); // try length
		bytes.push(1); // num_catches
		bytes.push(0); // catch type_idx (catch-all)
		bytes.push(5); // handler_pc
		bytes.push(2); // code_size

		let accessor = CodeDataAccessor::new(&bytes).unwrap();
		assert_eq!(accessor.instructions(), &[0xaa, 0xbb, 0xcc]);
		assert_eq!(accessor.try_blocks().len(), 1);
		assert!(accessor.try_blocks()[0].catch_blocks[0].is_catch_all());
	}

	#[test]
	fn debug_info_decodes_special_opcode_as_combined_delta() {
		let mut bytes = Vec::new();
		bytes.push(10); // start_line
		bytes.push(0); // num_params
		bytes.push(OPCODE_BASE); // smallest special opcode: pc_delta=0, line_delta=LINE_BASE
		bytes.push(OP_END_SEQUENCE);
		let accessor = DebugInfoAccessor::new(&bytes).unwrap();
		let ops = accessor.line_program().unwrap();
		assert_eq!(ops[0], LineProgramOp::Special { pc_delta: 0, line_delta: LINE_BASE });
		assert_eq!(ops[1], LineProgramOp::EndSequence);
	}
}
