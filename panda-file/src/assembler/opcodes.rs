//! A representative slice of the instruction set: enough opcodes to
//! exercise every operand shape the parser has to handle (plain registers,
//! an immediate, an id operand, and the `call`-family's variable register
//! count), not the full production ISA.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmKind {
	None,
	Int64,
	Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
	None,
	Label,
	/// A record, field, or function name.
	Entity,
}

#[derive(Debug, Clone, Copy)]
pub struct OpcodeSpec {
	pub name: &'static str,
	/// Upper bound on register operands; the `call`-family "short" forms
	/// accept *up to* this many, not exactly this many.
	pub max_registers: u8,
	/// Bit width a register operand is encoded with; an index that doesn't
	/// fit doesn't encode, regardless of `max_registers`. The `short` call
	/// forms pack registers into a nibble, everything else gets a full byte.
	pub register_width: u8,
	pub imm: ImmKind,
	pub id: IdKind,
}

macro_rules! opcode_table {
	($(($name:literal, $max_regs:literal, $reg_width:literal, $imm:expr, $id:expr)),* $(,)?) => {
		const OPCODES: &[OpcodeSpec] = &[
			$(OpcodeSpec { name: $name, max_registers: $max_regs, register_width: $reg_width, imm: $imm, id: $id }),*
		];
	};
}

opcode_table! {
	("mov", 2, 8, ImmKind::None, IdKind::None),
	("mov.64", 2, 8, ImmKind::None, IdKind::None),
	("mov.obj", 2, 8, ImmKind::None, IdKind::None),
	("mov.null", 1, 8, ImmKind::None, IdKind::None),

	("lda", 1, 8, ImmKind::None, IdKind::None),
	("lda.64", 1, 8, ImmKind::None, IdKind::None),
	("lda.obj", 1, 8, ImmKind::None, IdKind::None),
	("lda.str", 0, 8, ImmKind::None, IdKind::Entity),
	("ldai", 0, 8, ImmKind::Int64, IdKind::None),
	("fldai", 0, 8, ImmKind::Double, IdKind::None),
	("sta", 1, 8, ImmKind::None, IdKind::None),
	("sta.64", 1, 8, ImmKind::None, IdKind::None),
	("sta.obj", 1, 8, ImmKind::None, IdKind::None),

	("jmp", 0, 8, ImmKind::None, IdKind::Label),
	("jeqz", 0, 8, ImmKind::None, IdKind::Label),
	("jnez", 0, 8, ImmKind::None, IdKind::Label),

	("call.short", 2, 4, ImmKind::None, IdKind::Entity),
	("call.virt.short", 2, 4, ImmKind::None, IdKind::Entity),
	("call", 4, 8, ImmKind::None, IdKind::Entity),
	("call.virt", 4, 8, ImmKind::None, IdKind::Entity),
	("call.range", 1, 8, ImmKind::None, IdKind::Entity),

	("newobj", 1, 8, ImmKind::None, IdKind::Entity),
	("newarr", 2, 8, ImmKind::Int64, IdKind::Entity),

	("ldobj", 1, 8, ImmKind::None, IdKind::Entity),
	("stobj", 1, 8, ImmKind::None, IdKind::Entity),

	("return", 0, 8, ImmKind::None, IdKind::None),
	("return.64", 0, 8, ImmKind::None, IdKind::None),
	("return.obj", 0, 8, ImmKind::None, IdKind::None),
	("return.void", 0, 8, ImmKind::None, IdKind::None),
}

pub fn lookup(name: &str) -> Option<&'static OpcodeSpec> {
	OPCODES.iter().find(|op| op.name == name)
}

/// The `call`-family opcodes accept *up to* their declared register count
/// rather than exactly that many.
pub fn is_call_family(name: &str) -> bool {
	matches!(name, "call.short" | "call.virt.short" | "call" | "call.virt" | "call.range")
}

/// `ldobj`/`stobj` take a `Record.field` entity rather than a bare record or
/// function name.
pub fn is_field_family(name: &str) -> bool {
	matches!(name, "ldobj" | "stobj")
}

/// `newobj`/`newarr` take a plain type name; the array rank is implicit in
/// the opcode rather than spelled out in the operand.
pub fn is_new_family(name: &str) -> bool {
	matches!(name, "newobj" | "newarr")
}
