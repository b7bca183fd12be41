use fxhash::FxHashMap;

use crate::assembler::errors::{Diagnostic, Diagnostics, ErrorKind};
use crate::assembler::opcodes::{self, IdKind, ImmKind};
use crate::assembler::program::{
	CatchBlock, Field, Function, IdOperand, ImmediateOperand, Instruction, Language, Metadata, Primitive, Program, Record, RegisterOperand, Type,
};
use crate::assembler::token::{Directive, RegisterToken, Token, TokenKind};

/// Single-pass, error-recovering at directive boundaries: parsing resumes
/// at the next `.record`/`.function` after a hard error inside one
/// declaration, so later declarations still get a chance to report their
/// own problems (though only the first hard error overall is kept).
pub struct Parser {
	tokens: Vec<Token>,
	pos: usize,
	diagnostics: Diagnostics,
	program: Program,
	/// Forward references recorded during pass one, resolved in pass two:
	/// (function, operand kind, name, line, column).
	pending_uses: Vec<PendingUse>,
}

enum PendingUse {
	Record { function: String, name: String, line: u32, column: u32 },
	Field { function: String, record: String, field: String, line: u32, column: u32 },
	Label { function: String, label: String, line: u32, column: u32 },
	CallArity { function: String, opcode: String, callee: String, given: usize, line: u32, column: u32 },
}

impl Parser {
	pub fn new(tokens: Vec<Token>) -> Self {
		Self { tokens, pos: 0, diagnostics: Diagnostics::default(), program: Program::default(), pending_uses: Vec::new() }
	}

	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.pos)
	}

	fn bump(&mut self) -> Option<Token> {
		let token = self.tokens.get(self.pos).cloned();
		if token.is_some() {
			self.pos += 1;
		}
		token
	}

	fn error(&mut self, kind: ErrorKind, line: u32, column: u32, message: impl Into<String>) {
		self.diagnostics.push(Diagnostic::new(kind, line, column, message));
	}

	fn skip_to_next_directive(&mut self) {
		while let Some(tok) = self.peek() {
			if matches!(tok.kind, TokenKind::Directive(Directive::Record | Directive::Function)) {
				break;
			}
			self.pos += 1;
		}
	}

	/// Parses the whole token stream into a [`Program`], running pass-two
	/// id resolution (checks 1-5 of the component design) before
	/// returning. Returns the first hard error encountered, if any.
	pub fn parse(mut self) -> (Program, Diagnostics) {
		let mut seen_declaration = false;
		while let Some(token) = self.peek().cloned() {
			match token.kind {
				TokenKind::Directive(Directive::Language) => {
					if seen_declaration {
						self.error(ErrorKind::IncorrectDirectiveLocation, token.line, token.column, "`.language` must appear before any declaration");
					}
					if self.program.language.is_some() {
						self.error(ErrorKind::MultipleDirectives, token.line, token.column, "`.language` given more than once");
					}
					self.bump();
					self.parse_language(token.line, token.column);
				},
				TokenKind::Directive(Directive::Record) => {
					seen_declaration = true;
					self.bump();
					if let Err(()) = self.parse_record() {
						self.skip_to_next_directive();
					}
				},
				TokenKind::Directive(Directive::Function) => {
					seen_declaration = true;
					self.bump();
					if let Err(()) = self.parse_function() {
						self.skip_to_next_directive();
					}
				},
				_ => {
					self.error(ErrorKind::BadDirectiveDeclaration, token.line, token.column, "expected `.record`, `.function`, or `.language`");
					self.bump();
				},
			}
			if self.diagnostics.has_error() {
				break;
			}
		}

		if !self.diagnostics.has_error() {
			self.resolve_pending_uses();
		}

		(self.program, self.diagnostics)
	}

	fn parse_language(&mut self, line: u32, column: u32) {
		match self.bump() {
			Some(Token { kind: TokenKind::Identifier(name), .. }) => match Language::from_name(&name) {
				Some(lang) => self.program.language = Some(lang),
				None => self.error(ErrorKind::UnknownLanguage, line, column, format!("unknown language `{name}`")),
			},
			_ => self.error(ErrorKind::UnknownLanguage, line, column, "expected a language name"),
		}
	}

	fn expect_punct(&mut self, c: char) -> Result<(), ()> {
		match self.peek() {
			Some(Token { kind: TokenKind::Punct(p), .. }) if *p == c => {
				self.bump();
				Ok(())
			},
			Some(tok) => {
				let (line, column) = (tok.line, tok.column);
				self.error(ErrorKind::BadOperand, line, column, format!("expected `{c}`"));
				Err(())
			},
			None => {
				self.error(ErrorKind::BadOperand, 0, 0, format!("expected `{c}`, found end of input"));
				Err(())
			},
		}
	}

	fn expect_identifier(&mut self, what: &str) -> Result<String, ()> {
		match self.bump() {
			Some(Token { kind: TokenKind::Identifier(name), .. }) => Ok(name),
			Some(tok) => {
				let (line, column) = (tok.line, tok.column);
				self.error(ErrorKind::BadOperand, line, column, format!("expected {what}"));
				Err(())
			},
			None => {
				self.error(ErrorKind::BadOperand, 0, 0, format!("expected {what}, found end of input"));
				Err(())
			},
		}
	}

	fn peek_punct(&self, c: char) -> bool {
		matches!(self.peek(), Some(Token { kind: TokenKind::Punct(p), .. }) if *p == c)
	}

	/// `< attr, attr=value, ... >`.
	fn parse_metadata(&mut self, allowed: &[&str], value_bearing: &[&str]) -> Result<Metadata, ()> {
		let mut metadata = Metadata::default();
		if !self.peek_punct('<') {
			return Ok(metadata);
		}
		self.bump();
		loop {
			let (name, line, column) = match self.bump() {
				Some(Token { kind: TokenKind::Identifier(name), line, column }) => (name, line, column),
				Some(tok) if matches!(tok.kind, TokenKind::Punct('>')) => break,
				Some(tok) => {
					let (line, column) = (tok.line, tok.column);
					self.error(ErrorKind::BadMetadataUnknownAttribute, line, column, "expected a metadata attribute name");
					return Err(());
				},
				None => return Err(()),
			};
			if !allowed.contains(&name.as_str()) {
				self.error(ErrorKind::BadMetadataUnknownAttribute, line, column, format!("unknown metadata attribute `{name}`"));
				return Err(());
			}
			let takes_value = value_bearing.contains(&name.as_str());
			let mut value = None;
			if matches!(self.peek(), Some(Token { kind: TokenKind::Punct('='), .. })) {
				if !takes_value {
					self.error(ErrorKind::BadMetadataUnexpectedValue, line, column, format!("attribute `{name}` does not accept a value"));
					return Err(());
				}
				self.bump();
				value = Some(match self.bump() {
					Some(Token { kind: TokenKind::Identifier(v), .. }) => v,
					Some(Token { kind: TokenKind::String(v), .. }) => v,
					Some(Token { kind: TokenKind::Integer(v), .. }) => v.to_string(),
					_ => {
						self.error(ErrorKind::BadMetadataInvalidValue, line, column, format!("invalid value for `{name}`"));
						return Err(());
					},
				});
			} else if takes_value {
				self.error(ErrorKind::BadMetadataUnexpectedValue, line, column, format!("attribute `{name}` requires a value"));
				return Err(());
			}
			match name.as_str() {
				"external" => {
					if metadata.external {
						self.error(ErrorKind::BadMetadataMultipleAttribute, line, column, "duplicate `external`");
						return Err(());
					}
					metadata.external = true;
				},
				"static" => metadata.is_static = true,
				"ctor" => metadata.ctor = true,
				"cctor" => metadata.cctor = true,
				"value" => metadata.value = value,
				other => metadata.access_flags.push(other.to_string()),
			}
			match self.bump() {
				Some(Token { kind: TokenKind::Punct(','), .. }) => continue,
				Some(Token { kind: TokenKind::Punct('>'), .. }) => break,
				_ => {
					self.error(ErrorKind::BadMetadataBound, line, column, "expected `,` or `>`");
					return Err(());
				},
			}
		}
		Ok(metadata)
	}

	/// A primitive keyword or record qname, followed by any number of
	/// trailing `[]` pairs.
	fn parse_type(&mut self) -> Result<Type, ()> {
		let (name, line, column) = match self.bump() {
			Some(Token { kind: TokenKind::Identifier(name), line, column }) => (name, line, column),
			Some(tok) => {
				let (line, column) = (tok.line, tok.column);
				self.error(ErrorKind::BadOperand, line, column, "expected a type");
				return Err(());
			},
			None => return Err(()),
		};

		let mut rank = 0u32;
		loop {
			if self.peek_punct('[') {
				self.bump();
				match self.bump() {
					Some(Token { kind: TokenKind::Punct(']'), .. }) => rank += 1,
					_ => {
						self.error(ErrorKind::BadArrayTypeBound, line, column, "`[` without matching `]`");
						return Err(());
					},
				}
			} else {
				break;
			}
		}

		Ok(match Primitive::from_name(&name) {
			Some(primitive) => Type::primitive(primitive, rank),
			None => Type::reference(name, rank),
		})
	}

	fn parse_record(&mut self) -> Result<(), ()> {
		let (name, line, column) = match self.bump() {
			Some(Token { kind: TokenKind::Identifier(name), line, column }) => (name, line, column),
			_ => {
				self.error(ErrorKind::BadRecordName, 0, 0, "expected a record name");
				return Err(());
			},
		};
		let metadata = self.parse_metadata(&["external"], &[])?;
		let mut record = Record { name: name.clone(), fields: Vec::new(), metadata };

		if self.peek_punct('{') {
			self.bump();
			let mut seen_names = std::collections::HashSet::new();
			while !self.peek_punct('}') {
				let field = self.parse_field()?;
				if !seen_names.insert(field.name.clone()) {
					self.error(ErrorKind::RepeatingFieldName, line, column, format!("duplicate field `{}`", field.name));
					return Err(());
				}
				record.fields.push(field);
			}
			self.bump();
		}

		if self.program.records.insert(name.clone(), record).is_some() {
			self.error(ErrorKind::BadRecordName, line, column, format!("record `{name}` declared more than once"));
			return Err(());
		}
		Ok(())
	}

	fn parse_field(&mut self) -> Result<Field, ()> {
		let ty = self.parse_type()?;
		let name = match self.bump() {
			Some(Token { kind: TokenKind::Identifier(name), .. }) => name,
			_ => {
				self.error(ErrorKind::BadFieldMissingName, 0, 0, "expected a field name");
				return Err(());
			},
		};
		let metadata = self.parse_metadata(&["external", "value"], &["value"])?;
		let value = metadata.value.as_deref().map(|v| match v.parse::<i64>() {
			Ok(n) => ImmediateOperand::Int(n),
			Err(_) => ImmediateOperand::Int(0),
		});
		Ok(Field { name, ty, metadata, value })
	}

	fn parse_register(&mut self) -> Result<RegisterToken, ()> {
		match self.bump() {
			Some(Token { kind: TokenKind::Register(reg), .. }) => Ok(reg),
			Some(tok) => {
				let (line, column) = (tok.line, tok.column);
				self.error(ErrorKind::BadNameReg, line, column, "expected a register operand");
				Err(())
			},
			None => Err(()),
		}
	}

	fn parse_function(&mut self) -> Result<(), ()> {
		let return_type = self.parse_type()?;
		let (name, fn_line, fn_column) = match self.bump() {
			Some(Token { kind: TokenKind::Identifier(name), line, column }) => (name, line, column),
			_ => {
				self.error(ErrorKind::BadNameId, 0, 0, "expected a function name");
				return Err(());
			},
		};
		self.expect_punct('(')?;
		let mut params = Vec::new();
		let mut num_params = 0u16;
		if !self.peek_punct(')') {
			loop {
				let param_type = self.parse_type()?;
				let reg = self.parse_register()?;
				if !reg.is_param || reg.index != num_params {
					self.error(ErrorKind::BadNameReg, fn_line, fn_column, format!("expected parameter register a{num_params}"));
					return Err(());
				}
				params.push(param_type);
				num_params += 1;
				if self.peek_punct(',') {
					self.bump();
					continue;
				}
				break;
			}
		}
		self.expect_punct(')')?;
		let metadata = self.parse_metadata(&["external", "static", "ctor", "cctor"], &[])?;

		let mut function = Function {
			name: name.clone(),
			return_type,
			params,
			body: Vec::new(),
			labels: FxHashMap::default(),
			catch_blocks: Vec::new(),
			metadata,
			first_param_reg: 0,
			num_regs: num_params,
			source_line: fn_line,
		};

		if self.peek_punct('{') {
			self.bump();
			while !self.peek_punct('}') {
				self.parse_body_item(&mut function)?;
			}
			self.bump();
		}
		function.first_param_reg = function.num_regs.saturating_sub(num_params);

		if self.program.functions.insert(name.clone(), function).is_some() {
			self.error(ErrorKind::BadNameId, fn_line, fn_column, format!("function `{name}` declared more than once"));
			return Err(());
		}
		Ok(())
	}

	fn parse_body_item(&mut self, function: &mut Function) -> Result<(), ()> {
		match self.peek().cloned() {
			Some(Token { kind: TokenKind::Directive(Directive::Catch), line, .. }) => {
				self.bump();
				function.catch_blocks.push(self.parse_catch(line, false)?);
				Ok(())
			},
			Some(Token { kind: TokenKind::Directive(Directive::CatchAll), line, .. }) => {
				self.bump();
				function.catch_blocks.push(self.parse_catch(line, true)?);
				Ok(())
			},
			Some(Token { kind: TokenKind::Identifier(name), line, column }) if self.label_follows() => {
				self.bump();
				self.bump(); // `:`
				let entry = function.labels.entry(name.clone()).or_insert((None, Vec::new()));
				if entry.0.is_some() {
					self.error(ErrorKind::BadLabelExt, line, column, format!("label `{name}` redefined in the same function"));
					return Err(());
				}
				entry.0 = Some(function.body.len());
				function.body.push(Instruction { opcode: String::new(), registers: Vec::new(), immediate: None, id: None, label: Some(name), line });
				Ok(())
			},
			Some(_) => self.parse_instruction(function),
			None => Err(()),
		}
	}

	fn label_follows(&self) -> bool {
		matches!(self.tokens.get(self.pos + 1), Some(Token { kind: TokenKind::Punct(':'), .. }))
	}

	fn parse_catch(&mut self, _line: u32, is_catchall: bool) -> Result<CatchBlock, ()> {
		let exception_record = if is_catchall { None } else { Some(self.expect_identifier("an exception record name")?) };
		if !is_catchall {
			self.expect_punct(',')?;
		}
		let try_begin_label = self.expect_identifier("a try-begin label")?;
		self.expect_punct(',')?;
		let try_end_label = self.expect_identifier("a try-end label")?;
		self.expect_punct(',')?;
		let catch_begin_label = self.expect_identifier("a catch-begin label")?;
		let catch_end_label = if self.peek_punct(',') {
			self.bump();
			Some(self.expect_identifier("a catch-end label")?)
		} else {
			None
		};
		Ok(CatchBlock { exception_record, try_begin_label, try_end_label, catch_begin_label, catch_end_label })
	}

	fn parse_instruction(&mut self, function: &mut Function) -> Result<(), ()> {
		let (opcode, line, column) = match self.bump() {
			Some(Token { kind: TokenKind::Identifier(name), line, column }) => (name, line, column),
			_ => {
				self.error(ErrorKind::BadOperationName, 0, 0, "expected an instruction opcode");
				return Err(());
			},
		};
		let Some(spec) = opcodes::lookup(&opcode) else {
			self.error(ErrorKind::BadOperationName, line, column, format!("unknown opcode `{opcode}`"));
			return Err(());
		};

		let mut registers = Vec::new();
		let mut immediate = None;
		let mut id = None;
		// An entity/label operand's resolution depends on the full register
		// list (e.g. a `call.short`'s given argument count), which isn't
		// known until the whole operand list has been walked.
		let mut entity_use = None;
		loop {
			let at_operand_start = matches!(self.peek(), Some(Token { kind: TokenKind::Register(_) | TokenKind::Integer(_) | TokenKind::Float(_) | TokenKind::Identifier(_), .. }));
			if !at_operand_start {
				break;
			}
			match self.peek().cloned() {
				Some(Token { kind: TokenKind::Register(reg), .. }) => {
					self.bump();
					registers.push(RegisterOperand { is_param: reg.is_param, index: reg.index });
				},
				Some(Token { kind: TokenKind::Integer(v), .. }) if spec.imm == ImmKind::Int64 => {
					self.bump();
					immediate = Some(ImmediateOperand::Int(v));
				},
				Some(Token { kind: TokenKind::Float(v), .. }) if spec.imm == ImmKind::Double => {
					self.bump();
					immediate = Some(ImmediateOperand::Double(v.to_bits()));
				},
				Some(Token { kind: TokenKind::Identifier(name), line, column }) if spec.id == IdKind::Label => {
					self.bump();
					id = Some(IdOperand::Label(name.clone()));
					self.pending_uses.push(PendingUse::Label { function: function.name.clone(), label: name.clone(), line, column });
					let entry = function.labels.entry(name).or_insert((None, Vec::new()));
					entry.1.push(function.body.len());
				},
				Some(Token { kind: TokenKind::Identifier(name), line, column }) if spec.id == IdKind::Entity => {
					self.bump();
					// `newobj`/`newarr` expect a plain type name; the array
					// rank is implicit in the opcode, so trailing `[]` here
					// is unusual rather than a syntax error.
					let mut rank = 0u32;
					while self.peek_punct('[') {
						self.bump();
						match self.bump() {
							Some(Token { kind: TokenKind::Punct(']'), .. }) => rank += 1,
							_ => {
								self.error(ErrorKind::BadArrayTypeBound, line, column, "`[` without matching `]`");
								return Err(());
							},
						}
					}
					id = Some(IdOperand::Entity(name.clone()));
					entity_use = Some((name, line, column, rank));
				},
				Some(tok) => {
					let (line, column) = (tok.line, tok.column);
					self.error(ErrorKind::BadOperand, line, column, format!("unexpected operand for `{opcode}`"));
					return Err(());
				},
				None => break,
			}
			if self.peek_punct(',') {
				self.bump();
				continue;
			}
			break;
		}

		if let Some((name, line, column, rank)) = entity_use {
			if opcodes::is_new_family(&opcode) && rank > 0 {
				self.error(ErrorKind::WarUnexpectedTypeId, line, column, format!("`{opcode}` given array type `{name}{}`", "[]".repeat(rank as usize)));
			}
			if opcodes::is_call_family(&opcode) {
				self.pending_uses.push(PendingUse::CallArity {
					function: function.name.clone(),
					opcode: opcode.clone(),
					callee: name,
					given: registers.len(),
					line,
					column,
				});
			} else if opcodes::is_field_family(&opcode) {
				match name.rsplit_once('.') {
					Some((record, field)) => self.pending_uses.push(PendingUse::Field {
						function: function.name.clone(),
						record: record.to_string(),
						field: field.to_string(),
						line,
						column,
					}),
					None => self.error(ErrorKind::BadIdField, line, column, format!("`{name}` is not a `Record.field` reference")),
				}
			} else {
				self.pending_uses.push(PendingUse::Record { function: function.name.clone(), name, line, column });
			}
		}

		if registers.len() > spec.max_registers as usize {
			self.error(ErrorKind::BadNumberOperands, line, column, format!("`{opcode}` accepts at most {} register operand(s)", spec.max_registers));
			return Err(());
		}
		let width_limit = 1u16 << spec.register_width;
		if let Some(reg) = registers.iter().find(|r| r.index >= width_limit) {
			self.error(ErrorKind::BadRegisterWidth, line, column, format!("`{opcode}` register index {} exceeds the {}-bit width declared for this opcode", reg.index, spec.register_width));
			return Err(());
		}
		function.num_regs = function.num_regs.max(registers.iter().filter(|r| !r.is_param).map(|r| r.index + 1).max().unwrap_or(0));

		function.body.push(Instruction { opcode, registers, immediate, id, label: None, line });
		Ok(())
	}

	fn resolve_pending_uses(&mut self) {
		for pending in std::mem::take(&mut self.pending_uses) {
			match pending {
				PendingUse::Record { name, line, column, .. } => {
					if !self.program.records.contains_key(&name) {
						self.error(ErrorKind::BadIdRecord, line, column, format!("undeclared record `{name}`"));
						return;
					}
				},
				PendingUse::Field { record, field, line, column, .. } => {
					let found = self.program.records.get(&record).map(|r| r.fields.iter().any(|f| f.name == field)).unwrap_or(false);
					if !found {
						self.error(ErrorKind::BadIdField, line, column, format!("record `{record}` has no field `{field}`"));
						return;
					}
				},
				PendingUse::Label { function, label, line, column } => {
					let defined = self.program.functions.get(&function).map(|f| f.labels.get(&label).map(|(def, _)| def.is_some()).unwrap_or(false)).unwrap_or(false);
					if !defined {
						self.error(ErrorKind::BadLabel, line, column, format!("label `{label}` is never defined in `{function}`"));
						return;
					}
				},
				PendingUse::CallArity { opcode, callee, given, line, column, .. } => {
					let is_short_form = opcode.ends_with(".short");
					if let Some(target) = self.program.functions.get(&callee) {
						if is_short_form && target.params.len() != given {
							self.error(ErrorKind::FunctionArgumentMismatch, line, column, format!("`{callee}` expects {} argument(s), {given} given", target.params.len()));
							return;
						}
					} else {
						self.error(ErrorKind::BadIdFunction, line, column, format!("undeclared function `{callee}`"));
						return;
					}
				},
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::assembler::lexer::Lexer;

	fn parse(source: &str) -> (Program, Diagnostics) {
		let tokens = Lexer::new().tokenize(source).unwrap();
		Parser::new(tokens).parse()
	}

	#[test]
	fn parses_language_directive() {
		let (program, diags) = parse(".language PandaAssembly");
		assert!(!diags.has_error());
		assert_eq!(program.language, Some(Language::PandaAssembly));
	}

	#[test]
	fn parses_simple_record_with_fields() {
		let (program, diags) = parse(".record Point { i32 x i32 y }");
		assert!(!diags.has_error());
		let record = &program.records["Point"];
		assert_eq!(record.fields.len(), 2);
		assert_eq!(record.fields[0].name, "x");
	}

	#[test]
	fn duplicate_field_name_is_an_error() {
		let (_, diags) = parse(".record Point { i32 x i32 x }");
		assert_eq!(diags.error.unwrap().kind, ErrorKind::RepeatingFieldName);
	}

	#[test]
	fn parses_function_with_instructions() {
		let (program, diags) = parse(".function i32 main() { mov v0, v1\nreturn }");
		assert!(!diags.has_error(), "{:?}", diags.error);
		let function = &program.functions["main"];
		assert_eq!(function.body.len(), 2);
		assert_eq!(function.body[0].opcode, "mov");
	}

	#[test]
	fn label_used_before_definition_is_legal() {
		let (program, diags) = parse(".function void main() {\njmp L1\nL1:\nreturn.void\n}");
		assert!(!diags.has_error(), "{:?}", diags.error);
		let function = &program.functions["main"];
		assert!(function.labels.contains_key("L1"));
	}

	#[test]
	fn undefined_label_is_an_error() {
		let (_, diags) = parse(".function void main() {\njmp L1\nreturn.void\n}");
		assert_eq!(diags.error.unwrap().kind, ErrorKind::BadLabel);
	}

	#[test]
	fn relabeling_in_same_function_is_an_error() {
		let (_, diags) = parse(".function void main() {\nL1:\nL1:\nreturn.void\n}");
		assert_eq!(diags.error.unwrap().kind, ErrorKind::BadLabelExt);
	}

	#[test]
	fn unknown_opcode_is_an_error() {
		let (_, diags) = parse(".function void main() {\nbogus.op v0\n}");
		assert_eq!(diags.error.unwrap().kind, ErrorKind::BadOperationName);
	}

	#[test]
	fn too_many_registers_is_an_error() {
		let (_, diags) = parse(".function void main() {\nmov v0, v1, v2\n}");
		assert_eq!(diags.error.unwrap().kind, ErrorKind::BadNumberOperands);
	}

	#[test]
	fn unknown_metadata_attribute_is_an_error() {
		let (_, diags) = parse(".record Foo <bogus> { }");
		assert_eq!(diags.error.unwrap().kind, ErrorKind::BadMetadataUnknownAttribute);
	}

	#[test]
	fn field_access_resolves_against_declared_record() {
		let (_, diags) = parse(".record Point { i32 x }\n.function void main() {\nldobj v0, Point.x\nreturn.void\n}");
		assert!(!diags.has_error(), "{:?}", diags.error);
	}

	#[test]
	fn field_access_to_undeclared_field_is_an_error() {
		let (_, diags) = parse(".record Point { i32 x }\n.function void main() {\nldobj v0, Point.y\nreturn.void\n}");
		assert_eq!(diags.error.unwrap().kind, ErrorKind::BadIdField);
	}

	#[test]
	fn short_call_arity_mismatch_is_an_error() {
		let source = ".function void callee(i32 a0) { return.void }\n.function void main() { call.short callee\nreturn.void }";
		let (_, diags) = parse(source);
		assert_eq!(diags.error.unwrap().kind, ErrorKind::FunctionArgumentMismatch);
	}

	#[test]
	fn short_call_with_matching_arity_is_accepted() {
		let source = ".function void callee(i32 a0) { return.void }\n.function void main() { call.short callee, v0\nreturn.void }";
		let (_, diags) = parse(source);
		assert!(!diags.has_error(), "{:?}", diags.error);
	}

	#[test]
	fn newobj_given_an_array_type_warns_without_halting() {
		let (_, diags) = parse(".record Point { }\n.function void main() {\nnewobj v0, Point[]\nreturn.void\n}");
		assert!(!diags.has_error(), "{:?}", diags.error);
		assert_eq!(diags.warnings.len(), 1);
		assert_eq!(diags.warnings[0].kind, ErrorKind::WarUnexpectedTypeId);
	}

	#[test]
	fn newobj_given_a_plain_type_does_not_warn() {
		let (_, diags) = parse(".record Point { }\n.function void main() {\nnewobj v0, Point\nreturn.void\n}");
		assert!(!diags.has_error(), "{:?}", diags.error);
		assert!(diags.warnings.is_empty());
	}

	#[test]
	fn register_index_beyond_the_declared_width_is_an_error() {
		let source = ".function void callee() { return.void }\n.function void main() { call.short callee, v16\nreturn.void }";
		let (_, diags) = parse(source);
		assert_eq!(diags.error.unwrap().kind, ErrorKind::BadRegisterWidth);
	}

	#[test]
	fn register_index_within_the_declared_width_is_accepted() {
		let source = ".function void callee() { return.void }\n.function void main() { call.short callee, v15\nreturn.void }";
		let (_, diags) = parse(source);
		assert!(!diags.has_error(), "{:?}", diags.error);
	}
}
