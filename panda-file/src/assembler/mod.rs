//! A text assembler for the bytecode format: lexer, single-pass parser with
//! two-pass id resolution, and the in-memory [`program::Program`] model it
//! builds. Does not itself lower a [`Program`](program::Program) to the
//! binary container; that's [`crate::binary`]'s job once a program has been
//! assembled and its ids resolved.

pub mod errors;
pub mod lexer;
pub mod opcodes;
pub mod parser;
pub mod program;
pub mod token;

pub use errors::{Diagnostic, Diagnostics, ErrorKind};
pub use parser::Parser;
pub use program::Program;

/// Lexes and parses `source` in one call, returning the assembled program
/// alongside any diagnostics (a successful [`Program`] may still carry
/// warnings).
pub fn assemble(source: &str) -> (Option<Program>, Diagnostics) {
	let mut lexer = lexer::Lexer::new();
	let tokens = match lexer.tokenize(source) {
		Ok(tokens) => tokens,
		Err(diagnostic) => {
			let mut diagnostics = Diagnostics::default();
			diagnostics.push(diagnostic);
			return (None, diagnostics);
		},
	};
	let (program, diagnostics) = Parser::new(tokens).parse();
	if diagnostics.has_error() { (None, diagnostics) } else { (Some(program), diagnostics) }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn assembles_a_well_formed_program() {
		let (program, diagnostics) = assemble(".function void main() {\nreturn.void\n}");
		assert!(!diagnostics.has_error());
		assert!(program.unwrap().functions.contains_key("main"));
	}

	#[test]
	fn lexer_errors_short_circuit_before_parsing() {
		let (program, diagnostics) = assemble(".bogus");
		assert!(program.is_none());
		assert!(diagnostics.has_error());
	}
}
