use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	None,
	BadLabel,
	BadLabelExt,
	BadNameReg,
	BadNameId,
	BadIntegerName,
	BadNumberOperands,
	BadRegisterWidth,
	BadOperationName,
	BadOperand,
	BadFieldMissingName,
	BadMetadataBound,
	BadMetadataUnknownAttribute,
	BadMetadataUnexpectedValue,
	BadMetadataMultipleAttribute,
	BadMetadataInvalidValue,
	BadStringUnknownEscapeSequence,
	BadStringInvalidHexEscapeSequence,
	BadArrayTypeBound,
	BadIdRecord,
	BadIdField,
	BadIdFunction,
	BadRecordName,
	BadDirectiveDeclaration,
	IncorrectDirectiveLocation,
	MultipleDirectives,
	UnknownLanguage,
	FunctionArgumentMismatch,
	RepeatingFieldName,
	/// Warning: a type id was used somewhere an array type is unusual, e.g.
	/// `newobj` given an array type.
	WarUnexpectedTypeId,
}

impl ErrorKind {
	pub fn is_warning(self) -> bool {
		matches!(self, ErrorKind::WarUnexpectedTypeId)
	}
}

#[derive(Debug, Clone, Error)]
#[error("{kind:?} at {line}:{column}: {message}")]
pub struct Diagnostic {
	pub kind: ErrorKind,
	pub line: u32,
	pub column: u32,
	pub message: String,
}

impl Diagnostic {
	pub fn new(kind: ErrorKind, line: u32, column: u32, message: impl Into<String>) -> Self {
		Self { kind, line, column, message: message.into() }
	}

	pub fn is_warning(&self) -> bool {
		self.kind.is_warning()
	}
}

/// Errors halt parsing at the first occurrence; warnings accumulate
/// alongside a successful [`crate::assembler::Program`].
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
	pub warnings: Vec<Diagnostic>,
	pub error: Option<Diagnostic>,
}

impl Diagnostics {
	pub fn push(&mut self, diagnostic: Diagnostic) {
		if diagnostic.is_warning() {
			self.warnings.push(diagnostic);
		} else if self.error.is_none() {
			self.error = Some(diagnostic);
		}
	}

	pub fn has_error(&self) -> bool {
		self.error.is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_hard_error_wins_but_warnings_accumulate() {
		let mut diags = Diagnostics::default();
		diags.push(Diagnostic::new(ErrorKind::WarUnexpectedTypeId, 1, 1, "w1"));
		diags.push(Diagnostic::new(ErrorKind::BadLabel, 2, 1, "first error"));
		diags.push(Diagnostic::new(ErrorKind::BadOperand, 3, 1, "second error ignored"));
		assert_eq!(diags.warnings.len(), 1);
		assert_eq!(diags.error.unwrap().kind, ErrorKind::BadLabel);
	}
}
