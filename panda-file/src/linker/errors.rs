use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
	#[error("class not found: {0}")]
	ClassNotFound(String),
	#[error("method not found: {class}::{method}")]
	MethodNotFound { class: String, method: String },
	#[error("field not found: {class}::{field}")]
	FieldNotFound { class: String, field: String },
	#[error("class circularity involving {0}")]
	ClassCircularity(String),
	#[error("no class definition for {0}")]
	NoClassDef(String),
	#[error("incompatible class change for {0}")]
	IncompatibleClassChange(String),
}
