use std::fmt::Debug;

use crate::linker::class::Class;
use crate::linker::errors::Error;

/// Interface, vtable and imtable entries are opaque to the linker: it only
/// consumes sizes and orderings an extension hands back.
#[derive(Debug, Clone, Default)]
pub struct VTableInfo {
	pub size: u32,
	pub num_virtual_methods: u32,
	pub copied_methods: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ITableInfo {
	pub entries: Vec<(String, u32)>,
}

#[derive(Debug, Clone, Default)]
pub struct IMTableInfo {
	pub size: u32,
}

/// Per-language hook the linker calls into at each stage of class
/// resolution; everything about method dispatch layout is opaque beyond
/// the sizes and orderings these methods report.
pub trait LanguageExtension: Debug {
	fn create_class(&self, descriptor: &str) -> Class {
		Class::new_bare(descriptor)
	}

	fn initialize_class(&self, class: &mut Class) -> Result<(), Error>;

	fn build_vtable(&self, class: &Class, base: Option<&Class>, interfaces: &[&Class]) -> VTableInfo;

	fn build_itable(&self, class: &Class, vtable: &VTableInfo) -> ITableInfo;

	fn build_imtable(&self, class: &Class, itable: &ITableInfo) -> IMTableInfo;

	fn handle_error(&self, error: &Error) {
		let _ = error;
	}

	#[allow(clippy::too_many_arguments)]
	fn class_size(&self, vtable_size: u32, imt_size: u32, n8: u32, n16: u32, n32: u32, n64: u32, nref: u32, ntagged: u32) -> u32;
}
