use std::sync::Arc;

use crate::linker::layout::FieldOffset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassState {
	Loaded,
	Initializing,
	Initialized,
	Erroneous,
}

#[derive(Debug, Clone)]
pub struct Method {
	pub name: String,
	pub vtable_index: Option<u32>,
	pub is_copied: bool,
}

#[derive(Debug, Clone)]
pub struct Field {
	pub name: String,
	pub offset: FieldOffset,
	pub is_static: bool,
}

/// What a [`crate::linker::extension::LanguageExtension`] computes for a
/// class being resolved: sizes and orderings the linker itself treats as
/// opaque.
#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
	pub instance_size: u32,
	pub static_area_size: u32,
	pub num_static_fields: u32,
	pub vtable_size: u32,
	pub num_virtual_methods: u32,
	pub copied_methods: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Class {
	pub descriptor: String,
	pub super_class: Option<Arc<Class>>,
	pub interfaces: Vec<Arc<Class>>,
	pub instance_fields: Vec<Field>,
	pub static_fields: Vec<Field>,
	pub instance_size: u32,
	pub static_area_size: u32,
	pub methods: Vec<Method>,
	pub vtable_size: u32,
	pub state: ClassState,
	pub component: Option<Arc<Class>>,
}

impl Class {
	pub fn new_bare(descriptor: impl Into<String>) -> Self {
		Self {
			descriptor: descriptor.into(),
			super_class: None,
			interfaces: Vec::new(),
			instance_fields: Vec::new(),
			static_fields: Vec::new(),
			instance_size: 0,
			static_area_size: 0,
			methods: Vec::new(),
			vtable_size: 0,
			state: ClassState::Loaded,
			component: None,
		}
	}

	pub fn is_array(&self) -> bool {
		self.descriptor.starts_with('[')
	}

	/// A snapshot of the sizes and counts a dump tool or debugger would
	/// want without walking the field/method vectors itself.
	pub fn info(&self) -> ClassInfo {
		ClassInfo {
			instance_size: self.instance_size,
			static_area_size: self.static_area_size,
			num_static_fields: self.static_fields.len() as u32,
			vtable_size: self.vtable_size,
			num_virtual_methods: self.methods.iter().filter(|m| m.vtable_index.is_some()).count() as u32,
			copied_methods: self.methods.iter().filter(|m| m.is_copied).map(|m| m.name.clone()).collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn info_summarizes_fields_and_methods() {
		let mut class = Class::new_bare("LFoo;");
		class.instance_size = 16;
		class.static_fields.push(Field { name: "s".into(), offset: FieldOffset { offset: 0, size_class: crate::linker::layout::SizeClass::Bits32 }, is_static: true });
		class.methods.push(Method { name: "m".into(), vtable_index: Some(0), is_copied: false });
		class.methods.push(Method { name: "copied".into(), vtable_index: None, is_copied: true });

		let info = class.info();
		assert_eq!(info.instance_size, 16);
		assert_eq!(info.num_static_fields, 1);
		assert_eq!(info.num_virtual_methods, 1);
		assert_eq!(info.copied_methods, vec!["copied".to_string()]);
	}
}
