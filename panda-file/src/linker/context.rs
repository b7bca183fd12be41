use std::cell::RefCell;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use fxhash::{FxHashMap, FxHashSet};

use crate::linker::class::{Class, ClassState};
use crate::linker::errors::Error;
use crate::linker::extension::LanguageExtension;
use crate::linker::layout::{self, FieldRecord, SizeClass};

thread_local! {
	/// Keyed by `(context identity, descriptor)` rather than the original's
	/// `(file hash, class id)`: this port resolves against an abstract
	/// [`ClassDefSource`], not a concrete panda file, so there's no file
	/// hash to key on.
	static RESOLVING: RefCell<FxHashSet<(usize, String)>> = RefCell::new(FxHashSet::default());
}

/// A field record plus the one piece of information the layout pass needs
/// beyond [`FieldRecord`]: whether it belongs to the static or instance set.
#[derive(Debug, Clone)]
pub struct ClassFieldDef {
	pub name: String,
	pub size_class: SizeClass,
	pub is_volatile: bool,
	pub is_static: bool,
}

#[derive(Debug, Clone)]
pub struct RawClassDef {
	pub descriptor: String,
	pub super_descriptor: Option<String>,
	pub interface_descriptors: Vec<String>,
	pub fields: Vec<ClassFieldDef>,
	pub methods: Vec<String>,
}

/// Source of class definitions a context resolves against; a panda file's
/// accessors are the natural implementor, but the linker itself only needs
/// this much.
pub trait ClassDefSource: Debug {
	fn lookup(&self, descriptor: &str) -> Option<RawClassDef>;
}

/// A boot context plus any number of child contexts, each owning its own
/// class-lookup table guarded for concurrent resolution.
pub struct ClassLinkerContext {
	language: &'static str,
	parent: Option<Arc<ClassLinkerContext>>,
	classes: RwLock<FxHashMap<String, Arc<Class>>>,
}

impl Debug for ClassLinkerContext {
	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		fmt.debug_struct("ClassLinkerContext").field("language", &self.language).field("has_parent", &self.parent.is_some()).finish()
	}
}

impl ClassLinkerContext {
	pub fn boot(language: &'static str) -> Arc<Self> {
		Arc::new(Self { language, parent: None, classes: RwLock::new(FxHashMap::default()) })
	}

	pub fn child(parent: &Arc<Self>) -> Arc<Self> {
		Arc::new(Self { language: parent.language, parent: Some(parent.clone()), classes: RwLock::new(FxHashMap::default()) })
	}

	/// Walks up the context chain until the descriptor is found or the
	/// chain is exhausted.
	pub fn find_loaded_class(&self, descriptor: &str) -> Option<Arc<Class>> {
		if let Some(class) = self.classes.read().unwrap().get(descriptor) {
			return Some(class.clone());
		}
		self.parent.as_ref().and_then(|p| p.find_loaded_class(descriptor))
	}

	/// Compare-and-swap insert: if another thread already published the
	/// same descriptor, the caller's class is dropped and the winner is
	/// returned.
	pub fn insert_class(&self, class: Class) -> Arc<Class> {
		let descriptor = class.descriptor.clone();
		let mut classes = self.classes.write().unwrap();
		if let Some(existing) = classes.get(&descriptor) {
			return existing.clone();
		}
		let class = Arc::new(class);
		classes.insert(descriptor, class.clone());
		class
	}

	fn identity(&self) -> usize {
		self as *const Self as usize
	}
}

struct ResolvingGuard {
	key: (usize, String),
}

impl Drop for ResolvingGuard {
	fn drop(&mut self) {
		RESOLVING.with(|set| {
			set.borrow_mut().remove(&self.key);
		});
	}
}

fn enter_resolving(context: &Arc<ClassLinkerContext>, descriptor: &str) -> Result<ResolvingGuard, Error> {
	let key = (context.identity(), descriptor.to_string());
	let already_resolving = RESOLVING.with(|set| !set.borrow_mut().insert(key.clone()));
	if already_resolving {
		return Err(Error::ClassCircularity(descriptor.to_string()));
	}
	Ok(ResolvingGuard { key })
}

#[derive(derivative::Derivative)]
#[derivative(Debug)]
pub struct ClassLinker {
	#[derivative(Debug = "ignore")]
	extension: Box<dyn LanguageExtension + Send + Sync>,
}

impl ClassLinker {
	pub fn new(extension: Box<dyn LanguageExtension + Send + Sync>) -> Self {
		Self { extension }
	}

	/// Implements the resolution pipeline in full: cache check, array
	/// recursion, circularity-guarded load, base/interface resolution,
	/// extension-computed layout, then publication.
	pub fn resolve_class(&self, descriptor: &str, context: &Arc<ClassLinkerContext>, source: &dyn ClassDefSource) -> Result<Arc<Class>, Error> {
		if let Some(class) = context.find_loaded_class(descriptor) {
			return Ok(class);
		}

		if let Some(component_descriptor) = descriptor.strip_prefix('[') {
			if component_descriptor.is_empty() || component_descriptor == "V" {
				return Err(Error::NoClassDef(descriptor.to_string()));
			}
			let component = self.resolve_class(component_descriptor, context, source)?;
			let array_class = self.create_array_class(descriptor, component);
			return Ok(context.insert_class(array_class));
		}

		let _guard = enter_resolving(context, descriptor)?;

		let def = source.lookup(descriptor).ok_or_else(|| Error::ClassNotFound(descriptor.to_string()))?;

		let super_class = match &def.super_descriptor {
			Some(sup) => Some(self.resolve_class(sup, context, source)?),
			None => None,
		};
		let mut interfaces = Vec::new();
		for iface in &def.interface_descriptors {
			interfaces.push(self.resolve_class(iface, context, source)?);
		}

		let mut class = self.extension.create_class(descriptor);
		class.super_class = super_class.clone();
		class.interfaces = interfaces.clone();

		let interface_refs: Vec<&Class> = interfaces.iter().map(|c| c.as_ref()).collect();
		let vtable = self.extension.build_vtable(&class, super_class.as_deref(), &interface_refs);
		let itable = self.extension.build_itable(&class, &vtable);
		let imtable = self.extension.build_imtable(&class, &itable);
		class.vtable_size = vtable.size + imtable.size;

		self.link_fields(&mut class, &def.fields, super_class.as_deref());
		self.link_methods(&mut class, &def.methods, &vtable.copied_methods);

		self.extension.initialize_class(&mut class)?;
		class.state = ClassState::Initialized;

		Ok(context.insert_class(class))
	}

	fn link_fields(&self, class: &mut Class, fields: &[ClassFieldDef], base: Option<&Class>) {
		let instance_records: Vec<FieldRecord> =
			fields.iter().filter(|f| !f.is_static).map(|f| FieldRecord { name: f.name.clone(), size_class: f.size_class, is_volatile: f.is_volatile }).collect();
		let static_records: Vec<FieldRecord> =
			fields.iter().filter(|f| f.is_static).map(|f| FieldRecord { name: f.name.clone(), size_class: f.size_class, is_volatile: f.is_volatile }).collect();

		let instance_base = base.map(|b| b.instance_size).unwrap_or(0);
		let (instance_offsets, instance_size) = layout::layout_fields(&instance_records, instance_base);
		let (static_offsets, static_size) = layout::layout_fields(&static_records, 0);

		class.instance_fields =
			instance_offsets.into_iter().map(|(name, offset)| crate::linker::class::Field { name, offset, is_static: false }).collect();
		class.static_fields = static_offsets.into_iter().map(|(name, offset)| crate::linker::class::Field { name, offset, is_static: true }).collect();
		class.instance_size = instance_size;
		class.static_area_size = static_size;
	}

	fn link_methods(&self, class: &mut Class, methods: &[String], copied: &[String]) {
		class.methods = methods
			.iter()
			.enumerate()
			.map(|(i, name)| crate::linker::class::Method { name: name.clone(), vtable_index: Some(i as u32), is_copied: false })
			.chain(copied.iter().map(|name| crate::linker::class::Method { name: name.clone(), vtable_index: None, is_copied: true }))
			.collect();
	}

	fn create_array_class(&self, descriptor: &str, component: Arc<Class>) -> Class {
		let mut class = Class::new_bare(descriptor);
		class.component = Some(component);
		class.state = ClassState::Initialized;
		class
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap as StdHashMap;

	#[derive(Debug, Default)]
	struct NoopExtension;

	impl LanguageExtension for NoopExtension {
		fn initialize_class(&self, _class: &mut Class) -> Result<(), Error> {
			Ok(())
		}

		fn build_vtable(&self, _class: &Class, _base: Option<&Class>, _interfaces: &[&Class]) -> crate::linker::extension::VTableInfo {
			Default::default()
		}

		fn build_itable(&self, _class: &Class, _vtable: &crate::linker::extension::VTableInfo) -> crate::linker::extension::ITableInfo {
			Default::default()
		}

		fn build_imtable(&self, _class: &Class, _itable: &crate::linker::extension::ITableInfo) -> crate::linker::extension::IMTableInfo {
			Default::default()
		}

		fn class_size(&self, _v: u32, _i: u32, _n8: u32, _n16: u32, _n32: u32, _n64: u32, _nref: u32, _nt: u32) -> u32 {
			0
		}
	}

	#[derive(Debug, Default)]
	struct MapSource(StdHashMap<String, RawClassDef>);

	impl ClassDefSource for MapSource {
		fn lookup(&self, descriptor: &str) -> Option<RawClassDef> {
			self.0.get(descriptor).cloned()
		}
	}

	fn def(descriptor: &str, super_descriptor: Option<&str>) -> RawClassDef {
		RawClassDef { descriptor: descriptor.to_string(), super_descriptor: super_descriptor.map(String::from), interface_descriptors: Vec::new(), fields: Vec::new(), methods: Vec::new() }
	}

	#[test]
	fn resolves_a_simple_class_and_caches_it() {
		let linker = ClassLinker::new(Box::new(NoopExtension));
		let context = ClassLinkerContext::boot("test");
		let mut source = MapSource::default();
		source.0.insert("LFoo;".into(), def("LFoo;", None));

		let class = linker.resolve_class("LFoo;", &context, &source).unwrap();
		assert_eq!(class.descriptor, "LFoo;");
		assert!(context.find_loaded_class("LFoo;").is_some());
	}

	#[test]
	fn resolves_base_class_chain() {
		let linker = ClassLinker::new(Box::new(NoopExtension));
		let context = ClassLinkerContext::boot("test");
		let mut source = MapSource::default();
		source.0.insert("LBase;".into(), def("LBase;", None));
		source.0.insert("LChild;".into(), def("LChild;", Some("LBase;")));

		let class = linker.resolve_class("LChild;", &context, &source).unwrap();
		assert_eq!(class.super_class.as_ref().unwrap().descriptor, "LBase;");
	}

	#[test]
	fn missing_class_is_not_found() {
		let linker = ClassLinker::new(Box::new(NoopExtension));
		let context = ClassLinkerContext::boot("test");
		let source = MapSource::default();
		let err = linker.resolve_class("LMissing;", &context, &source).unwrap_err();
		assert!(matches!(err, Error::ClassNotFound(_)));
	}

	#[test]
	fn direct_self_inheritance_is_circular() {
		let linker = ClassLinker::new(Box::new(NoopExtension));
		let context = ClassLinkerContext::boot("test");
		let mut source = MapSource::default();
		source.0.insert("LLoop;".into(), def("LLoop;", Some("LLoop;")));
		let err = linker.resolve_class("LLoop;", &context, &source).unwrap_err();
		assert!(matches!(err, Error::ClassCircularity(_)));
	}

	#[test]
	fn array_class_resolves_its_component_first() {
		let linker = ClassLinker::new(Box::new(NoopExtension));
		let context = ClassLinkerContext::boot("test");
		let mut source = MapSource::default();
		source.0.insert("LElem;".into(), def("LElem;", None));

		let array = linker.resolve_class("[LElem;", &context, &source).unwrap();
		assert!(array.is_array());
		assert_eq!(array.component.as_ref().unwrap().descriptor, "LElem;");
	}

	#[test]
	fn child_context_falls_back_to_boot_context() {
		let linker = ClassLinker::new(Box::new(NoopExtension));
		let boot = ClassLinkerContext::boot("test");
		let mut source = MapSource::default();
		source.0.insert("LShared;".into(), def("LShared;", None));
		linker.resolve_class("LShared;", &boot, &source).unwrap();

		let child = ClassLinkerContext::child(&boot);
		assert!(child.find_loaded_class("LShared;").is_some());
	}

	#[test]
	fn concurrent_insert_keeps_the_first_winner() {
		let context = ClassLinkerContext::boot("test");
		let a = context.insert_class(Class::new_bare("LRace;"));
		let b = context.insert_class(Class::new_bare("LRace;"));
		assert!(Arc::ptr_eq(&a, &b));
	}
}
