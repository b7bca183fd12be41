use nohash_hasher::IntMap;

use crate::bitset::AddressMap;

/// Marks every address that begins an instruction.
#[derive(Debug, Clone)]
pub struct InstructionsMap {
	marks: AddressMap,
}

impl InstructionsMap {
	pub fn new(start: usize, end: usize) -> Self {
		Self { marks: AddressMap::new(start, end) }
	}

	pub fn mark_instruction(&mut self, address: usize) {
		self.marks.mark(address);
	}

	pub fn is_instruction_start(&self, address: usize) -> bool {
		self.marks.has_mark(address)
	}
}

/// Marks addresses that are jump targets, and separately records every
/// jump site's target so `targets`/`jumps_to` can answer both directions.
#[derive(Debug, Clone)]
pub struct JumpsMap {
	targets_mark: AddressMap,
	jumps: IntMap<usize, Vec<usize>>,
}

impl JumpsMap {
	pub fn new(start: usize, end: usize) -> Self {
		Self { targets_mark: AddressMap::new(start, end), jumps: IntMap::default() }
	}

	pub fn add_jump(&mut self, from: usize, to: usize) {
		self.targets_mark.mark(to);
		self.jumps.entry(from).or_default().push(to);
	}

	pub fn is_target(&self, address: usize) -> bool {
		self.targets_mark.has_mark(address)
	}

	/// Every jump target in ascending order, deduplicated.
	pub fn targets(&self) -> Vec<usize> {
		let mut out = Vec::new();
		self.targets_mark.enumerate_marks(|addr| {
			out.push(addr);
			true
		});
		out
	}

	/// Every address a jump at `from` can land on, in insertion order.
	pub fn jumps_to(&self, from: usize) -> &[usize] {
		self.jumps.get(&from).map(|v| v.as_slice()).unwrap_or(&[])
	}
}

/// Marks the instructions that lie inside a catch handler's try region, one
/// map per handler.
#[derive(Debug, Clone)]
pub struct ExceptionSourceMap {
	start: usize,
	end: usize,
	handlers: Vec<AddressMap>,
}

impl ExceptionSourceMap {
	pub fn new(start: usize, end: usize) -> Self {
		Self { start, end, handlers: Vec::new() }
	}

	/// Registers a handler whose try region is `[try_start, try_end]`;
	/// returns the handler's index.
	pub fn add_handler(&mut self, try_start: usize, try_end: usize) -> usize {
		let mut map = AddressMap::new(self.start, self.end);
		map.mark_range(try_start, try_end);
		self.handlers.push(map);
		self.handlers.len() - 1
	}

	pub fn is_covered_by(&self, handler: usize, address: usize) -> bool {
		self.handlers[handler].has_mark(address)
	}

	/// Every instruction address covered by `handler`'s try region.
	pub fn instructions_covered_by(&self, handler: usize) -> Vec<usize> {
		let mut out = Vec::new();
		self.handlers[handler].enumerate_marks(|addr| {
			out.push(addr);
			true
		});
		out
	}
}

/// Per-method control-flow summary: where instructions start, where jumps
/// land, and which handler covers which instruction.
pub struct FlowInfo {
	pub instructions: InstructionsMap,
	pub jumps: JumpsMap,
	pub exceptions: ExceptionSourceMap,
}

impl FlowInfo {
	pub fn new(start: usize, end: usize) -> Self {
		Self {
			instructions: InstructionsMap::new(start, end),
			jumps: JumpsMap::new(start, end),
			exceptions: ExceptionSourceMap::new(start, end),
		}
	}

	/// A jump is legal only if every address it can reach is a marked
	/// instruction start; landing mid-instruction is the defining verifier
	/// error this map exists to catch.
	pub fn can_jump_to(&self, target: usize) -> bool {
		self.instructions.is_instruction_start(target)
	}

	pub fn targets(&self) -> Vec<usize> {
		self.jumps.targets()
	}

	pub fn jumps_to(&self, from: usize) -> &[usize] {
		self.jumps.jumps_to(from)
	}

	/// True if some jump target in this method does not land on a marked
	/// instruction start.
	pub fn has_illegal_jump(&self) -> bool {
		self.jumps.targets().into_iter().any(|target| !self.can_jump_to(target))
	}

	pub fn instructions_covered_by(&self, handler: usize) -> Vec<usize> {
		self.exceptions.instructions_covered_by(handler)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn instruction_starts_are_tracked() {
		let mut map = InstructionsMap::new(0, 99);
		map.mark_instruction(0);
		map.mark_instruction(4);
		assert!(map.is_instruction_start(4));
		assert!(!map.is_instruction_start(2));
	}

	#[test]
	fn jumps_map_tracks_targets_and_sources() {
		let mut jumps = JumpsMap::new(0, 99);
		jumps.add_jump(10, 50);
		jumps.add_jump(10, 60);
		jumps.add_jump(20, 50);
		assert_eq!(jumps.targets(), vec![50, 60]);
		assert_eq!(jumps.jumps_to(10), &[50, 60]);
		assert_eq!(jumps.jumps_to(20), &[50]);
		assert!(jumps.is_target(50));
		assert!(!jumps.is_target(10));
	}

	#[test]
	fn flow_info_detects_a_jump_into_the_middle_of_an_instruction() {
		let mut flow = FlowInfo::new(0, 99);
		flow.instructions.mark_instruction(0);
		flow.instructions.mark_instruction(4);
		flow.instructions.mark_instruction(8);
		flow.jumps.add_jump(0, 4);
		assert!(!flow.has_illegal_jump());

		flow.jumps.add_jump(4, 6); // 6 is mid-instruction
		assert!(flow.has_illegal_jump());
		assert!(!flow.can_jump_to(6));
	}

	#[test]
	fn exception_source_map_reports_instructions_in_a_try_region() {
		let mut exceptions = ExceptionSourceMap::new(0, 99);
		let handler = exceptions.add_handler(10, 30);
		assert!(exceptions.is_covered_by(handler, 10));
		assert!(exceptions.is_covered_by(handler, 30));
		assert!(!exceptions.is_covered_by(handler, 31));
		let covered = exceptions.instructions_covered_by(handler);
		assert_eq!(covered.first(), Some(&10));
		assert_eq!(covered.last(), Some(&30));
		assert_eq!(covered.len(), 21);
	}

	#[test]
	fn flow_info_exposes_per_handler_coverage() {
		let mut flow = FlowInfo::new(0, 99);
		let handler = flow.exceptions.add_handler(0, 99);
		flow.instructions.mark_instruction(0);
		flow.instructions.mark_instruction(50);
		// instructions_covered_by walks the handler's AddressMap, which only
		// has marks where add_handler's mark_range set them, independent of
		// InstructionsMap; covering the whole range marks every address, not
		// just instruction starts, so callers intersect with is_instruction_start.
		let covered = flow.instructions_covered_by(handler);
		assert!(covered.contains(&0));
		assert!(covered.iter().all(|&addr| addr <= 99));
	}
}
