use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
	Object,
	HumongousObject,
	Internal,
	Code,
	Compiler,
}

const SPACE_COUNT: usize = 5;

fn space_index(space: Space) -> usize {
	match space {
		Space::Object => 0,
		Space::HumongousObject => 1,
		Space::Internal => 2,
		Space::Code => 3,
		Space::Compiler => 4,
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GcPhase {
	Idle,
	Running,
	CollectRoots,
	InitialMark,
	Mark,
	MarkYoung,
	Remark,
	CollectYoungAndMove,
	SweepStringTable,
	SweepStringTableYoung,
	Sweep,
	Cleanup,
}

impl GcPhase {
	pub fn is_marking(self) -> bool {
		matches!(self, GcPhase::MarkYoung | GcPhase::Mark | GcPhase::InitialMark | GcPhase::Remark)
	}
}

const GC_PHASE_COUNT: usize = 12;

fn phase_index(phase: GcPhase) -> usize {
	match phase {
		GcPhase::Idle => 0,
		GcPhase::Running => 1,
		GcPhase::CollectRoots => 2,
		GcPhase::InitialMark => 3,
		GcPhase::Mark => 4,
		GcPhase::MarkYoung => 5,
		GcPhase::Remark => 6,
		GcPhase::CollectYoungAndMove => 7,
		GcPhase::SweepStringTable => 8,
		GcPhase::SweepStringTableYoung => 9,
		GcPhase::Sweep => 10,
		GcPhase::Cleanup => 11,
	}
}

#[derive(Debug, Default)]
struct SpaceCounters {
	bytes_allocated: AtomicU64,
	bytes_freed: AtomicU64,
	bytes_moved: AtomicU64,
	peak_footprint: AtomicU64,
	objects_allocated: AtomicU64,
	objects_freed: AtomicU64,
}

#[derive(Debug, Default)]
struct PauseStats {
	min: AtomicU64,
	max: AtomicU64,
	sum: AtomicU64,
	count: AtomicU64,
}

impl PauseStats {
	fn record(&self, nanos: u64) {
		self.count.fetch_add(1, Ordering::Relaxed);
		self.sum.fetch_add(nanos, Ordering::Relaxed);
		self.max.fetch_max(nanos, Ordering::Relaxed);
		// there's no fetch_min on stable AtomicU64 in the crate's MSRV, so
		// min is updated with a compare-exchange loop.
		let mut current = self.min.load(Ordering::Relaxed);
		loop {
			if current != 0 && current <= nanos {
				break;
			}
			match self.min.compare_exchange_weak(current, nanos, Ordering::Relaxed, Ordering::Relaxed) {
				Ok(_) => break,
				Err(observed) => current = observed,
			}
		}
	}

	fn average(&self) -> u64 {
		let count = self.count.load(Ordering::Relaxed);
		if count == 0 { 0 } else { self.sum.load(Ordering::Relaxed) / count }
	}
}

/// Cumulative allocation/pause counters released-acquire across threads:
/// a reader observing a given `bytes_allocated` value sees every write that
/// led to it.
pub struct MemStats {
	spaces: [SpaceCounters; SPACE_COUNT],
	pause_start: std::sync::Mutex<Option<Instant>>,
	overall_pause: PauseStats,
	phase_pause: [PauseStats; GC_PHASE_COUNT],
}

impl Default for MemStats {
	fn default() -> Self {
		Self {
			spaces: Default::default(),
			pause_start: std::sync::Mutex::new(None),
			overall_pause: PauseStats::default(),
			phase_pause: std::array::from_fn(|_| PauseStats::default()),
		}
	}
}

impl MemStats {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record_allocate(&self, space: Space, size: u64) {
		let counters = &self.spaces[space_index(space)];
		let allocated = counters.bytes_allocated.fetch_add(size, Ordering::AcqRel) + size;
		let freed = counters.bytes_freed.load(Ordering::Acquire);
		let footprint = allocated.saturating_sub(freed);
		counters.peak_footprint.fetch_max(footprint, Ordering::AcqRel);
		if matches!(space, Space::Object | Space::HumongousObject) {
			counters.objects_allocated.fetch_add(1, Ordering::AcqRel);
		}
	}

	pub fn record_free(&self, space: Space, size: u64) {
		let counters = &self.spaces[space_index(space)];
		counters.bytes_freed.fetch_add(size, Ordering::AcqRel);
		if matches!(space, Space::Object | Space::HumongousObject) {
			counters.objects_freed.fetch_add(1, Ordering::AcqRel);
		}
	}

	pub fn record_moved(&self, space: Space, size: u64) {
		self.spaces[space_index(space)].bytes_moved.fetch_add(size, Ordering::AcqRel);
	}

	pub fn bytes_allocated(&self, space: Space) -> u64 {
		self.spaces[space_index(space)].bytes_allocated.load(Ordering::Acquire)
	}

	pub fn bytes_freed(&self, space: Space) -> u64 {
		self.spaces[space_index(space)].bytes_freed.load(Ordering::Acquire)
	}

	pub fn peak_footprint(&self, space: Space) -> u64 {
		self.spaces[space_index(space)].peak_footprint.load(Ordering::Acquire)
	}

	pub fn record_pause_start(&self) {
		*self.pause_start.lock().unwrap() = Some(Instant::now());
	}

	pub fn record_pause_end(&self, phase: Option<GcPhase>) {
		let start = self.pause_start.lock().unwrap().take();
		let Some(start) = start else { return };
		let nanos = start.elapsed().as_nanos() as u64;
		self.overall_pause.record(nanos);
		if let Some(phase) = phase {
			self.phase_pause[phase_index(phase)].record(nanos);
		}
	}

	pub fn min_gc_pause(&self) -> u64 {
		self.overall_pause.min.load(Ordering::Relaxed)
	}

	pub fn max_gc_pause(&self) -> u64 {
		self.overall_pause.max.load(Ordering::Relaxed)
	}

	pub fn average_gc_pause(&self) -> u64 {
		self.overall_pause.average()
	}

	pub fn total_gc_pause(&self) -> u64 {
		self.overall_pause.sum.load(Ordering::Relaxed)
	}

	pub fn average_phase_pause(&self, phase: GcPhase) -> u64 {
		self.phase_pause[phase_index(phase)].average()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tracks_bytes_allocated_and_freed_per_space() {
		let stats = MemStats::new();
		stats.record_allocate(Space::Object, 100);
		stats.record_allocate(Space::Object, 50);
		stats.record_free(Space::Object, 30);
		assert_eq!(stats.bytes_allocated(Space::Object), 150);
		assert_eq!(stats.bytes_freed(Space::Object), 30);
	}

	#[test]
	fn peak_footprint_is_the_max_of_allocated_minus_freed() {
		let stats = MemStats::new();
		stats.record_allocate(Space::Object, 100);
		stats.record_free(Space::Object, 80);
		stats.record_allocate(Space::Object, 40);
		// footprint sequence: 100, 20, 60 -> peak 100
		assert_eq!(stats.peak_footprint(Space::Object), 100);
	}

	#[test]
	fn spaces_are_independent() {
		let stats = MemStats::new();
		stats.record_allocate(Space::Code, 64);
		assert_eq!(stats.bytes_allocated(Space::Object), 0);
		assert_eq!(stats.bytes_allocated(Space::Code), 64);
	}

	#[test]
	fn average_pause_is_zero_with_no_recorded_pauses() {
		let stats = MemStats::new();
		assert_eq!(stats.average_gc_pause(), 0);
	}

	#[test]
	fn pause_start_without_a_matching_end_is_a_no_op() {
		let stats = MemStats::new();
		stats.record_pause_start();
		// dropping the stats here exercises that an unterminated pause
		// never panics or corrupts the running sum.
		assert_eq!(stats.total_gc_pause(), 0);
	}

	#[test]
	fn marking_phases_are_classified_correctly() {
		assert!(GcPhase::Mark.is_marking());
		assert!(!GcPhase::Sweep.is_marking());
	}
}
