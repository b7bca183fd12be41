use std::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;

pub const DEFAULT_CARD_SIZE: usize = 512;

const CLEAN: u8 = 0;
const MARKED: u8 = 1;
const PROCESSED: u8 = 2;

bitflags! {
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct VisitFlags: u32 {
		const VISIT_MARKED = 0b001;
		const VISIT_PROCESSED = 0b010;
		const SET_PROCESSED = 0b100;
	}
}

/// A byte-address range covered by one or more cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemRange {
	pub start: usize,
	pub end: usize,
}

/// One byte-sized card per `card_size`-byte chunk of `[min_address, max_address)`.
/// Marking is idempotent: setting a card to `MARKED` twice has the same
/// effect as once, so no synchronization beyond a relaxed atomic store is
/// needed.
pub struct CardTable {
	cards: Vec<AtomicU8>,
	min_address: usize,
	card_size: usize,
}

impl CardTable {
	pub fn new(min_address: usize, max_address: usize, card_size: usize) -> Self {
		assert!(card_size > 0 && max_address > min_address);
		let count = (max_address - min_address).div_ceil(card_size);
		let cards = (0..count).map(|_| AtomicU8::new(CLEAN)).collect();
		Self { cards, min_address, card_size }
	}

	pub fn card_count(&self) -> usize {
		self.cards.len()
	}

	fn card_index(&self, address: usize) -> usize {
		(address - self.min_address) / self.card_size
	}

	fn card_range(&self, index: usize) -> MemRange {
		let start = self.min_address + index * self.card_size;
		MemRange { start, end: start + self.card_size }
	}

	/// Marks the single card covering `address`.
	pub fn mark(&self, address: usize) {
		let index = self.card_index(address);
		self.cards[index].store(MARKED, Ordering::Relaxed);
	}

	/// Marks every card whose range intersects `[start, end)`.
	pub fn mark_range(&self, start: usize, end: usize) {
		debug_assert!(end > start);
		let first = self.card_index(start);
		let last = self.card_index(end - 1);
		for card in &self.cards[first..=last] {
			card.store(MARKED, Ordering::Relaxed);
		}
	}

	pub fn is_marked(&self, address: usize) -> bool {
		self.cards[self.card_index(address)].load(Ordering::Relaxed) == MARKED
	}

	/// Scans in word-aligned chunks, skipping any chunk whose cards are all
	/// clean, and calls `visitor` with the byte range of every card
	/// selected by `flags`.
	pub fn visit_marked(&self, flags: VisitFlags, mut visitor: impl FnMut(MemRange)) {
		const CHUNK: usize = 8;
		let mut index = 0;
		while index < self.cards.len() {
			let chunk_end = (index + CHUNK).min(self.cards.len());
			let chunk = &self.cards[index..chunk_end];
			if chunk.iter().all(|c| c.load(Ordering::Relaxed) == CLEAN) {
				index = chunk_end;
				continue;
			}
			for (offset, card) in chunk.iter().enumerate() {
				let state = card.load(Ordering::Relaxed);
				let selected = (flags.contains(VisitFlags::VISIT_MARKED) && state == MARKED) || (flags.contains(VisitFlags::VISIT_PROCESSED) && state == PROCESSED);
				if !selected {
					continue;
				}
				if flags.contains(VisitFlags::SET_PROCESSED) {
					card.store(PROCESSED, Ordering::Relaxed);
				}
				visitor(self.card_range(index + offset));
			}
			index = chunk_end;
		}
	}

	/// Like [`Self::visit_marked`] restricted to marked cards, but coalesces
	/// runs of adjacent marked cards into a single [`MemRange`] per run.
	pub fn visit_marked_compact(&self, mut visitor: impl FnMut(MemRange)) {
		let mut index = 0;
		while index < self.cards.len() {
			if self.cards[index].load(Ordering::Relaxed) != MARKED {
				index += 1;
				continue;
			}
			let run_start = index;
			while index < self.cards.len() && self.cards[index].load(Ordering::Relaxed) == MARKED {
				index += 1;
			}
			let start = self.card_range(run_start).start;
			let end = self.card_range(index - 1).end;
			visitor(MemRange { start, end });
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table() -> CardTable {
		CardTable::new(0, 4096, 512)
	}

	#[test]
	fn marking_the_same_card_twice_is_idempotent() {
		let table = table();
		table.mark(100);
		table.mark(100);
		assert!(table.is_marked(100));
		assert_eq!(table.card_count(), 8);
	}

	#[test]
	fn mark_range_covers_every_intersecting_card() {
		let table = table();
		table.mark_range(500, 1100); // spans cards 0, 1, 2
		assert!(table.is_marked(0));
		assert!(table.is_marked(600));
		assert!(table.is_marked(1099));
		assert!(!table.is_marked(1600));
	}

	#[test]
	fn visit_marked_reports_only_selected_cards() {
		let table = table();
		table.mark(0);
		table.mark(2048);
		let mut seen = Vec::new();
		table.visit_marked(VisitFlags::VISIT_MARKED, |range| seen.push(range.start));
		assert_eq!(seen, vec![0, 2048]);
	}

	#[test]
	fn visit_marked_can_transition_marked_cards_to_processed() {
		let table = table();
		table.mark(0);
		table.visit_marked(VisitFlags::VISIT_MARKED | VisitFlags::SET_PROCESSED, |_| {});
		assert!(!table.is_marked(0));

		let mut seen = 0;
		table.visit_marked(VisitFlags::VISIT_PROCESSED, |_| seen += 1);
		assert_eq!(seen, 1);
	}

	#[test]
	fn visit_marked_compact_coalesces_adjacent_runs() {
		let table = table();
		table.mark_range(0, 1536); // cards 0,1,2
		table.mark(3584); // card 7, isolated
		let mut ranges = Vec::new();
		table.visit_marked_compact(|range| ranges.push(range));
		assert_eq!(ranges.len(), 2);
		assert_eq!(ranges[0], MemRange { start: 0, end: 1536 });
		assert_eq!(ranges[1], MemRange { start: 3584, end: 4096 });
	}
}
