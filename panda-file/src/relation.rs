use crate::intset::IntSet;

pub type RelIndex = usize;

/// A binary relation over `0..n` indices, kept transitively closed as pairs
/// are inserted: each `relate(from, to)` immediately propagates through
/// everything already known to be related to `from` or `to`.
#[derive(Debug, Clone, Default)]
pub struct Relation {
	direct: Vec<IntSet>,
	inverse: Vec<IntSet>,
}

impl Relation {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn ensure_min_size(&mut self, idx: RelIndex) {
		if idx >= self.direct.len() {
			let len = idx + 1;
			self.direct.resize(len, IntSet::new());
			self.inverse.resize(len, IntSet::new());
		}
	}

	/// Records `from -> to` and flattens the relation so that everything
	/// transitively reachable through the new edge is recorded directly.
	pub fn relate(&mut self, from: RelIndex, to: RelIndex) {
		assert!(from < self.direct.len());
		assert!(to < self.inverse.len());

		self.inverse[to].insert(from);
		let inverse_from = self.inverse[from].clone();
		self.inverse[to].union_in_place(&inverse_from);

		self.direct[from].insert(to);
		let direct_to = self.direct[to].clone();
		self.direct[from].union_in_place(&direct_to);

		for dst in self.direct[to].clone().iter() {
			self.inverse[dst].insert(from);
			let inverse_from = self.inverse[from].clone();
			self.inverse[dst].union_in_place(&inverse_from);
		}
		for src in self.inverse[from].clone().iter() {
			self.direct[src].insert(to);
			let direct_to = self.direct[to].clone();
			self.direct[src].union_in_place(&direct_to);
		}
	}

	pub fn symm_relate(&mut self, lhs: RelIndex, rhs: RelIndex) {
		self.relate(lhs, rhs);
		self.relate(rhs, lhs);
	}

	pub fn for_all_from(&self, from: RelIndex, handler: impl FnMut(RelIndex) -> bool) -> bool {
		assert!(from < self.direct.len());
		self.direct[from].for_all(handler)
	}

	pub fn for_all_to(&self, to: RelIndex, handler: impl FnMut(RelIndex) -> bool) -> bool {
		assert!(to < self.inverse.len());
		self.inverse[to].for_all(handler)
	}

	/// Visits indices related both from `from` and to `to`. If `from` and
	/// `to` are already known to be related the other way round, the pair
	/// is swapped before intersecting, so the direct/inverse lookup always
	/// matches the relation that actually holds.
	pub fn for_all_between(&self, mut from: RelIndex, mut to: RelIndex, mut handler: impl FnMut(RelIndex) -> bool) -> bool {
		if self.is_in_inverse_relation(from, to) {
			std::mem::swap(&mut from, &mut to);
		}
		let between = self.direct[from].intersect(&self.inverse[to]);
		between.for_all(&mut handler)
	}

	pub fn is_in_direct_relation(&self, from: RelIndex, to: RelIndex) -> bool {
		from < self.direct.len() && self.direct[from].contains(to)
	}

	pub fn is_in_inverse_relation(&self, from: RelIndex, to: RelIndex) -> bool {
		from < self.inverse.len() && self.inverse[from].contains(to)
	}

	pub fn is_in_any_relation(&self, from: RelIndex, to: RelIndex) -> bool {
		self.is_in_direct_relation(from, to) || self.is_in_inverse_relation(from, to)
	}

	pub fn is_in_iso_relation(&self, from: RelIndex, to: RelIndex) -> bool {
		self.is_in_direct_relation(from, to) && self.is_in_inverse_relation(from, to)
	}

	pub fn directly_related(&self, from: RelIndex) -> &IntSet {
		&self.direct[from]
	}

	pub fn inversely_related(&self, to: RelIndex) -> &IntSet {
		&self.inverse[to]
	}
}

impl std::ops::AddAssign<(RelIndex, RelIndex)> for Relation {
	fn add_assign(&mut self, (from, to): (RelIndex, RelIndex)) {
		self.ensure_min_size(from.max(to));
		self.relate(from, to);
	}
}
