//! Per-cycle cost field buffer.

/// One unsigned cost per grid cell, [`TransformField::UNREACHED`] until a
/// wavefront finalizes it.
///
/// The buffer is owned by the field and only reachable through bounds-checked
/// accessors. The field also remembers which cells it was seeded from, and
/// for every reached cell the seed its value came from. Among seeds that
/// reach a cell at equal cost the lowest cell index owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformField {
    width: usize,
    height: usize,
    values: Vec<u32>,
    owners: Vec<usize>,
    seeds: Vec<usize>,
}

impl TransformField {
    /// Sentinel for cells the wavefront never reached.
    pub const UNREACHED: u32 = u32::MAX;

    const NO_OWNER: usize = usize::MAX;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![Self::UNREACHED; width * height],
            owners: vec![Self::NO_OWNER; width * height],
            seeds: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, or `None` outside the field.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u32> {
        self.values.get(index).copied()
    }

    /// Value at `index`; out-of-range reads as unreached.
    #[inline]
    pub fn cost(&self, index: usize) -> u32 {
        self.get(index).unwrap_or(Self::UNREACHED)
    }

    #[inline]
    pub fn is_reached(&self, index: usize) -> bool {
        self.cost(index) != Self::UNREACHED
    }

    /// Read-only view of the whole buffer, for diagnostics.
    #[inline]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Cells the wavefront was seeded from, in seeding order.
    #[inline]
    pub fn seeds(&self) -> &[usize] {
        &self.seeds
    }

    /// Seed cell whose wave set the value at `index`.
    #[inline]
    pub fn owner(&self, index: usize) -> Option<usize> {
        self.owners
            .get(index)
            .copied()
            .filter(|&o| o != Self::NO_OWNER)
    }

    /// Raw owner slot, `usize::MAX` when unreached.
    #[inline]
    pub(crate) fn owner_key(&self, index: usize) -> usize {
        self.owners.get(index).copied().unwrap_or(Self::NO_OWNER)
    }

    #[inline]
    pub fn is_seed(&self, index: usize) -> bool {
        self.seeds.contains(&index)
    }

    pub fn reached_count(&self) -> usize {
        self.values
            .iter()
            .filter(|&&v| v != Self::UNREACHED)
            .count()
    }

    /// Largest finite value, if any cell was reached.
    pub fn max_reached(&self) -> Option<u32> {
        self.values
            .iter()
            .copied()
            .filter(|&v| v != Self::UNREACHED)
            .max()
    }

    /// Take `(cost, owner)` at `index` if it orders before the current pair.
    /// Returns whether it did.
    #[inline]
    pub(crate) fn relax(&mut self, index: usize, cost: u32, owner: usize) -> bool {
        let (Some(value), Some(slot)) = (self.values.get_mut(index), self.owners.get_mut(index))
        else {
            return false;
        };
        if (cost, owner) < (*value, *slot) {
            *value = cost;
            *slot = owner;
            true
        } else {
            false
        }
    }

    pub(crate) fn mark_seed(&mut self, index: usize) {
        if !self.seeds.contains(&index) {
            self.seeds.push(index);
        }
    }
}
