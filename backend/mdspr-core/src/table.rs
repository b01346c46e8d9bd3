use crate::slot::{SPR_MAX, Slot};
use bincode::{Decode, Encode};

/// The fixed-capacity sprite table plus the count of slots in use (or to transfer).
#[derive(Debug, Clone, Encode, Decode)]
pub struct SpriteTable {
    slots: [Slot; SPR_MAX],
    count: u8,
    // Slot whose link was overwritten by the most recent list termination
    terminated: Option<u8>,
}

impl SpriteTable {
    pub fn new() -> Self {
        let mut table = Self { slots: [Slot::default(); SPR_MAX], count: 0, terminated: None };
        table.link_linear();
        table
    }

    /// Point every slot at its successor over the full physical table, with the last slot
    /// pointing back at slot 0.
    pub fn link_linear(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.set_link(((i + 1) % SPR_MAX) as u8);
        }
        self.terminated = None;
    }

    pub fn slots(&self) -> &[Slot; SPR_MAX] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Slot; SPR_MAX] {
        &mut self.slots
    }

    pub fn count(&self) -> usize {
        self.count.into()
    }

    pub(crate) fn set_count(&mut self, count: usize) {
        self.count = count.min(SPR_MAX) as u8;
    }

    pub fn is_full(&self) -> bool {
        self.count() >= SPR_MAX
    }

    /// Claim the next `n` slots in link order, or nothing if fewer than `n` remain.
    pub(crate) fn claim(&mut self, n: usize) -> Option<&mut [Slot]> {
        let start = self.count();
        let end = start + n;
        if end > SPR_MAX {
            return None;
        }

        self.count = end as u8;
        Some(&mut self.slots[start..end])
    }

    /// End the draw list at the slot following the last claimed one.
    ///
    /// The VDP still visits the terminating slot, so it is also hidden off the left edge.
    pub(crate) fn terminate(&mut self) {
        let count = self.count();
        if count >= SPR_MAX {
            // The last physical slot already links back to 0
            return;
        }

        let slot = &mut self.slots[count];
        slot.set_link(0);
        slot.hide();
        self.terminated = Some(count as u8);
    }

    /// Undo the previous termination so that a longer list can be built this frame.
    pub(crate) fn restore_terminated_link(&mut self) {
        if let Some(idx) = self.terminated.take() {
            let idx = usize::from(idx);
            self.slots[idx].set_link(((idx + 1) % SPR_MAX) as u8);
        }
    }
}

impl Default for SpriteTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn new_table_is_linked_linearly() {
        let table = SpriteTable::new();
        assert_eq!(table.count(), 0);
        for (i, slot) in table.slots().iter().enumerate() {
            assert_eq!(usize::from(slot.link()), (i + 1) % SPR_MAX, "slot {i}");
        }
    }

    #[test]
    fn claim_is_all_or_nothing() {
        let mut table = SpriteTable::new();
        table.set_count(SPR_MAX - 1);

        assert!(table.claim(2).is_none());
        assert_eq!(table.count(), SPR_MAX - 1);

        assert_eq!(table.claim(1).map(|slots| slots.len()), Some(1));
        assert!(table.is_full());
        assert!(table.claim(1).is_none());
    }

    #[test]
    fn set_count_saturates() {
        let mut table = SpriteTable::new();
        table.set_count(200);
        assert_eq!(table.count(), SPR_MAX);
    }

    #[test]
    fn terminate_and_restore() {
        let mut table = SpriteTable::new();
        table.set_count(3);
        table.terminate();
        assert_eq!(table.slots()[3].link(), 0);
        assert_eq!(table.slots()[3].x, 96);
        assert!(!table.slots()[3].is_mask_sentinel());
        assert_eq!(table.slots()[2].link(), 3);
        assert_eq!(table.slots()[2].x, 0);

        table.restore_terminated_link();
        assert_eq!(table.slots()[3].link(), 4);

        table.set_count(SPR_MAX);
        table.terminate();
        assert_eq!(table.slots()[SPR_MAX - 1].link(), 0);
        assert_eq!(table.slots()[SPR_MAX - 2].link(), (SPR_MAX - 1) as u8);
    }
}
