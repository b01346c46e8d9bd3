//! Auto-managed sprite placement
//!
//! Every call claims the next slot(s) in link order. Calls that do not fit in the table, or that
//! would place a sprite where the VDP would read it as a line mask, are dropped.

use crate::cache::{AutoManaged, SpriteCache};
use crate::slot::{
    MASK_OVERLAP_X, MASK_X, PLACE_X_MAX, PLACE_X_MIN, SpriteAttribute, SpriteSize, bias,
};

impl SpriteCache<AutoManaged> {
    /// Place a sprite with its top-left corner at screen position (`x`, `y`).
    pub fn place(&mut self, x: i16, y: i16, attribute: SpriteAttribute, size: SpriteSize) {
        // Avoid triggering a line mask
        if x <= PLACE_X_MIN || x >= PLACE_X_MAX {
            log::trace!("Dropping sprite at X={x}, outside of {PLACE_X_MIN} < X < {PLACE_X_MAX}");
            return;
        }

        let Some([slot]) = self.table.claim(1) else {
            log::trace!("Sprite table full, dropping sprite at ({x}, {y})");
            return;
        };

        slot.y = bias(y);
        slot.size = size;
        slot.attribute = attribute;
        slot.x = bias(x);
    }

    /// Suppress all later sprites on the scanlines covered by a sprite of `size` at row `y`.
    pub fn mask_span(&mut self, y: i16, size: SpriteSize) {
        let Some([slot]) = self.table.claim(1) else {
            log::trace!("Sprite table full, dropping line mask at Y={y}");
            return;
        };

        slot.y = bias(y);
        slot.size = size;
        slot.x = MASK_X;
    }

    /// Mask the scanlines where two spans meet, using the two-slot X=0 / X=1 mask pair.
    ///
    /// Either both mask slots are written or neither is.
    pub fn mask_span_pair(&mut self, y1: i16, size1: SpriteSize, y2: i16, size2: SpriteSize) {
        let Some([first, second]) = self.table.claim(2) else {
            log::trace!("Not enough sprite slots for line mask pair at Y={y1} / Y={y2}");
            return;
        };

        first.y = bias(y1);
        first.size = size1;
        first.x = MASK_X;

        second.y = bias(y2);
        second.size = size2;
        second.x = MASK_OVERLAP_X;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{SPR_MAX, Slot};
    use mdspr_config::DisplayWidth;
    use test_log::test;

    fn new_cache() -> SpriteCache<AutoManaged> {
        let mut cache = SpriteCache::<AutoManaged>::new(DisplayWidth::H40);
        cache.frame_start();
        cache
    }

    fn size(w: u8, h: u8) -> SpriteSize {
        SpriteSize::new(w, h).unwrap()
    }

    #[test]
    fn place_biases_position() {
        let mut cache = new_cache();
        cache.place(10, 20, SpriteAttribute::from_raw(0x1234), size(2, 2));

        assert_eq!(cache.count(), 1);
        let slot = cache.slots()[0];
        assert_eq!(slot.x, 138);
        assert_eq!(slot.y, 148);
        assert_eq!(slot.attribute.raw(), 0x1234);
        assert_eq!(slot.size, size(2, 2));
        assert_eq!(slot.link(), 1);
    }

    #[test]
    fn place_rejects_mask_positions() {
        let mut cache = new_cache();
        let attribute = SpriteAttribute::from_raw(0x0042);

        for x in [-50, PLACE_X_MIN, PLACE_X_MAX, 400] {
            cache.place(x, 10, attribute, size(1, 1));
        }
        assert_eq!(cache.count(), 0);
        assert_eq!(cache.slots()[0], SpriteCache::<AutoManaged>::new(DisplayWidth::H40).slots()[0]);

        cache.place(PLACE_X_MIN + 1, 10, attribute, size(1, 1));
        cache.place(PLACE_X_MAX - 1, 10, attribute, size(1, 1));
        assert_eq!(cache.count(), 2);
        assert_eq!(cache.slots()[0].x, 97);
        assert_eq!(cache.slots()[1].x, 447);
    }

    #[test]
    fn place_stops_at_capacity() {
        let mut cache = new_cache();
        for i in 0..SPR_MAX {
            cache.place(i as i16, 0, SpriteAttribute::from_raw(i as u16), size(1, 1));
        }
        assert_eq!(cache.count(), SPR_MAX);
        let last = cache.slots()[SPR_MAX - 1];

        cache.place(5, 5, SpriteAttribute::from_raw(0xFFFF), size(4, 4));
        assert_eq!(cache.count(), SPR_MAX);
        assert_eq!(cache.slots()[SPR_MAX - 1], last);
    }

    #[test]
    fn mask_span_uses_raw_zero_x() {
        let mut cache = new_cache();
        cache.place(-10, 0, SpriteAttribute::from_raw(0x8001), size(1, 1));
        cache.mask_span(-100, size(4, 2));

        assert_eq!(cache.count(), 2);
        let mask = cache.slots()[1];
        assert_eq!(mask.x, MASK_X);
        assert_eq!(mask.y, 28);
        assert_eq!(mask.size, size(4, 2));
        assert!(mask.is_mask_sentinel());
    }

    #[test]
    fn mask_span_stops_at_capacity() {
        let mut cache = new_cache();
        for _ in 0..SPR_MAX + 5 {
            cache.mask_span(0, size(1, 1));
        }
        assert_eq!(cache.count(), SPR_MAX);
    }

    #[test]
    fn mask_span_pair_writes_both_slots() {
        let mut cache = new_cache();
        cache.mask_span_pair(16, size(1, 2), 24, size(1, 3));

        assert_eq!(cache.count(), 2);
        let [first, second]: [Slot; 2] = cache.slots()[..2].try_into().unwrap();
        assert_eq!((first.x, first.y, first.size), (0, 144, size(1, 2)));
        assert_eq!((second.x, second.y, second.size), (1, 152, size(1, 3)));
    }

    #[test]
    fn mask_span_pair_is_atomic() {
        let mut cache = new_cache();
        for _ in 0..SPR_MAX - 1 {
            cache.place(0, 0, SpriteAttribute::default(), size(1, 1));
        }
        let before = *cache.slots();

        cache.mask_span_pair(16, size(1, 1), 24, size(1, 1));
        assert_eq!(cache.count(), SPR_MAX - 1);
        assert_eq!(*cache.slots(), before);

        cache.mask_span(16, size(1, 1));
        assert_eq!(cache.count(), SPR_MAX);
    }
}
