//! A model of how the VDP walks the sprite list on a single scanline, for inspecting what a
//! published table will actually draw.
//!
//! This follows the sprite scan and render phases as documented for the Overdrive 2 demo: the
//! link chain is followed from slot 0 until it returns to 0 or leaves the table, sprites that
//! overlap the line are collected up to the per-line limit, and an X=0 sprite hides everything
//! after it once a sprite with non-zero X has been seen on the same line.

use crate::slot::{MASK_X, SCREEN_ORIGIN_OFFSET, Slot};
use mdspr_config::DisplayWidth;

// Progressive mode uses 9-bit sprite positions
const POSITION_MASK: u16 = 0x1FF;

/// Last screen line a sprite can cover.
pub const MAX_SCAN_LINE: u16 = POSITION_MASK - SCREEN_ORIGIN_OFFSET;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineScan {
    /// Slots on this line that are drawn at least partially inside the active display.
    pub rendered: Vec<u8>,
    /// The X=0 slot that masked the rest of the line, if any.
    pub masked_by: Option<u8>,
    /// Set if more sprites overlapped the line than the hardware can scan.
    pub overflow: bool,
}

/// Slot indices in the order the VDP visits them.
pub fn walk_chain(slots: &[Slot], display_width: DisplayWidth) -> Vec<u8> {
    let table_len = display_width.sprite_table_len().min(slots.len() as u16);

    let mut visited = Vec::with_capacity(table_len.into());
    if table_len == 0 {
        return visited;
    }

    // Sprite 0 is always visited
    let mut sprite_idx = 0_u16;
    for _ in 0..table_len {
        visited.push(sprite_idx as u8);

        sprite_idx = slots[sprite_idx as usize].link().into();
        if sprite_idx == 0 || sprite_idx >= table_len {
            break;
        }
    }

    visited
}

/// Which slots the VDP would draw on screen line `line`.
///
/// Lines past the 9-bit sprite coordinate range can never be covered by a sprite.
pub fn scan_line(slots: &[Slot], display_width: DisplayWidth, line: u16) -> LineScan {
    let Some(sprite_line) =
        SCREEN_ORIGIN_OFFSET.checked_add(line).filter(|&sprite_line| sprite_line <= POSITION_MASK)
    else {
        return LineScan::default();
    };
    let max_sprites_per_line = display_width.max_sprites_per_line() as usize;

    let mut scan = LineScan::default();

    let mut scanned = Vec::with_capacity(max_sprites_per_line);
    for sprite_idx in walk_chain(slots, display_width) {
        let slot = &slots[sprite_idx as usize];
        let top = slot.y & POSITION_MASK;
        let bottom = top + 8 * u16::from(slot.size.height_cells());
        if !(top..bottom).contains(&sprite_line) {
            continue;
        }

        if scanned.len() == max_sprites_per_line {
            scan.overflow = true;
            break;
        }
        scanned.push(sprite_idx);
    }

    let display_area =
        SCREEN_ORIGIN_OFFSET..SCREEN_ORIGIN_OFFSET + display_width.active_display_pixels();

    let mut found_non_zero = false;
    for sprite_idx in scanned {
        let slot = &slots[sprite_idx as usize];
        let x = slot.x & POSITION_MASK;

        if x == MASK_X && found_non_zero {
            scan.masked_by = Some(sprite_idx);
            break;
        } else if x != MASK_X {
            found_non_zero = true;
        }

        let right = x + 8 * u16::from(slot.size.width_cells());
        if right > display_area.start && x < display_area.end {
            scan.rendered.push(sprite_idx);
        }
    }

    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{AutoManaged, SpriteCache};
    use crate::slot::{SpriteAttribute, SpriteSize};
    use test_log::test;

    fn size(w: u8, h: u8) -> SpriteSize {
        SpriteSize::new(w, h).unwrap()
    }

    fn finished(cache: &mut SpriteCache<AutoManaged>) -> Vec<Slot> {
        cache.frame_finish(&mut |_: &[Slot]| {});
        cache.slots().to_vec()
    }

    #[test]
    fn walk_stops_at_terminator() {
        let mut cache = SpriteCache::<AutoManaged>::new(DisplayWidth::H40);
        cache.frame_start();
        for i in 0..3 {
            cache.place(i * 16, 0, SpriteAttribute::default(), size(1, 1));
        }
        let slots = finished(&mut cache);

        // Slot 3 is the terminator and is still visited
        assert_eq!(walk_chain(&slots, DisplayWidth::H40), vec![0, 1, 2, 3]);
    }

    #[test]
    fn walk_stops_at_h32_table_end() {
        let cache = SpriteCache::<AutoManaged>::new(DisplayWidth::H32);
        let visited = walk_chain(cache.slots(), DisplayWidth::H32);
        assert_eq!(visited.len(), 64);
        assert_eq!(visited.last(), Some(&63));

        let visited = walk_chain(cache.slots(), DisplayWidth::H40);
        assert_eq!(visited.len(), 80);
    }

    #[test]
    fn mask_hides_later_sprites_on_covered_lines() {
        let mut cache = SpriteCache::<AutoManaged>::new(DisplayWidth::H40);
        cache.frame_start();
        cache.place(10, 0, SpriteAttribute::default(), size(1, 4));
        cache.mask_span(8, size(1, 1));
        cache.place(50, 0, SpriteAttribute::default(), size(1, 4));
        let slots = finished(&mut cache);

        let scan = scan_line(&slots, DisplayWidth::H40, 4);
        assert_eq!(scan.rendered, vec![0, 2]);
        assert_eq!(scan.masked_by, None);

        let scan = scan_line(&slots, DisplayWidth::H40, 12);
        assert_eq!(scan.rendered, vec![0]);
        assert_eq!(scan.masked_by, Some(1));
    }

    #[test]
    fn leading_mask_does_not_mask() {
        let mut cache = SpriteCache::<AutoManaged>::new(DisplayWidth::H40);
        cache.frame_start();
        cache.mask_span(0, size(1, 1));
        cache.place(50, 0, SpriteAttribute::default(), size(1, 1));
        let slots = finished(&mut cache);

        let scan = scan_line(&slots, DisplayWidth::H40, 0);
        assert_eq!(scan.rendered, vec![1]);
        assert_eq!(scan.masked_by, None);
    }

    #[test]
    fn per_line_sprite_limit() {
        let mut cache = SpriteCache::<AutoManaged>::new(DisplayWidth::H32);
        cache.frame_start();
        for i in 0..20 {
            cache.place(i * 8, 100, SpriteAttribute::default(), size(1, 1));
        }
        let slots = finished(&mut cache);

        let scan = scan_line(&slots, DisplayWidth::H32, 100);
        assert!(scan.overflow);
        assert_eq!(scan.rendered, (0..16).collect::<Vec<u8>>());

        let scan = scan_line(&slots, DisplayWidth::H32, 108);
        assert!(!scan.overflow);
        assert!(scan.rendered.is_empty());
    }

    #[test]
    fn off_screen_sprites_are_not_rendered() {
        let mut cache = SpriteCache::<AutoManaged>::new(DisplayWidth::H32);
        cache.frame_start();
        cache.place(-31, 0, SpriteAttribute::default(), size(4, 1));
        cache.place(-20, 0, SpriteAttribute::default(), size(2, 1));
        cache.place(280, 0, SpriteAttribute::default(), size(1, 1));
        let slots = finished(&mut cache);

        let scan = scan_line(&slots, DisplayWidth::H32, 0);
        assert_eq!(scan.rendered, vec![0]);
    }

    #[test]
    fn lines_past_sprite_coordinate_range_are_empty() {
        let mut cache = SpriteCache::<AutoManaged>::new(DisplayWidth::H40);
        cache.frame_start();
        cache.place(10, 380, SpriteAttribute::default(), size(1, 1));
        let slots = finished(&mut cache);

        assert_eq!(scan_line(&slots, DisplayWidth::H40, MAX_SCAN_LINE).rendered, vec![0]);
        assert_eq!(scan_line(&slots, DisplayWidth::H40, MAX_SCAN_LINE + 1), LineScan::default());
        assert_eq!(scan_line(&slots, DisplayWidth::H40, u16::MAX), LineScan::default());
    }
}
