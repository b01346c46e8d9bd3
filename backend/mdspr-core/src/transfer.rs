//! Sprite table hand-off at the end of a frame

use crate::slot::Slot;
use mdspr_config::DisplayWidth;

pub const VRAM_LEN: usize = 64 * 1024;

const SLOT_LEN: u16 = 8;

/// Receives the published sprite table once per frame.
///
/// `slots` starts at the table base and is exactly as long as the frame's transfer length.
pub trait SpriteTransfer {
    fn transfer(&mut self, slots: &[Slot]);
}

impl<F: FnMut(&[Slot])> SpriteTransfer for F {
    fn transfer(&mut self, slots: &[Slot]) {
        self(slots);
    }
}

/// Copies published slots into a VRAM image at the sprite attribute table address, the way a
/// memory-to-VRAM DMA would.
///
/// Slots past the transfer length keep whatever was written to VRAM by earlier frames.
#[derive(Debug, Clone)]
pub struct VramTransfer {
    vram: Box<[u8]>,
    sat_base_addr: u16,
    display_width: DisplayWidth,
    transfers: u64,
    last_transfer_len: usize,
}

impl VramTransfer {
    pub fn new(sat_base_addr: u16, display_width: DisplayWidth) -> Self {
        Self {
            vram: vec![0; VRAM_LEN].into_boxed_slice(),
            sat_base_addr,
            display_width,
            transfers: 0,
            last_transfer_len: 0,
        }
    }

    /// Follow a display width change; the SAT address mask and decoded table length change with it.
    pub fn set_display_width(&mut self, display_width: DisplayWidth) {
        if display_width != self.display_width {
            log::debug!("VRAM sprite table now read as {display_width}");
        }
        self.display_width = display_width;
    }

    pub fn display_width(&self) -> DisplayWidth {
        self.display_width
    }

    pub fn sat_addr(&self) -> u16 {
        self.sat_base_addr & self.display_width.sprite_attribute_table_mask()
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    pub fn transfers(&self) -> u64 {
        self.transfers
    }

    pub fn last_transfer_len(&self) -> usize {
        self.last_transfer_len
    }

    pub fn read_slot(&self, idx: u8) -> Slot {
        let slot_addr = self.slot_addr(idx);

        let mut bytes = [0; SLOT_LEN as usize];
        for (offset, byte) in (0..SLOT_LEN).zip(&mut bytes) {
            *byte = self.vram[slot_addr.wrapping_add(offset) as usize];
        }

        Slot::from_bytes(bytes)
    }

    /// Decode the sprite attribute table as the VDP would see it for the current display width.
    pub fn sprite_table(&self) -> Vec<Slot> {
        (0..self.display_width.sprite_table_len()).map(|idx| self.read_slot(idx as u8)).collect()
    }

    fn slot_addr(&self, idx: u8) -> u16 {
        self.sat_addr().wrapping_add(SLOT_LEN * u16::from(idx))
    }
}

impl SpriteTransfer for VramTransfer {
    fn transfer(&mut self, slots: &[Slot]) {
        log::trace!("Copying {} sprite slots to VRAM at {:04X}", slots.len(), self.sat_addr());

        for (idx, slot) in slots.iter().enumerate() {
            let slot_addr = self.slot_addr(idx as u8);
            for (offset, byte) in (0..SLOT_LEN).zip(slot.to_bytes()) {
                self.vram[slot_addr.wrapping_add(offset) as usize] = byte;
            }
        }

        self.transfers += 1;
        self.last_transfer_len = slots.len();
    }
}
