//! Sprite cache ownership and the per-frame lifecycle
//!
//! A [`SpriteCache`] is parameterized by its placement discipline. [`AutoManaged`] caches hand out
//! slots in link order through the placement calls and terminate the draw list automatically;
//! [`Manual`] caches expose the slots directly and leave link termination to the caller. Switching
//! disciplines always goes through (re)initialization, which rebuilds the link chain and discards
//! every slot written so far.


use crate::slot::{SPR_MAX, Slot};
use crate::table::SpriteTable;
use crate::transfer::SpriteTransfer;
use bincode::{Decode, Encode};
use mdspr_config::{DisplayWidth, SpriteCacheConfig, SpriteMode};
use std::marker::PhantomData;

mod private {
    pub trait Sealed {}
}

pub trait SpriteDiscipline: private::Sealed {
    const MODE: SpriteMode;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct AutoManaged;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct Manual;

impl private::Sealed for AutoManaged {}
impl private::Sealed for Manual {}

impl SpriteDiscipline for AutoManaged {
    const MODE: SpriteMode = SpriteMode::AutoManaged;
}

impl SpriteDiscipline for Manual {
    const MODE: SpriteMode = SpriteMode::Manual;
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SpriteCache<M> {
    pub(crate) table: SpriteTable,
    display_width: DisplayWidth,
    mode: PhantomData<M>,
}

impl<M: SpriteDiscipline> SpriteCache<M> {
    pub fn new(display_width: DisplayWidth) -> Self {
        let cache = Self { table: SpriteTable::new(), display_width, mode: PhantomData };
        log::debug!("Initialized sprite cache; mode={}, width={display_width}", M::MODE);
        cache
    }

    /// Rebuild the link chain and reset the count, keeping the current discipline.
    pub fn reinitialize(&mut self, display_width: DisplayWidth) {
        *self = Self::new(display_width);
    }

    #[must_use]
    pub fn into_auto(self, display_width: DisplayWidth) -> SpriteCache<AutoManaged> {
        log::debug!(
            "Switching sprite cache from {} ({}) to auto-managed",
            M::MODE,
            self.display_width
        );
        SpriteCache::new(display_width)
    }

    #[must_use]
    pub fn into_manual(self, display_width: DisplayWidth) -> SpriteCache<Manual> {
        log::debug!("Switching sprite cache from {} ({}) to manual", M::MODE, self.display_width);
        SpriteCache::new(display_width)
    }

    pub fn mode(&self) -> SpriteMode {
        M::MODE
    }

    pub fn display_width(&self) -> DisplayWidth {
        self.display_width
    }

    /// Number of slots the hardware will consider for the current display width.
    pub fn active_limit(&self) -> usize {
        self.display_width.sprite_table_len().into()
    }

    /// Slots placed so far this frame (auto-managed) or the transfer length (manual).
    pub fn count(&self) -> usize {
        self.table.count()
    }

    pub fn slots(&self) -> &[Slot; SPR_MAX] {
        self.table.slots()
    }

    /// Publish the table for this frame.
    ///
    /// In auto-managed mode the draw list is first terminated after the last placed slot, and
    /// the terminating slot is moved off-screen so that it draws nothing. In both modes
    /// `transfer` then receives the first `count()` slots.
    pub fn frame_finish<T: SpriteTransfer + ?Sized>(&mut self, transfer: &mut T) {
        if M::MODE == SpriteMode::AutoManaged {
            self.table.terminate();
        }

        let len = self.table.count();
        if len > self.active_limit() {
            log::warn!(
                "Transferring {len} sprites but only {} are displayed in {}",
                self.active_limit(),
                self.display_width
            );
        }

        log::trace!("Handing off {len} sprite slots");
        transfer.transfer(&self.table.slots()[..len]);
    }
}

impl SpriteCache<AutoManaged> {
    /// Prepare for a new frame of placements. Must be called before the first placement of
    /// every frame.
    pub fn frame_start(&mut self) {
        self.table.restore_terminated_link();
        self.table.set_count(0);
    }
}

impl SpriteCache<Manual> {
    pub fn slots_mut(&mut self) -> &mut [Slot; SPR_MAX] {
        self.table.slots_mut()
    }

    pub fn slot_mut(&mut self, idx: usize) -> Option<&mut Slot> {
        self.table.slots_mut().get_mut(idx)
    }

    /// Set how many slots are handed off at the end of the frame. Values past the table
    /// capacity are clamped.
    pub fn set_transfer_len(&mut self, len: usize) {
        if len > SPR_MAX {
            log::trace!("Clamping sprite transfer length {len} to {SPR_MAX}");
        }
        self.table.set_count(len);
    }
}

/// A sprite cache whose discipline is chosen at runtime.
#[derive(Debug, Clone, Encode, Decode)]
pub enum AnySpriteCache {
    AutoManaged(SpriteCache<AutoManaged>),
    Manual(SpriteCache<Manual>),
}

impl AnySpriteCache {
    pub fn new(config: SpriteCacheConfig) -> Self {
        match config.mode {
            SpriteMode::AutoManaged => Self::AutoManaged(SpriteCache::new(config.display_width)),
            SpriteMode::Manual => Self::Manual(SpriteCache::new(config.display_width)),
        }
    }

    /// Switch to `mode`, rebuilding the link chain and discarding every slot written so far.
    pub fn initialize(&mut self, mode: SpriteMode, display_width: DisplayWidth) {
        *self = Self::new(SpriteCacheConfig { mode, display_width });
    }

    pub fn mode(&self) -> SpriteMode {
        match self {
            Self::AutoManaged(_) => SpriteMode::AutoManaged,
            Self::Manual(_) => SpriteMode::Manual,
        }
    }

    pub fn display_width(&self) -> DisplayWidth {
        match self {
            Self::AutoManaged(cache) => cache.display_width(),
            Self::Manual(cache) => cache.display_width(),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Self::AutoManaged(cache) => cache.count(),
            Self::Manual(cache) => cache.count(),
        }
    }

    pub fn slots(&self) -> &[Slot; SPR_MAX] {
        match self {
            Self::AutoManaged(cache) => cache.slots(),
            Self::Manual(cache) => cache.slots(),
        }
    }

    pub fn auto_mut(&mut self) -> Option<&mut SpriteCache<AutoManaged>> {
        match self {
            Self::AutoManaged(cache) => Some(cache),
            Self::Manual(_) => None,
        }
    }

    pub fn manual_mut(&mut self) -> Option<&mut SpriteCache<Manual>> {
        match self {
            Self::Manual(cache) => Some(cache),
            Self::AutoManaged(_) => None,
        }
    }

    /// Start a frame of auto-managed placements. Calling this on a manual cache is a caller bug.
    pub fn frame_start(&mut self) {
        debug_assert!(
            self.mode() == SpriteMode::AutoManaged,
            "frame_start() called on a manual sprite cache"
        );

        if let Self::AutoManaged(cache) = self {
            cache.frame_start();
        }
    }

    pub fn frame_finish<T: SpriteTransfer + ?Sized>(&mut self, transfer: &mut T) {
        match self {
            Self::AutoManaged(cache) => cache.frame_finish(transfer),
            Self::Manual(cache) => cache.frame_finish(transfer),
        }
    }
}

impl Default for AnySpriteCache {
    fn default() -> Self {
        Self::new(SpriteCacheConfig::default())
    }
}
