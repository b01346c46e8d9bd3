//! Mega Drive sprite attribute table cache
//!
//! Maintains the 80-slot sprite table in RAM, hands out slots in link order, builds line masks
//! from X=0 sentinel sprites, and publishes the table once per frame to a [`SpriteTransfer`].

pub mod cache;
mod placement;
pub mod scan;
pub mod slot;
pub mod table;
pub mod transfer;

pub use cache::{AnySpriteCache, AutoManaged, Manual, SpriteCache, SpriteDiscipline};
pub use mdspr_config::{DisplayWidth, SpriteCacheConfig, SpriteMode};
pub use scan::{LineScan, MAX_SCAN_LINE, scan_line, walk_chain};
pub use slot::{SPR_MAX, Slot, SpriteAttribute, SpriteParamError, SpriteSize};
pub use table::SpriteTable;
pub use transfer::{SpriteTransfer, VramTransfer};
