//! Sprite attribute table descriptors and the packed size/attribute values stored in them

use bincode::{Decode, Encode};
use mdspr_common::num::{GetBit, U16Ext};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Physical sprite table capacity in slots.
pub const SPR_MAX: usize = 80;

// Sprites with X = $080 / Y = $080 display at the top-left corner of the screen
pub const SCREEN_ORIGIN_OFFSET: u16 = 0x080;

// Raw X positions that the VDP treats as line masks rather than sprite positions
pub const MASK_X: u16 = 0;
pub const MASK_OVERLAP_X: u16 = 1;

// Logical X positions at or past these bounds would land on (or wrap around to) a mask position
pub const PLACE_X_MIN: i16 = -32;
pub const PLACE_X_MAX: i16 = 320;

const MAX_TILE: u16 = 0x07FF;
const MAX_PALETTE: u8 = 3;
const LINK_MASK: u8 = 0x7F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpriteParamError {
    #[error("sprite width must be 1-4 cells, was {0}")]
    InvalidWidth(u8),
    #[error("sprite height must be 1-4 cells, was {0}")]
    InvalidHeight(u8),
    #[error("tile index must be at most $7FF, was ${0:04X}")]
    InvalidTile(u16),
    #[error("palette row must be 0-3, was {0}")]
    InvalidPalette(u8),
}

/// Packed sprite dimensions: `(width - 1) << 2 | (height - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct SpriteSize(u8);

impl SpriteSize {
    /// # Errors
    ///
    /// Returns an error if either dimension is outside of 1-4 cells.
    pub fn new(width_cells: u8, height_cells: u8) -> Result<Self, SpriteParamError> {
        if !(1..=4).contains(&width_cells) {
            return Err(SpriteParamError::InvalidWidth(width_cells));
        }
        if !(1..=4).contains(&height_cells) {
            return Err(SpriteParamError::InvalidHeight(height_cells));
        }

        Ok(Self(((width_cells - 1) << 2) | (height_cells - 1)))
    }

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw & 0x0F)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub fn width_cells(self) -> u8 {
        self.0.bits(2..=3) + 1
    }

    pub fn height_cells(self) -> u8 {
        self.0.bits(0..=1) + 1
    }
}

impl Display for SpriteSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width_cells(), self.height_cells())
    }
}

/// Packed attribute word: priority, palette row, V flip, H flip and an 11-bit tile index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct SpriteAttribute(u16);

impl SpriteAttribute {
    /// # Errors
    ///
    /// Returns an error if the tile index does not fit in 11 bits or the palette row is not 0-3.
    pub fn new(
        tile: u16,
        horizontal_flip: bool,
        vertical_flip: bool,
        palette: u8,
        priority: bool,
    ) -> Result<Self, SpriteParamError> {
        if tile > MAX_TILE {
            return Err(SpriteParamError::InvalidTile(tile));
        }
        if palette > MAX_PALETTE {
            return Err(SpriteParamError::InvalidPalette(palette));
        }

        Ok(Self(
            (u16::from(priority) << 15)
                | (u16::from(palette) << 13)
                | (u16::from(vertical_flip) << 12)
                | (u16::from(horizontal_flip) << 11)
                | tile,
        ))
    }

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub fn tile(self) -> u16 {
        self.0.bits(0..=10)
    }

    pub fn horizontal_flip(self) -> bool {
        self.0.bit(11)
    }

    pub fn vertical_flip(self) -> bool {
        self.0.bit(12)
    }

    pub fn palette(self) -> u8 {
        self.0.bits(13..=14) as u8
    }

    pub fn priority(self) -> bool {
        self.0.bit(15)
    }
}

/// One sprite attribute table entry, laid out the way the VDP reads it.
///
/// Positions are stored raw, i.e. with [`SCREEN_ORIGIN_OFFSET`] already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct Slot {
    pub y: u16,
    pub size: SpriteSize,
    link: u8,
    pub attribute: SpriteAttribute,
    pub x: u16,
}

impl Slot {
    /// Index of the next slot in draw order. A link of 0 ends the list.
    pub const fn link(&self) -> u8 {
        self.link
    }

    // Only 7 bits are valid
    pub fn set_link(&mut self, link: u8) {
        self.link = link & LINK_MASK;
    }

    /// Set the position in screen coordinates, where (0, 0) is the top-left corner.
    pub fn set_position(&mut self, x: i16, y: i16) {
        self.x = bias(x);
        self.y = bias(y);
    }

    /// Move the sprite fully off the left edge of the screen without turning it into a line mask.
    pub fn hide(&mut self) {
        self.x = bias(PLACE_X_MIN);
    }

    pub fn is_mask_sentinel(&self) -> bool {
        matches!(self.x, MASK_X | MASK_OVERLAP_X)
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let attribute = self.attribute.raw();
        [
            self.y.msb(),
            self.y.lsb(),
            self.size.raw(),
            self.link,
            attribute.msb(),
            attribute.lsb(),
            self.x.msb(),
            self.x.lsb(),
        ]
    }

    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self {
            y: u16::from_be_bytes([bytes[0], bytes[1]]),
            size: SpriteSize::from_raw(bytes[2]),
            link: bytes[3] & LINK_MASK,
            attribute: SpriteAttribute::from_raw(u16::from_be_bytes([bytes[4], bytes[5]])),
            x: u16::from_be_bytes([bytes[6], bytes[7]]),
        }
    }
}

pub(crate) fn bias(position: i16) -> u16 {
    (position as u16).wrapping_add(SCREEN_ORIGIN_OFFSET)
}
