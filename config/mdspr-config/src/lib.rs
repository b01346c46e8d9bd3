use bincode::{Decode, Encode};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum DisplayWidth {
    H32,
    #[default]
    H40,
}

impl Display for DisplayWidth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::H32 => write!(f, "H32 (256px)"),
            Self::H40 => write!(f, "H40 (320px)"),
        }
    }
}

impl DisplayWidth {
    pub const fn active_display_pixels(self) -> u16 {
        match self {
            Self::H32 => 256,
            Self::H40 => 320,
        }
    }

    // Length in sprites; the hardware stops following links past this point
    pub const fn sprite_table_len(self) -> u16 {
        match self {
            Self::H32 => 64,
            Self::H40 => 80,
        }
    }

    pub const fn max_sprites_per_line(self) -> u16 {
        match self {
            Self::H32 => 16,
            Self::H40 => 20,
        }
    }

    pub const fn sprite_attribute_table_mask(self) -> u16 {
        // Sprite attribute table A9 is ignored in H40 mode
        match self {
            Self::H32 => !0,
            Self::H40 => !0x3FF,
        }
    }
}

/// Sprite table placement discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SpriteMode {
    /// Slots are handed out in link order by the placement calls and the list is terminated
    /// automatically at the end of every frame.
    #[default]
    AutoManaged,
    /// Slots, links and the transfer length are owned by the caller.
    Manual,
}

impl Display for SpriteMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AutoManaged => write!(f, "Auto-managed"),
            Self::Manual => write!(f, "Manual"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteCacheConfig {
    pub mode: SpriteMode,
    pub display_width: DisplayWidth,
}

impl Display for SpriteCacheConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "mode: {}, display width: {}", self.mode, self.display_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn table_len_follows_display_width() {
        assert_eq!(DisplayWidth::H32.sprite_table_len(), 64);
        assert_eq!(DisplayWidth::H40.sprite_table_len(), 80);
        assert_eq!(DisplayWidth::H40.max_sprites_per_line(), 20);
    }

    #[test]
    fn default_config() {
        let config = SpriteCacheConfig::default();
        assert_eq!(config.mode, SpriteMode::AutoManaged);
        assert_eq!(config.display_width, DisplayWidth::H40);
        assert_eq!(config.to_string(), "mode: Auto-managed, display width: H40 (320px)");
    }
}
