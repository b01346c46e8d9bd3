//! TOML scene files: a sequence of frames replayed through the sprite cache

use anyhow::{Context, anyhow, bail};
use mdspr_config::{DisplayWidth, SpriteCacheConfig, SpriteMode};
use mdspr_core::{
    AnySpriteCache, AutoManaged, Manual, Slot, SpriteAttribute, SpriteCache, SpriteSize,
    VramTransfer,
};
use serde::Deserialize;

const DEFAULT_SAT_ADDRESS: u16 = 0xF800;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default)]
    pub mode: SpriteMode,
    #[serde(default)]
    pub display_width: DisplayWidth,
    #[serde(default = "default_sat_address")]
    pub sat_address: u16,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

fn default_sat_address() -> u16 {
    DEFAULT_SAT_ADDRESS
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Frame {
    /// Re-initialize the cache before this frame, switching mode and display width
    pub initialize: Option<Initialize>,
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default)]
    pub slots: Vec<SlotSpec>,
    pub transfer_len: Option<usize>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Initialize {
    pub mode: SpriteMode,
    pub display_width: DisplayWidth,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Place {
        x: i16,
        y: i16,
        width: u8,
        height: u8,
        tile: u16,
        #[serde(default)]
        h_flip: bool,
        #[serde(default)]
        v_flip: bool,
        #[serde(default)]
        palette: u8,
        #[serde(default)]
        priority: bool,
    },
    Mask {
        y: i16,
        width: u8,
        height: u8,
    },
    MaskPair {
        y1: i16,
        width1: u8,
        height1: u8,
        y2: i16,
        width2: u8,
        height2: u8,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotSpec {
    pub index: usize,
    #[serde(default)]
    pub x: i16,
    #[serde(default)]
    pub y: i16,
    #[serde(default = "one")]
    pub width: u8,
    #[serde(default = "one")]
    pub height: u8,
    #[serde(default)]
    pub tile: u16,
    #[serde(default)]
    pub h_flip: bool,
    #[serde(default)]
    pub v_flip: bool,
    #[serde(default)]
    pub palette: u8,
    #[serde(default)]
    pub priority: bool,
    pub link: Option<u8>,
    #[serde(default)]
    pub hidden: bool,
}

fn one() -> u8 {
    1
}

impl Scene {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("invalid scene file")
    }

    pub fn cache_config(&self) -> SpriteCacheConfig {
        SpriteCacheConfig { mode: self.mode, display_width: self.display_width }
    }

    /// Replay every frame, publishing each one into a VRAM image.
    pub fn run(
        &self,
        config: SpriteCacheConfig,
    ) -> anyhow::Result<(AnySpriteCache, VramTransfer)> {
        let mut cache = AnySpriteCache::new(config);
        let mut vram = VramTransfer::new(self.sat_address, config.display_width);

        for (frame_idx, frame) in self.frames.iter().enumerate() {
            if let Some(Initialize { mode, display_width }) = frame.initialize {
                log::info!("Frame {frame_idx}: re-initializing as {mode}, {display_width}");
                cache.initialize(mode, display_width);
                vram.set_display_width(display_width);
            }

            let result = match &mut cache {
                AnySpriteCache::AutoManaged(cache) => run_auto_frame(cache, frame),
                AnySpriteCache::Manual(cache) => run_manual_frame(cache, frame),
            };
            result.with_context(|| format!("frame {frame_idx}"))?;

            cache.frame_finish(&mut vram);
            log::info!("Frame {frame_idx}: transferred {} sprite slots", vram.last_transfer_len());
        }

        Ok((cache, vram))
    }
}

fn run_auto_frame(cache: &mut SpriteCache<AutoManaged>, frame: &Frame) -> anyhow::Result<()> {
    if !frame.slots.is_empty() || frame.transfer_len.is_some() {
        bail!("direct slot writes are only allowed in Manual mode");
    }

    cache.frame_start();

    for command in &frame.commands {
        match *command {
            Command::Place { x, y, width, height, tile, h_flip, v_flip, palette, priority } => {
                let attribute = SpriteAttribute::new(tile, h_flip, v_flip, palette, priority)?;
                cache.place(x, y, attribute, SpriteSize::new(width, height)?);
            }
            Command::Mask { y, width, height } => {
                cache.mask_span(y, SpriteSize::new(width, height)?);
            }
            Command::MaskPair { y1, width1, height1, y2, width2, height2 } => {
                cache.mask_span_pair(
                    y1,
                    SpriteSize::new(width1, height1)?,
                    y2,
                    SpriteSize::new(width2, height2)?,
                );
            }
        }
    }

    Ok(())
}

fn run_manual_frame(cache: &mut SpriteCache<Manual>, frame: &Frame) -> anyhow::Result<()> {
    if !frame.commands.is_empty() {
        bail!("placement commands are only allowed in AutoManaged mode");
    }

    for spec in &frame.slots {
        let slot = cache
            .slot_mut(spec.index)
            .ok_or_else(|| anyhow!("slot index {} is out of range", spec.index))?;
        apply_slot_spec(slot, spec)?;
    }

    if let Some(len) = frame.transfer_len {
        cache.set_transfer_len(len);
    }

    Ok(())
}

fn apply_slot_spec(slot: &mut Slot, spec: &SlotSpec) -> anyhow::Result<()> {
    slot.set_position(spec.x, spec.y);
    slot.size = SpriteSize::new(spec.width, spec.height)?;
    slot.attribute =
        SpriteAttribute::new(spec.tile, spec.h_flip, spec.v_flip, spec.palette, spec.priority)?;

    if let Some(link) = spec.link {
        slot.set_link(link);
    }

    if spec.hidden {
        slot.hide();
    }

    Ok(())
}
