mod scene;

use crate::scene::Scene;
use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use mdspr_config::{DisplayWidth, SpriteMode};
use mdspr_core::{AnySpriteCache, MAX_SCAN_LINE, Slot, VramTransfer, scan_line, walk_chain};
use std::fs;

#[derive(Parser)]
struct Args {
    /// Scene file path (TOML)
    #[arg(short = 'f', long)]
    scene_path: String,

    /// Override the scene's display width
    #[arg(long)]
    display_width: Option<DisplayWidth>,

    /// Override the scene's sprite placement mode
    #[arg(long)]
    mode: Option<SpriteMode>,

    /// Print the sprite attribute table as it sits in VRAM after the last frame
    #[arg(long, default_value_t)]
    dump_table: bool,

    /// Print which sprites the VDP would draw on this scanline; may be repeated
    #[arg(
        long = "scan-line",
        value_parser = clap::value_parser!(u16).range(..=i64::from(MAX_SCAN_LINE))
    )]
    scan_lines: Vec<u16>,

    /// Write a bincode snapshot of the final sprite cache to this path
    #[arg(long)]
    snapshot_path: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let scene_str = fs::read_to_string(&args.scene_path)
        .with_context(|| format!("unable to read scene file '{}'", args.scene_path))?;
    let scene = Scene::parse(&scene_str)?;

    let mut config = scene.cache_config();
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(display_width) = args.display_width {
        config.display_width = display_width;
    }
    log::info!("Running {} frames with {config}", scene.frames.len());

    let (cache, vram) = scene.run(config)?;

    let display_width = cache.display_width();
    if args.dump_table {
        dump_table(&vram, display_width);
    }

    let table = vram.sprite_table();
    for &line in &args.scan_lines {
        let scan = scan_line(&table, display_width, line);
        println!(
            "Line {line}: rendered={:?} masked_by={:?} overflow={}",
            scan.rendered, scan.masked_by, scan.overflow
        );
    }

    if let Some(snapshot_path) = &args.snapshot_path {
        write_snapshot(&cache, snapshot_path)?;
    }

    Ok(())
}

fn dump_table(vram: &VramTransfer, display_width: DisplayWidth) {
    println!("Sprite attribute table at ${:04X} ({display_width})", vram.sat_addr());

    let table = vram.sprite_table();
    for (idx, slot) in table.iter().enumerate() {
        println!("{idx:02}: {}", format_slot(slot));
    }

    println!("Draw order: {:?}", walk_chain(&table, display_width));
}

fn format_slot(slot: &Slot) -> String {
    let attribute = slot.attribute;
    let mask = if slot.is_mask_sentinel() { " (mask)" } else { "" };
    let position =
        format!("X=${:03X} Y=${:03X} size={} link={:02}", slot.x, slot.y, slot.size, slot.link());
    format!(
        "{position} tile=${:03X} palette={} priority={} hflip={} vflip={}{mask}",
        attribute.tile(),
        attribute.palette(),
        u8::from(attribute.priority()),
        u8::from(attribute.horizontal_flip()),
        u8::from(attribute.vertical_flip()),
    )
}

fn write_snapshot(cache: &AnySpriteCache, path: &str) -> anyhow::Result<()> {
    let bytes = bincode::encode_to_vec(cache, bincode::config::standard())
        .context("unable to serialize sprite cache")?;
    fs::write(path, bytes).with_context(|| format!("unable to write snapshot to '{path}'"))?;

    log::info!("Wrote sprite cache snapshot to '{path}'");

    Ok(())
}
