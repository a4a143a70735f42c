// 128x128 RGB spritesheets, 16x16 tiles each
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::error::ExportError;
use super::tile::{Tile, TILE_WIDTH};

pub const SHEET_TILES: usize = 16;
pub const TILES_PER_SHEET: usize = SHEET_TILES * SHEET_TILES;
pub const SHEET_SIZE: usize = SHEET_TILES * TILE_WIDTH;
pub const CHANNELS: usize = 3;

/// RGB for color indices 0..=3.
pub const PALETTE: [[u8; CHANNELS]; 4] = [
    [0x00, 0x00, 0x00],
    [0x80, 0x80, 0x80],
    [0xA9, 0xA9, 0xA9],
    [0xFF, 0xFF, 0xFF],
];

pub struct Spritesheet {
    rgb: Vec<u8>, // SHEET_SIZE * SHEET_SIZE * CHANNELS
}

impl Spritesheet {
    /// Lays tiles out left to right, top to bottom. Tiles past the 256th are ignored
    /// and empty cells stay black.
    pub fn compose(tiles: &[Tile]) -> Self {
        let mut rgb = vec![0; SHEET_SIZE * SHEET_SIZE * CHANNELS];

        for (i, tile) in tiles.iter().take(TILES_PER_SHEET).enumerate() {
            let left = (i % SHEET_TILES) * TILE_WIDTH;
            let top = (i / SHEET_TILES) * TILE_WIDTH;

            for y in 0..TILE_WIDTH {
                for x in 0..TILE_WIDTH {
                    let idx = ((top + y) * SHEET_SIZE + left + x) * CHANNELS;
                    let color = PALETTE[tile.color_index(x, y) as usize];
                    rgb[idx..idx + CHANNELS].copy_from_slice(&color);
                }
            }
        }

        Self { rgb }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; CHANNELS] {
        let idx = (y * SHEET_SIZE + x) * CHANNELS;
        [self.rgb[idx], self.rgb[idx + 1], self.rgb[idx + 2]]
    }

    #[cfg(test)]
    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    pub fn encode<W: Write>(&self, w: W) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(w, SHEET_SIZE as u32, SHEET_SIZE as u32);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Default);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.rgb)?;
        writer.finish()
    }

    pub fn write_png(&self, path: &Path) -> Result<(), ExportError> {
        let write = || -> Result<(), png::EncodingError> {
            let mut file = BufWriter::new(File::create(path)?);
            self.encode(&mut file)?;
            file.flush()?;
            Ok(())
        };

        write().map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
