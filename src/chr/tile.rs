// 8x8 CHR tiles: two bit-planes, low plane first
use std::fmt;

pub const TILE_SIZE: usize = 16;
pub const TILE_WIDTH: usize = 8;

const PLANE_SIZE: usize = TILE_SIZE / 2;

/// Raw tile bytes. Pixels are decoded on demand by [`Tile::color_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile([u8; TILE_SIZE]);

impl Tile {
    #[cfg(test)]
    pub fn new(data: [u8; TILE_SIZE]) -> Self {
        Self(data)
    }

    #[cfg(test)]
    pub fn bytes(&self) -> &[u8; TILE_SIZE] {
        &self.0
    }

    /// Color index 0..=3 of pixel (`x`, `y`), both in 0..8 with x = 0 leftmost.
    pub fn color_index(&self, x: usize, y: usize) -> u8 {
        debug_assert!(x < TILE_WIDTH && y < TILE_WIDTH);
        let bit = 7 - x;
        let low = (self.0[y] >> bit) & 1;
        let high = (self.0[y + PLANE_SIZE] >> bit) & 1;
        low | (high << 1)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..TILE_WIDTH {
            for x in 0..TILE_WIDTH {
                let c = match self.color_index(x, y) {
                    0 => '.',
                    1 => '1',
                    2 => '2',
                    _ => '3',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Cuts CHR data into tiles in ascending offset order. A trailing partial tile is dropped.
pub fn tiles(chr: &[u8]) -> impl Iterator<Item = Tile> + '_ {
    chr.chunks_exact(TILE_SIZE).map(|chunk| {
        let mut data = [0u8; TILE_SIZE];
        data.copy_from_slice(chunk);
        Tile(data)
    })
}
