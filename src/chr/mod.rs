// CHR-ROM to spritesheet export
mod error;
mod rom;
mod sheet;
mod tile;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, trace};

pub use error::ExportError;
use rom::RomHeader;
use sheet::{Spritesheet, TILES_PER_SHEET};
use tile::Tile;

/// Validates `rom` and renders its CHR data, 256 tiles per sheet.
/// A ROM without CHR data yields no sheets.
pub fn spritesheets(rom: &[u8]) -> Result<Vec<Spritesheet>, ExportError> {
    let header = RomHeader::parse(rom)?;
    let region = header.chr_region();
    debug!(
        "{} header, trainer: {}, CHR at {:#x} ({} bytes)",
        if header.format.is_nes20 { "NES 2.0" } else { "iNES" },
        header.has_trainer(),
        region.offset,
        region.length,
    );

    let chr = region.slice(rom)?;
    let tiles: Vec<Tile> = tile::tiles(chr).collect();
    debug!("{} tiles", tiles.len());
    if let Some(first) = tiles.first() {
        trace!("first tile:\n{first}");
    }

    Ok(compose_sheets(&tiles))
}

/// One sheet per run of up to 256 tiles, in order.
pub fn compose_sheets(tiles: &[Tile]) -> Vec<Spritesheet> {
    tiles.chunks(TILES_PER_SHEET).map(Spritesheet::compose).collect()
}

/// `<rom>-<index>.png`, next to the ROM.
pub fn sheet_path(rom: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(rom.as_os_str());
    name.push(format!("-{index}.png"));
    PathBuf::from(name)
}

/// Exports one ROM file and returns how many sheets were written.
pub fn export_rom(path: &Path) -> Result<usize, ExportError> {
    let rom = fs::read(path).map_err(|source| ExportError::NotFound { source })?;
    let sheets = spritesheets(&rom)?;

    for (index, sheet) in sheets.iter().enumerate() {
        let out = sheet_path(path, index);
        sheet.write_png(&out)?;
        info!("wrote {}", out.display());
    }

    Ok(sheets.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn rom(prg: u8, chr: u8, flags6: u8, chr_data: &[u8]) -> Vec<u8> {
        let mut data = vec![b'N', b'E', b'S', 0x1A, prg, chr, flags6, 0];
        data.resize(16, 0);
        if flags6 & 0x04 != 0 {
            data.resize(data.len() + 512, 0xEE);
        }
        data.resize(data.len() + prg as usize * 16384, 0xAA);
        data.extend_from_slice(chr_data);
        data
    }

    fn read_png(path: &Path) -> (png::OutputInfo, Vec<u8>) {
        let mut reader = png::Decoder::new(File::open(path).unwrap())
            .read_info()
            .unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info, buf)
    }

    #[test]
    fn short_file_is_too_small() {
        assert!(matches!(spritesheets(&[0x4E; 10]), Err(ExportError::TooSmall)));
    }

    #[test]
    fn sixteen_zero_bytes_is_unsupported() {
        let err = spritesheets(&[0; 16]).err().unwrap();
        assert!(matches!(err, ExportError::UnsupportedFormat));
        assert_eq!(
            err.to_string(),
            "Unsupported file format. Expected iNES or NES 2.0 ROM"
        );
    }

    #[test]
    fn truncated_chr_is_too_small() {
        let mut data = rom(1, 1, 0, &[0; 8192]);
        data.pop();
        let err = spritesheets(&data).err().unwrap();
        assert_eq!(err.to_string(), "Too small");
    }

    #[test]
    fn no_chr_means_no_sheets() {
        assert_eq!(spritesheets(&rom(0, 0, 0, &[])).unwrap().len(), 0);
    }

    #[test]
    fn one_chr_bank_is_two_sheets() {
        // 8 KiB = 512 tiles
        assert_eq!(spritesheets(&rom(1, 1, 0, &[0; 8192])).unwrap().len(), 2);
    }

    #[test]
    fn tile_257_opens_a_second_sheet() {
        let mut tiles = vec![Tile::new([0xFF; 16]); 257];
        tiles[256] = Tile::new([0x00, 0xFF, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let sheets = compose_sheets(&tiles);
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].pixel(127, 127), [0xFF; 3]);

        let second = &sheets[1];
        assert_eq!(second.pixel(0, 1), [0x80; 3]);
        assert_eq!(second.pixel(0, 0), [0x00; 3]);
        let lit = second.rgb().iter().filter(|&&b| b != 0).count();
        assert_eq!(lit, 8 * 3);
    }

    #[test]
    fn trailing_bytes_after_chr_are_ignored() {
        let mut data = rom(0, 1, 0x04, &[0; 8192]);
        data.extend_from_slice(b"extra");
        assert_eq!(spritesheets(&data).unwrap().len(), 2);
    }

    #[test]
    fn sheet_path_appends_index() {
        assert_eq!(
            sheet_path(Path::new("roms/game.nes"), 3),
            PathBuf::from("roms/game.nes-3.png")
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = export_rom(&dir.path().join("absent.nes")).err().unwrap();
        assert!(matches!(err, ExportError::NotFound { .. }));
        assert_eq!(err.to_string(), "No file");
    }

    #[test]
    fn failed_checks_write_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.nes");
        fs::write(&path, [0u8; 16]).unwrap();

        assert!(export_rom(&path).is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn exports_a_chr_bank_into_two_sheets() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game.nes");

        // 256 gray tiles, then one white tile opening the second sheet
        let mut chr = Vec::new();
        for _ in 0..256 {
            chr.extend_from_slice(&[0xFF; 8]);
            chr.extend_from_slice(&[0x00; 8]);
        }
        chr.extend_from_slice(&[0xFF; 16]);
        // rest of the bank stays zero, i.e. black
        chr.resize(8192, 0);
        fs::write(&path, rom(1, 1, 0, &chr)).unwrap();

        assert_eq!(export_rom(&path).unwrap(), 2);

        let (info, first) = read_png(&dir.path().join("game.nes-0.png"));
        assert_eq!((info.width, info.height), (128, 128));
        assert_eq!(info.color_type, png::ColorType::Rgb);
        assert!(first.iter().all(|&b| b == 0x80));

        let (_, second) = read_png(&dir.path().join("game.nes-1.png"));
        for y in 0..128 {
            for x in 0..128 {
                let idx = (y * 128 + x) * 3;
                let expected = if x < 8 && y < 8 { 0xFF } else { 0x00 };
                assert_eq!(&second[idx..idx + 3], &[expected; 3], "({x}, {y})");
            }
        }
        assert!(!dir.path().join("game.nes-2.png").exists());
    }
}
