// iNES / NES 2.0 header inspection and CHR-ROM location
use bitflags::bitflags;

use super::error::ExportError;

pub const HEADER_SIZE: usize = 16;
pub const TRAINER_SIZE: usize = 512;
pub const PRG_UNIT_SIZE: usize = 16 * 1024;
pub const CHR_UNIT_SIZE: usize = 8 * 1024;

const MAGIC: &[u8; 4] = b"NES\x1A";

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags6: u8 {
        const TRAINER = 1 << 2;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags7: u8 {
        // bits 2-3 == 0b10 marks NES 2.0
        const NES2_ID = 1 << 3;
        const NES2_MASK = (1 << 3) | (1 << 2);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub is_valid_ines: bool,
    /// Only meaningful when `is_valid_ines` is set.
    pub is_nes20: bool,
}

/// Looks at the first 8 bytes only. Shorter inputs are never valid.
pub fn inspect(rom: &[u8]) -> FormatInfo {
    let is_valid_ines = rom.starts_with(MAGIC);
    let is_nes20 = is_valid_ines
        && rom
            .get(7)
            .map(|&b| (Flags7::from_bits_truncate(b) & Flags7::NES2_MASK) == Flags7::NES2_ID)
            .unwrap_or(false);

    FormatInfo { is_valid_ines, is_nes20 }
}

/// Byte range of the tile graphics inside the ROM image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChrRegion {
    pub offset: usize,
    pub length: usize,
}

impl ChrRegion {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Borrows the region out of `rom`, or `TooSmall` when the file ends early.
    pub fn slice<'a>(&self, rom: &'a [u8]) -> Result<&'a [u8], ExportError> {
        rom.get(self.offset..self.end()).ok_or(ExportError::TooSmall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomHeader {
    pub prg_units: u8,
    pub chr_units: u8,
    pub flags6: Flags6,
    pub format: FormatInfo,
}

impl RomHeader {
    pub fn parse(rom: &[u8]) -> Result<Self, ExportError> {
        if rom.len() < HEADER_SIZE {
            return Err(ExportError::TooSmall);
        }

        let format = inspect(rom);
        if !format.is_valid_ines {
            return Err(ExportError::UnsupportedFormat);
        }

        Ok(Self {
            prg_units: rom[4],
            chr_units: rom[5],
            flags6: Flags6::from_bits_truncate(rom[6]),
            format,
        })
    }

    pub fn has_trainer(&self) -> bool {
        self.flags6.contains(Flags6::TRAINER)
    }

    // NES 2.0 extended size fields (byte 9) are not consulted.
    pub fn chr_region(&self) -> ChrRegion {
        let trainer_size = if self.has_trainer() { TRAINER_SIZE } else { 0 };
        let prg_size = self.prg_units as usize * PRG_UNIT_SIZE;

        ChrRegion {
            offset: HEADER_SIZE + trainer_size + prg_size,
            length: self.chr_units as usize * CHR_UNIT_SIZE,
        }
    }
}
