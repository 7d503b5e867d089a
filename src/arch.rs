// Copyright 2026 twrpgen Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Device CPU architecture detection from an ELF binary.
//!
//! Classification reads `e_machine` from the ELF header instead of matching
//! substrings of file-magic output, so each family carries its own 64-bit
//! signal and no external magic database is needed.

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceArch {
    Arm,
    Arm64,
    X86,
    X86_64,
}

impl DeviceArch {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceArch::Arm => "arm",
            DeviceArch::Arm64 => "arm64",
            DeviceArch::X86 => "x86",
            DeviceArch::X86_64 => "x86_64",
        }
    }
}

impl fmt::Display for DeviceArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const EI_DATA: usize = 5;
const ELFDATA2LSB: u8 = 1;
const ELFDATA2MSB: u8 = 2;
// e_machine is a u16 at offset 18, in the byte order given by EI_DATA
const E_MACHINE: usize = 18;
const HEADER_LEN: usize = E_MACHINE + 2;

const EM_386: u16 = 3;
const EM_ARM: u16 = 40;
const EM_X86_64: u16 = 62;
const EM_AARCH64: u16 = 183;

/// Inspect `binary` and classify its target architecture.
///
/// Returns `Ok(None)` when the file is not an ELF binary (or belongs to a
/// family Android recoveries do not target); errors only on I/O failure.
pub fn detect(binary: &Path) -> Result<Option<DeviceArch>> {
    let mut file = File::open(binary)
        .with_context(|| format!("Failed to open binary {}", binary.display()))?;

    let mut header = [0u8; HEADER_LEN];
    match file.read_exact(&mut header) {
        Ok(()) => Ok(classify(&header)),
        // Shorter than an ELF header: not an ELF binary
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read binary {}", binary.display()))
        }
    }
}

/// Classify a raw ELF header prefix.
pub fn classify(header: &[u8]) -> Option<DeviceArch> {
    if header.len() < HEADER_LEN || header[..4] != ELF_MAGIC {
        return None;
    }

    let machine = match header[EI_DATA] {
        ELFDATA2LSB => u16::from_le_bytes([header[E_MACHINE], header[E_MACHINE + 1]]),
        ELFDATA2MSB => u16::from_be_bytes([header[E_MACHINE], header[E_MACHINE + 1]]),
        _ => return None,
    };

    match machine {
        EM_ARM => Some(DeviceArch::Arm),
        EM_AARCH64 => Some(DeviceArch::Arm64),
        EM_386 => Some(DeviceArch::X86),
        EM_X86_64 => Some(DeviceArch::X86_64),
        _ => None,
    }
}
