//! ARM compiler flags from `/proc/cpuinfo`
//!
//! Requires NEON and an ARM "CPU part" id present in [`CPU_PARTS`];
//! Apple silicon and other non-ARM designs are rejected.

use regex::Regex;
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub const CPUINFO_PATH: &str = "/proc/cpuinfo";

/// Target triple for a CPU part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmTarget {
    pub cpu: &'static str,
    pub arch: &'static str,
    pub fpu: &'static str,
}

impl fmt::Display for ArmTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-march={} -mcpu={} -mfpu={}", self.arch, self.cpu, self.fpu)
    }
}

const fn target(cpu: &'static str, arch: &'static str, fpu: &'static str) -> ArmTarget {
    ArmTarget { cpu, arch, fpu }
}

/// CPU part id to compiler target
pub const CPU_PARTS: &[(u32, ArmTarget)] = &[
    (0xc05, target("cortex-a5", "armv7-a", "neon-fp16")),
    (0xc07, target("cortex-a7", "armv7ve", "neon-vfpv4")),
    (0xc08, target("cortex-a8", "armv7-a+neon", "neon")),
    (0xc09, target("cortex-a9", "armv7-a+neon", "neon-fp16")),
    (0xc0f, target("cortex-a15", "armv7ve", "neon-vfpv4")),
    (0xc0e, target("cortex-a17", "armv7-a", "neon")),
    (0xd03, target("cortex-a53", "armv8-a+crc", "crypto-neon-fp-armv8")),
    (0xd07, target("cortex-a57", "armv8-a+crc", "neon-fp-armv8")),
    (0xd08, target("cortex-a72", "armv8-a+crc", "crypto-neon-fp-armv8")),
    (0xd09, target("cortex-a73", "armv8-a+crc", "neon")),
    (0xd0a, target("cortex-a73", "armv8-a+crc", "neon")),
    (0xd0b, target("cortex-a76", "armv8.2-a", "neon")),
    (0xd0d, target("cortex-a77", "armv8.2-a", "neon")),
    (0xd47, target("cortex-a710", "armv9-a", "neon")),
    (0xb76, target("arm1176jzf-s", "armv6", "neon")),
    (0xd04, target("cortex-a35", "armv8-a+crc", "neon")),
    (0xd05, target("cortex-a55", "armv8.2-a", "neon")),
    (0xd46, target("cortex-a510", "armv9-a", "neon")),
];

#[derive(Error, Debug)]
pub enum CpuFlagsError {
    #[error("NEON not found")]
    NeonMissing,

    #[error("Could not establish CPU part")]
    CpuPartMissing,

    #[error("unknown machine (CPU part {0:#x})")]
    UnknownCpuPart(u32),

    #[error(transparent)]
    Pattern(#[from] regex::Error),

    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

pub fn lookup(part: u32) -> Option<ArmTarget> {
    CPU_PARTS
        .iter()
        .find(|(id, _)| *id == part)
        .map(|(_, target)| *target)
}

/// Parse cpuinfo text into a compiler target
pub fn detect(cpuinfo: &str) -> Result<ArmTarget, CpuFlagsError> {
    if !cpuinfo.contains("neon") {
        return Err(CpuFlagsError::NeonMissing);
    }

    let re = Regex::new(r"(?m)^CPU part.*: ([0-9A-Za-z]+)")?;
    let raw = re
        .captures(cpuinfo)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or(CpuFlagsError::CpuPartMissing)?;

    let hex = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    let part = u32::from_str_radix(hex, 16).map_err(|_| CpuFlagsError::CpuPartMissing)?;

    lookup(part).ok_or(CpuFlagsError::UnknownCpuPart(part))
}

pub fn detect_from_file(path: &Path) -> Result<ArmTarget, CpuFlagsError> {
    let cpuinfo = std::fs::read_to_string(path).map_err(|source| CpuFlagsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    detect(&cpuinfo)
}
