//! Shutdown reason codes
//!
//! A reason code is a major category, a minor category and flag bits packed
//! into one `u32`, using the numeric values of the Windows shutdown API:
//!
//! | Bits | Meaning |
//! |------|---------|
//! | `0xFF00_0000` | flags ([`ReasonFlags`]) |
//! | `0x00FF_0000` | major category ([`MajorReason`]) |
//! | `0x0000_FFFF` | minor category ([`MinorReason`]) |

use bitflags::bitflags;
use serde::Serialize;
use std::fmt;

const FLAGS_MASK: u32 = 0xFF00_0000;
const MAJOR_MASK: u32 = 0x00FF_0000;
const MINOR_MASK: u32 = 0x0000_FFFF;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Flag bits carried alongside the major/minor categories
    pub struct ReasonFlags: u32 {
        const USER_DEFINED = 0x4000_0000;
        const PLANNED = 0x8000_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MajorReason {
    Other = 0x0000_0000,
    Hardware = 0x0001_0000,
    OperatingSystem = 0x0002_0000,
    Software = 0x0003_0000,
    Application = 0x0004_0000,
    System = 0x0005_0000,
    Power = 0x0006_0000,
    LegacyApi = 0x0007_0000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MinorReason {
    Other = 0x00,
    Maintenance = 0x01,
    Installation = 0x02,
    Upgrade = 0x03,
    Reconfig = 0x04,
    Hung = 0x05,
    Unstable = 0x06,
    Disk = 0x07,
    Processor = 0x08,
    NetworkCard = 0x09,
    PowerSupply = 0x0a,
    CordUnplugged = 0x0b,
    Environment = 0x0c,
    HardwareDriver = 0x0d,
    OtherDriver = 0x0e,
    BlueScreen = 0x0f,
    ServicePack = 0x10,
    Hotfix = 0x11,
    SecurityFix = 0x12,
    Security = 0x13,
    NetworkConnectivity = 0x14,
    Wmi = 0x15,
    ServicePackUninstall = 0x16,
    SecurityFixUninstall = 0x18,
    Mmc = 0x19,
    TermSrv = 0x20,
}

impl MajorReason {
    fn from_bits(bits: u32) -> Option<Self> {
        Some(match bits {
            0x0000_0000 => Self::Other,
            0x0001_0000 => Self::Hardware,
            0x0002_0000 => Self::OperatingSystem,
            0x0003_0000 => Self::Software,
            0x0004_0000 => Self::Application,
            0x0005_0000 => Self::System,
            0x0006_0000 => Self::Power,
            0x0007_0000 => Self::LegacyApi,
            _ => return None,
        })
    }
}

impl MinorReason {
    fn from_bits(bits: u32) -> Option<Self> {
        Some(match bits {
            0x00 => Self::Other,
            0x01 => Self::Maintenance,
            0x02 => Self::Installation,
            0x03 => Self::Upgrade,
            0x04 => Self::Reconfig,
            0x05 => Self::Hung,
            0x06 => Self::Unstable,
            0x07 => Self::Disk,
            0x08 => Self::Processor,
            0x09 => Self::NetworkCard,
            0x0a => Self::PowerSupply,
            0x0b => Self::CordUnplugged,
            0x0c => Self::Environment,
            0x0d => Self::HardwareDriver,
            0x0e => Self::OtherDriver,
            0x0f => Self::BlueScreen,
            0x10 => Self::ServicePack,
            0x11 => Self::Hotfix,
            0x12 => Self::SecurityFix,
            0x13 => Self::Security,
            0x14 => Self::NetworkConnectivity,
            0x15 => Self::Wmi,
            0x16 => Self::ServicePackUninstall,
            0x18 => Self::SecurityFixUninstall,
            0x19 => Self::Mmc,
            0x20 => Self::TermSrv,
            _ => return None,
        })
    }
}

/// A decomposed reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u32")]
pub struct ShutdownReason {
    pub major: MajorReason,
    pub minor: MinorReason,
    pub flags: ReasonFlags,
}

impl ShutdownReason {
    pub fn new(major: MajorReason, minor: MinorReason, flags: ReasonFlags) -> Self {
        Self { major, minor, flags }
    }

    /// Application-initiated planned maintenance: the reason sent with every
    /// graceful and forced request.
    pub fn planned_maintenance() -> Self {
        Self::new(
            MajorReason::Application,
            MinorReason::Maintenance,
            ReasonFlags::PLANNED,
        )
    }

    /// No category, no flags. Used for commands that carry no reason.
    pub fn unspecified() -> Self {
        Self::new(MajorReason::Other, MinorReason::Other, ReasonFlags::empty())
    }

    pub fn bits(&self) -> u32 {
        self.flags.bits() | self.major as u32 | self.minor as u32
    }

    /// Decompose a raw code. `None` if any part is not a known value.
    pub fn from_bits(bits: u32) -> Option<Self> {
        Some(Self {
            major: MajorReason::from_bits(bits & MAJOR_MASK)?,
            minor: MinorReason::from_bits(bits & MINOR_MASK)?,
            flags: ReasonFlags::from_bits(bits & FLAGS_MASK)?,
        })
    }

    pub fn is_planned(&self) -> bool {
        self.flags.contains(ReasonFlags::PLANNED)
    }

    /// Major category as a small number (`Application` is 4).
    pub fn major_code(&self) -> u32 {
        (self.major as u32) >> 16
    }

    /// Minor category as a small number (`Maintenance` is 1).
    pub fn minor_code(&self) -> u32 {
        self.minor as u32
    }
}

impl From<ShutdownReason> for u32 {
    fn from(reason: ShutdownReason) -> Self {
        reason.bits()
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.bits())
    }
}
