use std::fmt;

/// Capabilities gated on the connected server's version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Role level privilege management, `ALTER ROLE ... SET` included.
    Privileges,
}

impl Feature {
    pub fn min_version(&self) -> ServerVersion {
        match self {
            Feature::Privileges => ServerVersion::new(9, 0, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Decodes `server_version_num`, e.g. `90624` (9.6.24) or `150004` (15.4).
    pub fn from_num(num: u32) -> Self {
        if num >= 100_000 {
            Self::new(num / 10_000, num % 10_000, 0)
        } else {
            Self::new(num / 10_000, (num / 100) % 100, num % 100)
        }
    }

    pub fn supports(&self, feature: Feature) -> bool {
        *self >= feature.min_version()
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
