//! Per-backup status flags.

use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask of the boolean attributes the server reports for each backup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BackupFlags(u16);

impl BackupFlags {
    pub const HARDLINKED: Self = Self(1 << 0);
    pub const DELETABLE: Self = Self(1 << 1);
    pub const WORKING: Self = Self(1 << 2);
    pub const FINISHING: Self = Self(1 << 3);
    pub const CURRENT: Self = Self(1 << 4);
    pub const MANIFEST: Self = Self(1 << 5);
    pub const LOG_BACKUP: Self = Self(1 << 6);
    pub const LOG_RESTORE: Self = Self(1 << 7);
    pub const LOG_VERIFY: Self = Self(1 << 8);

    /// Feed field name for every flag, in bit order.
    pub const FIELDS: [(&'static str, BackupFlags); 9] = [
        ("hardlinked", Self::HARDLINKED),
        ("deletable", Self::DELETABLE),
        ("working", Self::WORKING),
        ("finishing", Self::FINISHING),
        ("current", Self::CURRENT),
        ("manifest", Self::MANIFEST),
        ("backup", Self::LOG_BACKUP),
        ("restore", Self::LOG_RESTORE),
        ("verify", Self::LOG_VERIFY),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Look up the flag carried by a feed field.
    pub fn from_field(name: &str) -> Option<Self> {
        Self::FIELDS
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, flag)| *flag)
    }

    /// Field names of the flags that are set, in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::FIELDS
            .into_iter()
            .filter(move |(_, flag)| self.contains(*flag))
            .map(|(field, _)| field)
    }
}

impl BitOr for BackupFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for BackupFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for BackupFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for name in self.names() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for BackupFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}
