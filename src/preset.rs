use core::fmt;

use crate::config::CurrentRange;

/// Current sub-ranges offered to the operator when starting a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    Low,
    Mid,
    High,
}

impl RangePreset {
    pub const ALL: [RangePreset; 3] = [RangePreset::Low, RangePreset::Mid, RangePreset::High];

    /// Parses a menu choice (`"1"`, `"2"` or `"3"`, surrounding whitespace
    /// ignored).
    pub fn from_selection(selection: &str) -> Option<Self> {
        match selection.trim() {
            "1" => Some(Self::Low),
            "2" => Some(Self::Mid),
            "3" => Some(Self::High),
            _ => None,
        }
    }

    /// The menu key for this preset.
    pub fn key(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Mid => 2,
            Self::High => 3,
        }
    }

    pub fn range(self) -> CurrentRange {
        match self {
            Self::Low => CurrentRange::new_unchecked(4.0, 10.0),
            Self::Mid => CurrentRange::new_unchecked(8.0, 14.0),
            Self::High => CurrentRange::new_unchecked(14.0, 20.0),
        }
    }
}

impl fmt::Display for RangePreset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.range())
    }
}
