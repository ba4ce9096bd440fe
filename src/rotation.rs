//! Panel orientation

use crate::flag::Flag;

/// Display orientation, written to the memory access control register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    /// Native orientation, mirrored on both axes
    #[default]
    Portrait,
    /// Rotated a quarter turn (rows and columns exchanged)
    Landscape,
    /// Portrait turned upside down
    Portrait180,
    /// Landscape turned upside down
    Landscape180,
}

impl Rotation {
    /// MADCTL parameter byte for this orientation
    pub const fn madctl(self) -> u8 {
        match self {
            Rotation::Portrait => Flag::MADCTL_MX | Flag::MADCTL_MY | Flag::MADCTL_RGB,
            Rotation::Landscape => Flag::MADCTL_MY | Flag::MADCTL_MV | Flag::MADCTL_RGB,
            Rotation::Portrait180 => Flag::MADCTL_RGB,
            Rotation::Landscape180 => Flag::MADCTL_MX | Flag::MADCTL_MV | Flag::MADCTL_RGB,
        }
    }

    /// True when the controller exchanges rows and columns, which swaps the
    /// logical width and height.
    pub const fn is_transposed(self) -> bool {
        self.madctl() & Flag::MADCTL_MV != 0
    }

    /// Logical `(width, height)` for a panel given as `height` x `width`
    pub const fn dimensions(self, height: u16, width: u16) -> (u16, u16) {
        if self.is_transposed() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl TryFrom<u8> for Rotation {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rotation::Portrait),
            1 => Ok(Rotation::Landscape),
            2 => Ok(Rotation::Portrait180),
            3 => Ok(Rotation::Landscape180),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_patterns() {
        assert_eq!(Rotation::Portrait.madctl(), 0xC0);
        assert_eq!(Rotation::Landscape.madctl(), 0xA0);
        assert_eq!(Rotation::Portrait180.madctl(), 0x00);
        assert_eq!(Rotation::Landscape180.madctl(), 0x60);
    }

    #[test]
    fn only_landscape_variants_transpose() {
        assert!(!Rotation::Portrait.is_transposed());
        assert!(Rotation::Landscape.is_transposed());
        assert!(!Rotation::Portrait180.is_transposed());
        assert!(Rotation::Landscape180.is_transposed());
    }

    #[test]
    fn dimensions_follow_transposition() {
        assert_eq!(Rotation::Portrait.dimensions(240, 135), (135, 240));
        assert_eq!(Rotation::Landscape.dimensions(240, 135), (240, 135));
        assert_eq!(Rotation::Portrait180.dimensions(320, 240), (240, 320));
        assert_eq!(Rotation::Landscape180.dimensions(320, 240), (320, 240));
    }

    #[test]
    fn from_raw_index() {
        assert_eq!(Rotation::try_from(1), Ok(Rotation::Landscape));
        assert_eq!(Rotation::try_from(4), Err(4));
    }
}
