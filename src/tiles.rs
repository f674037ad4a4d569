//! Tile code categories
//!
//! Each category owns six contiguous codes. The renderer picks a sprite from
//! the code, so the generator draws a random code within the category for
//! every cell.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of codes per category
pub const CODES_PER_CATEGORY: u8 = 6;

/// Highest code the generator emits
pub const MAX_TILE_CODE: u8 = 35;

/// Category of a tile code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileCategory {
    /// Unused cell outside every room (code 0)
    Void,
    /// Top row of a room
    NorthWall,
    /// Bottom row of a room
    SouthWall,
    /// Left column of a room, corners excluded
    WestWall,
    /// Right column of a room, corners excluded
    EastWall,
    /// Room interior
    Floor,
}

impl TileCategory {
    pub fn all() -> &'static [TileCategory] {
        &[
            TileCategory::Void,
            TileCategory::NorthWall,
            TileCategory::SouthWall,
            TileCategory::WestWall,
            TileCategory::EastWall,
            TileCategory::Floor,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            TileCategory::Void => "Void",
            TileCategory::NorthWall => "North wall",
            TileCategory::SouthWall => "South wall",
            TileCategory::WestWall => "West wall",
            TileCategory::EastWall => "East wall",
            TileCategory::Floor => "Floor",
        }
    }

    /// Inclusive code range `(low, high)`. Void only ever uses 0.
    pub fn range(&self) -> (u8, u8) {
        match self {
            TileCategory::Void => (0, 0),
            TileCategory::NorthWall => (6, 11),
            TileCategory::SouthWall => (12, 17),
            TileCategory::WestWall => (18, 23),
            TileCategory::EastWall => (24, 29),
            TileCategory::Floor => (30, 35),
        }
    }

    /// Classify a code. Codes 1-5 and anything above 35 are not emitted
    /// and have no category.
    pub fn of(code: u8) -> Option<TileCategory> {
        match code {
            0 => Some(TileCategory::Void),
            6..=11 => Some(TileCategory::NorthWall),
            12..=17 => Some(TileCategory::SouthWall),
            18..=23 => Some(TileCategory::WestWall),
            24..=29 => Some(TileCategory::EastWall),
            30..=35 => Some(TileCategory::Floor),
            _ => None,
        }
    }

    /// Draw a code uniformly from this category's range.
    pub fn sample(&self, rng: &mut impl Rng) -> u8 {
        let (low, high) = self.range();
        if low == high {
            return low;
        }
        rng.gen_range(low..=high)
    }

    /// ASCII character used in text renderings
    pub fn ascii_char(&self) -> char {
        match self {
            TileCategory::Void => ' ',
            TileCategory::NorthWall => '-',
            TileCategory::SouthWall => '_',
            TileCategory::WestWall => '[',
            TileCategory::EastWall => ']',
            TileCategory::Floor => '.',
        }
    }

    /// Display colour (RGB)
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            TileCategory::Void => (20, 18, 24),
            TileCategory::NorthWall => (140, 120, 100),
            TileCategory::SouthWall => (110, 92, 76),
            TileCategory::WestWall => (125, 106, 88),
            TileCategory::EastWall => (125, 106, 88),
            TileCategory::Floor => (208, 196, 173),
        }
    }

    /// Wall categories block movement
    pub fn is_solid(&self) -> bool {
        matches!(
            self,
            TileCategory::NorthWall
                | TileCategory::SouthWall
                | TileCategory::WestWall
                | TileCategory::EastWall
        )
    }

    /// Category of the cell at `(dx, dy)` inside a `width` x `height` room.
    /// Top and bottom rows win over the side columns at the corners.
    pub fn for_room_cell(dx: usize, dy: usize, width: usize, height: usize) -> TileCategory {
        if dy == 0 {
            TileCategory::NorthWall
        } else if dy + 1 == height {
            TileCategory::SouthWall
        } else if dx == 0 {
            TileCategory::WestWall
        } else if dx + 1 == width {
            TileCategory::EastWall
        } else {
            TileCategory::Floor
        }
    }
}

/// True for wall codes, i.e. `[6, 29]`
pub fn is_solid_code(code: u8) -> bool {
    TileCategory::of(code).map_or(false, |c| c.is_solid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_ranges_are_six_wide_and_contiguous() {
        let walls_and_floor = &TileCategory::all()[1..];
        let mut expected_low = 6;
        for category in walls_and_floor {
            let (low, high) = category.range();
            assert_eq!(low, expected_low);
            assert_eq!(high - low + 1, CODES_PER_CATEGORY);
            expected_low = high + 1;
        }
        assert_eq!(expected_low - 1, MAX_TILE_CODE);
    }

    #[test]
    fn test_sample_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for category in TileCategory::all() {
            for _ in 0..200 {
                let code = category.sample(&mut rng);
                assert_eq!(TileCategory::of(code), Some(*category));
            }
        }
    }

    #[test]
    fn test_unused_codes_have_no_category() {
        for code in 1..6 {
            assert_eq!(TileCategory::of(code), None);
        }
        assert_eq!(TileCategory::of(36), None);
    }

    #[test]
    fn test_corners_are_horizontal_walls() {
        assert_eq!(TileCategory::for_room_cell(0, 0, 5, 4), TileCategory::NorthWall);
        assert_eq!(TileCategory::for_room_cell(4, 0, 5, 4), TileCategory::NorthWall);
        assert_eq!(TileCategory::for_room_cell(0, 3, 5, 4), TileCategory::SouthWall);
        assert_eq!(TileCategory::for_room_cell(4, 3, 5, 4), TileCategory::SouthWall);
        assert_eq!(TileCategory::for_room_cell(0, 1, 5, 4), TileCategory::WestWall);
        assert_eq!(TileCategory::for_room_cell(4, 2, 5, 4), TileCategory::EastWall);
        assert_eq!(TileCategory::for_room_cell(2, 2, 5, 4), TileCategory::Floor);
    }

    #[test]
    fn test_single_row_room_is_all_north_wall() {
        for dx in 0..4 {
            assert_eq!(TileCategory::for_room_cell(dx, 0, 4, 1), TileCategory::NorthWall);
        }
    }

    #[test]
    fn test_solid_codes() {
        assert!(!is_solid_code(0));
        assert!(is_solid_code(6));
        assert!(is_solid_code(29));
        assert!(!is_solid_code(30));
    }
}
