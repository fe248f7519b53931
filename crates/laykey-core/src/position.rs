// Laykey Position Type
// Identifies a physical key by its (row, column) matrix coordinates

use std::fmt;

/// A physical key position in the switch matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl From<(u8, u8)> for Position {
    fn from((row, col): (u8, u8)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_basics() {
        let pos = Position::new(2, 1);
        assert_eq!(pos, Position::from((2, 1)));
        assert_eq!(pos.to_string(), "(2,1)");
        assert!(Position::new(1, 5) < Position::new(2, 0));
    }
}
