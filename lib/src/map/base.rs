//! # Base board layout
//!
//! The base game board: 9 rows alternating 13 and 12 hexes, 113 cells total.
//! Rows are written top to bottom with one character per cell. Odd rows are
//! shifted half a hex to the right, which the axial conversion in
//! [`super::Map::base`] accounts for.
//!
//! Letter codes: `P`lains, `S`wamp, `L`ake, `F`orest, `M`ountain,
//! `W`asteland, `D`esert and `~` for river.

pub const BASE_ROWS: [&str; 9] = [
  "PMFLDWPSWFLWS",
  "D~~PS~~DS~~D",
  "~~S~M~F~F~M~~",
  "FLD~~WL~W~WP",
  "SPWLSWM~~FMLD",
  "M~~~~DF~~~PM",
  "M~M~W~F~DSL~~",
  "WS~LSL~~PMP~",
  "DLP~~~SLSWD~~",
];

/// Row letters used by the human-readable board notation (`A1` .. `I13`).
pub const ROW_LETTERS: [char; 9] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I'];

/// Converts a (row, column) board position to an axial coordinate. Rows are
/// 0-based, columns are 0-based within the row.
pub fn row_col_to_axial(row: usize, col: usize) -> crate::hex::Hex {
  crate::hex::Hex::new(col as i32 - (row as i32 / 2), row as i32)
}

/// Inverse of [`row_col_to_axial`]; returns `None` for hexes outside the
/// 9-row band.
pub fn axial_to_row_col(h: crate::hex::Hex) -> Option<(usize, usize)> {
  if h.r < 0 || h.r > 8 {
    return None;
  }
  let row = h.r as usize;
  let col = h.q + (h.r / 2);
  if col < 0 {
    return None;
  }
  Some((row, col as usize))
}
