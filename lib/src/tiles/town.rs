//! Town tiles. Founding a town grants one tile from the remaining stock;
//! every tile carries at least one town key.

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TownTile {
  /// TW1: 5 VP and 8 coins.
  Coins8,
  /// TW2: 7 VP, 2 workers and a priest.
  PriestWorkers,
  /// TW3: 6 VP and 6 power.
  Power6,
  /// TW4: 7 VP.
  Vp7,
  /// TW5: 8 VP and a cult step on every track.
  CultSteps,
  /// TW6: 4 VP and two keys.
  Keys2,
  /// TW7: 4 VP and a shipping level (carpet range for the Fakirs).
  Shipping,
}

pub const TOWN_TILES: [TownTile; 7] = [
  TownTile::Coins8,
  TownTile::PriestWorkers,
  TownTile::Power6,
  TownTile::Vp7,
  TownTile::CultSteps,
  TownTile::Keys2,
  TownTile::Shipping,
];

impl TownTile {
  pub fn code(self) -> &'static str {
    match self {
      TownTile::Coins8 => "TW1",
      TownTile::PriestWorkers => "TW2",
      TownTile::Power6 => "TW3",
      TownTile::Vp7 => "TW4",
      TownTile::CultSteps => "TW5",
      TownTile::Keys2 => "TW6",
      TownTile::Shipping => "TW7",
    }
  }

  pub fn from_code(code: &str) -> Option<TownTile> {
    let upper = code.to_ascii_uppercase();
    TOWN_TILES.iter().cloned().find(|t| t.code() == upper)
  }

  pub fn vp(self) -> i32 {
    match self {
      TownTile::Coins8 => 5,
      TownTile::PriestWorkers => 7,
      TownTile::Power6 => 6,
      TownTile::Vp7 => 7,
      TownTile::CultSteps => 8,
      TownTile::Keys2 | TownTile::Shipping => 4,
    }
  }

  pub fn keys(self) -> u8 {
    if self == TownTile::Keys2 {
      2
    } else {
      1
    }
  }

  /// Two copies of each tile in the box.
  pub fn stock(self) -> u8 {
    2
  }
}

#[cfg(test)]
mod tests {
  use crate::tiles::town::*;

  #[test]
  fn codes_round_trip() {
    for t in TOWN_TILES.iter() {
      assert_eq!(TownTile::from_code(t.code()), Some(*t));
    }
  }

  #[test]
  fn every_tile_brings_a_key() {
    for t in TOWN_TILES.iter() {
      assert!(t.keys() >= 1);
    }
    assert_eq!(TownTile::Keys2.keys(), 2);
  }
}
