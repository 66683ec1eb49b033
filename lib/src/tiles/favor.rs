//! Favor tiles: an immediate cult bump plus, on the smaller tiles, an
//! ongoing effect. A player never holds two copies of the same tile.

use crate::cult::CultTrack;
use crate::faction::Income;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FavorTile {
  Fire3,
  Water3,
  Earth3,
  Air3,
  Fire2,
  Water2,
  Earth2,
  Air2,
  Fire1,
  Water1,
  Earth1,
  Air1,
}

pub const FAVOR_TILES: [FavorTile; 12] = [
  FavorTile::Fire3,
  FavorTile::Water3,
  FavorTile::Earth3,
  FavorTile::Air3,
  FavorTile::Fire2,
  FavorTile::Water2,
  FavorTile::Earth2,
  FavorTile::Air2,
  FavorTile::Fire1,
  FavorTile::Water1,
  FavorTile::Earth1,
  FavorTile::Air1,
];

impl FavorTile {
  /// FAV1 through FAV12, in catalog order.
  pub fn code(self) -> &'static str {
    match self {
      FavorTile::Fire3 => "FAV1",
      FavorTile::Water3 => "FAV2",
      FavorTile::Earth3 => "FAV3",
      FavorTile::Air3 => "FAV4",
      FavorTile::Fire2 => "FAV5",
      FavorTile::Water2 => "FAV6",
      FavorTile::Earth2 => "FAV7",
      FavorTile::Air2 => "FAV8",
      FavorTile::Fire1 => "FAV9",
      FavorTile::Water1 => "FAV10",
      FavorTile::Earth1 => "FAV11",
      FavorTile::Air1 => "FAV12",
    }
  }

  pub fn from_code(code: &str) -> Option<FavorTile> {
    let upper = code.to_ascii_uppercase();
    FAVOR_TILES.iter().cloned().find(|t| t.code() == upper)
  }

  pub fn track(self) -> CultTrack {
    match self {
      FavorTile::Fire3 | FavorTile::Fire2 | FavorTile::Fire1 => CultTrack::Fire,
      FavorTile::Water3 | FavorTile::Water2 | FavorTile::Water1 => CultTrack::Water,
      FavorTile::Earth3 | FavorTile::Earth2 | FavorTile::Earth1 => CultTrack::Earth,
      FavorTile::Air3 | FavorTile::Air2 | FavorTile::Air1 => CultTrack::Air,
    }
  }

  /// Immediate cult steps on take.
  pub fn cult_steps(self) -> u8 {
    match self {
      FavorTile::Fire3 | FavorTile::Water3 | FavorTile::Earth3 | FavorTile::Air3 => 3,
      FavorTile::Fire2 | FavorTile::Water2 | FavorTile::Earth2 | FavorTile::Air2 => 2,
      _ => 1,
    }
  }

  /// The +3 tiles exist once; the rest three times.
  pub fn stock(self) -> u8 {
    if self.cult_steps() == 3 {
      1
    } else {
      3
    }
  }

  /// Ongoing income printed on the tile.
  pub fn income(self) -> Income {
    match self {
      FavorTile::Earth2 => Income {
        workers: 1,
        power: 1,
        ..Income::default()
      },
      FavorTile::Air2 => Income {
        power: 4,
        ..Income::default()
      },
      FavorTile::Fire1 => Income {
        coins: 3,
        ..Income::default()
      },
      _ => Income::default(),
    }
  }

  /// Pass VP ladder of the Air+1 tile, indexed by trading house count.
  pub fn pass_vp_by_trading_houses(count: u8) -> i32 {
    [0, 2, 3, 3, 4][count.min(4) as usize]
  }
}

#[cfg(test)]
mod tests {
  use crate::tiles::favor::*;

  #[test]
  fn codes_round_trip() {
    for t in FAVOR_TILES.iter() {
      assert_eq!(FavorTile::from_code(t.code()), Some(*t));
    }
  }

  #[test]
  fn stock_totals_twenty_eight() {
    let total: u32 = FAVOR_TILES.iter().map(|t| t.stock() as u32).sum();
    assert_eq!(total, 4 + 8 * 3);
  }

  #[test]
  fn ongoing_income_tiles() {
    assert_eq!(FavorTile::Fire1.income().coins, 3);
    assert_eq!(FavorTile::Earth2.income().workers, 1);
    assert_eq!(FavorTile::Earth2.income().power, 1);
    assert_eq!(FavorTile::Air2.income().power, 4);
    assert_eq!(FavorTile::Fire3.income(), Income::default());
  }

  #[test]
  fn air_one_pass_ladder() {
    assert_eq!(FavorTile::pass_vp_by_trading_houses(0), 0);
    assert_eq!(FavorTile::pass_vp_by_trading_houses(1), 2);
    assert_eq!(FavorTile::pass_vp_by_trading_houses(4), 4);
    assert_eq!(FavorTile::pass_vp_by_trading_houses(7), 4);
  }
}
