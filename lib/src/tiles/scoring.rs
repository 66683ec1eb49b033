//! Round scoring tiles. Each tile names an action that pays VP during its
//! round and a cult reward handed out at cleanup, once per full `threshold`
//! steps on the tile's track.

use crate::cult::CultTrack;

/// The in-round events a scoring tile can pay for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringEvent {
  /// One spade of terraforming.
  Spade,
  Dwelling,
  TradingHouse,
  /// Stronghold or sanctuary.
  BigBuilding,
  TownFounded,
}

/// What the cult reward pays out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CultReward {
  Coins(u32),
  Workers(u32),
  Priests(u32),
  Power(u8),
  /// Spades are queued as pending sub-actions and must be spent or
  /// forfeited before the next income phase.
  Spades(u8),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoringTile {
  /// SCORE1: 2 VP per spade; 1 coin per Earth step.
  Spades,
  /// SCORE2: 5 VP per town founded; a spade per 4 Earth.
  Towns,
  /// SCORE3: 2 VP per dwelling; a priest per 4 Water.
  DwellingWater,
  /// SCORE4: 2 VP per dwelling; 4 power per 4 Fire.
  DwellingFire,
  /// SCORE5: 3 VP per trading house; a spade per 4 Water.
  TradingWater,
  /// SCORE6: 3 VP per trading house; a spade per 4 Air.
  TradingAir,
  /// SCORE7: 5 VP per stronghold or sanctuary; a worker per 2 Fire.
  StrongholdFire,
  /// SCORE8: 5 VP per stronghold or sanctuary; a worker per 2 Air.
  StrongholdAir,
}

pub const SCORING_TILES: [ScoringTile; 8] = [
  ScoringTile::Spades,
  ScoringTile::Towns,
  ScoringTile::DwellingWater,
  ScoringTile::DwellingFire,
  ScoringTile::TradingWater,
  ScoringTile::TradingAir,
  ScoringTile::StrongholdFire,
  ScoringTile::StrongholdAir,
];

impl ScoringTile {
  pub fn code(self) -> &'static str {
    match self {
      ScoringTile::Spades => "SCORE1",
      ScoringTile::Towns => "SCORE2",
      ScoringTile::DwellingWater => "SCORE3",
      ScoringTile::DwellingFire => "SCORE4",
      ScoringTile::TradingWater => "SCORE5",
      ScoringTile::TradingAir => "SCORE6",
      ScoringTile::StrongholdFire => "SCORE7",
      ScoringTile::StrongholdAir => "SCORE8",
    }
  }

  pub fn from_code(code: &str) -> Option<ScoringTile> {
    let upper = code.to_ascii_uppercase();
    SCORING_TILES.iter().cloned().find(|t| t.code() == upper)
  }

  /// VP paid immediately when `event` happens during this tile's round.
  pub fn action_vp(self, event: ScoringEvent) -> i32 {
    match (self, event) {
      (ScoringTile::Spades, ScoringEvent::Spade) => 2,
      (ScoringTile::Towns, ScoringEvent::TownFounded) => 5,
      (ScoringTile::DwellingWater, ScoringEvent::Dwelling)
      | (ScoringTile::DwellingFire, ScoringEvent::Dwelling) => 2,
      (ScoringTile::TradingWater, ScoringEvent::TradingHouse)
      | (ScoringTile::TradingAir, ScoringEvent::TradingHouse) => 3,
      (ScoringTile::StrongholdFire, ScoringEvent::BigBuilding)
      | (ScoringTile::StrongholdAir, ScoringEvent::BigBuilding) => 5,
      _ => 0,
    }
  }

  /// The cleanup reward: `(track, threshold, reward per threshold)`.
  pub fn cult_reward(self) -> (CultTrack, u8, CultReward) {
    match self {
      ScoringTile::Spades => (CultTrack::Earth, 1, CultReward::Coins(1)),
      ScoringTile::Towns => (CultTrack::Earth, 4, CultReward::Spades(1)),
      ScoringTile::DwellingWater => (CultTrack::Water, 4, CultReward::Priests(1)),
      ScoringTile::DwellingFire => (CultTrack::Fire, 4, CultReward::Power(4)),
      ScoringTile::TradingWater => (CultTrack::Water, 4, CultReward::Spades(1)),
      ScoringTile::TradingAir => (CultTrack::Air, 4, CultReward::Spades(1)),
      ScoringTile::StrongholdFire => (CultTrack::Fire, 2, CultReward::Workers(1)),
      ScoringTile::StrongholdAir => (CultTrack::Air, 2, CultReward::Workers(1)),
    }
  }

  /// How many times the reward pays for a final cult position.
  pub fn reward_count(self, position: u8) -> u8 {
    let (_, threshold, _) = self.cult_reward();
    position / threshold
  }
}
