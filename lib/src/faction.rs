//! # Faction catalog
//!
//! The 14 factions as one tagged variant plus data tables. Every query
//! starts from the standard faction sheet and patches the per-faction
//! differences in a match arm, so the deltas read like the printed boards.
//! Faction operations never hold a back-reference to game state; the action
//! layer passes `&mut GameState` explicitly.

use crate::map::{BuildingKind, Terrain};
use crate::power::Resources;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
  Alchemists,
  Auren,
  ChaosMagicians,
  Cultists,
  Darklings,
  Dwarves,
  Engineers,
  Fakirs,
  Giants,
  Halflings,
  Mermaids,
  Nomads,
  Swarmlings,
  Witches,
}

pub const FACTIONS: [Faction; 14] = [
  Faction::Alchemists,
  Faction::Auren,
  Faction::ChaosMagicians,
  Faction::Cultists,
  Faction::Darklings,
  Faction::Dwarves,
  Faction::Engineers,
  Faction::Fakirs,
  Faction::Giants,
  Faction::Halflings,
  Faction::Mermaids,
  Faction::Nomads,
  Faction::Swarmlings,
  Faction::Witches,
];

impl Faction {
  pub fn home_terrain(self) -> Terrain {
    match self {
      Faction::Halflings | Faction::Cultists => Terrain::Plains,
      Faction::Alchemists | Faction::Darklings => Terrain::Swamp,
      Faction::Mermaids | Faction::Swarmlings => Terrain::Lake,
      Faction::Witches | Faction::Auren => Terrain::Forest,
      Faction::Dwarves | Faction::Engineers => Terrain::Mountain,
      Faction::Giants | Faction::ChaosMagicians => Terrain::Wasteland,
      Faction::Fakirs | Faction::Nomads => Terrain::Desert,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Faction::Alchemists => "alchemists",
      Faction::Auren => "auren",
      Faction::ChaosMagicians => "chaosmagicians",
      Faction::Cultists => "cultists",
      Faction::Darklings => "darklings",
      Faction::Dwarves => "dwarves",
      Faction::Engineers => "engineers",
      Faction::Fakirs => "fakirs",
      Faction::Giants => "giants",
      Faction::Halflings => "halflings",
      Faction::Mermaids => "mermaids",
      Faction::Nomads => "nomads",
      Faction::Swarmlings => "swarmlings",
      Faction::Witches => "witches",
    }
  }

  pub fn from_name(name: &str) -> Option<Faction> {
    let lowered = name.to_ascii_lowercase();
    FACTIONS.iter().cloned().find(|f| f.name() == lowered)
  }
}

impl std::fmt::Display for Faction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// Workers and coins for one building. Trading houses list the discounted
/// price next to an opponent; the lone price is doubled coins.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingCost {
  pub workers: u32,
  pub coins: u32,
}

impl BuildingCost {
  fn new(workers: u32, coins: u32) -> Self {
    Self { workers, coins }
  }

  pub fn as_resources(&self) -> Resources {
    Resources::new(self.coins, self.workers, 0)
  }
}

/// The full starting sheet of a faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionSetup {
  pub home: Terrain,
  pub coins: u32,
  pub workers: u32,
  pub priests: u32,
  /// Starting tokens in bowls I and II.
  pub power: (u8, u8),
  /// Starting cult positions, fire/water/earth/air.
  pub cult: [u8; 4],
  pub shipping: u8,
  pub shipping_max: u8,
  pub digging_max: u8,
  pub dwelling: BuildingCost,
  pub trading_house: BuildingCost,
  pub temple: BuildingCost,
  pub stronghold: BuildingCost,
  pub sanctuary: BuildingCost,
}

impl FactionSetup {
  pub fn cost_of(&self, kind: BuildingKind) -> BuildingCost {
    match kind {
      BuildingKind::Dwelling => self.dwelling,
      BuildingKind::TradingHouse => self.trading_house,
      BuildingKind::Temple => self.temple,
      BuildingKind::Stronghold => self.stronghold,
      BuildingKind::Sanctuary => self.sanctuary,
    }
  }
}

/// Returns the faction sheet: the standard sheet patched by the faction's
/// printed differences.
pub fn setup(faction: Faction) -> FactionSetup {
  let mut s = FactionSetup {
    home: faction.home_terrain(),
    coins: 15,
    workers: 3,
    priests: 0,
    power: (5, 7),
    cult: [0; 4],
    shipping: 0,
    shipping_max: 3,
    digging_max: 2,
    dwelling: BuildingCost::new(1, 2),
    trading_house: BuildingCost::new(2, 3),
    temple: BuildingCost::new(2, 5),
    stronghold: BuildingCost::new(4, 6),
    sanctuary: BuildingCost::new(4, 6),
  };
  match faction {
    Faction::Alchemists => {
      s.cult = [1, 1, 0, 0];
    }
    Faction::Auren => {
      s.cult = [0, 1, 0, 1];
      s.sanctuary = BuildingCost::new(4, 8);
    }
    Faction::ChaosMagicians => {
      s.workers = 4;
      s.cult = [2, 0, 0, 0];
      s.stronghold = BuildingCost::new(4, 4);
      s.sanctuary = BuildingCost::new(4, 8);
    }
    Faction::Cultists => {
      s.cult = [1, 0, 1, 0];
      s.stronghold = BuildingCost::new(4, 8);
      s.sanctuary = BuildingCost::new(4, 8);
    }
    Faction::Darklings => {
      s.workers = 1;
      s.priests = 1;
      s.cult = [0, 1, 1, 0];
      s.digging_max = 0;
      s.sanctuary = BuildingCost::new(4, 10);
    }
    Faction::Dwarves => {
      s.cult = [0, 0, 2, 0];
      s.shipping_max = 0;
    }
    Faction::Engineers => {
      s.coins = 10;
      s.workers = 2;
      s.power = (3, 9);
      s.dwelling = BuildingCost::new(1, 1);
      s.trading_house = BuildingCost::new(1, 3);
      s.temple = BuildingCost::new(1, 4);
      s.stronghold = BuildingCost::new(3, 6);
      s.sanctuary = BuildingCost::new(3, 6);
    }
    Faction::Fakirs => {
      s.priests = 1;
      s.power = (7, 5);
      s.cult = [1, 0, 0, 1];
      s.shipping_max = 0;
      s.digging_max = 1;
      s.stronghold = BuildingCost::new(4, 10);
    }
    Faction::Giants => {
      s.cult = [1, 0, 0, 1];
    }
    Faction::Halflings => {
      s.power = (3, 9);
      s.cult = [0, 0, 1, 1];
      s.stronghold = BuildingCost::new(4, 8);
    }
    Faction::Mermaids => {
      s.power = (3, 9);
      s.cult = [0, 2, 0, 0];
      s.shipping = 1;
      s.shipping_max = 5;
      s.sanctuary = BuildingCost::new(4, 8);
    }
    Faction::Nomads => {
      s.workers = 2;
      s.cult = [1, 0, 1, 0];
      s.stronghold = BuildingCost::new(4, 8);
    }
    Faction::Swarmlings => {
      s.coins = 20;
      s.workers = 8;
      s.power = (3, 9);
      s.cult = [1, 1, 1, 1];
      s.dwelling = BuildingCost::new(2, 3);
      s.trading_house = BuildingCost::new(3, 4);
      s.temple = BuildingCost::new(3, 6);
      s.stronghold = BuildingCost::new(5, 8);
      s.sanctuary = BuildingCost::new(5, 8);
    }
    Faction::Witches => {
      s.cult = [0, 0, 0, 2];
      s.sanctuary = BuildingCost::new(4, 8);
    }
  }
  s
}

/// Spades needed and workers owed per spade for a terraform across
/// `distance` wheel steps at the given digging level.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformCost {
  pub spades: u8,
  pub workers_per_spade: u32,
}

pub fn terraform_cost(faction: Faction, digging: u8, distance: u8) -> TerraformCost {
  let per_spade = [3u32, 2, 1][digging.min(2) as usize];
  match faction {
    // Giants always flip straight to wasteland for exactly two spades.
    Faction::Giants => TerraformCost {
      spades: if distance == 0 { 0 } else { 2 },
      workers_per_spade: per_spade,
    },
    // Darklings never dig with workers; the action layer charges one priest
    // per spade and pays out the 2 VP.
    Faction::Darklings => TerraformCost {
      spades: distance,
      workers_per_spade: 0,
    },
    _ => TerraformCost {
      spades: distance,
      workers_per_spade: per_spade,
    },
  }
}

/// Priests charged per spade instead of workers. Zero for everyone but the
/// Darklings.
pub fn priests_per_spade(faction: Faction) -> u32 {
  if faction == Faction::Darklings {
    1
  } else {
    0
  }
}

/// Immediate effect fired when the stronghold is completed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrongholdEffect {
  /// Alchemists: 12 power at once.
  GainPower12,
  /// Cultists: 7 victory points.
  GainVp7,
  /// Mermaids: one free shipping level.
  ShippingLevel,
  /// Auren: an extra favor tile.
  FavorTile,
  /// Halflings: three spades to spend before the turn ends.
  PendingSpades3,
  /// Darklings: trade up to three workers for priests, one for one.
  Ordination,
  /// Fakirs: carpets fly one hex further.
  CarpetRange,
}

pub fn stronghold_effect(faction: Faction) -> Option<StrongholdEffect> {
  match faction {
    Faction::Alchemists => Some(StrongholdEffect::GainPower12),
    Faction::Cultists => Some(StrongholdEffect::GainVp7),
    Faction::Mermaids => Some(StrongholdEffect::ShippingLevel),
    Faction::Auren => Some(StrongholdEffect::FavorTile),
    Faction::Halflings => Some(StrongholdEffect::PendingSpades3),
    Faction::Darklings => Some(StrongholdEffect::Ordination),
    Faction::Fakirs => Some(StrongholdEffect::CarpetRange),
    _ => None,
  }
}

/// Victory points granted per spade by faction passives. Halflings love
/// digging, Darklings are paid for priestly digging.
pub fn vp_per_spade(faction: Faction) -> i32 {
  match faction {
    Faction::Halflings => 1,
    Faction::Darklings => 2,
    _ => 0,
  }
}

/// Skip reach in hex distance for the factions that cross gaps instead of
/// shipping: Fakirs' carpets and Dwarves' tunnels both clear one hex.
pub fn base_skip_distance(faction: Faction) -> i32 {
  match faction {
    Faction::Fakirs | Faction::Dwarves => 2,
    _ => 0,
  }
}

/// One player's per-turn income from faction board and buildings.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
  pub coins: u32,
  pub workers: u32,
  pub priests: u32,
  pub power: u8,
}

impl Income {
  pub fn add(&mut self, other: &Income) {
    self.coins += other.coins;
    self.workers += other.workers;
    self.priests += other.priests;
    self.power += other.power;
  }
}

struct IncomeTables {
  base_workers: u32,
  /// Cumulative workers by dwelling count; the eighth dwelling on most
  /// boards has no income printed under it.
  dwelling_workers: [u32; 9],
  th_coins: [u32; 5],
  th_power: [u8; 5],
  temple_priests: [u32; 4],
  temple_power: [u8; 4],
  stronghold: Income,
  sanctuary: Income,
}

fn income_tables(faction: Faction) -> IncomeTables {
  let mut t = IncomeTables {
    base_workers: 1,
    dwelling_workers: [0, 1, 2, 3, 4, 5, 6, 7, 7],
    th_coins: [0, 2, 4, 6, 8],
    th_power: [0, 1, 2, 4, 6],
    temple_priests: [0, 1, 2, 3],
    temple_power: [0, 0, 0, 0],
    stronghold: Income {
      power: 2,
      ..Income::default()
    },
    sanctuary: Income {
      priests: 1,
      ..Income::default()
    },
  };
  match faction {
    Faction::Alchemists => {
      t.th_coins = [0, 2, 4, 7, 10];
      t.th_power = [0, 1, 2, 3, 4];
    }
    Faction::ChaosMagicians => {
      t.stronghold = Income {
        workers: 2,
        ..Income::default()
      };
    }
    Faction::Engineers => {
      t.temple_priests = [0, 1, 1, 2];
      t.temple_power = [0, 0, 5, 5];
    }
    Faction::Swarmlings => {
      t.base_workers = 2;
      t.dwelling_workers = [0, 1, 2, 3, 4, 5, 6, 7, 8];
      t.th_coins = [0, 2, 4, 6, 9];
      t.sanctuary = Income {
        priests: 2,
        ..Income::default()
      };
    }
    _ => {}
  }
  t
}

/// Income from the faction board and built structures.
pub fn building_income(
  faction: Faction,
  dwellings: u8,
  trading_houses: u8,
  temples: u8,
  stronghold: bool,
  sanctuary: bool,
) -> Income {
  let t = income_tables(faction);
  let mut income = Income {
    workers: t.base_workers + t.dwelling_workers[dwellings.min(8) as usize],
    coins: t.th_coins[trading_houses.min(4) as usize],
    power: t.th_power[trading_houses.min(4) as usize]
      + t.temple_power[temples.min(3) as usize],
    priests: t.temple_priests[temples.min(3) as usize],
  };
  if stronghold {
    income.add(&t.stronghold);
  }
  if sanctuary {
    income.add(&t.sanctuary);
  }
  income
}
