//! # Board model
//!
//! Terrain, buildings, bridges and the river-aware adjacency rules. The map
//! itself is a plain value: a [`std::collections::BTreeMap`] from hex to
//! cell, a river set and a bridge set. Ordered containers keep every
//! iteration deterministic, which the replay guarantee depends on.

mod base;

pub use self::base::{axial_to_row_col, row_col_to_axial, BASE_ROWS, ROW_LETTERS};

use crate::hex::Hex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Maximum number of bridges a single player may own.
pub const BRIDGE_CAP: usize = 3;

/// The seven land terrain types plus river.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terrain {
  Plains,
  Swamp,
  Lake,
  Forest,
  Mountain,
  Wasteland,
  Desert,
  River,
}

/// The terrain wheel in transform order. Terraform distance is the shortest
/// arc between two positions on this cycle.
pub const WHEEL: [Terrain; 7] = [
  Terrain::Plains,
  Terrain::Swamp,
  Terrain::Lake,
  Terrain::Forest,
  Terrain::Mountain,
  Terrain::Wasteland,
  Terrain::Desert,
];

impl Terrain {
  pub fn is_river(self) -> bool {
    self == Terrain::River
  }

  fn wheel_index(self) -> Option<u8> {
    WHEEL.iter().position(|t| *t == self).map(|i| i as u8)
  }

  /// Shortest-arc distance on the terrain wheel. `None` when either side is
  /// river; rivers are never terraformable.
  pub fn wheel_distance(self, other: Terrain) -> Option<u8> {
    let a = self.wheel_index()?;
    let b = other.wheel_index()?;
    let d = if a > b { a - b } else { b - a };
    Some(d.min(7 - d))
  }

  /// One step along the shortest arc toward `target`.
  pub fn step_toward(self, target: Terrain) -> Option<Terrain> {
    let a = self.wheel_index()? as i8;
    let b = target.wheel_index()? as i8;
    if a == b {
      return Some(self);
    }
    let forward = (b - a).rem_euclid(7);
    let next = if forward <= 7 - forward {
      (a + 1).rem_euclid(7)
    } else {
      (a - 1).rem_euclid(7)
    };
    Some(WHEEL[next as usize])
  }

  pub fn from_code(c: char) -> Option<Terrain> {
    match c {
      'P' => Some(Terrain::Plains),
      'S' => Some(Terrain::Swamp),
      'L' => Some(Terrain::Lake),
      'F' => Some(Terrain::Forest),
      'M' => Some(Terrain::Mountain),
      'W' => Some(Terrain::Wasteland),
      'D' => Some(Terrain::Desert),
      '~' => Some(Terrain::River),
      _ => None,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Terrain::Plains => "plains",
      Terrain::Swamp => "swamp",
      Terrain::Lake => "lake",
      Terrain::Forest => "forest",
      Terrain::Mountain => "mountain",
      Terrain::Wasteland => "wasteland",
      Terrain::Desert => "desert",
      Terrain::River => "river",
    }
  }
}

/// Building variants in upgrade order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
  Dwelling,
  TradingHouse,
  Temple,
  Stronghold,
  Sanctuary,
}

impl BuildingKind {
  /// Power value seen by adjacent opponents when leeching.
  pub fn power_value(self) -> u8 {
    match self {
      BuildingKind::Dwelling => 1,
      BuildingKind::TradingHouse | BuildingKind::Temple => 2,
      BuildingKind::Stronghold | BuildingKind::Sanctuary => 3,
    }
  }

  /// Per-player supply of each building type.
  pub fn cap(self) -> u8 {
    match self {
      BuildingKind::Dwelling => 8,
      BuildingKind::TradingHouse => 4,
      BuildingKind::Temple => 3,
      BuildingKind::Stronghold | BuildingKind::Sanctuary => 1,
    }
  }

  /// Legal upgrade targets. D -> TH; TH -> Temple | Stronghold | Sanctuary.
  pub fn upgrades_to(self, target: BuildingKind) -> bool {
    match (self, target) {
      (BuildingKind::Dwelling, BuildingKind::TradingHouse) => true,
      (BuildingKind::TradingHouse, BuildingKind::Temple)
      | (BuildingKind::TradingHouse, BuildingKind::Stronghold)
      | (BuildingKind::TradingHouse, BuildingKind::Sanctuary) => true,
      _ => false,
    }
  }

  pub fn code(self) -> &'static str {
    match self {
      BuildingKind::Dwelling => "D",
      BuildingKind::TradingHouse => "TP",
      BuildingKind::Temple => "TE",
      BuildingKind::Stronghold => "SH",
      BuildingKind::Sanctuary => "SA",
    }
  }

  pub fn from_code(code: &str) -> Option<BuildingKind> {
    match code {
      "D" => Some(BuildingKind::Dwelling),
      "TP" | "TH" => Some(BuildingKind::TradingHouse),
      "TE" => Some(BuildingKind::Temple),
      "SH" => Some(BuildingKind::Stronghold),
      "SA" => Some(BuildingKind::Sanctuary),
      _ => None,
    }
  }
}

/// A building standing on a cell, owned by a player index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
  pub kind: BuildingKind,
  pub owner: usize,
}

/// One board cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
  pub terrain: Terrain,
  pub building: Option<Building>,
  /// Set once the cell belongs to a founded town.
  pub in_town: bool,
  /// Mermaid town marker: the river hex consumed when founding a town across
  /// the river, tagged with the founding player.
  pub town_marker: Option<usize>,
}

impl Cell {
  fn new(terrain: Terrain) -> Self {
    Self {
      terrain,
      building: None,
      in_town: false,
      town_marker: None,
    }
  }
}

/// A normalized unordered hex pair identifying a bridge. The smaller endpoint
/// under `(q, r)` lexicographic order comes first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BridgeKey {
  a: Hex,
  b: Hex,
}

impl BridgeKey {
  pub fn new(a: Hex, b: Hex) -> Self {
    if a <= b {
      Self { a, b }
    } else {
      Self { a: b, b: a }
    }
  }

  pub fn endpoints(self) -> (Hex, Hex) {
    (self.a, self.b)
  }
}

/// Why a bridge placement was rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeError {
  OffMap,
  EndpointIsRiver,
  BadOrientation,
  NoRiverBelow,
  Occupied,
  CapExceeded,
}

impl std::fmt::Display for BridgeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let msg = match self {
      BridgeError::OffMap => "bridge endpoint off the map",
      BridgeError::EndpointIsRiver => "bridge endpoint on a river hex",
      BridgeError::BadOrientation => "hexes are not in a bridge orientation",
      BridgeError::NoRiverBelow => "no river under the bridge span",
      BridgeError::Occupied => "a bridge already exists here",
      BridgeError::CapExceeded => "player already owns three bridges",
    };
    write!(f, "{}", msg)
  }
}

impl std::error::Error for BridgeError {}

// The canonical bridge span and the two river hexes it crosses, before
// rotation. All six legal orientations are rotations of this triple.
const BRIDGE_SPAN: (i32, i32) = (1, -2);
const BRIDGE_MIDS: [(i32, i32); 2] = [(0, -1), (1, -1)];

/// The playing board: cells, the river set and all built bridges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
  cells: BTreeMap<Hex, Cell>,
  rivers: BTreeSet<Hex>,
  bridges: BTreeMap<BridgeKey, usize>,
}

impl Map {
  /// Builds a map from `(hex, terrain)` pairs.
  pub fn from_cells<I: IntoIterator<Item = (Hex, Terrain)>>(cells: I) -> Self {
    let cells: BTreeMap<Hex, Cell> = cells
      .into_iter()
      .map(|(h, t)| (h, Cell::new(t)))
      .collect();
    let rivers = cells
      .iter()
      .filter(|(_, c)| c.terrain.is_river())
      .map(|(h, _)| *h)
      .collect();
    Self {
      cells,
      rivers,
      bridges: BTreeMap::new(),
    }
  }

  /// The base game board.
  pub fn base() -> Self {
    let mut cells = Vec::with_capacity(113);
    for (row, line) in BASE_ROWS.iter().enumerate() {
      for (col, code) in line.chars().enumerate() {
        let terrain = Terrain::from_code(code).expect("bad terrain code in BASE_ROWS");
        cells.push((row_col_to_axial(row, col), terrain));
      }
    }
    Map::from_cells(cells)
  }

  pub fn contains(&self, h: Hex) -> bool {
    self.cells.contains_key(&h)
  }

  pub fn cell(&self, h: Hex) -> Option<&Cell> {
    self.cells.get(&h)
  }

  pub fn cell_mut(&mut self, h: Hex) -> Option<&mut Cell> {
    self.cells.get_mut(&h)
  }

  pub fn cells(&self) -> impl Iterator<Item = (&Hex, &Cell)> {
    self.cells.iter()
  }

  pub fn is_river(&self, h: Hex) -> bool {
    self.rivers.contains(&h)
  }

  /// On-map and not river.
  pub fn is_land(&self, h: Hex) -> bool {
    self
      .cells
      .get(&h)
      .map(|c| !c.terrain.is_river())
      .unwrap_or(false)
  }

  pub fn terrain(&self, h: Hex) -> Option<Terrain> {
    self.cells.get(&h).map(|c| c.terrain)
  }

  pub fn building(&self, h: Hex) -> Option<Building> {
    self.cells.get(&h).and_then(|c| c.building)
  }

  /// All hexes carrying a building of `owner`, in board order.
  pub fn buildings_of(&self, owner: usize) -> Vec<(Hex, BuildingKind)> {
    self
      .cells
      .iter()
      .filter_map(|(h, c)| match c.building {
        Some(b) if b.owner == owner => Some((*h, b.kind)),
        _ => None,
      })
      .collect()
  }

  /// On-map river neighbors of a hex.
  pub fn river_neighbors(&self, h: Hex) -> Vec<Hex> {
    h.neighbors()
      .iter()
      .cloned()
      .filter(|n| self.is_river(*n))
      .collect()
  }

  /// Checks every bridge placement rule without mutating. The displacement
  /// must be one of the six rotations of the base span, the two hexes below
  /// the span must be river, both endpoints must be land, the key must be
  /// free and the builder under the bridge cap.
  pub fn validate_bridge(&self, a: Hex, b: Hex, owner: usize) -> Result<(), BridgeError> {
    if !self.contains(a) || !self.contains(b) {
      return Err(BridgeError::OffMap);
    }
    if self.is_river(a) || self.is_river(b) {
      return Err(BridgeError::EndpointIsRiver);
    }
    let d = a.delta(b);
    let base = Hex::new(BRIDGE_SPAN.0, BRIDGE_SPAN.1);
    let mut mids = None;
    let mut m0 = Hex::new(BRIDGE_MIDS[0].0, BRIDGE_MIDS[0].1);
    let mut m1 = Hex::new(BRIDGE_MIDS[1].0, BRIDGE_MIDS[1].1);
    let mut span = base;
    for _ in 0..6 {
      if span == d {
        mids = Some((m0, m1));
        break;
      }
      span = span.rotated();
      m0 = m0.rotated();
      m1 = m1.rotated();
    }
    let (m0, m1) = match mids {
      Some(m) => m,
      None => return Err(BridgeError::BadOrientation),
    };
    if !self.is_river(a.offset(m0)) || !self.is_river(a.offset(m1)) {
      return Err(BridgeError::NoRiverBelow);
    }
    if self.bridges.contains_key(&BridgeKey::new(a, b)) {
      return Err(BridgeError::Occupied);
    }
    if self.bridges_owned(owner) >= BRIDGE_CAP {
      return Err(BridgeError::CapExceeded);
    }
    Ok(())
  }

  pub fn add_bridge(&mut self, a: Hex, b: Hex, owner: usize) -> Result<(), BridgeError> {
    self.validate_bridge(a, b, owner)?;
    self.bridges.insert(BridgeKey::new(a, b), owner);
    Ok(())
  }

  pub fn has_bridge(&self, a: Hex, b: Hex) -> bool {
    self.bridges.contains_key(&BridgeKey::new(a, b))
  }

  pub fn bridge_owner(&self, a: Hex, b: Hex) -> Option<usize> {
    self.bridges.get(&BridgeKey::new(a, b)).cloned()
  }

  pub fn bridges_owned(&self, owner: usize) -> usize {
    self.bridges.values().filter(|o| **o == owner).count()
  }

  pub fn bridges(&self) -> impl Iterator<Item = (&BridgeKey, &usize)> {
    self.bridges.iter()
  }

  /// Indirect adjacency through the river at a shipping level. Both
  /// endpoints must be land; direct neighbors and the hex itself are
  /// explicitly not indirectly adjacent. A breadth-first search restricted
  /// to river cells, seeded with the river neighbors of `a`, must reach
  /// within `level` steps a river cell bordering `b`.
  pub fn shipping_reachable(&self, a: Hex, b: Hex, level: u8) -> bool {
    if level == 0 || a == b || !self.is_land(a) || !self.is_land(b) {
      return false;
    }
    if a.is_neighbor(b) {
      return false;
    }
    let targets: BTreeSet<Hex> = self.river_neighbors(b).into_iter().collect();
    if targets.is_empty() {
      return false;
    }
    let mut seen: BTreeSet<Hex> = BTreeSet::new();
    let mut frontier: VecDeque<(Hex, u8)> = VecDeque::new();
    for n in self.river_neighbors(a) {
      seen.insert(n);
      frontier.push_back((n, 1));
    }
    while let Some((h, depth)) = frontier.pop_front() {
      if targets.contains(&h) {
        return true;
      }
      if depth == level {
        continue;
      }
      for n in h.neighbors().iter() {
        if self.is_river(*n) && seen.insert(*n) {
          frontier.push_back((*n, depth + 1));
        }
      }
    }
    false
  }

  /// Placement adjacency for one player: shared edge, a bridge owned by that
  /// player, or shipping range.
  pub fn player_adjacent(&self, a: Hex, b: Hex, owner: usize, shipping: u8) -> bool {
    if a.is_neighbor(b) {
      return true;
    }
    if self.bridge_owner(a, b) == Some(owner) {
      return true;
    }
    shipping > 0 && self.shipping_reachable(a, b, shipping)
  }

  /// True when `h` is directly or bridge-adjacent to any building of
  /// `owner`. Used by leech collection, which ignores shipping.
  pub fn touches_building_of(&self, h: Hex, owner: usize) -> bool {
    for n in h.neighbors().iter() {
      if let Some(b) = self.building(*n) {
        if b.owner == owner {
          return true;
        }
      }
    }
    // A bridge ending on `h` carries leech to the far side no matter who
    // owns the span.
    self.bridges.keys().any(|key| {
      let (a, b) = key.endpoints();
      let other = if a == h {
        b
      } else if b == h {
        a
      } else {
        return false;
      };
      match self.building(other) {
        Some(bld) => bld.owner == owner,
        None => false,
      }
    })
  }
}
