//! # Game state
//!
//! One value owns everything about a game: board, players, tile stocks,
//! turn bookkeeping and the pending sub-action queues. Nothing in here is
//! global; the action kernel and phase machine mutate a `GameState`
//! explicitly and the external facade hands out read-only projections.

use crate::cult::{power_for_advance, CultBoard, CultTrack};
use crate::faction::{self, Faction};
use crate::hex::Hex;
use crate::map::{BuildingKind, Map};
use crate::power::{PowerBowls, Resources};
use crate::tiles::{BonusCard, FavorTile, ScoringEvent, ScoringTile, TownTile};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

pub const ROUNDS: u8 = 6;

/// The coarse phase of the game.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
  Setup,
  Income,
  Actions,
  Cleanup,
  Finished,
}

/// One step of the setup choreography.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupTask {
  /// The player must place a starting dwelling.
  Dwelling(usize),
  /// The player must draft a bonus card.
  Bonus(usize),
}

/// Per-round special action slots a player can exhaust.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecialUse {
  /// The faction's stronghold action, whichever it is.
  Stronghold,
  /// The Water+2 favor tile's cult step.
  WaterFavor,
  /// The bonus card's printed action.
  BonusCard,
}

/// Built structures per type, with the printed supply caps.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingCounts {
  pub dwellings: u8,
  pub trading_houses: u8,
  pub temples: u8,
  pub strongholds: u8,
  pub sanctuaries: u8,
}

impl BuildingCounts {
  pub fn count(&self, kind: BuildingKind) -> u8 {
    match kind {
      BuildingKind::Dwelling => self.dwellings,
      BuildingKind::TradingHouse => self.trading_houses,
      BuildingKind::Temple => self.temples,
      BuildingKind::Stronghold => self.strongholds,
      BuildingKind::Sanctuary => self.sanctuaries,
    }
  }

  pub fn at_cap(&self, kind: BuildingKind) -> bool {
    self.count(kind) >= kind.cap()
  }

  pub fn add(&mut self, kind: BuildingKind) {
    match kind {
      BuildingKind::Dwelling => self.dwellings += 1,
      BuildingKind::TradingHouse => self.trading_houses += 1,
      BuildingKind::Temple => self.temples += 1,
      BuildingKind::Stronghold => self.strongholds += 1,
      BuildingKind::Sanctuary => self.sanctuaries += 1,
    }
  }

  pub fn remove(&mut self, kind: BuildingKind) {
    match kind {
      BuildingKind::Dwelling => self.dwellings -= 1,
      BuildingKind::TradingHouse => self.trading_houses -= 1,
      BuildingKind::Temple => self.temples -= 1,
      BuildingKind::Stronghold => self.strongholds -= 1,
      BuildingKind::Sanctuary => self.sanctuaries -= 1,
    }
  }
}

/// Everything one player owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
  pub name: String,
  pub faction: Faction,
  pub resources: Resources,
  pub power: PowerBowls,
  pub vp: i32,
  pub shipping: u8,
  pub digging: u8,
  /// Hex distance crossed by carpet flights or tunnels; zero for factions
  /// without a skip ability.
  pub skip_range: u8,
  pub passed: bool,
  pub bonus: Option<BonusCard>,
  pub favors: Vec<FavorTile>,
  /// Fire, water, earth, air positions.
  pub cult: [u8; 4],
  pub keys: u8,
  pub used: BTreeSet<SpecialUse>,
  pub counts: BuildingCounts,
  pub bridges: u8,
  pub towns: u8,
}

impl Player {
  pub fn new(name: &str, faction: Faction) -> Self {
    let sheet = faction::setup(faction);
    Self {
      name: name.to_string(),
      faction,
      resources: Resources::new(sheet.coins, sheet.workers, sheet.priests),
      power: PowerBowls::new(sheet.power.0, sheet.power.1),
      vp: 20,
      shipping: sheet.shipping,
      digging: 0,
      skip_range: faction::base_skip_distance(faction) as u8,
      passed: false,
      bonus: None,
      favors: Vec::new(),
      cult: sheet.cult,
      keys: 0,
      used: BTreeSet::new(),
      counts: BuildingCounts::default(),
      bridges: 0,
      towns: 0,
    }
  }

  pub fn has_favor(&self, tile: FavorTile) -> bool {
    self.favors.contains(&tile)
  }

  /// Effective shipping level including the bonus card passive.
  pub fn shipping_level(&self) -> u8 {
    let bonus = self.bonus.map(|b| b.shipping_bonus()).unwrap_or(0);
    if self.faction == Faction::Dwarves || self.faction == Faction::Fakirs {
      0
    } else {
      self.shipping + bonus
    }
  }

  /// Town power threshold: 7, or 6 while holding the Fire+2 favor.
  pub fn town_threshold(&self) -> u8 {
    if self.has_favor(FavorTile::Fire2) {
      6
    } else {
      7
    }
  }

  pub fn stronghold_built(&self) -> bool {
    self.counts.strongholds > 0
  }
}

/// A single leech offer awaiting accept or decline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeechOffer {
  pub from: usize,
  pub to: usize,
  pub amount: u8,
  /// Identifies the build that produced this offer.
  pub event: u64,
}

impl LeechOffer {
  pub fn vp_cost(&self) -> i32 {
    self.amount as i32 - 1
  }
}

/// Book-keeping for the Cultists' conditional bonus, one per build event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeechEvent {
  pub builder: usize,
  pub offers_created: u8,
  pub resolved: u8,
  /// Accepted offers whose recipient could actually gain power.
  pub accepted: u8,
  /// Declined offers whose recipient could actually gain power. Forced
  /// declines (zero potential gain) count in neither tally.
  pub declined: u8,
}

/// A detected town waiting for its tile choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTown {
  pub player: usize,
  pub component: Vec<Hex>,
  /// River hex consumed by a Mermaid town, if any.
  pub river: Option<Hex>,
}

/// Which sub-action queue blocks normal play, in priority order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingKind {
  Leech,
  CultistsCult,
  FavorSelection,
  TownSelection,
  Spades,
  Bridge,
  Ordination,
}

/// Where a VP delta came from; the audit trail for round accounting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VpSource {
  Scoring,
  FactionPassive,
  Favor,
  Town,
  Leech,
  Shipping,
  Digging,
  Pass,
  Stronghold,
  CultMajority,
  Area,
  Resources,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpEvent {
  pub round: u8,
  pub player: usize,
  pub delta: i32,
  pub source: VpSource,
}

/// The complete, owned state of one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
  pub players: Vec<Player>,
  pub map: Map,
  pub cult_board: CultBoard,
  pub phase: Phase,
  /// 0 during setup, then 1..=6.
  pub round: u8,
  pub scoring_tiles: Vec<ScoringTile>,
  /// Cards still on offer, with coins accrued on them.
  pub bonus_supply: BTreeMap<BonusCard, u32>,
  pub favor_stock: BTreeMap<FavorTile, u8>,
  pub town_stock: BTreeMap<TownTile, u8>,
  pub turn_order: Vec<usize>,
  /// Pass order this round; becomes next round's turn order.
  pub pass_order: Vec<usize>,
  /// Index into `turn_order`.
  pub current: usize,
  pub power_actions_used: [bool; 7],
  pub setup_queue: VecDeque<SetupTask>,
  // Pending sub-action queues, highest priority first.
  pub pending_leech: Vec<LeechOffer>,
  pub leech_events: BTreeMap<u64, LeechEvent>,
  pub next_event: u64,
  pub pending_cultists: Option<usize>,
  /// One entry per favor tile still owed to a player.
  pub pending_favors: VecDeque<usize>,
  pub pending_towns: VecDeque<PendingTown>,
  pub pending_spades: BTreeMap<usize, u8>,
  /// Power action 1 paid for; the owner still owes the bridge placement.
  pub pending_bridge: Option<usize>,
  pub pending_ordination: Option<usize>,
  /// A main action finished while sub-actions were outstanding; the turn
  /// advances once the queues drain.
  pub turn_advance_due: bool,
  pub vp_events: Vec<VpEvent>,
  pub log: Vec<String>,
}

impl GameState {
  pub fn player(&self, idx: usize) -> &Player {
    &self.players[idx]
  }

  pub fn player_mut(&mut self, idx: usize) -> &mut Player {
    &mut self.players[idx]
  }

  pub fn find_player(&self, name: &str) -> Option<usize> {
    self
      .players
      .iter()
      .position(|p| p.name == name || p.faction.name() == name)
  }

  /// The scoring tile of the running round.
  pub fn scoring_tile(&self) -> Option<ScoringTile> {
    if self.round >= 1 && self.round <= ROUNDS {
      Some(self.scoring_tiles[(self.round - 1) as usize])
    } else {
      None
    }
  }

  /// The highest-priority non-empty pending queue.
  pub fn pending_kind(&self) -> Option<PendingKind> {
    if !self.pending_leech.is_empty() {
      Some(PendingKind::Leech)
    } else if self.pending_cultists.is_some() {
      Some(PendingKind::CultistsCult)
    } else if !self.pending_favors.is_empty() {
      Some(PendingKind::FavorSelection)
    } else if !self.pending_towns.is_empty() {
      Some(PendingKind::TownSelection)
    } else if !self.pending_spades.is_empty() {
      Some(PendingKind::Spades)
    } else if self.pending_bridge.is_some() {
      Some(PendingKind::Bridge)
    } else if self.pending_ordination.is_some() {
      Some(PendingKind::Ordination)
    } else {
      None
    }
  }

  /// The player a pending sub-action is addressed to, if any.
  pub fn pending_player(&self) -> Option<usize> {
    match self.pending_kind()? {
      PendingKind::Leech => self.pending_leech.first().map(|o| o.to),
      PendingKind::CultistsCult => self.pending_cultists,
      PendingKind::FavorSelection => self.pending_favors.front().cloned(),
      PendingKind::TownSelection => self.pending_towns.front().map(|t| t.player),
      PendingKind::Spades => self.spade_player(),
      PendingKind::Bridge => self.pending_bridge,
      PendingKind::Ordination => self.pending_ordination,
    }
  }

  /// The first player in turn order still holding pending spades.
  pub fn spade_player(&self) -> Option<usize> {
    self
      .turn_order
      .iter()
      .cloned()
      .find(|p| self.pending_spades.get(p).cloned().unwrap_or(0) > 0)
      .or_else(|| self.pending_spades.keys().next().cloned())
  }

  /// Whose main action is next, ignoring pending queues.
  pub fn turn_player(&self) -> Option<usize> {
    match self.phase {
      Phase::Setup => self.setup_queue.front().map(|t| match t {
        SetupTask::Dwelling(p) | SetupTask::Bonus(p) => *p,
      }),
      Phase::Actions => self.turn_order.get(self.current).cloned(),
      _ => None,
    }
  }

  /// The player expected to submit the next action, pending queues first.
  pub fn acting_player(&self) -> Option<usize> {
    self.pending_player().or_else(|| self.turn_player())
  }

  pub fn award_vp(&mut self, player: usize, delta: i32, source: VpSource) {
    if delta == 0 {
      return;
    }
    self.players[player].vp += delta;
    let round = self.round;
    self.vp_events.push(VpEvent {
      round,
      player,
      delta,
      source,
    });
  }

  pub fn gain_power(&mut self, player: usize, n: u8) {
    self.players[player].power.gain(n);
  }

  /// VP for a scoring-tile event this round. Tiles only pay while the
  /// action phase runs; cleanup spades and setup dwellings score nothing.
  pub fn score_event(&mut self, player: usize, event: ScoringEvent, times: u8) {
    if self.phase != Phase::Actions {
      return;
    }
    if let Some(tile) = self.scoring_tile() {
      let vp = tile.action_vp(event) * times as i32;
      self.award_vp(player, vp, VpSource::Scoring);
    }
  }

  /// Advances a player on a cult track, honoring the key gate and the
  /// single-occupant rule of position 10. Returns the steps actually taken.
  pub fn advance_cult(&mut self, player: usize, track: CultTrack, steps: u8) -> u8 {
    if steps == 0 {
      return 0;
    }
    let idx = track.index();
    let current = self.players[player].cult[idx];
    if current >= 10 {
      return 0;
    }
    let mut target = (current + steps).min(10);
    if target == 10 {
      let ten_taken = self
        .players
        .iter()
        .enumerate()
        .any(|(i, p)| i != player && p.cult[idx] >= 10);
      if ten_taken || self.players[player].keys == 0 {
        target = 9;
      }
    }
    if target <= current {
      return 0;
    }
    let power = power_for_advance(current, target);
    self.players[player].cult[idx] = target;
    if target == 10 {
      self.players[player].keys -= 1;
    }
    self.gain_power(player, power);
    target - current
  }

  pub fn fresh_event(&mut self) -> u64 {
    let id = self.next_event;
    self.next_event += 1;
    id
  }

  pub fn note<S: Into<String>>(&mut self, line: S) {
    self.log.push(line.into());
  }

  /// Total VP deltas recorded for a round, per player. Audit hook for the
  /// round accounting tests.
  pub fn vp_deltas_for_round(&self, round: u8) -> BTreeMap<usize, i32> {
    let mut out = BTreeMap::new();
    for e in self.vp_events.iter().filter(|e| e.round == round) {
      *out.entry(e.player).or_insert(0) += e.delta;
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use crate::cult::{CultBoard, CultTrack};
  use crate::faction::Faction;
  use crate::map::Map;
  use crate::state::*;
  use crate::tiles::{BonusCard, ScoringTile};
  use std::collections::{BTreeMap, VecDeque};

  fn two_player_state() -> GameState {
    let players = vec![
      Player::new("w", Faction::Witches),
      Player::new("n", Faction::Nomads),
    ];
    GameState {
      players,
      map: Map::base(),
      cult_board: CultBoard::new(),
      phase: Phase::Actions,
      round: 1,
      scoring_tiles: vec![
        ScoringTile::Spades,
        ScoringTile::Towns,
        ScoringTile::DwellingWater,
        ScoringTile::TradingAir,
        ScoringTile::StrongholdFire,
        ScoringTile::DwellingFire,
      ],
      bonus_supply: BTreeMap::new(),
      favor_stock: BTreeMap::new(),
      town_stock: BTreeMap::new(),
      turn_order: vec![0, 1],
      pass_order: Vec::new(),
      current: 0,
      power_actions_used: [false; 7],
      setup_queue: VecDeque::new(),
      pending_leech: Vec::new(),
      leech_events: BTreeMap::new(),
      next_event: 0,
      pending_cultists: None,
      pending_favors: VecDeque::new(),
      pending_towns: VecDeque::new(),
      pending_spades: BTreeMap::new(),
      pending_bridge: None,
      pending_ordination: None,
      turn_advance_due: false,
      vp_events: Vec::new(),
      log: Vec::new(),
    }
  }

  #[test]
  fn players_start_at_twenty_vp() {
    let state = two_player_state();
    assert!(state.players.iter().all(|p| p.vp == 20));
  }

  #[test]
  fn cult_advance_stops_at_nine_without_key() {
    let mut state = two_player_state();
    state.players[0].cult[CultTrack::Fire.index()] = 8;
    assert_eq!(state.advance_cult(0, CultTrack::Fire, 4), 1);
    assert_eq!(state.players[0].cult[0], 9);
  }

  #[test]
  fn cult_advance_takes_ten_with_key() {
    let mut state = two_player_state();
    state.players[0].cult[0] = 8;
    state.players[0].keys = 1;
    assert_eq!(state.advance_cult(0, CultTrack::Fire, 4), 2);
    assert_eq!(state.players[0].cult[0], 10);
    assert_eq!(state.players[0].keys, 0);
  }

  #[test]
  fn position_ten_holds_one_player() {
    let mut state = two_player_state();
    state.players[0].cult[0] = 10;
    state.players[1].cult[0] = 8;
    state.players[1].keys = 2;
    assert_eq!(state.advance_cult(1, CultTrack::Fire, 4), 1);
    assert_eq!(state.players[1].cult[0], 9);
    assert_eq!(state.players[1].keys, 2);
  }

  #[test]
  fn ladder_power_flows_into_bowls() {
    let mut state = two_player_state();
    let before = state.players[0].power;
    // 0 -> 6 crosses 3 and 5: one + two power.
    state.advance_cult(0, CultTrack::Water, 6);
    let after = state.players[0].power;
    assert_eq!(before.total(), after.total());
    assert_eq!(after.bowl2, before.bowl2 + 3);
  }

  #[test]
  fn a_player_already_on_ten_stays_put() {
    let mut state = two_player_state();
    state.players[0].cult[3] = 10;
    assert_eq!(state.advance_cult(0, CultTrack::Air, 2), 0);
    assert_eq!(state.players[0].cult[3], 10);
  }

  #[test]
  fn scoring_event_awards_tile_vp() {
    let mut state = two_player_state();
    state.score_event(0, ScoringEvent::Spade, 2);
    assert_eq!(state.players[0].vp, 24);
    assert_eq!(state.vp_deltas_for_round(1).get(&0), Some(&4));
  }

  #[test]
  fn pending_priority_orders_queues() {
    let mut state = two_player_state();
    state.pending_spades.insert(0, 2);
    state.pending_favors.push_back(1);
    assert_eq!(state.pending_kind(), Some(PendingKind::FavorSelection));
    state.pending_leech.push(LeechOffer {
      from: 0,
      to: 1,
      amount: 2,
      event: 0,
    });
    assert_eq!(state.pending_kind(), Some(PendingKind::Leech));
    assert_eq!(state.pending_player(), Some(1));
  }

  #[test]
  fn shipping_level_respects_faction_and_bonus() {
    let mut state = two_player_state();
    state.players[0].shipping = 1;
    state.players[0].bonus = Some(BonusCard::Shipping);
    assert_eq!(state.players[0].shipping_level(), 2);
    let dwarf = Player::new("d", Faction::Dwarves);
    assert_eq!(dwarf.shipping_level(), 0);
  }
}
