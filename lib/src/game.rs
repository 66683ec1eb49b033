//! # Game facade
//!
//! The narrow interface collaborators call: construct a game, submit
//! actions, read snapshots. The snapshot is a serde projection, so the hub
//! and the replay API can ship it as JSON without touching engine types.

use crate::action::{self, Action, ActionError, Conversion, PowerActionSlot, SpecialAction};
use crate::cult::TRACKS;
use crate::faction::Faction;
use crate::map::BuildingKind;
use crate::phase;
use crate::state::{GameState, PendingKind, Phase, SetupTask};
use crate::tiles::{BonusCard, ScoringTile, TownTile, BONUS_CARDS, FAVOR_TILES, TOWN_TILES};

/// Everything needed to open a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSetup {
  /// Seat order; names must be unique.
  pub players: Vec<(String, Faction)>,
  /// The six drawn round scoring tiles.
  pub scoring_tiles: Vec<ScoringTile>,
  /// The bonus card row, normally player count plus three.
  pub bonus_cards: Vec<BonusCard>,
  /// The town tile box; duplicates are stock.
  pub town_tiles: Vec<TownTile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupError {
  BadPlayerCount(usize),
  DuplicateFaction(Faction),
  BadScoringTileCount(usize),
  BadBonusCardCount(usize),
}

impl std::fmt::Display for SetupError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SetupError::BadPlayerCount(n) => write!(f, "bad player count: {}", n),
      SetupError::DuplicateFaction(fa) => write!(f, "faction taken twice: {}", fa),
      SetupError::BadScoringTileCount(n) => write!(f, "need 6 scoring tiles, got {}", n),
      SetupError::BadBonusCardCount(n) => write!(f, "not enough bonus cards: {}", n),
    }
  }
}

impl std::error::Error for SetupError {}

/// One running game. Owns its whole state; games never share anything
/// mutable.
#[derive(Debug, Clone)]
pub struct Game {
  state: GameState,
}

impl Game {
  pub fn new(setup: GameSetup) -> Result<Game, SetupError> {
    let n = setup.players.len();
    if n < 1 || n > 5 {
      return Err(SetupError::BadPlayerCount(n));
    }
    for i in 0..n {
      for j in (i + 1)..n {
        if setup.players[i].1 == setup.players[j].1 {
          return Err(SetupError::DuplicateFaction(setup.players[i].1));
        }
      }
    }
    if setup.scoring_tiles.len() != 6 {
      return Err(SetupError::BadScoringTileCount(setup.scoring_tiles.len()));
    }
    if setup.bonus_cards.len() < n {
      return Err(SetupError::BadBonusCardCount(setup.bonus_cards.len()));
    }
    Ok(Game {
      state: phase::new_state(
        setup.players,
        setup.scoring_tiles,
        setup.bonus_cards,
        setup.town_tiles,
      ),
    })
  }

  /// A quick two-handed game with a default tile draw; handy for tests and
  /// examples.
  pub fn quick(players: Vec<(&str, Faction)>) -> Result<Game, SetupError> {
    let seats = players
      .into_iter()
      .map(|(n, f)| (n.to_string(), f))
      .collect();
    Game::new(GameSetup {
      players: seats,
      scoring_tiles: vec![
        ScoringTile::Spades,
        ScoringTile::TradingWater,
        ScoringTile::DwellingWater,
        ScoringTile::StrongholdFire,
        ScoringTile::TradingAir,
        ScoringTile::Towns,
      ],
      bonus_cards: BONUS_CARDS.to_vec(),
      town_tiles: TOWN_TILES
        .iter()
        .flat_map(|t| std::iter::repeat(*t).take(t.stock() as usize))
        .collect(),
    })
  }

  pub fn submit_action(&mut self, action: &Action) -> Result<(), ActionError> {
    action::submit(&mut self.state, action)
  }

  pub fn state(&self) -> &GameState {
    &self.state
  }

  /// Name of the player expected to act next.
  pub fn acting_player(&self) -> Option<&str> {
    self
      .state
      .acting_player()
      .map(|p| self.state.players[p].name.as_str())
  }

  pub fn snapshot(&self) -> StateView {
    StateView::of(&self.state)
  }

  /// Enumerates actions that would currently be accepted. Generated
  /// candidates are filtered by validating against a scratch copy, so the
  /// list is exact if conservative in coverage.
  pub fn legal_actions(&self) -> Vec<Action> {
    let mut candidates = self.candidates();
    candidates.retain(|a| {
      let mut scratch = self.state.clone();
      action::submit(&mut scratch, a).is_ok()
    });
    candidates
  }

  fn candidates(&self) -> Vec<Action> {
    let state = &self.state;
    let mut out = Vec::new();
    match state.pending_kind() {
      Some(PendingKind::Leech) => {
        for i in 0..state.pending_leech.len() {
          out.push(Action::AcceptLeech { offer: i });
          out.push(Action::DeclineLeech { offer: i });
        }
        return out;
      }
      Some(PendingKind::CultistsCult) => {
        for t in TRACKS.iter() {
          out.push(Action::ChooseCultistsCult { track: *t });
        }
        return out;
      }
      Some(PendingKind::FavorSelection) => {
        for t in FAVOR_TILES.iter() {
          out.push(Action::ChooseFavor { tile: *t });
        }
        return out;
      }
      Some(PendingKind::TownSelection) => {
        for t in TOWN_TILES.iter() {
          out.push(Action::ChooseTown { tile: *t });
        }
        return out;
      }
      Some(PendingKind::Spades) => {
        for (h, _) in state.map.cells() {
          out.push(Action::UseSpade { hex: *h });
        }
        out.push(Action::ForfeitSpades);
        return out;
      }
      Some(PendingKind::Bridge) => {
        out.extend(self.bridge_candidates(state.pending_bridge.unwrap_or(0), false));
        return out;
      }
      Some(PendingKind::Ordination) => {
        for w in 0..=3 {
          out.push(Action::DarklingsOrdination { workers: w });
        }
        return out;
      }
      None => {}
    }

    match state.phase {
      Phase::Setup => match state.setup_queue.front() {
        Some(SetupTask::Dwelling(_)) => {
          for (h, _) in state.map.cells() {
            out.push(Action::TransformAndBuild {
              hex: *h,
              target: None,
              build: true,
              skip: false,
            });
          }
        }
        Some(SetupTask::Bonus(_)) => {
          for card in state.bonus_supply.keys() {
            out.push(Action::ChooseBonus { card: *card });
          }
        }
        None => {}
      },
      Phase::Actions => {
        let player = match state.turn_player() {
          Some(p) => p,
          None => return out,
        };
        for (h, cell) in state.map.cells() {
          if cell.terrain.is_river() {
            continue;
          }
          if cell.building.is_none() {
            for build in [false, true].iter() {
              for skip in [false, true].iter() {
                out.push(Action::TransformAndBuild {
                  hex: *h,
                  target: None,
                  build: *build,
                  skip: *skip,
                });
              }
            }
          } else {
            for target in [
              BuildingKind::TradingHouse,
              BuildingKind::Temple,
              BuildingKind::Stronghold,
              BuildingKind::Sanctuary,
            ]
            .iter()
            {
              out.push(Action::UpgradeBuilding {
                hex: *h,
                target: *target,
              });
            }
            out.push(Action::Special(SpecialAction::WitchesRide { hex: *h }));
            out.push(Action::Special(SpecialAction::SwarmlingsUpgrade { hex: *h }));
            out.push(Action::Special(SpecialAction::GiantsSpades {
              hex: *h,
              build: true,
            }));
            out.push(Action::Special(SpecialAction::Sandstorm {
              hex: *h,
              build: true,
            }));
          }
        }
        out.push(Action::AdvanceShipping);
        out.push(Action::AdvanceDigging);
        for t in TRACKS.iter() {
          for steps in 1..=3 {
            out.push(Action::SendPriest {
              track: *t,
              steps,
            });
          }
          out.push(Action::Special(SpecialAction::AurenCult { track: *t }));
          out.push(Action::Special(SpecialAction::BonusCult { track: *t }));
          out.push(Action::Special(SpecialAction::FavorCult { track: *t }));
        }
        for i in 1..=7 {
          out.push(Action::PowerAction(
            PowerActionSlot::from_index(i).expect("slots 1..=7"),
          ));
        }
        out.extend(self.bridge_candidates(player, true));
        if state.round >= crate::state::ROUNDS {
          out.push(Action::Pass { bonus: None });
        } else {
          for card in state.bonus_supply.keys() {
            out.push(Action::Pass { bonus: Some(*card) });
          }
        }
        out.push(Action::Convert(Conversion::PowerToCoins(1)));
        out.push(Action::Convert(Conversion::PowerToWorkers(1)));
        out.push(Action::Convert(Conversion::PowerToPriests(1)));
        out.push(Action::Convert(Conversion::WorkersToCoins(1)));
        out.push(Action::Convert(Conversion::PriestsToWorkers(1)));
        out.push(Action::Burn { count: 1 });
      }
      _ => {}
    }
    out
  }

  /// Plausible bridge spans from the player's buildings.
  fn bridge_candidates(&self, player: usize, engineers: bool) -> Vec<Action> {
    let state = &self.state;
    let mut out = Vec::new();
    for (from, _) in state.map.buildings_of(player) {
      let base = crate::hex::Hex::new(1, -2);
      for span in base.rotations().iter() {
        let to = from.offset(*span);
        if state.map.validate_bridge(from, to, player).is_ok() {
          if engineers {
            out.push(Action::EngineersBridge { from, to });
          } else {
            out.push(Action::PlaceBridge { from, to });
          }
        }
      }
    }
    out
  }
}

/// Read-only projection of a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
  pub name: String,
  pub faction: String,
  pub vp: i32,
  pub coins: u32,
  pub workers: u32,
  pub priests: u32,
  pub power: [u8; 3],
  pub shipping: u8,
  pub digging: u8,
  pub passed: bool,
  pub bonus: Option<String>,
  pub favors: Vec<String>,
  pub cult: [u8; 4],
  pub keys: u8,
  pub dwellings: u8,
  pub trading_houses: u8,
  pub temples: u8,
  pub strongholds: u8,
  pub sanctuaries: u8,
  pub bridges: u8,
  pub towns: u8,
}

/// Read-only projection of one board cell that carries anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
  pub q: i32,
  pub r: i32,
  pub terrain: String,
  pub building: Option<String>,
  pub owner: Option<usize>,
  pub in_town: bool,
}

/// The snapshot external collaborators observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateView {
  pub phase: String,
  pub round: u8,
  pub acting: Option<String>,
  pub players: Vec<PlayerView>,
  pub cells: Vec<CellView>,
  pub bridges: Vec<((i32, i32), (i32, i32), usize)>,
  pub pending: Option<String>,
  pub power_actions_used: Vec<u8>,
  pub log: Vec<String>,
}

impl StateView {
  pub fn of(state: &GameState) -> StateView {
    let players = state
      .players
      .iter()
      .map(|p| PlayerView {
        name: p.name.clone(),
        faction: p.faction.name().to_string(),
        vp: p.vp,
        coins: p.resources.coins,
        workers: p.resources.workers,
        priests: p.resources.priests,
        power: [p.power.bowl1, p.power.bowl2, p.power.bowl3],
        shipping: p.shipping,
        digging: p.digging,
        passed: p.passed,
        bonus: p.bonus.map(|b| b.code().to_string()),
        favors: p.favors.iter().map(|f| f.code().to_string()).collect(),
        cult: p.cult,
        keys: p.keys,
        dwellings: p.counts.dwellings,
        trading_houses: p.counts.trading_houses,
        temples: p.counts.temples,
        strongholds: p.counts.strongholds,
        sanctuaries: p.counts.sanctuaries,
        bridges: p.bridges,
        towns: p.towns,
      })
      .collect();
    let cells = state
      .map
      .cells()
      .map(|(h, c)| CellView {
        q: h.q,
        r: h.r,
        terrain: c.terrain.name().to_string(),
        building: c.building.map(|b| b.kind.code().to_string()),
        owner: c.building.map(|b| b.owner),
        in_town: c.in_town,
      })
      .collect();
    let bridges = state
      .map
      .bridges()
      .map(|(key, owner)| {
        let (a, b) = key.endpoints();
        ((a.q, a.r), (b.q, b.r), *owner)
      })
      .collect();
    let phase = match state.phase {
      Phase::Setup => "setup",
      Phase::Income => "income",
      Phase::Actions => "actions",
      Phase::Cleanup => "cleanup",
      Phase::Finished => "finished",
    };
    StateView {
      phase: phase.to_string(),
      round: state.round,
      acting: state
        .acting_player()
        .map(|p| state.players[p].faction.name().to_string()),
      players,
      cells,
      bridges,
      pending: state.pending_kind().map(|k| format!("{:?}", k)),
      power_actions_used: state
        .power_actions_used
        .iter()
        .map(|b| *b as u8)
        .collect(),
      log: state.log.clone(),
    }
  }
}
