//! # Phase machine
//!
//! Setup, income, actions and cleanup across six rounds, then end scoring.
//! Income and cleanup are deterministic computations, not waiting states:
//! the machine rolls through them inside the submission that triggered the
//! transition, pausing only while cleanup spades are owed.

use crate::endgame;
use crate::faction::{self, Faction, Income};
use crate::state::{GameState, Phase, Player, SetupTask, ROUNDS};
use crate::tiles::{BonusCard, CultReward, ScoringTile, TownTile, FAVOR_TILES};
use crate::cult::CultBoard;
use crate::map::Map;
use std::collections::{BTreeMap, VecDeque};

/// Builds a fresh game: seats, factions, the six drawn scoring tiles and
/// the bonus card row. The setup choreography is queued and the first
/// placement is immediately awaited.
pub fn new_state(
  seats: Vec<(String, Faction)>,
  scoring_tiles: Vec<ScoringTile>,
  bonus_cards: Vec<BonusCard>,
  town_tiles: Vec<TownTile>,
) -> GameState {
  let players: Vec<Player> = seats
    .iter()
    .map(|(name, faction)| Player::new(name, *faction))
    .collect();
  let n = players.len();

  // Starting dwellings: seat order, then reverse, with the Nomads' third
  // dwelling after everyone's second and the Chaos Magicians' single
  // dwelling dead last. The bonus draft runs in reverse seat order.
  let mut setup_queue = VecDeque::new();
  let normals: Vec<usize> = (0..n)
    .filter(|i| players[*i].faction != Faction::ChaosMagicians)
    .collect();
  for i in normals.iter() {
    setup_queue.push_back(SetupTask::Dwelling(*i));
  }
  for i in normals.iter().rev() {
    setup_queue.push_back(SetupTask::Dwelling(*i));
  }
  for i in normals.iter() {
    if players[*i].faction == Faction::Nomads {
      setup_queue.push_back(SetupTask::Dwelling(*i));
    }
  }
  for i in 0..n {
    if players[i].faction == Faction::ChaosMagicians {
      setup_queue.push_back(SetupTask::Dwelling(i));
    }
  }
  for i in (0..n).rev() {
    setup_queue.push_back(SetupTask::Bonus(i));
  }

  let bonus_supply: BTreeMap<BonusCard, u32> =
    bonus_cards.into_iter().map(|c| (c, 0)).collect();
  let favor_stock = FAVOR_TILES.iter().map(|t| (*t, t.stock())).collect();
  let mut town_stock: BTreeMap<TownTile, u8> = BTreeMap::new();
  for t in town_tiles {
    *town_stock.entry(t).or_insert(0) += 1;
  }

  GameState {
    players,
    map: Map::base(),
    cult_board: CultBoard::new(),
    phase: Phase::Setup,
    round: 0,
    scoring_tiles,
    bonus_supply,
    favor_stock,
    town_stock,
    turn_order: (0..n).collect(),
    pass_order: Vec::new(),
    current: 0,
    power_actions_used: [false; 7],
    setup_queue,
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

/// Called after every resolved setup task; starts round one once the queue
/// drains.
pub fn after_setup_task(state: &mut GameState) {
  if !state.setup_queue.is_empty() {
    return;
  }
  // The setup-phase coin lands on every card left in the row.
  for coins in state.bonus_supply.values_mut() {
    *coins += 1;
  }
  state.round = 1;
  state.note("setup complete");
  begin_round(state);
}

/// A main action finished; advance the turn unless sub-actions are owed.
pub fn after_main_action(state: &mut GameState) {
  if state.pending_kind().is_none() {
    advance_turn(state);
  } else {
    state.turn_advance_due = true;
  }
}

/// A pending queue was drained; resume whatever was waiting on it.
pub fn after_pending_drained(state: &mut GameState) {
  if state.pending_kind().is_some() {
    return;
  }
  match state.phase {
    Phase::Actions => {
      if state.turn_advance_due {
        advance_turn(state);
      }
    }
    Phase::Cleanup => finish_cleanup(state),
    _ => {}
  }
}

/// Moves the acting pointer to the next non-passed player, or ends the
/// round when everyone has passed.
pub fn advance_turn(state: &mut GameState) {
  state.turn_advance_due = false;
  let n = state.turn_order.len();
  for step in 1..=n {
    let idx = (state.current + step) % n;
    let p = state.turn_order[idx];
    if !state.players[p].passed {
      state.current = idx;
      return;
    }
  }
  end_round(state);
}

fn end_round(state: &mut GameState) {
  if state.round >= ROUNDS {
    endgame::score(state);
    state.phase = Phase::Finished;
    state.note("game over");
    return;
  }
  state.phase = Phase::Cleanup;
  cult_rewards(state);
  reset_round_flags(state);
  if state.pending_spades.is_empty() {
    finish_cleanup(state);
  }
}

/// Scoring-tile cult rewards at cleanup, once per full threshold.
fn cult_rewards(state: &mut GameState) {
  let tile = match state.scoring_tile() {
    Some(t) => t,
    None => return,
  };
  let (track, _, reward) = tile.cult_reward();
  let order: Vec<usize> = state.turn_order.clone();
  for p in order {
    let position = state.players[p].cult[track.index()];
    let count = tile.reward_count(position) as u32;
    if count == 0 {
      continue;
    }
    match reward {
      CultReward::Coins(c) => state.players[p].resources.coins += c * count,
      CultReward::Workers(w) => state.players[p].resources.workers += w * count,
      CultReward::Priests(pr) => state.players[p].resources.priests += pr * count,
      CultReward::Power(pw) => state.gain_power(p, pw * count as u8),
      CultReward::Spades(s) => {
        *state.pending_spades.entry(p).or_insert(0) += s * count as u8;
      }
    }
  }
}

fn reset_round_flags(state: &mut GameState) {
  state.power_actions_used = [false; 7];
  for p in state.players.iter_mut() {
    p.used.clear();
  }
  state.pending_leech.clear();
  state.leech_events.clear();
  // Leftover bonus cards accrue their coin.
  for coins in state.bonus_supply.values_mut() {
    *coins += 1;
  }
}

/// Rolls into the next round once cleanup spades are spent.
fn finish_cleanup(state: &mut GameState) {
  state.round += 1;
  if !state.pass_order.is_empty() {
    state.turn_order = std::mem::replace(&mut state.pass_order, Vec::new());
  }
  state.current = 0;
  for p in state.players.iter_mut() {
    p.passed = false;
  }
  begin_round(state);
}

/// Income, then straight into the action phase.
fn begin_round(state: &mut GameState) {
  state.phase = Phase::Income;
  apply_income(state);
  state.phase = Phase::Actions;
  state.current = 0;
  let round = state.round;
  state.note(format!("round {} begins", round));
}

/// Deterministic income: faction board, buildings, bonus card, favors.
fn apply_income(state: &mut GameState) {
  for idx in 0..state.players.len() {
    let income = income_for(&state.players[idx]);
    let p = &mut state.players[idx];
    p.resources.coins += income.coins;
    p.resources.workers += income.workers;
    p.resources.priests += income.priests;
    p.power.gain(income.power);
  }
}

/// One player's full income breakdown.
pub fn income_for(player: &Player) -> Income {
  let counts = player.counts;
  let mut income = faction::building_income(
    player.faction,
    counts.dwellings,
    counts.trading_houses,
    counts.temples,
    counts.strongholds > 0,
    counts.sanctuaries > 0,
  );
  if let Some(card) = player.bonus {
    income.add(&card.income());
  }
  for favor in player.favors.iter() {
    income.add(&favor.income());
  }
  income
}

#[cfg(test)]
pub mod tests {
  use crate::faction::Faction;
  use crate::phase::*;
  use crate::state::GameState;
  use crate::tiles::{BonusCard, FavorTile, ScoringTile};

  /// The full box of town tiles, two of each.
  pub fn full_town_box() -> Vec<crate::tiles::TownTile> {
    crate::tiles::TOWN_TILES
      .iter()
      .flat_map(|t| std::iter::repeat(*t).take(t.stock() as usize))
      .collect()
  }

  /// A two-to-four player state already in round one of the action phase,
  /// with full tile stocks and an empty bonus row. The round-one scoring
  /// tile pays nothing for spades or dwellings so resource math in tests
  /// stays flat.
  pub fn bare_state(seats: Vec<(&str, Faction)>) -> GameState {
    let seats = seats
      .into_iter()
      .map(|(n, f)| (n.to_string(), f))
      .collect();
    let mut state = new_state(
      seats,
      vec![
        ScoringTile::StrongholdFire,
        ScoringTile::TradingWater,
        ScoringTile::DwellingWater,
        ScoringTile::TradingAir,
        ScoringTile::StrongholdAir,
        ScoringTile::DwellingFire,
      ],
      Vec::new(),
      full_town_box(),
    );
    state.setup_queue.clear();
    state.phase = crate::state::Phase::Actions;
    state.round = 1;
    state
  }

  #[test]
  fn setup_queue_honors_the_choreography() {
    let state = new_state(
      vec![
        ("a".to_string(), Faction::Witches),
        ("b".to_string(), Faction::Nomads),
        ("c".to_string(), Faction::ChaosMagicians),
      ],
      vec![
        ScoringTile::Spades,
        ScoringTile::Towns,
        ScoringTile::DwellingWater,
        ScoringTile::TradingAir,
        ScoringTile::StrongholdAir,
        ScoringTile::DwellingFire,
      ],
      vec![BonusCard::Spade, BonusCard::Priest],
      full_town_box(),
    );
    use crate::state::SetupTask::*;
    let tasks: Vec<_> = state.setup_queue.iter().cloned().collect();
    assert_eq!(
      tasks,
      vec![
        // Forward, reverse, Nomads third, Chaos last.
        Dwelling(0),
        Dwelling(1),
        Dwelling(1),
        Dwelling(0),
        Dwelling(1),
        Dwelling(2),
        // Draft in reverse seat order.
        Bonus(2),
        Bonus(1),
        Bonus(0),
      ]
    );
  }

  #[test]
  fn income_covers_buildings_bonus_and_favors() {
    let mut player = crate::state::Player::new("w", Faction::Witches);
    player.counts.dwellings = 2;
    player.counts.trading_houses = 1;
    player.bonus = Some(BonusCard::Coins6);
    player.favors.push(FavorTile::Fire1);
    let income = income_for(&player);
    // Base worker + two dwellings.
    assert_eq!(income.workers, 3);
    // Trading house 2c + bonus 6c + favor 3c.
    assert_eq!(income.coins, 11);
    assert_eq!(income.power, 1);
  }

  #[test]
  fn advance_turn_skips_passed_players() {
    let mut state = bare_state(vec![
      ("a", Faction::Witches),
      ("b", Faction::Nomads),
      ("c", Faction::Halflings),
    ]);
    state.players[1].passed = true;
    advance_turn(&mut state);
    assert_eq!(state.turn_order[state.current], 2);
  }

  #[test]
  fn round_ends_into_cleanup_and_next_round() {
    let mut state = bare_state(vec![("a", Faction::Witches), ("b", Faction::Nomads)]);
    state.players[0].passed = true;
    state.players[1].passed = true;
    state.pass_order = vec![1, 0];
    state.current = 1;
    advance_turn(&mut state);
    assert_eq!(state.round, 2);
    assert_eq!(state.phase, crate::state::Phase::Actions);
    // Pass order became the new turn order.
    assert_eq!(state.turn_order, vec![1, 0]);
    assert!(state.players.iter().all(|p| !p.passed));
  }

  #[test]
  fn cleanup_waits_for_cult_spades() {
    let mut state = bare_state(vec![("a", Faction::Witches), ("b", Faction::Nomads)]);
    // Round 2 tile: trading houses, water 4 -> spade.
    state.round = 2;
    state.players[0].cult[1] = 4;
    state.players[0].passed = true;
    state.players[1].passed = true;
    state.pass_order = vec![0, 1];
    advance_turn(&mut state);
    assert_eq!(state.phase, crate::state::Phase::Cleanup);
    assert_eq!(state.pending_spades.get(&0), Some(&1));
    assert_eq!(state.round, 2);
  }

  #[test]
  fn final_round_ends_the_game() {
    let mut state = bare_state(vec![("a", Faction::Witches), ("b", Faction::Nomads)]);
    state.round = 6;
    state.players[0].passed = true;
    state.players[1].passed = true;
    advance_turn(&mut state);
    assert_eq!(state.phase, crate::state::Phase::Finished);
  }

  #[test]
  fn setup_coin_lands_on_leftover_cards() {
    let mut state = new_state(
      vec![("a".to_string(), Faction::Witches)],
      vec![
        ScoringTile::Spades,
        ScoringTile::Towns,
        ScoringTile::DwellingWater,
        ScoringTile::TradingAir,
        ScoringTile::StrongholdAir,
        ScoringTile::DwellingFire,
      ],
      vec![BonusCard::Spade, BonusCard::Priest],
      full_town_box(),
    );
    state.setup_queue.clear();
    after_setup_task(&mut state);
    assert_eq!(state.round, 1);
    assert!(state.bonus_supply.values().all(|c| *c == 1));
  }
}
