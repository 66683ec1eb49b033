//! Draining the pending sub-action queues: spades, favor and town tile
//! selections, the Darklings' ordination and the setup bonus draft.

use crate::action::{build, ActionError, HexProblem};
use crate::cult::TRACKS;
use crate::faction::Faction;
use crate::hex::Hex;
use crate::phase;
use crate::state::{GameState, SetupTask, VpSource};
use crate::tiles::{BonusCard, FavorTile, ScoringEvent, TownTile};
use crate::town;

/// Spends one pending spade (two for Giants) transforming `hex` one step
/// toward home terrain.
pub fn use_spade(state: &mut GameState, hex: Hex) -> Result<(), ActionError> {
  let player = state
    .spade_player()
    .ok_or(ActionError::InvalidAction("no spades pending"))?;
  let available = state.pending_spades.get(&player).cloned().unwrap_or(0);
  let terrain = build::open_land(state, hex)?;
  let faction = state.players[player].faction;
  let home = faction.home_terrain();
  if terrain == home {
    return Err(ActionError::IllegalHex(HexProblem::WrongTerrain));
  }
  if !build::reaches(state, player, hex) {
    return Err(ActionError::NotAdjacent);
  }
  let (used, next) = if faction == Faction::Giants {
    if available < 2 {
      return Err(ActionError::InvalidAction("giants transform with two spades"));
    }
    (2, home)
  } else {
    (1, terrain.step_toward(home).expect("land terrain"))
  };
  state.map.cell_mut(hex).expect("validated above").terrain = next;
  build::apply_spade_rewards(state, player, used);
  let left = available - used;
  if left == 0 {
    state.pending_spades.remove(&player);
  } else {
    state.pending_spades.insert(player, left);
  }
  phase::after_pending_drained(state);
  Ok(())
}

/// Gives up the remaining pending spades.
pub fn forfeit_spades(state: &mut GameState) -> Result<(), ActionError> {
  let player = state
    .spade_player()
    .ok_or(ActionError::InvalidAction("no spades pending"))?;
  state.pending_spades.remove(&player);
  phase::after_pending_drained(state);
  Ok(())
}

/// Resolves the favor selection at the head of the queue.
pub fn choose_favor(state: &mut GameState, tile: FavorTile) -> Result<(), ActionError> {
  let player = match state.pending_favors.front() {
    Some(p) => *p,
    None => return Err(ActionError::InvalidAction("no favor selection pending")),
  };
  if state.favor_stock.get(&tile).cloned().unwrap_or(0) == 0 {
    return Err(ActionError::TileUnavailable);
  }
  if state.players[player].has_favor(tile) {
    return Err(ActionError::TileUnavailable);
  }
  state.pending_favors.pop_front();
  *state.favor_stock.get_mut(&tile).expect("checked above") -= 1;
  state.players[player].favors.push(tile);
  state.advance_cult(player, tile.track(), tile.cult_steps());
  phase::after_pending_drained(state);
  Ok(())
}

/// Resolves the town selection at the head of the queue.
pub fn choose_town(state: &mut GameState, tile: TownTile) -> Result<(), ActionError> {
  let pending = match state.pending_towns.front() {
    Some(t) => t.clone(),
    None => return Err(ActionError::InvalidAction("no town selection pending")),
  };
  if state.town_stock.get(&tile).cloned().unwrap_or(0) == 0 {
    return Err(ActionError::TileUnavailable);
  }
  state.pending_towns.pop_front();
  *state.town_stock.get_mut(&tile).expect("checked above") -= 1;

  let player = pending.player;
  state.award_vp(player, tile.vp(), VpSource::Town);
  state.players[player].keys += tile.keys();
  match tile {
    TownTile::Coins8 => state.players[player].resources.coins += 8,
    TownTile::PriestWorkers => {
      state.players[player].resources.workers += 2;
      state.players[player].resources.priests += 1;
    }
    TownTile::Power6 => state.gain_power(player, 6),
    TownTile::CultSteps => {
      for track in TRACKS.iter() {
        state.advance_cult(player, *track, 1);
      }
    }
    TownTile::Shipping => match state.players[player].faction {
      Faction::Fakirs => state.players[player].skip_range += 1,
      Faction::Dwarves => {}
      f => {
        let max = crate::faction::setup(f).shipping_max;
        if state.players[player].shipping < max {
          state.players[player].shipping += 1;
        }
      }
    },
    TownTile::Vp7 | TownTile::Keys2 => {}
  }

  town::found(state, &pending);
  match state.players[player].faction {
    Faction::Witches => state.award_vp(player, 5, VpSource::FactionPassive),
    Faction::Swarmlings => state.players[player].resources.workers += 3,
    _ => {}
  }
  state.score_event(player, ScoringEvent::TownFounded, 1);
  phase::after_pending_drained(state);
  Ok(())
}

/// The Darklings trade up to three workers for priests after their
/// stronghold.
pub fn ordination(state: &mut GameState, workers: u8) -> Result<(), ActionError> {
  let player = match state.pending_ordination {
    Some(p) => p,
    None => return Err(ActionError::InvalidAction("no ordination pending")),
  };
  if workers > 3 {
    return Err(ActionError::InvalidAction("ordination trades at most three"));
  }
  if state.players[player].resources.workers < workers as u32 {
    return Err(ActionError::InsufficientResources(
      crate::action::ResourceKind::Workers,
    ));
  }
  state.players[player].resources.workers -= workers as u32;
  state.players[player].resources.priests += workers as u32;
  state.pending_ordination = None;
  phase::after_pending_drained(state);
  Ok(())
}

/// Setup draft: the addressed player takes a card from the supply.
pub fn choose_setup_bonus(state: &mut GameState, card: BonusCard) -> Result<(), ActionError> {
  let player = match state.setup_queue.front() {
    Some(SetupTask::Bonus(p)) => *p,
    _ => return Err(ActionError::WrongPhase),
  };
  let accrued = match state.bonus_supply.remove(&card) {
    Some(c) => c,
    None => return Err(ActionError::TileUnavailable),
  };
  state.players[player].resources.coins += accrued;
  state.players[player].bonus = Some(card);
  state.setup_queue.pop_front();
  phase::after_setup_task(state);
  Ok(())
}

#[cfg(test)]
mod tests {
  use crate::action::pending::*;
  use crate::action::ActionError;
  use crate::faction::Faction;
  use crate::map::{Building, BuildingKind, Map, Terrain};
  use crate::phase::tests::bare_state;
  use crate::state::PendingTown;

  #[test]
  fn spades_step_terrain_toward_home() {
    let mut state = bare_state(vec![("h", Faction::Halflings), ("n", Faction::Nomads)]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Plains),
      (hex!(1, 0), Terrain::Lake),
    ]);
    state.map.cell_mut(hex!(0, 0)).unwrap().building = Some(Building {
      kind: BuildingKind::Dwelling,
      owner: 0,
    });
    state.pending_spades.insert(0, 2);
    use_spade(&mut state, hex!(1, 0)).unwrap();
    assert_eq!(state.map.terrain(hex!(1, 0)), Some(Terrain::Swamp));
    assert_eq!(state.pending_spades.get(&0), Some(&1));
    use_spade(&mut state, hex!(1, 0)).unwrap();
    assert_eq!(state.map.terrain(hex!(1, 0)), Some(Terrain::Plains));
    assert!(state.pending_spades.is_empty());
  }

  #[test]
  fn giants_spend_pending_spades_in_pairs() {
    let mut state = bare_state(vec![("g", Faction::Giants), ("n", Faction::Nomads)]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Wasteland),
      (hex!(1, 0), Terrain::Lake),
    ]);
    state.map.cell_mut(hex!(0, 0)).unwrap().building = Some(Building {
      kind: BuildingKind::Dwelling,
      owner: 0,
    });
    state.pending_spades.insert(0, 1);
    assert_eq!(
      use_spade(&mut state, hex!(1, 0)),
      Err(ActionError::InvalidAction("giants transform with two spades"))
    );
    state.pending_spades.insert(0, 2);
    use_spade(&mut state, hex!(1, 0)).unwrap();
    assert_eq!(state.map.terrain(hex!(1, 0)), Some(Terrain::Wasteland));
  }

  #[test]
  fn favor_selection_respects_stock_and_duplicates() {
    use crate::tiles::FavorTile;
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.pending_favors.push_back(0);
    state.pending_favors.push_back(0);
    state.players[0].favors.push(FavorTile::Fire1);
    assert_eq!(
      choose_favor(&mut state, FavorTile::Fire1),
      Err(ActionError::TileUnavailable)
    );
    choose_favor(&mut state, FavorTile::Earth1).unwrap();
    assert_eq!(state.players[0].cult[2], 1);
    // Second selection still pending.
    assert_eq!(state.pending_favors.len(), 1);
  }

  #[test]
  fn town_tile_pays_out_and_founds() {
    use crate::tiles::TownTile;
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.map = Map::from_cells(vec![
      (hex!(0, 0), Terrain::Forest),
      (hex!(1, 0), Terrain::Forest),
      (hex!(2, 0), Terrain::Forest),
      (hex!(3, 0), Terrain::Forest),
    ]);
    let cells: Vec<_> = (0..4).map(|q| hex!(q, 0)).collect();
    for h in cells.iter() {
      state.map.cell_mut(*h).unwrap().building = Some(Building {
        kind: BuildingKind::Dwelling,
        owner: 0,
      });
    }
    state.pending_towns.push_back(PendingTown {
      player: 0,
      component: cells.clone(),
      river: None,
    });
    let vp = state.players[0].vp;
    choose_town(&mut state, TownTile::Keys2).unwrap();
    assert_eq!(state.players[0].keys, 2);
    // Tile VP plus the Witches' own town bonus.
    assert_eq!(state.players[0].vp, vp + 4 + 5);
    assert_eq!(state.players[0].towns, 1);
    assert!(state.map.cell(hex!(0, 0)).unwrap().in_town);
  }

  #[test]
  fn ordination_trades_workers_for_priests() {
    let mut state = bare_state(vec![("d", Faction::Darklings), ("n", Faction::Nomads)]);
    state.pending_ordination = Some(0);
    ordination(&mut state, 1).unwrap();
    assert_eq!(state.players[0].resources.workers, 0);
    assert_eq!(state.players[0].resources.priests, 2);
    assert_eq!(state.pending_ordination, None);
  }
}
