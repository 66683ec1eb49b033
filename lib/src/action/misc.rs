//! Track advances, priest sends, passing, the Engineers' bridge and the
//! free conversions.

use crate::action::{build, Action, ActionError, Conversion, ResourceKind};
use crate::cult::CultTrack;
use crate::faction::{self, Faction};
use crate::hex::Hex;
use crate::power::Resources;
use crate::state::{GameState, VpSource};
use crate::tiles::{BonusCard, FavorTile};
use crate::town;

pub fn advance_shipping(state: &mut GameState, player: usize) -> Result<(), ActionError> {
  let faction = state.players[player].faction;
  if faction == Faction::Dwarves || faction == Faction::Fakirs {
    return Err(ActionError::FactionDisallowed);
  }
  let max = faction::setup(faction).shipping_max;
  if state.players[player].shipping >= max {
    return Err(ActionError::InvalidAction("shipping already at maximum"));
  }
  let cost = Resources::new(4, 0, 1);
  build::check_afford(&state.players[player].resources, &cost)?;
  state.players[player].resources.pay(&cost);
  state.players[player].shipping += 1;
  let vp = state.players[player].shipping as i32 + 1;
  state.award_vp(player, vp, VpSource::Shipping);
  Ok(())
}

pub fn advance_digging(state: &mut GameState, player: usize) -> Result<(), ActionError> {
  let faction = state.players[player].faction;
  let max = faction::setup(faction).digging_max;
  if max == 0 {
    return Err(ActionError::FactionDisallowed);
  }
  if state.players[player].digging >= max {
    return Err(ActionError::InvalidAction("digging already at maximum"));
  }
  let cost = Resources::new(5, 2, 1);
  build::check_afford(&state.players[player].resources, &cost)?;
  state.players[player].resources.pay(&cost);
  state.players[player].digging += 1;
  state.award_vp(player, 6, VpSource::Digging);
  Ok(())
}

/// Sends a priest to a cult track: 3 or 2 steps onto an open slot, where
/// the priest stays, or 1 step with the priest thrown back to the supply.
pub fn send_priest(
  state: &mut GameState,
  player: usize,
  track: CultTrack,
  steps: u8,
) -> Result<(), ActionError> {
  if steps < 1 || steps > 3 {
    return Err(ActionError::InvalidAction("priests advance 1, 2 or 3 steps"));
  }
  if state.players[player].resources.priests < 1 {
    return Err(ActionError::InsufficientResources(ResourceKind::Priests));
  }
  if !state.cult_board.has_open_slot(track, steps) {
    return Err(ActionError::TileUnavailable);
  }
  state.cult_board.occupy_slot(track, steps, player);
  state.players[player].resources.priests -= 1;
  state.advance_cult(player, track, steps);
  Ok(())
}

/// Passing: collect pass VP, return the bonus card and draft the next one.
/// The first passer opens next round's turn order.
pub fn pass(
  state: &mut GameState,
  player: usize,
  new_bonus: Option<BonusCard>,
) -> Result<(), ActionError> {
  let last_round = state.round >= crate::state::ROUNDS;
  match (last_round, new_bonus) {
    (false, None) => {
      return Err(ActionError::MissingInfo {
        round: state.round,
        players: vec![state.players[player].name.clone()],
      })
    }
    (false, Some(card)) => {
      if !state.bonus_supply.contains_key(&card) {
        return Err(ActionError::TileUnavailable);
      }
    }
    (true, Some(_)) => {
      return Err(ActionError::InvalidAction("no bonus card after round six"))
    }
    (true, None) => {}
  }

  // Pass VP from the returned card and the Air+1 favor.
  let counts = state.players[player].counts;
  if let Some(card) = state.players[player].bonus {
    let vp = card.pass_vp(
      counts.dwellings,
      counts.trading_houses,
      counts.strongholds,
      counts.sanctuaries,
    );
    state.award_vp(player, vp, VpSource::Pass);
  }
  if state.players[player].has_favor(FavorTile::Air1) {
    let vp = FavorTile::pass_vp_by_trading_houses(counts.trading_houses);
    state.award_vp(player, vp, VpSource::Pass);
  }
  // Engineers with a stronghold score their bridges on every pass.
  if state.players[player].faction == Faction::Engineers
    && state.players[player].stronghold_built()
  {
    let vp = 3 * town::own_bridge_links(state, player) as i32;
    state.award_vp(player, vp, VpSource::Pass);
  }

  // Swap cards through the supply.
  if let Some(old) = state.players[player].bonus.take() {
    state.bonus_supply.insert(old, 0);
  }
  if let Some(card) = new_bonus {
    let accrued = state.bonus_supply.remove(&card).unwrap_or(0);
    state.players[player].resources.coins += accrued;
    state.players[player].bonus = Some(card);
  }

  state.players[player].passed = true;
  state.pass_order.push(player);
  Ok(())
}

/// The Engineers may spend two workers on a bridge as a main action.
pub fn engineers_bridge(
  state: &mut GameState,
  player: usize,
  from: Hex,
  to: Hex,
) -> Result<(), ActionError> {
  if state.players[player].faction != Faction::Engineers {
    return Err(ActionError::FactionDisallowed);
  }
  let cost = Resources::new(0, 2, 0);
  build::check_afford(&state.players[player].resources, &cost)?;
  state.map.validate_bridge(from, to, player)?;
  state.players[player].resources.pay(&cost);
  state
    .map
    .add_bridge(from, to, player)
    .expect("validated above");
  state.players[player].bridges += 1;
  // A bridge can close a town.
  town::check_after_build(state, player, from);
  town::check_after_build(state, player, to);
  Ok(())
}

/// Free conversions; never advance the turn.
pub fn free_action(
  state: &mut GameState,
  player: usize,
  action: &Action,
) -> Result<(), ActionError> {
  match action {
    Action::Burn { count } => {
      if !state.players[player].power.can_burn(*count) {
        return Err(ActionError::InsufficientResources(ResourceKind::Power));
      }
      state.players[player].power.burn(*count);
      Ok(())
    }
    Action::Convert(c) => convert(state, player, *c),
    _ => Err(ActionError::InvalidAction("not a free action")),
  }
}

fn convert(state: &mut GameState, player: usize, c: Conversion) -> Result<(), ActionError> {
  let p = &mut state.players[player];
  match c {
    Conversion::PowerToCoins(n) => {
      if !p.power.can_spend(n) {
        return Err(ActionError::InsufficientResources(ResourceKind::Power));
      }
      p.power.spend(n);
      p.resources.coins += n as u32;
    }
    Conversion::PowerToWorkers(n) => {
      if !p.power.can_spend(3 * n) {
        return Err(ActionError::InsufficientResources(ResourceKind::Power));
      }
      p.power.spend(3 * n);
      p.resources.workers += n as u32;
    }
    Conversion::PowerToPriests(n) => {
      if !p.power.can_spend(5 * n) {
        return Err(ActionError::InsufficientResources(ResourceKind::Power));
      }
      p.power.spend(5 * n);
      p.resources.priests += n as u32;
    }
    Conversion::PriestsToWorkers(n) => {
      if p.resources.priests < n {
        return Err(ActionError::InsufficientResources(ResourceKind::Priests));
      }
      p.resources.priests -= n;
      p.resources.workers += n;
    }
    Conversion::WorkersToCoins(n) => {
      if p.resources.workers < n {
        return Err(ActionError::InsufficientResources(ResourceKind::Workers));
      }
      p.resources.workers -= n;
      p.resources.coins += n;
    }
    Conversion::VpToCoins(n) => {
      if p.faction != Faction::Alchemists {
        return Err(ActionError::FactionDisallowed);
      }
      if p.vp < n as i32 {
        return Err(ActionError::InvalidAction("not enough VP to trade"));
      }
      p.vp -= n as i32;
      p.resources.coins += n;
    }
    Conversion::CoinsToVp(n) => {
      if p.faction != Faction::Alchemists {
        return Err(ActionError::FactionDisallowed);
      }
      if p.resources.coins < 2 * n {
        return Err(ActionError::InsufficientResources(ResourceKind::Coins));
      }
      p.resources.coins -= 2 * n;
      p.vp += n as i32;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use crate::action::misc::*;
  use crate::action::{ActionError, Conversion};
  use crate::faction::Faction;
  use crate::phase::tests::bare_state;

  #[test]
  fn shipping_advance_costs_and_scores() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.players[0].resources.priests = 1;
    let vp = state.players[0].vp;
    advance_shipping(&mut state, 0).unwrap();
    assert_eq!(state.players[0].shipping, 1);
    assert_eq!(state.players[0].resources.coins, 15 - 4);
    assert_eq!(state.players[0].resources.priests, 0);
    assert_eq!(state.players[0].vp, vp + 2);
  }

  #[test]
  fn dwarves_never_ship() {
    let mut state = bare_state(vec![("d", Faction::Dwarves), ("n", Faction::Nomads)]);
    assert_eq!(
      advance_shipping(&mut state, 0),
      Err(ActionError::FactionDisallowed)
    );
  }

  #[test]
  fn mermaids_ship_to_five() {
    let mut state = bare_state(vec![("m", Faction::Mermaids), ("n", Faction::Nomads)]);
    state.players[0].resources.coins = 40;
    state.players[0].resources.priests = 9;
    for _ in 0..4 {
      advance_shipping(&mut state, 0).unwrap();
    }
    assert_eq!(state.players[0].shipping, 5);
    assert_eq!(
      advance_shipping(&mut state, 0),
      Err(ActionError::InvalidAction("shipping already at maximum"))
    );
  }

  #[test]
  fn digging_advance() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.players[0].resources.priests = 1;
    let vp = state.players[0].vp;
    advance_digging(&mut state, 0).unwrap();
    assert_eq!(state.players[0].digging, 1);
    assert_eq!(state.players[0].vp, vp + 6);
  }

  #[test]
  fn darklings_never_dig() {
    let mut state = bare_state(vec![("d", Faction::Darklings), ("n", Faction::Nomads)]);
    assert_eq!(
      advance_digging(&mut state, 0),
      Err(ActionError::FactionDisallowed)
    );
  }

  #[test]
  fn priest_sends_occupy_slots() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.players[0].resources.priests = 2;
    state.players[1].resources.priests = 2;
    send_priest(&mut state, 0, crate::cult::CultTrack::Fire, 3).unwrap();
    assert_eq!(state.players[0].cult[0], 3);
    assert_eq!(
      send_priest(&mut state, 1, crate::cult::CultTrack::Fire, 3),
      Err(ActionError::TileUnavailable)
    );
    // The one-step send is always open.
    send_priest(&mut state, 1, crate::cult::CultTrack::Fire, 1).unwrap();
    assert_eq!(state.players[1].resources.priests, 1);
  }

  #[test]
  fn conversions_trade_at_printed_rates() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("n", Faction::Nomads)]);
    state.players[0].power.gain(12);
    convert(&mut state, 0, Conversion::PowerToCoins(2)).unwrap();
    assert_eq!(state.players[0].resources.coins, 17);
    convert(&mut state, 0, Conversion::PowerToWorkers(1)).unwrap();
    assert_eq!(state.players[0].resources.workers, 4);
    convert(&mut state, 0, Conversion::WorkersToCoins(1)).unwrap();
    assert_eq!(state.players[0].resources.coins, 18);
  }

  #[test]
  fn vp_trading_is_alchemists_only() {
    let mut state = bare_state(vec![("w", Faction::Witches), ("a", Faction::Alchemists)]);
    assert_eq!(
      convert(&mut state, 0, Conversion::VpToCoins(1)),
      Err(ActionError::FactionDisallowed)
    );
    convert(&mut state, 1, Conversion::VpToCoins(3)).unwrap();
    assert_eq!(state.players[1].vp, 17);
    assert_eq!(state.players[1].resources.coins, 18);
    convert(&mut state, 1, Conversion::CoinsToVp(2)).unwrap();
    assert_eq!(state.players[1].vp, 19);
    assert_eq!(state.players[1].resources.coins, 14);
  }
}
