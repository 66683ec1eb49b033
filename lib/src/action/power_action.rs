//! The numbered power actions along the board edge, one use per round
//! across all players.

use crate::action::{ActionError, PowerActionSlot, ResourceKind};
use crate::hex::Hex;
use crate::phase;
use crate::state::{GameState, VpSource};
use crate::town;

pub fn power_action(
  state: &mut GameState,
  player: usize,
  slot: PowerActionSlot,
) -> Result<(), ActionError> {
  let idx = (slot.index() - 1) as usize;
  if state.power_actions_used[idx] {
    return Err(ActionError::SpecialActionAlreadyUsed);
  }
  let cost = slot.cost();
  if !state.players[player].power.can_spend(cost) {
    return Err(ActionError::InsufficientResources(ResourceKind::Power));
  }
  state.players[player].power.spend(cost);
  state.power_actions_used[idx] = true;
  match slot {
    PowerActionSlot::Bridge => {
      state.pending_bridge = Some(player);
    }
    PowerActionSlot::Spade => {
      *state.pending_spades.entry(player).or_insert(0) += 1;
    }
    PowerActionSlot::TwoSpades => {
      *state.pending_spades.entry(player).or_insert(0) += 2;
    }
    PowerActionSlot::Coins7 => {
      state.players[player].resources.coins += 7;
    }
    PowerActionSlot::Workers2 => {
      state.players[player].resources.workers += 2;
    }
    PowerActionSlot::Priest => {
      state.players[player].resources.priests += 1;
    }
    PowerActionSlot::PowerVp => {
      state.award_vp(player, 4, VpSource::Scoring);
    }
  }
  Ok(())
}

/// The bridge owed after paying for power action 1.
pub fn place_bridge(state: &mut GameState, from: Hex, to: Hex) -> Result<(), ActionError> {
  let player = match state.pending_bridge {
    Some(p) => p,
    None => return Err(ActionError::InvalidAction("no bridge pending")),
  };
  state.map.validate_bridge(from, to, player)?;
  state
    .map
    .add_bridge(from, to, player)
    .expect("validated above");
  state.players[player].bridges += 1;
  state.pending_bridge = None;
  town::check_after_build(state, player, from);
  town::check_after_build(state, player, to);
  phase::after_pending_drained(state);
  Ok(())
}
