//! # Terra Mystica Rules Engine
//!
//! terramystica is a deterministic, authoritative simulator for the Terra Mystica
//! base game. It ingests a sequence of player actions, either live or replayed from
//! a Snellman-style log, and advances a fully typed game state while enforcing the
//! rules of all 14 factions, the 9-row hex board, cult tracks, the power cycle,
//! town formation, scoring tiles, favor tiles, bonus cards and end-of-game scoring.
//! Identical inputs always produce identical outputs, so replays and live play
//! share this one engine.

#[macro_use]
extern crate serde_derive;
extern crate serde;
extern crate serde_json;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate regex;

#[macro_use]
pub mod hex;
pub mod action;
pub mod cult;
pub mod endgame;
pub mod faction;
pub mod game;
pub mod map;
pub mod phase;
pub mod power;
pub mod snellman;
pub mod state;
pub mod tiles;
pub mod town;

pub use crate::game::{Game, GameSetup, StateView};
