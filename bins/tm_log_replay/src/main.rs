//! Replays a Terra Mystica action log through the engine and prints the
//! final snapshot as JSON.
//!
//! The log starts with a small header, then one action per line in the
//! Snellman-style grammar:
//!
//! ```text
//! players witches,nomads
//! scoring SCORE1,SCORE5,SCORE3,SCORE7,SCORE6,SCORE2
//! bonus BON1,BON2,BON3,BON4,BON5
//! build E5
//! build C3
//! ...
//! ```
//!
//! `scoring`, `bonus` and `towns` are optional; a default draw is used when
//! absent.
//! State is a pure function of the log, so re-running this tool on the
//! same file always prints the same snapshot.

#[macro_use]
extern crate log;
extern crate env_logger;
extern crate terramystica;

use std::env;
use terramystica::faction::Faction;
use terramystica::snellman;
use terramystica::tiles::{BonusCard, ScoringTile, TownTile, BONUS_CARDS, TOWN_TILES};
use terramystica::{Game, GameSetup};

fn default_scoring() -> Vec<ScoringTile> {
  vec![
    ScoringTile::Spades,
    ScoringTile::TradingWater,
    ScoringTile::DwellingWater,
    ScoringTile::StrongholdFire,
    ScoringTile::TradingAir,
    ScoringTile::Towns,
  ]
}

fn parse_header(log_text: &str) -> Result<(GameSetup, usize), String> {
  let mut players: Option<Vec<(String, Faction)>> = None;
  let mut scoring = default_scoring();
  let mut bonus: Vec<BonusCard> = BONUS_CARDS.to_vec();
  let mut towns: Vec<TownTile> = TOWN_TILES
    .iter()
    .flat_map(|t| std::iter::repeat(*t).take(t.stock() as usize))
    .collect();
  let mut body_start = 0;

  for (i, line) in log_text.lines().enumerate() {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    let mut parts = line.splitn(2, char::is_whitespace);
    let keyword = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();
    match keyword {
      "players" => {
        let seats = rest
          .split(',')
          .map(|name| {
            let name = name.trim();
            Faction::from_name(name)
              .map(|f| (name.to_string(), f))
              .ok_or_else(|| format!("unknown faction: {}", name))
          })
          .collect::<Result<Vec<_>, _>>()?;
        players = Some(seats);
      }
      "scoring" => {
        scoring = rest
          .split(',')
          .map(|code| {
            ScoringTile::from_code(code.trim())
              .ok_or_else(|| format!("unknown scoring tile: {}", code))
          })
          .collect::<Result<Vec<_>, _>>()?;
      }
      "bonus" => {
        bonus = rest
          .split(',')
          .map(|code| {
            BonusCard::from_code(code.trim())
              .ok_or_else(|| format!("unknown bonus card: {}", code))
          })
          .collect::<Result<Vec<_>, _>>()?;
      }
      "towns" => {
        towns = rest
          .split(',')
          .map(|code| {
            TownTile::from_code(code.trim())
              .ok_or_else(|| format!("unknown town tile: {}", code))
          })
          .collect::<Result<Vec<_>, _>>()?;
      }
      _ => {
        body_start = i;
        break;
      }
    }
    body_start = i + 1;
  }

  let players = players.ok_or_else(|| "log has no `players` header".to_string())?;
  Ok((
    GameSetup {
      players,
      scoring_tiles: scoring,
      bonus_cards: bonus,
      town_tiles: towns,
    },
    body_start,
  ))
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
  env_logger::init();
  let path = env::args()
    .nth(1)
    .ok_or("usage: tm_log_replay <logfile>")?;
  info!("replaying log @ {}", path);
  let log_text = std::fs::read_to_string(&path)?;

  let (setup, body_start) = parse_header(&log_text)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
  let mut game = Game::new(setup)?;

  let body: String = log_text
    .lines()
    .skip(body_start)
    .collect::<Vec<_>>()
    .join("\n");
  let applied = snellman::replay(&mut game, &body)?;
  info!("applied {} actions", applied);

  let snapshot = game.snapshot();
  for p in snapshot.players.iter() {
    info!("{} ({}) {} VP", p.name, p.faction, p.vp);
  }
  println!("{}", serde_json::to_string_pretty(&snapshot)?);
  Ok(())
}
