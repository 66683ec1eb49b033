//! # Tile and card definitions
//!
//! Favor tiles, bonus cards, town tiles and round scoring tiles. These are
//! read-only rule data; per-game stock and ownership live on the game state.

mod bonus;
mod favor;
mod scoring;
mod town;

pub use self::bonus::*;
pub use self::favor::*;
pub use self::scoring::*;
pub use self::town::*;
