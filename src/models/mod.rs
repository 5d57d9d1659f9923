mod game;

pub use game::{Game, Player, User, MAX_PLAYERS};
