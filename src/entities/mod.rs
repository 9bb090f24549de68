pub mod board_game;
pub mod game;
pub mod media;
pub mod streaming_availability;
