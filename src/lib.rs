pub mod collision;
pub mod compute;
pub mod config;
pub mod context;
pub mod curves;
pub mod director;
pub mod dispatch;
pub mod enemies;
pub mod entities;
pub mod error;
pub mod events;
pub mod extra_guns;
pub mod gems;
pub mod guardians;
pub mod pool;
pub mod render;
pub mod satellites;
pub mod ship;
pub mod shots;
pub mod sprites;
