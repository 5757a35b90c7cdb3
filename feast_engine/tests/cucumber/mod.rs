mod feast_world;
mod setups;
mod steps;

pub use feast_world::FeastWorld;
