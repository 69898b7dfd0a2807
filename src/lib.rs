pub mod components;
pub mod config;
pub mod constants;
pub mod distance;
pub mod errors;
pub mod graph;
pub mod islands;
pub mod location;
pub mod path;
pub mod protocol;
pub mod session;
pub mod strategy;
pub mod terrain;

#[cfg(test)]
mod arbitrary;

pub use errors::*;
pub use location::*;
pub use terrain::*;
