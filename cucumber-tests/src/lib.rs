//! Shared state for the Shortlink cucumber scenarios

pub mod world;

pub use world::ShortlinkWorld;
