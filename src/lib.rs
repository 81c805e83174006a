pub mod config;
pub mod dynamics;
pub mod error;
pub mod geometry;
pub mod numerics;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod view;
