pub mod config;
pub mod error;
pub mod manifest;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod player_merge;
pub mod reference;
pub mod split;
pub mod tables;
pub mod validate;
