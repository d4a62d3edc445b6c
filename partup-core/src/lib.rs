pub mod client;
pub mod join;
pub mod manifest;
pub mod split;
