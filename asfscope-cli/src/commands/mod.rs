pub mod common;
pub mod deps;
pub mod header;
pub mod manifest;
pub mod pack;
