pub mod archive;
pub mod clean;
pub mod dates;
pub mod extract;
pub mod fetch;
pub mod mods;
pub mod paths;
pub mod pipeline;
