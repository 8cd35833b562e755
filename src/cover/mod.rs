pub(crate) mod compose;
pub(crate) mod config;
pub(crate) mod layers;
pub(crate) mod state;
pub(crate) mod theme;
