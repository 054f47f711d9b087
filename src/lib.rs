pub mod autosave;
pub mod config;
pub mod error;
pub mod gateway;
pub mod input;
pub mod memory;
pub mod model;
pub mod policy;
pub mod replay;
pub mod session;
pub mod status;
pub mod word_nav;
