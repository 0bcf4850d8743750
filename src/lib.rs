pub mod config;
pub mod logo;
pub mod match_log;
pub mod match_setup;
pub mod model;
pub mod persist;
pub mod picker;
pub mod roster_import;
pub mod state;
pub mod store;
pub mod tactical;
pub mod team_form;
pub mod ui;
pub mod worker;
