pub mod config;
pub mod lobby;
pub mod logging;
pub mod render;
pub mod table;
pub mod transport;
