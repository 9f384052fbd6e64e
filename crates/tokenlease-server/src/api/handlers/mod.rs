//! API request handlers

pub mod config;
pub mod login;

pub use config::{
    clear_config, read_config, write_config, ClearConfigResponse, ConfigView, WriteConfigRequest,
};
pub use login::{login, AppState};
