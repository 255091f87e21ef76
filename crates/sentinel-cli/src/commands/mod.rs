pub mod compile;
pub mod config;
pub mod inspect;
pub mod prove;
pub mod setup;
pub mod verify;
