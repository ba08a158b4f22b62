pub mod clock;
pub mod config;
pub mod fetch;
pub mod platform;
pub mod protocol;
pub mod rotator;
pub mod selector;
pub mod session;
pub mod sponsors;
pub mod store;
