pub mod alerts;
pub mod capability;
pub mod channel;
pub mod config;
pub mod context;
pub mod feed;
pub mod model;
pub mod permission;
pub mod platform;
