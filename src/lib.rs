extern crate chrono;
extern crate colored;
extern crate reqwest;
extern crate serde_derive;

pub mod config;
pub mod console;
pub mod defaults;
pub mod discord;
pub mod error;
pub mod github;
pub mod message;
pub mod notify;
