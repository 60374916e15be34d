pub mod capabilities;
pub mod config;
pub mod converters;
pub mod handlers;
pub mod server;

pub use server::Backend;
