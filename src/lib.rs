pub mod class;
pub mod config;
pub mod demo_feed;
pub mod feed;
pub mod filter;
pub mod http_client;
pub mod logging;
pub mod ordering;
pub mod parse;
pub mod render;
pub mod standings;
pub mod state;
