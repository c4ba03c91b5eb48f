pub mod config;
pub mod directus;
pub mod logging;
pub mod mastodon;
