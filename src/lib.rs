pub mod feed;
pub mod fixtures_fetch;
pub mod fpl_fetch;
pub mod http_client;
pub mod players;
pub mod state;
