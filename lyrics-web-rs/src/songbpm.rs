mod api;
pub mod models;

pub use api::SongBpmApi;
