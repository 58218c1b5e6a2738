//! Route handlers, one module per resource

pub mod albums;
pub mod authentications;
pub mod collaborations;
pub mod exports;
pub mod health;
pub mod likes;
pub mod playlists;
pub mod songs;
pub mod uploads;
pub mod users;
