mod album;
mod artist;
mod auth;
mod base;
mod cache;
mod episode;
mod playlist;
mod show;
mod track;
mod user;

pub use album::AlbumManager;
pub use artist::ArtistManager;
pub use auth::{Credential, TokenManager};
pub use base::{GetOptions, ListOptions};
pub use cache::{Cache, CacheRegistry};
pub use episode::EpisodeManager;
pub use playlist::PlaylistManager;
pub use show::ShowManager;
pub use track::TrackManager;
pub use user::UserManager;
