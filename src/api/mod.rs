// HTTP APIs

mod error;
pub mod affirmations;
pub mod connections;
pub mod content;
pub mod spotify;

pub use affirmations::{create_affirmations_router, AffirmationAppState};
pub use connections::{create_connections_router, ConnectionStatus};
pub use content::{create_content_router, ContentAppState};
pub use error::AppError;
pub use spotify::{create_spotify_router, SpotifyAppState, SpotifyProvider, SpotifyStatus};
