pub mod events;
pub mod player;
pub mod tracks;

pub use events::PlayerEvent;
pub use player::PlayerSnapshot;
pub use tracks::Track;
