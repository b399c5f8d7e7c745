pub mod favorites;
pub mod progress;
pub mod store;

pub use favorites::{FavoritesView, hydrate_favorites};
pub use progress::{ProgressPayload, WatchState};
pub use store::{FileStore, LocalStore, StoreError};
