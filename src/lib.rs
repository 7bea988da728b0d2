pub mod cli;
pub mod config;
pub mod confirm;
pub mod error;
pub mod github;
pub mod models;
pub mod starred;
pub mod storage;
pub mod store;
pub mod types;

pub use error::{FavoritesError, Result};
pub use models::{AddOutcome, FavoritesList, LookupFailure, StoreState, UserRecord};
pub use store::{FavoritesStore, StoreOptions};
