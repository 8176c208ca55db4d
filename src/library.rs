//! Track catalog: import, hydration, search and recents.

mod catalog;
mod import;
mod model;
mod probe;
mod recents;
mod worker;

pub use catalog::Catalog;
pub use model::{AudioRef, RecentEntry, Track, TrackMeta};
pub use recents::{RECENTS_CAP, Recents};
pub use worker::{ImportEvent, spawn_import, spawn_probe};
