//! Application module: the session object shared by the UI and runtime.
//!
//! The `App` model lives in `app::model` and holds the catalog, recents,
//! playback controller and view state.

mod model;

pub use model::*;
