//! Page view models
//!
//! Each view issues backend calls on mount or on a user action and keeps the
//! result locally. Failures are shown to the user and leave the last known
//! data in place.

mod admin;
mod home;
mod profile;
mod search;
mod upload;

pub use admin::AdminView;
pub use home::HomeView;
pub use profile::ProfileView;
pub use search::SearchView;
pub use upload::{ImageFile, UploadForm, UploadPermission, UploadView};

/// What a data-backed page renders
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// A request is in flight
    Loading,
    /// Loaded, nothing to show; carries the placeholder text
    Empty(&'static str),
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Build the state for a list that is loading or loaded
pub(crate) fn list_state<T: Clone>(loading: bool, items: &[T], empty: &'static str) -> ViewState<Vec<T>> {
    if loading {
        ViewState::Loading
    } else if items.is_empty() {
        ViewState::Empty(empty)
    } else {
        ViewState::Ready(items.to_vec())
    }
}
