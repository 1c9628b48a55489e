//! Application routes and their access tiers

use std::fmt;

/// Who may view a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    SignedIn,
    Admin,
}

/// A page of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Signup,
    Search,
    Upload,
    GetTag,
    Stories,
    Affiliate,
    Profile,
    Admin,
    NotFound,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Home,
        Route::Login,
        Route::Signup,
        Route::Search,
        Route::Upload,
        Route::GetTag,
        Route::Stories,
        Route::Affiliate,
        Route::Profile,
        Route::Admin,
        Route::NotFound,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Search => "/search",
            Route::Upload => "/upload",
            Route::GetTag => "/get-tag",
            Route::Stories => "/stories",
            Route::Affiliate => "/affiliate",
            Route::Profile => "/profile",
            Route::Admin => "/admin",
            Route::NotFound => "*",
        }
    }

    /// Resolve a path, ignoring any query string and trailing slash
    pub fn from_path(path: &str) -> Route {
        let path = path.split('?').next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };

        Route::ALL
            .iter()
            .copied()
            .find(|route| *route != Route::NotFound && route.path() == path)
            .unwrap_or(Route::NotFound)
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Upload | Route::Profile => Access::SignedIn,
            Route::Admin => Access::Admin,
            _ => Access::Public,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
