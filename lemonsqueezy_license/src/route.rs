use std::fmt::{Display, Formatter, Result as FmtResult};

pub const DEFAULT_BASE_URL: &str = "https://api.lemonsqueezy.com/v1/licenses";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Route {
    Activate,
    Deactivate,
    Validate,
}

impl Route {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Route::Activate => "activate",
            Route::Deactivate => "deactivate",
            Route::Validate => "validate",
        }
    }

    #[must_use]
    pub fn url(self, base_url: &str) -> String {
        format!("{base_url}/{}", self.path())
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.path())
    }
}
