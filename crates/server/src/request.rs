//! Recommendation request parameters.

use data_loader::UserId;
use pipeline::FilterOptions;
use serde::{Deserialize, Serialize};

/// Default number of results per request.
pub const DEFAULT_LIMIT: usize = 20;

/// Who the recommendations are for. Decides the scoring path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    User(UserId),
    Guest,
}

impl Audience {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Guest => None,
        }
    }
}

/// One recommendation request. Every narrowing field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub audience: Audience,
    pub session_token: Option<String>,
    /// Genre display names; unknown names are ignored
    pub genres: Vec<String>,
    /// Free text mood, only used for guests
    pub mood_text: Option<String>,
    pub year_start: Option<u16>,
    pub year_end: Option<u16>,
    /// "short", "medium" or "long"; anything else is ignored
    pub runtime: Option<String>,
    pub include_local: bool,
    pub limit: usize,
}

impl RecommendationRequest {
    pub fn new(audience: Audience) -> Self {
        Self {
            audience,
            session_token: None,
            genres: Vec::new(),
            mood_text: None,
            year_start: None,
            year_end: None,
            runtime: None,
            include_local: true,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn guest() -> Self {
        Self::new(Audience::Guest)
    }

    pub fn for_user(user_id: UserId) -> Self {
        Self::new(Audience::User(user_id))
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mood(mut self, mood_text: impl Into<String>) -> Self {
        self.mood_text = Some(mood_text.into());
        self
    }

    pub fn with_year_range(mut self, start: Option<u16>, end: Option<u16>) -> Self {
        self.year_start = start;
        self.year_end = end;
        self
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    pub fn with_include_local(mut self, include_local: bool) -> Self {
        self.include_local = include_local;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Catalog filters implied by this request.
    pub fn filter_options(&self) -> FilterOptions {
        let mut options = FilterOptions::default()
            .with_genre_names(self.genres.iter().map(String::as_str))
            .with_year_range(self.year_start, self.year_end)
            .with_include_local(self.include_local);
        if let Some(runtime) = &self.runtime {
            options = options.with_runtime_name(runtime);
        }
        options
    }
}

impl Default for RecommendationRequest {
    fn default() -> Self {
        Self::guest()
    }
}
