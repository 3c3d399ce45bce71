use std::fmt;

/// HTTP verbs used against the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every API endpoint the harness talks to.
///
/// The variant carries the concrete path parameters, while [`Endpoint::key`]
/// yields the templated form so that metrics for `/lost-items/1` and
/// `/lost-items/2` aggregate under `GET /lost-items/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Signup,
    /// Login path is configurable since deployments disagree on it
    Login(String),
    CreateLostItem,
    LostItem(i64),
    CreateFoundItem,
    FoundItem(i64),
    AdminUser(i64),
    AdminItem(i64),
    AdminReports,
    Search,
    Items,
    ItemStats,
}

impl Endpoint {
    /// Concrete request path, relative to the base URL
    pub fn path(&self) -> String {
        match self {
            Endpoint::Signup => "/auth/signup".to_string(),
            Endpoint::Login(path) => path.clone(),
            Endpoint::CreateLostItem => "/lost-items".to_string(),
            Endpoint::LostItem(id) => format!("/lost-items/{}", id),
            Endpoint::CreateFoundItem => "/found-items".to_string(),
            Endpoint::FoundItem(id) => format!("/found-items/{}", id),
            Endpoint::AdminUser(id) => format!("/admin/users/{}", id),
            Endpoint::AdminItem(id) => format!("/admin/items/{}", id),
            Endpoint::AdminReports => "/admin/reports".to_string(),
            Endpoint::Search => "/search".to_string(),
            Endpoint::Items => "/items".to_string(),
            Endpoint::ItemStats => "/items/stats".to_string(),
        }
    }

    /// Path with parameters replaced by placeholders
    pub fn template(&self) -> String {
        match self {
            Endpoint::LostItem(_) => "/lost-items/{id}".to_string(),
            Endpoint::FoundItem(_) => "/found-items/{id}".to_string(),
            Endpoint::AdminUser(_) => "/admin/users/{id}".to_string(),
            Endpoint::AdminItem(_) => "/admin/items/{id}".to_string(),
            other => other.path(),
        }
    }

    /// Metrics key: method plus templated path
    pub fn key(&self, method: Method) -> String {
        format!("{} {}", method, self.template())
    }
}
