use serde::{Deserialize, Serialize};

/// A Route declares one URL pattern whose traffic can show up in usage
/// reports. Registration is explicit: whether a route is counted is the
/// `trackable` flag, set when the route is declared, never inferred from
/// its handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Unique route identifier
    pub id: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Path template (parametric `{param}`, trailing wildcard `{*rest}`)
    pub path: String,

    /// Allowed HTTP methods (empty = all methods)
    #[serde(default)]
    pub methods: Vec<HttpMethod>,

    /// Enclosing scope ID (None = mounted at the root)
    #[serde(default)]
    pub scope: Option<String>,

    /// Whether requests hitting this route are counted in usage reports
    #[serde(default = "default_trackable")]
    pub trackable: bool,

    /// Whether this route is enabled
    #[serde(default = "default_enabled")]
    pub enable: bool,

    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Last update timestamp
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A Scope is a branch node of the route tree: a shared path prefix under
/// which routes (and further scopes) are mounted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    /// Unique scope identifier
    pub id: String,

    /// Prefix template (`/api/v1`, `/orgs/{org}`); `/` or empty means the
    /// universal root and contributes nothing to nested patterns
    pub prefix: String,

    /// Parent scope ID (None = top level)
    #[serde(default)]
    pub parent: Option<String>,
}

/// HTTP methods recognized in route declarations and method allow-lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl Route {
    /// Check if the route participates in pattern resolution.
    pub fn is_active(&self) -> bool {
        self.enable
    }
}

impl Scope {
    /// A root scope's prefix matches everything and is skipped when
    /// building nested patterns.
    pub fn is_root_prefix(&self) -> bool {
        self.prefix.is_empty() || self.prefix == "/"
    }
}

// Defaults

fn default_trackable() -> bool {
    true
}

fn default_enabled() -> bool {
    true
}
