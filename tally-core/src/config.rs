use crate::route::{Route, Scope};
use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Tally configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TallyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Report computation settings.
///
/// Passed into the aggregator at construction; nothing here is read from
/// process-global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// When true, only requests served on `site_host` are counted.
    #[serde(default = "default_true")]
    pub restrict_to_current_site: bool,

    /// HTTP method allow-list (empty = count all methods).
    #[serde(default)]
    pub allowed_methods: Vec<String>,

    /// Host this deployment serves reports for.
    #[serde(default = "default_site_host")]
    pub site_host: String,
}

/// Declared route tree: scope (branch) and route (leaf) registrations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoutesConfig {
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_addr() -> String { "0.0.0.0:9280".into() }
fn default_true() -> bool { true }
fn default_site_host() -> String { "localhost".into() }

// ── Impls ─────────────────────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            enabled: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            restrict_to_current_site: true,
            allowed_methods: Vec::new(),
            site_host: default_site_host(),
        }
    }
}

impl TallyConfig {
    /// Load configuration from YAML file + env overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: TallyConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("TALLY_").split("_"))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_server_config_has_expected_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.addr, "0.0.0.0:9280");
        assert!(cfg.enabled);
    }

    #[test]
    fn default_report_config_restricts_site_and_allows_all_methods() {
        let cfg = ReportConfig::default();
        assert!(cfg.restrict_to_current_site);
        assert!(cfg.allowed_methods.is_empty());
        assert_eq!(cfg.site_host, "localhost");
    }

    #[test]
    fn default_routes_config_is_empty() {
        let cfg = RoutesConfig::default();
        assert!(cfg.scopes.is_empty());
        assert!(cfg.routes.is_empty());
    }

    #[test]
    fn load_from_valid_yaml_overrides_defaults() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmpfile,
            "server:\n  addr: \"0.0.0.0:8888\"\nreport:\n  site_host: api.example.com\n"
        )
        .unwrap();
        let cfg = TallyConfig::load(tmpfile.path()).unwrap();
        assert_eq!(cfg.server.addr, "0.0.0.0:8888");
        assert_eq!(cfg.report.site_host, "api.example.com");
        // Defaults still apply for unspecified fields
        assert!(cfg.report.restrict_to_current_site);
    }

    #[test]
    fn load_yaml_with_report_knobs() {
        let yaml = r#"
report:
  restrict_to_current_site: false
  allowed_methods:
    - GET
    - POST
"#;
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "{yaml}").unwrap();
        let cfg = TallyConfig::load(tmpfile.path()).unwrap();
        assert!(!cfg.report.restrict_to_current_site);
        assert_eq!(cfg.report.allowed_methods, vec!["GET".to_string(), "POST".to_string()]);
    }

    #[test]
    fn load_yaml_with_route_tree() {
        let yaml = r#"
routes:
  scopes:
    - id: api
      prefix: /api
  routes:
    - id: users
      path: "/users/{id}"
      scope: api
      methods: [GET]
    - id: internal
      path: /internal
      trackable: false
"#;
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "{yaml}").unwrap();
        let cfg = TallyConfig::load(tmpfile.path()).unwrap();
        assert_eq!(cfg.routes.scopes.len(), 1);
        assert_eq!(cfg.routes.routes.len(), 2);
        assert_eq!(cfg.routes.routes[0].scope.as_deref(), Some("api"));
        assert!(cfg.routes.routes[0].trackable);
        assert!(!cfg.routes.routes[1].trackable);
    }
}
