use crate::pattern;
use crate::route::{HttpMethod, Route, Scope};
use dashmap::DashMap;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Thread-safe route registry with an atomically-swapped resolved view.
///
/// Scopes and routes are the source of truth; every mutation recompiles
/// the flat pattern set and swaps it in, so report computation always
/// reads a consistent snapshot without locking.
pub struct RouteRegistry {
    /// Current resolved pattern set
    resolved: arc_swap::ArcSwap<Vec<ResolvedPattern>>,

    /// Source of truth: all registered routes by ID
    routes: DashMap<String, Route>,

    /// Branch nodes of the route tree by ID
    scopes: DashMap<String, Scope>,
}

/// One leaf of the route tree, flattened: the full human-readable path
/// template plus the compiled matcher applied to logged request paths.
#[derive(Debug, Clone)]
pub struct ResolvedPattern {
    /// Full path template, parent prefixes included
    pub path: String,

    /// Anchored matcher over raw logged paths
    pub regex: Regex,

    /// The route this pattern was resolved from
    pub route_id: String,

    /// Methods the route accepts (empty = all methods)
    pub methods: Vec<HttpMethod>,
}

impl ResolvedPattern {
    /// Methods that count toward this pattern, narrowed by the global
    /// allow-list. Empty vec = all methods; None = the route's methods
    /// and the allow-list are disjoint, so nothing can ever match.
    pub fn effective_methods(&self, allowed: &[String]) -> Option<Vec<String>> {
        if self.methods.is_empty() {
            return Some(allowed.to_vec());
        }
        let mine: Vec<String> = self.methods.iter().map(|m| m.as_str().to_string()).collect();
        if allowed.is_empty() {
            return Some(mine);
        }
        let both: Vec<String> = mine.into_iter().filter(|m| allowed.contains(m)).collect();
        if both.is_empty() { None } else { Some(both) }
    }
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self {
            resolved: arc_swap::ArcSwap::new(Arc::new(Vec::new())),
            routes: DashMap::new(),
            scopes: DashMap::new(),
        }
    }

    /// Add or update a scope. Triggers re-resolution.
    pub fn add_scope(&self, scope: Scope) {
        info!(scope_id = %scope.id, prefix = %scope.prefix, "Adding scope");
        self.scopes.insert(scope.id.clone(), scope);
        self.rebuild();
    }

    /// Add or update a route. Triggers re-resolution.
    pub fn add_route(&self, route: Route) {
        info!(route_id = %route.id, path = %route.path, trackable = route.trackable, "Adding route");
        self.routes.insert(route.id.clone(), route);
        self.rebuild();
    }

    /// Remove a route by ID. Triggers re-resolution.
    pub fn remove_route(&self, route_id: &str) {
        info!(route_id = %route_id, "Removing route");
        self.routes.remove(route_id);
        self.rebuild();
    }

    /// Current resolved pattern snapshot.
    pub fn patterns(&self) -> Arc<Vec<ResolvedPattern>> {
        self.resolved.load_full()
    }

    /// Total number of registered routes (resolved or not).
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Replace all scopes and routes atomically (used during config load).
    pub fn replace_all(&self, scopes: Vec<Scope>, routes: Vec<Route>) {
        self.scopes.clear();
        self.routes.clear();
        for scope in scopes {
            self.scopes.insert(scope.id.clone(), scope);
        }
        for route in routes {
            self.routes.insert(route.id.clone(), route);
        }
        self.rebuild();
    }

    /// Recompile the flat pattern set from the current route tree.
    ///
    /// Depth-first walk over the scope tree. At each branch the nearest
    /// enclosing non-trivial prefixes are carried down; root matchers
    /// contribute nothing. Leaves are skipped when disabled, untrackable,
    /// format-suffix captures, or uncompilable (the last with a warning,
    /// never aborting the rest of the set).
    fn rebuild(&self) {
        let scopes: Vec<Scope> = self.scopes.iter().map(|s| s.value().clone()).collect();
        let routes: Vec<Route> = self.routes.iter().map(|r| r.value().clone()).collect();

        let mut child_scopes: HashMap<Option<String>, Vec<&Scope>> = HashMap::new();
        for scope in &scopes {
            child_scopes.entry(scope.parent.clone()).or_default().push(scope);
        }
        let mut scope_routes: HashMap<Option<String>, Vec<&Route>> = HashMap::new();
        for route in &routes {
            scope_routes.entry(route.scope.clone()).or_default().push(route);
        }

        for route in &routes {
            if let Some(ref scope_id) = route.scope {
                if !self.scopes.contains_key(scope_id) {
                    warn!(route_id = %route.id, scope = %scope_id, "Route references unknown scope; it will not resolve");
                }
            }
        }

        let mut resolved = Vec::new();
        let mut prefixes: Vec<String> = Vec::new();
        Self::walk(None, &child_scopes, &scope_routes, &mut prefixes, &mut resolved);
        resolved.sort_by(|a, b| a.path.cmp(&b.path));

        info!(patterns = resolved.len(), routes = routes.len(), "Route patterns resolved");
        self.resolved.store(Arc::new(resolved));
    }

    fn walk(
        node: Option<&str>,
        child_scopes: &HashMap<Option<String>, Vec<&Scope>>,
        scope_routes: &HashMap<Option<String>, Vec<&Route>>,
        prefixes: &mut Vec<String>,
        out: &mut Vec<ResolvedPattern>,
    ) {
        let key = node.map(str::to_string);

        for route in scope_routes.get(&key).into_iter().flatten() {
            if !route.is_active() {
                debug!(route_id = %route.id, "Skipping disabled route");
                continue;
            }
            if !route.trackable {
                debug!(route_id = %route.id, "Skipping untracked route");
                continue;
            }
            if pattern::has_format_param(&route.path) {
                debug!(route_id = %route.id, "Skipping format-suffix route");
                continue;
            }
            match Self::resolve_leaf(prefixes, route) {
                Ok(p) => out.push(p),
                Err(e) => {
                    warn!(route_id = %route.id, path = %route.path, error = %e, "Skipping malformed route pattern");
                }
            }
        }

        for scope in child_scopes.get(&key).into_iter().flatten() {
            let pushed = if scope.is_root_prefix() {
                false
            } else {
                prefixes.push(scope.prefix.clone());
                true
            };
            Self::walk(Some(scope.id.as_str()), child_scopes, scope_routes, prefixes, out);
            if pushed {
                prefixes.pop();
            }
        }
    }

    fn resolve_leaf(prefixes: &[String], route: &Route) -> Result<ResolvedPattern, crate::TallyError> {
        let mut fragments = Vec::with_capacity(prefixes.len() + 1);
        for prefix in prefixes {
            // Trailing slash on a prefix would double up against the
            // route template's leading slash and match nothing.
            fragments.push(pattern::fragment(prefix.trim_end_matches('/'))?);
        }
        fragments.push(pattern::fragment(&route.path)?);
        let refs: Vec<&str> = fragments.iter().map(String::as_str).collect();
        let regex = pattern::compile(&refs)?;

        let prefix_refs: Vec<&str> = prefixes.iter().map(String::as_str).collect();
        let path = pattern::join_path(&prefix_refs, &route.path);

        Ok(ResolvedPattern {
            path,
            regex,
            route_id: route.id.clone(),
            methods: route.methods.clone(),
        })
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
