//! Route Guard System - permission and role protection for navigation
//!
//! Guards never load a context themselves; the application shell loads it on
//! project entry. A guard only consults an [`Authorizer`]:
//! 1. no context → deny and redirect to the unauthorized page (or the guard's
//!    own redirect)
//! 2. requirement not met → deny and redirect
//! 3. otherwise allow
//!
//! Example:
//! ```ignore
//! let guards = RouteGuards::new("/unauthorized")
//!     .with_guard("/projects/*/inspections/*", RouteGuard::permissions(
//!         vec![Permission::InspectionRead],
//!         RequireMode::All,
//!     ));
//! ```

use crate::config::RbacConfig;
use crate::rbac::{Authorizer, BusinessRole, Permission, RequireMode};
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use hyper::{Method, Request, Response, StatusCode};

type Resp = Response<Full<Bytes>>;

/// Default destination for denied navigation
pub const DEFAULT_UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Result of a route guard check
#[derive(Debug)]
pub enum GuardResult {
    /// Navigation is allowed, continue to handler
    Allow,
    /// Navigation is denied, return this redirect
    Deny(Resp),
}

impl GuardResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardResult::Allow)
    }
}

/// Why a guard denied navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoContext,
    MissingPermissions,
    MissingRoles,
}

/// Pure outcome of a guard, before it becomes an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Deny { reason: DenyReason, redirect_to: String },
}

/// Route guard definition
#[derive(Debug, Clone)]
pub enum RouteGuard {
    /// Require permissions, all of them or any of them
    RequirePermissions {
        permissions: Vec<Permission>,
        mode: RequireMode,
        /// Where to redirect if unauthorized (None = unauthorized page)
        redirect_to: Option<String>,
    },

    /// Require at least one of the listed business roles
    RequireRoles { roles: Vec<BusinessRole>, redirect_to: Option<String> },
}

impl RouteGuard {
    pub fn permissions(permissions: Vec<Permission>, mode: RequireMode) -> Self {
        RouteGuard::RequirePermissions { permissions, mode, redirect_to: None }
    }

    pub fn roles(roles: Vec<BusinessRole>) -> Self {
        RouteGuard::RequireRoles { roles, redirect_to: None }
    }

    /// Redirect somewhere other than the unauthorized page on denial
    pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
        match &mut self {
            RouteGuard::RequirePermissions { redirect_to, .. }
            | RouteGuard::RequireRoles { redirect_to, .. } => *redirect_to = Some(target.into()),
        }
        self
    }

    fn explicit_redirect(&self) -> Option<&str> {
        match self {
            RouteGuard::RequirePermissions { redirect_to, .. }
            | RouteGuard::RequireRoles { redirect_to, .. } => redirect_to.as_deref(),
        }
    }

    /// Decide without building a response
    pub fn decide<A: Authorizer + ?Sized>(&self, authz: &A, unauthorized: &str) -> GuardDecision {
        let deny = |reason| GuardDecision::Deny {
            reason,
            redirect_to: self.explicit_redirect().unwrap_or(unauthorized).to_string(),
        };

        if !authz.has_context() {
            return deny(DenyReason::NoContext);
        }

        match self {
            RouteGuard::RequirePermissions { permissions, mode, .. } => {
                let satisfied = match mode {
                    RequireMode::All => authz.has_all_permissions(permissions),
                    RequireMode::Any => authz.has_any_permission(permissions),
                };
                if satisfied {
                    GuardDecision::Allow
                } else {
                    deny(DenyReason::MissingPermissions)
                }
            }
            RouteGuard::RequireRoles { roles, .. } => {
                if authz.has_any_role(roles) {
                    GuardDecision::Allow
                } else {
                    deny(DenyReason::MissingRoles)
                }
            }
        }
    }

    /// Check and turn a denial into a redirect response
    pub fn check<A: Authorizer + ?Sized>(&self, authz: &A, unauthorized: &str) -> GuardResult {
        match self.decide(authz, unauthorized) {
            GuardDecision::Allow => GuardResult::Allow,
            GuardDecision::Deny { redirect_to, .. } => GuardResult::Deny(redirect(&redirect_to)),
        }
    }
}

fn redirect(target: &str) -> Resp {
    let (target, location) = match HeaderValue::from_str(target) {
        Ok(location) => (target, location),
        Err(_) => {
            (DEFAULT_UNAUTHORIZED_PATH, HeaderValue::from_static(DEFAULT_UNAUTHORIZED_PATH))
        }
    };
    let mut response = Response::new(Full::new(Bytes::from(format!(
        r#"<!DOCTYPE html>
<html><head><meta http-equiv="refresh" content="0;url={}"></head>
<body><p>Redirecting...</p></body></html>"#,
        escape_html(target)
    ))));
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(LOCATION, location);
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
    response
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Route guard matcher - associates patterns with guards
#[derive(Debug, Clone)]
pub struct RouteGuardMatcher {
    /// Pattern to match: exact path, `/prefix/*`, or `*` segments
    pub pattern: String,
    /// HTTP methods to apply to (None = all methods)
    pub methods: Option<Vec<Method>>,
    /// Guard to apply
    pub guard: RouteGuard,
}

impl RouteGuardMatcher {
    /// Check if a request matches this guard matcher
    pub fn matches<B>(&self, req: &Request<B>) -> bool {
        self.matches_route(req.method(), req.uri().path())
    }

    pub fn matches_route(&self, method: &Method, path: &str) -> bool {
        if let Some(ref methods) = self.methods {
            if !methods.contains(method) {
                return false;
            }
        }
        self.matches_pattern(path)
    }

    /// Empty segments are ignored, so `/a/b/`, `//a/b` and `/a/b` are the same route
    fn matches_pattern(&self, path: &str) -> bool {
        let mut pattern = self.pattern.split('/').filter(|s| !s.is_empty()).peekable();
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        while let Some(expected) = pattern.next() {
            // A trailing "*" swallows the rest of the path
            if expected == "*" && pattern.peek().is_none() {
                return true;
            }
            match segments.next() {
                Some(actual) if expected == "*" || expected == actual => {}
                _ => return false,
            }
        }
        segments.next().is_none()
    }
}

/// Ordered set of guarded routes; the first denying guard wins
#[derive(Debug, Clone)]
pub struct RouteGuards {
    matchers: Vec<RouteGuardMatcher>,
    unauthorized: String,
    audit: bool,
}

impl Default for RouteGuards {
    fn default() -> Self {
        Self::new(DEFAULT_UNAUTHORIZED_PATH)
    }
}

impl RouteGuards {
    pub fn new(unauthorized: impl Into<String>) -> Self {
        Self { matchers: Vec::new(), unauthorized: unauthorized.into(), audit: true }
    }

    pub fn from_config(config: &RbacConfig) -> Self {
        Self::new(config.unauthorized_redirect.clone()).with_audit(config.audit_enabled)
    }

    /// Log denials at info level
    pub fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_guard(mut self, pattern: impl Into<String>, guard: RouteGuard) -> Self {
        self.matchers.push(RouteGuardMatcher { pattern: pattern.into(), methods: None, guard });
        self
    }

    pub fn with_method_guard(
        mut self,
        pattern: impl Into<String>,
        methods: Vec<Method>,
        guard: RouteGuard,
    ) -> Self {
        self.matchers.push(RouteGuardMatcher {
            pattern: pattern.into(),
            methods: Some(methods),
            guard,
        });
        self
    }

    pub fn unauthorized_path(&self) -> &str {
        &self.unauthorized
    }

    /// Decide for a route without building a response
    pub fn decide<A: Authorizer + ?Sized>(
        &self,
        authz: &A,
        method: &Method,
        path: &str,
    ) -> GuardDecision {
        for matcher in self.matchers.iter().filter(|m| m.matches_route(method, path)) {
            let decision = matcher.guard.decide(authz, &self.unauthorized);
            if let GuardDecision::Deny { reason, redirect_to } = &decision {
                if self.audit {
                    log::info!(
                        "Navigation denied: {} {} ({:?}, account={:?}, project={:?}) -> {}",
                        method,
                        path,
                        reason,
                        authz.current_account_id(),
                        authz.current_project_id(),
                        redirect_to
                    );
                }
                return decision;
            }
        }
        GuardDecision::Allow
    }

    pub fn check<A: Authorizer + ?Sized, B>(&self, authz: &A, req: &Request<B>) -> GuardResult {
        match self.decide(authz, req.method(), req.uri().path()) {
            GuardDecision::Allow => GuardResult::Allow,
            GuardDecision::Deny { redirect_to, .. } => GuardResult::Deny(redirect(&redirect_to)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::{ContextSnapshot, MembershipRecord, PermissionContext, RolePermissionTable};
    use std::sync::Arc;

    fn member(role: &str) -> ContextSnapshot {
        let record = MembershipRecord::new(role, false);
        PermissionContext::resolve("tower", "bob", Some(&record), false, &RolePermissionTable::default())
            .map(Arc::new)
    }

    fn get(path: &str) -> Request<()> {
        Request::builder().uri(path).body(()).unwrap()
    }

    #[test]
    fn test_no_context_redirects_to_unauthorized() {
        let guard = RouteGuard::permissions(vec![Permission::TaskRead], RequireMode::All);
        let none: ContextSnapshot = None;

        assert_eq!(
            guard.decide(&none, "/unauthorized"),
            GuardDecision::Deny {
                reason: DenyReason::NoContext,
                redirect_to: "/unauthorized".to_string()
            }
        );

        // An empty "all" requirement still needs a context
        let empty = RouteGuard::permissions(vec![], RequireMode::All);
        assert!(!empty.check(&none, "/unauthorized").is_allowed());
    }

    #[test]
    fn test_permission_modes() {
        let viewer = member("viewer");
        let all = RouteGuard::permissions(
            vec![Permission::TaskRead, Permission::TaskCreate],
            RequireMode::All,
        );
        let any = RouteGuard::permissions(
            vec![Permission::TaskRead, Permission::TaskCreate],
            RequireMode::Any,
        );
        assert!(matches!(
            all.decide(&viewer, "/unauthorized"),
            GuardDecision::Deny { reason: DenyReason::MissingPermissions, .. }
        ));
        assert_eq!(any.decide(&viewer, "/unauthorized"), GuardDecision::Allow);
    }

    #[test]
    fn test_role_guard_and_explicit_redirect() {
        let guard = RouteGuard::roles(vec![BusinessRole::ProjectManager]).redirect_to("/projects");
        match guard.decide(&member("engineer"), "/unauthorized") {
            GuardDecision::Deny { reason, redirect_to } => {
                assert_eq!(reason, DenyReason::MissingRoles);
                assert_eq!(redirect_to, "/projects");
            }
            GuardDecision::Allow => panic!("engineer is not a project manager"),
        }
        assert!(guard.check(&member("manager"), "/unauthorized").is_allowed());
    }

    #[test]
    fn test_denial_is_a_redirect_response() {
        let guard = RouteGuard::permissions(vec![Permission::MemberManage], RequireMode::All);
        match guard.check(&member("viewer"), "/unauthorized") {
            GuardResult::Deny(response) => {
                assert_eq!(response.status(), StatusCode::FOUND);
                assert_eq!(response.headers().get(LOCATION).unwrap(), "/unauthorized");
            }
            GuardResult::Allow => panic!("viewer cannot manage members"),
        }
    }

    #[test]
    fn test_pattern_matching() {
        let matcher = RouteGuardMatcher {
            pattern: "/projects/*/inspections/*".to_string(),
            methods: None,
            guard: RouteGuard::permissions(vec![Permission::InspectionRead], RequireMode::All),
        };
        assert!(matcher.matches(&get("/projects/42/inspections/7")));
        assert!(matcher.matches(&get("/projects/42/inspections/7/photos")));
        assert!(!matcher.matches(&get("/projects/42/tasks/7")));

        let exact = RouteGuardMatcher { pattern: "/projects/*/settings".to_string(), ..matcher };
        assert!(exact.matches(&get("/projects/42/settings")));
        assert!(!exact.matches(&get("/projects/42/settings/danger")));
    }

    #[test]
    fn test_unnormalized_paths_stay_guarded() {
        let guards = RouteGuards::default().with_guard(
            "/projects/*/settings",
            RouteGuard::permissions(vec![Permission::ProjectUpdate], RequireMode::All),
        );
        let none: ContextSnapshot = None;
        let denied = GuardDecision::Deny {
            reason: DenyReason::NoContext,
            redirect_to: DEFAULT_UNAUTHORIZED_PATH.to_string(),
        };

        for path in [
            "/projects/tower/settings",
            "/projects/tower/settings/",
            "//projects/tower/settings",
            "/projects//tower/settings",
        ] {
            assert_eq!(guards.decide(&none, &Method::GET, path), denied, "{}", path);
        }
        assert_eq!(guards.decide(&none, &Method::GET, "/projects/tower/"), GuardDecision::Allow);
    }

    async fn body_of(response: Resp) -> String {
        use http_body_util::BodyExt;
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_redirect_body_is_escaped() {
        let target = r#"/projects?next=<script>&x="1""#;
        let response = redirect(target);
        assert_eq!(response.headers().get(LOCATION).unwrap(), target);
        let body = body_of(response).await;
        assert!(body.contains("url=/projects?next=&lt;script&gt;&amp;x=&quot;1&quot;"));
        assert!(!body.contains("<script>"));

        // An invalid header value falls back to the unauthorized page everywhere
        let response = redirect("/bad\nlocation");
        assert_eq!(response.headers().get(LOCATION).unwrap(), DEFAULT_UNAUTHORIZED_PATH);
        let body = body_of(response).await;
        assert!(body.contains("url=/unauthorized"));
        assert!(!body.contains("/bad"));
    }

    #[test]
    fn test_route_guards_first_denial_wins() {
        let guards = RouteGuards::new("/no-access")
            .with_guard(
                "/projects/*",
                RouteGuard::permissions(vec![Permission::ProjectRead], RequireMode::All),
            )
            .with_method_guard(
                "/projects/*/tasks",
                vec![Method::POST],
                RouteGuard::permissions(vec![Permission::TaskCreate], RequireMode::All),
            );
        let viewer = member("viewer");

        assert!(guards.check(&viewer, &get("/projects/1/tasks")).is_allowed());

        let post = Request::builder().method(Method::POST).uri("/projects/1/tasks").body(()).unwrap();
        assert!(!guards.check(&viewer, &post).is_allowed());
        assert!(guards.check(&member("supervisor"), &post).is_allowed());

        // Unguarded routes are allowed even without a context
        let none: ContextSnapshot = None;
        assert!(guards.check(&none, &get("/login")).is_allowed());
        assert!(matches!(
            guards.decide(&none, &Method::GET, "/projects/1"),
            GuardDecision::Deny { ref redirect_to, .. } if redirect_to == "/no-access"
        ));
    }
}
