//! Navigation protection for the HTTP layer
//!
//! - [`route_guard`] - permission and role guards attached to route patterns

pub mod route_guard;

pub use route_guard::{
    DenyReason, GuardDecision, GuardResult, RouteGuard, RouteGuardMatcher, RouteGuards,
    DEFAULT_UNAUTHORIZED_PATH,
};
