use crate::features::world::PermissionWorld;
use cucumber::{then, when};
use hyper::Method;
use siteguard_core::http::{DenyReason, GuardDecision, RouteGuard, RouteGuards};
use siteguard_core::rbac::{BusinessRole, Permission, RequireMode};

fn guards() -> RouteGuards {
    RouteGuards::default()
        .with_guard(
            "/projects/*/settings",
            RouteGuard::permissions(vec![Permission::ProjectUpdate], RequireMode::All),
        )
        .with_guard(
            "/projects/*/inspections/*/approve",
            RouteGuard::permissions(
                vec![Permission::InspectionApprove, Permission::AcceptanceApprove],
                RequireMode::Any,
            ),
        )
        .with_guard(
            "/projects/*/members",
            RouteGuard::roles(vec![BusinessRole::ProjectManager]).redirect_to("/projects"),
        )
        .with_method_guard(
            "/projects/*/tasks",
            vec![Method::POST],
            RouteGuard::permissions(vec![Permission::TaskCreate], RequireMode::All),
        )
}

fn reason(name: &str) -> DenyReason {
    match name {
        "no context" => DenyReason::NoContext,
        "missing permissions" => DenyReason::MissingPermissions,
        "missing roles" => DenyReason::MissingRoles,
        other => panic!("unknown deny reason {:?}", other),
    }
}

#[when(expr = "the session navigates to {string}")]
async fn when_navigate(world: &mut PermissionWorld, path: String) {
    let service = world.service();
    world.last_decision = Some(guards().decide(service.as_ref(), &Method::GET, &path));
}

#[when(expr = "the session posts to {string}")]
async fn when_post(world: &mut PermissionWorld, path: String) {
    let service = world.service();
    world.last_decision = Some(guards().decide(service.as_ref(), &Method::POST, &path));
}

#[then(expr = "navigation is allowed")]
async fn then_allowed(world: &mut PermissionWorld) {
    assert_eq!(world.last_decision, Some(GuardDecision::Allow));
}

#[then(expr = "navigation is redirected to {string} because of {string}")]
async fn then_redirected(world: &mut PermissionWorld, target: String, why: String) {
    assert_eq!(
        world.last_decision,
        Some(GuardDecision::Deny { reason: reason(&why), redirect_to: target })
    );
}
