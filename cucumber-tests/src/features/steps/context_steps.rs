use crate::features::world::PermissionWorld;
use cucumber::{gherkin::Step, given, then, when};
use siteguard_core::rbac::{Authorizer, BusinessRole, LookupKind, Permission};

fn permission(identifier: &str) -> Permission {
    identifier.parse().unwrap_or_else(|e| panic!("{}", e))
}

fn role(identifier: &str) -> BusinessRole {
    identifier.parse().unwrap_or_else(|e| panic!("{}", e))
}

fn permission_list(list: &str) -> Vec<Permission> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(permission).collect()
}

fn role_list(list: &str) -> Vec<BusinessRole> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(role).collect()
}

// ==================== GIVEN ====================

#[given(expr = "project {string} is owned by {string}")]
async fn given_project_owner(world: &mut PermissionWorld, project: String, owner: String) {
    world.directory.add_project(&project, &owner);
}

#[given(expr = "{string} is a(n) {string} member of project {string}")]
async fn given_member(world: &mut PermissionWorld, account: String, tag: String, project: String) {
    world.directory.add_membership(&project, &account, tag.as_str(), false);
}

#[given(expr = "{string} is an external {string} member of project {string}")]
async fn given_external_member(
    world: &mut PermissionWorld,
    account: String,
    tag: String,
    project: String,
) {
    world.directory.add_membership(&project, &account, tag.as_str(), true);
}

#[given(expr = "{string} has the {string} role in organization {string}")]
async fn given_org_role(world: &mut PermissionWorld, account: String, tag: String, org: String) {
    world.directory.add_org_role(&org, &account, tag.as_str());
}

#[given(expr = "the {string} role only grants {string}")]
async fn given_restricted_role(world: &mut PermissionWorld, identifier: String, list: String) {
    world.restrict_role(role(&identifier), permission_list(&list));
}

#[given(expr = "the membership lookup is unavailable")]
async fn given_membership_down(world: &mut PermissionWorld) {
    world.directory.fail(LookupKind::Membership);
}

#[given(expr = "the project owner lookup is unavailable")]
async fn given_owner_down(world: &mut PermissionWorld) {
    world.directory.fail(LookupKind::ProjectOwner);
}

// ==================== WHEN ====================

#[when(expr = "{string} opens project {string}")]
async fn when_open_project(world: &mut PermissionWorld, account: String, project: String) {
    world.open_project(&account, &project).await;
}

#[when(expr = "{string} opens project {string} again")]
async fn when_open_project_again(world: &mut PermissionWorld, account: String, project: String) {
    world.open_project(&account, &project).await;
}

#[when(expr = "the session leaves the project")]
async fn when_leave_project(world: &mut PermissionWorld) {
    world.service().clear_context();
}

// ==================== THEN ====================

#[then(expr = "the session has no permission context")]
async fn then_no_context(world: &mut PermissionWorld) {
    let service = world.service();
    assert!(!service.has_context());
    assert!(service.permissions().is_empty());
    assert!(service.roles().is_empty());
    assert!(!service.is_owner());
    assert_eq!(service.current_project_id(), None);
}

#[then(expr = "the session is the project owner")]
async fn then_owner(world: &mut PermissionWorld) {
    assert!(world.service().is_owner());
}

#[then(expr = "the session is not the project owner")]
async fn then_not_owner(world: &mut PermissionWorld) {
    assert!(!world.service().is_owner());
}

#[then(expr = "the session is external")]
async fn then_external(world: &mut PermissionWorld) {
    assert!(world.service().is_external());
}

#[then(expr = "the session is not external")]
async fn then_not_external(world: &mut PermissionWorld) {
    assert!(!world.service().is_external());
}

#[then(expr = "the session has roles {string}")]
async fn then_roles(world: &mut PermissionWorld, list: String) {
    let mut expected = role_list(&list);
    expected.sort();
    assert_eq!(world.service().roles(), expected);
}

#[then(expr = "the session has every permission")]
async fn then_every_permission(world: &mut PermissionWorld) {
    let service = world.service();
    for p in Permission::ALL {
        assert!(service.has_permission(*p), "expected {} to be granted", p);
    }
}

#[then(expr = "the session can {string}")]
async fn then_can(world: &mut PermissionWorld, identifier: String) {
    assert!(world.service().has_permission(permission(&identifier)));
}

#[then(expr = "the session cannot {string}")]
async fn then_cannot(world: &mut PermissionWorld, identifier: String) {
    assert!(!world.service().has_permission(permission(&identifier)));
}

#[then(expr = "the session holds any of the permissions {string}")]
async fn then_any_permission(world: &mut PermissionWorld, list: String) {
    assert!(world.service().has_any_permission(&permission_list(&list)));
}

#[then(expr = "the session does not hold all of the permissions {string}")]
async fn then_not_all_permissions(world: &mut PermissionWorld, list: String) {
    assert!(!world.service().has_all_permissions(&permission_list(&list)));
}

#[then(expr = "an empty permission list is satisfied in all mode but not in any mode")]
async fn then_empty_permission_lists(world: &mut PermissionWorld) {
    let service = world.service();
    assert!(service.has_all_permissions(&[]));
    assert!(!service.has_any_permission(&[]));
}

#[then(expr = "the session holds the role {string}")]
async fn then_holds_role(world: &mut PermissionWorld, identifier: String) {
    assert!(world.service().has_role(role(&identifier)));
}

#[then(expr = "the session does not hold the role {string}")]
async fn then_lacks_role(world: &mut PermissionWorld, identifier: String) {
    assert!(!world.service().has_role(role(&identifier)));
}

#[then(expr = "the session is scoped to project {string} for {string}")]
async fn then_scoped(world: &mut PermissionWorld, project: String, account: String) {
    let service = world.service();
    assert_eq!(service.current_project_id(), Some(project));
    assert_eq!(service.current_account_id(), Some(account));
}

#[then(expr = "both loads resolved the same authority")]
async fn then_same_authority(world: &mut PermissionWorld) {
    let [first, second] = world.loads.as_slice() else {
        panic!("expected exactly two loads, got {}", world.loads.len());
    };
    let (first, second) = (
        first.as_ref().expect("first load produced no context"),
        second.as_ref().expect("second load produced no context"),
    );
    assert!(first.same_authority(second));
}

#[then(expr = "the load failure is recorded")]
async fn then_failure_recorded(world: &mut PermissionWorld) {
    let failure = world.service().last_failure().expect("no failure recorded");
    assert!(!failure.message.is_empty());
}

#[then(expr = "no load failure is recorded")]
async fn then_no_failure(world: &mut PermissionWorld) {
    assert!(world.service().last_failure().is_none());
}

#[then("the session permissions are exactly")]
async fn then_exact_permissions(world: &mut PermissionWorld, step: &Step) {
    let table = step.table.as_ref().expect("expected a table of permissions");
    let mut expected: Vec<Permission> =
        table.rows.iter().skip(1).map(|row| permission(&row[0])).collect();
    expected.sort();
    assert_eq!(world.service().permissions(), expected);
}
