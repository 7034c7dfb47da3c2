//! Structural directives: show a view only when the context allows it
//!
//! A directive owns a primary view, an optional fallback view and a
//! requirement. It subscribes to the [`PermissionService`] change channel and
//! re-evaluates on every notification, so a rendering decision never outlives
//! the context it was made for.
//!
//! ```rust,ignore
//! let mut delete_button = StructuralDirective::new(
//!     &service,
//!     Requirement::Permission(Permission::TaskDelete),
//!     DeleteButton::new(),
//! );
//! while let Some(rendering) = delete_button.changed().await {
//!     redraw(delete_button.view());
//! }
//! ```

use crate::rbac::{
    Authorizer, BusinessRole, ContextSnapshot, Permission, PermissionService, RequireMode,
};
use tokio::sync::watch;

/// What a directive requires from the context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Permission(Permission),
    Permissions { permissions: Vec<Permission>, mode: RequireMode },
    /// Any of the listed roles
    Roles(Vec<BusinessRole>),
}

impl Requirement {
    pub fn is_satisfied_by<A: Authorizer + ?Sized>(&self, authz: &A) -> bool {
        match self {
            Requirement::Permission(permission) => authz.has_permission(*permission),
            Requirement::Permissions { permissions, mode: RequireMode::All } => {
                authz.has_context() && authz.has_all_permissions(permissions)
            }
            Requirement::Permissions { permissions, mode: RequireMode::Any } => {
                authz.has_any_permission(permissions)
            }
            Requirement::Roles(roles) => authz.has_any_role(roles),
        }
    }
}

/// Which template a directive currently mounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    Primary,
    Fallback,
    Nothing,
}

/// Conditionally mounted view bound to the permission context
pub struct StructuralDirective<T> {
    requirement: Requirement,
    primary: T,
    fallback: Option<T>,
    receiver: watch::Receiver<ContextSnapshot>,
    rendering: Rendering,
}

impl<T> StructuralDirective<T> {
    pub fn new(service: &PermissionService, requirement: Requirement, primary: T) -> Self {
        Self::from_receiver(service.subscribe(), requirement, primary)
    }

    /// Bind to an existing change receiver
    pub fn from_receiver(
        receiver: watch::Receiver<ContextSnapshot>,
        requirement: Requirement,
        primary: T,
    ) -> Self {
        let mut directive =
            Self { requirement, primary, fallback: None, receiver, rendering: Rendering::Nothing };
        directive.evaluate();
        directive
    }

    /// View mounted when the requirement is not met
    pub fn with_fallback(mut self, fallback: T) -> Self {
        self.fallback = Some(fallback);
        self.rendering = self.decide(self.satisfied_now());
        self
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn rendering(&self) -> Rendering {
        self.rendering
    }

    /// The currently mounted view, if any
    pub fn view(&self) -> Option<&T> {
        match self.rendering {
            Rendering::Primary => Some(&self.primary),
            Rendering::Fallback => self.fallback.as_ref(),
            Rendering::Nothing => None,
        }
    }

    /// Re-evaluate if a change is pending; returns whether the rendering flipped
    pub fn refresh(&mut self) -> bool {
        match self.receiver.has_changed() {
            Ok(true) => {
                let before = self.rendering;
                self.evaluate();
                before != self.rendering
            }
            // Service dropped or nothing new
            _ => false,
        }
    }

    /// Wait for the next context change and re-evaluate
    ///
    /// Returns `None` once the service is gone.
    pub async fn changed(&mut self) -> Option<Rendering> {
        self.receiver.changed().await.ok()?;
        self.evaluate();
        Some(self.rendering)
    }

    fn evaluate(&mut self) {
        let satisfied = self.requirement.is_satisfied_by(&*self.receiver.borrow_and_update());
        self.rendering = self.decide(satisfied);
    }

    fn satisfied_now(&self) -> bool {
        self.requirement.is_satisfied_by(&*self.receiver.borrow())
    }

    fn decide(&self, satisfied: bool) -> Rendering {
        match (satisfied, self.fallback.is_some()) {
            (true, _) => Rendering::Primary,
            (false, true) => Rendering::Fallback,
            (false, false) => Rendering::Nothing,
        }
    }
}
