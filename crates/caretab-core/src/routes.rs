//! Role-based routing: the home route per role and the guard that
//! navigation consumers evaluate before rendering a protected view.
//!
//! Gating here is advisory UI behavior. The gateway enforces authority;
//! a guard only decides what to render or where to send the user.

use crate::auth::SessionState;
use crate::models::Role;

/// Entry points the shell can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    ManageHospitals,
    AdminDashboard,
    DoctorDashboard,
    NurseDashboard,
    PharmacyDashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::ManageHospitals => "/super/hospitals",
            Route::AdminDashboard => "/admin/dashboard",
            Route::DoctorDashboard => "/doctor/dashboard",
            Route::NurseDashboard => "/nurse/dashboard",
            Route::PharmacyDashboard => "/pharmacy/dashboard",
        }
    }
}

/// Where "/" lands for a given role. Exhaustive over `Role`, so adding a
/// role without a home route fails to compile.
pub fn home_route(role: Option<Role>) -> Route {
    match role {
        Some(Role::SuperAdmin) => Route::ManageHospitals,
        Some(Role::Admin) => Route::AdminDashboard,
        Some(Role::Doctor) => Route::DoctorDashboard,
        Some(Role::Nurse) => Route::NurseDashboard,
        Some(Role::MedicalShop) => Route::PharmacyDashboard,
        None => Route::Login,
    }
}

/// What a guard tells its consumer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Identity resolution still running; defer the rendering decision.
    Wait,
    /// Render the protected view.
    Allow,
    /// Navigate elsewhere instead of rendering.
    Redirect(Route),
}

/// Guard for a protected view, configured with the roles it admits.
pub struct RouteGuard {
    allowed: Vec<Role>,
}

impl RouteGuard {
    pub fn new(allowed: impl Into<Vec<Role>>) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }

    /// Evaluate against the current session state. Unauthenticated users
    /// go to login; authenticated users with the wrong role go to their
    /// own home route, never an error page.
    pub fn evaluate(&self, state: &SessionState) -> GuardOutcome {
        match state {
            SessionState::Initializing => GuardOutcome::Wait,
            SessionState::Unauthenticated => GuardOutcome::Redirect(Route::Login),
            SessionState::Authenticated(user) => {
                if self.allowed.contains(&user.role) {
                    GuardOutcome::Allow
                } else {
                    GuardOutcome::Redirect(home_route(Some(user.role)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn user_with(role: Role) -> User {
        User {
            id: 1,
            email: "someone@x.com".into(),
            full_name: "Someone".into(),
            is_active: true,
            role,
            hospital_id: Some(3),
        }
    }

    #[test]
    fn every_role_has_a_home() {
        assert_eq!(home_route(Some(Role::SuperAdmin)), Route::ManageHospitals);
        assert_eq!(home_route(Some(Role::Admin)), Route::AdminDashboard);
        assert_eq!(home_route(Some(Role::Doctor)), Route::DoctorDashboard);
        assert_eq!(home_route(Some(Role::Nurse)), Route::NurseDashboard);
        assert_eq!(home_route(Some(Role::MedicalShop)), Route::PharmacyDashboard);
        assert_eq!(home_route(None), Route::Login);
    }

    #[test]
    fn guard_defers_while_initializing() {
        let guard = RouteGuard::new([Role::Doctor]);
        assert_eq!(guard.evaluate(&SessionState::Initializing), GuardOutcome::Wait);
    }

    #[test]
    fn guard_redirects_unauthenticated_to_login() {
        let guard = RouteGuard::new([Role::Doctor]);
        assert_eq!(
            guard.evaluate(&SessionState::Unauthenticated),
            GuardOutcome::Redirect(Route::Login)
        );
    }

    #[test]
    fn guard_checks_role_membership() {
        let guard = RouteGuard::new([Role::Doctor]);
        let nurse = SessionState::Authenticated(user_with(Role::Nurse));
        assert_eq!(
            guard.evaluate(&nurse),
            GuardOutcome::Redirect(Route::NurseDashboard)
        );

        let guard = RouteGuard::new([Role::Nurse]);
        assert_eq!(guard.evaluate(&nurse), GuardOutcome::Allow);
    }

    #[test]
    fn route_paths_match_the_shell() {
        assert_eq!(Route::Login.path(), "/login");
        assert_eq!(Route::ManageHospitals.path(), "/super/hospitals");
        assert_eq!(Route::PharmacyDashboard.path(), "/pharmacy/dashboard");
    }
}
