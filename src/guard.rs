//! Route protection, evaluated on every navigation.

use crate::{api::user::Role, route::Route};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    Render,

    /// No session. `from` is the route to return to after logging in.
    RedirectToLogin { from: Route },

    /// Session exists but the role may not open the route.
    RedirectToDashboard,
}

/// Decides whether `requested` may render for a principal with `role`
/// (`None` when nobody is logged in).
///
/// An empty `required` slice admits any authenticated principal.
pub fn check(
    role: Option<Role>,
    required: &[Role],
    requested: Route,
) -> Decision {
    match role {
        None => Decision::RedirectToLogin { from: requested },
        Some(role) if !required.is_empty() && !required.contains(&role) => {
            Decision::RedirectToDashboard
        }
        Some(_) => Decision::Render,
    }
}

/// [`check`] with the roles the capability table grants for `route`.
/// Public routes always render.
pub fn check_route(role: Option<Role>, route: Route) -> Decision {
    if route.is_public() {
        return Decision::Render;
    }
    check(role, &route.required_roles(), route)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every subset of roles, including the empty one.
    fn role_sets() -> Vec<Vec<Role>> {
        (0..1u32 << Role::ALL.len())
            .map(|mask: u32| {
                Role::ALL
                    .into_iter()
                    .enumerate()
                    .filter(|&(i, _)| mask & (1 << i) != 0)
                    .map(|(_, r)| r)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn redirects_to_login_iff_unauthenticated() {
        for required in role_sets() {
            assert_eq!(
                check(None, &required, Route::Users),
                Decision::RedirectToLogin { from: Route::Users },
            );
            for role in Role::ALL {
                assert_ne!(
                    check(Some(role), &required, Route::Users),
                    Decision::RedirectToLogin { from: Route::Users },
                );
            }
        }
    }

    #[test]
    fn redirects_to_dashboard_iff_role_not_required() {
        for required in role_sets() {
            for role in Role::ALL {
                let expected =
                    if required.is_empty() || required.contains(&role) {
                        Decision::Render
                    } else {
                        Decision::RedirectToDashboard
                    };
                assert_eq!(
                    check(Some(role), &required, Route::AllTickets),
                    expected,
                    "role {role} with required {required:?}",
                );
            }
        }
    }

    #[test]
    fn public_routes_always_render() {
        assert_eq!(check_route(None, Route::Login), Decision::Render);
        assert_eq!(check_route(None, Route::Register), Decision::Render);
        assert_eq!(
            check_route(Some(Role::Admin), Route::Login),
            Decision::Render
        );
    }

    #[test]
    fn applies_capability_table() {
        assert_eq!(
            check_route(Some(Role::Citizen), Route::Departments),
            Decision::RedirectToDashboard,
        );
        assert_eq!(
            check_route(Some(Role::Collector), Route::Departments),
            Decision::Render,
        );
        assert_eq!(
            check_route(Some(Role::Staff), Route::Dashboard),
            Decision::Render,
        );
        assert_eq!(
            check_route(None, Route::MyTickets),
            Decision::RedirectToLogin {
                from: Route::MyTickets
            },
        );
    }
}
