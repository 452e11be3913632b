use tracing::warn;

use crate::circles::repo::CircleForUser;
use crate::error::ApiError;

/// A caller's standing toward one circle, derived from their membership
/// listing. The distinction between the failure arms exists for logging;
/// callers outside this module only ever see a single Unauthorized.
#[derive(Debug, Clone)]
pub enum AdminStanding {
    NotAMember,
    MemberNotAdmin,
    Admin(CircleForUser),
}

#[derive(Debug, Clone)]
pub enum MemberStanding {
    NotAMember,
    Pending,
    Member(CircleForUser),
}

/// The strongest row for the circle decides. A listing may carry more than
/// one row per circle (legacy data from re-invites); a stray pending
/// duplicate must never mask an admin row.
pub fn admin_standing(memberships: &[CircleForUser], circle_id: i64) -> AdminStanding {
    if let Some(admin) = memberships.iter().find(|m| m.id == circle_id && m.is_admin) {
        return AdminStanding::Admin(admin.clone());
    }
    if memberships.iter().any(|m| m.id == circle_id) {
        AdminStanding::MemberNotAdmin
    } else {
        AdminStanding::NotAMember
    }
}

pub fn member_standing(memberships: &[CircleForUser], circle_id: i64) -> MemberStanding {
    if let Some(member) = memberships
        .iter()
        .find(|m| m.id == circle_id && m.joined_on.is_some())
    {
        return MemberStanding::Member(member.clone());
    }
    if memberships.iter().any(|m| m.id == circle_id) {
        MemberStanding::Pending
    } else {
        MemberStanding::NotAMember
    }
}

/// Removal rule for member-created rows (polls, expense bills): creators
/// stay behind the member gate, everyone else must hold admin standing.
pub fn removal_needs_admin(created_by: i64, actor_id: i64) -> bool {
    created_by != actor_id
}

/// Admin gate over a membership listing. No memberships at all reads as
/// NotFound (the listing contract); every other failure collapses to one
/// Unauthorized so callers cannot tell which circles exist.
pub fn admin_gate(
    memberships: &[CircleForUser],
    circle_id: i64,
) -> Result<CircleForUser, ApiError> {
    if memberships.is_empty() {
        return Err(ApiError::not_found("no circles for user"));
    }
    match admin_standing(memberships, circle_id) {
        AdminStanding::Admin(circle) => Ok(circle),
        AdminStanding::NotAMember => {
            warn!(circle = circle_id, "admin gate: not a member");
            Err(ApiError::unauthorized("not allowed for this circle"))
        }
        AdminStanding::MemberNotAdmin => {
            warn!(circle = circle_id, "admin gate: member without admin");
            Err(ApiError::unauthorized("not allowed for this circle"))
        }
    }
}

/// Member gate for the plugin-domain data operations: the membership must
/// be confirmed, not just invited.
pub fn member_gate(
    memberships: &[CircleForUser],
    circle_id: i64,
) -> Result<CircleForUser, ApiError> {
    if memberships.is_empty() {
        return Err(ApiError::not_found("no circles for user"));
    }
    match member_standing(memberships, circle_id) {
        MemberStanding::Member(circle) => Ok(circle),
        MemberStanding::NotAMember => {
            warn!(circle = circle_id, "member gate: not a member");
            Err(ApiError::unauthorized("not allowed for this circle"))
        }
        MemberStanding::Pending => {
            warn!(circle = circle_id, "member gate: invitation not confirmed");
            Err(ApiError::unauthorized("not allowed for this circle"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn membership(id: i64, is_owner: bool, is_admin: bool, confirmed: bool) -> CircleForUser {
        CircleForUser {
            id,
            name: format!("circle-{id}"),
            image_path: None,
            is_owner,
            is_admin,
            joined_on: confirmed.then(OffsetDateTime::now_utc),
        }
    }

    #[test]
    fn admin_gate_passes_for_admin() {
        let memberships = vec![membership(1, true, true, true), membership(2, false, false, true)];
        let circle = admin_gate(&memberships, 1).expect("admin passes");
        assert_eq!(circle.id, 1);
    }

    #[test]
    fn admin_gate_collapses_both_failure_arms_to_unauthorized() {
        let memberships = vec![membership(2, false, false, true)];

        // not a member of circle 1
        let not_member = admin_gate(&memberships, 1).unwrap_err();
        // member of circle 2 but not admin
        let not_admin = admin_gate(&memberships, 2).unwrap_err();

        for err in [&not_member, &not_admin] {
            assert!(matches!(err, ApiError::Unauthorized(_)));
            assert_eq!(err.status().as_u16(), 401);
        }
        // and the externally visible message does not distinguish them
        assert_eq!(not_member.to_string(), not_admin.to_string());
    }

    #[test]
    fn gates_report_not_found_for_empty_listing() {
        let err = admin_gate(&[], 1).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let err = member_gate(&[], 1).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn internal_standing_distinguishes_the_arms() {
        let memberships = vec![membership(2, false, false, true)];
        assert!(matches!(
            admin_standing(&memberships, 1),
            AdminStanding::NotAMember
        ));
        assert!(matches!(
            admin_standing(&memberships, 2),
            AdminStanding::MemberNotAdmin
        ));
    }

    #[test]
    fn member_gate_requires_confirmed_membership() {
        let memberships = vec![membership(3, false, false, false)];
        let err = member_gate(&memberships, 3).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let memberships = vec![membership(3, false, false, true)];
        assert!(member_gate(&memberships, 3).is_ok());
    }

    #[test]
    fn duplicate_pending_row_does_not_mask_the_admin_row() {
        // pending duplicate first, the real admin row second
        let rows = vec![membership(5, false, false, false), membership(5, true, true, true)];
        let circle = admin_gate(&rows, 5).expect("admin row wins");
        assert!(circle.is_admin);

        // and in the opposite listing order
        let reversed = vec![membership(5, true, true, true), membership(5, false, false, false)];
        assert!(admin_gate(&reversed, 5).is_ok());
    }

    #[test]
    fn duplicate_pending_row_does_not_mask_the_confirmed_row() {
        let rows = vec![membership(5, false, false, false), membership(5, false, false, true)];
        let circle = member_gate(&rows, 5).expect("confirmed row wins");
        assert!(circle.joined_on.is_some());

        let reversed = vec![membership(5, false, false, true), membership(5, false, false, false)];
        assert!(member_gate(&reversed, 5).is_ok());
    }

    #[test]
    fn removal_rule_keeps_creators_behind_the_member_gate() {
        assert!(!removal_needs_admin(7, 7));
        assert!(removal_needs_admin(7, 8));
    }
}
