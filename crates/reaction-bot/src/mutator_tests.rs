#[cfg(test)]
mod tests {
    use crate::fake_platform::{Call, FakePlatform, Op};
    use crate::mutator::{apply_role, Direction, MutationOutcome};
    use reaction_types::{PlatformError, ReactionKind};

    const GUILD: u64 = 1;
    const USER: u64 = 42;
    const ROLE: u64 = 55;

    fn member(roles: &[u64]) -> FakePlatform {
        FakePlatform::new().with_member(GUILD, USER, false, roles)
    }

    // ── Direction ─────────────────────────────────────────────────────────────

    #[test]
    fn test_direction_from_reaction_kind() {
        assert_eq!(Direction::from(ReactionKind::Add), Direction::Grant);
        assert_eq!(Direction::from(ReactionKind::Remove), Direction::Revoke);
    }

    // ── grant ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_grant_adds_role() {
        let platform = member(&[]);
        let outcome = apply_role(&platform, GUILD, USER, ROLE, Direction::Grant).await;

        assert_eq!(outcome, MutationOutcome::Granted);
        assert_eq!(
            platform.calls(),
            vec![
                Call::FetchMember {
                    guild_id: GUILD,
                    user_id: USER
                },
                Call::AddRole {
                    guild_id: GUILD,
                    user_id: USER,
                    role_id: ROLE
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_grant_of_held_role_still_succeeds() {
        let platform = member(&[ROLE]);
        let outcome = apply_role(&platform, GUILD, USER, ROLE, Direction::Grant).await;

        assert_eq!(outcome, MutationOutcome::Granted);
        assert_eq!(platform.role_mutations().len(), 1);
    }

    #[tokio::test]
    async fn test_grant_failure_is_reported_not_raised() {
        let err = PlatformError::Forbidden("Missing Permissions".into());
        let platform = member(&[]).failing(Op::AddRole, err.clone());
        let outcome = apply_role(&platform, GUILD, USER, ROLE, Direction::Grant).await;

        assert_eq!(outcome, MutationOutcome::Failed(err));
    }

    // ── revoke ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_revoke_removes_held_role() {
        let platform = member(&[7, ROLE]);
        let outcome = apply_role(&platform, GUILD, USER, ROLE, Direction::Revoke).await;

        assert_eq!(outcome, MutationOutcome::Revoked);
        assert_eq!(
            platform.role_mutations(),
            vec![Call::RemoveRole {
                guild_id: GUILD,
                user_id: USER,
                role_id: ROLE
            }]
        );
    }

    #[tokio::test]
    async fn test_revoke_of_unheld_role_makes_no_mutation() {
        let platform = member(&[7]);
        let outcome = apply_role(&platform, GUILD, USER, ROLE, Direction::Revoke).await;

        assert_eq!(outcome, MutationOutcome::NotHeld);
        assert!(platform.role_mutations().is_empty());
    }

    #[tokio::test]
    async fn test_revoke_failure_is_swallowed() {
        let err = PlatformError::Transport("connection reset".into());
        let platform = member(&[ROLE]).failing(Op::RemoveRole, err.clone());
        let outcome = apply_role(&platform, GUILD, USER, ROLE, Direction::Revoke).await;

        assert_eq!(outcome, MutationOutcome::Failed(err));
    }

    // ── short-circuits ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_bot_member_is_never_mutated() {
        for direction in [Direction::Grant, Direction::Revoke] {
            let platform = FakePlatform::new().with_member(GUILD, USER, true, &[ROLE]);
            let outcome = apply_role(&platform, GUILD, USER, ROLE, direction).await;

            assert_eq!(outcome, MutationOutcome::IgnoredBot);
            assert!(platform.role_mutations().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_member_is_a_no_op() {
        let platform = FakePlatform::new();
        let outcome = apply_role(&platform, GUILD, USER, ROLE, Direction::Grant).await;

        assert!(matches!(
            outcome,
            MutationOutcome::MemberUnavailable(PlatformError::NotFound(_))
        ));
        assert!(platform.role_mutations().is_empty());
    }

    #[tokio::test]
    async fn test_member_fetch_failure_is_a_no_op() {
        let platform = member(&[ROLE]).failing(
            Op::FetchMember,
            PlatformError::RateLimited {
                retry_after_secs: Some(1),
            },
        );
        let outcome = apply_role(&platform, GUILD, USER, ROLE, Direction::Revoke).await;

        assert!(matches!(outcome, MutationOutcome::MemberUnavailable(_)));
        assert!(platform.role_mutations().is_empty());
    }
}
