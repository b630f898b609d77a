use super::*;
use crate::auth::JwtConfig;
use shared::models::StaffRole;

const PASSWORD: &str = "s3cret-pass";

fn manager_with(policy: SessionPolicy, max_failures: u32) -> (SessionManager, Storage) {
    let storage = Storage::open_in_memory().unwrap();
    let jwt = Arc::new(JwtService::with_config(JwtConfig::for_tests(
        "session-tests-secret-0123456789abcdef",
    )));
    let limiter = LoginRateLimiter::new(max_failures, Duration::from_secs(900));
    (
        SessionManager::new(storage.clone(), jwt, limiter, policy),
        storage,
    )
}

fn manager() -> (SessionManager, Storage) {
    manager_with(
        SessionPolicy {
            login_fixed_delay: Duration::ZERO,
            ..SessionPolicy::default()
        },
        10,
    )
}

fn add_staff(storage: &Storage, id: i64, username: &str, role: StaffRole) -> StaffAccount {
    let account = StaffAccount {
        id,
        username: username.to_string(),
        display_name: username.to_uppercase(),
        password_hash: StaffAccount::hash_password(PASSWORD).unwrap(),
        role,
        is_active: true,
        email: Some(format!("{username}@cafe.test")),
        email_verified: false,
        created_at: 0,
    };
    storage.insert_staff(&account).unwrap();
    account
}

fn login_req(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_login_then_authenticate() {
    let (sessions, storage) = manager();
    add_staff(&storage, 1, "chef", StaffRole::Chef);

    let login = sessions.login("ip", &login_req("chef", PASSWORD)).await.unwrap();
    assert_eq!(login.staff.role, StaffRole::Chef);
    assert_eq!(login.expires_in, 15 * 60);
    assert_ne!(login.access_token, login.refresh_token);

    let staff = sessions.authenticate(&login.access_token).unwrap();
    assert_eq!(staff.id, 1);
    assert_eq!(staff.role, StaffRole::Chef);

    // only the hash is persisted
    let session = storage.get_session(&staff.session_id).unwrap().unwrap();
    assert_eq!(session.refresh_hash, hash_refresh_token(&login.refresh_token));
}

#[tokio::test]
async fn test_unknown_user_and_bad_password_look_identical() {
    let (sessions, storage) = manager();
    add_staff(&storage, 1, "ana", StaffRole::Staff);

    let unknown = sessions
        .login("ip", &login_req("nobody", PASSWORD))
        .await
        .unwrap_err();
    let wrong = sessions
        .login("ip", &login_req("ana", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(unknown, SessionError::InvalidCredentials));
    assert!(matches!(wrong, SessionError::InvalidCredentials));
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn test_inactive_account_disclosed_only_after_password() {
    let (sessions, storage) = manager();
    let mut account = add_staff(&storage, 1, "ana", StaffRole::Staff);
    account.is_active = false;
    storage.update_staff(&account).unwrap();

    let err = sessions
        .login("ip", &login_req("ana", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidCredentials));

    let err = sessions
        .login("ip", &login_req("ana", PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::AccountInactive));
}

#[tokio::test]
async fn test_email_policy() {
    let (lenient, storage) = manager();
    add_staff(&storage, 1, "ana", StaffRole::Staff);
    assert!(lenient.login("ip", &login_req("ana", PASSWORD)).await.is_ok());

    let (strict, storage) = manager_with(
        SessionPolicy {
            login_fixed_delay: Duration::ZERO,
            require_verified_email: true,
            ..SessionPolicy::default()
        },
        10,
    );
    let mut account = add_staff(&storage, 1, "ana", StaffRole::Staff);
    let err = strict
        .login("ip", &login_req("ana", PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::EmailUnverified));

    account.email_verified = true;
    storage.update_staff(&account).unwrap();
    assert!(strict.login("ip", &login_req("ana", PASSWORD)).await.is_ok());
}

#[tokio::test]
async fn test_rate_limit_counts_failures_per_address() {
    let (sessions, storage) = manager_with(
        SessionPolicy {
            login_fixed_delay: Duration::ZERO,
            ..SessionPolicy::default()
        },
        3,
    );
    add_staff(&storage, 1, "ana", StaffRole::Staff);

    // successes do not consume the budget
    for _ in 0..5 {
        sessions
            .login("10.0.0.1", &login_req("ana", PASSWORD))
            .await
            .unwrap();
    }
    for _ in 0..3 {
        let _ = sessions.login("10.0.0.1", &login_req("ana", "bad")).await;
    }

    let err = sessions
        .login("10.0.0.1", &login_req("ana", PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::TooManyAttempts));

    // a different address is unaffected
    assert!(
        sessions
            .login("10.0.0.2", &login_req("ana", PASSWORD))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_concurrent_failures_cannot_exceed_budget() {
    let (sessions, storage) = manager_with(
        SessionPolicy {
            login_fixed_delay: Duration::from_millis(50),
            ..SessionPolicy::default()
        },
        3,
    );
    add_staff(&storage, 1, "ana", StaffRole::Staff);

    // every attempt is in flight before the first delay elapses
    let bad = login_req("ana", "bad");
    let results =
        futures::future::join_all((0..20).map(|_| sessions.login("10.0.0.1", &bad))).await;
    let evaluated = results
        .iter()
        .filter(|r| matches!(r, Err(SessionError::InvalidCredentials)))
        .count();
    let limited = results
        .iter()
        .filter(|r| matches!(r, Err(SessionError::TooManyAttempts)))
        .count();
    assert_eq!(evaluated, 3);
    assert_eq!(limited, 17);

    let err = sessions
        .login("10.0.0.1", &login_req("ana", PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::TooManyAttempts));
}

#[tokio::test]
async fn test_concurrent_successes_return_their_slots() {
    let (sessions, storage) = manager_with(
        SessionPolicy {
            login_fixed_delay: Duration::from_millis(20),
            ..SessionPolicy::default()
        },
        3,
    );
    add_staff(&storage, 1, "ana", StaffRole::Staff);

    let good = login_req("ana", PASSWORD);
    let results =
        futures::future::join_all((0..3).map(|_| sessions.login("10.0.0.1", &good))).await;
    assert!(results.iter().all(Result::is_ok));

    // the full failure budget is still available
    for _ in 0..3 {
        let err = sessions
            .login("10.0.0.1", &login_req("ana", "bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
    }
}

#[tokio::test]
async fn test_role_is_resolved_from_record() {
    let (sessions, storage) = manager();
    let mut account = add_staff(&storage, 1, "ana", StaffRole::Admin);
    let login = sessions.login("ip", &login_req("ana", PASSWORD)).await.unwrap();

    account.role = StaffRole::Staff;
    storage.update_staff(&account).unwrap();
    assert_eq!(
        sessions.authenticate(&login.access_token).unwrap().role,
        StaffRole::Staff
    );

    account.is_active = false;
    storage.update_staff(&account).unwrap();
    assert!(matches!(
        sessions.authenticate(&login.access_token),
        Err(SessionError::AccountInactive)
    ));
}

#[tokio::test]
async fn test_refresh_mints_new_access_token() {
    let (sessions, storage) = manager();
    add_staff(&storage, 1, "ana", StaffRole::Staff);
    let login = sessions.login("ip", &login_req("ana", PASSWORD)).await.unwrap();

    let refreshed = sessions.refresh(&login.refresh_token).unwrap();
    let staff = sessions.authenticate(&refreshed.access_token).unwrap();
    assert_eq!(staff.id, 1);

    // no rotation: the same refresh token keeps working
    assert!(sessions.refresh(&login.refresh_token).is_ok());
    assert!(matches!(
        sessions.refresh("not-a-token"),
        Err(SessionError::RefreshInvalid)
    ));
}

#[tokio::test]
async fn test_refresh_expired_session() {
    let (sessions, storage) = manager();
    add_staff(&storage, 1, "ana", StaffRole::Staff);
    storage
        .insert_session(&SessionRecord {
            id: "old".to_string(),
            staff_id: 1,
            refresh_hash: hash_refresh_token("stale-token"),
            issued_at: 0,
            refresh_expires_at: 1,
            access_expires_at: 0,
            revoked_at: None,
        })
        .unwrap();

    assert!(matches!(
        sessions.refresh("stale-token"),
        Err(SessionError::RefreshExpired)
    ));
    assert_eq!(sessions.purge_expired().unwrap(), 1);
    assert!(matches!(
        sessions.refresh("stale-token"),
        Err(SessionError::RefreshInvalid)
    ));
}

#[tokio::test]
async fn test_refresh_for_deactivated_account_revokes_sessions() {
    let (sessions, storage) = manager();
    let mut account = add_staff(&storage, 1, "ana", StaffRole::Staff);
    let first = sessions.login("ip", &login_req("ana", PASSWORD)).await.unwrap();
    let second = sessions.login("ip", &login_req("ana", PASSWORD)).await.unwrap();

    account.is_active = false;
    storage.update_staff(&account).unwrap();
    assert!(matches!(
        sessions.refresh(&first.refresh_token),
        Err(SessionError::RefreshInvalid)
    ));

    // reactivation does not resurrect revoked sessions
    account.is_active = true;
    storage.update_staff(&account).unwrap();
    assert!(matches!(
        sessions.refresh(&second.refresh_token),
        Err(SessionError::RefreshInvalid)
    ));
    assert!(matches!(
        sessions.authenticate(&second.access_token),
        Err(SessionError::TokenInvalid(_))
    ));
}

#[tokio::test]
async fn test_logout_revokes_access_and_refresh() {
    let (sessions, storage) = manager();
    add_staff(&storage, 1, "ana", StaffRole::Staff);
    let login = sessions.login("ip", &login_req("ana", PASSWORD)).await.unwrap();

    sessions.logout(&login.refresh_token).unwrap();
    sessions.logout(&login.refresh_token).unwrap();
    sessions.logout("unknown").unwrap();

    assert!(matches!(
        sessions.authenticate(&login.access_token),
        Err(SessionError::TokenInvalid(_))
    ));
    assert!(matches!(
        sessions.refresh(&login.refresh_token),
        Err(SessionError::RefreshInvalid)
    ));
}

#[tokio::test]
async fn test_expired_and_forged_access_tokens() {
    let (sessions, storage) = manager();
    add_staff(&storage, 1, "ana", StaffRole::Staff);
    let login = sessions.login("ip", &login_req("ana", PASSWORD)).await.unwrap();
    let session_id = sessions.authenticate(&login.access_token).unwrap().session_id;

    let past = chrono::Utc::now().timestamp() - 5;
    let expired = sessions
        .jwt()
        .generate_with_expiry(1, &session_id, past)
        .unwrap();
    assert!(matches!(
        sessions.authenticate(&expired),
        Err(SessionError::TokenExpired)
    ));

    let mut tampered = login.access_token.clone();
    tampered.push('x');
    assert!(matches!(
        sessions.authenticate(&tampered),
        Err(SessionError::TokenInvalid(_))
    ));

    // a token whose staff record disappeared
    let (orphan, _) = sessions
        .jwt()
        .generate_access_token(99, "ghost", &session_id)
        .unwrap();
    assert!(matches!(
        sessions.authenticate(&orphan),
        Err(SessionError::TokenInvalid(_))
    ));
}
