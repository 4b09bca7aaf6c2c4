mod common;

use common::{seed_admin, setup_db, ADMIN_PASSWORD, ADMIN_USERNAME};
use epicerie::auth::provision_admin;
use epicerie::entity::admin_session;
use epicerie::{Error, SessionAuthority};
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn correct_credentials_issue_a_usable_session() {
    let db = setup_db().await;
    let profile = seed_admin(&db).await;
    let sessions = SessionAuthority::new(db.clone());

    let session = sessions.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();

    assert_eq!(session.admin, profile);
    assert!(!session.session_token.is_empty());
    assert!(session.expires_at.timestamp() > chrono::Utc::now().timestamp());

    let admin = sessions.validate(&session.session_token).await.unwrap();
    assert_eq!(admin.as_uuid(), profile.id);
}

#[tokio::test]
async fn wrong_password_or_unknown_user_creates_nothing() {
    let db = setup_db().await;
    seed_admin(&db).await;
    let sessions = SessionAuthority::new(db.clone());

    assert!(matches!(
        sessions.issue(ADMIN_USERNAME, "wrong").await,
        Err(Error::InvalidCredentials)
    ));
    assert!(matches!(
        sessions.issue("nobody", ADMIN_PASSWORD).await,
        Err(Error::InvalidCredentials)
    ));

    let count = admin_session::Entity::find().count(&db).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn expired_and_unknown_tokens_fail_identically() {
    let db = setup_db().await;
    seed_admin(&db).await;
    let expired = SessionAuthority::new(db.clone())
        .with_ttl(time::Duration::seconds(-1))
        .issue(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .unwrap();

    let sessions = SessionAuthority::new(db.clone());
    let from_expired = sessions
        .validate(&expired.session_token)
        .await
        .unwrap_err();
    let from_unknown = sessions.validate("never-issued").await.unwrap_err();

    assert!(matches!(from_expired, Error::InvalidSession));
    assert!(matches!(from_unknown, Error::InvalidSession));
    assert_eq!(from_expired.to_string(), from_unknown.to_string());
    assert_eq!(from_expired.status(), from_unknown.status());
}

#[tokio::test]
async fn session_expires_after_its_ttl() {
    let db = setup_db().await;
    seed_admin(&db).await;
    let sessions = SessionAuthority::new(db.clone()).with_ttl(time::Duration::milliseconds(200));

    let session = sessions.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
    assert!(sessions.validate(&session.session_token).await.is_ok());

    tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    assert!(matches!(
        sessions.validate(&session.session_token).await,
        Err(Error::InvalidSession)
    ));
}

#[tokio::test]
async fn revoke_is_idempotent() {
    let db = setup_db().await;
    seed_admin(&db).await;
    let sessions = SessionAuthority::new(db.clone());
    let session = sessions.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();

    sessions.revoke(&session.session_token).await.unwrap();
    sessions.revoke(&session.session_token).await.unwrap();
    sessions.revoke("never-issued").await.unwrap();

    assert!(matches!(
        sessions.validate(&session.session_token).await,
        Err(Error::InvalidSession)
    ));
}

#[tokio::test]
async fn admin_may_hold_concurrent_sessions() {
    let db = setup_db().await;
    seed_admin(&db).await;
    let sessions = SessionAuthority::new(db.clone());

    let first = sessions.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
    let second = sessions.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
    assert_ne!(first.session_token, second.session_token);

    sessions.revoke(&first.session_token).await.unwrap();
    assert!(sessions.validate(&first.session_token).await.is_err());
    assert!(sessions.validate(&second.session_token).await.is_ok());
}

#[tokio::test]
async fn purge_removes_only_expired_sessions() {
    let db = setup_db().await;
    seed_admin(&db).await;
    let live = SessionAuthority::new(db.clone());
    let dead = SessionAuthority::new(db.clone()).with_ttl(time::Duration::seconds(-60));

    let kept = live.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
    dead.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
    dead.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();

    assert_eq!(live.purge_expired().await.unwrap(), 2);
    assert_eq!(admin_session::Entity::find().count(&db).await.unwrap(), 1);
    assert!(live.validate(&kept.session_token).await.is_ok());
}

#[tokio::test]
async fn provisioning_is_idempotent_per_username() {
    let db = setup_db().await;
    let first = seed_admin(&db).await;
    let again = provision_admin(&db, ADMIN_USERNAME, "other@epicerie.local", "other password")
        .await
        .unwrap();

    assert_eq!(first, again);

    // The original password still works.
    let sessions = SessionAuthority::new(db.clone());
    assert!(sessions.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await.is_ok());
}

#[tokio::test]
async fn provisioning_rejects_blank_credentials() {
    let db = setup_db().await;
    assert!(matches!(
        provision_admin(&db, " ", "x@epicerie.local", "pw").await,
        Err(Error::Validation(_))
    ));
}

#[tokio::test]
async fn overflowing_ttl_fails_without_creating_a_session() {
    let db = setup_db().await;
    seed_admin(&db).await;
    let sessions = SessionAuthority::new(db.clone()).with_ttl(time::Duration::MAX);

    let result = sessions.issue(ADMIN_USERNAME, ADMIN_PASSWORD).await;

    assert!(matches!(result, Err(Error::Internal(_))));
    assert_eq!(admin_session::Entity::find().count(&db).await.unwrap(), 0);
}
