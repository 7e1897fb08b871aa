//! Session lifecycle behavior: issuance, expiry enforcement, renewal,
//! revocation, and the per-request validation contract, exercised against
//! the in-memory store with a fixed clock.

mod common;

use assert_matches::assert_matches;
use common::{authority_in_mode, dev_authority, test_account, DEV_TTL_MS};
use gatehouse_auth::config::DeployMode;
use gatehouse_auth::store::{NewSession, SessionStore};
use gatehouse_auth::token::SESSION_TOKEN_LEN;
use gatehouse_auth::{DenyReason, Verdict};
use gatehouse_core::error::AuthError;
use gatehouse_core::id::SessionId;

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn issued_session_validates_until_just_before_expiry() {
    let (_store, clock, authority) = dev_authority();
    let account = test_account(1);

    let issued = authority.issue(account, "mobile::acme::one", "ios").await.unwrap();
    assert_eq!(issued.session.token.len(), SESSION_TOKEN_LEN);
    assert_eq!(issued.session.expires_at, common::T0 + DEV_TTL_MS);
    assert_eq!(issued.cookie.value, issued.session.token);

    clock.advance(DEV_TTL_MS - 1);
    let session = authority.validate(&issued.session.token).await.unwrap();
    assert_eq!(session.account.public_id, account.public_id);
    assert_eq!(session.account.id, 1);
    assert_eq!(session.device, "mobile::acme::one");
    assert_eq!(session.os, "ios");
}

#[tokio::test]
async fn production_mode_issues_four_week_sessions_with_secure_cookies() {
    let (_store, _clock, authority) = authority_in_mode(DeployMode::Production);

    let issued = authority.issue(test_account(1), "d", "o").await.unwrap();
    assert_eq!(
        issued.session.expires_at,
        common::T0 + 28 * 24 * 60 * 60 * 1000
    );
    assert!(issued.cookie.secure);
    assert!(issued.cookie.http_only);
}

#[tokio::test]
async fn token_collision_on_create_is_surfaced_not_swallowed() {
    let (store, _clock, authority) = dev_authority();
    let issued = authority.issue(test_account(1), "d", "o").await.unwrap();

    // Force a second insert with the same token directly against the store.
    let duplicate = NewSession {
        public_id: SessionId::generate(),
        token: issued.session.token.clone(),
        account: test_account(2),
        device: "d".into(),
        os: "o".into(),
        expires_at: issued.session.expires_at,
    };
    assert_matches!(
        store.create(&duplicate).await,
        Err(AuthError::Duplicate("session_token"))
    );
    // The original session is untouched.
    let kept = authority.validate(&issued.session.token).await.unwrap();
    assert_eq!(kept.account.id, 1);
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expiry_is_enforced_at_the_exact_boundary() {
    let (_store, clock, authority) = dev_authority();
    let issued = authority.issue(test_account(1), "d", "o").await.unwrap();

    // expires_at == now counts as expired.
    clock.advance(DEV_TTL_MS);
    assert_matches!(
        authority.validate(&issued.session.token).await,
        Err(AuthError::Expired)
    );
}

#[tokio::test]
async fn expired_session_is_cleaned_up_opportunistically() {
    let (store, clock, authority) = dev_authority();
    let issued = authority.issue(test_account(1), "d", "o").await.unwrap();

    clock.advance(DEV_TTL_MS + 1);
    assert_matches!(
        authority.validate(&issued.session.token).await,
        Err(AuthError::Expired)
    );

    // The failed validation deleted the row; a direct lookup now misses.
    assert!(store
        .get_with_account(&issued.session.token)
        .await
        .unwrap()
        .is_none());
    // And a second validation reports NotFound, not Expired.
    assert_matches!(
        authority.validate(&issued.session.token).await,
        Err(AuthError::NotFound)
    );
}

#[tokio::test]
async fn sweep_deletes_every_session_past_expiry() {
    let (store, clock, authority) = dev_authority();
    let early = authority.issue(test_account(1), "d", "o").await.unwrap();
    clock.advance(1000);
    let late = authority.issue(test_account(2), "d", "o").await.unwrap();

    // Advance past the first expiry but not the second.
    clock.advance(DEV_TTL_MS - 1000);
    let swept = authority.sweep_expired().await.unwrap();
    assert_eq!(swept, 1);
    assert_eq!(store.len(), 1);
    assert!(authority.validate(&late.session.token).await.is_ok());
    assert_matches!(
        authority.validate(&early.session.token).await,
        Err(AuthError::NotFound)
    );
}

// ---------------------------------------------------------------------------
// Renewal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn renew_extends_expiry_in_place() {
    let (_store, clock, authority) = dev_authority();
    let issued = authority.issue(test_account(1), "d", "o").await.unwrap();

    clock.advance(DEV_TTL_MS / 2);
    let new_expiry = authority.renew(&issued.session.token).await.unwrap();
    assert_eq!(new_expiry, common::T0 + DEV_TTL_MS / 2 + DEV_TTL_MS);

    // The session now survives past its original expiry.
    clock.advance(DEV_TTL_MS - 1);
    assert!(authority.validate(&issued.session.token).await.is_ok());
}

#[tokio::test]
async fn renew_cannot_resurrect_an_expired_session() {
    let (store, clock, authority) = dev_authority();
    let issued = authority.issue(test_account(1), "d", "o").await.unwrap();

    clock.advance(DEV_TTL_MS + 1);
    assert_matches!(
        authority.renew(&issued.session.token).await,
        Err(AuthError::Expired)
    );

    // The dead session was deleted, not extended; it never validates again.
    assert!(store
        .get_with_account(&issued.session.token)
        .await
        .unwrap()
        .is_none());
    assert_matches!(
        authority.validate(&issued.session.token).await,
        Err(AuthError::NotFound)
    );
}

#[tokio::test]
async fn renewing_an_absent_token_is_not_found() {
    let (_store, _clock, authority) = dev_authority();
    let ghost = "0".repeat(SESSION_TOKEN_LEN);
    assert_matches!(authority.renew(&ghost).await, Err(AuthError::NotFound));
    assert_matches!(
        authority.renew("garbage").await,
        Err(AuthError::Malformed(_))
    );
}

// ---------------------------------------------------------------------------
// Revocation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn revoking_one_session_leaves_siblings_valid() {
    let (_store, _clock, authority) = dev_authority();
    let account = test_account(1);
    let first = authority.issue(account, "laptop", "linux").await.unwrap();
    let second = authority.issue(account, "phone", "android").await.unwrap();

    authority.revoke(&first.session.token).await.unwrap();

    assert_matches!(
        authority.validate(&first.session.token).await,
        Err(AuthError::NotFound)
    );
    assert!(authority.validate(&second.session.token).await.is_ok());
}

#[tokio::test]
async fn revoke_is_idempotent() {
    let (_store, _clock, authority) = dev_authority();
    let issued = authority.issue(test_account(1), "d", "o").await.unwrap();

    authority.revoke(&issued.session.token).await.unwrap();
    // Second delete of the same token is a no-op, not an error.
    authority.revoke(&issued.session.token).await.unwrap();
}

#[tokio::test]
async fn revoke_all_empties_exactly_one_account() {
    let (store, _clock, authority) = dev_authority();
    let victim = test_account(1);
    let bystander = test_account(2);
    for device in ["a", "b", "c"] {
        authority.issue(victim, device, "os").await.unwrap();
    }
    let kept = authority.issue(bystander, "d", "os").await.unwrap();

    authority.revoke_all(victim.id).await.unwrap();

    assert!(authority.sessions_for_account(victim.id).await.unwrap().is_empty());
    assert_eq!(store.len(), 1);
    assert!(authority.validate(&kept.session.token).await.is_ok());
}

#[tokio::test]
async fn revoke_all_on_an_account_with_no_sessions_is_a_noop() {
    let (_store, _clock, authority) = dev_authority();
    authority.revoke_all(99).await.unwrap();
    assert!(authority.sessions_for_account(99).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Validation contract
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authenticate_distinguishes_every_rejection_internally() {
    let (_store, clock, authority) = dev_authority();
    let issued = authority.issue(test_account(1), "d", "o").await.unwrap();

    assert_matches!(
        authority.authenticate(None).await.unwrap(),
        Verdict::Denied(DenyReason::Absent)
    );
    assert_matches!(
        authority.authenticate(Some("")).await.unwrap(),
        Verdict::Denied(DenyReason::Absent)
    );
    assert_matches!(
        authority.authenticate(Some("not-a-token")).await.unwrap(),
        Verdict::Denied(DenyReason::Malformed)
    );
    let unknown = "a".repeat(SESSION_TOKEN_LEN);
    assert_matches!(
        authority.authenticate(Some(&unknown)).await.unwrap(),
        Verdict::Denied(DenyReason::NotFound)
    );

    let verdict = authority
        .authenticate(Some(&issued.session.token))
        .await
        .unwrap();
    assert!(verdict.is_allowed());

    clock.advance(DEV_TTL_MS + 1);
    assert_matches!(
        authority
            .authenticate(Some(&issued.session.token))
            .await
            .unwrap(),
        Verdict::Denied(DenyReason::Expired)
    );
}

#[tokio::test]
async fn malformed_tokens_never_reach_the_store() {
    let (store, _clock, authority) = dev_authority();
    authority.issue(test_account(1), "d", "o").await.unwrap();

    assert_matches!(
        authority.validate("short").await,
        Err(AuthError::Malformed(_))
    );
    // Nothing was deleted or disturbed by the malformed lookup.
    assert_eq!(store.len(), 1);
}
