//! Credential model invariants: validation, redaction and snapshot round-trips.

use proptest::prelude::*;

use discogs_client::auth::{CredentialInfo, KeySecret, OAuthToken, PersonalToken, REDACTED};

fn credential_strategy() -> impl Strategy<Value = CredentialInfo> {
    prop_oneof![
        Just(CredentialInfo::None),
        ("[a-z]{1,16}", "[A-Za-z0-9]{8,32}").prop_map(|(key, secret)| {
            CredentialInfo::key_secret(key, format!("sec-{secret}")).unwrap()
        }),
        "[A-Za-z0-9]{8,40}".prop_map(|value| CredentialInfo::token(format!("tok-{value}")).unwrap()),
        ("[A-Za-z0-9]{8,32}", "[A-Za-z0-9]{8,32}").prop_map(|(token, secret)| {
            CredentialInfo::oauth(format!("tok-{token}"), format!("sec-{secret}")).unwrap()
        }),
    ]
}

fn secrets(credential: &CredentialInfo) -> Vec<&str> {
    match credential {
        CredentialInfo::None => vec![],
        CredentialInfo::KeySecret(ks) => vec![ks.secret()],
        CredentialInfo::Token(token) => vec![token.value()],
        CredentialInfo::OAuth(token) => vec![token.token(), token.secret()],
    }
}

proptest! {
    #[test]
    fn snapshot_round_trip_preserves_secrets(credential in credential_strategy()) {
        let snapshot = credential.to_snapshot().unwrap();
        let restored = CredentialInfo::from_snapshot(&snapshot).unwrap();
        prop_assert_eq!(&restored, &credential);
        for secret in secrets(&credential) {
            prop_assert!(snapshot.contains(secret));
        }
    }

    #[test]
    fn printing_never_shows_secrets(credential in credential_strategy()) {
        let debug = format!("{credential:?}");
        let display = credential.to_string();
        for secret in secrets(&credential) {
            prop_assert!(!debug.contains(secret), "debug leaked: {}", debug);
            prop_assert!(!display.contains(secret), "display leaked: {}", display);
        }
    }

    #[test]
    fn blank_material_is_rejected(blank in "[ \t\n]{0,8}", valid in "[a-z]{1,8}") {
        prop_assert!(KeySecret::new(blank.clone(), valid.clone()).unwrap_err().is_validation());
        prop_assert!(KeySecret::new(valid.clone(), blank.clone()).unwrap_err().is_validation());
        prop_assert!(PersonalToken::new(blank.clone()).unwrap_err().is_validation());
        prop_assert!(OAuthToken::new(valid.clone(), blank.clone()).unwrap_err().is_validation());
        prop_assert!(OAuthToken::new(blank, valid).unwrap_err().is_validation());
    }
}

// =============================================================================
// Snapshot format
// =============================================================================

#[test]
fn test_key_secret_snapshot_format() {
    let credential = CredentialInfo::key_secret("K", "S").unwrap();
    insta::assert_snapshot!(credential.to_snapshot().unwrap(), @r#"{"type":"key_secret","key":"K","secret":"S"}"#);
}

#[test]
fn test_oauth_snapshot_format() {
    let credential = CredentialInfo::oauth("AT", "AS").unwrap();
    insta::assert_snapshot!(credential.to_snapshot().unwrap(), @r#"{"type":"oauth","token":"AT","secret":"AS"}"#);
}

#[test]
fn test_display_format() {
    let credential = CredentialInfo::key_secret("K", "S").unwrap();
    insta::assert_snapshot!(credential.to_string(), @"key_secret(key=K, secret=<redacted>)");
}

#[test]
fn test_unknown_scheme_rejected() {
    let err = CredentialInfo::from_snapshot(r#"{"type":"oauth2","token":"t"}"#).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_debug_uses_placeholder() {
    let token = PersonalToken::new("abc").unwrap();
    assert_eq!(format!("{token:?}"), format!("PersonalToken {{ value: {REDACTED:?} }}"));
}
