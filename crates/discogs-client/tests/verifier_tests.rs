//! Call-site verifier against real credential managers and the operation table.

use discogs_client::auth::verifier::verify_named;
use discogs_client::auth::{
    ApiOperation, AuthRequirement, KeySecret, KeySecretCredentials, NoCredentials, PersonalToken,
    TokenCredentials, verify_before_call,
};
use discogs_client::operations;

#[test]
fn test_required_operation_needs_credentials() {
    let err = verify_before_call(&operations::GET_IDENTITY, &NoCredentials).unwrap_err();
    assert!(err.is_authorization());
    assert!(err.to_string().contains("Identity.get_identity"), "{err}");

    let authed = KeySecretCredentials::new(KeySecret::new("K", "S").unwrap());
    assert!(verify_before_call(&operations::GET_IDENTITY, &authed).is_ok());
}

#[test]
fn test_optional_and_public_never_fail() {
    let token = TokenCredentials::new(PersonalToken::new("t").unwrap());
    for operation in [operations::GET_PROFILE, operations::GET_FOLDERS, operations::GET_RELEASE] {
        assert!(verify_before_call(&operation, &NoCredentials).is_ok(), "{operation}");
        assert!(verify_before_call(&operation, &token).is_ok(), "{operation}");
    }
}

#[test]
fn test_every_required_operation_is_enforced() {
    let required: Vec<&ApiOperation> = operations::ALL
        .iter()
        .filter(|op| op.requirement == AuthRequirement::Required)
        .collect();
    assert!(!required.is_empty());

    for operation in required {
        let err = verify_before_call(operation, &NoCredentials).unwrap_err();
        assert!(err.to_string().contains(&operation.to_string()));
    }
}

#[test]
fn test_lookup_by_name() {
    assert!(verify_named("Database", "search", &NoCredentials).unwrap_err().is_authorization());
    assert!(verify_named("Database", "get_release", &NoCredentials).is_ok());
}

#[test]
fn test_unknown_operation_is_public() {
    assert!(verify_named("Marketplace", "get_listing", &NoCredentials).is_ok());
    assert!(verify_named("", "", &NoCredentials).is_ok());
}

#[test]
fn test_declared_requirements() {
    insta::assert_snapshot!(
        operations::ALL
            .iter()
            .map(|op| format!("{op} {:?}", op.requirement))
            .collect::<Vec<_>>()
            .join("\n"),
        @r"
    Identity.get_identity Required
    Database.get_release None
    Database.get_artist None
    Database.search Required
    User.get_profile Optional
    Collection.get_folders Optional
    "
    );
}
