use axum::http::{HeaderMap, HeaderValue};

use crate::evaluations::identity::PrincipalClaims;

#[test]
fn preferred_username_wins_over_other_claims() {
    let claims = PrincipalClaims::new()
        .with_claim("upn", "upn@example.com")
        .with_claim("email", "email@example.com")
        .with_claim("preferred_username", "preferred@example.com");

    assert_eq!(claims.email(), Some("preferred@example.com"));
}

#[test]
fn blank_claims_fall_through_to_the_next_candidate() {
    let claims = PrincipalClaims::new()
        .with_claim("preferred_username", "   ")
        .with_claim("email", "email@example.com");

    assert_eq!(claims.email(), Some("email@example.com"));
}

#[test]
fn upn_is_the_last_resort() {
    let claims = PrincipalClaims::new().with_claim("upn", "upn@example.com");
    assert_eq!(claims.email(), Some("upn@example.com"));
}

#[test]
fn no_recognized_claim_means_no_email() {
    let claims = PrincipalClaims::new().with_claim("name", "Pat Reyes");
    assert_eq!(claims.email(), None);
}

#[test]
fn claims_parse_from_prefixed_headers() {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-auth-preferred-username",
        HeaderValue::from_static("pat.reyes@example.com"),
    );
    headers.insert("x-auth-name", HeaderValue::from_static("Pat Reyes"));
    headers.insert("content-type", HeaderValue::from_static("application/json"));

    let claims = PrincipalClaims::from_headers(&headers);

    assert_eq!(claims.get("preferred_username"), Some("pat.reyes@example.com"));
    assert_eq!(claims.get("name"), Some("Pat Reyes"));
    // Unprefixed headers never become claims.
    assert_eq!(claims.get("content_type"), None);
    assert_eq!(claims.email(), Some("pat.reyes@example.com"));
}
