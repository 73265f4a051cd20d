use axum::http::HeaderMap;

/// Claim names tried in order when extracting the principal's email-like
/// identifier. Azure AD populates `preferred_username` for most tenants;
/// `email` and `upn` cover the rest.
pub const EMAIL_CLAIM_ORDER: [&str; 3] = ["preferred_username", "email", "upn"];

const HEADER_PREFIX: &str = "x-auth-";

/// Claims of the authenticated principal, as forwarded by the auth proxy.
///
/// Lookup is by claim name; email resolution walks the fixed
/// [`EMAIL_CLAIM_ORDER`] fallback list rather than scanning whatever claims
/// happen to be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalClaims {
    claims: Vec<(String, String)>,
}

impl PrincipalClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claim(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.claims
            .push((name.to_ascii_lowercase(), value.to_string()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|(claim, _)| claim.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Resolve the principal's email-like identifier, if any claim in the
    /// fallback list carries a non-blank value.
    pub fn email(&self) -> Option<&str> {
        EMAIL_CLAIM_ORDER
            .iter()
            .filter_map(|claim| self.get(claim))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// Read claims from `x-auth-*` request headers (auth proxy pattern);
    /// e.g. `x-auth-preferred-username` becomes the `preferred_username`
    /// claim. Non-UTF-8 header values are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut claims = Self::new();
        for (name, value) in headers {
            let name = name.as_str();
            if let Some(claim) = name.strip_prefix(HEADER_PREFIX) {
                if let Ok(value) = value.to_str() {
                    claims.insert(&claim.replace('-', "_"), value);
                }
            }
        }
        claims
    }
}
