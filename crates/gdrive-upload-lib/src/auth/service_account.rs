use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{TokenSource, DRIVE_FILE_SCOPE};
use crate::errors::{Result, UploadActionError};
use crate::http_client::HttpClient;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens closer than this to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 60;

// ---------------------------------------------------------------------------
// Data models
// ---------------------------------------------------------------------------

/// The fields of a service-account key file this action needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Decode a base64-encoded key JSON.
    ///
    /// ASCII whitespace is stripped before decoding so wrapped base64 output
    /// is accepted.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let compact: String = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| UploadActionError::CredentialFormat(format!("Invalid base64: {e}")))?;

        let json = String::from_utf8(bytes).map_err(|e| {
            UploadActionError::CredentialFormat(format!("Decoded credentials are not UTF-8: {e}"))
        })?;

        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(json).map_err(|e| {
            UploadActionError::CredentialFormat(format!("Invalid service account JSON: {e}"))
        })?;

        if key.client_email.trim().is_empty() {
            return Err(UploadActionError::CredentialFormat(
                "Service account JSON has an empty client_email".into(),
            ));
        }
        if key.private_key.trim().is_empty() {
            return Err(UploadActionError::CredentialFormat(
                "Service account JSON has an empty private_key".into(),
            ));
        }
        Ok(key)
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// JWT claim set for the bearer grant.
#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

// ---------------------------------------------------------------------------
// ServiceAccountAuthenticator
// ---------------------------------------------------------------------------

/// Signed-JWT credential restricted to [`DRIVE_FILE_SCOPE`].
pub struct ServiceAccountAuthenticator {
    http: HttpClient,
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    encoding_key: EncodingKey,
    token: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountAuthenticator {
    /// Build an authenticator from the base64 credential input.
    ///
    /// Fails with `CredentialFormat` before any network activity.
    pub fn from_base64(http: HttpClient, encoded: &str) -> Result<Self> {
        Self::new(http, ServiceAccountKey::from_base64(encoded)?)
    }

    pub fn new(http: HttpClient, key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            UploadActionError::CredentialFormat(format!("Invalid private_key: {e}"))
        })?;

        tracing::debug!(client_email = %key.client_email, "Loaded service account key");

        Ok(Self {
            http,
            token_uri: key.token_uri().to_string(),
            client_email: key.client_email,
            key_id: key.private_key_id,
            encoding_key,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Sign the bearer-grant assertion issued at `now` (unix seconds).
    fn sign_assertion(&self, now: i64) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: DRIVE_FILE_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| UploadActionError::Auth(format!("Failed to sign assertion: {e}")))
    }

    /// Exchange a fresh assertion for an access token.
    async fn fetch_token(&self) -> Result<CachedToken> {
        let now = chrono::Utc::now().timestamp();
        let assertion = self.sign_assertion(now)?;

        let resp = self
            .http
            .client()
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(UploadActionError::Http)?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadActionError::Auth(format!(
                "Token exchange failed ({status}): {body}"
            )));
        }

        let token: TokenResponse = resp.json().await.map_err(UploadActionError::Http)?;
        let lifetime = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        tracing::debug!(expires_in = lifetime, "Obtained Drive access token");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + lifetime,
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountAuthenticator {
    async fn access_token(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        if let Some(token) = self.token.read().await.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.access_token.clone());
            }
        }

        let mut guard = self.token.write().await;
        if let Some(token) = guard.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let access_token = fresh.access_token.clone();
        *guard = Some(fresh);
        Ok(access_token)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_PRIVATE_KEY: &str = include_str!("../../testdata/service_account_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../../testdata/service_account_key.pub.pem");

    fn key_json(token_uri: Option<&str>) -> String {
        let mut value = serde_json::json!({
            "type": "service_account",
            "project_id": "test-project",
            "private_key_id": "kid-123",
            "private_key": TEST_PRIVATE_KEY,
            "client_email": "uploader@test-project.iam.gserviceaccount.com",
        });
        if let Some(uri) = token_uri {
            value["token_uri"] = serde_json::Value::String(uri.to_string());
        }
        value.to_string()
    }

    fn encode(json: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(json)
    }

    fn make_authenticator(token_uri: Option<&str>) -> ServiceAccountAuthenticator {
        let http = HttpClient::from_defaults().unwrap();
        ServiceAccountAuthenticator::from_base64(http, &encode(&key_json(token_uri))).unwrap()
    }

    #[test]
    fn test_decode_valid_key() {
        let key = ServiceAccountKey::from_base64(&encode(&key_json(None))).unwrap();
        assert_eq!(
            key.client_email,
            "uploader@test-project.iam.gserviceaccount.com"
        );
        assert_eq!(key.private_key_id.as_deref(), Some("kid-123"));
        assert_eq!(key.token_uri(), DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_decode_accepts_wrapped_base64() {
        let encoded = encode(&key_json(None));
        let wrapped: String = encoded
            .as_bytes()
            .chunks(76)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(ServiceAccountKey::from_base64(&wrapped).is_ok());
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        match ServiceAccountKey::from_base64("not base64 at all!!") {
            Err(UploadActionError::CredentialFormat(msg)) => assert!(msg.contains("base64")),
            other => panic!("Expected CredentialFormat error, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let result = ServiceAccountKey::from_base64(&encode("hello world"));
        assert!(matches!(result, Err(UploadActionError::CredentialFormat(_))));
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        let no_key = encode(r#"{"client_email": "a@b.com"}"#);
        assert!(matches!(
            ServiceAccountKey::from_base64(&no_key),
            Err(UploadActionError::CredentialFormat(_))
        ));

        let no_email = encode(r#"{"private_key": "pem"}"#);
        assert!(matches!(
            ServiceAccountKey::from_base64(&no_email),
            Err(UploadActionError::CredentialFormat(_))
        ));

        let empty_email = encode(r#"{"client_email": " ", "private_key": "pem"}"#);
        assert!(matches!(
            ServiceAccountKey::from_base64(&empty_email),
            Err(UploadActionError::CredentialFormat(_))
        ));
    }

    #[test]
    fn test_invalid_private_key_is_credential_error() {
        let http = HttpClient::from_defaults().unwrap();
        let json = r#"{"client_email": "a@b.com", "private_key": "not a pem"}"#;
        let result = ServiceAccountAuthenticator::from_base64(http, &encode(json));
        assert!(matches!(result, Err(UploadActionError::CredentialFormat(_))));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let key = ServiceAccountKey::from_json(&key_json(None)).unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("PRIVATE KEY"));
    }

    #[test]
    fn test_assertion_claims() {
        let auth = make_authenticator(None);
        let now = chrono::Utc::now().timestamp();
        let jwt = auth.sign_assertion(now).unwrap();

        let header = jsonwebtoken::decode_header(&jwt).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("kid-123"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[DEFAULT_TOKEN_URI]);
        let decoding_key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
        let data = jsonwebtoken::decode::<AssertionClaims>(&jwt, &decoding_key, &validation)
            .unwrap();

        assert_eq!(data.claims.iss, auth.client_email());
        assert_eq!(data.claims.scope, DRIVE_FILE_SCOPE);
        assert_eq!(data.claims.iat, now);
        assert_eq!(data.claims.exp, now + ASSERTION_LIFETIME_SECS);
    }

    #[test]
    fn test_scope_is_not_full_drive() {
        assert!(DRIVE_FILE_SCOPE.ends_with("/auth/drive.file"));
    }

    #[tokio::test]
    async fn test_token_is_fetched_once_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
            .and(body_string_contains("assertion="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.test",
                "expires_in": 3599,
                "token_type": "Bearer",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = make_authenticator(Some(&format!("{}/token", server.uri())));
        assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
        assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.short",
                "expires_in": 30,
            })))
            .expect(2)
            .mount(&server)
            .await;

        let auth = make_authenticator(Some(&format!("{}/token", server.uri())));
        // A 30 s lifetime is inside the refresh margin, so nothing is reused.
        auth.access_token().await.unwrap();
        auth.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn test_token_endpoint_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let auth = make_authenticator(Some(&format!("{}/token", server.uri())));
        match auth.access_token().await {
            Err(UploadActionError::Auth(msg)) => {
                assert!(msg.contains("400"));
                assert!(msg.contains("invalid_grant"));
            }
            other => panic!("Expected Auth error, got: {:?}", other),
        }
    }
}
