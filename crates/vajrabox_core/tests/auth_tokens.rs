use std::collections::HashMap;
use std::time::Duration;
use vajrabox_core::{
    obtain_token_pair, AuthError, CatalogConfig, CredentialVerifier, TokenIssuer, TokenSettings,
    TokenType, UserIdentity,
};

struct StaticUsers {
    users: HashMap<String, (String, UserIdentity)>,
}

impl StaticUsers {
    fn new() -> Self {
        let mut users = HashMap::new();
        users.insert(
            "meera".to_string(),
            (
                "correct horse".to_string(),
                UserIdentity {
                    user_id: 1,
                    username: "meera".to_string(),
                    is_staff: true,
                },
            ),
        );
        users.insert(
            "ravi".to_string(),
            (
                "battery staple".to_string(),
                UserIdentity {
                    user_id: 2,
                    username: "ravi".to_string(),
                    is_staff: false,
                },
            ),
        );
        Self { users }
    }
}

impl CredentialVerifier for StaticUsers {
    fn verify(&self, username: &str, password: &str) -> Option<UserIdentity> {
        self.users
            .get(username)
            .filter(|(expected, _)| expected == password)
            .map(|(_, identity)| identity.clone())
    }
}

fn issuer() -> TokenIssuer {
    TokenIssuer::new(TokenSettings::new("integration-secret")).unwrap()
}

#[test]
fn valid_credentials_yield_pair_with_custom_claims() {
    let issuer = issuer();
    let pair = obtain_token_pair(&StaticUsers::new(), &issuer, "meera", "correct horse").unwrap();

    let access = issuer.decode(&pair.access, TokenType::Access).unwrap();
    assert_eq!(access.user_id, 1);
    assert_eq!(access.username, "meera");
    assert!(access.is_staff);

    let refresh = issuer.decode(&pair.refresh, TokenType::Refresh).unwrap();
    assert_eq!(refresh.username, "meera");
    assert_eq!(refresh.exp - refresh.iat, 24 * 60 * 60);
    assert_ne!(access.jti, refresh.jti);
}

#[test]
fn non_staff_flag_is_carried_through() {
    let issuer = issuer();
    let pair = obtain_token_pair(&StaticUsers::new(), &issuer, "ravi", "battery staple").unwrap();
    let access = issuer.decode(&pair.access, TokenType::Access).unwrap();
    assert!(!access.is_staff);
}

#[test]
fn wrong_password_is_invalid_credentials() {
    let err = obtain_token_pair(&StaticUsers::new(), &issuer(), "meera", "guess").unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = obtain_token_pair(&StaticUsers::new(), &issuer(), "nobody", "guess").unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[test]
fn refresh_token_exchanges_for_new_access_token() {
    let issuer = issuer();
    let pair = obtain_token_pair(&StaticUsers::new(), &issuer, "meera", "correct horse").unwrap();

    let access = issuer.refresh_access(&pair.refresh).unwrap();
    let claims = issuer.decode(&access, TokenType::Access).unwrap();
    assert_eq!(claims.username, "meera");
    assert!(claims.is_staff);

    let err = issuer.refresh_access(&pair.access).unwrap_err();
    assert!(matches!(err, AuthError::WrongTokenType { .. }));
}

#[test]
fn tampered_token_is_rejected() {
    let issuer = issuer();
    let pair = obtain_token_pair(&StaticUsers::new(), &issuer, "ravi", "battery staple").unwrap();
    let mut tampered = pair.access.clone();
    tampered.push('x');

    let err = issuer.decode(&tampered, TokenType::Access).unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)));
}

#[test]
fn configured_lifetimes_are_applied() {
    let config = CatalogConfig::from_lookup(|key| match key {
        "VAJRABOX_TOKEN_SECRET" => Some("configured-secret".to_string()),
        "VAJRABOX_ACCESS_TTL_SECS" => Some("90".to_string()),
        _ => None,
    })
    .unwrap();
    let settings = config.token_settings().unwrap();
    assert_eq!(settings.access_ttl, Duration::from_secs(90));

    let issuer = TokenIssuer::new(settings).unwrap();
    let pair = obtain_token_pair(&StaticUsers::new(), &issuer, "meera", "correct horse").unwrap();
    let claims = issuer.decode(&pair.access, TokenType::Access).unwrap();
    assert_eq!(claims.exp - claims.iat, 90);
}
