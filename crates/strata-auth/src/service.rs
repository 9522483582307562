//! Session issuer — token pair issuance, rotation, and revocation.

use chrono::{Duration, Utc};
use strata_core::error::{StrataError, StrataResult};
use strata_core::models::refresh_token::{CreateRefreshToken, RefreshTokenStatus};
use strata_core::models::user::{User, UserStatus};
use strata_core::permissions::dedup_case_insensitive;
use strata_core::repository::{
    MembershipRepository, RefreshTokenRepository, RoleRepository, UserRepository,
};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, ClaimSet, SigningKeys};

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username_or_email: String,
    pub password: String,
    /// Tenant to sign into; `None` selects the user's default
    /// membership.
    pub tenant_id: Option<Uuid>,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    pub user_id: Uuid,
    /// Tenant the pair was issued for.
    pub tenant_id: Uuid,
    pub tokens: TokenPair,
}

/// An access/refresh token pair.
#[derive(Debug)]
pub struct TokenPair {
    /// Signed JWT access token.
    pub access_token: String,
    /// Raw opaque refresh token (return to client, not stored).
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Session issuer.
///
/// Generic over repository implementations so that the auth layer has
/// no dependency on the database crate. Signing keys are parsed once
/// at construction — corrupt key material is a startup failure, never
/// a per-request one.
pub struct SessionIssuer<U, R, M, F>
where
    U: UserRepository,
    R: RoleRepository,
    M: MembershipRepository,
    F: RefreshTokenRepository,
{
    user_repo: U,
    role_repo: R,
    membership_repo: M,
    token_repo: F,
    keys: SigningKeys,
    config: AuthConfig,
}

impl<U, R, M, F> SessionIssuer<U, R, M, F>
where
    U: UserRepository,
    R: RoleRepository,
    M: MembershipRepository,
    F: RefreshTokenRepository,
{
    pub fn new(
        user_repo: U,
        role_repo: R,
        membership_repo: M,
        token_repo: F,
        config: AuthConfig,
    ) -> StrataResult<Self> {
        let keys = SigningKeys::from_config(&config)?;
        Ok(Self {
            user_repo,
            role_repo,
            membership_repo,
            token_repo,
            keys,
            config,
        })
    }

    /// Authenticate with username/email + password, then issue a pair
    /// for the requested (or default) tenant.
    pub async fn login(&self, input: LoginInput) -> StrataResult<LoginOutput> {
        // Look up user — try username first, then email. Both misses
        // collapse into InvalidCredentials so the response does not
        // reveal which identifiers exist.
        let user = match self.user_repo.get_by_username(&input.username_or_email).await {
            Ok(u) => u,
            Err(StrataError::NotFound { .. }) => self
                .user_repo
                .get_by_email(&input.username_or_email)
                .await
                .map_err(|_| AuthError::InvalidCredentials)?,
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        check_user_status(&user)?;

        let tenant_id = match input.tenant_id {
            Some(id) => id,
            None => self.default_tenant_for(user.id).await?,
        };

        let tokens = self.issue_pair(user.id, tenant_id).await?;
        Ok(LoginOutput {
            user_id: user.id,
            tenant_id,
            tokens,
        })
    }

    /// Issue a fresh token pair for a user within a tenant.
    ///
    /// Requires an active, non-deleted user and an active membership.
    /// Persisting the refresh token atomically revokes any prior
    /// active one for the user — at most one active refresh token per
    /// user exists at any time.
    pub async fn issue_pair(&self, user_id: Uuid, tenant_id: Uuid) -> StrataResult<TokenPair> {
        let user = self.user_repo.get_by_id(user_id).await.map_err(|e| match e {
            StrataError::NotFound { .. } => AuthError::InvalidCredentials.into(),
            other => other,
        })?;
        check_user_status(&user)?;

        let claims = self.build_claims(user_id, tenant_id).await?;

        let raw_refresh = token::generate_refresh_token();
        let token_hash = token::hash_refresh_token(&raw_refresh);
        let expires_at =
            Utc::now() + Duration::seconds(self.config.refresh_token_lifetime_secs as i64);

        self.token_repo
            .create(CreateRefreshToken {
                user_id,
                token_hash,
                expires_at,
            })
            .await?;

        let access_token = token::issue_access_token(claims, &self.keys, &self.config)?;

        Ok(TokenPair {
            access_token,
            refresh_token: raw_refresh,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Rotate a refresh token: consume the old one and issue a new
    /// pair. Each refresh token is single-use.
    ///
    /// Presenting a token that was already used or revoked is treated
    /// as a compromise signal: every active token for that user is
    /// revoked and the caller must re-authenticate. All validation
    /// happens before the single consume-and-replace transaction, so
    /// a failed rotation leaves no state behind.
    pub async fn rotate(&self, raw_refresh: &str, tenant_id: Uuid) -> StrataResult<TokenPair> {
        let old_hash = token::hash_refresh_token(raw_refresh);

        let record = self
            .token_repo
            .get_by_hash(&old_hash)
            .await?
            .ok_or_else(|| AuthError::TokenInvalid("refresh token not found".into()))?;

        match record.status {
            RefreshTokenStatus::Active => {}
            RefreshTokenStatus::Used | RefreshTokenStatus::Revoked => {
                self.token_repo.revoke_all_for_user(record.user_id).await?;
                return Err(StrataError::RefreshReused {
                    user_id: record.user_id.to_string(),
                });
            }
        }

        if record.expires_at <= Utc::now() {
            return Err(AuthError::TokenInvalid("refresh token expired".into()).into());
        }

        // Verify user and membership are still valid before mutating.
        let user = self.user_repo.get_by_id(record.user_id).await.map_err(|e| match e {
            StrataError::NotFound { .. } => AuthError::InvalidCredentials.into(),
            other => other,
        })?;
        check_user_status(&user)?;

        let claims = self.build_claims(record.user_id, tenant_id).await?;

        let raw_replacement = token::generate_refresh_token();
        let replacement_hash = token::hash_refresh_token(&raw_replacement);
        let expires_at =
            Utc::now() + Duration::seconds(self.config.refresh_token_lifetime_secs as i64);

        // Single-transaction CAS: only one of any concurrent rotations
        // of the same token can win.
        self.token_repo
            .consume_and_replace(
                &old_hash,
                CreateRefreshToken {
                    user_id: record.user_id,
                    token_hash: replacement_hash,
                    expires_at,
                },
            )
            .await?;

        let access_token = token::issue_access_token(claims, &self.keys, &self.config)?;

        Ok(TokenPair {
            access_token,
            refresh_token: raw_replacement,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Revoke a single refresh token (logout). Returns `false` when no
    /// active token matched — revoking twice is not an error.
    pub async fn revoke(&self, raw_refresh: &str) -> StrataResult<bool> {
        let hash = token::hash_refresh_token(raw_refresh);
        self.token_repo.revoke_by_hash(&hash).await
    }

    /// Revoke every active refresh token for a user (logout
    /// everywhere, password change). Zero revocations is not an error.
    pub async fn revoke_all(&self, user_id: Uuid) -> StrataResult<u64> {
        self.token_repo.revoke_all_for_user(user_id).await
    }

    /// Claim material for a user within a tenant: the membership role,
    /// global role names, and the case-insensitively deduplicated
    /// union of role permissions and the membership overlay.
    async fn build_claims(&self, user_id: Uuid, tenant_id: Uuid) -> StrataResult<ClaimSet> {
        let membership = self
            .membership_repo
            .get(user_id, tenant_id)
            .await
            .map_err(|e| match e {
                StrataError::NotFound { .. } => StrataError::NotMember {
                    user_id: user_id.to_string(),
                    tenant_id: tenant_id.to_string(),
                },
                other => other,
            })?;

        let roles = self.role_repo.get_user_roles(user_id).await?;

        let role_names: Vec<String> = roles.iter().map(|r| r.name.clone()).collect();
        let permissions = dedup_case_insensitive(
            roles
                .into_iter()
                .flat_map(|r| r.permissions)
                .chain(membership.permissions),
        );

        Ok(ClaimSet {
            user_id,
            tenant_id,
            tenant_role: membership.role,
            roles: role_names,
            permissions,
        })
    }

    async fn default_tenant_for(&self, user_id: Uuid) -> StrataResult<Uuid> {
        let memberships = self.membership_repo.list_for_user(user_id).await?;
        memberships
            .iter()
            .find(|m| m.is_default)
            .or_else(|| memberships.first())
            .map(|m| m.tenant_id)
            .ok_or(StrataError::AuthenticationFailed {
                reason: "no tenant membership".into(),
            })
    }
}

fn check_user_status(user: &User) -> Result<(), AuthError> {
    match user.status {
        UserStatus::Active => Ok(()),
        UserStatus::Locked => Err(AuthError::AccountLocked),
        UserStatus::Inactive => Err(AuthError::AccountInactive),
    }
}
