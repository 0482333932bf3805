use serde::{Deserialize, Serialize};

use crate::{
    app::{ArcAccountRepository, ServiceError, ServiceResult, SubmitOutcome},
    util::validate_email,
};

/// Membership tier. Transitions are single-step and unconditional:
/// `normal -> premium-requested` when the member asks, and an admin sets
/// `premium` or `admin` directly. There is no demotion path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Normal,
    PremiumRequested,
    Premium,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Normal => "normal",
            Role::PremiumRequested => "premium-requested",
            Role::Premium => "premium",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(Role::Normal),
            "premium-requested" => Some(Role::PremiumRequested),
            "premium" => Some(Role::Premium),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The roles an admin may grant directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleGrant {
    Admin,
    Premium,
}

impl RoleGrant {
    pub fn into_role(self) -> Role {
        match self {
            RoleGrant::Admin => Role::Admin,
            RoleGrant::Premium => Role::Premium,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub role: Role,
    pub created_at: i64,
}

#[derive(Clone, Debug)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub role: Role,
    pub created_at: i64,
}

pub trait AccountService {
    fn register(&self, email: &str, name: &str, photo_url: &str) -> ServiceResult<SubmitOutcome>;
    fn role_of(&self, email: &str) -> ServiceResult<Option<Role>>;
    fn is_admin(&self, email: &str) -> ServiceResult<bool>;
    fn request_premium(&self, email: &str) -> ServiceResult<usize>;
    fn grant_role(&self, email: &str, grant: RoleGrant) -> ServiceResult<usize>;
    fn list_accounts(&self, search: Option<&str>) -> ServiceResult<Vec<Account>>;
    fn count_by_role(&self, role: Role) -> ServiceResult<usize>;
    fn authorize_admin(&self, email: &str) -> ServiceResult<()>;
}

pub struct AccountServiceImpl {
    account_repository: ArcAccountRepository,
}

impl AccountServiceImpl {
    pub fn new(account_repository: ArcAccountRepository) -> Self {
        Self { account_repository }
    }
}

impl AccountService for AccountServiceImpl {
    fn register(&self, email: &str, name: &str, photo_url: &str) -> ServiceResult<SubmitOutcome> {
        let email = validate_email(email)?;
        if self.account_repository.get_by_email(&email)?.is_some() {
            return Ok(SubmitOutcome::AlreadyExists);
        }
        let id = self.account_repository.insert(&NewAccount {
            email: email.clone(),
            name: name.to_string(),
            photo_url: photo_url.to_string(),
            role: Role::Normal,
            created_at: chrono::Utc::now().timestamp(),
        })?;
        log::info!("Registered account {}", email);
        Ok(SubmitOutcome::Inserted(id))
    }

    fn role_of(&self, email: &str) -> ServiceResult<Option<Role>> {
        let account = self.account_repository.get_by_email(email)?;
        Ok(account.map(|a| a.role))
    }

    fn is_admin(&self, email: &str) -> ServiceResult<bool> {
        Ok(self.role_of(email)? == Some(Role::Admin))
    }

    fn request_premium(&self, email: &str) -> ServiceResult<usize> {
        let matched = self
            .account_repository
            .set_role(email, Role::PremiumRequested)?;
        Ok(matched)
    }

    fn grant_role(&self, email: &str, grant: RoleGrant) -> ServiceResult<usize> {
        let role = grant.into_role();
        let matched = self.account_repository.set_role(email, role)?;
        if matched > 0 {
            log::info!("Granted role {} to {}", role.as_str(), email);
        }
        Ok(matched)
    }

    fn list_accounts(&self, search: Option<&str>) -> ServiceResult<Vec<Account>> {
        let accounts = self.account_repository.list(search)?;
        Ok(accounts)
    }

    fn count_by_role(&self, role: Role) -> ServiceResult<usize> {
        let count = self.account_repository.count_by_role(role)?;
        Ok(count)
    }

    /// The authorization policy for admin-only operations: resolves the
    /// caller's role and denies everything but `admin`.
    fn authorize_admin(&self, email: &str) -> ServiceResult<()> {
        if self.is_admin(email)? {
            Ok(())
        } else {
            ServiceError::forbidden("forbidden access")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::persistence::accounts::MockAccountRepository;

    fn service() -> (AccountServiceImpl, MockAccountRepository) {
        let repo = MockAccountRepository::default();
        (
            AccountServiceImpl::new(Arc::new(Box::new(repo.clone()))),
            repo,
        )
    }

    #[test]
    fn test_register_is_idempotent() {
        let (service, _) = service();

        let first = service
            .register("alice@example.com", "Alice", "")
            .unwrap();
        assert!(matches!(first, SubmitOutcome::Inserted(_)));
        assert_eq!(
            service.role_of("alice@example.com").unwrap(),
            Some(Role::Normal)
        );

        let second = service
            .register("alice@example.com", "Alice", "")
            .unwrap();
        assert_eq!(second, SubmitOutcome::AlreadyExists);
    }

    #[test]
    fn test_register_rejects_invalid_email() {
        let (service, _) = service();
        assert!(matches!(
            service.register("nope", "Nope", ""),
            Err(ServiceError::BadRequest(..))
        ));
    }

    #[test]
    fn test_premium_request_then_grant() {
        let (service, _) = service();
        service
            .register("alice@example.com", "Alice", "")
            .unwrap();

        assert_eq!(service.request_premium("alice@example.com").unwrap(), 1);
        assert_eq!(
            service.role_of("alice@example.com").unwrap(),
            Some(Role::PremiumRequested)
        );

        assert_eq!(
            service
                .grant_role("alice@example.com", RoleGrant::Premium)
                .unwrap(),
            1
        );
        assert_eq!(
            service.role_of("alice@example.com").unwrap(),
            Some(Role::Premium)
        );
    }

    #[test]
    fn test_grant_missing_account_matches_nothing() {
        let (service, _) = service();
        assert_eq!(
            service
                .grant_role("ghost@example.com", RoleGrant::Premium)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_authorize_admin() {
        let (service, _) = service();
        service
            .register("alice@example.com", "Alice", "")
            .unwrap();

        assert!(matches!(
            service.authorize_admin("alice@example.com"),
            Err(ServiceError::Forbidden(..))
        ));
        assert!(matches!(
            service.authorize_admin("ghost@example.com"),
            Err(ServiceError::Forbidden(..))
        ));

        service
            .grant_role("alice@example.com", RoleGrant::Admin)
            .unwrap();
        assert!(service.authorize_admin("alice@example.com").is_ok());
    }
}
