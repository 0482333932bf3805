use serde::{Deserialize, Serialize};

use crate::{
    account::{Account, Role},
    app::{
        ArcAccountRepository, ArcProfileRepository, ServiceError, ServiceResult, SubmitOutcome,
    },
    persistence::profiles::DirectoryFilter,
};

pub type ProfileId = i64;

pub const DEFAULT_PAGE_SIZE: usize = 6;

const SIMILAR_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileType {
    Male,
    Female,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Male => "Male",
            ProfileType::Female => "Female",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Male" => Some(ProfileType::Male),
            "Female" => Some(ProfileType::Female),
            _ => None,
        }
    }
}

/// A member's biodata listing. `age`, `profile_type` and `division` drive the
/// directory filters; the remaining attributes are opaque to the directory.
#[derive(Clone, Debug)]
pub struct Profile {
    pub profile_id: ProfileId,
    pub profile_type: ProfileType,
    pub name: String,
    pub profile_image: String,
    pub date_of_birth: String,
    pub height: String,
    pub weight: String,
    pub age: i64,
    pub occupation: String,
    pub race: String,
    pub fathers_name: String,
    pub mothers_name: String,
    pub expected_partner_age: String,
    pub division: String,
    pub contact_email: String,
    pub mobile_number: String,
}

#[derive(Clone, Debug)]
pub struct NewProfile {
    pub profile_type: ProfileType,
    pub name: String,
    pub profile_image: String,
    pub date_of_birth: String,
    pub height: String,
    pub weight: String,
    pub age: i64,
    pub occupation: String,
    pub race: String,
    pub fathers_name: String,
    pub mothers_name: String,
    pub expected_partner_age: String,
    pub division: String,
    pub contact_email: String,
    pub mobile_number: String,
}

#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// The reduced projection served alongside every directory page: premium
/// members in store order, joined to their biodata when one exists. The
/// directory filter never applies here.
#[derive(Clone, Debug)]
pub struct PremiumProfile {
    pub role: Role,
    pub email: String,
    pub profile_id: Option<ProfileId>,
    pub profile_type: Option<ProfileType>,
    pub profile_image: Option<String>,
    pub division: Option<String>,
    pub occupation: Option<String>,
    pub age: Option<i64>,
}

impl PremiumProfile {
    pub fn project(account: &Account, profile: Option<&Profile>) -> Self {
        Self {
            role: account.role,
            email: account.email.clone(),
            profile_id: profile.map(|p| p.profile_id),
            profile_type: profile.map(|p| p.profile_type),
            profile_image: profile.map(|p| p.profile_image.clone()),
            division: profile.map(|p| p.division.clone()),
            occupation: profile.map(|p| p.occupation.clone()),
            age: profile.map(|p| p.age),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DirectoryPage {
    pub items: Vec<Profile>,
    pub premium_items: Vec<PremiumProfile>,
    pub total_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct ProfileStats {
    pub total: usize,
    pub male: usize,
    pub female: usize,
}

pub trait ProfileService {
    fn list_directory(
        &self,
        filter: &DirectoryFilter,
        pagination: &Pagination,
    ) -> ServiceResult<DirectoryPage>;
    fn get_profile(&self, profile_id: ProfileId) -> ServiceResult<Profile>;
    fn similar_profiles(
        &self,
        profile_type: ProfileType,
        exclude_email: &str,
    ) -> ServiceResult<Vec<Profile>>;
    fn submit_profile(&self, profile: NewProfile) -> ServiceResult<SubmitOutcome>;
    fn stats(&self) -> ServiceResult<ProfileStats>;
}

pub struct ProfileServiceImpl {
    profile_repository: ArcProfileRepository,
    account_repository: ArcAccountRepository,
}

impl ProfileServiceImpl {
    pub fn new(
        profile_repository: ArcProfileRepository,
        account_repository: ArcAccountRepository,
    ) -> Self {
        Self {
            profile_repository,
            account_repository,
        }
    }
}

impl ProfileService for ProfileServiceImpl {
    fn list_directory(
        &self,
        filter: &DirectoryFilter,
        pagination: &Pagination,
    ) -> ServiceResult<DirectoryPage> {
        let page = pagination.page.max(1);
        let page_size = pagination.page_size.max(1);
        let offset = (page - 1) * page_size;

        let items = self.profile_repository.list(filter, offset, page_size)?;
        let total_count = self.profile_repository.count(filter)?;

        // Premium members are a separate window over premium accounts,
        // independent of the search criteria. Accounts without biodata still
        // appear, with the profile side absent.
        let premium_accounts =
            self.account_repository
                .list_by_role(Role::Premium, offset, page_size)?;
        let mut premium_items = Vec::with_capacity(premium_accounts.len());
        for account in &premium_accounts {
            let profile = self.profile_repository.get_by_email(&account.email)?;
            premium_items.push(PremiumProfile::project(account, profile.as_ref()));
        }

        Ok(DirectoryPage {
            items,
            premium_items,
            total_count,
            total_pages: (total_count + page_size - 1) / page_size,
            current_page: page,
        })
    }

    fn get_profile(&self, profile_id: ProfileId) -> ServiceResult<Profile> {
        self.profile_repository
            .get_by_id(profile_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("No biodata with id {}", profile_id)))
    }

    fn similar_profiles(
        &self,
        profile_type: ProfileType,
        exclude_email: &str,
    ) -> ServiceResult<Vec<Profile>> {
        let similar =
            self.profile_repository
                .similar(profile_type, exclude_email, SIMILAR_LIMIT)?;
        Ok(similar)
    }

    fn submit_profile(&self, profile: NewProfile) -> ServiceResult<SubmitOutcome> {
        if self
            .profile_repository
            .get_by_email(&profile.contact_email)?
            .is_some()
        {
            return Ok(SubmitOutcome::AlreadyExists);
        }
        let profile_id = self.profile_repository.insert(&profile)?;
        log::info!(
            "Created biodata {} for {}",
            profile_id,
            profile.contact_email
        );
        Ok(SubmitOutcome::Inserted(profile_id))
    }

    fn stats(&self) -> ServiceResult<ProfileStats> {
        let total = self.profile_repository.count(&DirectoryFilter::default())?;
        let male = self.profile_repository.count(&DirectoryFilter {
            profile_type: Some(ProfileType::Male),
            ..Default::default()
        })?;
        let female = self.profile_repository.count(&DirectoryFilter {
            profile_type: Some(ProfileType::Female),
            ..Default::default()
        })?;
        Ok(ProfileStats {
            total,
            male,
            female,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::persistence::{
        accounts::MockAccountRepository,
        profiles::{AgeRange, MockProfileRepository},
    };

    fn sample_profile(n: i64, profile_type: ProfileType, division: &str) -> NewProfile {
        NewProfile {
            profile_type,
            name: format!("Member {}", n),
            profile_image: String::new(),
            date_of_birth: "1999-01-01".to_string(),
            height: "5'6\"".to_string(),
            weight: "60kg".to_string(),
            age: 20 + n,
            occupation: "Lecturer".to_string(),
            race: String::new(),
            fathers_name: String::new(),
            mothers_name: String::new(),
            expected_partner_age: String::new(),
            division: division.to_string(),
            contact_email: format!("member{}@example.com", n),
            mobile_number: format!("01700-0000{:02}", n),
        }
    }

    fn service_with(
        profiles: MockProfileRepository,
        accounts: MockAccountRepository,
    ) -> ProfileServiceImpl {
        ProfileServiceImpl::new(Arc::new(Box::new(profiles)), Arc::new(Box::new(accounts)))
    }

    #[test]
    fn test_pagination_window() {
        let profiles = MockProfileRepository::default();
        let accounts = MockAccountRepository::default();
        let service = service_with(profiles.clone(), accounts);

        for n in 0..10 {
            service
                .submit_profile(sample_profile(n, ProfileType::Female, "Dhaka"))
                .unwrap();
        }

        let page = service
            .list_directory(
                &DirectoryFilter::default(),
                &Pagination {
                    page: 2,
                    page_size: 6,
                },
            )
            .unwrap();
        assert_eq!(page.items.len(), 4);
        assert_eq!(page.total_count, 10);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page, 2);

        // Beyond the last page: empty, not an error.
        let beyond = service
            .list_directory(
                &DirectoryFilter::default(),
                &Pagination {
                    page: 5,
                    page_size: 6,
                },
            )
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_pages, 2);
    }

    #[test]
    fn test_age_and_type_filters() {
        let profiles = MockProfileRepository::default();
        let accounts = MockAccountRepository::default();
        let service = service_with(profiles, accounts);

        for n in 0..8 {
            let profile_type = if n % 2 == 0 {
                ProfileType::Female
            } else {
                ProfileType::Male
            };
            service
                .submit_profile(sample_profile(n, profile_type, "Dhaka"))
                .unwrap();
        }

        let filter = DirectoryFilter {
            age: Some(AgeRange { min: 22, max: 25 }),
            profile_type: Some(ProfileType::Female),
            division: None,
        };
        let page = service
            .list_directory(&filter, &Pagination::default())
            .unwrap();
        assert!(!page.items.is_empty());
        for profile in &page.items {
            assert!(profile.age >= 22 && profile.age <= 25);
            assert_eq!(profile.profile_type, ProfileType::Female);
        }
        assert_eq!(page.total_count, page.items.len());
    }

    #[test]
    fn test_premium_slice_ignores_filter_and_tolerates_missing_biodata() {
        let profiles = MockProfileRepository::default();
        let accounts = MockAccountRepository::default();
        let service = service_with(profiles, accounts.clone());

        service
            .submit_profile(sample_profile(1, ProfileType::Male, "Dhaka"))
            .unwrap();
        accounts.seed_premium("member1@example.com");
        // Premium account that never submitted biodata.
        accounts.seed_premium("ghost@example.com");

        let filter = DirectoryFilter {
            profile_type: Some(ProfileType::Female),
            ..Default::default()
        };
        let page = service
            .list_directory(&filter, &Pagination::default())
            .unwrap();

        // The filter excludes every profile, but the premium slice is untouched.
        assert!(page.items.is_empty());
        assert_eq!(page.premium_items.len(), 2);

        let with_biodata = page
            .premium_items
            .iter()
            .find(|p| p.email == "member1@example.com")
            .unwrap();
        assert_eq!(with_biodata.profile_id, Some(1));
        assert_eq!(with_biodata.profile_type, Some(ProfileType::Male));

        let ghost = page
            .premium_items
            .iter()
            .find(|p| p.email == "ghost@example.com")
            .unwrap();
        assert_eq!(ghost.profile_id, None);
        assert_eq!(ghost.age, None);
    }

    #[test]
    fn test_submit_assigns_sequential_ids() {
        let profiles = MockProfileRepository::default();
        let accounts = MockAccountRepository::default();
        let service = service_with(profiles, accounts);

        let first = service
            .submit_profile(sample_profile(1, ProfileType::Female, "Dhaka"))
            .unwrap();
        let second = service
            .submit_profile(sample_profile(2, ProfileType::Female, "Sylhet"))
            .unwrap();
        assert_eq!(first, SubmitOutcome::Inserted(1));
        assert_eq!(second, SubmitOutcome::Inserted(2));
    }

    #[test]
    fn test_submit_is_idempotent_per_email() {
        let profiles = MockProfileRepository::default();
        let accounts = MockAccountRepository::default();
        let service = service_with(profiles.clone(), accounts);

        let profile = sample_profile(1, ProfileType::Female, "Dhaka");
        assert_eq!(
            service.submit_profile(profile.clone()).unwrap(),
            SubmitOutcome::Inserted(1)
        );
        assert_eq!(
            service.submit_profile(profile).unwrap(),
            SubmitOutcome::AlreadyExists
        );
        assert_eq!(profiles.stored_count(), 1);
    }

    #[test]
    fn test_similar_profiles() {
        let profiles = MockProfileRepository::default();
        let accounts = MockAccountRepository::default();
        let service = service_with(profiles, accounts);

        for n in 0..5 {
            service
                .submit_profile(sample_profile(n, ProfileType::Female, "Dhaka"))
                .unwrap();
        }

        let similar = service
            .similar_profiles(ProfileType::Female, "member0@example.com")
            .unwrap();
        assert_eq!(similar.len(), 3);
        for profile in &similar {
            assert_eq!(profile.profile_type, ProfileType::Female);
            assert_ne!(profile.contact_email, "member0@example.com");
        }
    }

    #[test]
    fn test_get_profile_not_found() {
        let profiles = MockProfileRepository::default();
        let accounts = MockAccountRepository::default();
        let service = service_with(profiles, accounts);

        assert!(matches!(
            service.get_profile(42),
            Err(ServiceError::NotFound(..))
        ));
    }

    #[test]
    fn test_stats() {
        let profiles = MockProfileRepository::default();
        let accounts = MockAccountRepository::default();
        let service = service_with(profiles, accounts);

        for n in 0..3 {
            service
                .submit_profile(sample_profile(n, ProfileType::Male, "Dhaka"))
                .unwrap();
        }
        service
            .submit_profile(sample_profile(10, ProfileType::Female, "Dhaka"))
            .unwrap();

        let stats = service.stats().unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.male, 3);
        assert_eq!(stats.female, 1);
    }
}
