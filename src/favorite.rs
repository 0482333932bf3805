use crate::{
    app::{ArcFavoriteRepository, ArcProfileRepository, ServiceError, ServiceResult},
    profile::ProfileId,
};

#[derive(Clone, Debug)]
pub struct Favorite {
    pub id: i64,
    pub owner_email: String,
    pub profile_id: ProfileId,
    pub created_at: i64,
}

#[derive(Clone, Debug)]
pub struct NewFavorite {
    pub owner_email: String,
    pub profile_id: ProfileId,
    pub created_at: i64,
}

/// A favorite joined to its biodata; the profile side is absent when the
/// biodata has been removed from the directory.
#[derive(Clone, Debug)]
pub struct FavoriteView {
    pub id: i64,
    pub owner_email: String,
    pub profile_id: ProfileId,
    pub created_at: i64,
    pub name: Option<String>,
    pub division: Option<String>,
    pub occupation: Option<String>,
}

pub trait FavoriteService {
    fn add(&self, owner_email: &str, profile_id: ProfileId) -> ServiceResult<i64>;
    fn list_for(&self, owner_email: &str) -> ServiceResult<Vec<FavoriteView>>;
    fn remove_own(&self, id: i64, owner_email: &str) -> ServiceResult<usize>;
}

pub struct FavoriteServiceImpl {
    favorite_repository: ArcFavoriteRepository,
    profile_repository: ArcProfileRepository,
}

impl FavoriteServiceImpl {
    pub fn new(
        favorite_repository: ArcFavoriteRepository,
        profile_repository: ArcProfileRepository,
    ) -> Self {
        Self {
            favorite_repository,
            profile_repository,
        }
    }
}

impl FavoriteService for FavoriteServiceImpl {
    fn add(&self, owner_email: &str, profile_id: ProfileId) -> ServiceResult<i64> {
        if self.profile_repository.get_by_id(profile_id)?.is_none() {
            return ServiceError::not_found(format!("No biodata with id {}", profile_id));
        }
        let id = self.favorite_repository.insert(&NewFavorite {
            owner_email: owner_email.to_string(),
            profile_id,
            created_at: chrono::Utc::now().timestamp(),
        })?;
        Ok(id)
    }

    fn list_for(&self, owner_email: &str) -> ServiceResult<Vec<FavoriteView>> {
        let favorites = self.favorite_repository.list_by_owner(owner_email)?;
        let mut views = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            let profile = self.profile_repository.get_by_id(favorite.profile_id)?;
            views.push(FavoriteView {
                id: favorite.id,
                owner_email: favorite.owner_email,
                profile_id: favorite.profile_id,
                created_at: favorite.created_at,
                name: profile.as_ref().map(|p| p.name.clone()),
                division: profile.as_ref().map(|p| p.division.clone()),
                occupation: profile.map(|p| p.occupation),
            });
        }
        Ok(views)
    }

    fn remove_own(&self, id: i64, owner_email: &str) -> ServiceResult<usize> {
        let deleted = self.favorite_repository.delete_own(id, owner_email)?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        persistence::{
            favorites::MockFavoriteRepository,
            profiles::{MockProfileRepository, ProfileRepository},
        },
        profile::{NewProfile, ProfileType},
    };

    fn seed_profile(repo: &MockProfileRepository) -> ProfileId {
        repo.insert(&NewProfile {
            profile_type: ProfileType::Male,
            name: "Target Member".to_string(),
            profile_image: String::new(),
            date_of_birth: "1995-09-09".to_string(),
            height: "5'9\"".to_string(),
            weight: "70kg".to_string(),
            age: 29,
            occupation: "Engineer".to_string(),
            race: String::new(),
            fathers_name: String::new(),
            mothers_name: String::new(),
            expected_partner_age: String::new(),
            division: "Khulna".to_string(),
            contact_email: "target@example.com".to_string(),
            mobile_number: String::new(),
        })
        .unwrap()
    }

    fn service() -> (FavoriteServiceImpl, MockProfileRepository) {
        let favorites = MockFavoriteRepository::default();
        let profiles = MockProfileRepository::default();
        (
            FavoriteServiceImpl::new(
                Arc::new(Box::new(favorites)),
                Arc::new(Box::new(profiles.clone())),
            ),
            profiles,
        )
    }

    #[test]
    fn test_add_requires_existing_biodata() {
        let (service, _) = service();
        assert!(matches!(
            service.add("alice@example.com", 42),
            Err(ServiceError::NotFound(..))
        ));
    }

    #[test]
    fn test_add_list_remove() {
        let (service, profiles) = service();
        let profile_id = seed_profile(&profiles);

        let id = service.add("alice@example.com", profile_id).unwrap();
        let views = service.list_for("alice@example.com").unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].name.as_deref(), Some("Target Member"));
        assert_eq!(views[0].division.as_deref(), Some("Khulna"));

        assert_eq!(service.remove_own(id, "mallory@example.com").unwrap(), 0);
        assert_eq!(service.remove_own(id, "alice@example.com").unwrap(), 1);
        assert!(service.list_for("alice@example.com").unwrap().is_empty());
    }
}
