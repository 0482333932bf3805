use crate::{
    app::{ArcStoryRepository, ServiceError, ServiceResult},
    profile::ProfileId,
};

#[derive(Clone, Debug)]
pub struct Story {
    pub id: i64,
    pub self_profile_id: ProfileId,
    pub partner_profile_id: ProfileId,
    pub couple_image: String,
    pub marriage_date: String,
    pub review: String,
}

#[derive(Clone, Debug)]
pub struct NewStory {
    pub self_profile_id: ProfileId,
    pub partner_profile_id: ProfileId,
    pub couple_image: String,
    pub marriage_date: String,
    pub review: String,
}

pub trait StoryService {
    fn submit(&self, story: NewStory) -> ServiceResult<i64>;
    fn list(&self) -> ServiceResult<Vec<Story>>;
}

pub struct StoryServiceImpl {
    story_repository: ArcStoryRepository,
}

impl StoryServiceImpl {
    pub fn new(story_repository: ArcStoryRepository) -> Self {
        Self { story_repository }
    }
}

impl StoryService for StoryServiceImpl {
    fn submit(&self, story: NewStory) -> ServiceResult<i64> {
        if story.marriage_date.trim().is_empty() {
            return ServiceError::bad_request("Marriage date is required");
        }
        let id = self.story_repository.insert(&story)?;
        log::info!("Recorded success story {}", id);
        Ok(id)
    }

    fn list(&self) -> ServiceResult<Vec<Story>> {
        let stories = self.story_repository.list()?;
        Ok(stories)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::persistence::stories::MockStoryRepository;

    fn service() -> StoryServiceImpl {
        StoryServiceImpl::new(Arc::new(Box::new(MockStoryRepository::default())))
    }

    #[test]
    fn test_submit_requires_marriage_date() {
        let service = service();
        let story = NewStory {
            self_profile_id: 1,
            partner_profile_id: 2,
            couple_image: String::new(),
            marriage_date: "  ".to_string(),
            review: "Wonderful.".to_string(),
        };
        assert!(matches!(
            service.submit(story),
            Err(ServiceError::BadRequest(..))
        ));
    }

    #[test]
    fn test_submit_and_list_newest_first() {
        let service = service();
        service
            .submit(NewStory {
                self_profile_id: 1,
                partner_profile_id: 2,
                couple_image: String::new(),
                marriage_date: "2022-01-15".to_string(),
                review: "Happily married.".to_string(),
            })
            .unwrap();
        service
            .submit(NewStory {
                self_profile_id: 3,
                partner_profile_id: 4,
                couple_image: String::new(),
                marriage_date: "2024-06-30".to_string(),
                review: "Found each other here.".to_string(),
            })
            .unwrap();

        let stories = service.list().unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].marriage_date, "2024-06-30");
    }
}
