use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::{
    app::DatabaseError,
    persistence::{DatabaseResult, get_connection},
    story::{NewStory, Story},
};

pub trait StoryRepository {
    fn insert(&self, story: &NewStory) -> DatabaseResult<i64>;
    fn list(&self) -> DatabaseResult<Vec<Story>>;
}

pub struct StoryRepositoryImpl {
    pool: Pool<SqliteConnectionManager>,
}

impl StoryRepositoryImpl {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self { pool }
    }

    fn story_from_row(row: &rusqlite::Row) -> rusqlite::Result<Story> {
        Ok(Story {
            id: row.get("id")?,
            self_profile_id: row.get("self_profile_id")?,
            partner_profile_id: row.get("partner_profile_id")?,
            couple_image: row.get("couple_image")?,
            marriage_date: row.get("marriage_date")?,
            review: row.get("review")?,
        })
    }
}

impl StoryRepository for StoryRepositoryImpl {
    fn insert(&self, story: &NewStory) -> DatabaseResult<i64> {
        let conn = get_connection(&self.pool)?;
        conn.execute(
            "INSERT INTO stories (self_profile_id, partner_profile_id, couple_image, marriage_date, review) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                story.self_profile_id,
                story.partner_profile_id,
                story.couple_image,
                story.marriage_date,
                story.review,
            ],
        )
        .map_err(|e| DatabaseError::QueryError(e))?;
        Ok(conn.last_insert_rowid())
    }

    // Newest marriages first; ISO dates sort lexicographically.
    fn list(&self) -> DatabaseResult<Vec<Story>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn
            .prepare("SELECT * FROM stories ORDER BY marriage_date DESC")
            .map_err(|e| DatabaseError::QueryError(e))?;
        let rows = stmt
            .query_map([], Self::story_from_row)
            .map_err(|e| DatabaseError::QueryError(e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::QueryError(e))
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockStoryRepository {
    rows: std::sync::Arc<std::sync::Mutex<Vec<Story>>>,
}

#[cfg(test)]
impl StoryRepository for MockStoryRepository {
    fn insert(&self, story: &NewStory) -> DatabaseResult<i64> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        rows.push(Story {
            id,
            self_profile_id: story.self_profile_id,
            partner_profile_id: story.partner_profile_id,
            couple_image: story.couple_image.clone(),
            marriage_date: story.marriage_date.clone(),
            review: story.review.clone(),
        });
        Ok(id)
    }

    fn list(&self) -> DatabaseResult<Vec<Story>> {
        let mut stories = self.rows.lock().unwrap().clone();
        stories.sort_by(|a, b| b.marriage_date.cmp(&a.marriage_date));
        Ok(stories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::test_pool;

    #[test]
    fn test_list_orders_by_marriage_date() {
        let repo = StoryRepositoryImpl::new(test_pool());
        repo.insert(&NewStory {
            self_profile_id: 1,
            partner_profile_id: 2,
            couple_image: String::new(),
            marriage_date: "2023-05-01".to_string(),
            review: "Met here, married within a year.".to_string(),
        })
        .unwrap();
        repo.insert(&NewStory {
            self_profile_id: 3,
            partner_profile_id: 4,
            couple_image: String::new(),
            marriage_date: "2024-11-20".to_string(),
            review: "Thanks to everyone involved.".to_string(),
        })
        .unwrap();

        let stories = repo.list().unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].marriage_date, "2024-11-20");
        assert_eq!(stories[1].marriage_date, "2023-05-01");
    }
}
