use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use crate::{
    app::DatabaseError,
    persistence::{DatabaseResult, get_connection},
    profile::{NewProfile, Profile, ProfileId, ProfileType},
};

#[derive(Clone, Copy, Debug)]
pub struct AgeRange {
    pub min: i64,
    pub max: i64,
}

/// Directory search criteria. Absent options impose no constraint; present
/// options compose with AND.
#[derive(Clone, Debug, Default)]
pub struct DirectoryFilter {
    pub age: Option<AgeRange>,
    pub profile_type: Option<ProfileType>,
    pub division: Option<String>,
}

pub trait ProfileRepository {
    fn get_by_id(&self, profile_id: ProfileId) -> DatabaseResult<Option<Profile>>;
    fn get_by_email(&self, contact_email: &str) -> DatabaseResult<Option<Profile>>;
    fn list(
        &self,
        filter: &DirectoryFilter,
        offset: usize,
        limit: usize,
    ) -> DatabaseResult<Vec<Profile>>;
    fn count(&self, filter: &DirectoryFilter) -> DatabaseResult<usize>;
    fn similar(
        &self,
        profile_type: ProfileType,
        exclude_email: &str,
        limit: usize,
    ) -> DatabaseResult<Vec<Profile>>;
    fn insert(&self, profile: &NewProfile) -> DatabaseResult<ProfileId>;
}

impl FromSql for ProfileType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        ProfileType::parse(text).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for ProfileType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

pub struct ProfileRepositoryImpl {
    pool: Pool<SqliteConnectionManager>,
}

impl ProfileRepositoryImpl {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self { pool }
    }

    fn profile_from_row(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        Ok(Profile {
            profile_id: row.get("profile_id")?,
            profile_type: row.get("profile_type")?,
            name: row.get("name")?,
            profile_image: row.get("profile_image")?,
            date_of_birth: row.get("date_of_birth")?,
            height: row.get("height")?,
            weight: row.get("weight")?,
            age: row.get("age")?,
            occupation: row.get("occupation")?,
            race: row.get("race")?,
            fathers_name: row.get("fathers_name")?,
            mothers_name: row.get("mothers_name")?,
            expected_partner_age: row.get("expected_partner_age")?,
            division: row.get("division")?,
            contact_email: row.get("contact_email")?,
            mobile_number: row.get("mobile_number")?,
        })
    }

    fn filter_clause(filter: &DirectoryFilter) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(age) = &filter.age {
            conditions.push("age >= ?");
            params.push(Box::new(age.min));
            conditions.push("age <= ?");
            params.push(Box::new(age.max));
        }
        if let Some(profile_type) = filter.profile_type {
            conditions.push("profile_type = ?");
            params.push(Box::new(profile_type));
        }
        if let Some(division) = &filter.division {
            conditions.push("division = ?");
            params.push(Box::new(division.clone()));
        }
        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        (clause, params)
    }
}

impl ProfileRepository for ProfileRepositoryImpl {
    fn get_by_id(&self, profile_id: ProfileId) -> DatabaseResult<Option<Profile>> {
        let conn = get_connection(&self.pool)?;
        let profile = conn.query_row(
            "SELECT * FROM biodatas WHERE profile_id = ?1",
            [profile_id],
            Self::profile_from_row,
        );
        match profile {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryError(e)),
        }
    }

    fn get_by_email(&self, contact_email: &str) -> DatabaseResult<Option<Profile>> {
        let conn = get_connection(&self.pool)?;
        let profile = conn.query_row(
            "SELECT * FROM biodatas WHERE contact_email = ?1",
            [contact_email],
            Self::profile_from_row,
        );
        match profile {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryError(e)),
        }
    }

    fn list(
        &self,
        filter: &DirectoryFilter,
        offset: usize,
        limit: usize,
    ) -> DatabaseResult<Vec<Profile>> {
        let conn = get_connection(&self.pool)?;
        let (clause, mut params) = Self::filter_clause(filter);
        let sql = format!("SELECT * FROM biodatas{} LIMIT ? OFFSET ?", clause);
        params.push(Box::new(limit as i64));
        params.push(Box::new(offset as i64));
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DatabaseError::QueryError(e))?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
                Self::profile_from_row,
            )
            .map_err(|e| DatabaseError::QueryError(e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::QueryError(e))
    }

    fn count(&self, filter: &DirectoryFilter) -> DatabaseResult<usize> {
        let conn = get_connection(&self.pool)?;
        let (clause, params) = Self::filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM biodatas{}", clause);
        let count: i64 = conn
            .query_row(
                &sql,
                rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryError(e))?;
        Ok(count as usize)
    }

    fn similar(
        &self,
        profile_type: ProfileType,
        exclude_email: &str,
        limit: usize,
    ) -> DatabaseResult<Vec<Profile>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn
            .prepare("SELECT * FROM biodatas WHERE profile_type = ?1 AND contact_email <> ?2 LIMIT ?3")
            .map_err(|e| DatabaseError::QueryError(e))?;
        let rows = stmt
            .query_map(
                rusqlite::params![profile_type, exclude_email, limit as i64],
                Self::profile_from_row,
            )
            .map_err(|e| DatabaseError::QueryError(e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DatabaseError::QueryError(e))
    }

    fn insert(&self, profile: &NewProfile) -> DatabaseResult<ProfileId> {
        let conn = get_connection(&self.pool)?;
        // The max+1 runs inside the INSERT itself, so two concurrent
        // submissions cannot observe the same maximum.
        conn.execute(
            "INSERT INTO biodatas (profile_id, profile_type, name, profile_image, date_of_birth, height, weight, age, occupation, race, fathers_name, mothers_name, expected_partner_age, division, contact_email, mobile_number) VALUES ((SELECT IFNULL(MAX(profile_id), 0) + 1 FROM biodatas), ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            rusqlite::params![
                profile.profile_type,
                profile.name,
                profile.profile_image,
                profile.date_of_birth,
                profile.height,
                profile.weight,
                profile.age,
                profile.occupation,
                profile.race,
                profile.fathers_name,
                profile.mothers_name,
                profile.expected_partner_age,
                profile.division,
                profile.contact_email,
                profile.mobile_number,
            ],
        )
        .map_err(|e| DatabaseError::QueryError(e))?;
        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockProfileRepository {
    rows: std::sync::Arc<std::sync::Mutex<Vec<Profile>>>,
}

#[cfg(test)]
impl MockProfileRepository {
    pub fn stored_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn matches(profile: &Profile, filter: &DirectoryFilter) -> bool {
        if let Some(age) = &filter.age {
            if profile.age < age.min || profile.age > age.max {
                return false;
            }
        }
        if let Some(profile_type) = filter.profile_type {
            if profile.profile_type != profile_type {
                return false;
            }
        }
        if let Some(division) = &filter.division {
            if &profile.division != division {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
impl ProfileRepository for MockProfileRepository {
    fn get_by_id(&self, profile_id: ProfileId) -> DatabaseResult<Option<Profile>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|p| p.profile_id == profile_id).cloned())
    }

    fn get_by_email(&self, contact_email: &str) -> DatabaseResult<Option<Profile>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|p| p.contact_email == contact_email).cloned())
    }

    fn list(
        &self,
        filter: &DirectoryFilter,
        offset: usize,
        limit: usize,
    ) -> DatabaseResult<Vec<Profile>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|p| Self::matches(p, filter))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn count(&self, filter: &DirectoryFilter) -> DatabaseResult<usize> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|p| Self::matches(p, filter)).count())
    }

    fn similar(
        &self,
        profile_type: ProfileType,
        exclude_email: &str,
        limit: usize,
    ) -> DatabaseResult<Vec<Profile>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|p| p.profile_type == profile_type && p.contact_email != exclude_email)
            .take(limit)
            .cloned()
            .collect())
    }

    fn insert(&self, profile: &NewProfile) -> DatabaseResult<ProfileId> {
        let mut rows = self.rows.lock().unwrap();
        let profile_id = rows.iter().map(|p| p.profile_id).max().unwrap_or(0) + 1;
        rows.push(Profile {
            profile_id,
            profile_type: profile.profile_type,
            name: profile.name.clone(),
            profile_image: profile.profile_image.clone(),
            date_of_birth: profile.date_of_birth.clone(),
            height: profile.height.clone(),
            weight: profile.weight.clone(),
            age: profile.age,
            occupation: profile.occupation.clone(),
            race: profile.race.clone(),
            fathers_name: profile.fathers_name.clone(),
            mothers_name: profile.mothers_name.clone(),
            expected_partner_age: profile.expected_partner_age.clone(),
            division: profile.division.clone(),
            contact_email: profile.contact_email.clone(),
            mobile_number: profile.mobile_number.clone(),
        });
        Ok(profile_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::test_pool;

    fn new_profile(n: i64, profile_type: ProfileType, division: &str) -> NewProfile {
        NewProfile {
            profile_type,
            name: format!("Member {}", n),
            profile_image: String::new(),
            date_of_birth: "1999-01-01".to_string(),
            height: "5'4\"".to_string(),
            weight: "55kg".to_string(),
            age: 20 + n,
            occupation: "Student".to_string(),
            race: String::new(),
            fathers_name: String::new(),
            mothers_name: String::new(),
            expected_partner_age: String::new(),
            division: division.to_string(),
            contact_email: format!("member{}@example.com", n),
            mobile_number: String::new(),
        }
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let repo = ProfileRepositoryImpl::new(test_pool());

        let first = repo
            .insert(&new_profile(1, ProfileType::Female, "Dhaka"))
            .unwrap();
        let second = repo
            .insert(&new_profile(2, ProfileType::Male, "Sylhet"))
            .unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let found = repo.get_by_email("member1@example.com").unwrap().unwrap();
        assert_eq!(found.profile_id, 1);
        assert_eq!(found.division, "Dhaka");
        assert!(repo.get_by_id(99).unwrap().is_none());
    }

    #[test]
    fn test_list_composes_filters() {
        let repo = ProfileRepositoryImpl::new(test_pool());
        for n in 1..=10 {
            let profile_type = if n % 2 == 0 {
                ProfileType::Male
            } else {
                ProfileType::Female
            };
            let division = if n <= 5 { "Dhaka" } else { "Sylhet" };
            repo.insert(&new_profile(n, profile_type, division)).unwrap();
        }

        // Ages run 21..=30; members 1..=5 live in Dhaka.
        let filter = DirectoryFilter {
            age: Some(AgeRange { min: 21, max: 25 }),
            profile_type: Some(ProfileType::Female),
            division: Some("Dhaka".to_string()),
        };
        let listed = repo.list(&filter, 0, 10).unwrap();
        assert_eq!(listed.len(), 3);
        for profile in &listed {
            assert_eq!(profile.profile_type, ProfileType::Female);
            assert_eq!(profile.division, "Dhaka");
            assert!(profile.age >= 21 && profile.age <= 25);
        }
        assert_eq!(repo.count(&filter).unwrap(), 3);
        assert_eq!(repo.count(&DirectoryFilter::default()).unwrap(), 10);
    }

    #[test]
    fn test_list_window() {
        let repo = ProfileRepositoryImpl::new(test_pool());
        for n in 1..=10 {
            repo.insert(&new_profile(n, ProfileType::Female, "Dhaka"))
                .unwrap();
        }

        let second_page = repo.list(&DirectoryFilter::default(), 6, 6).unwrap();
        assert_eq!(second_page.len(), 4);
        assert_eq!(second_page[0].profile_id, 7);

        let beyond = repo.list(&DirectoryFilter::default(), 24, 6).unwrap();
        assert!(beyond.is_empty());
    }

    #[test]
    fn test_similar_excludes_email() {
        let repo = ProfileRepositoryImpl::new(test_pool());
        for n in 1..=5 {
            repo.insert(&new_profile(n, ProfileType::Female, "Dhaka"))
                .unwrap();
        }
        repo.insert(&new_profile(6, ProfileType::Male, "Dhaka"))
            .unwrap();

        let similar = repo
            .similar(ProfileType::Female, "member1@example.com", 3)
            .unwrap();
        assert_eq!(similar.len(), 3);
        for profile in &similar {
            assert_eq!(profile.profile_type, ProfileType::Female);
            assert_ne!(profile.contact_email, "member1@example.com");
        }
    }
}
