use crate::error::{Error, Result};
use crate::models::course::Course;
use crate::models::user::User;
use sqlx::PgPool;

#[derive(Clone)]
pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Courses matching the user's grade that accept their age.
    pub async fn recommended_for(&self, user: &User) -> Result<Vec<Course>> {
        let Some((age, grade)) = user.study_profile() else {
            return Err(Error::Validation(
                "Please update your profile with age and grade to view recommended courses"
                    .to_string(),
            ));
        };

        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT * FROM courses
            WHERE grade = $1 AND min_age <= $2
            ORDER BY title ASC
            "#,
        )
        .bind(grade)
        .bind(age)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }
}
