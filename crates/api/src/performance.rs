use std::collections::HashMap;

use async_graphql::{Context, Enum, InputObject, Object, SimpleObject, ID};
use chrono::NaiveDate;
use entity::{department, employee, performance_review};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::attendance::employees_by_id;
use crate::common::{
    database, db_error, id_of, not_found, now, optional_text, parse_optional_id, parse_uuid,
    percentage, require_editor, require_viewer, validation_error,
};
use crate::employees::ensure_employee_exists;

/// Overall score at or above which a review counts as excellent.
const EXCELLENT_THRESHOLD: i16 = 90;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum PerformanceRating {
    Excellent,
    VeryGood,
    Good,
    Average,
    NeedsImprovement,
}

impl From<performance_review::Rating> for PerformanceRating {
    fn from(value: performance_review::Rating) -> Self {
        match value {
            performance_review::Rating::Excellent => PerformanceRating::Excellent,
            performance_review::Rating::VeryGood => PerformanceRating::VeryGood,
            performance_review::Rating::Good => PerformanceRating::Good,
            performance_review::Rating::Average => PerformanceRating::Average,
            performance_review::Rating::NeedsImprovement => PerformanceRating::NeedsImprovement,
        }
    }
}

impl From<PerformanceRating> for performance_review::Rating {
    fn from(value: PerformanceRating) -> Self {
        match value {
            PerformanceRating::Excellent => performance_review::Rating::Excellent,
            PerformanceRating::VeryGood => performance_review::Rating::VeryGood,
            PerformanceRating::Good => performance_review::Rating::Good,
            PerformanceRating::Average => performance_review::Rating::Average,
            PerformanceRating::NeedsImprovement => performance_review::Rating::NeedsImprovement,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct PerformanceReviewEntry {
    pub id: ID,
    pub employee_id: ID,
    pub employee_code: String,
    pub employee_name: String,
    pub department: String,
    pub review_date: NaiveDate,
    pub overall_score: i32,
    pub kpi_score: i32,
    pub goals_completed: i32,
    pub goals_total: i32,
    pub goal_completion_rate: f64,
    pub rating: PerformanceRating,
    pub notes_md: Option<String>,
}

#[derive(Clone, Debug, PartialEq, SimpleObject)]
pub struct PerformanceSummary {
    pub review_count: i64,
    pub average_score: f64,
    pub goals_completed: i64,
    pub goals_total: i64,
    pub goal_completion_rate: f64,
    pub excellent_count: i64,
}

#[derive(InputObject, Clone)]
pub struct NewPerformanceReviewInput {
    pub employee_id: ID,
    pub review_date: NaiveDate,
    pub overall_score: i32,
    pub kpi_score: i32,
    pub goals_completed: i32,
    pub goals_total: i32,
    /// Derived from the overall score when omitted.
    pub rating: Option<PerformanceRating>,
    pub notes_md: Option<String>,
}

#[derive(InputObject, Clone)]
pub struct UpdatePerformanceReviewInput {
    pub id: ID,
    pub review_date: Option<NaiveDate>,
    pub overall_score: Option<i32>,
    pub kpi_score: Option<i32>,
    pub goals_completed: Option<i32>,
    pub goals_total: Option<i32>,
    pub rating: Option<PerformanceRating>,
    pub notes_md: Option<String>,
}

#[derive(Default)]
pub struct PerformanceQuery;

#[Object]
impl PerformanceQuery {
    async fn performance_reviews(
        &self,
        ctx: &Context<'_>,
        employee_id: Option<ID>,
    ) -> async_graphql::Result<Vec<PerformanceReviewEntry>> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let employee_id = parse_optional_id("employeeId", &employee_id)?;
        let span = info_span!("hr.performance.list", filtered = employee_id.is_some());
        async move {
            let mut query = performance_review::Entity::find();
            if let Some(id) = employee_id {
                query = query.filter(performance_review::Column::EmployeeId.eq(id));
            }
            let reviews = query
                .order_by_desc(performance_review::Column::ReviewDate)
                .all(db.as_ref())
                .await
                .map_err(db_error)?;
            let people = employees_by_id(db.as_ref(), reviews.iter().map(|r| r.employee_id)).await?;
            let department_names: HashMap<Uuid, String> = department::Entity::find()
                .all(db.as_ref())
                .await
                .map_err(db_error)?
                .into_iter()
                .map(|d| (d.id, d.name))
                .collect();
            Ok(reviews
                .into_iter()
                .map(|review| {
                    let person = people.get(&review.employee_id);
                    let department = person
                        .and_then(|p| p.department_id)
                        .and_then(|id| department_names.get(&id).cloned())
                        .unwrap_or_default();
                    review_entry(review, person, department)
                })
                .collect())
        }
        .instrument(span)
        .await
    }

    async fn performance_summary(&self, ctx: &Context<'_>) -> async_graphql::Result<PerformanceSummary> {
        require_viewer(ctx)?;
        let db = database(ctx)?;
        let reviews = performance_review::Entity::find()
            .all(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(summarize_reviews(&reviews))
    }
}

#[derive(Default)]
pub struct PerformanceMutation;

#[Object]
impl PerformanceMutation {
    async fn create_performance_review(
        &self,
        ctx: &Context<'_>,
        input: NewPerformanceReviewInput,
    ) -> async_graphql::Result<PerformanceReviewEntry> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let employee_id = parse_uuid(&input.employee_id)?;
        let overall = score("overallScore", input.overall_score)?;
        let kpi = score("kpiScore", input.kpi_score)?;
        validate_goals(input.goals_completed, input.goals_total).map_err(validation_error)?;
        let notes_md = optional_text("notesMd", input.notes_md.clone(), 10_000)?;
        ensure_employee_exists(db.as_ref(), employee_id).await?;

        let timestamp = now();
        let review = performance_review::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(employee_id),
            review_date: Set(input.review_date),
            overall_score: Set(overall),
            kpi_score: Set(kpi),
            goals_completed: Set(input.goals_completed),
            goals_total: Set(input.goals_total),
            rating: Set(input
                .rating
                .map(Into::into)
                .unwrap_or_else(|| rating_for_score(overall))),
            notes_md: Set(notes_md),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        }
        .insert(db.as_ref())
        .await
        .map_err(db_error)?;
        single_entry(ctx, review.id).await
    }

    async fn update_performance_review(
        &self,
        ctx: &Context<'_>,
        input: UpdatePerformanceReviewInput,
    ) -> async_graphql::Result<PerformanceReviewEntry> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let review_id = parse_uuid(&input.id)?;
        let existing = performance_review::Entity::find_by_id(review_id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or_else(|| not_found("Performance review"))?;

        let goals_completed = input.goals_completed.unwrap_or(existing.goals_completed);
        let goals_total = input.goals_total.unwrap_or(existing.goals_total);
        validate_goals(goals_completed, goals_total).map_err(validation_error)?;

        let mut active: performance_review::ActiveModel = existing.into();
        if let Some(date) = input.review_date {
            active.review_date = Set(date);
        }
        if let Some(value) = input.overall_score {
            let overall = score("overallScore", value)?;
            active.overall_score = Set(overall);
            if input.rating.is_none() {
                active.rating = Set(rating_for_score(overall));
            }
        }
        if let Some(value) = input.kpi_score {
            active.kpi_score = Set(score("kpiScore", value)?);
        }
        active.goals_completed = Set(goals_completed);
        active.goals_total = Set(goals_total);
        if let Some(rating) = input.rating {
            active.rating = Set(rating.into());
        }
        if input.notes_md.is_some() {
            active.notes_md = Set(optional_text("notesMd", input.notes_md.clone(), 10_000)?);
        }
        active.updated_at = Set(now());
        active.update(db.as_ref()).await.map_err(db_error)?;
        single_entry(ctx, review_id).await
    }

    async fn delete_performance_review(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        require_editor(ctx)?;
        let db = database(ctx)?;
        let review_id = parse_uuid(&id)?;
        let res = performance_review::Entity::delete_by_id(review_id)
            .exec(db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(res.rows_affected > 0)
    }
}

async fn single_entry(
    ctx: &Context<'_>,
    review_id: Uuid,
) -> async_graphql::Result<PerformanceReviewEntry> {
    let db = database(ctx)?;
    let review = performance_review::Entity::find_by_id(review_id)
        .one(db.as_ref())
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Performance review"))?;
    let person = ensure_employee_exists(db.as_ref(), review.employee_id).await?;
    let department = match person.department_id {
        Some(id) => department::Entity::find_by_id(id)
            .one(db.as_ref())
            .await
            .map_err(db_error)?
            .map(|d| d.name)
            .unwrap_or_default(),
        None => String::new(),
    };
    Ok(review_entry(review, Some(&person), department))
}

fn review_entry(
    review: performance_review::Model,
    person: Option<&employee::Model>,
    department: String,
) -> PerformanceReviewEntry {
    PerformanceReviewEntry {
        id: id_of(review.id),
        employee_id: id_of(review.employee_id),
        employee_code: person.map(|p| p.employee_id.clone()).unwrap_or_default(),
        employee_name: person.map(|p| p.name.clone()).unwrap_or_default(),
        department,
        review_date: review.review_date,
        overall_score: review.overall_score.into(),
        kpi_score: review.kpi_score.into(),
        goals_completed: review.goals_completed,
        goals_total: review.goals_total,
        goal_completion_rate: percentage(review.goals_completed.into(), review.goals_total.into()),
        rating: review.rating.into(),
        notes_md: review.notes_md,
    }
}

fn score(field: &str, value: i32) -> async_graphql::Result<i16> {
    if !(0..=100).contains(&value) {
        return Err(validation_error(format!("{} must be between 0 and 100", field)));
    }
    Ok(value as i16)
}

fn validate_goals(completed: i32, total: i32) -> Result<(), String> {
    if completed < 0 || total < 0 {
        return Err("Goal counts must not be negative".into());
    }
    if completed > total {
        return Err("goalsCompleted must not exceed goalsTotal".into());
    }
    Ok(())
}

pub(crate) fn rating_for_score(score: i16) -> performance_review::Rating {
    use performance_review::Rating;
    match score {
        s if s >= EXCELLENT_THRESHOLD => Rating::Excellent,
        s if s >= 80 => Rating::VeryGood,
        s if s >= 70 => Rating::Good,
        s if s >= 60 => Rating::Average,
        _ => Rating::NeedsImprovement,
    }
}

pub(crate) fn summarize_reviews(reviews: &[performance_review::Model]) -> PerformanceSummary {
    let review_count = reviews.len() as i64;
    let score_total: i64 = reviews.iter().map(|r| i64::from(r.overall_score)).sum();
    let goals_completed: i64 = reviews.iter().map(|r| i64::from(r.goals_completed)).sum();
    let goals_total: i64 = reviews.iter().map(|r| i64::from(r.goals_total)).sum();
    let average_score = if review_count == 0 {
        0.0
    } else {
        ((score_total as f64 / review_count as f64) * 10.0).round() / 10.0
    };
    PerformanceSummary {
        review_count,
        average_score,
        goals_completed,
        goals_total,
        goal_completion_rate: percentage(goals_completed, goals_total),
        excellent_count: reviews
            .iter()
            .filter(|r| r.overall_score >= EXCELLENT_THRESHOLD)
            .count() as i64,
    }
}
