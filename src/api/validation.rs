use super::{ApiError, ListHabitsQuery};
use crate::domain::{Category, Frequency, HabitFilter, HabitId, Page};

pub fn validate_habit_id(id: i32) -> Result<HabitId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid habit ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(HabitId::new(id))
}

pub fn validate_page(skip: Option<i64>, limit: Option<i64>) -> Result<Page, ApiError> {
    let skip = skip.unwrap_or(0);
    let limit = limit.unwrap_or(Page::DEFAULT_LIMIT as i64);

    let skip = u64::try_from(skip).map_err(|_| {
        ApiError::validation(format!("Invalid skip: {skip}. Skip must be >= 0"))
    })?;

    let limit = u64::try_from(limit)
        .ok()
        .filter(|l| (1..=Page::MAX_LIMIT).contains(l))
        .ok_or_else(|| {
            ApiError::validation(format!(
                "Invalid limit: {limit}. Limit must be between 1 and {}",
                Page::MAX_LIMIT
            ))
        })?;

    Ok(Page { skip, limit })
}

pub fn validate_frequency(raw: &str) -> Result<Frequency, ApiError> {
    raw.parse()
        .map_err(|e: crate::domain::UnknownVariant| ApiError::validation(e.to_string()))
}

pub fn validate_category(raw: &str) -> Result<Category, ApiError> {
    raw.parse()
        .map_err(|e: crate::domain::UnknownVariant| ApiError::validation(e.to_string()))
}

/// Turns the raw list query into a filter and a page.
pub fn validate_list_query(query: &ListHabitsQuery) -> Result<(HabitFilter, Page), ApiError> {
    let page = validate_page(query.skip, query.limit)?;

    let filter = HabitFilter {
        include_archived: query.include_archived,
        category: query.category.as_deref().map(validate_category).transpose()?,
        frequency: query.frequency.as_deref().map(validate_frequency).transpose()?,
        completed: query.completed,
    };

    Ok((filter, page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_habit_id() {
        assert!(validate_habit_id(1).is_ok());
        assert!(validate_habit_id(0).is_err());
        assert!(validate_habit_id(-4).is_err());

        let err = validate_habit_id(0).unwrap_err();
        assert!(err.to_string().contains("Invalid habit ID: 0."), "{err}");
    }

    #[test]
    fn test_validate_page() {
        assert_eq!(validate_page(None, None).unwrap(), Page::default());
        assert_eq!(
            validate_page(Some(20), Some(100)).unwrap(),
            Page {
                skip: 20,
                limit: 100
            }
        );
        assert!(validate_page(Some(-1), None).is_err());
        assert!(validate_page(None, Some(0)).is_err());
        assert!(validate_page(None, Some(101)).is_err());
        assert!(validate_page(None, Some(-5)).is_err());

        let err = validate_page(Some(-3), None).unwrap_err();
        assert!(err.to_string().contains("Invalid skip: -3."), "{err}");
        let err = validate_page(None, Some(500)).unwrap_err();
        assert!(err.to_string().contains("Invalid limit: 500."), "{err}");
    }

    #[test]
    fn test_validate_list_query() {
        let query = ListHabitsQuery {
            category: Some("Health".to_string()),
            frequency: Some("weekly".to_string()),
            completed: Some(false),
            ..ListHabitsQuery::default()
        };
        let (filter, page) = validate_list_query(&query).unwrap();
        assert_eq!(filter.category, Some(Category::Health));
        assert_eq!(filter.frequency, Some(Frequency::Weekly));
        assert_eq!(filter.completed, Some(false));
        assert!(!filter.include_archived);
        assert_eq!(page.limit, 10);

        let bad = ListHabitsQuery {
            frequency: Some("hourly".to_string()),
            ..ListHabitsQuery::default()
        };
        assert!(validate_list_query(&bad).is_err());
    }
}
