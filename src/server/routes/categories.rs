use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions::get_questions_for_category,
        },
        Category, Question,
    },
    server::{app::AppState, error::ApiError, extract::AppPath},
};

use super::{ApiResponse, SUCCESS};

/// Category id to label, the shape the front end indexes categories by.
pub(super) fn category_map(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

#[derive(Serialize)]
struct CategoriesBody {
    categories: BTreeMap<i64, String>,
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryQuestionsBody {
    questions: Vec<Question>,
    total_questions: usize,
    current_category: String,
    status: &'static str,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<CategoriesBody> {
    let categories = get_all_categories(&pool).await?;
    Ok(Json(CategoriesBody {
        categories: category_map(categories),
        status: SUCCESS,
    }))
}

async fn questions_in_category(
    State(pool): State<SqlitePool>,
    AppPath(id): AppPath<i64>,
) -> ApiResponse<CategoryQuestionsBody> {
    let category = get_category(&pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("category {id}")))?;
    let questions = get_questions_for_category(&pool, category.id).await?;
    Ok(Json(CategoryQuestionsBody {
        total_questions: questions.len(),
        questions,
        current_category: category.kind,
        status: SUCCESS,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_in_category))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keys_serialize_as_strings() {
        let map = category_map(vec![
            Category { id: 2, kind: "Art".to_owned() },
            Category { id: 1, kind: "Science".to_owned() },
        ]);
        assert_eq!(
            serde_json::to_value(map).unwrap(),
            serde_json::json!({"1": "Science", "2": "Art"})
        );
    }
}
