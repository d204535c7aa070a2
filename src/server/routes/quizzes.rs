use axum::{extract::State, routing::post, Json, Router};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_category_by_type, questions::get_quiz_candidates},
        Question,
    },
    server::{app::AppState, error::ApiError, extract::AppJson},
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::{ApiResponse, SUCCESS};

/// Values of `quiz_category` meaning "draw from every category". The front
/// end sends "click" when no category was picked.
const ALL_CATEGORIES: [&str; 2] = ["click", "all"];
const ALL_CATEGORIES_LABEL: &str = "all";

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default)]
    previous_questions: Vec<i64>,
    quiz_category: String,
}

#[derive(Serialize)]
struct QuizBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<Question>,
    quiz_category: String,
    status: &'static str,
}

async fn next_question(
    State(pool): State<SqlitePool>,
    AppJson(request): AppJson<QuizRequest>,
) -> ApiResponse<QuizBody> {
    let (category_id, label) = if ALL_CATEGORIES.contains(&request.quiz_category.as_str()) {
        (None, ALL_CATEGORIES_LABEL.to_owned())
    } else {
        let category = get_category_by_type(&pool, &request.quiz_category)
            .await?
            .ok_or_else(|| {
                ApiError::Unprocessable(format!("unknown quiz category {}", request.quiz_category))
            })?;
        (Some(category.id), category.kind)
    };

    let candidates = get_quiz_candidates(&pool, category_id, &request.previous_questions).await?;
    let question = candidates.choose(&mut rand::thread_rng()).cloned();
    match &question {
        Some(q) => {
            QUIZ_QUESTIONS_SERVED.with_label_values(&[label.as_str()]).inc();
            tracing::debug!(id = q.id, category = %label, "Serving quiz question");
        }
        None => tracing::debug!(category = %label, "Quiz exhausted"),
    }

    Ok(Json(QuizBody {
        question,
        quiz_category: label,
        status: SUCCESS,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
