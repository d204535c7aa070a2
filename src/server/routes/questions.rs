use std::collections::BTreeMap;

use axum::{
    extract::State,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions::{
                self, count_questions, get_question_by_id, get_questions_page, search_questions,
            },
        },
        NewQuestion, Question,
    },
    server::{
        app::AppState,
        error::ApiError,
        extract::{AppJson, AppPath, AppQuery},
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{categories::category_map, ApiResponse, SUCCESS};

pub const QUESTIONS_PER_PAGE: i64 = 10;

#[derive(Deserialize)]
struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    /// Anything that is not an integer falls back to the first page.
    fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|page| page.trim().parse().ok())
            .unwrap_or(1)
    }
}

/// Row offset of a 1-indexed page, `None` when the page cannot hold rows.
fn page_offset(page: i64) -> Option<i64> {
    if page < 1 {
        return None;
    }
    (page - 1).checked_mul(QUESTIONS_PER_PAGE)
}

#[derive(Deserialize)]
struct CreateFields {
    question: String,
    answer: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    difficulty: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    category: i64,
}

/// Body of `POST /questions`: a search when `searchTerm` is present,
/// otherwise a creation when `question` is.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
enum QuestionsRequest {
    Search { term: String },
    Create(NewQuestionRequest),
}

#[derive(Debug, PartialEq, Eq)]
struct NewQuestionRequest {
    question: String,
    answer: String,
    difficulty: i64,
    category: i64,
}

impl TryFrom<Map<String, Value>> for QuestionsRequest {
    type Error = String;

    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        if let Some(term) = body.get("searchTerm") {
            let term = term.as_str().ok_or("searchTerm must be a string")?;
            return Ok(QuestionsRequest::Search {
                term: term.to_owned(),
            });
        }
        if !body.contains_key("question") {
            return Err("expected either searchTerm or question".to_owned());
        }
        let fields: CreateFields =
            serde_json::from_value(Value::Object(body)).map_err(|e| e.to_string())?;
        if fields.question.trim().is_empty() {
            return Err("question must not be empty".to_owned());
        }
        if fields.answer.trim().is_empty() {
            return Err("answer must not be empty".to_owned());
        }
        Ok(QuestionsRequest::Create(NewQuestionRequest {
            question: fields.question,
            answer: fields.answer,
            difficulty: fields.difficulty,
            category: fields.category,
        }))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionsPageBody {
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
    current_category: Option<String>,
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody {
    questions: Vec<Question>,
    total_questions: usize,
    current_category: &'static str,
    status: &'static str,
}

#[derive(Serialize)]
struct CreatedBody {
    new_question: Question,
    status: &'static str,
}

#[derive(Serialize)]
struct RemovedBody {
    removed_question: Question,
    status: &'static str,
}

// Both shapes go out through the same handler.
#[derive(Serialize)]
#[serde(untagged)]
enum QuestionsPostBody {
    Search(SearchBody),
    Created(CreatedBody),
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    AppQuery(query): AppQuery<PageQuery>,
) -> ApiResponse<QuestionsPageBody> {
    let page = query.page();
    let offset = page_offset(page).ok_or_else(|| ApiError::NotFound(format!("page {page}")))?;
    let questions = get_questions_page(&pool, QUESTIONS_PER_PAGE, offset).await?;
    if questions.is_empty() {
        return Err(ApiError::NotFound(format!("page {page}")));
    }
    let total_questions = count_questions(&pool).await?;
    let categories = category_map(get_all_categories(&pool).await?);
    // Reported category is the one of the last question on the page.
    let current_category = questions
        .last()
        .and_then(|q| categories.get(&q.category))
        .cloned();

    Ok(Json(QuestionsPageBody {
        questions,
        total_questions,
        categories,
        current_category,
        status: SUCCESS,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    AppPath(id): AppPath<i64>,
) -> ApiResponse<RemovedBody> {
    let removed = questions::delete_question(&pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("question {id}")))?;
    QUESTIONS_DELETED.inc();
    tracing::info!(id, "Deleted question");
    Ok(Json(RemovedBody {
        removed_question: removed,
        status: SUCCESS,
    }))
}

async fn search_or_create(
    State(pool): State<SqlitePool>,
    AppJson(request): AppJson<QuestionsRequest>,
) -> ApiResponse<QuestionsPostBody> {
    let body = match request {
        QuestionsRequest::Search { term } => {
            let questions = search_questions(&pool, &term).await?;
            tracing::debug!(%term, found = questions.len(), "Searched questions");
            QuestionsPostBody::Search(SearchBody {
                total_questions: questions.len(),
                questions,
                current_category: "",
                status: SUCCESS,
            })
        }
        QuestionsRequest::Create(new) => {
            QuestionsPostBody::Created(CreatedBody {
                new_question: create_question(&pool, new).await?,
                status: SUCCESS,
            })
        }
    };
    Ok(Json(body))
}

async fn create_question(pool: &SqlitePool, new: NewQuestionRequest) -> Result<Question, ApiError> {
    if get_category(pool, new.category).await?.is_none() {
        return Err(ApiError::Unprocessable(format!(
            "category {} does not exist",
            new.category
        )));
    }
    let id = questions::create_question(
        pool,
        &NewQuestion {
            question: new.question,
            answer: new.answer,
            difficulty: new.difficulty,
            category: new.category,
        },
    )
    .await?;
    QUESTIONS_CREATED.inc();
    tracing::info!(id, "Created question");

    let created = get_question_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)?;
    Ok(created)
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(search_or_create))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
