use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, "type" FROM categories ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, "type" FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Looks a category up by its exact (case-sensitive) label.
pub async fn get_category_by_type(pool: &SqlitePool, kind: &str) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, "type" FROM categories WHERE categories."type" = ?1 ORDER BY id LIMIT 1
        "#,
    )
    .bind(kind)
    .fetch_optional(pool)
    .await
}

/// Inserts or overwrites categories by id. Existing categories missing from
/// `categories` are left untouched, since questions may still reference them.
pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for category in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, "type") VALUES (?1, ?2)
            ON CONFLICT (id) DO UPDATE SET "type" = excluded."type"
            "#,
        )
        .bind(category.id)
        .bind(category.kind)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    #[tokio::test]
    async fn seeded_categories_are_listed_in_id_order() {
        let pool = memory_pool().await;
        let names: Vec<String> = get_all_categories(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.kind)
            .collect();
        assert_eq!(
            names,
            ["Science", "Art", "Geography", "History", "Entertainment", "Sports"]
        );
    }

    #[tokio::test]
    async fn lookup_by_id_and_type() {
        let pool = memory_pool().await;
        assert_eq!(get_category(&pool, 3).await.unwrap().unwrap().kind, "Geography");
        assert!(get_category(&pool, 2500).await.unwrap().is_none());

        assert_eq!(get_category_by_type(&pool, "Sports").await.unwrap().unwrap().id, 6);
        assert!(get_category_by_type(&pool, "sports").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn import_updates_existing_and_adds_new() {
        let pool = memory_pool().await;
        import_categories(
            &pool,
            vec![
                Category { id: 1, kind: "Natural Science".to_owned() },
                Category { id: 7, kind: "Music".to_owned() },
            ],
        )
        .await
        .unwrap();

        let categories = get_all_categories(&pool).await.unwrap();
        assert_eq!(categories.len(), 7);
        assert_eq!(categories[0].kind, "Natural Science");
        assert_eq!(categories[6], Category { id: 7, kind: "Music".to_owned() });
    }

    #[test]
    fn serializes_label_as_type() {
        let json = serde_json::to_value(Category { id: 1, kind: "Art".to_owned() }).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "type": "Art"}));
    }
}
