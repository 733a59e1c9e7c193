use crate::utils::error::{Result, TryOnError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Pool, Sqlite};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Garment {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGarment {
    pub name: String,
    pub image_url: String,
    pub category: Option<String>,
}

impl NewGarment {
    pub fn new(name: &str, image_url: &str, category: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            image_url: image_url.to_string(),
            category: category.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserImage {
    pub id: i64,
    pub filename: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub hashed_password: Option<String>,
}

/// Garment catalog, upload records and registered users, one SQLite database.
#[derive(Debug, Clone)]
pub struct Catalog {
    pool: Pool<Sqlite>,
}

impl Catalog {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // every connection to an in-memory database gets its own empty database,
        // so keep exactly one and never recycle it
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        let catalog = Self { pool };
        catalog.init_schema().await?;
        Ok(catalog)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS garments (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                image_url TEXT NOT NULL,
                category TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_images (
                id INTEGER PRIMARY KEY,
                filename TEXT NOT NULL,
                image_url TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT,
                hashed_password TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_garments(&self) -> Result<Vec<Garment>> {
        let garments = sqlx::query_as::<_, Garment>(
            "SELECT id, name, image_url, category FROM garments ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(garments)
    }

    /// Clears the catalog and inserts `garments` in a single transaction.
    pub async fn replace_garments(&self, garments: &[NewGarment]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM garments").execute(&mut *tx).await?;
        for garment in garments {
            sqlx::query("INSERT INTO garments (name, image_url, category) VALUES (?1, ?2, ?3)")
                .bind(&garment.name)
                .bind(&garment.image_url)
                .bind(&garment.category)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn record_upload(
        &self,
        filename: &str,
        image_url: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO user_images (filename, image_url, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(filename)
        .bind(image_url)
        .bind(created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_uploads(&self) -> Result<Vec<UserImage>> {
        let uploads = sqlx::query_as::<_, UserImage>(
            "SELECT id, filename, image_url, created_at FROM user_images ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(uploads)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, hashed_password FROM users WHERE email = ?1 LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Inserts `user`; an email that is already taken is a [`TryOnError::Conflict`].
    pub async fn create_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, hashed_password) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.hashed_password)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(TryOnError::Conflict {
                    message: "Email is already registered.".to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
