//! # PostgreSQL store
//!
//! Maps the relational schema in `migrations/` to the domain models. Like
//! toggles, comment attachment and user bookkeeping lock the target row with
//! `SELECT ... FOR UPDATE` inside a transaction.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{Postgres, Row, Transaction};
use tracing::{error, info};
use uuid::Uuid;

use domains::{
    Category, Comment, CommentStatus, Complaint, ComplaintRepo, ComplaintStatus, CredentialRepo,
    DomainError, LikeOutcome, Result, SettingsPatch, User, UserActivity, UserRepo, UserSettings,
};

const COMPLAINT_COLUMNS: &str = "id, titulo, descripcion, categoria, fecha_creacion, usuario_id, \
     likes, usuarios_que_dieron_like, comentarios, anonimo, estado";

const COMMENT_COLUMNS: &str = "id, denuncia_id, usuario_id, contenido, fecha_creacion, likes, \
     respuestas, comentario_padre_id, anonimo, estado";

const USER_COLUMNS: &str = "id, username, email, fecha_registro, denuncias_creadas, \
     denuncias_likadas, comentarios, configuraciones";

fn db_err(e: sqlx::Error) -> DomainError {
    error!(error = %e, "database error");
    DomainError::internal(e)
}

fn counter(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn complaint_from_row(row: &PgRow) -> Result<Complaint> {
    let category: String = row.try_get("categoria").map_err(db_err)?;
    let status: String = row.try_get("estado").map_err(db_err)?;
    Ok(Complaint {
        id: row.try_get("id").map_err(db_err)?,
        title: row.try_get("titulo").map_err(db_err)?,
        description: row.try_get("descripcion").map_err(db_err)?,
        category: category.parse::<Category>().map_err(DomainError::internal)?,
        created_at: row.try_get("fecha_creacion").map_err(db_err)?,
        author_id: row.try_get("usuario_id").map_err(db_err)?,
        likes: counter(row.try_get("likes").map_err(db_err)?),
        liked_by: row.try_get("usuarios_que_dieron_like").map_err(db_err)?,
        comment_ids: row.try_get("comentarios").map_err(db_err)?,
        anonymous: row.try_get("anonimo").map_err(db_err)?,
        status: ComplaintStatus::parse(&status).unwrap_or_default(),
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment> {
    let status: String = row.try_get("estado").map_err(db_err)?;
    Ok(Comment {
        id: row.try_get("id").map_err(db_err)?,
        complaint_id: row.try_get("denuncia_id").map_err(db_err)?,
        author_id: row.try_get("usuario_id").map_err(db_err)?,
        content: row.try_get("contenido").map_err(db_err)?,
        created_at: row.try_get("fecha_creacion").map_err(db_err)?,
        likes: counter(row.try_get("likes").map_err(db_err)?),
        replies: row.try_get("respuestas").map_err(db_err)?,
        parent_id: row.try_get("comentario_padre_id").map_err(db_err)?,
        anonymous: row.try_get("anonimo").map_err(db_err)?,
        status: CommentStatus::parse(&status).unwrap_or_default(),
    })
}

fn user_from_row(row: &PgRow) -> Result<User> {
    let settings: Json<UserSettings> = row.try_get("configuraciones").map_err(db_err)?;
    Ok(User {
        id: row.try_get("id").map_err(db_err)?,
        username: row.try_get("username").map_err(db_err)?,
        email: row.try_get("email").map_err(db_err)?,
        registered_at: row.try_get("fecha_registro").map_err(db_err)?,
        created_complaints: row.try_get("denuncias_creadas").map_err(db_err)?,
        liked_complaints: row.try_get("denuncias_likadas").map_err(db_err)?,
        comments: row.try_get("comentarios").map_err(db_err)?,
        settings: settings.0,
    })
}

/// One pool serving every repository port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(db_err)?;
        Ok(Self { pool })
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(DomainError::internal)?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn lock_complaint(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Complaint> {
        let row = sqlx::query(&format!(
            "SELECT {COMPLAINT_COLUMNS} FROM denuncias WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("la denuncia", id))?;
        complaint_from_row(&row)
    }

    async fn lock_user(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn store_user_lists(tx: &mut Transaction<'_, Postgres>, user: &User) -> Result<()> {
        sqlx::query(
            "UPDATE usuarios SET denuncias_creadas = $2, denuncias_likadas = $3, \
             comentarios = $4, configuraciones = $5 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.created_complaints)
        .bind(&user.liked_complaints)
        .bind(&user.comments)
        .bind(Json(&user.settings))
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl ComplaintRepo for PgStore {
    async fn insert_complaint(&self, complaint: Complaint) -> Result<()> {
        let inserted = sqlx::query(&format!(
            "INSERT INTO denuncias ({COMPLAINT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(complaint.id)
        .bind(&complaint.title)
        .bind(&complaint.description)
        .bind(complaint.category.as_str())
        .bind(complaint.created_at)
        .bind(complaint.author_id)
        .bind(column(complaint.likes))
        .bind(&complaint.liked_by)
        .bind(&complaint.comment_ids)
        .bind(complaint.anonymous)
        .bind(complaint.status.as_str())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                DomainError::Conflict(format!("la denuncia {} ya existe", complaint.id)),
            ),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn get_complaint(&self, id: Uuid) -> Result<Option<Complaint>> {
        let row = sqlx::query(&format!(
            "SELECT {COMPLAINT_COLUMNS} FROM denuncias WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(complaint_from_row).transpose()
    }

    async fn list_complaints(&self) -> Result<Vec<Complaint>> {
        sqlx::query(&format!(
            "SELECT {COMPLAINT_COLUMNS} FROM denuncias ORDER BY fecha_creacion ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(complaint_from_row)
        .collect()
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<LikeOutcome> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut complaint = Self::lock_complaint(&mut tx, id).await?;
        let outcome = complaint.toggle_like(user_id);

        sqlx::query("UPDATE denuncias SET likes = $2, usuarios_que_dieron_like = $3 WHERE id = $1")
            .bind(id)
            .bind(column(complaint.likes))
            .bind(&complaint.liked_by)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(outcome)
    }

    async fn attach_comment(&self, comment: Comment) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut complaint = Self::lock_complaint(&mut tx, comment.complaint_id).await?;

        sqlx::query(&format!(
            "INSERT INTO comentarios ({COMMENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(comment.id)
        .bind(comment.complaint_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(column(comment.likes))
        .bind(&comment.replies)
        .bind(comment.parent_id)
        .bind(comment.anonymous)
        .bind(comment.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        complaint.attach_comment(comment.id);
        sqlx::query("UPDATE denuncias SET comentarios = $2 WHERE id = $1")
            .bind(complaint.id)
            .bind(&complaint.comment_ids)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn list_comments(&self, complaint_id: Uuid) -> Result<Vec<Comment>> {
        sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comentarios WHERE denuncia_id = $1 \
             ORDER BY fecha_creacion ASC"
        ))
        .bind(complaint_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(comment_from_row)
        .collect()
    }

    async fn count_comments(&self) -> Result<usize> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comentarios")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(usize::try_from(total).unwrap_or(0))
    }
}

#[async_trait]
impl UserRepo for PgStore {
    async fn insert_user(&self, user: User) -> Result<()> {
        let inserted = sqlx::query(&format!(
            "INSERT INTO usuarios ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.registered_at)
        .bind(&user.created_complaints)
        .bind(&user.liked_complaints)
        .bind(&user.comments)
        .bind(Json(&user.settings))
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                let message = match e.constraint() {
                    Some("usuarios_username_key") => "El nombre de usuario ya está en uso",
                    _ => "El email ya está registrado",
                };
                Err(DomainError::Conflict(message.to_string()))
            }
            Err(e) => Err(db_err(e)),
        }
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM usuarios WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_login(&self, identifier: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM usuarios \
             WHERE lower(email) = lower($1) OR username = $1 \
             ORDER BY (lower(email) = lower($1)) DESC LIMIT 1"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn apply_activity(&self, id: Uuid, activity: UserActivity) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let Some(mut user) = Self::lock_user(&mut tx, id).await? else {
            return Ok(false);
        };
        user.apply(activity);
        Self::store_user_lists(&mut tx, &user).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn update_settings(&self, id: Uuid, patch: SettingsPatch) -> Result<Option<User>> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let Some(mut user) = Self::lock_user(&mut tx, id).await? else {
            return Ok(None);
        };
        user.update_settings(patch);
        Self::store_user_lists(&mut tx, &user).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(Some(user))
    }
}

#[async_trait]
impl CredentialRepo for PgStore {
    async fn set_password_hash(&self, user_id: Uuid, hash: String) -> Result<()> {
        sqlx::query(
            "INSERT INTO credenciales (user_id, password_hash) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET password_hash = EXCLUDED.password_hash",
        )
        .bind(user_id)
        .bind(hash)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT password_hash FROM credenciales WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }
}
