use sqlx::PgPool;
use tracing::{debug, info, warn};

use super::{conflict_on_unique, ServiceError, ServiceResult};
use crate::auth::{hash_password, refresh_token_digest, verify_password, AuthError, TokenKind, TokenPair, TokenService};
use crate::database::models::{NewUser, RelatedActivity, User, UserFull, UserPatch, UserView};
use crate::database::Repository;

const USERNAME_TAKEN: &str = "Username already registered";

pub struct UserService {
    pool: PgPool,
    users: Repository<User>,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: Repository::new("users", "User", pool.clone()),
            pool,
        }
    }

    pub async fn register(&self, new: NewUser) -> ServiceResult<UserView> {
        let password = hash_password(&new.password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, username, chat_id, password, nick)
             VALUES ($1, $2, $3, $4, COALESCE($5, ''))
             RETURNING *",
        )
        .bind(&new.name)
        .bind(&new.username)
        .bind(&new.chat_id)
        .bind(&password)
        .bind(&new.nick)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, USERNAME_TAKEN))?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(UserView::from(&user))
    }

    /// Verify credentials and start a session with a fresh token pair
    pub async fn login(&self, tokens: &TokenService, username: &str, password: &str) -> ServiceResult<TokenPair> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        let user = match user {
            Some(user) if verify_password(password, &user.password) => user,
            _ => {
                warn!("Failed login for '{}'", username);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let pair = tokens.issue_pair(&user)?;
        self.store_refresh_digest(user.id, Some(&refresh_token_digest(&pair.refresh_token)))
            .await?;

        debug!("User {} logged in", user.username);
        Ok(pair)
    }

    /// Exchange a refresh token for a new pair. The presented token stops working.
    pub async fn refresh(&self, tokens: &TokenService, refresh_token: &str) -> ServiceResult<TokenPair> {
        let claims = tokens.decode(refresh_token, TokenKind::Refresh)?;

        let user = match self.users.select_one(claims.uid).await? {
            Some(user) if user.username == claims.sub => user,
            _ => return Err(AuthError::UnknownUser.into()),
        };

        let pair = tokens.issue_pair(&user)?;

        // Compare-and-swap so two concurrent refreshes cannot both succeed
        let rotated = sqlx::query(
            "UPDATE users SET refresh_token_hash = $1, updated_at = now()
             WHERE id = $2 AND refresh_token_hash = $3",
        )
        .bind(refresh_token_digest(&pair.refresh_token))
        .bind(user.id)
        .bind(refresh_token_digest(refresh_token))
        .execute(&self.pool)
        .await?;

        if rotated.rows_affected() == 0 {
            warn!("Rejected stale refresh token for user {}", user.username);
            return Err(AuthError::RevokedToken.into());
        }

        Ok(pair)
    }

    pub async fn logout(&self, user_id: i32) -> ServiceResult<()> {
        self.store_refresh_digest(user_id, None).await
    }

    async fn store_refresh_digest(&self, user_id: i32, digest: Option<&str>) -> ServiceResult<()> {
        sqlx::query("UPDATE users SET refresh_token_hash = $1, updated_at = now() WHERE id = $2")
            .bind(digest)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// User with profile activities and friends
    pub async fn get_full(&self, id: i32) -> ServiceResult<UserFull> {
        let user = self.users.select_404(id).await?;

        let activities = sqlx::query_as::<_, RelatedActivity>(
            "SELECT a.id, a.name
             FROM user_activities ua
             JOIN activities a ON a.id = ua.activity_id
             WHERE ua.user_id = $1
             ORDER BY a.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(UserFull {
            user: UserView::from(&user),
            activities,
            friends: self.friends(id).await?,
        })
    }

    pub async fn update(&self, current_id: i32, id: i32, mut patch: UserPatch) -> ServiceResult<UserView> {
        if current_id != id {
            return Err(ServiceError::Forbidden("Users can only update themselves".into()));
        }

        let mut user = self.users.select_404(id).await?;
        if let Some(password) = patch.password.take() {
            patch.password = Some(hash_password(&password)?);
        }
        patch.apply(&mut user);

        let user = sqlx::query_as::<_, User>(
            "UPDATE users
             SET name = $1, username = $2, chat_id = $3, password = $4, nick = $5, updated_at = now()
             WHERE id = $6
             RETURNING *",
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.chat_id)
        .bind(&user.password)
        .bind(&user.nick)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, USERNAME_TAKEN))?;

        Ok(UserView::from(&user))
    }

    pub async fn delete(&self, current_id: i32, id: i32) -> ServiceResult<()> {
        if current_id != id {
            return Err(ServiceError::Forbidden("Users can only delete themselves".into()));
        }
        if !self.users.delete_one(id).await? {
            return Err(ServiceError::NotFound(format!("User {id} not found")));
        }
        info!("Deleted user {}", id);
        Ok(())
    }

    pub async fn friends(&self, user_id: i32) -> ServiceResult<Vec<UserView>> {
        let friends = sqlx::query_as::<_, UserView>(
            "SELECT u.id, u.name, u.username, u.chat_id, u.nick
             FROM user_friends f
             JOIN users u ON u.id = f.friend_id
             WHERE f.user_id = $1
             ORDER BY u.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(friends)
    }

    /// Friendship is stored in both directions
    pub async fn add_friend(&self, user_id: i32, friend_id: i32) -> ServiceResult<UserView> {
        if user_id == friend_id {
            return Err(ServiceError::BadRequest("Cannot add yourself as a friend".into()));
        }
        let friend = self.users.select_404(friend_id).await?;

        let mut tx = self.pool.begin().await?;
        for (a, b) in [(user_id, friend_id), (friend_id, user_id)] {
            sqlx::query("INSERT INTO user_friends (user_id, friend_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(a)
                .bind(b)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(UserView::from(&friend))
    }

    pub async fn remove_friend(&self, user_id: i32, friend_id: i32) -> ServiceResult<()> {
        let removed = sqlx::query(
            "DELETE FROM user_friends
             WHERE (user_id = $1 AND friend_id = $2) OR (user_id = $2 AND friend_id = $1)",
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&self.pool)
        .await?;

        if removed.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("User {friend_id} is not a friend")));
        }
        Ok(())
    }
}
