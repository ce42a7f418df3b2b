// File: selectbot-core/src/repositories/postgres/channels.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use selectbot_common::error::Error;
use selectbot_common::models::channel::Channel;
use selectbot_common::traits::repository_traits::ChannelRepository;

pub struct PostgresChannelRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresChannelRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepository for PostgresChannelRepository {
    async fn get_channel_by_id(&self, channel_id: i64) -> Result<Option<Channel>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT
                channel_id,
                channel_name,
                admin_id,
                link
            FROM channels
            WHERE channel_id = $1
            "#,
        )
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(r) = row_opt {
            Ok(Some(Channel {
                id: r.try_get("channel_id")?,
                channel_name: r.try_get("channel_name")?,
                admin: r.try_get("admin_id")?,
                link: r.try_get("link")?,
            }))
        } else {
            Ok(None)
        }
    }
}
