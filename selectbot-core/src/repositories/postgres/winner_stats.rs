// File: selectbot-core/src/repositories/postgres/winner_stats.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use selectbot_common::error::Error;
use selectbot_common::models::giveaway::GiveawayMember;
use selectbot_common::traits::repository_traits::WinnerStatsRepository;

pub struct PostgresWinnerStatsRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresWinnerStatsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WinnerStatsRepository for PostgresWinnerStatsRepository {
    async fn update_winners_stats(&self, winners: &[GiveawayMember]) -> Result<(), Error> {
        for winner in winners {
            sqlx::query(
                r#"
                INSERT INTO winner_stats (user_id, user_name, wins)
                VALUES ($1, $2, 1)
                ON CONFLICT (user_id)
                DO UPDATE SET
                  wins = winner_stats.wins + 1,
                  user_name = EXCLUDED.user_name
                "#,
            )
            .bind(winner.id)
            .bind(&winner.name)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}
