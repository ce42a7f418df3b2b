// File: selectbot-core/src/repositories/postgres/giveaways.rs

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};

use selectbot_common::error::Error;
use selectbot_common::models::giveaway::{Deadline, Giveaway, GiveawayMember, GiveawayStatus};
use selectbot_common::traits::repository_traits::GiveawayRepository;

pub struct PostgresGiveawayRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresGiveawayRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_giveaway(r: &sqlx::postgres::PgRow) -> Result<Giveaway, Error> {
    let status_str: String = r.try_get("status")?;
    let status = GiveawayStatus::from_str(&status_str)
        .ok_or_else(|| Error::Parse(format!("unknown giveaway status '{status_str}'")))?;

    let channels: Json<Vec<i64>> = r.try_get("channels")?;
    let members: Json<Vec<GiveawayMember>> = r.try_get("members")?;
    let winners: Json<Vec<GiveawayMember>> = r.try_get("winners")?;
    let msg_ids: Json<Vec<i64>> = r.try_get("msg_ids")?;
    let deadline: Json<Deadline> = r.try_get("deadline")?;
    let winners_count: i64 = r.try_get("winners_count")?;

    Ok(Giveaway {
        id: r.try_get("giveaway_id")?,
        created: r.try_get("created")?,
        publish_time: r.try_get("publish_time")?,
        button_text: r.try_get("button_text")?,
        admin: r.try_get("admin_id")?,
        channels: channels.0,
        send_to_id: r.try_get("send_to_id")?,
        members: members.0,
        status,
        winners: winners.0,
        winners_count: winners_count as usize,
        msg_ids: msg_ids.0,
        deadline: deadline.0,
        top_msg_id: r.try_get("top_msg_id")?,
        preview_text: r.try_get("preview_text")?,
    })
}

#[async_trait]
impl GiveawayRepository for PostgresGiveawayRepository {
    async fn create_giveaway(&self, g: &Giveaway) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO giveaways (
                giveaway_id,
                created,
                publish_time,
                button_text,
                admin_id,
                channels,
                send_to_id,
                members,
                status,
                winners,
                winners_count,
                msg_ids,
                deadline,
                top_msg_id,
                preview_text
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)
            "#,
        )
        .bind(&g.id)
        .bind(g.created)
        .bind(g.publish_time)
        .bind(&g.button_text)
        .bind(g.admin)
        .bind(Json(&g.channels))
        .bind(g.send_to_id)
        .bind(Json(&g.members))
        .bind(g.status.as_str())
        .bind(Json(&g.winners))
        .bind(g.winners_count as i64)
        .bind(Json(&g.msg_ids))
        .bind(Json(&g.deadline))
        .bind(g.top_msg_id)
        .bind(&g.preview_text)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_giveaway_by_id(&self, id: &str) -> Result<Option<Giveaway>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT
                giveaway_id,
                created,
                publish_time,
                button_text,
                admin_id,
                channels,
                send_to_id,
                members,
                status,
                winners,
                winners_count,
                msg_ids,
                deadline,
                top_msg_id,
                preview_text
            FROM giveaways
            WHERE giveaway_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row_opt {
            Some(r) => Ok(Some(row_to_giveaway(&r)?)),
            None => Ok(None),
        }
    }

    async fn update_giveaway(&self, g: &Giveaway) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE giveaways
            SET
              created = $1,
              publish_time = $2,
              button_text = $3,
              admin_id = $4,
              channels = $5,
              send_to_id = $6,
              members = $7,
              status = $8,
              winners = $9,
              winners_count = $10,
              msg_ids = $11,
              deadline = $12,
              top_msg_id = $13,
              preview_text = $14
            WHERE giveaway_id = $15
            "#,
        )
        .bind(g.created)
        .bind(g.publish_time)
        .bind(&g.button_text)
        .bind(g.admin)
        .bind(Json(&g.channels))
        .bind(g.send_to_id)
        .bind(Json(&g.members))
        .bind(g.status.as_str())
        .bind(Json(&g.winners))
        .bind(g.winners_count as i64)
        .bind(Json(&g.msg_ids))
        .bind(Json(&g.deadline))
        .bind(g.top_msg_id)
        .bind(&g.preview_text)
        .bind(&g.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
