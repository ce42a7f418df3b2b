pub mod postgres;

pub use postgres::{
    PostgresChannelRepository, PostgresGiveawayRepository, PostgresSchedulerJobRepository,
    PostgresWinnerStatsRepository,
};
