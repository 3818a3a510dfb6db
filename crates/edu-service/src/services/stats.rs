//! Public platform statistics

use tracing::instrument;

use crate::dto::StatsResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct StatsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StatsService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn platform(&self) -> ServiceResult<StatsResponse> {
        let counts = self.ctx.stats_repo().counts().await?;
        Ok(StatsResponse::from(counts))
    }
}
