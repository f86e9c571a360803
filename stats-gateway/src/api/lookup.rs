use crate::ResponseBody;
use crate::aggregator::ProfileAggregator;
use crate::api::utils::json_ok;
use crate::api::{GatewayRequest, Handler};
use crate::errors::GatewayError;
use async_trait::async_trait;
use hyper::Response;

/// `GET /api/challenges/{gameName}/{tagLine}`
pub struct ChallengesHandler {
    pub aggregator: ProfileAggregator,
}

#[async_trait]
impl Handler for ChallengesHandler {
    fn name(&self) -> &'static str {
        "challenges"
    }

    async fn handle(&self, request: GatewayRequest) -> Result<Response<ResponseBody>, GatewayError> {
        let envelope = self
            .aggregator
            .challenges(
                request.param("gameName")?,
                request.param("tagLine")?,
                request.query("region"),
            )
            .await?;
        json_ok(&envelope)
    }
}

/// `GET /api/champion-mastery?puuid=&region=`
pub struct MasteryHandler {
    pub aggregator: ProfileAggregator,
}

#[async_trait]
impl Handler for MasteryHandler {
    fn name(&self) -> &'static str {
        "champion_mastery"
    }

    async fn handle(&self, request: GatewayRequest) -> Result<Response<ResponseBody>, GatewayError> {
        let puuid = request.required_query("puuid")?;
        let mastery = self
            .aggregator
            .champion_mastery(puuid, request.query("region"))
            .await?;
        json_ok(&mastery)
    }
}

/// `GET /api/league?puuid=&region=`
pub struct LeagueHandler {
    pub aggregator: ProfileAggregator,
}

#[async_trait]
impl Handler for LeagueHandler {
    fn name(&self) -> &'static str {
        "league"
    }

    async fn handle(&self, request: GatewayRequest) -> Result<Response<ResponseBody>, GatewayError> {
        let puuid = request.required_query("puuid")?;
        let entries = self
            .aggregator
            .league_entries(puuid, request.query("region"))
            .await?;
        json_ok(&entries)
    }
}
