use crate::ResponseBody;
use crate::aggregator::ProfileAggregator;
use crate::api::utils::{json_ok, match_window};
use crate::api::{GatewayRequest, Handler};
use crate::errors::GatewayError;
use async_trait::async_trait;
use hyper::Response;

/// `GET /api/player/{gameName}/{tagLine}`: the aggregated profile.
pub struct ProfileHandler {
    pub aggregator: ProfileAggregator,
}

#[async_trait]
impl Handler for ProfileHandler {
    fn name(&self) -> &'static str {
        "profile"
    }

    async fn handle(&self, request: GatewayRequest) -> Result<Response<ResponseBody>, GatewayError> {
        let game_name = request.param("gameName")?;
        let tag_line = request.param("tagLine")?;
        let window = match_window(request.query("start"), request.query("count"))?;

        let envelope = self
            .aggregator
            .profile(game_name, tag_line, request.query("region"), window)
            .await?;
        json_ok(&envelope)
    }
}

/// `GET /api/player/{gameName}/{tagLine}/matches`: one page of match history.
pub struct MatchPageHandler {
    pub aggregator: ProfileAggregator,
}

#[async_trait]
impl Handler for MatchPageHandler {
    fn name(&self) -> &'static str {
        "match_page"
    }

    async fn handle(&self, request: GatewayRequest) -> Result<Response<ResponseBody>, GatewayError> {
        let game_name = request.param("gameName")?;
        let tag_line = request.param("tagLine")?;
        let window = match_window(request.query("start"), request.query("count"))?;

        let page = self
            .aggregator
            .match_page(game_name, tag_line, request.query("region"), window)
            .await?;
        json_ok(&page)
    }
}
