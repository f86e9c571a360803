use crate::ResponseBody;
use crate::ai::{AiForwarder, DashboardInsights, InsightsJob};
use crate::api::{GatewayRequest, Handler};
use crate::errors::GatewayError;
use async_trait::async_trait;
use hyper::Response;

/// What to check in a successful backend response before relaying it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadCheck {
    /// Stream the body through as is
    None,
    Insights,
    Job,
}

/// Forwards one AI route to the backend.
pub struct AiHandler {
    pub name: &'static str,
    pub forwarder: AiForwarder,
    pub check: PayloadCheck,
}

#[async_trait]
impl Handler for AiHandler {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(&self, request: GatewayRequest) -> Result<Response<ResponseBody>, GatewayError> {
        let GatewayRequest { parts, body, .. } = request;
        match self.check {
            PayloadCheck::None => self.forwarder.stream(&parts, body).await,
            PayloadCheck::Insights => {
                self.forwarder
                    .validated::<DashboardInsights>(&parts, body)
                    .await
            }
            PayloadCheck::Job => self.forwarder.validated::<InsightsJob>(&parts, body).await,
        }
    }
}
