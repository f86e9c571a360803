//! Player profile aggregation.
//!
//! The account lookup is the only hard dependency: if it fails the whole
//! request fails with the upstream status. Everything keyed off the puuid is
//! fetched concurrently and degrades to `null` or `[]` on failure.

use crate::backend::BackendClient;
use crate::batch::{BatchSettings, fetch_in_batches};
use crate::config::Config;
use crate::errors::{GatewayError, UpstreamError};
use crate::matches::{MatchPage, MatchWindow};
use crate::model::{Account, ChallengesEnvelope, ClashData, ProfileEnvelope, Summoner};
use crate::regions::{Regions, ResolvedRegion};
use crate::retry::RetryPolicy;
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

#[derive(Clone, Debug)]
pub struct ProfileAggregator {
    backend: BackendClient,
    regions: Regions,
    batch: BatchSettings,
}

impl ProfileAggregator {
    pub fn new(backend: BackendClient, regions: Regions, batch: BatchSettings) -> Self {
        Self {
            backend,
            regions,
            batch,
        }
    }

    /// Fails when no backend URL is configured.
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let backend = &config.backend;
        let url = backend
            .url
            .clone()
            .ok_or(GatewayError::BackendNotConfigured)?;
        let retry = RetryPolicy::new(&backend.retry, backend.data_timeout());
        let batch = BatchSettings {
            size: backend.match_batch.size,
            delay: Duration::from_millis(backend.match_batch.delay_ms),
        };
        let regions = Regions::new(&config.regions);
        tracing::debug!(
            regions = ?regions.names().collect::<Vec<_>>(),
            batch_size = batch.size,
            "profile aggregator configured"
        );
        Ok(Self::new(BackendClient::new(url, retry), regions, batch))
    }

    pub fn backend_url(&self) -> &Url {
        self.backend.base_url()
    }

    /// Builds the full profile envelope for a Riot ID.
    pub async fn profile(
        &self,
        game_name: &str,
        tag_line: &str,
        region: Option<&str>,
        window: MatchWindow,
    ) -> Result<ProfileEnvelope, GatewayError> {
        let started = Instant::now();
        let resolved = self.regions.resolve(region);
        tracing::info!(
            game_name,
            tag_line,
            region = %resolved.region,
            platform = %resolved.platform,
            "building profile"
        );

        let account = self.resolve_account(game_name, tag_line, &resolved).await?;
        let puuid = account.puuid.as_str();
        let platform = resolved.platform.as_str();

        let (summoner, match_ids, mastery, league, challenges) = tokio::join!(
            self.backend.summoner_by_puuid(puuid, platform),
            self.backend
                .match_ids(puuid, &resolved.region, window.upstream_count()),
            self.backend.champion_mastery(puuid, platform),
            self.backend.league_entries(puuid, platform),
            self.backend.challenges(puuid, platform),
        );

        let summoner = soft("summoner", summoner);
        let slice = window.select(soft("match_ids", match_ids).unwrap_or_default());

        let (matches, clash) = tokio::join!(
            self.match_details(&slice.ids, &resolved.region),
            self.clash(summoner.as_ref(), platform),
        );
        let page = MatchPage::new(&window, &slice, matches);

        tracing::info!(
            puuid,
            matches = page.matches.len(),
            has_more = page.has_more,
            clash = clash.is_some(),
            duration_ms = started.elapsed().as_millis() as u64,
            "profile built"
        );

        Ok(ProfileEnvelope {
            account,
            summoner,
            matches: page.matches,
            has_more: page.has_more,
            total_fetched: page.total_fetched,
            champion_mastery: soft("champion_mastery", mastery).unwrap_or_default(),
            league_entries: soft("league_entries", league).unwrap_or_default(),
            challenges: soft("challenges", challenges),
            clash,
            region: resolved,
        })
    }

    /// One page of match history. A failed match ID lookup fails the request
    /// here, unlike in [`ProfileAggregator::profile`].
    pub async fn match_page(
        &self,
        game_name: &str,
        tag_line: &str,
        region: Option<&str>,
        window: MatchWindow,
    ) -> Result<MatchPage, GatewayError> {
        let resolved = self.regions.resolve(region);
        let account = self.resolve_account(game_name, tag_line, &resolved).await?;

        let ids = self
            .backend
            .match_ids(&account.puuid, &resolved.region, window.upstream_count())
            .await
            .map_err(GatewayError::Upstream)?;
        let slice = window.select(ids);
        if slice.ids.is_empty() {
            tracing::debug!(puuid = %account.puuid, start = window.start, "no matches in window");
            return Ok(MatchPage::empty(&window));
        }

        let matches = self.match_details(&slice.ids, &resolved.region).await;
        Ok(MatchPage::new(&window, &slice, matches))
    }

    pub async fn challenges(
        &self,
        game_name: &str,
        tag_line: &str,
        region: Option<&str>,
    ) -> Result<ChallengesEnvelope, GatewayError> {
        let resolved = self.regions.resolve(region);
        let account = self.resolve_account(game_name, tag_line, &resolved).await?;
        let challenges = self
            .backend
            .challenges(&account.puuid, &resolved.platform)
            .await
            .map_err(GatewayError::Upstream)?;

        Ok(ChallengesEnvelope {
            account,
            challenges,
            region: resolved,
        })
    }

    pub async fn champion_mastery(
        &self,
        puuid: &str,
        region: Option<&str>,
    ) -> Result<Vec<Value>, GatewayError> {
        let resolved = self.regions.resolve(region);
        self.backend
            .champion_mastery(puuid, &resolved.platform)
            .await
            .map_err(GatewayError::Upstream)
    }

    pub async fn league_entries(
        &self,
        puuid: &str,
        region: Option<&str>,
    ) -> Result<Vec<Value>, GatewayError> {
        let resolved = self.regions.resolve(region);
        self.backend
            .league_entries(puuid, &resolved.platform)
            .await
            .map_err(GatewayError::Upstream)
    }

    async fn resolve_account(
        &self,
        game_name: &str,
        tag_line: &str,
        resolved: &ResolvedRegion,
    ) -> Result<Account, GatewayError> {
        self.backend
            .account_by_riot_id(game_name, tag_line, &resolved.region)
            .await
            .map_err(|e| {
                tracing::warn!(game_name, tag_line, error = %e, "account lookup failed");
                GatewayError::AccountNotFound(e)
            })
    }

    async fn match_details(&self, ids: &[String], region: &str) -> Vec<Value> {
        if ids.is_empty() {
            return Vec::new();
        }

        let backend = self.backend.clone();
        let region = region.to_string();
        fetch_in_batches("match_detail", ids.to_vec(), &self.batch, |match_id| {
            let backend = backend.clone();
            let region = region.clone();
            async move { backend.match_detail(&match_id, &region).await }
        })
        .await
    }

    /// Registration first, tournaments only once the player is known to Clash.
    async fn clash(&self, summoner: Option<&Summoner>, platform: &str) -> Option<ClashData> {
        let summoner_id = summoner?.internal_id()?;
        let registrations = soft(
            "clash_players",
            self.backend.clash_players(summoner_id, platform).await,
        )?;
        let tournaments = soft(
            "clash_tournaments",
            self.backend.clash_tournaments(platform).await,
        )?;
        Some(ClashData {
            registrations,
            tournaments,
        })
    }
}

/// Turns an optional lookup failure into a missing value.
fn soft<T>(label: &'static str, result: Result<T, UpstreamError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::info!(endpoint = label, error = %e, "optional data unavailable");
            None
        }
    }
}
