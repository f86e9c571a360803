use crate::regions::ResolvedRegion;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Riot account, resolved from a Riot ID.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
}

/// Summoner record. Only the fields the gateway reads are typed, the rest
/// is passed through untouched.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summoner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summoner_level: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_icon_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Summoner {
    /// The platform-internal summoner ID, needed for Clash lookups.
    pub fn internal_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClashData {
    pub registrations: Value,
    pub tournaments: Value,
}

/// Aggregated player profile returned by the profile route.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEnvelope {
    pub account: Account,
    pub summoner: Option<Summoner>,
    pub matches: Vec<Value>,
    pub has_more: bool,
    pub total_fetched: usize,
    pub champion_mastery: Vec<Value>,
    pub league_entries: Vec<Value>,
    pub challenges: Option<Value>,
    pub clash: Option<ClashData>,
    #[serde(flatten)]
    pub region: ResolvedRegion,
}

/// Response of the challenges route.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengesEnvelope {
    pub account: Account,
    pub challenges: Value,
    #[serde(flatten)]
    pub region: ResolvedRegion,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summoner_keeps_unknown_fields() {
        let summoner: Summoner = serde_json::from_value(json!({
            "id": "enc-id",
            "puuid": "p-1",
            "summonerLevel": 412,
            "profileIconId": 29,
            "revisionDate": 1700000000000u64
        }))
        .unwrap();

        assert_eq!(summoner.internal_id(), Some("enc-id"));
        assert_eq!(summoner.summoner_level, Some(412));
        assert_eq!(
            serde_json::to_value(&summoner).unwrap()["revisionDate"],
            1700000000000u64
        );
    }

    #[test]
    fn test_summoner_without_id() {
        let summoner: Summoner = serde_json::from_value(json!({"id": " "})).unwrap();
        assert_eq!(summoner.internal_id(), None);
        let summoner: Summoner = serde_json::from_value(json!({"puuid": "p-1"})).unwrap();
        assert_eq!(summoner.internal_id(), None);
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = ProfileEnvelope {
            account: Account {
                puuid: "p-1".into(),
                game_name: "Faker".into(),
                tag_line: "KR1".into(),
            },
            summoner: None,
            matches: vec![],
            has_more: false,
            total_fetched: 0,
            champion_mastery: vec![],
            league_entries: vec![],
            challenges: None,
            clash: None,
            region: ResolvedRegion {
                region: "asia".into(),
                platform: "kr".into(),
            },
        };

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "account": {"puuid": "p-1", "gameName": "Faker", "tagLine": "KR1"},
                "summoner": null,
                "matches": [],
                "hasMore": false,
                "totalFetched": 0,
                "championMastery": [],
                "leagueEntries": [],
                "challenges": null,
                "clash": null,
                "region": "asia",
                "platform": "kr"
            })
        );
    }
}
