//! Podium Core - Leaderboard Types
//!
//! Pure data structures shared by every other crate: timespans, player ids,
//! leaderboard requests and responses, bucket identities and the error
//! taxonomy. No I/O lives here.

mod bucket;
mod clock;
mod error;

pub use bucket::{
    current_bucket_identities, period_label, BucketId, BucketIdentities, DEFAULT_STORE_NAME,
};
pub use clock::{Clock, SystemClock};
pub use error::{
    ConfigError, ErrorKind, PodiumError, PodiumResult, ProviderError, StoreError, ValidationError,
};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Score value held by the ordered store. Ordered stores only hold integers.
pub type Score = i64;

// ============================================================================
// TIMESPAN
// ============================================================================

/// Leaderboard timespan; decides which bucket a score lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timespan {
    Daily,
    Weekly,
    Monthly,
    AllTime,
}

impl Timespan {
    pub const ALL: [Timespan; 4] = [
        Timespan::Daily,
        Timespan::Weekly,
        Timespan::Monthly,
        Timespan::AllTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timespan::Daily => "daily",
            Timespan::Weekly => "weekly",
            Timespan::Monthly => "monthly",
            Timespan::AllTime => "alltime",
        }
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timespan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Timespan::Daily),
            "weekly" => Ok(Timespan::Weekly),
            "monthly" => Ok(Timespan::Monthly),
            "alltime" => Ok(Timespan::AllTime),
            other => Err(ValidationError::UnknownTimespan {
                value: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// PLAYER IDENTITY
// ============================================================================

/// Player identifier. Stored in the score store as its decimal string.
///
/// Signed: local test sessions hand out negative ids (-1, -2, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(i64);

impl PlayerId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    /// The key this player is stored under.
    pub fn store_key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(PlayerId)
    }
}

impl From<i64> for PlayerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ============================================================================
// REQUEST / RESPONSE
// ============================================================================

/// Leaderboard request as it arrives from a caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRequest {
    pub timespan: String,
    #[serde(deserialize_with = "whole_number")]
    pub num_players: i64,
}

impl LeaderboardRequest {
    pub fn new(timespan: impl Into<String>, num_players: i64) -> Self {
        Self {
            timespan: timespan.into(),
            num_players,
        }
    }

    /// Deserialize a raw JSON payload. Anything that does not fit the
    /// request shape is a `MalformedPayload`.
    ///
    /// `numPlayers` may arrive as a float (`10.0`) as long as it is whole;
    /// fractional values are malformed.
    pub fn from_json(payload: &serde_json::Value) -> Result<Self, ValidationError> {
        serde_json::from_value(payload.clone()).map_err(|e| ValidationError::MalformedPayload {
            reason: e.to_string(),
        })
    }

    /// Check the request and turn it into a typed query.
    pub fn validate(&self) -> Result<LeaderboardQuery, ValidationError> {
        let timespan = self.timespan.parse::<Timespan>()?;
        LeaderboardQuery::new(timespan, self.num_players)
    }
}

/// Accept JSON integers, and floats with no fractional part.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(D::Error::custom(format!(
            "numPlayers must be a whole number, got {}",
            number
        ))),
    }
}

/// A validated leaderboard query.
///
/// Only [`LeaderboardQuery::new`] (or [`LeaderboardRequest::validate`]) can
/// build one, so `num_players` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeaderboardQuery {
    timespan: Timespan,
    num_players: usize,
}

impl LeaderboardQuery {
    pub fn new(timespan: Timespan, num_players: i64) -> Result<Self, ValidationError> {
        if num_players < 1 {
            return Err(ValidationError::NonPositivePlayers { value: num_players });
        }
        let num_players = usize::try_from(num_players).map_err(|_| {
            ValidationError::MalformedPayload {
                reason: format!("numPlayers {} does not fit this platform", num_players),
            }
        })?;
        Ok(Self {
            timespan,
            num_players,
        })
    }

    pub fn timespan(&self) -> Timespan {
        self.timespan
    }

    pub fn num_players(&self) -> usize {
        self.num_players
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub score: Score,
}

/// Ordered leaderboard, highest score first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub scores: Vec<ScoreEntry>,
}

impl LeaderboardResponse {
    pub fn new(scores: Vec<ScoreEntry>) -> Self {
        Self { scores }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn is_sorted_descending(&self) -> bool {
        self.scores.windows(2).all(|w| w[0].score >= w[1].score)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_timespan_roundtrip_names() {
        for timespan in Timespan::ALL {
            assert_eq!(timespan.as_str().parse::<Timespan>().unwrap(), timespan);
        }
        assert_eq!(serde_json::to_value(Timespan::AllTime).unwrap(), json!("alltime"));
    }

    #[test]
    fn test_timespan_rejects_unknown() {
        let err = "Daily".parse::<Timespan>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownTimespan {
                value: "Daily".to_string()
            }
        );
    }

    #[test]
    fn test_player_id_store_key() {
        let id = PlayerId::new(14_901_247_091);
        assert_eq!(id.store_key(), "14901247091");
        assert_eq!("14901247091".parse::<PlayerId>().unwrap(), id);
        assert!("player".parse::<PlayerId>().is_err());
    }

    #[test]
    fn test_negative_player_ids() {
        let id = PlayerId::new(-1);
        assert_eq!(id.store_key(), "-1");
        assert_eq!("-1".parse::<PlayerId>().unwrap(), id);
        assert_eq!("-42".parse::<PlayerId>().unwrap().get(), -42);
        assert_eq!(serde_json::to_value(id).unwrap(), json!(-1));
    }

    #[test]
    fn test_request_validate_ok() {
        let query = LeaderboardRequest::new("weekly", 25).validate().unwrap();
        assert_eq!(query.timespan(), Timespan::Weekly);
        assert_eq!(query.num_players(), 25);
    }

    #[test]
    fn test_request_validate_rejects_zero_and_negative() {
        for n in [0, -1, i64::MIN] {
            let err = LeaderboardRequest::new("daily", n).validate().unwrap_err();
            assert_eq!(err, ValidationError::NonPositivePlayers { value: n });
        }
    }

    #[test]
    fn test_request_from_json_camel_case() {
        let request =
            LeaderboardRequest::from_json(&json!({"timespan": "monthly", "numPlayers": 3}))
                .unwrap();
        assert_eq!(request, LeaderboardRequest::new("monthly", 3));
    }

    #[test]
    fn test_request_from_json_malformed() {
        let payloads = [
            json!({"timespan": "daily"}),
            json!({"timespan": "daily", "numPlayers": 2.5}),
            json!({"timespan": "daily", "numPlayers": 1e300}),
            json!({"timespan": "daily", "numPlayers": "ten"}),
            json!({"timespan": 7, "numPlayers": 10}),
            json!("daily"),
        ];
        for payload in payloads {
            let err = LeaderboardRequest::from_json(&payload).unwrap_err();
            assert!(
                matches!(err, ValidationError::MalformedPayload { .. }),
                "{payload} should be malformed"
            );
        }
    }

    #[test]
    fn test_request_from_json_accepts_whole_floats() {
        let request =
            LeaderboardRequest::from_json(&json!({"timespan": "daily", "numPlayers": 10.0}))
                .unwrap();
        assert_eq!(request, LeaderboardRequest::new("daily", 10));
        assert_eq!(request.validate().unwrap().num_players(), 10);

        // Whole but not positive still fails validation, not parsing.
        let request =
            LeaderboardRequest::from_json(&json!({"timespan": "daily", "numPlayers": -3.0}))
                .unwrap();
        assert_eq!(
            request.validate().unwrap_err(),
            ValidationError::NonPositivePlayers { value: -3 }
        );
    }

    #[test]
    fn test_query_only_built_through_validation() {
        assert_eq!(
            LeaderboardQuery::new(Timespan::Daily, 0).unwrap_err(),
            ValidationError::NonPositivePlayers { value: 0 }
        );
        let query = LeaderboardQuery::new(Timespan::Monthly, 4).unwrap();
        assert_eq!(query.timespan(), Timespan::Monthly);
        assert_eq!(query.num_players(), 4);
    }

    #[test]
    fn test_response_serializes_player_id_camel_case() {
        let response = LeaderboardResponse::new(vec![ScoreEntry {
            player_id: PlayerId::new(64624),
            score: 87,
        }]);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"scores": [{"playerId": 64624, "score": 87}]})
        );
    }

    #[test]
    fn test_response_sorted_descending() {
        let entry = |id, score| ScoreEntry {
            player_id: PlayerId::new(id),
            score,
        };
        assert!(LeaderboardResponse::default().is_sorted_descending());
        assert!(LeaderboardResponse::new(vec![entry(1, 9), entry(2, 9), entry(3, 1)])
            .is_sorted_descending());
        assert!(!LeaderboardResponse::new(vec![entry(1, 1), entry(2, 9)]).is_sorted_descending());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any name outside the four timespans is rejected.
        #[test]
        fn prop_unknown_timespan_rejected(name in "[a-z]{1,12}") {
            prop_assume!(!["daily", "weekly", "monthly", "alltime"].contains(&name.as_str()));
            let result = LeaderboardRequest::new(name, 10).validate();
            let is_unknown_timespan = matches!(result, Err(ValidationError::UnknownTimespan { .. }));
            prop_assert!(is_unknown_timespan);
        }

        /// Every positive count validates and is preserved.
        #[test]
        fn prop_positive_counts_accepted(n in 1i64..100_000) {
            let query = LeaderboardRequest::new("alltime", n).validate().unwrap();
            prop_assert_eq!(query.num_players() as i64, n);
        }
    }
}
