use serde::{Deserialize, Serialize};

pub const RULE_FRONT_THREE: &str = "runningNumberFrontThree";
pub const RULE_BACK_THREE: &str = "runningNumberBackThree";
pub const RULE_BACK_TWO: &str = "runningNumberBackTwo";

/// Width of a full ticket / prize tier number.
pub const TICKET_WIDTH: usize = 6;

/// One lottery drawing as produced by the draw source.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Draw {
    pub date: String,
    pub endpoint: String,
    pub prizes: Vec<PrizeTier>,
    pub running_numbers: Vec<RunningNumberRule>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PrizeTier {
    pub id: String,
    pub name: String,
    pub reward: String,
    pub amount: i64,
    pub number: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RunningNumberRule {
    pub id: String,
    pub name: String,
    pub reward: String,
    pub amount: i64,
    pub number: Vec<String>,
}

/// Which slice of a ticket a running-number rule compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    FrontThree,
    BackThree,
    BackTwo,
}

impl RuleKind {
    /// Unrecognized rule ids map to `None` and never match anything.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            RULE_FRONT_THREE => Some(RuleKind::FrontThree),
            RULE_BACK_THREE => Some(RuleKind::BackThree),
            RULE_BACK_TWO => Some(RuleKind::BackTwo),
            _ => None,
        }
    }

    /// Character range of the ticket this rule looks at, as (skip, take).
    pub fn window(self) -> (usize, usize) {
        match self {
            RuleKind::FrontThree => (0, 3),
            RuleKind::BackThree => (3, 3),
            RuleKind::BackTwo => (4, 2),
        }
    }

    pub fn width(self) -> usize {
        self.window().1
    }

    pub fn match_type(self) -> MatchType {
        match self {
            RuleKind::FrontThree => MatchType::Front3,
            RuleKind::BackThree => MatchType::Back3,
            RuleKind::BackTwo => MatchType::Back2,
        }
    }
}

impl RunningNumberRule {
    pub fn kind(&self) -> Option<RuleKind> {
        RuleKind::from_id(&self.id)
    }
}

impl Draw {
    /// A draw is incomplete while any prize number still carries the `x` placeholder.
    pub fn is_incomplete(&self) -> bool {
        self.prizes
            .iter()
            .any(|prize| prize.number.iter().any(|n| n.to_lowercase().contains('x')))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Full,
    Front3,
    Back3,
    Back2,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrizeMatch {
    pub prize_id: String,
    pub prize_name: String,
    pub reward: String,
    pub matched_number: String,
    pub match_type: MatchType,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub ticket_number: String,
    pub is_winner: bool,
    pub matches: Vec<PrizeMatch>,
    pub total_reward: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub draw_date: String,
    pub results: Vec<CheckResult>,
}

/// Entry of the draw source listing.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DrawSummary {
    pub id: String,
    pub url: String,
    pub date: String,
}

/// `{status, response}` wrapper the draw source puts around every payload.
#[derive(Deserialize, Debug)]
pub struct SourceEnvelope<T> {
    pub status: String,
    pub response: Option<T>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DrawRecord {
    pub id: i64,
    pub draw_id: String,
    pub draw_date: String,
    pub endpoint: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A stored draw header together with its reconstructed aggregate.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoredDraw {
    pub record: DrawRecord,
    pub draw: Draw,
}
