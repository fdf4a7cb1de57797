#![allow(dead_code)]

use lotto_checker::{
    Draw, DrawRepository, PrizeTier, RULE_BACK_THREE, RULE_BACK_TWO, RULE_FRONT_THREE,
    RunningNumberRule,
};
use std::time::Duration;
use tempfile::TempDir;

/// A repository on a throwaway database; keep the `TempDir` alive for the test.
pub fn temp_repository() -> (TempDir, DrawRepository) {
    let tmp = TempDir::new().unwrap();
    let repository = DrawRepository::new(tmp.path().join("lottery.db"), Duration::from_secs(5));
    // Create the file and switch it to WAL before any test spawns writers.
    repository.list_draws().unwrap();
    (tmp, repository)
}

pub fn tier(id: &str, name: &str, reward: &str, numbers: &[&str]) -> PrizeTier {
    PrizeTier {
        id: id.to_string(),
        name: name.to_string(),
        reward: reward.to_string(),
        amount: numbers.len() as i64,
        number: numbers.iter().map(|n| n.to_string()).collect(),
    }
}

pub fn rule(id: &str, name: &str, reward: &str, numbers: &[&str]) -> RunningNumberRule {
    RunningNumberRule {
        id: id.to_string(),
        name: name.to_string(),
        reward: reward.to_string(),
        amount: numbers.len() as i64,
        number: numbers.iter().map(|n| n.to_string()).collect(),
    }
}

pub fn sample_draw() -> Draw {
    Draw {
        date: "1 ตุลาคม 2568".to_string(),
        endpoint: "https://lotto.api.rayriffy.com/lotto/01102568".to_string(),
        prizes: vec![
            tier("prizeFirst", "รางวัลที่ 1", "6000000", &["876978"]),
            tier("prizeFirstNear", "รางวัลข้างเคียงรางวัลที่ 1", "100000", &["876977", "876979"]),
            tier("prizeSecond", "รางวัลที่ 2", "200000", &["554012", "100743", "939475", "329417", "687320"]),
        ],
        running_numbers: vec![
            rule(RULE_FRONT_THREE, "รางวัลเลขหน้า 3 ตัว", "4000", &["148", "710"]),
            rule(RULE_BACK_THREE, "รางวัลเลขท้าย 3 ตัว", "4000", &["293", "580"]),
            rule(RULE_BACK_TWO, "รางวัลเลขท้าย 2 ตัว", "2000", &["20"]),
        ],
    }
}

pub fn other_draw() -> Draw {
    Draw {
        date: "16 ตุลาคม 2568".to_string(),
        endpoint: "https://lotto.api.rayriffy.com/lotto/16102568".to_string(),
        prizes: vec![tier("prizeFirst", "รางวัลที่ 1", "6000000", &["111111"])],
        running_numbers: vec![rule(RULE_BACK_TWO, "รางวัลเลขท้าย 2 ตัว", "2000", &["11"])],
    }
}

pub fn incomplete_draw() -> Draw {
    Draw {
        date: "1 พฤศจิกายน 2568".to_string(),
        endpoint: "https://lotto.api.rayriffy.com/lotto/01112568".to_string(),
        prizes: vec![
            tier("prizeFirst", "รางวัลที่ 1", "6000000", &["xxxxxx"]),
            tier(
                "prizeSecond",
                "รางวัลที่ 2",
                "200000",
                &["xxxxxx", "xxxxxx", "xxxxxx", "xxxxxx", "xxxxxx"],
            ),
        ],
        running_numbers: vec![
            rule(RULE_FRONT_THREE, "รางวัลเลขหน้า 3 ตัว", "4000", &["xxx", "xxx"]),
            rule(RULE_BACK_TWO, "รางวัลเลขท้าย 2 ตัว", "2000", &["xx"]),
        ],
    }
}
