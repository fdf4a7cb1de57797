mod utils;

use lotto_checker::{MatchType, RULE_BACK_TWO, check_response, check_tickets};
use proptest::prelude::*;
use utils::{rule, sample_draw, temp_repository, tier};

#[test]
fn tickets_are_normalized() {
    let results = check_tickets(&["123", " 1 2 3 ", "1234567"], &sample_draw());
    let numbers: Vec<&str> = results.iter().map(|r| r.ticket_number.as_str()).collect();
    assert_eq!(numbers, vec!["000123", "000123", "1234567"]);
}

#[test]
fn first_prize_ticket_wins_everything_it_touches() {
    let results = check_tickets(&["876978"], &sample_draw());
    let result = &results[0];

    assert!(result.is_winner);
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].match_type, MatchType::Full);
    assert_eq!(result.matches[0].prize_id, "prizeFirst");
    assert_eq!(result.total_reward, 6_000_000);
}

#[test]
fn running_numbers_match_their_windows() {
    // front3 148, back3 293, back2 20
    let results = check_tickets(&["148293", "710000", "000020", "123456"], &sample_draw());

    let kinds = |i: usize| -> Vec<MatchType> {
        results[i].matches.iter().map(|m| m.match_type).collect()
    };
    assert_eq!(kinds(0), vec![MatchType::Front3, MatchType::Back3]);
    assert_eq!(results[0].total_reward, 8000);
    assert_eq!(kinds(1), vec![MatchType::Front3]);
    assert_eq!(kinds(2), vec![MatchType::Back2]);
    assert!(!results[3].is_winner);
}

#[test]
fn number_in_two_tiers_gives_two_matches() {
    let mut draw = sample_draw();
    draw.prizes = vec![
        tier("prizeA", "a", "1000", &["222222"]),
        tier("prizeB", "b", "500", &["222222"]),
    ];
    draw.running_numbers = vec![rule(RULE_BACK_TWO, "back two", "2000", &["56"])];

    let results = check_tickets(&["222222"], &draw);
    assert_eq!(results[0].matches.len(), 2);
    assert_ne!(results[0].matches[0].prize_id, results[0].matches[1].prize_id);
    assert_eq!(results[0].total_reward, 1500);
}

#[test]
fn checks_against_stored_draw() {
    let (_tmp, repository) = temp_repository();
    repository.save("01102568", &sample_draw()).unwrap();

    let draw = repository.get_latest().unwrap().unwrap();
    let response = check_response(&["876977", "999999"], &draw);

    assert_eq!(response.draw_date, "1 ตุลาคม 2568");
    assert_eq!(response.results[0].matches[0].prize_id, "prizeFirstNear");
    assert_eq!(response.results[0].total_reward, 100_000);
    assert!(!response.results[1].is_winner);
}

#[test]
fn response_serializes_camel_case() {
    let response = check_response(&["876978"], &sample_draw());
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["drawDate"], "1 ตุลาคม 2568");
    assert_eq!(json["results"][0]["ticketNumber"], "876978");
    assert_eq!(json["results"][0]["isWinner"], true);
    assert_eq!(json["results"][0]["totalReward"], 6_000_000);
    assert_eq!(json["results"][0]["matches"][0]["matchType"], "full");
    assert_eq!(json["results"][0]["matches"][0]["matchedNumber"], "876978");
}

proptest! {
    #[test]
    fn every_ticket_gets_a_result(tickets in proptest::collection::vec(".*", 0..20)) {
        let results = check_tickets(&tickets, &sample_draw());
        prop_assert_eq!(results.len(), tickets.len());
        for result in &results {
            prop_assert!(result.ticket_number.chars().count() >= 6);
            prop_assert!(!result.ticket_number.chars().any(char::is_whitespace));
            prop_assert_eq!(result.is_winner, !result.matches.is_empty());
        }
    }

    #[test]
    fn short_digit_tickets_are_zero_padded(n in 0u32..1_000_000) {
        let results = check_tickets(&[n.to_string()], &sample_draw());
        prop_assert_eq!(&results[0].ticket_number, &format!("{:06}", n));
    }
}
