//! Ticket verification against a single draw.
//!
//! Pure computation: no I/O, no shared state, and no input is rejected.

use crate::types::{
    CheckResponse, CheckResult, Draw, MatchType, PrizeMatch, PrizeTier, RunningNumberRule,
};
use crate::utils::{normalize_ticket, parse_reward, ticket_slice};

/// Checks every ticket against `draw`. The output has one result per ticket, in input order.
pub fn check_tickets<S: AsRef<str>>(tickets: &[S], draw: &Draw) -> Vec<CheckResult> {
    tickets
        .iter()
        .map(|ticket| check_ticket(ticket.as_ref(), draw))
        .collect()
}

/// Same as [`check_tickets`], paired with the date of the draw checked against.
pub fn check_response<S: AsRef<str>>(tickets: &[S], draw: &Draw) -> CheckResponse {
    CheckResponse {
        draw_date: draw.date.clone(),
        results: check_tickets(tickets, draw),
    }
}

pub fn check_ticket(raw: &str, draw: &Draw) -> CheckResult {
    let ticket = normalize_ticket(raw);

    let mut matches = full_matches(&ticket, &draw.prizes);
    // front3, then back3, then back2, each in rule declaration order
    for match_type in [MatchType::Front3, MatchType::Back3, MatchType::Back2] {
        matches.extend(running_matches(&ticket, &draw.running_numbers, match_type));
    }

    let total_reward = matches
        .iter()
        .map(|m| parse_reward(&m.reward))
        .fold(0i64, i64::saturating_add);

    CheckResult {
        ticket_number: ticket,
        is_winner: !matches.is_empty(),
        matches,
        total_reward,
    }
}

fn full_matches(ticket: &str, prizes: &[PrizeTier]) -> Vec<PrizeMatch> {
    let mut matches = Vec::new();
    for prize in prizes {
        for winning_number in &prize.number {
            if ticket == winning_number {
                matches.push(PrizeMatch {
                    prize_id: prize.id.clone(),
                    prize_name: prize.name.clone(),
                    reward: prize.reward.clone(),
                    matched_number: winning_number.clone(),
                    match_type: MatchType::Full,
                });
            }
        }
    }
    matches
}

fn running_matches(
    ticket: &str,
    rules: &[RunningNumberRule],
    match_type: MatchType,
) -> Vec<PrizeMatch> {
    let mut matches = Vec::new();
    for rule in rules {
        let Some(kind) = rule.kind() else {
            continue;
        };
        if kind.match_type() != match_type {
            continue;
        }

        let (skip, take) = kind.window();
        let part = ticket_slice(ticket, skip, take);
        for winning_number in &rule.number {
            if &part == winning_number {
                matches.push(PrizeMatch {
                    prize_id: rule.id.clone(),
                    prize_name: rule.name.clone(),
                    reward: rule.reward.clone(),
                    matched_number: winning_number.clone(),
                    match_type,
                });
            }
        }
    }
    matches
}
