use crate::types::TICKET_WIDTH;

/// Strips every whitespace character and left-pads with `0` up to six characters.
/// Longer input is returned as is, never truncated.
pub fn normalize_ticket(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    left_pad_zeros(&stripped, TICKET_WIDTH)
}

pub fn left_pad_zeros(value: &str, width: usize) -> String {
    format!("{:0>width$}", value, width = width)
}

/// Pads an all-digit winning number to its fixed width. Placeholders such as
/// `xxx` are stored as received.
pub fn pad_number(number: &str, width: usize) -> String {
    if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
        left_pad_zeros(number, width)
    } else {
        number.to_string()
    }
}

/// Integer value of a reward string: the optional sign and leading digit run
/// after trimming. Anything without leading digits counts as zero, and digit
/// runs past the `i64` range saturate.
pub fn parse_reward(reward: &str) -> i64 {
    let trimmed = reward.trim();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return 0;
    }

    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}

/// Characters `skip..skip + take` of a ticket, counted in chars.
pub fn ticket_slice(ticket: &str, skip: usize, take: usize) -> String {
    ticket.chars().skip(skip).take(take).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_pads_short_tickets() {
        assert_eq!(normalize_ticket("123"), "000123");
        assert_eq!(normalize_ticket(" 1 2 3 "), "000123");
        assert_eq!(normalize_ticket("\t12\n3456"), "123456");
        assert_eq!(normalize_ticket(""), "000000");
    }

    #[test]
    fn normalize_keeps_long_tickets() {
        assert_eq!(normalize_ticket("1234567"), "1234567");
        assert_eq!(normalize_ticket("12 34 56 78"), "12345678");
    }

    #[test]
    fn normalize_does_not_reject_letters() {
        assert_eq!(normalize_ticket("ab"), "0000ab");
    }

    #[test]
    fn pad_number_only_touches_digits() {
        assert_eq!(pad_number("56", 2), "56");
        assert_eq!(pad_number("7", 2), "07");
        assert_eq!(pad_number("42", 3), "042");
        assert_eq!(pad_number("xxx", 3), "xxx");
        assert_eq!(pad_number("", 3), "");
    }

    #[test]
    fn parse_reward_is_lenient() {
        assert_eq!(parse_reward("6000000"), 6_000_000);
        assert_eq!(parse_reward(" 2000 "), 2000);
        assert_eq!(parse_reward("1000.00"), 1000);
        assert_eq!(parse_reward("-5"), -5);
        assert_eq!(parse_reward("abc"), 0);
        assert_eq!(parse_reward(""), 0);
        assert_eq!(parse_reward("-"), 0);
    }

    #[test]
    fn parse_reward_saturates_huge_values() {
        assert_eq!(parse_reward("99999999999999999999999"), i64::MAX);
        assert_eq!(parse_reward("9223372036854775807"), i64::MAX);
        assert_eq!(parse_reward("-99999999999999999999999"), i64::MIN);
    }

    #[test]
    fn ticket_slice_counts_chars() {
        assert_eq!(ticket_slice("123456", 0, 3), "123");
        assert_eq!(ticket_slice("123456", 3, 3), "456");
        assert_eq!(ticket_slice("123456", 4, 2), "56");
        assert_eq!(ticket_slice("1234567", 4, 2), "56");
    }
}
