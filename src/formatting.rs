use alloy::primitives::{
    utils::{format_ether, format_units},
    I256, U256,
};
use bytesize::ByteSize;
use owo_colors::OwoColorize;

pub fn format_gas(gas: u64) -> String {
    let text = format!("{gas} gas");
    if gas <= 3_000_000 {
        text.bright_green().to_string()
    } else if gas <= 7_000_000 {
        text.yellow().to_string()
    } else {
        text.bright_purple().to_string()
    }
}

/// Pretty-prints a file size based on its limits.
pub fn format_file_size(len: usize, mid: u64, max: u64) -> String {
    let len = ByteSize::b(len as u64);
    let mid = ByteSize::kib(mid);
    let max = ByteSize::kib(max);
    if len <= mid {
        len.bright_green().to_string()
    } else if len <= max {
        len.yellow().to_string()
    } else {
        len.bright_purple().to_string()
    }
}

/// Wei amount as ether, e.g. `1.5 Eth`.
pub fn format_balance(wei: U256) -> String {
    format!("{} Eth", format_ether(wei))
}

/// Ether spent between two balance readings. Negative if the account was
/// credited in the meantime.
pub fn format_spent(before: U256, after: U256) -> String {
    let spent = I256::from_raw(before).wrapping_sub(I256::from_raw(after));
    let text = format_units(spent, "ether").unwrap_or_else(|_| spent.to_string());
    format!("{text} Eth")
}

#[cfg(test)]
mod tests {
    use alloy::primitives::utils::parse_ether;

    use super::*;

    #[test]
    fn balances_are_shown_in_ether() {
        assert_eq!(
            format_balance(parse_ether("1.5").unwrap()),
            "1.500000000000000000 Eth"
        );
    }

    #[test]
    fn spent_is_the_balance_difference() {
        let before = parse_ether("2").unwrap();
        let after = parse_ether("1.75").unwrap();
        assert_eq!(format_spent(before, after), "0.250000000000000000 Eth");
        assert_eq!(format_spent(after, before), "-0.250000000000000000 Eth");
    }
}
