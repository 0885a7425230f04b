//! Catalog of the synthetic volatility markets the bot trades on.

/// Label/symbol pairs, including the 1-second variants. Symbol codes can
/// differ per account, so unknown symbols are passed through as overrides
/// rather than rejected.
pub const VOLATILITY_MARKETS: &[(&str, &str)] = &[
    ("Volatility 10 Index", "R_10"),
    ("Volatility 25 Index", "R_25"),
    ("Volatility 50 Index", "R_50"),
    ("Volatility 75 Index", "R_75"),
    ("Volatility 100 Index", "R_100"),
    ("Volatility 10 (1s) Index", "R_10_1S"),
    ("Volatility 15 (1s) Index", "R_15_1S"),
    ("Volatility 25 (1s) Index", "R_25_1S"),
    ("Volatility 50 (1s) Index", "R_50_1S"),
    ("Volatility 75 (1s) Index", "R_75_1S"),
    ("Volatility 90 (1s) Index", "R_90_1S"),
    ("Volatility 100 (1s) Index", "R_100_1S"),
];

/// Resolves a market label or symbol to its symbol code.
#[must_use]
pub fn resolve(input: &str) -> Option<&'static str> {
    VOLATILITY_MARKETS.iter().find_map(|(label, symbol)| {
        (label.eq_ignore_ascii_case(input) || symbol.eq_ignore_ascii_case(input))
            .then_some(*symbol)
    })
}
