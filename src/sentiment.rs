use once_cell::sync::Lazy;

/// Fixed positive-sentiment vocabulary for headline screening.
pub const POSITIVE_TERMS: &[&str] = &[
    "surge", "jumps", "rallies", "strong", "record", "expands", "beats", "profit", "growth",
    "upgrade", "bullish", "wins", "approval",
];

static LOWERED: Lazy<Vec<String>> =
    Lazy::new(|| POSITIVE_TERMS.iter().map(|t| t.to_lowercase()).collect());

/// Lower-cased, entity-decoded headline text.
fn normalize(title: &str) -> String {
    html_escape::decode_html_entities(title).to_lowercase()
}

/// Substring match, so "surges" and "record-high" both count.
pub fn is_positive_headline(title: &str) -> bool {
    let t = normalize(title);
    LOWERED.iter().any(|w| t.contains(w.as_str()))
}

pub fn any_positive<'a, I>(titles: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    titles.into_iter().any(is_positive_headline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitively() {
        assert!(is_positive_headline("Shares SURGE after listing"));
        assert!(is_positive_headline("Broker issues Upgrade"));
        assert!(!is_positive_headline("Stock slips on weak demand"));
    }

    #[test]
    fn decodes_entities_before_matching() {
        assert!(is_positive_headline("Q2 profit &amp; revenue ahead"));
    }

    #[test]
    fn any_over_list() {
        assert!(any_positive(["flat day", "company wins order"]));
        assert!(!any_positive(Vec::<&str>::new()));
    }
}
