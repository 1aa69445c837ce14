/// Deterministic slug derivation from a market question (spec.md §3):
/// lower-case, `&`→"and", `$`→"usd", `%`→"percent", punctuation stripped,
/// words joined with single dashes, capped at 80 chars with trailing dashes
/// trimmed. The output never contains `% $ @ # + [ ]` because those
/// characters are either translated or dropped outright.
pub fn generate_slug(question: &str) -> String {
    let expanded = question
        .to_lowercase()
        .replace('&', " and ")
        .replace('$', " usd ")
        .replace('%', " percent ");

    let mut out = String::with_capacity(expanded.len());
    let mut pending_dash = false;
    for c in expanded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    if out.len() > 80 {
        out.truncate(80);
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_lowercases() {
        assert_eq!(
            generate_slug("Will the Fed cut rates?"),
            "will-the-fed-cut-rates"
        );
    }

    #[test]
    fn translates_special_characters() {
        assert_eq!(
            generate_slug("Bitcoin & Ethereum above $100k?"),
            "bitcoin-and-ethereum-above-usd100k"
        );
        assert_eq!(generate_slug("Will inflation hit 5%?"), "will-inflation-hit-5percent");
    }

    #[test]
    fn drops_forbidden_characters() {
        let slug = generate_slug("Team [A] @ Team #1 + bonus?");
        for ch in ['%', '$', '@', '#', '+', '[', ']'] {
            assert!(!slug.contains(ch));
        }
    }

    #[test]
    fn caps_length_and_trims_trailing_dash() {
        let long_question = "Will ".to_string() + &"word ".repeat(40) + "happen?";
        let slug = generate_slug(&long_question);
        assert!(slug.len() <= 80);
        assert!(!slug.ends_with('-'));
    }
}
