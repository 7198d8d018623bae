//! URL token <-> method identifier conversion
//!
//! Call aliases in a request path are hyphen-case (`get-all-users`), method
//! identifiers are mixed case (`getAllUsers`). The two conversions are not
//! exact inverses once digits or consecutive capitals are involved.

/// Convert a hyphen-case URL token into a method identifier.
///
/// Only tokens made of lowercase words joined by single hyphens are
/// converted; anything else (including a single lowercase word) is
/// returned unchanged.
pub fn to_method_identifier(token: &str) -> String {
    if !is_hyphen_case(token) {
        return token.to_string();
    }

    let mut identifier = String::with_capacity(token.len());
    for (i, word) in token.split('-').enumerate() {
        if i == 0 {
            identifier.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            identifier.push(first.to_ascii_uppercase());
            identifier.push_str(chars.as_str());
        }
    }
    identifier
}

/// Convert a method identifier into its hyphen-case URL token.
///
/// A hyphen is inserted before every uppercase letter that directly follows
/// a lowercase letter, then the whole result is lowercased.
pub fn to_url_token(identifier: &str) -> String {
    let mut token = String::with_capacity(identifier.len() + 4);
    let mut prev: Option<char> = None;
    for c in identifier.chars() {
        if c.is_ascii_uppercase() && prev.is_some_and(|p| p.is_ascii_lowercase()) {
            token.push('-');
        }
        token.push(c.to_ascii_lowercase());
        prev = Some(c);
    }
    token
}

/// `[a-z]+(-[a-z]+)+`
fn is_hyphen_case(token: &str) -> bool {
    let mut words = 0;
    for word in token.split('-') {
        if word.is_empty() || !word.bytes().all(|b| b.is_ascii_lowercase()) {
            return false;
        }
        words += 1;
    }
    words >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyphen_case_to_identifier() {
        assert_eq!(to_method_identifier("get-all-users"), "getAllUsers");
        assert_eq!(to_method_identifier("get-current"), "getCurrent");
    }

    #[test]
    fn test_non_matching_tokens_pass_through() {
        assert_eq!(to_method_identifier("login"), "login");
        assert_eq!(to_method_identifier("getCurrent"), "getCurrent");
        assert_eq!(to_method_identifier("get-2-users"), "get-2-users");
        assert_eq!(to_method_identifier("get--users"), "get--users");
        assert_eq!(to_method_identifier("-get"), "-get");
        assert_eq!(to_method_identifier("get-"), "get-");
        assert_eq!(to_method_identifier(""), "");
    }

    #[test]
    fn test_identifier_to_token() {
        assert_eq!(to_url_token("getAllUsers"), "get-all-users");
        assert_eq!(to_url_token("login"), "login");
    }

    #[test]
    fn test_digits_and_capital_runs_are_lossy() {
        // Neither of these survives a round trip
        assert_eq!(to_url_token("get2Users"), "get2users");
        assert_eq!(to_url_token("parseHTMLPage"), "parse-htmlpage");
        assert_eq!(to_method_identifier("parse-htmlpage"), "parseHtmlpage");
    }

    #[test]
    fn test_round_trip_over_lowercase_words() {
        let words = ["get", "all", "users", "x", "by", "id", "current"];
        for a in words {
            for b in words {
                for c in words {
                    let two = format!("{}-{}", a, b);
                    assert_eq!(to_url_token(&to_method_identifier(&two)), two);
                    let three = format!("{}-{}-{}", a, b, c);
                    assert_eq!(to_url_token(&to_method_identifier(&three)), three);
                }
            }
        }
    }
}
