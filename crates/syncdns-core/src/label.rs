//! Declaration label grammar.
//!
//! A container declares the rewrites it wants by attaching a free-text label
//! (by default `syncdns.rewrites`) whose value contains zero or more clauses:
//!
//! ```text
//! clause   = "Rewrite(" domain "," answer ")"
//! domain   = 1*( any char except "," )
//! answer   = 1*( any char except ")" )
//! ```
//!
//! Clauses are found left to right without overlapping; anything between
//! them is ignored. Each argument is trimmed of surrounding whitespace and
//! then loses one layer of matching `'...'` or `"..."` quotes.
//!
//! Nothing is validated here: a clause with an odd domain or a non-IP answer
//! is forwarded as written and the authority decides whether to accept it.
//! Text that does not form a complete clause is skipped silently.
//!
//! Because `domain` stops only at a comma, a clause missing its comma runs on
//! into the next clause: `Rewrite(a) Rewrite(b,1.2.3.4)` yields the single
//! rule `a) Rewrite(b -> 1.2.3.4`.

use crate::RewriteRule;

/// Marker that opens a clause
const MARKER: &str = "Rewrite(";

/// Parse every `Rewrite(domain,answer)` clause in `text`, in order.
#[must_use]
pub fn parse(text: &str) -> Vec<RewriteRule> {
    let mut rules = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(MARKER) {
        let body = &rest[start + MARKER.len()..];

        match match_clause(body) {
            Some((domain, answer, consumed)) => {
                rules.push(RewriteRule::new(clean(domain), clean(answer)));
                rest = &body[consumed..];
            }
            // No clause starts here; resume the search just past this marker's 'R'.
            None => rest = &rest[start + 1..],
        }
    }

    rules
}

/// Match `domain "," answer ")"` at the start of `body`.
///
/// Returns both raw arguments and the number of bytes consumed, including
/// the closing parenthesis.
fn match_clause(body: &str) -> Option<(&str, &str, usize)> {
    let comma = body.find(',')?;
    if comma == 0 {
        return None;
    }

    let after_comma = &body[comma + 1..];
    let close = after_comma.find(')')?;
    if close == 0 {
        return None;
    }

    let domain = &body[..comma];
    let answer = &after_comma[..close];
    Some((domain, answer, comma + 1 + close + 1))
}

/// Trim whitespace, then strip one layer of matching quotes.
fn clean(arg: &str) -> String {
    let arg = arg.trim();

    for quote in ['"', '\''] {
        if arg.len() >= 2 && arg.starts_with(quote) && arg.ends_with(quote) {
            return arg[1..arg.len() - 1].to_string();
        }
    }

    arg.to_string()
}
