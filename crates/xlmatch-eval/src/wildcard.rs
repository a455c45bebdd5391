//! Excel-style wildcard patterns: `*` matches any run of characters, `?`
//! exactly one, and `~` makes the following `*`, `?` or `~` literal.
//! Matching is case-insensitive and always covers the whole text.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    AnySeq,
    AnyChar,
    Lit(char),
}

/// A compiled pattern. Only text that actually uses wildcard syntax
/// compiles to one; see [`WildcardPattern::parse`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WildcardPattern {
    tokens: Vec<Token>,
}

/// True when `text` contains `*` or `?`, escaped or not.
pub fn has_wildcard_syntax(text: &str) -> bool {
    text.contains(['*', '?'])
}

impl WildcardPattern {
    /// Compile `pattern`, or `None` when it holds no wildcard syntax and
    /// should be compared as plain text instead.
    pub fn parse(pattern: &str) -> Option<Self> {
        if !has_wildcard_syntax(pattern) {
            return None;
        }
        let mut tokens = Vec::with_capacity(pattern.len());
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '~' => match chars.peek() {
                    Some(&next @ ('*' | '?' | '~')) => {
                        chars.next();
                        push_literal(&mut tokens, next);
                    }
                    _ => push_literal(&mut tokens, '~'),
                },
                '*' => {
                    // collapse consecutive *
                    if tokens.last() != Some(&Token::AnySeq) {
                        tokens.push(Token::AnySeq);
                    }
                }
                '?' => tokens.push(Token::AnyChar),
                other => push_literal(&mut tokens, other),
            }
        }
        Some(Self { tokens })
    }

    /// Full-string, case-insensitive match.
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();
        let tokens = &self.tokens;

        let (mut ti, mut si) = (0usize, 0usize);
        // position after the last `*` seen and the text index it is retried from
        let mut backtrack: Option<(usize, usize)> = None;
        while si < text.len() {
            match tokens.get(ti) {
                Some(Token::AnySeq) => {
                    backtrack = Some((ti + 1, si));
                    ti += 1;
                    continue;
                }
                Some(Token::AnyChar) => {
                    ti += 1;
                    si += 1;
                    continue;
                }
                Some(Token::Lit(l)) if *l == text[si] => {
                    ti += 1;
                    si += 1;
                    continue;
                }
                _ => {}
            }
            match backtrack {
                Some((star_next, star_si)) => {
                    ti = star_next;
                    si = star_si + 1;
                    backtrack = Some((star_next, star_si + 1));
                }
                None => return false,
            }
        }
        tokens[ti..].iter().all(|t| *t == Token::AnySeq)
    }
}

fn push_literal(tokens: &mut Vec<Token>, c: char) {
    tokens.extend(c.to_lowercase().map(Token::Lit));
}
