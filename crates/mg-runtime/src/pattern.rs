use regex::Regex;

/// File-name glob in the style scripts expect from the host.
///
/// `*` matches any run of characters other than `/`, `?` a single one,
/// `[...]` / `[!...]` a character class and `{a,b}` either alternative. Names
/// starting with `.` only match patterns that start with `.` too.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    regex: Regex,
    matches_dotfiles: bool,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(&glob_to_regex(pattern))?,
            matches_dotfiles: pattern.starts_with('.'),
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        if name.starts_with('.') && !self.matches_dotfiles {
            return false;
        }
        self.regex.is_match(name)
    }
}

pub fn glob_match(name: &str, pattern: &str) -> bool {
    GlobPattern::new(pattern)
        .map(|glob| glob.matches(name))
        .unwrap_or(false)
}

fn glob_to_regex(pattern: &str) -> String {
    let chars = pattern.chars().collect::<Vec<_>>();
    let braces = braces_balanced(&chars);
    let mut out = String::from("^");
    let mut brace_depth = 0usize;
    let mut index = 0usize;

    while index < chars.len() {
        let ch = chars[index];
        match ch {
            '*' => {
                while chars.get(index + 1) == Some(&'*') {
                    index += 1;
                }
                out.push_str("[^/]*");
            }
            '?' => out.push_str("[^/]"),
            '[' => match class_end(&chars, index) {
                Some(end) => {
                    push_class(&mut out, &chars[index + 1..end]);
                    index = end;
                }
                None => out.push_str(r"\["),
            },
            '{' if braces => {
                brace_depth += 1;
                out.push_str("(?:");
            }
            ',' if brace_depth > 0 => out.push('|'),
            '}' if brace_depth > 0 => {
                brace_depth -= 1;
                out.push(')');
            }
            '\\' if index + 1 < chars.len() => {
                index += 1;
                push_literal(&mut out, chars[index]);
            }
            other => push_literal(&mut out, other),
        }
        index += 1;
    }

    out.push('$');
    out
}

fn braces_balanced(chars: &[char]) -> bool {
    let mut depth = 0i32;
    for ch in chars {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut index = open + 1;
    if matches!(chars.get(index), Some('!') | Some('^')) {
        index += 1;
    }
    // A `]` right after the opening bracket is a literal member.
    if chars.get(index) == Some(&']') {
        index += 1;
    }
    (index..chars.len()).find(|position| chars[*position] == ']')
}

fn push_class(out: &mut String, body: &[char]) {
    out.push('[');
    let mut members = body;
    if let Some((&('!' | '^'), rest)) = members.split_first() {
        out.push('^');
        members = rest;
    }
    for ch in members {
        match ch {
            '\\' | '[' | ']' | '^' | '&' | '~' => {
                out.push('\\');
                out.push(*ch);
            }
            other => out.push(*other),
        }
    }
    out.push(']');
}

fn push_literal(out: &mut String, ch: char) {
    let mut buffer = [0u8; 4];
    out.push_str(&regex::escape(ch.encode_utf8(&mut buffer)));
}

#[cfg(test)]
mod pattern_tests {
    use super::*;

    #[test]
    fn star_matches_extension_suffix() {
        assert!(glob_match("rmgen.js", "*.js"));
        assert!(glob_match(".js", ".js"));
        assert!(!glob_match("rmgen.json", "*.js"));
        assert!(!glob_match("dir/rmgen.js", "*.js"));
        assert!(glob_match("library.rhai", "*"));
    }

    #[test]
    fn dotfiles_need_explicit_dot() {
        assert!(!glob_match(".hidden.js", "*.js"));
        assert!(glob_match(".hidden.js", ".*.js"));
    }

    #[test]
    fn question_mark_and_classes() {
        assert!(glob_match("map1.xml", "map?.xml"));
        assert!(!glob_match("map12.xml", "map?.xml"));
        assert!(glob_match("b.json", "[abc].json"));
        assert!(!glob_match("d.json", "[abc].json"));
        assert!(glob_match("d.json", "[!abc].json"));
        assert!(glob_match("7.json", "[0-9].json"));
    }

    #[test]
    fn braces_expand_alternatives() {
        assert!(glob_match("a.json", "*.{json,xml}"));
        assert!(glob_match("a.xml", "*.{json,xml}"));
        assert!(!glob_match("a.js", "*.{json,xml}"));
        assert!(glob_match("a{b", "a{b"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(glob_match("a+b(1).txt", "a+b(1).txt"));
        assert!(!glob_match("aab(1).txt", "a+b(1).txt"));
        assert!(glob_match("x[y", "x[y"));
    }
}
