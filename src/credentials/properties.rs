// ABOUTME: Minimal reader for Java-style .properties credential files.
// ABOUTME: Supports `=`, `:` and whitespace separators, comments, and line continuations.

use std::collections::HashMap;

/// Parse `.properties` text into key/value pairs. Later keys win.
///
/// Unicode escapes are not decoded; credential files never need them.
pub fn parse(text: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    let mut logical = String::new();

    for raw in text.lines() {
        let line = raw.trim_start();

        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        // An odd number of trailing backslashes continues onto the next line.
        let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 1 {
            logical.push_str(&line[..line.len() - 1]);
            continue;
        }

        logical.push_str(line);
        if let Some((key, value)) = split_entry(&logical) {
            entries.insert(key, value);
        }
        logical.clear();
    }

    if let Some((key, value)) = split_entry(&logical) {
        entries.insert(key, value);
    }

    entries
}

fn split_entry(line: &str) -> Option<(String, String)> {
    if line.is_empty() {
        return None;
    }

    let mut key = String::new();
    let mut chars = line.char_indices();
    let mut rest_start = line.len();

    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    key.push(unescape(escaped));
                }
            }
            '=' | ':' => {
                rest_start = idx + 1;
                break;
            }
            c if c.is_whitespace() => {
                // Whitespace may be followed by an explicit separator.
                let after = line[idx..].trim_start();
                rest_start = line.len() - after.len();
                if after.starts_with('=') || after.starts_with(':') {
                    rest_start += 1;
                }
                break;
            }
            c => key.push(c),
        }
    }

    let value = line[rest_start..].trim_start();
    Some((key, unescape_value(value)))
}

fn unescape(c: char) -> char {
    match c {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        'f' => '\u{000C}',
        other => other,
    }
}

fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(unescape(escaped));
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_separators() {
        let props = parse("accessKey = 12345\nsecretKey:abcde\nregion us-west-2\n");
        assert_eq!(props["accessKey"], "12345");
        assert_eq!(props["secretKey"], "abcde");
        assert_eq!(props["region"], "us-west-2");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let props = parse("# comment\n! also a comment\n\n   accessKey=k\n");
        assert_eq!(props.len(), 1);
        assert_eq!(props["accessKey"], "k");
    }

    #[test]
    fn joins_continued_lines() {
        let props = parse("secretKey = abc\\\n    def\n");
        assert_eq!(props["secretKey"], "abcdef");
    }

    #[test]
    fn keeps_separators_inside_values() {
        let props = parse("secretKey = a=b:c\n");
        assert_eq!(props["secretKey"], "a=b:c");
    }

    #[test]
    fn whitespace_then_separator() {
        let props = parse("accessKey   =   spaced\n");
        assert_eq!(props["accessKey"], "spaced");
    }

    #[test]
    fn key_without_value_is_empty() {
        let props = parse("accessKey\n");
        assert_eq!(props["accessKey"], "");
    }
}
