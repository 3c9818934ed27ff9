//! Keyword, pattern and color matching primitives.
//!
//! Shared by the filter and replacement engines.

use std::str::FromStr;

use fancy_regex::{Captures, Regex};

use crate::common::error::{ConfigError, ConfigResult, TransformError, TransformResult};

/// Pattern source that matches a whole value.
pub const WILDCARD: &str = "*";

/// Maximum numeric distance between two colors still considered equal.
///
/// Discord slightly quantizes embed colors, so exact comparison misses.
pub const DEFAULT_COLOR_TOLERANCE: u32 = 3000;

/// Whether a keyword list admits or rejects matching content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Whitelist,
    Blacklist,
}

impl FromStr for FilterType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whitelist" => Ok(Self::Whitelist),
            "blacklist" => Ok(Self::Blacklist),
            _ => Err(ConfigError::InvalidFilterType {
                value: s.to_string(),
            }),
        }
    }
}

/// Check `content` against lower-cased `keywords`.
///
/// Whitelist: true if any keyword is a substring. Blacklist: true if none is.
/// An empty keyword list therefore never whitelists and always blacklists.
pub fn string_matches(content: &str, keywords: &[String], mode: FilterType) -> bool {
    let content = content.to_lowercase();
    let found = keywords
        .iter()
        .any(|keyword| content.contains(keyword.as_str()));

    match mode {
        FilterType::Whitelist => found,
        FilterType::Blacklist => !found,
    }
}

/// A compiled replacement pattern.
///
/// `*` matches an entire value; anything else is a case-insensitive regex
/// applied globally.
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    wildcard: bool,
    /// Whether the regex declares named groups, enabling `$<name>`.
    named: bool,
    regex: Regex,
}

impl TextPattern {
    pub fn new(source: &str) -> ConfigResult<Self> {
        let wildcard = source == WILDCARD;
        let expression = if wildcard {
            r"(?s)\A.*".to_string()
        } else {
            format!("(?i){}", source)
        };

        let regex = Regex::new(&expression).map_err(|e| ConfigError::InvalidPattern {
            pattern: source.to_string(),
            message: e.to_string(),
        })?;

        let named = regex.capture_names().any(|name| name.is_some());

        Ok(Self {
            source: source.to_string(),
            wildcard,
            named,
            regex,
        })
    }

    /// Pattern text as written in the config.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Replace every match in `text`.
    ///
    /// `with` understands the tokens of JavaScript's `String.replace`:
    /// `$1` to `$99`, `$<name>`, `$&`, `` $` ``, `$'` and `$$`.
    pub fn replace_all(&self, text: &str, with: &str) -> TransformResult<String> {
        let mut replaced = String::with_capacity(text.len());
        let mut last = 0;

        for caps in self.regex.captures_iter(text) {
            let caps = caps.map_err(|e| TransformError::Regex {
                pattern: self.source.clone(),
                message: e.to_string(),
            })?;
            let Some(whole) = caps.get(0) else {
                continue;
            };

            replaced.push_str(&text[last..whole.start()]);
            self.expand(&caps, text, with, &mut replaced);
            last = whole.end();
        }

        replaced.push_str(&text[last..]);
        Ok(replaced)
    }

    fn expand(&self, caps: &Captures, text: &str, with: &str, dst: &mut String) {
        let Some(whole) = caps.get(0) else {
            return;
        };
        let groups = caps.len() - 1;
        let mut rest = with;

        while let Some(pos) = rest.find('$') {
            dst.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];

            // Bytes of `with` consumed after the `$`
            let consumed = match tail.as_bytes().first() {
                Some(b'$') => {
                    dst.push('$');
                    1
                }
                Some(b'&') => {
                    dst.push_str(whole.as_str());
                    1
                }
                Some(b'`') => {
                    dst.push_str(&text[..whole.start()]);
                    1
                }
                Some(b'\'') => {
                    dst.push_str(&text[whole.end()..]);
                    1
                }
                Some(b'<') if self.named => match tail.find('>') {
                    Some(end) => {
                        if let Some(group) = caps.name(&tail[1..end]) {
                            dst.push_str(group.as_str());
                        }
                        end + 1
                    }
                    None => {
                        dst.push('$');
                        0
                    }
                },
                Some(b'0'..=b'9') => match group_reference(tail, groups) {
                    Some((index, digits)) => {
                        if let Some(group) = caps.get(index) {
                            dst.push_str(group.as_str());
                        }
                        digits
                    }
                    None => {
                        dst.push('$');
                        0
                    }
                },
                _ => {
                    dst.push('$');
                    0
                }
            };

            rest = &tail[consumed..];
        }

        dst.push_str(rest);
    }
}

/// Resolve the digits after a `$` to a group index and the number of digits used.
///
/// Two digits win when they name an existing group, otherwise one digit is tried.
/// `$0` and references past the last group stay literal.
fn group_reference(tail: &str, groups: usize) -> Option<(usize, usize)> {
    let digits: Vec<usize> = tail
        .bytes()
        .take(2)
        .take_while(u8::is_ascii_digit)
        .map(|b| usize::from(b - b'0'))
        .collect();

    if let [tens, ones] = digits[..] {
        let index = tens * 10 + ones;
        if (1..=groups).contains(&index) {
            return Some((index, 2));
        }
    }

    let index = *digits.first()?;
    (1..=groups).contains(&index).then_some((index, 1))
}

/// `#RRGGBB`, case-insensitive.
pub fn is_valid_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse `#RRGGBB` into a 24-bit value.
pub fn parse_hex_color(value: &str) -> Option<u32> {
    if !is_valid_hex_color(value) {
        return None;
    }
    u32::from_str_radix(&value[1..], 16).ok()
}

/// Compare two hex colors within `tolerance`. Invalid input never matches.
pub fn hex_colors_are_equal(a: &str, b: &str, tolerance: u32) -> bool {
    match (parse_hex_color(a), parse_hex_color(b)) {
        (Some(a), Some(b)) => a.abs_diff(b) <= tolerance,
        _ => false,
    }
}
