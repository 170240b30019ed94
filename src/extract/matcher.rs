use anyhow::{Context, Result};
use regex::Regex;

/// Space plus three characters for an `EEE` width.
const POST_MATCH_WINDOW: usize = 4;
/// Space, the `R` of `EUR`, and four characters for a size such as `11.5`.
const PRECEDES_MATCH_WINDOW: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedSizing {
    pub size: Option<String>,
    pub width: Option<String>,
    pub intl: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Size,
    Width,
    Intl,
    IntlPreceding,
}

#[derive(Debug, Clone, Copy)]
struct FieldMatch {
    start: usize,
    end: usize,
}

#[derive(Debug)]
pub struct SizingMatcher {
    spaces: Regex,
    size: Regex,
    width: Regex,
    intl: Regex,
    intl_preceding: Regex,
}

impl SizingMatcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            spaces: Regex::new(r"\s+").context("failed to compile whitespace regex")?,
            size: Regex::new(r"[0-9]{1,2}(?:\.[05])?").context("failed to compile size regex")?,
            width: Regex::new(r"(?i)^\s?(EEE|EE|E|[ABCDFG])")
                .context("failed to compile width regex")?,
            intl: Regex::new(r"(?i)^\s?(US|UK|EU)").context("failed to compile intl regex")?,
            intl_preceding: Regex::new(r"(?i)(US|UK|EUR?)\s?[0-9]")
                .context("failed to compile preceding intl regex")?,
        })
    }

    pub fn post_match(&self, text: &str) -> ExtractedSizing {
        let [size, width, intl] =
            self.sticky_match(text, [Field::Size, Field::Width, Field::Intl], POST_MATCH_WINDOW);

        ExtractedSizing { size, width, intl }
    }

    pub fn precedes_match(&self, text: &str) -> ExtractedSizing {
        let [intl, size, width] = self.sticky_match(
            text,
            [Field::IntlPreceding, Field::Size, Field::Width],
            PRECEDES_MATCH_WINDOW,
        );

        ExtractedSizing {
            size,
            width,
            intl: intl.map(|value| if value == "EUR" { "EU".to_string() } else { value }),
        }
    }

    // After a hit the next field is only searched for in the `window` chars
    // that follow it. A miss leaves the window where it was.
    fn sticky_match<const N: usize>(
        &self,
        text: &str,
        fields: [Field; N],
        window: usize,
    ) -> [Option<String>; N] {
        let input = self.spaces.replace_all(text, " ").to_uppercase();
        let chars = input.chars().collect::<Vec<char>>();
        let mut start = 0usize;
        let mut end = chars.len();

        fields.map(|field| {
            let lo = start.min(chars.len());
            let hi = end.clamp(lo, chars.len());
            let haystack = chars[lo..hi].iter().collect::<String>();

            let found = self.find(field, &haystack)?;
            let matched = &haystack[found.start..found.end];

            start = lo + haystack[..found.start].chars().count() + matched.chars().count();
            end = start + window;

            Some(matched.trim().to_string())
        })
    }

    fn find(&self, field: Field, haystack: &str) -> Option<FieldMatch> {
        match field {
            Field::Size => self.size.find(haystack).map(|m| FieldMatch {
                start: m.start(),
                end: m.end(),
            }),
            Field::Width => {
                let captures = self.width.captures(haystack)?;
                let whole = captures.get(0)?;
                let code = captures.get(1)?;
                // A lone E directly followed by U is the start of "EU", not a width.
                if code.as_str().eq_ignore_ascii_case("E")
                    && haystack[whole.end()..].starts_with(['U', 'u'])
                {
                    return None;
                }
                Some(FieldMatch {
                    start: whole.start(),
                    end: whole.end(),
                })
            }
            Field::Intl => self.intl.find(haystack).map(|m| FieldMatch {
                start: m.start(),
                end: m.end(),
            }),
            // Only the convention is consumed; the digit after it just has to be there.
            Field::IntlPreceding => {
                let code = self.intl_preceding.captures(haystack)?.get(1)?;
                Some(FieldMatch {
                    start: code.start(),
                    end: code.end(),
                })
            }
        }
    }
}
