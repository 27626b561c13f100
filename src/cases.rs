//! Case conversions for space-delimited text.
//!
//! Every conversion takes words separated by whitespace (`"hello big world"`)
//! and produces the requested convention. Upper/lower mappings go through a
//! [`CaseFolding`] so that Turkish and Azeri dotted/dotless `i` are handled.

use std::str::FromStr;

use crate::error::Error;

/// Locale-specific case mapping table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseFolding {
    #[default]
    Unicode,
    Turkish,
    Azeri,
}

impl FromStr for CaseFolding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(CaseFolding::Unicode),
            "turkish" => Ok(CaseFolding::Turkish),
            "azeri" => Ok(CaseFolding::Azeri),
            other => Err(Error::InvalidCaseError(other.to_string())),
        }
    }
}

impl CaseFolding {
    fn is_turkic(self) -> bool {
        matches!(self, CaseFolding::Turkish | CaseFolding::Azeri)
    }

    fn push_upper(self, c: char, out: &mut String) {
        match c {
            'i' if self.is_turkic() => out.push('İ'),
            'ı' if self.is_turkic() => out.push('I'),
            _ => out.extend(c.to_uppercase()),
        }
    }

    fn push_lower(self, c: char, out: &mut String) {
        match c {
            'I' if self.is_turkic() => out.push('ı'),
            // Single `i`, not `i` plus a combining dot.
            'İ' => out.push('i'),
            _ => out.extend(c.to_lowercase()),
        }
    }

    pub fn upper(self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            self.push_upper(c, &mut out);
        }
        out
    }

    pub fn lower(self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            self.push_lower(c, &mut out);
        }
        out
    }

    /// Uppercases the first letter of every word, keeping the separators.
    pub fn title(self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut word_start = true;

        for c in s.chars() {
            if c.is_whitespace() {
                word_start = true;
                out.push(c);
            } else if word_start {
                self.push_upper(c, &mut out);
                word_start = false;
            } else {
                out.push(c);
            }
        }

        out
    }

    /// `hello big world` -> `HelloBigWorld`
    pub fn pascal(self, s: &str) -> String {
        self.joined_words(s, true)
    }

    /// `hello big world` -> `helloBigWorld`
    pub fn camel(self, s: &str) -> String {
        self.joined_words(s, false)
    }

    fn joined_words(self, s: &str, capitalize_first: bool) -> String {
        let mut out = String::with_capacity(s.len());
        let mut capitalize = capitalize_first;

        for c in s.chars() {
            if c.is_whitespace() {
                capitalize = true;
                continue;
            }

            if capitalize {
                self.push_upper(c, &mut out);
                capitalize = false;
            } else {
                out.push(c);
            }
        }

        out
    }

    /// `hello big world` -> `HELLO_BIG_WORLD`
    pub fn constant(self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            if c.is_whitespace() {
                out.push('_');
            } else {
                self.push_upper(c, &mut out);
            }
        }
        out
    }

    /// Uppercases only the very first character.
    pub fn sentence(self, s: &str) -> String {
        let mut chars = s.chars();
        let mut out = String::with_capacity(s.len());

        if let Some(head) = chars.next() {
            self.push_upper(head, &mut out);
            out.push_str(chars.as_str());
        }

        out
    }
}

fn replace_whitespace(s: &str, sep: char) -> String {
    s.chars().map(|c| if c.is_whitespace() { sep } else { c }).collect()
}

/// `hello big world` -> `hello_big_world`
pub fn snake(s: &str) -> String {
    replace_whitespace(s, '_')
}

/// `hello big world` -> `hello-big-world`
pub fn kebab(s: &str) -> String {
    replace_whitespace(s, '-')
}

/// `hello big world` -> `hello.big.world`
pub fn dot(s: &str) -> String {
    replace_whitespace(s, '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_joining_cases() {
        let folding = CaseFolding::default();
        assert_eq!(folding.pascal("hello big world"), "HelloBigWorld");
        assert_eq!(folding.camel("hello big world"), "helloBigWorld");
        assert_eq!(folding.constant("hello big world"), "HELLO_BIG_WORLD");
        assert_eq!(snake("hello big world"), "hello_big_world");
        assert_eq!(kebab("hello big world"), "hello-big-world");
        assert_eq!(dot("hello big world"), "hello.big.world");
    }

    #[test]
    fn test_title_and_sentence() {
        let folding = CaseFolding::default();
        assert_eq!(folding.title("hello big world"), "Hello Big World");
        assert_eq!(folding.sentence("hello big world"), "Hello big world");
        assert_eq!(folding.sentence(""), "");
    }

    #[test]
    fn test_turkish_folding() {
        assert_eq!(CaseFolding::Turkish.upper("istanbul"), "İSTANBUL");
        assert_eq!(CaseFolding::Azeri.lower("IŞIK"), "ışık");
        assert_eq!(CaseFolding::Unicode.upper("istanbul"), "ISTANBUL");
        assert_eq!(CaseFolding::Turkish.title("iyi gün"), "İyi Gün");
    }

    #[test]
    fn test_dotted_capital_i_lowers_to_plain_i() {
        assert_eq!(CaseFolding::Unicode.lower("İzmir"), "izmir");
        assert_eq!(CaseFolding::Turkish.lower("İzmir"), "izmir");
        assert_eq!(CaseFolding::Unicode.lower("I"), "i");
    }

    #[test]
    fn test_parse_case_folding() {
        assert_eq!("".parse::<CaseFolding>().unwrap(), CaseFolding::Unicode);
        assert_eq!("azeri".parse::<CaseFolding>().unwrap(), CaseFolding::Azeri);
        assert!(matches!(
            "klingon".parse::<CaseFolding>(),
            Err(Error::InvalidCaseError(name)) if name == "klingon"
        ));
    }
}
