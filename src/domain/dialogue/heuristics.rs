//! Local finality and normalization heuristics for inbound fragments.
//!
//! These run before and alongside the completeness oracle: `is_final_part`
//! can short-circuit the oracle entirely, and `clean_input` strips the noise
//! (emoji, filler interjections, stuttered characters) that otherwise skews
//! both the oracle and the classifier.

use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence-final punctuation, CJK and ASCII.
static FINAL_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[。！？.?!]$").expect("valid punctuation regex"));

/// Closing keywords that signal the sender is done talking.
static FINAL_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(謝謝|感謝|就這樣|麻煩了|好了|結束|OK|拜託|thanks|that's all)")
        .expect("valid keyword regex")
});

/// Emoji and pictographs.
static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Emoji_Presentation}\p{Extended_Pictographic}]").expect("valid emoji regex")
});

/// Non-semantic filler interjections and zhuyin fragments.
static FILLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(欸|呃|嗯+|那個|ㄏㄏ|ㄘ|ㄟ|ㄚ|咩+|哈+|嘿+|喔+|啊+|哦+|恩+)")
        .expect("valid filler regex")
});

/// Runs of terminal punctuation to collapse to their first character.
static PUNCTUATION_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[!！,.，。]{2,}").expect("valid punctuation-run regex"));

/// Whitespace runs to collapse to a single space.
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Judges whether a fragment locally demonstrates finality.
///
/// True when the fragment ends in sentence-final punctuation or contains a
/// closing keyword. Applied to the *fragment*, not the joined buffer: a
/// closing keyword anywhere in the latest message ends the utterance even
/// if earlier fragments were open-ended.
pub fn is_final_part(fragment: &str) -> bool {
    FINAL_PUNCTUATION.is_match(fragment) || FINAL_KEYWORDS.is_match(fragment)
}

/// Normalizes a raw inbound fragment.
///
/// Strips emoji and filler interjections, squeezes characters repeated more
/// than twice down to two, collapses runs of terminal punctuation and
/// whitespace, and trims.
pub fn clean_input(input: &str) -> String {
    let no_emoji = EMOJI.replace_all(input, "");
    let no_filler = FILLER.replace_all(&no_emoji, "");
    let squeezed = squeeze_repeats(&no_filler);
    let collapsed = PUNCTUATION_RUN.replace_all(&squeezed, |caps: &regex::Captures<'_>| {
        caps[0].chars().next().map(String::from).unwrap_or_default()
    });
    WHITESPACE_RUN.replace_all(&collapsed, " ").trim().to_string()
}

/// Reduces runs of the same CJK or Latin character longer than two to two.
///
/// The regex crate has no backreferences, so this is a plain scan.
fn squeeze_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut run = 0usize;

    for ch in text.chars() {
        let squeezable = ch.is_ascii_alphabetic() || ('\u{4e00}'..='\u{9fa5}').contains(&ch);
        if squeezable && prev == Some(ch) {
            run += 1;
            if run > 2 {
                continue;
            }
        } else {
            run = 1;
        }
        prev = Some(ch);
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    mod finality {
        use super::*;

        #[test]
        fn trailing_punctuation_is_final() {
            assert!(is_final_part("帽子還沒到貨。"));
            assert!(is_final_part("When will it ship?"));
            assert!(is_final_part("太貴了!"));
        }

        #[test]
        fn closing_keywords_are_final() {
            assert!(is_final_part("就這樣"));
            assert!(is_final_part("謝謝你"));
            assert!(is_final_part("thanks"));
            assert!(is_final_part("ok"));
        }

        #[test]
        fn open_ended_fragments_are_not_final() {
            assert!(!is_final_part("還有就是"));
            assert!(!is_final_part("too expensive"));
            assert!(!is_final_part("我想問一下"));
        }
    }

    mod cleaning {
        use super::*;

        #[test]
        fn strips_emoji() {
            assert_eq!(clean_input("到貨了嗎😡😡"), "到貨了嗎");
        }

        #[test]
        fn strips_filler_interjections() {
            assert_eq!(clean_input("那個我想退貨"), "我想退貨");
        }

        #[test]
        fn squeezes_stuttered_characters() {
            assert_eq!(clean_input("goooood"), "good");
            assert_eq!(clean_input("好好好好"), "好好");
        }

        #[test]
        fn collapses_punctuation_runs() {
            assert_eq!(clean_input("太誇張了!!!!"), "太誇張了!");
            assert_eq!(clean_input("怎麼辦。。。"), "怎麼辦。");
        }

        #[test]
        fn collapses_whitespace() {
            assert_eq!(clean_input("  when   will it   ship  "), "when will it ship");
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn clean_input_never_panics(s in "\\PC*") {
                let _ = clean_input(&s);
            }

            #[test]
            fn clean_input_never_grows(s in "\\PC{0,80}") {
                prop_assert!(clean_input(&s).chars().count() <= s.chars().count());
            }

            #[test]
            fn is_final_part_never_panics(s in "\\PC*") {
                let _ = is_final_part(&s);
            }
        }
    }
}
