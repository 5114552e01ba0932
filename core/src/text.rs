//! Text normalization: stopword filtering and suffix stripping.
//!
//! `process_word` is the single entry point used by both indexing and query
//! parsing; an empty return value means "discard this token".

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Splits running body text into candidate word tokens: NFKC normalization,
/// lowercasing, then a Unicode word match. Stopword filtering and stemming
/// happen later, in `process_word`.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercases the word, drops it if it is a stopword, otherwise stems it.
/// The empty string is the discard signal and must never be indexed.
pub fn process_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if is_stopword(&lower) {
        return String::new();
    }
    stem(&lower)
}

/// Suffix-stripping stemmer: plural forms, past tense and gerunds, then a
/// trailing-y rewrite. Words of one or two characters are too short to stem
/// safely and pass through unchanged, as do non-ASCII words.
pub fn stem(word: &str) -> String {
    if word.chars().count() <= 2 || !word.is_ascii() {
        return word.to_string();
    }
    let mut w = word.to_lowercase();
    step_plurals(&mut w);
    step_past_tense(&mut w);
    step_trailing_y(&mut w);
    w
}

// A `y` is a vowel when it follows a consonant.
fn is_consonant(word: &[u8], i: usize) -> bool {
    match word[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(word, i - 1),
        _ => true,
    }
}

/// Counts consonant-run to vowel transitions scanning left to right.
fn measure(word: &[u8]) -> u32 {
    let mut m = 0;
    let mut prev_consonant = true;
    for i in 0..word.len() {
        let c = is_consonant(word, i);
        if prev_consonant && !c {
            m += 1;
        }
        prev_consonant = c;
    }
    m
}

fn has_vowel(word: &[u8]) -> bool {
    (0..word.len()).any(|i| !is_consonant(word, i))
}

fn ends_double_consonant(word: &[u8]) -> bool {
    word.len() >= 2
        && word[word.len() - 1] == word[word.len() - 2]
        && is_consonant(word, word.len() - 1)
}

fn ends_cvc(word: &[u8]) -> bool {
    if word.len() < 3 {
        return false;
    }
    let j = word.len() - 1;
    is_consonant(word, j)
        && !is_consonant(word, j - 1)
        && is_consonant(word, j - 2)
        && !matches!(word[j], b'w' | b'x' | b'y')
}

fn step_plurals(word: &mut String) {
    if word.ends_with("sses") {
        word.truncate(word.len() - 2);
    } else if word.ends_with("ies") {
        word.truncate(word.len() - 2);
    } else if word.ends_with("ss") {
        // keep
    } else if word.ends_with('s') {
        word.pop();
    }
}

fn step_past_tense(word: &mut String) {
    if word.ends_with("eed") {
        if measure(&word.as_bytes()[..word.len() - 3]) > 0 {
            word.pop();
        }
        return;
    }

    let stripped = if word.ends_with("ed") && has_vowel(&word.as_bytes()[..word.len() - 2]) {
        word.truncate(word.len() - 2);
        true
    } else if word.ends_with("ing") && has_vowel(&word.as_bytes()[..word.len() - 3]) {
        word.truncate(word.len() - 3);
        true
    } else {
        false
    };

    if stripped {
        if word.ends_with("at") || word.ends_with("bl") || word.ends_with("iz") {
            word.push('e');
        } else if ends_double_consonant(word.as_bytes())
            && !word.ends_with(['l', 's', 'z'])
        {
            word.pop();
        } else if measure(word.as_bytes()) == 1 && ends_cvc(word.as_bytes()) {
            word.push('e');
        }
    }
}

fn step_trailing_y(word: &mut String) {
    if word.ends_with('y') && has_vowel(&word.as_bytes()[..word.len() - 1]) {
        word.pop();
        word.push('i');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_forms() {
        assert_eq!(stem("caresses"), "caress");
        assert_eq!(stem("ponies"), "poni");
        assert_eq!(stem("caress"), "caress");
        assert_eq!(stem("cats"), "cat");
        assert_eq!(stem("profits"), "profit");
    }

    #[test]
    fn past_tense_and_gerunds() {
        assert_eq!(stem("agreed"), "agree");
        assert_eq!(stem("running"), "run");
        assert_eq!(stem("hopping"), "hop");
        assert_eq!(stem("falling"), "fall");
        assert_eq!(stem("conflated"), "conflate");
        // No vowel before the suffix: nothing to strip.
        assert_eq!(stem("sing"), "sing");
    }

    #[test]
    fn trailing_y() {
        assert_eq!(stem("happy"), "happi");
        assert_eq!(stem("sky"), "sky");
    }

    #[test]
    fn short_words_pass_through() {
        assert_eq!(stem("go"), "go");
        assert_eq!(stem("by"), "by");
        assert_eq!(stem("a"), "a");
    }

    #[test]
    fn stemming_is_idempotent_on_its_own_output() {
        for word in ["caresses", "ponies", "running", "agreed", "happy", "profits"] {
            let once = stem(word);
            assert_eq!(stem(&once), once, "not a fixed point for {word}");
        }
    }

    #[test]
    fn stopwords_are_discarded() {
        assert_eq!(process_word("the"), "");
        assert_eq!(process_word("The"), "");
        assert_eq!(process_word("themselves"), "");
    }

    #[test]
    fn process_word_lowercases_and_stems() {
        assert_eq!(process_word("Profits"), "profit");
        assert_eq!(process_word("ROSE"), "rose");
    }

    #[test]
    fn tokenize_splits_on_non_word_characters() {
        let tokens = tokenize("Profit rose 4%, shares fell.");
        assert_eq!(tokens, vec!["profit", "rose", "shares", "fell"]);
    }
}
