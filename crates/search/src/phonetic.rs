//! Soundex-style phonetic codes.

/// Length of a full code: one letter plus three digits.
pub const CODE_LENGTH: usize = 4;

/// Consonant class for a lower-case ASCII letter, `None` for vowels and the
/// silent letters `h`, `w`, `y`.
#[inline]
fn consonant_class(c: char) -> Option<char> {
    match c {
        'b' | 'f' | 'p' | 'v' => Some('1'),
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
        'd' | 't' => Some('3'),
        'l' => Some('4'),
        'm' | 'n' => Some('5'),
        'r' => Some('6'),
        _ => None,
    }
}

/// Compute the four-character phonetic code of a word.
///
/// The first letter is kept (upper-cased), the remaining consonants are
/// mapped to digit classes, vowels are dropped, adjacent duplicate digits are
/// collapsed, and the result is padded with `0` or truncated to three digits.
/// Non-letters are ignored. Returns an empty string when `word` has no ASCII
/// letter.
///
/// # Example
/// ```
/// use birch_search::soundex;
///
/// assert_eq!(soundex("Robert"), "R163");
/// assert_eq!(soundex("whiskey"), soundex("whisky"));
/// ```
pub fn soundex(word: &str) -> String {
    let mut letters = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase());

    let Some(first) = letters.next() else {
        return String::new();
    };

    let mut code = String::with_capacity(CODE_LENGTH);
    code.push(first.to_ascii_uppercase());

    let mut previous = consonant_class(first);
    for digit in letters.filter_map(consonant_class) {
        if Some(digit) == previous {
            continue;
        }
        code.push(digit);
        previous = Some(digit);
        if code.len() == CODE_LENGTH {
            break;
        }
    }

    while code.len() < CODE_LENGTH {
        code.push('0');
    }

    code
}

/// True when both words are longer than one character and share a code.
pub fn sounds_alike(a: &str, b: &str) -> bool {
    if a.chars().count() <= 1 || b.chars().count() <= 1 {
        return false;
    }
    let code_a = soundex(a);
    !code_a.is_empty() && code_a == soundex(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_pairs() {
        assert_eq!(soundex("Robert"), "R163");
        assert_eq!(soundex("Rupert"), "R163");
        assert_eq!(soundex("Rubin"), "R150");
    }

    #[test]
    fn test_padding_and_truncation() {
        assert_eq!(soundex("gin"), "G500");
        assert_eq!(soundex("a"), "A000");
        assert_eq!(soundex("chartreuse"), "C636");
    }

    #[test]
    fn test_first_letter_class_not_repeated() {
        // 'p' after 'p'-class first letter is dropped
        assert_eq!(soundex("Pfister"), "P236");
    }

    #[test]
    fn test_ignores_non_letters_and_case() {
        assert_eq!(soundex("Peychaud's"), soundex("peychauds"));
        assert_eq!(soundex("123"), "");
        assert_eq!(soundex(""), "");
    }

    #[test]
    fn test_sounds_alike() {
        assert!(sounds_alike("whiskey", "whisky"));
        assert!(sounds_alike("Cointreau", "cointro"));
        assert!(!sounds_alike("gin", "rum"));
        assert!(!sounds_alike("g", "g"));
    }
}
