//! Break penalties from UAX #14 line break opportunities

use unicode_linebreak::linebreaks;

use crate::layout::Penalty;

/// Byte offsets inside a text segment where a line may break
pub(crate) struct BreakOpportunities {
    allowed: Vec<usize>,
    len: usize,
}

impl BreakOpportunities {
    pub(crate) fn new(text: &str) -> Self {
        // The end of the segment always reports a break; what really follows
        // is outside this text, so it is judged separately.
        let allowed = linebreaks(text)
            .map(|(at, _)| at)
            .filter(|&at| at < text.len())
            .collect();

        Self {
            allowed,
            len: text.len(),
        }
    }

    /// Penalty for breaking at byte offset `end`
    ///
    /// `inside` is charged where UAX #14 forbids a break.
    pub(crate) fn penalty_after(&self, end: usize, whitespace: bool, inside: Penalty) -> Penalty {
        if end >= self.len {
            return if whitespace {
                Penalty::WHITESPACE
            } else {
                Penalty::CLIP
            };
        }

        match (self.allowed.binary_search(&end).is_ok(), whitespace) {
            (true, true) => Penalty::WHITESPACE,
            (true, false) => Penalty::WORD,
            (false, _) => inside,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_break_after_space() {
        let b = BreakOpportunities::new("ab cd");
        assert_eq!(b.penalty_after(1, false, Penalty::LETTER), Penalty::LETTER);
        assert_eq!(b.penalty_after(2, false, Penalty::LETTER), Penalty::LETTER);
        assert_eq!(b.penalty_after(3, true, Penalty::LETTER), Penalty::WHITESPACE);
    }

    #[test]
    fn test_break_after_hyphen() {
        let b = BreakOpportunities::new("well-known");
        assert_eq!(b.penalty_after(5, false, Penalty::INTRA), Penalty::WORD);
        assert_eq!(b.penalty_after(4, false, Penalty::INTRA), Penalty::INTRA);
    }

    #[test]
    fn test_segment_end() {
        let b = BreakOpportunities::new("ab ");
        assert_eq!(b.penalty_after(3, false, Penalty::LETTER), Penalty::CLIP);
        assert_eq!(b.penalty_after(3, true, Penalty::LETTER), Penalty::WHITESPACE);
    }
}
