pub fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}

pub(crate) fn split_text(text: &str, offset: usize) -> (String, String) {
    let byte_idx = char_to_byte_idx(text, offset);
    (text[..byte_idx].to_string(), text[byte_idx..].to_string())
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

pub fn previous_word_boundary(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut idx = offset.min(chars.len());

    while idx > 0 && chars[idx - 1].is_whitespace() {
        idx -= 1;
    }
    if idx == 0 {
        return 0;
    }

    if is_word_char(chars[idx - 1]) {
        while idx > 0 && is_word_char(chars[idx - 1]) {
            idx -= 1;
        }
    } else {
        while idx > 0 && !is_word_char(chars[idx - 1]) && !chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
    }
    idx
}

pub fn next_word_boundary(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut idx = offset.min(len);
    if idx >= len {
        return len;
    }

    if chars[idx].is_whitespace() {
        while idx < len && chars[idx].is_whitespace() {
            idx += 1;
        }
        return idx;
    }

    while idx < len && is_word_char(chars[idx]) {
        idx += 1;
    }
    while idx < len && !chars[idx].is_whitespace() && !is_word_char(chars[idx]) {
        idx += 1;
    }
    while idx < len && chars[idx].is_whitespace() && chars[idx] != '\n' {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_offsets_map_to_byte_offsets() {
        assert_eq!(char_to_byte_idx("héllo", 2), 3);
        assert_eq!(char_to_byte_idx("héllo", 99), "héllo".len());
        assert_eq!(split_text("Tiếng Việt", 5), ("Tiếng".to_string(), " Việt".to_string()));
    }

    #[test]
    fn word_boundaries_skip_whitespace_and_punctuation() {
        let text = "foo bar, baz";
        assert_eq!(previous_word_boundary(text, text.len()), 9);
        assert_eq!(previous_word_boundary(text, 9), 7);
        assert_eq!(previous_word_boundary(text, 7), 4);
        assert_eq!(previous_word_boundary(text, 2), 0);

        assert_eq!(next_word_boundary(text, 0), 4);
        assert_eq!(next_word_boundary(text, 4), 9);
        assert_eq!(next_word_boundary(text, 9), 12);
    }

    #[test]
    fn next_word_stops_at_block_breaks() {
        assert_eq!(next_word_boundary("one\ntwo", 0), 3);
        assert_eq!(next_word_boundary("one\ntwo", 3), 4);
    }
}
