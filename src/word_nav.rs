#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Punct,
}

pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

fn class_of(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Space
    } else if is_word_char(c) {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

/// Start of the word (or punctuation run) before `pos`.
///
/// Whitespace directly before `pos` is skipped first, so deleting a word backward from
/// `"hello   |"` removes the spaces together with `hello`.
pub fn word_start_before(buf: &[char], pos: usize) -> usize {
    let mut idx = pos.min(buf.len());

    while idx > 0 && class_of(buf[idx - 1]) == CharClass::Space {
        idx -= 1;
    }
    if idx == 0 {
        return 0;
    }

    let class = class_of(buf[idx - 1]);
    while idx > 0 && class_of(buf[idx - 1]) == class {
        idx -= 1;
    }

    idx
}

/// End of the word (or punctuation run) at or after `pos`.
///
/// Starting inside whitespace stops at the beginning of the next run instead.
pub fn word_end_after(buf: &[char], pos: usize) -> usize {
    let len = buf.len();
    let mut idx = pos.min(len);
    if idx == len {
        return len;
    }

    if class_of(buf[idx]) == CharClass::Space {
        while idx < len && class_of(buf[idx]) == CharClass::Space {
            idx += 1;
        }
        return idx;
    }

    let class = class_of(buf[idx]);
    while idx < len && class_of(buf[idx]) == class {
        idx += 1;
    }

    idx
}

pub fn line_start(buf: &[char], pos: usize) -> usize {
    let pos = pos.min(buf.len());
    buf[..pos]
        .iter()
        .rposition(|c| *c == '\n')
        .map(|i| i + 1)
        .unwrap_or(0)
}

pub fn line_end(buf: &[char], pos: usize) -> usize {
    let pos = pos.min(buf.len());
    buf[pos..]
        .iter()
        .position(|c| *c == '\n')
        .map(|i| pos + i)
        .unwrap_or(buf.len())
}
