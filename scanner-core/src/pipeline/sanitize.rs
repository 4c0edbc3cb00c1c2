//! Input sanitisation for scanned tokens and operator input

const ESC: char = '\u{1b}';

/// Remove complete ANSI CSI sequences (`ESC [ params intermediates final`),
/// then any stray ESC characters. An unterminated sequence loses only its ESC.
pub fn sanitize_input(value: &str) -> String {
    let mut cleaned = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(c) = rest.chars().next() {
        if c == ESC {
            rest = match csi_len(rest) {
                Some(len) => &rest[len..],
                None => &rest[ESC.len_utf8()..],
            };
            continue;
        }
        cleaned.push(c);
        rest = &rest[c.len_utf8()..];
    }

    cleaned
}

/// Byte length of the CSI sequence at the start of `s`, if it is complete
fn csi_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.get(1) != Some(&b'[') {
        return None;
    }
    let mut i = 2;
    // parameter bytes 0x30-0x3F, intermediate bytes 0x20-0x2F, one final byte 0x40-0x7E
    while matches!(bytes.get(i), Some(&(0x30..=0x3f))) {
        i += 1;
    }
    while matches!(bytes.get(i), Some(&(0x20..=0x2f))) {
        i += 1;
    }
    match bytes.get(i) {
        Some(&(0x40..=0x7e)) => Some(i + 1),
        _ => None,
    }
}
