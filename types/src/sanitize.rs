//! Single-line text sanitization for remote record fields.
//!
//! User records come straight off the network, so every field that reaches
//! the terminal goes through [`sanitize_display_line`] first. Escape
//! sequences (CSI, OSC, DCS/PM/APC, two-byte ESC commands) are dropped, C0/C1
//! controls and DEL are removed, and line breaks or tabs collapse to a single
//! space so a field can never spill into the next row.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const C1_CSI: char = '\u{009b}';

/// Sanitize untrusted text for display on one terminal line.
///
/// Returns `Cow::Borrowed` when the input is already clean.
///
/// ```
/// use roster_types::sanitize_display_line;
///
/// assert_eq!(sanitize_display_line("Ervin Howell"), "Ervin Howell");
/// assert_eq!(sanitize_display_line("Ervin\x1b[2J Howell"), "Ervin Howell");
/// assert_eq!(sanitize_display_line("Deckow\n-Crist"), "Deckow -Crist");
/// ```
#[must_use]
pub fn sanitize_display_line(input: &str) -> Cow<'_, str> {
    if !input.chars().any(needs_rewrite) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        match classify(c) {
            Class::Escape => skip_escape(&mut chars),
            Class::C1Csi => skip_csi(&mut chars),
            Class::Whitespace => pending_space = true,
            Class::Dropped => {}
            Class::Plain => {
                if pending_space {
                    if !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                    pending_space = false;
                }
                out.push(c);
            }
        }
    }

    Cow::Owned(out)
}

enum Class {
    Escape,
    C1Csi,
    Whitespace,
    Dropped,
    Plain,
}

fn classify(c: char) -> Class {
    match c {
        ESC => Class::Escape,
        C1_CSI => Class::C1Csi,
        '\n' | '\r' | '\t' => Class::Whitespace,
        '\x00'..='\x1f' | '\x7f' | '\u{0080}'..='\u{009f}' => Class::Dropped,
        _ => Class::Plain,
    }
}

fn needs_rewrite(c: char) -> bool {
    !matches!(classify(c), Class::Plain)
}

fn skip_escape(chars: &mut Peekable<Chars<'_>>) {
    let Some(&next) = chars.peek() else {
        return;
    };
    match next {
        '[' => {
            chars.next();
            skip_csi(chars);
        }
        ']' => {
            chars.next();
            skip_string(chars, true);
        }
        'P' | '^' | '_' => {
            chars.next();
            skip_string(chars, false);
        }
        '(' | ')' | '*' | '+' | '#' | ' ' => {
            chars.next();
            chars.next();
        }
        '7' | '8' | 'c' | 'D' | 'E' | 'H' | 'M' | 'N' | 'O' | 'Z' | '=' | '>' | '<' => {
            chars.next();
        }
        _ => {}
    }
}

/// Parameter and intermediate bytes run until a final byte in `0x40..=0x7e`.
fn skip_csi(chars: &mut Peekable<Chars<'_>>) {
    while let Some(&c) = chars.peek() {
        match c {
            '\x40'..='\x7e' => {
                chars.next();
                return;
            }
            '\x20'..='\x3f' => {
                chars.next();
            }
            _ => return,
        }
    }
}

/// Consume a control string up to ST (`ESC \`), or BEL when `bel_terminates`.
fn skip_string(chars: &mut Peekable<Chars<'_>>, bel_terminates: bool) {
    while let Some(c) = chars.next() {
        if c == BEL && bel_terminates {
            return;
        }
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}
