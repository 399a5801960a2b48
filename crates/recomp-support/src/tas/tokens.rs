//! `TOKEN+TOKEN` input lines, e.g. `R+B+A` or `St`.

use recomp_core::Button;

use crate::tas::InputFrame;

fn token_button(token: &str) -> Option<Button> {
    let button = match token.to_ascii_lowercase().as_str() {
        "r" | "right" => Button::Right,
        "l" | "left" => Button::Left,
        "u" | "up" => Button::Up,
        "d" | "down" => Button::Down,
        "b" => Button::B,
        "a" => Button::A,
        "st" | "start" => Button::Start,
        "se" | "select" => Button::Select,
        _ => return None,
    };
    Some(button)
}

/// Parses a `+`-separated token list into a mask.
///
/// `.`, `-` and `none` stand for no buttons. Returns `None` if any token is
/// unknown.
pub fn parse_tokens(text: &str) -> Option<u8> {
    let text = text.trim();
    if matches!(text, "." | "-") || text.eq_ignore_ascii_case("none") {
        return Some(0);
    }
    text.split('+').try_fold(0u8, |mask, token| {
        token_button(token.trim()).map(|button| mask | button.mask())
    })
}

pub(crate) fn parse_line(line: &str) -> Option<InputFrame> {
    parse_tokens(line).map(|mask| InputFrame::new(mask, 0))
}

/// Formats a mask as tokens in bit order from Right down to A.
/// An empty mask is `none`.
pub fn format_mask(mask: u8) -> String {
    let tokens: Vec<&str> = Button::ALL
        .iter()
        .rev()
        .filter(|b| mask & b.mask() != 0)
        .map(|b| match b {
            Button::A => "A",
            Button::B => "B",
            Button::Select => "Se",
            Button::Start => "St",
            Button::Up => "U",
            Button::Down => "D",
            Button::Left => "L",
            Button::Right => "R",
        })
        .collect();
    if tokens.is_empty() {
        "none".to_string()
    } else {
        tokens.join("+")
    }
}
