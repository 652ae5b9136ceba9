//! Control-code parsing for scroll text.
//!
//! `{TAG:value}` fragments are stripped out of the source text in one pass
//! that records each directive's position in the stripped text. A second
//! stage resolves those character positions to pixel positions once glyph
//! metrics are available.

use super::ScrollStyle;
use super::font::Font;

/// Characters per screen width assumed by the SKIP expansion.
const SKIP_GLYPHS_PER_SCREEN: f64 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CodeKind {
    /// Halt scrolling for this many seconds.
    Pause(f64),
    /// New scroll speed in px/s (never negative).
    Speed(f64),
    /// Switch the render style.
    Style(ScrollStyle),
    /// Tint override; (0,0,0) is the "back to the default gradient" sentinel.
    Color(u8, u8, u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlCode {
    /// Character index into the stripped display text.
    pub char_pos: usize,
    pub kind: CodeKind,
}

/// Stage one output: display text plus codes at character positions.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedScroll {
    pub display: String,
    pub codes: Vec<ControlCode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCode {
    pub kind: CodeKind,
    pub char_pos: usize,
    /// Sum of glyph advances and kerning up to `char_pos`.
    pub pixel_pos: f64,
}

/// Stage two output: codes carry pixel positions, and the total rendered
/// width of the display text is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedScroll {
    pub display: String,
    pub codes: Vec<ResolvedCode>,
    pub total_width: f64,
}

/// Strip control codes out of `text`. Malformed fragments are removed
/// without producing a record; `SKIP` expands into spaces on the spot.
pub fn parse(text: &str, viewport_width: usize) -> ParsedScroll {
    let mut display = String::with_capacity(text.len());
    let mut codes = Vec::new();
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '{' {
            display.push(ch);
            continue;
        }

        // Collect up to the closing brace; an unterminated fragment eats
        // the rest of the text and produces nothing.
        let mut body = String::new();
        let mut terminated = false;
        for c in chars.by_ref() {
            if c == '}' {
                terminated = true;
                break;
            }
            body.push(c);
        }
        if !terminated {
            break;
        }

        let Some((tag, value)) = body.split_once(':') else {
            continue;
        };
        let char_pos = display.chars().count();

        match tag.to_ascii_uppercase().as_str() {
            "PAUSE" => {
                if let Ok(secs) = value.trim().parse::<f64>()
                    && secs.is_finite()
                    && secs >= 0.0
                {
                    codes.push(ControlCode {
                        char_pos,
                        kind: CodeKind::Pause(secs),
                    });
                }
            }
            "SPEED" => {
                if let Ok(speed) = value.trim().parse::<f64>()
                    && speed.is_finite()
                    && speed >= 0.0
                {
                    codes.push(ControlCode {
                        char_pos,
                        kind: CodeKind::Speed(speed),
                    });
                }
            }
            "STYLE" => {
                let style = match value.trim().to_ascii_lowercase().as_str() {
                    "wave" => Some(ScrollStyle::Wave),
                    "classic" => Some(ScrollStyle::Classic),
                    "roller" => Some(ScrollStyle::Roller),
                    "bounce" => Some(ScrollStyle::Bounce),
                    _ => None,
                };
                if let Some(style) = style {
                    codes.push(ControlCode {
                        char_pos,
                        kind: CodeKind::Style(style),
                    });
                }
            }
            "COLOR" => {
                let mut parts = value.split(',').map(|p| p.trim().parse::<u8>());
                if let (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) =
                    (parts.next(), parts.next(), parts.next(), parts.next())
                {
                    codes.push(ControlCode {
                        char_pos,
                        kind: CodeKind::Color(r, g, b),
                    });
                }
            }
            "SKIP" => {
                // Pure text expansion: a run of spaces, no runtime record.
                if let Ok(screens) = value.trim().parse::<f64>()
                    && screens.is_finite()
                    && screens >= 0.0
                {
                    let count =
                        (screens * viewport_width as f64 / SKIP_GLYPHS_PER_SCREEN).round() as usize;
                    for _ in 0..count {
                        display.push(' ');
                    }
                }
            }
            _ => {}
        }
    }

    ParsedScroll { display, codes }
}

/// Resolve character positions into pixel positions with real glyph
/// metrics. Called once per distinct source text (and again when the
/// metrics change, e.g. a glyph-scale switch).
pub fn resolve(parsed: &ParsedScroll, font: &mut Font) -> ResolvedScroll {
    let chars: Vec<char> = parsed.display.chars().collect();

    // Prefix sums of advance + kerning at every character boundary.
    let mut prefix = Vec::with_capacity(chars.len() + 1);
    let mut x = 0.0;
    prefix.push(0.0);
    for (i, &ch) in chars.iter().enumerate() {
        let mut adv = font.advance(ch);
        if i > 0 {
            adv += font.kerning(chars[i - 1], ch);
        }
        x += adv;
        prefix.push(x);
    }

    let codes = parsed
        .codes
        .iter()
        .map(|code| ResolvedCode {
            kind: code.kind,
            char_pos: code.char_pos,
            pixel_pos: prefix[code.char_pos.min(chars.len())],
        })
        .collect();

    ResolvedScroll {
        display: parsed.display.clone(),
        codes,
        total_width: x,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_is_stripped_and_recorded() {
        let parsed = parse("AB{PAUSE:2}CD", 800);
        assert_eq!(parsed.display, "ABCD");
        assert_eq!(parsed.codes.len(), 1);
        assert_eq!(parsed.codes[0].char_pos, 2);
        assert_eq!(parsed.codes[0].kind, CodeKind::Pause(2.0));
    }

    #[test]
    fn test_skip_expands_into_spaces() {
        let parsed = parse("A{SKIP:1.0}{PAUSE:1}B", 800);
        let expected_spaces = (800.0f64 / 35.0).round() as usize;
        assert_eq!(expected_spaces, 23);
        assert_eq!(
            parsed.display,
            format!("A{}B", " ".repeat(expected_spaces))
        );
        // The following code lands after the inserted run.
        assert_eq!(parsed.codes.len(), 1);
        assert_eq!(parsed.codes[0].char_pos, 1 + expected_spaces);
    }

    #[test]
    fn test_skip_scales_with_viewport() {
        let narrow = parse("{SKIP:2.0}", 350);
        assert_eq!(narrow.display.len(), 20);
    }

    #[test]
    fn test_malformed_codes_are_silently_dropped() {
        assert_eq!(parse("A{PAUSE:x}B", 800).codes.len(), 0);
        assert_eq!(parse("A{PAUSE:x}B", 800).display, "AB");
        assert_eq!(parse("A{WHAT:3}B", 800).display, "AB");
        assert_eq!(parse("A{NOCOLON}B", 800).display, "AB");
        assert_eq!(parse("A{SPEED:-5}B", 800).codes.len(), 0);
        assert_eq!(parse("A{COLOR:1,2}B", 800).codes.len(), 0);
        assert_eq!(parse("A{COLOR:1,2,3,4}B", 800).codes.len(), 0);
        // Unterminated brace swallows the tail and yields nothing.
        let parsed = parse("AB{PAUSE:2", 800);
        assert_eq!(parsed.display, "AB");
        assert!(parsed.codes.is_empty());
    }

    #[test]
    fn test_style_and_color_codes() {
        let parsed = parse("{STYLE:roller}{COLOR:255,0,128}{COLOR:0,0,0}X", 800);
        assert_eq!(parsed.display, "X");
        assert_eq!(parsed.codes.len(), 3);
        assert_eq!(parsed.codes[0].kind, CodeKind::Style(ScrollStyle::Roller));
        assert_eq!(parsed.codes[1].kind, CodeKind::Color(255, 0, 128));
        assert_eq!(parsed.codes[2].kind, CodeKind::Color(0, 0, 0));
        // Codes at the same point keep source order.
        assert!(parsed.codes.windows(2).all(|w| w[0].char_pos <= w[1].char_pos));
    }

    #[test]
    fn test_resolve_sums_advances() {
        let mut font = Font::new(1);
        let parsed = parse("AB{SPEED:90}CD", 800);
        let resolved = resolve(&parsed, &mut font);
        let expected = font.advance('A') + font.advance('B') + font.kerning('A', 'B');
        assert_eq!(resolved.codes.len(), 1);
        assert!((resolved.codes[0].pixel_pos - expected).abs() < 1e-9);
        let full: f64 = "ABCD"
            .chars()
            .map(|c| font.advance(c))
            .sum();
        assert!((resolved.total_width - full).abs() < 1e-9);
    }

    #[test]
    fn test_reparse_is_deterministic() {
        let a = parse("HI{PAUSE:1}THERE", 640);
        let b = parse("HI{PAUSE:1}THERE", 640);
        assert_eq!(a, b);
    }
}
