use super::raster::{Canvas, Rgba};

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;

/// 3x5 bitmap rows, most significant of the low three bits on the left.
type Glyph = [u8; GLYPH_HEIGHT as usize];

const BLANK: Glyph = [0; 5];
const FALLBACK: Glyph = [0b111, 0b101, 0b101, 0b101, 0b111];

// Lowercase is folded to uppercase before lookup.
const GLYPHS: &[(char, Glyph)] = &[
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b011, 0b100, 0b100, 0b100, 0b011]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b011, 0b100, 0b101, 0b101, 0b011]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b110, 0b101, 0b101, 0b101, 0b101]),
    ('O', [0b010, 0b101, 0b101, 0b101, 0b010]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b010, 0b101, 0b101, 0b110, 0b011]),
    ('R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('S', [0b011, 0b100, 0b010, 0b001, 0b110]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b110, 0b001, 0b010, 0b100, 0b111]),
    ('3', [0b110, 0b001, 0b010, 0b001, 0b110]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b110, 0b001, 0b110]),
    ('6', [0b011, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b010, 0b010, 0b010]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b110]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    (',', [0b000, 0b000, 0b000, 0b010, 0b100]),
    ('!', [0b010, 0b010, 0b010, 0b000, 0b010]),
    ('?', [0b110, 0b001, 0b010, 0b000, 0b010]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    (';', [0b000, 0b010, 0b000, 0b010, 0b100]),
    ('\'', [0b010, 0b010, 0b000, 0b000, 0b000]),
    ('"', [0b101, 0b101, 0b000, 0b000, 0b000]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('+', [0b000, 0b010, 0b111, 0b010, 0b000]),
    ('=', [0b000, 0b111, 0b000, 0b111, 0b000]),
    ('_', [0b000, 0b000, 0b000, 0b000, 0b111]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    ('(', [0b001, 0b010, 0b010, 0b010, 0b001]),
    (')', [0b100, 0b010, 0b010, 0b010, 0b100]),
    ('|', [0b010, 0b010, 0b010, 0b010, 0b010]),
    ('*', [0b000, 0b101, 0b010, 0b101, 0b000]),
    ('#', [0b101, 0b111, 0b101, 0b111, 0b101]),
    ('%', [0b101, 0b001, 0b010, 0b100, 0b101]),
    ('&', [0b010, 0b101, 0b010, 0b101, 0b011]),
    ('$', [0b011, 0b110, 0b010, 0b011, 0b110]),
    ('@', [0b111, 0b101, 0b111, 0b100, 0b111]),
    ('<', [0b001, 0b010, 0b100, 0b010, 0b001]),
    ('>', [0b100, 0b010, 0b001, 0b010, 0b100]),
];

/// Pixel size of one glyph cell plus spacing at a given scale.
pub(crate) const fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale
}

pub(crate) const fn line_advance(scale: i32) -> i32 {
    (GLYPH_HEIGHT + 2) * scale
}

pub(crate) fn text_width(text: &str, scale: i32) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    count * glyph_advance(scale) - scale
}

fn glyph_for(ch: char) -> Glyph {
    if ch == ' ' {
        return BLANK;
    }
    let upper = ch.to_ascii_uppercase();
    GLYPHS
        .iter()
        .find(|(key, _)| *key == upper)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(FALLBACK)
}

pub(crate) fn draw_text(
    canvas: &mut Canvas<'_>,
    x: i32,
    y: i32,
    text: &str,
    scale: i32,
    color: Rgba,
) {
    let scale = scale.max(1);
    let mut cursor_x = x;
    for ch in text.chars() {
        draw_glyph(canvas, cursor_x, y, glyph_for(ch), scale, color);
        cursor_x = cursor_x.saturating_add(glyph_advance(scale));
    }
}

fn draw_glyph(canvas: &mut Canvas<'_>, x: i32, y: i32, glyph: Glyph, scale: i32, color: Rgba) {
    for (row_index, row_bits) in glyph.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if row_bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            canvas.fill_rect(
                x + col * scale,
                y + row_index as i32 * scale,
                scale,
                scale,
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_folds_to_uppercase() {
        assert_eq!(glyph_for('a'), glyph_for('A'));
        assert_eq!(glyph_for('z'), glyph_for('Z'));
    }

    #[test]
    fn chat_prompt_has_no_fallback_glyphs() {
        let sample = "PRESS ENTER TO START TYPING: Selling 2 coal certs! Best prices in town!";
        for ch in sample.chars() {
            if ch != ' ' {
                assert_ne!(glyph_for(ch), FALLBACK, "missing glyph for '{ch}'");
            }
        }
    }

    #[test]
    fn unknown_characters_draw_the_fallback_box() {
        assert_eq!(glyph_for('é'), FALLBACK);
        assert_eq!(glyph_for('~'), FALLBACK);
    }

    #[test]
    fn text_width_drops_the_trailing_gap() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("A", 2), 6);
        assert_eq!(text_width("MAP", 1), 11);
    }

    #[test]
    fn glyph_pixels_land_at_the_scaled_position() {
        let mut frame = vec![0u8; 12 * 12 * 4];
        let mut canvas = Canvas::new(&mut frame, 12, 12);
        draw_text(&mut canvas, 0, 0, "|", 2, [9, 9, 9, 255]);
        // Middle column of the bar starts at x = 2.
        let offset = (2 * 4) as usize;
        assert_eq!(&frame[offset..offset + 4], &[9, 9, 9, 255]);
        assert_eq!(&frame[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn text_off_canvas_is_clipped_safely() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        draw_text(&mut canvas, -50, -3, "HELLO WORLD", 3, [1, 2, 3, 255]);
        draw_text(&mut canvas, 3, 3, "AB", 4, [1, 2, 3, 255]);
    }
}
