/// Line width at which the engine's auto wrap kicks in. The game's public
/// notes quote 52, but the shipped behavior breaks at 53; this constant keeps
/// the observed value and stays overridable from the command line.
pub const DEFAULT_WRAP_WIDTH: usize = 53;

/// Wraps message lines the way the game engine expects: once a line reaches
/// the width limit, the most recent space of that line becomes a line break.
/// A line without any space is left to run long; the engine renders it as-is.
pub struct FixedFormatter {
    length: usize,
}

impl FixedFormatter {
    pub fn new(length: usize) -> Self {
        FixedFormatter { length }
    }

    /// Formats a message, counting width in Unicode characters.
    pub fn format(&self, message: &str) -> String {
        let mut vec: Vec<char> = message.chars().collect();
        let mut width = 0;
        let mut last_space = None;

        for i in 0..vec.len() {
            let c = vec[i];
            if c == '\n' {
                width = 0;
                last_space = None;
                continue;
            }
            if c == ' ' {
                last_space = Some(i);
            }
            width += 1;
            if width >= self.length {
                if let Some(space) = last_space.take() {
                    vec[space] = '\n';
                    width = i - space;
                }
            }
        }

        vec.into_iter().collect()
    }
}

#[test]
fn test_format() {
    let formatter = FixedFormatter::new(10);
    assert_eq!(formatter.format("short"), "short");
    assert_eq!(formatter.format("aaaa bbbb cccc"), "aaaa bbbb\ncccc");
    // A line without a space is left alone.
    assert_eq!(formatter.format("aaaaaaaaaaaaaa"), "aaaaaaaaaaaaaa");
    // The first space after the limit still breaks the line.
    assert_eq!(formatter.format("abcdefghij klm"), "abcdefghij\nklm");
    // Existing breaks reset the width count.
    assert_eq!(formatter.format("aaaa\nbbbb cccc dd"), "aaaa\nbbbb cccc\ndd");
    // A space on a previous line is never reused.
    assert_eq!(formatter.format("aa bb\ncccccccccccc"), "aa bb\ncccccccccccc");
}

#[test]
fn test_format_multiple_breaks() {
    let formatter = FixedFormatter::new(10);
    assert_eq!(
        formatter.format("aaaa bbbb cccc dddd eeee"),
        "aaaa bbbb\ncccc dddd\neeee"
    );
}

#[test]
fn test_format_width_invariant() {
    let formatter = FixedFormatter::new(DEFAULT_WRAP_WIDTH);
    let message = "word ".repeat(40);
    let formatted = formatter.format(&message);
    for line in formatted.split('\n') {
        assert!(
            line.chars().count() <= DEFAULT_WRAP_WIDTH,
            "line too long: {}",
            line
        );
    }
}

#[test]
fn test_format_counts_characters_not_bytes() {
    let formatter = FixedFormatter::new(4);
    // Four full-width characters reach the limit, so the space breaks.
    assert_eq!(formatter.format("あい うえ"), "あい\nうえ");
}
