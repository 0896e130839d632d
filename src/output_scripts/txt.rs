//! The translator text format: UTF-8, one record per non-empty line, in
//! source order. A `\` stands for the in-game line break (0x0A); empty lines
//! are ignored and do not count as records.
//!
//! ```text
//! 　……あれから、３年。
//! GOTO a001_6
//! ```

/// Serializes extracted messages, one per line with a trailing newline.
pub struct TxtDumper {}

impl TxtDumper {
    pub fn dump(messages: &[String]) -> String {
        let mut result = String::new();
        for message in messages {
            result.push_str(&message.replace('\n', "\\"));
            result.push('\n');
        }
        result
    }
}

/// Parses a translator file back into one replacement string per record.
pub struct TxtParser<'a> {
    str: &'a str,
}

impl<'a> TxtParser<'a> {
    pub fn new(str: &'a str) -> Self {
        TxtParser { str }
    }

    pub fn parse(&self) -> Vec<String> {
        self.str
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(|line| line.replace('\\', "\n"))
            .collect()
    }
}

#[test]
fn test_dump() {
    let messages = vec!["ABC".to_string(), "A\nB".to_string()];
    assert_eq!(TxtDumper::dump(&messages), "ABC\nA\\B\n");
    assert_eq!(TxtDumper::dump(&[]), "");
}

#[test]
fn test_parse() {
    let parsed = TxtParser::new("ABC\n\nA\\B\nGOTO a001_6\n").parse();
    assert_eq!(parsed, vec!["ABC", "A\nB", "GOTO a001_6"]);
}

#[test]
fn test_roundtrip() {
    let messages = vec!["　……あれから、３年。".to_string(), "A\nB\nC".to_string()];
    let dumped = TxtDumper::dump(&messages);
    assert_eq!(TxtParser::new(&dumped).parse(), messages);
}
