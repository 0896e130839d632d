//! Extraction and injection of translator text for one decompressed script.
use super::container;
use super::scan::{self, TextRecord, RECORD_MARK, SCRIPT_CALL_OP};
use crate::format::FixedFormatter;
use crate::types::*;
use crate::utils::encoding::encode_string;
use anyhow::Result;

/// Translator lines starting with this prefix inject a script call instead
/// of plain text.
pub const GOTO_PREFIX: &str = "GOTO ";
/// A record's text length must fit its one-byte length field.
pub const MAX_RECORD_LEN: usize = 0xFF;

#[derive(Debug, Default)]
/// What happened to the records of one file during injection.
pub struct InjectReport {
    /// Records replaced with translated bytes.
    pub replaced: usize,
    /// Records skipped because the encoded text exceeds 255 bytes.
    pub skipped_oversize: usize,
    /// Records skipped because the body would exceed the 16-bit size field.
    pub skipped_budget: usize,
    /// Total bytes the body would have gone over budget.
    pub overflow: usize,
}

impl InjectReport {
    /// True when any record kept its original Japanese bytes.
    pub fn is_partial(&self) -> bool {
        self.skipped_oversize + self.skipped_budget > 0
    }
}

#[derive(Debug)]
/// The rebuilt decompressed container plus its per-record outcome.
pub struct Injected {
    pub data: Vec<u8>,
    pub report: InjectReport,
}

#[derive(Debug)]
/// A decompressed CC script with its text records located.
pub struct CcScript {
    data: Vec<u8>,
    records: Vec<TextRecord>,
    encoding: Encoding,
}

impl CcScript {
    pub fn new(data: Vec<u8>, encoding: Encoding) -> Result<Self> {
        if data.len() < container::HEADER_LEN {
            return Err(ScriptError::FileTooSmall(data.len()).into());
        }
        let records = scan::scan(&data, encoding)?;
        Ok(CcScript {
            data,
            records,
            encoding,
        })
    }

    pub fn records(&self) -> &[TextRecord] {
        &self.records
    }

    /// Returns the decoded text of every record, in source order. In-game
    /// line breaks stay as `\n`; the translator-file escaping belongs to the
    /// text serializer.
    pub fn extract_messages(&self) -> Vec<String> {
        self.records.iter().map(|r| r.text.clone()).collect()
    }

    /// Rebuilds the script with `replacements` substituted for its records.
    ///
    /// Every record must have a replacement line. A record whose encoded
    /// replacement does not fit (its own length field, or the whole-body
    /// budget) keeps its original bytes and is counted in the report;
    /// later records are still processed.
    pub fn import_messages(
        &self,
        replacements: &[String],
        formatter: &FixedFormatter,
    ) -> Result<Injected> {
        if replacements.len() != self.records.len() {
            return Err(ScriptError::Mismatch {
                records: self.records.len(),
                lines: replacements.len(),
            }
            .into());
        }

        let mut report = InjectReport::default();
        // The declared length is authoritative, not the scanned body size.
        let mut body_len = container::body_len_field(&self.data) as usize;
        let mut groups: Vec<Option<Vec<u8>>> = Vec::with_capacity(self.records.len());
        for (record, line) in self.records.iter().zip(replacements) {
            let group = match self.encode_record(line, formatter)? {
                Some(group) => group,
                None => {
                    report.skipped_oversize += 1;
                    groups.push(None);
                    continue;
                }
            };
            let next = body_len as isize + group.len() as isize - record.group_len() as isize;
            if next > container::MAX_BODY_LEN as isize {
                report.skipped_budget += 1;
                report.overflow += (next - container::MAX_BODY_LEN as isize) as usize;
                groups.push(None);
                continue;
            }
            body_len = next as usize;
            report.replaced += 1;
            groups.push(Some(group));
        }

        let mut data = Vec::with_capacity(container::HEADER_LEN + body_len);
        data.extend_from_slice(&self.data[..container::HEADER_LEN]);
        container::set_body_len_field(&mut data, body_len as u16);
        // Replace record byte groups in order, moving the cursor past each
        // one so identical byte sequences elsewhere never match twice.
        let mut cursor = container::HEADER_LEN;
        for (record, group) in self.records.iter().zip(groups) {
            let old = record.group();
            let found = find_group(&self.data, cursor, &old)
                .ok_or(ScriptError::LostAnchor { cursor })?;
            data.extend_from_slice(&self.data[cursor..found]);
            match group {
                Some(group) => data.extend_from_slice(&group),
                None => data.extend_from_slice(&old),
            }
            cursor = found + old.len();
        }
        data.extend_from_slice(&self.data[cursor..]);
        Ok(Injected { data, report })
    }

    /// Encodes one replacement line into its record byte group, or `None`
    /// when the encoded text overflows the one-byte length field.
    fn encode_record(&self, line: &str, formatter: &FixedFormatter) -> Result<Option<Vec<u8>>> {
        let (prefix, text) = match line.strip_prefix(GOTO_PREFIX) {
            Some(target) => (Some(SCRIPT_CALL_OP), target.to_string()),
            None => (None, formatter.format(line)),
        };
        let bytes = encode_string(self.encoding, &text, false)?;
        if bytes.len() > MAX_RECORD_LEN {
            return Ok(None);
        }
        let mut group = Vec::with_capacity(bytes.len() + 4);
        if let Some(op) = prefix {
            group.push(op);
        }
        group.push(RECORD_MARK);
        group.push(bytes.len() as u8);
        group.extend_from_slice(&bytes);
        group.push(0x00);
        Ok(Some(group))
    }
}

fn find_group(data: &[u8], start: usize, group: &[u8]) -> Option<usize> {
    data[start..]
        .windows(group.len())
        .position(|w| w == group)
        .map(|i| start + i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DEFAULT_WRAP_WIDTH;

    fn script_with_body(body: &[u8]) -> Vec<u8> {
        let mut script = vec![0u8; container::HEADER_LEN];
        container::set_body_len_field(&mut script, body.len() as u16);
        script.extend_from_slice(body);
        script
    }

    fn formatter() -> FixedFormatter {
        FixedFormatter::new(DEFAULT_WRAP_WIDTH)
    }

    fn inject(body: &[u8], lines: &[&str]) -> Injected {
        let script = CcScript::new(script_with_body(body), Encoding::Cp932).unwrap();
        let lines: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        script.import_messages(&lines, &formatter()).unwrap()
    }

    #[test]
    fn test_replace_same_size() {
        let out = inject(&[0xFD, 0x03, b'A', b'B', b'C', 0x00], &["XYZ"]);
        assert_eq!(
            &out.data[container::HEADER_LEN..],
            &[0xFD, 0x03, b'X', b'Y', b'Z', 0x00]
        );
        assert_eq!(container::body_len_field(&out.data), 6);
        assert!(!out.report.is_partial());
    }

    #[test]
    fn test_replace_growing_record() {
        let out = inject(&[0xFD, 0x01, b'A', 0x00], &["HELLO"]);
        assert_eq!(
            &out.data[container::HEADER_LEN..],
            &[0xFD, 0x05, b'H', b'E', b'L', b'L', b'O', 0x00]
        );
        assert_eq!(container::body_len_field(&out.data), 8);
        assert!(!out.report.is_partial());
    }

    #[test]
    fn test_oversize_record_keeps_original() {
        let body = [
            0xFD, 0x01, b'A', 0x00, 0x02, 0xFD, 0x01, b'B', 0x00,
        ];
        let long = "x".repeat(300);
        let out = inject(&body, &[long.as_str(), "Y"]);
        assert_eq!(out.report.skipped_oversize, 1);
        assert_eq!(out.report.replaced, 1);
        assert!(out.report.is_partial());
        assert_eq!(
            &out.data[container::HEADER_LEN..],
            &[0xFD, 0x01, b'A', 0x00, 0x02, 0xFD, 0x01, b'Y', 0x00]
        );
    }

    #[test]
    fn test_body_budget_overflow() {
        let mut body = vec![0xFD, 0x01, b'A', 0x00];
        body.resize(0xFFFE, 0x00);
        let out = inject(&body, &["HELL"]);
        assert_eq!(out.report.skipped_budget, 1);
        assert_eq!(out.report.overflow, 2);
        assert!(out.report.is_partial());
        assert_eq!(container::body_len_field(&out.data), 0xFFFE);
        assert_eq!(&out.data[container::HEADER_LEN..], &body[..]);
    }

    #[test]
    fn test_goto_directive() {
        let out = inject(&[0xFD, 0x01, b'A', 0x00], &["GOTO a001_6"]);
        assert_eq!(
            &out.data[container::HEADER_LEN..],
            &[0x07, 0xFD, 0x06, b'a', b'0', b'0', b'1', b'_', b'6', 0x00]
        );
        assert_eq!(container::body_len_field(&out.data), 10);
    }

    #[test]
    fn test_goto_oversize_target_keeps_original() {
        let line = format!("GOTO {}", "a".repeat(300));
        let out = inject(&[0xFD, 0x01, b'A', 0x00], &[line.as_str()]);
        assert_eq!(out.report.skipped_oversize, 1);
        assert_eq!(&out.data[container::HEADER_LEN..], &[0xFD, 0x01, b'A', 0x00]);
    }

    #[test]
    fn test_identical_records_replace_in_order() {
        let body = [
            0xFD, 0x01, b'A', 0x00, 0xFD, 0x01, b'A', 0x00,
        ];
        let out = inject(&body, &["B", "C"]);
        assert_eq!(
            &out.data[container::HEADER_LEN..],
            &[0xFD, 0x01, b'B', 0x00, 0xFD, 0x01, b'C', 0x00]
        );
    }

    #[test]
    fn test_line_break_escape_roundtrip() {
        let body = [0xFD, 0x03, b'A', 0x0A, b'B', 0x00];
        let script = CcScript::new(script_with_body(&body), Encoding::Cp932).unwrap();
        assert_eq!(script.extract_messages(), vec!["A\nB".to_string()]);
        let out = script
            .import_messages(&["A\nB".to_string()], &formatter())
            .unwrap();
        assert_eq!(&out.data[container::HEADER_LEN..], &body[..]);
    }

    #[test]
    fn test_mismatch_fails_whole_file() {
        let script =
            CcScript::new(script_with_body(&[0xFD, 0x01, b'A', 0x00]), Encoding::Cp932).unwrap();
        let err = script
            .import_messages(&["A".to_string(), "B".to_string()], &formatter())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScriptError>(),
            Some(ScriptError::Mismatch {
                records: 1,
                lines: 2
            })
        ));
    }

    #[test]
    fn test_opcode_bytes_pass_through() {
        let body = [
            0x07, 0x31, 0xFD, 0x01, b'A', 0x00, 0x12, 0xFB, 0x01,
        ];
        let out = inject(&body, &["B"]);
        assert_eq!(
            &out.data[container::HEADER_LEN..],
            &[0x07, 0x31, 0xFD, 0x01, b'B', 0x00, 0x12, 0xFB, 0x01]
        );
    }

    #[test]
    fn test_injected_body_length_matches_field() {
        let body = [0xFD, 0x01, b'A', 0x00, 0xFD, 0x02, b'B', b'C', 0x00];
        let out = inject(&body, &["LONGER", "BC"]);
        assert_eq!(
            container::body_len_field(&out.data) as usize,
            out.data.len() - container::HEADER_LEN
        );
    }
}
