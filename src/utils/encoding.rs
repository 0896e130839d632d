use crate::types::*;

pub fn decode_to_string(encoding: Encoding, data: &[u8]) -> Result<String, anyhow::Error> {
    match encoding {
        Encoding::Utf8 => Ok(String::from_utf8(data.to_vec())?),
        Encoding::Cp932 => {
            let result = encoding_rs::SHIFT_JIS.decode(data);
            if result.2 {
                Err(anyhow::anyhow!("Failed to decode Shift-JIS"))
            } else {
                Ok(result.0.to_string())
            }
        }
    }
}

pub fn encode_string(
    encoding: Encoding,
    data: &str,
    check: bool,
) -> Result<Vec<u8>, anyhow::Error> {
    match encoding {
        Encoding::Utf8 => Ok(data.as_bytes().to_vec()),
        Encoding::Cp932 => {
            let result = encoding_rs::SHIFT_JIS.encode(data);
            if result.2 {
                if check {
                    return Err(anyhow::anyhow!("Failed to encode Shift-JIS"));
                }
                eprintln!(
                    "Warning: Some characters could not be encoded in Shift-JIS: {}",
                    data
                );
                crate::COUNTER.inc_warning();
            }
            Ok(result.0.to_vec())
        }
    }
}

#[test]
fn test_decode_to_string() {
    assert_eq!(
        decode_to_string(Encoding::Utf8, &[227, 129, 130, 227, 129, 132]).unwrap(),
        "あい".to_string()
    );
    assert_eq!(
        decode_to_string(
            Encoding::Cp932,
            &[
                130, 171, 130, 225, 130, 215, 130, 194, 130, 187, 130, 211, 130, 198
            ]
        )
        .unwrap(),
        "きゃべつそふと".to_string()
    );
    // ASCII passes through unchanged, including the in-game line break.
    assert_eq!(
        decode_to_string(Encoding::Cp932, b"AB\nC").unwrap(),
        "AB\nC".to_string()
    );
}

#[test]
fn test_encode_string() {
    assert_eq!(
        encode_string(Encoding::Cp932, "きゃべつそふと", true).unwrap(),
        vec![
            130, 171, 130, 225, 130, 215, 130, 194, 130, 187, 130, 211, 130, 198
        ]
    );
    assert_eq!(
        encode_string(Encoding::Cp932, "ABC", true).unwrap(),
        b"ABC".to_vec()
    );
    assert!(encode_string(Encoding::Cp932, "한글", true).is_err());
}
