//! Typed registry values and their textual form in manifests.
//!
//! Manifests record previous values as text. The encoding per type:
//!
//! | Type            | Text form                                  |
//! |-----------------|--------------------------------------------|
//! | `REG_SZ`        | the string                                 |
//! | `REG_EXPAND_SZ` | the unexpanded string                      |
//! | `REG_DWORD`     | decimal, or `0x` prefixed hexadecimal      |
//! | `REG_QWORD`     | decimal, or `0x` prefixed hexadecimal      |
//! | `REG_BINARY`    | hex byte pairs, separators ignored         |
//! | `REG_MULTI_SZ`  | one string per line                        |

use super::error::{RegistryError, RegistryResult};
use crate::manifest::RegistryValueType;

/// A registry value together with its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValue {
    String(String),
    ExpandString(String),
    Dword(u32),
    Qword(u64),
    Binary(Vec<u8>),
    MultiString(Vec<String>),
}

impl RegistryValue {
    pub fn value_type(&self) -> RegistryValueType {
        match self {
            RegistryValue::String(_) => RegistryValueType::String,
            RegistryValue::ExpandString(_) => RegistryValueType::ExpandString,
            RegistryValue::Dword(_) => RegistryValueType::Dword,
            RegistryValue::Qword(_) => RegistryValueType::Qword,
            RegistryValue::Binary(_) => RegistryValueType::Binary,
            RegistryValue::MultiString(_) => RegistryValueType::MultiString,
        }
    }

    /// String content for the two string types, `None` otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RegistryValue::String(s) | RegistryValue::ExpandString(s) => Some(s),
            _ => None,
        }
    }

    /// Decode the text recorded in a manifest.
    pub fn from_recorded(text: &str, value_type: RegistryValueType) -> RegistryResult<Self> {
        let invalid = |reason: &str| RegistryError::InvalidValue {
            value_type,
            value: text.to_string(),
            reason: reason.to_string(),
        };

        Ok(match value_type {
            RegistryValueType::String => RegistryValue::String(text.to_string()),
            RegistryValueType::ExpandString => RegistryValue::ExpandString(text.to_string()),
            RegistryValueType::Dword => {
                let n = parse_integer(text).ok_or_else(|| invalid("not an integer"))?;
                RegistryValue::Dword(u32::try_from(n).map_err(|_| invalid("out of range"))?)
            }
            RegistryValueType::Qword => {
                RegistryValue::Qword(parse_integer(text).ok_or_else(|| invalid("not an integer"))?)
            }
            RegistryValueType::Binary => {
                RegistryValue::Binary(parse_hex_bytes(text).ok_or_else(|| invalid("not hex bytes"))?)
            }
            RegistryValueType::MultiString => RegistryValue::MultiString(
                text.lines().map(str::to_string).collect(),
            ),
        })
    }

    /// Encode for recording in a manifest.
    pub fn to_recorded(&self) -> String {
        match self {
            RegistryValue::String(s) | RegistryValue::ExpandString(s) => s.clone(),
            RegistryValue::Dword(n) => n.to_string(),
            RegistryValue::Qword(n) => n.to_string(),
            RegistryValue::Binary(bytes) => bytes.iter().map(|b| format!("{:02x}", b)).collect(),
            RegistryValue::MultiString(items) => items.join("\n"),
        }
    }
}

fn parse_integer(text: &str) -> Option<u64> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn parse_hex_bytes(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != ':')
        .collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0].to_digit(16)?;
            let lo = pair[1].to_digit(16)?;
            Some((hi * 16 + lo) as u8)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_types_keep_text() {
        let v = RegistryValue::from_recorded("%USERPROFILE%\\bin", RegistryValueType::ExpandString)
            .unwrap();
        assert_eq!(v, RegistryValue::ExpandString("%USERPROFILE%\\bin".to_string()));
        assert_eq!(v.as_str(), Some("%USERPROFILE%\\bin"));
    }

    #[test]
    fn test_dword_decimal_and_hex() {
        assert_eq!(
            RegistryValue::from_recorded("42", RegistryValueType::Dword).unwrap(),
            RegistryValue::Dword(42)
        );
        assert_eq!(
            RegistryValue::from_recorded("0xff", RegistryValueType::Dword).unwrap(),
            RegistryValue::Dword(255)
        );
    }

    #[test]
    fn test_dword_out_of_range() {
        let err = RegistryValue::from_recorded("4294967296", RegistryValueType::Dword).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidValue { .. }));
    }

    #[test]
    fn test_binary_accepts_separators() {
        assert_eq!(
            RegistryValue::from_recorded("de,ad be:ef", RegistryValueType::Binary).unwrap(),
            RegistryValue::Binary(vec![0xde, 0xad, 0xbe, 0xef])
        );
        assert!(RegistryValue::from_recorded("abc", RegistryValueType::Binary).is_err());
        assert!(RegistryValue::from_recorded("zz", RegistryValueType::Binary).is_err());
    }

    #[test]
    fn test_multi_string_lines() {
        let v = RegistryValue::from_recorded("a\nb", RegistryValueType::MultiString).unwrap();
        assert_eq!(
            v,
            RegistryValue::MultiString(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(v.to_recorded(), "a\nb");
        assert_eq!(v.value_type(), RegistryValueType::MultiString);
    }

    #[test]
    fn test_binary_recorded_form() {
        assert_eq!(RegistryValue::Binary(vec![1, 0xab]).to_recorded(), "01ab");
    }
}
