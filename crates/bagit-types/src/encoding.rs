use std::fmt;

use crate::error::TypeError;

/// Character encoding declared for all tag files of a bag.
///
/// UTF-8 and ISO-8859-1 are converted exactly. Any other label is kept so it
/// can be written back, but its bytes are treated as (lossy) UTF-8.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TagEncoding {
    #[default]
    Utf8,
    Latin1,
    Other(String),
}

impl TagEncoding {
    /// Interpret an encoding label such as `UTF-8` or `iso-8859-1`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Self::Utf8,
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Self::Latin1,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    /// Canonical label written to `bagit.txt`.
    pub fn label(&self) -> &str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
            Self::Other(label) => label,
        }
    }

    /// Decode tag-file bytes into text.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Other(label) => {
                tracing::warn!("decoding tag file declared as {label} as UTF-8");
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }

    /// Encode text for writing to a tag file.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, TypeError> {
        match self {
            Self::Latin1 => text
                .chars()
                .map(|ch| {
                    u8::try_from(u32::from(ch)).map_err(|_| TypeError::Unencodable {
                        ch,
                        encoding: self.label().to_string(),
                    })
                })
                .collect(),
            Self::Utf8 | Self::Other(_) => Ok(text.as_bytes().to_vec()),
        }
    }
}

impl fmt::Display for TagEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_recognised() {
        assert_eq!(TagEncoding::from_label("UTF-8"), TagEncoding::Utf8);
        assert_eq!(TagEncoding::from_label("utf8"), TagEncoding::Utf8);
        assert_eq!(TagEncoding::from_label("ISO-8859-1"), TagEncoding::Latin1);
        assert_eq!(
            TagEncoding::from_label("Shift_JIS"),
            TagEncoding::Other("Shift_JIS".into())
        );
    }

    #[test]
    fn latin1_decode_maps_high_bytes() {
        let text = TagEncoding::Latin1.decode(&[b'c', b'a', b'f', 0xE9]);
        assert_eq!(text, "café");
    }

    #[test]
    fn latin1_encode_roundtrip() {
        let bytes = TagEncoding::Latin1.encode("café").unwrap();
        assert_eq!(bytes, vec![b'c', b'a', b'f', 0xE9]);
    }

    #[test]
    fn latin1_rejects_wide_chars() {
        let err = TagEncoding::Latin1.encode("snow ☃").unwrap_err();
        assert!(matches!(err, TypeError::Unencodable { ch: '☃', .. }));
    }

    #[test]
    fn other_label_is_preserved() {
        let enc = TagEncoding::from_label(" UTF-16 ");
        assert_eq!(enc.label(), "UTF-16");
    }
}
