use facet::Facet;
use std::fmt;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Render bytes for a terminal: printable ASCII (32..=126) passes through,
/// every other byte becomes a `\xNN` escape with lowercase hex digits.
pub fn safe_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (32..=126).contains(&b) {
            out.push(b as char);
        } else {
            out.push('\\');
            out.push('x');
            out.push(HEX_DIGITS[(b >> 4) as usize] as char);
            out.push(HEX_DIGITS[(b & 0x0f) as usize] as char);
        }
    }
    out
}

/// One raw entry read from an engine snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KvEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl KvEntry {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn rendered_key(&self) -> String {
        safe_string(&self.key)
    }

    pub fn rendered_value(&self) -> String {
        safe_string(&self.value)
    }
}

/// An entry the scanner decided to report. `index` is the 1-based position
/// of the entry in the scan, counting every entry visited, not only hits.
#[derive(Facet, Clone, Debug, PartialEq, Eq)]
pub struct ScanHit {
    pub index: u64,
    pub key: String,
    pub value: String,
}

impl fmt::Display for ScanHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] key: {}, value: {}", self.index, self.key, self.value)
    }
}
