//! RPM header structure reader
//!
//! An RPM file is a 96 byte lead, a signature header padded to an 8 byte
//! boundary, the main header, then the payload. Both headers share one
//! layout: an 8 byte preamble (magic + version + reserved), the entry count
//! and store size as big-endian u32s, 16 byte index entries, then the store.

use std::collections::HashMap;

use crate::domain::error::PulpError;

pub const LEAD_SIZE: usize = 96;
pub const LEAD_MAGIC: [u8; 4] = [0xed, 0xab, 0xee, 0xdb];
pub const HEADER_MAGIC: [u8; 3] = [0x8e, 0xad, 0xe8];

const PREAMBLE_SIZE: usize = 16;
const INDEX_ENTRY_SIZE: usize = 16;

/// Upper bound on index entries, rejects absurd counts before allocating
const MAX_INDEX_ENTRIES: usize = 1 << 16;

/// Header tags used when building units
pub mod tags {
    pub const NAME: u32 = 1000;
    pub const VERSION: u32 = 1001;
    pub const RELEASE: u32 = 1002;
    pub const EPOCH: u32 = 1003;
    pub const ARCH: u32 = 1022;
    pub const SOURCERPM: u32 = 1044;
    pub const PROVIDENAME: u32 = 1047;
    pub const REQUIREFLAGS: u32 = 1048;
    pub const REQUIRENAME: u32 = 1049;
    pub const REQUIREVERSION: u32 = 1050;
    pub const SOURCEPACKAGE: u32 = 1106;
    pub const PROVIDEFLAGS: u32 = 1112;
    pub const PROVIDEVERSION: u32 = 1113;
}

/// Signature header tags carrying OpenPGP signatures
pub mod sigtags {
    pub const DSA: u32 = 267;
    pub const RSA: u32 = 268;
    pub const PGP: u32 = 1002;
    pub const GPG: u32 = 1005;
}

/// Entry data types
pub mod types {
    pub const NULL: u32 = 0;
    pub const CHAR: u32 = 1;
    pub const INT8: u32 = 2;
    pub const INT16: u32 = 3;
    pub const INT32: u32 = 4;
    pub const INT64: u32 = 5;
    pub const STRING: u32 = 6;
    pub const BIN: u32 = 7;
    pub const STRING_ARRAY: u32 = 8;
    pub const I18NSTRING: u32 = 9;
}

/// A decoded header entry value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Null,
    Int(Vec<u64>),
    String(String),
    StringArray(Vec<String>),
    Binary(Vec<u8>),
}

/// A parsed header: tag number to value
#[derive(Debug, Clone, Default)]
pub struct Header {
    entries: HashMap<u32, TagValue>,
}

impl Header {
    /// Parse a header starting at `offset`, returning it and its byte length
    pub fn parse(data: &[u8], offset: usize) -> Result<(Self, usize), PulpError> {
        let preamble = slice(data, offset, PREAMBLE_SIZE, "header preamble")?;
        if preamble[..3] != HEADER_MAGIC {
            return Err(PulpError::rpm_header(format!(
                "bad header magic at offset {}",
                offset
            )));
        }
        if preamble[3] != 1 {
            return Err(PulpError::rpm_header(format!(
                "unsupported header version {}",
                preamble[3]
            )));
        }

        let count = be_u32(&preamble[8..12]) as usize;
        let store_size = be_u32(&preamble[12..16]) as usize;
        if count > MAX_INDEX_ENTRIES {
            return Err(PulpError::rpm_header(format!(
                "too many header entries: {}",
                count
            )));
        }

        let index_start = offset + PREAMBLE_SIZE;
        let index = slice(data, index_start, count * INDEX_ENTRY_SIZE, "header index")?;
        let store = slice(
            data,
            index_start + count * INDEX_ENTRY_SIZE,
            store_size,
            "header store",
        )?;

        let mut entries = HashMap::with_capacity(count);
        for raw in index.chunks_exact(INDEX_ENTRY_SIZE) {
            let tag = be_u32(&raw[0..4]);
            let kind = be_u32(&raw[4..8]);
            let data_offset = be_u32(&raw[8..12]) as usize;
            let item_count = be_u32(&raw[12..16]) as usize;

            let value = decode_value(store, tag, kind, data_offset, item_count)?;
            entries.insert(tag, value);
        }

        let length = PREAMBLE_SIZE + count * INDEX_ENTRY_SIZE + store_size;
        Ok((Self { entries }, length))
    }

    pub fn get(&self, tag: u32) -> Option<&TagValue> {
        self.entries.get(&tag)
    }

    pub fn contains(&self, tag: u32) -> bool {
        self.entries.contains_key(&tag)
    }

    pub fn string(&self, tag: u32) -> Option<&str> {
        match self.get(tag)? {
            TagValue::String(s) => Some(s),
            TagValue::StringArray(items) => items.first().map(String::as_str),
            _ => None,
        }
    }

    /// Required string tag
    pub fn require_string(&self, tag: u32, name: &str) -> Result<&str, PulpError> {
        self.string(tag)
            .ok_or_else(|| PulpError::rpm_header(format!("missing {} tag", name)))
    }

    pub fn strings(&self, tag: u32) -> Vec<String> {
        match self.get(tag) {
            Some(TagValue::StringArray(items)) => items.clone(),
            Some(TagValue::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn ints(&self, tag: u32) -> Vec<u64> {
        match self.get(tag) {
            Some(TagValue::Int(values)) => values.clone(),
            _ => Vec::new(),
        }
    }

    pub fn int(&self, tag: u32) -> Option<u64> {
        self.ints(tag).first().copied()
    }

    pub fn binary(&self, tag: u32) -> Option<&[u8]> {
        match self.get(tag)? {
            TagValue::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// The two headers of an RPM file
#[derive(Debug, Clone)]
pub struct RpmHeaders {
    pub signature: Header,
    pub main: Header,
}

impl RpmHeaders {
    pub fn parse(data: &[u8]) -> Result<Self, PulpError> {
        let lead = slice(data, 0, LEAD_SIZE, "lead")?;
        if lead[..4] != LEAD_MAGIC {
            return Err(PulpError::rpm_header("not an RPM file (bad lead magic)"));
        }

        let (signature, sig_len) = Header::parse(data, LEAD_SIZE)?;
        let padding = (8 - sig_len % 8) % 8;
        let (main, _) = Header::parse(data, LEAD_SIZE + sig_len + padding)?;

        Ok(Self { signature, main })
    }
}

fn slice<'a>(data: &'a [u8], start: usize, len: usize, what: &str) -> Result<&'a [u8], PulpError> {
    start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| PulpError::rpm_header(format!("truncated {}", what)))
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn decode_value(
    store: &[u8],
    tag: u32,
    kind: u32,
    offset: usize,
    count: usize,
) -> Result<TagValue, PulpError> {
    let what = format!("data for tag {}", tag);

    let ints = |width: usize| -> Result<TagValue, PulpError> {
        let len = count
            .checked_mul(width)
            .ok_or_else(|| PulpError::rpm_header(format!("oversized {}", what)))?;
        let raw = slice(store, offset, len, &what)?;
        Ok(TagValue::Int(
            raw.chunks_exact(width)
                .map(|c| c.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
                .collect(),
        ))
    };

    match kind {
        types::NULL => Ok(TagValue::Null),
        types::CHAR | types::INT8 => ints(1),
        types::INT16 => ints(2),
        types::INT32 => ints(4),
        types::INT64 => ints(8),
        types::STRING => {
            let (s, _) = read_cstring(store, offset, &what)?;
            Ok(TagValue::String(s))
        }
        types::BIN => Ok(TagValue::Binary(slice(store, offset, count, &what)?.to_vec())),
        types::STRING_ARRAY | types::I18NSTRING => {
            let mut items = Vec::with_capacity(count.min(store.len()));
            let mut pos = offset;
            for _ in 0..count {
                let (s, next) = read_cstring(store, pos, &what)?;
                items.push(s);
                pos = next;
            }
            Ok(TagValue::StringArray(items))
        }
        other => Err(PulpError::rpm_header(format!(
            "unknown data type {} for tag {}",
            other, tag
        ))),
    }
}

/// Read a NUL-terminated string, returning it and the offset after the NUL
fn read_cstring(store: &[u8], offset: usize, what: &str) -> Result<(String, usize), PulpError> {
    let tail = store
        .get(offset..)
        .ok_or_else(|| PulpError::rpm_header(format!("truncated {}", what)))?;
    let end = tail
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| PulpError::rpm_header(format!("unterminated string in {}", what)))?;

    Ok((
        String::from_utf8_lossy(&tail[..end]).into_owned(),
        offset + end + 1,
    ))
}
