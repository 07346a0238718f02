//! Builders producing minimal but well-formed RPM files for tests

use super::header::{sigtags, tags, types, HEADER_MAGIC, LEAD_MAGIC, LEAD_SIZE};

/// Signature header tag for the payload size
const SIG_SIZE: u32 = 1000;

struct Entry {
    tag: u32,
    kind: u32,
    count: u32,
    data: Vec<u8>,
}

/// Builds a single header structure
#[derive(Default)]
pub struct HeaderBuilder {
    entries: Vec<Entry>,
}

impl HeaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, tag: u32, kind: u32, count: usize, data: Vec<u8>) -> Self {
        self.entries.push(Entry {
            tag,
            kind,
            count: count as u32,
            data,
        });
        self
    }

    pub fn string(self, tag: u32, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        self.push(tag, types::STRING, 1, data)
    }

    pub fn string_array(self, tag: u32, values: &[&str]) -> Self {
        let mut data = Vec::new();
        for value in values {
            data.extend_from_slice(value.as_bytes());
            data.push(0);
        }
        self.push(tag, types::STRING_ARRAY, values.len(), data)
    }

    pub fn int32(self, tag: u32, values: &[u32]) -> Self {
        let data = values.iter().flat_map(|v| v.to_be_bytes()).collect();
        self.push(tag, types::INT32, values.len(), data)
    }

    pub fn binary(self, tag: u32, value: &[u8]) -> Self {
        self.push(tag, types::BIN, value.len(), value.to_vec())
    }

    pub fn build(self) -> Vec<u8> {
        let mut index = Vec::new();
        let mut store = Vec::new();

        for entry in &self.entries {
            index.extend_from_slice(&entry.tag.to_be_bytes());
            index.extend_from_slice(&entry.kind.to_be_bytes());
            index.extend_from_slice(&(store.len() as u32).to_be_bytes());
            index.extend_from_slice(&entry.count.to_be_bytes());
            store.extend_from_slice(&entry.data);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&HEADER_MAGIC);
        out.push(1);
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
        out.extend_from_slice(&(store.len() as u32).to_be_bytes());
        out.extend_from_slice(&index);
        out.extend_from_slice(&store);
        out
    }
}

/// (name, flags, EVR) triple for requires/provides
pub type Dependency = (&'static str, u32, &'static str);

/// Builds a complete RPM file
pub struct RpmBuilder {
    name: String,
    version: String,
    release: String,
    arch: String,
    epoch: Option<u32>,
    source: bool,
    key_id: Option<[u8; 8]>,
    requires: Vec<Dependency>,
    provides: Vec<Dependency>,
    payload: Vec<u8>,
}

impl RpmBuilder {
    pub fn new(name: &str, version: &str, release: &str, arch: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            release: release.to_string(),
            arch: arch.to_string(),
            epoch: None,
            source: false,
            key_id: None,
            requires: Vec::new(),
            provides: Vec::new(),
            payload: b"payload".to_vec(),
        }
    }

    pub fn epoch(mut self, epoch: u32) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn source(mut self) -> Self {
        self.source = true;
        self
    }

    pub fn signed_by(mut self, key_id: [u8; 8]) -> Self {
        self.key_id = Some(key_id);
        self
    }

    pub fn requires(mut self, deps: &[Dependency]) -> Self {
        self.requires.extend_from_slice(deps);
        self
    }

    pub fn provides(mut self, deps: &[Dependency]) -> Self {
        self.provides.extend_from_slice(deps);
        self
    }

    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    fn lead(&self) -> Vec<u8> {
        let mut lead = Vec::with_capacity(LEAD_SIZE);
        lead.extend_from_slice(&LEAD_MAGIC);
        lead.extend_from_slice(&[3, 0]);
        lead.extend_from_slice(&(u16::from(self.source)).to_be_bytes());
        lead.extend_from_slice(&[0, 1]);
        let mut name = format!("{}-{}-{}", self.name, self.version, self.release).into_bytes();
        name.resize(66, 0);
        lead.extend_from_slice(&name);
        lead.extend_from_slice(&[0, 1]);
        lead.extend_from_slice(&[0, 5]);
        lead.resize(LEAD_SIZE, 0);
        lead
    }

    fn signature_header(&self) -> Vec<u8> {
        let mut sig = HeaderBuilder::new().int32(SIG_SIZE, &[self.payload.len() as u32]);
        if let Some(key_id) = &self.key_id {
            sig = sig.binary(sigtags::RSA, &v4_signature_packet(key_id, false));
        }
        let mut bytes = sig.build();
        let padding = (8 - bytes.len() % 8) % 8;
        bytes.resize(bytes.len() + padding, 0);
        bytes
    }

    fn main_header(&self) -> Vec<u8> {
        let mut header = HeaderBuilder::new()
            .string(tags::NAME, &self.name)
            .string(tags::VERSION, &self.version)
            .string(tags::RELEASE, &self.release)
            .string(tags::ARCH, &self.arch);

        if let Some(epoch) = self.epoch {
            header = header.int32(tags::EPOCH, &[epoch]);
        }

        if self.source {
            header = header.int32(tags::SOURCEPACKAGE, &[1]);
        } else {
            let srpm = format!("{}-{}-{}.src.rpm", self.name, self.version, self.release);
            header = header.string(tags::SOURCERPM, &srpm);
        }

        if !self.requires.is_empty() {
            header = dependency_tags(
                header,
                &self.requires,
                (tags::REQUIRENAME, tags::REQUIREFLAGS, tags::REQUIREVERSION),
            );
        }
        if !self.provides.is_empty() {
            header = dependency_tags(
                header,
                &self.provides,
                (tags::PROVIDENAME, tags::PROVIDEFLAGS, tags::PROVIDEVERSION),
            );
        }

        header.build()
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.lead();
        out.extend(self.signature_header());
        out.extend(self.main_header());
        out.extend_from_slice(&self.payload);
        out
    }
}

fn dependency_tags(
    header: HeaderBuilder,
    deps: &[Dependency],
    (name_tag, flags_tag, version_tag): (u32, u32, u32),
) -> HeaderBuilder {
    let names: Vec<&str> = deps.iter().map(|d| d.0).collect();
    let flags: Vec<u32> = deps.iter().map(|d| d.1).collect();
    let versions: Vec<&str> = deps.iter().map(|d| d.2).collect();

    header
        .string_array(name_tag, &names)
        .int32(flags_tag, &flags)
        .string_array(version_tag, &versions)
}

/// A v4 OpenPGP signature packet naming `key_id` as issuer
///
/// With `fingerprint` set the issuer is given only through an issuer
/// fingerprint subpacket.
pub fn v4_signature_packet(key_id: &[u8; 8], fingerprint: bool) -> Vec<u8> {
    let mut hashed = vec![5, 2, 0x5d, 0x00, 0x00, 0x00];
    let mut unhashed = Vec::new();

    if fingerprint {
        hashed.extend_from_slice(&[22, 33, 4]);
        hashed.extend_from_slice(&[0xaa; 12]);
        hashed.extend_from_slice(key_id);
    } else {
        unhashed.extend_from_slice(&[9, 16]);
        unhashed.extend_from_slice(key_id);
    }

    let mut body = vec![4, 0x00, 1, 8];
    body.extend_from_slice(&(hashed.len() as u16).to_be_bytes());
    body.extend_from_slice(&hashed);
    body.extend_from_slice(&(unhashed.len() as u16).to_be_bytes());
    body.extend_from_slice(&unhashed);
    body.extend_from_slice(&[0xbe, 0xef, 0x00, 0x08, 0xff]);

    let mut packet = vec![0xc2, body.len() as u8];
    packet.extend_from_slice(&body);
    packet
}

/// A v3 OpenPGP signature packet (old packet format)
pub fn v3_signature_packet(key_id: &[u8; 8]) -> Vec<u8> {
    let mut body = vec![3, 5, 0x00, 0x5d, 0x00, 0x00, 0x00];
    body.extend_from_slice(key_id);
    body.extend_from_slice(&[1, 8, 0xbe, 0xef, 0x00, 0x08, 0xff]);

    let mut packet = vec![0x88, body.len() as u8];
    packet.extend_from_slice(&body);
    packet
}
