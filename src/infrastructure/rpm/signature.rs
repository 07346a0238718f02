//! Signing key extraction from OpenPGP signature packets

use super::header::{sigtags, Header};

const SIGNATURE_PACKET_TAG: u8 = 2;
const SUBPACKET_ISSUER: u8 = 16;
const SUBPACKET_ISSUER_FINGERPRINT: u8 = 33;

/// Short (8 hex digit, lowercase) ID of the key that signed the package
///
/// Header-only signatures (RSA/DSA) are preferred over header+payload ones.
pub fn signing_key(signature: &Header) -> Option<String> {
    [sigtags::RSA, sigtags::DSA, sigtags::PGP, sigtags::GPG]
        .into_iter()
        .filter_map(|tag| signature.binary(tag))
        .find_map(key_id)
        .map(|id| short_key_id(&id))
}

fn short_key_id(key_id: &[u8; 8]) -> String {
    hex::encode(&key_id[4..])
}

/// Issuer key ID of a single signature packet
pub fn key_id(packet: &[u8]) -> Option<[u8; 8]> {
    let body = packet_body(packet)?;
    match *body.first()? {
        3 => {
            // version, hashed length (5), sig type, creation time, key id
            body.get(7..15)?.try_into().ok()
        }
        4 | 5 => v4_issuer(body),
        _ => None,
    }
}

/// Strip the packet header, checking it is a signature packet
fn packet_body(packet: &[u8]) -> Option<&[u8]> {
    let first = *packet.first()?;
    if first & 0x80 == 0 {
        return None;
    }

    let (tag, header_len, body_len) = if first & 0x40 != 0 {
        let tag = first & 0x3f;
        let (len, len_bytes) = new_format_length(packet.get(1..)?)?;
        (tag, 1 + len_bytes, Some(len))
    } else {
        let tag = (first >> 2) & 0x0f;
        match first & 0x03 {
            0 => (tag, 2, Some(usize::from(*packet.get(1)?))),
            1 => (tag, 3, Some(usize::from(be_u16(packet.get(1..3)?)))),
            2 => (tag, 5, Some(be_u32(packet.get(1..5)?) as usize)),
            _ => (tag, 1, None),
        }
    };

    if tag != SIGNATURE_PACKET_TAG {
        return None;
    }

    let rest = packet.get(header_len..)?;
    match body_len {
        Some(len) => rest.get(..len),
        None => Some(rest),
    }
}

/// New-format packet / subpacket length, returning (length, bytes used)
fn new_format_length(data: &[u8]) -> Option<(usize, usize)> {
    let first = usize::from(*data.first()?);
    match first {
        0..=191 => Some((first, 1)),
        192..=254 => {
            let second = usize::from(*data.get(1)?);
            Some((((first - 192) << 8) + second + 192, 2))
        }
        _ => Some((be_u32(data.get(1..5)?) as usize, 5)),
    }
}

fn v4_issuer(body: &[u8]) -> Option<[u8; 8]> {
    // version, sig type, pubkey algo, hash algo, hashed subpacket length
    let hashed_len = usize::from(be_u16(body.get(4..6)?));
    let hashed = body.get(6..6 + hashed_len)?;

    let unhashed_start = 6 + hashed_len;
    let unhashed_len = usize::from(be_u16(body.get(unhashed_start..unhashed_start + 2)?));
    let unhashed = body
        .get(unhashed_start + 2..unhashed_start + 2 + unhashed_len)
        .unwrap_or_default();

    issuer_from_subpackets(hashed).or_else(|| issuer_from_subpackets(unhashed))
}

fn issuer_from_subpackets(mut data: &[u8]) -> Option<[u8; 8]> {
    while !data.is_empty() {
        let (len, len_bytes) = new_format_length(data)?;
        let packet = data.get(len_bytes..len_bytes + len)?;
        data = &data[len_bytes + len..];

        let (kind, content) = packet.split_first()?;
        match kind & 0x7f {
            SUBPACKET_ISSUER => return content.get(..8)?.try_into().ok(),
            SUBPACKET_ISSUER_FINGERPRINT => {
                // key version byte, then the fingerprint; v4 key IDs are its low 8 bytes
                let fingerprint = content.get(1..)?;
                if fingerprint.len() >= 8 {
                    return fingerprint[fingerprint.len() - 8..].try_into().ok();
                }
            }
            _ => {}
        }
    }
    None
}

fn be_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::rpm::testing::{v3_signature_packet, v4_signature_packet};

    const KEY_ID: [u8; 8] = [0x19, 0x9e, 0x27, 0x16, 0xf7, 0x8f, 0xb1, 0x95];

    #[test]
    fn test_v4_issuer_subpacket() {
        let packet = v4_signature_packet(&KEY_ID, false);
        assert_eq!(key_id(&packet), Some(KEY_ID));
    }

    #[test]
    fn test_v4_issuer_fingerprint_subpacket() {
        let packet = v4_signature_packet(&KEY_ID, true);
        assert_eq!(key_id(&packet), Some(KEY_ID));
    }

    #[test]
    fn test_v3_packet() {
        let packet = v3_signature_packet(&KEY_ID);
        assert_eq!(key_id(&packet), Some(KEY_ID));
    }

    #[test]
    fn test_short_key_id() {
        assert_eq!(short_key_id(&KEY_ID), "f78fb195");
    }

    #[test]
    fn test_non_signature_packet() {
        // old format, tag 6 (public key)
        let packet = [0x98, 0x01, 0x04];
        assert_eq!(key_id(&packet), None);
    }

    #[test]
    fn test_garbage_is_ignored() {
        assert_eq!(key_id(&[]), None);
        assert_eq!(key_id(&[0x00, 0x01]), None);
        assert_eq!(key_id(&[0x89, 0x00, 0x10]), None);
    }
}
