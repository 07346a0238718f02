//! Building [`RpmUnit`]s from package files

use std::path::Path;

use tracing::debug;

use super::header::{tags, Header, RpmHeaders};
use super::signature::signing_key;
use crate::domain::error::PulpError;
use crate::domain::unit::{RpmDependency, RpmUnit, SRPM_CONTENT_TYPE};
use crate::infrastructure::checksum::Checksums;

const SENSE_LESS: u64 = 0x02;
const SENSE_GREATER: u64 = 0x04;
const SENSE_EQUAL: u64 = 0x08;
const SENSE_MASK: u64 = SENSE_LESS | SENSE_GREATER | SENSE_EQUAL;

/// Comparison flag name for the sense bits of a dependency
fn flag_name(flags: u64) -> Option<&'static str> {
    match flags & SENSE_MASK {
        SENSE_LESS => Some("LT"),
        SENSE_GREATER => Some("GT"),
        SENSE_EQUAL => Some("EQ"),
        f if f == SENSE_LESS | SENSE_EQUAL => Some("LE"),
        f if f == SENSE_GREATER | SENSE_EQUAL => Some("GE"),
        _ => None,
    }
}

/// Split `[epoch:]version[-release]`, epoch defaulting to "0"
fn parse_evr(evr: &str) -> (String, String, Option<String>) {
    let (epoch, rest) = match evr.split_once(':') {
        Some((epoch, rest)) if !epoch.is_empty() => (epoch.to_string(), rest),
        Some((_, rest)) => ("0".to_string(), rest),
        None => ("0".to_string(), evr),
    };
    match rest.rsplit_once('-') {
        Some((version, release)) => (epoch, version.to_string(), Some(release.to_string())),
        None => (epoch, rest.to_string(), None),
    }
}

fn dependencies(header: &Header, name_tag: u32, flags_tag: u32, version_tag: u32) -> Vec<RpmDependency> {
    let flags = header.ints(flags_tag);
    let versions = header.strings(version_tag);

    header
        .strings(name_tag)
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let dep = RpmDependency::new(name);
            let evr = versions.get(i).map(String::as_str).unwrap_or_default();
            if evr.is_empty() {
                return dep;
            }

            let (epoch, version, release) = parse_evr(evr);
            let mut dep = dep.with_epoch(epoch).with_version(version);
            if let Some(release) = release {
                dep = dep.with_release(release);
            }
            match flags.get(i).copied().and_then(flag_name) {
                Some(flag) => dep.with_flags(flag),
                None => dep,
            }
        })
        .collect()
}

/// Build a unit from the raw bytes of an RPM
pub fn unit_from_bytes(data: &[u8]) -> Result<RpmUnit, PulpError> {
    let headers = RpmHeaders::parse(data)?;
    let main = &headers.main;

    let name = main.require_string(tags::NAME, "name")?;
    let version = main.require_string(tags::VERSION, "version")?;
    let release = main.require_string(tags::RELEASE, "release")?;
    let epoch = main.int(tags::EPOCH).unwrap_or(0).to_string();

    let is_source = main.contains(tags::SOURCEPACKAGE) || !main.contains(tags::SOURCERPM);
    let arch = if is_source {
        "src"
    } else {
        main.require_string(tags::ARCH, "arch")?
    };

    let sums = Checksums::compute(data);
    let mut unit = RpmUnit::new(name, version, release, arch)
        .with_epoch(epoch)
        .with_filename(format!("{}-{}-{}.{}.rpm", name, version, release, arch))
        .with_md5sum(sums.md5)
        .with_sha1sum(sums.sha1)
        .with_sha256sum(sums.sha256)
        .with_requires(dependencies(
            main,
            tags::REQUIRENAME,
            tags::REQUIREFLAGS,
            tags::REQUIREVERSION,
        ))
        .with_provides(dependencies(
            main,
            tags::PROVIDENAME,
            tags::PROVIDEFLAGS,
            tags::PROVIDEVERSION,
        ));

    if is_source {
        unit = unit.with_content_type_id(SRPM_CONTENT_TYPE);
    } else if let Some(sourcerpm) = main.string(tags::SOURCERPM) {
        unit = unit.with_sourcerpm(sourcerpm);
    }

    if let Some(key) = signing_key(&headers.signature) {
        unit = unit.with_signing_key(key);
    }

    debug!(nevra = %unit.nevra(), signing_key = ?unit.signing_key(), "Read RPM header");
    Ok(unit)
}

/// Build a unit from an RPM on disk
pub async fn unit_from_path(path: &Path) -> Result<RpmUnit, PulpError> {
    let data = tokio::fs::read(path).await?;
    unit_from_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::rpm::testing::RpmBuilder;

    const KEY_ID: [u8; 8] = [0x19, 0x9e, 0x27, 0x16, 0xf7, 0x8f, 0xb1, 0x95];
    const RPMLIB: u64 = 0x0100_0000;

    #[test]
    fn test_flag_names() {
        assert_eq!(flag_name(0x02), Some("LT"));
        assert_eq!(flag_name(0x04), Some("GT"));
        assert_eq!(flag_name(0x08), Some("EQ"));
        assert_eq!(flag_name(0x0a | RPMLIB), Some("LE"));
        assert_eq!(flag_name(0x0c), Some("GE"));
        assert_eq!(flag_name(0), None);
    }

    #[test]
    fn test_parse_evr() {
        assert_eq!(
            parse_evr("3.0.4-1"),
            ("0".to_string(), "3.0.4".to_string(), Some("1".to_string()))
        );
        assert_eq!(
            parse_evr("2:1.0-3.el8"),
            ("2".to_string(), "1.0".to_string(), Some("3.el8".to_string()))
        );
        assert_eq!(parse_evr("4.0"), ("0".to_string(), "4.0".to_string(), None));
    }

    #[test]
    fn test_unit_from_signed_package() {
        let bytes = RpmBuilder::new("walrus", "5.21", "1", "noarch")
            .signed_by(KEY_ID)
            .requires(&[
                ("rpmlib(CompressedFileNames)", 0x0100_000a, "3.0.4-1"),
                ("rpmlib(PayloadFilesHavePrefix)", 0x0100_000a, "4.0-1"),
            ])
            .provides(&[("walrus", 0x08, "5.21-1")])
            .build();

        let unit = unit_from_bytes(&bytes).unwrap();
        let sums = Checksums::compute(&bytes);

        let expected = RpmUnit::new("walrus", "5.21", "1", "noarch")
            .with_epoch("0")
            .with_signing_key("f78fb195")
            .with_filename("walrus-5.21-1.noarch.rpm")
            .with_sourcerpm("walrus-5.21-1.src.rpm")
            .with_md5sum(sums.md5)
            .with_sha1sum(sums.sha1)
            .with_sha256sum(sums.sha256)
            .with_requires(vec![
                RpmDependency::new("rpmlib(CompressedFileNames)")
                    .with_version("3.0.4")
                    .with_release("1")
                    .with_flags("LE")
                    .with_epoch("0"),
                RpmDependency::new("rpmlib(PayloadFilesHavePrefix)")
                    .with_version("4.0")
                    .with_release("1")
                    .with_flags("LE")
                    .with_epoch("0"),
            ])
            .with_provides(vec![RpmDependency::new("walrus")
                .with_version("5.21")
                .with_release("1")
                .with_flags("EQ")
                .with_epoch("0")]);

        assert_eq!(unit, expected);
    }

    #[test]
    fn test_unsigned_package_with_epoch() {
        let bytes = RpmBuilder::new("walrus", "5.21", "1", "x86_64").epoch(3).build();
        let unit = unit_from_bytes(&bytes).unwrap();
        assert_eq!(unit.epoch(), Some("3"));
        assert_eq!(unit.signing_key(), None);
        assert_eq!(unit.nevra(), "walrus-3:5.21-1.x86_64");
        assert!(unit.requires().unwrap().is_empty());
    }

    #[test]
    fn test_unversioned_dependency() {
        let bytes = RpmBuilder::new("walrus", "5.21", "1", "noarch")
            .requires(&[("/bin/sh", 0, "")])
            .build();
        let unit = unit_from_bytes(&bytes).unwrap();
        assert_eq!(unit.requires().unwrap()[0], RpmDependency::new("/bin/sh"));
    }

    #[test]
    fn test_source_package() {
        let bytes = RpmBuilder::new("walrus", "5.21", "1", "x86_64").source().build();
        let unit = unit_from_bytes(&bytes).unwrap();
        assert!(unit.is_source());
        assert_eq!(unit.arch(), "src");
        assert_eq!(unit.filename(), Some("walrus-5.21-1.src.rpm"));
        assert_eq!(unit.sourcerpm(), None);
    }

    #[test]
    fn test_checksums_cover_payload() {
        let small = RpmBuilder::new("walrus", "5.21", "1", "noarch")
            .payload(b"small payload")
            .build();
        let large = RpmBuilder::new("walrus", "5.21", "1", "noarch")
            .payload(&[0xab; 4096])
            .build();

        let small_unit = unit_from_bytes(&small).unwrap();
        let large_unit = unit_from_bytes(&large).unwrap();

        assert_eq!(small_unit.nevra(), large_unit.nevra());
        assert_ne!(small_unit.sha256sum(), large_unit.sha256sum());
        assert_eq!(
            large_unit.sha256sum(),
            Some(Checksums::compute(&large).sha256.as_str())
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = unit_from_bytes(b"definitely not an rpm").unwrap_err();
        assert!(matches!(err, PulpError::RpmHeader { .. }));
    }

    #[tokio::test]
    async fn test_unit_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walrus-5.21-1.noarch.rpm");
        std::fs::write(&path, RpmBuilder::new("walrus", "5.21", "1", "noarch").build()).unwrap();

        let unit = unit_from_path(&path).await.unwrap();
        assert_eq!(unit.name(), "walrus");
    }
}
