//! End-to-end behavior of the public encoder API.

use qrpath::mask::{penalty_score, MAX_PENALTY};
use qrpath::{encode, DataTooLong, EncodeOptions, Error, Mask, QrCode, QrCodeEcc, Version};

const ALL_ECC: [QrCodeEcc; 4] = [QrCodeEcc::Low, QrCodeEcc::Medium, QrCodeEcc::Quartile, QrCodeEcc::High];

/// Reads both copies of the format information and returns (ecc format bits, mask).
fn read_format(qr: &QrCode) -> (u32, u32) {
    let size = qr.size();
    let bit = |x: i32, y: i32, i: u32| u32::from(qr.get_module(x, y)) << i;

    let mut first: u32 = 0;
    for i in 0..6 {
        first |= bit(8, i, i as u32);
    }
    first |= bit(8, 7, 6) | bit(8, 8, 7) | bit(7, 8, 8);
    for i in 9..15 {
        first |= bit(14 - i, 8, i as u32);
    }

    let mut second: u32 = 0;
    for i in 0..8 {
        second |= bit(size - 1 - i, 8, i as u32);
    }
    for i in 8..15 {
        second |= bit(8, size - 15 + i, i as u32);
    }
    assert_eq!(first, second, "format copies disagree");

    let data = (first ^ 0x5412) >> 10;
    (data >> 3, data & 7)
}

#[test]
fn test_empty_text() {
    let qr = encode("", &EncodeOptions::default()).unwrap();
    assert_eq!(qr.version(), Version::new(1));
    assert_eq!(qr.size(), 21);
    assert!(qr.mask().value() <= 7);
    assert_eq!(qr.modules().len(), 21 * 21);
}

#[test]
fn test_hello_world_without_boost() {
    let opts = EncodeOptions::default()
        .with_ecl(QrCodeEcc::Medium)
        .with_boost_ecl(false);
    let qr = encode("HELLO WORLD", &opts).unwrap();
    assert_eq!(qr.version(), Version::new(1));
    assert_eq!(qr.error_correction_level(), QrCodeEcc::Medium);
    assert_eq!(read_format(&qr).0, 0b00);
}

#[test]
fn test_hello_world_with_boost() {
    // 100 data bits fit 1-Q (104 bits) but not 1-H (72 bits).
    let qr = encode("HELLO WORLD", &EncodeOptions::default()).unwrap();
    assert_eq!(qr.version(), Version::new(1));
    assert_eq!(qr.error_correction_level(), QrCodeEcc::Quartile);
    assert_eq!(read_format(&qr).0, 0b11);
}

#[test]
fn test_data_too_long_in_version_range() {
    let opts = EncodeOptions::default()
        .with_ecl(QrCodeEcc::High)
        .with_version_range(Version::new(1), Version::new(1));
    let text = "x".repeat(18);
    match encode(&text, &opts) {
        Err(Error::DataTooLong(DataTooLong::DataOverCapacity(used, cap))) => {
            assert_eq!(used, 4 + 8 + 18 * 8);
            assert_eq!(cap, 72);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_data_too_long_for_any_version() {
    let text = "a".repeat(3000);
    let err = QrCode::encode_text(&text, QrCodeEcc::Low).unwrap_err();
    assert!(matches!(err, Error::DataTooLong(DataTooLong::DataOverCapacity(_, _))));

    // 65536 bytes overflow the 16-bit character count field everywhere.
    let data = vec![0u8; 65536];
    let err = QrCode::encode_binary(&data, QrCodeEcc::Low).unwrap_err();
    assert_eq!(err, Error::DataTooLong(DataTooLong::SegmentTooLong));
}

#[test]
fn test_forced_mask() {
    for text in ["", "forced", "Mask three, whatever its penalty."] {
        let opts = EncodeOptions::default().with_mask(Mask::from_forced(3).unwrap());
        let qr = encode(text, &opts).unwrap();
        assert_eq!(qr.mask(), Mask::new(3));
        assert_eq!(read_format(&qr).1, 3);
    }
}

#[test]
fn test_auto_mask_has_lowest_penalty() {
    for text in ["", "Hello, world!", "https://example.com/a/longer/path?with=query", "0123456789"] {
        let auto = encode(text, &EncodeOptions::default()).unwrap();
        let size = auto.size() as usize;
        let scores: Vec<i32> = Mask::ALL
            .iter()
            .map(|&m| {
                let qr = encode(text, &EncodeOptions::default().with_mask(Some(m))).unwrap();
                penalty_score(qr.modules(), size)
            })
            .collect();
        let best = scores.iter().copied().min().unwrap();
        let first_best = scores.iter().position(|&s| s == best).unwrap();
        assert_eq!(usize::from(auto.mask().value()), first_best, "{:?}", text);
        assert_eq!(penalty_score(auto.modules(), size), best);
    }
}

#[test]
fn test_penalty_within_bounds() {
    for len in [0usize, 10, 100, 500, 1500] {
        let text = "Z".repeat(len);
        let qr = QrCode::encode_text(&text, QrCodeEcc::Low).unwrap();
        let score = penalty_score(qr.modules(), qr.size() as usize);
        assert!((0..=MAX_PENALTY).contains(&score));
    }
}

#[test]
fn test_boost_never_changes_version_or_lowers_level() {
    for len in [0usize, 5, 17, 40, 100, 333, 1000] {
        let text = "q".repeat(len);
        for &ecl in &ALL_ECC {
            let base = EncodeOptions::default().with_ecl(ecl);
            let plain = encode(&text, &base.with_boost_ecl(false)).unwrap();
            let boosted = encode(&text, &base).unwrap();
            assert_eq!(plain.version(), boosted.version());
            assert_eq!(plain.error_correction_level(), ecl);
            assert!(boosted.error_correction_level() >= ecl);
        }
    }
}

#[test]
fn test_smallest_version_is_chosen() {
    // 1-M holds 16 data codewords: 14 bytes of payload plus the 12-bit header.
    let qr = encode(&"a".repeat(14), &EncodeOptions::default().with_boost_ecl(false)).unwrap();
    assert_eq!(qr.version(), Version::new(1));
    let qr = encode(&"a".repeat(15), &EncodeOptions::default().with_boost_ecl(false)).unwrap();
    assert_eq!(qr.version(), Version::new(2));
}

#[test]
fn test_min_version_is_respected() {
    let opts = EncodeOptions::default().with_version_range(Version::new(5), Version::MAX);
    let qr = encode("a", &opts).unwrap();
    assert_eq!(qr.version(), Version::new(5));
    assert_eq!(qr.size(), 37);
}

#[test]
fn test_inverted_version_range() {
    let opts = EncodeOptions::default().with_version_range(Version::new(10), Version::new(3));
    assert_eq!(
        encode("a", &opts).unwrap_err(),
        Error::InvalidVersionRange { min: 10, max: 3 }
    );
}

#[test]
fn test_range_errors() {
    assert_eq!(Version::try_from(0).unwrap_err(), Error::VersionOutOfRange(0));
    assert_eq!(Version::try_from(41).unwrap_err(), Error::VersionOutOfRange(41));
    assert_eq!(Mask::from_forced(8).unwrap_err(), Error::MaskOutOfRange(8));
    assert_eq!(Mask::from_forced(-1), Ok(None));
}

#[test]
fn test_encoding_is_deterministic() {
    let a = QrCode::encode_text("same input, same symbol", QrCodeEcc::Medium).unwrap();
    let b = QrCode::encode_text("same input, same symbol", QrCodeEcc::Medium).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_finder_patterns_present() {
    let qr = QrCode::encode_text("finder", QrCodeEcc::Low).unwrap();
    let size = qr.size();
    for &(cx, cy) in &[(3, 3), (size - 4, 3), (3, size - 4)] {
        for dy in -3..=3i32 {
            for dx in -3..=3i32 {
                let dist = dx.abs().max(dy.abs());
                assert_eq!(qr.get_module(cx + dx, cy + dy), dist != 2, "({}, {})", cx + dx, cy + dy);
            }
        }
    }
    // Dark module beside the bottom-left finder
    assert!(qr.get_module(8, size - 8));
    assert!(!qr.get_module(-1, 0));
    assert!(!qr.get_module(0, size));
}

#[test]
fn test_version_information_drawn_from_version_7() {
    let qr = QrCode::encode_binary(&[7u8; 200], QrCodeEcc::Medium).unwrap();
    assert!(qr.version().value() >= 7);
    let size = qr.size();
    let mut bits_tr: u32 = 0;
    let mut bits_bl: u32 = 0;
    for i in 0..18 {
        let a = size - 11 + i % 3;
        let b = i / 3;
        bits_tr |= u32::from(qr.get_module(a, b)) << i;
        bits_bl |= u32::from(qr.get_module(b, a)) << i;
    }
    assert_eq!(bits_tr, bits_bl);
    assert_eq!(bits_tr >> 12, u32::from(qr.version().value()));
}
