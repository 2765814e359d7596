use wirebson::Decimal128;

#[test]
fn integers_format_in_plain_notation() {
    assert_eq!(Decimal128::from_i64(0).to_string(), "0");
    assert_eq!(Decimal128::from_i64(42).to_string(), "42");
    assert_eq!(Decimal128::from_i64(-7).to_string(), "-7");
    assert_eq!(Decimal128::from_i64(i64::MIN).to_string(), "-9223372036854775808");
}

#[test]
fn fractions_format_in_plain_notation() {
    assert_eq!(Decimal128::from_parts(false, -1, 15).unwrap().to_string(), "1.5");
    assert_eq!(Decimal128::from_parts(false, -3, 1).unwrap().to_string(), "0.001");
    assert_eq!(Decimal128::from_parts(true, -2, 125).unwrap().to_string(), "-1.25");
    assert_eq!(Decimal128::from_parts(false, -6, 1).unwrap().to_string(), "0.000001");
}

#[test]
fn extreme_exponents_format_in_scientific_notation() {
    assert_eq!(Decimal128::from_parts(false, 2, 5).unwrap().to_string(), "5E+2");
    assert_eq!(Decimal128::from_parts(false, -7, 1).unwrap().to_string(), "1E-7");
    assert_eq!(Decimal128::from_parts(false, 3, 12).unwrap().to_string(), "1.2E+4");
    assert_eq!(Decimal128::ZERO.to_string(), "0");
    assert_eq!(Decimal128::NAN.to_string(), "NaN");
    assert_eq!(Decimal128::INFINITY.to_string(), "Infinity");
    assert_eq!(Decimal128::NEG_INFINITY.to_string(), "-Infinity");
}

#[test]
fn parsing_inverts_formatting() {
    for text in ["0", "42", "-7", "1.5", "0.001", "5E+2", "1E-7", "1.2E+4"] {
        let parsed: Decimal128 = text.parse().unwrap();
        assert_eq!(parsed.to_string(), text, "round-trip of {text}");
    }
    assert!("NaN".parse::<Decimal128>().unwrap().is_nan());
    assert!("Infinity".parse::<Decimal128>().unwrap().is_infinite());
    assert!("-inf".parse::<Decimal128>().unwrap().is_negative());
}

#[test]
fn parsing_rejects_garbage() {
    assert!("".parse::<Decimal128>().is_err());
    assert!("abc".parse::<Decimal128>().is_err());
    assert!("1..2".parse::<Decimal128>().is_err());
    assert!("1e".parse::<Decimal128>().is_err());
    // 35 significant digits.
    assert!("12345678901234567890123456789012345"
        .parse::<Decimal128>()
        .is_err());
    // Exponent outside the representable range.
    assert!("1E+9999".parse::<Decimal128>().is_err());
}

#[test]
fn integral_conversions_are_exact() {
    let five_hundred = Decimal128::from_parts(false, 2, 5).unwrap();
    assert_eq!(five_hundred.to_i64().unwrap(), 500);
    assert_eq!(five_hundred.to_i32().unwrap(), 500);

    let one_and_a_half = Decimal128::from_parts(false, -1, 15).unwrap();
    assert!(one_and_a_half.to_i64().is_err());

    // A cohort member with trailing zeros is still whole.
    let ten = Decimal128::from_parts(false, -1, 100).unwrap();
    assert_eq!(ten.to_i64().unwrap(), 10);

    assert_eq!(Decimal128::from_i64(i64::MIN).to_i64().unwrap(), i64::MIN);
    assert!(Decimal128::from_u64(u64::MAX).to_i64().is_err());
    assert!(Decimal128::NAN.to_i64().is_err());
    assert!(Decimal128::from_i64(1 << 40).to_i32().is_err());
}

#[test]
fn double_conversions_use_the_shortest_representation() {
    assert_eq!(Decimal128::from_f64(1.5).to_string(), "1.5");
    assert_eq!(Decimal128::from_f64(0.1).to_string(), "0.1");
    assert_eq!(Decimal128::from_f64(-2.0).to_string(), "-2");
    assert!(Decimal128::from_f64(f64::NAN).is_nan());
    assert!(Decimal128::from_f64(f64::INFINITY).is_infinite());

    assert_eq!("1.5".parse::<Decimal128>().unwrap().to_f64().unwrap(), 1.5);
    assert_eq!("0.01".parse::<Decimal128>().unwrap().to_f64().unwrap(), 0.01);
    assert_eq!(
        "0.1000".parse::<Decimal128>().unwrap().to_f64().unwrap(),
        0.1
    );

    // 34 nines cannot survive the double round trip.
    let wide: Decimal128 = "9999999999999999999999999999999999".parse().unwrap();
    assert!(wide.to_f64().is_err());
    assert!(Decimal128::NAN.to_f64().unwrap().is_nan());
}

#[test]
fn non_canonical_coefficients_read_as_zero() {
    // Normal form whose 113-bit coefficient exceeds 34 digits.
    let non_canonical = Decimal128::from_raw(0x0001_FFFF_FFFF_FFFF, u64::MAX);
    assert_eq!(non_canonical.finite_parts().unwrap(), (false, -6176, 0));

    // The implicit-prefix combination form always decodes as zero. Its
    // exponent field sits two bits lower than the normal form's.
    let implicit = Decimal128::from_raw(0x6000_0000_0000_0000, 0);
    assert_eq!(implicit.finite_parts().unwrap(), (false, -6176, 0));

    // Same form with the exponent field set to the bias (unbiased 0).
    let implicit_biased = Decimal128::from_raw(0x6C10_0000_0000_0000, 0);
    assert_eq!(implicit_biased.finite_parts().unwrap(), (false, 0, 0));
    assert_eq!(implicit_biased.to_string(), "0");
}

#[test]
fn canonical_encodings_match_known_bit_patterns() {
    // Bit patterns from the IEEE 754-2008 BID layout, as carried in the
    // MongoDB decimal128 test corpus.
    assert_eq!(Decimal128::ZERO.high(), 0x3040_0000_0000_0000);
    assert_eq!(Decimal128::ZERO.low(), 0);

    let one = Decimal128::from_i64(1);
    assert_eq!((one.high(), one.low()), (0x3040_0000_0000_0000, 1));

    let minus_one = Decimal128::from_i64(-1);
    assert_eq!((minus_one.high(), minus_one.low()), (0xB040_0000_0000_0000, 1));

    let one_point_five: Decimal128 = "1.5".parse().unwrap();
    assert_eq!(
        (one_point_five.high(), one_point_five.low()),
        (0x303E_0000_0000_0000, 15)
    );

    let twelve_thousand: Decimal128 = "1.2E+4".parse().unwrap();
    assert_eq!(
        (twelve_thousand.high(), twelve_thousand.low()),
        (0x3046_0000_0000_0000, 12)
    );

    assert_eq!(Decimal128::NAN.high(), 0x7C00_0000_0000_0000);
    assert_eq!(Decimal128::INFINITY.high(), 0x7800_0000_0000_0000);
    assert_eq!(Decimal128::NEG_INFINITY.high(), 0xF800_0000_0000_0000);

    // Decode direction from literal bits.
    let from_raw = Decimal128::from_raw(0x3040_0000_0000_0000, 42);
    assert_eq!(from_raw.to_string(), "42");
    assert_eq!(from_raw.finite_parts().unwrap(), (false, 0, 42));
}
