use finwiz_core::fixed_income::duration::{self, CashFlowRiskInput};
use finwiz_core::fixed_income::immunization;
use finwiz_core::FinWizError;
use proptest::collection::vec;
use proptest::prelude::{prop_assert, prop_assume, proptest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Duration & convexity
// ===========================================================================

fn ten_year_bond() -> Vec<Decimal> {
    // 6% annual coupon, 10 periods, face 1000
    let mut cfs = vec![dec!(60); 9];
    cfs.push(dec!(1060));
    cfs
}

#[test]
fn test_ten_year_bond_reference_values() {
    let cfs = ten_year_bond();
    let price = duration::bond_price(&cfs, dec!(0.06)).unwrap();
    assert!((price - dec!(1000)).abs() < dec!(0.000001));

    let mac = duration::duration(&cfs, dec!(0.06), price).unwrap();
    assert!(
        (mac - dec!(7.8017)).abs() < dec!(0.0001),
        "Expected Macaulay ~7.8017, got {}",
        mac
    );

    let modified = duration::modified_duration(mac, dec!(0.06)).unwrap();
    assert!((modified - dec!(7.3601)).abs() < dec!(0.0001));

    let convexity = duration::convexity(&cfs, dec!(0.06), price).unwrap();
    assert!(
        (convexity - dec!(69.7404)).abs() < dec!(0.001),
        "Expected convexity ~69.74, got {}",
        convexity
    );
}

#[test]
fn test_duration_falls_as_yield_rises() {
    let cfs = ten_year_bond();
    let low = duration::bond_price(&cfs, dec!(0.02)).unwrap();
    let high = duration::bond_price(&cfs, dec!(0.10)).unwrap();
    let d_low = duration::duration(&cfs, dec!(0.02), low).unwrap();
    let d_high = duration::duration(&cfs, dec!(0.10), high).unwrap();
    assert!(d_low > d_high);
}

#[test]
fn test_estimate_tracks_repricing() {
    let cfs = ten_year_bond();
    let out = duration::analyze_cash_flows(&CashFlowRiskInput {
        cash_flows: cfs.clone(),
        ytm: dec!(0.06),
        bond_price: None,
    })
    .unwrap();

    let repriced = duration::bond_price(&cfs, dec!(0.07)).unwrap();
    let actual_change = (repriced - out.result.price) / out.result.price;
    assert!(
        (actual_change - out.result.price_change_up_100bp).abs() < dec!(0.001),
        "estimate {} vs actual {}",
        out.result.price_change_up_100bp,
        actual_change
    );
}

// ===========================================================================
// Immunization
// ===========================================================================

#[test]
fn test_immunize_with_bond_durations() {
    // Fund a 7-period liability with a 2-period zero and the 10-year coupon bond
    let short = vec![dec!(0), dec!(1000)];
    let short_price = duration::bond_price(&short, dec!(0.06)).unwrap();
    let d1 = duration::duration(&short, dec!(0.06), short_price).unwrap();

    let long = ten_year_bond();
    let d2 = duration::duration(&long, dec!(0.06), dec!(1000)).unwrap();

    let w = immunization::immunization_weights(d1, d2, dec!(7)).unwrap();
    let blended = w.first * d1 + w.second * d2;
    assert!((blended - dec!(7)).abs() < dec!(0.0000001));
    assert!(w.first > Decimal::ZERO && w.second > Decimal::ZERO);
}

#[test]
fn test_immunize_equal_durations_fails() {
    let err = immunization::immunization_weights(dec!(4), dec!(4), dec!(4)).unwrap_err();
    assert!(matches!(err, FinWizError::InvalidInput { .. }));
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn prop_convexity_non_negative(
        flows in vec(0i64..1_000_000, 0..40),
        ytm_bp in 0i64..2000,
        price_cents in 1i64..100_000_000
    ) {
        let cfs: Vec<Decimal> = flows.into_iter().map(|c| Decimal::new(c, 2)).collect();
        let c = duration::convexity(&cfs, Decimal::new(ytm_bp, 4), Decimal::new(price_cents, 2))
            .unwrap();
        prop_assert!(c >= Decimal::ZERO);
    }

    #[test]
    fn prop_duration_within_schedule_when_self_priced(
        flows in vec(1i64..1_000_000, 1..40),
        ytm_bp in 0i64..2000
    ) {
        let cfs: Vec<Decimal> = flows.into_iter().map(|c| Decimal::new(c, 2)).collect();
        let ytm = Decimal::new(ytm_bp, 4);
        let price = duration::bond_price(&cfs, ytm).unwrap();
        let d = duration::duration(&cfs, ytm, price).unwrap();
        prop_assert!(d >= dec!(0.999999999));
        prop_assert!(d <= Decimal::from(cfs.len()) + dec!(0.000000001));
    }

    #[test]
    fn prop_weights_sum_to_one(
        d1_bp in 0i64..300_000,
        d2_bp in 0i64..300_000,
        dl_bp in 0i64..300_000
    ) {
        prop_assume!(d1_bp != d2_bp);
        let (d1, d2, dl) = (Decimal::new(d1_bp, 4), Decimal::new(d2_bp, 4), Decimal::new(dl_bp, 4));
        let w = immunization::immunization_weights(d1, d2, dl).unwrap();
        prop_assert!((w.first + w.second - Decimal::ONE).abs() < dec!(0.0000000000000000001));
        let blended = w.first * d1 + w.second * d2;
        prop_assert!((blended - dl).abs() < dec!(0.000000001));
    }
}
