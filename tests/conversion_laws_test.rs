//! Property tests for conversion and formatting

use finmate_fx::prelude::*;
use proptest::prelude::*;

fn any_currency() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::VND),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::JPY),
    ]
}

fn any_table() -> impl Strategy<Value = RateTable> {
    (1.0f64..50_000.0, 0.1f64..10.0, 1.0f64..500.0).prop_map(|(vnd, eur, jpy)| {
        RateTable::from_entries([
            (Currency::VND, vnd),
            (Currency::USD, 1.0),
            (Currency::EUR, eur),
            (Currency::JPY, jpy),
        ])
        .unwrap()
    })
}

proptest! {
    #[test]
    fn identity_conversion_is_exact(amount in -1e12f64..1e12, currency in any_currency()) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let service = CurrencyService::new(
            StaticRateSource::unavailable(),
            StaticRateSource::unavailable(),
            Box::new(MemoryPreferenceStore::new()),
        );

        let converted = runtime
            .block_on(service.convert(amount, currency, currency))
            .unwrap();
        prop_assert_eq!(converted, amount);
        prop_assert_eq!(service.primary().fetch_count(), 0);
    }

    #[test]
    fn round_trip_returns_original(
        amount in -1e9f64..1e9,
        table in any_table(),
        from in any_currency(),
        to in any_currency(),
    ) {
        let there = table.convert(amount, from, to).unwrap();
        let back = table.convert(there, to, from).unwrap();
        let tolerance = 1e-9 * amount.abs().max(1.0);
        prop_assert!((back - amount).abs() <= tolerance, "{} -> {} -> {}", amount, there, back);
    }

    #[test]
    fn formatted_amount_starts_with_symbol(amount in -1e12f64..1e12, currency in any_currency()) {
        let text = format_currency(amount, currency);
        prop_assert!(text.starts_with(currency.symbol()));

        let body = &text[currency.symbol().len()..];
        let digits: String = body.chars().filter(|c| *c != ',').collect();
        let parsed: f64 = digits.parse().unwrap();
        let step = if currency.display_decimals() == 0 { 1.0 } else { 0.01 };
        prop_assert!((parsed - amount).abs() <= step);
    }

    #[test]
    fn grouping_has_three_digit_groups(amount in 0.0f64..1e12, currency in any_currency()) {
        let text = format_currency(amount, currency);
        let body = &text[currency.symbol().len()..];
        let int_part = body.split('.').next().unwrap();
        let groups: Vec<&str> = int_part.split(',').collect();

        prop_assert!(!groups[0].is_empty() && groups[0].len() <= 3);
        for group in &groups[1..] {
            prop_assert_eq!(group.len(), 3);
        }
    }
}
