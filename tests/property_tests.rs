//! Property tests for the gateway's invariants.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use remote_user_gate::{
    secret, AuthGateway, DenialReason, GatewayConfig, IdentityNormalizer, IdentityResolver,
    InMemoryRegistry, PathDecision, PathPolicy, Request, ResolvedIdentity, ReverseResolver,
    Secret, Tainted,
};

struct NoDns;

impl ReverseResolver for NoDns {
    fn reverse_lookup(&self, _addr: IpAddr) -> Option<String> {
        None
    }
}

// Strategy: header-safe identity values
fn arb_identity() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9._-]{1,12}(@[A-Za-z0-9.-]{1,12})?").unwrap()
}

// Strategy: arbitrary resolved identities
fn arb_resolved() -> impl Strategy<Value = ResolvedIdentity> {
    prop_oneof![
        arb_identity().prop_map(ResolvedIdentity::Admin),
        arb_identity().prop_map(ResolvedIdentity::RegularUser),
        Just(ResolvedIdentity::Unknown),
    ]
}

proptest! {
    /// Property: without an identity and without a bypass, the request is denied
    /// with the missing-username reason.
    #[test]
    fn proptest_no_identity_is_missing_username(
        path in prop::string::string_regex("/[a-z_/]{0,30}").unwrap(),
        mail_domain in prop::option::of(prop::string::string_regex("[a-z]{1,10}\\.org").unwrap()),
        other_header in prop::string::string_regex("[A-Za-z0-9 ]{0,20}").unwrap(),
    ) {
        prop_assume!(!path.starts_with("/api/"));

        let config = GatewayConfig { mail_domain, ..GatewayConfig::default() };
        let gate = AuthGateway::new(config, InMemoryRegistry::new()).with_resolver(NoDns);
        let request = Request::new(path).with_header("User-Agent", other_header);

        let decision = gate.evaluate(&request).unwrap();
        prop_assert_eq!(decision.denial_reason(), Some(DenialReason::MissingUsername));
    }

    /// Property: the comparator accepts exactly the configured secret.
    #[test]
    fn proptest_secret_compare_is_equality(
        expected in "[ -~]{1,32}",
        provided in "[ -~]{0,32}",
    ) {
        let secret_value = Secret::new(expected.clone());

        prop_assert!(secret::compare(Some(expected.as_str()), &secret_value));
        prop_assert_eq!(secret::compare(Some(provided.as_str()), &secret_value), provided == expected);
        prop_assert!(!secret::compare(None, &secret_value));
    }

    /// Property: normalizing an already-normalized identity changes nothing.
    #[test]
    fn proptest_normalization_is_idempotent(
        raw in arb_identity(),
        mail_domain in prop::option::of(prop::string::string_regex("[A-Za-z]{1,10}\\.org").unwrap()),
        lowercase in any::<bool>(),
    ) {
        let normalizer = IdentityNormalizer::new(mail_domain.as_deref(), lowercase);

        let once = normalizer.normalize(Tainted::new(raw)).unwrap();
        let twice = normalizer.normalize(Tainted::new(once.clone())).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Property: the policy never restricts paths outside the `/user` area.
    #[test]
    fn proptest_paths_outside_user_area_allowed(
        identity in arb_resolved(),
        path in prop::string::string_regex("/[a-z0-9_/]{0,30}").unwrap(),
    ) {
        prop_assume!(!path.starts_with("/user"));
        prop_assert_eq!(PathPolicy::decide(&identity, &path), PathDecision::Allow);
    }

    /// Property: with unique local parts, admin resolution ignores list order.
    #[test]
    fn proptest_admin_resolution_is_order_independent(
        locals in prop::collection::btree_set("[a-z]{1,8}", 1..6),
        pick in any::<prop::sample::Index>(),
        rotate in 0usize..6,
    ) {
        let admins: Vec<String> = locals.iter().map(|l| format!("{l}@example.org")).collect();
        let mut rotated = admins.clone();
        let len = rotated.len();
        rotated.rotate_left(rotate % len);

        let registry = InMemoryRegistry::new();
        let config_a = GatewayConfig { admin_users: admins.clone(), ..GatewayConfig::default() };
        let config_b = GatewayConfig { admin_users: rotated, ..GatewayConfig::default() };

        let wanted = pick.get(&admins);
        let identity = wanted.split('@').next().unwrap();

        let a = IdentityResolver::new(&config_a, &registry).resolve(identity);
        let b = IdentityResolver::new(&config_b, &registry).resolve(identity);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a, ResolvedIdentity::Admin(wanted.clone()));
    }
}

/// Mismatches at the first and last byte take about the same time.
///
/// Timing-sensitive, so ignored by default; run with `cargo test -- --ignored`
/// on a quiet machine.
#[test]
#[ignore]
fn secret_compare_timing_is_position_independent() {
    const LEN: usize = 4096;
    const ROUNDS: usize = 20_000;

    let expected = Secret::new("a".repeat(LEN));
    let early = format!("b{}", "a".repeat(LEN - 1));
    let late = format!("{}b", "a".repeat(LEN - 1));

    let time = |candidate: &str| -> Duration {
        let start = Instant::now();
        for _ in 0..ROUNDS {
            std::hint::black_box(secret::compare(
                Some(std::hint::black_box(candidate)),
                &expected,
            ));
        }
        start.elapsed()
    };

    // Warm up
    time(early.as_str());
    time(late.as_str());

    let early_time = time(early.as_str()).as_secs_f64();
    let late_time = time(late.as_str()).as_secs_f64();
    let ratio = early_time.max(late_time) / early_time.min(late_time);

    assert!(ratio < 1.5, "timing ratio {ratio} between early and late mismatch");
}
