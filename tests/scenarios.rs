use legion_odds::exact;
use legion_odds::prelude::*;
use num::rational::Ratio;

fn exact_calc() -> Calculator {
    Calculator::builder().strategy(Strategy::Exact).build()
}

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "actual = {actual}, expected = {expected}"
    );
}

fn assert_well_formed(distribution: &[Entry], cumulative: &[Entry], tolerance: f64) {
    let total: f64 = distribution.iter().map(|e| e.probability).sum();
    assert_close(total, 1.0, tolerance);
    assert!(distribution.iter().all(|e| e.probability >= 0.0));
    assert!(distribution.iter().enumerate().all(|(i, e)| e.total as usize == i));
    assert_eq!(distribution.len(), cumulative.len());
    assert_eq!(cumulative[0].probability, 1.0);
    for pair in cumulative.windows(2) {
        assert!(pair[1].probability <= pair[0].probability);
    }
}

fn sure_zero() -> Vec<Entry> {
    vec![Entry {
        total: 0,
        probability: 1.0,
    }]
}

#[test]
fn one_red_die_without_surge() {
    let pool = AttackPool::new(1, 0, 0);
    let mods = AttackModifiers::default();

    let r = exact_calc().attack(&pool, &mods);
    assert_close(r.expected_hits, 5.0 / 8.0, 1e-12);
    assert_close(r.expected_crits, 1.0 / 8.0, 1e-12);
    assert_close(r.expected_total, 6.0 / 8.0, 1e-12);

    let r = compute_attack_distribution(&pool, &mods);
    assert_close(r.expected_hits, 5.0 / 8.0, 0.02);
    assert_close(r.expected_crits, 1.0 / 8.0, 0.02);
}

#[test]
fn one_red_die_surge_to_hit() {
    let pool = AttackPool::new(1, 0, 0);
    let mods = AttackModifiers::with_surge(SurgeMode::Hit);
    let r = exact_calc().attack(&pool, &mods);
    assert_close(r.expected_hits, 6.0 / 8.0, 1e-12);
    assert_close(r.expected_crits, 1.0 / 8.0, 1e-12);
}

#[test]
fn white_die_with_observe_token() {
    let pool = AttackPool::new(0, 0, 1);
    let mods = AttackModifiers::builder().observe_tokens(1).build();
    let expected = 1.0 / 8.0 + 5.0 / 8.0 * 1.0 / 8.0;

    let d = exact::attack(&pool, &mods).unwrap();
    assert_eq!(d.probability(&Strike::hits(1)), Ratio::new(13, 64));
    assert_eq!(d.probability(&Strike::crits(1)), Ratio::new(13, 64));

    let r = compute_attack_distribution(&pool, &mods);
    assert_close(r.expected_hits, expected, 0.02);
    assert_close(r.expected_crits, expected, 0.02);
}

#[test]
fn white_die_with_ram() {
    let pool = AttackPool::new(0, 0, 1);
    let mods = AttackModifiers::builder().ram_x(1).build();
    let r = exact_calc().attack(&pool, &mods);
    assert_close(r.expected_crits, 7.0 / 8.0, 1e-12);
    assert_close(r.expected_hits, 0.0, 1e-12);

    let r = compute_attack_distribution(&pool, &mods);
    assert_close(r.expected_crits, 7.0 / 8.0, 0.02);
    assert_eq!(r.expected_hits, 0.0);
}

#[test]
fn single_hit_against_red_die() {
    let attack = AttackResults::from(&Dist::scalar(Strike::hits(1)));
    let mods = DefenseModifiers::default();

    let r = exact_calc().wounds(&attack, &mods);
    assert_close(r.expected_wounds, 0.5, 1e-12);

    let r = compute_wounds_distribution(&attack, &mods);
    assert_close(r.expected_wounds, 0.5, 0.02);
}

#[test]
fn empty_attack_pool() {
    for calc in [Calculator::default(), exact_calc()] {
        let r = calc.attack(&AttackPool::default(), &AttackModifiers::default());
        assert_eq!(r.distribution, sure_zero());
        assert_eq!(r.cumulative, sure_zero());
        assert_eq!(r.expected_hits, 0.0);
        assert_eq!(r.expected_crits, 0.0);
        assert_eq!(r.expected_total, 0.0);

        let w = calc.wounds(&r, &DefenseModifiers::default());
        assert_eq!(w.distribution, sure_zero());
        assert_eq!(w.expected_wounds, 0.0);
    }
}

#[test]
fn empty_defense_pool() {
    let r = compute_defense_distribution(&DefensePool::default(), DefenseSurge::Block, 2);
    assert_eq!(r.distribution, sure_zero());
    assert_eq!(r.cumulative, sure_zero());
    assert_eq!(r.expected_blocks, 0.0);
}

#[test]
fn defense_pool_with_tokens() {
    let pool = DefensePool::new(1, 1);
    let plain = compute_defense_distribution(&pool, DefenseSurge::None, 0);
    assert_close(plain.expected_blocks, 3.0 / 6.0 + 1.0 / 6.0, 1e-12);
    let tokens = compute_defense_distribution(&pool, DefenseSurge::None, 5);
    let block = compute_defense_distribution(&pool, DefenseSurge::Block, 0);
    assert_eq!(tokens, block);
    assert_well_formed(&block.distribution, &block.cumulative, 1e-9);
}

#[test]
fn critical_x_absent_equals_zero() {
    let pool = AttackPool::new(2, 2, 2);
    let absent = AttackModifiers::default();
    let zero = AttackModifiers::builder().critical_x(0).build();
    assert_eq!(
        compute_attack_distribution(&pool, &absent),
        compute_attack_distribution(&pool, &zero)
    );
    assert_eq!(
        exact_calc().attack(&pool, &absent),
        exact_calc().attack(&pool, &zero)
    );
}

#[test]
fn negative_and_non_finite_inputs_are_zero() {
    let pool = AttackPool::new(1, 2, 1);
    let messy = AttackModifiers::builder()
        .critical_x(-2)
        .surge_tokens(f64::NAN)
        .aim_tokens(-1)
        .observe_tokens(-2.5)
        .precise_x(f64::NEG_INFINITY)
        .ram_x(-3)
        .build();
    let attack = compute_attack_distribution(&pool, &messy);
    assert_eq!(attack, compute_attack_distribution(&pool, &AttackModifiers::default()));
    assert_eq!(
        AttackPool::new(-1, f64::INFINITY, 2.9),
        AttackPool::new(0, 0, 2)
    );

    let messy = DefenseModifiers::builder()
        .dodge_tokens(-1)
        .surge_tokens(f32::NAN)
        .armor_x(-2)
        .impact_x(-1)
        .pierce_x(f64::INFINITY)
        .shield_tokens(-4i64)
        .cover_x(-1)
        .sharpshooter_x(-3)
        .suppression_tokens(-1)
        .danger_sense_x(-1)
        .build();
    assert_eq!(
        compute_wounds_distribution(&attack, &messy),
        compute_wounds_distribution(&attack, &DefenseModifiers::default())
    );
}

#[test]
fn fractional_inputs_floor() {
    let pool = AttackPool::new(2, 0, 3);
    let floored = AttackModifiers::builder().aim_tokens(1.9).ram_x(2.2).build();
    let whole = AttackModifiers::builder().aim_tokens(1).ram_x(2).build();
    assert_eq!(
        compute_attack_distribution(&pool, &floored),
        compute_attack_distribution(&pool, &whole)
    );
}

#[test]
fn surge_tokens_irrelevant_with_surge_mode() {
    let pool = AttackPool::new(1, 2, 3);
    for surge in [SurgeMode::Hit, SurgeMode::Crit] {
        let base = compute_attack_distribution(&pool, &AttackModifiers::with_surge(surge));
        for tokens in [1, 2, 5, 40] {
            let mods = AttackModifiers::builder()
                .surge(surge)
                .surge_tokens(tokens)
                .build();
            assert_eq!(compute_attack_distribution(&pool, &mods), base);
        }
    }
}

#[test]
fn surge_tokens_count_without_surge_mode() {
    let pool = AttackPool::new(0, 3, 0);
    let none = exact_calc().attack(&pool, &AttackModifiers::default());
    let one = exact_calc().attack(&pool, &AttackModifiers::builder().surge_tokens(1).build());
    assert!(one.expected_hits > none.expected_hits);
    assert_close(one.expected_crits, none.expected_crits, 1e-12);
}

fn sample_attack() -> AttackResults {
    let pool = AttackPool::new(2, 2, 2);
    let mods = AttackModifiers::builder()
        .surge(SurgeMode::Hit)
        .critical_x(1)
        .build();
    exact_calc().attack(&pool, &mods)
}

#[test]
fn dodge_never_adds_wounds() {
    let attack = sample_attack();
    let mut previous = f64::INFINITY;
    for dodge in 0..5 {
        let mods = DefenseModifiers::builder().dodge_tokens(dodge).build();
        let r = exact_calc().wounds(&attack, &mods);
        assert!(r.expected_wounds <= previous + 1e-12, "dodge = {dodge}");
        previous = r.expected_wounds;
    }
}

#[test]
fn outmaneuver_never_adds_wounds() {
    let attack = sample_attack();
    for dodge in 0..4 {
        let plain = DefenseModifiers::builder().dodge_tokens(dodge).build();
        let outmaneuver = DefenseModifiers::builder()
            .dodge_tokens(dodge)
            .outmaneuver(true)
            .build();
        let a = exact_calc().wounds(&attack, &plain).expected_wounds;
        let b = exact_calc().wounds(&attack, &outmaneuver).expected_wounds;
        assert!(b <= a + 1e-12, "dodge = {dodge}: {b} > {a}");
    }
}

#[test]
fn armor_never_adds_wounds() {
    let attack = sample_attack();
    let mut previous = f64::INFINITY;
    for armor in 0..6 {
        let mods = DefenseModifiers::builder().armor_x(armor).build();
        let r = exact_calc().wounds(&attack, &mods);
        assert!(r.expected_wounds <= previous + 1e-12, "armor = {armor}");
        previous = r.expected_wounds;
    }
}

#[test]
fn impact_cancels_armor() {
    let attack = sample_attack();
    let armored = DefenseModifiers::builder().armor_x(2).impact_x(2).build();
    assert_eq!(
        exact_calc().wounds(&attack, &armored),
        exact_calc().wounds(&attack, &DefenseModifiers::default())
    );
}

#[test]
fn sharpshooter_two_strips_heavy_cover() {
    let attack = sample_attack();
    let stripped = DefenseModifiers::builder()
        .cover(Cover::Heavy)
        .sharpshooter_x(2)
        .build();
    let open = DefenseModifiers::default();
    assert_eq!(
        compute_wounds_distribution(&attack, &stripped),
        compute_wounds_distribution(&attack, &open)
    );
    assert_eq!(
        exact_calc().wounds(&attack, &stripped),
        exact_calc().wounds(&attack, &open)
    );
}

#[test]
fn cover_levels_order_wounds() {
    let attack = sample_attack();
    let wounds = |cover| {
        let mods = DefenseModifiers::builder().cover(cover).build();
        exact_calc().wounds(&attack, &mods).expected_wounds
    };
    let (none, light, heavy) = (wounds(Cover::None), wounds(Cover::Light), wounds(Cover::Heavy));
    assert!(light < none);
    assert!(heavy < light);
}

#[test]
fn suppression_improves_cover() {
    let attack = sample_attack();
    let suppressed = DefenseModifiers::builder()
        .cover(Cover::Light)
        .suppressed(true)
        .build();
    let heavy = DefenseModifiers::builder().cover(Cover::Heavy).build();
    assert_eq!(
        exact_calc().wounds(&attack, &suppressed),
        exact_calc().wounds(&attack, &heavy)
    );
}

#[test]
fn distributions_are_well_formed() {
    let pools = [
        AttackPool::new(1, 0, 0),
        AttackPool::new(0, 3, 2),
        AttackPool::new(4, 2, 1),
    ];
    let mods = [
        AttackModifiers::default(),
        AttackModifiers::builder()
            .surge(SurgeMode::Crit)
            .aim_tokens(1)
            .precise_x(1)
            .build(),
        AttackModifiers::builder()
            .critical_x(2)
            .surge_tokens(1)
            .observe_tokens(2)
            .ram_x(1)
            .build(),
    ];
    let defense = DefenseModifiers::builder()
        .die(DefenseDie::White)
        .surge(DefenseSurge::Block)
        .cover(Cover::Light)
        .low_profile(true)
        .shield_tokens(1)
        .impervious(true)
        .pierce_x(1)
        .build();

    for pool in &pools {
        for m in &mods {
            let sim = compute_attack_distribution(pool, m);
            assert_well_formed(&sim.distribution, &sim.cumulative, 1e-2);
            let joint: f64 = sim.joint.iter().map(|e| e.probability).sum();
            assert_close(joint, 1.0, 1e-2);

            let ex = exact_calc().attack(pool, m);
            assert_well_formed(&ex.distribution, &ex.cumulative, 1e-9);

            let w = compute_wounds_distribution(&sim, &defense);
            assert_well_formed(&w.distribution, &w.cumulative, 1e-2);
            let w = exact_calc().wounds(&ex, &defense);
            assert_well_formed(&w.distribution, &w.cumulative, 1e-9);
        }
    }
}

#[test]
fn exact_and_simulation_agree_on_attack() {
    let pool = AttackPool::new(2, 1, 2);
    let mods = AttackModifiers::builder()
        .critical_x(1)
        .surge_tokens(1)
        .aim_tokens(1)
        .precise_x(1)
        .ram_x(1)
        .build();
    let ex = exact_calc().attack(&pool, &mods);
    let sim = Calculator::builder()
        .runs(50_000)
        .build()
        .attack(&pool, &mods);
    assert_close(sim.expected_hits, ex.expected_hits, 0.03);
    assert_close(sim.expected_crits, ex.expected_crits, 0.03);
    for (a, b) in ex.distribution.iter().zip(&sim.distribution) {
        assert_close(b.probability, a.probability, 0.015);
    }
}

#[test]
fn exact_and_simulation_agree_on_wounds() {
    let attack = sample_attack();
    let mods = DefenseModifiers::builder()
        .cover(Cover::Heavy)
        .low_profile(true)
        .backup(true)
        .shield_tokens(1)
        .dodge_tokens(1)
        .outmaneuver(true)
        .surge_tokens(1)
        .pierce_x(1)
        .impervious(true)
        .suppression_tokens(2)
        .danger_sense_x(1)
        .build();
    let ex = exact_calc().wounds(&attack, &mods);
    let sim = Calculator::builder()
        .runs(50_000)
        .build()
        .wounds(&attack, &mods);
    assert_close(sim.expected_wounds, ex.expected_wounds, 0.03);
}

#[test]
fn results_serialize_with_ui_names() {
    let mods = AttackModifiers::default();
    let attack = compute_attack_distribution(&AttackPool::new(1, 0, 0), &mods);
    let json = serde_json::to_value(&attack).unwrap();
    for key in [
        "expectedHits",
        "expectedCrits",
        "expectedTotal",
        "distribution",
        "distributionByHitsCrits",
        "cumulative",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert!(json["distributionByHitsCrits"][0].get("hits").is_some());
    assert!(json["distribution"][0].get("total").is_some());

    let wounds = compute_wounds_distribution(&attack, &DefenseModifiers::default());
    let json = serde_json::to_value(&wounds).unwrap();
    assert!(json.get("expectedWounds").is_some());

    let defense = compute_defense_distribution(&DefensePool::new(1, 0), DefenseSurge::None, 0);
    let json = serde_json::to_value(&defense).unwrap();
    assert!(json.get("expectedBlocks").is_some());
}

#[test]
fn modifiers_deserialize_from_ui_names() {
    let mods: DefenseModifiers = serde_json::from_str(
        r#"{"die":"white","cover":"heavy","dodgeTokens":2,"lowProfile":true}"#,
    )
    .unwrap();
    assert_eq!(mods.die, DefenseDie::White);
    assert_eq!(mods.cover, Cover::Heavy);
    assert_eq!(mods.dodge_tokens, Amount::from(2));
    assert!(mods.low_profile);

    let mods: AttackModifiers =
        serde_json::from_str(r#"{"surge":"crit","criticalX":1}"#).unwrap();
    assert_eq!(mods.surge, SurgeMode::Crit);
    assert_eq!(mods.critical_x, Some(Amount::from(1)));

    // out of range numbers clamp instead of failing
    let mods: DefenseModifiers =
        serde_json::from_str(r#"{"dodgeTokens":-1,"armorX":2.7,"pierceX":null}"#).unwrap();
    assert_eq!(mods.dodge_tokens, Amount::ZERO);
    assert_eq!(mods.armor_x, Amount::from(2));
    assert_eq!(mods.pierce_x, Amount::ZERO);

    let mods: AttackModifiers =
        serde_json::from_str(r#"{"aimTokens":1.5,"criticalX":-3}"#).unwrap();
    assert_eq!(mods.aim_tokens, Amount::from(1));
    assert_eq!(mods.critical_x, Some(Amount::ZERO));

    let pool: AttackPool = serde_json::from_str(r#"{"red":-2,"black":3.9,"white":1}"#).unwrap();
    assert_eq!(pool, AttackPool::new(0, 3, 1));
    let pool: AttackPool = serde_json::from_str(r#"{"white":2}"#).unwrap();
    assert_eq!(pool, AttackPool::new(0, 0, 2));

    let pool: DefensePool = serde_json::from_str(r#"{"red":1e12,"white":-0.5}"#).unwrap();
    assert_eq!(pool, DefensePool::new(u32::MAX, 0));
}
