use std::time::Instant;

use legion_odds::prelude::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let pool = AttackPool::new(2, 2, 0);
    let attack = AttackModifiers::builder()
        .surge(SurgeMode::Hit)
        .critical_x(1)
        .aim_tokens(1)
        .build();
    let defense = DefenseModifiers::builder()
        .die(DefenseDie::White)
        .cover(Cover::Light)
        .dodge_tokens(1)
        .build();

    let start = Instant::now();
    let attack_results = compute_attack_distribution(&pool, &attack);
    let defense_results =
        compute_defense_distribution(&DefensePool::new(0, 4), DefenseSurge::None, 0);
    let wounds = compute_wounds_distribution(&attack_results, &defense);
    let exact = Calculator::builder()
        .strategy(Strategy::Exact)
        .build()
        .engagement(&pool, &attack, &defense);
    let elapsed = start.elapsed().as_millis();

    println!("== attack: {pool:?}");
    attack_results.print_table();
    println!("== defense: 4 white dice");
    defense_results.print_table();
    println!("== wounds (simulated)");
    wounds.print_table();
    println!("== wounds (exact)");
    exact.print_table();
    println!("elapsed = {elapsed} ms");
}
