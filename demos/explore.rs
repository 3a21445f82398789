//! Voice-Leading Exploration
//!
//! Evolves a short SATB progression and prints the fittest candidate, its
//! per-rule defects and its melodies.
//!
//! Pass a JSON configuration file to override the demo settings:
//!
//! ```text
//! cargo run --example explore -- my_config.json
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use voice_leading_evo::prelude::*;

fn demo_config() -> VoiceLeadingConfig {
    VoiceLeadingConfig {
        voicing: "SATB".to_string(),
        chord_count: 8,
        population_size: 300,
        max_generations: 400,
        max_mutated_voices: 4,
        seed: Some(42),
        ..VoiceLeadingConfig::default()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_target(false)
        .compact()
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => VoiceLeadingConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => demo_config(),
    };

    let ga = VoiceLeadingGA::builder().config(config).build()?;
    let mut rng = match ga.config().seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let result = ga.run(&mut rng)?;

    println!("\n=== Result ===");
    println!("  Best fitness: {:.6}", result.best_fitness);
    println!("  Generations:  {}", result.generations);
    println!("  Evaluations:  {}", result.evaluations);
    println!("  Series:       {}", result.best_genome.series());
    println!("  Progression:  {}", result.best_genome.progression());

    println!("\nDefects:");
    for penalty in ga.rule_set().penalties(&result.best_genome) {
        println!(
            "  {:<26} {:>3} x {:.3}",
            penalty.rule.name(),
            penalty.defects,
            penalty.weight
        );
    }

    println!("\nMelodies:");
    let voicing = result.best_genome.voicing();
    for (voice, melody) in voicing.iter().zip(result.best_genome.melodies()) {
        let notes: Vec<String> = melody.iter().map(|p| p.to_string()).collect();
        println!("  {}: {}", voice, notes.join(" "));
    }

    println!("\nLaTeX figures:\n{}", result.best_genome.to_roman_numerals(true));
    println!("\n{}", result.stats.summary());

    Ok(())
}
