//! Neon Rift entry point
//!
//! Natively this is a headless runner: the autopilot plays a seeded run for a
//! while and the final snapshot is printed. The browser build is driven from
//! `platform::web::WebHarness` instead.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_rift::Game;
    use neon_rift::audio::SilentAudio;
    use neon_rift::highscores::DEFAULT_TOP_LIMIT;
    use neon_rift::persistence::{FallbackStore, JsonFileStore, MemoryStore};
    use neon_rift::settings::{QualityPreset, Settings};
    use neon_rift::sim::Mode;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(12345);
    let seconds = args
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(90);
    let quality = args.next().and_then(|s| QualityPreset::parse(&s));

    let dir = std::env::temp_dir().join("neon-rift");
    let mut settings = Settings::load_from(&dir.join("settings.json"));
    if let Some(quality) = quality {
        settings.quality = quality;
    }
    let store = FallbackStore::new(
        Box::new(JsonFileStore::new(dir.join("highscores.json"))),
        Box::new(MemoryStore::new()),
    );
    let audio = Box::new(SilentAudio::new(settings.muted));

    log::info!(
        "Neon Rift (native) starting: seed {}, {} s, {} quality",
        seed,
        seconds,
        settings.quality.as_str()
    );
    let mut game = Game::new(seed, settings, audio, store);
    game.autopilot = true;
    game.start_run(None);

    for _ in 0..seconds {
        game.advance_time(1000.0);
        if game.state.mode == Mode::GameOver {
            break;
        }
    }

    println!("{}", game.snapshot_text());

    if game.state.mode == Mode::GameOver {
        let name = game.settings.player_name.clone();
        let status = game.submit_score(&name);
        println!("{}", status.message());
    } else {
        println!(
            "Run still going after {} s: level {}, score {}",
            seconds,
            game.state.level.level_number,
            game.state.score.floor()
        );
    }
    for (rank, entry) in game
        .highscores
        .overall_top(DEFAULT_TOP_LIMIT)
        .into_iter()
        .enumerate()
    {
        println!(
            "{:>3}. {:<16} {:>9}  L{:<3} {}",
            rank + 1,
            entry.name,
            entry.score,
            entry.level,
            entry.date
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
