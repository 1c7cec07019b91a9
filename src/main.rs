//! Retro Arcade demo runner
//!
//! Plays the engines headless with their autoplayers and feeds the results to
//! the leaderboards, stats and achievements.
//!
//! Usage: `retro-arcade [seed] [game] [--steps N] [--settings FILE]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::BTreeMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result, anyhow};

    use retro_arcade::cues::{CueMixer, Flash, Playback, SoundCue};
    use retro_arcade::sim::demo::{self, DEFAULT_STEP_LIMIT, DemoRun};
    use retro_arcade::sim::rng::RngState;
    use retro_arcade::consts;
    use retro_arcade::{
        AchievementBook, AchievementContext, GameId, HighScores, Settings, StatsBook,
    };

    /// Assumed pace of a human move in the turn-based games
    const HUMAN_MOVE_MS: f32 = 400.0;

    #[derive(Debug)]
    struct Config {
        seed: Option<u64>,
        games: Vec<GameId>,
        steps: u32,
        settings: Settings,
    }

    fn parse_args(args: impl Iterator<Item = String>) -> Result<Config> {
        let mut config = Config {
            seed: None,
            games: GameId::ALL.to_vec(),
            steps: DEFAULT_STEP_LIMIT,
            settings: Settings::default(),
        };
        let mut args = args;
        let mut positional = Vec::new();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--steps" => {
                    let v = args
                        .next()
                        .ok_or_else(|| anyhow!("missing value for --steps"))?;
                    config.steps = v
                        .parse()
                        .with_context(|| format!("invalid --steps value: {v}"))?;
                }
                "--settings" => {
                    let path = args
                        .next()
                        .ok_or_else(|| anyhow!("missing value for --settings"))?;
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading settings from {path}"))?;
                    config.settings = Settings::from_json(&json)
                        .with_context(|| format!("parsing settings in {path}"))?;
                }
                other if other.starts_with("--") => {
                    return Err(anyhow!("unknown argument: {other}"));
                }
                other => positional.push(other.to_string()),
            }
        }

        let parse_game =
            |name: &str| GameId::from_str(name).ok_or_else(|| anyhow!("unknown game: {name}"));
        match positional.as_slice() {
            [] => {}
            // A lone number is a seed; run `retro-arcade <seed> 2048` for 2048
            [one] => match one.parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => config.games = vec![parse_game(one.as_str())?],
            },
            [seed, game] => {
                config.seed = Some(
                    seed.parse()
                        .with_context(|| format!("invalid seed: {seed}"))?,
                );
                config.games = vec![parse_game(game.as_str())?];
            }
            [_, _, extra, ..] => return Err(anyhow!("unexpected argument: {extra}")),
        }
        Ok(config)
    }

    fn now_ms() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }

    /// Wall-clock length the run would have taken at normal speed
    fn simulated_secs(run: &DemoRun) -> u64 {
        let per_step_ms = match run.game {
            GameId::Snake => consts::SNAKE_TICK_MS as f32,
            GameId::Breakout | GameId::Invaders => consts::FRAME_MS,
            GameId::Tetris | GameId::Puzzle2048 | GameId::Memory => HUMAN_MOVE_MS,
        };
        (run.steps as f32 * per_step_ms / 1000.0) as u64
    }

    fn count(tally: &mut BTreeMap<String, usize>, playback: Option<Playback>) {
        if let Some(p) = playback {
            *tally.entry(format!("{:?}", p.cue)).or_default() += 1;
        }
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        let config = parse_args(std::env::args().skip(1))?;
        let seed = config.seed.map_or_else(RngState::random, RngState::new);
        log::info!("Retro Arcade demo starting (seed {})", seed.seed);

        let fields = config.settings.playfields.sanitized();
        let mixer = CueMixer::from_settings(&config.settings);
        let mut rng = seed.to_rng();
        let mut scores = HighScores::new();
        let mut stats = StatsBook::new();
        let mut achievements = AchievementBook::new();

        for game in config.games {
            let run = demo::run(game, &fields, config.steps, &mut rng);

            let mut cues = BTreeMap::new();
            let mut flashes = (0usize, 0usize);
            for event in &run.events {
                count(&mut cues, mixer.sound(event));
                match mixer.flash(event) {
                    Some(Flash::Score) => flashes.0 += 1,
                    Some(Flash::Danger) => flashes.1 += 1,
                    None => {}
                }
            }

            let now = now_ms();
            let summary = &run.summary;
            stats.record(game, summary.score, simulated_secs(&run), now);
            let rank = scores.submit(game, summary.score, summary.level, now);
            if rank == Some(1) {
                count(&mut cues, mixer.play(SoundCue::HighScore));
            }

            // Unfinished runs don't count toward achievements
            let unlocked = if run.finished {
                let ctx =
                    AchievementContext::new(game, summary.clone(), stats.total_games_played());
                achievements.check(&ctx, now)
            } else {
                Vec::new()
            };
            for _ in &unlocked {
                count(&mut cues, mixer.play(SoundCue::Achievement));
            }

            println!("== {game} ==");
            println!(
                "  steps {} ({}), score {}",
                run.steps,
                if run.finished { "finished" } else { "step limit" },
                summary.score
            );
            match rank {
                Some(1) => println!("  leaderboard rank #1 (new high score!)"),
                Some(rank) => println!("  leaderboard rank #{rank}"),
                None => {}
            }
            for a in unlocked {
                println!("  achievement: {} [{}] - {}", a.name, a.icon, a.description);
            }
            println!("  cues: {cues:?}");
            println!("  flashes: {} score, {} danger", flashes.0, flashes.1);
        }

        let (unlocked, total) = achievements.progress();
        println!(
            "\n{} games, {} simulated seconds, {unlocked}/{total} achievements",
            stats.total_games_played(),
            stats.total_play_secs()
        );
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn args(list: &[&str]) -> impl Iterator<Item = String> {
            list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
        }

        #[test]
        fn test_parse_seed_and_game() {
            let config = parse_args(args(&["42", "tetris", "--steps", "100"])).unwrap();
            assert_eq!(config.seed, Some(42));
            assert_eq!(config.games, vec![GameId::Tetris]);
            assert_eq!(config.steps, 100);
        }

        #[test]
        fn test_parse_lone_argument() {
            assert_eq!(parse_args(args(&["2048"])).unwrap().seed, Some(2048));
            let config = parse_args(args(&["memory"])).unwrap();
            assert_eq!((config.seed, config.games), (None, vec![GameId::Memory]));
            let config = parse_args(args(&["5", "2048"])).unwrap();
            assert_eq!(config.games, vec![GameId::Puzzle2048]);
        }

        #[test]
        fn test_parse_defaults_to_all_games() {
            let config = parse_args(args(&[])).unwrap();
            assert_eq!(config.seed, None);
            assert_eq!(config.games.len(), 6);
        }

        #[test]
        fn test_parse_errors() {
            assert!(parse_args(args(&["pong"])).is_err());
            assert!(parse_args(args(&["--steps"])).is_err());
            assert!(parse_args(args(&["--steps", "many"])).is_err());
            assert!(parse_args(args(&["--fast"])).is_err());
            assert!(parse_args(args(&["x", "snake"])).is_err());
            assert!(parse_args(args(&["1", "snake", "extra"])).is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives the library directly
}
