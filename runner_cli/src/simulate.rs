use runner_rhythm::{GameConfig, PlaySession, RhythmServiceConfig};
use runner_schema::{Lane, Question, SpawnEvent, GRID_WIDTH, LANE_COUNT};

pub struct Options {
    pub duration: f64,
    pub fps: u32,
    pub slow_mo_at: Option<f64>,
}

/// Slow-mo can stretch a game second over many real ones; bail out eventually.
const MAX_FRAMES_PER_GAME_SECOND: f64 = 50.0;

pub fn run_simulation(
    game: GameConfig,
    rhythm: RhythmServiceConfig,
    questions: Vec<Question>,
    options: &Options,
) -> anyhow::Result<()> {
    let fps = options.fps.max(1);
    let delta = 1.0 / f64::from(fps);
    let mut session = PlaySession::new(game, rhythm, questions)?;
    session.begin();

    println!("Simulation Start ({:.1}s at {} fps)", options.duration, fps);
    println!("Time(s)  | Lanes       | Info");
    println!("---------|-------------|------------------");

    let max_frames = (options.duration * f64::from(fps) * MAX_FRAMES_PER_GAME_SECOND).ceil() as u64;
    let mut emitted = 0usize;
    let mut frames = 0u64;
    let mut slow_mo_pending = options.slow_mo_at;

    while session.store().game_time() < options.duration && frames < max_frames {
        frames += 1;
        let events = session.tick(delta);
        let now = session.store().game_time();

        if slow_mo_pending.is_some_and(|at| now >= at) {
            slow_mo_pending = None;
            session.store_mut().go_slow_mo();
            println!("{now:8.3} | {:11} | slow-mo", "");
        }

        for event in &events {
            println!("{:8.3} | {} | {}", event.spawn_time(), lane_row(event), describe(event));
        }
        emitted += events.len();
    }

    let level = session.rhythm().level_manager();
    println!(
        "Simulation End: {} event(s), {} dropped, game time {:.3}s over {} frame(s)",
        emitted,
        level.dropped_event_count(),
        session.store().game_time(),
        frames
    );
    Ok(())
}

/// Grid rows top to bottom: `#` blocked, a letter per answer slot, `.` free.
fn lane_row(event: &SpawnEvent) -> String {
    let mut cells = ['.'; LANE_COUNT];
    match event {
        SpawnEvent::Obstacle(data) => {
            for &lane in &data.lanes {
                if let Some(cell) = cells.get_mut(lane as usize) {
                    *cell = '#';
                }
            }
        }
        SpawnEvent::AnswerGate(data) => {
            for (lane, slot) in data.answer_mapping.iter().enumerate() {
                let Some(answer) = slot else { continue };
                if let Some(i) = data.question.answers.iter().position(|a| a.id == answer.id) {
                    cells[lane] = answer_letter(i);
                }
            }
        }
    }

    cells
        .chunks(GRID_WIDTH as usize)
        .map(|row| row.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("|")
}

fn answer_letter(index: usize) -> char {
    char::from(b'A' + index as u8)
}

fn describe(event: &SpawnEvent) -> String {
    match event {
        SpawnEvent::Obstacle(data) => format!(
            "{} {:?} x{:.1}",
            data.metadata.action_type.as_str(),
            data.shape,
            data.speed
        ),
        SpawnEvent::AnswerGate(data) => {
            let correct = data
                .question
                .answers
                .iter()
                .position(|a| a.is_correct)
                .map(answer_letter)
                .unwrap_or('-');
            let lanes: Vec<Lane> = data.answer_lanes();
            format!(
                "GATE {} (correct {}) lanes {:?} x{:.1}",
                data.question.id, correct, lanes, data.speed
            )
        }
    }
}
