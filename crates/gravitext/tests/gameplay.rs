use glam::Vec2;
use gravitext::{
    AchievementId, Command, FixedClock, GameConfig, GameEvent, GravityDirection, Gravitext,
    InputEvent, InputQueue, MemoryStorage, Mode, Storage, Submission,
};

const DT: f32 = 1.0 / 60.0;

fn game_on(clock: &FixedClock, storage: MemoryStorage) -> Gravitext {
    Gravitext::new(GameConfig::default(), Box::new(storage), Box::new(clock.clone()))
}

fn new_game() -> Gravitext {
    game_on(&FixedClock::new("2024-05-01"), MemoryStorage::new())
}

fn run(game: &mut Gravitext, seconds: f32) {
    let steps = (seconds / DT).round() as u32;
    for _ in 0..steps {
        game.step(DT);
    }
}

fn unlocked(events: &[GameEvent], id: &str) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::AchievementUnlocked { id: got, .. } if got == id))
        .count()
}

fn notifications(events: &[GameEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Notification { text } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn three_words_count_toward_milestones() {
    let mut game = new_game();
    let at = Vec2::new(400.0, 100.0);

    assert!(matches!(game.submit_word("кот", at), Submission::Block(_)));
    assert!(game.achievements().is_unlocked(AchievementId::FirstWord));
    game.submit_word("пёс", at + Vec2::new(150.0, 0.0));
    game.submit_word("кот", at - Vec2::new(150.0, 0.0));

    let a = game.achievements();
    assert_eq!(a.total_words(), 3);
    assert!(!a.is_unlocked(AchievementId::WordMaster10));
    assert_eq!(a.state(AchievementId::WordMaster10).progress, Some(3));
    assert_eq!(game.blocks().len(), 3);

    let events = game.drain_events();
    assert_eq!(unlocked(&events, "first_word"), 1);
}

#[test]
fn blank_words_do_nothing() {
    let mut game = new_game();
    assert_eq!(game.submit_word("   ", Vec2::ZERO), Submission::Ignored);
    assert!(game.blocks().is_empty());
    assert_eq!(game.achievements().total_words(), 0);
}

#[test]
fn explosion_word_twice_unlocks_once() {
    let mut game = new_game();
    let at = Vec2::new(400.0, 300.0);

    assert_eq!(game.submit_word("ВЗРЫВ", at), Submission::Command(Command::Explosion));
    assert_eq!(game.submit_word("взрыв", at), Submission::Command(Command::Explosion));

    assert!(game.blocks().is_empty());
    assert_eq!(game.achievements().total_words(), 0);
    assert_eq!(game.challenges().explosion_count(), 2);

    let events = game.drain_events();
    let blasts = events
        .iter()
        .filter(|e| matches!(e, GameEvent::Explosion { count: 100, .. }))
        .count();
    assert_eq!(blasts, 2);
    assert_eq!(unlocked(&events, "explosion_master"), 1);
}

#[test]
fn explosion_pushes_blocks_away() {
    let mut game = new_game();
    game.toggle_gravity();
    let left = match game.submit_word("левый", Vec2::new(200.0, 300.0)) {
        Submission::Block(id) => id,
        other => panic!("expected a block, got {other:?}"),
    };
    run(&mut game, DT);

    game.submit_word("BOOM", Vec2::new(400.0, 300.0));
    run(&mut game, DT);

    let body = game.blocks().get(left).unwrap().body;
    assert!(game.context().physics.velocity(&body).x < 0.0);
}

#[test]
fn freeze_stops_time_and_refreezing_extends() {
    let mut game = new_game();
    game.submit_word("сорока", Vec2::new(400.0, 100.0));
    let id = game.blocks().iter().next().unwrap().id;
    let start = game.blocks().position(id, &game.context().physics).unwrap();

    assert_eq!(game.submit_word("СТОП", Vec2::ZERO), Submission::Command(Command::Freeze));
    assert!(game.is_frozen());
    assert_eq!(game.context().physics.time_scale(), 0.0);

    run(&mut game, 2.0);
    assert_eq!(game.blocks().position(id, &game.context().physics), Some(start));

    game.submit_word("freeze", Vec2::ZERO);
    run(&mut game, 2.0);
    assert!(game.is_frozen(), "second freeze restarts the countdown");

    run(&mut game, 1.5);
    assert!(!game.is_frozen());
    assert_eq!(game.context().physics.time_scale(), 1.0);
    assert!(game.achievements().is_unlocked(AchievementId::TimeMaster));

    run(&mut game, 0.5);
    let moved = game.blocks().position(id, &game.context().physics).unwrap();
    assert!(moved.y > start.y);
}

#[test]
fn glue_links_touching_blocks_and_unglue_removes_them() {
    let mut game = new_game();
    assert_eq!(game.submit_word("клей", Vec2::ZERO), Submission::Command(Command::Glue));
    assert!(game.blocks().is_sticky());

    game.submit_word("низ", Vec2::new(400.0, 500.0));
    game.submit_word("верх", Vec2::new(400.0, 440.0));
    run(&mut game, 2.0);

    assert!(game.blocks().glue_count() >= 1);
    assert_eq!(game.context().physics.joint_count(), game.blocks().glue_count());
    assert!(game.achievements().is_unlocked(AchievementId::GlueMaster));

    game.submit_word("unglue", Vec2::ZERO);
    assert_eq!(game.blocks().glue_count(), 0);
    assert_eq!(game.context().physics.joint_count(), 0);
    assert!(!game.blocks().is_sticky());
}

#[test]
fn antigravity_flips_direction() {
    let mut game = new_game();
    game.submit_word("flip", Vec2::ZERO);
    assert_eq!(game.context().gravity.direction(), GravityDirection::Up);
    game.submit_word("АНТИГРАВИТИ", Vec2::ZERO);
    assert_eq!(game.context().gravity.direction(), GravityDirection::Down);
    assert!(game.achievements().is_unlocked(AchievementId::GravityFlipper));
}

#[test]
fn rainbow_recolours_every_block() {
    let mut game = new_game();
    game.submit_word("one", Vec2::new(200.0, 100.0));
    game.submit_word("two", Vec2::new(500.0, 100.0));
    let before: Vec<_> = game.blocks().iter().map(|b| b.color).collect();
    game.drain_events();

    game.submit_word("радуга", Vec2::ZERO);
    let after: Vec<_> = game.blocks().iter().map(|b| b.color).collect();
    assert_ne!(before, after);

    let events = game.drain_events();
    let bursts = events
        .iter()
        .filter(|e| matches!(e, GameEvent::Particles { count: 5, .. }))
        .count();
    assert_eq!(bursts, 50);
}

#[test]
fn levitation_counts_and_floating_words_feed_challenges() {
    let mut game = new_game();
    assert!(!game.toggle_gravity());
    let texts = notifications(&game.drain_events());
    assert!(texts.iter().any(|t| t == "🌌 Левитация активирована!"));
    assert_eq!(game.achievements().state(AchievementId::LevitationMaster).progress, Some(1));

    game.submit_word("пух", Vec2::new(300.0, 300.0));
    assert_eq!(game.challenges().no_gravity_words(), 1);

    assert!(game.toggle_gravity());
    game.submit_word("камень", Vec2::new(500.0, 300.0));
    assert_eq!(game.challenges().no_gravity_words(), 1);
}

#[test]
fn chaos_mode_shifts_gravity_until_left() {
    let mut game = new_game();
    assert!(game.set_mode("chaos"));
    game.drain_events();

    run(&mut game, 5.5);
    let texts = notifications(&game.drain_events());
    assert!(texts.iter().any(|t| t.starts_with("Гравитация: ")));

    assert!(game.set_mode("free"));
    assert_eq!(game.context().gravity.direction(), GravityDirection::Down);
    run(&mut game, 10.0);
    let texts = notifications(&game.drain_events());
    assert!(!texts.iter().any(|t| t.starts_with("Гравитация: ")));
}

#[test]
fn tower_mode_records_height() {
    let mut game = new_game();
    game.toggle_gravity();
    assert!(game.set_mode("tower"));
    game.submit_word("top", Vec2::new(200.0, 100.0));
    game.submit_word("bottom", Vec2::new(500.0, 400.0));
    game.drain_events();

    run(&mut game, 1.1);
    let record = game.drain_events().into_iter().find_map(|e| match e {
        GameEvent::TowerRecord { height } => Some(height),
        _ => None,
    });
    let height = record.expect("tower poll should report a record");
    assert!((height - 300.0).abs() < 5.0, "height {height}");
    assert_eq!(game.stats().max_tower_height, height);
}

#[test]
fn poet_mode_collects_the_poem() {
    let mut game = new_game();
    game.set_mode("poet");
    game.submit_word("белеет", Vec2::new(200.0, 100.0));
    game.submit_word("парус", Vec2::new(400.0, 100.0));
    game.submit_word("ВЗРЫВ", Vec2::new(400.0, 100.0));
    game.submit_word("одинокий", Vec2::new(600.0, 100.0));
    assert_eq!(game.modes().poem(), "белеет парус одинокий");
    assert_eq!(game.modes().current(), Mode::Poet);
    assert!(!game.set_mode("haiku"));
}

#[test]
fn clear_all_keeps_sticky_mode() {
    let mut game = new_game();
    game.submit_word("glue", Vec2::ZERO);
    game.submit_word("a", Vec2::new(200.0, 100.0));
    game.submit_word("b", Vec2::new(400.0, 100.0));
    game.clear_all();

    assert!(game.blocks().is_empty());
    assert!(game.blocks().is_sticky());
    let texts = notifications(&game.drain_events());
    assert!(texts.iter().any(|t| t == "🗑️ Всё очищено!"));
    assert_eq!(game.stats().current_blocks, 0);
}

#[test]
fn challenges_refresh_on_a_new_day() {
    let clock = FixedClock::new("2024-05-01");
    let mut game = game_on(&clock, MemoryStorage::new());

    clock.set("2024-05-02");
    run(&mut game, 61.0);
    let refreshed = game
        .drain_events()
        .into_iter()
        .any(|e| matches!(e, GameEvent::ChallengesRefreshed { ref date } if date == "2024-05-02"));
    assert!(refreshed);
    let expected = gravitext::challenges::daily_challenges("2024-05-02");
    assert_eq!(game.challenges().current(), expected.as_slice());
}

#[test]
fn progress_survives_a_new_session() {
    let clock = FixedClock::new("2024-05-01");
    let mut game = game_on(&clock, MemoryStorage::new());
    game.submit_word("раз", Vec2::new(200.0, 100.0));
    game.submit_word("два", Vec2::new(400.0, 100.0));
    game.submit_word("stop", Vec2::ZERO);
    game.toggle_sound();
    game.close_tutorial();

    let mut carried = MemoryStorage::new();
    for key in [
        "gravitext_achievements",
        "gravitext_challenges",
        "gravitext_audio",
        "gravitext_tutorial_shown",
    ] {
        let value = game.context().storage.get(key).unwrap();
        carried.set(key, &value);
    }

    let next = game_on(&clock, carried);
    assert_eq!(next.achievements().total_words(), 2);
    assert!(next.achievements().is_unlocked(AchievementId::TimeMaster));
    assert!(!next.context().audio.enabled);
    assert!(next.tutorial_shown());
    assert_eq!(next.challenges().current(), game.challenges().current());
    // Blocks are never persisted
    assert!(next.blocks().is_empty());
}

#[test]
fn muted_game_sends_no_sound_cues() {
    let mut game = new_game();
    assert!(!game.toggle_sound());
    game.drain_events();
    game.submit_word("тишина", Vec2::new(300.0, 100.0));
    let events = game.drain_events();
    assert!(!events.iter().any(|e| matches!(e, GameEvent::Sound { .. })));
    assert!(events.iter().any(|e| matches!(e, GameEvent::Particles { count: 15, .. })));
}

#[test]
fn music_toggles_feed_music_lover() {
    let mut game = new_game();
    for _ in 0..10 {
        assert!(game.toggle_music());
        assert!(!game.toggle_music());
    }
    assert!(game.achievements().is_unlocked(AchievementId::MusicLover));
}

#[test]
fn input_queue_drives_the_game() {
    let mut game = new_game();
    let mut input = InputQueue::new();
    input.push(InputEvent::SubmitWord { text: "день".into(), x: 200.0, y: 200.0 });
    input.push(InputEvent::SubmitWord { text: "ночь".into(), x: 400.0, y: 200.0 });
    input.push(InputEvent::SelectMode("tower".into()));
    input.push(InputEvent::SetGravityDirection(GravityDirection::Left));
    input.push(InputEvent::SetGravityStrength(2.0));
    input.push(InputEvent::Resize { width: 1000.0, height: 700.0 });

    game.handle_input(&mut input);
    assert!(input.is_empty());
    assert_eq!(game.blocks().len(), 2);
    assert_eq!(game.relations().antonym_pairs(), 1);
    assert_eq!(game.modes().current(), Mode::Tower);
    assert_eq!(game.context().physics.gravity(), Vec2::new(-2000.0, 0.0));
    assert_eq!(game.context().config.world_width, 1000.0);
}

#[test]
fn subscribers_hear_every_event() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut game = new_game();
    let heard = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&heard);
    let id = game.subscribe(move |e| {
        if let GameEvent::AchievementUnlocked { id, .. } = e {
            sink.borrow_mut().push(id.clone());
        }
    });

    game.submit_word("первое", Vec2::new(300.0, 100.0));
    assert_eq!(*heard.borrow(), vec!["first_word".to_string()]);

    assert!(game.unsubscribe(id));
    game.submit_word("glue", Vec2::ZERO);
    assert_eq!(heard.borrow().len(), 1);
}

#[test]
fn labels_and_stats_serialize_for_the_page() {
    let mut game = new_game();
    game.submit_word("слово", Vec2::new(300.0, 100.0));

    let labels = serde_json::to_value(game.labels()).unwrap();
    assert_eq!(labels[0]["text"], "слово");
    assert!(labels[0]["fill"].as_str().unwrap().starts_with("hsl("));

    let stats = serde_json::to_value(game.stats()).unwrap();
    assert_eq!(stats["totalWords"], 1);
    assert_eq!(stats["currentMode"], "free");
    assert_eq!(stats["gravityEnabled"], true);
}
