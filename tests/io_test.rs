//! File round trips: text input, rkyv snapshots and tuplet output.

mod synthetic;

use std::path::PathBuf;

use synthetic::{format_event, random_event, standard_cuts};
use tuplets::{find_tuplets, DispatchContext, Event, FinderConfig};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tuplets-{}-{}", std::process::id(), name))
}

#[test]
fn text_input_and_output_round_trip() {
    let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();

    let (event, _) = random_event(5, 10, 10, 4, standard_cuts(0.5));
    let input = temp_path("event.in");
    std::fs::write(&input, format_event(&event)).unwrap();

    let loaded = tuplets::io::load_event_from_file(&input, 4).unwrap();
    assert_eq!(loaded, event);

    let config = FinderConfig {
        max_tuplet_count: Some(100_000),
        ..Default::default()
    };
    let result = find_tuplets(&DispatchContext::sequential(), &loaded, &config).unwrap();
    assert!(!result.tuplets.is_empty());

    let output = temp_path("event.out");
    tuplets::io::save_tuplets_to_file(&output, &result.tuplets).unwrap();
    let text = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<Vec<u32>> = text
        .lines()
        .map(|line| line.split(' ').map(|id| id.parse().unwrap()).collect())
        .collect();
    assert_eq!(lines, result.tuplets);

    let _ = std::fs::remove_file(&input);
    let _ = std::fs::remove_file(&output);
}

#[test]
fn snapshot_gives_the_same_tuplets() {
    let (event, _) = random_event(9, 15, 15, 5, standard_cuts(0.5));
    let path = temp_path("event.rkyv");
    event.save_to_file(path.to_str().unwrap()).unwrap();
    let restored = Event::load_from_file(path.to_str().unwrap()).unwrap();
    assert_eq!(restored, event);

    let ctx = DispatchContext::new(Some(2)).unwrap();
    let config = FinderConfig {
        num_layers: 5,
        max_tuplet_count: Some(100_000),
        ..Default::default()
    };
    let a = find_tuplets(&ctx, &event, &config).unwrap();
    let b = find_tuplets(&ctx, &restored, &config).unwrap();
    assert_eq!(a.tuplets, b.tuplets);

    let _ = std::fs::remove_file(&path);
}
