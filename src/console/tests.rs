use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use qlanes_engine::MemoryEngine;
use serde_json::json;

use super::*;
use crate::lanes::{LaneConfig, Phase};

const TIMEOUT: Duration = Duration::from_secs(5);

fn console() -> (Console<Vec<u8>>, Receiver<ConsoleEvent>) {
	let engine: Arc<dyn Engine> = Arc::new(
		MemoryEngine::new()
			.with_collection("customers", vec![json!({ "name": "ada" }), json!({ "name": "bob" })])
			.with_collection("orders", vec![json!({ "total": 3 })]),
	);
	let registry = Registry::new(Arc::clone(&engine), LaneConfig::default());
	let (tx, rx) = mpsc::channel();
	let mut console = Console::new(registry, engine, Vec::new(), 80);
	console.start(tx, 2).expect("start console");
	(console, rx)
}

fn output(console: &Console<Vec<u8>>) -> String {
	String::from_utf8_lossy(console.output()).into_owned()
}

fn line(console: &mut Console<Vec<u8>>, text: &str) -> Flow {
	console
		.handle(ConsoleEvent::Line(text.to_string()))
		.expect("handle line")
}

/// Feed deliveries into the console until `lane` has finished a run.
fn pump_until_finished(console: &mut Console<Vec<u8>>, events: &Receiver<ConsoleEvent>, lane: LaneId) {
	let deadline = Instant::now() + TIMEOUT;
	loop {
		let remaining = deadline.saturating_duration_since(Instant::now());
		let event = events.recv_timeout(remaining).expect("delivery before timeout");
		let finished = matches!(
			&event,
			ConsoleEvent::Delivery(delivery)
				if delivery.lane_id() == lane && delivery.kind() == DeliveryKind::Finished
		);
		console.handle(event).expect("handle delivery");
		if finished {
			return;
		}
	}
}

#[test]
fn start_opens_lanes_and_activates_the_first() {
	let (console, _events) = console();
	assert_eq!(console.registry().lanes().len(), 2);
	assert_eq!(console.registry().active_id(), Some(LaneId::new(1)));
	assert!(output(&console).contains("2 lane(s) ready"));
}

#[test]
fn submitted_query_renders_documents() {
	let (mut console, events) = console();
	assert_eq!(line(&mut console, "SELECT name FROM customers"), Flow::Continue);
	pump_until_finished(&mut console, &events, LaneId::new(1));

	let text = output(&console);
	assert!(text.contains("[lane 1] running..."), "{text}");
	assert!(text.contains(r#"  {"name":"ada"}"#), "{text}");
	assert!(text.contains("[lane 1] 2 document(s) in"), "{text}");
}

#[test]
fn switching_flushes_editor_into_previous_lane() {
	let (mut console, _events) = console();
	line(&mut console, ":edit SELECT $ FROM orders");
	assert_eq!(console.editor(), "SELECT $ FROM orders");

	line(&mut console, ":lane 2");
	assert_eq!(console.editor(), "");
	let first = console.registry().lane(LaneId::new(1)).expect("lane 1");
	assert_eq!(first.pending_input(), "SELECT $ FROM orders");

	line(&mut console, ":lane 1");
	assert_eq!(console.editor(), "SELECT $ FROM orders");
}

#[test]
fn results_of_inactive_lanes_stay_off_screen() {
	let (mut console, events) = console();
	line(&mut console, "SELECT $ FROM orders");
	line(&mut console, ":lane 2");

	let first = console.registry().lane(LaneId::new(1)).expect("lane 1").clone();
	let deadline = Instant::now() + TIMEOUT;
	while first.phase() != Phase::Idle || first.outcome().is_none() {
		assert!(Instant::now() < deadline, "lane 1 never finished");
		std::thread::sleep(Duration::from_millis(1));
	}
	while let Ok(event) = events.try_recv() {
		console.handle(event).expect("handle");
	}
	assert!(!output(&console).contains(r#"{"total":3}"#));

	line(&mut console, ":lane 1");
	assert!(output(&console).contains(r#"{"total":3}"#));
}

#[test]
fn new_lane_becomes_active() {
	let (mut console, _events) = console();
	line(&mut console, ":new");
	assert_eq!(console.registry().active_id(), Some(LaneId::new(3)));
	assert!(output(&console).contains("lane 3"));
}

#[test]
fn unknown_lane_is_reported_not_fatal() {
	let (mut console, _events) = console();
	assert_eq!(line(&mut console, ":lane 9"), Flow::Continue);
	assert!(output(&console).contains("lane 9 does not exist"));
	assert_eq!(console.registry().active_id(), Some(LaneId::new(1)));
}

#[test]
fn collections_lists_engine_collections() {
	let (mut console, _events) = console();
	line(&mut console, ":collections");
	let text = output(&console);
	assert!(text.contains("SELECT $ FROM customers"), "{text}");
	assert!(text.contains("SELECT $ FROM orders"), "{text}");
}

#[test]
fn collections_lists_system_collections_separately() {
	let (mut console, _events) = console();
	line(&mut console, ":collections");
	let text = output(&console);
	let (user, system) = text.split_once("system:\n").expect("system heading");
	assert!(!user.contains("$collections"), "{text}");
	assert!(system.contains("  SELECT $ FROM $collections"), "{system}");
}

#[test]
fn bad_commands_print_an_error() {
	let (mut console, _events) = console();
	assert_eq!(line(&mut console, ":nope"), Flow::Continue);
	assert!(output(&console).contains("unknown command ':nope'"));
}

#[test]
fn quit_and_end_of_input_stop_the_loop() {
	let (mut console, _events) = console();
	assert_eq!(line(&mut console, ":quit"), Flow::Quit);
	assert_eq!(
		console.handle(ConsoleEvent::InputClosed).expect("handle"),
		Flow::Quit
	);
}

#[test]
fn run_closes_lanes_on_quit() {
	let (mut console, _events) = console();
	let (tx, rx) = mpsc::channel();
	tx.send(ConsoleEvent::Line(":lanes".into())).expect("send");
	tx.send(ConsoleEvent::Line(":quit".into())).expect("send");

	run(&mut console, &rx).expect("run");
	assert!(console.registry().is_stopping());
	assert!(
		console
			.registry()
			.lanes()
			.iter()
			.all(|lane| lane.phase() == Phase::Stopped)
	);
	assert!(output(&console).contains("*   1"));
}
