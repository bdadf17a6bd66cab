use std::io::{self, Write};
use std::time::Duration;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::lanes::{LaneId, LaneSnapshot, Outcome};

const ELLIPSIS: char = '…';

/// Cut `text` to at most `width` terminal columns, marking the cut with an ellipsis.
pub(crate) fn truncate_to_width(text: &str, width: usize) -> String {
	if text.width() <= width {
		return text.to_string();
	}

	let budget = width.saturating_sub(1);
	let mut used = 0;
	let mut result = String::new();
	for ch in text.chars() {
		let ch_width = ch.width().unwrap_or(0);
		if used + ch_width > budget {
			break;
		}
		used += ch_width;
		result.push(ch);
	}
	if width > 0 {
		result.push(ELLIPSIS);
	}
	result
}

pub(crate) fn format_elapsed(elapsed: Duration) -> String {
	format!("{elapsed:.2?}")
}

pub(crate) fn started(out: &mut impl Write, lane: LaneId) -> io::Result<()> {
	writeln!(out, "[lane {lane}] running...")
}

/// Render whatever the lane currently holds: a running marker, the documents
/// of its last run, or its error.
pub(crate) fn snapshot(out: &mut impl Write, lane: &LaneSnapshot, width: usize) -> io::Result<()> {
	if lane.running {
		return started(out, lane.id);
	}

	match &lane.outcome {
		Outcome::None => writeln!(out, "[lane {}] no result yet", lane.id),
		Outcome::Success(set) => {
			for document in &set.documents {
				let line = serde_json::to_string(document).map_err(io::Error::other)?;
				writeln!(out, "  {}", truncate_to_width(&line, width))?;
			}
			let count = match set.documents.len() {
				0 => "no result".to_string(),
				n => format!("{n} document(s)"),
			};
			if set.truncated {
				writeln!(
					out,
					"[lane {}] {count}, more available (limit reached) in {}",
					lane.id,
					format_elapsed(set.elapsed)
				)
			} else {
				writeln!(
					out,
					"[lane {}] {count} in {}",
					lane.id,
					format_elapsed(set.elapsed)
				)
			}
		}
		Outcome::Failure(failure) => writeln!(
			out,
			"[lane {}] error: {} (after {})",
			lane.id,
			failure.error,
			format_elapsed(failure.elapsed)
		),
	}
}

pub(crate) fn lane_list(
	out: &mut impl Write,
	lanes: &[LaneSnapshot],
	active: Option<LaneId>,
) -> io::Result<()> {
	for lane in lanes {
		let marker = if Some(lane.id) == active { '*' } else { ' ' };
		let status = if lane.running {
			"running"
		} else {
			match &lane.outcome {
				Outcome::None => "idle",
				Outcome::Success(_) => "done",
				Outcome::Failure(_) => "failed",
			}
		};
		let query = if lane.pending_input.is_empty() {
			"-".to_string()
		} else {
			truncate_to_width(&lane.pending_input, 60)
		};
		writeln!(out, "{marker} {:>3}  {status:<7}  {query}", lane.id.get())?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use qlanes_engine::EngineError;
	use serde_json::json;

	use super::*;
	use crate::lanes::{Failure, Phase, ResultSet};

	fn lane_with(outcome: Outcome) -> LaneSnapshot {
		LaneSnapshot {
			id: LaneId::new(2),
			pending_input: "SELECT $ FROM c".into(),
			running: false,
			phase: Phase::Idle,
			outcome,
		}
	}

	fn rendered(lane: &LaneSnapshot) -> String {
		let mut out = Vec::new();
		snapshot(&mut out, lane, 40).expect("render");
		String::from_utf8(out).expect("utf8")
	}

	#[test]
	fn short_text_is_untouched() {
		assert_eq!(truncate_to_width("abc", 3), "abc");
		assert_eq!(truncate_to_width("", 0), "");
	}

	#[test]
	fn long_text_ends_in_ellipsis_within_width() {
		let cut = truncate_to_width("abcdefgh", 5);
		assert_eq!(cut, "abcd…");
	}

	#[test]
	fn wide_characters_count_double() {
		let cut = truncate_to_width("日本語テキスト", 6);
		assert_eq!(cut, "日本…");
	}

	#[test]
	fn success_lists_documents_and_count() {
		let text = rendered(&lane_with(Outcome::Success(Arc::new(ResultSet {
			query: "SELECT $ FROM c".into(),
			documents: vec![json!({ "a": 1 }), json!({ "a": 2 })],
			truncated: false,
			elapsed: Duration::from_millis(3),
		}))));
		assert!(text.contains(r#"  {"a":1}"#), "{text}");
		assert!(text.contains("[lane 2] 2 document(s) in"), "{text}");
	}

	#[test]
	fn empty_success_reads_no_result() {
		let text = rendered(&lane_with(Outcome::Success(Arc::new(ResultSet {
			query: "q".into(),
			documents: Vec::new(),
			truncated: false,
			elapsed: Duration::ZERO,
		}))));
		assert!(text.contains("no result"), "{text}");
	}

	#[test]
	fn failure_shows_error_message() {
		let text = rendered(&lane_with(Outcome::Failure(Arc::new(Failure {
			query: "q".into(),
			error: EngineError::UnknownCollection("orders".into()),
			elapsed: Duration::from_millis(1),
		}))));
		assert!(text.contains("error: collection 'orders' does not exist"), "{text}");
	}

	#[test]
	fn running_lane_shows_indicator() {
		let mut lane = lane_with(Outcome::None);
		lane.running = true;
		assert_eq!(rendered(&lane), "[lane 2] running...\n");
	}

	#[test]
	fn lane_list_marks_active_lane() {
		let lanes = vec![lane_with(Outcome::None)];
		let mut out = Vec::new();
		lane_list(&mut out, &lanes, Some(LaneId::new(2))).expect("render");
		let text = String::from_utf8(out).expect("utf8");
		assert!(text.starts_with("*   2  idle"), "{text}");
	}
}
