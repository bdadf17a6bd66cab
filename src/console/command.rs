use thiserror::Error;

use crate::lanes::LaneId;

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// Plain text: make it the editor text and run it.
	Submit(String),
	/// `:edit <text>`: replace the editor text without running.
	Edit(String),
	/// `:run`: submit the current editor text.
	Run,
	/// `:new`: create a lane and switch to it.
	New,
	/// `:lane <id>`: switch to another lane.
	Switch(LaneId),
	/// `:lanes`: list lanes.
	Lanes,
	/// `:show`: render the active lane's stored outcome again.
	Show,
	/// `:collections`: list what the engine can query.
	Collections,
	Help,
	Quit,
	/// Blank input.
	Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
	#[error("unknown command ':{0}' (try :help)")]
	Unknown(String),

	#[error(":{0} needs an argument")]
	MissingArgument(&'static str),

	#[error("'{0}' is not a lane number")]
	InvalidLane(String),
}

pub const HELP: &str = "\
<query>            run the query on the active lane
:edit <query>      set the active lane's query without running it
:run               run the active lane's query
:new               open a new lane and switch to it
:lane <n>          switch to lane n
:lanes             list lanes
:show              show the active lane's last result
:collections       list collections
:help              show this help
:quit              stop all lanes and exit";

impl Command {
	pub fn parse(line: &str) -> Result<Self, CommandError> {
		let line = line.trim_end_matches(['\r', '\n']);
		if line.trim().is_empty() {
			return Ok(Self::Empty);
		}

		let Some(rest) = line.trim_start().strip_prefix(':') else {
			return Ok(Self::Submit(line.trim().to_string()));
		};

		let (name, argument) = match rest.split_once(char::is_whitespace) {
			Some((name, argument)) => (name, argument.trim()),
			None => (rest, ""),
		};

		match name.to_ascii_lowercase().as_str() {
			"edit" | "e" => Ok(Self::Edit(argument.to_string())),
			"run" | "r" => Ok(Self::Run),
			"new" | "n" => Ok(Self::New),
			"lane" | "l" => {
				if argument.is_empty() {
					return Err(CommandError::MissingArgument("lane"));
				}
				argument
					.parse::<u64>()
					.ok()
					.filter(|raw| *raw > 0)
					.map(|raw| Self::Switch(LaneId::new(raw)))
					.ok_or_else(|| CommandError::InvalidLane(argument.to_string()))
			}
			"lanes" | "ls" => Ok(Self::Lanes),
			"show" | "s" => Ok(Self::Show),
			"collections" | "cols" => Ok(Self::Collections),
			"help" | "h" | "?" => Ok(Self::Help),
			"quit" | "q" | "exit" => Ok(Self::Quit),
			other => Err(CommandError::Unknown(other.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn plain_text_is_submitted_trimmed() {
		assert_eq!(
			Command::parse("  SELECT $ FROM customers \n"),
			Ok(Command::Submit("SELECT $ FROM customers".into()))
		);
	}

	#[test]
	fn blank_lines_are_empty() {
		assert_eq!(Command::parse(" \t\r\n"), Ok(Command::Empty));
	}

	#[test]
	fn lane_switch_parses_ids() {
		assert_eq!(
			Command::parse(":lane 3"),
			Ok(Command::Switch(LaneId::new(3)))
		);
		assert_eq!(
			Command::parse(":lane zero"),
			Err(CommandError::InvalidLane("zero".into()))
		);
		assert_eq!(
			Command::parse(":lane 0"),
			Err(CommandError::InvalidLane("0".into()))
		);
		assert_eq!(
			Command::parse(":lane"),
			Err(CommandError::MissingArgument("lane"))
		);
	}

	#[test]
	fn edit_keeps_inner_text() {
		assert_eq!(
			Command::parse(":edit SELECT name FROM c"),
			Ok(Command::Edit("SELECT name FROM c".into()))
		);
	}

	#[test]
	fn unknown_commands_are_reported() {
		assert_eq!(
			Command::parse(":frobnicate"),
			Err(CommandError::Unknown("frobnicate".into()))
		);
	}

	#[test]
	fn aliases_are_case_insensitive() {
		assert_eq!(Command::parse(":Q"), Ok(Command::Quit));
		assert_eq!(Command::parse(":LS"), Ok(Command::Lanes));
	}
}
