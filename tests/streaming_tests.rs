//! Streaming-mode tests

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {

use anyhow::{Context as _, anyhow};
use filexform::system::mock::MockSystem;
use filexform::{StreamMode, StreamProcessor, TransformerOptions};
use std::io::{BufRead as _, Read as _, Write as _};

fn stream(system: &MockSystem, args: &[&str], processor: StreamProcessor<'_>) -> i32 {
    filexform::run_streaming_on(
        system,
        processor,
        TransformerOptions::new().args(args.iter().copied()),
    )
}

fn number_lines<'f>() -> StreamProcessor<'f> {
    StreamProcessor::new(|input, output, _| {
        for (index, line) in input.lines().enumerate() {
            let line = line.context("Failed to read line")?;
            writeln!(output, "{}: {line}", index + 1)?;
        }
        Ok(())
    })
}

#[test]
fn processes_line_by_line_between_files() {
    let system = MockSystem::new()
        .with_file("/in/poem.txt", b"roses\nviolets\n")
        .unwrap()
        .with_dir("/out")
        .unwrap();
    assert_eq!(
        stream(&system, &["/in/poem.txt", "/out/numbered.txt"], number_lines()),
        0
    );
    assert_eq!(
        system.file_contents("/out/numbered.txt").unwrap(),
        b"1: roses\n2: violets\n"
    );
}

#[test]
fn defaults_to_standard_streams() {
    let system = MockSystem::new().with_stdin(b"a\nb\n").unwrap();
    assert_eq!(stream(&system, &[], number_lines()), 0);
    assert_eq!(system.stdout_contents(), b"1: a\n2: b\n");
}

#[test]
fn modes_follow_processor_flag() {
    let system = MockSystem::new().with_stdin(&[1, 2, 3]).unwrap();
    let processor = StreamProcessor::new(|input, output, _| {
        assert_eq!(input.mode(), StreamMode::Binary);
        assert_eq!(output.mode(), StreamMode::Binary);
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        output.write_all(&bytes)?;
        Ok(())
    })
    .binary();
    assert_eq!(stream(&system, &[], processor), 0);
    assert_eq!(system.stdout_contents(), vec![1, 2, 3]);
}

#[test]
fn modes_default_to_text() {
    let system = MockSystem::new().with_stdin(b"").unwrap();
    let processor = StreamProcessor::new(|input, output, _| {
        assert_eq!(input.mode(), StreamMode::Text);
        assert_eq!(output.mode(), StreamMode::Text);
        Ok(())
    });
    assert_eq!(stream(&system, &[], processor), 0);
}

#[test]
fn failure_keeps_partial_output_and_exits_with_three() {
    let system = MockSystem::new().with_stdin(b"one\ntwo\n").unwrap();
    let processor = StreamProcessor::new(|input, output, _| {
        let mut first = String::new();
        input.read_line(&mut first)?;
        output.write_all(first.as_bytes())?;
        Err(anyhow!("gave up after one line"))
    });
    assert_eq!(stream(&system, &[], processor), 3);
    assert_eq!(system.stdout_contents(), b"one\n");
    assert!(system.stderr_contents().contains("gave up after one line"));
}

#[test]
fn missing_input_stops_before_output_is_created() {
    let system = MockSystem::new();
    assert_eq!(
        stream(&system, &["-i", "missing.txt", "-o", "out.txt"], number_lines()),
        2
    );
    assert!(system.file_contents("out.txt").is_none());
    assert!(
        system
            .stderr_contents()
            .contains("Could not open file missing.txt")
    );
}

#[test]
fn conflicting_arguments_never_call_the_processor() {
    let system = MockSystem::new();
    let processor = StreamProcessor::new(|_, _, _| panic!("processor must not run"));
    assert_eq!(stream(&system, &["a", "-o", "b"], processor), 1);
}
}
