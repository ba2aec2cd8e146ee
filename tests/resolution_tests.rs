//! Stream resolution, validation and exit-code tests

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {

use anyhow::anyhow;
use filexform::stream::{StreamSink, StreamSource};
use filexform::system::mock::MockSystem;
use filexform::transform::Transformer;
use filexform::{Dumper, Loader, Payload, Processor, StreamMode, TransformError, TransformerOptions};
use std::path::PathBuf;

fn identity<'f>() -> Processor<'f, Payload, Payload> {
    Processor::new(|payload: Payload, _| Ok(payload))
}

fn run(system: &MockSystem, args: &[&str], processor: Processor<'_, Payload, Payload>) -> i32 {
    filexform::run_on(
        system,
        processor,
        Loader::read_all(),
        Dumper::write_all(),
        TransformerOptions::new().args(args.iter().copied()),
    )
}

fn parsed<'s>(system: &'s MockSystem, args: &[&str]) -> Transformer<'s> {
    Transformer::new(system, TransformerOptions::new().args(args.iter().copied())).unwrap()
}

#[test]
fn three_positional_paths_conflict() {
    let system = MockSystem::new();
    let transformer = parsed(&system, &["a.txt", "b.txt", "c.txt"]);
    assert!(matches!(
        transformer.validate(),
        Err(TransformError::ArgumentConflict { .. })
    ));

    assert_eq!(run(&system, &["a.txt", "b.txt", "c.txt", "d.txt"], identity()), 1);
    assert!(system.stderr_contents().contains("Too many inputs!"));
}

#[test]
fn positional_with_named_paths_conflict() {
    for args in [
        &["a.txt", "-i", "b.txt"][..],
        &["-o", "b.txt", "a.txt"][..],
        &["-i", "x.txt", "-o", "y.txt", "a.txt"][..],
    ] {
        let system = MockSystem::new();
        let transformer = parsed(&system, args);
        assert!(matches!(
            transformer.validate(),
            Err(TransformError::ArgumentConflict { .. })
        ));
        assert_eq!(run(&system, args, identity()), 1);
        assert!(
            system
                .stderr_contents()
                .contains("Can't specify both args and options")
        );
    }
}

#[test]
fn no_paths_means_standard_streams() {
    let system = MockSystem::new().with_stdin(b"piped").unwrap();
    let transformer = parsed(&system, &[]);
    assert_eq!(transformer.invocation().input_source(), StreamSource::Stdin);
    assert_eq!(transformer.invocation().output_sink(), StreamSink::Stdout);

    assert_eq!(run(&system, &[], identity()), 0);
    assert_eq!(system.stdout_contents(), b"piped");
    assert_eq!(system.stderr_contents(), "");
}

#[test]
fn one_positional_path_is_the_input() {
    let system = MockSystem::new().with_file("a.txt", b"from file").unwrap();
    let transformer = parsed(&system, &["a.txt"]);
    assert_eq!(
        transformer.invocation().input_source(),
        StreamSource::File(PathBuf::from("a.txt"))
    );
    assert_eq!(transformer.invocation().output_sink(), StreamSink::Stdout);

    assert_eq!(run(&system, &["a.txt"], identity()), 0);
    assert_eq!(system.stdout_contents(), b"from file");
}

#[test]
fn two_positional_paths_are_input_and_output() {
    let system = MockSystem::new().with_file("a.txt", b"copy me").unwrap();
    let transformer = parsed(&system, &["a.txt", "b.txt"]);
    assert_eq!(
        transformer.invocation().input_source(),
        StreamSource::File(PathBuf::from("a.txt"))
    );
    assert_eq!(
        transformer.invocation().output_sink(),
        StreamSink::File(PathBuf::from("b.txt"))
    );

    assert_eq!(run(&system, &["a.txt", "b.txt"], identity()), 0);
    assert_eq!(system.file_contents("b.txt").unwrap(), b"copy me");
    assert!(system.stdout_contents().is_empty());
}

#[test]
fn named_paths_resolve_like_positional_paths() {
    let system = MockSystem::new();
    let positional = parsed(&system, &["a.txt", "b.txt"]);
    let named = parsed(&system, &["-i", "a.txt", "-o", "b.txt"]);
    assert_eq!(
        positional.invocation().input_source(),
        named.invocation().input_source()
    );
    assert_eq!(
        positional.invocation().output_sink(),
        named.invocation().output_sink()
    );
}

#[test]
fn named_output_only_reads_stdin() {
    let system = MockSystem::new().with_stdin(b"abc").unwrap();
    assert_eq!(run(&system, &["--output", "out.txt"], identity()), 0);
    assert_eq!(system.file_contents("out.txt").unwrap(), b"abc");
}

#[test]
fn processing_failure_reports_message() {
    let system = MockSystem::new().with_stdin(b"x").unwrap();
    let failing = Processor::new(|_: Payload, _| -> anyhow::Result<Payload> { Err(anyhow!("bad")) });
    assert_eq!(run(&system, &[], failing), 3);
    assert!(system.stderr_contents().contains("bad"));
}

#[test]
fn processing_failure_is_silent_when_quiet() {
    let system = MockSystem::new().with_stdin(b"x").unwrap();
    let failing = Processor::new(|_: Payload, _| -> anyhow::Result<Payload> { Err(anyhow!("bad")) });
    assert_eq!(run(&system, &["-q"], failing), 3);
    assert_eq!(system.stderr_contents(), "");
    assert!(system.stdout_contents().is_empty());
}

#[test]
fn missing_input_names_the_path() {
    let system = MockSystem::new();
    assert_eq!(run(&system, &["does/not/exist.txt"], identity()), 2);
    let stderr = system.stderr_contents();
    assert!(stderr.contains("Could not open file does/not/exist.txt"));
}

#[test]
fn missing_input_is_silent_when_quiet() {
    let system = MockSystem::new();
    assert_eq!(run(&system, &["-q", "-i", "nope.txt"], identity()), 2);
    assert_eq!(system.stderr_contents(), "");
}

#[test]
fn unwritable_output_exits_with_two() {
    let system = MockSystem::new().with_stdin(b"x").unwrap();
    assert_eq!(run(&system, &["-o", "/no/such/dir/out.txt"], identity()), 2);
    assert!(
        system
            .stderr_contents()
            .contains("Could not open file /no/such/dir/out.txt")
    );
}

#[test]
fn binary_loader_reads_bytes_despite_text_default() {
    let system = MockSystem::new()
        .with_file("blob.bin", &[0x00, 0xff, 0x10])
        .unwrap();
    let code = filexform::run_on(
        &system,
        Processor::new(|payload: Payload, _| {
            assert!(matches!(payload, Payload::Binary(_)));
            Ok(payload)
        }),
        Loader::read_all().binary(),
        Dumper::write_all().binary(),
        TransformerOptions::new().args(["blob.bin"]),
    );
    assert_eq!(code, 0);
    assert_eq!(system.stdout_contents(), vec![0x00, 0xff, 0x10]);
}

#[test]
fn binary_bytes_fail_in_text_mode() {
    let system = MockSystem::new()
        .with_file("blob.bin", &[0x00, 0xff, 0x10])
        .unwrap();
    assert_eq!(run(&system, &["blob.bin"], identity()), 3);
}

#[test]
fn binary_processor_sets_both_sides() {
    let system = MockSystem::new().with_stdin(&[0xc3, 0x28]).unwrap();
    let reverse = Processor::new(|payload: Payload, _| match payload {
        Payload::Binary(mut bytes) => {
            bytes.reverse();
            Ok(Payload::Binary(bytes))
        }
        Payload::Text(_) => Err(anyhow!("expected bytes")),
    })
    .binary();
    assert_eq!(run(&system, &[], reverse), 0);
    assert_eq!(system.stdout_contents(), vec![0x28, 0xc3]);
}

#[test]
fn binary_default_mode_from_options() {
    let system = MockSystem::new().with_stdin(&[0xff]).unwrap();
    let code = filexform::run_on(
        &system,
        identity(),
        Loader::read_all(),
        Dumper::write_all(),
        TransformerOptions::new()
            .args(Vec::<String>::new())
            .default_mode(StreamMode::Binary),
    );
    assert_eq!(code, 0);
    assert_eq!(system.stdout_contents(), vec![0xff]);
}

#[test]
fn text_dumper_flag_beats_binary_default() {
    let system = MockSystem::new().with_stdin(b"ok").unwrap();
    let code = filexform::run_on(
        &system,
        Processor::new(|payload: Payload, _| Ok(Payload::Binary(payload.as_bytes().to_vec()))),
        Loader::read_all(),
        Dumper::new(|payload: Payload, output, _| {
            assert_eq!(output.mode(), StreamMode::Text);
            output.write_payload(&payload)
        })
        .text(),
        TransformerOptions::new()
            .args(Vec::<String>::new())
            .default_mode(StreamMode::Binary),
    );
    assert_eq!(code, 0);
    assert_eq!(system.stdout_contents(), b"ok");
}

#[test]
fn positional_paths_can_be_disabled() {
    let system = MockSystem::new().with_file("a.txt", b"x").unwrap();
    let code = filexform::run_on(
        &system,
        identity(),
        Loader::read_all(),
        Dumper::write_all(),
        TransformerOptions::new()
            .args(["a.txt"])
            .positional_args(false),
    );
    assert_eq!(code, 2);
    assert!(system.stderr_contents().contains("a.txt"));
}

#[test]
fn hooks_add_and_check_flags() {
    use clap::{Arg, ArgAction};

    let system = MockSystem::new().with_stdin(b"hello").unwrap();
    let options = TransformerOptions::new()
        .args(["--shout"])
        .pre_parse_hook(|cmd| cmd.arg(Arg::new("shout").long("shout").action(ArgAction::SetTrue)))
        .post_parse_hook(|_, invocation| {
            let shout = invocation.matches().get_flag("shout");
            invocation.insert_extra("shout", serde_json::Value::Bool(shout));
            Ok(())
        });
    let processor = Processor::new(|payload: Payload, invocation| {
        let shout = invocation.extra("shout") == Some(&serde_json::Value::Bool(true));
        match payload {
            Payload::Text(text) if shout => Ok(Payload::Text(text.to_uppercase())),
            other => Ok(other),
        }
    });
    let code = filexform::run_on(
        &system,
        processor,
        Loader::read_all(),
        Dumper::write_all(),
        options,
    );
    assert_eq!(code, 0);
    assert_eq!(system.stdout_contents(), b"HELLO");
}

#[test]
fn failing_post_parse_hook_exits_with_one() {
    let system = MockSystem::new();
    let options = TransformerOptions::new()
        .args(["-q"])
        .post_parse_hook(|_, _| Err(anyhow!("hook says no")));
    let code = filexform::run_on(
        &system,
        identity(),
        Loader::read_all(),
        Dumper::write_all(),
        options,
    );
    assert_eq!(code, 1);
    assert!(system.stderr_contents().contains("hook says no"));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let system = MockSystem::new();
    assert_eq!(run(&system, &["--bogus"], identity()), 2);
    assert!(system.stderr_contents().contains("--bogus"));
}

#[test]
fn pass_through_arguments_reach_the_processor() {
    let system = MockSystem::new().with_stdin(b"").unwrap();
    let processor = Processor::new(|_: Payload, invocation| {
        Ok(Payload::Text(invocation.remaining_args().join(" ")))
    });
    let code = filexform::run_on(
        &system,
        processor,
        Loader::read_all(),
        Dumper::write_all(),
        TransformerOptions::new()
            .args(["extra", "--level", "3"])
            .pass_through(true),
    );
    assert_eq!(code, 0);
    assert_eq!(system.stdout_contents(), b"extra --level 3");
}

#[test]
fn pass_through_still_recognises_standard_options_after_unknown_ones() {
    let system = MockSystem::new().with_file("a.txt", b"from file").unwrap();
    let transformer = Transformer::new(
        &system,
        TransformerOptions::new()
            .args(["--level", "3", "-i", "a.txt", "-q"])
            .pass_through(true),
    )
    .unwrap();
    assert_eq!(
        transformer.invocation().input_source(),
        StreamSource::File(PathBuf::from("a.txt"))
    );
    assert!(transformer.invocation().quiet());
    assert_eq!(transformer.invocation().remaining_args(), &["--level", "3"]);

    let processor = Processor::new(|payload: Payload, invocation| match payload {
        Payload::Text(text) => Ok(Payload::Text(format!(
            "{text} {}",
            invocation.remaining_args().join(" ")
        ))),
        other => Ok(other),
    });
    let code = filexform::run_on(
        &system,
        processor,
        Loader::read_all(),
        Dumper::write_all(),
        TransformerOptions::new()
            .args(["--level", "3", "-i", "a.txt", "-o", "out.txt"])
            .pass_through(true),
    );
    assert_eq!(code, 0);
    assert_eq!(system.file_contents("out.txt").unwrap(), b"from file --level 3");
    assert!(system.stdout_contents().is_empty());
}

#[test]
fn pass_through_recognises_hook_flags() {
    use clap::{Arg, ArgAction};

    let system = MockSystem::new();
    let transformer = Transformer::new(
        &system,
        TransformerOptions::new()
            .args(["extra", "--shout", "more"])
            .pass_through(true)
            .pre_parse_hook(|cmd| {
                cmd.arg(Arg::new("shout").long("shout").action(ArgAction::SetTrue))
            }),
    )
    .unwrap();
    assert!(transformer.invocation().matches().get_flag("shout"));
    assert_eq!(transformer.invocation().remaining_args(), &["extra", "more"]);
}

#[test]
fn empty_input_option_reads_stdin() {
    let system = MockSystem::new().with_stdin(b"piped").unwrap();
    assert_eq!(run(&system, &["-i", ""], identity()), 0);
    assert_eq!(system.stdout_contents(), b"piped");
}

#[test]
fn invalid_default_mode_env_reports_through_exit_path() {
    let system = MockSystem::new()
        .with_env("FILEXFORM_DEFAULT_MODE", "octets")
        .unwrap()
        .with_stdin(b"x")
        .unwrap();
    let code = filexform::run_on(
        &system,
        identity(),
        Loader::read_all(),
        Dumper::write_all(),
        TransformerOptions::from_env(&system).args(Vec::<String>::new()),
    );
    assert_eq!(code, 1);
    assert_eq!(
        system.stderr_contents(),
        "Invalid FILEXFORM_DEFAULT_MODE value 'octets': expected 'text' or 'binary'\n"
    );
    assert!(system.stdout_contents().is_empty());

    let quiet = MockSystem::new()
        .with_env("FILEXFORM_DEFAULT_MODE", "octets")
        .unwrap();
    let code = filexform::run_on(
        &quiet,
        identity(),
        Loader::read_all(),
        Dumper::write_all(),
        TransformerOptions::from_env(&quiet).args(["-q"]),
    );
    assert_eq!(code, 1);
    assert_eq!(quiet.stderr_contents(), "");
}
}
