//! Job Dispatcher Integration Tests
//!
//! Exercises real process launches with shell stand-ins for the generator
//! scripts, plus the single-slot concurrency guard.

#![cfg(unix)]

use std::sync::Arc;

use midiwatch::{Config, DispatchError, ExitStatus, GenerationRequest, JobDispatcher};

fn shell(config: &mut Config, script: &str) {
    let command = vec!["sh".to_string(), "-c".to_string(), script.to_string()];
    config.simple_command = command.clone();
    config.generator_command = command;
}

fn request() -> GenerationRequest {
    GenerationRequest {
        generations: 4,
        population: 10,
        hexagram: "43".to_string(),
        base_duration: 480.0,
        mutation_rate: 0.05,
        harmonicity_ratio: 0.7,
        dynamic_ratio: 0.5,
    }
}

#[tokio::test]
async fn test_direct_run_captures_stdout_and_stderr() {
    let mut config = Config::default();
    shell(&mut config, "echo out; echo err >&2");
    let dispatcher = JobDispatcher::new(&config);

    let outcome = dispatcher.run_direct().await.unwrap();
    assert_eq!(outcome.status, ExitStatus::Success);
    assert!(outcome.status.is_success());
    assert_eq!(outcome.stdout.trim(), "out");
    assert_eq!(outcome.stderr.trim(), "err");
}

#[tokio::test]
async fn test_non_zero_exit_is_an_outcome_not_an_error() {
    let mut config = Config::default();
    shell(&mut config, "exit 3");
    let dispatcher = JobDispatcher::new(&config);

    let outcome = dispatcher.run_direct().await.unwrap();
    assert_eq!(outcome.status, ExitStatus::Failure(3));
}

#[tokio::test]
async fn test_parameterized_run_passes_discrete_arguments() {
    let mut config = Config::default();
    // Echo back the raw arguments; a hexagram containing spaces must arrive
    // as one argument, not be re-split by a shell.
    config.generator_command = vec![
        "sh".to_string(),
        "-c".to_string(),
        r#"printf '%s\n' "$@""#.to_string(),
        "argv0".to_string(),
    ];
    let dispatcher = JobDispatcher::new(&config);

    let mut req = request();
    req.hexagram = "43 surprise".to_string();

    let outcome = dispatcher.run_parameterized(&req).await.unwrap();
    assert_eq!(outcome.status, ExitStatus::Success);

    let lines: Vec<&str> = outcome.stdout.lines().collect();
    assert_eq!(lines.len(), 14);
    assert_eq!(lines[0], "--generations");
    assert_eq!(lines[1], "4");
    assert_eq!(lines[4], "--hexagram");
    assert_eq!(lines[5], "43 surprise");
    assert_eq!(lines[13], "0.5");
}

#[tokio::test]
async fn test_timeout_yields_timeout_outcome() {
    let mut config = Config::default();
    shell(&mut config, "sleep 5");
    config.job_timeout_secs = 0;
    let dispatcher = JobDispatcher::new(&config);

    let outcome = dispatcher.run_direct().await.unwrap();
    assert_eq!(outcome.status, ExitStatus::Timeout);
    assert!(!outcome.status.is_success());
}

#[tokio::test]
async fn test_concurrent_generates_one_launches_one_is_busy() {
    let mut config = Config::default();
    shell(&mut config, "sleep 1");
    let dispatcher = Arc::new(JobDispatcher::new(&config));

    let first = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.run_parameterized(&request()).await })
    };
    // Give the first job time to take the slot.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let second = dispatcher.run_parameterized(&request()).await;
    assert!(matches!(second, Err(DispatchError::Busy)));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status, ExitStatus::Success);

    // Slot is free again once the job finished.
    let third = dispatcher.run_direct().await.unwrap();
    assert_eq!(third.status, ExitStatus::Success);
}

#[tokio::test]
async fn test_dispatcher_survives_launch_failure() {
    let mut config = Config::default();
    config.simple_command = vec!["/no/such/generator".to_string()];
    config.generator_command = vec!["sh".to_string(), "-c".to_string(), "true".to_string()];
    let dispatcher = JobDispatcher::new(&config);

    assert!(matches!(
        dispatcher.run_direct().await,
        Err(DispatchError::Launch { .. })
    ));

    // The slot was released despite the failed launch.
    let outcome = dispatcher.run_parameterized(&request()).await.unwrap();
    assert_eq!(outcome.status, ExitStatus::Success);
}
