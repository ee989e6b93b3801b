#![cfg(unix)]

use std::path::PathBuf;
use std::time::Duration;

use archival_adapters::{DryRunJobRunner, ProcessJobRunner};
use archival_core::{JobError, JobRunner, JobStatus, NightlyOrchestrator, Verdict};
use archival_domain::{IndexTableDescriptor, IndexTableSet, JobKind, JobSpec, Night, ResolvedConfig};

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("archival-{tag}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// `sh -c <script> fink <args..>`: el script ve los argumentos del job en "$@".
fn shell_runner(log_dir: &std::path::Path, script: &str) -> ProcessJobRunner {
    ProcessJobRunner::new(log_dir).with_program("sh", vec!["-c".into(), script.into(), "fink".into()])
}

fn night() -> Night {
    Night::parse("19881103").unwrap()
}

#[tokio::test]
async fn job_output_goes_to_its_run_log() {
    let dir = temp_dir("ok");
    let runner = shell_runner(&dir, "echo \"$@\"; echo aviso >&2");
    let job = JobSpec::index_archival(night(), IndexTableDescriptor::new("pixel4096_jd").unwrap(), "fink.conf");

    let outcome = runner.submit(&job).await.unwrap();

    assert!(outcome.is_success());
    let log = outcome.log_path.unwrap();
    assert_eq!(log, dir.join("index_archival_pixel4096_jd_19881103.log"));
    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.starts_with("# index_archival[pixel4096_jd] night=19881103"));
    assert!(text.contains("index_archival -c fink.conf --night 19881103 --index_table pixel4096_jd"));
    assert!(text.contains("aviso"));
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn non_zero_exit_is_reported_not_raised() {
    let dir = temp_dir("fail");
    let runner = shell_runner(&dir, "exit 3");
    let outcome = runner.submit(&JobSpec::stats(night(), "fink.conf")).await.unwrap();
    assert_eq!(outcome.exit_code, Some(3));
    assert!(!outcome.is_success());
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn missing_binary_is_an_invocation_error() {
    let dir = temp_dir("missing");
    let runner = ProcessJobRunner::new(&dir).with_program(dir.join("no-such-fink"), vec![]);
    let err = runner.submit(&JobSpec::stats(night(), "fink.conf")).await.unwrap_err();
    assert!(matches!(err, JobError::Invocation { .. }));
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn slow_job_times_out_and_run_continues() {
    let dir = temp_dir("timeout");
    let script = "case \"$1\" in stats) sleep 5 ;; *) exit 0 ;; esac";
    let orchestrator = NightlyOrchestrator::builder(shell_runner(&dir, script)).job_timeout(Duration::from_millis(300))
                                                                               .build();
    let cfg = ResolvedConfig::parse(dir.join("fink.conf"), "SCIENCE_DB_NAME=ztf", &Default::default()).unwrap();
    let set = IndexTableSet::from_names(["jd_objectId"]).unwrap();

    let result = orchestrator.run(&night(), &cfg, &set).await.unwrap();

    let stats = result.job(JobKind::Stats, None).unwrap();
    assert_eq!(stats.status, JobStatus::TimedOut { after_ms: 300 });
    assert_eq!(stats.log_path, Some(dir.join("stats_19881103.log")));
    assert_eq!(result.verdict, Verdict::Failed);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn dry_run_announces_commands_in_plan_order() {
    let dir = temp_dir("dry");
    let runner = DryRunJobRunner::new(ProcessJobRunner::new(&dir));
    let orchestrator = NightlyOrchestrator::builder(runner).build();
    let cfg = ResolvedConfig::parse(PathBuf::from("fink.conf"), "", &Default::default()).unwrap();

    let result = orchestrator.run(&night(), &cfg, &IndexTableSet::reference(true)).await.unwrap();

    let commands = orchestrator.runner().commands();
    assert_eq!(commands.len(), 12);
    assert_eq!(commands[0], "fink start science_archival -c fink.conf --night 19881103");
    assert_eq!(commands[10], "fink start index_archival -c fink.conf --night 19881103 --index_table tns_jd");
    assert_eq!(commands[11], "fink start stats -c fink.conf --night 19881103");
    assert!(result.is_success());
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn extra_environment_reaches_the_job() {
    let dir = temp_dir("env");
    let runner = shell_runner(&dir, "echo \"home=$FINK_HOME\"").with_env("FINK_HOME", "/opt/fink");
    let outcome = runner.submit(&JobSpec::science_archival(night(), "fink.conf")).await.unwrap();
    let text = std::fs::read_to_string(outcome.log_path.unwrap()).unwrap();
    assert!(text.contains("home=/opt/fink"));
    std::fs::remove_dir_all(&dir).ok();
}
