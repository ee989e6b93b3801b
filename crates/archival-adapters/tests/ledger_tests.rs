use std::io::Write;

use archival_adapters::JsonlEventStore;
use archival_core::{replay, EventStore, JobError, JobOutcome, JobRunner, NightlyOrchestrator, RunEventKind, Verdict};
use archival_domain::{IndexTableSet, JobSpec, Night, ResolvedConfig};
use async_trait::async_trait;

struct FailIndex(&'static str);

#[async_trait]
impl JobRunner for FailIndex {
    async fn submit(&self, job: &JobSpec) -> Result<JobOutcome, JobError> {
        Ok(JobOutcome::exited(if job.index_name() == Some(self.0) { 1 } else { 0 }))
    }
}

fn ledger_path(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("archival-ledger-{tag}-{}", uuid::Uuid::new_v4()))
                        .join("runs.jsonl")
}

#[tokio::test]
async fn reopened_ledger_replays_the_same_result() {
    let path = ledger_path("reopen");
    let store = JsonlEventStore::open(&path).unwrap();
    let orchestrator = NightlyOrchestrator::builder(FailIndex("ssnamenr_jd")).event_store(store).build();
    let cfg = ResolvedConfig::parse("fink.conf".into(), "SCIENCE_DB_NAME=ztf", &Default::default()).unwrap();
    let night = Night::parse("19881103").unwrap();

    let result = orchestrator.run(&night, &cfg, &IndexTableSet::reference(false)).await.unwrap();
    assert_eq!(result.verdict, Verdict::PartialFailure);
    drop(orchestrator);

    let reopened = JsonlEventStore::open(&path).unwrap();
    assert_eq!(reopened.run_ids(), vec![result.run_id]);
    assert_eq!(reopened.latest_run_for(&night), Some(result.run_id));
    assert_eq!(reopened.latest_run_for(&Night::parse("19881104").unwrap()), None);
    let replayed = replay(result.run_id, &reopened.list(result.run_id)).unwrap();
    assert_eq!(replayed, result);
    assert_eq!(replayed.failed_index_tables(), vec!["ssnamenr_jd"]);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn unreadable_lines_are_skipped() {
    let path = ledger_path("garbage");
    let run_id = uuid::Uuid::new_v4();
    {
        let mut store = JsonlEventStore::open(&path).unwrap();
        store.append_kind(run_id,
                          RunEventKind::RunInitialized { night: Night::parse("19881103").unwrap(),
                                                         plan_hash: "h".into(),
                                                         config_path: "fink.conf".into(),
                                                         jobs: vec![],
                                                         rerun_of: None });
    }
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{{no es json").unwrap();
    writeln!(file).unwrap();
    drop(file);

    let mut store = JsonlEventStore::open(&path).unwrap();
    assert_eq!(store.list(run_id).len(), 1);
    let ev = store.append_kind(run_id, RunEventKind::RunCompleted { verdict: Verdict::Succeeded,
                                                                    run_fingerprint: "f".into() });
    assert_eq!(ev.seq, 1);
    assert_eq!(JsonlEventStore::open(&path).unwrap().list(run_id).len(), 2);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}
