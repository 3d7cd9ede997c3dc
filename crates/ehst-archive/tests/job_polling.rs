//! Integration tests: job polling.

use std::time::Duration;

use ehst_archive::{models::JobPhase, prelude::*, tap::wait_for_completion};

const JOB: &str = "https://hst.esac.esa.int/tap-server/tap/async/1";

fn poll(phases: &[JobPhase], max_polls: u32) -> (EHSTResult<()>, usize) {
    let mut remaining = phases.iter().copied();
    let mut polls = 0;
    let result = wait_for_completion(JOB, max_polls, Duration::ZERO, || {
        polls += 1;
        Ok(remaining.next().unwrap_or(JobPhase::Executing))
    });
    (result, polls)
}

#[test]
fn completed_job_finishes() {
    let (result, polls) = poll(
        &[JobPhase::Queued, JobPhase::Executing, JobPhase::Completed],
        10,
    );
    assert!(result.is_ok());
    assert_eq!(polls, 3);
}

#[test]
fn error_phase_fails_the_job() {
    let (result, polls) = poll(&[JobPhase::Executing, JobPhase::Error], 10);
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        EHSTError::JobFailed { ref job, phase: JobPhase::Error } if job == JOB
    ));
    assert_eq!(err.kind(), ErrorKind::Collaborator);
    assert_eq!(polls, 2);
}

#[test]
fn aborted_job_fails() {
    let (result, _) = poll(&[JobPhase::Aborted], 10);
    assert!(matches!(
        result,
        Err(EHSTError::JobFailed { phase: JobPhase::Aborted, .. })
    ));
}

#[test]
fn unknown_phase_keeps_polling() {
    let (result, polls) = poll(&[JobPhase::Unknown, JobPhase::Unknown, JobPhase::Completed], 10);
    assert!(result.is_ok());
    assert_eq!(polls, 3);
}

#[test]
fn polling_gives_up_after_the_limit() {
    let (result, polls) = poll(&[], 4);
    assert!(matches!(result, Err(EHSTError::JobTimeout(ref job)) if job == JOB));
    assert_eq!(polls, 4);
}

#[test]
fn phase_errors_stop_polling() {
    let mut polls = 0;
    let result = wait_for_completion(JOB, 10, Duration::ZERO, || {
        polls += 1;
        Err(EHSTError::JobTimeout("phase endpoint".to_string()))
    });
    assert!(result.is_err());
    assert_eq!(polls, 1);
}
