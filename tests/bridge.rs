//! End-to-end tests: a real build thread executing a scripted task tree,
//! driven from the test (controller) thread.
//!
//! Determinism note: controller commands only take effect at scheduling
//! boundaries, so every test first parks the build thread on a breakpoint
//! (breakpoints survive `build_started`; pending step/pause intentions do
//! not) and issues commands while the build is provably suspended.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};

use buildstub::breakpoint::Breakpoint;
use buildstub::bridge::{
    BridgeBuilderError, Canceled, DebugBridge, DebugController, Phase, SuspendReason,
};
use buildstub::build;
use buildstub::common::SourceLocation;
use buildstub::sink::DebugEvent;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq)]
struct ScriptTask {
    name: &'static str,
    location: Option<SourceLocation>,
}

impl build::Task for ScriptTask {
    fn location(&self) -> Option<SourceLocation> {
        self.location.clone()
    }
}

#[derive(Debug, Clone)]
struct ScriptTarget {
    name: &'static str,
    location: Option<SourceLocation>,
}

impl build::Target for ScriptTarget {
    fn location(&self) -> Option<SourceLocation> {
        self.location.clone()
    }
}

type Bridge = DebugBridge<ScriptTask, ScriptTarget, mpsc::Sender<DebugEvent>, Arc<AtomicBool>>;
type Controller =
    DebugController<ScriptTask, ScriptTarget, mpsc::Sender<DebugEvent>, Arc<AtomicBool>>;

fn loc(line: u32) -> SourceLocation {
    SourceLocation::new("fixture/build.plan", line)
}

fn task(name: &'static str, line: u32) -> ScriptTask {
    ScriptTask {
        name,
        location: Some(loc(line)),
    }
}

fn target(name: &'static str, line: u32) -> ScriptTarget {
    ScriptTarget {
        name,
        location: Some(loc(line)),
    }
}

struct Harness {
    controller: Controller,
    events: mpsc::Receiver<DebugEvent>,
    canceled: Arc<AtomicBool>,
    build: Option<thread::JoinHandle<Result<(), Canceled>>>,
}

impl Harness {
    fn expect_suspended(&self, reason: SuspendReason) -> Result<Option<SourceLocation>> {
        match self.events.recv_timeout(RECV_TIMEOUT)? {
            DebugEvent::Suspended {
                reason: got,
                location,
            } if got == reason => Ok(location),
            other => bail!("expected suspension ({:?}), got {:?}", reason, other),
        }
    }

    fn expect_resumed(&self) -> Result<()> {
        match self.events.recv_timeout(RECV_TIMEOUT)? {
            DebugEvent::Resumed => Ok(()),
            other => bail!("expected resumption, got {:?}", other),
        }
    }

    fn expect_terminated(&self) -> Result<()> {
        match self.events.recv_timeout(RECV_TIMEOUT)? {
            DebugEvent::Terminated => Ok(()),
            other => bail!("expected termination, got {:?}", other),
        }
    }

    fn finish(&mut self) -> Result<Result<(), Canceled>> {
        let build = self
            .build
            .take()
            .ok_or_else(|| anyhow!("build thread already joined"))?;
        build.join().map_err(|_| anyhow!("build thread panicked"))
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        // if an assertion bailed mid-test, don't leave the build thread
        // parked in the gate
        self.canceled.store(true, Ordering::Relaxed);
    }
}

/// Build a bridge with a fast poll interval, run `setup` against the
/// controller, then spawn a build thread executing `script`.
fn spawn_build<F>(setup: impl FnOnce(&Controller), script: F) -> Harness
where
    F: FnOnce(&mut Bridge) -> Result<(), Canceled> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let canceled = Arc::new(AtomicBool::new(false));
    let (mut bridge, controller) = DebugBridge::builder(tx, Arc::clone(&canceled))
        .poll_interval(POLL)
        .build()
        .expect("valid builder configuration");

    setup(&controller);

    Harness {
        controller,
        events: rx,
        canceled,
        build: Some(thread::spawn(move || script(&mut bridge))),
    }
}

/// One target at line 1 running tasks a/b/c at lines 10/11/12.
fn simple_build(bridge: &mut Bridge) -> Result<(), Canceled> {
    bridge.build_started();
    bridge.target_started(target("main", 1))?;
    for &(name, line) in &[("a", 10), ("b", 11), ("c", 12)] {
        let t = task(name, line);
        bridge.task_started(t.clone())?;
        bridge.task_finished(t)?;
    }
    bridge.target_finished();
    bridge.build_finished();
    Ok(())
}

/// Like `simple_build`, but task a (line 10) runs a nested task at line 15
/// before finishing.
fn nested_build(bridge: &mut Bridge) -> Result<(), Canceled> {
    bridge.build_started();
    bridge.target_started(target("main", 1))?;

    let a = task("a", 10);
    bridge.task_started(a.clone())?;
    let nested = task("nested", 15);
    bridge.task_started(nested.clone())?;
    bridge.task_finished(nested)?;
    bridge.task_finished(a)?;

    for &(name, line) in &[("b", 11), ("c", 12)] {
        let t = task(name, line);
        bridge.task_started(t.clone())?;
        bridge.task_finished(t)?;
    }
    bridge.target_finished();
    bridge.build_finished();
    Ok(())
}

/// Park the build thread on a breakpoint at task a (line 10).
fn park_at_first_task<F>(script: F) -> Result<Harness>
where
    F: FnOnce(&mut Bridge) -> Result<(), Canceled> + Send + 'static,
{
    let h = spawn_build(|c| c.add_breakpoint(Breakpoint::new(loc(10))), script);
    let at = h.expect_suspended(SuspendReason::Breakpoint)?;
    assert_eq!(at, Some(loc(10)));
    Ok(h)
}

#[test]
fn breakpoint_suspends_then_build_runs_to_completion() -> Result<()> {
    let mut h = spawn_build(
        |c| c.add_breakpoint(Breakpoint::new(loc(11))),
        simple_build,
    );

    let at = h.expect_suspended(SuspendReason::Breakpoint)?;
    assert_eq!(at, Some(loc(11)));

    h.controller.resume();
    h.expect_resumed()?;
    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));
    Ok(())
}

#[test]
fn disabled_breakpoint_does_not_suspend() -> Result<()> {
    let mut h = spawn_build(
        |c| {
            c.add_breakpoint(Breakpoint {
                location: loc(11),
                enabled: false,
            })
        },
        simple_build,
    );

    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));
    Ok(())
}

#[test]
fn removed_breakpoint_does_not_suspend() -> Result<()> {
    let mut h = spawn_build(
        |c| {
            c.add_breakpoint(Breakpoint::new(loc(11)));
            c.remove_breakpoint(&loc(11));
        },
        simple_build,
    );

    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));
    Ok(())
}

#[test]
fn client_suspend_pauses_at_the_next_task_boundary() -> Result<()> {
    let mut h = park_at_first_task(simple_build)?;

    // ask for a pause while suspended, then resume: the request must be
    // honored at the next boundary with a task current (b's start), not
    // somewhere mid-task
    h.controller.suspend();
    h.controller.resume();
    h.expect_resumed()?;
    assert_eq!(
        h.expect_suspended(SuspendReason::ClientRequest)?,
        Some(loc(11))
    );

    h.controller.resume();
    h.expect_resumed()?;
    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));
    Ok(())
}

#[test]
fn resume_before_any_suspension_is_a_no_op() -> Result<()> {
    let mut h = spawn_build(
        |c| {
            c.resume(); // nothing suspended yet; must not pre-satisfy the gate
            c.add_breakpoint(Breakpoint::new(loc(10)));
        },
        simple_build,
    );

    assert_eq!(
        h.expect_suspended(SuspendReason::Breakpoint)?,
        Some(loc(10))
    );

    h.controller.resume();
    h.expect_resumed()?;
    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));
    Ok(())
}

#[test]
fn step_into_suspends_at_the_next_task_and_only_once() -> Result<()> {
    let mut h = park_at_first_task(simple_build)?;

    h.controller.step_into();
    h.expect_resumed()?;
    assert_eq!(h.expect_suspended(SuspendReason::StepEnd)?, Some(loc(11)));

    // the armed flag was consumed: plain resume runs to completion
    h.controller.resume();
    h.expect_resumed()?;
    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));
    Ok(())
}

#[test]
fn step_over_skips_nested_tasks() -> Result<()> {
    let mut h = park_at_first_task(nested_build)?;

    // paused at task a; its nested task at line 15 must run through, with
    // the next suspension only after a itself finishes
    h.controller.step_over();
    h.expect_resumed()?;
    assert_eq!(h.expect_suspended(SuspendReason::StepEnd)?, Some(loc(11)));

    h.controller.resume();
    h.expect_resumed()?;
    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));
    Ok(())
}

#[test]
fn breakpoint_outranks_an_armed_step() -> Result<()> {
    let mut h = spawn_build(
        |c| {
            c.add_breakpoint(Breakpoint::new(loc(10)));
            c.add_breakpoint(Breakpoint::new(loc(11)));
        },
        simple_build,
    );

    assert_eq!(
        h.expect_suspended(SuspendReason::Breakpoint)?,
        Some(loc(10))
    );

    // step-into lands on the second breakpoint's task: the breakpoint
    // reason wins over the step
    h.controller.step_into();
    h.expect_resumed()?;
    assert_eq!(
        h.expect_suspended(SuspendReason::Breakpoint)?,
        Some(loc(11))
    );

    // and the un-consumed step still completes afterwards
    h.controller.resume();
    h.expect_resumed()?;
    assert_eq!(h.expect_suspended(SuspendReason::StepEnd)?, Some(loc(12)));

    h.controller.resume();
    h.expect_resumed()?;
    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));
    Ok(())
}

#[test]
fn resume_is_observed_after_the_wait_has_begun() -> Result<()> {
    let mut h = park_at_first_task(simple_build)?;

    // give the build thread time to actually park in the wait
    thread::sleep(Duration::from_millis(50));
    h.controller.resume();

    h.expect_resumed()?;
    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));
    Ok(())
}

#[test]
fn cancellation_overrides_resume() -> Result<()> {
    let mut h = park_at_first_task(simple_build)?;

    h.canceled.store(true, Ordering::Relaxed);
    h.controller.resume();

    assert_eq!(h.finish()?, Err(Canceled));
    // the gate neither resumed nor terminated on the way out
    assert!(h.events.try_recv().is_err());
    Ok(())
}

#[test]
fn cancellation_unblocks_a_suspended_build() -> Result<()> {
    let mut h = park_at_first_task(simple_build)?;

    // no resume: the bounded wait must notice the level-triggered flag on
    // its own
    h.canceled.store(true, Ordering::Relaxed);

    assert_eq!(h.finish()?, Err(Canceled));
    Ok(())
}

#[test]
fn terminate_after_natural_completion_is_a_no_op() -> Result<()> {
    let mut h = spawn_build(|_| {}, simple_build);
    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));

    h.controller.terminate();
    assert!(h.events.try_recv().is_err());
    assert_eq!(h.controller.phase(), Phase::Terminated);
    Ok(())
}

#[test]
fn terminate_is_idempotent_and_safe_before_build_start() -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let (_bridge, controller) =
        DebugBridge::<ScriptTask, ScriptTarget, _, _>::new(tx, Arc::new(AtomicBool::new(false)));

    controller.terminate();
    controller.terminate();

    assert_eq!(rx.try_recv(), Ok(DebugEvent::Terminated));
    assert!(rx.try_recv().is_err());
    assert_eq!(controller.phase(), Phase::Terminated);
    Ok(())
}

#[test]
fn target_breakpoints_hit_at_target_start() -> Result<()> {
    let mut h = spawn_build(|c| c.add_breakpoint(Breakpoint::new(loc(1))), simple_build);

    // suspended at the target boundary, before any task is current
    assert_eq!(h.expect_suspended(SuspendReason::Breakpoint)?, Some(loc(1)));

    // step-over with no current task degrades to "pause at the next task"
    h.controller.step_over();
    h.expect_resumed()?;
    assert_eq!(h.expect_suspended(SuspendReason::StepEnd)?, Some(loc(10)));

    h.controller.resume();
    h.expect_resumed()?;
    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));
    Ok(())
}

#[test]
fn suspension_is_observable_through_the_controller() -> Result<()> {
    let mut h = park_at_first_task(simple_build)?;

    assert!(h.controller.is_suspended());
    assert_eq!(h.controller.phase(), Phase::Suspended);
    assert_eq!(
        h.controller.suspend_reason(),
        Some(SuspendReason::Breakpoint)
    );

    h.controller.resume();
    h.expect_resumed()?;
    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));

    assert_eq!(h.controller.phase(), Phase::Terminated);
    assert_eq!(h.controller.suspend_reason(), None);
    Ok(())
}

#[test]
fn build_started_clears_stale_intentions() -> Result<()> {
    let mut h = spawn_build(
        |c| {
            // commands issued against a bridge with no running build
            c.suspend();
            c.step_into();
            c.step_over();
        },
        simple_build,
    );

    // build_started resets the tracker: none of the stale flags fire
    h.expect_terminated()?;
    assert_eq!(h.finish()?, Ok(()));
    Ok(())
}

#[test]
fn builder_rejects_a_zero_poll_interval() {
    let result = DebugBridge::<ScriptTask, ScriptTarget, _, _>::builder(
        (),
        Arc::new(AtomicBool::new(false)),
    )
    .poll_interval(Duration::from_secs(0))
    .build();

    match result {
        Err(BridgeBuilderError::ZeroPollInterval) => {}
        Err(other) => panic!("unexpected builder error: {}", other),
        Ok(_) => panic!("zero poll interval accepted"),
    }
}
