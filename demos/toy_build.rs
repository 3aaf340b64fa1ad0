//! A scripted toy build engine wired to the debugging bridge.
//!
//! The "engine" runs on the main thread, executing two targets of three
//! tasks each. The "UI" is a second thread that watches bridge events: it
//! single-steps twice after the breakpoint at line 12 hits, then lets the
//! build run to completion.
//!
//! Run with `RUST_LOG=trace` to watch the bridge's internal tracing:
//!
//! ```text
//! RUST_LOG=trace cargo run --example toy_build
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};
use std::thread;

use buildstub::breakpoint::Breakpoint;
use buildstub::bridge::DebugBridge;
use buildstub::build;
use buildstub::common::SourceLocation;
use buildstub::sink::DebugEvent;

type DynResult<T> = Result<T, Box<dyn std::error::Error>>;

const BUILD_FILE: &str = "demo-build.plan";

#[derive(Debug, Clone, PartialEq)]
struct PlanTask {
    name: &'static str,
    line: u32,
}

impl build::Task for PlanTask {
    fn location(&self) -> Option<SourceLocation> {
        Some(SourceLocation::new(BUILD_FILE, self.line))
    }
}

#[derive(Debug, Clone)]
struct PlanTarget {
    name: &'static str,
    line: u32,
}

impl build::Target for PlanTarget {
    fn location(&self) -> Option<SourceLocation> {
        Some(SourceLocation::new(BUILD_FILE, self.line))
    }
}

fn main() -> DynResult<()> {
    pretty_env_logger::init();

    let (events_tx, events_rx) = mpsc::channel();
    let canceled = Arc::new(AtomicBool::new(false));
    let (mut bridge, controller) = DebugBridge::new(events_tx, canceled);

    controller.add_breakpoint(Breakpoint::new(SourceLocation::new(BUILD_FILE, 12)));

    // the "UI": step twice once the breakpoint hits, then run free
    let ui = thread::spawn(move || {
        let mut steps_left = 2;
        for event in events_rx {
            match event {
                DebugEvent::Suspended { reason, location } => {
                    match location {
                        Some(at) => println!("[ui] suspended ({}) at {}", reason, at),
                        None => println!("[ui] suspended ({})", reason),
                    }
                    if steps_left > 0 {
                        steps_left -= 1;
                        controller.step_into();
                    } else {
                        controller.resume();
                    }
                }
                DebugEvent::Resumed => println!("[ui] resumed"),
                DebugEvent::Terminated => {
                    println!("[ui] terminated");
                    break;
                }
            }
        }
    });

    // the "engine": two targets, three tasks each
    bridge.build_started();
    let targets = [
        PlanTarget {
            name: "prepare",
            line: 10,
        },
        PlanTarget {
            name: "compile",
            line: 20,
        },
    ];
    for (index, tgt) in targets.iter().enumerate() {
        println!("[engine] target `{}`", tgt.name);
        bridge.target_started(tgt.clone())?;
        for step in 0..3u32 {
            let tsk = PlanTask {
                name: tgt.name,
                line: (index as u32 + 1) * 10 + step + 1,
            };
            bridge.task_started(tsk.clone())?;
            println!("[engine] running {}:{}", tsk.name, tsk.line);
            bridge.task_finished(tsk)?;
        }
        bridge.target_finished();
    }
    bridge.build_finished();

    ui.join().map_err(|_| "ui thread panicked")?;
    Ok(())
}
