//! # Fixed-Priority Scheduler Tests
//!
//! Scenario tests for the single-resource policy.

use crate::{FixedPriorityConfig, FixedPriorityScheduler};
use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use simsched_framework::driver::SimulationDriver;
use simsched_framework::{
    Duration, EventKind, EventLog, EventMask, Instant, ResourceScheduler, SchedError, TaskConfig,
    TaskId,
};

const NEVER: Instant = Instant::INFINITY;

fn at(ticks: u64) -> Instant {
    Instant::from_ticks(ticks)
}

fn ticks(ticks: u64) -> Duration {
    Duration::from_ticks(ticks)
}

/// Build an initialized scheduler; tasks are (raw id, execution time, priority)
fn scheduler(
    config: FixedPriorityConfig,
    tasks: &[(u64, i64, Option<i32>)],
) -> (FixedPriorityScheduler, EventLog) {
    let mut s = FixedPriorityScheduler::new("cpu0", config);
    for &(raw, exec, priority) in tasks {
        let mut cfg = TaskConfig::new().with_execution_time(exec);
        if let Some(p) = priority {
            cfg = cfg.with_priority(p);
        }
        s.configure(TaskId::from_raw(raw), cfg).unwrap();
    }
    let log = EventLog::new();
    s.add_listener(Box::new(log.clone()), EventMask::START | EventMask::STOP | EventMask::PREEMPTED);
    s.initialize().unwrap();
    (s, log)
}

#[test]
fn single_task_runs_to_completion() {
    let x = TaskId::from_raw(1);
    let (mut s, log) = scheduler(FixedPriorityConfig::non_preemptive(), &[(1, 5, None)]);

    assert_eq!(s.schedule(x, at(0), NEVER).unwrap(), ticks(5));
    assert_eq!(s.remaining_time(x), Some(ticks(5)));
    assert!(!s.last_task_finished());

    assert_eq!(s.schedule(x, at(5), NEVER).unwrap(), Duration::ZERO);
    assert!(s.last_task_finished());
    assert_eq!(s.remaining_time(x), None);
    assert_eq!(
        log.task_events(),
        vec![
            (x, at(0), Some(EventKind::Start)),
            (x, at(5), Some(EventKind::Stop)),
        ]
    );
}

#[test]
fn urgent_arrival_preempts_and_preempted_task_resumes() {
    let (low, high) = (TaskId::from_raw(1), TaskId::from_raw(2));
    let (mut s, log) = scheduler(
        FixedPriorityConfig::new(),
        &[(1, 10, Some(10)), (2, 2, Some(1))],
    );

    assert_eq!(s.schedule(low, at(0), NEVER).unwrap(), ticks(10));
    assert_eq!(s.schedule(high, at(3), NEVER).unwrap(), ticks(2));
    assert_eq!(s.remaining_time(low), Some(ticks(7)));
    assert_eq!(s.running(), Some(high));

    assert_eq!(s.schedule(high, at(5), NEVER).unwrap(), Duration::ZERO);
    assert!(s.last_task_finished());
    assert_eq!(s.running(), Some(low));
    assert_eq!(s.remaining_time(low), Some(ticks(7)));

    assert_eq!(s.schedule(low, at(10), NEVER).unwrap(), ticks(2));
    assert_eq!(s.schedule(low, at(12), NEVER).unwrap(), Duration::ZERO);
    assert!(s.last_task_finished());

    assert_eq!(
        log.task_events(),
        vec![
            (low, at(0), Some(EventKind::Start)),
            (low, at(3), Some(EventKind::Preempted)),
            (high, at(3), Some(EventKind::Start)),
            (high, at(5), Some(EventKind::Stop)),
            (low, at(5), Some(EventKind::Start)),
            (low, at(12), Some(EventKind::Stop)),
        ]
    );
    assert_eq!(s.metrics().preemptions(), 1);
    assert_eq!(s.metrics().resumptions(), 1);
    assert_eq!(s.metrics().completions(), 2);
}

#[test]
fn non_preemptive_mode_keeps_running_task() {
    let (a, b) = (TaskId::from_raw(1), TaskId::from_raw(2));
    let (mut s, log) = scheduler(
        FixedPriorityConfig::non_preemptive(),
        &[(1, 3, Some(1)), (2, 6, Some(5))],
    );

    s.schedule(b, at(0), NEVER).unwrap();
    assert_eq!(s.schedule(a, at(0), NEVER).unwrap(), ticks(6));
    assert_eq!(s.running(), Some(b));
    assert_eq!(s.remaining_time(a), None);
    assert!(log
        .task_events()
        .iter()
        .all(|(_, _, kind)| *kind != Some(EventKind::Preempted)));
}

#[test]
fn preemptive_mode_switches_at_same_instant() {
    let (a, b) = (TaskId::from_raw(1), TaskId::from_raw(2));
    let (mut s, log) = scheduler(FixedPriorityConfig::new(), &[(1, 3, Some(1)), (2, 6, Some(5))]);

    s.schedule(b, at(0), NEVER).unwrap();
    assert_eq!(s.schedule(a, at(0), NEVER).unwrap(), ticks(3));
    assert_eq!(s.running(), Some(a));
    let events = log.task_events();
    assert_eq!(
        &events[1..],
        &[
            (b, at(0), Some(EventKind::Preempted)),
            (a, at(0), Some(EventKind::Start)),
        ]
    );
}

#[test]
fn equal_priority_never_preempts() {
    let (first, second) = (TaskId::from_raw(1), TaskId::from_raw(2));
    let (mut s, _) = scheduler(FixedPriorityConfig::new(), &[(1, 4, Some(3)), (2, 4, Some(3))]);

    s.schedule(first, at(0), NEVER).unwrap();
    assert_eq!(s.schedule(second, at(1), NEVER).unwrap(), ticks(3));
    assert_eq!(s.running(), Some(first));
    assert_eq!(s.metrics().refusals(), 1);

    // Served once the first one is done
    s.schedule(first, at(4), NEVER).unwrap();
    assert_eq!(s.schedule(second, at(4), NEVER).unwrap(), ticks(4));
    assert_eq!(s.running(), Some(second));
}

#[test]
fn task_without_priority_is_preempted_by_any_explicit_priority() {
    let (plain, ranked) = (TaskId::from_raw(1), TaskId::from_raw(2));
    let (mut s, _) = scheduler(
        FixedPriorityConfig::new(),
        &[(1, 5, None), (2, 1, Some(i32::MAX - 1))],
    );

    s.schedule(plain, at(0), NEVER).unwrap();
    s.schedule(ranked, at(1), NEVER).unwrap();
    assert_eq!(s.running(), Some(ranked));
}

#[test]
fn two_tasks_without_priority_do_not_preempt_each_other() {
    let (a, b) = (TaskId::from_raw(1), TaskId::from_raw(2));
    let (mut s, _) = scheduler(FixedPriorityConfig::new(), &[(1, 5, None), (2, 5, None)]);

    s.schedule(a, at(0), NEVER).unwrap();
    s.schedule(b, at(1), NEVER).unwrap();
    assert_eq!(s.running(), Some(a));
}

#[test]
fn nested_preemption_resumes_in_reverse_order() {
    let (low, mid, high) = (TaskId::from_raw(1), TaskId::from_raw(2), TaskId::from_raw(3));
    let (mut s, _) = scheduler(
        FixedPriorityConfig::new(),
        &[(1, 10, Some(9)), (2, 4, Some(5)), (3, 1, Some(1))],
    );

    s.schedule(low, at(0), NEVER).unwrap();
    s.schedule(mid, at(2), NEVER).unwrap();
    s.schedule(high, at(3), NEVER).unwrap();
    let order: Vec<TaskId> = s.run_stack().iter().collect();
    assert_eq!(order, vec![low, mid, high]);

    s.schedule(high, at(4), NEVER).unwrap();
    assert_eq!(s.running(), Some(mid));
    assert_eq!(s.remaining_time(mid), Some(ticks(3)));

    s.schedule(mid, at(7), NEVER).unwrap();
    assert!(s.last_task_finished());
    assert_eq!(s.running(), Some(low));
    assert_eq!(s.remaining_time(low), Some(ticks(8)));
}

#[test]
fn buried_task_keeps_its_remaining_time() {
    let (low, high) = (TaskId::from_raw(1), TaskId::from_raw(2));
    let (mut s, _) = scheduler(FixedPriorityConfig::new(), &[(1, 10, Some(10)), (2, 20, Some(1))]);

    s.schedule(low, at(0), NEVER).unwrap();
    s.schedule(high, at(2), NEVER).unwrap();
    s.schedule(high, at(9), NEVER).unwrap();
    s.schedule(low, at(15), NEVER).unwrap();

    assert_eq!(s.remaining_time(low), Some(ticks(8)));
    assert_eq!(s.core().last_scheduled(low), Some(at(15)));
    assert_eq!(s.remaining_time(high), Some(ticks(7)));
}

#[test]
fn idle_reschedule_is_infinite_and_inert() {
    let x = TaskId::from_raw(1);
    let (mut s, log) = scheduler(FixedPriorityConfig::new(), &[(1, 5, None)]);
    log.clear();

    for t in [0, 3, 3, 9] {
        assert_eq!(s.reschedule(at(t)).unwrap(), Duration::INFINITY);
    }
    assert_eq!(s.remaining_time(x), None);
    assert_eq!(s.core().last_scheduled(x), None);
    assert!(log.events().is_empty());
}

#[test]
fn arrival_while_top_is_due_waits_for_completion() {
    let (a, b) = (TaskId::from_raw(1), TaskId::from_raw(2));
    let (mut s, _) = scheduler(FixedPriorityConfig::new(), &[(1, 4, Some(5)), (2, 4, Some(1))]);

    s.schedule(a, at(0), NEVER).unwrap();
    assert_eq!(s.schedule(b, at(4), NEVER).unwrap(), Duration::ZERO);
    assert_eq!(s.running(), Some(a));
    assert!(!s.last_task_finished());
}

#[test]
fn time_regression_is_rejected() {
    let x = TaskId::from_raw(1);
    let (mut s, _) = scheduler(FixedPriorityConfig::new(), &[(1, 5, None)]);

    s.schedule(x, at(6), NEVER).unwrap();
    let err = s.schedule(x, at(2), NEVER).unwrap_err();
    assert_eq!(
        err,
        SchedError::TemporalOrdering { scheduler: "cpu0".into(), last: at(6), now: at(2) }
    );
}

#[test]
fn idle_reschedule_still_orders_time() {
    let x = TaskId::from_raw(1);
    let (mut s, _) = scheduler(FixedPriorityConfig::new(), &[(1, 5, None)]);

    assert_eq!(s.reschedule(at(9)).unwrap(), Duration::INFINITY);
    let err = s.schedule(x, at(3), NEVER).unwrap_err();
    assert_eq!(
        err,
        SchedError::TemporalOrdering { scheduler: "cpu0".into(), last: at(9), now: at(3) }
    );
    assert_eq!(s.remaining_time(x), None);
    assert!(s.running().is_none());
}

#[test]
fn remaining_time_never_goes_negative() {
    let tasks = [(1, 7, Some(4)), (2, 3, Some(2)), (3, 5, Some(1)), (4, 2, None)];
    let (mut s, _) = scheduler(FixedPriorityConfig::new(), &tasks);

    // Deterministic interleaving of arrivals and late callbacks
    let mut t = 0;
    for step in 0..60u64 {
        let task = TaskId::from_raw(step % 4 + 1);
        t += step % 3;
        let next = s.schedule(task, at(t), NEVER).unwrap();
        assert!(!next.is_infinite());
        for &(raw, exec, _) in &tasks {
            if let Some(rem) = s.remaining_time(TaskId::from_raw(raw)) {
                assert!(rem.ticks() <= exec as u64);
            }
        }
        assert!(s.run_stack().len() <= tasks.len());
    }
}

#[test]
fn completed_task_restarts_only_on_fresh_request() {
    let x = TaskId::from_raw(1);
    let (mut s, _) = scheduler(FixedPriorityConfig::new(), &[(1, 2, None)]);

    s.schedule(x, at(0), NEVER).unwrap();
    s.schedule(x, at(2), NEVER).unwrap();
    assert!(s.last_task_finished());
    assert_eq!(s.reschedule(at(3)).unwrap(), Duration::INFINITY);
    assert!(s.running().is_none());

    assert_eq!(s.schedule(x, at(5), NEVER).unwrap(), ticks(2));
    assert_eq!(s.remaining_time(x), Some(ticks(2)));
}

#[test]
fn driver_reproduces_preemption_timeline() {
    let (low, high) = (TaskId::from_raw(1), TaskId::from_raw(2));
    let mut s = FixedPriorityScheduler::new("cpu0", FixedPriorityConfig::new());
    s.configure(low, TaskConfig::new().with_execution_time(10).with_priority(10)).unwrap();
    s.configure(high, TaskConfig::new().with_execution_time(2).with_priority(1)).unwrap();

    let mut driver = SimulationDriver::new(s);
    driver.start().unwrap();
    driver.request(low, at(0));
    driver.request(high, at(3));
    let summary = driver.run_until(at(100)).unwrap();

    assert!(!summary.exhausted);
    assert_eq!(driver.completion_time(high), Some(at(5)));
    assert_eq!(driver.completion_time(low), Some(at(12)));
    assert_eq!(driver.pending(), 0);
    driver.finish().unwrap();
}

#[test]
fn driver_follows_up_ticks_at_returned_time() {
    let x = TaskId::from_raw(1);
    let mut s = FixedPriorityScheduler::new("cpu0", FixedPriorityConfig::new());
    s.configure(x, TaskConfig::new().with_execution_time(5)).unwrap();

    let mut driver = SimulationDriver::new(s);
    driver.start().unwrap();
    driver.request(x, at(0));
    driver.tick(at(2));

    // The tick at 2 asks for another at 5, next to x's completing request
    let summary = driver.run_until(at(4)).unwrap();
    assert_eq!(summary.steps, 2);
    assert_eq!(driver.pending(), 2);

    let summary = driver.run_until(at(100)).unwrap();
    assert_eq!(summary.steps, 2);
    assert_eq!(summary.now, at(5));
    assert_eq!(driver.completion_time(x), Some(at(5)));
    assert_eq!(driver.pending(), 0);
}

#[test]
fn driver_serializes_non_preemptive_tasks() {
    let tasks: Vec<TaskId> = (1..=3).map(TaskId::from_raw).collect();
    let mut s = FixedPriorityScheduler::new("cpu0", FixedPriorityConfig::non_preemptive());
    for (i, task) in tasks.iter().enumerate() {
        s.configure(*task, TaskConfig::new().with_execution_time(4).with_priority(3 - i as i32))
            .unwrap();
    }

    let mut driver = SimulationDriver::new(s);
    driver.start().unwrap();
    for task in &tasks {
        driver.request(*task, at(0));
    }
    driver.run_until(at(100)).unwrap();

    assert_eq!(driver.completion_time(tasks[0]), Some(at(4)));
    assert_eq!(driver.completions().len(), 3);
    let mut finish: Vec<u64> = driver.completions().iter().map(|c| c.time.ticks()).collect();
    finish.sort_unstable();
    assert_eq!(finish, vec![4, 8, 12]);
}
