//! # Scheduling Events
//!
//! Observability side channel. Schedulers report start, stop and
//! preemption of tasks to attached sinks. Sinks never influence
//! scheduling decisions.

use crate::task::TaskId;
use crate::time::Instant;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use bitflags::bitflags;
use core::cell::RefCell;
use core::fmt;

/// Kind of a scheduling event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Task (or scheduler) started or resumed executing
    Start,
    /// Task (or scheduler) stopped executing
    Stop,
    /// Task was suspended by a more urgent one
    Preempted,
}

/// What an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// A managed task
    Task(TaskId),
    /// The scheduler's own activity
    Scheduler,
}

/// A single scheduling event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEvent {
    /// Subject of the event
    pub source: EventSource,
    /// Simulation time of the event
    pub time: Instant,
    /// Kind; `None` means "status unchanged, position refresh"
    pub kind: Option<EventKind>,
}

impl ScheduleEvent {
    /// Event about a task
    pub fn task(task: TaskId, time: Instant, kind: Option<EventKind>) -> Self {
        Self { source: EventSource::Task(task), time, kind }
    }

    /// Event about the scheduler itself
    pub fn scheduler(time: Instant, kind: Option<EventKind>) -> Self {
        Self { source: EventSource::Scheduler, time, kind }
    }
}

bitflags! {
    /// Event kinds a sink subscribes to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventMask: u8 {
        /// Start events
        const START = 1 << 0;
        /// Stop events
        const STOP = 1 << 1;
        /// Preemption events
        const PREEMPTED = 1 << 2;
        /// Position refreshes (events without a kind)
        const REFRESH = 1 << 3;
    }
}

impl EventMask {
    /// Does this mask let `kind` through?
    pub fn admits(self, kind: Option<EventKind>) -> bool {
        let bit = match kind {
            Some(EventKind::Start) => EventMask::START,
            Some(EventKind::Stop) => EventMask::STOP,
            Some(EventKind::Preempted) => EventMask::PREEMPTED,
            None => EventMask::REFRESH,
        };
        self.contains(bit)
    }
}

/// Receiver of scheduling events
pub trait EventSink {
    /// Called when the sink is attached and at every scheduler initialization
    fn initialize(&mut self, _scheduler: &str, _tasks: &[TaskId]) {}

    /// Called for every event admitted by the sink's mask
    fn on_event(&mut self, scheduler: &str, event: &ScheduleEvent);
}

/// Handle returned when attaching a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    mask: EventMask,
    sink: Box<dyn EventSink>,
}

/// Fan-out of events to the attached sinks
pub struct EventBus {
    listeners: Vec<Listener>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// Attach a sink and introduce the current task set to it
    pub fn add(
        &mut self,
        mut sink: Box<dyn EventSink>,
        mask: EventMask,
        scheduler: &str,
        tasks: &[TaskId],
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        sink.initialize(scheduler, tasks);
        self.listeners.push(Listener { id, mask, sink });
        id
    }

    /// Detach a sink. Returns false if the id is unknown.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() < before
    }

    /// Re-introduce the task set to every sink
    pub fn initialize(&mut self, scheduler: &str, tasks: &[TaskId]) {
        for listener in &mut self.listeners {
            listener.sink.initialize(scheduler, tasks);
        }
    }

    /// Deliver an event
    pub fn emit(&mut self, scheduler: &str, event: ScheduleEvent) {
        for listener in &mut self.listeners {
            if listener.mask.admits(event.kind) {
                listener.sink.on_event(scheduler, &event);
            }
        }
    }

    /// Number of attached sinks
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Are there no sinks?
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// In-memory sink recording every event it receives
///
/// Clones share the same record, so a test can keep one handle and give
/// the other to a scheduler.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<ScheduleEvent>>>,
    introduced: Rc<RefCell<Vec<TaskId>>>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<ScheduleEvent> {
        self.events.borrow().clone()
    }

    /// Recorded events about tasks, as (task, time, kind) triples
    pub fn task_events(&self) -> Vec<(TaskId, Instant, Option<EventKind>)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e.source {
                EventSource::Task(task) => Some((task, e.time, e.kind)),
                EventSource::Scheduler => None,
            })
            .collect()
    }

    /// Tasks introduced by the most recent initialization
    pub fn introduced(&self) -> Vec<TaskId> {
        self.introduced.borrow().clone()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventSink for EventLog {
    fn initialize(&mut self, _scheduler: &str, tasks: &[TaskId]) {
        *self.introduced.borrow_mut() = tasks.to_vec();
    }

    fn on_event(&mut self, _scheduler: &str, event: &ScheduleEvent) {
        self.events.borrow_mut().push(*event);
    }
}
