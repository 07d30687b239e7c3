use log::trace;
use std::cell::Cell;
use std::rc::Rc;

/// Passed to every task on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Ticks elapsed on the ticker, starting at 1.
    pub number: u64,
}

struct Scheduled {
    id: u64,
    cancelled: Rc<Cell<bool>>,
    callback: Box<dyn FnMut(FrameTick)>,
}

/// Runs repeating per-frame tasks until they are cancelled.
#[derive(Default)]
pub struct FrameTicker {
    tasks: Vec<Scheduled>,
    next_id: u64,
    ticks: u64,
}

/// Handle to a scheduled task. Dropping it leaves the task running.
#[must_use = "a repeating task runs until its handle is cancelled"]
#[derive(Debug)]
pub struct FrameTask {
    id: u64,
    cancelled: Rc<Cell<bool>>,
}

impl FrameTask {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stops the task; it will not run on any later tick.
    pub fn cancel(self) {
        self.cancelled.set(true);
        trace!("frame task {} cancelled", self.id);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl FrameTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_repeating(&mut self, callback: impl FnMut(FrameTick) + 'static) -> FrameTask {
        let id = self.next_id;
        self.next_id += 1;
        let cancelled = Rc::new(Cell::new(false));
        self.tasks.push(Scheduled {
            id,
            cancelled: Rc::clone(&cancelled),
            callback: Box::new(callback),
        });
        FrameTask { id, cancelled }
    }

    /// Drops cancelled tasks and their callbacks. Returns how many went.
    pub fn purge(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.cancelled.get());
        before - self.tasks.len()
    }

    /// Runs every live task once and returns how many ran.
    pub fn tick(&mut self) -> usize {
        self.purge();
        self.ticks += 1;
        let tick = FrameTick { number: self.ticks };
        let mut ran = 0;
        for task in self.tasks.iter_mut() {
            // A task may cancel another one during this tick.
            if task.cancelled.get() {
                continue;
            }
            (task.callback)(tick);
            ran += 1;
        }
        ran
    }

    /// Number of scheduled tasks that have not been cancelled.
    pub fn live_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| !t.cancelled.get()).count()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_scheduled(&self, id: u64) -> bool {
        self.tasks.iter().any(|t| t.id == id && !t.cancelled.get())
    }
}
