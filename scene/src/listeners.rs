use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The drawing surface; coordinates are canvas-local.
    Canvas,
    /// The whole window, so drags keep tracking outside the canvas.
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    PointerDown,
    PointerUp,
    Wheel,
    Resize,
}

/// Raw event as the host delivers it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32 },
    PointerUp,
    Wheel { delta_y: f32 },
    Resize { width: f32, height: f32 },
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::PointerMove { .. } => EventKind::PointerMove,
            HostEvent::PointerDown { .. } => EventKind::PointerDown,
            HostEvent::PointerUp => EventKind::PointerUp,
            HostEvent::Wheel { .. } => EventKind::Wheel,
            HostEvent::Resize { .. } => EventKind::Resize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    target: EventTarget,
    kind: EventKind,
    callback: Box<dyn FnMut(&HostEvent)>,
}

/// Event listeners attached to the canvas or the window.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Listener>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, target: EventTarget, kind: EventKind, callback: impl FnMut(&HostEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener {
            id,
            target,
            kind,
            callback: Box::new(callback),
        });
        id
    }

    /// Detaches a listener. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        before != self.listeners.len()
    }

    /// Calls every listener registered for `target` and the event's kind, in
    /// registration order. Returns how many were called.
    pub fn dispatch(&mut self, target: EventTarget, event: &HostEvent) -> usize {
        let kind = event.kind();
        let mut called = 0;
        for listener in self
            .listeners
            .iter_mut()
            .filter(|l| l.target == target && l.kind == kind)
        {
            (listener.callback)(event);
            called += 1;
        }
        trace!("{:?} {:?} reached {} listeners", target, kind, called);
        called
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn count_for(&self, target: EventTarget, kind: EventKind) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.target == target && l.kind == kind)
            .count()
    }
}
