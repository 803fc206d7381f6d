use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Event<T> {
    t: usize,
    seq: usize,
    data: T,
}

impl<T> PartialEq for Event<T> {
    fn eq(&self, other: &Self) -> bool {
        self.t == other.t && self.seq == other.seq
    }
}

impl<T> Eq for Event<T> {}

impl<T> Ord for Event<T> {
    // Min-heap on time, FIFO among events scheduled for the same time
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .t
            .cmp(&self.t)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Event<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// What an agent hands back to the loop after acting on an event
pub struct Response<T, S> {
    events: Vec<(usize, T)>,
    agents: Vec<Box<dyn Agent<T, S>>>,
}

impl<T, S> Response<T, S> {
    pub fn new() -> Response<T, S> {
        Response {
            events: Vec::new(),
            agents: Vec::new(),
        }
    }

    /// Schedule a single event at time `t`
    pub fn event(t: usize, data: T) -> Response<T, S> {
        Response {
            events: vec![(t, data)],
            agents: Vec::new(),
        }
    }

    /// Schedule several events
    pub fn events(events: Vec<(usize, T)>) -> Response<T, S> {
        Response {
            events,
            agents: Vec::new(),
        }
    }

    /// Spawn new agents; they receive events from the next broadcast onward
    pub fn agents(agents: Vec<Box<dyn Agent<T, S>>>) -> Response<T, S> {
        Response {
            events: Vec::new(),
            agents,
        }
    }
}

impl<T, S> Default for Response<T, S> {
    fn default() -> Self {
        Response::new()
    }
}

pub trait Agent<T, S> {
    fn act(&mut self, _current_t: usize, _data: &T) -> Response<T, S> {
        Response::new()
    }

    fn stats(&self) -> S;
}

pub struct EventLoop<T, S> {
    queue: BinaryHeap<Event<T>>,
    next_seq: usize,
    current_t: usize,
    agents: Vec<Box<dyn Agent<T, S>>>,
}

impl<T, S> EventLoop<T, S> {
    pub fn new(events: Vec<(usize, T)>, agents: Vec<Box<dyn Agent<T, S>>>) -> EventLoop<T, S> {
        let mut event_loop = EventLoop {
            queue: BinaryHeap::new(),
            next_seq: 0,
            current_t: 0,
            agents,
        };
        for (t, data) in events {
            event_loop.schedule(t, data);
        }
        event_loop
    }

    fn schedule(&mut self, t: usize, data: T) {
        self.queue.push(Event {
            t,
            seq: self.next_seq,
            data,
        });
        self.next_seq += 1;
    }

    fn broadcast(&mut self) {
        if let Some(event) = self.queue.pop() {
            self.current_t = event.t;
            let mut new_events = Vec::new();
            let mut new_agents = Vec::new();
            for agent in &mut self.agents {
                let response = agent.act(self.current_t, &event.data);
                new_events.extend(response.events);
                new_agents.extend(response.agents);
            }
            for (t, data) in new_events {
                // Events in the past are dropped
                if t >= self.current_t {
                    self.schedule(t, data);
                }
            }
            self.agents.extend(new_agents);
        }
    }

    /// Process events in time order until the queue is empty or the next
    /// event lies beyond `run_until`
    pub fn run(&mut self, run_until: usize) {
        while let Some(next) = self.queue.peek() {
            if next.t > run_until {
                break;
            }
            self.broadcast();
        }
    }

    pub fn current_t(&self) -> usize {
        self.current_t
    }

    /// Stats from every agent, in registration order
    pub fn stats(&self) -> Vec<S> {
        self.agents.iter().map(|agent| agent.stats()).collect()
    }
}
