// vim: set ai et ts=4 sw=4 sts=4:
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

type Task = Box<dyn FnOnce() -> String + Send + 'static>;

struct Inner {
    closed:    bool,
    pending:   VecDeque<Task>,
    completed: VecDeque<String>,
    in_flight: usize, // dequeued but not yet completed
}

impl Inner {
    // nothing queued, nothing running, no more coming: consumers are done
    fn drained(&self) -> bool {
        self.closed && self.pending.is_empty() && self.in_flight == 0
    }
}

struct Shared {
    inner:        Mutex<Inner>,
    task_ready:   Condvar,
    result_ready: Condvar,
}

// A fixed pool of worker threads draining a FIFO of tasks, each producing
// a string. Tasks start in submission order; results come back in whatever
// order they finish. Dropping the queue closes it and joins the workers,
// letting pending tasks complete.
pub struct TaskQueue {
    shared:  Arc<Shared>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl TaskQueue {
    pub fn new(num_threads: usize) -> TaskQueue {
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                closed:    false,
                pending:   VecDeque::new(),
                completed: VecDeque::new(),
                in_flight: 0,
            }),
            task_ready:   Condvar::new(),
            result_ready: Condvar::new(),
        });
        let workers = (0..num_threads)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || Self::worker(&shared))
            })
            .collect();
        TaskQueue { shared, workers }
    }

    fn worker(shared: &Shared) {
        while let Some(task) = Self::get_task(shared) {
            let result = task();
            let mut inner = shared.inner.lock().unwrap();
            inner.completed.push_back(result);
            inner.in_flight -= 1;
            let drained = inner.drained();
            drop(inner);
            if drained {
                // wake everyone so waiters blocked past the last result
                // can observe the terminal state
                shared.result_ready.notify_all();
            } else {
                shared.result_ready.notify_one();
            }
        }
    }

    // blocks until a task is available or the queue is closed and empty
    fn get_task(shared: &Shared) -> Option<Task> {
        let mut inner = shared.inner.lock().unwrap();
        while inner.pending.is_empty() && !inner.closed {
            inner = shared.task_ready.wait(inner).unwrap();
        }
        let task = inner.pending.pop_front();
        if task.is_some() {
            inner.in_flight += 1;
        }
        task
    }

    pub fn add<F>(&self, task: F)
    where
        F: FnOnce() -> String + Send + 'static,
    {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            inner.pending.push_back(Box::new(task));
        }
        self.shared.task_ready.notify_one();
    }

    // signals no-more-tasks; idempotent. Blocked workers and consumers
    // wake up and either pick up remaining work or observe the sentinel.
    pub fn close(&self) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            inner.closed = true;
        }
        self.shared.task_ready.notify_all();
        self.shared.result_ready.notify_all();
    }

    // next completed result, or None once the queue is closed and fully
    // drained (results of in-flight tasks are never lost)
    pub fn get_result(&self) -> Option<String> {
        let mut inner = self.shared.inner.lock().unwrap();
        while inner.completed.is_empty() && !inner.drained() {
            inner = self.shared.result_ready.wait(inner).unwrap();
        }
        inner.completed.pop_front()
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        self.close();
        for t in self.workers.drain(..) {
            let _ = t.join();
        }
    }
}
