/// Observer registry for component events.
///
/// Components own an `Emitter` for their event type, invoke every registered
/// handler synchronously at the moment a state change commits, and also
/// return the same event through their `handle_event` action enum. Hosts can
/// use either style; the emitter exists for hosts that prefer registering
/// callbacks up front over matching on returned actions.
pub struct Emitter<E> {
    handlers: Vec<Box<dyn FnMut(&E)>>,
}

impl<E> Emitter<E> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler. Handlers run in registration order.
    pub fn subscribe(&mut self, handler: impl FnMut(&E) + 'static) {
        self.handlers.push(Box::new(handler));
    }

    pub fn emit(&mut self, event: &E) {
        for handler in &mut self.handlers {
            handler(event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_run_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut emitter = Emitter::new();

        let a = seen.clone();
        emitter.subscribe(move |n: &u32| a.borrow_mut().push(*n));
        let b = seen.clone();
        emitter.subscribe(move |n: &u32| b.borrow_mut().push(n + 100));

        emitter.emit(&7);
        assert_eq!(*seen.borrow(), vec![7, 107]);
    }

    #[test]
    fn emit_without_handlers_is_a_noop() {
        let mut emitter: Emitter<u32> = Emitter::new();
        emitter.emit(&1);
        assert_eq!(emitter.handler_count(), 0);
    }
}
