// Laykey Effect Handler Chain
// Ordered chain of polymorphic effect consumers. Replaces return-value
// callback chaining with an explicit composition the caller controls.

use log::trace;

use crate::Effect;

/// Outcome of offering an effect to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The handler consumed the effect; later handlers never see it.
    Consumed,
    /// Not this handler's concern; offer it to the next one.
    Passthrough,
}

/// A consumer of engine effects (HID reporter, vendor callbacks, lighting).
pub trait EffectHandler {
    /// Name for logging and diagnostics.
    fn name(&self) -> &str;

    fn handle(&mut self, effect: &Effect) -> Disposition;
}

/// An ordered chain of effect handlers.
///
/// Effects are offered to handlers in registration order; the first
/// `Consumed` stops the walk.
#[derive(Default)]
pub struct HandlerChain {
    handlers: Vec<Box<dyn EffectHandler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Box<dyn EffectHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Offer one effect to the chain.
    pub fn dispatch(&mut self, effect: &Effect) -> Disposition {
        for handler in &mut self.handlers {
            if handler.handle(effect) == Disposition::Consumed {
                trace!("effect '{}' consumed by '{}'", effect, handler.name());
                return Disposition::Consumed;
            }
        }
        Disposition::Passthrough
    }

    /// Offer a batch of effects in order.
    pub fn dispatch_all(&mut self, effects: &[Effect]) {
        for effect in effects {
            self.dispatch(effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyCode, SpecialToken};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        name: &'static str,
        seen: Rc<RefCell<Vec<Effect>>>,
        consume_forwards: bool,
    }

    impl EffectHandler for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn handle(&mut self, effect: &Effect) -> Disposition {
            self.seen.borrow_mut().push(*effect);
            match effect {
                Effect::Forward(_) if self.consume_forwards => Disposition::Consumed,
                _ => Disposition::Passthrough,
            }
        }
    }

    #[test]
    fn test_first_consumer_wins() {
        let vendor_seen = Rc::new(RefCell::new(Vec::new()));
        let hid_seen = Rc::new(RefCell::new(Vec::new()));

        let mut chain = HandlerChain::new();
        chain.register(Box::new(Recorder {
            name: "vendor",
            seen: vendor_seen.clone(),
            consume_forwards: true,
        }));
        chain.register(Box::new(Recorder {
            name: "hid",
            seen: hid_seen.clone(),
            consume_forwards: false,
        }));

        let forward = Effect::Forward(SpecialToken::RgbToggle);
        let key = Effect::KeyDown(KeyCode::new(0x04));
        assert_eq!(chain.dispatch(&forward), Disposition::Consumed);
        assert_eq!(chain.dispatch(&key), Disposition::Passthrough);

        // The vendor handler consumed the forward, so HID only saw the key.
        assert_eq!(vendor_seen.borrow().as_slice(), &[forward, key]);
        assert_eq!(hid_seen.borrow().as_slice(), &[key]);
    }

    #[test]
    fn test_empty_chain_passes_through() {
        let mut chain = HandlerChain::new();
        assert!(chain.is_empty());
        assert_eq!(
            chain.dispatch(&Effect::KeyUp(KeyCode::new(0x05))),
            Disposition::Passthrough
        );
    }

    #[test]
    fn test_dispatch_all_preserves_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut chain = HandlerChain::new();
        chain.register(Box::new(Recorder {
            name: "rec",
            seen: seen.clone(),
            consume_forwards: false,
        }));

        let effects = [
            Effect::KeyDown(KeyCode::new(0x04)),
            Effect::KeyUp(KeyCode::new(0x04)),
        ];
        chain.dispatch_all(&effects);
        assert_eq!(seen.borrow().as_slice(), &effects);
    }
}
