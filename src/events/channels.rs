// Event channel - Ring buffer from the timing threads to the UI thread
// The producer is shared behind a mutex: the beat scheduler and the practice
// ticker both publish, the UI thread is the single consumer

use super::event::MetronomeEvent;
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use std::sync::{Arc, Mutex};

pub type EventProducer = ringbuf::HeapProd<MetronomeEvent>;
pub type EventConsumer = ringbuf::HeapCons<MetronomeEvent>;

/// Cloneable publishing side of the event channel
#[derive(Clone)]
pub struct EventSender {
    producer: Arc<Mutex<EventProducer>>,
}

impl EventSender {
    /// Publish an event without blocking on the consumer
    /// Returns false (and drops the event) when the UI is not draining fast enough
    pub fn send(&self, event: MetronomeEvent) -> bool {
        let mut producer = match self.producer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match producer.try_push(event) {
            Ok(()) => true,
            Err(dropped) => {
                log::warn!("Event channel full, dropping {:?}", dropped);
                false
            }
        }
    }
}

/// Consuming side of the event channel, owned by the UI thread
pub struct EventReceiver {
    consumer: EventConsumer,
}

impl EventReceiver {
    pub fn try_recv(&mut self) -> Option<MetronomeEvent> {
        self.consumer.try_pop()
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> Vec<MetronomeEvent> {
        self.consumer.pop_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}

pub fn create_event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    let rb = HeapRb::<MetronomeEvent>::new(capacity.max(1));
    let (producer, consumer) = rb.split();
    (
        EventSender {
            producer: Arc::new(Mutex::new(producer)),
        },
        EventReceiver { consumer },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_order() {
        let (tx, mut rx) = create_event_channel(8);

        assert!(tx.send(MetronomeEvent::BeatAdvanced { index: 0 }));
        assert!(tx.send(MetronomeEvent::BeatAdvanced { index: 1 }));

        assert_eq!(
            rx.drain(),
            vec![
                MetronomeEvent::BeatAdvanced { index: 0 },
                MetronomeEvent::BeatAdvanced { index: 1 },
            ]
        );
        assert!(rx.is_empty());
    }

    #[test]
    fn test_full_channel_drops_without_blocking() {
        let (tx, mut rx) = create_event_channel(2);

        assert!(tx.send(MetronomeEvent::PracticeCompleted));
        assert!(tx.send(MetronomeEvent::PracticeCompleted));
        assert!(!tx.send(MetronomeEvent::BeatAdvanced { index: 3 }));

        assert_eq!(rx.drain().len(), 2);
    }

    #[test]
    fn test_senders_share_one_channel() {
        let (tx, mut rx) = create_event_channel(8);
        let tx2 = tx.clone();

        let handle = std::thread::spawn(move || {
            tx2.send(MetronomeEvent::BarCompleted { completed_bars: 1 });
        });
        handle.join().unwrap();
        tx.send(MetronomeEvent::PracticeCompleted);

        assert_eq!(rx.try_recv(), Some(MetronomeEvent::BarCompleted { completed_bars: 1 }));
        assert_eq!(rx.try_recv(), Some(MetronomeEvent::PracticeCompleted));
        assert_eq!(rx.try_recv(), None);
    }
}
