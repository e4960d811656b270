use crossbeam::channel::{Receiver, Sender};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

pub type BaseId = i32;
pub type SectorId = i32;

/// Descriptor handed to the game-state layer to perform the actual scene
/// change. A dock request fires even when no target base was configured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TransitionRequest {
    Dock {
        base: Option<BaseId>,
    },
    SectorJump {
        sector: SectorId,
        position: Vector2<f64>,
    },
}

/// Hand-off channel to the game-state manager. Requests never block and are
/// assumed eventually effective; the consumer drains at its own pace.
pub struct TransitionQueue {
    sender: Sender<TransitionRequest>,
    receiver: Receiver<TransitionRequest>,
}

impl TransitionQueue {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam::channel::unbounded();
        Self { sender, receiver }
    }

    pub fn request_transition(&self, request: TransitionRequest) {
        log::debug!("transition requested: {:?}", request);
        let _ = self.sender.send(request);
    }

    pub fn drain(&self) -> Vec<TransitionRequest> {
        self.receiver.try_iter().collect()
    }
}

impl Default for TransitionQueue {
    fn default() -> Self {
        TransitionQueue::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::vector;
    use test_log::test;

    #[test]
    fn test_queue_order() {
        let queue = TransitionQueue::new();
        queue.request_transition(TransitionRequest::Dock { base: Some(3) });
        queue.request_transition(TransitionRequest::SectorJump {
            sector: 9,
            position: vector![100.0, -50.0],
        });

        let requests = queue.drain();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], TransitionRequest::Dock { base: Some(3) });
        assert!(queue.drain().is_empty());
    }
}
