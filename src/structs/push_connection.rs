use tokio::sync::mpsc;
use crate::structs::push_message::PushMessage;

/// Both halves of an open push channel. Dropping `outbound` closes the
/// channel; `inbound` yields `None` once the Engine side has closed.
pub struct PushConnection {
    pub outbound: mpsc::UnboundedSender<PushMessage>,
    pub inbound: mpsc::UnboundedReceiver<PushMessage>,
}
