#![allow(dead_code)]

pub mod builders;
pub mod strategies;

pub use builders::*;

use async_trait::async_trait;
use courier_core::dispatch::ambient::{self, AmbientState};
use courier_core::prelude::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Shared, ordered record of what ran
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &EventLog) -> Vec<String> {
    log.lock().clone()
}

#[derive(Debug, Clone)]
pub struct OrderPlaced {
    pub order_id: u32,
}

#[derive(Debug, Clone)]
pub struct OrderShipped {
    pub order_id: u32,
}

#[derive(Debug, Clone)]
pub struct Tick {
    pub index: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("payment gateway rejected order {order_id}")]
pub struct PaymentDeclined {
    pub order_id: u32,
}

/// What a [`RecordingHandler`] does after recording itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Continue,
    StopChain,
    Fail,
}

/// Records its name, then reacts.
pub struct RecordingHandler {
    pub name: &'static str,
    pub reaction: Reaction,
    pub log: EventLog,
}

impl RecordingHandler {
    pub fn new(name: &'static str, reaction: Reaction, log: &EventLog) -> Arc<Self> {
        Arc::new(Self {
            name,
            reaction,
            log: Arc::clone(log),
        })
    }

    fn react(&self, order_id: u32, context: &HandlerContext) -> Result<(), BoxError> {
        self.log.lock().push(self.name.to_string());
        match self.reaction {
            Reaction::Continue => Ok(()),
            Reaction::StopChain => {
                context.do_not_continue_dispatching_current_message();
                Ok(())
            }
            Reaction::Fail => Err(Box::new(PaymentDeclined { order_id })),
        }
    }
}

impl Handler for RecordingHandler {}

#[async_trait]
impl Handle<OrderPlaced> for RecordingHandler {
    async fn handle(&self, message: &OrderPlaced, context: &HandlerContext) -> Result<(), BoxError> {
        self.react(message.order_id, context)
    }
}

#[async_trait]
impl Handle<OrderShipped> for RecordingHandler {
    async fn handle(&self, message: &OrderShipped, context: &HandlerContext) -> Result<(), BoxError> {
        self.react(message.order_id, context)
    }
}

/// Handler whose direct path must never run when a factory overrides it.
pub struct FulfillmentHandler {
    pub log: EventLog,
}

impl Handler for FulfillmentHandler {}

#[async_trait]
impl Handle<OrderPlaced> for FulfillmentHandler {
    async fn handle(&self, _message: &OrderPlaced, _context: &HandlerContext) -> Result<(), BoxError> {
        self.log.lock().push("fulfillment.direct".to_string());
        Ok(())
    }
}

/// Saga recording the ambient saga it observes during its turn.
pub struct ShippingSaga {
    pub id: Uuid,
    pub fail: bool,
    pub log: EventLog,
    pub observed: Mutex<Vec<Option<Uuid>>>,
    pub ambient: Mutex<Option<Arc<AmbientState>>>,
}

impl ShippingSaga {
    pub fn new(fail: bool, log: &EventLog) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            fail,
            log: Arc::clone(log),
            observed: Mutex::new(Vec::new()),
            ambient: Mutex::new(None),
        })
    }

    pub fn observed(&self) -> Vec<Option<Uuid>> {
        self.observed.lock().clone()
    }

    /// Ambient state of the last unit this saga ran in
    pub fn ambient_state(&self) -> Option<Arc<AmbientState>> {
        self.ambient.lock().clone()
    }
}

impl Saga for ShippingSaga {
    fn saga_id(&self) -> Uuid {
        self.id
    }
}

impl Handler for ShippingSaga {
    fn as_saga(self: Arc<Self>) -> Option<Arc<dyn Saga>> {
        Some(self)
    }
}

#[async_trait]
impl Handle<OrderShipped> for ShippingSaga {
    async fn handle(&self, message: &OrderShipped, context: &HandlerContext) -> Result<(), BoxError> {
        self.log.lock().push("shipping_saga".to_string());
        *self.ambient.lock() = Some(Arc::clone(context.ambient()));
        self.observed
            .lock()
            .push(ambient::current_saga().map(|saga| saga.saga_id()));
        assert_eq!(
            context.current_saga().map(|saga| saga.saga_id()),
            Some(self.id)
        );
        if self.fail {
            return Err(Box::new(PaymentDeclined {
                order_id: message.order_id,
            }));
        }
        Ok(())
    }
}

/// Records the ambient saga seen by whoever runs after a saga.
pub struct SagaProbe {
    pub observed: Mutex<Vec<Option<Uuid>>>,
}

impl SagaProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            observed: Mutex::new(Vec::new()),
        })
    }

    pub fn observed(&self) -> Vec<Option<Uuid>> {
        self.observed.lock().clone()
    }
}

impl Handler for SagaProbe {}

#[async_trait]
impl Handle<OrderShipped> for SagaProbe {
    async fn handle(&self, _message: &OrderShipped, _context: &HandlerContext) -> Result<(), BoxError> {
        self.observed
            .lock()
            .push(ambient::current_saga().map(|saga| saga.saga_id()));
        Ok(())
    }
}

/// Factory producing `steps` actions, the one at `fail_at` failing.
pub struct ScriptedFactory {
    pub steps: usize,
    pub fail_at: Option<usize>,
    pub log: EventLog,
    pub built: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    pub fn new(steps: usize, fail_at: Option<usize>, log: &EventLog) -> Self {
        Self {
            steps,
            fail_at,
            log: Arc::clone(log),
            built: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Component for ScriptedFactory {
    fn as_dispatcher_factory(self: Arc<Self>) -> Option<Arc<dyn DispatcherFactory>> {
        Some(self)
    }
}

impl DispatcherFactory for ScriptedFactory {
    fn get_dispatcher(&self, request: DispatchRequest<'_>) -> Result<Vec<DispatchAction>, BoxError> {
        self.built.fetch_add(1, Ordering::SeqCst);
        let handler = request.handler_type.short_name();
        let order_id = request
            .message
            .downcast_ref::<OrderPlaced>()
            .map_or(0, |placed| placed.order_id);

        Ok((0..self.steps)
            .map(|step| {
                let log = Arc::clone(&self.log);
                let fails = self.fail_at == Some(step);
                let entry = format!("{handler}.action{step}");
                DispatchAction::new(move || async move {
                    log.lock().push(entry);
                    if fails {
                        return Err(Box::new(PaymentDeclined { order_id }) as BoxError);
                    }
                    Ok(())
                })
            })
            .collect())
    }
}

/// Factory that cannot produce any actions
pub struct BrokenFactory;

impl Component for BrokenFactory {
    fn as_dispatcher_factory(self: Arc<Self>) -> Option<Arc<dyn DispatcherFactory>> {
        Some(self)
    }
}

impl DispatcherFactory for BrokenFactory {
    fn get_dispatcher(&self, _request: DispatchRequest<'_>) -> Result<Vec<DispatchAction>, BoxError> {
        Err("retry policy store unreachable".into())
    }
}

/// Registered under a factory mapping but lacking the capability
pub struct AuditTrail;

impl Component for AuditTrail {}

/// Factory whose single action records the ambient saga it runs under.
pub struct SagaAwareFactory {
    pub fail: bool,
    pub observed: Arc<Mutex<Vec<Option<Uuid>>>>,
    pub ambient: Arc<Mutex<Option<Arc<AmbientState>>>>,
}

impl SagaAwareFactory {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            observed: Arc::new(Mutex::new(Vec::new())),
            ambient: Arc::new(Mutex::new(None)),
        }
    }
}

impl Component for SagaAwareFactory {
    fn as_dispatcher_factory(self: Arc<Self>) -> Option<Arc<dyn DispatcherFactory>> {
        Some(self)
    }
}

impl DispatcherFactory for SagaAwareFactory {
    fn get_dispatcher(&self, request: DispatchRequest<'_>) -> Result<Vec<DispatchAction>, BoxError> {
        *self.ambient.lock() = Some(Arc::clone(request.context.ambient()));
        let observed = Arc::clone(&self.observed);
        let fail = self.fail;
        Ok(vec![DispatchAction::new(move || async move {
            observed
                .lock()
                .push(ambient::current_saga().map(|saga| saga.saga_id()));
            if fail {
                return Err::<(), BoxError>("shipment carrier offline".into());
            }
            Ok(())
        })])
    }
}
